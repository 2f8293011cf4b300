use std::sync::Arc;

use log::{debug, error, warn};
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::event::EventStream;
use crate::gateway::{GatewayTransport, Opcode};
use crate::model::voice::{
    RawVoiceServerUpdate, RawVoiceStateUpdate, VoiceServerInfo, VoiceServerUpdated, VoiceState,
    VoiceStateUpdatePayload, VoiceStateUpdated,
};
use crate::model::{ClientIdentity, MemberQuery, Snowflake};
use crate::ready::ReadinessGate;

/// Label stamped into [`ClientIdentity`] for consumers that care which
/// client library drives the gateway.
pub const CLIENT_LABEL: &str = "audiolink";

/// Bridge between a live gateway connection and an audio-control runtime.
///
/// The gateway side feeds the three `on_*` callbacks; the audio runtime
/// consumes the two normalized event streams, awaits readiness, queries
/// channel membership, and sends voice-connection commands. All of it hangs
/// off one `Arc<GatewayBridge>`.
pub struct GatewayBridge {
    transport: Arc<dyn GatewayTransport>,
    ready: ReadinessGate,
    voice_server_updated: EventStream<VoiceServerUpdated>,
    voice_state_updated: EventStream<VoiceStateUpdated>,
}

impl GatewayBridge {
    pub fn new(transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            transport,
            ready: ReadinessGate::new(),
            voice_server_updated: EventStream::new(),
            voice_state_updated: EventStream::new(),
        }
    }

    /// Stream of normalized voice-server assignments.
    pub fn voice_server_updated(&self) -> &EventStream<VoiceServerUpdated> {
        &self.voice_server_updated
    }

    /// Stream of normalized voice-state transitions.
    pub fn voice_state_updated(&self) -> &EventStream<VoiceStateUpdated> {
        &self.voice_state_updated
    }

    /// Suspends until the gateway has produced its identity. Resolves
    /// instantly once the identity is known; see [`ReadinessGate`].
    pub async fn wait_for_ready(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ClientIdentity, Error> {
        self.ready.wait_for_ready(cancel).await
    }

    /// Called by the gateway side when the guild cache has finished
    /// downloading. Only the first call resolves the barrier.
    pub fn on_guild_data_ready(&self, user_id: Snowflake, shard_count: u64) {
        let identity = ClientIdentity {
            label: CLIENT_LABEL.to_string(),
            user_id,
            shard_count,
        };
        if !self.ready.signal_ready(identity) {
            debug!("readiness already signalled, ignoring repeated guild-data-ready");
        }
    }

    /// Called by the gateway side for every raw voice-server assignment.
    /// Returns once every subscriber has handled the normalized event.
    pub async fn on_voice_server_updated(&self, update: RawVoiceServerUpdate) {
        let event = VoiceServerUpdated {
            guild_id: update.guild_id,
            server: VoiceServerInfo {
                token: update.token,
                endpoint: update.endpoint,
            },
        };
        self.voice_server_updated.publish(&event).await;
    }

    /// Called by the gateway side for every raw voice-state transition.
    ///
    /// A transition without a guild id, or with both snapshots missing,
    /// carries nothing a subscriber could act on and is dropped here; the
    /// translator stays live either way.
    pub async fn on_voice_state_updated(&self, update: RawVoiceStateUpdate) {
        let Some(guild_id) = update.guild_id else {
            error!(
                "voice state update for user {} carries no guild id, dropping",
                update.user_id
            );
            return;
        };
        if update.before.is_none() && update.after.is_none() {
            debug!(
                "voice state update for user {} in guild {} has no snapshots, dropping",
                update.user_id, guild_id
            );
            return;
        }

        // The session id is stable across one voice session and may ride on
        // either side of the transition.
        let session_id = update
            .before
            .as_ref()
            .and_then(|s| s.session_id.clone())
            .or_else(|| update.after.as_ref().and_then(|s| s.session_id.clone()));

        let before = VoiceState {
            channel_id: update.before.as_ref().and_then(|s| s.channel_id.clone()),
            session_id: session_id.clone(),
        };
        let after = VoiceState {
            channel_id: update.after.as_ref().and_then(|s| s.channel_id.clone()),
            session_id,
        };

        // Before readiness resolves there is no identity to compare against,
        // so the transition is treated as someone else's.
        let is_self = self
            .ready
            .peek()
            .is_some_and(|identity| identity.user_id == update.user_id);

        let event = VoiceStateUpdated {
            guild_id,
            user_id: update.user_id,
            is_self,
            before,
            after,
        };
        self.voice_state_updated.publish(&event).await;
    }

    /// Lists the user ids currently in a voice channel.
    ///
    /// Best effort: a missing channel or a failed lookup yields an empty
    /// list, never an error. The bot's own id is always excluded; bot
    /// accounts are excluded unless the query says otherwise.
    pub async fn channel_members(
        &self,
        query: &MemberQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Snowflake>, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let lookup = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.transport.get_channel(&query.channel_id) => result,
        };

        let channel = match lookup {
            Ok(Some(channel)) => channel,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => {
                warn!(
                    "failed to fetch members of voice channel {} in guild {}: {}",
                    query.channel_id, query.guild_id, err
                );
                return Ok(Vec::new());
            }
        };

        let own_id = self.ready.peek().map(|identity| identity.user_id);
        let members = channel
            .members
            .into_iter()
            .filter(|user| Some(&user.id) != own_id.as_ref())
            .filter(|user| query.include_bots || !user.bot.unwrap_or(false))
            .map(|user| user.id)
            .collect();

        Ok(members)
    }

    /// Tells the platform to join, move to, or (with `channel_id: None`)
    /// disconnect from voice in a guild.
    ///
    /// Fire and forget: the platform acknowledges asynchronously through the
    /// voice-state stream, never here. Cancellation is honored only before
    /// transmission.
    pub async fn send_voice_update(
        &self,
        guild_id: Snowflake,
        channel_id: Option<Snowflake>,
        self_deaf: bool,
        self_mute: bool,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let payload = VoiceStateUpdatePayload {
            guild_id: guild_id.clone(),
            channel_id,
            self_mute,
            self_deaf,
        };
        let payload = serde_json::to_value(&payload)?;

        self.transport
            .send_payload(&guild_id, Opcode::VoiceStateUpdate, payload)
            .await
    }
}
