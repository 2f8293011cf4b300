use serde::{Deserialize, Serialize};

use super::Snowflake;

/// Where to open the voice-data transport for a guild.
///
/// Every assignment event carries a fresh pair; a new assignment supersedes
/// the previous one outright, the two are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceServerInfo {
    pub token: String,
    pub endpoint: String,
}

/// A user's voice presence in one guild at one instant.
///
/// An absent channel id means not connected; an absent session id means no
/// active session. A present session id with an absent channel id is a
/// normal mid-disconnect state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceState {
    pub channel_id: Option<Snowflake>,
    pub session_id: Option<Snowflake>,
}

/// Normalized voice-server assignment, published on
/// [`GatewayBridge::voice_server_updated`](crate::bridge::GatewayBridge::voice_server_updated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceServerUpdated {
    pub guild_id: Snowflake,
    pub server: VoiceServerInfo,
}

/// Normalized voice-state transition, published on
/// [`GatewayBridge::voice_state_updated`](crate::bridge::GatewayBridge::voice_state_updated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceStateUpdated {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    /// Whether the transition concerns the bot's own voice presence.
    pub is_self: bool,
    pub before: VoiceState,
    pub after: VoiceState,
}

/// Raw voice-server assignment as delivered by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVoiceServerUpdate {
    pub guild_id: Snowflake,
    pub token: String,
    pub endpoint: String,
}

/// One side of a raw voice-state transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceStateSnapshot {
    pub channel_id: Option<Snowflake>,
    pub session_id: Option<Snowflake>,
}

/// Raw voice-state transition. Either side may be missing when the platform
/// only knows one end of it.
#[derive(Debug, Clone)]
pub struct RawVoiceStateUpdate {
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    pub before: Option<VoiceStateSnapshot>,
    pub after: Option<VoiceStateSnapshot>,
}

/// Gateway directive joining, moving, or leaving voice in a guild.
///
/// `channel_id` serializes as an explicit `null` when absent -- that is the
/// disconnect directive, so it must not be skipped.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceStateUpdatePayload {
    pub guild_id: Snowflake,
    pub channel_id: Option<Snowflake>,
    pub self_mute: bool,
    pub self_deaf: bool,
}
