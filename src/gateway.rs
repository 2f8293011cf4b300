use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::model::{Channel, Snowflake};

/// Gateway opcodes this library sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Heartbeat = 1,
    Identify = 2,
    VoiceStateUpdate = 4,
}

/// The seam between the bridge and whatever owns the actual gateway
/// connection. [`GatewaySession`](crate::client::GatewaySession) is the
/// in-tree implementation; tests substitute their own.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Looks up a channel together with its current member list. `Ok(None)`
    /// when the channel does not exist or is not visible to the bot.
    async fn get_channel(&self, channel_id: &Snowflake) -> Result<Option<Channel>, Error>;

    /// Sends one payload over the gateway session serving `guild_id`.
    /// Fails with [`Error::ConnectionUnavailable`] when no session is live.
    async fn send_payload(
        &self,
        guild_id: &Snowflake,
        opcode: Opcode,
        payload: Value,
    ) -> Result<(), Error>;
}
