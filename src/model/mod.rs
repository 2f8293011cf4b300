pub mod voice;

use serde::{Deserialize, Serialize};

pub type Snowflake = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    #[serde(default)]
    pub username: String,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: Option<u8>,
    pub guild_id: Option<Snowflake>,
    pub name: Option<String>,
    pub bitrate: Option<u64>,
    pub user_limit: Option<u64>,
    /// Users currently connected, populated for voice channels.
    #[serde(default)]
    pub members: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ready {
    pub v: Option<u64>,
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    pub user: User,
    pub guilds: Option<Vec<UnavailableGuild>>,
    pub shard: Option<[u64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    pub unavailable: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayBotResponse {
    pub url: String,
}

/// Who this client is on the platform.
///
/// Built exactly once, when the gateway first reports its guild data as
/// downloaded, and never mutated afterwards. Every consumer of
/// [`ReadinessGate`](crate::ready::ReadinessGate) sees this same snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Human-readable label of the client library driving the gateway.
    pub label: String,
    /// The bot's own user id.
    pub user_id: Snowflake,
    /// Number of connected shards.
    pub shard_count: u64,
}

/// Request parameters for a voice channel membership lookup.
#[derive(Debug, Clone, Default)]
pub struct MemberQuery {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    /// Include automated accounts in the result. Off by default.
    pub include_bots: bool,
}
