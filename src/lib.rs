pub mod bridge;
pub mod client;
pub mod error;
pub mod event;
pub mod gateway;
pub mod http;
pub mod model;
pub mod ready;

pub mod prelude {
    pub use crate::bridge::GatewayBridge;
    pub use crate::client::{Client, ClientBuilder, GatewaySession};
    pub use crate::error::Error;
    pub use crate::event::{EventStream, Subscriber, Subscription};
    pub use crate::gateway::{GatewayTransport, Opcode};
    pub use crate::model::voice::*;
    pub use crate::model::*;
    pub use crate::ready::ReadinessGate;
    pub use tokio_util::sync::CancellationToken;
}
