use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::warn;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};
use url::Url;

use crate::bridge::GatewayBridge;
use crate::error::Error;
use crate::gateway::{GatewayTransport, Opcode};
use crate::http::Http;
use crate::model::voice::{RawVoiceServerUpdate, RawVoiceStateUpdate, VoiceStateSnapshot};
use crate::model::{Ready, Snowflake};

const DEFAULT_API_URL: &str = "https://api.fluxer.app/v1";

/// Outbound half of one gateway connection, handed to the bridge as its
/// transport. The sender is attached once the socket is up and detached when
/// it closes; in between, [`send_payload`](GatewayTransport::send_payload)
/// fails with [`Error::ConnectionUnavailable`].
pub struct GatewaySession {
    http: Arc<Http>,
    sender: Mutex<Option<mpsc::Sender<String>>>,
}

impl GatewaySession {
    fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            sender: Mutex::new(None),
        }
    }

    async fn attach(&self, sender: mpsc::Sender<String>) {
        *self.sender.lock().await = Some(sender);
    }

    async fn detach(&self) {
        *self.sender.lock().await = None;
    }
}

#[async_trait]
impl GatewayTransport for GatewaySession {
    async fn get_channel(&self, channel_id: &Snowflake) -> Result<Option<crate::model::Channel>, Error> {
        self.http.get_channel(channel_id).await
    }

    async fn send_payload(
        &self,
        guild_id: &Snowflake,
        opcode: Opcode,
        payload: Value,
    ) -> Result<(), Error> {
        let frame = serde_json::json!({ "op": opcode as u8, "d": payload }).to_string();

        let sender = self.sender.lock().await.clone();
        let Some(sender) = sender else {
            return Err(Error::ConnectionUnavailable {
                guild_id: guild_id.clone(),
            });
        };

        sender.send(frame).await.map_err(|_| Error::ConnectionUnavailable {
            guild_id: guild_id.clone(),
        })
    }
}

pub struct ClientBuilder {
    token: String,
    api_url: String,
}

impl ClientBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn build(self) -> Client {
        let http = Arc::new(Http::new(&self.token, self.api_url));
        let session = Arc::new(GatewaySession::new(http.clone()));
        let bridge = Arc::new(GatewayBridge::new(session.clone()));
        Client {
            http,
            session,
            bridge,
        }
    }
}

pub struct Client {
    pub(crate) http: Arc<Http>,
    session: Arc<GatewaySession>,
    bridge: Arc<GatewayBridge>,
}

impl Client {
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    /// The bridge fed by this client's gateway connection. Hand it to the
    /// audio-control runtime.
    pub fn bridge(&self) -> Arc<GatewayBridge> {
        self.bridge.clone()
    }

    pub async fn start(&mut self) -> Result<(), Error> {
        let gateway_url = self.http.get_gateway().await?;
        let mut ws_url = Url::parse(&gateway_url)
            .map_err(|e| Error::Api(format!("invalid gateway url: {}", e)))?;
        ws_url.set_query(Some("v=1&encoding=json"));

        let (ws_stream, _) = connect_async(ws_url.as_str()).await?;
        let (write, mut read) = ws_stream.split();
        let write = Arc::new(Mutex::new(write));

        let (gateway_tx, mut gateway_rx) = mpsc::channel::<String>(32);
        self.session.attach(gateway_tx).await;
        let write_fwd = write.clone();
        tokio::spawn(async move {
            while let Some(msg) = gateway_rx.recv().await {
                let mut guard = write_fwd.lock().await;
                if guard.send(WsMessage::Text(msg.into())).await.is_err() {
                    break;
                }
            }
        });

        let token = self.http.get_token().to_string();
        let identify = serde_json::json!({
            "op": Opcode::Identify as u8,
            "d": {
                "token": token,
                "intents": 32767,
                "properties": {
                    "os": "linux",
                    "browser": "audiolink",
                    "device": "audiolink"
                }
            }
        });
        write
            .lock()
            .await
            .send(WsMessage::Text(identify.to_string().into()))
            .await?;

        // Last seen snapshot per (guild, user); the source of `before` when
        // the platform only ships the new state.
        let mut voice_states: HashMap<(Snowflake, Snowflake), VoiceStateSnapshot> = HashMap::new();

        let result = loop {
            let Some(msg_result) = read.next().await else {
                break Ok(());
            };
            let msg = match msg_result {
                Ok(msg) => msg,
                Err(e) => break Err(Error::WebSocket(e)),
            };

            match msg {
                WsMessage::Text(text) => {
                    let payload: Value = match serde_json::from_str(text.as_str()) {
                        Ok(payload) => payload,
                        Err(e) => break Err(Error::Json(e)),
                    };
                    let op = payload["op"].as_u64().unwrap_or(255);

                    match op {
                        10 => {
                            let interval_ms = payload["d"]["heartbeat_interval"]
                                .as_u64()
                                .unwrap_or(41_250);

                            let write_hb = write.clone();
                            tokio::spawn(async move {
                                // First beat after a random fraction of the
                                // interval, as the gateway protocol asks.
                                let jitter =
                                    (interval_ms as f64 * rand::random::<f64>()) as u64;
                                tokio::time::sleep(std::time::Duration::from_millis(jitter))
                                    .await;

                                let mut ticker = tokio::time::interval(
                                    std::time::Duration::from_millis(interval_ms),
                                );
                                loop {
                                    ticker.tick().await;
                                    let heartbeat = serde_json::json!({
                                        "op": Opcode::Heartbeat as u8,
                                        "d": null
                                    });
                                    let mut guard = write_hb.lock().await;
                                    if guard
                                        .send(WsMessage::Text(heartbeat.to_string().into()))
                                        .await
                                        .is_err()
                                    {
                                        break;
                                    }
                                }
                            });
                        }

                        0 => {
                            let event_type = payload["t"].as_str().unwrap_or("");
                            let data = payload["d"].clone();
                            // Voice events are dispatched inline: the serial
                            // read loop is what keeps per-guild arrival order
                            // intact all the way to the subscribers.
                            self.dispatch(event_type, data, &mut voice_states).await;
                        }

                        _ => {}
                    }
                }

                WsMessage::Close(_) => break Err(Error::ConnectionClosed),

                _ => {}
            }
        };

        self.session.detach().await;
        result
    }

    async fn dispatch(
        &self,
        event_type: &str,
        data: Value,
        voice_states: &mut HashMap<(Snowflake, Snowflake), VoiceStateSnapshot>,
    ) {
        match event_type {
            "READY" => match serde_json::from_value::<Ready>(data) {
                Ok(ready) => {
                    let shard_count = ready.shard.map(|s| s[1]).unwrap_or(1).max(1);
                    self.bridge.on_guild_data_ready(ready.user.id, shard_count);
                }
                Err(e) => warn!("malformed READY payload: {}", e),
            },

            "VOICE_SERVER_UPDATE" => match serde_json::from_value::<RawVoiceServerUpdate>(data) {
                Ok(update) => self.bridge.on_voice_server_updated(update).await,
                Err(e) => warn!("malformed VOICE_SERVER_UPDATE payload: {}", e),
            },

            "VOICE_STATE_UPDATE" => {
                let guild_id = data["guild_id"].as_str().map(str::to_string);
                let Some(user_id) = data["user_id"].as_str().map(str::to_string) else {
                    warn!("VOICE_STATE_UPDATE without a user id, ignoring");
                    return;
                };

                let after = VoiceStateSnapshot {
                    channel_id: data["channel_id"].as_str().map(str::to_string),
                    session_id: data["session_id"].as_str().map(str::to_string),
                };
                let before = guild_id.as_ref().and_then(|guild| {
                    let key = (guild.clone(), user_id.clone());
                    if after.channel_id.is_none() {
                        voice_states.remove(&key)
                    } else {
                        voice_states.insert(key, after.clone())
                    }
                });

                self.bridge
                    .on_voice_state_updated(RawVoiceStateUpdate {
                        guild_id,
                        user_id,
                        before,
                        after: Some(after),
                    })
                    .await;
            }

            _ => {}
        }
    }
}
