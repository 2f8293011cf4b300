use std::sync::Arc;

use async_trait::async_trait;
use audiolink::prelude::*;

struct PrintVoiceEvents;

#[async_trait]
impl Subscriber<VoiceServerUpdated> for PrintVoiceEvents {
    async fn on_event(&self, event: &VoiceServerUpdated) {
        println!(
            "voice server for guild {}: {}",
            event.guild_id, event.server.endpoint
        );
    }
}

#[async_trait]
impl Subscriber<VoiceStateUpdated> for PrintVoiceEvents {
    async fn on_event(&self, event: &VoiceStateUpdated) {
        println!(
            "voice state in guild {}: user {} -> {:?} (self: {})",
            event.guild_id, event.user_id, event.after.channel_id, event.is_self
        );
    }
}

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let token = std::env::var("FLUXER_TOKEN").expect("Set FLUXER_TOKEN to your bot token");
    let guild_id = std::env::var("GUILD_ID").expect("Set GUILD_ID");
    let channel_id = std::env::var("CHANNEL_ID").expect("Set CHANNEL_ID");

    let mut client = Client::builder(&token)
        // .api_url("http://localhost:48763/api/v1") this is for self hosted instances
        .build();

    let bridge = client.bridge();
    let printer = Arc::new(PrintVoiceEvents);
    bridge.voice_server_updated().subscribe(printer.clone());
    bridge.voice_state_updated().subscribe(printer);

    tokio::spawn(async move {
        if let Err(e) = client.start().await {
            eprintln!("Client error: {}", e);
        }
    });

    let cancel = CancellationToken::new();
    let identity = bridge
        .wait_for_ready(&cancel)
        .await
        .expect("gateway never became ready");
    println!(
        "Logged in as {} ({} shard(s))",
        identity.user_id, identity.shard_count
    );

    bridge
        .send_voice_update(guild_id.clone(), Some(channel_id.clone()), false, false, &cancel)
        .await
        .expect("voice join rejected");

    let members = bridge
        .channel_members(
            &MemberQuery {
                guild_id: guild_id.clone(),
                channel_id,
                include_bots: false,
            },
            &cancel,
        )
        .await
        .expect("member lookup cancelled");
    println!("{} human(s) in the channel", members.len());

    tokio::signal::ctrl_c().await.expect("ctrl-c");
    bridge
        .send_voice_update(guild_id, None, false, false, &cancel)
        .await
        .expect("voice leave rejected");
}
