use crate::bot::handler::ShardManagerContainer;
use crate::bot::{Handler, PermissionDenialCache};
use crate::config::{get_denial_cache_max_size, get_denial_cooldown, BotSettings};
use reaction_sorter_core::ledger::ReactionLedger;
use serenity::all::{Client, GatewayIntents};
use std::sync::Arc;
use tracing::{error, info};

/// Gateway intents needed for messages, reactions and message content
#[must_use]
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Run the Discord transport runtime.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the gateway connection
/// fails.
pub async fn run_bot(settings: Arc<BotSettings>) -> anyhow::Result<()> {
    let ledger = Arc::new(ReactionLedger::new());
    let denials = init_denial_cache();
    let handler = Handler::new(settings.clone(), ledger, denials);

    let mut client = Client::builder(&settings.discord.discord_token, intents())
        .event_handler(handler)
        .await?;

    {
        let mut data = client.data.write().await;
        data.insert::<ShardManagerContainer>(client.shard_manager.clone());
    }

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {e}");
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    info!("Bot is running...");
    client.start().await?;
    Ok(())
}

fn init_denial_cache() -> Arc<PermissionDenialCache> {
    let cooldown = get_denial_cooldown();
    let max_size = get_denial_cache_max_size();

    info!(
        "Initializing PermissionDenialCache (cooldown: {}s, max_size: {})",
        cooldown, max_size
    );

    Arc::new(PermissionDenialCache::new(cooldown, max_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_cover_reactions_and_content() {
        let intents = intents();
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGE_REACTIONS));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(!intents.contains(GatewayIntents::GUILD_PRESENCES));
    }
}
