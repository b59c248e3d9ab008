//! Gateway event handler
//!
//! Feeds message and reaction events into the [`ReactionLedger`] and runs
//! chat commands against a [`SerenityPlatform`].

use async_trait::async_trait;
use crate::bot::platform::tracked_post;
use crate::bot::{PermissionDenialCache, SerenityPlatform};
use crate::config::BotSettings;
use reaction_sorter_core::commands::{self, Command, CommandContext, CommandOutcome};
use reaction_sorter_core::ledger::{LedgerEvent, ReactionLedger};
use reaction_sorter_core::platform::{ChannelId, ChatPlatform, GuildId, MessageId};
use serenity::all::{Context, EventHandler, Message, Reaction, Ready, ShardManager};
use serenity::prelude::TypeMapKey;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Type map key holding the client's shard manager, used for latency reads
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// Serenity event handler for the sorter bot
pub struct Handler {
    settings: Arc<BotSettings>,
    ledger: Arc<ReactionLedger>,
    denials: Arc<PermissionDenialCache>,
    greeted: AtomicBool,
}

impl Handler {
    /// Create a handler sharing the given ledger and denial cache
    #[must_use]
    pub fn new(
        settings: Arc<BotSettings>,
        ledger: Arc<ReactionLedger>,
        denials: Arc<PermissionDenialCache>,
    ) -> Self {
        Self {
            settings,
            ledger,
            denials,
            greeted: AtomicBool::new(false),
        }
    }

    async fn handle_command(&self, ctx: &Context, msg: &Message, command: Command) {
        let platform = SerenityPlatform::new(ctx.http.clone());
        let command_ctx = CommandContext {
            guild: msg.guild_id.map(|g| GuildId(g.get())),
            channel: ChannelId(msg.channel_id.get()),
            invoker_can_manage_messages: msg
                .author_permissions(&ctx.cache)
                .is_some_and(|p| p.manage_messages()),
            latency: shard_latency(ctx).await,
        };

        match commands::execute(&platform, &self.settings.sorter, &command_ctx, command).await {
            Ok(CommandOutcome::Completed) => {}
            Ok(CommandOutcome::PermissionRequired) => {
                self.deny(&platform, command_ctx.channel, msg).await;
            }
            Err(e) => error!(command = command.name(), "Failed to send reply: {e}"),
        }
    }

    async fn deny(&self, platform: &SerenityPlatform, channel: ChannelId, msg: &Message) {
        let user_id = msg.author.id.get();
        if !self.denials.should_send(user_id, &msg.author.name).await {
            return;
        }
        match platform
            .send_message(channel, commands::PERMISSION_REQUIRED)
            .await
        {
            Ok(_) => self.denials.mark_sent(user_id).await,
            Err(e) => warn!(user_id, "Failed to send permission reply: {e}"),
        }
    }

    async fn track_reaction(&self, ctx: &Context, reaction: &Reaction) -> serenity::Result<()> {
        let message_id = MessageId(reaction.message_id.get());
        if !self.ledger.is_tracked(message_id).await {
            return Ok(());
        }

        let user_is_bot = match &reaction.member {
            Some(member) => member.user.bot,
            None => reaction.user(ctx).await?.bot,
        };
        if user_is_bot {
            return Ok(());
        }

        let message = reaction.message(ctx).await?;
        let count = message
            .reactions
            .iter()
            .find(|r| r.reaction_type == reaction.emoji)
            .map_or(1, |r| r.count);

        self.ledger
            .apply(LedgerEvent::ReactionAdded {
                message_id,
                emoji: reaction.emoji.to_string(),
                count,
                user_is_bot,
            })
            .await;
        Ok(())
    }
}

async fn shard_latency(ctx: &Context) -> Option<Duration> {
    let manager = ctx.data.read().await.get::<ShardManagerContainer>().cloned()?;
    let runners = manager.runners.lock().await;
    runners.get(&ctx.shard_id).and_then(|runner| runner.latency)
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let tracked = self.ledger.len().await;
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            tracked,
            "Logged in"
        );

        // Reconnects fire `ready` again
        if self.greeted.swap(true, Ordering::SeqCst) {
            debug!("Greeting already sent, skipping");
            return;
        }
        let platform = SerenityPlatform::new(ctx.http.clone());
        commands::greet(&platform, &self.settings.sorter).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        self.ledger
            .apply(LedgerEvent::MessageCreated(tracked_post(&msg)))
            .await;

        if let Some(command) = Command::parse(&msg.content, &self.settings.sorter.command_prefix) {
            self.handle_command(&ctx, &msg, command).await;
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        if let Err(e) = self.track_reaction(&ctx, &reaction).await {
            error!(
                message_id = %reaction.message_id,
                "An error occurred while processing reaction: {e}"
            );
        }
    }
}
