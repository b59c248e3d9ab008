//! `ChatPlatform` over serenity
//!
//! Translates the sorter's platform calls into Discord HTTP requests and maps
//! serenity errors onto [`PlatformError`].

use crate::bot::purge::PurgePlan;
use async_trait::async_trait;
use reaction_sorter_core::platform::{
    Attachment, ChannelId, ChatPlatform, GuildId, MessageId, PlatformError, TrackedPost,
};
use serenity::all::{
    ChannelId as DiscordChannelId, ChannelType, CreateChannel, GetMessages,
    GuildId as DiscordGuildId, Http, Message, MessageId as DiscordMessageId, ReactionType,
};
use serenity::model::ModelError;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Discord implementation of [`ChatPlatform`]
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    /// Wrap a serenity HTTP client
    #[must_use]
    pub const fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn http(&self) -> &Http {
        &self.http
    }

    async fn fetch_page(
        &self,
        channel: DiscordChannelId,
        before: Option<DiscordMessageId>,
        limit: u8,
    ) -> Result<Vec<Message>, PlatformError> {
        let mut builder = GetMessages::new().limit(limit);
        if let Some(before) = before {
            builder = builder.before(before);
        }
        channel
            .messages(self.http(), builder)
            .await
            .map_err(map_error)
    }
}

/// Convert a Discord message into the sorter's data model.
#[must_use]
pub fn tracked_post(msg: &Message) -> TrackedPost {
    TrackedPost {
        id: MessageId(msg.id.get()),
        author_is_bot: msg.author.bot,
        content: (!msg.content.is_empty()).then(|| msg.content.clone()),
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment::new(a.url.clone(), a.content_type.as_deref()))
            .collect(),
        reactions: msg
            .reactions
            .iter()
            .map(|r| (r.reaction_type.to_string(), r.count))
            .collect(),
    }
}

/// Map a serenity error onto the sorter's closed error set.
#[must_use]
pub fn map_error(e: serenity::Error) -> PlatformError {
    match &e {
        serenity::Error::Http(http) => match http.status_code().map(|s| s.as_u16()) {
            Some(401 | 403) => PlatformError::PermissionDenied(e.to_string()),
            Some(404) => PlatformError::NotFound(e.to_string()),
            _ => PlatformError::RequestFailed(e.to_string()),
        },
        serenity::Error::Model(ModelError::InvalidPermissions { .. }) => {
            PlatformError::PermissionDenied(e.to_string())
        }
        _ => PlatformError::RequestFailed(e.to_string()),
    }
}

fn to_channel(id: ChannelId) -> DiscordChannelId {
    DiscordChannelId::new(id.0)
}

fn to_guild(id: GuildId) -> DiscordGuildId {
    DiscordGuildId::new(id.0)
}

fn to_message(id: MessageId) -> DiscordMessageId {
    DiscordMessageId::new(id.0)
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn history_page(
        &self,
        channel: ChannelId,
        before: Option<MessageId>,
        limit: u8,
    ) -> Result<Vec<TrackedPost>, PlatformError> {
        let page = self
            .fetch_page(to_channel(channel), before.map(to_message), limit)
            .await?;
        Ok(page.iter().map(tracked_post).collect())
    }

    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, PlatformError> {
        let channels = to_guild(guild)
            .channels(self.http())
            .await
            .map_err(map_error)?;
        Ok(channels
            .values()
            .filter(|c| c.kind == ChannelType::Text && c.name == name)
            .min_by_key(|c| c.position)
            .map(|c| ChannelId(c.id.get())))
    }

    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<ChannelId, PlatformError> {
        let builder = CreateChannel::new(name).kind(ChannelType::Text);
        let channel = to_guild(guild)
            .create_channel(self.http(), builder)
            .await
            .map_err(map_error)?;
        info!(channel_id = %channel.id, name, "Created text channel");
        Ok(ChannelId(channel.id.get()))
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<MessageId, PlatformError> {
        let sent = to_channel(channel)
            .say(self.http(), text)
            .await
            .map_err(map_error)?;
        Ok(MessageId(sent.id.get()))
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        let reaction = emoji
            .parse::<ReactionType>()
            .map_err(|e| PlatformError::RequestFailed(format!("Invalid emoji {emoji}: {e}")))?;
        to_channel(channel)
            .create_reaction(self.http(), to_message(message), reaction)
            .await
            .map_err(map_error)
    }

    async fn purge_channel(&self, channel: ChannelId) -> Result<usize, PlatformError> {
        let channel = to_channel(channel);
        let limit = reaction_sorter_core::collector::HISTORY_PAGE_SIZE;

        let mut targets = Vec::new();
        let mut before = None;
        loop {
            let page = self.fetch_page(channel, before, limit).await?;
            let Some(oldest) = page.last() else {
                break;
            };
            before = Some(oldest.id);
            targets.extend(page.iter().map(|m| (m.id, m.timestamp.unix_timestamp())));
            if page.len() < usize::from(limit) {
                break;
            }
        }

        let plan = PurgePlan::new(targets, chrono::Utc::now().timestamp());
        if plan.is_empty() {
            debug!("Channel already empty");
            return Ok(0);
        }
        debug!(
            total = plan.len(),
            batches = plan.bulk.len(),
            singles = plan.single.len(),
            "Purge planned"
        );

        let mut deleted = 0;
        for batch in &plan.bulk {
            self.http
                .delete_messages(channel, &json!({ "messages": batch }), None)
                .await
                .map_err(map_error)?;
            deleted += batch.len();
        }
        for id in &plan.single {
            self.http
                .delete_message(channel, *id, None)
                .await
                .map_err(map_error)?;
            deleted += 1;
        }
        Ok(deleted)
    }

    async fn find_guild_by_name(&self, name: &str) -> Result<Option<GuildId>, PlatformError> {
        let guilds = self.http.get_guilds(None, None).await.map_err(map_error)?;
        Ok(guilds
            .into_iter()
            .find(|g| g.name == name)
            .map(|g| GuildId(g.id.get())))
    }

    async fn system_channel(&self, guild: GuildId) -> Result<Option<ChannelId>, PlatformError> {
        let partial = to_guild(guild)
            .to_partial_guild(self.http())
            .await
            .map_err(map_error)?;
        Ok(partial.system_channel_id.map(|c| ChannelId(c.get())))
    }
}
