//! Chat commands
//!
//! Parses prefixed chat messages into [`Command`]s and runs them against a
//! [`ChatPlatform`], reporting outcomes back to the invoking channel.

use crate::config::SorterSettings;
use crate::platform::{ChannelId, ChatPlatform, GuildId, PlatformError};
use crate::republish::{sort_channel, RepublishOutcome, SortError};
use crate::utils::round_millis;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Acknowledgement sent when a sort starts
pub const SORT_ACK: &str = "Fetching and sorting image posts by reactions...";
/// Reply when the channel has no image posts
pub const NOTHING_TO_SORT: &str = "No image posts found to sort!";
/// Reply when the bot may not read the channel history
pub const HISTORY_FORBIDDEN: &str =
    "I don't have permission to read message history in this channel.";
/// Acknowledgement sent when a purge starts
pub const PURGE_ACK: &str = "Deleting all messages in this channel...";
/// Reply when the bot may not delete messages
pub const PURGE_FORBIDDEN: &str = "I don't have permission to delete messages in this channel.";
/// Reply when the invoker lacks the manage-messages permission
pub const PERMISSION_REQUIRED: &str =
    "You need the Manage Messages permission to use this command.";
/// Reply when a server-only command is used in a direct message
pub const GUILD_ONLY: &str = "This command only works inside a server.";

/// Supported commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Rank image posts by reactions and republish them
    Sort,
    /// Delete every message in the channel
    DeleteAll,
    /// Report gateway latency
    Ping,
    /// List available commands
    Help,
}

impl Command {
    /// All commands in help order
    pub const ALL: [Self; 4] = [Self::Sort, Self::DeleteAll, Self::Ping, Self::Help];

    /// Name typed after the prefix
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sort => "sort",
            Self::DeleteAll => "delete_all",
            Self::Ping => "ping",
            Self::Help => "help",
        }
    }

    /// One-line description shown by `help`
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Sort => "Sorts image posts in the current channel by reactions and adds the original reactions to the sorted posts.",
            Self::DeleteAll => "Deletes all posts in the current channel. Requires Manage Messages.",
            Self::Ping => "Checks the bot's latency.",
            Self::Help => "Displays a list of available commands.",
        }
    }

    /// Parse a chat message into a command.
    ///
    /// Only the first word after the prefix is considered; anything after it
    /// is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use reaction_sorter_core::commands::Command;
    ///
    /// assert_eq!(Command::parse("!sort", "!"), Some(Command::Sort));
    /// assert_eq!(Command::parse("!delete_all now", "!"), Some(Command::DeleteAll));
    /// assert_eq!(Command::parse("sort", "!"), None);
    /// assert_eq!(Command::parse("!unknown", "!"), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix(prefix)?;
        let name = rest.split_whitespace().next()?;
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Where and by whom a command was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    /// Server the command was sent in, `None` for direct messages
    pub guild: Option<GuildId>,
    /// Channel the command was sent in
    pub channel: ChannelId,
    /// Whether the invoker holds the manage-messages permission in `channel`
    pub invoker_can_manage_messages: bool,
    /// Latest measured gateway heartbeat latency
    pub latency: Option<Duration>,
}

/// What happened to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command ran and its result was reported
    Completed,
    /// The invoker lacks a required permission; nothing was done or sent
    PermissionRequired,
}

/// Render the `help` reply.
#[must_use]
pub fn help_text(prefix: &str) -> String {
    let mut text = String::from("Available commands:");
    for command in Command::ALL {
        text.push_str(&format!(
            "\n- **{prefix}{}:** {}",
            command.name(),
            command.description()
        ));
    }
    text
}

/// Render the `ping` reply.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use reaction_sorter_core::commands::ping_text;
///
/// assert_eq!(ping_text(Some(Duration::from_millis(42))), "Pong! Latency: 42ms");
/// assert_eq!(ping_text(None), "Pong! Latency: not measured yet");
/// ```
#[must_use]
pub fn ping_text(latency: Option<Duration>) -> String {
    latency.map_or_else(
        || "Pong! Latency: not measured yet".to_string(),
        |l| format!("Pong! Latency: {}ms", round_millis(l)),
    )
}

/// Render the startup greeting.
#[must_use]
pub fn greeting_text(guild_name: &str, prefix: &str) -> String {
    format!(
        "**Hello {guild_name} server!**\n\
         I'm ready to assist you with some helpful commands:\n\
         - **{prefix}help:** Displays a list of available commands.\n"
    )
}

/// Run a command and report its outcome to the invoking channel.
///
/// # Errors
///
/// Returns a [`PlatformError`] only when a reply itself cannot be sent.
#[instrument(skip(platform, settings, ctx), fields(channel = %ctx.channel))]
pub async fn execute<P>(
    platform: &P,
    settings: &SorterSettings,
    ctx: &CommandContext,
    command: Command,
) -> Result<CommandOutcome, PlatformError>
where
    P: ChatPlatform + ?Sized,
{
    info!(command = command.name(), "Executing command");
    match command {
        Command::Sort => sort(platform, settings, ctx).await?,
        Command::DeleteAll => {
            if !ctx.invoker_can_manage_messages {
                warn!("delete_all rejected: invoker lacks manage-messages");
                return Ok(CommandOutcome::PermissionRequired);
            }
            delete_all(platform, ctx).await?;
        }
        Command::Ping => {
            platform
                .send_message(ctx.channel, &ping_text(ctx.latency))
                .await?;
        }
        Command::Help => {
            platform
                .send_message(ctx.channel, &help_text(&settings.command_prefix))
                .await?;
        }
    }
    Ok(CommandOutcome::Completed)
}

async fn sort<P>(
    platform: &P,
    settings: &SorterSettings,
    ctx: &CommandContext,
) -> Result<(), PlatformError>
where
    P: ChatPlatform + ?Sized,
{
    let Some(guild) = ctx.guild else {
        platform.send_message(ctx.channel, GUILD_ONLY).await?;
        return Ok(());
    };

    platform.send_message(ctx.channel, SORT_ACK).await?;

    let destination = settings.sorted_channel_name.as_str();
    let reply = match sort_channel(platform, guild, ctx.channel, destination).await {
        Ok(RepublishOutcome::NothingToSort) => NOTHING_TO_SORT.to_string(),
        Ok(RepublishOutcome::Published(report)) => {
            format!(
                "Sorted {} image posts into #{destination}.",
                report.published
            )
        }
        Err(SortError::Collect(PlatformError::PermissionDenied(e))) => {
            warn!("History read forbidden: {e}");
            HISTORY_FORBIDDEN.to_string()
        }
        Err(SortError::Collect(e)) => {
            error!("History read failed: {e}");
            format!("An error occurred while fetching messages: {e}")
        }
        Err(SortError::Lookup { source, .. }) => {
            error!("Destination lookup failed: {source}");
            format!("Failed to look up {destination} channel: {source}")
        }
        Err(SortError::Destination { source, .. }) => {
            error!("Destination creation failed: {source}");
            format!("Failed to create {destination} channel: {source}")
        }
        Err(e @ SortError::Publish(_)) => {
            error!("{e}");
            e.to_string()
        }
    };

    platform.send_message(ctx.channel, &reply).await?;
    Ok(())
}

async fn delete_all<P>(platform: &P, ctx: &CommandContext) -> Result<(), PlatformError>
where
    P: ChatPlatform + ?Sized,
{
    if ctx.guild.is_none() {
        platform.send_message(ctx.channel, GUILD_ONLY).await?;
        return Ok(());
    }

    platform.send_message(ctx.channel, PURGE_ACK).await?;

    let reply = match platform.purge_channel(ctx.channel).await {
        Ok(deleted) => {
            info!(deleted, "Channel purged");
            format!("Deleted {deleted} messages.")
        }
        Err(PlatformError::PermissionDenied(e)) => {
            warn!("Purge forbidden: {e}");
            PURGE_FORBIDDEN.to_string()
        }
        Err(e) => {
            error!("Purge failed: {e}");
            format!("Failed to delete messages: {e}")
        }
    };

    platform.send_message(ctx.channel, &reply).await?;
    Ok(())
}

/// Post the greeting to the configured server's system channel.
///
/// A missing server or system channel is logged and skipped; so is a failed
/// send. Nothing here is fatal.
#[instrument(skip(platform, settings))]
pub async fn greet<P>(platform: &P, settings: &SorterSettings)
where
    P: ChatPlatform + ?Sized,
{
    let name = settings.greeting_guild.as_str();
    let guild = match platform.find_guild_by_name(name).await {
        Ok(Some(guild)) => guild,
        Ok(None) => {
            warn!("Guild '{name}' not found.");
            return;
        }
        Err(e) => {
            warn!("Failed to look up guild '{name}': {e}");
            return;
        }
    };

    let channel = match platform.system_channel(guild).await {
        Ok(Some(channel)) => channel,
        Ok(None) => {
            warn!("System channel not found.");
            return;
        }
        Err(e) => {
            warn!("Failed to look up system channel of '{name}': {e}");
            return;
        }
    };

    let text = greeting_text(name, &settings.command_prefix);
    match platform.send_message(channel, &text).await {
        Ok(_) => info!(%guild, %channel, "Greeting sent"),
        Err(e) => error!("Failed to send message to system channel: {e}"),
    }
}
