//! Live reaction ledger
//!
//! Tracks every non-bot message observed during the process lifetime together
//! with the latest reaction counts reported by the gateway. Entries are never
//! evicted.

use crate::platform::{MessageId, ReactionTally, TrackedPost};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Gateway events that mutate the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A new message was posted
    MessageCreated(TrackedPost),
    /// A reaction was added to a message
    ReactionAdded {
        /// Message the reaction belongs to
        message_id: MessageId,
        /// Emoji in its display form
        emoji: String,
        /// Current total count for this emoji as reported by the platform
        count: u64,
        /// Whether the reacting user is a bot
        user_is_bot: bool,
    },
}

/// Tracked state of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The message as it was created
    pub post: TrackedPost,
    /// Latest reaction counts
    pub reactions: ReactionTally,
}

/// Process-scoped reaction ledger
#[derive(Debug, Default)]
pub struct ReactionLedger {
    entries: RwLock<HashMap<MessageId, LedgerEntry>>,
}

impl ReactionLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a gateway event
    ///
    /// Bot-authored messages and bot reactions are ignored. A reaction for a
    /// message the ledger never saw created is a no-op.
    pub async fn apply(&self, event: LedgerEvent) {
        match event {
            LedgerEvent::MessageCreated(post) => {
                if post.author_is_bot {
                    return;
                }
                let id = post.id;
                trace!(message_id = %id, "Tracking message");
                let entry = LedgerEntry {
                    post,
                    reactions: ReactionTally::new(),
                };
                self.entries.write().await.insert(id, entry);
            }
            LedgerEvent::ReactionAdded {
                message_id,
                emoji,
                count,
                user_is_bot,
            } => {
                if user_is_bot {
                    return;
                }
                let mut entries = self.entries.write().await;
                match entries.get_mut(&message_id) {
                    Some(entry) => {
                        debug!(
                            %message_id,
                            %emoji,
                            count,
                            has_image = entry.post.has_image(),
                            "Reaction count updated"
                        );
                        entry.reactions.set(emoji, count);
                    }
                    None => trace!(%message_id, "Reaction on untracked message ignored"),
                }
            }
        }
    }

    /// Returns true if the message is tracked
    pub async fn is_tracked(&self, message_id: MessageId) -> bool {
        self.entries.read().await.contains_key(&message_id)
    }

    #[cfg(test)]
    pub(crate) async fn get(&self, message_id: MessageId) -> Option<LedgerEntry> {
        self.entries.read().await.get(&message_id).cloned()
    }

    /// Number of tracked messages
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::post;

    fn reaction(message_id: u64, emoji: &str, count: u64) -> LedgerEvent {
        LedgerEvent::ReactionAdded {
            message_id: MessageId(message_id),
            emoji: emoji.to_string(),
            count,
            user_is_bot: false,
        }
    }

    #[tokio::test]
    async fn test_reaction_count_is_overwritten() {
        let ledger = ReactionLedger::new();
        ledger
            .apply(LedgerEvent::MessageCreated(post(1, Some("hi"), &[])))
            .await;
        ledger.apply(reaction(1, "👍", 3)).await;
        ledger.apply(reaction(1, "👍", 5)).await;

        let entry = ledger.get(MessageId(1)).await.expect("entry exists");
        assert_eq!(entry.reactions.get("👍"), Some(5));
        assert_eq!(entry.reactions.len(), 1);
        assert_eq!(entry.post.content.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_reaction_on_untracked_message_is_noop() {
        let ledger = ReactionLedger::new();
        ledger.apply(reaction(42, "👍", 1)).await;

        assert!(!ledger.is_tracked(MessageId(42)).await);
        assert_eq!(ledger.len().await, 0);
    }

    #[tokio::test]
    async fn test_bot_messages_and_reactions_are_ignored() {
        let ledger = ReactionLedger::new();
        let mut bot_post = post(7, Some("beep"), &[]);
        bot_post.author_is_bot = true;
        ledger.apply(LedgerEvent::MessageCreated(bot_post)).await;
        assert!(!ledger.is_tracked(MessageId(7)).await);

        ledger
            .apply(LedgerEvent::MessageCreated(post(8, None, &[])))
            .await;
        ledger
            .apply(LedgerEvent::ReactionAdded {
                message_id: MessageId(8),
                emoji: "🤖".to_string(),
                count: 1,
                user_is_bot: true,
            })
            .await;
        let entry = ledger.get(MessageId(8)).await.expect("entry exists");
        assert!(entry.reactions.is_empty());
    }

    #[tokio::test]
    async fn test_message_created_resets_reactions() {
        let ledger = ReactionLedger::new();
        ledger
            .apply(LedgerEvent::MessageCreated(post(1, None, &[])))
            .await;
        ledger.apply(reaction(1, "🔥", 2)).await;
        ledger
            .apply(LedgerEvent::MessageCreated(post(1, None, &[])))
            .await;

        let entry = ledger.get(MessageId(1)).await.expect("entry exists");
        assert!(entry.reactions.is_empty());
        assert_eq!(ledger.len().await, 1);
    }
}
