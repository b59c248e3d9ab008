//! Flood protection for permission denials
//!
//! Users without the manage-messages permission who keep invoking
//! `delete_all` get the "permission required" reply only once per cooldown
//! period. Every attempt is still logged (with throttling).

use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache of users who recently received a "permission required" reply
#[derive(Clone)]
pub struct PermissionDenialCache {
    /// user_id -> () with TTL equal to the cooldown
    cache: Cache<u64, ()>,
    silenced_count: Arc<AtomicU64>,
}

impl PermissionDenialCache {
    /// Creates a new `PermissionDenialCache`
    ///
    /// # Arguments
    ///
    /// * `cooldown_secs` - Seconds between replies to the same user
    /// * `max_capacity` - Maximum number of users remembered
    ///
    /// # Examples
    ///
    /// ```
    /// use reaction_sorter_transport_discord::bot::PermissionDenialCache;
    ///
    /// let cache = PermissionDenialCache::new(1200, 10_000);
    /// assert_eq!(cache.silenced_count(), 0);
    /// ```
    #[must_use]
    pub fn new(cooldown_secs: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(cooldown_secs))
            .build();

        Self {
            cache,
            silenced_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns `true` if the user should get a reply now.
    ///
    /// Only every 100th silenced attempt is logged.
    pub async fn should_send(&self, user_id: u64, user_name: &str) -> bool {
        if self.cache.get(&user_id).await.is_none() {
            return true;
        }

        let count = self.silenced_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count.is_multiple_of(100) {
            debug!(
                "Silenced {} permission denials (recent: user {} - {})",
                count, user_id, user_name
            );
        }

        false
    }

    /// Start the cooldown for a user after a reply was delivered
    pub async fn mark_sent(&self, user_id: u64) {
        self.cache.insert(user_id, ()).await;
    }

    /// Total number of silenced attempts
    #[must_use]
    pub fn silenced_count(&self) -> u64 {
        self.silenced_count.load(Ordering::Relaxed)
    }
}
