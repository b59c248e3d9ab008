//! Purge planning
//!
//! Discord bulk-deletes at most 100 messages per call, needs at least two ids
//! per call and refuses messages older than 14 days. Everything the bulk
//! endpoint cannot take is deleted one by one.

/// Maximum ids per bulk delete call
pub const BULK_DELETE_MAX: usize = 100;
/// Oldest message age (seconds) still accepted by bulk delete, minus one minute of slack
pub const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60 - 60;

/// How a set of messages will be deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgePlan<Id> {
    /// Batches for the bulk endpoint, each holding 2 to 100 ids
    pub bulk: Vec<Vec<Id>>,
    /// Ids deleted individually
    pub single: Vec<Id>,
}

impl<Id: Copy> PurgePlan<Id> {
    /// Split messages into bulk batches and single deletions.
    ///
    /// `messages` yields `(id, created_at_unix_secs)`; `now` is the current
    /// unix time in seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use reaction_sorter_transport_discord::bot::purge::PurgePlan;
    ///
    /// let now = 2_000_000_000;
    /// let plan = PurgePlan::new(vec![(1u64, now - 10), (2, now - 20), (3, 0)], now);
    /// assert_eq!(plan.bulk, vec![vec![1, 2]]);
    /// assert_eq!(plan.single, vec![3]);
    /// ```
    pub fn new(messages: impl IntoIterator<Item = (Id, i64)>, now: i64) -> Self {
        let (fresh, stale): (Vec<(Id, i64)>, Vec<(Id, i64)>) = messages
            .into_iter()
            .partition(|(_, created)| now.saturating_sub(*created) < BULK_DELETE_MAX_AGE_SECS);

        let mut bulk: Vec<Vec<Id>> = fresh
            .chunks(BULK_DELETE_MAX)
            .map(|chunk| chunk.iter().map(|(id, _)| *id).collect())
            .collect();
        let mut single: Vec<Id> = stale.into_iter().map(|(id, _)| id).collect();

        if bulk.last().is_some_and(|batch| batch.len() < 2) {
            single.extend(bulk.pop().unwrap_or_default());
        }

        Self { bulk, single }
    }

    /// Total number of messages covered by the plan
    #[must_use]
    pub fn len(&self) -> usize {
        self.bulk.iter().map(Vec::len).sum::<usize>() + self.single.len()
    }

    /// Returns true if there is nothing to delete
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_fresh_messages_are_batched_by_hundred() {
        let messages: Vec<(u64, i64)> = (0..250).map(|id| (id, NOW - 60)).collect();

        let plan = PurgePlan::new(messages, NOW);
        let sizes: Vec<usize> = plan.bulk.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert!(plan.single.is_empty());
        assert_eq!(plan.len(), 250);
    }

    #[test]
    fn test_trailing_single_fresh_message_is_deleted_individually() {
        let messages: Vec<(u64, i64)> = (0..101).map(|id| (id, NOW)).collect();

        let plan = PurgePlan::new(messages, NOW);
        assert_eq!(plan.bulk.len(), 1);
        assert_eq!(plan.single, vec![100]);
    }

    #[test]
    fn test_old_messages_skip_bulk_endpoint() {
        let fifteen_days = 15 * 24 * 60 * 60;
        let plan = PurgePlan::new(vec![(1u64, NOW - fifteen_days), (2, NOW - fifteen_days)], NOW);

        assert!(plan.bulk.is_empty());
        assert_eq!(plan.single, vec![1, 2]);
    }

    #[test]
    fn test_empty_channel() {
        let plan = PurgePlan::<u64>::new(Vec::new(), NOW);
        assert!(plan.is_empty());
    }
}
