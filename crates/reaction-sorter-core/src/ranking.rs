//! Engagement ranking

use crate::platform::TrackedPost;

/// A post with its total reaction score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPost {
    /// The ranked post
    pub post: TrackedPost,
    /// Sum of all reaction counts at snapshot time
    pub score: u64,
}

/// Order posts ascending by total reaction count.
///
/// The sort is stable: posts with equal scores keep their input order.
///
/// # Examples
///
/// ```
/// use reaction_sorter_core::platform::{MessageId, ReactionTally, TrackedPost};
/// use reaction_sorter_core::ranking::rank;
///
/// let make = |id: u64, likes: u64| TrackedPost {
///     id: MessageId(id),
///     author_is_bot: false,
///     content: None,
///     attachments: Vec::new(),
///     reactions: [("👍", likes)].into_iter().collect::<ReactionTally>(),
/// };
/// let ranked = rank(vec![make(1, 5), make(2, 1), make(3, 3)]);
/// let ids: Vec<u64> = ranked.iter().map(|r| r.post.id.0).collect();
/// assert_eq!(ids, vec![2, 3, 1]);
/// ```
#[must_use]
pub fn rank(posts: Vec<TrackedPost>) -> Vec<RankedPost> {
    let mut ranked: Vec<RankedPost> = posts
        .into_iter()
        .map(|post| RankedPost {
            score: post.reactions.total(),
            post,
        })
        .collect();
    ranked.sort_by_key(|r| r.score);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::image_post;

    #[test]
    fn test_rank_orders_lowest_engagement_first() {
        let posts = vec![
            image_post(1, Some("a"), &[("👍", 4), ("🔥", 1)]),
            image_post(2, Some("b"), &[("👍", 1)]),
            image_post(3, Some("c"), &[("😂", 3)]),
        ];

        let ranked = rank(posts);
        let order: Vec<(Option<&str>, u64)> = ranked
            .iter()
            .map(|r| (r.post.content.as_deref(), r.score))
            .collect();
        assert_eq!(
            order,
            vec![(Some("b"), 1), (Some("c"), 3), (Some("a"), 5)]
        );
    }

    #[test]
    fn test_unreacted_posts_score_zero() {
        let ranked = rank(vec![image_post(9, None, &[])]);
        assert_eq!(ranked[0].score, 0);
    }
}
