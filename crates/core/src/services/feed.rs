//! Activity feed service.

use ripple_common::AppResult;
use ripple_db::{
    entities::post,
    repositories::{FollowingRepository, PostRepository},
};

/// Feed service: a derived read over the follow graph and the post store.
///
/// The feed performs no writes and keeps no cache; every call recomputes
/// from the current edge and post state.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    following_repo: FollowingRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, following_repo: FollowingRepository) -> Self {
        Self {
            post_repo,
            following_repo,
        }
    }

    /// Get a user's home feed: posts authored by the user or by anyone the
    /// user follows, newest first (ties broken by id, newest first).
    ///
    /// Returns the page of posts and the total count. A user who follows
    /// no one sees exactly their own posts.
    pub async fn home_feed(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let mut author_ids = self.following_repo.find_followee_ids(user_id).await?;
        author_ids.push(user_id.to_string());

        let posts = self
            .post_repo
            .find_by_authors(&author_ids, limit, offset)
            .await?;
        let total = self.post_repo.count_by_authors(&author_ids).await?;

        Ok((posts, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::following;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, user_id: &str, title: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: "content".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_feed_with_zero_follows_is_own_posts() {
        let own = create_test_post("p1", "user1", "Mine");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<following::Model>::new()])
                .append_query_results([[own]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let service = FeedService::new(
            PostRepository::new(Arc::clone(&db)),
            FollowingRepository::new(db),
        );

        let (posts, total) = service.home_feed("user1", 10, 0).await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].user_id, "user1");
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_feed_includes_followed_authors() {
        let edge = following::Model {
            id: "f1".to_string(),
            follower_id: "user1".to_string(),
            followee_id: "user2".to_string(),
            created_at: Utc::now().into(),
        };
        let theirs = create_test_post("p2", "user2", "Theirs");
        let own = create_test_post("p1", "user1", "Mine");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .append_query_results([[theirs, own]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let service = FeedService::new(
            PostRepository::new(Arc::clone(&db)),
            FollowingRepository::new(db),
        );

        let (posts, total) = service.home_feed("user1", 10, 0).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(total, 2);
    }
}
