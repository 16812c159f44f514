//! Like service.

use crate::services::notification::NotificationService;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::post_like,
    repositories::{LikeRepository, PostRepository},
};
use sea_orm::Set;

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        post_repo: PostRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            like_repo,
            post_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a post.
    ///
    /// There is no separate existence check: the insert itself is the
    /// uniqueness check, decided by the (user_id, post_id) unique index.
    /// Of two concurrent likes, exactly one wins; the other gets
    /// `AlreadyLiked` and nothing is written.
    pub async fn like(&self, user_id: &str, post_id: &str) -> AppResult<post_like::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let model = post_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let like = self.like_repo.create(model).await?;

        self.notifications.notify_liked(user_id, &post).await?;

        Ok(like)
    }

    /// Unlike a post.
    ///
    /// A previously issued like notification is not retracted.
    pub async fn unlike(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        self.post_repo.get_by_id(post_id).await?;

        if !self.like_repo.is_liked(user_id, post_id).await? {
            return Err(AppError::NotLiked("post not liked".to_string()));
        }

        self.like_repo.delete_by_pair(user_id, post_id).await
    }

    /// Count likes on a post.
    pub async fn likes_count(&self, post_id: &str) -> AppResult<u64> {
        self.like_repo.count_by_post(post_id).await
    }

    /// Check if a user has liked a post.
    pub async fn is_liked_by(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.like_repo.is_liked(user_id, post_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::post;
    use ripple_db::repositories::{CommentRepository, NotificationRepository, UserRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Hello".to_string(),
            content: "world".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: Arc<DatabaseConnection>) -> LikeService {
        let notifications = NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
        );
        LikeService::new(
            LikeRepository::new(Arc::clone(&db)),
            PostRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_like_missing_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.like("user1", "missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_unlike_not_liked() {
        let post = create_test_post("p1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_query_results([Vec::<post_like::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.unlike("user1", "p1").await;

        assert!(matches!(result, Err(AppError::NotLiked(_))));
    }

    #[tokio::test]
    async fn test_is_liked_by() {
        let like = post_like::Model {
            id: "l1".to_string(),
            user_id: "user1".to_string(),
            post_id: "p1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );
        let service = service_with(db);

        assert!(service.is_liked_by("user1", "p1").await.unwrap());
    }
}
