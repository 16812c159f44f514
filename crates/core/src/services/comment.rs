//! Comment service.

use crate::services::notification::NotificationService;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

/// Input for creating or updating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1, max = 8192))]
    pub content: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post.
    ///
    /// The post author is notified unless they are the commenter.
    pub async fn create(
        &self,
        author_id: &str,
        post_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            user_id: Set(author_id.to_string()),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let comment = self.comment_repo.create(model).await?;

        self.notifications
            .notify_commented(author_id, &post, &comment.id)
            .await?;

        Ok(comment)
    }

    /// Get comments on a post, oldest first (paginated).
    pub async fn list_by_post(
        &self,
        post_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        // Resolve the post first so a missing post is NotFound, not an
        // empty page.
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id, limit, offset).await
    }

    /// Count comments on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        self.comment_repo.count_by_post(post_id).await
    }

    /// Update a comment. Only the author may update it.
    pub async fn update(
        &self,
        actor_id: &str,
        comment_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.user_id != actor_id {
            return Err(AppError::Forbidden(
                "only the author can edit a comment".to_string(),
            ));
        }

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(input.content);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Delete a comment. Only the author may delete it.
    pub async fn delete(&self, actor_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.user_id != actor_id {
            return Err(AppError::Forbidden(
                "only the author can delete a comment".to_string(),
            ));
        }

        self.comment_repo.delete(comment).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::post;
    use ripple_db::repositories::{NotificationRepository, UserRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service_with(db: Arc<DatabaseConnection>) -> CommentService {
        let notifications = NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
        );
        CommentService::new(
            CommentRepository::new(Arc::clone(&db)),
            PostRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_create_on_missing_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service
            .create(
                "user1",
                "missing",
                CommentInput {
                    content: "hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let comment = comment::Model {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            user_id: "user1".to_string(),
            content: "mine".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service
            .update(
                "user2",
                "c1",
                CommentInput {
                    content: "not yours".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service
            .create(
                "user1",
                "p1",
                CommentInput {
                    content: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
