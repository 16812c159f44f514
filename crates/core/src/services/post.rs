//! Post service.

use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{entities::post, repositories::PostRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,
}

/// Input for updating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository) -> Self {
        Self {
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    ///
    /// The author always comes from the authenticated identity, never from
    /// the request body.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author_id.to_string()),
            title: Set(input.title),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.post_repo.create(model).await
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Get recent posts, newest first (paginated).
    pub async fn list_recent(&self, limit: u64, offset: u64) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_recent(limit, offset).await
    }

    /// Count all posts.
    pub async fn count_all(&self) -> AppResult<u64> {
        self.post_repo.count_all().await
    }

    /// Get posts by an author, newest first (paginated).
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_user(user_id, limit, offset).await
    }

    /// Count posts by an author.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        self.post_repo.count_by_user(user_id).await
    }

    /// Update a post. Only the author may update it.
    pub async fn update(
        &self,
        actor_id: &str,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.user_id != actor_id {
            return Err(AppError::Forbidden(
                "only the author can edit a post".to_string(),
            ));
        }

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Delete a post. Only the author may delete it. Comments and likes
    /// cascade at the storage level; notifications referencing the post are
    /// left in place and degrade at render time.
    pub async fn delete(&self, actor_id: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.user_id != actor_id {
            return Err(AppError::Forbidden(
                "only the author can delete a post".to_string(),
            ));
        }

        self.post_repo.delete(post).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
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
    async fn test_create_rejects_empty_title() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = PostService::new(PostRepository::new(db));

        let result = service
            .create(
                "user1",
                CreatePostInput {
                    title: String::new(),
                    content: "hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let post = create_test_post("p1", "user1", "Hello");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = PostService::new(PostRepository::new(db));

        let result = service
            .update(
                "user2",
                "p1",
                UpdatePostInput {
                    title: Some("Hijacked".to_string()),
                    content: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let post = create_test_post("p1", "user1", "Hello");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = PostService::new(PostRepository::new(db));

        let result = service.delete("user2", "p1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = PostService::new(PostRepository::new(db));

        let result = service.get("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
