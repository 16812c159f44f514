//! Following service.

use crate::services::notification::NotificationService;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::following,
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;

/// Following service for business logic.
///
/// Per ordered (follower, followee) pair the edge is a two-state machine:
/// not-following becomes following through a successful [`follow`], and back
/// through a successful [`unfollow`]. Self-loops are rejected before any
/// state is consulted.
///
/// [`follow`]: FollowingService::follow
/// [`unfollow`]: FollowingService::unfollow
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        following_repo: FollowingRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            following_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    pub async fn follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<following::Model> {
        if follower_id == followee_id {
            return Err(AppError::SelfReference(
                "cannot follow yourself".to_string(),
            ));
        }

        let followee = self.user_repo.get_by_id(followee_id).await?;

        if self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::AlreadyExists("already following".to_string()));
        }

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        // The unique (follower_id, followee_id) index turns a concurrent
        // duplicate into AlreadyExists here rather than a second row.
        let edge = self.following_repo.create(model).await?;

        self.notifications
            .notify_followed(follower_id, &followee.id)
            .await?;

        Ok(edge)
    }

    /// Unfollow a user. Silent: no notification kind exists for unfollow.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(AppError::SelfReference(
                "cannot unfollow yourself".to_string(),
            ));
        }

        self.user_repo.get_by_id(followee_id).await?;

        if !self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::NotFollowing("not following".to_string()));
        }

        self.following_repo
            .delete_by_pair(follower_id, followee_id)
            .await
    }

    /// Get follow edges pointing at a user (their followers), paginated.
    ///
    /// Followers are never stored as their own collection; this is a read
    /// over the forward edge relation.
    pub async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        self.following_repo
            .find_followers(user_id, limit, offset)
            .await
    }

    /// Get follow edges originating from a user (who they follow), paginated.
    pub async fn get_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        self.following_repo
            .find_following(user_id, limit, offset)
            .await
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        self.following_repo.count_followers(user_id).await
    }

    /// Count users a user is following.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        self.following_repo.count_following(user_id).await
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::user;
    use ripple_db::repositories::{CommentRepository, NotificationRepository, PostRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: None,
            password_hash: "$argon2id$x".to_string(),
            token: format!("token_{id}"),
            bio: None,
            avatar_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_following(id: &str, follower_id: &str, followee_id: &str) -> following::Model {
        following::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<DatabaseConnection>) -> FollowingService {
        let notifications = NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
        );
        FollowingService::new(
            FollowingRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.follow("user1", "user1").await;

        assert!(matches!(result, Err(AppError::SelfReference(_))));
    }

    #[tokio::test]
    async fn test_unfollow_yourself_returns_error() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.unfollow("user1", "user1").await;

        assert!(matches!(result, Err(AppError::SelfReference(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_user_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.follow("user1", "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_already_following_returns_error() {
        let followee = create_test_user("user2", "bob");
        let edge = create_test_following("f1", "user1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[followee]])
                .append_query_results([[edge]])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.follow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_unfollow_not_following_returns_error() {
        let followee = create_test_user("user2", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[followee]])
                .append_query_results([Vec::<following::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.unfollow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::NotFollowing(_))));
    }

    #[tokio::test]
    async fn test_is_following() {
        let edge = create_test_following("f1", "user1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .into_connection(),
        );
        let service = service_with(db);

        assert!(service.is_following("user1", "user2").await.unwrap());
    }
}
