//! Notification service.
//!
//! All notification-producing actions funnel through [`NotificationService`]:
//! the actor == recipient guard lives here, in the one constructor every
//! event path shares, so no caller can accidentally notify a user about
//! their own action.

use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{
        notification::{self, NotificationVerb},
        post,
    },
    repositories::{CommentRepository, NotificationRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Maximum snippet length for rendered targets, in characters.
const SNIPPET_LEN: usize = 50;

/// Target type tags stored alongside notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A user profile (follow notifications point back at the follower).
    User,
    /// A post (like notifications).
    Post,
    /// A comment (comment notifications).
    Comment,
}

impl TargetKind {
    /// The tag stored in the `target_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

/// Display projection of a notification target.
///
/// Resolved at render time from the stored `(target_type, target_id)` pair.
/// A target that no longer exists renders as `None`; an unrecognized tag
/// renders as [`NotificationTarget::Unknown`] rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NotificationTarget {
    /// A post target.
    #[serde(rename = "post")]
    Post {
        /// Post ID.
        id: String,
        /// Post title.
        title: String,
        /// Truncated post content.
        content_snippet: String,
    },
    /// A comment target.
    #[serde(rename = "comment")]
    Comment {
        /// Comment ID.
        id: String,
        /// Truncated comment content.
        content_snippet: String,
        /// Title of the post the comment belongs to.
        post_title: String,
    },
    /// A user target.
    #[serde(rename = "user")]
    User {
        /// User ID.
        id: String,
        /// Username.
        username: String,
        /// Truncated bio, if any.
        bio_snippet: Option<String>,
    },
    /// An unrecognized target tag, passed through as-is.
    #[serde(rename = "unknown")]
    Unknown {
        /// Raw target type tag.
        target_type: String,
        /// Target entity ID.
        id: String,
    },
}

/// A notification together with its display projections.
#[derive(Debug, Clone)]
pub struct RenderedNotification {
    /// The stored notification.
    pub notification: notification::Model,
    /// Username of the acting user, if they still exist.
    pub actor_username: Option<String>,
    /// Resolved target, if it still exists.
    pub target: Option<NotificationTarget>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            post_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record that a user was followed. The target is the follower, so the
    /// followee can navigate back to who followed them.
    pub async fn notify_followed(
        &self,
        actor_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        self.create_internal(
            followee_id,
            actor_id,
            NotificationVerb::Follow,
            TargetKind::User,
            actor_id,
        )
        .await
    }

    /// Record that a post was liked. The post author is the recipient.
    pub async fn notify_liked(
        &self,
        actor_id: &str,
        post: &post::Model,
    ) -> AppResult<Option<notification::Model>> {
        self.create_internal(
            &post.user_id,
            actor_id,
            NotificationVerb::Like,
            TargetKind::Post,
            &post.id,
        )
        .await
    }

    /// Record that a post was commented on. The post author is the
    /// recipient; the target is the comment itself.
    pub async fn notify_commented(
        &self,
        actor_id: &str,
        post: &post::Model,
        comment_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        self.create_internal(
            &post.user_id,
            actor_id,
            NotificationVerb::Comment,
            TargetKind::Comment,
            comment_id,
        )
        .await
    }

    /// Internal constructor all event paths go through.
    ///
    /// Returns `Ok(None)` without writing anything when the actor is the
    /// recipient (self-action suppression).
    async fn create_internal(
        &self,
        recipient_id: &str,
        actor_id: &str,
        verb: NotificationVerb,
        target_kind: TargetKind,
        target_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if recipient_id == actor_id {
            tracing::debug!(actor_id, ?verb, "Suppressed self-notification");
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            verb: Set(verb),
            target_type: Set(target_kind.as_str().to_string()),
            target_id: Set(target_id.to_string()),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let notification = self.notification_repo.create(model).await?;
        Ok(Some(notification))
    }

    /// Get notifications for a recipient, newest first (paginated).
    pub async fn list_for(
        &self,
        recipient_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_recipient(recipient_id, limit, offset)
            .await
    }

    /// Count notifications for a recipient.
    pub async fn count_for(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_by_recipient(recipient_id).await
    }

    /// Count unread notifications for a recipient.
    pub async fn count_unread(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(recipient_id).await
    }

    /// Mark a notification as read.
    ///
    /// Ownership is folded into the lookup: a notification that belongs to
    /// another user yields the same `NotFound` as one that does not exist.
    pub async fn mark_read(
        &self,
        recipient_id: &str,
        notification_id: &str,
    ) -> AppResult<notification::Model> {
        let notification = self
            .notification_repo
            .find_for_recipient(notification_id, recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("notification {notification_id}")))?;

        if notification.is_read {
            return Ok(notification);
        }

        self.notification_repo.mark_as_read(notification).await
    }

    /// Mark all unread notifications as read for a recipient.
    ///
    /// Returns the number of notifications transitioned; zero is success.
    pub async fn mark_all_read(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(recipient_id).await
    }

    /// Resolve a notification's polymorphic target into a display projection.
    ///
    /// Degrades instead of failing: a dangling reference renders as `None`,
    /// an unrecognized tag as [`NotificationTarget::Unknown`].
    pub async fn render_target(
        &self,
        notification: &notification::Model,
    ) -> AppResult<Option<NotificationTarget>> {
        let target_id = notification.target_id.as_str();

        match notification.target_type.as_str() {
            "post" => {
                let Some(post) = self.post_repo.find_by_id(target_id).await? else {
                    return Ok(None);
                };
                Ok(Some(NotificationTarget::Post {
                    id: post.id,
                    title: post.title,
                    content_snippet: snippet(&post.content),
                }))
            }
            "comment" => {
                let Some(comment) = self.comment_repo.find_by_id(target_id).await? else {
                    return Ok(None);
                };
                // Comments cascade with their post, so the parent resolving
                // is the common case; degrade all the same if it does not.
                let Some(parent) = self.post_repo.find_by_id(&comment.post_id).await? else {
                    return Ok(None);
                };
                Ok(Some(NotificationTarget::Comment {
                    id: comment.id,
                    content_snippet: snippet(&comment.content),
                    post_title: parent.title,
                }))
            }
            "user" => {
                let Some(user) = self.user_repo.find_by_id(target_id).await? else {
                    return Ok(None);
                };
                Ok(Some(NotificationTarget::User {
                    id: user.id,
                    username: user.username,
                    bio_snippet: user.bio.as_deref().map(snippet),
                }))
            }
            other => Ok(Some(NotificationTarget::Unknown {
                target_type: other.to_string(),
                id: target_id.to_string(),
            })),
        }
    }

    /// Render a notification with its actor and target projections.
    pub async fn render(
        &self,
        notification: notification::Model,
    ) -> AppResult<RenderedNotification> {
        let actor_username = self
            .user_repo
            .find_by_id(&notification.actor_id)
            .await?
            .map(|u| u.username);
        let target = self.render_target(&notification).await?;

        Ok(RenderedNotification {
            notification,
            actor_username,
            target,
        })
    }
}

/// Truncate text to [`SNIPPET_LEN`] characters, appending an ellipsis only
/// when something was cut.
fn snippet(text: &str) -> String {
    if text.chars().count() > SNIPPET_LEN {
        let truncated: String = text.chars().take(SNIPPET_LEN).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::{comment, user};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> NotificationService {
        NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            CommentRepository::new(db),
        )
    }

    fn create_test_post(id: &str, user_id: &str, title: &str, content: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_notification(
        id: &str,
        recipient_id: &str,
        target_type: &str,
        target_id: &str,
    ) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            actor_id: "actor1".to_string(),
            verb: NotificationVerb::Like,
            target_type: target_type.to_string(),
            target_id: target_id.to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_snippet_short_text_unchanged() {
        assert_eq!(snippet("hello"), "hello");
    }

    #[test]
    fn test_snippet_exactly_fifty_chars_unchanged() {
        let text = "a".repeat(50);
        assert_eq!(snippet(&text), text);
    }

    #[test]
    fn test_snippet_long_text_truncated_with_ellipsis() {
        let text = "a".repeat(51);
        let result = snippet(&text);

        assert_eq!(result.chars().count(), 53);
        assert!(result.ends_with("..."));
    }

    #[tokio::test]
    async fn test_self_notification_suppressed_without_write() {
        // An empty mock database would fail any query; succeeding proves
        // the guard returns before touching storage.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.notify_followed("user1", "user1").await.unwrap();
        assert!(result.is_none());

        let post = create_test_post("p1", "user1", "Title", "content");
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);
        let result = service.notify_liked("user1", &post).await.unwrap();
        assert!(result.is_none());

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);
        let result = service.notify_commented("user1", &post, "c1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_mark_read_unknown_notification() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.mark_read("user1", "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_all_read_returns_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );
        let service = service_with(db);

        let count = service.mark_all_read("user1").await.unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_render_target_post_truncates_content() {
        let long_content = "x".repeat(80);
        let post = create_test_post("p1", "user2", "Hello", &long_content);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = service_with(db);

        let notification = create_test_notification("n1", "user1", "post", "p1");
        let target = service.render_target(&notification).await.unwrap();

        match target {
            Some(NotificationTarget::Post {
                id,
                title,
                content_snippet,
            }) => {
                assert_eq!(id, "p1");
                assert_eq!(title, "Hello");
                assert_eq!(content_snippet.chars().count(), 53);
                assert!(content_snippet.ends_with("..."));
            }
            other => panic!("expected post target, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_render_target_dangling_post_is_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let notification = create_test_notification("n1", "user1", "post", "deleted");
        let target = service.render_target(&notification).await.unwrap();

        assert!(target.is_none());
    }

    #[tokio::test]
    async fn test_render_target_comment_includes_post_title() {
        let comment = comment::Model {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            user_id: "user2".to_string(),
            content: "nice post".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let post = create_test_post("p1", "user1", "Hello", "world");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = service_with(db);

        let notification = create_test_notification("n1", "user1", "comment", "c1");
        let target = service.render_target(&notification).await.unwrap();

        assert_eq!(
            target,
            Some(NotificationTarget::Comment {
                id: "c1".to_string(),
                content_snippet: "nice post".to_string(),
                post_title: "Hello".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_render_target_unknown_tag_passes_through() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let notification = create_test_notification("n1", "user1", "gallery", "g1");
        let target = service.render_target(&notification).await.unwrap();

        assert_eq!(
            target,
            Some(NotificationTarget::Unknown {
                target_type: "gallery".to_string(),
                id: "g1".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_render_target_user_bio_snippet() {
        let user = user::Model {
            id: "user2".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            email: None,
            password_hash: "$argon2id$x".to_string(),
            token: "t".to_string(),
            bio: Some("b".repeat(60)),
            avatar_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let service = service_with(db);

        let notification = create_test_notification("n1", "user1", "user", "user2");
        let target = service.render_target(&notification).await.unwrap();

        match target {
            Some(NotificationTarget::User {
                username,
                bio_snippet,
                ..
            }) => {
                assert_eq!(username, "alice");
                let bio = bio_snippet.unwrap();
                assert!(bio.ends_with("..."));
                assert_eq!(bio.chars().count(), 53);
            }
            other => panic!("expected user target, got {other:?}"),
        }
    }
}
