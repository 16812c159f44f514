//! Notifications endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_core::{NotificationTarget, RenderedNotification};
use ripple_db::entities::notification::NotificationVerb;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    pagination::{PageParams, Paginated},
    response::ApiResponse,
};

/// Notification response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub created_at: String,
    pub is_read: bool,
    /// Display phrase for the action ("followed you", "liked", ...).
    pub verb: String,
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_username: Option<String>,
    /// Resolved target projection; null when the target no longer exists.
    pub target: Option<NotificationTarget>,
}

const fn verb_phrase(verb: &NotificationVerb) -> &'static str {
    match verb {
        NotificationVerb::Follow => "followed you",
        NotificationVerb::Like => "liked",
        NotificationVerb::Comment => "commented on",
    }
}

impl From<RenderedNotification> for NotificationResponse {
    fn from(r: RenderedNotification) -> Self {
        Self {
            verb: verb_phrase(&r.notification.verb).to_string(),
            id: r.notification.id,
            created_at: r.notification.created_at.to_rfc3339(),
            is_read: r.notification.is_read,
            actor_id: r.notification.actor_id,
            actor_username: r.actor_username,
            target: r.target,
        }
    }
}

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsRequest {
    #[serde(flatten)]
    pub page: PageParams,
}

/// Get notifications for the authenticated user, newest first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListNotificationsRequest>,
) -> AppResult<ApiResponse<Paginated<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list_for(&user.id, req.page.limit(), req.page.offset())
        .await?;
    let total = state.notification_service.count_for(&user.id).await?;

    let mut items = Vec::with_capacity(notifications.len());
    for notification in notifications {
        let rendered = state.notification_service.render(notification).await?;
        items.push(NotificationResponse::from(rendered));
    }

    Ok(ApiResponse::ok(Paginated::new(items, total, req.page)))
}

/// Mark notification as read request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsReadRequest {
    pub notification_id: String,
}

/// Mark a notification as read.
async fn mark_as_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MarkAsReadRequest>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state
        .notification_service
        .mark_read(&user.id, &req.notification_id)
        .await?;
    let rendered = state.notification_service.render(notification).await?;

    Ok(ApiResponse::ok(NotificationResponse::from(rendered)))
}

/// Mark all as read response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllAsReadResponse {
    pub count: u64,
}

/// Mark all notifications as read.
async fn mark_all_as_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkAllAsReadResponse>> {
    let count = state.notification_service.mark_all_read(&user.id).await?;
    Ok(ApiResponse::ok(MarkAllAsReadResponse { count }))
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Get unread notification count.
async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.count_unread(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/mark-as-read", post(mark_as_read))
        .route("/mark-all-as-read", post(mark_all_as_read))
        .route("/unread-count", post(unread_count))
}
