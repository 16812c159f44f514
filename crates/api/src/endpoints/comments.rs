//! Comment endpoints.

use std::collections::HashMap;

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_db::entities::comment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    pagination::{PageParams, Paginated},
    response::ApiResponse,
};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    pub content: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

async fn enrich_comments(
    state: &AppState,
    comments: Vec<comment::Model>,
) -> AppResult<Vec<CommentResponse>> {
    let author_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
    let usernames: HashMap<String, String> = state
        .user_service
        .get_many(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    Ok(comments
        .into_iter()
        .map(|c| CommentResponse {
            author_username: usernames.get(&c.user_id).cloned(),
            id: c.id,
            post_id: c.post_id,
            author_id: c.user_id,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        })
        .collect())
}

/// Create comment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,

    #[validate(length(min = 1, max = 8192))]
    pub content: String,
}

/// Comment on a post. The author is always the authenticated user.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    req.validate()?;

    let input = ripple_core::comment::CommentInput {
        content: req.content,
    };

    let comment = state
        .comment_service
        .create(&user.id, &req.post_id, input)
        .await?;

    let mut items = enrich_comments(&state, vec![comment]).await?;
    let response = items
        .pop()
        .ok_or_else(|| ripple_common::AppError::Internal("empty enrichment".to_string()))?;

    Ok(ApiResponse::ok(response))
}

/// List comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub post_id: String,
    #[serde(flatten)]
    pub page: PageParams,
}

/// List comments under a post, oldest first.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Paginated<CommentResponse>>> {
    let comments = state
        .comment_service
        .list_by_post(&req.post_id, req.page.limit(), req.page.offset())
        .await?;
    let total = state.comment_service.count_by_post(&req.post_id).await?;
    let items = enrich_comments(&state, comments).await?;

    Ok(ApiResponse::ok(Paginated::new(items, total, req.page)))
}

/// Update comment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub comment_id: String,

    #[validate(length(min = 1, max = 8192))]
    pub content: String,
}

/// Update a comment (author only).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    req.validate()?;

    let input = ripple_core::comment::CommentInput {
        content: req.content,
    };

    let comment = state
        .comment_service
        .update(&user.id, &req.comment_id, input)
        .await?;

    let mut items = enrich_comments(&state, vec![comment]).await?;
    let response = items
        .pop()
        .ok_or_else(|| ripple_common::AppError::Internal("empty enrichment".to_string()))?;

    Ok(ApiResponse::ok(response))
}

/// Delete comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_id: String,
}

/// Delete a comment (author only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteCommentRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .comment_service
        .delete(&user.id, &req.comment_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
        .route("/update", post(update))
        .route("/delete", post(delete))
}
