//! Post endpoints.

use std::collections::HashMap;

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_db::entities::{post::Model as PostModel, user::Model as UserModel};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    pagination::{PageParams, Paginated},
    response::ApiResponse,
};

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub likes_count: u64,
    /// Whether the requesting user liked this post; absent without auth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked_by_me: Option<bool>,
}

/// Build a post response enriched with author, like count and viewer state.
pub(super) async fn enrich_posts(
    state: &AppState,
    posts: Vec<PostModel>,
    viewer: Option<&UserModel>,
) -> AppResult<Vec<PostResponse>> {
    let author_ids: Vec<String> = posts.iter().map(|p| p.user_id.clone()).collect();
    let usernames: HashMap<String, String> = state
        .user_service
        .get_many(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let mut responses = Vec::with_capacity(posts.len());
    for post in posts {
        let likes_count = state.like_service.likes_count(&post.id).await?;
        let is_liked_by_me = match viewer {
            Some(v) => Some(state.like_service.is_liked_by(&v.id, &post.id).await?),
            None => None,
        };

        responses.push(PostResponse {
            author_username: usernames.get(&post.user_id).cloned(),
            id: post.id,
            author_id: post.user_id,
            title: post.title,
            content: post.content,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.map(|t| t.to_rfc3339()),
            likes_count,
            is_liked_by_me,
        });
    }

    Ok(responses)
}

async fn enrich_post(
    state: &AppState,
    post: PostModel,
    viewer: Option<&UserModel>,
) -> AppResult<PostResponse> {
    let mut responses = enrich_posts(state, vec![post], viewer).await?;
    // enrich_posts returns exactly one response per input post
    responses
        .pop()
        .ok_or_else(|| ripple_common::AppError::Internal("empty enrichment".to_string()))
}

/// Create post request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,
}

/// Create a post. The author is always the authenticated user.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    req.validate()?;

    let input = ripple_core::post::CreatePostInput {
        title: req.title,
        content: req.content,
    };

    let post = state.post_service.create(&user.id, input).await?;
    let response = enrich_post(&state, post, Some(&user)).await?;

    Ok(ApiResponse::ok(response))
}

/// Show post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPostRequest {
    pub post_id: String,
}

/// Show a single post.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&req.post_id).await?;
    let response = enrich_post(&state, post, viewer.as_ref()).await?;

    Ok(ApiResponse::ok(response))
}

/// List posts request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsRequest {
    #[serde(flatten)]
    pub page: PageParams,
}

/// List recent posts, newest first.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListPostsRequest>,
) -> AppResult<ApiResponse<Paginated<PostResponse>>> {
    let posts = state
        .post_service
        .list_recent(req.page.limit(), req.page.offset())
        .await?;
    let total = state.post_service.count_all().await?;
    let items = enrich_posts(&state, posts, viewer.as_ref()).await?;

    Ok(ApiResponse::ok(Paginated::new(items, total, req.page)))
}

/// List posts by author request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListByUserRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub page: PageParams,
}

/// List posts by an author, newest first.
async fn by_user(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListByUserRequest>,
) -> AppResult<ApiResponse<Paginated<PostResponse>>> {
    let posts = state
        .post_service
        .list_by_user(&req.user_id, req.page.limit(), req.page.offset())
        .await?;
    let total = state.post_service.count_by_user(&req.user_id).await?;
    let items = enrich_posts(&state, posts, viewer.as_ref()).await?;

    Ok(ApiResponse::ok(Paginated::new(items, total, req.page)))
}

/// Update post request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub post_id: String,

    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,
}

/// Update a post (author only).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    req.validate()?;

    let input = ripple_core::post::UpdatePostInput {
        title: req.title,
        content: req.content,
    };

    let post = state
        .post_service
        .update(&user.id, &req.post_id, input)
        .await?;
    let response = enrich_post(&state, post, Some(&user)).await?;

    Ok(ApiResponse::ok(response))
}

/// Delete a post (author only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like a post.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<LikeResponse>> {
    state.like_service.like(&user.id, &req.post_id).await?;
    let likes_count = state.like_service.likes_count(&req.post_id).await?;

    Ok(ApiResponse::ok(LikeResponse {
        post_id: req.post_id,
        likes_count,
    }))
}

/// Unlike a post.
async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<LikeResponse>> {
    state.like_service.unlike(&user.id, &req.post_id).await?;
    let likes_count = state.like_service.likes_count(&req.post_id).await?;

    Ok(ApiResponse::ok(LikeResponse {
        post_id: req.post_id,
        likes_count,
    }))
}

/// Like state response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub post_id: String,
    pub likes_count: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/by-user", post(by_user))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/like", post(like))
        .route("/unlike", post(unlike))
}
