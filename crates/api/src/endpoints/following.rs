//! Following endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    pagination::{PageParams, Paginated},
    response::ApiResponse,
};

/// Follow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: String,
}

/// Follow response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

/// Follow a user.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let edge = state.following_service.follow(&user.id, &req.user_id).await?;

    Ok(ApiResponse::ok(FollowResponse {
        id: edge.id,
        follower_id: edge.follower_id,
        followee_id: edge.followee_id,
        created_at: edge.created_at.to_rfc3339(),
    }))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .following_service
        .unfollow(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// List followers/following request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Follow edge item response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingItemResponse {
    pub id: String,
    pub created_at: String,
    pub follower_id: String,
    pub followee_id: String,
}

impl From<ripple_db::entities::following::Model> for FollowingItemResponse {
    fn from(f: ripple_db::entities::following::Model) -> Self {
        Self {
            id: f.id,
            created_at: f.created_at.to_rfc3339(),
            follower_id: f.follower_id,
            followee_id: f.followee_id,
        }
    }
}

/// Get followers of a user.
async fn followers(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Paginated<FollowingItemResponse>>> {
    let edges = state
        .following_service
        .get_followers(&req.user_id, req.page.limit(), req.page.offset())
        .await?;
    let total = state.following_service.count_followers(&req.user_id).await?;

    Ok(ApiResponse::ok(Paginated::new(
        edges.into_iter().map(Into::into).collect(),
        total,
        req.page,
    )))
}

/// Get users that a user is following.
async fn following(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Paginated<FollowingItemResponse>>> {
    let edges = state
        .following_service
        .get_following(&req.user_id, req.page.limit(), req.page.offset())
        .await?;
    let total = state.following_service.count_following(&req.user_id).await?;

    Ok(ApiResponse::ok(Paginated::new(
        edges.into_iter().map(Into::into).collect(),
        total,
        req.page,
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(follow))
        .route("/delete", post(unfollow))
        .route("/followers", post(followers))
        .route("/following", post(following))
}
