//! User profile endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::{AppError, AppResult};
use ripple_db::entities::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Public user profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: String,
    /// Derived from the follow edges; never stored on the user row.
    pub followers_count: u64,
    pub following_count: u64,
}

/// Own profile response (includes email).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub followers_count: u64,
    pub following_count: u64,
}

async fn graph_counts(state: &AppState, user_id: &str) -> AppResult<(u64, u64)> {
    let followers = state.following_service.count_followers(user_id).await?;
    let following = state.following_service.count_following(user_id).await?;
    Ok((followers, following))
}

/// Show user request: by ID or by username.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Show a user's public profile.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user: user::Model = match (req.user_id, req.username) {
        (Some(id), _) => state.user_service.get(&id).await?,
        (None, Some(username)) => state.user_service.get_by_username(&username).await?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "userId or username is required".to_string(),
            ));
        }
    };

    let (followers_count, following_count) = graph_counts(&state, &user.id).await?;

    Ok(ApiResponse::ok(UserResponse {
        id: user.id,
        username: user.username,
        bio: user.bio,
        avatar_url: user.avatar_url,
        created_at: user.created_at.to_rfc3339(),
        followers_count,
        following_count,
    }))
}

/// Get the authenticated user's own profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MeResponse>> {
    let (followers_count, following_count) = graph_counts(&state, &user.id).await?;

    Ok(ApiResponse::ok(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        bio: user.bio,
        avatar_url: user.avatar_url,
        created_at: user.created_at.to_rfc3339(),
        followers_count,
        following_count,
    }))
}

/// Update profile request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(length(max = 1024))]
    pub avatar_url: Option<String>,
}

/// Update the authenticated user's profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<MeResponse>> {
    req.validate()?;

    let input = ripple_core::user::UpdateUserInput {
        email: req.email,
        bio: req.bio,
        avatar_url: req.avatar_url,
    };

    let updated = state.user_service.update(&user.id, input).await?;
    let (followers_count, following_count) = graph_counts(&state, &updated.id).await?;

    Ok(ApiResponse::ok(MeResponse {
        id: updated.id,
        username: updated.username,
        email: updated.email,
        bio: updated.bio,
        avatar_url: updated.avatar_url,
        created_at: updated.created_at.to_rfc3339(),
        followers_count,
        following_count,
    }))
}

/// Routes for other users' profiles (`/users`).
pub fn router() -> Router<AppState> {
    Router::new().route("/show", post(show))
}

/// Routes for the authenticated user's own profile (`/i`).
pub fn me_router() -> Router<AppState> {
    Router::new()
        .route("/", post(me))
        .route("/update", post(update))
}
