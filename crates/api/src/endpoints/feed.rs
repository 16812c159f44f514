//! Home feed endpoint.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use serde::Deserialize;

use crate::{
    endpoints::posts::{PostResponse, enrich_posts},
    extractors::AuthUser,
    middleware::AppState,
    pagination::{PageParams, Paginated},
    response::ApiResponse,
};

/// Feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(flatten)]
    pub page: PageParams,
}

/// Get the authenticated user's home feed: own posts plus posts by
/// followed users, newest first. Recomputed on every call.
async fn home(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<Paginated<PostResponse>>> {
    let (posts, total) = state
        .feed_service
        .home_feed(&user.id, req.page.limit(), req.page.offset())
        .await?;
    let items = enrich_posts(&state, posts, Some(&user)).await?;

    Ok(ApiResponse::ok(Paginated::new(items, total, req.page)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(home))
}
