//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use ripple_core::{
    CommentService, FeedService, FollowingService, LikeService, NotificationService, PostService,
    UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub like_service: LikeService,
    pub following_service: FollowingService,
    pub feed_service: FeedService,
    pub notification_service: NotificationService,
}

/// Authentication middleware.
///
/// Resolves a bearer token into a user model placed in request extensions;
/// handlers receive the identity through the `AuthUser`/`MaybeAuthUser`
/// extractors rather than any ambient state.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
