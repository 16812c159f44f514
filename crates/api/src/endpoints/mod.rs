//! API endpoints.

mod auth;
mod comments;
mod feed;
mod following;
mod notifications;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/i", users::me_router())
        .nest("/users", users::router())
        .nest("/following", following::router())
        .nest("/posts/comments", comments::router())
        .nest("/posts", posts::router())
        .nest("/feed", feed::router())
        .nest("/notifications", notifications::router())
}
