//! HTTP API layer for ripple.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: accounts, follow graph, posts, comments, likes, feed,
//!   notifications
//! - **Extractors**: authenticated identity from request extensions
//! - **Middleware**: bearer-token authentication
//! - **Pagination**: page-number parameters and response wrapper
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod pagination;
pub mod response;

pub use endpoints::router;
pub use pagination::{PageParams, Paginated};
