//! Business logic services.

pub mod comment;
pub mod feed;
pub mod following;
pub mod like;
pub mod notification;
pub mod post;
pub mod user;

pub use comment::{CommentInput, CommentService};
pub use feed::FeedService;
pub use following::FollowingService;
pub use like::LikeService;
pub use notification::{
    NotificationService, NotificationTarget, RenderedNotification, TargetKind,
};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
pub use user::{CreateUserInput, UpdateUserInput, UserService};
