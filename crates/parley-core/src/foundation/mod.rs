//! Foundation layer: update model, deep links and shared errors.

pub mod error;
pub mod link;
pub mod update;

pub use error::{ApiError, ApiResult, LinkError, LinkResult};
pub use link::MessageDeepLink;
pub use update::{Message, MessagePayload, Peer, Update, UpdateKind};
