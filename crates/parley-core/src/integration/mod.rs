//! Integration layer: boundaries to the external transport client.

pub mod outbound;
pub mod source;

pub use outbound::{BoxedOutbound, CallbackAnswer, Outbound};
pub use source::{BoxedUpdateSource, ListenerId, UpdateListener, UpdateSource};
