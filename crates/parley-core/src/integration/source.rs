//! Update source boundary.
//!
//! The transport client is an external collaborator. It authenticates, keeps
//! the connection alive and delivers raw updates through listeners registered
//! per [`UpdateKind`]. Parley only depends on this trait.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::foundation::update::{Update, UpdateKind};

/// A listener invoked by the transport for every update of one kind.
///
/// The returned future may stay pending for a long time: the conversation
/// engine uses it as its back-pressure point, and a transport that awaits its
/// listeners is throttled to the pace of the slowest handler.
pub type UpdateListener = Arc<dyn Fn(Update) -> BoxFuture<'static, ()> + Send + Sync>;

/// Identifies one registered listener, unique within its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wraps a source-assigned id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A transport that delivers updates to registered listeners.
///
/// Listeners for different kinds may be invoked concurrently; how much is up
/// to the implementation.
pub trait UpdateSource: Send + Sync {
    /// Registers a listener for updates of `kind`.
    fn add_listener(&self, kind: UpdateKind, listener: UpdateListener) -> ListenerId;

    /// Removes a listener. Returns `false` if `id` was not registered.
    ///
    /// A removed listener is not invoked for updates delivered afterwards.
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Registers a listener for edited messages.
    fn on_edit_message(&self, listener: UpdateListener) -> ListenerId {
        self.add_listener(UpdateKind::EditMessage, listener)
    }

    /// Registers a listener for new private and group messages.
    fn on_new_message(&self, listener: UpdateListener) -> ListenerId {
        self.add_listener(UpdateKind::NewMessage, listener)
    }

    /// Registers a listener for new channel messages.
    fn on_new_channel_message(&self, listener: UpdateListener) -> ListenerId {
        self.add_listener(UpdateKind::NewChannelMessage, listener)
    }
}

/// A boxed update source.
pub type BoxedUpdateSource = Arc<dyn UpdateSource>;
