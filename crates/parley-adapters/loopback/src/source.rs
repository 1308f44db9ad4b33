//! In-process update source.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use parley_core::{ListenerId, Message, Update, UpdateKind, UpdateListener, UpdateSource};

use crate::error::{LoopbackError, LoopbackResult};

/// An [`UpdateSource`] fed by the caller.
///
/// Updates are delivered to every listener registered for their kind, one
/// after the other. [`push`](Self::push) resolves once every listener has
/// accepted the update, so a conversation's back-pressure reaches the caller.
#[derive(Default)]
pub struct LoopbackSource {
    listeners: Mutex<Vec<(ListenerId, UpdateKind, UpdateListener)>>,
    next_id: AtomicU64,
}

impl LoopbackSource {
    /// Creates a source with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Delivers `update` to the listeners registered for its kind.
    ///
    /// # Errors
    ///
    /// Returns [`LoopbackError::NoListener`] if nobody listens to the kind.
    pub async fn push(&self, update: Update) -> LoopbackResult<()> {
        let targets: Vec<UpdateListener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(_, kind, _)| *kind == update.kind)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect();

        if targets.is_empty() {
            return Err(LoopbackError::NoListener(update.kind));
        }

        trace!(kind = %update.kind, listeners = targets.len(), "Delivering update");
        for listener in targets {
            listener(update.clone()).await;
        }
        Ok(())
    }

    /// Delivers an incoming plain message as a [`UpdateKind::NewMessage`].
    pub async fn push_message(&self, message: Message) -> LoopbackResult<()> {
        self.push(Update::plain(UpdateKind::NewMessage, message)).await
    }

    /// Parses one JSON-encoded [`Update`] and delivers it.
    pub async fn push_json(&self, line: &str) -> LoopbackResult<()> {
        let update: Update = serde_json::from_str(line)?;
        self.push(update).await
    }

    /// Drops every listener.
    ///
    /// A conversation listening on this source sees its queue close.
    pub fn close(&self) {
        let dropped = std::mem::take(&mut *self.listeners.lock());
        debug!(listeners = dropped.len(), "Closed loopback source");
    }
}

impl UpdateSource for LoopbackSource {
    fn add_listener(&self, kind: UpdateKind, listener: UpdateListener) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(%kind, %id, "Registered listener");
        self.listeners.lock().push((id, kind, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _, _)| *registered != id);
        let removed = listeners.len() < before;
        trace!(%id, removed, "Removed listener");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use parley_core::Peer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> UpdateListener {
        let counter = Arc::clone(counter);
        Arc::new(move |_update: Update| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {}.boxed()
        })
    }

    #[tokio::test]
    async fn test_push_reaches_matching_kind_only() {
        let source = LoopbackSource::new();
        let edits = Arc::new(AtomicUsize::new(0));
        let news = Arc::new(AtomicUsize::new(0));
        source.on_edit_message(counting(&edits));
        source.on_new_message(counting(&news));

        source
            .push_message(Message::incoming(1, Peer::User(1), "hi"))
            .await
            .unwrap();
        assert_eq!(news.load(Ordering::SeqCst), 1);
        assert_eq!(edits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_push_without_listener() {
        let source = LoopbackSource::new();
        let err = source
            .push_message(Message::incoming(1, Peer::User(1), "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoopbackError::NoListener(UpdateKind::NewMessage)));
    }

    #[tokio::test]
    async fn test_push_json() {
        let source = LoopbackSource::new();
        let edits = Arc::new(AtomicUsize::new(0));
        source.on_edit_message(counting(&edits));

        source
            .push_json(r#"{"kind":"edit_message","payload":"empty","id":3}"#)
            .await
            .unwrap();
        assert_eq!(edits.load(Ordering::SeqCst), 1);

        let err = source.push_json("not json").await.unwrap_err();
        assert!(matches!(err, LoopbackError::Decode(_)));
    }

    #[tokio::test]
    async fn test_removed_listener_is_not_invoked() {
        let source = LoopbackSource::new();
        let kept = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));
        source.on_new_message(counting(&kept));
        let id = source.on_new_message(counting(&removed));
        assert_eq!(source.listener_count(), 2);

        assert!(source.remove_listener(id));
        assert!(!source.remove_listener(id));
        assert_eq!(source.listener_count(), 1);

        source
            .push_message(Message::incoming(1, Peer::User(1), "hi"))
            .await
            .unwrap();
        assert_eq!(kept.load(Ordering::SeqCst), 1);
        assert_eq!(removed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_close_drops_listeners() {
        let source = LoopbackSource::new();
        source.on_new_message(counting(&Arc::new(AtomicUsize::new(0))));
        assert_eq!(source.listener_count(), 1);
        source.close();
        assert_eq!(source.listener_count(), 0);
    }
}
