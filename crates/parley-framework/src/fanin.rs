//! Fan-in of the three update streams into one queue.
//!
//! The transport calls one listener per update kind, possibly concurrently.
//! Each listener narrows the update to an incoming plain [`Message`] and hands
//! it to the dispatch loop. The handoff is unbuffered: a send completes only
//! once the loop has taken the message, so a listener stays suspended while
//! the previous message is still being dispatched.
//!
//! Listeners stay registered for as long as the [`Registration`] returned by
//! [`FanIn::install`] is alive.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use parley_core::{ListenerId, Message, Update, UpdateKind, UpdateListener, UpdateSource};

use crate::error::HandoffError;

/// A message together with the acknowledgement the loop sends on receipt.
#[derive(Debug)]
struct Handoff {
    message: Message,
    taken: oneshot::Sender<()>,
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (MessageSender, MessageReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (MessageSender { tx }, MessageReceiver { rx })
}

// ============================================================================
// MessageSender
// ============================================================================

/// The producing end of the fan-in queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::Sender<Handoff>,
}

impl MessageSender {
    /// Hands `message` to the dispatch loop and waits until the loop takes it.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError`] if the loop has ended; the message is dropped.
    pub async fn send(&self, message: Message) -> Result<(), HandoffError> {
        let id = message.id;
        let (taken, ack) = oneshot::channel();
        self.tx
            .send(Handoff { message, taken })
            .await
            .map_err(|_| HandoffError { id })?;
        ack.await.map_err(|_| HandoffError { id })
    }

    /// Returns `true` once the receiving end is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// MessageReceiver
// ============================================================================

/// The consuming end of the fan-in queue.
#[derive(Debug)]
pub struct MessageReceiver {
    rx: mpsc::Receiver<Handoff>,
}

impl MessageReceiver {
    /// Takes the next message and releases its sender.
    ///
    /// Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Message> {
        let Handoff { message, taken } = self.rx.recv().await?;
        let _ = taken.send(());
        Some(message)
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Keeps the fan-in listeners registered on their source.
///
/// Dropping it removes every listener it holds.
#[must_use = "the fan-in listeners are removed when the registration is dropped"]
pub struct Registration<'a> {
    source: &'a dyn UpdateSource,
    ids: Vec<ListenerId>,
}

impl Registration<'_> {
    /// Returns the ids of the registered listeners.
    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let source = self.source;
        let removed = self
            .ids
            .drain(..)
            .filter(|&id| source.remove_listener(id))
            .count();
        debug!(removed, "Detached fan-in listeners");
    }
}

impl fmt::Debug for Registration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// FanIn
// ============================================================================

/// Installs the fan-in listeners on an update source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanIn;

impl FanIn {
    /// Registers one listener per [`UpdateKind`] on `source`.
    ///
    /// Returns the receiver they all feed and the registration that keeps
    /// them attached.
    pub fn install(source: &dyn UpdateSource) -> (MessageReceiver, Registration<'_>) {
        let (tx, rx) = channel();
        let ids = UpdateKind::ALL
            .into_iter()
            .map(|kind| source.add_listener(kind, Self::listener(kind, tx.clone())))
            .collect();
        (rx, Registration { source, ids })
    }

    fn listener(kind: UpdateKind, tx: MessageSender) -> UpdateListener {
        Arc::new(move |update: Update| {
            let tx = tx.clone();
            async move {
                let Some(message) = update.into_incoming() else {
                    trace!(kind = kind.as_str(), "Skipped non-plain or outgoing update");
                    return;
                };
                if let Err(e) = tx.send(message).await {
                    trace!(kind = kind.as_str(), id = e.id, "Conversation ended, dropped message");
                }
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use parley_core::Peer;

    #[derive(Default)]
    struct Listeners(Mutex<Vec<(ListenerId, UpdateKind, UpdateListener)>>);

    impl UpdateSource for Listeners {
        fn add_listener(&self, kind: UpdateKind, listener: UpdateListener) -> ListenerId {
            let mut listeners = self.0.lock();
            let id = ListenerId::new(listeners.len() as u64);
            listeners.push((id, kind, listener));
            id
        }

        fn remove_listener(&self, id: ListenerId) -> bool {
            let mut listeners = self.0.lock();
            let before = listeners.len();
            listeners.retain(|(registered, _, _)| *registered != id);
            listeners.len() < before
        }
    }

    impl Listeners {
        fn get(&self, kind: UpdateKind) -> UpdateListener {
            let listeners = self.0.lock();
            let (_, _, listener) = listeners.iter().find(|(_, k, _)| *k == kind).unwrap();
            Arc::clone(listener)
        }
    }

    fn channel_msg(id: i32) -> Update {
        Update::plain(
            UpdateKind::NewChannelMessage,
            Message::incoming(id, Peer::Channel(3), "x"),
        )
    }

    #[tokio::test]
    async fn test_registers_all_kinds_until_dropped() {
        let source = Listeners::default();
        let (_rx, registration) = FanIn::install(&source);
        let kinds: Vec<_> = source.0.lock().iter().map(|(_, k, _)| *k).collect();
        assert_eq!(kinds, UpdateKind::ALL);
        assert_eq!(registration.ids().len(), 3);

        drop(registration);
        assert!(source.0.lock().is_empty());
    }

    #[tokio::test]
    async fn test_forwards_incoming_and_drops_outgoing() {
        let source = Listeners::default();
        let (mut rx, _registration) = FanIn::install(&source);

        let out = Update::plain(UpdateKind::NewMessage, Message::outgoing(1, Peer::User(5), "me"));
        source.get(UpdateKind::NewMessage)(out).await;
        let mut next = tokio_test::task::spawn(rx.recv());
        tokio_test::assert_pending!(next.poll());
        drop(next);

        let edit = Update::plain(UpdateKind::EditMessage, Message::incoming(2, Peer::User(5), "hi"));
        let ((), received) = tokio::join!(source.get(UpdateKind::EditMessage)(edit), rx.recv());
        assert_eq!(received.unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_send_completes_only_when_taken() {
        let source = Listeners::default();
        let (mut rx, _registration) = FanIn::install(&source);
        let listener = source.get(UpdateKind::NewChannelMessage);

        let mut first = tokio_test::task::spawn(listener(channel_msg(1)));
        tokio_test::assert_pending!(first.poll());
        tokio_test::assert_pending!(first.poll());

        assert_eq!(rx.recv().await.unwrap().id, 1);
        assert!(first.is_woken());
        tokio_test::assert_ready!(first.poll());

        // Nothing is buffered: the next send waits for the next `recv`.
        let mut second = tokio_test::task::spawn(listener(channel_msg(2)));
        tokio_test::assert_pending!(second.poll());
        tokio::task::yield_now().await;
        tokio_test::assert_pending!(second.poll());

        assert_eq!(rx.recv().await.unwrap().id, 2);
        tokio_test::assert_ready!(second.poll());
    }

    #[tokio::test]
    async fn test_closed_consumer_drops_silently() {
        let source = Listeners::default();
        let (rx, _registration) = FanIn::install(&source);
        drop(rx);
        source.get(UpdateKind::NewMessage)(Update::plain(
            UpdateKind::NewMessage,
            Message::incoming(1, Peer::User(1), "x"),
        ))
        .await;
    }

    #[tokio::test]
    async fn test_receiver_dropped_with_pending_handoff() {
        let (tx, rx) = channel();
        let mut pending = tokio_test::task::spawn(tx.send(Message::incoming(4, Peer::User(1), "x")));
        tokio_test::assert_pending!(pending.poll());

        drop(rx);
        let err = tokio_test::assert_ready_err!(pending.poll());
        assert_eq!(err.id, 4);
        assert!(tx.is_closed());
    }
}
