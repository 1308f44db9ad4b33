//! End-to-end conversations through the loopback adapter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::Poll;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use parley_adapter_loopback::{LoopbackError, LoopbackOutbound, LoopbackSource, OutboundCall};
use parley_core::{BoxedOutbound, Message, MessagePayload, Peer, Update, UpdateKind};
use parley_framework::{
    Captures, Conversation, ConversationContext, FanIn, ListenError, ListenReport, Outcome, fanin,
};

const BOT: i64 = 77;

fn from_bot(id: i32, text: &str) -> Message {
    Message::incoming(id, Peer::User(BOT), text)
}

#[tokio::test]
async fn test_resolved_conversation_replies_and_terminates() {
    let source = Arc::new(LoopbackSource::new());
    let outbound = Arc::new(LoopbackOutbound::new().with_user("price_bot", Peer::User(BOT)));

    let mut conversation = Conversation::resolve("@price_bot", outbound.clone())
        .await
        .unwrap()
        .strip(true);
    assert_eq!(conversation.target(), BOT);

    let prices = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&prices);
    conversation
        .handle_named("menu", "^Choose", |ctx: Arc<ConversationContext>| async move {
            ctx.reply("/price").await
        })
        .unwrap()
        .handle_named("price", r"^Price:\$([0-9]+)$", move |caps: Captures| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(caps.get(1).unwrap_or_default().to_string());
                Outcome::Terminate
            }
        })
        .unwrap();

    let (receiver, _registration) = FanIn::install(source.as_ref());
    let listening = tokio::spawn(conversation.listen_on(receiver));

    source.push_message(from_bot(1, "Choose an option 👇")).await.unwrap();
    source
        .push(Update {
            kind: UpdateKind::NewMessage,
            payload: MessagePayload::Service {
                id: 2,
                peer: Peer::User(BOT),
            },
        })
        .await
        .unwrap();
    source
        .push(Update::plain(
            UpdateKind::EditMessage,
            Message::outgoing(3, Peer::User(BOT), "Price: $1"),
        ))
        .await
        .unwrap();
    source
        .push(Update::plain(UpdateKind::EditMessage, from_bot(4, "Price: $ 12")))
        .await
        .unwrap();

    let report = listening.await.unwrap().unwrap();
    assert_eq!(report.received, 2);
    assert_eq!(report.terminated_by.as_deref(), Some("price"));
    assert_eq!(*prices.lock(), ["12"]);
    assert_eq!(
        outbound.calls(),
        [OutboundCall::SendText {
            peer: Peer::User(BOT),
            text: "/price".into()
        }]
    );
}

#[tokio::test]
async fn test_messages_after_termination_are_dropped() {
    let source = LoopbackSource::new();
    let mut conversation = Conversation::new(BOT);
    conversation.handle("^bye$", || async { Outcome::Terminate }).unwrap();

    let (receiver, _registration) = FanIn::install(&source);
    let listening = tokio::spawn(conversation.listen_on(receiver));

    source.push_message(from_bot(1, "bye")).await.unwrap();
    let report = listening.await.unwrap().unwrap();
    assert_eq!(report.handled, 1);

    // The queue is gone but the listeners are still attached; pushing must
    // neither block nor fail.
    source.push_message(from_bot(2, "bye")).await.unwrap();
}

/// Runs a conversation on `source` that ends at the first "bye".
async fn until_bye(source: &Arc<LoopbackSource>) -> ListenReport {
    let mut conversation = Conversation::new(BOT);
    conversation.handle("^bye$", || async { Outcome::Terminate }).unwrap();

    let attached = Arc::clone(source);
    let listening = tokio::spawn(async move { conversation.listen(attached.as_ref()).await });
    while source.listener_count() < UpdateKind::ALL.len() {
        tokio::task::yield_now().await;
    }

    source.push_message(from_bot(1, "bye")).await.unwrap();
    listening.await.unwrap().unwrap()
}

#[tokio::test]
async fn test_listen_detaches_from_source() {
    let source = Arc::new(LoopbackSource::new());

    for _ in 0..3 {
        let report = until_bye(&source).await;
        assert_eq!(report.handled, 1);
        assert_eq!(source.listener_count(), 0);
    }

    let err = source.push_message(from_bot(2, "bye")).await.unwrap_err();
    assert!(matches!(err, LoopbackError::NoListener(UpdateKind::NewMessage)));
}

#[tokio::test]
async fn test_push_waits_while_handler_runs() {
    let source = Arc::new(LoopbackSource::new());
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let mut conversation = Conversation::new(BOT);
    let (entered, gate) = (Arc::clone(&started), Arc::clone(&release));
    conversation
        .handle("^slow$", move || {
            let (entered, gate) = (Arc::clone(&entered), Arc::clone(&gate));
            async move {
                entered.notify_one();
                gate.notified().await;
            }
        })
        .unwrap()
        .handle("^bye$", || async { Outcome::Terminate })
        .unwrap();

    let attached = Arc::clone(&source);
    let listening = tokio::spawn(async move { conversation.listen(attached.as_ref()).await });
    while source.listener_count() < UpdateKind::ALL.len() {
        tokio::task::yield_now().await;
    }

    source.push_message(from_bot(1, "slow")).await.unwrap();
    started.notified().await;

    let mut second = tokio_test::task::spawn(source.push_message(from_bot(2, "bye")));
    tokio_test::assert_pending!(second.poll());
    for _ in 0..5 {
        tokio::task::yield_now().await;
        tokio_test::assert_pending!(second.poll());
    }

    release.notify_one();
    loop {
        tokio::task::yield_now().await;
        if let Poll::Ready(pushed) = second.poll() {
            pushed.unwrap();
            break;
        }
    }

    let report = listening.await.unwrap().unwrap();
    assert_eq!(report.handled, 2);
    assert_eq!(report.terminated_by.as_deref(), Some("^bye$"));
}

#[tokio::test]
async fn test_listen_reports_closed_source() {
    let source = LoopbackSource::new();
    let conversation = Conversation::new(BOT);

    let (receiver, _registration) = FanIn::install(&source);
    source.close();

    let err = conversation.listen_on(receiver).await.unwrap_err();
    assert!(matches!(err, ListenError::SourceClosed));
}

#[tokio::test]
async fn test_missing_outbound_is_recoverable() {
    let source = LoopbackSource::new();
    let mut conversation = Conversation::new(BOT);
    conversation
        .handle("^send$", |_outbound: BoxedOutbound| async { Outcome::Terminate })
        .unwrap()
        .handle("^stop$", || async { Outcome::Terminate })
        .unwrap();

    let (receiver, _registration) = FanIn::install(&source);
    let listening = tokio::spawn(conversation.listen_on(receiver));

    source.push_message(from_bot(1, "send")).await.unwrap();
    source.push_message(from_bot(2, "stop")).await.unwrap();

    let report = listening.await.unwrap().unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.terminated_by.as_deref(), Some("^stop$"));
}

// ============================================================================
// Unmatched accounting
// ============================================================================

#[derive(Clone, Default)]
struct CountUnmatched(Arc<AtomicUsize>);

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for CountUnmatched {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if visitor.0.as_deref() == Some("No route matched") {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn test_unmatched_is_logged_once_per_message() {
    let counter = CountUnmatched::default();
    let subscriber = Registry::default().with(counter.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut conversation = Conversation::new(BOT);
    conversation
        .handle("^a$", || async {})
        .unwrap()
        .handle("^b$", || async {})
        .unwrap()
        .handle("^c$", || async {})
        .unwrap()
        .handle("^end$", || async { Outcome::Terminate })
        .unwrap();

    let (tx, rx) = fanin::channel();
    tokio::spawn(async move {
        for message in [from_bot(1, "x"), from_bot(2, "y"), from_bot(3, "end")] {
            tx.send(message).await.unwrap();
        }
    });

    let report = conversation.listen_on(rx).await.unwrap();
    assert_eq!(report.unmatched, 2);
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
}
