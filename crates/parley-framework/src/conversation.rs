//! The conversation engine.
//!
//! A [`Conversation`] is built in two phases. During setup, routes are
//! registered with [`Conversation::handle`]. [`Conversation::listen`] then
//! consumes the engine, installs the fan-in listeners and runs the dispatch
//! loop until a handler returns [`Outcome::Terminate`](crate::Outcome).
//!
//! ```rust,ignore
//! let mut conversation = Conversation::resolve("price_bot", outbound.clone())
//!     .await?
//!     .strip(true);
//!
//! conversation
//!     .handle(r"^Price:\$([0-9]+)$", on_price)?
//!     .handle("^Pleasewait", || async {})?;
//!
//! outbound.send_text(conversation.peer(), "/price").await?;
//! let report = conversation.listen(&source).await?;
//! ```

use tracing::{info, warn};

use parley_core::{ApiError, ApiResult, BoxedOutbound, Peer, UpdateSource};

use crate::dispatcher::{Dispatcher, ListenReport};
use crate::error::{ListenError, ListenResult, RouteResult};
use crate::fanin::{FanIn, MessageReceiver};
use crate::filter::ConversationFilter;
use crate::handler::Handler;
use crate::normalize::Normalizer;
use crate::route::{Route, RouteTable};

/// A routing engine bound to one counterpart.
pub struct Conversation {
    peer: Peer,
    filter: ConversationFilter,
    normalizer: Normalizer,
    routes: RouteTable,
    outbound: Option<BoxedOutbound>,
}

impl Conversation {
    /// Creates an engine for the counterpart with identity `target`.
    ///
    /// Messages from users, chats and channels carrying this identity are
    /// accepted.
    pub fn new(target: i64) -> Self {
        Self::with_peer(Peer::User(target), ConversationFilter::new(target))
    }

    fn with_peer(peer: Peer, filter: ConversationFilter) -> Self {
        Self {
            peer,
            filter,
            normalizer: Normalizer::Raw,
            routes: RouteTable::new(),
            outbound: None,
        }
    }

    /// Resolves `username` and creates an engine for the resulting peer.
    ///
    /// The outbound handle is kept and exposed to handlers.
    pub async fn resolve(username: &str, outbound: BoxedOutbound) -> ApiResult<Self> {
        let username = username.trim_start_matches('@');
        let peer = outbound.resolve_username(username).await?;
        let filter = ConversationFilter::for_peer(peer)
            .ok_or_else(|| ApiError::UnresolvedUsername(username.to_string()))?;

        info!(username, peer = %peer, "Resolved conversation target");
        Ok(Self::with_peer(peer, filter).with_outbound(outbound))
    }

    /// Enables or disables strip normalization.
    pub fn strip(mut self, strip: bool) -> Self {
        self.normalizer = Normalizer::from_flag(strip);
        self
    }

    /// Sets the outbound handle exposed to handlers.
    pub fn with_outbound(mut self, outbound: BoxedOutbound) -> Self {
        self.outbound = Some(outbound);
        self
    }

    /// Returns the target identity.
    pub fn target(&self) -> i64 {
        self.filter.target()
    }

    /// Returns the target peer.
    ///
    /// For engines created with [`Conversation::new`] the peer type is not
    /// known and a user peer is assumed.
    pub fn peer(&self) -> Peer {
        self.peer
    }

    /// Returns the registered routes.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Registers a handler for messages matching `pattern`.
    ///
    /// Routes are tried in registration order. An invalid pattern is
    /// reported here, before any message is processed.
    pub fn handle<F, T>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        let route = Route::new(pattern, handler)?;
        Ok(self.route(route))
    }

    /// Registers a named handler. The name replaces the pattern in logs and
    /// in [`ListenReport::terminated_by`].
    pub fn handle_named<F, T>(
        &mut self,
        name: &str,
        pattern: &str,
        handler: F,
    ) -> RouteResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        let route = Route::new(pattern, handler)?.name(name);
        Ok(self.route(route))
    }

    /// Appends a pre-built route.
    pub fn route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// Finishes setup and returns the per-message dispatcher.
    pub fn into_dispatcher(self) -> Dispatcher {
        Dispatcher::new(self.filter, self.normalizer, self.routes, self.outbound)
    }

    /// Subscribes to `source` and dispatches messages until a handler
    /// terminates the conversation.
    ///
    /// The fan-in listeners are removed from `source` when this returns or
    /// when the future is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ListenError::SourceClosed`] if the source drops every
    /// listener first.
    pub async fn listen(self, source: &dyn UpdateSource) -> ListenResult<ListenReport> {
        let (receiver, _registration) = FanIn::install(source);
        self.listen_on(receiver).await
    }

    /// Runs the dispatch loop on an already installed fan-in queue.
    pub async fn listen_on(self, mut receiver: MessageReceiver) -> ListenResult<ListenReport> {
        let dispatcher = self.into_dispatcher();
        info!(
            target_id = dispatcher.filter().target(),
            routes = dispatcher.routes().len(),
            "Listening"
        );

        let mut report = ListenReport::default();
        while let Some(message) = receiver.recv().await {
            let dispatch = dispatcher.dispatch(&message).await;
            report.record(&dispatch);
            if dispatch.is_terminal() {
                info!(
                    received = report.received,
                    unmatched = report.unmatched,
                    failed = report.failed,
                    "Stopped listening"
                );
                return Ok(report);
            }
        }

        warn!(received = report.received, "Update source closed");
        Err(ListenError::SourceClosed)
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("peer", &self.peer)
            .field("normalizer", &self.normalizer)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}
