//! Per-message dispatch.
//!
//! The [`Dispatcher`] owns everything one message goes through on its way to
//! a handler: the conversation filter, the normalizer and the route table.
//! [`Dispatcher::dispatch`] handles exactly one message and reports which
//! transition it took; the receive loop lives in
//! [`Conversation`](crate::Conversation).

use std::sync::Arc;

use tracing::{debug, error, info, trace};

use parley_core::{BoxedOutbound, Message};

use crate::context::ConversationContext;
use crate::error::BoxError;
use crate::filter::ConversationFilter;
use crate::normalize::Normalizer;
use crate::outcome::Outcome;
use crate::route::RouteTable;

/// What happened to one dispatched message.
#[derive(Debug)]
pub enum Dispatch {
    /// The message belongs to another conversation.
    Filtered,
    /// No route matched; the message was dropped.
    Unmatched,
    /// A handler ran and asked to keep listening.
    Continued {
        /// Label of the route that handled the message.
        route: String,
    },
    /// A handler failed; the conversation keeps listening.
    Failed {
        /// Label of the route whose handler failed.
        route: String,
        /// The handler's error.
        error: BoxError,
    },
    /// A handler ended the conversation.
    Terminated {
        /// Label of the terminating route.
        route: String,
    },
}

impl Dispatch {
    /// Returns `true` if the conversation must stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated { .. })
    }
}

/// Counters collected while listening.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenReport {
    /// Messages taken from the fan-in queue.
    pub received: u64,
    /// Messages from other conversations.
    pub filtered: u64,
    /// Messages no route matched.
    pub unmatched: u64,
    /// Handler invocations that returned continue or terminate.
    pub handled: u64,
    /// Handler invocations that failed.
    pub failed: u64,
    /// Label of the route that ended the conversation.
    pub terminated_by: Option<String>,
}

impl ListenReport {
    /// Records the result of one dispatch.
    pub fn record(&mut self, dispatch: &Dispatch) {
        self.received += 1;
        match dispatch {
            Dispatch::Filtered => self.filtered += 1,
            Dispatch::Unmatched => self.unmatched += 1,
            Dispatch::Continued { .. } => self.handled += 1,
            Dispatch::Failed { .. } => self.failed += 1,
            Dispatch::Terminated { route } => {
                self.handled += 1;
                self.terminated_by = Some(route.clone());
            }
        }
    }
}

/// Filters, normalizes and routes messages for one conversation.
#[derive(Clone)]
pub struct Dispatcher {
    filter: ConversationFilter,
    normalizer: Normalizer,
    routes: RouteTable,
    outbound: Option<BoxedOutbound>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    pub fn new(
        filter: ConversationFilter,
        normalizer: Normalizer,
        routes: RouteTable,
        outbound: Option<BoxedOutbound>,
    ) -> Self {
        Self {
            filter,
            normalizer,
            routes,
            outbound,
        }
    }

    /// Returns the conversation filter.
    pub fn filter(&self) -> &ConversationFilter {
        &self.filter
    }

    /// Returns the route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Dispatches one message to the first matching route.
    pub async fn dispatch(&self, message: &Message) -> Dispatch {
        if !self.filter.accepts(message) {
            trace!(
                id = message.id,
                peer = %message.peer,
                target_id = self.filter.target(),
                "Message from another conversation"
            );
            return Dispatch::Filtered;
        }

        let text = self.normalizer.apply(&message.text);
        let Some((index, route)) = self.routes.find(&text) else {
            debug!(id = message.id, text = %text, "No route matched");
            return Dispatch::Unmatched;
        };

        let label = route.label().to_string();
        debug!(id = message.id, route = %label, index, "Route matched");

        let ctx = Arc::new(ConversationContext::new(
            message.clone(),
            text.into_owned(),
            route.pattern().clone(),
            label.clone(),
            self.outbound.clone(),
        ));

        match route.invoke(ctx).await {
            Outcome::Continue => Dispatch::Continued { route: label },
            Outcome::Terminate => {
                info!(id = message.id, route = %label, "Conversation terminated");
                Dispatch::Terminated { route: label }
            }
            Outcome::Failed(e) => {
                error!(id = message.id, route = %label, error = %e, "Handler failed");
                Dispatch::Failed {
                    route: label,
                    error: e,
                }
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("filter", &self.filter)
            .field("normalizer", &self.normalizer)
            .field("routes", &self.routes)
            .field("has_outbound", &self.outbound.is_some())
            .finish()
    }
}
