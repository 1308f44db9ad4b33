//! Route table.
//!
//! A [`Route`] pairs a compiled regular expression with a handler. A
//! [`RouteTable`] holds routes in registration order and selects the first
//! one whose pattern matches the text; later routes are never consulted for
//! that message, even if they would match too.
//!
//! # Tower Service Integration
//!
//! `Route` implements `tower::Service<Arc<ConversationContext>>`, so a single
//! route can be driven through tower middleware:
//!
//! ```rust,ignore
//! use tower::ServiceExt;
//!
//! let route = Route::new("^/ping", || async { Outcome::Continue })?;
//! let outcome = route.oneshot(ctx).await?;
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use regex::Regex;
use tower::Service;
use tracing::trace;

use crate::context::ConversationContext;
use crate::error::{RouteError, RouteResult};
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::outcome::Outcome;

/// A compiled pattern and the handler it selects.
///
/// Cloning is cheap: the pattern and handler are reference counted.
#[derive(Clone)]
pub struct Route {
    pattern: Regex,
    handler: BoxedHandler,
    name: Option<String>,
}

impl Route {
    /// Compiles `pattern` and pairs it with `handler`.
    pub fn new<F, T>(pattern: &str, handler: F) -> RouteResult<Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        Self::from_boxed(pattern, into_handler(handler))
    }

    /// Compiles `pattern` and pairs it with a pre-built boxed handler.
    pub fn from_boxed(pattern: &str, handler: BoxedHandler) -> RouteResult<Self> {
        let pattern = Regex::new(pattern).map_err(|source| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            handler,
            name: None,
        })
    }

    /// Sets a name for this route (used in logs and reports).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the name of this route, or its pattern if unnamed.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.pattern.as_str())
    }

    /// Returns the compiled pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns `true` if the pattern matches anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Runs the handler.
    pub async fn invoke(&self, ctx: Arc<ConversationContext>) -> Outcome {
        (self.handler)(ctx).await
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Service<Arc<ConversationContext>> for Route {
    type Response = Outcome;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Arc<ConversationContext>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        Box::pin(async move { Ok(handler(ctx).await) })
    }
}

// ============================================================================
// RouteTable
// ============================================================================

/// An ordered, append-only collection of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Routes are matched in the order they are pushed.
    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns the first route whose pattern matches `text`, with its index.
    pub fn find(&self, text: &str) -> Option<(usize, &Route)> {
        self.routes.iter().enumerate().find(|(index, route)| {
            let matched = route.matches(text);
            trace!(route = route.label(), index, matched, "Tested route");
            matched
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Message, Peer};
    use tower::ServiceExt;

    fn noop() -> impl Handler<()> {
        || async {}
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = Route::new("[", noop()).unwrap_err();
        let RouteError::InvalidPattern { pattern, .. } = &err;
        assert_eq!(pattern, "[");
        assert!(err.to_string().contains("failed to compile"));
    }

    #[test]
    fn test_first_match_wins() {
        let mut table = RouteTable::new();
        table.push(Route::new("^a", noop()).unwrap().name("first"));
        table.push(Route::new("a", noop()).unwrap().name("second"));
        table.push(Route::new(".*", noop()).unwrap());

        let (index, route) = table.find("abc").unwrap();
        assert_eq!(index, 0);
        assert_eq!(route.label(), "first");

        let (index, route) = table.find("bac").unwrap();
        assert_eq!(index, 1);
        assert_eq!(route.label(), "second");

        let (index, route) = table.find("zzz").unwrap();
        assert_eq!(index, 2);
        assert_eq!(route.label(), ".*");
    }

    #[test]
    fn test_no_match() {
        let mut table = RouteTable::new();
        table.push(Route::new("^/start$", noop()).unwrap());
        assert!(table.find("/stop").is_none());
        assert!(RouteTable::new().find("anything").is_none());
    }

    #[tokio::test]
    async fn test_route_as_tower_service() {
        let route = Route::new("done", || async { Outcome::Terminate }).unwrap();
        let ctx = Arc::new(ConversationContext::new(
            Message::incoming(1, Peer::User(1), "done"),
            "done".to_string(),
            route.pattern().clone(),
            route.label().to_string(),
            None,
        ));
        let outcome = route.oneshot(ctx).await.unwrap();
        assert!(outcome.is_terminate());
    }
}
