//! Conversation context handed to handlers.
//!
//! One [`ConversationContext`] is created per dispatched message, wrapped in
//! an `Arc`, passed to the matched route's handler and dropped once the
//! handler returns. Nothing in it outlives the message it describes.

use regex::Regex;

use parley_core::{ApiResult, BoxedOutbound, Message, Peer};

use crate::error::{ExtractError, ExtractResult};

/// The read-only view of one dispatched message.
///
/// # Example
///
/// ```rust,ignore
/// async fn handle(ctx: Arc<ConversationContext>) -> anyhow::Result<Outcome> {
///     info!(text = %ctx.text(), "matched {}", ctx.route());
///     ctx.reply("/checkstats @alpha").await?;
///     Ok(Outcome::Continue)
/// }
/// ```
pub struct ConversationContext {
    message: Message,
    text: String,
    pattern: Regex,
    route: String,
    outbound: Option<BoxedOutbound>,
}

impl ConversationContext {
    pub(crate) fn new(
        message: Message,
        text: String,
        pattern: Regex,
        route: String,
        outbound: Option<BoxedOutbound>,
    ) -> Self {
        Self {
            message,
            text,
            pattern,
            route,
            outbound,
        }
    }

    /// Returns the message being handled.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the peer the message came from.
    pub fn peer(&self) -> Peer {
        self.message.peer
    }

    /// Returns the text the route matched against.
    ///
    /// This is the normalized text when strip normalization is enabled, and
    /// the raw message text otherwise.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the compiled pattern of the matched route.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns the label of the matched route.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the outbound handle, if the conversation has one.
    pub fn outbound(&self) -> Option<&BoxedOutbound> {
        self.outbound.as_ref()
    }

    /// Returns the outbound handle or an extraction error.
    pub fn require_outbound(&self) -> ExtractResult<BoxedOutbound> {
        self.outbound
            .clone()
            .ok_or(ExtractError::OutboundUnavailable)
    }

    /// Sends `text` back to the conversation partner.
    pub async fn reply(&self, text: &str) -> ApiResult<()> {
        match &self.outbound {
            Some(outbound) => outbound.send_text(self.peer(), text).await,
            None => Err(parley_core::ApiError::NotConnected),
        }
    }
}

impl std::fmt::Debug for ConversationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationContext")
            .field("message", &self.message)
            .field("text", &self.text)
            .field("route", &self.route)
            .field("has_outbound", &self.outbound.is_some())
            .finish_non_exhaustive()
    }
}
