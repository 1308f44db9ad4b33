//! Extractor system for handler parameters.
//!
//! Handlers declare what they need as parameters and the framework extracts
//! each one from the [`ConversationContext`] before calling them:
//!
//! ```rust,ignore
//! async fn on_stats(caps: Captures, outbound: BoxedOutbound) -> anyhow::Result<Outcome> {
//!     let username = caps.get(1).unwrap_or_default();
//!     outbound.send_text(Peer::User(1), &format!("/track @{username}")).await?;
//!     Ok(Outcome::Terminate)
//! }
//! ```
//!
//! # Error Handling
//!
//! If an extractor fails, the handler is not called and the dispatch counts
//! as [`Outcome::Failed`](crate::Outcome::Failed). Optional extractors with
//! [`Option<T>`] never fail.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use regex::Regex;

use parley_core::{BoxedOutbound, Message};

use crate::context::ConversationContext;
use crate::error::{ExtractError, ExtractResult};

/// A trait for types that can be extracted from a [`ConversationContext`].
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self>;
}

impl FromContext for Arc<ConversationContext> {
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self> {
        Ok(Arc::clone(ctx))
    }
}

impl FromContext for Message {
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self> {
        Ok(ctx.message().clone())
    }
}

/// Fails with [`ExtractError::OutboundUnavailable`] when the conversation was
/// built without an outbound handle.
impl FromContext for BoxedOutbound {
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self> {
        ctx.require_outbound()
    }
}

impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

// ============================================================================
// Text
// ============================================================================

/// The text the route matched against (normalized when strip is enabled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl Text {
    /// Returns the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for Text {
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self> {
        Ok(Self(ctx.text().to_string()))
    }
}

// ============================================================================
// Captures
// ============================================================================

/// Capture groups of the first match of the route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    groups: Vec<Option<String>>,
    names: HashMap<String, usize>,
}

impl Captures {
    fn from_match(pattern: &Regex, caps: &regex::Captures<'_>) -> Self {
        let groups = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        let names = pattern
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|n| (n.to_string(), i)))
            .collect();
        Self { groups, names }
    }

    /// Returns group `index` (0 is the whole match).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// Returns the named group `name`.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.names.get(name).and_then(|&i| self.get(i))
    }

    /// Returns the whole match.
    pub fn whole(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Returns the number of groups, including the whole match.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromContext for Captures {
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self> {
        let pattern = ctx.pattern();
        pattern
            .captures(ctx.text())
            .map(|caps| Self::from_match(pattern, &caps))
            .ok_or_else(|| ExtractError::custom("route pattern does not match the message text"))
    }
}

/// Capture groups of every non-overlapping match of the route pattern.
///
/// Useful for messages that list several records matching the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllCaptures(pub Vec<Captures>);

impl Deref for AllCaptures {
    type Target = [Captures];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for AllCaptures {
    fn from_context(ctx: &Arc<ConversationContext>) -> ExtractResult<Self> {
        let pattern = ctx.pattern();
        Ok(Self(
            pattern
                .captures_iter(ctx.text())
                .map(|caps| Captures::from_match(pattern, &caps))
                .collect(),
        ))
    }
}
