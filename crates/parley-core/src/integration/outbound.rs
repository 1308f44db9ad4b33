//! Outbound API boundary.
//!
//! Outbound calls are thin, stateless wrappers over the transport client. The
//! conversation engine never calls them itself; handlers receive a handle
//! through their context when one is configured.

use std::sync::Arc;

use async_trait::async_trait;

use crate::foundation::error::ApiResult;
use crate::foundation::update::Peer;

/// The answer to a bot callback query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackAnswer {
    /// Text shown to the user, if any.
    pub message: Option<String>,
    /// URL the bot asked to open, if any.
    pub url: Option<String>,
    /// Whether the text should be shown as an alert.
    pub alert: bool,
}

/// Outgoing calls a handler may issue while conversing.
///
/// # Example
///
/// ```rust,ignore
/// async fn ask(outbound: BoxedOutbound) -> ApiResult<()> {
///     let bot = outbound.resolve_username("tgdb_bot").await?;
///     outbound.send_text(bot, "/resolve 7513073974").await
/// }
/// ```
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Sends a text message to `peer`.
    async fn send_text(&self, peer: Peer, text: &str) -> ApiResult<()>;

    /// Starts a conversation with a bot, passing deep-link start parameters.
    async fn start_bot(&self, bot: Peer, start_param: &str) -> ApiResult<()>;

    /// Presses an inline button by sending its callback data.
    async fn callback_answer(
        &self,
        peer: Peer,
        message_id: i32,
        data: &[u8],
    ) -> ApiResult<CallbackAnswer>;

    /// Resolves a public username to a peer.
    async fn resolve_username(&self, username: &str) -> ApiResult<Peer>;
}

/// A boxed outbound handle.
pub type BoxedOutbound = Arc<dyn Outbound>;
