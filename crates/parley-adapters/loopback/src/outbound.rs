//! Recording outbound handle.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use parley_core::{ApiError, ApiResult, CallbackAnswer, Outbound, Peer};

/// One call made through a [`LoopbackOutbound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCall {
    /// [`Outbound::send_text`].
    SendText {
        /// Recipient.
        peer: Peer,
        /// Message text.
        text: String,
    },
    /// [`Outbound::start_bot`].
    StartBot {
        /// The bot.
        bot: Peer,
        /// Start parameter.
        start_param: String,
    },
    /// [`Outbound::callback_answer`].
    Callback {
        /// Peer owning the message.
        peer: Peer,
        /// Message carrying the button.
        message_id: i32,
        /// Callback data.
        data: Vec<u8>,
    },
}

/// An [`Outbound`] that records calls instead of sending them.
///
/// Usernames resolve through a fixed table; callback queries answer with a
/// configurable [`CallbackAnswer`].
#[derive(Debug, Default)]
pub struct LoopbackOutbound {
    users: HashMap<String, Peer>,
    answer: CallbackAnswer,
    calls: Mutex<Vec<OutboundCall>>,
}

impl LoopbackOutbound {
    /// Creates an outbound handle that knows no usernames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `username` resolve to `peer`.
    pub fn with_user(mut self, username: impl Into<String>, peer: Peer) -> Self {
        self.users.insert(username.into().to_lowercase(), peer);
        self
    }

    /// Sets the answer returned to callback queries.
    pub fn with_callback_answer(mut self, answer: CallbackAnswer) -> Self {
        self.answer = answer;
        self
    }

    /// Returns a snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<OutboundCall> {
        self.calls.lock().clone()
    }

    /// Returns the recorded calls and clears the record.
    pub fn take_calls(&self) -> Vec<OutboundCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn record(&self, call: OutboundCall) {
        debug!(?call, "Recorded outbound call");
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Outbound for LoopbackOutbound {
    async fn send_text(&self, peer: Peer, text: &str) -> ApiResult<()> {
        self.record(OutboundCall::SendText {
            peer,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn start_bot(&self, bot: Peer, start_param: &str) -> ApiResult<()> {
        if !matches!(bot, Peer::User(_)) {
            return Err(ApiError::UnsupportedPeer {
                peer: bot.to_string(),
                operation: "start_bot",
            });
        }
        self.record(OutboundCall::StartBot {
            bot,
            start_param: start_param.to_string(),
        });
        Ok(())
    }

    async fn callback_answer(
        &self,
        peer: Peer,
        message_id: i32,
        data: &[u8],
    ) -> ApiResult<CallbackAnswer> {
        self.record(OutboundCall::Callback {
            peer,
            message_id,
            data: data.to_vec(),
        });
        Ok(self.answer.clone())
    }

    async fn resolve_username(&self, username: &str) -> ApiResult<Peer> {
        self.users
            .get(&username.to_lowercase())
            .copied()
            .ok_or_else(|| ApiError::UnresolvedUsername(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let outbound = LoopbackOutbound::new();
        outbound.send_text(Peer::User(1), "/start").await.unwrap();
        outbound.start_bot(Peer::User(2), "ref_42").await.unwrap();
        outbound.callback_answer(Peer::User(2), 9, b"buy").await.unwrap();

        assert_eq!(
            outbound.take_calls(),
            vec![
                OutboundCall::SendText {
                    peer: Peer::User(1),
                    text: "/start".into()
                },
                OutboundCall::StartBot {
                    bot: Peer::User(2),
                    start_param: "ref_42".into()
                },
                OutboundCall::Callback {
                    peer: Peer::User(2),
                    message_id: 9,
                    data: b"buy".to_vec()
                },
            ]
        );
        assert!(outbound.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_bot_rejects_channels() {
        let outbound = LoopbackOutbound::new();
        let err = outbound.start_bot(Peer::Channel(3), "x").await.unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedPeer { operation: "start_bot", .. }));
    }

    #[tokio::test]
    async fn test_resolve_username_is_case_insensitive() {
        let outbound = LoopbackOutbound::new().with_user("Price_Bot", Peer::User(77));
        assert_eq!(outbound.resolve_username("price_bot").await.unwrap(), Peer::User(77));
        assert!(matches!(
            outbound.resolve_username("nobody").await,
            Err(ApiError::UnresolvedUsername(name)) if name == "nobody"
        ));
    }
}
