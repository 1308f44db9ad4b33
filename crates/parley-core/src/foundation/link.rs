//! Message deep links.
//!
//! Two link shapes are recognised:
//!
//! - `https://t.me/<username>/<message-id>` points at a single message;
//! - `https://t.me/<username>?start=<param>` opens a bot with start parameters,
//!   which are sent with [`Outbound::start_bot`](crate::Outbound::start_bot).

use url::Url;

use super::error::{LinkError, LinkResult};

/// A parsed deep link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDeepLink {
    /// The username the link points at.
    pub username: String,
    /// The linked message, for message links.
    pub message_id: Option<i32>,
    /// The `start` query parameter, for bot start links.
    pub start_param: Option<String>,
}

impl MessageDeepLink {
    /// Parses a deep link.
    ///
    /// Extra path segments after the message id are ignored. A start link
    /// without a `start` query parameter parses with `start_param: None`.
    pub fn parse(link: &str) -> LinkResult<Self> {
        let url = Url::parse(link).map_err(|e| LinkError::InvalidUrl {
            link: link.to_string(),
            reason: e.to_string(),
        })?;

        let mut segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty());

        let username = segments
            .next()
            .ok_or(LinkError::MissingUsername)?
            .to_string();

        if let Some(raw_id) = segments.next() {
            let message_id = raw_id
                .parse::<i32>()
                .map_err(|_| LinkError::InvalidMessageId(raw_id.to_string()))?;
            return Ok(Self {
                username,
                message_id: Some(message_id),
                start_param: None,
            });
        }

        let start_param = url
            .query_pairs()
            .find(|(key, _)| key == "start")
            .map(|(_, value)| value.into_owned());

        Ok(Self {
            username,
            message_id: None,
            start_param,
        })
    }

    /// Returns `true` if this link points at a single message.
    pub fn is_message_link(&self) -> bool {
        self.message_id.is_some()
    }
}

impl std::str::FromStr for MessageDeepLink {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
