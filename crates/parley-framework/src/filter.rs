//! Conversation filter.

use parley_core::{Message, Peer};

/// Keeps only messages exchanged with one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationFilter {
    target: i64,
}

impl ConversationFilter {
    /// Creates a filter for the given target identity.
    pub fn new(target: i64) -> Self {
        Self { target }
    }

    /// Creates a filter for a resolved peer.
    ///
    /// Returns `None` for [`Peer::Unknown`], which has no identity to filter on.
    pub fn for_peer(peer: Peer) -> Option<Self> {
        peer.id().map(Self::new)
    }

    /// Returns the target identity.
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Returns `true` if `message` belongs to the target conversation.
    pub fn accepts(&self, message: &Message) -> bool {
        message.peer.is(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_any_peer_type_with_same_id() {
        let filter = ConversationFilter::new(42);
        assert!(filter.accepts(&Message::incoming(1, Peer::User(42), "")));
        assert!(filter.accepts(&Message::incoming(1, Peer::Chat(42), "")));
        assert!(filter.accepts(&Message::incoming(1, Peer::Channel(42), "")));
        assert!(!filter.accepts(&Message::incoming(1, Peer::User(43), "")));
    }

    #[test]
    fn test_unknown_peer_never_matches() {
        let filter = ConversationFilter::new(0);
        assert!(!filter.accepts(&Message::incoming(1, Peer::Unknown, "")));
        assert!(ConversationFilter::for_peer(Peer::Unknown).is_none());
        assert_eq!(
            ConversationFilter::for_peer(Peer::Channel(5)).map(|f| f.target()),
            Some(5)
        );
    }
}
