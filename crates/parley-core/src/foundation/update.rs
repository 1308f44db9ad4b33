//! Update model for the Parley toolkit.
//!
//! The transport emits raw updates in three categories. Each update carries a
//! message payload whose kind is decided once, at the adapter boundary:
//!
//! ```text
//! Update { kind, payload }
//! ├── UpdateKind::{NewMessage, EditMessage, NewChannelMessage}
//! └── MessagePayload
//!     ├── Plain(Message)          ← the only variant the engine ever routes
//!     ├── Empty { id }
//!     └── Service { id, peer }
//! ```
//!
//! Everything downstream of the fan-in channel works on an already narrowed
//! [`Message`] and never inspects the other payload variants.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Peer identity
// ============================================================================

/// The address of a conversation partner.
///
/// The transport uses a distinct representation per peer type. All of them map
/// into a single integer identity space through [`Peer::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Peer {
    /// A user or bot account.
    User(i64),
    /// A basic group chat.
    Chat(i64),
    /// A channel or supergroup.
    Channel(i64),
    /// An address the adapter could not resolve.
    #[serde(other)]
    Unknown,
}

impl Peer {
    /// Returns the identity of this peer, or `None` for [`Peer::Unknown`].
    ///
    /// `None` never equals a configured target identity, so messages from
    /// unresolved peers are always filtered out.
    pub fn id(&self) -> Option<i64> {
        match *self {
            Self::User(id) | Self::Chat(id) | Self::Channel(id) => Some(id),
            Self::Unknown => None,
        }
    }

    /// Returns `true` if this peer resolves to `target`.
    pub fn is(&self, target: i64) -> bool {
        self.id() == Some(target)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Chat(id) => write!(f, "chat:{id}"),
            Self::Channel(id) => write!(f, "channel:{id}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// A plain text message received from the transport.
///
/// Immutable once produced by the adapter. The dispatch loop consumes each
/// message exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Transport-assigned message id, unique within its peer.
    pub id: i32,
    /// The conversation this message belongs to.
    pub peer: Peer,
    /// Raw message text.
    #[serde(default)]
    pub text: String,
    /// Set when the message was sent by this account.
    #[serde(default)]
    pub out: bool,
}

impl Message {
    /// Creates an incoming message.
    pub fn incoming(id: i32, peer: Peer, text: impl Into<String>) -> Self {
        Self {
            id,
            peer,
            text: text.into(),
            out: false,
        }
    }

    /// Creates an outgoing (self-sent) message.
    pub fn outgoing(id: i32, peer: Peer, text: impl Into<String>) -> Self {
        Self {
            out: true,
            ..Self::incoming(id, peer, text)
        }
    }
}

/// The payload carried by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum MessagePayload {
    /// A regular message with text.
    Plain(Message),
    /// A deleted or otherwise unavailable message.
    Empty {
        /// Message id.
        id: i32,
    },
    /// A service notification (member joined, title changed, ...).
    Service {
        /// Message id.
        id: i32,
        /// The conversation the notification belongs to.
        peer: Peer,
    },
}

impl MessagePayload {
    /// Returns the plain message, if this payload is one.
    pub fn as_plain(&self) -> Option<&Message> {
        match self {
            Self::Plain(message) => Some(message),
            _ => None,
        }
    }

    /// Consumes the payload, returning the plain message if there is one.
    pub fn into_plain(self) -> Option<Message> {
        match self {
            Self::Plain(message) => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// Updates
// ============================================================================

/// The update categories a transport delivers to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// A new message in a private chat or basic group.
    NewMessage,
    /// A message was edited.
    EditMessage,
    /// A new message in a channel or supergroup.
    NewChannelMessage,
}

impl UpdateKind {
    /// All update kinds, in listener registration order.
    pub const ALL: [Self; 3] = [Self::EditMessage, Self::NewMessage, Self::NewChannelMessage];

    /// Returns the snake_case name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewMessage => "new_message",
            Self::EditMessage => "edit_message",
            Self::NewChannelMessage => "new_channel_message",
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw update emitted by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Which listener category this update is delivered to.
    pub kind: UpdateKind,
    /// The message payload.
    #[serde(flatten)]
    pub payload: MessagePayload,
}

impl Update {
    /// Creates an update carrying a plain message.
    pub fn plain(kind: UpdateKind, message: Message) -> Self {
        Self {
            kind,
            payload: MessagePayload::Plain(message),
        }
    }

    /// Returns the incoming plain message carried by this update.
    ///
    /// Returns `None` for empty and service payloads and for outgoing
    /// messages, which are never routed.
    pub fn into_incoming(self) -> Option<Message> {
        self.payload.into_plain().filter(|m| !m.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_identity_space() {
        assert_eq!(Peer::User(7).id(), Some(7));
        assert_eq!(Peer::Chat(8).id(), Some(8));
        assert_eq!(Peer::Channel(9).id(), Some(9));
        assert_eq!(Peer::Unknown.id(), None);
        assert!(Peer::Channel(9).is(9));
        assert!(!Peer::Unknown.is(0));
    }

    #[test]
    fn test_into_incoming_narrows_payload() {
        let msg = Message::incoming(1, Peer::User(5), "hi");
        assert_eq!(
            Update::plain(UpdateKind::NewMessage, msg.clone()).into_incoming(),
            Some(msg)
        );

        let out = Message::outgoing(2, Peer::User(5), "me");
        assert!(Update::plain(UpdateKind::NewMessage, out).into_incoming().is_none());

        let service = Update {
            kind: UpdateKind::NewChannelMessage,
            payload: MessagePayload::Service {
                id: 3,
                peer: Peer::Channel(5),
            },
        };
        assert!(service.into_incoming().is_none());

        let empty = Update {
            kind: UpdateKind::EditMessage,
            payload: MessagePayload::Empty { id: 4 },
        };
        assert!(empty.into_incoming().is_none());
    }

    #[test]
    fn test_update_from_json() {
        let raw = r#"{
            "kind": "new_channel_message",
            "payload": "plain",
            "id": 42,
            "peer": { "type": "channel", "id": 1001 },
            "text": "New pair"
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.kind, UpdateKind::NewChannelMessage);
        let msg = update.into_incoming().unwrap();
        assert_eq!(msg.peer, Peer::Channel(1001));
        assert_eq!(msg.text, "New pair");
        assert!(!msg.out);
    }
}
