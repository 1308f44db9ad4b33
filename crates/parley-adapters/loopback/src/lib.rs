//! Loopback adapter for Parley.
//!
//! An in-process stand-in for the remote transport. [`LoopbackSource`]
//! delivers updates pushed by the caller (as values or JSON lines) to the
//! registered listeners, and [`LoopbackOutbound`] records every outgoing call
//! instead of sending it anywhere.
//!
//! ```rust,ignore
//! use parley_adapter_loopback::{LoopbackOutbound, LoopbackSource};
//!
//! let source = Arc::new(LoopbackSource::new());
//! let outbound = Arc::new(LoopbackOutbound::new().with_user("price_bot", Peer::User(77)));
//!
//! source
//!     .push_json(r#"{"kind":"new_message","payload":"plain","id":1,
//!                    "peer":{"type":"user","id":77},"text":"Price: $12","out":false}"#)
//!     .await?;
//! ```

mod error;
mod outbound;
mod source;

pub use error::{LoopbackError, LoopbackResult};
pub use outbound::{LoopbackOutbound, OutboundCall};
pub use source::LoopbackSource;
