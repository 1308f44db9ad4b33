//! # Parley Framework
//!
//! The conversation routing engine.
//!
//! This layer provides:
//! - Fan-in of the three update streams into one bounded queue
//! - A conversation filter bound to one target identity
//! - Optional strip normalization of message text
//! - An ordered regular-expression route table (first match wins)
//! - Axum-style handlers with [`FromContext`] extractors
//! - A single-consumer dispatch loop with explicit [`Outcome`]s
//!
//! ```rust,ignore
//! use parley_framework::{Captures, Conversation, Outcome};
//!
//! let mut conversation = Conversation::new(bot_id).strip(true);
//! conversation.handle(r"Consistency:([0-9.]+)%", |caps: Captures| async move {
//!     info!("consistency is {}", caps.get(1).unwrap_or_default());
//!     Outcome::Terminate
//! })?;
//!
//! let report = conversation.listen(&source).await?;
//! ```

pub mod context;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod fanin;
pub mod filter;
pub mod handler;
pub mod normalize;
pub mod outcome;
pub mod route;

pub use context::ConversationContext;
pub use conversation::Conversation;
pub use dispatcher::{Dispatch, Dispatcher, ListenReport};
pub use error::{
    BoxError, ExtractError, ExtractResult, HandoffError, ListenError, ListenResult, RouteError,
    RouteResult,
};
pub use extractor::{AllCaptures, Captures, FromContext, Text};
pub use fanin::{FanIn, MessageReceiver, MessageSender, Registration};
pub use filter::ConversationFilter;
pub use handler::{BoxedHandler, Handler, into_handler};
pub use normalize::{Normalizer, strip};
pub use outcome::{IntoOutcome, Outcome};
pub use route::{Route, RouteTable};
