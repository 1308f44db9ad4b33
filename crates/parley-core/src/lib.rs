//! # Parley Core
//!
//! Update model and transport boundaries for the Parley conversation toolkit.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Updates**: raw transport updates narrowed to plain messages
//!   ([`Update`], [`MessagePayload`], [`Message`])
//! - **Peers**: user/chat/channel addresses in one identity space ([`Peer`])
//! - **Deep links**: message and bot-start links ([`MessageDeepLink`])
//!
//! ### Integration Layer
//!
//! External system interfaces, implemented by transport adapters:
//! - **Update sources**: listener registration per update kind ([`UpdateSource`])
//! - **Outbound calls**: send text, start bots, press buttons ([`Outbound`])
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────────┐  Update   ┌─────────────┐  Message  ┌──────────────┐
//! │ UpdateSource │──────────▶│   Fan-in    │──────────▶│ Conversation │──▶ Handler
//! │  (adapter)   │ ×3 kinds  │ (framework) │  1 queue  │ (framework)  │
//! └──────────────┘           └─────────────┘           └──────────────┘
//! ```

pub mod foundation;
pub mod integration;

pub use foundation::{
    ApiError, ApiResult, LinkError, LinkResult, Message, MessageDeepLink, MessagePayload, Peer,
    Update, UpdateKind,
};
pub use integration::{
    BoxedOutbound, BoxedUpdateSource, CallbackAnswer, ListenerId, Outbound, UpdateListener, UpdateSource,
};
