//! Handler system for the Parley framework.
//!
//! Handlers are plain async functions. The [`Handler`] trait is implemented
//! for every async function that:
//! - takes 0-8 parameters implementing [`FromContext`]
//! - returns a type implementing [`IntoOutcome`]
//!
//! ```rust,ignore
//! // No parameters, keeps listening
//! async fn ping() {}
//!
//! // Extractors, explicit outcome
//! async fn done(text: Text) -> Outcome {
//!     info!("final answer: {}", text.as_str());
//!     Outcome::Terminate
//! }
//!
//! // Errors become recoverable failures
//! async fn reply(ctx: Arc<ConversationContext>) -> Result<(), ApiError> {
//!     ctx.reply("/next").await
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::ConversationContext;
use crate::extractor::FromContext;
use crate::outcome::{IntoOutcome, Outcome};

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for conversation handlers.
///
/// The type parameter `T` is the tuple of extractor types; it only exists so
/// that one function type can implement `Handler` for exactly one arity.
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Calls the handler with the given context.
    async fn call(self, ctx: Arc<ConversationContext>) -> Outcome;
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in routes
// ============================================================================

/// A type-erased handler.
///
/// Internally a closure that captures the original handler and calls a clone
/// of it on each invocation.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<ConversationContext>) -> BoxFuture<'static, Outcome> + Send + Sync>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

// ============================================================================
// Handler implementations for functions
// ============================================================================

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoOutcome + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            #[allow(unused_variables)]
            async fn call(self, ctx: Arc<ConversationContext>) -> Outcome {
                $(
                    let $ty = match $ty::from_context(&ctx) {
                        Ok(value) => value,
                        Err(e) => return Outcome::failed(e),
                    };
                )*

                (self)($($ty,)*).await.into_outcome()
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Text;
    use parley_core::{BoxedOutbound, Message, Peer};
    use regex::Regex;

    fn ctx(text: &str) -> Arc<ConversationContext> {
        Arc::new(ConversationContext::new(
            Message::incoming(1, Peer::User(9), text),
            text.to_string(),
            Regex::new(".*").unwrap(),
            ".*".to_string(),
            None,
        ))
    }

    #[tokio::test]
    async fn test_zero_arity_handler_continues() {
        let handler = into_handler(|| async {});
        assert!(matches!(handler(ctx("x")).await, Outcome::Continue));
    }

    #[tokio::test]
    async fn test_extractor_handler() {
        let handler = into_handler(|text: Text| async move { text.as_str() == "stop" });
        assert!(handler(ctx("stop")).await.is_terminate());
        assert!(!handler(ctx("go")).await.is_terminate());
    }

    #[tokio::test]
    async fn test_failed_extraction_is_failure() {
        let handler = into_handler(|_outbound: BoxedOutbound| async { Outcome::Terminate });
        let outcome = handler(ctx("x")).await;
        assert!(outcome.is_failed());
    }
}
