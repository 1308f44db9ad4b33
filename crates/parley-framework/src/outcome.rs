//! Dispatch outcomes.
//!
//! Every handler returns an [`Outcome`]. Ending a conversation is a designed
//! result, not an error, so it has its own variant instead of travelling
//! through the error channel:
//!
//! | Outcome | Dispatch loop |
//! |---|---|
//! | [`Outcome::Continue`] | waits for the next message |
//! | [`Outcome::Terminate`] | returns from `listen` |
//! | [`Outcome::Failed`] | logs the error, waits for the next message |

use std::fmt;

use crate::error::BoxError;

/// The result of running a handler.
#[derive(Debug)]
pub enum Outcome {
    /// Keep listening.
    Continue,
    /// The conversation reached its goal; stop listening.
    Terminate,
    /// The handler failed. The failure is logged and the loop continues.
    Failed(BoxError),
}

impl Outcome {
    /// Creates a failure outcome from any error.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::Failed(error.into())
    }

    /// Returns `true` for [`Outcome::Terminate`].
    pub fn is_terminate(&self) -> bool {
        matches!(self, Self::Terminate)
    }

    /// Returns `true` for [`Outcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("continue"),
            Self::Terminate => f.write_str("terminate"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

// ============================================================================
// IntoOutcome - Handle handler return values
// ============================================================================

/// A trait for types that handlers may return.
///
/// ```rust,ignore
/// // Keep listening
/// async fn log_it(text: Text) {
///     info!("{}", text.as_str());
/// }
///
/// // Explicit control
/// async fn done() -> Outcome {
///     Outcome::Terminate
/// }
///
/// // Errors become `Outcome::Failed`
/// async fn parse(caps: Captures) -> anyhow::Result<Outcome> {
///     let price: f64 = caps.get(1).unwrap_or_default().parse()?;
///     Ok(Outcome::Terminate)
/// }
/// ```
pub trait IntoOutcome: Send {
    /// Converts this value into an outcome.
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

/// `()` keeps the conversation going.
impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Continue
    }
}

/// `true` terminates, `false` continues.
impl IntoOutcome for bool {
    fn into_outcome(self) -> Outcome {
        if self {
            Outcome::Terminate
        } else {
            Outcome::Continue
        }
    }
}

/// On `Ok`, the inner value decides. On `Err`, the handler failed.
impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError> + Send,
{
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Outcome::Failed(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_continues() {
        assert!(matches!(().into_outcome(), Outcome::Continue));
    }

    #[test]
    fn test_bool_outcomes() {
        assert!(true.into_outcome().is_terminate());
        assert!(matches!(false.into_outcome(), Outcome::Continue));
    }

    #[test]
    fn test_result_outcomes() {
        let ok: Result<Outcome, std::io::Error> = Ok(Outcome::Terminate);
        assert!(ok.into_outcome().is_terminate());

        let err: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let outcome = err.into_outcome();
        assert!(outcome.is_failed());
        assert_eq!(outcome.to_string(), "failed: boom");

        let msg: Result<(), String> = Err("bad price".to_string());
        assert!(msg.into_outcome().is_failed());
    }
}
