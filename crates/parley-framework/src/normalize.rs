//! Text normalization applied before route matching.
//!
//! Remote sources often vary spacing, line breaks and decorative symbols
//! between otherwise identical messages. Strip normalization removes all of
//! it so route patterns can be written against a compact form:
//!
//! ```text
//! "📊 Stats for @alpha\n  Consistency: 87%"  →  "Statsfor@alphaConsistency:87%"
//! ```

use std::borrow::Cow;

/// Removes every non-ASCII character and all whitespace from `text`.
///
/// Whitespace runs are collapsed to nothing, so the remaining tokens are
/// concatenated without a separator. The function is idempotent.
pub fn strip(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_whitespace() && *c != '\u{0b}')
        .collect()
}

/// How message text is prepared before matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Normalizer {
    /// Match against the raw text.
    #[default]
    Raw,
    /// Match against [`strip`]ped text.
    Strip,
}

impl Normalizer {
    /// Chooses the normalizer for a `strip` configuration flag.
    pub fn from_flag(strip: bool) -> Self {
        if strip { Self::Strip } else { Self::Raw }
    }

    /// Applies this normalizer to `text`.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::Raw => Cow::Borrowed(text),
            Self::Strip => Cow::Owned(strip(text)),
        }
    }
}
