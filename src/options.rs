//! Configuration for the structured URN parsers.

use crate::constants::DEFAULT_MAX_LENGTH;

/// Options controlling how strictly the RFC 2141 / RFC 8141 parsers
/// validate their input.
///
/// # Examples
///
/// ```
/// use urn_lib::ParserOptions;
///
/// let opts = ParserOptions::new().with_max_length(200_000);
/// assert!(opts.strict);
/// assert_eq!(opts.max_length, 200_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ParserOptions {
    /// Reject NID and NSS grammar violations.
    ///
    /// When false only the structural checks (separator, NID presence)
    /// and the input sanitizer run.
    /// Default: true
    pub strict: bool,

    /// Maximum accepted input length in characters.
    ///
    /// Default: 8192
    pub max_length: usize,

    /// Accept `%` sequences that are not followed by two hex digits.
    ///
    /// Default: false
    pub allow_invalid_encoding: bool,

    /// Accept raw and percent-encoded control characters.
    ///
    /// NUL is rejected regardless of this flag.
    /// Default: false
    pub allow_control_chars: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_length: DEFAULT_MAX_LENGTH,
            allow_invalid_encoding: false,
            allow_control_chars: false,
        }
    }
}

impl ParserOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables strict grammar validation.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the maximum input length.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Allows or rejects malformed percent-encoding.
    #[must_use]
    pub const fn with_allow_invalid_encoding(mut self, allow: bool) -> Self {
        self.allow_invalid_encoding = allow;
        self
    }

    /// Allows or rejects control characters.
    #[must_use]
    pub const fn with_allow_control_chars(mut self, allow: bool) -> Self {
        self.allow_control_chars = allow;
        self
    }
}
