//! Scheme (protocol) prefix handling.
//!
//! The scheme is compared case-insensitively, the value after the
//! delimiter is never altered.

use std::fmt;

use crate::constants::{DEFAULT_SEPARATOR, URN_SCHEME};
use crate::error::ProtocolError;

/// An identifier split into its lowercased scheme and untouched remainder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedProtocol {
    /// Lowercased scheme, without delimiter.
    pub scheme: String,
    /// Everything after the first delimiter.
    pub remainder: String,
}

impl fmt::Display for ParsedProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DEFAULT_SEPARATOR}{}", self.scheme, self.remainder)
    }
}

/// Splits `input` at the first `:`.
///
/// # Errors
///
/// See [`split_protocol_with`].
///
/// # Examples
///
/// ```
/// use urn_lib::split_protocol;
///
/// let parsed = split_protocol("URN:ISBN:0451450523").unwrap();
/// assert_eq!(parsed.scheme, "urn");
/// assert_eq!(parsed.remainder, "ISBN:0451450523");
/// ```
pub fn split_protocol(input: &str) -> Result<ParsedProtocol, ProtocolError> {
    split_protocol_with(input, DEFAULT_SEPARATOR)
}

/// Splits `input` at the first occurrence of `delimiter`.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingDelimiter`] if the delimiter does not
/// occur, or [`ProtocolError::EmptyScheme`] if it occurs at index 0.
pub fn split_protocol_with(input: &str, delimiter: &str) -> Result<ParsedProtocol, ProtocolError> {
    let idx = match input.find(delimiter) {
        Some(idx) if !delimiter.is_empty() => idx,
        _ => {
            return Err(ProtocolError::MissingDelimiter {
                delimiter: delimiter.to_string(),
            });
        }
    };
    if idx == 0 {
        return Err(ProtocolError::EmptyScheme);
    }

    Ok(ParsedProtocol {
        scheme: input[..idx].to_lowercase(),
        remainder: input[idx + delimiter.len()..].to_string(),
    })
}

/// Joins a scheme and a value with `:`. No normalization is applied.
#[must_use]
pub fn join_protocol(scheme: &str, value: &str) -> String {
    join_protocol_with(scheme, DEFAULT_SEPARATOR, value)
}

/// Joins a scheme and a value with an explicit delimiter.
#[must_use]
pub fn join_protocol_with(scheme: &str, delimiter: &str, value: &str) -> String {
    let mut out = String::with_capacity(scheme.len() + delimiter.len() + value.len());
    out.push_str(scheme);
    out.push_str(delimiter);
    out.push_str(value);
    out
}

/// Adds and removes a fixed scheme prefix.
///
/// # Examples
///
/// ```
/// use urn_lib::ProtocolHandler;
///
/// let handler = ProtocolHandler::urn();
/// assert_eq!(handler.strip("URN:isbn:123"), "isbn:123");
/// assert_eq!(handler.add("isbn:123"), "urn:isbn:123");
/// assert_eq!(handler.detect("Urn:isbn:123").as_deref(), Some("urn"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolHandler {
    prefix: String,
}

impl ProtocolHandler {
    /// Creates a handler for the given scheme (stored lowercased).
    #[must_use]
    pub fn new(protocol: &str) -> Self {
        Self {
            prefix: join_protocol(&protocol.to_lowercase(), ""),
        }
    }

    /// Creates a handler for the `urn` scheme.
    #[must_use]
    pub fn urn() -> Self {
        Self::new(URN_SCHEME)
    }

    /// Returns the scheme this handler manages.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.prefix[..self.prefix.len() - DEFAULT_SEPARATOR.len()]
    }

    fn has_prefix(&self, input: &str) -> bool {
        input
            .get(..self.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.prefix))
    }

    /// Removes the scheme prefix if present; otherwise returns the input.
    #[must_use]
    pub fn strip<'a>(&self, input: &'a str) -> &'a str {
        if self.has_prefix(input) {
            &input[self.prefix.len()..]
        } else {
            input
        }
    }

    /// Prepends the scheme prefix unless it is already there.
    #[must_use]
    pub fn add(&self, formatted: &str) -> String {
        if self.has_prefix(formatted) {
            formatted.to_string()
        } else {
            join_protocol_with(&self.prefix, "", formatted)
        }
    }

    /// Returns the lowercased scheme of `input` if it starts with a
    /// syntactically valid one (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`).
    #[must_use]
    pub fn detect(&self, input: &str) -> Option<String> {
        detect_protocol(input)
    }
}

/// Returns the lowercased scheme of `input`, if it has a valid one.
#[must_use]
pub fn detect_protocol(input: &str) -> Option<String> {
    let idx = input.find(DEFAULT_SEPARATOR)?;
    let scheme = &input[..idx];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme.to_ascii_lowercase())
    } else {
        None
    }
}
