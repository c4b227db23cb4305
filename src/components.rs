//! Generic component tokenizer and formatter.
//!
//! A scheme declares an ordered list of component names and a separator.
//! Tokenizing consumes one separator-delimited segment per name, except the
//! last name which absorbs everything that remains. A scheme with N names
//! therefore never splits more than N times after the protocol.

use tracing::trace;

use crate::error::ComponentError;

/// Visible key under which [`ParsedComponents::legacy_entries`] exposes the
/// protocol.
pub const LEGACY_PROTOCOL_KEY: &str = "protocol";

/// An ordered record of named component values plus an out-of-band protocol.
///
/// The protocol is never one of the visible keys, so a scheme may declare a
/// component literally named `protocol` without collision.
///
/// # Examples
///
/// ```
/// use urn_lib::tokenize;
///
/// let record = tokenize(&["nid", "nss"], ":", Some("urn:isbn:0451450523"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(record.protocol(), Some("urn"));
/// assert_eq!(record.get("nid"), Some("isbn"));
/// assert_eq!(record.get("nss"), Some("0451450523"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedComponents {
    protocol: Option<String>,
    components: Vec<(String, Option<String>)>,
}

impl ParsedComponents {
    /// Creates an empty record with the given protocol.
    #[must_use]
    pub fn new(protocol: Option<String>) -> Self {
        Self {
            protocol,
            components: Vec::new(),
        }
    }

    /// Returns the protocol, if any.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// Replaces the protocol.
    pub fn set_protocol(&mut self, protocol: Option<String>) {
        self.protocol = protocol;
    }

    /// Returns the value of a component. Absent components and unknown
    /// names both yield `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Returns true if `name` is one of the record's keys.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.components.iter().any(|(key, _)| key == name)
    }

    /// Sets a component value. Unknown names are appended as new keys.
    pub fn set(&mut self, name: &str, value: Option<String>) {
        match self.components.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.components.push((name.to_string(), value)),
        }
    }

    /// Iterates over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.components
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Iterates over the component names in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(key, _)| key.as_str())
    }

    /// Number of visible keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the record has no visible keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the record with the protocol exposed as the first key,
    /// named [`LEGACY_PROTOCOL_KEY`].
    #[must_use]
    pub fn legacy_entries(&self) -> Vec<(&str, Option<&str>)> {
        std::iter::once((LEGACY_PROTOCOL_KEY, self.protocol()))
            .chain(self.iter())
            .collect()
    }
}

/// How a checked format compares the record's protocol to the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolMatch {
    /// The record must carry a protocol equal byte-for-byte.
    #[default]
    Exact,
    /// Case-insensitive comparison; a record without a protocol uses the
    /// expected one.
    IgnoreCase,
}

fn check_names<S: AsRef<str>>(names: &[S], separator: &str) -> Result<(), ComponentError> {
    if names.is_empty() {
        return Err(ComponentError::InvalidComponents {
            reason: "component names list cannot be empty",
        });
    }
    if separator.is_empty() {
        return Err(ComponentError::InvalidComponents {
            reason: "separator cannot be empty",
        });
    }
    for (i, name) in names.iter().enumerate() {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(ComponentError::InvalidComponents {
                reason: "component names cannot be empty",
            });
        }
        if names[..i].iter().any(|prev| prev.as_ref() == name) {
            return Err(ComponentError::InvalidComponents {
                reason: "component names must be distinct",
            });
        }
    }
    Ok(())
}

/// Splits a protocol-prefixed string into named components.
///
/// Returns `Ok(None)` when there is nothing to match: no input, or an input
/// without the separator. Missing trailing components are `None`. No
/// validation of component values is performed.
///
/// # Errors
///
/// Returns [`ComponentError::InvalidComponents`] if `names` is empty,
/// contains an empty or duplicate name, or `separator` is empty.
///
/// # Examples
///
/// ```
/// use urn_lib::tokenize;
///
/// let record = tokenize(&["nid", "nss"], ":", Some("urn:i:s:a:b"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(record.get("nss"), Some("s:a:b"));
///
/// assert!(tokenize(&["nid"], ":", Some("nocolon")).unwrap().is_none());
/// ```
pub fn tokenize<S: AsRef<str>>(
    names: &[S],
    separator: &str,
    input: Option<&str>,
) -> Result<Option<ParsedComponents>, ComponentError> {
    check_names(names, separator)?;

    let Some(input) = input else {
        return Ok(None);
    };
    if !input.contains(separator) {
        trace!(separator, "no separator in input, no match");
        return Ok(None);
    }

    // The protocol plus one segment per name, the last holding the rest.
    let mut parts = input.splitn(names.len() + 1, separator);
    let protocol = parts.next().map(str::to_string);
    let mut record = ParsedComponents::new(protocol);
    for name in names {
        record.set(name.as_ref(), parts.next().map(str::to_string));
    }

    trace!(
        components = names.len(),
        present = record.iter().filter(|(_, v)| v.is_some()).count(),
        "tokenized components"
    );
    Ok(Some(record))
}

pub(crate) fn join_components<S: AsRef<str>>(
    protocol: &str,
    names: &[S],
    separator: &str,
    record: &ParsedComponents,
) -> String {
    let mut out = String::from(protocol);
    for name in names {
        out.push_str(separator);
        out.push_str(record.get(name.as_ref()).unwrap_or_default());
    }
    out
}

/// Joins a record back into a string: the protocol, then every declared
/// component in declaration order, all separated by `separator`.
///
/// Absent components render as empty fields.
///
/// # Errors
///
/// Returns [`ComponentError::MissingProtocol`] if the record has no
/// protocol.
///
/// # Examples
///
/// ```
/// use urn_lib::{format_components, tokenize};
///
/// let names = ["partition", "service", "region", "account", "resource"];
/// let input = "arn:aws:s3:::my_bucket";
/// let record = tokenize(&names, ":", Some(input)).unwrap().unwrap();
/// assert_eq!(format_components(&names, ":", &record).unwrap(), input);
/// ```
pub fn format_components<S: AsRef<str>>(
    names: &[S],
    separator: &str,
    record: &ParsedComponents,
) -> Result<String, ComponentError> {
    let protocol = record.protocol().ok_or(ComponentError::MissingProtocol)?;
    Ok(join_components(protocol, names, separator, record))
}

/// Like [`format_components`], but first checks the record's protocol
/// against `expected`.
///
/// # Errors
///
/// Returns [`ComponentError::MissingProtocol`] if the record has no
/// protocol under [`ProtocolMatch::Exact`], or
/// [`ComponentError::ProtocolMismatch`] if the protocols differ.
pub fn format_components_checked<S: AsRef<str>>(
    names: &[S],
    separator: &str,
    record: &ParsedComponents,
    expected: &str,
    mode: ProtocolMatch,
) -> Result<String, ComponentError> {
    let protocol = match (record.protocol(), mode) {
        (Some(actual), ProtocolMatch::Exact) if actual == expected => actual,
        (Some(actual), ProtocolMatch::IgnoreCase) if actual.eq_ignore_ascii_case(expected) => {
            actual
        }
        (Some(actual), _) => {
            return Err(ComponentError::ProtocolMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        (None, ProtocolMatch::IgnoreCase) => expected,
        (None, ProtocolMatch::Exact) => return Err(ComponentError::MissingProtocol),
    };
    Ok(join_components(protocol, names, separator, record))
}

/// Builds a record holding exactly the declared names.
///
/// Values are taken from `data` for declared names; entries for undeclared
/// names are ignored.
///
/// # Errors
///
/// Returns [`ComponentError::InvalidComponents`] if `names` is empty or
/// contains an empty or duplicate name.
///
/// # Examples
///
/// ```
/// use urn_lib::build_components;
///
/// let record = build_components("urn", &["nid", "nss"], [("nid", "isbn")]).unwrap();
/// assert_eq!(record.get("nid"), Some("isbn"));
/// assert_eq!(record.get("nss"), None);
/// assert_eq!(record.len(), 2);
/// ```
pub fn build_components<S, I, K, V>(
    protocol: &str,
    names: &[S],
    data: I,
) -> Result<ParsedComponents, ComponentError>
where
    S: AsRef<str>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    check_names(names, ":")?;

    let mut record = ParsedComponents::new(Some(protocol.to_string()));
    for name in names {
        record.set(name.as_ref(), None);
    }
    for (key, value) in data {
        let key = key.as_ref();
        if record.contains_key(key) {
            record.set(key, Some(value.into()));
        }
    }
    Ok(record)
}
