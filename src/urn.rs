//! Mutable URN values that keep their string forms in sync.
//!
//! Each wrapper holds the parsed components as the source of truth and
//! recomputes `value` (without scheme) and `reference` (with scheme) on
//! every setter call, so reads never reformat.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::constants::{FRAGMENT_MARKER, QUERY_MARKER, RESOLUTION_MARKER};
use crate::error::{UrnError, UrnErrorKind};
use crate::options::ParserOptions;
use crate::protocol::{ParsedProtocol, join_protocol, split_protocol};
use crate::rfc2141::{Rfc2141Name, parse_rfc2141};
use crate::rfc8141::{Rfc8141Name, parse_rfc8141};

const URN_ARGUMENT: &str = "urn";

fn split_reference(input: &str) -> Result<ParsedProtocol, UrnError> {
    if input.is_empty() {
        return Err(UrnError::new(
            input,
            UrnErrorKind::ArgumentRequired {
                argument: URN_ARGUMENT,
            },
        ));
    }
    split_protocol(input).map_err(|e| UrnError::new(input, e))
}

/// Re-targets a parser error at the full reference string.
fn with_input(input: &str, err: UrnError) -> UrnError {
    UrnError::new(input, err.kind)
}

fn marked(marker: &str, value: Option<&str>) -> String {
    value.map_or_else(String::new, |v| format!("{marker}{v}"))
}

/// Strips `marker` from `value`; an empty value clears the component.
fn unmarked(marker: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.strip_prefix(marker).unwrap_or(value).to_string())
    }
}

/// An RFC 2141 URN with its scheme, e.g. `urn:isbn:0451450523`.
///
/// # Examples
///
/// ```
/// use urn_lib::Rfc2141Urn;
///
/// let mut urn = Rfc2141Urn::parse("urn:isbn:0451450523").unwrap();
/// assert_eq!(urn.nid(), "isbn");
/// assert_eq!(urn.value(), "isbn:0451450523");
///
/// urn.set_nss("0140449132");
/// assert_eq!(urn.reference(), "urn:isbn:0140449132");
/// ```
#[derive(Debug, Clone)]
pub struct Rfc2141Urn {
    protocol: String,
    name: Rfc2141Name,
    options: ParserOptions,
    value: String,
    reference: String,
}

impl Rfc2141Urn {
    /// Parses a full URN with default options.
    ///
    /// # Errors
    ///
    /// See [`parse_with`](Self::parse_with).
    pub fn parse(input: &str) -> Result<Self, UrnError> {
        Self::parse_with(input, &ParserOptions::default())
    }

    /// Parses a full URN. The options are kept for later
    /// [`set_value`](Self::set_value) and [`set_reference`](Self::set_reference)
    /// calls.
    ///
    /// # Errors
    ///
    /// Returns [`UrnErrorKind::ArgumentRequired`] for empty input, a
    /// [`UrnErrorKind::Protocol`] error if no scheme can be split off, or
    /// any error of [`parse_rfc2141`] on the remainder.
    pub fn parse_with(input: &str, options: &ParserOptions) -> Result<Self, UrnError> {
        let parsed = split_reference(input)?;
        let name = parse_rfc2141(&parsed.remainder, options).map_err(|e| with_input(input, e))?;
        let mut urn = Self {
            protocol: parsed.scheme,
            name,
            options: *options,
            value: String::new(),
            reference: String::new(),
        };
        urn.refresh();
        Ok(urn)
    }

    fn refresh(&mut self) {
        self.value = self.name.to_string();
        self.reference = join_protocol(&self.protocol, &self.value);
    }

    /// Returns the lowercased scheme, without `:`.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the full URN string.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the URN without its scheme.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the lowercased NID.
    #[must_use]
    pub fn nid(&self) -> &str {
        self.name.nid()
    }

    /// Returns the encoded NSS.
    #[must_use]
    pub fn nss(&self) -> &str {
        self.name.nss()
    }

    /// Returns the structured name.
    #[must_use]
    pub fn to_name(&self) -> Rfc2141Name {
        self.name.clone()
    }

    /// Sets the scheme (lowercased).
    pub fn set_protocol(&mut self, protocol: &str) {
        self.protocol = protocol.to_lowercase();
        self.refresh();
    }

    /// Sets the NID. No validation is performed.
    pub fn set_nid(&mut self, nid: &str) {
        self.name.set_nid(nid);
        self.refresh();
    }

    /// Sets the NSS. No validation is performed.
    pub fn set_nss(&mut self, nss: &str) {
        self.name.set_nss(nss);
        self.refresh();
    }

    /// Replaces everything after the scheme by parsing `value`.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves `self` unchanged.
    pub fn set_value(&mut self, value: &str) -> Result<(), UrnError> {
        self.name = parse_rfc2141(value, &self.options)?;
        self.refresh();
        Ok(())
    }

    /// Replaces the whole URN by parsing `reference`.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves `self` unchanged.
    pub fn set_reference(&mut self, reference: &str) -> Result<(), UrnError> {
        *self = Self::parse_with(reference, &self.options)?;
        Ok(())
    }

    /// Returns true if both URNs name the same resource under RFC 2141
    /// equivalence.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// An RFC 8141 URN with its scheme, e.g. `urn:ietf:rfc:7230?+hello#sec`.
///
/// RQF getters return the component with its marker (`?+`, `?=`, `#`), or
/// an empty string when absent. Setters accept the value with or without
/// its marker; an empty value removes the component.
///
/// # Examples
///
/// ```
/// use urn_lib::Rfc8141Urn;
///
/// let mut urn = Rfc8141Urn::parse("urn:example:a").unwrap();
/// urn.set_f_component("frag");
/// urn.set_q_component("?=query");
/// urn.set_r_component("res");
/// assert_eq!(urn.reference(), "urn:example:a?+res?=query#frag");
/// assert_eq!(urn.r_component(), "?+res");
/// ```
#[derive(Debug, Clone)]
pub struct Rfc8141Urn {
    protocol: String,
    name: Rfc8141Name,
    options: ParserOptions,
    value: String,
    reference: String,
}

impl Rfc8141Urn {
    /// Parses a full URN with default options.
    ///
    /// # Errors
    ///
    /// See [`parse_with`](Self::parse_with).
    pub fn parse(input: &str) -> Result<Self, UrnError> {
        Self::parse_with(input, &ParserOptions::default())
    }

    /// Parses a full URN.
    ///
    /// # Errors
    ///
    /// Returns [`UrnErrorKind::ArgumentRequired`] for empty input, a
    /// [`UrnErrorKind::Protocol`] error if no scheme can be split off, or
    /// any error of [`parse_rfc8141`] on the remainder.
    pub fn parse_with(input: &str, options: &ParserOptions) -> Result<Self, UrnError> {
        let parsed = split_reference(input)?;
        let name = parse_rfc8141(&parsed.remainder, options).map_err(|e| with_input(input, e))?;
        let mut urn = Self {
            protocol: parsed.scheme,
            name,
            options: *options,
            value: String::new(),
            reference: String::new(),
        };
        urn.refresh();
        Ok(urn)
    }

    fn refresh(&mut self) {
        self.value = self.name.to_string();
        self.reference = join_protocol(&self.protocol, &self.value);
    }

    /// Returns the lowercased scheme, without `:`.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the full URN string.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the URN without its scheme.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the lowercased NID.
    #[must_use]
    pub fn nid(&self) -> &str {
        self.name.nid()
    }

    /// Returns the encoded NSS.
    #[must_use]
    pub fn nss(&self) -> &str {
        self.name.nss()
    }

    /// Returns `?+` and the resolution, or an empty string.
    #[must_use]
    pub fn r_component(&self) -> String {
        marked(RESOLUTION_MARKER, self.name.resolution())
    }

    /// Returns `?=` and the query, or an empty string.
    #[must_use]
    pub fn q_component(&self) -> String {
        marked(QUERY_MARKER, self.name.query())
    }

    /// Returns `#` and the fragment, or an empty string.
    #[must_use]
    pub fn f_component(&self) -> String {
        marked(FRAGMENT_MARKER, self.name.fragment())
    }

    /// Returns the structured name.
    #[must_use]
    pub fn to_name(&self) -> Rfc8141Name {
        self.name.clone()
    }

    /// Sets the scheme (lowercased).
    pub fn set_protocol(&mut self, protocol: &str) {
        self.protocol = protocol.to_lowercase();
        self.refresh();
    }

    /// Sets the NID. No validation is performed.
    pub fn set_nid(&mut self, nid: &str) {
        self.name.assigned_mut().set_nid(nid);
        self.refresh();
    }

    /// Sets the NSS. No validation is performed.
    pub fn set_nss(&mut self, nss: &str) {
        self.name.assigned_mut().set_nss(nss);
        self.refresh();
    }

    /// Sets the resolution component.
    pub fn set_r_component(&mut self, value: &str) {
        self.name.rqf_mut().resolution = unmarked(RESOLUTION_MARKER, value);
        self.refresh();
    }

    /// Sets the query component.
    pub fn set_q_component(&mut self, value: &str) {
        self.name.rqf_mut().query = unmarked(QUERY_MARKER, value);
        self.refresh();
    }

    /// Sets the fragment component.
    pub fn set_f_component(&mut self, value: &str) {
        self.name.rqf_mut().fragment = unmarked(FRAGMENT_MARKER, value);
        self.refresh();
    }

    /// Replaces everything after the scheme by parsing `value`.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves `self` unchanged.
    pub fn set_value(&mut self, value: &str) -> Result<(), UrnError> {
        self.name = parse_rfc8141(value, &self.options)?;
        self.refresh();
        Ok(())
    }

    /// Replaces the whole URN by parsing `reference`.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves `self` unchanged.
    pub fn set_reference(&mut self, reference: &str) -> Result<(), UrnError> {
        *self = Self::parse_with(reference, &self.options)?;
        Ok(())
    }

    /// Returns true if both URNs have equivalent assigned names. RQF
    /// components are ignored.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl PartialEq for Rfc2141Urn {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Rfc2141Urn {}

impl Hash for Rfc2141Urn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl fmt::Display for Rfc2141Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

impl FromStr for Rfc2141Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Rfc2141Urn {
    type Error = UrnError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for Rfc2141Urn {
    fn as_ref(&self) -> &str {
        &self.reference
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rfc2141Urn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.reference)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rfc2141Urn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Rfc8141Urn {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Rfc8141Urn {}

impl Hash for Rfc8141Urn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl fmt::Display for Rfc8141Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

impl FromStr for Rfc8141Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Rfc8141Urn {
    type Error = UrnError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for Rfc8141Urn {
    fn as_ref(&self) -> &str {
        &self.reference
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rfc8141Urn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.reference)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rfc8141Urn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
