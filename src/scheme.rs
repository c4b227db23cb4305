//! Configurable colon-delimited identifier schemes.

use tracing::debug;

use crate::components::{
    ParsedComponents, ProtocolMatch, build_components, format_components_checked, tokenize,
};
use crate::constants::{DEFAULT_SEPARATOR, URN_SCHEME};
use crate::error::{ComponentError, UrnError, UrnErrorKind};
use crate::validation::{ValidationRule, default_validation_rules, validate_components};

/// Component names of a basic RFC 2141 URN.
pub const RFC2141_COMPONENTS: [&str; 2] = ["nid", "nss"];

/// A protocol, an ordered component list and a separator, bundled with the
/// validation policy that applies to them.
///
/// When no rules are configured, [`default_validation_rules`] applies.
///
/// # Examples
///
/// ```
/// use urn_lib::UrnScheme;
///
/// let scheme = UrnScheme::rfc2141();
/// let record = scheme.parse("urn:isbn:0451450523").unwrap();
/// assert_eq!(record.get("nss"), Some("0451450523"));
/// assert!(scheme.validate(&record).is_none());
/// assert_eq!(scheme.format(&record).unwrap(), "urn:isbn:0451450523");
/// ```
#[derive(Debug, Clone)]
pub struct UrnScheme {
    protocol: String,
    components: Vec<String>,
    separator: String,
    allow_empty: bool,
    rules: Option<Vec<ValidationRule>>,
    default_rules: Vec<ValidationRule>,
    legacy_protocol: bool,
}

impl UrnScheme {
    /// Creates a scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::InvalidComponents`] if `components` is
    /// empty or holds an empty or duplicate name, or `separator` is empty.
    pub fn new<S: AsRef<str>>(
        protocol: &str,
        components: &[S],
        separator: &str,
    ) -> Result<Self, ComponentError> {
        // Rejects bad name lists up front so every later call can rely on them.
        tokenize(components, separator, None)?;

        let names: Vec<&str> = components.iter().map(AsRef::as_ref).collect();
        Ok(Self::from_checked(protocol, &names, separator))
    }

    /// The `urn` / `[nid, nss]` / `:` scheme with the legacy protocol
    /// comparison.
    #[must_use]
    pub fn rfc2141() -> Self {
        Self::from_checked(URN_SCHEME, &RFC2141_COMPONENTS, DEFAULT_SEPARATOR)
            .with_legacy_protocol(true)
    }

    /// Builds a scheme from names known to be non-empty and distinct.
    pub(crate) fn from_checked(protocol: &str, components: &[&str], separator: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            components: components.iter().map(|c| (*c).to_string()).collect(),
            separator: separator.to_string(),
            allow_empty: false,
            rules: None,
            default_rules: default_validation_rules(components),
            legacy_protocol: false,
        }
    }

    /// Accepts empty component values during validation.
    #[must_use]
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Replaces the rule list. An empty list disables rule checks.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<ValidationRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Appends one rule to the configured list (starting from an empty list
    /// if none was configured).
    #[must_use]
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.get_or_insert_with(Vec::new).push(rule);
        self
    }

    /// Compares protocols case-insensitively when formatting and falls back
    /// to the scheme protocol for records without one.
    #[must_use]
    pub fn with_legacy_protocol(mut self, legacy: bool) -> Self {
        self.legacy_protocol = legacy;
        self
    }

    /// The expected protocol.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The declared component names, in order.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The component separator.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Whether empty component values pass validation.
    #[must_use]
    pub const fn allow_empty(&self) -> bool {
        self.allow_empty
    }

    /// The rules [`validate`](Self::validate) applies.
    #[must_use]
    pub fn rules(&self) -> &[ValidationRule] {
        self.rules.as_deref().unwrap_or(&self.default_rules)
    }

    const fn protocol_match(&self) -> ProtocolMatch {
        if self.legacy_protocol {
            ProtocolMatch::IgnoreCase
        } else {
            ProtocolMatch::Exact
        }
    }

    /// Tokenizes `input` into this scheme's components. No validation is
    /// performed.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NoMatch`] if the input has no separator.
    pub fn parse(&self, input: &str) -> Result<ParsedComponents, ComponentError> {
        tokenize(&self.components, &self.separator, Some(input))?.ok_or(ComponentError::NoMatch)
    }

    /// Tokenizes and validates `input`.
    ///
    /// # Errors
    ///
    /// Returns a [`UrnErrorKind::Components`] error if tokenizing fails, or
    /// [`UrnErrorKind::Validation`] carrying every failure message.
    pub fn parse_validated(&self, input: &str) -> Result<ParsedComponents, UrnError> {
        let record = self.parse(input).map_err(|e| UrnError::new(input, e))?;
        match self.validate(&record) {
            None => Ok(record),
            Some(errors) => {
                debug!(
                    protocol = %self.protocol,
                    failures = errors.len(),
                    "rejected by scheme validation"
                );
                Err(UrnError::new(input, UrnErrorKind::Validation { errors }))
            }
        }
    }

    /// Formats a record with this scheme's protocol check.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::MissingProtocol`] or
    /// [`ComponentError::ProtocolMismatch`].
    pub fn format(&self, record: &ParsedComponents) -> Result<String, ComponentError> {
        format_components_checked(
            &self.components,
            &self.separator,
            record,
            &self.protocol,
            self.protocol_match(),
        )
    }

    /// Validates a record, returning every failure or `None`.
    #[must_use]
    pub fn validate(&self, record: &ParsedComponents) -> Option<Vec<String>> {
        validate_components(
            &self.protocol,
            self.rules(),
            self.allow_empty,
            &self.components,
            record,
        )
    }

    /// Builds a record with this scheme's protocol and components.
    ///
    /// # Errors
    ///
    /// See [`build_components`].
    pub fn build<I, K, V>(&self, data: I) -> Result<ParsedComponents, ComponentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        build_components(&self.protocol, &self.components, data)
    }
}

impl Default for UrnScheme {
    fn default() -> Self {
        Self::rfc2141()
    }
}
