//! Report-all validation of tokenized component records.
//!
//! Unlike the structured RFC parsers, which stop at the first problem,
//! this engine collects every failure so a caller building an identifier
//! from several fields gets complete feedback in one pass.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::components::ParsedComponents;
use crate::constants::RESERVED_NID;

/// Message used by the rules from [`default_validation_rules`].
pub const INVALID_CHARACTERS_MESSAGE: &str = "invalid characters";

type Check = dyn Fn(Option<&str>) -> Result<bool, String> + Send + Sync;

/// A named predicate over one component value.
///
/// A check returning `Ok(false)` adds the rule's message to the failure
/// list; a check returning `Err` adds the error text instead. Errors never
/// escape the validation engine.
///
/// # Examples
///
/// ```
/// use urn_lib::ValidationRule;
///
/// let rule = ValidationRule::new("nid", "must be isbn", |v| v == Some("isbn"));
/// assert!(rule.check(Some("isbn")).unwrap());
/// assert!(!rule.check(None).unwrap());
/// ```
#[derive(Clone)]
pub struct ValidationRule {
    name: String,
    message: String,
    check: Arc<Check>,
}

impl ValidationRule {
    /// Creates a rule from an infallible predicate.
    pub fn new<F>(name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        Self::fallible(name, message, move |value| Ok(predicate(value)))
    }

    /// Creates a rule whose check may fail with an error message.
    pub fn fallible<F>(name: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&str>) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            check: Arc::new(check),
        }
    }

    /// The component this rule applies to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The message reported when the check returns `false`.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Runs the check against a value.
    ///
    /// # Errors
    ///
    /// Returns whatever error the check produced.
    pub fn check(&self, value: Option<&str>) -> Result<bool, String> {
        (self.check)(value)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Checks an NID with the lenient RFC 2141 character test.
///
/// Non-strict: only `[A-Za-z0-9-]`, not starting with `-`. The empty string
/// passes. Strict additionally requires 1–31 characters and rejects `urn`
/// in any case.
///
/// # Examples
///
/// ```
/// use urn_lib::is_rfc2141_nid;
///
/// assert!(is_rfc2141_nid("isbn", true));
/// assert!(!is_rfc2141_nid("-isbn", false));
/// assert!(is_rfc2141_nid("URN", false));
/// assert!(!is_rfc2141_nid("URN", true));
/// ```
#[must_use]
pub fn is_rfc2141_nid(value: &str, strict: bool) -> bool {
    if strict {
        let len = value.chars().count();
        if !(1..=31).contains(&len) || value.eq_ignore_ascii_case(RESERVED_NID) {
            return false;
        }
    }
    !value.starts_with('-') && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Generates the default rules for a scheme: every component except the
/// last must pass the lenient NID character test.
#[must_use]
pub fn default_validation_rules<S: AsRef<str>>(names: &[S]) -> Vec<ValidationRule> {
    let Some((_, leading)) = names.split_last() else {
        return Vec::new();
    };
    leading
        .iter()
        .map(|name| {
            ValidationRule::new(name.as_ref(), INVALID_CHARACTERS_MESSAGE, |value| {
                is_rfc2141_nid(value.unwrap_or_default(), false)
            })
        })
        .collect()
}

/// Validates a record against a protocol, a presence policy and custom
/// rules, collecting every failure.
///
/// Every record key, plus any declared name the record lacks, must hold a
/// value; with `allow_empty` that value may be the empty string. The
/// protocol is compared case-insensitively.
///
/// Returns `None` when nothing failed, never an empty list.
///
/// # Examples
///
/// ```
/// use urn_lib::{tokenize, validate_components};
///
/// let names = ["nid", "nss"];
/// let record = tokenize(&names, ":", Some("urn:isbn:")).unwrap().unwrap();
///
/// let errors = validate_components("urn", &[], false, &names, &record).unwrap();
/// assert_eq!(errors, ["validation failed for nss: invalid value"]);
/// assert!(validate_components("urn", &[], true, &names, &record).is_none());
/// ```
#[must_use]
pub fn validate_components<S: AsRef<str>>(
    protocol: &str,
    rules: &[ValidationRule],
    allow_empty: bool,
    names: &[S],
    record: &ParsedComponents,
) -> Option<Vec<String>> {
    let mut errors = Vec::new();

    let undeclared = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !record.contains_key(name));
    for name in record.names().chain(undeclared) {
        let valid = record
            .get(name)
            .is_some_and(|value| allow_empty || !value.is_empty());
        if !valid {
            errors.push(format!("validation failed for {name}: invalid value"));
        }
    }

    let protocol_matches = record
        .protocol()
        .is_some_and(|actual| actual.eq_ignore_ascii_case(protocol));
    if !protocol_matches {
        errors.push(format!(
            "validation failed for protocol: expected {protocol} but got {}",
            record.protocol().unwrap_or("nothing")
        ));
    }

    for rule in rules {
        match rule.check(record.get(rule.name())) {
            Ok(true) => {}
            Ok(false) => errors.push(format!(
                "validation failed for {}: {}",
                rule.name(),
                rule.message()
            )),
            Err(err) => errors.push(format!("validation error for {}: {err}", rule.name())),
        }
    }

    if errors.is_empty() {
        None
    } else {
        debug!(protocol, failures = errors.len(), "component validation failed");
        Some(errors)
    }
}
