//! Amazon Resource Names on top of the generic component tokenizer.
//!
//! `arn:partition:service:region:account:resource`, where `resource` keeps
//! any further colons.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::components::{ParsedComponents, join_components};
use crate::constants::{ARN_SCHEME, DEFAULT_SEPARATOR};
use crate::error::{UrnError, UrnErrorKind};
use crate::protocol::join_protocol;
use crate::scheme::UrnScheme;
use crate::validation::ValidationRule;

/// Component names of an ARN, in order.
pub const ARN_COMPONENTS: [&str; 5] = ["partition", "service", "region", "account", "resource"];

const ARN_ARGUMENT: &str = "arn";

/// The ARN scheme: all five components required, `partition` and
/// `service` non-empty, the others may be empty.
#[must_use]
pub fn arn_scheme() -> UrnScheme {
    UrnScheme::from_checked(ARN_SCHEME, &ARN_COMPONENTS, DEFAULT_SEPARATOR)
        .with_allow_empty(true)
        .with_legacy_protocol(true)
        .with_rules(vec![
            ValidationRule::new("partition", "cannot be empty", |v| {
                v.is_some_and(|s| !s.is_empty())
            }),
            ValidationRule::new("service", "cannot be empty", |v| {
                v.is_some_and(|s| !s.is_empty())
            }),
        ])
}

/// A mutable Amazon Resource Name.
///
/// # Examples
///
/// ```
/// use urn_lib::AwsArn;
///
/// let mut arn = AwsArn::parse("arn:aws:s3:::my_bucket").unwrap();
/// assert_eq!(arn.service(), "s3");
/// assert_eq!(arn.region(), "");
///
/// arn.set_region("us-east-1");
/// assert_eq!(arn.reference(), "arn:aws:s3:us-east-1::my_bucket");
/// ```
#[derive(Debug, Clone)]
pub struct AwsArn {
    protocol: String,
    record: ParsedComponents,
    value: String,
    reference: String,
}

impl AwsArn {
    /// Parses and validates an ARN.
    ///
    /// # Errors
    ///
    /// Returns [`UrnErrorKind::ArgumentRequired`] for empty input,
    /// [`UrnErrorKind::Components`] if the input has no separator, or
    /// [`UrnErrorKind::Validation`] listing every failed check.
    pub fn parse(input: &str) -> Result<Self, UrnError> {
        if input.is_empty() {
            return Err(UrnError::new(
                input,
                UrnErrorKind::ArgumentRequired {
                    argument: ARN_ARGUMENT,
                },
            ));
        }

        let record = arn_scheme().parse_validated(input)?;
        let protocol = record.protocol().unwrap_or(ARN_SCHEME).to_lowercase();
        let mut arn = Self {
            protocol,
            record,
            value: String::new(),
            reference: String::new(),
        };
        arn.refresh();
        Ok(arn)
    }

    fn refresh(&mut self) {
        self.record.set_protocol(Some(self.protocol.clone()));
        self.reference =
            join_components(&self.protocol, &ARN_COMPONENTS, DEFAULT_SEPARATOR, &self.record);
        let prefix = self.protocol.len() + DEFAULT_SEPARATOR.len();
        self.value = self.reference[prefix..].to_string();
    }

    fn component(&self, name: &str) -> &str {
        self.record.get(name).unwrap_or_default()
    }

    fn set_component(&mut self, name: &str, value: &str) {
        self.record.set(name, Some(value.to_string()));
        self.refresh();
    }

    /// Returns the lowercased scheme, without `:`.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the full ARN string.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the ARN without its scheme.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the partition, e.g. `aws`.
    #[must_use]
    pub fn partition(&self) -> &str {
        self.component("partition")
    }

    /// Returns the service namespace, e.g. `s3`.
    #[must_use]
    pub fn service(&self) -> &str {
        self.component("service")
    }

    /// Returns the region; empty for global resources.
    #[must_use]
    pub fn region(&self) -> &str {
        self.component("region")
    }

    /// Returns the account ID; may be empty.
    #[must_use]
    pub fn account(&self) -> &str {
        self.component("account")
    }

    /// Returns the resource, including any colons it contains.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.component("resource")
    }

    /// Returns the underlying component record.
    #[must_use]
    pub const fn components(&self) -> &ParsedComponents {
        &self.record
    }

    /// Sets the scheme (lowercased).
    pub fn set_protocol(&mut self, protocol: &str) {
        self.protocol = protocol.to_lowercase();
        self.refresh();
    }

    /// Sets the partition. No validation is performed.
    pub fn set_partition(&mut self, partition: &str) {
        self.set_component("partition", partition);
    }

    /// Sets the service. No validation is performed.
    pub fn set_service(&mut self, service: &str) {
        self.set_component("service", service);
    }

    /// Sets the region.
    pub fn set_region(&mut self, region: &str) {
        self.set_component("region", region);
    }

    /// Sets the account ID.
    pub fn set_account(&mut self, account: &str) {
        self.set_component("account", account);
    }

    /// Sets the resource.
    pub fn set_resource(&mut self, resource: &str) {
        self.set_component("resource", resource);
    }

    /// Replaces everything after the scheme by parsing `value`.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves `self` unchanged.
    pub fn set_value(&mut self, value: &str) -> Result<(), UrnError> {
        let reference = join_protocol(ARN_SCHEME, value);
        let parsed = Self::parse(&reference).map_err(|e| UrnError::new(value, e.kind))?;
        self.record = parsed.record;
        self.refresh();
        Ok(())
    }

    /// Replaces the whole ARN by parsing `reference`.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves `self` unchanged.
    pub fn set_reference(&mut self, reference: &str) -> Result<(), UrnError> {
        *self = Self::parse(reference)?;
        Ok(())
    }

    /// Runs the ARN scheme validation against the current components.
    #[must_use]
    pub fn validate(&self) -> Option<Vec<String>> {
        arn_scheme().validate(&self.record)
    }
}

impl PartialEq for AwsArn {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for AwsArn {}

impl Hash for AwsArn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl fmt::Display for AwsArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

impl FromStr for AwsArn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for AwsArn {
    type Error = UrnError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for AwsArn {
    fn as_ref(&self) -> &str {
        &self.reference
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AwsArn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.reference)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AwsArn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
