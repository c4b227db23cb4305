//! Parsers, formatters and validators for URNs and URN-like identifiers.
//!
//! # Overview
//!
//! Three layers, each usable on its own:
//!
//! - **Protocol splitting**: [`split_protocol`] and [`join_protocol`] separate
//!   a leading `scheme:` from the rest without touching the rest.
//! - **Generic components**: [`tokenize`] and [`format_components`] split a
//!   string on a separator into named fields, the last field absorbing any
//!   remaining separators. [`validate_components`] checks a record against
//!   a set of [`ValidationRule`]s and reports every failure. [`UrnScheme`]
//!   bundles all three for one scheme.
//! - **Structured RFC parsers**: [`parse_rfc2141`] and [`parse_rfc8141`]
//!   enforce the NID and NSS grammars and, for RFC 8141, split off the
//!   resolution, query and fragment components.
//!
//! [`Rfc2141Urn`], [`Rfc8141Urn`] and [`AwsArn`] are mutable values over
//! those layers that keep their string forms up to date. [`UrnWrapper`]
//! pairs a [`ProtocolHandler`] with an RFC parser and an optional
//! [`NssRegistry`] that decomposes the NSS per namespace.
//!
//! # Quick Start
//!
//! ```rust
//! use urn_lib::{Rfc8141Urn, parse_rfc2141, ParserOptions};
//!
//! let urn = Rfc8141Urn::parse("urn:ietf:rfc:7230?+hello?=world#example").unwrap();
//! assert_eq!(urn.nid(), "ietf");
//! assert_eq!(urn.nss(), "rfc:7230");
//! assert_eq!(urn.q_component(), "?=world");
//! assert_eq!(urn.reference(), "urn:ietf:rfc:7230?+hello?=world#example");
//!
//! // The structured parsers take the name without its `urn:` prefix.
//! let a = parse_rfc2141("EXAMPLE:a%2fb", &ParserOptions::default()).unwrap();
//! let b = parse_rfc2141("example:a%2Fb", &ParserOptions::default()).unwrap();
//! assert_eq!(a, b);
//! ```
//!
//! # Custom Schemes
//!
//! ```rust
//! use urn_lib::{UrnScheme, ValidationRule};
//!
//! let scheme = UrnScheme::new("tag", &["authority", "path"], ":")
//!     .unwrap()
//!     .with_rule(ValidationRule::new("authority", "must contain a dot", |v| {
//!         v.is_some_and(|s| s.contains('.'))
//!     }));
//!
//! let record = scheme.parse("tag:example.com:a:b:c").unwrap();
//! assert_eq!(record.get("path"), Some("a:b:c"));
//! assert!(scheme.validate(&record).is_none());
//! ```
//!
//! # Grammar Summary
//!
//! | Part | Rule |
//! |------|------|
//! | NID | 2–32 chars, `[A-Za-z0-9][A-Za-z0-9-]*`, not `urn` |
//! | NSS (RFC 2141) | `[A-Za-z0-9()+,-.:=@;$_!*'%]+`, well-formed `%XX` |
//! | NSS (RFC 8141) | RFC 2141 set plus `/ ~ &` |
//! | Resolution | after `?+` |
//! | Query | after `?=` |
//! | Fragment | after `#` |
//!
//! # Logging
//!
//! Rejections are reported through [`tracing`] at `debug` level and
//! component extraction at `trace` level. No subscriber is installed.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod arn;
mod components;
mod constants;
mod encoding;
mod error;
mod nss;
mod options;
pub mod prelude;
mod protocol;
mod rfc2141;
mod rfc8141;
mod scheme;
mod security;
mod urn;
mod validation;
mod wrapper;

pub use arn::{ARN_COMPONENTS, AwsArn, arn_scheme};
pub use components::{
    LEGACY_PROTOCOL_KEY, ParsedComponents, ProtocolMatch, build_components, format_components,
    format_components_checked, tokenize,
};
pub use constants::{
    ARN_SCHEME, DEFAULT_MAX_LENGTH, DEFAULT_SEPARATOR, FRAGMENT_MARKER, NID_MAX_LENGTH,
    NID_MIN_LENGTH, QUERY_MARKER, RESERVED_NID, RESOLUTION_MARKER, URN_SCHEME,
};
pub use encoding::{
    NssGrammar, has_encoded_control_chars, is_valid_percent_encoding, normalize_for_comparison,
    normalize_percent_encoding, percent_decode, percent_encode,
};
pub use error::{
    ComponentError, NidError, NssError, NssStructureError, ProtocolError, RqfError, SecurityError,
    UrnError, UrnErrorKind, ValidationIssue,
};
pub use nss::{HierarchicalParser, NssParser, NssRegistry, OpaqueParser, ParsedNss};
pub use options::ParserOptions;
pub use protocol::{
    ParsedProtocol, ProtocolHandler, detect_protocol, join_protocol, join_protocol_with,
    split_protocol, split_protocol_with,
};
pub use rfc2141::{
    Rfc2141Name, encode_nss, format_rfc2141, parse_rfc2141, validate_nid, validate_nss,
    validate_rfc2141,
};
pub use rfc8141::{
    Rfc8141Name, Rqf, extract_rqf, format_rfc8141, format_rqf, parse_rfc8141, validate_rfc8141,
    validate_rqf,
};
pub use scheme::{RFC2141_COMPONENTS, UrnScheme};
pub use security::{has_control_chars, has_null_bytes, is_control_char, sanitize_input};
pub use urn::{Rfc2141Urn, Rfc8141Urn};
pub use validation::{
    INVALID_CHARACTERS_MESSAGE, ValidationRule, default_validation_rules, is_rfc2141_nid,
    validate_components,
};
pub use wrapper::{FullUrn, Rfc2141Wrapper, Rfc8141Wrapper, UrnName, UrnWrapper};
