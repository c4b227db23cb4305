//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use urn_lib::prelude::*;
//!
//! let urn = Rfc2141Urn::parse("urn:isbn:0451450523").unwrap();
//! assert_eq!(urn.nid(), "isbn");
//! ```
//!
//! Free functions (`tokenize`, `parse_rfc2141`, ...) are left out; import
//! them from the crate root.

pub use crate::{
    // Identifiers
    AwsArn, Rfc2141Name, Rfc2141Urn, Rfc8141Name, Rfc8141Urn, Rqf,
    // Generic components
    ParsedComponents, ParsedProtocol, ProtocolHandler, UrnScheme, ValidationRule,
    // Protocol-aware parsing
    FullUrn, HierarchicalParser, NssParser, NssRegistry, OpaqueParser, ParsedNss, Rfc2141Wrapper,
    Rfc8141Wrapper, UrnName, UrnWrapper,
    // Configuration
    NssGrammar, ParserOptions,
    // Errors
    ComponentError, NidError, NssError, NssStructureError, ProtocolError, RqfError, SecurityError,
    UrnError, UrnErrorKind, ValidationIssue,
};
