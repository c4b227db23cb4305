//! Constants for URN parsing and validation.

/// The URN scheme.
pub const URN_SCHEME: &str = "urn";

/// The Amazon Resource Name scheme.
pub const ARN_SCHEME: &str = "arn";

/// Default delimiter between a scheme and its value, and between components.
pub const DEFAULT_SEPARATOR: &str = ":";

/// Minimum NID length in characters.
pub const NID_MIN_LENGTH: usize = 2;

/// Maximum NID length in characters.
pub const NID_MAX_LENGTH: usize = 32;

/// NID value that can never be assigned.
pub const RESERVED_NID: &str = "urn";

/// Default upper bound on raw input length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 8192;

/// Marker introducing an RFC 8141 r-component.
pub const RESOLUTION_MARKER: &str = "?+";

/// Marker introducing an RFC 8141 q-component.
pub const QUERY_MARKER: &str = "?=";

/// Marker introducing an RFC 8141 f-component.
pub const FRAGMENT_MARKER: &str = "#";
