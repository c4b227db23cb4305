//! Error types for URN parsing, formatting and validation.
//!
//! Every error carries a stable machine-readable code (see the `code`
//! methods) next to its human-readable `Display` form.

use thiserror::Error;

/// Errors raised by the protocol splitter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The input does not contain the scheme delimiter.
    #[error("invalid format: missing delimiter '{delimiter}'")]
    MissingDelimiter {
        /// The delimiter that was searched for
        delimiter: String,
    },

    /// The delimiter is the first character, leaving no scheme.
    #[error("invalid format: scheme cannot be empty")]
    EmptyScheme,
}

impl ProtocolError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingDelimiter { .. } => "MISSING_DELIMITER",
            Self::EmptyScheme => "EMPTY_SCHEME",
        }
    }
}

/// Errors raised by the generic component tokenizer and formatter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The component name list is unusable.
    #[error("components not valid: {reason}")]
    InvalidComponents {
        /// Why the list was rejected
        reason: &'static str,
    },

    /// The input could not be split into a protocol and components.
    #[error("parsing urn failed: input has no protocol")]
    NoMatch,

    /// The record has no protocol to format with.
    #[error("protocol is missing or invalid")]
    MissingProtocol,

    /// The record's protocol differs from the expected one.
    #[error("protocol mismatch: expected '{expected}', found '{actual}'")]
    ProtocolMismatch {
        /// The protocol the caller expected
        expected: String,
        /// The protocol stored in the record
        actual: String,
    },
}

impl ComponentError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidComponents { .. } => "INVALID_COMPONENTS",
            Self::NoMatch => "NO_MATCH",
            Self::MissingProtocol => "MISSING_PROTOCOL",
            Self::ProtocolMismatch { .. } => "PROTOCOL_MISMATCH",
        }
    }
}

/// Errors raised by the input sanitizer.
///
/// These are never bypassed by the encoding-related parser options; null
/// bytes are rejected unconditionally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// The input contains a NUL character.
    #[error("input contains null bytes")]
    NullByte,

    /// The input contains a raw control character.
    #[error("input contains control character U+{code:04X} at position {position}")]
    ControlChar {
        /// Code point of the offending character
        code: u32,
        /// Character position in the input
        position: usize,
    },

    /// The input is longer than the configured maximum.
    #[error("input exceeds maximum length of {max} characters (got {actual})")]
    MaxLengthExceeded {
        /// Configured maximum
        max: usize,
        /// Actual length in characters
        actual: usize,
    },
}

impl SecurityError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NullByte => "NULL_BYTE_DETECTED",
            Self::ControlChar { .. } => "CONTROL_CHAR_DETECTED",
            Self::MaxLengthExceeded { .. } => "MAX_LENGTH_EXCEEDED",
        }
    }
}

/// NID grammar violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NidError {
    /// NID length is out of bounds.
    #[error("NID must be between {min} and {max} characters, got {actual}")]
    InvalidLength {
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
        /// Actual length
        actual: usize,
    },

    /// NID contains a disallowed character or starts with a hyphen.
    #[error(
        "NID must contain only alphanumeric characters and hyphens, and start with alphanumeric"
    )]
    InvalidFormat,

    /// NID is the reserved word `urn`.
    #[error("NID 'urn' is reserved and cannot be used")]
    Reserved,
}

impl NidError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidLength { .. } => "INVALID_NID_LENGTH",
            Self::InvalidFormat => "INVALID_NID_FORMAT",
            Self::Reserved => "RESERVED_NID",
        }
    }
}

/// NSS grammar violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NssError {
    /// NSS is empty.
    #[error("NSS cannot be empty")]
    Empty,

    /// NSS contains a character that must be percent-encoded.
    #[error("NSS contains character '{char}' at position {position} that must be percent-encoded")]
    InvalidCharacters {
        /// The offending character
        char: char,
        /// Character position in the NSS
        position: usize,
    },

    /// A `%` is not followed by two hex digits.
    #[error("NSS contains invalid percent-encoding")]
    InvalidEncoding,

    /// NSS contains percent-encoded control characters.
    #[error("NSS contains encoded control characters")]
    EncodedControlChars,
}

impl NssError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY_NSS",
            Self::InvalidCharacters { .. } => "INVALID_NSS_CHARACTERS",
            Self::InvalidEncoding => "INVALID_ENCODING",
            Self::EncodedControlChars => "ENCODED_CONTROL_CHARS",
        }
    }
}

/// RQF component violations reported by RFC 8141 validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RqfError {
    /// The component contains NUL, CR or LF.
    #[error("{component} component contains invalid characters")]
    InvalidCharacters {
        /// `resolution`, `query` or `fragment`
        component: &'static str,
    },
}

impl RqfError {
    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCharacters {
                component: "resolution",
            } => "INVALID_RQF_RESOLUTION",
            Self::InvalidCharacters { component: "query" } => "INVALID_RQF_QUERY",
            Self::InvalidCharacters { .. } => "INVALID_RQF_FRAGMENT",
        }
    }
}

/// Errors raised when a decomposed NSS does not fit its parser's shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NssStructureError {
    /// Fewer parts than the parser requires.
    #[error("expected at least {min} parts, got {actual}")]
    TooFewParts {
        /// Minimum number of parts
        min: usize,
        /// Number of parts found
        actual: usize,
    },

    /// More parts than the parser allows.
    #[error("expected at most {max} parts, got {actual}")]
    TooManyParts {
        /// Maximum number of parts
        max: usize,
        /// Number of parts found
        actual: usize,
    },
}

impl NssStructureError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TooFewParts { .. } => "TOO_FEW_PARTS",
            Self::TooManyParts { .. } => "TOO_MANY_PARTS",
        }
    }
}

/// A single finding from report-all structured validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// NID finding
    #[error(transparent)]
    Nid(#[from] NidError),
    /// NSS finding
    #[error(transparent)]
    Nss(#[from] NssError),
    /// RQF finding
    #[error(transparent)]
    Rqf(#[from] RqfError),
}

impl ValidationIssue {
    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Nid(e) => e.code(),
            Self::Nss(e) => e.code(),
            Self::Rqf(e) => e.code(),
        }
    }

    /// Returns the name of the component the issue belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Nid(_) => "nid",
            Self::Nss(_) => "nss",
            Self::Rqf(RqfError::InvalidCharacters { component }) => *component,
        }
    }
}

/// Errors that can occur when parsing a URN or URN-like identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to parse '{input}': {kind}")]
pub struct UrnError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: UrnErrorKind,
}

impl UrnError {
    pub(crate) fn new(input: &str, kind: impl Into<UrnErrorKind>) -> Self {
        Self {
            input: input.to_string(),
            kind: kind.into(),
        }
    }

    /// Returns the stable error code of the underlying kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Specific URN error kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrnErrorKind {
    /// A required argument was empty.
    #[error("the \"{argument}\" argument must be specified")]
    ArgumentRequired {
        /// Name of the missing argument
        argument: &'static str,
    },

    /// The scheme prefix could not be split off.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The input failed a security check.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// No colon between NID and NSS.
    #[error("invalid URN format: missing colon separator between NID and NSS")]
    MissingSeparator,

    /// The colon is the first character.
    #[error("invalid URN format: missing NID")]
    MissingNid,

    /// NID validation failed.
    #[error("NID validation failed: {0}")]
    InvalidNid(#[source] NidError),

    /// NSS validation failed.
    #[error("NSS validation failed: {0}")]
    InvalidNss(#[source] NssError),

    /// The generic tokenizer or formatter failed.
    #[error(transparent)]
    Components(#[from] ComponentError),

    /// The NSS does not fit the parser registered for its NID.
    #[error("NSS structure invalid: {0}")]
    NssStructure(#[from] NssStructureError),

    /// Scheme validation rules failed.
    #[error("validation failed: {}", .errors.join("; "))]
    Validation {
        /// Every accumulated failure message
        errors: Vec<String>,
    },
}

impl UrnErrorKind {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ArgumentRequired { .. } => "ERR_MISSING_ARGS",
            Self::Protocol(e) => e.code(),
            Self::Security(e) => e.code(),
            Self::MissingSeparator => "MISSING_SEPARATOR",
            Self::MissingNid => "MISSING_NID",
            Self::InvalidNid(e) => e.code(),
            Self::InvalidNss(e) => e.code(),
            Self::Components(e) => e.code(),
            Self::NssStructure(e) => e.code(),
            Self::Validation { .. } => "VALIDATION_FAILED",
        }
    }

    /// Returns true for errors raised by the input sanitizer.
    #[must_use]
    pub const fn is_security(&self) -> bool {
        matches!(self, Self::Security(_))
    }
}

impl From<NidError> for UrnErrorKind {
    fn from(e: NidError) -> Self {
        Self::InvalidNid(e)
    }
}

impl From<NssError> for UrnErrorKind {
    fn from(e: NssError) -> Self {
        Self::InvalidNss(e)
    }
}
