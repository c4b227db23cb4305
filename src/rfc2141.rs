//! RFC 2141 `NID:NSS` parser.
//!
//! Input is the protocol-less assigned name: `parse_rfc2141("isbn:0451450523")`.
//! Passing a string that still carries the `urn:` prefix makes `urn` the NID,
//! which is reserved and rejected in strict mode.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::constants::{DEFAULT_SEPARATOR, NID_MAX_LENGTH, NID_MIN_LENGTH, RESERVED_NID};
use crate::encoding::{
    NssGrammar, has_encoded_control_chars, is_valid_percent_encoding, normalize_for_comparison,
    normalize_percent_encoding, percent_decode, percent_encode,
};
use crate::error::{NidError, NssError, UrnError, UrnErrorKind, ValidationIssue};
use crate::options::ParserOptions;
use crate::security::sanitize_input;

/// A parsed RFC 2141 URN without its `urn:` prefix.
///
/// The NID is stored lowercased; the NSS keeps its original percent-encoding.
///
/// Equality and hashing follow URN equivalence: NIDs compare
/// case-insensitively, NSS values compare case-sensitively after Unicode
/// NFC normalization and uppercasing of percent-encoded hex digits.
///
/// # Examples
///
/// ```
/// use urn_lib::{parse_rfc2141, ParserOptions};
///
/// let opts = ParserOptions::default();
/// let a = parse_rfc2141("EXAMPLE:a%2fb", &opts).unwrap();
/// let b = parse_rfc2141("example:a%2Fb", &opts).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.nss(), "a%2fb");
/// ```
#[derive(Debug, Clone)]
pub struct Rfc2141Name {
    nid: String,
    nss: String,
}

impl Rfc2141Name {
    /// Creates a name without validating it. The NID is lowercased.
    #[must_use]
    pub fn new(nid: &str, nss: &str) -> Self {
        Self {
            nid: nid.to_lowercase(),
            nss: nss.to_string(),
        }
    }

    /// Parses an assigned name with default options.
    ///
    /// # Errors
    ///
    /// See [`parse_rfc2141`].
    pub fn parse(input: &str) -> Result<Self, UrnError> {
        parse_rfc2141(input, &ParserOptions::default())
    }

    /// Returns the lowercased namespace identifier.
    #[must_use]
    pub fn nid(&self) -> &str {
        &self.nid
    }

    /// Returns the namespace specific string in its encoded form.
    #[must_use]
    pub fn nss(&self) -> &str {
        &self.nss
    }

    /// Returns the percent-decoded NSS. The stored form is unaffected.
    #[must_use]
    pub fn decoded_nss(&self) -> Cow<'_, str> {
        percent_decode(&self.nss)
    }

    pub(crate) fn set_nid(&mut self, nid: &str) {
        self.nid = nid.to_lowercase();
    }

    pub(crate) fn set_nss(&mut self, nss: &str) {
        self.nss = nss.to_string();
    }
}

/// NSS in the form used for equivalence checks.
pub(crate) fn nss_equivalence_key(nss: &str) -> String {
    normalize_percent_encoding(&normalize_for_comparison(nss)).into_owned()
}

impl PartialEq for Rfc2141Name {
    fn eq(&self, other: &Self) -> bool {
        self.nid == other.nid && nss_equivalence_key(&self.nss) == nss_equivalence_key(&other.nss)
    }
}

impl Eq for Rfc2141Name {}

impl Hash for Rfc2141Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nid.hash(state);
        nss_equivalence_key(&self.nss).hash(state);
    }
}

impl fmt::Display for Rfc2141Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DEFAULT_SEPARATOR}{}", self.nid, self.nss)
    }
}

impl FromStr for Rfc2141Name {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Rfc2141Name {
    type Error = UrnError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rfc2141Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rfc2141Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Checks an NID, stopping at the first problem.
///
/// Checks run in order: length (2–32 characters), format (ASCII
/// alphanumerics and hyphens, starting with an alphanumeric), then the
/// reserved word `urn` in any case.
///
/// # Errors
///
/// Returns the first [`NidError`] found.
pub fn validate_nid(nid: &str) -> Result<(), NidError> {
    if let Some(err) = nid_length_error(nid) {
        return Err(err);
    }
    if !is_nid_format(nid) {
        return Err(NidError::InvalidFormat);
    }
    if nid.eq_ignore_ascii_case(RESERVED_NID) {
        return Err(NidError::Reserved);
    }
    Ok(())
}

fn nid_length_error(nid: &str) -> Option<NidError> {
    let actual = nid.chars().count();
    if (NID_MIN_LENGTH..=NID_MAX_LENGTH).contains(&actual) {
        None
    } else {
        Some(NidError::InvalidLength {
            min: NID_MIN_LENGTH,
            max: NID_MAX_LENGTH,
            actual,
        })
    }
}

fn is_nid_format(nid: &str) -> bool {
    nid.chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphanumeric())
        && nid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Checks an NSS against a grammar, stopping at the first problem.
///
/// Checks run in order: emptiness, character set, percent-encoding
/// well-formedness (unless `allow_invalid_encoding`), then encoded control
/// characters (unless `allow_control_chars`).
///
/// # Errors
///
/// Returns the first [`NssError`] found.
pub fn validate_nss(
    nss: &str,
    grammar: NssGrammar,
    options: &ParserOptions,
) -> Result<(), NssError> {
    match nss_issues(nss, grammar, options).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

pub(crate) fn nss_issues(nss: &str, grammar: NssGrammar, options: &ParserOptions) -> Vec<NssError> {
    if nss.is_empty() {
        return vec![NssError::Empty];
    }

    let mut issues = Vec::new();
    if let Some((position, c)) = nss.chars().enumerate().find(|(_, c)| !grammar.allows(*c)) {
        issues.push(NssError::InvalidCharacters { char: c, position });
    }
    if !options.allow_invalid_encoding && !is_valid_percent_encoding(nss) {
        issues.push(NssError::InvalidEncoding);
    }
    if !options.allow_control_chars && has_encoded_control_chars(nss) {
        issues.push(NssError::EncodedControlChars);
    }
    issues
}

pub(crate) fn nid_issues(nid: &str) -> Vec<NidError> {
    let mut issues: Vec<NidError> = nid_length_error(nid).into_iter().collect();
    if !is_nid_format(nid) {
        issues.push(NidError::InvalidFormat);
    }
    if nid.eq_ignore_ascii_case(RESERVED_NID) {
        issues.push(NidError::Reserved);
    }
    issues
}

/// Splits an assigned name at its first colon.
pub(crate) fn split_assigned_name(assigned: &str) -> Result<(&str, &str), UrnErrorKind> {
    match assigned.find(DEFAULT_SEPARATOR) {
        None => Err(UrnErrorKind::MissingSeparator),
        Some(0) => Err(UrnErrorKind::MissingNid),
        Some(idx) => Ok((&assigned[..idx], &assigned[idx + DEFAULT_SEPARATOR.len()..])),
    }
}

/// Fail-fast NID and NSS checks shared by both RFC parsers.
pub(crate) fn check_assigned_name(
    nid: &str,
    nss: &str,
    grammar: NssGrammar,
    options: &ParserOptions,
) -> Result<(), UrnErrorKind> {
    if options.strict {
        validate_nid(nid)?;
        validate_nss(nss, grammar, options)?;
    }
    Ok(())
}

// The rendered error can quote input characters, so it stays at trace.
pub(crate) fn log_rejection(kind: &UrnErrorKind, input: &str) {
    debug!(code = kind.code(), input_len = input.len(), "rejected URN");
    trace!(error = %kind, "rejection detail");
}

fn parse_inner(input: &str, options: &ParserOptions) -> Result<Rfc2141Name, UrnErrorKind> {
    let sanitized = sanitize_input(input, options)?;
    let (nid, nss) = split_assigned_name(sanitized)?;
    check_assigned_name(nid, nss, NssGrammar::Rfc2141, options)?;
    Ok(Rfc2141Name::new(nid, nss))
}

/// Parses an RFC 2141 assigned name (`NID:NSS`, without `urn:`).
///
/// # Errors
///
/// Returns a [`UrnError`] whose kind is the first failure in this order:
/// a security check, a missing separator or NID, then (in strict mode) an
/// NID or NSS grammar violation.
///
/// # Examples
///
/// ```
/// use urn_lib::{parse_rfc2141, ParserOptions};
///
/// let name = parse_rfc2141("ISBN:0451450523", &ParserOptions::default()).unwrap();
/// assert_eq!(name.nid(), "isbn");
/// assert_eq!(name.nss(), "0451450523");
///
/// let err = parse_rfc2141("urn:test", &ParserOptions::default()).unwrap_err();
/// assert_eq!(err.code(), "RESERVED_NID");
/// ```
pub fn parse_rfc2141(input: &str, options: &ParserOptions) -> Result<Rfc2141Name, UrnError> {
    parse_inner(input, options).map_err(|kind| {
        log_rejection(&kind, input);
        UrnError::new(input, kind)
    })
}

/// Formats a name as `nid:nss`. No validation is performed.
#[must_use]
pub fn format_rfc2141(name: &Rfc2141Name) -> String {
    name.to_string()
}

/// Validates an already-built name and reports every problem found.
///
/// # Errors
///
/// Returns all NID issues followed by all NSS issues.
pub fn validate_rfc2141(
    name: &Rfc2141Name,
    options: &ParserOptions,
) -> Result<(), Vec<ValidationIssue>> {
    let issues: Vec<ValidationIssue> = nid_issues(name.nid())
        .into_iter()
        .map(ValidationIssue::from)
        .chain(
            nss_issues(name.nss(), NssGrammar::Rfc2141, options)
                .into_iter()
                .map(ValidationIssue::from),
        )
        .collect();
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

/// Percent-encodes arbitrary text into an NSS valid under `grammar`.
#[must_use]
pub fn encode_nss(raw: &str, grammar: NssGrammar) -> String {
    percent_encode(raw, grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    fn parse(input: &str) -> Result<Rfc2141Name, UrnError> {
        parse_rfc2141(input, &ParserOptions::default())
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn logs_at(level: Level, input: &str) -> String {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(capture.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            assert!(parse(input).is_err());
        });
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn parse_basic() {
        let name = parse("isbn:0451450523").unwrap();
        assert_eq!(name.nid(), "isbn");
        assert_eq!(name.nss(), "0451450523");
        assert_eq!(format_rfc2141(&name), "isbn:0451450523");
    }

    #[test]
    fn nss_keeps_further_colons() {
        let name = parse("ietf:rfc:2141").unwrap();
        assert_eq!(name.nss(), "rfc:2141");
    }

    #[rstest]
    #[case("urn:test")]
    #[case("URN:test")]
    #[case("uRn:test")]
    fn reserved_nid(#[case] input: &str) {
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, UrnErrorKind::InvalidNid(NidError::Reserved));
    }

    #[test]
    fn structural_errors() {
        assert_eq!(parse("isbn").unwrap_err().kind, UrnErrorKind::MissingSeparator);
        assert_eq!(parse(":abc").unwrap_err().kind, UrnErrorKind::MissingNid);
    }

    #[rstest]
    #[case("a:x")]
    #[case("abcdefghijklmnopqrstuvwxyz0123456:x")]
    fn nid_length_bounds(#[case] input: &str) {
        assert!(matches!(
            parse(input).unwrap_err().kind,
            UrnErrorKind::InvalidNid(NidError::InvalidLength { .. })
        ));
    }

    #[rstest]
    #[case("ab:x")]
    #[case("abcdefghijklmnopqrstuvwxyz012345:x")]
    #[case("a-:x")]
    #[case("1a:x")]
    fn nid_accepted(#[case] input: &str) {
        assert!(parse(input).is_ok());
    }

    #[rstest]
    #[case("-ab:x")]
    #[case("a_b:x")]
    #[case("ab.c:x")]
    fn nid_format(#[case] input: &str) {
        assert_eq!(
            parse(input).unwrap_err().kind,
            UrnErrorKind::InvalidNid(NidError::InvalidFormat)
        );
    }

    #[test]
    fn nid_length_checked_before_format() {
        assert!(matches!(
            validate_nid("-"),
            Err(NidError::InvalidLength { actual: 1, .. })
        ));
    }

    #[test]
    fn nss_errors() {
        assert_eq!(
            parse("isbn:").unwrap_err().kind,
            UrnErrorKind::InvalidNss(NssError::Empty)
        );
        assert_eq!(
            parse("isbn:a/b").unwrap_err().kind,
            UrnErrorKind::InvalidNss(NssError::InvalidCharacters {
                char: '/',
                position: 1
            })
        );
        assert_eq!(
            parse("isbn:a%2").unwrap_err().kind,
            UrnErrorKind::InvalidNss(NssError::InvalidEncoding)
        );
        assert_eq!(
            parse("isbn:a%0A").unwrap_err().kind,
            UrnErrorKind::InvalidNss(NssError::EncodedControlChars)
        );
    }

    #[test]
    fn nss_options_relax_checks() {
        let opts = ParserOptions::new()
            .with_allow_invalid_encoding(true)
            .with_allow_control_chars(true);
        assert!(parse_rfc2141("isbn:a%2", &opts).is_ok());
        assert!(parse_rfc2141("isbn:a%0A", &opts).is_ok());
    }

    #[test]
    fn non_strict_skips_grammar_but_not_structure() {
        let opts = ParserOptions::new().with_strict(false);
        let name = parse_rfc2141("urn:a b/c", &opts).unwrap();
        assert_eq!(name.nid(), "urn");
        assert_eq!(name.nss(), "a b/c");
        assert_eq!(
            parse_rfc2141("nocolon", &opts).unwrap_err().kind,
            UrnErrorKind::MissingSeparator
        );
        assert!(parse_rfc2141("a:\0", &opts).unwrap_err().kind.is_security());
    }

    #[test]
    fn security_bounds() {
        let long = format!("isbn:{}", "a".repeat(100_001 - 5));
        assert!(parse(&long).unwrap_err().kind.is_security());
        let opts = ParserOptions::new().with_max_length(200_000);
        assert!(parse_rfc2141(&long, &opts).is_ok());

        let opts = ParserOptions::new()
            .with_strict(false)
            .with_allow_control_chars(true)
            .with_allow_invalid_encoding(true);
        assert!(parse_rfc2141("isbn:a\0b", &opts).is_err());
    }

    #[test]
    fn equivalence() {
        assert_eq!(parse("EXAMPLE:test").unwrap(), parse("example:test").unwrap());
        assert_ne!(parse("example:test").unwrap(), parse("example:TEST").unwrap());
        assert_eq!(parse("example:a%2fb").unwrap(), parse("example:a%2Fb").unwrap());
    }

    #[test]
    fn equivalent_names_hash_alike() {
        let mut set = HashSet::new();
        set.insert(parse("example:a%2fb").unwrap());
        set.insert(parse("EXAMPLE:a%2Fb").unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn equivalence_uses_nfc() {
        let opts = ParserOptions::new().with_strict(false);
        let composed = parse_rfc2141("ex:\u{e9}", &opts).unwrap();
        let decomposed = parse_rfc2141("ex:e\u{301}", &opts).unwrap();
        assert_eq!(composed, decomposed);
        assert_eq!(decomposed.nss(), "e\u{301}");
    }

    #[test]
    fn report_all_validation() {
        let name = Rfc2141Name::new("-urn_", "a%zz%00/");
        let issues = validate_rfc2141(&name, &ParserOptions::default()).unwrap_err();
        let codes: Vec<_> = issues.iter().map(ValidationIssue::code).collect();
        assert_eq!(
            codes,
            [
                "INVALID_NID_FORMAT",
                "INVALID_NSS_CHARACTERS",
                "INVALID_ENCODING",
                "ENCODED_CONTROL_CHARS",
            ]
        );
        assert!(validate_rfc2141(&parse("isbn:1").unwrap(), &ParserOptions::default()).is_ok());
    }

    #[test]
    fn decoded_and_encoded_nss() {
        let name = parse("example:a%20b").unwrap();
        assert_eq!(name.decoded_nss(), "a b");
        assert_eq!(name.nss(), "a%20b");

        let nss = encode_nss("a b/c", NssGrammar::Rfc2141);
        assert!(parse(&format!("example:{nss}")).is_ok());
    }

    #[test]
    fn rejection_detail_only_at_trace() {
        let debug = logs_at(Level::DEBUG, "example:a^b");
        assert!(debug.contains("rejected URN"));
        assert!(debug.contains("input_len=11"));
        assert!(!debug.contains("'^'"));

        let trace = logs_at(Level::TRACE, "example:a^b");
        assert!(trace.contains("rejection detail"));
        assert!(trace.contains("'^'"));
    }
}
