//! RFC 8141 parser: an RFC 2141 assigned name followed by optional
//! resolution (`?+`), query (`?=`) and fragment (`#`) components.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use tracing::trace;

use crate::constants::{FRAGMENT_MARKER, QUERY_MARKER, RESOLUTION_MARKER};
use crate::encoding::NssGrammar;
use crate::error::{RqfError, UrnError, UrnErrorKind, ValidationIssue};
use crate::options::ParserOptions;
use crate::rfc2141::{
    Rfc2141Name, check_assigned_name, log_rejection, nid_issues, nss_issues, split_assigned_name,
};
use crate::security::sanitize_input;

/// Resolution, query and fragment components.
///
/// Each is independently optional; `None` (not present) differs from
/// `Some("")` (present but empty). Values are stored without markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rqf {
    /// r-component, after `?+`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub resolution: Option<String>,
    /// q-component, after `?=`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub query: Option<String>,
    /// f-component, after `#`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub fragment: Option<String>,
}

impl Rqf {
    /// Returns true if no component is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.resolution.is_none() && self.query.is_none() && self.fragment.is_none()
    }
}

impl fmt::Display for Rqf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(r) = &self.resolution {
            write!(f, "{RESOLUTION_MARKER}{r}")?;
        }
        if let Some(q) = &self.query {
            write!(f, "{QUERY_MARKER}{q}")?;
        }
        if let Some(frag) = &self.fragment {
            write!(f, "{FRAGMENT_MARKER}{frag}")?;
        }
        Ok(())
    }
}

fn split_off<'a>(input: &'a str, marker: &str) -> (&'a str, Option<&'a str>) {
    match input.find(marker) {
        Some(idx) => (&input[..idx], Some(&input[idx + marker.len()..])),
        None => (input, None),
    }
}

/// Removes the first `?+` r-component, which ends at the next `?` or at
/// the end of `input`. Returns what is left and the component value.
fn take_resolution(input: &str) -> (Cow<'_, str>, Option<&str>) {
    let Some(idx) = input.find(RESOLUTION_MARKER) else {
        return (Cow::Borrowed(input), None);
    };
    let start = idx + RESOLUTION_MARKER.len();
    let end = input[start..].find('?').map_or(input.len(), |i| start + i);
    let (head, tail) = (&input[..idx], &input[end..]);
    let rest = if tail.is_empty() {
        Cow::Borrowed(head)
    } else {
        Cow::Owned(format!("{head}{tail}"))
    };
    (rest, Some(&input[start..end]))
}

/// Splits the RQF components off an RFC 8141 string, returning the
/// assigned name and the components found.
///
/// The fragment is everything after the first `#`. In what precedes it,
/// the resolution runs from the first `?+` up to the next `?`; once that
/// is removed, the query is everything after the first `?=`. A bare `?`
/// left over stays in the assigned name.
///
/// # Examples
///
/// ```
/// use urn_lib::extract_rqf;
///
/// let (assigned, rqf) = extract_rqf("ietf:rfc:7230?+hello?=world#example");
/// assert_eq!(assigned, "ietf:rfc:7230");
/// assert_eq!(rqf.resolution.as_deref(), Some("hello"));
/// assert_eq!(rqf.query.as_deref(), Some("world"));
/// assert_eq!(rqf.fragment.as_deref(), Some("example"));
///
/// let (assigned, rqf) = extract_rqf("ex:a?+r?x");
/// assert_eq!(assigned, "ex:a?x");
/// assert_eq!(rqf.resolution.as_deref(), Some("r"));
/// ```
#[must_use]
pub fn extract_rqf(input: &str) -> (Cow<'_, str>, Rqf) {
    let (rest, fragment) = split_off(input, FRAGMENT_MARKER);
    let (rest, resolution) = take_resolution(rest);
    let (assigned, query) = match rest {
        Cow::Borrowed(rest) => {
            let (assigned, query) = split_off(rest, QUERY_MARKER);
            (Cow::Borrowed(assigned), query.map(str::to_string))
        }
        Cow::Owned(rest) => {
            let (assigned, query) = split_off(&rest, QUERY_MARKER);
            (Cow::Owned(assigned.to_string()), query.map(str::to_string))
        }
    };

    let rqf = Rqf {
        resolution: resolution.map(str::to_string),
        query,
        fragment: fragment.map(str::to_string),
    };
    trace!(
        resolution = rqf.resolution.is_some(),
        query = rqf.query.is_some(),
        fragment = rqf.fragment.is_some(),
        "extracted rqf components"
    );
    (assigned, rqf)
}

/// Formats RQF components in the fixed order resolution, query, fragment.
#[must_use]
pub fn format_rqf(rqf: &Rqf) -> String {
    rqf.to_string()
}

/// Checks RQF components for NUL, CR and LF.
///
/// # Errors
///
/// Returns one [`RqfError`] per offending component.
pub fn validate_rqf(rqf: &Rqf) -> Result<(), Vec<RqfError>> {
    let components = [
        ("resolution", &rqf.resolution),
        ("query", &rqf.query),
        ("fragment", &rqf.fragment),
    ];
    let issues: Vec<RqfError> = components
        .into_iter()
        .filter(|(_, value)| {
            value
                .as_deref()
                .is_some_and(|v| v.contains(['\0', '\r', '\n']))
        })
        .map(|(component, _)| RqfError::InvalidCharacters { component })
        .collect();
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

/// A parsed RFC 8141 URN without its `urn:` prefix.
///
/// Equivalence only considers the assigned name; two names differing only
/// in RQF components are equal.
///
/// # Examples
///
/// ```
/// use urn_lib::{parse_rfc8141, ParserOptions};
///
/// let opts = ParserOptions::default();
/// let name = parse_rfc8141("example:a/b?=x#y", &opts).unwrap();
/// assert_eq!(name.nss(), "a/b");
/// assert_eq!(name.query(), Some("x"));
/// assert_eq!(name, parse_rfc8141("EXAMPLE:a/b", &opts).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Rfc8141Name {
    assigned: Rfc2141Name,
    rqf: Rqf,
}

impl Rfc8141Name {
    /// Creates a name without validating it. The NID is lowercased.
    #[must_use]
    pub fn new(nid: &str, nss: &str, rqf: Rqf) -> Self {
        Self {
            assigned: Rfc2141Name::new(nid, nss),
            rqf,
        }
    }

    /// Parses with default options.
    ///
    /// # Errors
    ///
    /// See [`parse_rfc8141`].
    pub fn parse(input: &str) -> Result<Self, UrnError> {
        parse_rfc8141(input, &ParserOptions::default())
    }

    /// Returns the lowercased namespace identifier.
    #[must_use]
    pub fn nid(&self) -> &str {
        self.assigned.nid()
    }

    /// Returns the NSS in its encoded form.
    #[must_use]
    pub fn nss(&self) -> &str {
        self.assigned.nss()
    }

    /// Returns the percent-decoded NSS.
    #[must_use]
    pub fn decoded_nss(&self) -> Cow<'_, str> {
        self.assigned.decoded_nss()
    }

    /// Returns the r-component, if present.
    #[must_use]
    pub fn resolution(&self) -> Option<&str> {
        self.rqf.resolution.as_deref()
    }

    /// Returns the q-component, if present.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.rqf.query.as_deref()
    }

    /// Returns the f-component, if present.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.rqf.fragment.as_deref()
    }

    /// Returns all RQF components.
    #[must_use]
    pub const fn rqf(&self) -> &Rqf {
        &self.rqf
    }

    /// Returns the `NID:NSS` part.
    #[must_use]
    pub const fn assigned_name(&self) -> &Rfc2141Name {
        &self.assigned
    }

    pub(crate) const fn rqf_mut(&mut self) -> &mut Rqf {
        &mut self.rqf
    }

    pub(crate) const fn assigned_mut(&mut self) -> &mut Rfc2141Name {
        &mut self.assigned
    }
}

impl PartialEq for Rfc8141Name {
    fn eq(&self, other: &Self) -> bool {
        self.assigned == other.assigned
    }
}

impl Eq for Rfc8141Name {}

impl Hash for Rfc8141Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.assigned.hash(state);
    }
}

impl fmt::Display for Rfc8141Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.assigned, self.rqf)
    }
}

impl FromStr for Rfc8141Name {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Rfc8141Name {
    type Error = UrnError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rfc8141Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rfc8141Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_inner(input: &str, options: &ParserOptions) -> Result<Rfc8141Name, UrnErrorKind> {
    let sanitized = sanitize_input(input, options)?;
    let (assigned, rqf) = extract_rqf(sanitized);
    let (nid, nss) = split_assigned_name(&assigned)?;
    check_assigned_name(nid, nss, NssGrammar::Rfc8141, options)?;
    Ok(Rfc8141Name::new(nid, nss, rqf))
}

/// Parses an RFC 8141 URN without its `urn:` prefix.
///
/// RQF components are split off first; the assigned name is then checked
/// like an RFC 2141 name, with `/`, `~` and `&` also allowed in the NSS.
///
/// # Errors
///
/// Returns a [`UrnError`] for the first failure, in the same order as
/// [`parse_rfc2141`](crate::parse_rfc2141).
pub fn parse_rfc8141(input: &str, options: &ParserOptions) -> Result<Rfc8141Name, UrnError> {
    parse_inner(input, options).map_err(|kind| {
        log_rejection(&kind, input);
        UrnError::new(input, kind)
    })
}

/// Formats `nid:nss` followed by the RQF components in fixed order.
///
/// # Examples
///
/// ```
/// use urn_lib::{format_rfc8141, Rfc8141Name, Rqf};
///
/// let rqf = Rqf {
///     fragment: Some("frag".into()),
///     resolution: Some("res".into()),
///     ..Rqf::default()
/// };
/// let name = Rfc8141Name::new("Example", "a", rqf);
/// assert_eq!(format_rfc8141(&name), "example:a?+res#frag");
/// ```
#[must_use]
pub fn format_rfc8141(name: &Rfc8141Name) -> String {
    name.to_string()
}

/// Validates an already-built name and reports every problem found.
///
/// # Errors
///
/// Returns NID issues, then NSS issues, then RQF issues.
pub fn validate_rfc8141(
    name: &Rfc8141Name,
    options: &ParserOptions,
) -> Result<(), Vec<ValidationIssue>> {
    let mut issues: Vec<ValidationIssue> = nid_issues(name.nid())
        .into_iter()
        .map(ValidationIssue::from)
        .collect();
    issues.extend(
        nss_issues(name.nss(), NssGrammar::Rfc8141, options)
            .into_iter()
            .map(ValidationIssue::from),
    );
    if let Err(rqf_issues) = validate_rqf(name.rqf()) {
        issues.extend(rqf_issues.into_iter().map(ValidationIssue::from));
    }
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NidError, NssError};
    use rstest::rstest;

    fn parse(input: &str) -> Result<Rfc8141Name, UrnError> {
        parse_rfc8141(input, &ParserOptions::default())
    }

    #[rstest]
    #[case("ietf:rfc:7230?+hello?=world#example")]
    #[case("example:a/b~c&d")]
    #[case("example:a?+r")]
    #[case("example:a?=q")]
    #[case("example:a#f")]
    #[case("example:a?+#")]
    #[case("example:a?+?=")]
    fn round_trip(#[case] input: &str) {
        assert_eq!(format_rfc8141(&parse(input).unwrap()), input);
    }

    #[test]
    fn all_components() {
        let name = parse("ietf:rfc:7230?+hello?=world#example").unwrap();
        assert_eq!(name.nid(), "ietf");
        assert_eq!(name.nss(), "rfc:7230");
        assert_eq!(name.resolution(), Some("hello"));
        assert_eq!(name.query(), Some("world"));
        assert_eq!(name.fragment(), Some("example"));
    }

    #[test]
    fn absent_differs_from_empty() {
        let name = parse("example:a?=#").unwrap();
        assert_eq!(name.resolution(), None);
        assert_eq!(name.query(), Some(""));
        assert_eq!(name.fragment(), Some(""));
        assert!(parse("example:a").unwrap().rqf().is_empty());
    }

    #[test]
    fn fragment_swallows_later_markers() {
        let (assigned, rqf) = extract_rqf("ex:a#f?+r?=q");
        assert_eq!(assigned, "ex:a");
        assert_eq!(rqf.fragment.as_deref(), Some("f?+r?=q"));
        assert_eq!(rqf.resolution, None);
        assert_eq!(rqf.query, None);
    }

    #[test]
    fn resolution_ends_at_next_question_mark() {
        let err = parse("ex:a?+r?x").unwrap_err();
        assert!(matches!(
            err.kind,
            UrnErrorKind::InvalidNss(NssError::InvalidCharacters { char: '?', .. })
        ));

        let lenient = ParserOptions::new().with_strict(false);
        let name = parse_rfc8141("ex:a?+r?x", &lenient).unwrap();
        assert_eq!(name.nss(), "a?x");
        assert_eq!(name.resolution(), Some("r"));
        assert_eq!(name.query(), None);
    }

    #[test]
    fn resolution_is_found_after_query() {
        let name = parse("example:a?=q?+r").unwrap();
        assert_eq!(name.resolution(), Some("r"));
        assert_eq!(name.query(), Some("q"));
        assert_eq!(name.to_string(), "example:a?+r?=q");
    }

    #[test]
    fn bare_question_mark_stays_in_nss() {
        let err = parse("example:a?b").unwrap_err();
        assert!(matches!(
            err.kind,
            UrnErrorKind::InvalidNss(NssError::InvalidCharacters { char: '?', .. })
        ));
    }

    #[test]
    fn rfc2141_rules_still_apply() {
        assert_eq!(
            parse("urn:x?=q").unwrap_err().kind,
            UrnErrorKind::InvalidNid(NidError::Reserved)
        );
        assert_eq!(
            parse("x?=q").unwrap_err().kind,
            UrnErrorKind::MissingSeparator
        );
        assert_eq!(
            parse("example:?+r").unwrap_err().kind,
            UrnErrorKind::InvalidNss(NssError::Empty)
        );
    }

    #[test]
    fn fixed_output_order() {
        let mut name = parse("example:a").unwrap();
        name.rqf_mut().fragment = Some("frag".into());
        name.rqf_mut().query = Some("query".into());
        name.rqf_mut().resolution = Some("res".into());
        assert_eq!(name.to_string(), "example:a?+res?=query#frag");
    }

    #[test]
    fn equivalence_ignores_rqf() {
        assert_eq!(
            parse("Example:a%2f?=x").unwrap(),
            parse("example:a%2F#y").unwrap()
        );
        assert_ne!(parse("example:a").unwrap(), parse("example:A").unwrap());
    }

    #[test]
    fn rqf_validation() {
        let rqf = Rqf {
            resolution: Some("ok".into()),
            query: Some("a\nb".into()),
            fragment: Some("\0".into()),
        };
        let errs = validate_rqf(&rqf).unwrap_err();
        assert_eq!(
            errs,
            [
                RqfError::InvalidCharacters { component: "query" },
                RqfError::InvalidCharacters {
                    component: "fragment"
                },
            ]
        );
        assert!(validate_rqf(&Rqf::default()).is_ok());
    }

    #[test]
    fn report_all_includes_rqf() {
        let rqf = Rqf {
            query: Some("\r".into()),
            ..Rqf::default()
        };
        let name = Rfc8141Name::new("ex", "", rqf);
        let issues = validate_rfc8141(&name, &ParserOptions::default()).unwrap_err();
        let fields: Vec<_> = issues.iter().map(ValidationIssue::field).collect();
        assert_eq!(fields, ["nss", "query"]);
    }

    #[test]
    fn raw_control_chars_rejected_before_extraction() {
        assert!(parse("example:a#\n").unwrap_err().kind.is_security());
    }
}
