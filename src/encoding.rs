//! Percent-encoding and comparison helpers for NSS values.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use unicode_normalization::{UnicodeNormalization, is_nfc};

/// Characters RFC 2141 lets appear unencoded in an NSS, besides alphanumerics.
const RFC2141_NSS_EXTRA: &[u8] = b"()+,-.:=@;$_!*'";

/// Characters RFC 8141 adds on top of [`RFC2141_NSS_EXTRA`].
const RFC8141_NSS_EXTRA: &[u8] = b"/~&";

/// Bytes that must be encoded when building an RFC 2141 NSS.
const RFC2141_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'(')
    .remove(b')')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b':')
    .remove(b'=')
    .remove(b'@')
    .remove(b';')
    .remove(b'$')
    .remove(b'_')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'');

/// Bytes that must be encoded when building an RFC 8141 NSS.
const RFC8141_ENCODE_SET: &AsciiSet = &RFC2141_ENCODE_SET
    .remove(b'/')
    .remove(b'~')
    .remove(b'&');

/// The NSS character grammar in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NssGrammar {
    /// RFC 2141 character set.
    Rfc2141,
    /// RFC 8141 character set (adds `/`, `~` and `&`).
    Rfc8141,
}

impl NssGrammar {
    /// Returns true if `c` may appear unencoded in an NSS. `%` is accepted
    /// here; its well-formedness is checked separately.
    #[must_use]
    pub fn allows(self, c: char) -> bool {
        if c.is_ascii_alphanumeric() || c == '%' {
            return true;
        }
        let Ok(b) = u8::try_from(c) else {
            return false;
        };
        RFC2141_NSS_EXTRA.contains(&b)
            || (self == Self::Rfc8141 && RFC8141_NSS_EXTRA.contains(&b))
    }

    const fn encode_set(self) -> &'static AsciiSet {
        match self {
            Self::Rfc2141 => RFC2141_ENCODE_SET,
            Self::Rfc8141 => RFC8141_ENCODE_SET,
        }
    }
}

fn hex_value(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).and_then(|d| u8::try_from(d).ok())
}

/// Returns true if every `%` is followed by exactly two hex digits.
#[must_use]
pub fn is_valid_percent_encoding(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Returns true if the string percent-encodes a control character
/// (`%00`–`%1F` or `%7F`, hex digits in either case).
#[must_use]
pub fn has_encoded_control_chars(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.windows(3).any(|w| {
        if w[0] != b'%' {
            return false;
        }
        match (hex_value(w[1]), hex_value(w[2])) {
            (Some(hi), Some(lo)) => {
                let value = (hi << 4) | lo;
                value < 0x20 || value == 0x7f
            }
            _ => false,
        }
    })
}

/// Uppercases the hex digits of every well-formed percent-encoded triplet
/// (the RFC 3986 canonical form). Other characters are left untouched.
#[must_use]
pub fn normalize_percent_encoding(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let needs_fixing = bytes.windows(3).any(|w| {
        w[0] == b'%'
            && w[1].is_ascii_hexdigit()
            && w[2].is_ascii_hexdigit()
            && (w[1].is_ascii_lowercase() || w[2].is_ascii_lowercase())
    });
    if !needs_fixing {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        let tb = tail.as_bytes();
        if tb.len() >= 3 && tb[1].is_ascii_hexdigit() && tb[2].is_ascii_hexdigit() {
            out.push('%');
            out.push(char::from(tb[1].to_ascii_uppercase()));
            out.push(char::from(tb[2].to_ascii_uppercase()));
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Applies Unicode NFC normalization, for equivalence checks only.
#[must_use]
pub fn normalize_for_comparison(s: &str) -> Cow<'_, str> {
    if is_nfc(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.nfc().collect())
    }
}

/// Percent-decodes a string. Invalid UTF-8 in the decoded bytes is
/// replaced with U+FFFD.
#[must_use]
pub fn percent_decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

/// Percent-encodes arbitrary text so that the result is a valid NSS under
/// the given grammar.
///
/// # Examples
///
/// ```
/// use urn_lib::{percent_encode, NssGrammar};
///
/// assert_eq!(percent_encode("a b/c", NssGrammar::Rfc2141), "a%20b%2Fc");
/// assert_eq!(percent_encode("a b/c", NssGrammar::Rfc8141), "a%20b/c");
/// ```
#[must_use]
pub fn percent_encode(s: &str, grammar: NssGrammar) -> String {
    utf8_percent_encode(s, grammar.encode_set()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", true)]
    #[case("a%2Fb", true)]
    #[case("a%2fb%41", true)]
    #[case("%", false)]
    #[case("a%2", false)]
    #[case("a%G1", false)]
    #[case("a%%41", false)]
    #[case("%41%", false)]
    fn percent_encoding_validity(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_percent_encoding(input), expected);
    }

    #[rstest]
    #[case("a%00b", true)]
    #[case("a%1fb", true)]
    #[case("a%1Fb", true)]
    #[case("a%7f", true)]
    #[case("a%20b", false)]
    #[case("a%80b", false)]
    #[case("plain", false)]
    fn encoded_controls(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(has_encoded_control_chars(input), expected);
    }

    #[test]
    fn normalize_uppercases_hex_only() {
        assert_eq!(normalize_percent_encoding("ab%2fcd%e9"), "ab%2Fcd%E9");
        assert_eq!(normalize_percent_encoding("%zz%2f"), "%zz%2F");
        assert!(matches!(normalize_percent_encoding("a%2Fb"), Cow::Borrowed(_)));
    }

    #[test]
    fn nfc_composes() {
        let decomposed = "e\u{301}";
        assert_eq!(normalize_for_comparison(decomposed), "\u{e9}");
        assert!(matches!(normalize_for_comparison("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn decode_and_encode() {
        assert_eq!(percent_decode("a%2Fb%20c"), "a/b c");
        assert_eq!(percent_encode("a%b", NssGrammar::Rfc2141), "a%25b");
        assert_eq!(percent_encode("é", NssGrammar::Rfc8141), "%C3%A9");
        assert_eq!(percent_encode("~&", NssGrammar::Rfc2141), "%7E%26");
    }

    #[test]
    fn grammar_character_sets() {
        for c in "()+,-.:=@;$_!*'%aZ9".chars() {
            assert!(NssGrammar::Rfc2141.allows(c), "{c}");
        }
        for c in "/~&".chars() {
            assert!(!NssGrammar::Rfc2141.allows(c));
            assert!(NssGrammar::Rfc8141.allows(c));
        }
        for c in "?# \"<>é".chars() {
            assert!(!NssGrammar::Rfc8141.allows(c));
        }
    }
}
