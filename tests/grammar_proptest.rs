//! Property-based tests for the URN grammars and the component tokenizer.
//!
//! Strategies generate inputs that are valid by construction; the tests
//! check that the parsers accept them and reproduce them on formatting.

use proptest::prelude::*;

use urn_lib::{
    AwsArn, NID_MAX_LENGTH, NssGrammar, ParserOptions, Rfc8141Urn, format_components,
    format_rfc2141, format_rfc8141, parse_rfc2141, parse_rfc8141, percent_encode, tokenize,
    validate_components,
};

/// Strategies for generating grammar-conformant inputs.
mod strategies {
    use super::*;

    const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    const NID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-";

    /// Unencoded NSS characters under RFC 2141 (without `%`)
    const RFC2141_NSS_CHARS: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789()+,-.:=@;$_!*'";

    /// Characters RFC 8141 adds
    const RFC8141_EXTRA: &[u8] = b"/~&";

    /// Characters safe inside any RQF component: no `?`, no `#`
    const RQF_CHARS: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~!$&'()*+,;=:@/";

    fn from_bytes(bytes: Vec<u8>) -> String {
        bytes.into_iter().map(char::from).collect()
    }

    /// Generate a valid NID (2-32 chars, alphanumeric start, not `urn`)
    pub fn nid() -> impl Strategy<Value = String> {
        let first = prop::sample::select(ALPHANUMERIC.to_vec());
        let rest = prop::collection::vec(
            prop::sample::select(NID_CHARS.to_vec()),
            1..NID_MAX_LENGTH,
        );
        (first, rest)
            .prop_map(|(f, r)| {
                let mut s = String::with_capacity(1 + r.len());
                s.push(char::from(f));
                s.push_str(&from_bytes(r));
                s
            })
            .prop_filter("reserved NID", |s| !s.eq_ignore_ascii_case("urn"))
    }

    /// Generate a percent-encoded triplet that is not a control character
    fn encoded_triplet() -> impl Strategy<Value = String> {
        let hi = prop::sample::select(b"23456".to_vec());
        let lo = prop::sample::select(b"0123456789abcdefABCDEF".to_vec());
        (hi, lo).prop_map(|(h, l)| format!("%{}{}", char::from(h), char::from(l)))
    }

    fn nss_from(chars: Vec<u8>) -> impl Strategy<Value = String> {
        let plain = prop::sample::select(chars).prop_map(|c| char::from(c).to_string());
        let piece = prop_oneof![4 => plain, 1 => encoded_triplet()];
        prop::collection::vec(piece, 1..40).prop_map(|pieces| pieces.concat())
    }

    /// Generate a valid RFC 2141 NSS
    pub fn rfc2141_nss() -> impl Strategy<Value = String> {
        nss_from(RFC2141_NSS_CHARS.to_vec())
    }

    /// Generate a valid RFC 8141 NSS
    pub fn rfc8141_nss() -> impl Strategy<Value = String> {
        let mut chars = RFC2141_NSS_CHARS.to_vec();
        chars.extend_from_slice(RFC8141_EXTRA);
        nss_from(chars)
    }

    /// Generate an optional RQF component value
    pub fn rqf_component() -> impl Strategy<Value = Option<String>> {
        prop::option::of(
            prop::collection::vec(prop::sample::select(RQF_CHARS.to_vec()), 0..20)
                .prop_map(from_bytes),
        )
    }

    /// Generate a complete RFC 8141 name without the `urn:` prefix
    pub fn rfc8141_name() -> impl Strategy<Value = String> {
        (nid(), rfc8141_nss(), rqf_component(), rqf_component(), rqf_component()).prop_map(
            |(nid, nss, r, q, f)| {
                let mut s = format!("{nid}:{nss}");
                if let Some(r) = r {
                    s.push_str("?+");
                    s.push_str(&r);
                }
                if let Some(q) = q {
                    s.push_str("?=");
                    s.push_str(&q);
                }
                if let Some(f) = f {
                    s.push('#');
                    s.push_str(&f);
                }
                s
            },
        )
    }

    /// Generate a colon-free segment, possibly empty
    pub fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9_/-]{0,8}"
    }
}

mod rfc2141_tests {
    use super::strategies::*;
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn valid_names_parse_and_round_trip(nid in nid(), nss in rfc2141_nss()) {
            let input = format!("{nid}:{nss}");
            let parsed = parse_rfc2141(&input, &ParserOptions::default());
            prop_assert!(parsed.is_ok(), "Failed to parse: {}", input);
            let formatted = format_rfc2141(&parsed.unwrap());
            prop_assert_eq!(formatted, format!("{}:{}", nid.to_lowercase(), nss));
        }

        #[test]
        fn nid_case_never_affects_equivalence(nid in nid(), nss in rfc2141_nss()) {
            let opts = ParserOptions::default();
            let upper = parse_rfc2141(&format!("{}:{nss}", nid.to_uppercase()), &opts).unwrap();
            let lower = parse_rfc2141(&format!("{}:{nss}", nid.to_lowercase()), &opts).unwrap();
            prop_assert_eq!(upper, lower);
        }

        #[test]
        fn percent_hex_case_never_affects_equivalence(nid in nid(), nss in rfc2141_nss()) {
            let opts = ParserOptions::default();
            let a = parse_rfc2141(&format!("{nid}:{nss}%2f"), &opts).unwrap();
            let b = parse_rfc2141(&format!("{nid}:{nss}%2F"), &opts).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn null_byte_always_rejected(
            nid in nid(),
            nss in rfc2141_nss(),
            strict in any::<bool>(),
            allow_controls in any::<bool>(),
            allow_encoding in any::<bool>(),
        ) {
            let opts = ParserOptions::new()
                .with_strict(strict)
                .with_allow_control_chars(allow_controls)
                .with_allow_invalid_encoding(allow_encoding);
            let input = format!("{nid}:{nss}\0");
            let err = parse_rfc2141(&input, &opts).unwrap_err();
            prop_assert_eq!(err.code(), "NULL_BYTE_DETECTED");
        }

        #[test]
        fn truncated_escape_rejected_unless_allowed(nid in nid(), nss in rfc2141_nss()) {
            let input = format!("{nid}:{nss}%4");
            prop_assert!(parse_rfc2141(&input, &ParserOptions::default()).is_err());
            let lenient = ParserOptions::new().with_allow_invalid_encoding(true);
            prop_assert!(parse_rfc2141(&input, &lenient).is_ok());
        }

        #[test]
        fn encoded_text_is_a_valid_nss(nid in nid(), raw in "\\PC{1,20}") {
            let nss = percent_encode(&raw, NssGrammar::Rfc2141);
            let input = format!("{nid}:{nss}");
            prop_assert!(
                parse_rfc2141(&input, &ParserOptions::default()).is_ok(),
                "Encoded NSS rejected: {}",
                input
            );
        }
    }
}

mod rfc8141_tests {
    use super::strategies::*;
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn valid_names_round_trip(name in rfc8141_name()) {
            // Lowercase NIDs only, so the formatted string is byte-identical.
            let (nid, rest) = name.split_once(':').unwrap();
            let input = format!("{}:{rest}", nid.to_lowercase());
            let parsed = parse_rfc8141(&input, &ParserOptions::default());
            prop_assert!(parsed.is_ok(), "Failed to parse: {}", input);
            prop_assert_eq!(format_rfc8141(&parsed.unwrap()), input);
        }

        #[test]
        fn rqf_never_affects_equivalence(
            nid in nid(),
            nss in rfc8141_nss(),
            a in rqf_component(),
            b in rqf_component(),
        ) {
            let opts = ParserOptions::default();
            let with_a = a.map_or_else(String::new, |v| format!("?={v}"));
            let with_b = b.map_or_else(String::new, |v| format!("#{v}"));
            let first = parse_rfc8141(&format!("{nid}:{nss}{with_a}"), &opts).unwrap();
            let second = parse_rfc8141(&format!("{nid}:{nss}{with_b}"), &opts).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn wrapper_reference_round_trips(name in rfc8141_name()) {
            let (nid, rest) = name.split_once(':').unwrap();
            let input = format!("urn:{}:{rest}", nid.to_lowercase());
            let urn = Rfc8141Urn::parse(&input);
            prop_assert!(urn.is_ok(), "Failed to parse: {}", input);
            let urn = urn.unwrap();
            prop_assert_eq!(urn.reference(), input.as_str());
        }

        #[test]
        fn encoded_text_is_a_valid_rfc8141_nss(nid in nid(), raw in "\\PC{1,20}") {
            let nss = percent_encode(&raw, NssGrammar::Rfc8141);
            let input = format!("{nid}:{nss}");
            prop_assert!(
                parse_rfc8141(&input, &ParserOptions::default()).is_ok(),
                "Encoded NSS rejected: {}",
                input
            );
        }
    }
}

mod component_tests {
    use super::strategies::*;
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn last_component_absorbs_remainder(
            name_count in 1usize..5,
            segments in prop::collection::vec(segment(), 1..10),
        ) {
            let names: Vec<String> = (0..name_count).map(|i| format!("c{i}")).collect();
            let input = format!("p:{}", segments.join(":"));
            let record = tokenize(&names, ":", Some(input.as_str())).unwrap().unwrap();

            let leading = name_count - 1;
            for (i, name) in names.iter().take(leading).enumerate() {
                prop_assert_eq!(record.get(name), segments.get(i).map(String::as_str));
            }
            let last = names.last().unwrap();
            let expected = (segments.len() > leading).then(|| segments[leading..].join(":"));
            prop_assert_eq!(record.get(last), expected.as_deref());
        }

        #[test]
        fn complete_records_round_trip(segments in prop::collection::vec(segment(), 3..8)) {
            let names = ["a", "b", "c"];
            let input = format!("x:{}", segments.join(":"));
            let record = tokenize(&names, ":", Some(input.as_str())).unwrap().unwrap();
            prop_assert_eq!(format_components(&names, ":", &record).unwrap(), input);
        }

        #[test]
        fn validation_never_returns_empty_list(
            segments in prop::collection::vec(segment(), 0..4),
            allow_empty in any::<bool>(),
        ) {
            let names = ["a", "b", "c"];
            let input = format!("x:{}", segments.join(":"));
            let record = tokenize(&names, ":", Some(input.as_str())).unwrap().unwrap();
            let result = validate_components("x", &[], allow_empty, &names, &record);
            prop_assert!(result.is_none_or(|errors| !errors.is_empty()));
        }

        #[test]
        fn arns_round_trip(
            partition in "[a-z][a-z-]{0,8}",
            service in "[a-z0-9]{1,10}",
            region in "([a-z]{2}-[a-z]+-[0-9])?",
            account in "([0-9]{12})?",
            resource in "[a-zA-Z0-9/_:-]{0,30}",
        ) {
            let input = format!("arn:{partition}:{service}:{region}:{account}:{resource}");
            let arn = AwsArn::parse(&input);
            prop_assert!(arn.is_ok(), "Failed to parse: {}", input);
            let arn = arn.unwrap();
            prop_assert_eq!(arn.reference(), input.as_str());
            prop_assert_eq!(arn.resource(), resource.as_str());
        }
    }
}
