//! Property-based tests for coercion and resolution.

use proptest::prelude::*;
use venvalid::coerce::{parse_bool, parse_integer, parse_list};
use venvalid::{resolve, ErrorKind, Spec, TypeTag, VarSpec};

const VAR_NAMES: [&str; 6] = ["ALPHA", "BRAVO", "CHARLIE", "DELTA", "ECHO", "FOXTROT"];

fn type_tag() -> impl Strategy<Value = TypeTag> {
    prop::sample::select(vec![
        TypeTag::String,
        TypeTag::Integer,
        TypeTag::Boolean,
        TypeTag::List,
        TypeTag::Path,
    ])
}

/// A raw string that is valid for every tag in `type_tag()`.
fn raw_for(tag: TypeTag, seed: i64) -> String {
    match tag {
        TypeTag::Integer => seed.to_string(),
        TypeTag::Boolean => if seed % 2 == 0 { "yes" } else { "off" }.to_string(),
        TypeTag::List => format!("a{}, b", seed),
        _ => format!("value-{}", seed),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Casing and surrounding whitespace never change a truthy keyword.
    #[test]
    fn bool_truthy_ignores_case_and_padding(
        word in prop::sample::select(vec!["1", "true", "yes", "on"]),
        upper in any::<bool>(),
        pad in "[ \t]{0,3}",
    ) {
        let cased = if upper { word.to_uppercase() } else { word.to_string() };
        let raw = format!("{pad}{cased}{pad}");
        prop_assert!(parse_bool(&raw));
    }

    /// Anything outside the truthy set is false.
    #[test]
    fn bool_other_strings_are_false(raw in "[a-z0-9]{0,8}") {
        prop_assume!(!["1", "true", "yes", "on"].contains(&raw.as_str()));
        prop_assert!(!parse_bool(&raw));
    }

    /// Segments never carry surrounding whitespace and the count matches commas.
    #[test]
    fn list_segments_are_trimmed(parts in prop::collection::vec("[a-z.]{0,6}", 1..6), pad in " {0,2}") {
        let raw = parts
            .iter()
            .map(|p| format!("{pad}{p}{pad}"))
            .collect::<Vec<_>>()
            .join(",");
        let list = parse_list(&raw);
        prop_assert_eq!(list.len(), parts.len());
        prop_assert_eq!(list, parts);
    }

    /// Every i64 survives formatting and parsing, with or without padding.
    #[test]
    fn integer_parses_formatted_i64(n in any::<i64>(), pad in " {0,2}") {
        prop_assert_eq!(parse_integer(&format!("{pad}{n}{pad}")), Some(n));
    }

    /// A source holding valid values for every key yields exactly those keys,
    /// in spec order, with the declared types.
    #[test]
    fn valid_source_yields_all_keys(
        tags in prop::collection::vec(type_tag(), 1..=VAR_NAMES.len()),
        seed in -10_000i64..10_000,
    ) {
        let spec = Spec::from_entries(VAR_NAMES.iter().copied().zip(tags.iter().copied()))
            .expect("valid spec");
        let source: Vec<(String, String)> = VAR_NAMES
            .iter()
            .zip(tags.iter())
            .map(|(name, tag)| (name.to_string(), raw_for(*tag, seed)))
            .collect();

        let config = resolve(&spec, &source).expect("valid source");
        prop_assert_eq!(config.len(), tags.len());
        for ((name, value), tag) in config.iter().zip(tags.iter()) {
            prop_assert!(spec.get(name).is_some());
            prop_assert_eq!(value.type_tag(), *tag);
        }
    }

    /// Enum shorthand passes members through and rejects everything else.
    #[test]
    fn enum_membership(raw in "[a-z]{1,6}") {
        let choices = ["dev", "prod", "test"];
        let spec = Spec::builder()
            .var("MODE", VarSpec::one_of(choices))
            .build()
            .expect("valid spec");
        match resolve(&spec, &[("MODE", raw.as_str())]) {
            Ok(config) => {
                prop_assert!(choices.contains(&raw.as_str()));
                prop_assert_eq!(config.get_str("MODE"), Some(raw.as_str()));
            }
            Err(err) => {
                prop_assert!(!choices.contains(&raw.as_str()));
                prop_assert_eq!(err.kind(), ErrorKind::InvalidEnumValue);
            }
        }
    }
}
