//! Property tests for the matcher and the preprocessor.

use pact_engine::matcher::{MatchOptions, Matcher, PropertyMatcherRegistry};
use pact_engine::preprocess::{PickSpec, PreprocessOptions, Preprocessor};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![Just(Value::Null), scalar()]
}

fn json_value() -> impl Strategy<Value = Value> {
    primitive().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z]{1,5}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn plain_matcher() -> Matcher {
    Matcher::new(Arc::new(PropertyMatcherRegistry::empty()))
}

proptest! {
    #[test]
    fn prop_match_is_reflexive(value in json_value(), strict in any::<bool>(), ignore_case in any::<bool>()) {
        let options = MatchOptions::new().strict(strict).ignore_case(ignore_case);
        let copy = value.clone();
        prop_assert!(plain_matcher().check(&value, &copy, &options).is_ok());
    }

    #[test]
    fn prop_permuted_primitive_arrays_match(
        (items, shuffled) in prop::collection::vec(scalar(), 0..12)
            .prop_flat_map(|items| (Just(items.clone()), Just(items).prop_shuffle()))
    ) {
        let actual = Value::Array(shuffled);
        let expected = Value::Array(items);
        let matcher = plain_matcher();

        prop_assert!(matcher.check(&actual, &expected, &MatchOptions::default()).is_ok());

        let ordered = MatchOptions::new().ignore_primitive_array_order(false);
        let same_order = actual == expected;
        prop_assert_eq!(matcher.check(&actual, &expected, &ordered).is_ok(), same_order);
    }

    #[test]
    fn prop_extra_fields_only_fail_strict(
        base in prop::collection::btree_map("[a-z]{1,5}", primitive(), 0..5),
        extra in primitive(),
    ) {
        let expected = Value::Object(base.clone().into_iter().collect());
        let mut with_extra = base;
        with_extra.insert("EXTRA_FIELD".to_string(), extra.clone());
        let actual = Value::Object(with_extra.into_iter().collect());
        let matcher = plain_matcher();

        prop_assert!(matcher.check(&actual, &expected, &MatchOptions::default()).is_ok());

        let strict = matcher.check(&actual, &expected, &MatchOptions::new().strict(true));
        if extra.is_null() {
            // A null extra field is nullish, like a missing one
            prop_assert!(strict.is_ok());
        } else {
            let failure = strict.unwrap_err();
            prop_assert!(failure.message.contains("EXTRA_FIELD"));
        }
    }

    #[test]
    fn prop_pick_is_idempotent(value in json_value(), keys in prop::collection::vec("[a-zA-Z]{1,5}", 1..4)) {
        let mut parents = BTreeMap::new();
        parents.insert(String::new(), keys.clone());
        parents.insert(keys[0].clone(), keys.clone());
        let options = PreprocessOptions::new().pick(PickSpec::Paths(parents));
        let preprocessor = Preprocessor::new(options);

        let mut once = value;
        preprocessor.apply(&mut once, None);
        let mut twice = once.clone();
        preprocessor.apply(&mut twice, None);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_unresolved_paths_are_noops(value in json_value()) {
        let options = PreprocessOptions::new()
            .ignore(["zz_missing.deeper"])
            .obfuscate(["zz_missing..leaf"])
            .regex_replace("zz_missing", "/a/b/g");
        let mut processed = value.clone();
        Preprocessor::new(options).apply(&mut processed, None);
        prop_assert_eq!(processed, value);
    }
}
