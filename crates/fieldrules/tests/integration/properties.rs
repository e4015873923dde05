//! Property-based tests.

use std::any::TypeId;

use nebula_fieldrules::annotation::{
    AnnotationCache, AnnotationKey, AnnotationKind, parse_annotation,
};
use nebula_fieldrules::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct Bare {
    name: String,
    count: i64,
    ratio: f64,
    flags: Vec<bool>,
    extra: Option<u16>,
}

reflect_record! {
    Bare {
        name,
        count,
        ratio,
        flags,
        extra,
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Defaults {
    name: String,
    count: i64,
    limit: Option<u32>,
    levels: Vec<u8>,
}

reflect_record! {
    Defaults {
        name => [default = "anon"],
        count => [default = "-7"],
        limit => [default = "100"],
        levels => [default_elem = "3"],
    }
}

fn bare() -> impl Strategy<Value = Bare> {
    (
        ".*",
        any::<i64>(),
        any::<f64>(),
        proptest::collection::vec(any::<bool>(), 0..8),
        proptest::option::of(any::<u16>()),
    )
        .prop_map(|(name, count, ratio, flags, extra)| Bare {
            name,
            count,
            ratio,
            flags,
            extra,
        })
}

fn defaults() -> impl Strategy<Value = Defaults> {
    (
        prop_oneof![Just(String::new()), "[a-z]{1,8}"],
        prop_oneof![Just(0i64), any::<i64>()],
        proptest::option::of(any::<u32>()),
        proptest::collection::vec(any::<u8>(), 0..8),
    )
        .prop_map(|(name, count, limit, levels)| Defaults {
            name,
            count,
            limit,
            levels,
        })
}

fn annotation() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,6}(\\([a-z0-9, ]{0,8}\\))?", 0..5)
        .prop_map(|tokens| tokens.join(","))
}

proptest! {
    #[test]
    fn no_annotations_is_a_no_op(record in bare()) {
        let engine = Engine::new();
        let mut copy = record.clone();
        prop_assert!(engine.apply_defaults(&mut copy).is_ok());
        prop_assert!(copy == record || (record.ratio.is_nan() && copy.ratio.is_nan()));
        prop_assert!(engine.validate(&record).is_ok());
    }

    #[test]
    fn defaults_never_overwrite_non_zero(record in defaults()) {
        let engine = Engine::new();
        let mut once = record.clone();
        engine.apply_defaults(&mut once).unwrap();

        if !record.name.is_empty() {
            prop_assert_eq!(&once.name, &record.name);
        }
        if record.count != 0 {
            prop_assert_eq!(once.count, record.count);
        }
        if record.limit.is_some() {
            prop_assert_eq!(once.limit, record.limit);
        }
        for (before, after) in record.levels.iter().zip(&once.levels) {
            prop_assert_eq!(*after, if *before == 0 { 3 } else { *before });
        }

        let mut twice = once.clone();
        engine.apply_defaults(&mut twice).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn cached_parse_matches_fresh_parse(raw in annotation(), field in 0usize..16) {
        let cache = AnnotationCache::new();
        let key = AnnotationKey::new(TypeId::of::<Bare>(), field, AnnotationKind::Validate);
        let first = cache.get_or_parse(key, &raw);
        let second = cache.get_or_parse(key, &raw);
        let fresh = parse_annotation(&raw);
        prop_assert_eq!(&*first, fresh.as_slice());
        prop_assert_eq!(&*second, fresh.as_slice());
    }

    #[test]
    fn oneof_without_params_is_missing_parameter(n in any::<i64>(), s in ".*") {
        let registry = RuleRegistry::with_builtins();
        let err = registry.invoke("oneof", &n, &[]).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::MissingRuleParameter);
        let err = registry.invoke("oneof", &s, &[]).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::MissingRuleParameter);
    }
}
