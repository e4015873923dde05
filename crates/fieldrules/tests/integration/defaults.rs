//! Default application over nested records, pointers and collections.

use std::collections::HashMap;
use std::time::Duration;

use nebula_fieldrules::prelude::*;
use pretty_assertions::assert_eq;

#[derive(Debug, Default, Clone, PartialEq)]
struct Tls {
    enabled: bool,
    min_version: String,
}

reflect_record! {
    Tls {
        enabled => [default = "true"],
        min_version => [default = "1.2"],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Upstream {
    url: String,
    timeout: Duration,
    weight: Option<u32>,
}

reflect_record! {
    Upstream {
        url => [default = "http://localhost"],
        timeout => [default = "5s"],
        weight => [default = "1"],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Gateway {
    listen: String,
    tls: Option<Box<Tls>>,
    upstreams: Vec<Upstream>,
    pools: HashMap<String, Option<Upstream>>,
    headers: Option<HashMap<String, String>>,
    ratios: [f64; 3],
}

reflect_record! {
    Gateway {
        listen => [default = "0.0.0.0:80"],
        tls => [default = "dive"],
        upstreams => [default_elem = "dive"],
        pools => [default_elem = "dive"],
        headers => [default = "alloc"],
        ratios => [default_elem = "0.5"],
    }
}

#[test]
fn fills_a_nested_configuration() {
    crate::init_tracing();
    let engine = Engine::new();
    let mut gateway = Gateway {
        upstreams: vec![
            Upstream::default(),
            Upstream {
                url: "http://api".into(),
                ..Upstream::default()
            },
        ],
        pools: HashMap::from([("blue".to_owned(), None), ("green".to_owned(), None)]),
        ratios: [0.0, 0.25, 0.0],
        ..Gateway::default()
    };

    engine.apply_defaults(&mut gateway).unwrap();

    assert_eq!(gateway.listen, "0.0.0.0:80");
    assert_eq!(
        gateway.tls.as_deref(),
        Some(&Tls {
            enabled: true,
            min_version: "1.2".into(),
        })
    );
    assert_eq!(gateway.upstreams[0].url, "http://localhost");
    assert_eq!(gateway.upstreams[1].url, "http://api");
    assert_eq!(gateway.upstreams[1].timeout, Duration::from_secs(5));
    assert_eq!(gateway.upstreams[1].weight, Some(1));
    for pool in gateway.pools.values() {
        assert_eq!(pool.as_ref().map(|u| u.url.as_str()), Some("http://localhost"));
    }
    assert_eq!(gateway.headers, Some(HashMap::new()));
    assert_eq!(gateway.ratios, [0.5, 0.25, 0.5]);
}

#[test]
fn second_pass_changes_nothing() {
    let engine = Engine::new();
    let mut gateway = Gateway {
        upstreams: vec![Upstream::default()],
        ..Gateway::default()
    };
    engine.apply_defaults(&mut gateway).unwrap();
    let first = gateway.clone();
    engine.apply_defaults(&mut gateway).unwrap();
    assert_eq!(gateway, first);
}

#[test]
fn existing_pointer_targets_are_walked() {
    let engine = Engine::new();
    let mut gateway = Gateway {
        tls: Some(Box::new(Tls {
            enabled: false,
            min_version: "1.3".into(),
        })),
        ..Gateway::default()
    };
    engine.apply_defaults(&mut gateway).unwrap();
    let tls = gateway.tls.unwrap();
    // `false` is the zero value, so it is defaulted.
    assert!(tls.enabled);
    assert_eq!(tls.min_version, "1.3");
}

#[test]
fn defaults_through_a_root_pointer() {
    let engine = Engine::new();
    let mut root = Some(Upstream::default());
    engine.apply_defaults(&mut root).unwrap();
    assert_eq!(root.map(|u| u.timeout), Some(Duration::from_secs(5)));
}

#[derive(Debug, Default)]
struct BadDuration {
    timeout: Duration,
}

reflect_record! {
    BadDuration {
        timeout => [default = "soon"],
    }
}

#[derive(Debug, Default)]
struct AllocOnList {
    items: Vec<String>,
    label: String,
}

reflect_record! {
    AllocOnList {
        items => [default = "alloc"],
        label => [default = "alloc-ignored"],
    }
}

#[derive(Debug, Default)]
struct LiteralOnPointerToRecord {
    tls: Option<Tls>,
}

reflect_record! {
    LiteralOnPointerToRecord {
        tls => [default = "on"],
    }
}

#[test]
fn error_cases() {
    let engine = Engine::new();

    let err = engine.apply_defaults(&mut BadDuration::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotSetDefault);
    assert_eq!(err.code(), "FIELDRULES_CANNOT_SET_DEFAULT");

    let err = engine
        .apply_defaults(&mut LiteralOnPointerToRecord::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotSetDefault);

    let err = engine.apply_defaults(&mut "text".to_owned()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTarget);
}

#[test]
fn alloc_is_a_no_op_on_non_pointers() {
    let engine = Engine::new();
    let mut target = AllocOnList::default();
    engine.apply_defaults(&mut target).unwrap();
    assert!(target.items.is_empty());
    assert_eq!(target.label, "alloc-ignored");
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Region {
    name: String,
    primary: Option<Box<Zone>>,
}

reflect_record! {
    Region {
        name => [default = "region"],
        primary => [default = "dive"],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Zone {
    name: String,
    failover: Option<Box<Region>>,
}

reflect_record! {
    Zone {
        name => [default = "zone"],
        failover => [default = "dive"],
    }
}

#[test]
fn mutually_recursive_dives_terminate() {
    crate::init_tracing();
    let mut region = Region::default();
    Engine::new().apply_defaults(&mut region).unwrap();

    let zone = region.primary.as_deref().unwrap();
    assert_eq!(zone.name, "zone");
    let failover = zone.failover.as_deref().unwrap();
    assert_eq!(failover.name, "region");
    assert_eq!(failover.primary, None);
}
