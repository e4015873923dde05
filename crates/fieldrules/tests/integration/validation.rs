//! Validation over nested records and collections.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use nebula_fieldrules::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[derive(Debug, Default, Clone)]
struct Contact {
    email: String,
    id: String,
}

reflect_record! {
    Contact {
        email => [validate = "email"],
        id => [validate = "uuid"],
    }
}

#[derive(Debug, Default, Clone)]
struct Team {
    name: String,
    lead: Contact,
    members: Vec<Contact>,
    backup: Option<Contact>,
    quotas: BTreeMap<String, u32>,
    tier: String,
    timeout: Duration,
}

reflect_record! {
    Team {
        name => [validate = "nonempty,max(16)"],
        lead,
        members => [validate_elem = "dive"],
        backup,
        quotas => [validate_key = "min(2)", validate_elem = "max(1000)"],
        tier => [validate = "oneof(free,pro,enterprise)"],
        timeout => [validate = "min(1s),max(1m)"],
    }
}

fn contact(n: u32) -> Contact {
    Contact {
        email: format!("user{n}@example.com"),
        id: format!("123e4567-e89b-12d3-a456-4266141740{n:02}"),
    }
}

fn team() -> Team {
    Team {
        name: "platform".into(),
        lead: contact(1),
        members: vec![contact(2), contact(3)],
        backup: None,
        quotas: BTreeMap::from([("cpu".to_owned(), 100), ("mem".to_owned(), 512)]),
        tier: "pro".into(),
        timeout: Duration::from_secs(30),
    }
}

fn failures(errors: &ValidationErrors) -> Vec<(String, String)> {
    errors
        .iter()
        .map(|e| (e.path.clone(), e.rule.clone()))
        .collect()
}

#[test]
fn valid_team() {
    crate::init_tracing();
    let engine = Engine::new();
    let errors = engine
        .validate_record(&CancellationToken::new(), &team(), "")
        .unwrap();
    assert!(errors.is_empty(), "{errors}");
}

#[test]
fn nested_paths_and_order() {
    let engine = Engine::new();
    let mut team = team();
    team.lead.email = "nobody".into();
    team.members[1].id = "x".into();
    team.backup = Some(Contact::default());
    team.quotas.insert("q".into(), 5000);
    team.tier = "gold".into();

    let errors = engine
        .validate_record(&CancellationToken::new(), &team, "teams[3]")
        .unwrap();
    let expected = [
        ("teams[3].lead.email", "email"),
        ("teams[3].members[1].id", "uuid"),
        ("teams[3].backup.email", "email"),
        ("teams[3].backup.id", "uuid"),
        ("teams[3].quotas[q]", "max"),
        ("teams[3].quotas[q]", "min"),
        ("teams[3].tier", "oneof"),
    ];
    assert_eq!(
        failures(&errors),
        expected
            .iter()
            .map(|(p, r)| ((*p).to_owned(), (*r).to_owned()))
            .collect::<Vec<_>>()
    );
    assert_eq!(errors.by_path("teams[3].quotas[q]").count(), 2);
}

#[rstest]
#[case(Duration::from_millis(500), Some("min"))]
#[case(Duration::from_secs(1), None)]
#[case(Duration::from_secs(61), Some("max"))]
fn duration_bounds(#[case] timeout: Duration, #[case] failing: Option<&str>) {
    let engine = Engine::new();
    let team = Team {
        timeout,
        ..team()
    };
    let errors = engine
        .validate_record(&CancellationToken::new(), &team, "")
        .unwrap();
    assert_eq!(errors.iter().next().map(|e| e.rule.as_str()), failing);
}

#[derive(Debug, Default)]
struct Mixed {
    items: Vec<Option<Contact>>,
}

reflect_record! {
    Mixed {
        items => [validate_elem = "dive"],
    }
}

#[test]
fn dive_reports_only_non_records() {
    let engine = Engine::new();
    let mixed = Mixed {
        items: vec![None, Some(Contact::default())],
    };
    let errors = engine
        .validate_record(&CancellationToken::new(), &mixed, "")
        .unwrap();

    assert_eq!(errors.count_kind(ErrorKind::DiveMisuse), 1);
    assert_eq!(errors.errors()[0].path, "items[0]");
    assert_eq!(errors.errors()[0].rule, "dive");
    assert_eq!(errors.count_kind(ErrorKind::RuleConstraintViolated), 2);
}

#[derive(Debug, Default)]
struct Member {
    name: String,
}

reflect_record! {
    Member {
        name => [validate = "nonempty"],
    }
}

fn member(name: &str) -> Member {
    Member { name: name.into() }
}

#[derive(Debug, Default)]
struct Directory {
    by_key: BTreeMap<String, Member>,
    by_ptr: HashMap<String, Option<Member>>,
    roster: Option<Vec<Member>>,
}

reflect_record! {
    Directory {
        by_key => [validate_elem = "dive"],
        by_ptr => [validate_elem = "dive"],
        roster => [validate_elem = "dive"],
    }
}

#[test]
fn dive_into_map_values_and_pointed_lists() {
    let engine = Engine::new();
    let directory = Directory {
        by_key: BTreeMap::from([("j".to_owned(), member("ann")), ("k".to_owned(), member(""))]),
        by_ptr: HashMap::from([
            ("a".to_owned(), None),
            ("b".to_owned(), Some(member(""))),
            ("c".to_owned(), Some(member("bo"))),
        ]),
        roster: Some(vec![member("cy"), member("")]),
    };
    let errors = engine
        .validate_record(&CancellationToken::new(), &directory, "")
        .unwrap();

    let expected = [
        ("by_key[k].name", "nonempty"),
        ("by_ptr[a]", "dive"),
        ("by_ptr[b].name", "nonempty"),
        ("roster[1].name", "nonempty"),
    ];
    assert_eq!(
        failures(&errors),
        expected
            .iter()
            .map(|(p, r)| ((*p).to_owned(), (*r).to_owned()))
            .collect::<Vec<_>>()
    );
    let misuse: Vec<_> = errors.by_path("by_ptr[a]").collect();
    assert_eq!(misuse.len(), 1);
    assert_eq!(misuse[0].kind(), ErrorKind::DiveMisuse);
    assert_eq!(errors.count_kind(ErrorKind::RuleConstraintViolated), 3);
}

#[test]
fn null_pointed_list_has_no_elements() {
    let directory = Directory::default();
    let errors = Engine::new()
        .validate_record(&CancellationToken::new(), &directory, "")
        .unwrap();
    assert!(errors.is_empty(), "{errors}");
}

#[test]
fn validate_wraps_failures() {
    let engine = Engine::new();
    let mut team = team();
    team.name.clear();

    let err = engine.validate(&team).unwrap_err();
    let Error::Validation(errors) = &err else {
        panic!("unexpected {err:?}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(
        err.to_string(),
        "validation failed: name: nonempty: must not be empty"
    );
}

#[test]
fn field_error_renders_params() {
    let engine = Engine::new();
    let mut team = team();
    team.name = "a-very-long-team-name".into();
    let errors = engine
        .validate_record(&CancellationToken::new(), &team, "")
        .unwrap();
    assert_eq!(
        errors.errors()[0].to_string(),
        "name: max(16): length 21 exceeds maximum 16"
    );
}

#[derive(Debug, Default)]
struct Plain {
    name: String,
    count: u64,
    nested: Contact,
}

reflect_record! {
    Plain {
        name,
        count,
        nested,
    }
}

#[test]
fn nested_rules_run_without_annotations_on_the_parent() {
    let engine = Engine::new();
    let errors = engine
        .validate_record(&CancellationToken::new(), &Plain::default(), "")
        .unwrap();
    assert_eq!(
        failures(&errors),
        vec![
            ("nested.email".to_owned(), "email".to_owned()),
            ("nested.id".to_owned(), "uuid".to_owned()),
        ]
    );
}
