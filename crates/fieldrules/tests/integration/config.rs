//! Engine configuration.

use nebula_fieldrules::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn deserializes_with_defaults() {
    let config: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, EngineConfig::default());

    let config: EngineConfig = serde_json::from_str(r#"{"builtins": false}"#).unwrap();
    assert!(!config.builtins);
    assert!(config.skip_unexported);
}

#[test]
fn serializes_all_fields() {
    let json = serde_json::to_value(EngineConfig::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "builtins": true, "skip_unexported": true })
    );
}

#[derive(Debug, Default)]
struct Account {
    name: String,
    password: String,
}

reflect_record! {
    Account {
        name => [validate = "nonempty"],
        #[unexported] password => [validate = "min(12)"],
    }
}

#[test]
fn engine_without_builtins() {
    let config: EngineConfig = serde_json::from_str(r#"{"builtins": false}"#).unwrap();
    let engine = Engine::with_config(config);
    let errors = engine
        .validate_record(&CancellationToken::new(), &Account::default(), "")
        .unwrap();
    assert_eq!(errors.count_kind(ErrorKind::RuleNotFound), 1);
}

#[test]
fn unexported_fields_follow_config() {
    let account = Account {
        name: "root".into(),
        password: "short".into(),
    };

    assert!(Engine::new().validate(&account).is_ok());

    let engine = Engine::builder().skip_unexported(false).build().unwrap();
    let err = engine.validate(&account).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
