//! `replace` tests

#![expect(clippy::unwrap_used, reason = "test code")]

mod common;

use common::{Gateway, NestedConfig, RepeatingConfig, TestConfig, credentials, listener};
use confclass::Value;

fn loaded_test_config() -> confclass::Instance {
    let mut conf = confclass::construct::<TestConfig>().unwrap();
    confclass::load_str(&mut conf, "").unwrap();
    conf
}

#[test]
fn replace_overrides_named_fields_only() {
    let conf = loaded_test_config();
    let replaced = conf.replace([("field3", 59)]).unwrap();

    assert!(replaced.is_loaded());
    assert_eq!(replaced.get_int("field3").unwrap(), 59);
    assert_eq!(conf.get_int("field3").unwrap(), 42);
    assert_eq!(replaced.get("nested").unwrap(), conf.get("nested").unwrap());
    assert_eq!(
        replaced.get_list("hashed_field1").unwrap(),
        conf.get_list("hashed_field1").unwrap()
    );
}

#[test]
fn replace_through_value() {
    let conf = Value::from(loaded_test_config());
    assert!(confclass::is_confclass(&conf));

    let replaced = confclass::replace(&conf, [("hashed_field1", Value::from(vec!["x"]))]).unwrap();
    let replaced = replaced.as_object().unwrap();
    assert_eq!(replaced.get_list("hashed_field1").unwrap(), &[Value::from("x")]);
}

#[test]
fn replace_nested_with_loaded_instance() {
    let conf = loaded_test_config();
    let mut nested = confclass::construct::<NestedConfig>().unwrap();
    confclass::load_str(&mut nested, "field1: swapped\n").unwrap();

    let replaced = conf.replace([("nested", nested)]).unwrap();
    assert_eq!(
        replaced.get_nested("nested").unwrap().get_str("field1").unwrap(),
        "swapped"
    );
}

#[test]
fn replace_rejects_non_confclass() {
    assert!(!confclass::is_confclass(&Value::Int(1)));

    let err = confclass::replace(&Value::Int(1), [("field3", 2)]).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(
        err.to_string()
            .contains("replace can only be used on confclasses, not integer"),
        "{err}"
    );
}

#[test]
fn replace_rejects_unknown_field() {
    let err = loaded_test_config().replace([("nope", 1)]).unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn replace_checks_types() {
    let conf = loaded_test_config();

    let err = conf.replace([("field3", "59")]).unwrap_err();
    assert_eq!(err.path(), Some("root.field3"));

    let unloaded = confclass::construct::<NestedConfig>().unwrap();
    let err = conf.replace([("nested", unloaded)]).unwrap_err();
    assert_eq!(err.path(), Some("root.nested"));

    let mut other = confclass::construct::<RepeatingConfig>().unwrap();
    confclass::load_str(&mut other, "test: x").unwrap();
    let err = conf.replace([("nested", other)]).unwrap_err();
    assert!(err.is_loading());
}

#[test]
fn replace_rejects_another_type_with_the_same_name() {
    let mut conf = confclass::construct::<Gateway>().unwrap();
    confclass::load_str(&mut conf, "listener: {port: 5}\n").unwrap();

    let mut foreign = confclass::construct::<credentials::Config>().unwrap();
    confclass::load_str(&mut foreign, "").unwrap();

    let err = conf.replace([("listener", foreign.clone())]).unwrap_err();
    assert!(err.is_loading());
    assert_eq!(err.path(), Some("root.listener"));
    assert!(
        err.to_string().contains("expected Config got Config"),
        "{err}"
    );

    let err = conf
        .replace([("fallbacks", Value::from(vec![foreign]))])
        .unwrap_err();
    assert_eq!(err.path(), Some("root.fallbacks"));

    assert_eq!(
        conf.get_nested("listener").unwrap().get_int("port").unwrap(),
        5
    );

    let mut own = confclass::construct::<listener::Config>().unwrap();
    confclass::load_str(&mut own, "port: 9\n").unwrap();
    let replaced = conf.replace([("listener", own)]).unwrap();
    assert_eq!(
        replaced.get_nested("listener").unwrap().get_int("port").unwrap(),
        9
    );
}

#[test]
fn replace_requires_loaded_instance() {
    let conf = confclass::construct::<TestConfig>().unwrap();
    let err = conf.replace([("field3", 1)]).unwrap_err();

    assert_eq!(err.exit_code(), 4);
}
