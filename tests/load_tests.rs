//! Materialization tests: defaults, nesting, strict types and shorthand

#![expect(clippy::unwrap_used, reason = "test code")]

mod common;

use common::{
    Cluster, Endpoint, Gateway, RepeatingConfig, ShorthandConfig, ShorthandParent, TestConfig,
    credentials, listener,
};
use confclass::{
    ConfError, Confclass, FieldSpec, Instance, Mapping, Node, SchemaBuilder, Value, build_schema,
};

#[test]
fn end_to_end_scenario() {
    let mut conf = confclass::construct::<TestConfig>().unwrap();

    confclass::load_str(
        &mut conf,
        "field3: 59\nnested:\n  field1: \"test\"\n",
    )
    .unwrap();

    assert_eq!(conf.get_int("field3").unwrap(), 59);
    let nested = conf.get_nested("nested").unwrap();
    assert_eq!(nested.get_str("field1").unwrap(), "test");
    assert_eq!(nested.get_str("field2").unwrap(), "bar");
    assert_eq!(
        conf.get_list("hashed_field1").unwrap(),
        &[Value::from("test"), Value::from("items")]
    );
}

#[test]
fn defaults_fill_an_empty_document() {
    let mut conf = confclass::construct::<TestConfig>().unwrap();
    confclass::load_str(&mut conf, "").unwrap();

    assert_eq!(conf.get_int("field3").unwrap(), 42);
    assert_eq!(
        conf.get_nested("nested").unwrap().get_str("field1").unwrap(),
        "foo"
    );
    assert_eq!(
        conf.get("hashed_field2").unwrap().get_key("key1"),
        Some(&Value::from("value1"))
    );
}

#[test]
fn nested_prototype_defaults() {
    let mut conf = confclass::construct::<TestConfig>().unwrap();
    confclass::load_str(&mut conf, "").unwrap();

    let base = conf.get_nested("hashed_field4").unwrap();
    assert_eq!(base.get_str("test").unwrap(), "base");
    assert_eq!(base.get_int("default1").unwrap(), 123);

    let inner = conf
        .get_nested("nested")
        .unwrap()
        .get_nested("hashed_field3")
        .unwrap();
    assert_eq!(inner.get_str("test").unwrap(), "nested");
}

#[test]
fn document_overrides_part_of_a_prototype() {
    let mut conf = confclass::construct::<TestConfig>().unwrap();
    confclass::load_str(&mut conf, "hashed_field4:\n  default1: 7\n").unwrap();

    let base = conf.get_nested("hashed_field4").unwrap();
    assert_eq!(base.get_str("test").unwrap(), "base");
    assert_eq!(base.get_int("default1").unwrap(), 7);
}

#[test]
fn mutable_defaults_are_not_shared() {
    let mut conf1 = confclass::construct::<TestConfig>().unwrap();
    let mut conf2 = confclass::construct::<TestConfig>().unwrap();
    confclass::load_str(&mut conf1, "").unwrap();
    confclass::load_str(&mut conf2, "").unwrap();

    assert_eq!(conf1.get_list("hashed_field1").unwrap().len(), 2);
    conf1
        .get_list_mut("hashed_field1")
        .unwrap()
        .push(Value::from("new"));
    assert_eq!(conf1.get_list("hashed_field1").unwrap().len(), 3);
    assert_eq!(conf2.get_list("hashed_field1").unwrap().len(), 2);

    *conf1
        .get_mut("hashed_field4")
        .unwrap()
        .as_object_mut()
        .unwrap()
        .get_mut("test")
        .unwrap() = Value::from("changed");
    assert_eq!(
        conf2.get_nested("hashed_field4").unwrap().get_str("test").unwrap(),
        "base"
    );

    let mut conf3 = confclass::construct::<TestConfig>().unwrap();
    confclass::load_str(&mut conf3, "").unwrap();
    assert_eq!(conf3.get_list("hashed_field1").unwrap().len(), 2);
    assert_eq!(
        conf3.get_nested("hashed_field4").unwrap().get_str("test").unwrap(),
        "base"
    );
}

#[test]
fn wrong_scalar_type_names_the_path() {
    let mut conf = confclass::construct::<TestConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "field3: \"59\"\n").unwrap_err();

    assert!(err.is_loading());
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.path(), Some("root.field3"));
    assert!(err.to_string().contains("expected Integer got string"), "{err}");
}

#[test]
fn no_numeric_coercion() {
    let mut conf = confclass::construct::<RepeatingConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "test: x\ndefault1: 1.5\n").unwrap_err();
    assert_eq!(err.path(), Some("root.default1"));

    let mut conf = confclass::construct::<RepeatingConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "test: 5\n").unwrap_err();
    assert_eq!(err.path(), Some("root.test"));
}

#[test]
fn wrong_list_element_names_the_index() {
    let mut cluster = confclass::construct::<Cluster>().unwrap();
    let err = confclass::load_str(
        &mut cluster,
        "name: c\nprimary: {test: p}\nports: [80, \"443\"]\n",
    )
    .unwrap_err();

    assert_eq!(err.path(), Some("root.ports.1"));
}

#[test]
fn list_field_must_be_a_sequence() {
    let mut cluster = confclass::construct::<Cluster>().unwrap();
    let err = confclass::load_str(
        &mut cluster,
        "name: c\nprimary: {test: p}\nendpoints: db.local\n",
    )
    .unwrap_err();

    assert_eq!(err.path(), Some("root.endpoints"));
    assert!(err.to_string().contains("expected sequence"), "{err}");
}

#[test]
fn list_of_confclasses() {
    let mut cluster = confclass::construct::<Cluster>().unwrap();
    confclass::load_str(
        &mut cluster,
        "\
name: c
primary:
  test: p
endpoints:
  - db.local
  - host: cache.local
    secure: true
",
    )
    .unwrap();

    let endpoints = cluster.get_list("endpoints").unwrap();
    assert_eq!(endpoints.len(), 2);
    let first = endpoints[0].as_object().unwrap();
    assert_eq!(first.get_str("host").unwrap(), "db.local");
    assert!(!first.get_bool("secure").unwrap());
    let second = endpoints[1].as_object().unwrap();
    assert_eq!(second.get_str("host").unwrap(), "cache.local");
    assert!(second.get_bool("secure").unwrap());

    assert_eq!(cluster.get_list("ports").unwrap(), &[Value::Int(80)]);
}

#[test]
fn absent_confclass_list_is_empty() {
    let mut cluster = confclass::construct::<Cluster>().unwrap();
    confclass::load_str(&mut cluster, "name: c\nprimary: {test: p}\n").unwrap();

    assert!(cluster.get_list("endpoints").unwrap().is_empty());
}

#[test]
fn missing_required_field() {
    let mut conf = confclass::construct::<RepeatingConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "").unwrap_err();

    assert_eq!(err, ConfError::missing(vec!["root.test".to_owned()]));
    assert!(err.is_loading());
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn missing_fields_are_reported_together() {
    let mut cluster = confclass::construct::<Cluster>().unwrap();
    let err = confclass::load_str(&mut cluster, "endpoints: [db.local]\n").unwrap_err();

    let ConfError::MissingValue { ref paths } = err else {
        panic!("expected missing values, got {err}");
    };
    assert_eq!(paths, &["root.name", "root.primary.test"]);
    assert!(err.to_string().contains("root.name, root.primary.test"));
}

#[test]
fn failed_load_leaves_instance_untouched() {
    let mut conf = confclass::construct::<RepeatingConfig>().unwrap();
    confclass::load_str(&mut conf, "default1: 1\n").unwrap_err();
    assert!(!conf.is_loaded());

    confclass::load_str(&mut conf, "test: first\n").unwrap();
    confclass::load_str(&mut conf, "test: 1\n").unwrap_err();
    assert!(conf.is_loaded());
    assert_eq!(conf.get_str("test").unwrap(), "first");
}

#[test]
fn captured_arguments_sit_between_document_and_defaults() {
    let mut conf =
        confclass::construct_with::<RepeatingConfig, _, _, _>([("test", "captured")]).unwrap();
    assert_eq!(conf.captured_arg("test"), Some(&Value::from("captured")));

    let mut again = conf.clone();
    confclass::load_str(&mut conf, "").unwrap();
    assert_eq!(conf.get_str("test").unwrap(), "captured");
    assert_eq!(conf.get_int("default1").unwrap(), 123);

    confclass::load_str(&mut again, "test: document\n").unwrap();
    assert_eq!(again.get_str("test").unwrap(), "document");
}

#[test]
fn captured_arguments_are_checked() {
    let err = confclass::construct_with::<RepeatingConfig, _, _, _>([("nope", 1)]).unwrap_err();
    assert_eq!(err.exit_code(), 1);

    let err = confclass::construct_with::<RepeatingConfig, _, _, _>([("test", 1)]).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("expects String"), "{err}");
}

#[test]
fn captured_instance_must_be_the_declared_type() {
    let foreign = confclass::construct::<credentials::Config>().unwrap();
    let err = confclass::construct_with::<Gateway, _, _, _>([("listener", foreign)]).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(
        err.to_string()
            .contains("argument 'listener' of Gateway expects Config, got Config"),
        "{err}"
    );

    let foreign = confclass::construct::<credentials::Config>().unwrap();
    let err =
        confclass::construct_with::<Gateway, _, _, _>([("fallbacks", vec![foreign])]).unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn captured_instance_of_the_declared_type_is_loaded() {
    let own = confclass::construct_with::<listener::Config, _, _, _>([("port", 8443)]).unwrap();
    let mut conf = confclass::construct_with::<Gateway, _, _, _>([("listener", own)]).unwrap();
    confclass::load_str(&mut conf, "").unwrap();
    assert_eq!(
        conf.get_nested("listener").unwrap().get_int("port").unwrap(),
        8443
    );

    confclass::load_str(&mut conf, "listener: {port: 5}\n").unwrap();
    assert_eq!(
        conf.get_nested("listener").unwrap().get_int("port").unwrap(),
        5
    );
}

fn foreign_instance() -> Value {
    Value::Object(Instance::new(
        build_schema::<credentials::Config>().unwrap(),
    ))
}

struct FactoryOfAnotherType;

impl Confclass for FactoryOfAnotherType {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema.field(
            FieldSpec::nested::<listener::Config, _>("listener").default_with(foreign_instance),
        )
    }
}

struct ListFactoryOfAnotherType;

impl Confclass for ListFactoryOfAnotherType {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema.field(
            FieldSpec::list_of::<listener::Config, _>("fallbacks")
                .default_with(|| Value::List(vec![foreign_instance()])),
        )
    }
}

#[test]
fn factory_default_of_another_type_fails_to_load() {
    let mut conf = confclass::construct::<FactoryOfAnotherType>().unwrap();
    let err = confclass::load_str(&mut conf, "").unwrap_err();

    assert!(err.is_loading());
    assert_eq!(err.path(), Some("root.listener"));
    assert!(
        err.to_string()
            .contains("invalid default, expected Config got Config"),
        "{err}"
    );
    assert!(!conf.is_loaded());

    let mut conf = confclass::construct::<ListFactoryOfAnotherType>().unwrap();
    let err = confclass::load_str(&mut conf, "").unwrap_err();
    assert_eq!(err.path(), Some("root.fallbacks.0"));

    confclass::load_str(&mut conf, "fallbacks: [{port: 1}]\n").unwrap();
    let fallbacks = conf.get_list("fallbacks").unwrap();
    assert_eq!(fallbacks[0].as_object().unwrap().get_int("port").unwrap(), 1);
}

#[test]
fn scalar_shorthand() {
    let mut conf = confclass::construct::<ShorthandConfig>().unwrap();
    confclass::load_str(&mut conf, "value").unwrap();

    assert_eq!(conf.get_str("test").unwrap(), "value");
    assert_eq!(conf.get_int("other").unwrap(), 42);
}

#[test]
fn parent_default_feeds_shorthand_child() {
    let mut parent = confclass::construct::<ShorthandParent>().unwrap();
    confclass::load_str(&mut parent, "").unwrap();

    let child = parent.get_nested("child").unwrap();
    assert_eq!(child.get_str("test").unwrap(), "testing");
    assert_eq!(child.get_int("other").unwrap(), 42);

    let mut explicit = confclass::construct::<ShorthandParent>().unwrap();
    confclass::load_str(&mut explicit, "child: {test: given, other: 1}\n").unwrap();
    let child = explicit.get_nested("child").unwrap();
    assert_eq!(child.get_str("test").unwrap(), "given");
    assert_eq!(child.get_int("other").unwrap(), 1);
}

#[test]
fn shorthand_value_is_type_checked() {
    let mut conf = confclass::construct::<ShorthandConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "12").unwrap_err();
    assert_eq!(err.path(), Some("root.test"));
}

#[test]
fn scalar_without_shorthand_is_rejected() {
    let mut conf = confclass::construct::<RepeatingConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "hello").unwrap_err();

    assert_eq!(err.path(), Some("root"));
    assert!(
        err.to_string().contains("if_scalar not set in RepeatingConfig"),
        "{err}"
    );
}

#[test]
fn sequence_root_is_rejected() {
    let mut conf = confclass::construct::<TestConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "- a\n- b\n").unwrap_err();

    assert!(err.is_loading());
    assert_eq!(err.path(), Some("root"));
}

#[test]
fn null_nested_value_is_rejected() {
    let mut conf = confclass::construct::<TestConfig>().unwrap();
    let err = confclass::load_str(&mut conf, "nested:\n").unwrap_err();

    assert_eq!(err.path(), Some("root.nested"));
}

#[test]
fn unknown_keys_are_ignored() {
    let mut conf = confclass::construct::<RepeatingConfig>().unwrap();
    confclass::load_str(&mut conf, "test: x\nunknown: 1\nextra: {a: b}\n").unwrap();

    assert_eq!(conf.get_str("test").unwrap(), "x");
    assert!(conf.get("unknown").is_err());
}

#[test]
fn flag_tag_sets_bool_target() {
    let mut endpoint = confclass::construct::<Endpoint>().unwrap();
    confclass::load_str(&mut endpoint, "!tls db.local").unwrap();

    assert_eq!(endpoint.get_str("host").unwrap(), "db.local");
    assert!(endpoint.get_bool("secure").unwrap());
    assert_eq!(endpoint.get_str("scheme").unwrap(), "http");
}

#[test]
fn value_tag_sets_string_target() {
    let mut endpoint = confclass::construct::<Endpoint>().unwrap();
    confclass::load_str(&mut endpoint, "!https web.local").unwrap();

    assert_eq!(endpoint.get_str("scheme").unwrap(), "https");
    assert!(!endpoint.get_bool("secure").unwrap());
}

#[test]
fn unknown_tag_is_ignored() {
    let mut endpoint = confclass::construct::<Endpoint>().unwrap();
    confclass::load_str(&mut endpoint, "!plain db.local").unwrap();

    assert_eq!(endpoint.get_str("host").unwrap(), "db.local");
    assert!(!endpoint.get_bool("secure").unwrap());
}

#[test]
fn tags_inside_lists() {
    let mut cluster = confclass::construct::<Cluster>().unwrap();
    confclass::load_str(
        &mut cluster,
        "name: c\nprimary: {test: p}\nendpoints:\n  - !tls a.local\n  - b.local\n",
    )
    .unwrap();

    let endpoints = cluster.get_list("endpoints").unwrap();
    assert!(endpoints[0].as_object().unwrap().get_bool("secure").unwrap());
    assert!(!endpoints[1].as_object().unwrap().get_bool("secure").unwrap());
}

#[test]
fn load_accepts_prebuilt_nodes() {
    let mut conf = confclass::construct::<RepeatingConfig>().unwrap();
    let map: Mapping = [("test", Node::from("built"))].into_iter().collect();
    confclass::load(&mut conf, &Node::from(map)).unwrap();

    assert_eq!(conf.get_str("test").unwrap(), "built");
}
