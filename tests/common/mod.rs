//! Configuration types shared by the integration tests

#![allow(dead_code, reason = "each test crate uses a subset of the fixtures")]

use confclass::{Confclass, FieldSpec, SchemaBuilder, Value};

pub struct RepeatingConfig;

impl Confclass for RepeatingConfig {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .field(FieldSpec::string("test"))
            .field(FieldSpec::integer("default1").default(123))
    }
}

pub struct NestedConfig;

impl Confclass for NestedConfig {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .field(FieldSpec::string("field1").default("foo"))
            .field(
                FieldSpec::string("field2")
                    .default("bar")
                    .doc("test document for field 2"),
            )
            .field(FieldSpec::nested_default::<RepeatingConfig, _, _, _, _>(
                "hashed_field3",
                [("test", "nested")],
            ))
    }
}

pub struct TestConfig;

impl Confclass for TestConfig {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .field(FieldSpec::nested::<NestedConfig, _>("nested"))
            .field(
                FieldSpec::integer("field3")
                    .default(42)
                    .doc("test document for field 3"),
            )
            .field(FieldSpec::any_list("hashed_field1").default(vec!["test", "items"]))
            .field(
                FieldSpec::mapping("hashed_field2")
                    .default([("key1", "value1")].into_iter().collect::<Value>()),
            )
            .field(FieldSpec::nested_default::<RepeatingConfig, _, _, _, _>(
                "hashed_field4",
                [("test", "base")],
            ))
    }
}

pub struct SmallExample;

impl Confclass for SmallExample {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema.field(FieldSpec::string("foo").default("test"))
    }
}

/// Scalar shorthand: `"value"` loads as `{test: value}`
pub struct ShorthandConfig;

impl Confclass for ShorthandConfig {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .field(FieldSpec::string("test"))
            .field(FieldSpec::integer("other").default(42))
            .if_scalar("test")
    }
}

pub struct ShorthandParent;

impl Confclass for ShorthandParent {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema.field(FieldSpec::nested::<ShorthandConfig, _>("child").default("testing"))
    }
}

/// Shorthand type whose tags select fields: `!tls host` and `!https host`
pub struct Endpoint;

impl Confclass for Endpoint {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .field(FieldSpec::string("host"))
            .field(FieldSpec::bool("secure").default(false))
            .field(FieldSpec::string("scheme").default("http"))
            .if_scalar("host")
            .tag("tls", Some("secure"), true)
            .tag("https", Some("scheme"), false)
    }
}

pub struct Cluster;

impl Confclass for Cluster {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .field(FieldSpec::string("name"))
            .field(FieldSpec::list("ports", confclass::ScalarKind::Integer).default(vec![80_i64]))
            .field(FieldSpec::list_of::<Endpoint, _>("endpoints"))
            .field(FieldSpec::nested::<RepeatingConfig, _>("primary"))
    }
}

/// Two unrelated types that share the short name `Config`
pub mod listener {
    use confclass::{Confclass, FieldSpec, SchemaBuilder};

    pub struct Config;

    impl Confclass for Config {
        fn describe(schema: SchemaBuilder) -> SchemaBuilder {
            schema.field(FieldSpec::integer("port").default(80))
        }
    }
}

pub mod credentials {
    use confclass::{Confclass, FieldSpec, SchemaBuilder};

    pub struct Config;

    impl Confclass for Config {
        fn describe(schema: SchemaBuilder) -> SchemaBuilder {
            schema.field(FieldSpec::string("secret").default("hunter2"))
        }
    }
}

pub struct Gateway;

impl Confclass for Gateway {
    fn describe(schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .field(FieldSpec::nested::<listener::Config, _>("listener"))
            .field(
                FieldSpec::list_of::<listener::Config, _>("fallbacks")
                    .default(Vec::<Value>::new()),
            )
    }
}
