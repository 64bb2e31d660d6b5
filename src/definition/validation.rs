//! Validation of schema definition files
//!
//! Structure is checked against the embedded JSON schema first, then names
//! and references are checked on the typed definition.

use crate::definition::SchemaDefinition;
use crate::error::{ConfError, Result};
use jsonschema::{Draft, Validator};
use regex::Regex;
use serde_json::Value;

/// Get the embedded JSON schema for schema definition files
///
/// # Errors
///
/// Returns an error if the embedded schema cannot be parsed or compiled.
#[inline]
pub fn get_schema() -> Result<Validator> {
    let schema_str = include_str!("definition.schema.json");
    let schema: Value = serde_json::from_str(schema_str).map_err(|e| {
        ConfError::setup(format!("Failed to parse embedded JSON schema: {e}"))
    })?;

    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|e| ConfError::setup(format!("Failed to compile JSON schema: {e}")))
}

/// Validate a raw definition document against the embedded schema
///
/// # Errors
///
/// Returns a setup error listing every violation found.
#[inline]
pub fn validate_against_schema(definition: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(definition)
        .map(|e| format!("  - {e}"))
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfError::setup(format!(
            "Schema definition validation failed:\n{}",
            error_messages.join("\n")
        )));
    }

    Ok(())
}

/// Validate names and the root reference of a parsed definition
///
/// # Errors
///
/// Returns a setup error if:
/// - A type, field, tag or shorthand name is not an identifier
/// - The root type is not defined
#[inline]
pub fn validate_definition(definition: &SchemaDefinition) -> Result<()> {
    if !definition.types.contains_key(&definition.root) {
        return Err(ConfError::setup(format!(
            "Root type '{}' is not defined",
            definition.root
        )));
    }

    for (type_name, ty) in &definition.types {
        validate_identifier("type", type_name)?;

        let names = ty
            .fields
            .iter()
            .map(|field| ("field", field.name.as_str()))
            .chain(ty.if_scalar.as_deref().map(|name| ("if_scalar field", name)))
            .chain(ty.tags.iter().map(|tag| ("tag", tag.name.as_str())));
        for (kind, name) in names {
            if !is_identifier(name)? {
                return Err(ConfError::setup(format!(
                    "Type '{type_name}': {}",
                    identifier_message(kind, name)
                )));
            }
        }
    }

    Ok(())
}

/// Validate that a name is a plain identifier
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty or contains characters other than letters, digits
///   and underscores, or starts with a digit
#[inline]
pub fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if is_identifier(name)? {
        return Ok(());
    }
    Err(ConfError::setup(identifier_message(kind, name)))
}

fn is_identifier(name: &str) -> Result<bool> {
    let regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map_err(|e| ConfError::setup(format!("Invalid identifier pattern: {e}")))?;
    Ok(regex.is_match(name))
}

fn identifier_message(kind: &str, name: &str) -> String {
    format!(
        "Invalid {kind} name: '{name}'\n\
        Names must start with a letter or underscore and contain only\n\
        letters, digits and underscores"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifiers() {
        assert!(validate_identifier("field", "port").is_ok());
        assert!(validate_identifier("field", "_private2").is_ok());
        assert!(validate_identifier("type", "AppConfig").is_ok());

        assert!(validate_identifier("field", "").is_err());
        assert!(validate_identifier("field", "2fast").is_err());
        assert!(validate_identifier("field", "with-dash").is_err());
        assert!(validate_identifier("field", "a.b").is_err());
    }

    #[test]
    fn embedded_schema_compiles() {
        assert!(get_schema().is_ok());
    }

    #[test]
    fn structure_violations_are_listed() {
        let raw = json!({
            "root": "App",
            "types": { "App": { "fields": [ { "name": "port" } ] } },
            "extra": true
        });
        let err = validate_against_schema(&raw).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Schema definition validation failed"));
        assert_eq!(message.matches("  - ").count(), 2);
    }
}
