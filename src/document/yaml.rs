//! YAML boundary: parse text into document nodes and render nodes back to text

use crate::document::{Mapping, Node};
use crate::error::{ConfError, Result};
use serde_yaml::value::{Tag, TaggedValue};

/// Parse YAML text into a document node
///
/// Empty input yields [`Node::Null`], which loading treats as an empty mapping.
///
/// # Errors
///
/// Returns an error if:
/// - The text is not valid YAML
/// - A mapping key is not a scalar
/// - An integer does not fit in 64 bits
#[inline]
pub fn parse_str(text: &str) -> Result<Node> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
        // Extract line and column information from serde_yaml error
        if let Some(location) = e.location() {
            ConfError::loading(
                "root",
                format!(
                    "error parsing yaml at line {}, column {}: {e}",
                    location.line(),
                    location.column()
                ),
            )
        } else {
            ConfError::loading("root", format!("error parsing yaml: {e}"))
        }
    })?;

    from_yaml_value(value, "root")
}

/// Convert a `serde_yaml` value into a document node
///
/// # Errors
///
/// Returns an error if:
/// - A mapping key is a sequence or mapping
/// - An integer does not fit in 64 bits
#[inline]
pub fn from_yaml_value(value: serde_yaml::Value, path: &str) -> Result<Node> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Ok(Node::Null),
        Yaml::Bool(b) => Ok(Node::Bool(b)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Node::Int(i))
            } else if let (true, Some(f)) = (n.is_f64(), n.as_f64()) {
                Ok(Node::Float(f))
            } else {
                Err(ConfError::loading(path, format!("integer out of range: {n}")))
            }
        }
        Yaml::String(s) => Ok(Node::Str(s)),
        Yaml::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| from_yaml_value(item, &format!("{path}.{i}")))
            .collect::<Result<Vec<_>>>()
            .map(Node::Seq),
        Yaml::Mapping(entries) => {
            let mut map = Mapping::new();
            for (key, item) in entries {
                let key = key_to_string(key, path)?;
                let child = from_yaml_value(item, &format!("{path}.{key}"))?;
                map.insert(key, child);
            }
            Ok(Node::Map(map))
        }
        Yaml::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            Ok(Node::Tagged {
                tag: tag.to_string().trim_start_matches('!').to_owned(),
                value: Box::new(from_yaml_value(value, path)?),
            })
        }
    }
}

fn key_to_string(key: serde_yaml::Value, path: &str) -> Result<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Null => Ok("null".to_owned()),
        Yaml::Tagged(tagged) => key_to_string(tagged.value, path),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err(ConfError::loading(
            path,
            "mapping keys must be scalars",
        )),
    }
}

/// Convert a document node into a `serde_yaml` value
///
/// Comments are dropped; tags are kept.
#[must_use]
#[inline]
pub fn to_yaml_value(node: &Node) -> serde_yaml::Value {
    use serde_yaml::Value as Yaml;

    match *node {
        Node::Null => Yaml::Null,
        Node::Bool(b) => Yaml::Bool(b),
        Node::Int(i) => Yaml::Number(i.into()),
        Node::Float(f) => Yaml::Number(f.into()),
        Node::Str(ref s) => Yaml::String(s.clone()),
        Node::Tagged { ref tag, ref value } => {
            let name = tag.trim_start_matches('!');
            if name.is_empty() {
                to_yaml_value(value)
            } else {
                Yaml::Tagged(Box::new(TaggedValue {
                    tag: Tag::new(name),
                    value: to_yaml_value(value),
                }))
            }
        }
        Node::Seq(ref items) => Yaml::Sequence(items.iter().map(to_yaml_value).collect()),
        Node::Map(ref map) => Yaml::Mapping(
            map.iter()
                .map(|entry| (Yaml::String(entry.key.clone()), to_yaml_value(&entry.value)))
                .collect(),
        ),
    }
}

/// Render a document node as block-style YAML
///
/// Nested mappings are indented by two spaces, sequences are written at the
/// indentation of their key, and each comment block is written before its key.
#[must_use]
#[inline]
pub fn render(node: &Node) -> String {
    let mut out = String::new();
    match *node {
        Node::Map(ref map) if !map.is_empty() => write_mapping(&mut out, map, 0, false),
        Node::Seq(ref items) if !items.is_empty() => write_sequence(&mut out, items, 0),
        _ => {
            out.push_str(&inline_text(node));
            out.push('\n');
        }
    }
    out
}

fn pad(out: &mut String, indent: usize) {
    out.extend(core::iter::repeat_n(' ', indent));
}

fn write_comment(out: &mut String, comment: &str, indent: usize) {
    for line in comment.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push('\n');
        } else {
            pad(out, indent);
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// `inline_first` means the caller already wrote `- ` for the first key
fn write_mapping(out: &mut String, map: &Mapping, indent: usize, inline_first: bool) {
    for (i, entry) in map.iter().enumerate() {
        let continues_line = inline_first && i == 0;
        if let Some(comment) = entry.comment.as_deref() {
            if continues_line {
                out.push('\n');
            }
            write_comment(out, comment, indent);
            pad(out, indent);
        } else if !continues_line {
            pad(out, indent);
        }
        out.push_str(&scalar_text(&entry.key));
        out.push(':');
        write_value_after_key(out, &entry.value, indent);
    }
}

fn write_value_after_key(out: &mut String, value: &Node, indent: usize) {
    match *value {
        Node::Map(ref map) if !map.is_empty() => {
            out.push('\n');
            write_mapping(out, map, indent + 2, false);
        }
        Node::Seq(ref items) if !items.is_empty() => {
            out.push('\n');
            write_sequence(out, items, indent);
        }
        _ => {
            out.push(' ');
            out.push_str(&inline_text(value));
            out.push('\n');
        }
    }
}

fn write_sequence(out: &mut String, items: &[Node], indent: usize) {
    for item in items {
        pad(out, indent);
        out.push('-');
        match *item {
            Node::Map(ref map) if !map.is_empty() => {
                out.push(' ');
                write_mapping(out, map, indent + 2, true);
            }
            Node::Seq(ref nested) if !nested.is_empty() => {
                out.push('\n');
                write_sequence(out, nested, indent + 2);
            }
            _ => {
                out.push(' ');
                out.push_str(&inline_text(item));
                out.push('\n');
            }
        }
    }
}

/// Single-line text for scalars and empty collections
fn inline_text(node: &Node) -> String {
    match *node {
        Node::Null => "null".to_owned(),
        Node::Bool(b) => b.to_string(),
        Node::Int(i) => i.to_string(),
        Node::Float(f) => number_text(f),
        Node::Str(ref s) => scalar_text(s),
        Node::Tagged { ref tag, ref value } => {
            format!("!{} {}", tag.trim_start_matches('!'), inline_text(value))
        }
        Node::Seq(ref items) if items.is_empty() => "[]".to_owned(),
        Node::Map(ref map) if map.is_empty() => "{}".to_owned(),
        // Non-empty collections only reach here inside a tag
        Node::Seq(_) | Node::Map(_) => serde_json::to_string(&to_json_like(node))
            .unwrap_or_else(|_| "null".to_owned()),
    }
}

fn to_json_like(node: &Node) -> serde_json::Value {
    serde_json::to_value(to_yaml_value(node.untagged())).unwrap_or(serde_json::Value::Null)
}

fn number_text(f: f64) -> String {
    serde_yaml::to_string(&serde_yaml::Value::Number(f.into()))
        .map(|text| text.trim_end().to_owned())
        .unwrap_or_else(|_| f.to_string())
}

/// Quote a string only when plain YAML would read it back differently
fn scalar_text(s: &str) -> String {
    if s.contains('\n') {
        // Double-quoted JSON strings are valid YAML and stay on one line
        return serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"));
    }
    serde_yaml::to_string(&serde_yaml::Value::String(s.to_owned()))
        .map(|text| text.trim_end().to_owned())
        .unwrap_or_else(|_| format!("{s:?}"))
}
