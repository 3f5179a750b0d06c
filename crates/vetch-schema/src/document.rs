//! # Schema Documents
//!
//! A schema document is the JSON or YAML form of a [`Schema`] descriptor.
//! Functions cannot be written down, so leaves are names looked up in a
//! [`LeafRegistry`]:
//!
//! | Document                                   | Descriptor                        |
//! |--------------------------------------------|-----------------------------------|
//! | `"hex"`                                    | leaf `hex`, default options       |
//! | `"hex!"`                                   | leaf `hex`, required              |
//! | `{"$leaf": "amount18", "default": "0"}`    | leaf with inline [`ParserOptions`]|
//! | `[element]`                                | array schema                      |
//! | `{"field": document, ...}`                 | object schema                     |
//!
//! Numbers, booleans, null, and array literals with zero or several
//! elements are rejected with `UnsupportedSchemaType`.
//!
//! Leaves with inline options are built into parsers while the document is
//! resolved, so their defaults are computed once, and [`compile`] reuses
//! them through its identity short-circuit.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use vetch_core::{leaf, ParseError, SchemaError, Shape};

use crate::compile::{compile, escape_pointer, Schema};
use crate::parser::{Parser, ParserOptions, Transform};

/// Object key marking a leaf with inline options.
pub const LEAF_KEY: &str = "$leaf";

/// Suffix marking a leaf name as required.
pub const REQUIRED_SUFFIX: char = '!';

/// Named leaf transforms available to schema documents.
#[derive(Clone, Default)]
pub struct LeafRegistry {
    leaves: BTreeMap<String, Transform>,
}

impl LeafRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the stock leaves of [`vetch_core::leaf`]:
    /// `string`, `boolean`, `integer`, `hex`, `digest` (32-byte hex),
    /// `address` (20-byte hex), `amount` (no decimals), `amount2`,
    /// `amount6`, `amount8`, and `amount18`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register("string", leaf::string)
            .register("boolean", leaf::boolean)
            .register("integer", leaf::integer)
            .register("hex", leaf::hex)
            .register("digest", leaf::fixed_hex(32))
            .register("address", leaf::fixed_hex(20))
            .register("amount", leaf::amount(0));
        for decimals in [2u32, 6, 8, 18] {
            registry.register(format!("amount{decimals}"), leaf::amount(decimals));
        }
        registry
    }

    /// Register (or replace) a leaf under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, transform: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync + 'static,
    {
        self.leaves.insert(name.into(), Arc::new(transform));
        self
    }

    /// Look up a leaf by name.
    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.leaves.get(name)
    }

    /// Registered leaf names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.leaves.keys().map(String::as_str).collect()
    }

    /// Convert a schema document into a [`Schema`] descriptor.
    ///
    /// # Errors
    ///
    /// `UnknownLeaf` for an unregistered name, `InvalidOptions` for malformed
    /// inline options, `UnsupportedSchemaType` for a document node that
    /// describes no schema, and `DefaultRejected` for an inline default the
    /// leaf rejects. All carry the JSON Pointer of the offending node.
    pub fn resolve(&self, document: &Value) -> Result<Schema, SchemaError> {
        self.resolve_at(document, "")
    }

    /// Resolve and compile a schema document in one step.
    pub fn compile_document(&self, document: &Value, options: ParserOptions) -> Result<Parser, SchemaError> {
        let schema = self.resolve(document)?;
        compile(schema, options)
    }

    fn resolve_at(&self, node: &Value, path: &str) -> Result<Schema, SchemaError> {
        match node {
            Value::String(spec) => {
                let (name, required) = match spec.strip_suffix(REQUIRED_SUFFIX) {
                    Some(name) => (name, true),
                    None => (spec.as_str(), false),
                };
                let transform = self.lookup(name, path)?;
                if required {
                    let parser = Parser::from_transform(transform, ParserOptions::required())
                        .map_err(|err| at_path(err, path))?;
                    Ok(Schema::Parser(parser))
                } else {
                    Ok(Schema::Transform(transform))
                }
            }
            Value::Object(map) => match map.get(LEAF_KEY) {
                Some(name) => self.resolve_leaf_with_options(name, map, path),
                None => {
                    let mut fields = BTreeMap::new();
                    for (name, child) in map {
                        let child_path = format!("{path}/{}", escape_pointer(name));
                        fields.insert(name.clone(), self.resolve_at(child, &child_path)?);
                    }
                    Ok(Schema::Object(fields))
                }
            },
            Value::Array(items) => {
                if items.len() != 1 {
                    return Err(SchemaError::UnsupportedSchemaType {
                        shape: format!("array literal with {} elements", items.len()),
                        path: path.to_string(),
                    });
                }
                let element = self.resolve_at(&items[0], &format!("{path}/0"))?;
                Ok(Schema::Array(vec![element]))
            }
            other => Err(SchemaError::UnsupportedSchemaType {
                shape: Shape::of(other).to_string(),
                path: path.to_string(),
            }),
        }
    }

    fn resolve_leaf_with_options(
        &self,
        name: &Value,
        map: &serde_json::Map<String, Value>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        let name = name.as_str().ok_or_else(|| SchemaError::InvalidOptions {
            path: path.to_string(),
            reason: format!("{LEAF_KEY} must be a string, found {}", Shape::of(name)),
        })?;
        let transform = self.lookup(name, path)?;

        let rest: serde_json::Map<String, Value> = map
            .iter()
            .filter(|(k, _)| k.as_str() != LEAF_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let options: ParserOptions =
            serde_json::from_value(Value::Object(rest)).map_err(|e| SchemaError::InvalidOptions {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let parser = Parser::from_transform(transform, options).map_err(|err| at_path(err, path))?;
        Ok(Schema::Parser(parser))
    }

    fn lookup(&self, name: &str, path: &str) -> Result<Transform, SchemaError> {
        self.leaves.get(name).cloned().ok_or_else(|| {
            debug!(name, path, "unknown leaf in schema document");
            SchemaError::UnknownLeaf {
                name: name.to_string(),
                path: path.to_string(),
            }
        })
    }
}

impl std::fmt::Debug for LeafRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafRegistry")
            .field("leaves", &self.names())
            .finish()
    }
}

fn at_path(err: SchemaError, path: &str) -> SchemaError {
    match err {
        SchemaError::DefaultRejected { source, .. } => SchemaError::DefaultRejected {
            path: path.to_string(),
            source,
        },
        other => other,
    }
}

/// Load a schema document (or any JSON/YAML value) from a file.
///
/// The format follows the extension: `.yaml`/`.yml` for YAML, anything else
/// for JSON.
///
/// # Errors
///
/// Returns `SchemaError::DocumentLoad` if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_error = |reason: String| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_error(format!("cannot read file: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml).map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Documents use only the JSON-compatible subset of YAML: tags are dropped
/// and scalar map keys are stringified.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => yaml_number(n)?,
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => Value::Array(
            seq.iter()
                .map(yaml_to_json_value)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok::<_, String>((yaml_key(k)?, yaml_to_json_value(v)?)))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("YAML number {n} has no JSON form"))
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String, String> {
    match yaml_to_json_value(key)? {
        Value::String(s) => Ok(s),
        scalar @ (Value::Number(_) | Value::Bool(_)) => Ok(scalar.to_string()),
        other => Err(format!(
            "map keys must be strings, numbers or booleans, found {}",
            Shape::of(&other)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standard_registry_lists_stock_leaves() {
        let registry = LeafRegistry::standard();
        let names = registry.names();
        for name in ["string", "boolean", "integer", "hex", "digest", "address", "amount", "amount18"] {
            assert!(names.contains(&name), "missing {name}");
        }
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn string_leaf_and_required_suffix() {
        let registry = LeafRegistry::standard();
        let optional = registry.compile_document(&json!("hex"), ParserOptions::default()).unwrap();
        assert!(!optional.is_required());
        assert_eq!(optional.call(None).unwrap(), None);

        let required = registry.compile_document(&json!("hex!"), ParserOptions::default()).unwrap();
        assert!(required.is_required());
        assert!(matches!(required.call(None), Err(ParseError::MissingRequiredValue)));
    }

    #[test]
    fn root_options_apply_to_plain_leaf() {
        let registry = LeafRegistry::standard();
        let p = registry
            .compile_document(&json!("hex"), ParserOptions::default().with_default("0xAB"))
            .unwrap();
        assert_eq!(p.call(None).unwrap(), Some(json!("0xab")));
    }

    #[test]
    fn inline_options_build_a_parser() {
        let registry = LeafRegistry::standard();
        let doc = json!({"fee": {"$leaf": "amount2", "default": "1.5"}});
        let p = registry.compile_document(&doc, ParserOptions::default()).unwrap();
        assert_eq!(p.call_value(&json!({})).unwrap(), Some(json!({"fee": "150"})));
        assert_eq!(
            p.call_value(&json!({"fee": "0.01", "memo": "x"})).unwrap(),
            Some(json!({"fee": "1", "memo": "x"}))
        );
    }

    #[test]
    fn unknown_leaf_is_reported_with_path() {
        let registry = LeafRegistry::standard();
        let err = registry.resolve(&json!({"owner": ["hexx"]})).unwrap_err();
        match err {
            SchemaError::UnknownLeaf { name, path } => {
                assert_eq!(name, "hexx");
                assert_eq!(path, "/owner/0");
            }
            other => panic!("expected UnknownLeaf, got {other}"),
        }
    }

    #[test]
    fn scalar_descriptors_are_unsupported() {
        let registry = LeafRegistry::standard();
        for (doc, shape) in [(json!(1), "number"), (json!(true), "boolean"), (json!(null), "null")] {
            match registry.resolve(&json!({ "a": doc })).unwrap_err() {
                SchemaError::UnsupportedSchemaType { shape: found, path } => {
                    assert_eq!(found, shape);
                    assert_eq!(path, "/a");
                }
                other => panic!("expected UnsupportedSchemaType, got {other}"),
            }
        }
        assert!(matches!(
            registry.resolve(&json!(["hex", "hex"])),
            Err(SchemaError::UnsupportedSchemaType { .. })
        ));
    }

    #[test]
    fn malformed_inline_options_are_rejected() {
        let registry = LeafRegistry::standard();
        let err = registry
            .resolve(&json!({"a": {"$leaf": "hex", "requried": true}}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOptions { ref path, .. } if path == "/a"));

        let err = registry.resolve(&json!({"$leaf": 3})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidOptions { .. }));
    }

    #[test]
    fn rejected_inline_default_reports_its_path() {
        let registry = LeafRegistry::standard();
        let err = registry
            .resolve(&json!({"id": {"$leaf": "digest", "default": "0x01"}}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DefaultRejected { ref path, .. } if path == "/id"));
    }

    #[test]
    fn custom_leaves_can_be_registered() {
        let mut registry = LeafRegistry::new();
        registry.register("trim", |v: &Value| {
            v.as_str()
                .map(|s| json!(s.trim()))
                .ok_or_else(|| ParseError::leaf("expected a string"))
        });
        let p = registry.compile_document(&json!(["trim"]), ParserOptions::default()).unwrap();
        assert_eq!(p.call_value(&json!([" a ", "b "])).unwrap(), Some(json!(["a", "b"])));
    }

    #[test]
    fn yaml_to_json_conversion() {
        let yaml_str = r#"
owner: hex!
count: 42
enabled: true
1: numeric-key
items:
  - one
  - two
"#;
        let yaml: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json = yaml_to_json_value(&yaml).unwrap();
        assert_eq!(json["owner"], "hex!");
        assert_eq!(json["count"], 42);
        assert_eq!(json["enabled"], true);
        assert_eq!(json["1"], "numeric-key");
        assert_eq!(json["items"][1], "two");
    }

    #[test]
    fn yaml_tags_are_dropped() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            r#"
value: !wei 5
fees: !list [digest, hex]
!key tagged: yes
"#,
        )
        .unwrap();
        assert_eq!(
            yaml_to_json_value(&yaml).unwrap(),
            json!({"value": 5, "fees": ["digest", "hex"], "tagged": "yes"})
        );
    }

    #[test]
    fn yaml_without_json_form_is_rejected() {
        let nan: serde_yaml::Value = serde_yaml::from_str("rate: .nan").unwrap();
        assert!(yaml_to_json_value(&nan).unwrap_err().contains("no JSON form"));

        let seq_key: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: 1\n").unwrap();
        assert!(yaml_to_json_value(&seq_key).unwrap_err().contains("found array"));
    }
}
