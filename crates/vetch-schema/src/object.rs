//! # Object Parser
//!
//! Asserts that a value is a JSON object and applies one parser per declared
//! field. Validation is open:
//!
//! - the output starts as a shallow copy of the input, so undeclared fields
//!   pass through untouched;
//! - a declared field whose parser yields a value overwrites the input field;
//! - a declared field whose parser yields absent (optional, no default) is
//!   left exactly as the input had it: never added, never removed.
//!
//! The first field failure aborts the whole object.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use vetch_core::{ParseError, Shape};

use crate::parser::Parser;

/// The object specialization of a [`Parser`].
///
/// Built through [`Parser::object`]; reachable from a built parser with
/// [`Parser::as_object`].
#[derive(Debug, Clone, Default)]
pub struct ObjectParser {
    fields: BTreeMap<String, Parser>,
}

impl ObjectParser {
    pub(crate) fn new(fields: BTreeMap<String, Parser>) -> Self {
        Self { fields }
    }

    /// Declared fields and their parsers.
    pub fn fields(&self) -> &BTreeMap<String, Parser> {
        &self.fields
    }

    /// The parser declared for `name`, if any.
    pub fn field(&self, name: &str) -> Option<&Parser> {
        self.fields.get(name)
    }

    pub(crate) fn apply(&self, value: &Value) -> Result<Value, ParseError> {
        let input = value
            .as_object()
            .ok_or_else(|| ParseError::type_mismatch(Shape::Object, value))?;

        let mut output = input.clone();
        for (name, parser) in &self.fields {
            match parser.call(input.get(name)) {
                Ok(Some(parsed)) => {
                    output.insert(name.clone(), parsed);
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(field = %name, error = %err, "object field rejected");
                    return Err(err);
                }
            }
        }
        Ok(Value::Object(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserOptions;
    use serde_json::json;

    fn upper(value: &Value) -> Result<Value, ParseError> {
        value
            .as_str()
            .map(|s| json!(s.to_uppercase()))
            .ok_or_else(|| ParseError::type_mismatch(Shape::String, value))
    }

    fn object_of(fields: Vec<(&str, Parser)>) -> Parser {
        let fields = fields
            .into_iter()
            .map(|(name, parser)| (name.to_string(), parser))
            .collect();
        Parser::object(fields, ParserOptions::default()).unwrap()
    }

    fn leaf(options: ParserOptions) -> Parser {
        Parser::new(upper, options).unwrap()
    }

    #[test]
    fn undeclared_fields_pass_through() {
        let p = object_of(vec![("name", leaf(ParserOptions::default()))]);
        let out = p.call_value(&json!({"name": "ada", "age": 36})).unwrap();
        assert_eq!(out, Some(json!({"name": "ADA", "age": 36})));
    }

    #[test]
    fn optional_absent_field_is_not_added() {
        let p = object_of(vec![("name", leaf(ParserOptions::default()))]);
        let out = p.call_value(&json!({"age": 36})).unwrap();
        assert_eq!(out, Some(json!({"age": 36})));
    }

    #[test]
    fn optional_null_field_is_left_as_null() {
        let p = object_of(vec![("name", leaf(ParserOptions::default()))]);
        let out = p.call_value(&json!({"name": null})).unwrap();
        assert_eq!(out, Some(json!({"name": null})));
    }

    #[test]
    fn defaulted_field_is_filled_in() {
        let p = object_of(vec![("name", leaf(ParserOptions::default().with_default("anon")))]);
        assert_eq!(p.call_value(&json!({})).unwrap(), Some(json!({"name": "ANON"})));
    }

    #[test]
    fn required_field_missing_fails() {
        let p = object_of(vec![("name", leaf(ParserOptions::required()))]);
        assert!(matches!(
            p.call_value(&json!({"other": 1})),
            Err(ParseError::MissingRequiredValue)
        ));
    }

    #[test]
    fn rejects_non_objects() {
        let p = object_of(vec![("name", leaf(ParserOptions::default()))]);
        for input in [json!([1, 2]), json!("x"), json!(0)] {
            assert!(matches!(
                p.call_value(&input),
                Err(ParseError::TypeMismatch {
                    expected: Shape::Object,
                    ..
                })
            ));
        }
        // Null is absent, not a mismatch.
        assert_eq!(p.call_value(&Value::Null).unwrap(), None);
    }

    #[test]
    fn field_failure_aborts_whole_object() {
        let p = object_of(vec![
            ("a", leaf(ParserOptions::default())),
            ("b", leaf(ParserOptions::default())),
        ]);
        let err = p.call_value(&json!({"a": "ok", "b": 7})).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch {
                expected: Shape::String,
                found: Shape::Number
            }
        ));
    }

    #[test]
    fn input_is_not_mutated() {
        let p = object_of(vec![("name", leaf(ParserOptions::default()))]);
        let input = json!({"name": "ada"});
        let _ = p.call_value(&input).unwrap();
        assert_eq!(input, json!({"name": "ada"}));
    }

    #[test]
    fn exposes_field_parsers() {
        let p = object_of(vec![("name", leaf(ParserOptions::required()))]);
        let object = p.as_object().expect("object parser");
        assert_eq!(object.fields().len(), 1);
        assert!(object.field("name").is_some_and(Parser::is_required));
        assert!(object.field("age").is_none());
    }
}
