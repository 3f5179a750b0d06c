//! # Array Parser
//!
//! Asserts that a value is a JSON array and maps one element parser over
//! every entry, preserving order and length. The first element failure
//! aborts the whole array: there is no partial result.

use serde_json::Value;
use tracing::debug;

use vetch_core::{ParseError, Shape};

use crate::parser::Parser;

/// The array specialization of a [`Parser`].
///
/// Built through [`Parser::array`]; reachable from a built parser with
/// [`Parser::as_array`].
#[derive(Debug, Clone)]
pub struct ArrayParser {
    element: Parser,
}

impl ArrayParser {
    pub(crate) fn new(element: Parser) -> Self {
        Self { element }
    }

    /// The parser applied to every element.
    pub fn element(&self) -> &Parser {
        &self.element
    }

    /// An element that parses to absent (optional, no default) is kept as
    /// JSON `null` so that indices line up with the input.
    pub(crate) fn apply(&self, value: &Value) -> Result<Value, ParseError> {
        let items = value
            .as_array()
            .ok_or_else(|| ParseError::type_mismatch(Shape::Array, value))?;

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.element.call_value(item) {
                Ok(parsed) => out.push(parsed.unwrap_or(Value::Null)),
                Err(err) => {
                    debug!(index, error = %err, "array element rejected");
                    return Err(err);
                }
            }
        }
        Ok(Value::Array(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserOptions;
    use serde_json::json;

    fn increment(value: &Value) -> Result<Value, ParseError> {
        value
            .as_i64()
            .map(|n| json!(n + 1))
            .ok_or_else(|| ParseError::leaf(format!("not an integer: {value}")))
    }

    fn array_of_increments() -> Parser {
        let element = Parser::new(increment, ParserOptions::default()).unwrap();
        Parser::array(element, ParserOptions::default()).unwrap()
    }

    #[test]
    fn maps_every_element_in_order() {
        let p = array_of_increments();
        assert_eq!(p.call_value(&json!([1, 2, 3])).unwrap(), Some(json!([2, 3, 4])));
        assert_eq!(p.call_value(&json!([])).unwrap(), Some(json!([])));
    }

    #[test]
    fn rejects_non_arrays() {
        let p = array_of_increments();
        for input in [json!({"0": 1}), json!("123"), json!(5), json!(true)] {
            assert!(
                matches!(
                    p.call_value(&input),
                    Err(ParseError::TypeMismatch {
                        expected: Shape::Array,
                        ..
                    })
                ),
                "accepted {input}"
            );
        }
    }

    #[test]
    fn fails_fast_on_first_bad_element() {
        let p = array_of_increments();
        let err = p.call_value(&json!([1, "a", "b"])).unwrap_err();
        assert_eq!(err.to_string(), "not an integer: \"a\"");
    }

    #[test]
    fn absent_elements_use_element_options() {
        let optional = array_of_increments();
        assert_eq!(optional.call_value(&json!([1, null])).unwrap(), Some(json!([2, null])));

        let defaulted = Parser::array(
            Parser::new(increment, ParserOptions::default().with_default(0)).unwrap(),
            ParserOptions::default(),
        )
        .unwrap();
        assert_eq!(defaulted.call_value(&json!([null, 5])).unwrap(), Some(json!([1, 6])));

        let required = Parser::array(
            Parser::new(increment, ParserOptions::required()).unwrap(),
            ParserOptions::default(),
        )
        .unwrap();
        assert!(matches!(
            required.call_value(&json!([1, null])),
            Err(ParseError::MissingRequiredValue)
        ));
    }

    #[test]
    fn array_default_is_parsed_elementwise() {
        let element = Parser::new(increment, ParserOptions::default()).unwrap();
        let p = Parser::array(element, ParserOptions::default().with_default(json!([0, 1]))).unwrap();
        assert_eq!(p.cached_default(), Some(&json!([1, 2])));
        assert_eq!(p.call(None).unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn exposes_element_parser() {
        let p = array_of_increments();
        let array = p.as_array().expect("array parser");
        assert_eq!(array.element().call_value(&json!(1)).unwrap(), Some(json!(2)));
        assert!(p.as_object().is_none());
    }
}
