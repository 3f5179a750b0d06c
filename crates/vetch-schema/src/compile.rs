//! # Schema Compiler
//!
//! Turns a [`Schema`] descriptor into an executable [`Parser`] tree.
//!
//! Dispatch, in order:
//!
//! 1. An already built parser is returned unchanged and the options are
//!    ignored, so compiled sub-schemas can be reused verbatim.
//! 2. A transform function is wrapped as a plain parser.
//! 3. A single-element array literal compiles its element and wraps it in
//!    an array parser.
//! 4. An object literal compiles every field and wraps them in an object
//!    parser.
//! 5. Anything else (an array literal with zero or several elements) is an
//!    `UnsupportedSchemaType`.
//!
//! Nested descriptors are compiled with default options; options only ever
//! apply to the node they are passed with. Compiling the same descriptor
//! twice builds two independent trees.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use vetch_core::{ParseError, SchemaError};

use crate::parser::{Parser, ParserOptions, Transform};

/// A declarative, possibly nested description of an expected shape.
#[derive(Clone)]
pub enum Schema {
    /// An already compiled parser.
    Parser(Parser),
    /// A leaf transform.
    Transform(Transform),
    /// An array literal. Only the single-element form `[element]` compiles.
    Array(Vec<Schema>),
    /// An object literal mapping field names to descriptors.
    Object(BTreeMap<String, Schema>),
}

impl Schema {
    /// A leaf descriptor.
    pub fn leaf<F>(transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync + 'static,
    {
        Self::Transform(Arc::new(transform))
    }

    /// The array literal `[element]`.
    pub fn array(element: impl Into<Schema>) -> Self {
        Self::Array(vec![element.into()])
    }

    /// An object literal.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Parser(_) => "parser",
            Self::Transform(_) => "transform",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<Parser> for Schema {
    fn from(parser: Parser) -> Self {
        Self::Parser(parser)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parser(parser) => f.debug_tuple("Parser").field(parser).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
            Self::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Self::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
        }
    }
}

/// Compile a schema descriptor into a parser tree.
///
/// # Errors
///
/// Returns `SchemaError::UnsupportedSchemaType` for an array literal that
/// does not hold exactly one element, and `SchemaError::DefaultRejected`
/// when a default fails its own transform. Both carry the JSON Pointer of
/// the offending descriptor.
pub fn compile(schema: impl Into<Schema>, options: ParserOptions) -> Result<Parser, SchemaError> {
    compile_at(schema.into(), options, "")
}

fn compile_at(schema: Schema, options: ParserOptions, path: &str) -> Result<Parser, SchemaError> {
    trace!(path, kind = schema.kind(), "compiling schema node");
    match schema {
        Schema::Parser(parser) => Ok(parser),
        Schema::Transform(transform) => Parser::from_transform(transform, options),
        Schema::Array(mut items) => {
            if items.len() != 1 {
                return Err(SchemaError::UnsupportedSchemaType {
                    shape: format!("array literal with {} elements", items.len()),
                    path: path.to_string(),
                });
            }
            let element = items.remove(0);
            let element = compile_at(element, ParserOptions::default(), &format!("{path}/0"))?;
            Parser::array(element, options)
        }
        Schema::Object(fields) => {
            let mut compiled = BTreeMap::new();
            for (name, field) in fields {
                let field_path = format!("{path}/{}", escape_pointer(&name));
                let parser = compile_at(field, ParserOptions::default(), &field_path)?;
                compiled.insert(name, parser);
            }
            Parser::object(compiled, options)
        }
    }
}

/// Escape a field name as a JSON Pointer reference token (RFC 6901).
pub(crate) fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
