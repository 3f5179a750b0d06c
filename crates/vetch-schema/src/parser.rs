//! # Parser — the Executable Unit
//!
//! A [`Parser`] wraps one transform together with two pieces of metadata:
//! whether a value is required, and a default computed once at construction.
//! It is called with [`Parser::call`] and extended with three combinators,
//! each returning a new parser and leaving the receiver untouched:
//!
//! - [`Parser::parse`] — feed the receiver's result into a further transform.
//! - [`Parser::validate`] — require a predicate to hold on the receiver's result.
//! - [`Parser::or`] — on any failure of the receiver, evaluate a fallback
//!   function on the original raw value.
//!
//! ## Absent values
//!
//! Absence is `None`. On input, an explicit JSON `null` counts as absent.
//! A call on an absent value returns the cached default when there is one,
//! fails with [`ParseError::MissingRequiredValue`] when the parser is
//! required, and returns `None` otherwise.
//!
//! The rule holds for parsers produced by combinators too. They inherit
//! `required` from their receiver, and their own default is derived once,
//! when the combinator is applied, from the receiver's cached default:
//! `parse` runs its step on it, `validate` checks it, `or` keeps it as is.
//! An absent call never reaches a step, a predicate or a fallback.
//!
//! ## Thread Safety
//!
//! A parser is an `Arc` around an immutable node. Cloning is cheap and a
//! built tree is `Send + Sync`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use vetch_core::{ParseError, SchemaError};

use crate::array::ArrayParser;
use crate::object::ObjectParser;

/// A leaf transform: one raw value in, a canonical value or a failure out.
pub type Transform = Arc<dyn Fn(&Value) -> Result<Value, ParseError> + Send + Sync>;

/// A predicate applied by [`Parser::validate`].
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Construction options shared by every parser kind.
///
/// Deserializable so that schema documents can carry them inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserOptions {
    /// Fail with `MissingRequiredValue` when the value is absent and no
    /// default is configured.
    #[serde(default)]
    pub required: bool,

    /// Raw default, run through the parser's transform once at construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParserOptions {
    /// Options for a required parser without a default.
    pub fn required() -> Self {
        Self {
            required: true,
            default: None,
        }
    }

    /// Set the raw default.
    pub fn with_default(mut self, raw: impl Into<Value>) -> Self {
        self.default = Some(raw.into());
        self
    }
}

/// An executable, composable validator/transformer.
#[derive(Clone)]
pub struct Parser {
    node: Arc<Node>,
}

struct Node {
    kind: Kind,
    required: bool,
    /// Output of the transform applied to the raw default.
    default: Option<Value>,
}

enum Kind {
    Base(Base),
    Then { source: Parser, step: Transform },
    Validate { source: Parser, predicate: Predicate },
    Or { source: Parser, fallback: Transform },
}

/// Parsers that own a transform and may carry a default.
enum Base {
    Transform(Transform),
    Array(ArrayParser),
    Object(ObjectParser),
}

impl Base {
    fn apply(&self, value: &Value) -> Result<Value, ParseError> {
        match self {
            Self::Transform(transform) => transform(value),
            Self::Array(array) => array.apply(value),
            Self::Object(object) => object.apply(value),
        }
    }
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Self::Base(Base::Transform(_)) => "transform",
            Self::Base(Base::Array(_)) => "array",
            Self::Base(Base::Object(_)) => "object",
            Self::Then { .. } => "parse",
            Self::Validate { .. } => "validate",
            Self::Or { .. } => "or",
        }
    }
}

impl Parser {
    /// Wrap a transform function.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DefaultRejected` if `options.default` is set and
    /// the transform rejects it.
    pub fn new<F>(transform: F, options: ParserOptions) -> Result<Self, SchemaError>
    where
        F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync + 'static,
    {
        Self::from_transform(Arc::new(transform), options)
    }

    /// Wrap an already shared transform.
    pub fn from_transform(transform: Transform, options: ParserOptions) -> Result<Self, SchemaError> {
        Self::build(Base::Transform(transform), options)
    }

    /// Build an [`ArrayParser`] mapping `element` over every entry.
    pub fn array(element: Parser, options: ParserOptions) -> Result<Self, SchemaError> {
        Self::build(Base::Array(ArrayParser::new(element)), options)
    }

    /// Build an [`ObjectParser`] applying `fields` to the matching input fields.
    pub fn object(fields: BTreeMap<String, Parser>, options: ParserOptions) -> Result<Self, SchemaError> {
        Self::build(Base::Object(ObjectParser::new(fields)), options)
    }

    fn build(base: Base, options: ParserOptions) -> Result<Self, SchemaError> {
        let default = match options.default {
            Some(raw) if !raw.is_null() => {
                Some(base.apply(&raw).map_err(default_rejected)?)
            }
            _ => None,
        };
        Ok(Self {
            node: Arc::new(Node {
                kind: Kind::Base(base),
                required: options.required,
                default,
            }),
        })
    }

    /// Wrap `kind` with the receiver's `required` flag and an already
    /// derived default.
    fn derive(&self, kind: Kind, default: Option<Value>) -> Self {
        Self {
            node: Arc::new(Node {
                kind,
                required: self.is_required(),
                default,
            }),
        }
    }

    /// Run the parser against a possibly absent value.
    pub fn call(&self, value: Option<&Value>) -> Result<Option<Value>, ParseError> {
        match value.filter(|v| !v.is_null()) {
            Some(v) => self.apply(v).map(Some),
            None => match &self.node.default {
                Some(default) => Ok(Some(default.clone())),
                None if self.node.required => Err(ParseError::MissingRequiredValue),
                None => Ok(None),
            },
        }
    }

    /// The transform of this node, applied to a present value.
    fn apply(&self, value: &Value) -> Result<Value, ParseError> {
        match &self.node.kind {
            Kind::Base(base) => base.apply(value),
            Kind::Then { source, step } => step(&source.apply(value)?),
            Kind::Validate { source, predicate } => {
                let out = source.apply(value)?;
                if predicate(&out) {
                    Ok(out)
                } else {
                    Err(ParseError::ValidationFailed { value: out })
                }
            }
            Kind::Or { source, fallback } => source.apply(value).or_else(|err| {
                debug!(error = %err, "primary parser failed, taking fallback");
                fallback(value)
            }),
        }
    }

    /// Run the parser against a present value.
    pub fn call_value(&self, value: &Value) -> Result<Option<Value>, ParseError> {
        self.call(Some(value))
    }

    /// Chain a further transform onto this parser's result.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DefaultRejected` if the receiver has a cached
    /// default and `step` rejects it. The step runs on it exactly once, here.
    pub fn parse<F>(&self, step: F) -> Result<Parser, SchemaError>
    where
        F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync + 'static,
    {
        let step: Transform = Arc::new(step);
        let default = self
            .cached_default()
            .map(|d| step(d))
            .transpose()
            .map_err(default_rejected)?;
        let kind = Kind::Then {
            source: self.clone(),
            step,
        };
        Ok(self.derive(kind, default))
    }

    /// Require `predicate` to hold on this parser's result.
    ///
    /// An absent result (optional parser, no default) is not checked.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DefaultRejected` if the receiver's cached default
    /// fails `predicate`.
    pub fn validate<P>(&self, predicate: P) -> Result<Parser, SchemaError>
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let default = match self.cached_default() {
            Some(d) if !predicate(d) => {
                return Err(default_rejected(ParseError::ValidationFailed { value: d.clone() }));
            }
            d => d.cloned(),
        };
        let kind = Kind::Validate {
            source: self.clone(),
            predicate: Arc::new(predicate),
        };
        Ok(self.derive(kind, default))
    }

    /// On any failure of this parser, evaluate `fallback` on the original raw
    /// value instead.
    ///
    /// An absent value is handled by the new parser's own default and
    /// `required` flag, both taken from the receiver; `fallback` only ever
    /// sees present values.
    pub fn or<F>(&self, fallback: F) -> Parser
    where
        F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync + 'static,
    {
        let kind = Kind::Or {
            source: self.clone(),
            fallback: Arc::new(fallback),
        };
        self.derive(kind, self.cached_default().cloned())
    }

    /// Whether an absent value without a default is rejected.
    pub fn is_required(&self) -> bool {
        self.node.required
    }

    /// The default cached at construction, if any.
    pub fn cached_default(&self) -> Option<&Value> {
        self.node.default.as_ref()
    }

    /// The array specialization, if this parser is one.
    pub fn as_array(&self) -> Option<&ArrayParser> {
        match &self.node.kind {
            Kind::Base(Base::Array(array)) => Some(array),
            _ => None,
        }
    }

    /// The object specialization, if this parser is one.
    pub fn as_object(&self) -> Option<&ObjectParser> {
        match &self.node.kind {
            Kind::Base(Base::Object(object)) => Some(object),
            _ => None,
        }
    }

    /// True if both handles refer to the same parser node.
    pub fn ptr_eq(a: &Parser, b: &Parser) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }
}

fn default_rejected(source: ParseError) -> SchemaError {
    SchemaError::DefaultRejected {
        path: String::new(),
        source,
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Parser");
        s.field("kind", &self.node.kind.name())
            .field("required", &self.node.required)
            .field("default", &self.node.default);
        match &self.node.kind {
            Kind::Base(Base::Array(array)) => s.field("element", array.element()),
            Kind::Base(Base::Object(object)) => s.field("fields", object.fields()),
            Kind::Then { source, .. } | Kind::Validate { source, .. } | Kind::Or { source, .. } => {
                s.field("source", source)
            }
            Kind::Base(Base::Transform(_)) => &mut s,
        };
        s.finish()
    }
}
