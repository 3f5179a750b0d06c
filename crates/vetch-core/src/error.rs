//! # Error Types — Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - [`ParseError`] is raised while a compiled parser runs against a value.
//!   It is synchronous and fail-fast: the first failure aborts the call.
//! - [`SchemaError`] is raised while a schema descriptor is compiled or a
//!   schema document is loaded. It never occurs once a tree is built.
//! - Leaf transforms supplied by the embedding application report through
//!   [`ParseError::Leaf`], which carries their error unchanged.

use serde_json::Value;
use thiserror::Error;

use crate::shape::Shape;

/// Boxed error raised by a leaf transform.
pub type LeafError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single parser call.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The value was absent, no default was configured, and the parser is
    /// required.
    #[error("missing required value")]
    MissingRequiredValue,

    /// A structural assertion (array or object) failed.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Shape the parser accepts.
        expected: Shape,
        /// Shape of the value actually supplied.
        found: Shape,
    },

    /// A `validate` predicate rejected the parsed value.
    #[error("validation failed for value {value}")]
    ValidationFailed {
        /// The parsed value the predicate rejected.
        value: Value,
    },

    /// A leaf transform failed. The inner error is passed through as raised.
    #[error("{0}")]
    Leaf(LeafError),
}

impl ParseError {
    /// Wrap any error (or message) raised by a leaf transform.
    pub fn leaf(err: impl Into<LeafError>) -> Self {
        Self::Leaf(err.into())
    }

    /// Build a [`ParseError::TypeMismatch`] for the given value.
    pub fn type_mismatch(expected: Shape, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: Shape::of(found),
        }
    }

    /// Downcast the error of a failed leaf transform.
    pub fn leaf_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Leaf(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<LeafRejection> for ParseError {
    fn from(err: LeafRejection) -> Self {
        Self::Leaf(Box::new(err))
    }
}

/// Rejections raised by the stock leaves in [`crate::leaf`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LeafRejection {
    /// The string contains a character outside `[0-9a-fA-F]`.
    #[error("invalid hex string {input:?}: unexpected character {character:?}")]
    InvalidHex {
        /// The raw input.
        input: String,
        /// First offending character.
        character: char,
    },

    /// A fixed-length hex identifier has the wrong number of bytes.
    #[error("expected {expected} bytes of hex, found {found} hex digits")]
    WrongLength {
        /// Expected byte length.
        expected: usize,
        /// Number of hex digits supplied.
        found: usize,
    },

    /// Float values are not permitted where an exact quantity is expected.
    /// Amounts must be strings or integers.
    #[error("float values are not permitted; use string or integer: {0}")]
    FloatRejected(f64),

    /// The string is not a decimal integer.
    #[error("invalid integer {0:?}")]
    InvalidInteger(String),

    /// The string is not a decimal amount.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    /// The amount has more fractional digits than the unit allows.
    #[error("amount {input:?} has more than {decimals} fractional digits")]
    TooManyDecimals {
        /// The raw input.
        input: String,
        /// Fractional digits the unit allows.
        decimals: u32,
    },

    /// The scaled amount does not fit in 128 bits.
    #[error("amount {0:?} overflows when scaled to base units")]
    Overflow(String),
}

/// Failure while compiling a schema descriptor or loading a schema document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The descriptor is not a parser, transform, single-element array
    /// literal, or object literal.
    #[error("unsupported schema type {shape} at {}", display_path(.path))]
    UnsupportedSchemaType {
        /// Runtime shape of the offending descriptor.
        shape: String,
        /// JSON Pointer to the descriptor within the schema.
        path: String,
    },

    /// A parser's raw default was rejected by the parser's own transform.
    #[error("default value rejected at {}: {source}", display_path(.path))]
    DefaultRejected {
        /// JSON Pointer to the descriptor within the schema.
        path: String,
        /// Failure raised by the transform.
        #[source]
        source: ParseError,
    },

    /// A schema document names a leaf that is not registered.
    #[error("unknown leaf transform '{name}' at {}", display_path(.path))]
    UnknownLeaf {
        /// Leaf name as written in the document.
        name: String,
        /// JSON Pointer to the leaf within the document.
        path: String,
    },

    /// Inline parser options in a schema document are malformed.
    #[error("invalid parser options at {}: {reason}", display_path(.path))]
    InvalidOptions {
        /// JSON Pointer to the leaf within the document.
        path: String,
        /// Reason the options were rejected.
        reason: String,
    },

    /// The schema document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}
