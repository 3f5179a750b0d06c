//! # vetch-schema — Schema-Driven Value Parsing
//!
//! Compiles a declarative schema descriptor into a tree of [`Parser`]s and
//! runs that tree against JSON values, validating and canonicalizing them
//! in one pass.
//!
//! ## Parsers (`parser`, `array`, `object`)
//!
//! A [`Parser`] wraps one transform with a required flag and a default that
//! is computed once, at construction. [`Parser::parse`], [`Parser::validate`]
//! and [`Parser::or`] build new parsers from existing ones. The array and
//! object specializations assert the shape of their input and descend into
//! it; object validation is open, so undeclared and optional-absent fields
//! pass through unchanged.
//!
//! ## Compiler (`compile`)
//!
//! [`compile`] dispatches on the descriptor: an existing parser is returned
//! as-is, a function becomes a leaf, `[element]` becomes an array parser and
//! an object literal becomes an object parser, recursively.
//!
//! ## Documents (`document`)
//!
//! Schemas can also be written as JSON or YAML documents whose leaves name
//! transforms in a [`LeafRegistry`].
//!
//! ```
//! use serde_json::json;
//! use vetch_core::leaf;
//! use vetch_schema::{compile, ParserOptions, Schema};
//!
//! let transfer = compile(
//!     Schema::object([
//!         ("to", Schema::from(vetch_schema::Parser::new(leaf::fixed_hex(20), ParserOptions::required())?)),
//!         ("value", Schema::leaf(leaf::amount(18))),
//!     ]),
//!     ParserOptions::required(),
//! )?;
//!
//! let out = transfer.call_value(&json!({
//!     "to": "0x00000000000000000000000000000000000000AA",
//!     "value": "0.5",
//!     "memo": "rent",
//! }))?;
//! assert_eq!(out, Some(json!({
//!     "to": "0x00000000000000000000000000000000000000aa",
//!     "value": "500000000000000000",
//!     "memo": "rent",
//! })));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `vetch-core` internally.
//! - Built trees are immutable, `Send + Sync`, and pure to call.
//! - Failures are fail-fast; nothing aggregates errors across fields.

pub mod array;
pub mod compile;
pub mod document;
pub mod object;
pub mod parser;

pub use array::ArrayParser;
pub use compile::{compile, Schema};
pub use document::{load_document, LeafRegistry};
pub use object::ObjectParser;
pub use parser::{Parser, ParserOptions, Predicate, Transform};
