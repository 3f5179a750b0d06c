//! # vetch-core — Foundational Types for vetch
//!
//! Every other crate in the workspace depends on `vetch-core`; it depends on
//! nothing internal.
//!
//! ## Contents
//!
//! 1. **Error taxonomy.** [`ParseError`] is the runtime failure of a parser
//!    call, [`SchemaError`] the failure of turning a schema descriptor into a
//!    parser tree. Leaf failures travel inside [`ParseError::Leaf`] untouched.
//!
//! 2. **[`Shape`].** The runtime classification of a JSON value, used by
//!    structural assertions and in error messages.
//!
//! 3. **Stock leaves.** The [`leaf`] module carries the canonicalizers an
//!    embedding application usually plugs into a schema: hex strings,
//!    fixed-length hex identifiers, unit-scaled amounts, and plain shape
//!    assertions.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vetch-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod leaf;
pub mod shape;

// Re-export primary types for ergonomic imports.
pub use error::{LeafError, LeafRejection, ParseError, SchemaError};
pub use shape::Shape;
