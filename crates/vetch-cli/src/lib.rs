//! # vetch-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `check` — compile a schema document and run it over input documents
//! - `leaves` — list the leaf names schema documents may use
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from the handlers.
//! - Handlers write to a caller-supplied writer so they can be tested
//!   without a process boundary.

pub mod check;
