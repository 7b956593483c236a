//! # Pascaline
//!
//! Pascaline is a toy Pascal interpreter: a lexer, recursive descent parser,
//! scope-checking semantic analyzer and tree-walking evaluator for a small
//! Pascal-like language with `INTEGER`/`REAL` variables, nested procedures
//! with value parameters, assignment and arithmetic.
//!
//! The pipeline itself lives in the `pascaline-core` crate; this crate holds
//! the tools built on top of it.
//!
//! ## Modules
//!
//! - `repl`: an interactive arithmetic calculator over the core expression
//!   grammar, for trying out operator behavior without writing a program.
//! - `reemit`: a source-to-source demonstration pass that re-prints a parsed
//!   program with every name decorated by its scope nesting level.

pub mod reemit;
pub mod repl;

// Re-export the core pipeline surface for convenience
pub use pascaline_core::parser::{interpret, parse, ActivationRecord, Error, Value};
