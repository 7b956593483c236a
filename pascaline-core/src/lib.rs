//! # Pascaline Core
//!
//! Front end and tree-walking interpreter for Pascaline, a toy Pascal
//! supporting `INTEGER`/`REAL` variables, nested procedures with value
//! parameters, assignment, arithmetic and compound statements.
//!
//! The pipeline runs strictly downstream: source text is lexed into tokens,
//! parsed into an AST, validated against a chain of lexical scopes, and
//! executed on a call stack of activation records. Errors are the only
//! back-channel; the first error at any stage aborts that stage.
//!
//! ## Features
//!
//! - **colored**: colored call-stack dumps for terminal hosts (default)
//!
//! ## Example
//!
//! ```
//! use pascaline_core::parser::interpret;
//!
//! let frame = interpret("PROGRAM P; VAR a : INTEGER; BEGIN a := 2 + 3 END.").unwrap();
//! assert_eq!(frame.get("a").unwrap().to_string(), "5");
//! ```

pub mod parser;

// Re-export the types most hosts need
pub use parser::{interpret, ActivationRecord, Error, Program, Value};
