// pascaline-core/src/parser/mod.rs

pub mod analyzer;
pub mod ast;
pub mod callstack;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod symbols;

pub use analyzer::{Analysis, Resolutions, SemanticAnalyzer};
pub use ast::{
    BinaryOperator, Block, Compound, Declaration, Expression, Program, Statement, TypeSpec,
    UnaryOperator, Value, Var,
};
pub use callstack::{ActivationRecord, CallStack, RecordKind};
pub use error::{
    Error, LexError, ParseError, RuntimeError, RuntimeErrorKind, SemanticError, SemanticErrorKind,
};
pub use interpreter::{eval_binary, interpret, Interpreter};
pub use lexer::{Lexer, Position, Token, TokenKind};
pub use parser::{parse, parse_expression, Parser};
pub use symbols::{ProcedureSymbol, Scope, ScopedSymbolTable, Symbol, VarSymbol};
