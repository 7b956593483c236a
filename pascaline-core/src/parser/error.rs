use crate::parser::lexer::{Position, Token};
use std::fmt;

/// Reasons tokenization can fail
#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    UnexpectedChar(char),
    UnterminatedComment,
    InvalidNumber(String),
}

/// An error produced while tokenizing source text
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

impl LexError {
    pub fn new(kind: LexErrorKind, position: Position) -> Self {
        LexError { kind, position }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lex error at {}: ", self.position)?;
        match &self.kind {
            LexErrorKind::UnexpectedChar(ch) => write!(f, "unexpected character '{}'", ch),
            LexErrorKind::UnterminatedComment => write!(f, "unterminated comment"),
            LexErrorKind::InvalidNumber(text) => write!(f, "invalid number literal '{}'", text),
        }
    }
}

impl std::error::Error for LexError {}

/// An error produced when the token stream does not match the grammar.
/// Parsing aborts on the first mismatch; there is no recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable description of what the grammar rule required
    pub expected: String,
    /// The token that was actually found
    pub found: Token,
}

impl ParseError {
    pub fn new(expected: impl Into<String>, found: Token) -> Self {
        ParseError {
            expected: expected.into(),
            found,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at {}: expected {}, found '{}'",
            self.found.pos(),
            self.expected,
            self.found
        )
    }
}

impl std::error::Error for ParseError {}

/// The ways a program can be statically invalid
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticErrorKind {
    /// A name declared twice within the same scope
    DuplicateIdentifier(String),
    /// A reference to a name with no declaration in the scope chain
    IdentifierNotFound(String),
    /// A procedure call whose argument count differs from the declaration
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// An error produced by semantic analysis. Analysis stops at the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub position: Position,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, position: Position) -> Self {
        SemanticError { kind, position }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "semantic error at {}: ", self.position)?;
        match &self.kind {
            SemanticErrorKind::DuplicateIdentifier(name) => {
                write!(f, "duplicate identifier '{}'", name)
            }
            SemanticErrorKind::IdentifierNotFound(name) => {
                write!(f, "identifier '{}' not found", name)
            }
            SemanticErrorKind::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "procedure '{}' expects {} arguments, got {}",
                name, expected, found
            ),
        }
    }
}

impl std::error::Error for SemanticError {}

/// The ways execution of an analyzed program can still fail
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    /// A read of a name with no binding in the top activation record
    UnboundVariable(String),
    /// `DIV` or `/` with a zero divisor
    DivisionByZero,
    /// A call site with no entry in the resolution table (the AST was
    /// executed without being analyzed first)
    UnresolvedCall(String),
}

/// An error produced during execution
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind) -> Self {
        RuntimeError { kind }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "runtime error: ")?;
        match &self.kind {
            RuntimeErrorKind::UnboundVariable(name) => write!(
                f,
                "variable '{}' is not bound in the current activation record",
                name
            ),
            RuntimeErrorKind::DivisionByZero => write!(f, "division by zero"),
            RuntimeErrorKind::UnresolvedCall(name) => {
                write!(f, "call to unresolved procedure '{}'", name)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Any error the pipeline can produce, one variant per stage
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    Semantic(SemanticError),
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "{}", e),
            Error::Parse(e) => write!(f, "{}", e),
            Error::Semantic(e) => write!(f, "{}", e),
            Error::Runtime(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<SemanticError> for Error {
    fn from(e: SemanticError) -> Self {
        Error::Semantic(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Error::Runtime(e)
    }
}
