use crate::parser::error::{LexError, LexErrorKind};
use std::fmt;

/// Line/column location of a token or error in the source text.
///
/// Lines and columns are 1-based; the column counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Represents the different kinds of tokens in the Pascaline language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    IntegerConst(i64), // 314
    RealConst(f64),    // 3.14
    Identifier(String), // a, AlphaA (original case preserved)

    // Keywords (matched case-insensitively)
    Program,
    Var,
    Procedure,
    Begin,
    End,
    Integer,
    Real,
    Div, // integer division keyword

    // Operators
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // / (real division)
    Assign, // :=

    // Punctuation
    LeftParen,  // (
    RightParen, // )
    Semicolon,  // ;
    Colon,      // :
    Comma,      // ,
    Dot,        // .

    // End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntegerConst(n) => write!(f, "{}", n),
            TokenKind::RealConst(x) => write!(f, "{}", x),
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::Program => write!(f, "PROGRAM"),
            TokenKind::Var => write!(f, "VAR"),
            TokenKind::Procedure => write!(f, "PROCEDURE"),
            TokenKind::Begin => write!(f, "BEGIN"),
            TokenKind::End => write!(f, "END"),
            TokenKind::Integer => write!(f, "INTEGER"),
            TokenKind::Real => write!(f, "REAL"),
            TokenKind::Div => write!(f, "DIV"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Assign => write!(f, ":="),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with the position where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Token { kind, line, column }
    }

    pub fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Map a candidate identifier onto a reserved keyword, case-insensitively.
/// Identifiers that are not keywords keep their original spelling.
fn keyword(text: &str) -> Option<TokenKind> {
    match text.to_ascii_uppercase().as_str() {
        "PROGRAM" => Some(TokenKind::Program),
        "VAR" => Some(TokenKind::Var),
        "PROCEDURE" => Some(TokenKind::Procedure),
        "BEGIN" => Some(TokenKind::Begin),
        "END" => Some(TokenKind::End),
        "INTEGER" => Some(TokenKind::Integer),
        "REAL" => Some(TokenKind::Real),
        "DIV" => Some(TokenKind::Div),
        _ => None,
    }
}

/// Tokenizes Pascaline source text into tokens
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source text
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Lexer {
            input: chars,
            position: 0,
            current_char,
            line: 1,
            column: 1,
        }
    }

    /// Advance to the next character, updating line/column bookkeeping
    fn advance(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip a `{ ... }` comment. The opening brace is the current character.
    fn skip_comment(&mut self) -> Result<(), LexError> {
        let start = Position::new(self.line, self.column);
        self.advance(); // consume '{'

        loop {
            match self.current_char {
                Some('}') => {
                    self.advance();
                    return Ok(());
                }
                Some(_) => self.advance(),
                None => return Err(LexError::new(LexErrorKind::UnterminatedComment, start)),
            }
        }
    }

    /// Read an identifier or keyword (alphanumerics plus underscore)
    fn identifier(&mut self, line: usize, column: usize) -> Token {
        let mut result = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword(&result).unwrap_or(TokenKind::Identifier(result));
        Token::new(kind, line, column)
    }

    /// Read an integer or real literal. A `.` extends the literal only when
    /// at least one digit follows, so `END.` after a number still lexes.
    fn number(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let mut result = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let is_real = self.current_char == Some('.')
            && self.peek().map(|ch| ch.is_ascii_digit()).unwrap_or(false);

        if is_real {
            result.push('.');
            self.advance();

            while let Some(ch) = self.current_char {
                if ch.is_ascii_digit() {
                    result.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }

            let value = result.parse::<f64>().map_err(|_| {
                LexError::new(
                    LexErrorKind::InvalidNumber(result.clone()),
                    Position::new(line, column),
                )
            })?;
            Ok(Token::new(TokenKind::RealConst(value), line, column))
        } else {
            let value = result.parse::<i64>().map_err(|_| {
                LexError::new(
                    LexErrorKind::InvalidNumber(result.clone()),
                    Position::new(line, column),
                )
            })?;
            Ok(Token::new(TokenKind::IntegerConst(value), line, column))
        }
    }

    /// Get the next token. Once end of input has been reached, every further
    /// call keeps returning an `Eof` token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace();
            if self.current_char == Some('{') {
                self.skip_comment()?;
            } else {
                break;
            }
        }

        let (line, column) = (self.line, self.column);

        match self.current_char {
            None => Ok(Token::new(TokenKind::Eof, line, column)),

            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                Ok(self.identifier(line, column))
            }

            Some(ch) if ch.is_ascii_digit() => self.number(line, column),

            Some(':') => {
                // One character of lookahead distinguishes `:=` from `:`
                if self.peek() == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Assign, line, column))
                } else {
                    self.advance();
                    Ok(Token::new(TokenKind::Colon, line, column))
                }
            }

            Some('+') => {
                self.advance();
                Ok(Token::new(TokenKind::Plus, line, column))
            }

            Some('-') => {
                self.advance();
                Ok(Token::new(TokenKind::Minus, line, column))
            }

            Some('*') => {
                self.advance();
                Ok(Token::new(TokenKind::Star, line, column))
            }

            Some('/') => {
                self.advance();
                Ok(Token::new(TokenKind::Slash, line, column))
            }

            Some('(') => {
                self.advance();
                Ok(Token::new(TokenKind::LeftParen, line, column))
            }

            Some(')') => {
                self.advance();
                Ok(Token::new(TokenKind::RightParen, line, column))
            }

            Some(';') => {
                self.advance();
                Ok(Token::new(TokenKind::Semicolon, line, column))
            }

            Some(',') => {
                self.advance();
                Ok(Token::new(TokenKind::Comma, line, column))
            }

            Some('.') => {
                self.advance();
                Ok(Token::new(TokenKind::Dot, line, column))
            }

            Some(ch) => Err(LexError::new(
                LexErrorKind::UnexpectedChar(ch),
                Position::new(line, column),
            )),
        }
    }

    /// Tokenize the entire input into a vector of tokens, including the
    /// trailing `Eof` token
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }
}
