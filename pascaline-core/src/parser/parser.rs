use crate::parser::ast::{
    BinaryOperator, Block, CallId, Compound, Declaration, Expression, Param, ProcedureDecl,
    Program, Statement, TypeSpec, UnaryOperator, Value, Var, VarDecl,
};
use crate::parser::error::{Error, LexError, ParseError};
use crate::parser::lexer::{Lexer, Position, Token, TokenKind};
use std::rc::Rc;

/// Recursive descent parser for the Pascaline language.
///
/// Each grammar rule is a method that consumes the tokens of its alternative
/// with exactly one token of lookahead and returns the corresponding AST
/// node. The first mismatch aborts parsing; no partial AST is returned.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    current_token: Token,
    next_call_id: usize,
}

impl Parser {
    /// Create a new parser from input source text
    pub fn new(input: &str) -> Result<Self, LexError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;

        // tokenize() always ends the stream with Eof
        let current_token = tokens[0].clone();

        Ok(Parser {
            tokens,
            position: 0,
            current_token,
            next_call_id: 0,
        })
    }

    /// Advance to the next token
    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
            self.current_token = self.tokens[self.position].clone();
        }
    }

    /// Whether the token after the current one has the given kind
    fn next_is(&self, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.position + 1)
            .map(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
            .unwrap_or(false)
    }

    /// Consume the current token if its kind matches, else fail
    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if std::mem::discriminant(&self.current_token.kind) == std::mem::discriminant(&expected) {
            let token = self.current_token.clone();
            self.advance();
            Ok(token)
        } else {
            Err(ParseError::new(
                format!("'{}'", expected),
                self.current_token.clone(),
            ))
        }
    }

    /// Consume an identifier token and return its name and position
    fn identifier(&mut self) -> Result<(String, Position), ParseError> {
        match &self.current_token.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let pos = self.current_token.pos();
                self.advance();
                Ok((name, pos))
            }
            _ => Err(ParseError::new(
                "an identifier",
                self.current_token.clone(),
            )),
        }
    }

    /// Parse a complete program; trailing tokens are an error.
    /// Grammar: program := PROGRAM ID ';' block '.'
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        self.expect(TokenKind::Program)?;
        let (name, _) = self.identifier()?;
        self.expect(TokenKind::Semicolon)?;
        let block = self.block()?;
        self.expect(TokenKind::Dot)?;
        self.expect(TokenKind::Eof)?;

        Ok(Program { name, block })
    }

    /// Grammar: block := declarations compound
    fn block(&mut self) -> Result<Block, ParseError> {
        let declarations = self.declarations()?;
        let body = self.compound_statement()?;

        Ok(Block { declarations, body })
    }

    /// Grammar: declarations := (VAR (varDecl ';')+)* (procedureDecl)*
    fn declarations(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();

        while matches!(self.current_token.kind, TokenKind::Var) {
            self.advance();

            // Each VAR section requires at least one declaration
            loop {
                let group = self.variable_declaration()?;
                declarations.extend(group.into_iter().map(Declaration::Var));
                self.expect(TokenKind::Semicolon)?;

                if !matches!(self.current_token.kind, TokenKind::Identifier(_)) {
                    break;
                }
            }
        }

        while matches!(self.current_token.kind, TokenKind::Procedure) {
            declarations.push(Declaration::Procedure(self.procedure_declaration()?));
        }

        Ok(declarations)
    }

    /// Grammar: varDecl := ID (',' ID)* ':' type
    fn variable_declaration(&mut self) -> Result<Vec<VarDecl>, ParseError> {
        let mut names = vec![self.identifier()?];

        while matches!(self.current_token.kind, TokenKind::Comma) {
            self.advance();
            names.push(self.identifier()?);
        }

        self.expect(TokenKind::Colon)?;
        let type_spec = self.type_spec()?;

        Ok(names
            .into_iter()
            .map(|(name, pos)| VarDecl {
                name,
                type_spec,
                pos,
            })
            .collect())
    }

    /// Grammar: type := INTEGER | REAL
    fn type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        match self.current_token.kind {
            TokenKind::Integer => {
                self.advance();
                Ok(TypeSpec::Integer)
            }
            TokenKind::Real => {
                self.advance();
                Ok(TypeSpec::Real)
            }
            _ => Err(ParseError::new(
                "a type name",
                self.current_token.clone(),
            )),
        }
    }

    /// Grammar: procedureDecl := PROCEDURE ID ('(' paramList ')')? ';' block ';'
    fn procedure_declaration(&mut self) -> Result<ProcedureDecl, ParseError> {
        self.expect(TokenKind::Procedure)?;
        let (name, pos) = self.identifier()?;

        let params = if matches!(self.current_token.kind, TokenKind::LeftParen) {
            self.advance();
            let params = self.formal_parameter_list()?;
            self.expect(TokenKind::RightParen)?;
            params
        } else {
            Vec::new()
        };

        self.expect(TokenKind::Semicolon)?;
        let block = self.block()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(ProcedureDecl {
            name,
            params,
            block: Rc::new(block),
            pos,
        })
    }

    /// Grammar: paramList := param (';' param)*
    fn formal_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = self.formal_parameters()?;

        while matches!(self.current_token.kind, TokenKind::Semicolon) {
            self.advance();
            params.extend(self.formal_parameters()?);
        }

        Ok(params)
    }

    /// Grammar: param := ID (',' ID)* ':' type
    fn formal_parameters(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut names = vec![self.identifier()?];

        while matches!(self.current_token.kind, TokenKind::Comma) {
            self.advance();
            names.push(self.identifier()?);
        }

        self.expect(TokenKind::Colon)?;
        let type_spec = self.type_spec()?;

        Ok(names
            .into_iter()
            .map(|(name, pos)| Param {
                name,
                type_spec,
                pos,
            })
            .collect())
    }

    /// Grammar: compound := BEGIN statementList END
    fn compound_statement(&mut self) -> Result<Compound, ParseError> {
        self.expect(TokenKind::Begin)?;
        let statements = self.statement_list()?;
        self.expect(TokenKind::End)?;

        Ok(Compound { statements })
    }

    /// Grammar: statementList := statement (';' statement)*
    fn statement_list(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![self.statement()?];

        while matches!(self.current_token.kind, TokenKind::Semicolon) {
            self.advance();
            statements.push(self.statement()?);
        }

        // A further identifier here means a missing statement separator
        if matches!(self.current_token.kind, TokenKind::Identifier(_)) {
            return Err(ParseError::new("';'", self.current_token.clone()));
        }

        Ok(statements)
    }

    /// Grammar: statement := compound | procCall | assignment | empty
    ///
    /// An identifier starts a procedure call when it is immediately followed
    /// by '(' and an assignment otherwise.
    fn statement(&mut self) -> Result<Statement, ParseError> {
        match self.current_token.kind {
            TokenKind::Begin => Ok(Statement::Compound(self.compound_statement()?)),
            TokenKind::Identifier(_) => {
                if self.next_is(&TokenKind::LeftParen) {
                    self.procedure_call_statement()
                } else {
                    self.assignment_statement()
                }
            }
            _ => Ok(Statement::NoOp),
        }
    }

    /// Grammar: procCall := ID '(' (expr (',' expr)*)? ')'
    fn procedure_call_statement(&mut self) -> Result<Statement, ParseError> {
        let (name, pos) = self.identifier()?;
        self.expect(TokenKind::LeftParen)?;

        let mut args = Vec::new();
        if !matches!(self.current_token.kind, TokenKind::RightParen) {
            args.push(self.expr()?);

            while matches!(self.current_token.kind, TokenKind::Comma) {
                self.advance();
                args.push(self.expr()?);
            }
        }

        self.expect(TokenKind::RightParen)?;

        let id = CallId(self.next_call_id);
        self.next_call_id += 1;

        Ok(Statement::ProcedureCall {
            id,
            name,
            args,
            pos,
        })
    }

    /// Grammar: assignment := variable ':=' expr
    fn assignment_statement(&mut self) -> Result<Statement, ParseError> {
        let target = self.variable()?;
        self.expect(TokenKind::Assign)?;
        let value = self.expr()?;

        Ok(Statement::Assign { target, value })
    }

    /// Grammar: variable := ID
    fn variable(&mut self) -> Result<Var, ParseError> {
        let (name, pos) = self.identifier()?;
        Ok(Var { name, pos })
    }

    /// Grammar: expr := term (('+'|'-') term)*
    fn expr(&mut self) -> Result<Expression, ParseError> {
        let mut node = self.term()?;

        loop {
            let op = match self.current_token.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            node = Expression::bin_op(node, op, self.term()?);
        }

        Ok(node)
    }

    /// Grammar: term := factor (('*'|DIV|'/') factor)*
    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut node = self.factor()?;

        loop {
            let op = match self.current_token.kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Div => BinaryOperator::IntegerDiv,
                TokenKind::Slash => BinaryOperator::RealDiv,
                _ => break,
            };
            self.advance();
            node = Expression::bin_op(node, op, self.factor()?);
        }

        Ok(node)
    }

    /// Grammar: factor := ('+'|'-') factor | INT_CONST | REAL_CONST
    ///                  | '(' expr ')' | variable
    fn factor(&mut self) -> Result<Expression, ParseError> {
        match self.current_token.kind {
            TokenKind::Plus => {
                self.advance();
                Ok(Expression::unary_op(UnaryOperator::Plus, self.factor()?))
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expression::unary_op(UnaryOperator::Minus, self.factor()?))
            }
            TokenKind::IntegerConst(n) => {
                self.advance();
                Ok(Expression::Num(Value::Integer(n)))
            }
            TokenKind::RealConst(x) => {
                self.advance();
                Ok(Expression::Num(Value::Real(x)))
            }
            TokenKind::LeftParen => {
                self.advance();
                let node = self.expr()?;
                self.expect(TokenKind::RightParen)?;
                Ok(node)
            }
            TokenKind::Identifier(_) => Ok(Expression::Var(self.variable()?)),
            _ => Err(ParseError::new(
                "an expression",
                self.current_token.clone(),
            )),
        }
    }
}

/// Convenience function to parse source text into a program
pub fn parse(input: &str) -> Result<Program, Error> {
    let mut parser = Parser::new(input)?;
    Ok(parser.parse()?)
}

/// Convenience function to parse source text as a bare arithmetic
/// expression, for hosts that evaluate expressions interactively
pub fn parse_expression(input: &str) -> Result<Expression, Error> {
    let mut parser = Parser::new(input)?;
    let expr = parser.expr()?;
    parser.expect(TokenKind::Eof)?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_program(input: &str) -> Program {
        parse(input).unwrap()
    }

    #[test]
    fn test_parse_minimal_program() {
        let program = parse_program("PROGRAM P; BEGIN END.");
        assert_eq!(program.name, "P");
        assert!(program.block.declarations.is_empty());
        assert_eq!(program.block.body.statements, vec![Statement::NoOp]);
    }

    #[test]
    fn test_parse_var_declarations() {
        let program = parse_program("PROGRAM P; VAR a, b : INTEGER; y : REAL; BEGIN END.");
        let decls = &program.block.declarations;
        assert_eq!(decls.len(), 3);

        match &decls[0] {
            Declaration::Var(v) => {
                assert_eq!(v.name, "a");
                assert_eq!(v.type_spec, TypeSpec::Integer);
            }
            _ => panic!("Expected var declaration"),
        }
        match &decls[2] {
            Declaration::Var(v) => {
                assert_eq!(v.name, "y");
                assert_eq!(v.type_spec, TypeSpec::Real);
            }
            _ => panic!("Expected var declaration"),
        }
    }

    #[test]
    fn test_parse_procedure_with_params() {
        let program = parse_program(
            "PROGRAM P; PROCEDURE Foo(x, y : INTEGER; z : REAL); BEGIN END; BEGIN END.",
        );

        match &program.block.declarations[0] {
            Declaration::Procedure(p) => {
                assert_eq!(p.name, "Foo");
                let names: Vec<&str> = p.params.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["x", "y", "z"]);
                assert_eq!(p.params[2].type_spec, TypeSpec::Real);
            }
            _ => panic!("Expected procedure declaration"),
        }
    }

    #[test]
    fn test_parse_procedure_without_params() {
        let program = parse_program("PROGRAM P; PROCEDURE Bar; BEGIN END; BEGIN Bar() END.");

        match &program.block.declarations[0] {
            Declaration::Procedure(p) => assert!(p.params.is_empty()),
            _ => panic!("Expected procedure declaration"),
        }
        match &program.block.body.statements[0] {
            Statement::ProcedureCall { name, args, .. } => {
                assert_eq!(name, "Bar");
                assert!(args.is_empty());
            }
            _ => panic!("Expected procedure call"),
        }
    }

    #[test]
    fn test_call_vs_assignment_disambiguation() {
        let program = parse_program(
            "PROGRAM P; VAR a : INTEGER; PROCEDURE Foo(x : INTEGER); BEGIN END; \
             BEGIN a := 1; Foo(a) END.",
        );
        let statements = &program.block.body.statements;
        assert!(matches!(statements[0], Statement::Assign { .. }));
        assert!(matches!(statements[1], Statement::ProcedureCall { .. }));
    }

    #[test]
    fn test_call_ids_are_unique() {
        let program = parse_program(
            "PROGRAM P; PROCEDURE Foo; BEGIN END; BEGIN Foo(); Foo() END.",
        );
        let statements = &program.block.body.statements;
        let ids: Vec<CallId> = statements
            .iter()
            .filter_map(|s| match s {
                Statement::ProcedureCall { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_operator_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let expr = parse_expression("1 + 2 * 3").unwrap();
        match expr {
            Expression::BinOp { op, right, .. } => {
                assert_eq!(op, BinaryOperator::Add);
                assert!(matches!(
                    *right,
                    Expression::BinOp {
                        op: BinaryOperator::Multiply,
                        ..
                    }
                ));
            }
            _ => panic!("Expected binary operation"),
        }
    }

    #[test]
    fn test_left_associativity() {
        // 10 - 4 - 3 parses as (10 - 4) - 3
        let expr = parse_expression("10 - 4 - 3").unwrap();
        match expr {
            Expression::BinOp { op, left, .. } => {
                assert_eq!(op, BinaryOperator::Subtract);
                assert!(matches!(
                    *left,
                    Expression::BinOp {
                        op: BinaryOperator::Subtract,
                        ..
                    }
                ));
            }
            _ => panic!("Expected binary operation"),
        }
    }

    #[test]
    fn test_unary_is_right_recursive() {
        let expr = parse_expression("- - 3").unwrap();
        match expr {
            Expression::UnaryOp { op, operand } => {
                assert_eq!(op, UnaryOperator::Minus);
                assert!(matches!(*operand, Expression::UnaryOp { .. }));
            }
            _ => panic!("Expected unary operation"),
        }
    }

    #[test]
    fn test_parenthesized_expression() {
        // (1 + 2) * 3 keeps the addition on the left
        let expr = parse_expression("(1 + 2) * 3").unwrap();
        match expr {
            Expression::BinOp { op, left, .. } => {
                assert_eq!(op, BinaryOperator::Multiply);
                assert!(matches!(
                    *left,
                    Expression::BinOp {
                        op: BinaryOperator::Add,
                        ..
                    }
                ));
            }
            _ => panic!("Expected binary operation"),
        }
    }

    #[test]
    fn test_unbalanced_begin_end() {
        let result = parse("PROGRAM P; BEGIN BEGIN END.");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("parse error"));
        assert!(err.to_string().contains("'END'") || err.to_string().contains("END"));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let result = parse("PROGRAM P; BEGIN END. extra");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }

    #[test]
    fn test_var_section_requires_a_declaration() {
        let err = parse("PROGRAM P; VAR BEGIN END.").unwrap_err();
        assert!(err.to_string().contains("an identifier"));
    }

    #[test]
    fn test_missing_statement_separator() {
        let result = parse("PROGRAM P; VAR a, b : INTEGER; BEGIN a := 1 b := 2 END.");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("expected ';'"));
    }

    #[test]
    fn test_lex_errors_surface_through_parse() {
        let result = parse("PROGRAM P; BEGIN a := @ END.");
        assert!(matches!(result, Err(Error::Lex(_))));
    }
}
