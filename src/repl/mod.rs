//! REPL (Read-Eval-Print Loop) for Pascaline arithmetic
//!
//! An interactive calculator over the core expression grammar: integer and
//! real literals, `+ - * / DIV`, unary signs and parentheses. Expressions
//! are parsed with the same lexer and recursive descent rules as full
//! programs and folded to a value directly, so `7 DIV 2` and `7 / 2` behave
//! exactly as they do inside a program.

use anyhow::{bail, Result};
use colored::*;
use pascaline_core::parser::{eval_binary, parse_expression, Expression, UnaryOperator, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Interactive arithmetic REPL
pub struct Repl {
    editor: DefaultEditor,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new() -> Result<Self> {
        Ok(Repl {
            editor: DefaultEditor::new()?,
        })
    }

    /// Run the read-eval-print loop until :quit or end of input
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "Pascaline calculator".bold());
        println!("Type an arithmetic expression, :help for help, :quit to leave.");

        loop {
            match self.editor.readline("calc> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    match line {
                        ":quit" | ":q" => break,
                        ":help" | ":h" => {
                            println!("Operators: + - * / DIV, unary + -, parentheses.");
                            println!("DIV is floor integer division; / always yields a real.");
                            continue;
                        }
                        _ => {}
                    }

                    match eval_line(line) {
                        Ok(value) => println!("{}", value.to_string().cyan()),
                        Err(err) => eprintln!("{}", err.to_string().red()),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

/// Parse and evaluate a single expression line
pub fn eval_line(input: &str) -> Result<Value> {
    let expr = parse_expression(input)?;
    eval_expression(&expr)
}

/// Constant-fold an expression. The calculator has no variables, so any
/// identifier is an error.
fn eval_expression(expr: &Expression) -> Result<Value> {
    match expr {
        Expression::Num(value) => Ok(*value),

        Expression::Var(var) => {
            bail!("unknown name '{}': the calculator has no variables", var.name)
        }

        Expression::BinOp { left, op, right } => {
            let left = eval_expression(left)?;
            let right = eval_expression(right)?;
            Ok(eval_binary(left, *op, right)?)
        }

        Expression::UnaryOp { op, operand } => {
            let value = eval_expression(operand)?;
            Ok(match op {
                UnaryOperator::Plus => value,
                UnaryOperator::Minus => -value,
            })
        }
    }
}
