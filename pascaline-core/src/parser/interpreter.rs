//! Tree-walking interpreter
//!
//! Executes an analyzed program on a call stack of activation records.
//! Declarations are static information only; at run time a block is just its
//! compound statement. Variable reads and writes use the top activation
//! record only, so a nested procedure cannot see its lexical parent's
//! bindings at run time even though the analyzer accepted the reference
//! (flat-frame binding).

use crate::parser::analyzer::{Resolutions, SemanticAnalyzer};
use crate::parser::ast::{
    BinaryOperator, Block, CallId, Compound, Expression, Program, Statement, UnaryOperator, Value,
};
use crate::parser::callstack::{ActivationRecord, CallStack, RecordKind};
use crate::parser::error::{Error, RuntimeError, RuntimeErrorKind};
use crate::parser::parser::parse;

/// Integer division truncating toward the floor of the exact quotient,
/// so `-7 DIV 2` is `-4`, not `-3`
fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}

/// Apply a binary arithmetic operator to two values.
///
/// `+ - *` stay integral when both operands are integers and promote to real
/// otherwise. `DIV` coerces both operands to integers and takes the floor
/// quotient; `/` coerces both to reals regardless of declared types. A zero
/// divisor is a runtime error for both division operators.
pub fn eval_binary(left: Value, op: BinaryOperator, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOperator::Add => Ok(arith(left, right, |a, b| a + b, |a, b| a + b)),
        BinaryOperator::Subtract => Ok(arith(left, right, |a, b| a - b, |a, b| a - b)),
        BinaryOperator::Multiply => Ok(arith(left, right, |a, b| a * b, |a, b| a * b)),
        BinaryOperator::IntegerDiv => {
            let divisor = right.as_integer();
            if divisor == 0 {
                return Err(RuntimeError::new(RuntimeErrorKind::DivisionByZero));
            }
            Ok(Value::Integer(floor_div(left.as_integer(), divisor)))
        }
        BinaryOperator::RealDiv => {
            let divisor = right.as_real();
            if divisor == 0.0 {
                return Err(RuntimeError::new(RuntimeErrorKind::DivisionByZero));
            }
            Ok(Value::Real(left.as_real() / divisor))
        }
    }
}

fn arith(
    left: Value,
    right: Value,
    on_integers: fn(i64, i64) -> i64,
    on_reals: fn(f64, f64) -> f64,
) -> Value {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Value::Integer(on_integers(a, b)),
        _ => Value::Real(on_reals(left.as_real(), right.as_real())),
    }
}

/// Executes analyzed programs against a call stack
pub struct Interpreter {
    call_stack: CallStack,
    resolutions: Resolutions,
}

impl Interpreter {
    /// Create an interpreter from the analyzer's resolution table
    pub fn new(resolutions: Resolutions) -> Self {
        Interpreter {
            call_stack: CallStack::new(),
            resolutions,
        }
    }

    /// Read-only view of the call stack (for diagnostic dumps)
    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    /// Run a program to completion and return the popped global frame, whose
    /// bindings are the pipeline's observable result
    pub fn run_program(&mut self, program: &Program) -> Result<ActivationRecord, RuntimeError> {
        let record = ActivationRecord::new(&program.name, RecordKind::Program, 1);
        self.call_stack.push(record);

        self.execute_block(&program.block)?;

        Ok(self
            .call_stack
            .pop()
            .expect("program frame is still on the stack"))
    }

    /// Declarations are no-ops at run time; a block executes as its body
    fn execute_block(&mut self, block: &Block) -> Result<(), RuntimeError> {
        self.execute_compound(&block.body)
    }

    fn execute_compound(&mut self, compound: &Compound) -> Result<(), RuntimeError> {
        for statement in &compound.statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        match statement {
            Statement::Compound(compound) => self.execute_compound(compound),

            Statement::Assign { target, value } => {
                let value = self.eval(value)?;
                let frame = self
                    .call_stack
                    .peek_mut()
                    .expect("assignment outside any frame");
                frame.set(&target.name, value);
                Ok(())
            }

            Statement::ProcedureCall { id, name, args, .. } => self.execute_call(*id, name, args),

            Statement::NoOp => Ok(()),
        }
    }

    fn execute_call(
        &mut self,
        id: CallId,
        name: &str,
        args: &[Expression],
    ) -> Result<(), RuntimeError> {
        let proc_symbol = self
            .resolutions
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::UnresolvedCall(name.to_string())))?;
        let block = proc_symbol
            .block
            .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::UnresolvedCall(name.to_string())))?;

        let nesting_level = self
            .call_stack
            .peek()
            .map(|frame| frame.nesting_level() + 1)
            .unwrap_or(1);
        let mut record = ActivationRecord::new(name, RecordKind::Procedure, nesting_level);

        // Arguments are evaluated in the caller's frame, which is still on
        // top of the stack at this point
        for (param, arg) in proc_symbol.params.iter().zip(args) {
            let value = self.eval(arg)?;
            record.set(&param.name, value);
        }

        self.call_stack.push(record);
        self.execute_block(&block)?;
        self.call_stack.pop();
        Ok(())
    }

    /// Evaluate an expression in the context of the top activation record
    pub fn eval(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        match expression {
            Expression::Num(value) => Ok(*value),

            Expression::Var(var) => self
                .call_stack
                .peek()
                .and_then(|frame| frame.get(&var.name))
                .ok_or_else(|| {
                    RuntimeError::new(RuntimeErrorKind::UnboundVariable(var.name.clone()))
                }),

            Expression::BinOp { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                eval_binary(left, *op, right)
            }

            Expression::UnaryOp { op, operand } => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOperator::Plus => value,
                    UnaryOperator::Minus => -value,
                })
            }
        }
    }
}

/// Run the whole pipeline over source text and return the final global
/// frame: lex, parse, analyze, execute
pub fn interpret(source: &str) -> Result<ActivationRecord, Error> {
    let program = parse(source)?;
    let analysis = SemanticAnalyzer::analyze(&program)?;
    let mut interpreter = Interpreter::new(analysis.resolutions);
    Ok(interpreter.run_program(&program)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> ActivationRecord {
        interpret(source).unwrap()
    }

    #[test]
    fn test_floor_div() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(floor_div(-7, -2), 3);
        assert_eq!(floor_div(6, 3), 2);
    }

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        let frame = run("PROGRAM P; VAR a : INTEGER; BEGIN a := 2 + 3 * 4 END.");
        assert_eq!(frame.get("a"), Some(Value::Integer(14)));
    }

    #[test]
    fn test_mixed_arithmetic_promotes_to_real() {
        let frame = run("PROGRAM P; VAR x : REAL; BEGIN x := 1 + 0.5 END.");
        assert_eq!(frame.get("x"), Some(Value::Real(1.5)));
    }

    #[test]
    fn test_div_vs_slash() {
        let frame = run("PROGRAM P; VAR a : INTEGER; y : REAL; BEGIN a := 7 DIV 2; y := 7 / 2 END.");
        assert_eq!(frame.get("a"), Some(Value::Integer(3)));
        assert_eq!(frame.get("y"), Some(Value::Real(3.5)));
    }

    #[test]
    fn test_slash_is_real_even_on_integers() {
        let frame = run("PROGRAM P; VAR y : REAL; BEGIN y := 6 / 3 END.");
        assert_eq!(frame.get("y"), Some(Value::Real(2.0)));
    }

    #[test]
    fn test_div_floors_negative_quotients() {
        let frame = run("PROGRAM P; VAR a : INTEGER; BEGIN a := - 7 DIV 2 END.");
        // Unary minus binds tighter than DIV: (-7) DIV 2
        assert_eq!(frame.get("a"), Some(Value::Integer(-4)));
    }

    #[test]
    fn test_unary_minus_is_self_inverse() {
        let frame = run("PROGRAM P; VAR a, b : INTEGER; BEGIN a := 5; b := - - a END.");
        assert_eq!(frame.get("b"), Some(Value::Integer(5)));
    }

    #[test]
    fn test_division_by_zero_is_structured() {
        let err = interpret("PROGRAM P; VAR a : INTEGER; BEGIN a := 1 DIV 0 END.").unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(RuntimeError {
                kind: RuntimeErrorKind::DivisionByZero
            })
        ));

        let err = interpret("PROGRAM P; VAR y : REAL; BEGIN y := 1 / 0 END.").unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(RuntimeError {
                kind: RuntimeErrorKind::DivisionByZero
            })
        ));
    }

    #[test]
    fn test_procedure_call_binds_parameters() {
        // The body runs with x bound; its frame is discarded on return
        let frame = run(
            "PROGRAM P; VAR a : INTEGER; \
             PROCEDURE Foo(x : INTEGER); VAR y : INTEGER; BEGIN y := x + 1 END; \
             BEGIN a := 1; Foo(5) END.",
        );
        assert_eq!(frame.get("a"), Some(Value::Integer(1)));
        // y lived in Foo's frame, not the program frame
        assert_eq!(frame.get("y"), None);
    }

    #[test]
    fn test_flat_frames_hide_outer_bindings() {
        // Analysis accepts the outer reference; the flat-frame runtime does
        // not find it
        let err = interpret(
            "PROGRAM P; VAR a : INTEGER; \
             PROCEDURE Foo; VAR b : INTEGER; BEGIN b := a END; \
             BEGIN a := 1; Foo() END.",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(RuntimeError {
                kind: RuntimeErrorKind::UnboundVariable(ref name)
            }) if name == "a"
        ));
    }

    #[test]
    fn test_reading_unassigned_variable_fails() {
        let err = interpret("PROGRAM P; VAR a, b : INTEGER; BEGIN a := b END.").unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(RuntimeError {
                kind: RuntimeErrorKind::UnboundVariable(ref name)
            }) if name == "b"
        ));
    }

    #[test]
    fn test_unanalyzed_call_is_unresolved() {
        let program = parse(
            "PROGRAM P; PROCEDURE Foo; BEGIN END; BEGIN Foo() END.",
        )
        .unwrap();
        // Skip analysis on purpose: the resolution table stays empty
        let mut interpreter = Interpreter::new(Resolutions::default());
        let err = interpreter.run_program(&program).unwrap_err();
        assert!(matches!(err.kind, RuntimeErrorKind::UnresolvedCall(_)));
    }

    #[test]
    fn test_nested_compound_statements() {
        let frame = run(
            "PROGRAM P; VAR a, b : INTEGER; \
             BEGIN BEGIN a := 1; BEGIN b := a + 1 END END END.",
        );
        assert_eq!(frame.get("b"), Some(Value::Integer(2)));
    }

    #[test]
    fn test_program_frame_is_returned() {
        let frame = run("PROGRAM Part10; BEGIN END.");
        assert_eq!(frame.name(), "Part10");
        assert_eq!(frame.kind(), RecordKind::Program);
        assert_eq!(frame.nesting_level(), 1);
        assert!(frame.is_empty());
    }
}
