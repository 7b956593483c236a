//! End-to-end pipeline tests over complete program sources

use pascaline_core::parser::{
    interpret, parse, Error, RuntimeErrorKind, SemanticAnalyzer, SemanticErrorKind, Value,
};

#[test]
fn test_arithmetic_program_end_to_end() {
    let frame = interpret(
        "PROGRAM P; VAR a, b : INTEGER; BEGIN a := 2; b := 10 * a + 10 * a DIV 4 END.",
    )
    .unwrap();

    assert_eq!(frame.get("a"), Some(Value::Integer(2)));
    assert_eq!(frame.get("b"), Some(Value::Integer(25)));
}

#[test]
fn test_part10_program() {
    let source = "\
PROGRAM Part10;
VAR
   number     : INTEGER;
   a, b, c, x : INTEGER;
   y          : REAL;

BEGIN {Part10}
   BEGIN
      number := 2;
      a := number;
      b := 10 * a + 10 * number DIV 4;
      c := a - - b
   END;
   x := 11;
   y := 20 / 7 + 3.14
END.  {Part10}
";
    let frame = interpret(source).unwrap();

    assert_eq!(frame.name(), "Part10");
    assert_eq!(frame.get("number"), Some(Value::Integer(2)));
    assert_eq!(frame.get("a"), Some(Value::Integer(2)));
    assert_eq!(frame.get("b"), Some(Value::Integer(25)));
    assert_eq!(frame.get("c"), Some(Value::Integer(27)));
    assert_eq!(frame.get("x"), Some(Value::Integer(11)));

    match frame.get("y") {
        Some(Value::Real(y)) => assert!((y - (20.0 / 7.0 + 3.14)).abs() < 1e-12),
        other => panic!("Expected real binding for y, got {:?}", other),
    }
}

#[test]
fn test_procedure_call_with_frame_scoped_bindings() {
    // The call itself succeeds (parameter binding works); the callee's local
    // never leaks into the program frame
    let frame = interpret(
        "PROGRAM P; \
         PROCEDURE Foo(x : INTEGER); VAR y : INTEGER; BEGIN y := x + 1 END; \
         BEGIN Foo(5) END.",
    )
    .unwrap();

    assert_eq!(frame.get("y"), None);
    assert!(frame.is_empty());
}

#[test]
fn test_nested_procedures_analyze_but_flat_frames_fail() {
    // The analyzer resolves z through the scope chain; the runtime's
    // top-frame-only lookup then misses it. This mismatch is deliberate.
    let source = "\
PROGRAM Main;
VAR z : INTEGER;

PROCEDURE AlphaA(a : INTEGER);
VAR b : INTEGER;

   PROCEDURE Beta(c : INTEGER);
   VAR y : INTEGER;
   BEGIN { Beta }
      y := c + z
   END;  { Beta }

BEGIN { AlphaA }
   b := a;
   Beta(b)
END;  { AlphaA }

BEGIN { Main }
   z := 7;
   AlphaA(3)
END.  { Main }
";
    let program = parse(source).unwrap();
    assert!(SemanticAnalyzer::analyze(&program).is_ok());

    let err = interpret(source).unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(ref e) if matches!(e.kind, RuntimeErrorKind::UnboundVariable(ref name) if name == "z")
    ));
}

#[test]
fn test_nested_procedure_runs_on_own_bindings() {
    // Same nesting, but the inner body only touches its own frame
    let source = "\
PROGRAM Main;
VAR z : INTEGER;

PROCEDURE AlphaA(a : INTEGER);
VAR b : INTEGER;

   PROCEDURE Beta(c : INTEGER);
   VAR y : INTEGER;
   BEGIN
      y := c + c
   END;

BEGIN
   b := a;
   Beta(b)
END;

BEGIN
   z := 7;
   AlphaA(3)
END.
";
    let frame = interpret(source).unwrap();
    assert_eq!(frame.get("z"), Some(Value::Integer(7)));
}

#[test]
fn test_duplicate_identifier_rejected() {
    let err = interpret("PROGRAM P; VAR a : INTEGER; a : REAL; BEGIN END.").unwrap_err();
    match err {
        Error::Semantic(e) => assert!(matches!(
            e.kind,
            SemanticErrorKind::DuplicateIdentifier(ref name) if name == "a"
        )),
        other => panic!("Expected semantic error, got {:?}", other),
    }
}

#[test]
fn test_arity_mismatch_rejected_before_execution() {
    let err = interpret(
        "PROGRAM P; VAR a : INTEGER; \
         PROCEDURE Foo(x : INTEGER); BEGIN END; \
         BEGIN a := 1; Foo(a, a) END.",
    )
    .unwrap_err();
    match err {
        Error::Semantic(e) => assert!(matches!(
            e.kind,
            SemanticErrorKind::ArityMismatch {
                expected: 1,
                found: 2,
                ..
            }
        )),
        other => panic!("Expected semantic error, got {:?}", other),
    }
}

#[test]
fn test_unbalanced_begin_end_is_parse_error() {
    let err = interpret("PROGRAM P; BEGIN BEGIN a := 1 END.").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().contains("parse error"));
}

#[test]
fn test_unknown_character_is_lex_error() {
    let err = interpret("PROGRAM P; BEGIN a ?= 1 END.").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
    assert!(err.to_string().contains("unexpected character '?'"));
}

#[test]
fn test_keywords_in_any_case() {
    let frame = interpret("program p; var A : integer; begin A := 1 end.").unwrap();
    // Identifier case is preserved even though keywords are case-insensitive
    assert_eq!(frame.get("A"), Some(Value::Integer(1)));
    assert_eq!(frame.get("a"), None);
}

#[test]
fn test_scope_trace_for_nested_program() {
    let source = "\
PROGRAM Main;
VAR x : REAL;
PROCEDURE AlphaA(a : INTEGER);
VAR b : INTEGER;
BEGIN
END;
PROCEDURE AlphaB(a : INTEGER);
VAR c : REAL;
BEGIN
END;
BEGIN
END.
";
    let program = parse(source).unwrap();
    let analysis = SemanticAnalyzer::analyze(&program).unwrap();

    // Two procedure scopes, then the global scope
    assert_eq!(analysis.scope_trace.len(), 3);
    assert!(analysis.scope_trace[0].contains("Scope name     : AlphaA"));
    assert!(analysis.scope_trace[1].contains("Scope name     : AlphaB"));
    assert!(analysis.scope_trace[1].contains("<c:REAL>"));
    assert!(analysis.scope_trace[2].contains("Scope name     : global"));
    assert!(analysis.scope_trace[2].contains("<x:REAL>"));
}
