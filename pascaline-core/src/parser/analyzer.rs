//! Semantic analysis
//!
//! A single depth-first walk over the AST that builds the scope chain and
//! validates it in one pass: every identifier reference must resolve, no
//! name may be declared twice in the same scope, and every procedure call
//! must match its declaration's arity. The first violation aborts analysis.
//!
//! The walk leaves the AST untouched. Resolved procedure metadata is
//! recorded in a [`Resolutions`] table keyed by call-site id, which the
//! interpreter consults at execution time.

use crate::parser::ast::{
    Block, CallId, Compound, Declaration, Expression, Program, ProcedureDecl, Statement, TypeSpec,
    Var, VarDecl,
};
use crate::parser::error::{SemanticError, SemanticErrorKind};
use crate::parser::lexer::Position;
use crate::parser::symbols::{ProcedureSymbol, ScopedSymbolTable, Symbol, VarSymbol};
use std::collections::HashMap;
use std::rc::Rc;

/// Resolved procedure metadata for every call site in a program
#[derive(Debug, Clone, Default)]
pub struct Resolutions {
    procedures: HashMap<CallId, ProcedureSymbol>,
}

impl Resolutions {
    fn record(&mut self, id: CallId, symbol: ProcedureSymbol) {
        self.procedures.insert(id, symbol);
    }

    pub fn get(&self, id: CallId) -> Option<&ProcedureSymbol> {
        self.procedures.get(&id)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

/// Everything analysis produces for downstream consumers
#[derive(Debug)]
pub struct Analysis {
    /// Call-site id to resolved procedure symbol
    pub resolutions: Resolutions,
    /// Rendered symbol-table dump of each scope, captured as the walk left
    /// it (innermost scopes first). Hosts decide whether to print these.
    pub scope_trace: Vec<String>,
}

/// Walks a parsed program, building and validating the scope chain
pub struct SemanticAnalyzer {
    scopes: ScopedSymbolTable,
    resolutions: Resolutions,
    scope_trace: Vec<String>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            scopes: ScopedSymbolTable::new(),
            resolutions: Resolutions::default(),
            scope_trace: Vec::new(),
        }
    }

    /// Analyze a program, returning the resolution table and scope trace
    pub fn analyze(program: &Program) -> Result<Analysis, SemanticError> {
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.visit_program(program)?;

        Ok(Analysis {
            resolutions: analyzer.resolutions,
            scope_trace: analyzer.scope_trace,
        })
    }

    fn visit_program(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.scopes.push_scope("global");
        self.visit_block(&program.block)?;
        self.leave_scope();
        Ok(())
    }

    /// Capture the dump of the innermost scope, then close it
    fn leave_scope(&mut self) {
        if let Some(dump) = self.scopes.render_current_scope() {
            self.scope_trace.push(dump);
        }
        self.scopes.pop_scope();
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), SemanticError> {
        for declaration in &block.declarations {
            match declaration {
                Declaration::Var(decl) => self.visit_var_decl(decl)?,
                Declaration::Procedure(decl) => self.visit_procedure_decl(decl)?,
            }
        }
        self.visit_compound(&block.body)
    }

    /// Resolve a type name against the scope chain
    fn resolve_type(&self, spec: TypeSpec, pos: Position) -> Result<TypeSpec, SemanticError> {
        match self.scopes.lookup(spec.name()) {
            Some(Symbol::BuiltinType(t)) => Ok(*t),
            _ => Err(SemanticError::new(
                SemanticErrorKind::IdentifierNotFound(spec.name().to_string()),
                pos,
            )),
        }
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) -> Result<(), SemanticError> {
        let var_type = self.resolve_type(decl.type_spec, decl.pos)?;

        // Redeclaration is only an error within the same scope; shadowing an
        // outer declaration is fine
        if self.scopes.lookup_in_current_scope(&decl.name).is_some() {
            return Err(SemanticError::new(
                SemanticErrorKind::DuplicateIdentifier(decl.name.clone()),
                decl.pos,
            ));
        }

        self.scopes.insert(Symbol::Variable(VarSymbol {
            name: decl.name.clone(),
            var_type,
        }));
        Ok(())
    }

    fn visit_procedure_decl(&mut self, decl: &ProcedureDecl) -> Result<(), SemanticError> {
        // Parameter types resolve against builtins in the global scope, so
        // resolving them here (before the procedure scope opens) sees the
        // same symbols the body will
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let var_type = self.resolve_type(param.type_spec, param.pos)?;
            params.push(VarSymbol {
                name: param.name.clone(),
                var_type,
            });
        }

        // The complete symbol (params and body attached) goes into the
        // enclosing scope first, so calls inside the body resolve to an
        // executable symbol with the right arity
        let proc_symbol = ProcedureSymbol {
            name: decl.name.clone(),
            params: params.clone(),
            block: Some(Rc::clone(&decl.block)),
        };
        self.scopes.insert(Symbol::Procedure(proc_symbol));

        self.scopes.push_scope(&decl.name);
        for param in params {
            self.scopes.insert(Symbol::Variable(param));
        }
        self.visit_block(&decl.block)?;
        self.leave_scope();
        Ok(())
    }

    fn visit_compound(&mut self, compound: &Compound) -> Result<(), SemanticError> {
        for statement in &compound.statements {
            self.visit_statement(statement)?;
        }
        Ok(())
    }

    fn visit_statement(&mut self, statement: &Statement) -> Result<(), SemanticError> {
        match statement {
            Statement::Compound(compound) => self.visit_compound(compound),
            Statement::Assign { target, value } => {
                self.visit_expression(value)?;
                self.visit_var(target)
            }
            Statement::ProcedureCall {
                id,
                name,
                args,
                pos,
            } => self.visit_procedure_call(*id, name, args, *pos),
            Statement::NoOp => Ok(()),
        }
    }

    fn visit_procedure_call(
        &mut self,
        id: CallId,
        name: &str,
        args: &[Expression],
        pos: Position,
    ) -> Result<(), SemanticError> {
        let proc_symbol = match self.scopes.lookup(name) {
            Some(Symbol::Procedure(p)) => p.clone(),
            _ => {
                return Err(SemanticError::new(
                    SemanticErrorKind::IdentifierNotFound(name.to_string()),
                    pos,
                ))
            }
        };

        // Arity is checked before the arguments are analyzed
        if proc_symbol.params.len() != args.len() {
            return Err(SemanticError::new(
                SemanticErrorKind::ArityMismatch {
                    name: name.to_string(),
                    expected: proc_symbol.params.len(),
                    found: args.len(),
                },
                pos,
            ));
        }

        for arg in args {
            self.visit_expression(arg)?;
        }

        self.resolutions.record(id, proc_symbol);
        Ok(())
    }

    fn visit_var(&mut self, var: &Var) -> Result<(), SemanticError> {
        if self.scopes.lookup(&var.name).is_none() {
            return Err(SemanticError::new(
                SemanticErrorKind::IdentifierNotFound(var.name.clone()),
                var.pos,
            ));
        }
        Ok(())
    }

    fn visit_expression(&mut self, expression: &Expression) -> Result<(), SemanticError> {
        match expression {
            Expression::Num(_) => Ok(()),
            Expression::Var(var) => self.visit_var(var),
            Expression::BinOp { left, right, .. } => {
                self.visit_expression(left)?;
                self.visit_expression(right)
            }
            Expression::UnaryOp { operand, .. } => self.visit_expression(operand),
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
