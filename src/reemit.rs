//! Source-to-source re-emitter
//!
//! A demonstration pass that prints a parsed program back out with every
//! declared name suffixed by the nesting level of the scope it is used in,
//! and every variable reference expanded to `<name+level:TYPE>`. It drives
//! the same scoped symbol table as the semantic analyzer, so it also catches
//! duplicate declarations and unresolved references while it walks.

use pascaline_core::parser::ast::{
    Block, Compound, Declaration, Expression, ProcedureDecl, Program, Statement, Var, VarDecl,
};
use pascaline_core::parser::error::{SemanticError, SemanticErrorKind};
use pascaline_core::parser::symbols::{ProcedureSymbol, ScopedSymbolTable, Symbol, VarSymbol};
use std::rc::Rc;

/// Re-emit a parsed program with scope-decorated names
pub fn reemit(program: &Program) -> Result<String, SemanticError> {
    let mut emitter = Reemitter::new();
    emitter.visit_program(program)?;
    Ok(emitter.lines.join("\n"))
}

/// Walks a program, collecting decorated source lines
struct Reemitter {
    scopes: ScopedSymbolTable,
    lines: Vec<String>,
}

impl Reemitter {
    fn new() -> Self {
        Reemitter {
            scopes: ScopedSymbolTable::new(),
            lines: Vec::new(),
        }
    }

    /// Current scope nesting level; the walk keeps at least the global
    /// scope open while visiting
    fn level(&self) -> usize {
        self.scopes.current_scope().map(|s| s.level()).unwrap_or(1)
    }

    fn indent(&self, depth: usize) -> String {
        "\t".repeat(depth)
    }

    fn visit_program(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.scopes.push_scope("global");
        self.lines.push(format!("program {};", program.name));

        self.visit_block(&program.block)?;

        self.lines.push(format!("end. {{END OF {}}}", program.name));
        self.scopes.pop_scope();
        Ok(())
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), SemanticError> {
        for declaration in &block.declarations {
            match declaration {
                Declaration::Var(decl) => self.visit_var_decl(decl)?,
                Declaration::Procedure(decl) => self.visit_procedure_decl(decl)?,
            }
        }

        let indent = self.indent(self.level() - 1);
        self.lines.push(format!("{}begin", indent));
        self.visit_compound(&block.body)
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) -> Result<(), SemanticError> {
        if self.scopes.lookup_in_current_scope(&decl.name).is_some() {
            return Err(SemanticError::new(
                SemanticErrorKind::DuplicateIdentifier(decl.name.clone()),
                decl.pos,
            ));
        }

        let level = self.level();
        self.scopes.insert(Symbol::Variable(VarSymbol {
            name: decl.name.clone(),
            var_type: decl.type_spec,
        }));

        let indent = self.indent(level);
        self.lines.push(format!(
            "{}var {}{} : {};",
            indent, decl.name, level, decl.type_spec
        ));
        Ok(())
    }

    fn visit_procedure_decl(&mut self, decl: &ProcedureDecl) -> Result<(), SemanticError> {
        let params: Vec<VarSymbol> = decl
            .params
            .iter()
            .map(|p| VarSymbol {
                name: p.name.clone(),
                var_type: p.type_spec,
            })
            .collect();

        self.scopes.insert(Symbol::Procedure(ProcedureSymbol {
            name: decl.name.clone(),
            params: params.clone(),
            block: Some(Rc::clone(&decl.block)),
        }));

        self.scopes.push_scope(&decl.name);
        let level = self.level();
        let mut rendered = Vec::with_capacity(params.len());
        for param in params {
            rendered.push(format!("{}{} : {}", param.name, level, param.var_type));
            self.scopes.insert(Symbol::Variable(param));
        }

        // Procedure names carry the level of the scope they are declared in
        let decorated = format!("{}{}", decl.name, level - 1);
        let indent = self.indent(level - 1);
        self.lines.push(format!(
            "{}procedure {}({});",
            indent,
            decorated,
            rendered.join(", ")
        ));

        self.visit_block(&decl.block)?;

        self.lines
            .push(format!("{}end; {{END OF {}}}", indent, decorated));
        self.scopes.pop_scope();
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
                let value = self.visit_expression(value)?;
                let target = self.visit_var(target)?;
                let indent = self.indent(self.level());
                self.lines.push(format!("{}{} := {};", indent, target, value));
                Ok(())
            }

            Statement::ProcedureCall { name, args, .. } => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.visit_expression(arg)?);
                }
                let indent = self.indent(self.level());
                self.lines
                    .push(format!("{}{}({});", indent, name, rendered.join(", ")));
                Ok(())
            }

            Statement::NoOp => Ok(()),
        }
    }

    fn visit_var(&mut self, var: &Var) -> Result<String, SemanticError> {
        let level = self.level();
        match self.scopes.lookup(&var.name) {
            Some(Symbol::Variable(v)) => {
                Ok(format!("<{}{}:{}>", var.name, level, v.var_type))
            }
            Some(_) => Ok(format!("<{}{}>", var.name, level)),
            None => Err(SemanticError::new(
                SemanticErrorKind::IdentifierNotFound(var.name.clone()),
                var.pos,
            )),
        }
    }

    fn visit_expression(&mut self, expression: &Expression) -> Result<String, SemanticError> {
        match expression {
            Expression::Num(value) => Ok(value.to_string()),
            Expression::Var(var) => self.visit_var(var),
            Expression::BinOp { left, op, right } => {
                let left = self.visit_expression(left)?;
                let right = self.visit_expression(right)?;
                Ok(format!("{} {} {}", left, op, right))
            }
            Expression::UnaryOp { op, operand } => {
                let operand = self.visit_expression(operand)?;
                Ok(format!("{}{}", op, operand))
            }
        }
    }
}
