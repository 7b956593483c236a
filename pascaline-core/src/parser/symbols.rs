//! Symbols and the scoped symbol table
//!
//! The semantic analyzer records every declared name here and resolves every
//! reference against the chain of open scopes. Scopes exist only during
//! analysis; the interpreter never consults them.

use crate::parser::ast::{Block, TypeSpec};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A variable (or value parameter) symbol
#[derive(Debug, Clone, PartialEq)]
pub struct VarSymbol {
    pub name: String,
    pub var_type: TypeSpec,
}

impl fmt::Display for VarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.name, self.var_type)
    }
}

/// A procedure symbol. The body block is attached before the symbol is
/// inserted, so clones handed out by the resolution table are executable on
/// their own.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureSymbol {
    pub name: String,
    pub params: Vec<VarSymbol>,
    pub block: Option<Rc<Block>>,
}

impl fmt::Display for ProcedureSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", param.name, param.var_type)?;
        }
        write!(f, ")>")
    }
}

/// Symbol kinds stored in a scope
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    BuiltinType(TypeSpec),
    Variable(VarSymbol),
    Procedure(ProcedureSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::BuiltinType(t) => t.name(),
            Symbol::Variable(v) => &v.name,
            Symbol::Procedure(p) => &p.name,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::BuiltinType(t) => write!(f, "{}", t),
            Symbol::Variable(v) => write!(f, "{}", v),
            Symbol::Procedure(p) => write!(f, "{}", p),
        }
    }
}

/// One block's worth of declared names, in insertion order
#[derive(Debug, Clone)]
pub struct Scope {
    name: String,
    level: usize,
    symbols: HashMap<String, Symbol>,
    insertion_order: Vec<String>,
}

impl Scope {
    fn new(name: &str, level: usize) -> Self {
        Scope {
            name: name.to_string(),
            level,
            symbols: HashMap::new(),
            insertion_order: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Insert a symbol, overwriting any existing entry of the same name
    pub fn insert(&mut self, symbol: Symbol) {
        let name = symbol.name().to_string();
        if self.symbols.insert(name.clone(), symbol).is_none() {
            self.insertion_order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Symbols in insertion order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.symbols.get(name))
    }

    /// Render the scope as a diagnostic table, listing its name, level,
    /// enclosing scope name and contents
    pub fn render(&self, enclosing: Option<&str>) -> String {
        let header = "SCOPE (SCOPED SYMBOL TABLE)";
        let mut lines = vec![header.to_string(), "=".repeat(header.len())];
        lines.push(format!("{:<15}: {}", "Scope name", self.name));
        lines.push(format!("{:<15}: {}", "Scope level", self.level));
        lines.push(format!(
            "{:<15}: {}",
            "Enclosing scope",
            enclosing.unwrap_or("(none)")
        ));

        let contents = "Scope contents";
        lines.push(contents.to_string());
        lines.push("-".repeat(contents.len()));
        for symbol in self.symbols() {
            lines.push(format!("{:>9}: {}", symbol.name(), symbol));
        }

        lines.join("\n")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

/// A stack of scopes realizing lexical scoping: resolution starts at the
/// innermost open scope and walks outward, so inner declarations shadow
/// outer ones of the same name.
#[derive(Debug, Default)]
pub struct ScopedSymbolTable {
    scopes: Vec<Scope>,
}

impl ScopedSymbolTable {
    pub fn new() -> Self {
        ScopedSymbolTable { scopes: Vec::new() }
    }

    /// Open a new scope. The first scope opened is the global scope at
    /// level 1, pre-populated with the builtin type symbols.
    pub fn push_scope(&mut self, name: &str) {
        let level = self.scopes.len() + 1;
        let mut scope = Scope::new(name, level);
        if level == 1 {
            scope.insert(Symbol::BuiltinType(TypeSpec::Integer));
            scope.insert(Symbol::BuiltinType(TypeSpec::Real));
        }
        self.scopes.push(scope);
    }

    /// Close and return the innermost scope
    pub fn pop_scope(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Insert a symbol into the innermost open scope
    pub fn insert(&mut self, symbol: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(symbol);
        }
    }

    /// Resolve a name against the whole chain, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        for scope in self.scopes.iter().rev() {
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
        }
        None
    }

    /// Resolve a name in the innermost scope only (for redeclaration checks)
    pub fn lookup_in_current_scope(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    pub fn current_scope(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Number of open scopes (1 = global only)
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Render the innermost scope with its enclosing scope's name filled in
    pub fn render_current_scope(&self) -> Option<String> {
        let scope = self.scopes.last()?;
        let enclosing = self
            .scopes
            .len()
            .checked_sub(2)
            .and_then(|i| self.scopes.get(i))
            .map(|s| s.name());
        Some(scope.render(enclosing))
    }
}

impl fmt::Display for ScopedSymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scope) in self.scopes.iter().enumerate().rev() {
            let enclosing = i.checked_sub(1).and_then(|j| self.scopes.get(j));
            writeln!(f, "{}", scope.render(enclosing.map(|s| s.name())))?;
        }
        Ok(())
    }
}
