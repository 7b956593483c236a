//! Runtime call stack
//!
//! Execution state is a LIFO stack of activation records; the top record is
//! the currently executing frame. Variable reads and writes go through the
//! top record only (flat-frame binding), never through enclosing records.

use crate::parser::ast::Value;
use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "colored")]
use colored::Colorize;

/// Whether a frame belongs to the program body or a procedure invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Program,
    Procedure,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Program => write!(f, "PROGRAM"),
            RecordKind::Procedure => write!(f, "PROCEDURE"),
        }
    }
}

/// Runtime bindings for one invocation of a program or procedure body
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRecord {
    name: String,
    kind: RecordKind,
    nesting_level: usize,
    members: HashMap<String, Value>,
    insertion_order: Vec<String>,
}

impl ActivationRecord {
    pub fn new(name: &str, kind: RecordKind, nesting_level: usize) -> Self {
        ActivationRecord {
            name: name.to_string(),
            kind,
            nesting_level,
            members: HashMap::new(),
            insertion_order: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn nesting_level(&self) -> usize {
        self.nesting_level
    }

    /// Bind a name, overwriting any previous value
    pub fn set(&mut self, name: &str, value: Value) {
        if self.members.insert(name.to_string(), value).is_none() {
            self.insertion_order.push(name.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.members.get(name).copied()
    }

    /// Bindings in the order they were first written
    pub fn members(&self) -> impl Iterator<Item = (&str, Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.members.get(name).map(|v| (name.as_str(), *v)))
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

#[cfg(feature = "colored")]
impl fmt::Display for ActivationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} {}",
            self.nesting_level,
            self.kind.to_string().bold(),
            self.name.cyan()
        )?;
        for (name, value) in self.members() {
            writeln!(f, "   {:<20}: {}", name, value)?;
        }
        Ok(())
    }
}

// Plain Display impl for hosts built without terminal coloring
#[cfg(not(feature = "colored"))]
impl fmt::Display for ActivationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} {}", self.nesting_level, self.kind, self.name)?;
        for (name, value) in self.members() {
            writeln!(f, "   {:<20}: {}", name, value)?;
        }
        Ok(())
    }
}

/// LIFO stack of activation records
#[derive(Debug, Default)]
pub struct CallStack {
    records: Vec<ActivationRecord>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ActivationRecord) {
        self.records.push(record);
    }

    pub fn pop(&mut self) -> Option<ActivationRecord> {
        self.records.pop()
    }

    /// The currently executing frame
    pub fn peek(&self) -> Option<&ActivationRecord> {
        self.records.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut ActivationRecord> {
        self.records.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CALL STACK")?;
        for record in self.records.iter().rev() {
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}
