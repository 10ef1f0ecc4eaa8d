//! Scope and symbol management for semantic analysis.
//!
//! Scopes live in an arena owned by the `SymbolTable`. A separate stack holds
//! the chain of scopes that are currently open. Leaving a scope pops it from
//! the stack but keeps the arena slot, so a `ScopeId` recorded on a node stays
//! valid for lookups after analysis has finished.

use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
    rc::Rc,
};

use tracing::trace;

use crate::ast::{
    ast::NodeId,
    types::{Builtin, ClassId, Type},
};

use super::modules::ModuleInfo;

/// Names that can never be declared or assigned by user code.
pub const BUILTIN_NAMES: [&str; 13] = [
    "and", "or", "not", "Boolean", "String", "Integer64", "Null", "null", "true", "false",
    "Function", "Class", "Module",
];

pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Unique identifier for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    Module,
    Func,
    Method,
    Class,
    /// Reserved for block-local scopes; `if` and `while` bodies share the
    /// enclosing function scope.
    Block,
}

/// What opened a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeOwner {
    None,
    Function(Rc<FunctionSignature>),
    Class(ClassId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn name(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
            LogicalOp::Not => "not",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            LogicalOp::Not => 1,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: String,
}

/// A function as seen by callers.
///
/// Types are kept by name and resolved where they are used, because calls may
/// be checked before the declaring function's own body has been analyzed.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub node: NodeId,
    pub params: Vec<Param>,
    pub return_type_name: String,
}

/// What declared a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    BuiltinType(Builtin),
    /// `null`
    BuiltinValue,
    LogicalOperator(LogicalOp),
    Variable(NodeId),
    Argument(NodeId),
    Function(Rc<FunctionSignature>),
    Class(ClassId),
    This(ClassId),
    Module(Rc<ModuleInfo>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub decl: Decl,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, decl: Decl, ty: Type) -> Self {
        Symbol {
            name: name.into(),
            decl,
            ty,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(
            self.decl,
            Decl::BuiltinType(_) | Decl::BuiltinValue | Decl::LogicalOperator(_)
        )
    }
}

/// A scope in the scope chain
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeType,
    pub parent: Option<ScopeId>,
    pub owner: ScopeOwner,
    /// Insertion ordered
    symbols: Vec<Symbol>,
    lookup: HashMap<String, usize>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeType, parent: Option<ScopeId>, owner: ScopeOwner) -> Self {
        Scope {
            id,
            kind,
            parent,
            owner,
            symbols: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.lookup.get(name).map(|&index| &self.symbols[index])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    fn insert(&mut self, symbol: Symbol) {
        match self.lookup.get(&symbol.name) {
            Some(&index) => self.symbols[index] = symbol,
            None => {
                self.lookup.insert(symbol.name.clone(), self.symbols.len());
                self.symbols.push(symbol);
            }
        }
    }
}

/// The stacked scopes of one compilation.
///
/// Never empty: the module scope is created with the table and is never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table holding one module scope with the builtin names bound.
    pub fn new() -> Self {
        let mut module = Scope::new(ScopeId(0), ScopeType::Module, None, ScopeOwner::None);

        for builtin in Builtin::ALL {
            module.insert(Symbol::new(
                builtin.name(),
                Decl::BuiltinType(builtin),
                Type::from(builtin),
            ));
        }
        module.insert(Symbol::new("null", Decl::BuiltinValue, Type::Null));
        for op in [LogicalOp::And, LogicalOp::Or, LogicalOp::Not] {
            module.insert(Symbol::new(op.name(), Decl::LogicalOperator(op), Type::Function));
        }

        SymbolTable {
            scopes: vec![module],
            stack: vec![ScopeId(0)],
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }

    fn current(&self) -> &Scope {
        &self.scopes[self.current_scope().0]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Binds `symbol` in the innermost scope.
    ///
    /// Uniqueness is not checked here; callers look first.
    pub fn add_symbol(&mut self, symbol: Symbol) {
        let current = self.current_scope();
        trace!(name = %symbol.name, scope = current.0, "add symbol");
        self.scopes[current.0].insert(symbol);
    }

    /// Searches the open scopes from innermost to outermost.
    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.resolve(name).map(|(_, symbol)| symbol)
    }

    /// Like `get_symbol`, also naming the scope that holds the binding.
    pub fn resolve(&self, name: &str) -> Option<(ScopeId, &Symbol)> {
        self.stack
            .iter()
            .rev()
            .find_map(|&id| self.scopes[id.0].get(name).map(|symbol| (id, symbol)))
    }

    /// Searches the innermost scope only.
    pub fn get_local(&self, name: &str) -> Option<&Symbol> {
        self.current().get(name)
    }

    /// Pushes a new scope; it is popped when the returned guard drops.
    pub fn enter_scope(&mut self, kind: ScopeType, owner: ScopeOwner) -> ScopeGuard<'_> {
        let id = ScopeId(self.scopes.len());
        let parent = self.current_scope();
        self.scopes.push(Scope::new(id, kind, Some(parent), owner));
        self.stack.push(id);
        trace!(scope = id.0, ?kind, depth = self.stack.len(), "enter scope");

        ScopeGuard { table: self, id }
    }

    pub fn get_scope_type(&self) -> ScopeType {
        self.current().kind
    }

    pub fn get_scope_stmt(&self) -> &ScopeOwner {
        &self.current().owner
    }

    /// Snapshot of the innermost scope's bindings.
    pub fn get_symbols(&self) -> Vec<Symbol> {
        self.current().symbols.clone()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn exit_scope(&mut self, id: ScopeId) {
        if self.stack.len() > 1 && self.stack.last() == Some(&id) {
            self.stack.pop();
            trace!(scope = id.0, depth = self.stack.len(), "exit scope");
        }
    }
}

/// Keeps one scope open; derefs to the table it was opened on.
pub struct ScopeGuard<'a> {
    table: &'a mut SymbolTable,
    id: ScopeId,
}

impl ScopeGuard<'_> {
    pub fn id(&self) -> ScopeId {
        self.id
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = SymbolTable;

    fn deref(&self) -> &Self::Target {
        self.table
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.table
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.table.exit_scope(self.id);
    }
}
