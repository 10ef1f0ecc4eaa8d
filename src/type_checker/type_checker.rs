use std::{cell::OnceCell, collections::HashMap, rc::Rc};

use tracing::debug;

use crate::{
    ast::{
        ast::{Node, NodeId, NodeKind},
        statements::{ClassDecl, FunctionDecl},
        types::{Builtin, ClassId, ClassRef, Type},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    modules::BuiltinModules,
    scope::{
        is_builtin_name, Decl, FunctionSignature, Param, ScopeId, ScopeType, Symbol, SymbolTable,
    },
};

/// A declared class.
///
/// The member table is filled exactly once, when the class body has been
/// analyzed. Until then members are read from the live class scope.
#[derive(Debug)]
pub struct ClassInfo {
    pub id: ClassId,
    pub name: String,
    pub node: NodeId,
    pub scope: Option<ScopeId>,
    members: OnceCell<HashMap<String, Symbol>>,
}

impl ClassInfo {
    fn new(id: ClassId, name: String, node: NodeId) -> Self {
        ClassInfo {
            id,
            name,
            node,
            scope: None,
            members: OnceCell::new(),
        }
    }

    pub fn class_ref(&self) -> ClassRef {
        ClassRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.members.get().is_some()
    }

    pub fn member<'a>(&'a self, name: &str, symbols: &'a SymbolTable) -> Option<&'a Symbol> {
        match self.members.get() {
            Some(members) => members.get(name),
            None => self.scope.and_then(|scope| symbols.scope(scope).get(name)),
        }
    }

    pub(super) fn freeze(&self, members: HashMap<String, Symbol>) {
        let frozen = self.members.set(members).is_ok();
        debug_assert!(frozen, "class '{}' frozen twice", self.name);
    }
}

/// The result of a successful analysis.
///
/// Every node of `root` carries its resolved type and the scope it was
/// analyzed in; `symbols` keeps all scopes alive for later lookups.
#[derive(Debug)]
pub struct AnnotatedAst {
    pub root: Node,
    pub symbols: SymbolTable,
    pub classes: Vec<ClassInfo>,
}

impl AnnotatedAst {
    /// The symbol an identifier was bound to during analysis, with the kind
    /// of scope that declared it.
    pub fn resolved(&self, node: &Node) -> Option<(ScopeType, &Symbol)> {
        let scope = self.symbols.scope(node.binding?);
        scope
            .get(node.identifier_name()?)
            .map(|symbol| (scope.kind, symbol))
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassInfo> {
        self.classes.get(id)
    }
}

/// Analyzes a parsed program against a fresh module scope.
///
/// Stops at the first error.
#[tracing::instrument(level = "debug", skip_all)]
pub fn analyze(mut root: Node, modules: &mut BuiltinModules) -> Result<AnnotatedAst, Error> {
    let mut symbols = SymbolTable::new();
    let mut analyzer = Analyzer::new(modules);

    analyzer.analyze_node(&mut root, &mut symbols)?;
    debug!(
        classes = analyzer.classes.len(),
        functions = analyzer.signatures.len(),
        "analysis finished"
    );

    Ok(AnnotatedAst {
        root,
        symbols,
        classes: analyzer.classes,
    })
}

pub struct Analyzer<'m> {
    pub(super) modules: &'m mut BuiltinModules,
    pub(super) classes: Vec<ClassInfo>,
    pub(super) signatures: HashMap<NodeId, Rc<FunctionSignature>>,
    pub(super) class_ids: HashMap<NodeId, ClassId>,
}

impl<'m> Analyzer<'m> {
    pub fn new(modules: &'m mut BuiltinModules) -> Self {
        Analyzer {
            modules,
            classes: Vec::new(),
            signatures: HashMap::new(),
            class_ids: HashMap::new(),
        }
    }

    /// Analyzes one node, recording its type and scope on success.
    pub fn analyze_node(&mut self, node: &mut Node, st: &mut SymbolTable) -> Result<Type, Error> {
        if matches!(node.kind, NodeKind::FormalArg(_) | NodeKind::FormalArgList(_)) {
            return self.check_loose_formal_args(node, st);
        }

        let position = node.position;
        let id = node.id;
        let mut binding = None;

        let ty = match &mut node.kind {
            NodeKind::Identifier(name) => {
                let (ty, scope) = self.check_identifier(name, position, st)?;
                binding = Some(scope);
                ty
            }
            NodeKind::IntegerLiteral(_) => self.builtin_type(Builtin::Integer64, position, st)?,
            NodeKind::StringLiteral(_) => self.builtin_type(Builtin::String, position, st)?,
            NodeKind::BooleanLiteral(_) => self.builtin_type(Builtin::Boolean, position, st)?,
            NodeKind::UnaryArithmetic { operand, .. } => self.analyze_node(operand, st)?,
            NodeKind::BinaryOp { op, left, right } => {
                self.check_binary(*op, left, right, position, st)?
            }
            NodeKind::BuiltinTypeRef(builtin) => Type::from(*builtin),
            NodeKind::Let(decl) => self.check_let(decl, id, position, st)?,
            NodeKind::StatementList(stmts) => self.check_statement_list(stmts, st)?,
            NodeKind::FunctionDecl(func) => self.check_function(func, id, position, st)?,
            NodeKind::Assignment { target, value } => {
                self.check_assignment(target, value, position, st)?
            }
            NodeKind::ClassDecl(class) => self.check_class(class, id, position, st)?,
            NodeKind::If(stmt) => self.check_if(stmt, position, st)?,
            NodeKind::While(stmt) => self.check_while(stmt, position, st)?,
            NodeKind::Import(name) => self.check_import(name, position, st)?,
            NodeKind::Return(value) => self.check_return(value, position, st)?,
            NodeKind::MemberAccess { left, right } => {
                self.check_member(left, right, position, st)?.ty
            }
            NodeKind::Call { callee, args } => self.check_call(callee, args, position, st)?,
            NodeKind::FormalArg(_) | NodeKind::FormalArgList(_) => Type::Null,
        };

        node.ty = Some(ty.clone());
        node.scope = Some(st.current_scope());
        node.binding = binding;
        Ok(ty)
    }

    /// Type of a builtin, looked up by name so the module scope must hold it.
    pub(super) fn builtin_type(
        &self,
        builtin: Builtin,
        position: Position,
        st: &SymbolTable,
    ) -> Result<Type, Error> {
        match st.get_symbol(builtin.name()).map(|symbol| &symbol.decl) {
            Some(Decl::BuiltinType(found)) => Ok(Type::from(*found)),
            _ => Err(Error::new(
                ErrorImpl::TypeNotFound {
                    name: builtin.name().to_string(),
                },
                position,
            )),
        }
    }

    /// Resolves a type annotation node and records the result on it.
    pub(super) fn resolve_type_node(
        &mut self,
        node: &mut Node,
        st: &SymbolTable,
    ) -> Result<Type, Error> {
        let ty = match &node.kind {
            NodeKind::BuiltinTypeRef(builtin) => Type::from(*builtin),
            NodeKind::Identifier(name) => self.resolve_type_name(name, node.position, st)?,
            _ => {
                return Err(Error::new(
                    ErrorImpl::NotAType {
                        name: node.to_string(),
                    },
                    node.position,
                ))
            }
        };

        node.ty = Some(ty.clone());
        node.scope = Some(st.current_scope());
        Ok(ty)
    }

    pub(super) fn resolve_type_name(
        &self,
        name: &str,
        position: Position,
        st: &SymbolTable,
    ) -> Result<Type, Error> {
        match st.get_symbol(name) {
            None => Err(Error::new(
                ErrorImpl::TypeNotFound {
                    name: name.to_string(),
                },
                position,
            )),
            Some(symbol) => match &symbol.decl {
                Decl::BuiltinType(builtin) => Ok(Type::from(*builtin)),
                Decl::Class(id) => Ok(Type::Object(ClassRef {
                    id: *id,
                    name: symbol.name.clone(),
                })),
                _ => Err(Error::new(
                    ErrorImpl::NotAType {
                        name: name.to_string(),
                    },
                    position,
                )),
            },
        }
    }

    /// Rejects builtin names and names already bound in the innermost scope.
    pub(super) fn check_declarable(
        &self,
        name: &str,
        position: Position,
        st: &SymbolTable,
    ) -> Result<(), Error> {
        if is_builtin_name(name) {
            return Err(Error::new(
                ErrorImpl::BuiltinOverride {
                    name: name.to_string(),
                },
                position,
            ));
        }

        if st.get_local(name).is_some() {
            return Err(Error::new(
                ErrorImpl::AlreadyInSymtab {
                    name: name.to_string(),
                },
                position,
            ));
        }

        Ok(())
    }

    /// Forward pass for one statement: hoists functions and classes.
    pub(super) fn declare_forward(&mut self, stmt: &Node, st: &mut SymbolTable) -> Result<(), Error> {
        match &stmt.kind {
            NodeKind::FunctionDecl(func) => {
                self.declare_function(func, stmt.id, stmt.position, st)?;
            }
            NodeKind::ClassDecl(class) => {
                self.declare_class(class, stmt.id, stmt.position, st)?;
            }
            _ => {}
        }
        Ok(())
    }

    pub(super) fn declare_function(
        &mut self,
        func: &FunctionDecl,
        id: NodeId,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Rc<FunctionSignature>, Error> {
        self.check_declarable(&func.name, position, st)?;

        let params = func
            .params()
            .iter()
            .filter_map(|arg| match &arg.kind {
                NodeKind::FormalArg(formal) => Some(Param {
                    name: formal.name.clone(),
                    type_name: type_name_of(&formal.ty),
                }),
                _ => None,
            })
            .collect();

        let signature = Rc::new(FunctionSignature {
            name: func.name.clone(),
            node: id,
            params,
            return_type_name: type_name_of(&func.return_type),
        });

        st.add_symbol(Symbol::new(
            func.name.clone(),
            Decl::Function(Rc::clone(&signature)),
            Type::Function,
        ));
        self.signatures.insert(id, Rc::clone(&signature));

        Ok(signature)
    }

    pub(super) fn declare_class(
        &mut self,
        class: &ClassDecl,
        id: NodeId,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<ClassId, Error> {
        let capitalized = class
            .name
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_uppercase());
        if !capitalized {
            return Err(Error::new(
                ErrorImpl::LowercaseClassName {
                    name: class.name.clone(),
                },
                position,
            ));
        }

        self.check_declarable(&class.name, position, st)?;

        let class_id = self.classes.len();
        self.classes
            .push(ClassInfo::new(class_id, class.name.clone(), id));
        self.class_ids.insert(id, class_id);

        st.add_symbol(Symbol::new(
            class.name.clone(),
            Decl::Class(class_id),
            Type::Class,
        ));

        Ok(class_id)
    }

    pub(super) fn class_member(&self, id: ClassId, name: &str, st: &SymbolTable) -> Option<Symbol> {
        self.classes.get(id)?.member(name, st).cloned()
    }
}

/// The textual type name written in an annotation.
pub(super) fn type_name_of(node: &Node) -> String {
    match &node.kind {
        NodeKind::BuiltinTypeRef(builtin) => builtin.name().to_string(),
        NodeKind::Identifier(name) => name.clone(),
        _ => node.to_string(),
    }
}

/// Dotted source name of an expression, for diagnostics.
pub fn path_name(node: &Node) -> String {
    match &node.kind {
        NodeKind::Identifier(name) => name.clone(),
        NodeKind::MemberAccess { left, right } => {
            format!("{}.{}", path_name(left), path_name(right))
        }
        _ => node.describe().to_string(),
    }
}
