use std::{collections::HashMap, rc::Rc};

use tracing::trace;

use crate::{
    ast::{
        ast::{Node, NodeId, NodeKind},
        statements::{ClassDecl, FunctionDecl, IfStmt, LetDecl, WhileStmt},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    scope::{is_builtin_name, Decl, ScopeOwner, ScopeType, Symbol, SymbolTable},
    type_checker::{path_name, type_name_of, Analyzer},
};

fn not_allowed(statement: &str, position: Position) -> Error {
    Error::new(
        ErrorImpl::StatementNotAllowed {
            statement: statement.to_string(),
        },
        position,
    )
}

fn clashes_with_class(class: &str, position: Position) -> Error {
    Error::new(
        ErrorImpl::AlreadyInSymtab {
            name: class.to_string(),
        },
        position,
    )
}

fn is_outside_function(st: &SymbolTable) -> bool {
    matches!(st.get_scope_type(), ScopeType::Module | ScopeType::Class)
}

impl Analyzer<'_> {
    /// Hoists the functions and classes of a block, then analyzes it in order.
    pub(super) fn check_statement_list(
        &mut self,
        stmts: &mut [Node],
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        for stmt in stmts.iter() {
            self.declare_forward(stmt, st)?;
        }

        for stmt in stmts.iter_mut() {
            self.analyze_node(stmt, st)?;
        }

        Ok(Type::Null)
    }

    pub(super) fn check_let(
        &mut self,
        decl: &mut LetDecl,
        id: NodeId,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        self.check_declarable(&decl.name, position, st)?;

        let explicit = match &mut decl.explicit_type {
            Some(type_node) => {
                let ty = self.resolve_type_node(type_node, st)?;
                if ty.is_null() {
                    return Err(Error::new(
                        ErrorImpl::NullTypeDesignation,
                        type_node.position,
                    ));
                }
                Some(ty)
            }
            None => None,
        };

        let initial = match &mut decl.initializer {
            Some(init) => {
                let ty = self.analyze_node(init, st)?;
                if ty.is_null() {
                    return Err(Error::new(ErrorImpl::NullInitializer, init.position));
                }
                Some(ty)
            }
            None => None,
        };

        let ty = match (explicit, initial) {
            (Some(explicit), Some(initial)) => {
                if !initial.same_as(&explicit) {
                    return Err(Error::new(
                        ErrorImpl::InitializerTypeMismatch {
                            init: initial.name().to_string(),
                            explicit: explicit.name().to_string(),
                        },
                        position,
                    ));
                }
                explicit
            }
            (Some(ty), None) | (None, Some(ty)) => ty,
            // The parser rejects a let with neither
            (None, None) => Type::Null,
        };

        st.add_symbol(Symbol::new(
            decl.name.clone(),
            Decl::Variable(id),
            ty.clone(),
        ));

        Ok(ty)
    }

    pub(super) fn check_function(
        &mut self,
        func: &mut FunctionDecl,
        id: NodeId,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        let signature = match self.signatures.get(&id) {
            Some(signature) => Rc::clone(signature),
            None => self.declare_function(func, id, position, st)?,
        };
        trace!(function = %func.name, "checking function");

        let return_type = self
            .resolve_type_node(&mut func.return_type, st)
            .map_err(|error| {
                Error::new(
                    ErrorImpl::ReturnTypeNotFound {
                        type_name: signature.return_type_name.clone(),
                        function: func.name.clone(),
                    },
                    *error.get_position(),
                )
            })?;

        let kind = if st.get_scope_type() == ScopeType::Class {
            ScopeType::Method
        } else {
            ScopeType::Func
        };

        {
            let mut scope = st.enter_scope(kind, ScopeOwner::Function(Rc::clone(&signature)));
            self.check_formal_args(&mut func.args, &func.name, &mut scope)?;
            self.analyze_node(&mut func.body, &mut scope)?;
        }

        let returns = func
            .statements()
            .iter()
            .any(|stmt| matches!(stmt.kind, NodeKind::Return(_)));
        if !return_type.is_null() && !returns {
            return Err(Error::new(
                ErrorImpl::MissingReturn {
                    function: func.name.clone(),
                },
                position,
            ));
        }

        Ok(Type::Function)
    }

    pub(super) fn check_formal_args(
        &mut self,
        args: &mut Node,
        function: &str,
        st: &mut SymbolTable,
    ) -> Result<(), Error> {
        if let NodeKind::FormalArgList(list) = &mut args.kind {
            for arg in list.iter_mut() {
                self.check_formal_arg(arg, function, st)?;
            }
        }

        args.ty = Some(Type::Null);
        args.scope = Some(st.current_scope());
        Ok(())
    }

    fn check_formal_arg(
        &mut self,
        arg: &mut Node,
        function: &str,
        st: &mut SymbolTable,
    ) -> Result<(), Error> {
        let NodeKind::FormalArg(formal) = &mut arg.kind else {
            return Ok(());
        };

        if st.get_local(&formal.name).is_some() {
            return Err(Error::new(
                ErrorImpl::DuplicateArgument {
                    name: formal.name.clone(),
                    function: function.to_string(),
                },
                arg.position,
            ));
        }
        if is_builtin_name(&formal.name) {
            return Err(Error::new(
                ErrorImpl::BuiltinOverride {
                    name: formal.name.clone(),
                },
                arg.position,
            ));
        }

        let type_name = type_name_of(&formal.ty);
        let ty = self
            .resolve_type_node(&mut formal.ty, st)
            .map_err(|error| {
                Error::new(
                    ErrorImpl::ArgumentTypeNotFound {
                        type_name,
                        argument: formal.name.clone(),
                        function: function.to_string(),
                    },
                    *error.get_position(),
                )
            })?;

        st.add_symbol(Symbol::new(
            formal.name.clone(),
            Decl::Argument(arg.id),
            ty.clone(),
        ));

        arg.ty = Some(ty);
        arg.scope = Some(st.current_scope());
        Ok(())
    }

    /// Formal arguments reached without their function, e.g. when a caller
    /// analyzes a subtree directly. They bind into the current scope.
    pub(super) fn check_loose_formal_args(
        &mut self,
        node: &mut Node,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        let function = match st.get_scope_stmt() {
            ScopeOwner::Function(signature) => signature.name.clone(),
            _ => String::new(),
        };

        if matches!(node.kind, NodeKind::FormalArg(_)) {
            self.check_formal_arg(node, &function, st)?;
        } else {
            self.check_formal_args(node, &function, st)?;
        }

        Ok(node.ty.clone().unwrap_or(Type::Null))
    }

    pub(super) fn check_class(
        &mut self,
        class: &mut ClassDecl,
        id: NodeId,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        let class_id = match self.class_ids.get(&id) {
            Some(&class_id) => class_id,
            None => self.declare_class(class, id, position, st)?,
        };
        let Some(class_ref) = self.classes.get(class_id).map(|info| info.class_ref()) else {
            return Ok(Type::Class);
        };

        let mut scope = st.enter_scope(ScopeType::Class, ScopeOwner::Class(class_id));
        let scope_id = scope.id();
        if let Some(info) = self.classes.get_mut(class_id) {
            info.scope = Some(scope_id);
        }
        scope.add_symbol(Symbol::new(
            "this",
            Decl::This(class_id),
            Type::Object(class_ref),
        ));

        if let NodeKind::StatementList(stmts) = &mut class.body.kind {
            for stmt in stmts.iter() {
                if let NodeKind::FunctionDecl(func) = &stmt.kind {
                    if func.name == class.name {
                        return Err(clashes_with_class(&class.name, stmt.position));
                    }
                }
                self.declare_forward(stmt, &mut scope)?;
            }

            for stmt in stmts.iter_mut() {
                match &stmt.kind {
                    NodeKind::If(_)
                    | NodeKind::While(_)
                    | NodeKind::Return(_)
                    | NodeKind::Assignment { .. }
                    | NodeKind::Call { .. } => {
                        return Err(Error::new(
                            ErrorImpl::StatementNotAllowedInClass,
                            stmt.position,
                        ))
                    }
                    NodeKind::Let(decl) if decl.name == class.name => {
                        return Err(clashes_with_class(&class.name, stmt.position))
                    }
                    _ => {}
                }
                self.analyze_node(stmt, &mut scope)?;
            }
        }

        let members: HashMap<String, Symbol> = scope
            .get_symbols()
            .into_iter()
            .filter(|symbol| !matches!(symbol.decl, Decl::This(_)))
            .map(|symbol| (symbol.name.clone(), symbol))
            .collect();
        if let Some(info) = self.classes.get(class_id) {
            info.freeze(members);
        }

        class.body.ty = Some(Type::Null);
        class.body.scope = Some(scope_id);

        Ok(Type::Class)
    }

    pub(super) fn check_assignment(
        &mut self,
        target: &mut Node,
        value: &mut Node,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        if is_outside_function(st) {
            return Err(not_allowed("Assignment", position));
        }

        if matches!(target.kind, NodeKind::BooleanLiteral(_)) {
            return Err(Error::new(ErrorImpl::AssignToBooleanLiteral, target.position));
        }

        if let Some(name) = target.identifier_name() {
            if st.get_symbol(name).is_some_and(Symbol::is_builtin) {
                return Err(Error::new(
                    ErrorImpl::BuiltinOverride {
                        name: name.to_string(),
                    },
                    target.position,
                ));
            }
        }

        let left = self.analyze_node(target, st)?;
        let right = self.analyze_node(value, st)?;

        if matches!(left, Type::Module) {
            return Err(Error::new(
                ErrorImpl::ModuleOverride {
                    name: path_name(target),
                },
                target.position,
            ));
        }

        if !left.same_as(&right) {
            return Err(Error::new(
                ErrorImpl::AssignmentTypeMismatch {
                    left: left.name().to_string(),
                    right: right.name().to_string(),
                },
                position,
            ));
        }

        Ok(left)
    }

    fn check_condition(
        &mut self,
        condition: &mut Node,
        statement: &str,
        st: &mut SymbolTable,
    ) -> Result<(), Error> {
        let ty = self.analyze_node(condition, st)?;
        if !matches!(ty, Type::Boolean) {
            return Err(Error::new(
                ErrorImpl::ConditionNotBoolean {
                    statement: statement.to_string(),
                },
                condition.position,
            ));
        }
        Ok(())
    }

    pub(super) fn check_if(
        &mut self,
        stmt: &mut IfStmt,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        if is_outside_function(st) {
            return Err(not_allowed("If statement", position));
        }

        self.check_condition(&mut stmt.condition, "If", st)?;
        self.analyze_node(&mut stmt.then_branch, st)?;
        if let Some(else_branch) = &mut stmt.else_branch {
            self.analyze_node(else_branch, st)?;
        }

        Ok(Type::Null)
    }

    pub(super) fn check_while(
        &mut self,
        stmt: &mut WhileStmt,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        if is_outside_function(st) {
            return Err(not_allowed("While statement", position));
        }

        self.check_condition(&mut stmt.condition, "While", st)?;
        self.analyze_node(&mut stmt.body, st)?;

        Ok(Type::Null)
    }

    pub(super) fn check_import(
        &mut self,
        name: &str,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        if let Some(existing) = st.get_symbol(name) {
            trace!(module = name, "import of a bound name is a no-op");
            return Ok(existing.ty.clone());
        }

        let Some(module) = self.modules.load(name)? else {
            return Err(Error::new(
                ErrorImpl::ModuleNotFound {
                    name: name.to_string(),
                },
                position,
            ));
        };

        st.add_symbol(Symbol::new(name, Decl::Module(module), Type::Module));
        Ok(Type::Module)
    }

    pub(super) fn check_return(
        &mut self,
        value: &mut Option<Box<Node>>,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        if !matches!(st.get_scope_type(), ScopeType::Func | ScopeType::Method) {
            return Err(not_allowed("Return statement", position));
        }

        let expected = match st.get_scope_stmt() {
            ScopeOwner::Function(signature) => Some(signature.return_type_name.clone()),
            _ => None,
        };

        let ty = match value {
            Some(value) => self.analyze_node(value, st)?,
            None => Type::Null,
        };

        if let Some(expected) = expected {
            if ty.name() != expected {
                return Err(Error::new(
                    ErrorImpl::ReturnTypeMismatch {
                        value: ty.name().to_string(),
                        expected,
                    },
                    position,
                ));
            }
        }

        Ok(ty)
    }
}
