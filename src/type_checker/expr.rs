use crate::{
    ast::{
        ast::{Node, NodeKind},
        expressions::BinaryOp,
        types::{Builtin, Type},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    scope::{Decl, FunctionSignature, LogicalOp, ScopeId, Symbol, SymbolTable},
    type_checker::{path_name, Analyzer},
};

/// Types `io.print` can lower to a runtime import.
const PRINTABLE: [Type; 3] = [Type::Integer64, Type::String, Type::Boolean];

/// Whether `callee` is `io.print` on the builtin `io` module.
///
/// `resolve` maps an identifier node to the declaration it names.
pub fn is_io_print(callee: &Node, resolve: impl Fn(&Node) -> Option<Decl>) -> bool {
    let NodeKind::MemberAccess { left, right } = &callee.kind else {
        return false;
    };
    if right.identifier_name() != Some("print") {
        return false;
    }

    resolve(left).is_some_and(|decl| matches!(decl, Decl::Module(module) if module.name == "io"))
}

impl Analyzer<'_> {
    /// Type of the symbol `name` is bound to, and the scope declaring it.
    pub(super) fn check_identifier(
        &mut self,
        name: &str,
        position: Position,
        st: &SymbolTable,
    ) -> Result<(Type, ScopeId), Error> {
        match st.resolve(name) {
            Some((scope, symbol)) => Ok((symbol.ty.clone(), scope)),
            None => Err(Error::new(
                ErrorImpl::IdentifierNotFound {
                    name: name.to_string(),
                },
                position,
            )),
        }
    }

    pub(super) fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &mut Node,
        right: &mut Node,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        let left_ty = self.analyze_node(left, st)?;
        let right_ty = self.analyze_node(right, st)?;

        if !left_ty.same_as(&right_ty) {
            return Err(Error::new(
                ErrorImpl::OperatorTypeMismatch {
                    operator: op.symbol().to_string(),
                    left: left_ty.name().to_string(),
                    right: right_ty.name().to_string(),
                },
                position,
            ));
        }

        if op.is_comparison() {
            self.builtin_type(Builtin::Boolean, position, st)
        } else {
            Ok(left_ty)
        }
    }

    /// Analyzes `node` and returns the symbol it names, if it names one.
    fn resolve_symbol(
        &mut self,
        node: &mut Node,
        st: &mut SymbolTable,
    ) -> Result<Option<Symbol>, Error> {
        if let Some(name) = node.identifier_name().map(str::to_string) {
            self.analyze_node(node, st)?;
            return Ok(st.get_symbol(&name).cloned());
        }

        let position = node.position;
        if let NodeKind::MemberAccess { left, right } = &mut node.kind {
            let symbol = self.check_member(left, right, position, st)?;
            node.ty = Some(symbol.ty.clone());
            node.scope = Some(st.current_scope());
            return Ok(Some(symbol));
        }

        self.analyze_node(node, st)?;
        Ok(None)
    }

    /// Resolves `left.right` to the member's symbol.
    ///
    /// Modules and classes are looked up through their member tables, other
    /// values through the class of their type.
    pub(super) fn check_member(
        &mut self,
        left: &mut Node,
        right: &mut Node,
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Symbol, Error> {
        let owner_symbol = self.resolve_symbol(left, st)?;
        let member = right.identifier_name().unwrap_or_default().to_string();

        let mut has_members = false;
        let mut found = match owner_symbol.as_ref().map(|symbol| &symbol.decl) {
            Some(Decl::Module(module)) => {
                has_members = true;
                module.member(&member).cloned()
            }
            Some(Decl::Class(id)) | Some(Decl::This(id)) => {
                has_members = true;
                self.class_member(*id, &member, st)
            }
            _ => None,
        };

        if found.is_none() {
            if let Some(class) = left.ty.as_ref().and_then(Type::as_class) {
                has_members = true;
                found = self.class_member(class.id, &member, st);
            }
        }

        let Some(symbol) = found else {
            let owner = path_name(left);
            let error = if has_members {
                ErrorImpl::MemberNotFound { owner, member }
            } else {
                ErrorImpl::SubsymbolNotFound { owner, member }
            };
            return Err(Error::new(error, position));
        };

        right.ty = Some(symbol.ty.clone());
        right.scope = Some(st.current_scope());
        Ok(symbol)
    }

    pub(super) fn check_call(
        &mut self,
        callee: &mut Node,
        args: &mut [Node],
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        let symbol = self.resolve_symbol(callee, st)?;
        let not_a_function = || {
            Error::new(
                ErrorImpl::NotAFunction {
                    name: path_name(callee),
                },
                position,
            )
        };

        match symbol.map(|symbol| symbol.decl) {
            Some(Decl::LogicalOperator(op)) => self.check_logical_call(op, args, position, st),
            Some(Decl::Function(signature)) => {
                let io_print = is_io_print(callee, |node: &Node| {
                    node.identifier_name()
                        .and_then(|name| st.get_symbol(name))
                        .map(|symbol| symbol.decl.clone())
                });
                if io_print {
                    self.check_print_call(args, position, st)
                } else {
                    self.check_function_call(&signature, args, position, st)
                }
            }
            _ => Err(not_a_function()),
        }
    }

    fn check_logical_call(
        &mut self,
        op: LogicalOp,
        args: &mut [Node],
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        check_arity(op.name(), op.arity(), args.len(), position)?;

        for (index, arg) in args.iter_mut().enumerate() {
            let ty = self.analyze_node(arg, st)?;
            if !matches!(ty, Type::Boolean) {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMismatch {
                        index: index + 1,
                        function: op.name().to_string(),
                        received: ty.name().to_string(),
                        expected: Builtin::Boolean.name().to_string(),
                    },
                    arg.position,
                ));
            }
        }

        self.builtin_type(Builtin::Boolean, position, st)
    }

    fn check_print_call(
        &mut self,
        args: &mut [Node],
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        check_arity("io.print", 1, args.len(), position)?;

        let arg = &mut args[0];
        let ty = self.analyze_node(arg, st)?;
        if !PRINTABLE.contains(&ty) {
            return Err(Error::new(
                ErrorImpl::PrintArgumentType {
                    received: ty.name().to_string(),
                },
                arg.position,
            ));
        }

        Ok(Type::Null)
    }

    fn check_function_call(
        &mut self,
        signature: &FunctionSignature,
        args: &mut [Node],
        position: Position,
        st: &mut SymbolTable,
    ) -> Result<Type, Error> {
        check_arity(
            &signature.name,
            signature.params.len(),
            args.len(),
            position,
        )?;

        for (index, (arg, param)) in args.iter_mut().zip(&signature.params).enumerate() {
            let ty = self.analyze_node(arg, st)?;
            if ty.name() != param.type_name {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMismatch {
                        index: index + 1,
                        function: signature.name.clone(),
                        received: ty.name().to_string(),
                        expected: param.type_name.clone(),
                    },
                    arg.position,
                ));
            }
        }

        self.resolve_type_name(&signature.return_type_name, position, st)
            .map_err(|_| {
                Error::new(
                    ErrorImpl::ReturnTypeNotFound {
                        type_name: signature.return_type_name.clone(),
                        function: signature.name.clone(),
                    },
                    position,
                )
            })
    }
}

fn check_arity(
    function: &str,
    expected: usize,
    received: usize,
    position: Position,
) -> Result<(), Error> {
    if expected == received {
        return Ok(());
    }

    Err(Error::new(
        ErrorImpl::WrongArgumentCount {
            function: function.to_string(),
            expected,
            received,
        },
        position,
    ))
}
