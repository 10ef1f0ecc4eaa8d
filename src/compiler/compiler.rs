//! Main compiler module.
//!
//! This module contains the `Compiler` structure and drives code generation
//! from an analyzed tree to WebAssembly text. Top-level functions become
//! `func` blocks, module-level constants become globals, and string literals
//! are pooled into a single data segment.

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Node, NodeKind},
        statements::{FunctionDecl, LetDecl},
        types::Type,
    },
    errors::errors::CodegenError,
    type_checker::{
        scope::{Decl, ScopeType},
        type_checker::AnnotatedAst,
    },
    Position,
};

use super::{context::WasmContext, stmt::gen_statement};

/// State of one code generation pass.
///
/// The tree must already have passed analysis; node types and scopes are
/// read, never re-checked.
pub struct Compiler<'a> {
    /// The analyzed program being lowered
    pub ast: &'a AnnotatedAst,
    /// Output buffers
    pub context: WasmContext,
}

impl<'a> Compiler<'a> {
    pub fn new(ast: &'a AnnotatedAst) -> Self {
        Compiler {
            ast,
            context: WasmContext::new(),
        }
    }

    /// Emits every top-level declaration, globals first.
    pub fn compile_module(&mut self) -> Result<(), CodegenError> {
        let ast = self.ast;
        let stmts = ast.root.statements();

        for stmt in stmts {
            if let NodeKind::Let(decl) = &stmt.kind {
                self.gen_global(stmt, decl)?;
            }
        }

        for stmt in stmts {
            match &stmt.kind {
                NodeKind::FunctionDecl(func) => self.gen_function(func)?,
                // Classes emit nothing; member reads and method calls fail
                NodeKind::Let(_) | NodeKind::Import(_) | NodeKind::ClassDecl(_) => {}
                _ => return Err(unsupported(stmt.describe(), stmt.position)),
            }
        }

        Ok(())
    }

    fn gen_global(&mut self, node: &Node, decl: &LetDecl) -> Result<(), CodegenError> {
        let ty = node_type(node)?;
        let initializer = decl.initializer.as_deref().map(|init| &init.kind);

        let (value_type, value) = match (&ty, initializer) {
            (Type::Integer64, None) => ("i64", String::from("i64.const 0")),
            (Type::Integer64, Some(NodeKind::IntegerLiteral(value))) => {
                ("i64", format!("i64.const {}", value))
            }
            (Type::Boolean, None) => ("i32", String::from("i32.const 0")),
            (Type::Boolean, Some(NodeKind::BooleanLiteral(value))) => {
                ("i32", format!("i32.const {}", *value as i32))
            }
            _ => {
                return Err(unsupported(
                    format!("initializer of module-level '{}'", decl.name),
                    node.position,
                ))
            }
        };

        self.context.push_line(&format!(
            "(global ${} (mut {}) ({}))",
            decl.name, value_type, value
        ));
        Ok(())
    }

    fn gen_function(&mut self, func: &FunctionDecl) -> Result<(), CodegenError> {
        trace!(function = %func.name, "generating function");

        let mut header = format!("(func ${}", func.name);
        for param in func.params() {
            let NodeKind::FormalArg(formal) = &param.kind else {
                continue;
            };
            for (slot, value_type) in slots(&formal.name, &node_type(param)?) {
                header.push_str(&format!(" (param ${} {})", slot, value_type));
            }
        }

        let results = value_types(&node_type(&func.return_type)?);
        if !results.is_empty() {
            header.push_str(&format!(" (result {})", results.join(" ")));
        }

        self.context.push_line(&header);
        self.context.indent();

        let mut locals = Vec::new();
        collect_locals(func.statements(), &mut locals)?;
        for (name, ty) in &locals {
            for (slot, value_type) in slots(name, ty) {
                self.context
                    .push_line(&format!("(local ${} {})", slot, value_type));
            }
        }

        for stmt in func.statements() {
            gen_statement(self, stmt)?;
        }

        self.context.dedent();
        self.context.push_line(")");

        if func.name == "main" {
            self.context.push_line("(export \"main\" (func $main))");
        }

        Ok(())
    }

    /// Whether identifier `node` names a module-level variable.
    ///
    /// Reads the binding recorded by analysis, so a later `let` of the same
    /// name in the function does not capture earlier reads.
    pub fn is_global(&self, node: &Node, name: &str) -> Result<bool, CodegenError> {
        match self.ast.resolved(node) {
            Some((scope, symbol)) => match symbol.decl {
                Decl::Variable(_) => Ok(scope == ScopeType::Module),
                Decl::Argument(_) => Ok(false),
                _ => Err(unsupported(
                    format!("'{}' used as a variable", name),
                    node.position,
                )),
            },
            None => Err(unsupported(
                format!("unresolved name '{}'", name),
                node.position,
            )),
        }
    }
}

/// Lowers an analyzed program to module text.
#[tracing::instrument(level = "debug", skip_all)]
pub fn generate(ast: &AnnotatedAst) -> Result<String, CodegenError> {
    let mut compiler = Compiler::new(ast);
    compiler.compile_module()?;

    debug!(
        data_bytes = compiler.context.memory().len(),
        "generated module"
    );
    Ok(compiler.context.render())
}

/// Value types a `Type` occupies on the stack.
pub fn value_types(ty: &Type) -> &'static [&'static str] {
    match ty {
        Type::Integer64 => &["i64"],
        Type::Boolean => &["i32"],
        Type::String => &["i32", "i32"],
        Type::Null => &[],
        _ => &["i64"],
    }
}

/// Local slots backing a variable; strings keep their length in `name.len`.
pub fn slots(name: &str, ty: &Type) -> Vec<(String, &'static str)> {
    match ty {
        Type::String => vec![(name.to_string(), "i32"), (format!("{}.len", name), "i32")],
        _ => value_types(ty)
            .iter()
            .map(|value_type| (name.to_string(), *value_type))
            .collect(),
    }
}

pub fn node_type(node: &Node) -> Result<Type, CodegenError> {
    node.ty.clone().ok_or(CodegenError::MissingType {
        position: node.position,
    })
}

pub fn unsupported(construct: impl Into<String>, position: Position) -> CodegenError {
    CodegenError::Unsupported {
        construct: construct.into(),
        position,
    }
}

/// Every `let` of a function body, including those inside `if` and `while`.
fn collect_locals<'n>(
    stmts: &'n [Node],
    locals: &mut Vec<(&'n str, Type)>,
) -> Result<(), CodegenError> {
    for stmt in stmts {
        match &stmt.kind {
            NodeKind::Let(decl) => locals.push((&decl.name, node_type(stmt)?)),
            NodeKind::StatementList(inner) => collect_locals(inner, locals)?,
            NodeKind::If(if_stmt) => {
                collect_locals(std::slice::from_ref(if_stmt.then_branch.as_ref()), locals)?;
                if let Some(else_branch) = &if_stmt.else_branch {
                    collect_locals(std::slice::from_ref(else_branch.as_ref()), locals)?;
                }
            }
            NodeKind::While(while_stmt) => {
                collect_locals(std::slice::from_ref(while_stmt.body.as_ref()), locals)?
            }
            NodeKind::FunctionDecl(_) => {
                return Err(unsupported("nested function declaration", stmt.position))
            }
            _ => {}
        }
    }
    Ok(())
}
