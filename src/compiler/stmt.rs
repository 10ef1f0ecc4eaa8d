use crate::{
    ast::{
        ast::{Node, NodeKind},
        statements::{IfStmt, WhileStmt},
        types::Type,
    },
    errors::errors::CodegenError,
};

use super::{
    compiler::{node_type, slots, unsupported, value_types, Compiler},
    expr::gen_expression,
};

pub fn gen_statement(compiler: &mut Compiler, statement: &Node) -> Result<(), CodegenError> {
    match &statement.kind {
        NodeKind::Let(decl) => {
            if let Some(initializer) = &decl.initializer {
                gen_expression(compiler, initializer)?;
                store(compiler, &decl.name, &node_type(statement)?, false);
            }
        }
        NodeKind::Assignment { target, value } => {
            let Some(name) = target.identifier_name() else {
                return Err(unsupported("assignment to a member", target.position));
            };
            let global = compiler.is_global(target, name)?;

            gen_expression(compiler, value)?;
            store(compiler, name, &node_type(target)?, global);
        }
        NodeKind::StatementList(stmts) => {
            for stmt in stmts {
                gen_statement(compiler, stmt)?;
            }
        }
        NodeKind::If(if_stmt) => gen_if(compiler, if_stmt)?,
        NodeKind::While(while_stmt) => gen_while(compiler, while_stmt)?,
        NodeKind::Return(value) => {
            if let Some(value) = value {
                gen_expression(compiler, value)?;
            }
            compiler.context.push_line("return");
        }
        // Imports only bind a name, classes emit nothing
        NodeKind::Import(_) | NodeKind::ClassDecl(_) => {}
        NodeKind::FunctionDecl(_) => {
            return Err(unsupported(
                "nested function declaration",
                statement.position,
            ))
        }
        NodeKind::FormalArg(_)
        | NodeKind::FormalArgList(_)
        | NodeKind::BuiltinTypeRef(_) => {
            return Err(unsupported(statement.describe(), statement.position))
        }
        _ => {
            // Expression statement, its value is discarded
            gen_expression(compiler, statement)?;
            for _ in value_types(&node_type(statement)?) {
                compiler.context.push_line("drop");
            }
        }
    }

    Ok(())
}

/// Pops a value into the slots of `name`, last slot first.
fn store(compiler: &mut Compiler, name: &str, ty: &Type, global: bool) {
    let instruction = if global { "global.set" } else { "local.set" };

    for (slot, _) in slots(name, ty).iter().rev() {
        compiler
            .context
            .push_line(&format!("{} ${}", instruction, slot));
    }
}

fn gen_if(compiler: &mut Compiler, if_stmt: &IfStmt) -> Result<(), CodegenError> {
    gen_expression(compiler, &if_stmt.condition)?;

    compiler.context.push_line("(if");
    compiler.context.indent();

    compiler.context.push_line("(then");
    compiler.context.indent();
    gen_statement(compiler, &if_stmt.then_branch)?;
    compiler.context.dedent();
    compiler.context.push_line(")");

    if let Some(else_branch) = &if_stmt.else_branch {
        compiler.context.push_line("(else");
        compiler.context.indent();
        gen_statement(compiler, else_branch)?;
        compiler.context.dedent();
        compiler.context.push_line(")");
    }

    compiler.context.dedent();
    compiler.context.push_line(")");
    Ok(())
}

fn gen_while(compiler: &mut Compiler, while_stmt: &WhileStmt) -> Result<(), CodegenError> {
    compiler.context.push_line("(block");
    compiler.context.indent();
    compiler.context.push_line("(loop");
    compiler.context.indent();

    gen_expression(compiler, &while_stmt.condition)?;
    compiler.context.push_line("i32.eqz");
    compiler.context.push_line("br_if 1");

    gen_statement(compiler, &while_stmt.body)?;
    compiler.context.push_line("br 0");

    compiler.context.dedent();
    compiler.context.push_line(")");
    compiler.context.dedent();
    compiler.context.push_line(")");
    Ok(())
}
