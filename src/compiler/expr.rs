use crate::{
    ast::{
        ast::{Node, NodeKind},
        expressions::{BinaryOp, UnaryOp},
        types::Type,
    },
    errors::errors::CodegenError,
    type_checker::{
        expr::is_io_print,
        scope::{Decl, LogicalOp},
    },
};

use super::compiler::{node_type, slots, unsupported, Compiler};

pub fn gen_expression(compiler: &mut Compiler, expression: &Node) -> Result<(), CodegenError> {
    match &expression.kind {
        NodeKind::IntegerLiteral(value) => {
            compiler
                .context
                .push_line(&format!("i64.const {}", value));
        }
        NodeKind::StringLiteral(value) => {
            let (offset, length) = compiler.context.add_to_memory(value);
            compiler
                .context
                .push_line(&format!("i32.const {}", offset));
            compiler
                .context
                .push_line(&format!("i32.const {}", length));
        }
        NodeKind::BooleanLiteral(value) => {
            compiler
                .context
                .push_line(&format!("i32.const {}", *value as i32));
        }
        NodeKind::Identifier(name) => {
            let instruction = if compiler.is_global(expression, name)? {
                "global.get"
            } else {
                "local.get"
            };
            for (slot, _) in slots(name, &node_type(expression)?) {
                compiler
                    .context
                    .push_line(&format!("{} ${}", instruction, slot));
            }
        }
        NodeKind::UnaryArithmetic { op, operand } => match (op, node_type(operand)?) {
            (UnaryOp::Plus, _) => gen_expression(compiler, operand)?,
            (UnaryOp::Minus, Type::Integer64) => {
                compiler.context.push_line("i64.const 0");
                gen_expression(compiler, operand)?;
                compiler.context.push_line("i64.sub");
            }
            (UnaryOp::Minus, ty) => {
                return Err(unsupported(
                    format!("negation of {}", ty),
                    expression.position,
                ))
            }
        },
        NodeKind::BinaryOp { op, left, right } => {
            let operand = node_type(left)?;
            let Some(instruction) = binary_instruction(*op, &operand) else {
                return Err(unsupported(
                    format!("operator '{}' on {}", op.symbol(), operand),
                    expression.position,
                ));
            };

            gen_expression(compiler, left)?;
            gen_expression(compiler, right)?;
            compiler.context.push_line(instruction);
        }
        NodeKind::Call { callee, args } => gen_call(compiler, callee, args)?,
        _ => {
            return Err(unsupported(
                expression.describe(),
                expression.position,
            ))
        }
    }

    Ok(())
}

fn binary_instruction(op: BinaryOp, operand: &Type) -> Option<&'static str> {
    let instruction = match (operand, op) {
        (Type::Integer64, BinaryOp::Add) => "i64.add",
        (Type::Integer64, BinaryOp::Sub) => "i64.sub",
        (Type::Integer64, BinaryOp::Mult) => "i64.mul",
        (Type::Integer64, BinaryOp::Div) => "i64.div_s",
        (Type::Integer64, BinaryOp::Eq) => "i64.eq",
        (Type::Integer64, BinaryOp::Ne) => "i64.ne",
        (Type::Integer64, BinaryOp::Lt) => "i64.lt_s",
        (Type::Integer64, BinaryOp::Gt) => "i64.gt_s",
        (Type::Integer64, BinaryOp::Le) => "i64.le_s",
        (Type::Integer64, BinaryOp::Ge) => "i64.ge_s",
        (Type::Boolean, BinaryOp::Eq) => "i32.eq",
        (Type::Boolean, BinaryOp::Ne) => "i32.ne",
        _ => return None,
    };
    Some(instruction)
}

fn gen_call(compiler: &mut Compiler, callee: &Node, args: &[Node]) -> Result<(), CodegenError> {
    let ast = compiler.ast;
    let resolve = |node: &Node| ast.resolved(node).map(|(_, symbol)| symbol.decl.clone());

    if is_io_print(callee, &resolve) {
        let [arg] = args else {
            return Err(unsupported("io.print with several arguments", callee.position));
        };
        gen_expression(compiler, arg)?;
        compiler
            .context
            .push_line(&format!("call {}", print_import(arg)));
        return Ok(());
    }

    let Some(name) = callee.identifier_name() else {
        return Err(unsupported("method call", callee.position));
    };

    let instruction = match resolve(callee) {
        Some(Decl::LogicalOperator(op)) => match op {
            LogicalOp::And => String::from("i32.and"),
            LogicalOp::Or => String::from("i32.or"),
            LogicalOp::Not => String::from("i32.eqz"),
        },
        Some(Decl::Function(signature)) => format!("call ${}", signature.name),
        _ => {
            return Err(unsupported(
                format!("call to '{}'", name),
                callee.position,
            ))
        }
    };

    for arg in args {
        gen_expression(compiler, arg)?;
    }
    compiler.context.push_line(&instruction);

    Ok(())
}

/// Host import for printing `arg`, chosen by its type.
///
/// Falls back to the literal kind when the type is missing and to the
/// integer printer for anything else.
fn print_import(arg: &Node) -> &'static str {
    match arg.ty.as_ref().map(Type::name) {
        Some("Integer64") => "$io_print_i",
        Some("String") => "$io_print_s",
        Some("Boolean") => "$io_print_b",
        Some(_) => "$io_print_i",
        None => match arg.kind {
            NodeKind::StringLiteral(_) => "$io_print_s",
            NodeKind::BooleanLiteral(_) => "$io_print_b",
            _ => "$io_print_i",
        },
    }
}
