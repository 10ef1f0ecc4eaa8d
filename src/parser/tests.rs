//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Let declarations
//! - Function and class declarations
//! - Expressions and precedence
//! - Control flow statements
//! - Syntax errors

use super::parser::parse;
use crate::{
    ast::{
        ast::{Node, NodeKind},
        expressions::BinaryOp,
        types::Builtin,
    },
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Node {
    let tokens = tokenize(source.to_string()).unwrap();
    parse(tokens).unwrap()
}

fn first_stmt(source: &str) -> Node {
    parse_source(source).statements()[0].clone()
}

#[test]
fn test_parse_let_declaration() {
    let stmt = first_stmt("let x: Integer64 = 42;");

    assert_eq!(stmt.to_string(), "Let(n=x, t=Integer64, i=Int(42))");
}

#[test]
fn test_parse_let_without_type_or_value_fails() {
    let tokens = tokenize("let x;".to_string()).unwrap();
    let error = parse(tokens).unwrap_err();

    assert_eq!(error.get_error_name(), "SyntaxError");
}

#[test]
fn test_parse_hex_literal() {
    let stmt = first_stmt("let x = 0x10;");

    assert_eq!(stmt.to_string(), "Let(n=x, i=Int(16))");
}

#[test]
fn test_parse_number_overflow() {
    let tokens = tokenize("let x = 99999999999999999999;".to_string()).unwrap();
    let error = parse(tokens).unwrap_err();

    assert!(error.get_message().contains("99999999999999999999"));
}

#[test]
fn test_parse_function_declaration() {
    let stmt = first_stmt("func add(a: Integer64, b: Integer64): Integer64 { return a + b; }");

    assert_eq!(
        stmt.to_string(),
        "Func(n=add, a=FuncArgs([FArg(n=a, t=Integer64), FArg(n=b, t=Integer64)]), r=Integer64, s=[Return(Add(l=Id(a), r=Id(b)))])"
    );
}

#[test]
fn test_parse_function_default_return_type() {
    let stmt = first_stmt("func main() { }");

    let NodeKind::FunctionDecl(func) = &stmt.kind else {
        panic!("expected function, got {}", stmt);
    };
    assert_eq!(func.return_type.kind, NodeKind::BuiltinTypeRef(Builtin::Null));
    assert!(func.params().is_empty());
}

#[test]
fn test_parse_class_declaration() {
    let stmt = first_stmt("class Point { let x: Integer64 = 0; func get(): Integer64 { return this.x; } };");

    assert_eq!(
        stmt.to_string(),
        "Class(n=Point, s=[Let(n=x, t=Integer64, i=Int(0)), Func(n=get, a=FuncArgs([]), r=Integer64, s=[Return(Dot(l=Id(this), r=Id(x)))])])"
    );
}

#[test]
fn test_parse_user_type_annotation() {
    let stmt = first_stmt("let p: Point;");

    assert_eq!(stmt.to_string(), "Let(n=p, t=Id(Point))");
}

#[test]
fn test_parse_precedence() {
    let stmt = first_stmt("x = 1 + 2 * 3 == 7;");

    let NodeKind::Assignment { value, .. } = &stmt.kind else {
        panic!("expected assignment, got {}", stmt);
    };
    let NodeKind::BinaryOp { op, left, .. } = &value.kind else {
        panic!("expected comparison");
    };
    assert_eq!(*op, BinaryOp::Eq);
    assert_eq!(left.to_string(), "Add(l=Int(1), r=Mult(l=Int(2), r=Int(3)))");
}

#[test]
fn test_parse_unary_binds_tighter_than_addition() {
    let stmt = first_stmt("x = -a + b;");

    assert_eq!(stmt.to_string(), "Assign(l=Id(x), r=Add(l=Signed(-, Id(a)), r=Id(b)))");
}

#[test]
fn test_parse_subtraction_is_left_associative() {
    let stmt = first_stmt("x = a - b - c;");

    assert_eq!(stmt.to_string(), "Assign(l=Id(x), r=Sub(l=Sub(l=Id(a), r=Id(b)), r=Id(c)))");
}

#[test]
fn test_parse_member_call() {
    let stmt = first_stmt("io.print(\"hi\", 1);");

    assert_eq!(stmt.to_string(), "Call(n=Dot(l=Id(io), r=Id(print)), a=FuncArgs([Str(hi), Int(1)]))");
}

#[test]
fn test_parse_if_else_chain() {
    let stmt = first_stmt("if (a) { b = 1; } else if (c) { b = 2; } else { b = 3; }");

    assert_eq!(
        stmt.to_string(),
        "If(?=Id(a), then=[Assign(l=Id(b), r=Int(1))], else=If(?=Id(c), then=[Assign(l=Id(b), r=Int(2))], else=[Assign(l=Id(b), r=Int(3))]))"
    );
}

#[test]
fn test_parse_while_loop() {
    let stmt = first_stmt("while x < 10 { x = x + 1; }");

    assert_eq!(
        stmt.to_string(),
        "While(?=OpLt(l=Id(x), r=Int(10)), repeat=[Assign(l=Id(x), r=Add(l=Id(x), r=Int(1)))])"
    );
}

#[test]
fn test_parse_import_and_booleans() {
    let root = parse_source("import io; let b = true;");

    assert_eq!(root.statements()[0].to_string(), "Import(io)");
    assert_eq!(root.statements()[1].to_string(), "Let(n=b, i=Bool(true))");
}

#[test]
fn test_parse_positions() {
    let root = parse_source("let a = 1;\nfunc f() {\n  return;\n}");

    assert_eq!(root.statements()[0].position.line, 1);
    let func = &root.statements()[1];
    assert_eq!(func.position.line, 2);
    let NodeKind::FunctionDecl(decl) = &func.kind else {
        panic!("expected function");
    };
    assert_eq!(decl.statements()[0].position.line, 3);
    assert_eq!(decl.statements()[0].position.col, 3);
}

#[test]
fn test_parse_node_ids_are_unique() {
    fn collect(node: &Node, ids: &mut Vec<u32>) {
        ids.push(node.id);
        match &node.kind {
            NodeKind::StatementList(stmts) | NodeKind::FormalArgList(stmts) => {
                stmts.iter().for_each(|s| collect(s, ids))
            }
            NodeKind::Let(decl) => {
                decl.explicit_type.iter().for_each(|t| collect(t, ids));
                decl.initializer.iter().for_each(|i| collect(i, ids));
            }
            NodeKind::BinaryOp { left, right, .. } => {
                collect(left, ids);
                collect(right, ids);
            }
            _ => {}
        }
    }

    let root = parse_source("let a: Integer64 = 1 + 2; let b = a;");
    let mut ids = vec![];
    collect(&root, &mut ids);

    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len());
}

#[test]
fn test_parse_missing_semicolon() {
    let tokens = tokenize("let x = 1 let y = 2;".to_string()).unwrap();
    let error = parse(tokens).unwrap_err();

    assert_eq!(error.get_position().col, 11);
}

#[test]
fn test_parse_unclosed_block() {
    let tokens = tokenize("func f() { let x = 1;".to_string()).unwrap();

    assert!(parse(tokens).is_err());
}

#[test]
fn test_parse_empty_program() {
    let root = parse_source("// nothing here\n");

    assert!(root.statements().is_empty());
}
