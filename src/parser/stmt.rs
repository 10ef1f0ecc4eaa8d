use crate::{
    ast::{
        ast::{Node, NodeKind},
        statements::{ClassDecl, FormalArg, FunctionDecl, IfStmt, LetDecl, WhileStmt},
        types::Builtin,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Node, Error> {
    if let Some(handler) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return handler(parser);
    }

    // Assignment binds looser than any expression, so stop right before `=`
    let expr = parse_expr(parser, BindingPower::Assignment)?;

    let stmt = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Assignment)?;
        let position = expr.position;
        parser.make_node(
            position,
            NodeKind::Assignment {
                target: Box::new(expr),
                value: Box::new(value),
            },
        )
    } else {
        expr
    };

    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after statement")?;

    Ok(stmt)
}

/// `{ stmt* }`, optionally followed by a stray `;`.
pub fn parse_block(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser
        .expect_detailed(TokenKind::OpenCurly, "expected `{`")?
        .span
        .start;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected `}` before end of file"),
                },
                parser.get_position(),
            ));
        }
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(parser.make_node(start, NodeKind::StatementList(statements)))
}

fn skip_optional_semicolon(parser: &mut Parser) {
    if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
    }
}

pub fn parse_let_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.advance().span.start;

    let name = parser
        .expect_detailed(
            TokenKind::Identifier,
            "expected identifier during variable declaration",
        )?
        .value;

    let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(Box::new(parse_type(parser)?))
    } else {
        None
    };

    let initializer = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    } else if explicit_type.is_none() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected rhs or explicit type"),
            },
            parser.get_position(),
        ));
    } else {
        None
    };

    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after let")?;

    Ok(parser.make_node(
        start,
        NodeKind::Let(LetDecl {
            name,
            explicit_type,
            initializer,
        }),
    ))
}

pub fn parse_import_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.advance().span.start;

    let identifier = parser
        .expect_detailed(TokenKind::Identifier, "expected module name")?
        .value;

    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after import")?;

    Ok(parser.make_node(start, NodeKind::Import(identifier)))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_branch = parse_block(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(Box::new(parse_if_stmt(parser)?))
        } else {
            Some(Box::new(parse_block(parser)?))
        }
    } else {
        None
    };

    skip_optional_semicolon(parser);

    Ok(parser.make_node(
        start,
        NodeKind::If(IfStmt {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        }),
    ))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    skip_optional_semicolon(parser);

    Ok(parser.make_node(
        start,
        NodeKind::While(WhileStmt {
            condition: Box::new(condition),
            body: Box::new(body),
        }),
    ))
}

pub fn parse_func_decl_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.advance().span.start;

    let name_token = parser.expect_detailed(TokenKind::Identifier, "expected function name")?;

    let args_start = parser
        .expect_detailed(TokenKind::OpenParen, "expected `(` after function name")?
        .span
        .start;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let arg_token = parser.expect_detailed(TokenKind::Identifier, "expected argument name")?;
        parser.expect_detailed(TokenKind::Colon, "expected `:` after argument name")?;
        let ty = parse_type(parser)?;
        parameters.push(parser.make_node(
            arg_token.span.start,
            NodeKind::FormalArg(FormalArg {
                name: arg_token.value,
                ty: Box::new(ty),
            }),
        ));

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `)` after arguments")?;
    let args = parser.make_node(args_start, NodeKind::FormalArgList(parameters));

    let return_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        parse_type(parser)?
    } else {
        parser.make_node(name_token.span.start, NodeKind::BuiltinTypeRef(Builtin::Null))
    };

    let body = parse_block(parser)?;
    skip_optional_semicolon(parser);

    Ok(parser.make_node(
        start,
        NodeKind::FunctionDecl(FunctionDecl {
            name: name_token.value,
            args: Box::new(args),
            return_type: Box::new(return_type),
            body: Box::new(body),
        }),
    ))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.advance().span.start;

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    } else {
        None
    };

    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after return")?;

    Ok(parser.make_node(start, NodeKind::Return(value)))
}

pub fn parse_class_decl_stmt(parser: &mut Parser) -> Result<Node, Error> {
    let start = parser.advance().span.start;

    let name = parser
        .expect_detailed(TokenKind::Identifier, "expected class name")?
        .value;

    let body = parse_block(parser)?;
    skip_optional_semicolon(parser);

    Ok(parser.make_node(
        start,
        NodeKind::ClassDecl(ClassDecl {
            name,
            body: Box::new(body),
        }),
    ))
}
