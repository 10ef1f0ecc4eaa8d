use crate::{
    ast::{
        ast::{Node, NodeKind},
        expressions::{BinaryOp, UnaryOp},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Node, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(unexpected(parser));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(unexpected(parser));
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

fn unexpected(parser: &Parser) -> Error {
    Error::new(
        ErrorImpl::UnexpectedToken {
            token: parser.current_token().value.clone(),
        },
        parser.get_position(),
    )
}

fn parse_integer(token: &Token) -> Result<i64, Error> {
    let text = token.value.as_str();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => text.parse::<i64>(),
    };

    parsed.map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start,
        )
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Node, Error> {
    let token = parser.advance();
    let kind = match token.kind {
        TokenKind::Number => NodeKind::IntegerLiteral(parse_integer(&token)?),
        TokenKind::Identifier => NodeKind::Identifier(token.value.clone()),
        TokenKind::String => NodeKind::StringLiteral(token.value.clone()),
        TokenKind::True => NodeKind::BooleanLiteral(true),
        TokenKind::False => NodeKind::BooleanLiteral(false),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    Ok(parser.make_node(token.span.start, kind))
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mult,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Equals => BinaryOp::Eq,
        TokenKind::NotEquals => BinaryOp::Ne,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::Greater => BinaryOp::Gt,
        TokenKind::LessEquals => BinaryOp::Le,
        TokenKind::GreaterEquals => BinaryOp::Ge,
        _ => return None,
    };
    Some(op)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Node, bp: BindingPower) -> Result<Node, Error> {
    let operator_token = parser.advance();
    let Some(op) = binary_op(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    let right = parse_expr(parser, bp)?;

    Ok(parser.make_node(
        operator_token.span.start,
        NodeKind::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Node, Error> {
    let operator_token = parser.advance();
    let op = if operator_token.kind == TokenKind::Dash {
        UnaryOp::Minus
    } else {
        UnaryOp::Plus
    };
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(parser.make_node(
        operator_token.span.start,
        NodeKind::UnaryArithmetic {
            op,
            operand: Box::new(operand),
        },
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Node, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, left: Node, _bp: BindingPower) -> Result<Node, Error> {
    parser.advance();

    let mut args = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            args.push(parse_expr(parser, BindingPower::Default)?);
            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `)` after call arguments")?;

    let position = left.position;
    Ok(parser.make_node(
        position,
        NodeKind::Call {
            callee: Box::new(left),
            args,
        },
    ))
}

pub fn parse_member_expr(parser: &mut Parser, left: Node, _bp: BindingPower) -> Result<Node, Error> {
    parser.advance();
    let member = parser.expect_detailed(TokenKind::Identifier, "expected member name after `.`")?;
    let right = parser.make_node(member.span.start, NodeKind::Identifier(member.value));

    let position = left.position;
    Ok(parser.make_node(
        position,
        NodeKind::MemberAccess {
            left: Box::new(left),
            right: Box::new(right),
        },
    ))
}
