//! Type annotation parsing.
//!
//! Sprig types are bare names. Builtin names become `BuiltinTypeRef`
//! nodes, everything else an `Identifier` that the analyzer resolves.

use crate::{
    ast::{
        ast::{Node, NodeKind},
        types::Builtin,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

pub fn parse_type(parser: &mut Parser) -> Result<Node, Error> {
    let token = parser.expect_detailed(TokenKind::Identifier, "expected a type name")?;

    let kind = match Builtin::from_name(&token.value) {
        Some(builtin) => NodeKind::BuiltinTypeRef(builtin),
        None => NodeKind::Identifier(token.value),
    };

    Ok(parser.make_node(token.span.start, kind))
}
