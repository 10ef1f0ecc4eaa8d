use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

macro_rules! pattern {
    ($regex:literal, $handler:expr) => {
        RegexPattern {
            regex: Regex::new($regex).unwrap(),
            handler: $handler,
        }
    };
}

lazy_static! {
    // Every pattern is anchored; longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern!("^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern!("^(?:0[xX][0-9a-fA-F]+|[0-9]+)", number_handler),
        pattern!("^\\s+", skip_handler),
        pattern!("^\"(?:[^\"\\\\\\n]|\\\\.)*\"", string_handler),
        pattern!("^//[^\\n]*", skip_handler),
        pattern!("^\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern!("^\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern!("^\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern!("^\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern!("^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern!("^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern!("^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern!("^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern!("^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern!("^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern!("^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern!("^\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern!("^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern!("^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern!("^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern!("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern!("^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern!("^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern!("^\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    pub fn new(source: String) -> Lexer {
        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.col)
    }

    /// Consumes `n` bytes, keeping the line and column in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let start = lexer.position();
    lexer.advance_n(matched.len());

    lexer.push(MK_TOKEN!(
        TokenKind::Number,
        matched,
        Span {
            start,
            end: lexer.position()
        }
    ));
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let start = lexer.position();
    let string_literal = unescape(&matched[1..matched.len() - 1], start)?;

    lexer.advance_n(matched.len());

    lexer.push(MK_TOKEN!(
        TokenKind::String,
        string_literal,
        Span {
            start,
            end: lexer.position()
        }
    ));
    Ok(())
}

fn unescape(raw: &str, position: Position) -> Result<String, Error> {
    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('0') => result.push('\0'),
            Some('x') => {
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex.push(*c);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                let byte = u8::from_str_radix(&hex, 16).map_err(|_| {
                    Error::new(
                        ErrorImpl::UnrecognisedToken {
                            token: format!("\\x{}", hex),
                        },
                        position,
                    )
                })?;
                result.push(byte as char);
            }
            // Unknown escapes keep their backslash
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    Ok(result)
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let start = lexer.position();
    lexer.advance_n(value.len());

    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.push(MK_TOKEN!(
        kind,
        value,
        Span {
            start,
            end: lexer.position()
        }
    ));
    Ok(())
}

#[tracing::instrument(level = "trace", skip_all)]
pub fn tokenize(source: String) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    let end = lex.position();
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        Span { start: end, end }
    ));
    Ok(lex.tokens)
}
