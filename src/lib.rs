#![allow(clippy::module_inception)]

use std::{fmt::Display, path::Path, sync::Once};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

pub use compiler::compiler::generate;
pub use driver::{compile_source, Driver, DriverOptions, Emit};
pub use type_checker::type_checker::{analyze, AnnotatedAst};

/// A 1-based line/column location in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub fn new(line: u32, col: u32) -> Self {
        Position { line, col }
    }

    /// Position used for synthesized nodes that have no source text.
    pub fn null() -> Self {
        Position { line: 0, col: 0 }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

static TRACING_INIT: Once = Once::new();

/// Installs the stderr tracing subscriber.
///
/// Safe to call multiple times. Nothing is installed unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=sprig=debug` or `RUST_LOG=sprig=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Returns the line number, the text of that line and the 0-based column
/// for a position inside `source`.
pub fn get_line_at_position(source: &str, position: Position) -> Option<(usize, String, usize)> {
    if position.line == 0 {
        return None;
    }

    let line_text = source.split_inclusive('\n').nth(position.line as usize - 1)?;
    let line_pos = (position.col.max(1) - 1) as usize;

    Some((position.line as usize, line_text.to_string(), line_pos))
}

#[cfg(test)]
mod tests {
    use crate::Position;

    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\n\nfoo\n  Testing { }\n";

        let (line_number, line, line_pos) =
            super::get_line_at_position(source, Position::new(1, 11)).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) =
            super::get_line_at_position(source, Position::new(4, 11)).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "  Testing { }\n");
        assert_eq!(line_pos, 10);
    }

    #[test]
    fn test_get_line_past_end() {
        assert!(super::get_line_at_position("let x = 1;", Position::new(3, 1)).is_none());
        assert!(super::get_line_at_position("let x = 1;", Position::null()).is_none());
    }

    #[test]
    fn test_remove_starting_whitespace() {
        let (text, removed) = super::remove_starting_whitespace("    let a = 1;");
        assert_eq!(text, "let a = 1;");
        assert_eq!(removed, 4);
    }
}

pub fn display_error(error: &Error, file: &Path, source: &str) {
    /*
        Error: TypeError (...)
        -> final.sp:20:9
           |
        20 | let a = #;
           | --------^
    */

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }

    let position = *error.get_position();
    eprintln!("-> {}:{}", file.as_os_str().to_string_lossy(), position);

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position) else {
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    eprintln!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
