//! Compilation driver.
//!
//! Sequences the pipeline: source text to tokens, tokens to a tree, the tree
//! through analysis and finally into module text. Each stage is timed at
//! `debug` level.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::ast::Node,
    compiler::compiler::generate,
    errors::errors::{CodegenError, Error},
    lexer::{lexer::tokenize, tokens::Token},
    parser::parser::parse,
    type_checker::{modules::BuiltinModules, type_checker::analyze},
};

/// What the driver writes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    #[default]
    Wat,
    Ast,
    Tokens,
}

impl Emit {
    pub fn from_name(name: &str) -> Option<Emit> {
        match name {
            "wat" => Some(Emit::Wat),
            "ast" => Some(Emit::Ast),
            "tokens" => Some(Emit::Tokens),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub input: PathBuf,
    /// Standard output when unset
    pub output: Option<PathBuf>,
    pub emit: Emit,
}

impl DriverOptions {
    /// Parses `<file.sp> [-o <out.wat>] [--emit=wat|ast|tokens]`, program
    /// name excluded.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut input = None;
        let mut output = None;
        let mut emit = Emit::default();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "-o" {
                let path = args.next().ok_or("missing path after `-o`")?;
                output = Some(PathBuf::from(path));
            } else if let Some(name) = arg.strip_prefix("--emit=") {
                emit = Emit::from_name(name).ok_or(format!("unknown emit kind `{}`", name))?;
            } else if arg.starts_with('-') {
                return Err(format!("unknown option `{}`", arg));
            } else if input.is_none() {
                input = Some(PathBuf::from(arg));
            } else {
                return Err(format!("unexpected argument `{}`", arg));
            }
        }

        Ok(DriverOptions {
            input: input.ok_or("no input file")?,
            output,
            emit,
        })
    }
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no input: the program contains no statements")]
    NoInput,
    #[error("{0}")]
    Syntax(Error),
    #[error("{0}")]
    Semantic(Error),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::NoInput | CompileError::Syntax(_) | CompileError::Semantic(_) => 1,
            CompileError::Io { .. } | CompileError::Codegen(_) => 2,
        }
    }

    /// The positioned diagnostic, when there is one.
    pub fn diagnostic(&self) -> Option<&Error> {
        match self {
            CompileError::Syntax(error) | CompileError::Semantic(error) => Some(error),
            _ => None,
        }
    }
}

/// Owns the state shared by successive compilations.
///
/// Builtin modules compiled for one program are reused by the next. The
/// driver is not `Send`; run one compilation at a time per driver.
#[derive(Debug, Default)]
pub struct Driver {
    modules: BuiltinModules,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modules(&self) -> &BuiltinModules {
        &self.modules
    }

    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, CompileError> {
        let start = Instant::now();
        let tokens = tokenize(source.to_string()).map_err(CompileError::Syntax)?;
        debug!(tokens = tokens.len(), elapsed = ?start.elapsed(), "tokenized");

        // Only the end-of-file token
        if tokens.len() <= 1 {
            return Err(CompileError::NoInput);
        }
        Ok(tokens)
    }

    pub fn parse(&self, source: &str) -> Result<Node, CompileError> {
        let tokens = self.tokenize(source)?;

        let start = Instant::now();
        let root = parse(tokens).map_err(CompileError::Syntax)?;
        debug!(elapsed = ?start.elapsed(), "parsed");

        Ok(root)
    }

    /// Compiles `source` to module text.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn compile(&mut self, source: &str) -> Result<String, CompileError> {
        let root = self.parse(source)?;

        let start = Instant::now();
        let annotated = analyze(root, &mut self.modules).map_err(CompileError::Semantic)?;
        debug!(elapsed = ?start.elapsed(), "analyzed");

        let start = Instant::now();
        let module = generate(&annotated)?;
        debug!(elapsed = ?start.elapsed(), "generated");

        Ok(module)
    }

    /// Runs the pipeline as far as `emit` requires and renders the result.
    pub fn emit(&mut self, source: &str, emit: Emit) -> Result<String, CompileError> {
        match emit {
            Emit::Wat => self.compile(source),
            Emit::Ast => {
                let root = self.parse(source)?;
                let mut text = pretty_print(&format!("Module({})", root));
                text.push('\n');
                Ok(text)
            }
            Emit::Tokens => Ok(self
                .tokenize(source)?
                .iter()
                .map(|token| format!("{}\n", token))
                .collect()),
        }
    }
}

/// Compiles `source` with a fresh driver.
pub fn compile_source(source: &str) -> Result<String, CompileError> {
    Driver::new().compile(source)
}

pub fn read_source(path: &Path) -> Result<String, CompileError> {
    fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `text` to `path`, or to standard output without one.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<(), CompileError> {
    match path {
        Some(path) => fs::write(path, text).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

/// Breaks the one-line tree notation into indented lines.
pub fn pretty_print(text: &str) -> String {
    let mut result = String::new();
    let mut indent: usize = 0;
    let mut ignore_next_space = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' | '[' => {
                let close = if c == '(' { ')' } else { ']' };
                if chars.peek() == Some(&close) {
                    result.push(c);
                    result.push(close);
                    chars.next();
                    continue;
                }

                indent += 1;
                result.push(c);
                result.push('\n');
                result.push_str(&"  ".repeat(indent));
            }
            ')' | ']' => {
                indent = indent.saturating_sub(1);
                result.push('\n');
                result.push_str(&"  ".repeat(indent));
                result.push(c);
            }
            ',' => {
                result.push(c);
                result.push('\n');
                result.push_str(&"  ".repeat(indent));
                ignore_next_space = true;
            }
            ' ' if ignore_next_space => {
                ignore_next_space = false;
            }
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{pretty_print, CompileError, Driver, DriverOptions, Emit};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_options() {
        let options =
            DriverOptions::from_args(args(&["main.sp", "-o", "out.wat", "--emit=ast"])).unwrap();

        assert_eq!(options.input, PathBuf::from("main.sp"));
        assert_eq!(options.output, Some(PathBuf::from("out.wat")));
        assert_eq!(options.emit, Emit::Ast);
    }

    #[test]
    fn test_options_errors() {
        assert!(DriverOptions::from_args(args(&[])).is_err());
        assert!(DriverOptions::from_args(args(&["a.sp", "-o"])).is_err());
        assert!(DriverOptions::from_args(args(&["a.sp", "--emit=exe"])).is_err());
        assert!(DriverOptions::from_args(args(&["a.sp", "b.sp"])).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let mut driver = Driver::new();

        let error = driver.compile("// nothing\n").unwrap_err();
        assert!(matches!(error, CompileError::NoInput));
        assert_eq!(error.exit_code(), 1);

        let error = driver.compile("let = 1;").unwrap_err();
        assert!(matches!(error, CompileError::Syntax(_)));
        assert_eq!(error.exit_code(), 1);

        let error = driver.compile("let a = b;").unwrap_err();
        assert!(matches!(error, CompileError::Semantic(_)));
        assert_eq!(error.exit_code(), 1);
        assert!(error.diagnostic().is_some());

        assert!(driver.compile("class Point { }").is_ok());

        let error = driver
            .compile("class Point { let x: Integer64 = 0; } func main() { let p: Point; let a = p.x; }")
            .unwrap_err();
        assert!(matches!(error, CompileError::Codegen(_)));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_pretty_print() {
        assert_eq!(
            pretty_print("Module([Import(io), Func(n=f, a=FuncArgs([]))])"),
            "Module(\n  [\n    Import(\n      io\n    ),\n    Func(\n      n=f,\n      a=FuncArgs(\n        []\n      )\n    )\n  ]\n)"
        );
    }

    #[test]
    fn test_emit_tokens() {
        let text = Driver::new().emit("let a = 1;", Emit::Tokens).unwrap();

        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().last().unwrap().contains("EOF"));
    }
}
