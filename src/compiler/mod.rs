//! Code generation module for the compiler.
//!
//! This module lowers an analyzed AST to WebAssembly text. It handles:
//!
//! - The output buffers and data segment (`context`)
//! - Module layout, globals and function signatures (`compiler`)
//! - Statement and expression lowering (`stmt`, `expr`)
//!
//! Only the integer, boolean and string subset of the language is lowered;
//! classes and methods are reported as unsupported.

pub mod compiler;
pub mod context;
pub mod expr;
pub mod stmt;

#[cfg(test)]
mod tests;
