//! Semantic analysis.
//!
//! Walks the parsed tree once, in source order, against a stack of scopes:
//!
//! - Binds declarations and rejects duplicates in the same scope
//! - Resolves identifiers, member accesses and type annotations
//! - Checks operator, assignment, argument and return types
//! - Enforces which statements may appear at module and class level
//! - Loads builtin modules such as `io` on import
//!
//! Functions and classes are hoisted within their block, so they can be used
//! before their declaration. Every analyzed node records its type and scope.

pub mod expr;
pub mod modules;
pub mod scope;
pub mod stmt;
pub mod type_checker;
