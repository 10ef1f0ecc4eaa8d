/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: the `Node` / `NodeKind` sum type and its printer
/// - expressions: operator enums
/// - statements: declaration and control-flow payloads
/// - types: builtin type names and resolved type identity
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
