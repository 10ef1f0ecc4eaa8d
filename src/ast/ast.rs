use std::fmt::{Display, Formatter};

use crate::{type_checker::scope::ScopeId, Position};

use super::{
    expressions::{BinaryOp, UnaryOp},
    statements::{ClassDecl, FormalArg, FunctionDecl, IfStmt, LetDecl, WhileStmt},
    types::{Builtin, Type},
};

/// Unique per parse; handed out by the parser.
pub type NodeId = u32;

/// A single AST node.
///
/// `ty` and `scope` start out empty and are filled in by the analyzer: `ty`
/// with the resolved type, `scope` with the scope that was innermost while
/// the node was analyzed. For identifiers, `binding` names the scope that
/// declared the symbol the name resolved to at that point. Scopes are plain
/// indices, so the node never keeps the symbol table alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    pub kind: NodeKind,
    pub ty: Option<Type>,
    pub scope: Option<ScopeId>,
    pub binding: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Identifier(String),
    IntegerLiteral(i64),
    StringLiteral(String),
    BooleanLiteral(bool),
    UnaryArithmetic {
        op: UnaryOp,
        operand: Box<Node>,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Let(LetDecl),
    FormalArg(FormalArg),
    FormalArgList(Vec<Node>),
    StatementList(Vec<Node>),
    FunctionDecl(FunctionDecl),
    Assignment {
        target: Box<Node>,
        value: Box<Node>,
    },
    ClassDecl(ClassDecl),
    If(IfStmt),
    While(WhileStmt),
    Import(String),
    Return(Option<Box<Node>>),
    /// `left.right`; `right` is always an `Identifier`.
    MemberAccess {
        left: Box<Node>,
        right: Box<Node>,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    BuiltinTypeRef(Builtin),
}

impl Node {
    pub fn new(id: NodeId, position: Position, kind: NodeKind) -> Self {
        Node {
            id,
            position,
            kind,
            ty: None,
            scope: None,
            binding: None,
        }
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Children of a `StatementList`; empty for every other kind.
    pub fn statements(&self) -> &[Node] {
        match &self.kind {
            NodeKind::StatementList(stmts) => stmts,
            _ => &[],
        }
    }

    pub fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Short description for diagnostics, e.g. `function declaration`.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            NodeKind::Identifier(_) => "identifier",
            NodeKind::IntegerLiteral(_) => "integer literal",
            NodeKind::StringLiteral(_) => "string literal",
            NodeKind::BooleanLiteral(_) => "boolean literal",
            NodeKind::UnaryArithmetic { .. } => "unary expression",
            NodeKind::BinaryOp { .. } => "binary expression",
            NodeKind::Let(_) => "let declaration",
            NodeKind::FormalArg(_) => "formal argument",
            NodeKind::FormalArgList(_) => "argument list",
            NodeKind::StatementList(_) => "statement list",
            NodeKind::FunctionDecl(_) => "function declaration",
            NodeKind::Assignment { .. } => "assignment",
            NodeKind::ClassDecl(_) => "class declaration",
            NodeKind::If(_) => "if statement",
            NodeKind::While(_) => "while statement",
            NodeKind::Import(_) => "import",
            NodeKind::Return(_) => "return statement",
            NodeKind::MemberAccess { .. } => "member access",
            NodeKind::Call { .. } => "call",
            NodeKind::BuiltinTypeRef(_) => "type reference",
        }
    }
}

fn write_list(f: &mut Formatter<'_>, nodes: &[Node]) -> std::fmt::Result {
    write!(f, "[")?;
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", node)?;
    }
    write!(f, "]")
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            NodeKind::Identifier(name) => write!(f, "Id({})", name),
            NodeKind::IntegerLiteral(value) => write!(f, "Int({})", value),
            NodeKind::StringLiteral(value) => write!(f, "Str({})", value),
            NodeKind::BooleanLiteral(value) => write!(f, "Bool({})", value),
            NodeKind::UnaryArithmetic { op, operand } => {
                write!(f, "Signed({}, {})", op.symbol(), operand)
            }
            NodeKind::BinaryOp { op, left, right } => {
                write!(f, "{}(l={}, r={})", op.node_name(), left, right)
            }
            NodeKind::Let(decl) => {
                write!(f, "Let(n={}", decl.name)?;
                if let Some(ty) = &decl.explicit_type {
                    write!(f, ", t={}", ty)?;
                }
                if let Some(init) = &decl.initializer {
                    write!(f, ", i={}", init)?;
                }
                write!(f, ")")
            }
            NodeKind::FormalArg(arg) => write!(f, "FArg(n={}, t={})", arg.name, arg.ty),
            NodeKind::FormalArgList(args) => write_list(f, args),
            NodeKind::StatementList(stmts) => write_list(f, stmts),
            NodeKind::FunctionDecl(func) => write!(
                f,
                "Func(n={}, a=FuncArgs({}), r={}, s={})",
                func.name, func.args, func.return_type, func.body
            ),
            NodeKind::Assignment { target, value } => {
                write!(f, "Assign(l={}, r={})", target, value)
            }
            NodeKind::ClassDecl(class) => write!(f, "Class(n={}, s={})", class.name, class.body),
            NodeKind::If(stmt) => {
                write!(f, "If(?={}, then={}, else=", stmt.condition, stmt.then_branch)?;
                match &stmt.else_branch {
                    Some(else_branch) => write!(f, "{})", else_branch),
                    None => write!(f, "[])"),
                }
            }
            NodeKind::While(stmt) => {
                write!(f, "While(?={}, repeat={})", stmt.condition, stmt.body)
            }
            NodeKind::Import(name) => write!(f, "Import({})", name),
            NodeKind::Return(Some(value)) => write!(f, "Return({})", value),
            NodeKind::Return(None) => write!(f, "Return()"),
            NodeKind::MemberAccess { left, right } => write!(f, "Dot(l={}, r={})", left, right),
            NodeKind::Call { callee, args } => {
                write!(f, "Call(n={}, a=FuncArgs(", callee)?;
                write_list(f, args)?;
                write!(f, "))")
            }
            NodeKind::BuiltinTypeRef(builtin) => write!(f, "{}", builtin),
        }
    }
}
