use super::ast::{Node, NodeKind};

#[derive(Debug, Clone, PartialEq)]
pub struct LetDecl {
    pub name: String,
    pub explicit_type: Option<Box<Node>>,
    pub initializer: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormalArg {
    pub name: String,
    pub ty: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    /// Always a `FormalArgList` node.
    pub args: Box<Node>,
    pub return_type: Box<Node>,
    /// Always a `StatementList` node.
    pub body: Box<Node>,
}

impl FunctionDecl {
    pub fn params(&self) -> &[Node] {
        match &self.args.kind {
            NodeKind::FormalArgList(args) => args,
            _ => &[],
        }
    }

    pub fn statements(&self) -> &[Node] {
        self.body.statements()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    /// Always a `StatementList` node.
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Box<Node>,
    pub then_branch: Box<Node>,
    /// Either a `StatementList` or another `If` for `else if` chains.
    pub else_branch: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Box<Node>,
    pub body: Box<Node>,
}
