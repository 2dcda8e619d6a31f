use merlin_span::Span;
use serde::{Deserialize, Serialize};

use crate::decl::FunctionDecl;
use crate::expr::Expr;
use crate::ids::VariableId;
use crate::types::{Ident, TypeName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Expression(Expr),
    /// Local variable declaration; the declaration lives in the program's variable arena.
    Variable(VariableId),
    Block(Block),
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    For {
        variables: Vec<VariableId>,
        condition: Option<Expr>,
        updates: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        variable: VariableId,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Labeled {
        labels: Vec<Ident>,
        body: Box<Stmt>,
    },
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Switch {
        subject: Expr,
        members: Vec<SwitchMember>,
    },
    Try {
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    LocalFunction(FunctionDecl),
    Empty,
}

/// A `case e:` or `default:` member; `expression` is `None` for `default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchMember {
    pub labels: Vec<Ident>,
    pub expression: Option<Expr>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub exception_type: Option<TypeName>,
    pub exception: Option<Ident>,
    pub stack_trace: Option<Ident>,
    pub body: Block,
    pub span: Span,
}
