use merlin_span::Span;
use serde::{Deserialize, Serialize};

use crate::decl::{FunctionBody, Parameter};
use crate::ids::{ClassId, ConstructorId, TypedefId, VariableId};
use crate::types::{Ident, TypeName};

/// The declaration an identifier resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    /// Top-level variable, field (static or instance), or local variable.
    Variable(VariableId),
    Parameter,
    /// A method, getter or setter of a class.
    Method { class: ClassId, is_static: bool },
    /// A top-level or local function.
    Function,
    Class(ClassId),
    Typedef(TypedefId),
    /// An import prefix.
    Prefix,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Not,
    Complement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    TruncDiv,
    Mod,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::TruncDiv => "~/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

/// One argument of an invocation; `name` is set for named arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: Option<Ident>,
    pub value: Expr,
}

impl Argument {
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    /// A string with `${...}` parts; literal segments are string literals.
    Interpolation(Vec<Expr>),
    Identifier {
        name: String,
        element: Element,
    },
    /// `prefix.name` where `prefix` is an import prefix or a class name.
    PrefixedIdentifier {
        prefix: Ident,
        name: Ident,
        element: Element,
    },
    PropertyAccess {
        target: Box<Expr>,
        name: Ident,
    },
    This,
    Super,
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    List {
        is_const: bool,
        type_arguments: Vec<TypeName>,
        elements: Vec<Expr>,
    },
    Map {
        is_const: bool,
        type_arguments: Vec<TypeName>,
        entries: Vec<MapEntry>,
    },
    /// `new T.name(args)` or `const T.name(args)`.
    InstanceCreation {
        is_const: bool,
        type_name: TypeName,
        constructor: Option<Ident>,
        target: Option<ConstructorId>,
        arguments: Vec<Argument>,
    },
    /// `target.name(args)`, `name(args)` or `super.name(args)`.
    Invocation {
        target: Option<Box<Expr>>,
        name: Ident,
        element: Element,
        arguments: Vec<Argument>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    TypeTest {
        expr: Box<Expr>,
        type_name: TypeName,
        negated: bool,
    },
    Cast {
        expr: Box<Expr>,
        type_name: TypeName,
    },
    Throw(Box<Expr>),
    Rethrow,
    /// `?name`, testing whether an optional parameter was passed.
    ArgumentDefinitionTest {
        name: Ident,
        element: Element,
    },
    Closure {
        parameters: Vec<Parameter>,
        body: Box<FunctionBody>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}
