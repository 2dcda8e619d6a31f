use merlin_span::{SourceId, Span};
use serde::{Deserialize, Serialize};

use crate::expr::{Argument, Expr};
use crate::ids::{ClassId, ConstructorId, LibraryId, TypedefId, VariableId};
use crate::stmt::Block;
use crate::types::{Ident, TypeName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    pub uri: String,
    /// Internal libraries may only be imported or exported by other internal libraries.
    #[serde(default)]
    pub is_internal: bool,
    pub units: Vec<CompilationUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub source: SourceId,
    pub path: String,
    #[serde(default)]
    pub directives: Vec<Directive>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Combinator {
    Show(Vec<Ident>),
    Hide(Vec<Ident>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DirectiveKind {
    Import {
        prefix: Option<Ident>,
        combinators: Vec<Combinator>,
    },
    Export {
        combinators: Vec<Combinator>,
    },
    Part,
}

/// What the resolver found at a directive's URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UriTarget {
    Library(LibraryId),
    /// A compilation unit that declares itself part of another library.
    PartFile,
    Missing,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UriReference {
    pub text: String,
    #[serde(default)]
    pub interpolated: bool,
    pub target: UriTarget,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub uri: UriReference,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Class(ClassId),
    Function(FunctionDecl),
    Variable(VariableId),
    Typedef(TypedefId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Declaration,
    /// `class C = S with M;`
    MixinApplication,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Ident,
    pub library: LibraryId,
    pub kind: ClassKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub type_parameters: Vec<Ident>,
    pub superclass: Option<TypeName>,
    #[serde(default)]
    pub mixins: Vec<TypeName>,
    #[serde(default)]
    pub interfaces: Vec<TypeName>,
    #[serde(default)]
    pub members: Vec<Member>,
    pub span: Span,
}

impl ClassDecl {
    pub fn fields(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.members.iter().filter_map(|member| match member {
            Member::Field(id) => Some(*id),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = ConstructorId> + '_ {
        self.members.iter().filter_map(|member| match member {
            Member::Constructor(id) => Some(*id),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Field(VariableId),
    Method(MethodDecl),
    Constructor(ConstructorId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableOwner {
    Library(LibraryId),
    Class(ClassId),
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: Ident,
    pub owner: VariableOwner,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_static: bool,
    pub declared_type: Option<TypeName>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

impl VariableDecl {
    /// Instance fields are class-owned and not static.
    pub fn is_instance_field(&self) -> bool {
        matches!(self.owner, VariableOwner::Class(_)) && !self.is_static
    }

    pub fn is_final_or_const(&self) -> bool {
        self.is_final || self.is_const
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
    Operator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionBody {
    Block(Block),
    /// `=> expression`
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Ident,
    pub kind: MethodKind,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub body: Option<FunctionBody>,
    pub span: Span,
}

/// Top-level or local function (including top-level getters and setters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: Ident,
    pub kind: MethodKind,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub body: Option<FunctionBody>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub class: ClassId,
    /// The class name as written in front of the constructor name.
    pub return_type: Ident,
    pub name: Option<Ident>,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_factory: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub initializers: Vec<Initializer>,
    /// Factory redirection `factory C() = D.name;`
    pub redirect: Option<ConstructorRedirect>,
    pub body: Option<FunctionBody>,
    pub span: Span,
}

impl ConstructorDecl {
    pub fn is_generative(&self) -> bool {
        !self.is_factory
    }

    /// Span used to point at the constructor as a whole: `C` or `C.name`.
    pub fn name_span(&self) -> Span {
        match &self.name {
            Some(name) => self.return_type.span.to(name.span),
            None => self.return_type.span,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{}.{}", self.return_type.name, name.name),
            None => self.return_type.name.clone(),
        }
    }

    pub fn redirect_initializers(&self) -> impl Iterator<Item = &Initializer> {
        self.initializers
            .iter()
            .filter(|init| matches!(init.kind, InitializerKind::Redirect { .. }))
    }

    pub fn is_redirecting(&self) -> bool {
        self.redirect_initializers().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorRedirect {
    pub type_name: TypeName,
    pub constructor: Option<Ident>,
    pub target: Option<ConstructorId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub kind: InitializerKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InitializerKind {
    /// `field = value`
    Field { field: Ident, value: Expr },
    /// `super(args)` or `super.name(args)`
    Super {
        constructor: Option<Ident>,
        arguments: Vec<Argument>,
    },
    /// `this(args)` or `this.name(args)`
    Redirect {
        constructor: Option<Ident>,
        arguments: Vec<Argument>,
        target: Option<ConstructorId>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefDecl {
    pub name: Ident,
    pub library: LibraryId,
    #[serde(default)]
    pub type_parameters: Vec<Ident>,
    pub return_type: Option<TypeName>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    Required,
    OptionalPositional,
    Named,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Ident,
    pub kind: ParameterKind,
    /// `this.name` parameter.
    #[serde(default)]
    pub is_field_formal: bool,
    #[serde(default)]
    pub is_const: bool,
    pub declared_type: Option<TypeName>,
    pub default_value: Option<Expr>,
    pub span: Span,
}

impl Parameter {
    pub fn is_optional(&self) -> bool {
        !matches!(self.kind, ParameterKind::Required)
    }
}

/// Parameter counts used when comparing signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arity {
    pub required: usize,
    pub optional_positional: usize,
}

pub fn arity(parameters: &[Parameter]) -> Arity {
    let mut arity = Arity::default();
    for parameter in parameters {
        match parameter.kind {
            ParameterKind::Required => arity.required += 1,
            ParameterKind::OptionalPositional => arity.optional_positional += 1,
            ParameterKind::Named => {}
        }
    }
    arity
}
