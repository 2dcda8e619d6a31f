use merlin_span::Span;
use serde::{Deserialize, Serialize};

use crate::ids::{ClassId, TypedefId};

/// A name with its declaration or reference site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// What a type reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTarget {
    Class(ClassId),
    Typedef(TypedefId),
    TypeParameter,
    Dynamic,
    Void,
    /// The name resolved to something that is not a type (a variable, a function, ...).
    NonType,
    Unresolved,
}

/// A type annotation or a type used in a clause (`extends`, `new`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeName {
    pub name: String,
    pub span: Span,
    pub target: TypeTarget,
    #[serde(default)]
    pub arguments: Vec<TypeName>,
}

impl TypeName {
    pub fn class_id(&self) -> Option<ClassId> {
        match self.target {
            TypeTarget::Class(id) => Some(id),
            _ => None,
        }
    }
}
