//! The resolved program model consumed by the diagnostics engine.
//!
//! A resolver (outside this workspace) hands over libraries, compilation
//! units, declarations, statements and expressions in which every name has
//! been bound to its declaration. Declarations that are referenced from
//! elsewhere (classes, variables, constructors, typedefs) live in arenas
//! indexed by typed ids; everything else is owned by its parent node.

mod arena;
mod builder;
mod decl;
mod expr;
mod ids;
mod program;
mod stmt;
mod types;

pub use arena::Arena;
pub use builder::{
    BodySpec, CtorSpec, DirectiveSpec, MethodSpec, ParamSpec, ProgramBuilder, TypedefSpec, VarSpec,
};
pub use decl::*;
pub use expr::*;
pub use ids::{ArenaId, ClassId, ConstructorId, LibraryId, TypedefId, VariableId};
pub use program::Program;
pub use stmt::*;
pub use types::{Ident, TypeName, TypeTarget};

pub use merlin_span::{SourceId, Span};
