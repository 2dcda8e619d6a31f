use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::decl::{
    ClassDecl, ConstructorDecl, Library, Member, MethodDecl, TypedefDecl, VariableDecl,
};
use crate::ids::{ClassId, ConstructorId, LibraryId, TypedefId, VariableId};

/// A fully resolved program: the input of the diagnostics engine.
///
/// Every cross-reference is an id into one of the arenas. Lookups return
/// `Option` so incomplete resolver output degrades instead of panicking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub libraries: Arena<LibraryId, Library>,
    pub classes: Arena<ClassId, ClassDecl>,
    pub variables: Arena<VariableId, VariableDecl>,
    pub constructors: Arena<ConstructorId, ConstructorDecl>,
    pub typedefs: Arena<TypedefId, TypedefDecl>,
    /// The root of the class hierarchy, when the program includes it.
    #[serde(default)]
    pub object_class: Option<ClassId>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn library(&self, id: LibraryId) -> Option<&Library> {
        self.libraries.get(id)
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassDecl> {
        self.classes.get(id)
    }

    pub fn variable(&self, id: VariableId) -> Option<&VariableDecl> {
        self.variables.get(id)
    }

    pub fn constructor(&self, id: ConstructorId) -> Option<&ConstructorDecl> {
        self.constructors.get(id)
    }

    pub fn typedef(&self, id: TypedefId) -> Option<&TypedefDecl> {
        self.typedefs.get(id)
    }

    pub fn class_name(&self, id: ClassId) -> Option<&str> {
        self.class(id).map(|class| class.name.as_str())
    }

    pub fn is_object(&self, id: ClassId) -> bool {
        self.object_class == Some(id)
    }

    /// The direct superclass: the `extends` target, or the root class when
    /// no clause is written. `None` for the root itself, for unresolved
    /// or non-class superclass clauses, and for ids with no declaration.
    pub fn superclass_of(&self, id: ClassId) -> Option<ClassId> {
        let class = self.class(id)?;
        let superclass = match &class.superclass {
            Some(type_name) => type_name.class_id(),
            None if self.is_object(id) => None,
            None => self.object_class,
        };
        superclass.filter(|superclass| self.class(*superclass).is_some())
    }

    pub fn find_field(&self, class: ClassId, name: &str) -> Option<(VariableId, &VariableDecl)> {
        let class = self.class(class)?;
        class.fields().find_map(|id| {
            let variable = self.variable(id)?;
            (variable.name.name == name).then_some((id, variable))
        })
    }

    pub fn find_method(&self, class: ClassId, name: &str) -> Option<&MethodDecl> {
        self.class(class)?.methods().find(|m| m.name.name == name)
    }

    /// Constructor lookup by name; `None` asks for the unnamed constructor.
    pub fn find_constructor(
        &self,
        class: ClassId,
        name: Option<&str>,
    ) -> Option<(ConstructorId, &ConstructorDecl)> {
        let class = self.class(class)?;
        class.constructors().find_map(|id| {
            let constructor = self.constructor(id)?;
            let ctor_name = constructor.name.as_ref().map(|n| n.name.as_str());
            (ctor_name == name).then_some((id, constructor))
        })
    }

    pub fn declares_constructors(&self, class: ClassId) -> bool {
        self.class(class)
            .is_some_and(|class| class.members.iter().any(|m| matches!(m, Member::Constructor(_))))
    }
}
