use std::cell::{RefCell, RefMut};

use merlin_resolved::{ClassId, ConstructorId, Ident, LibraryId, Program, SourceId, VariableId};

use crate::config::ValidationConfig;
use crate::constant::ConstantState;
use crate::namespace::Namespaces;

/// State shared by every node of one evaluation run.
pub struct Session<'a> {
    pub program: &'a Program,
    pub config: &'a ValidationConfig,
    pub namespaces: Namespaces,
    constants: RefCell<ConstantState>,
}

impl<'a> Session<'a> {
    pub fn new(program: &'a Program, config: &'a ValidationConfig) -> Self {
        Self {
            program,
            config,
            namespaces: Namespaces::compute(program),
            constants: RefCell::new(ConstantState::default()),
        }
    }

    /// Constant values computed so far.
    ///
    /// # Panics
    ///
    /// Panics when borrowed twice; constant evaluation never nests a second
    /// borrow.
    pub fn constants(&self) -> RefMut<'_, ConstantState> {
        self.constants.borrow_mut()
    }
}

/// The executable member that encloses a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberContext {
    /// Directly in a library: top-level variable initializers, directives.
    Library,
    TopLevelFunction,
    StaticField,
    InstanceField,
    StaticMethod,
    InstanceMethod,
    Constructor {
        id: ConstructorId,
        generative: bool,
    },
    /// A constructor's initializer list, including `super(...)` and `this(...)` arguments.
    Initializers(ConstructorId),
    /// The signature of a function type alias.
    Typedef,
}

impl MemberContext {
    /// Whether `this` denotes an instance here.
    pub fn has_this(self) -> bool {
        matches!(
            self,
            MemberContext::InstanceMethod | MemberContext::Constructor { generative: true, .. }
        )
    }

    pub fn is_static(self) -> bool {
        matches!(self, MemberContext::StaticField | MemberContext::StaticMethod)
    }

    pub fn constructor(self) -> Option<ConstructorId> {
        match self {
            MemberContext::Constructor { id, .. } | MemberContext::Initializers(id) => Some(id),
            _ => None,
        }
    }
}

/// A label in scope, with the function nesting depth it was declared at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelScope {
    pub name: String,
    pub function_depth: usize,
}

/// Scoped state threaded through the walk.
///
/// Nested scopes get modified copies; a context is never mutated after a
/// child has seen it.
#[derive(Clone)]
pub struct EvaluationContext<'a> {
    pub session: &'a Session<'a>,
    pub library: LibraryId,
    /// The compilation unit being walked.
    pub source: SourceId,
    pub class: Option<ClassId>,
    pub member: MemberContext,
    /// Inside an expression that must be a compile-time constant.
    pub in_constant: bool,
    pub in_catch: bool,
    pub function_depth: usize,
    pub labels: Vec<LabelScope>,
    /// The local variable whose initializer is being walked.
    pub initializing: Option<VariableId>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(session: &'a Session<'a>, library: LibraryId, source: SourceId) -> Self {
        Self {
            session,
            library,
            source,
            class: None,
            member: MemberContext::Library,
            in_constant: false,
            in_catch: false,
            function_depth: 0,
            labels: Vec::new(),
            initializing: None,
        }
    }

    pub fn program(&self) -> &'a Program {
        self.session.program
    }

    pub fn config(&self) -> &'a ValidationConfig {
        self.session.config
    }

    pub fn with_class(&self, class: ClassId) -> Self {
        Self {
            class: Some(class),
            ..self.clone()
        }
    }

    pub fn with_member(&self, member: MemberContext) -> Self {
        Self {
            member,
            ..self.clone()
        }
    }

    pub fn with_constant(&self, in_constant: bool) -> Self {
        Self {
            in_constant: self.in_constant || in_constant,
            ..self.clone()
        }
    }

    pub fn with_catch(&self) -> Self {
        Self {
            in_catch: true,
            ..self.clone()
        }
    }

    pub fn with_initializing(&self, variable: VariableId) -> Self {
        Self {
            initializing: Some(variable),
            ..self.clone()
        }
    }

    pub fn with_labels(&self, labels: &[Ident]) -> Self {
        let mut context = self.clone();
        context.labels.extend(labels.iter().map(|label| LabelScope {
            name: label.name.clone(),
            function_depth: self.function_depth,
        }));
        context
    }

    /// Entering a function body: catch clauses and constant mode do not
    /// reach into it.
    pub fn enter_function(&self) -> Self {
        Self {
            in_catch: false,
            in_constant: false,
            function_depth: self.function_depth + 1,
            ..self.clone()
        }
    }

    /// Innermost label called `name`.
    pub fn find_label(&self, name: &str) -> Option<&LabelScope> {
        self.labels.iter().rev().find(|label| label.name == name)
    }
}
