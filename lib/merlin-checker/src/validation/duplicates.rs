//! Validator for duplicate definitions
//!
//! Ensures no name is defined twice within one scope:
//! - Top-level declarations across all units of a library
//! - Members of a class, where a getter and a method of the same name get
//!   a dedicated pair of kinds
//! - Parameters of one parameter list, locals of one block
//!
//! Collisions that only exist through inheritance walk the superclass
//! chain: a static member hiding an inherited instance member, and a
//! getter or method clashing with an inherited method or getter.
//!
//! A getter and a setter of the same name may coexist.

use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    ClassDecl, ClassId, Declaration, Ident, Library, LibraryId, Member, MethodKind, Parameter, Program,
    Stmt, StmtKind,
};
use rustc_hash::FxHashMap;

use crate::context::EvaluationContext;
use crate::queries::inherited_instance_member;
use crate::validation::Validator;

/// Validator that ensures no duplicate definitions exist
pub struct DuplicateDefinitionValidator;

impl DuplicateDefinitionValidator {
    const NAME: &'static str = "duplicate_definitions";

    pub fn new() -> Self {
        Self
    }
}

impl Default for DuplicateDefinitionValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// What a name is bound to, for getter/setter pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Getter,
    Setter,
    Method,
    Other,
}

impl Binding {
    fn of(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Getter => Binding::Getter,
            MethodKind::Setter => Binding::Setter,
            MethodKind::Method => Binding::Method,
            MethodKind::Operator => Binding::Other,
        }
    }

    fn pairs_with(self, other: Binding) -> bool {
        matches!((self, other), (Binding::Getter, Binding::Setter) | (Binding::Setter, Binding::Getter))
    }
}

impl Validator for DuplicateDefinitionValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_library(
        &self,
        _id: LibraryId,
        library: &Library,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let program = ctx.program();
        let mut scope = Scope::default();
        for declaration in library.units.iter().flat_map(|unit| &unit.declarations) {
            let entry = match declaration {
                Declaration::Class(id) => program.class(*id).map(|c| (&c.name, Binding::Other)),
                Declaration::Function(function) => Some((&function.name, Binding::of(function.kind))),
                Declaration::Variable(id) => program.variable(*id).map(|v| (&v.name, Binding::Other)),
                Declaration::Typedef(id) => program.typedef(*id).map(|t| (&t.name, Binding::Other)),
            };
            if let Some((name, binding)) = entry {
                if scope.declare(name, binding).is_some() {
                    out.report(ErrorKind::DuplicateDefinition, name.span, args![&name.name]);
                }
            }
        }
    }

    fn validate_class(
        &self,
        id: ClassId,
        class: &ClassDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let program = ctx.program();
        let mut scope = Scope::default();
        for member in &class.members {
            let (name, binding) = match member {
                Member::Field(field) => match program.variable(*field) {
                    Some(variable) => (&variable.name, Binding::Other),
                    None => continue,
                },
                Member::Method(method) => (&method.name, Binding::of(method.kind)),
                Member::Constructor(_) => continue,
            };

            match (scope.declare(name, binding), binding) {
                (None, _) => {}
                (Some(Binding::Method), Binding::Getter) => out.report(
                    ErrorKind::ConflictingGetterAndMethod,
                    name.span,
                    args![Argument::ty(&class.name.name), Argument::ty(&class.name.name), &name.name],
                ),
                (Some(Binding::Getter), Binding::Method) => out.report(
                    ErrorKind::ConflictingMethodAndGetter,
                    name.span,
                    args![Argument::ty(&class.name.name), Argument::ty(&class.name.name), &name.name],
                ),
                (Some(_), _) => out.report(ErrorKind::DuplicateDefinition, name.span, args![&name.name]),
            }
        }

        check_inherited(program, id, class, out);
    }

    fn validate_parameters(
        &self,
        parameters: &[Parameter],
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let mut scope = Scope::default();
        for parameter in parameters {
            if scope.declare(&parameter.name, Binding::Other).is_some() {
                out.report(
                    ErrorKind::DuplicateDefinition,
                    parameter.name.span,
                    args![&parameter.name.name],
                );
            }
        }
    }

    fn validate_block(
        &self,
        statements: &[Stmt],
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let program = ctx.program();
        let mut scope = Scope::default();
        for stmt in statements {
            let name = match &stmt.kind {
                StmtKind::Variable(id) => program.variable(*id).map(|v| &v.name),
                StmtKind::LocalFunction(function) => Some(&function.name),
                _ => None,
            };
            if let Some(name) = name {
                if scope.declare(name, Binding::Other).is_some() {
                    out.report(ErrorKind::DuplicateDefinition, name.span, args![&name.name]);
                }
            }
        }
    }
}

/// Names declared so far in one scope.
#[derive(Default)]
struct Scope {
    names: FxHashMap<String, Vec<Binding>>,
}

impl Scope {
    /// Declare `name`; returns the earlier binding it clashes with.
    fn declare(&mut self, name: &Ident, binding: Binding) -> Option<Binding> {
        let bindings = self.names.entry(name.name.clone()).or_default();
        let clash = bindings.iter().copied().find(|earlier| !earlier.pairs_with(binding));
        bindings.push(binding);
        clash
    }
}

fn check_inherited(
    program: &Program,
    id: ClassId,
    class: &ClassDecl,
    out: &mut DiagnosticCollector,
) {
    for member in &class.members {
        let (name, is_static, binding) = match member {
            Member::Field(field) => match program.variable(*field) {
                Some(variable) => (&variable.name, variable.is_static, Binding::Getter),
                None => continue,
            },
            Member::Method(method) => (&method.name, method.is_static, Binding::of(method.kind)),
            Member::Constructor(_) => continue,
        };
        if binding == Binding::Setter || (binding == Binding::Other && !is_static) {
            continue;
        }
        let Some((owner, inherited)) = inherited_instance_member(program, id, &name.name) else {
            continue;
        };

        if is_static {
            let owner_name = program.class_name(owner).unwrap_or("?");
            out.report(
                ErrorKind::DuplicateDefinitionInheritance,
                name.span,
                args![&name.name, Argument::ty(owner_name)],
            );
        } else if binding == Binding::Method && inherited.is_getter_like() {
            out.report(ErrorKind::MethodAndGetterWithSameName, name.span, args![&name.name]);
        } else if binding == Binding::Getter && inherited.is_method() {
            out.report(ErrorKind::GetterAndMethodWithSameName, name.span, args![&name.name]);
        }
    }
}
