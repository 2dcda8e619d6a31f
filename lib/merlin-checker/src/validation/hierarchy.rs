//! Validator for class hierarchy legality
//!
//! This validator checks the `extends` and `implements` clauses:
//! - Clauses must name classes, and not the disallowed core types
//! - An interface may be listed only once per clause
//! - A class may not name itself (base cases) or reach itself through a
//!   longer chain of supertypes
//! - The root class extends nothing
//! - Function type aliases may not refer to themselves
//!
//! Classes are collected during the walk; longer cycles are searched in
//! `finalize` with a depth-first walk over the supertype graph.

use std::sync::{Mutex, PoisonError};

use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    ClassDecl, ClassId, ClassKind, Parameter, Program, TypeName, TypeTarget, TypedefDecl,
    TypedefId,
};
use rustc_hash::FxHashSet;

use crate::context::{EvaluationContext, Session};
use crate::cycle::{Cycle, CycleDetector};
use crate::queries::{direct_supertypes, is_disallowed_supertype};
use crate::validation::Validator;

/// Validator for supertype clauses and inheritance cycles
pub struct HierarchyValidator {
    /// Classes seen during the walk
    classes: Mutex<Vec<ClassId>>,
}

impl HierarchyValidator {
    const NAME: &'static str = "hierarchy";

    pub fn new() -> Self {
        Self {
            classes: Mutex::new(Vec::new()),
        }
    }
}

impl Default for HierarchyValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for HierarchyValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_class(
        &self,
        id: ClassId,
        class: &ClassDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner).push(id);

        let program = ctx.program();
        if let Some(superclass) = &class.superclass {
            if program.is_object(id) {
                out.report(ErrorKind::ObjectCannotExtendAnotherClass, superclass.span, args![]);
            } else {
                check_superclass(id, class, superclass, out);
            }
        }

        for mixin in &class.mixins {
            if mixin.class_id() == Some(id) {
                out.report(
                    ErrorKind::RecursiveInterfaceInheritanceBaseCaseExtends,
                    mixin.span,
                    args![Argument::ty(&class.name.name)],
                );
            }
        }

        check_interfaces(id, class, out);
    }

    fn validate_typedef(
        &self,
        id: TypedefId,
        typedef: &TypedefDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if typedef_refers_to_itself(ctx.program(), id) {
            out.report(ErrorKind::RecursiveFunctionTypeAlias, typedef.name.span, args![]);
        }
    }

    fn finalize(&self, session: &Session<'_>, out: &mut DiagnosticCollector) {
        let program = session.program;
        let classes = std::mem::take(
            &mut *self.classes.lock().unwrap_or_else(PoisonError::into_inner),
        );

        for class in classes {
            // Classes naming themselves are reported as base cases
            if direct_supertypes(program, class).contains(&class) {
                continue;
            }
            let Some(cycle) = find_cycle(program, class) else {
                continue;
            };
            let Some(decl) = program.class(class) else {
                continue;
            };
            let path = cycle.render(|id| program.class_name(*id).unwrap_or("?").to_string());
            tracing::debug!(class = %decl.name.name, %path, "inheritance cycle");
            out.report(
                ErrorKind::RecursiveInterfaceInheritance,
                decl.name.span,
                args![Argument::ty(&decl.name.name), path],
            );
        }
    }
}

fn check_superclass(
    id: ClassId,
    class: &ClassDecl,
    superclass: &TypeName,
    out: &mut DiagnosticCollector,
) {
    if is_disallowed_supertype(&superclass.name) {
        out.report(
            ErrorKind::ExtendsDisallowedClass,
            superclass.span,
            args![Argument::ty(&superclass.name)],
        );
        return;
    }

    match superclass.target {
        TypeTarget::Class(target) if target == id => {
            out.report(
                ErrorKind::RecursiveInterfaceInheritanceBaseCaseExtends,
                superclass.span,
                args![Argument::ty(&class.name.name)],
            );
        }
        TypeTarget::Class(_) | TypeTarget::Unresolved => {}
        // Mixin applications report their own superclass kind
        _ if class.kind == ClassKind::MixinApplication => {}
        _ => out.report(ErrorKind::ExtendsNonClass, superclass.span, args![]),
    }
}

fn check_interfaces(id: ClassId, class: &ClassDecl, out: &mut DiagnosticCollector) {
    let mut seen = FxHashSet::default();
    for interface in &class.interfaces {
        if is_disallowed_supertype(&interface.name) {
            out.report(
                ErrorKind::ImplementsDisallowedClass,
                interface.span,
                args![Argument::ty(&interface.name)],
            );
            continue;
        }

        match interface.target {
            TypeTarget::Class(target) => {
                if target == id {
                    out.report(
                        ErrorKind::RecursiveInterfaceInheritanceBaseCaseImplements,
                        interface.span,
                        args![Argument::ty(&class.name.name)],
                    );
                } else if !seen.insert(target) {
                    out.report(
                        ErrorKind::ImplementsRepeated,
                        interface.span,
                        args![Argument::ty(&interface.name)],
                    );
                }
            }
            TypeTarget::Dynamic => out.report(ErrorKind::ImplementsDynamic, interface.span, args![]),
            TypeTarget::Unresolved => {}
            _ => out.report(ErrorKind::ImplementsNonClass, interface.span, args![]),
        }
    }
}

/// A supertype cycle that starts and ends at `start`.
fn find_cycle(program: &Program, start: ClassId) -> Option<Cycle<ClassId>> {
    let mut detector = CycleDetector::new();
    let mut finished = FxHashSet::default();
    search(program, start, start, &mut detector, &mut finished)
}

fn search(
    program: &Program,
    node: ClassId,
    start: ClassId,
    detector: &mut CycleDetector<ClassId>,
    finished: &mut FxHashSet<ClassId>,
) -> Option<Cycle<ClassId>> {
    if finished.contains(&node) {
        return None;
    }
    if let Err(cycle) = detector.enter(node) {
        // Cycles that do not pass through `start` belong to other classes
        return (*cycle.entry() == start).then_some(cycle);
    }

    for next in direct_supertypes(program, node) {
        if next == node {
            continue;
        }
        if let Some(cycle) = search(program, next, start, detector, finished) {
            detector.exit();
            return Some(cycle);
        }
    }

    detector.exit();
    finished.insert(node);
    None
}

fn typedef_refers_to_itself(program: &Program, start: TypedefId) -> bool {
    let mut visited = FxHashSet::default();
    let mut queue = vec![start];
    while let Some(next) = queue.pop() {
        let Some(typedef) = program.typedef(next) else {
            continue;
        };
        for referenced in signature_typedefs(typedef.return_type.as_ref(), &typedef.parameters) {
            if referenced == start {
                return true;
            }
            if visited.insert(referenced) {
                queue.push(referenced);
            }
        }
    }
    false
}

/// Typedefs named anywhere in a signature, including type arguments.
fn signature_typedefs(return_type: Option<&TypeName>, parameters: &[Parameter]) -> Vec<TypedefId> {
    let mut found = Vec::new();
    let mut pending: Vec<&TypeName> = return_type
        .into_iter()
        .chain(parameters.iter().filter_map(|p| p.declared_type.as_ref()))
        .collect();
    while let Some(ty) = pending.pop() {
        if let TypeTarget::Typedef(id) = ty.target {
            found.push(id);
        }
        pending.extend(&ty.arguments);
    }
    found
}
