//! Validator for mixin applications
//!
//! For `class C extends S with M` and `class C = S with M;`:
//! - `S` of a mixin application must be a class
//! - Each `M` must be a class that extends the root class directly, declares
//!   no constructors and never mentions `super`

use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind};
use merlin_resolved::{ClassDecl, ClassId, ClassKind, Program, TypeName, TypeTarget};

use crate::context::EvaluationContext;
use crate::queries::references_super;
use crate::validation::Validator;

/// Validator for the `with` clause
pub struct MixinValidator;

impl MixinValidator {
    const NAME: &'static str = "mixins";

    pub fn new() -> Self {
        Self
    }
}

impl Default for MixinValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for MixinValidator {
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
        if class.kind == ClassKind::MixinApplication {
            if let Some(superclass) = &class.superclass {
                if !matches!(superclass.target, TypeTarget::Class(_) | TypeTarget::Unresolved) {
                    out.report(ErrorKind::MixinWithNonClassSuperclass, superclass.span, args![]);
                }
            }
        }

        for mixin in &class.mixins {
            match mixin.target {
                // Naming the class itself is an inheritance base case
                TypeTarget::Class(target) if target == id => {}
                TypeTarget::Class(target) => check_mixin(ctx.program(), target, mixin, out),
                TypeTarget::Unresolved => {}
                _ => out.report(ErrorKind::MixinOfNonClass, mixin.span, args![]),
            }
        }
    }
}

fn check_mixin(program: &Program, mixin: ClassId, ty: &TypeName, out: &mut DiagnosticCollector) {
    let Some(decl) = program.class(mixin) else {
        return;
    };

    let extends_other = match &decl.superclass {
        Some(superclass) => match superclass.target {
            TypeTarget::Class(target) => !program.is_object(target),
            TypeTarget::Unresolved => false,
            _ => true,
        },
        None => false,
    };
    if extends_other || !decl.mixins.is_empty() {
        out.report(ErrorKind::MixinInheritsFromNotObject, ty.span, args![Argument::ty(&ty.name)]);
    }

    if program.declares_constructors(mixin) {
        out.report(ErrorKind::MixinDeclaresConstructor, ty.span, args![Argument::ty(&ty.name)]);
    }

    if references_super(program, mixin) {
        out.report(ErrorKind::MixinReferencesSuper, ty.span, args![Argument::ty(&ty.name)]);
    }
}
