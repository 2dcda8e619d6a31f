//! Validator for override signatures
//!
//! An instance method that overrides an inherited method must accept every
//! call the overridden method accepts:
//! - exactly the same number of required parameters
//! - at least as many optional positional parameters
//! - every named parameter of the overridden method
//!
//! A required-count mismatch stops the comparison; the other mismatches are
//! reported independently, one diagnostic per missing named parameter.

use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind};
use merlin_resolved::{arity, MethodDecl, MethodKind, ParameterKind};

use crate::context::EvaluationContext;
use crate::queries::overridden_method;
use crate::validation::Validator;

/// Validator for method override compatibility
pub struct OverrideValidator;

impl OverrideValidator {
    const NAME: &'static str = "overrides";

    pub fn new() -> Self {
        Self
    }
}

impl Default for OverrideValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for OverrideValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_method(
        &self,
        method: &MethodDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if method.is_static || method.kind != MethodKind::Method {
            return;
        }
        let Some(class) = ctx.class else {
            return;
        };
        let program = ctx.program();
        let Some((owner, overridden)) = overridden_method(program, class, &method.name.name) else {
            return;
        };
        let owner = Argument::ty(program.class_name(owner).unwrap_or("?"));

        let mine = arity(&method.parameters);
        let theirs = arity(&overridden.parameters);
        let span = method.name.span;

        if mine.required != theirs.required {
            out.report(ErrorKind::InvalidOverrideRequired, span, args![theirs.required, owner]);
            return;
        }

        if mine.optional_positional < theirs.optional_positional {
            out.report(
                ErrorKind::InvalidOverridePositional,
                span,
                args![theirs.optional_positional, owner.clone()],
            );
        }

        let named = overridden.parameters.iter().filter(|p| p.kind == ParameterKind::Named);
        for parameter in named {
            let declared = method
                .parameters
                .iter()
                .any(|p| p.kind == ParameterKind::Named && p.name.name == parameter.name.name);
            if !declared {
                out.report(
                    ErrorKind::InvalidOverrideNamed,
                    span,
                    args![&parameter.name.name, owner.clone()],
                );
            }
        }
    }
}
