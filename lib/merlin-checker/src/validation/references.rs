//! Validator for references that depend on their context
//!
//! - `this` and `super` need an instance: instance methods and generative
//!   constructor bodies
//! - Instance members cannot be reached implicitly from static members,
//!   factories, field initializers or initializer lists
//! - A local cannot be read in its own initializer
//! - `?name` only tests parameters
//! - A named argument is passed at most once
//! - Map literal keys are strings, and `new` passes the right number of
//!   type arguments

use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    Argument as ActualArgument, ConstructorDecl, ConstructorId, Element, Expr, ExprKind, InitializerKind, Span,
};
use rustc_hash::FxHashSet;

use crate::context::{EvaluationContext, MemberContext};
use crate::queries::type_parameter_count;
use crate::validation::Validator;

/// Validator for contextual references
pub struct ReferenceValidator;

impl ReferenceValidator {
    const NAME: &'static str = "references";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ReferenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ReferenceValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_constructor(
        &self,
        _id: ConstructorId,
        constructor: &ConstructorDecl,
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        for initializer in &constructor.initializers {
            if let InitializerKind::Super { arguments, .. } | InitializerKind::Redirect { arguments, .. } =
                &initializer.kind
            {
                check_named_arguments(arguments, out);
            }
        }
    }

    fn validate_expression(
        &self,
        expr: &Expr,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        match &expr.kind {
            ExprKind::This if !ctx.member.has_this() => {
                out.report(ErrorKind::InvalidReferenceToThis, expr.span, args![]);
            }
            ExprKind::Super if !ctx.member.has_this() => {
                out.report(ErrorKind::SuperInInvalidContext, expr.span, args![]);
            }
            ExprKind::Identifier { name, element } => {
                check_implicit_this(*element, expr.span, ctx, out);
                if let Element::Variable(id) = element {
                    if ctx.initializing == Some(*id) {
                        out.report(
                            ErrorKind::ReferenceToDeclaredVariableInInitializer,
                            expr.span,
                            args![name],
                        );
                    }
                }
            }
            ExprKind::Invocation {
                target: None,
                name,
                element,
                arguments,
            } => {
                check_implicit_this(*element, name.span, ctx, out);
                check_named_arguments(arguments, out);
            }
            ExprKind::Invocation { arguments, .. } => check_named_arguments(arguments, out),
            ExprKind::InstanceCreation {
                is_const,
                type_name,
                arguments,
                ..
            } => {
                check_named_arguments(arguments, out);
                // Constant creations are checked by the evaluator
                if !is_const && !type_name.arguments.is_empty() {
                    if let Some(declared) = type_parameter_count(ctx.program(), type_name.target) {
                        if declared != type_name.arguments.len() {
                            out.report(
                                ErrorKind::NewWithInvalidTypeParameters,
                                type_name.span,
                                args![Argument::ty(&type_name.name), declared, type_name.arguments.len()],
                            );
                        }
                    }
                }
            }
            ExprKind::ArgumentDefinitionTest { name, element } if *element != Element::Parameter => {
                out.report(
                    ErrorKind::ArgumentDefinitionTestNonParameter,
                    name.span,
                    args![&name.name],
                );
            }
            ExprKind::Map { type_arguments, .. } => {
                if let Some(key) = type_arguments.first().filter(|_| type_arguments.len() == 2) {
                    if key.name != "String" {
                        out.report(ErrorKind::InvalidTypeArgumentForKey, key.span, args![]);
                    }
                }
            }
            _ => {}
        }
    }
}

/// An unqualified reference to an instance member reads `this`.
fn check_implicit_this(
    element: Element,
    span: Span,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    let instance_member = match element {
        Element::Method { is_static, .. } => !is_static,
        Element::Variable(id) => ctx.program().variable(id).is_some_and(|v| v.is_instance_field()),
        _ => false,
    };
    if !instance_member {
        return;
    }

    match ctx.member {
        MemberContext::InstanceField | MemberContext::Initializers(_) => {
            out.report(ErrorKind::ImplicitThisReferenceInInitializer, span, args![]);
        }
        MemberContext::StaticField
        | MemberContext::StaticMethod
        | MemberContext::Constructor {
            generative: false, ..
        } => {
            out.report(ErrorKind::InstanceMemberAccessFromStatic, span, args![]);
        }
        _ => {}
    }
}

fn check_named_arguments(arguments: &[ActualArgument], out: &mut DiagnosticCollector) {
    let mut seen = FxHashSet::default();
    for name in arguments.iter().filter_map(|a| a.name.as_ref()) {
        if !seen.insert(name.name.as_str()) {
            out.report(ErrorKind::DuplicateNamedArgument, name.span, args![&name.name]);
        }
    }
}
