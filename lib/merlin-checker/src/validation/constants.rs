//! Validator for compile-time constants
//!
//! Runs the constant evaluator at the root of every constant context:
//! - `const` variables, evaluated once per run through the shared cache
//! - Default values of optional parameters
//! - Initializer lists of `const` constructors, where parameters are
//!   potentially constant
//! - `const` list, map and creation expressions that are not nested in
//!   another constant context
//!
//! Case expressions are evaluated by the switch validator, which also needs
//! their values.

use merlin_diagnostics::{DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    ConstructorDecl, ConstructorId, Expr, ExprKind, InitializerKind, Parameter, VariableDecl,
    VariableId,
};

use crate::constant::ConstantEvaluator;
use crate::context::{EvaluationContext, MemberContext};
use crate::validation::Validator;

/// Validator that evaluates constant contexts
pub struct ConstantValidator;

impl ConstantValidator {
    const NAME: &'static str = "constants";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstantValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ConstantValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_variable(
        &self,
        id: VariableId,
        variable: &VariableDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if !variable.is_const {
            return;
        }
        let mut state = ctx.session.constants();
        let mut evaluator = ConstantEvaluator::new(
            ctx.program(),
            &mut state,
            out,
            ctx.config().checked_mode,
        );
        evaluator.check_variable(id);
    }

    fn validate_parameters(
        &self,
        parameters: &[Parameter],
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        // Typedef defaults are an error of their own
        if ctx.member == MemberContext::Typedef && ctx.function_depth == 0 {
            return;
        }
        let defaults: Vec<&Expr> = parameters.iter().filter_map(|p| p.default_value.as_ref()).collect();
        if defaults.is_empty() {
            return;
        }

        let mut state = ctx.session.constants();
        let mut evaluator = ConstantEvaluator::new(
            ctx.program(),
            &mut state,
            out,
            ctx.config().checked_mode,
        );
        for default in defaults {
            evaluator.evaluate_root(default, ErrorKind::NonConstantDefaultValue);
        }
    }

    fn validate_constructor(
        &self,
        _id: ConstructorId,
        constructor: &ConstructorDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if !constructor.is_const || constructor.is_factory {
            return;
        }

        let mut state = ctx.session.constants();
        let mut evaluator =
            ConstantEvaluator::new(ctx.program(), &mut state, out, ctx.config().checked_mode).with_parameters();
        for initializer in &constructor.initializers {
            match &initializer.kind {
                InitializerKind::Field { value, .. } => {
                    evaluator.evaluate_root(value, ErrorKind::NonConstantValueInInitializer);
                }
                InitializerKind::Super { arguments, .. } | InitializerKind::Redirect { arguments, .. } => {
                    for argument in arguments {
                        evaluator.evaluate_root(
                            &argument.value,
                            ErrorKind::NonConstantValueInInitializer,
                        );
                    }
                }
            }
        }
    }

    fn validate_expression(
        &self,
        expr: &Expr,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if ctx.in_constant {
            return;
        }
        let is_const = match &expr.kind {
            ExprKind::List { is_const, .. }
            | ExprKind::Map { is_const, .. }
            | ExprKind::InstanceCreation { is_const, .. } => *is_const,
            _ => false,
        };
        if !is_const {
            return;
        }

        let mut state = ctx.session.constants();
        let mut evaluator = ConstantEvaluator::new(
            ctx.program(),
            &mut state,
            out,
            ctx.config().checked_mode,
        );
        // A constant literal is always constant; only its parts can fail
        let _ = evaluator.evaluate(expr);
    }
}
