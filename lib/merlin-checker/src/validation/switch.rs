//! Validator for switch statements
//!
//! Every case expression must be a constant. All constant cases share the
//! type of the first one, and that type may not define its own `==`; the
//! latter is reported once per switch, at the first case expression.

use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind};
use merlin_resolved::{ClassId, MethodKind, Program, Stmt, StmtKind};

use crate::constant::{ConstValue, ConstantEvaluator};
use crate::context::EvaluationContext;
use crate::queries::ancestors;
use crate::validation::Validator;

/// Validator for case expressions
pub struct SwitchValidator;

impl SwitchValidator {
    const NAME: &'static str = "switch";

    pub fn new() -> Self {
        Self
    }
}

impl Default for SwitchValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for SwitchValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_statement(
        &self,
        stmt: &Stmt,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let StmtKind::Switch { members, .. } = &stmt.kind else {
            return;
        };
        let program = ctx.program();
        let mut state = ctx.session.constants();
        let mut evaluator = ConstantEvaluator::new(
            program,
            &mut state,
            out,
            ctx.config().checked_mode,
        );

        let mut values = Vec::new();
        for case in members.iter().filter_map(|m| m.expression.as_ref()) {
            if let Some(value) = evaluator.evaluate_root(case, ErrorKind::NonConstantCaseExpression) {
                values.push((value, case.span));
            }
        }
        drop(evaluator);

        let mut known = values.into_iter().filter(|(value, _)| !value.is_unknown());
        let Some((first, first_span)) = known.next() else {
            return;
        };

        if let ConstValue::Object(class) = first {
            if defines_equality(program, class) {
                out.report(
                    ErrorKind::CaseExpressionTypeImplementsEquals,
                    first_span,
                    args![Argument::ty(first.type_name(program))],
                );
            }
        }

        let expected = first.type_name(program);
        for (value, span) in known {
            if value.type_name(program) != expected {
                out.report(
                    ErrorKind::InconsistentCaseExpressionTypes,
                    span,
                    args![value.render(program), Argument::ty(&expected)],
                );
            }
        }
    }
}

/// Whether `class` or a superclass other than the root declares `==`.
fn defines_equality(program: &Program, class: ClassId) -> bool {
    std::iter::once(class)
        .chain(ancestors(program, class))
        .filter(|ancestor| !program.is_object(*ancestor))
        .filter_map(|ancestor| program.class(ancestor))
        .any(|decl| {
            decl.methods()
                .any(|m| !m.is_static && m.kind == MethodKind::Operator && m.name.name == "==")
        })
}
