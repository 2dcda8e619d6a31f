//! Validator for jumps, returns and statement forms
//!
//! - `break` and `continue` labels must be declared in the enclosing
//!   function; a label of an outer function is reported separately
//! - Generative constructors cannot return a value
//! - `rethrow` only appears inside a `catch` clause
//! - An untyped non-constant map literal cannot start an expression
//!   statement

use merlin_diagnostics::{args, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    ConstructorDecl, ConstructorId, Expr, ExprKind, FunctionBody, Ident, Stmt, StmtKind,
};

use crate::context::{EvaluationContext, MemberContext};
use crate::validation::Validator;

/// Validator for control flow statements
pub struct ControlFlowValidator;

impl ControlFlowValidator {
    const NAME: &'static str = "control_flow";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ControlFlowValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ControlFlowValidator {
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
        if let (true, Some(FunctionBody::Expression(value))) = (constructor.is_generative(), &constructor.body) {
            out.report(ErrorKind::ReturnInGenerativeConstructor, value.span, args![]);
        }
    }

    fn validate_statement(
        &self,
        stmt: &Stmt,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        match &stmt.kind {
            StmtKind::Break(Some(label)) | StmtKind::Continue(Some(label)) => check_label(label, ctx, out),
            StmtKind::Return(Some(_)) => {
                let generative = matches!(
                    ctx.member,
                    MemberContext::Constructor { generative: true, .. },
                );
                if generative && ctx.function_depth == 0 {
                    out.report(ErrorKind::ReturnInGenerativeConstructor, stmt.span, args![]);
                }
            }
            StmtKind::Expression(Expr {
                kind: ExprKind::Map {
                    is_const: false,
                    type_arguments,
                    ..
                },
                span,
            }) if type_arguments.is_empty() => {
                out.report(ErrorKind::NonConstMapAsExpressionStatement, *span, args![]);
            }
            _ => {}
        }
    }

    fn validate_expression(
        &self,
        expr: &Expr,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if matches!(expr.kind, ExprKind::Rethrow) && !ctx.in_catch {
            out.report(ErrorKind::RethrowOutsideCatch, expr.span, args![]);
        }
    }
}

fn check_label(label: &Ident, ctx: &EvaluationContext<'_>, out: &mut DiagnosticCollector) {
    match ctx.find_label(&label.name) {
        None => out.report(ErrorKind::LabelUndefined, label.span, args![&label.name]),
        Some(scope) if scope.function_depth != ctx.function_depth => {
            out.report(ErrorKind::LabelInOuterScope, label.span, args![&label.name]);
        }
        Some(_) => {}
    }
}
