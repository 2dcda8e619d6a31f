//! Validator for operator and setter signatures
//!
//! Operators take no optional parameters and a fixed number of required
//! ones: binary operators one, `~` none, `[]=` two, and unary or binary `-`
//! either none or one. Setters take exactly one required parameter.

use merlin_diagnostics::{args, DiagnosticCollector, ErrorKind};
use merlin_resolved::{FunctionDecl, Ident, MethodDecl, MethodKind, Parameter};

use crate::context::EvaluationContext;
use crate::validation::Validator;

/// Operators that take exactly one operand besides `this`.
const BINARY_OPERATORS: &[&str] = &[
    "==", "<", ">", "<=", ">=", "+", "/", "~/", "*", "%", "|", "^", "&", "<<", ">>", "[]",
];

/// Validator for operator declarations and setters
pub struct OperatorValidator;

impl OperatorValidator {
    const NAME: &'static str = "operators";

    pub fn new() -> Self {
        Self
    }
}

impl Default for OperatorValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for OperatorValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_method(
        &self,
        method: &MethodDecl,
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        match method.kind {
            MethodKind::Operator => check_operator(method, out),
            MethodKind::Setter => check_setter(&method.name, &method.parameters, out),
            MethodKind::Method | MethodKind::Getter => {}
        }
    }

    fn validate_function(
        &self,
        function: &FunctionDecl,
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if function.kind == MethodKind::Setter {
            check_setter(&function.name, &function.parameters, out);
        }
    }
}

fn check_operator(method: &MethodDecl, out: &mut DiagnosticCollector) {
    for parameter in method.parameters.iter().filter(|p| p.is_optional()) {
        out.report(ErrorKind::OptionalParameterInOperator, parameter.span, args![]);
    }

    let name = method.name.name.as_str();
    let found = method.parameters.len();
    if name == "-" {
        if found > 1 {
            out.report(
                ErrorKind::WrongNumberOfParametersForOperatorMinus,
                method.name.span,
                args![found],
            );
        }
        return;
    }

    let expected: usize = match name {
        "~" => 0,
        "[]=" => 2,
        _ if BINARY_OPERATORS.contains(&name) => 1,
        _ => return,
    };
    if found != expected {
        out.report(
            ErrorKind::WrongNumberOfParametersForOperator,
            method.name.span,
            args![name, expected, found],
        );
    }
}

fn check_setter(name: &Ident, parameters: &[Parameter], out: &mut DiagnosticCollector) {
    if parameters.len() != 1 || parameters[0].is_optional() {
        out.report(ErrorKind::WrongNumberOfParametersForSetter, name.span, args![]);
    }
}
