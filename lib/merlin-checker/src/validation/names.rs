//! Validator for declaration names and modifiers
//!
//! - Built-in identifiers cannot name classes, typedefs, type variables or
//!   be used as types
//! - Reserved words cannot name anything
//! - Members cannot share the name of their class
//! - `static` is not allowed at the top level; `const` is not allowed on
//!   instance fields or parameters
//! - Named optional parameters cannot be private
//! - Typedef parameters cannot have default values

use merlin_diagnostics::{args, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    ClassDecl, ClassId, FunctionDecl, Ident, Member, MethodDecl, MethodKind, Parameter, ParameterKind,
    TypeName, TypeTarget, TypedefDecl, TypedefId, VariableDecl, VariableId, VariableOwner,
};

use crate::context::{EvaluationContext, MemberContext};
use crate::queries::{is_built_in_identifier, is_reserved_word};
use crate::validation::Validator;

/// Validator for names and declaration modifiers
pub struct NameValidator;

impl NameValidator {
    const NAME: &'static str = "names";

    pub fn new() -> Self {
        Self
    }
}

impl Default for NameValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for NameValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_class(
        &self,
        _id: ClassId,
        class: &ClassDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if is_built_in_identifier(&class.name.name) {
            out.report(
                ErrorKind::BuiltInIdentifierAsTypeName,
                class.name.span,
                args![&class.name.name],
            );
        }
        check_reserved(&class.name, out);
        check_type_variables(&class.type_parameters, out);

        let program = ctx.program();
        for member in &class.members {
            let name = match member {
                Member::Field(id) => program.variable(*id).map(|v| &v.name),
                Member::Method(method) => Some(&method.name),
                Member::Constructor(_) => None,
            };
            if let Some(name) = name.filter(|name| name.name == class.name.name) {
                out.report(ErrorKind::MemberWithClassName, name.span, args![]);
            }
        }
    }

    fn validate_typedef(
        &self,
        _id: TypedefId,
        typedef: &TypedefDecl,
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if is_built_in_identifier(&typedef.name.name) {
            out.report(
                ErrorKind::BuiltInIdentifierAsTypedefName,
                typedef.name.span,
                args![&typedef.name.name],
            );
        }
        check_reserved(&typedef.name, out);
        check_type_variables(&typedef.type_parameters, out);
    }

    fn validate_variable(
        &self,
        _id: VariableId,
        variable: &VariableDecl,
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        check_reserved(&variable.name, out);

        if variable.is_static && matches!(variable.owner, VariableOwner::Library(_)) {
            out.report(ErrorKind::StaticTopLevelVariable, variable.name.span, args![]);
        }
        if variable.is_const && variable.is_instance_field() {
            out.report(ErrorKind::ConstInstanceField, variable.name.span, args![]);
        }
    }

    fn validate_function(
        &self,
        function: &FunctionDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        check_reserved(&function.name, out);
        if function.is_static && ctx.function_depth == 0 {
            out.report(ErrorKind::StaticTopLevelFunction, function.name.span, args![]);
        }
    }

    fn validate_method(
        &self,
        method: &MethodDecl,
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if method.kind != MethodKind::Operator {
            check_reserved(&method.name, out);
        }
    }

    fn validate_parameters(
        &self,
        parameters: &[Parameter],
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        for parameter in parameters {
            check_reserved(&parameter.name, out);

            if parameter.is_const {
                out.report(ErrorKind::ConstFormalParameter, parameter.span, args![]);
            }
            if parameter.kind == ParameterKind::Named && parameter.name.name.starts_with('_') {
                out.report(ErrorKind::PrivateOptionalParameter, parameter.name.span, args![]);
            }
            if ctx.member == MemberContext::Typedef && ctx.function_depth == 0 {
                if let Some(default) = &parameter.default_value {
                    out.report(ErrorKind::DefaultValueInFunctionTypeAlias, default.span, args![]);
                }
            }
        }
    }

    fn validate_type_name(
        &self,
        ty: &TypeName,
        _ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        // `dynamic` is a built-in identifier that does denote a type
        if ty.target != TypeTarget::Dynamic && is_built_in_identifier(&ty.name) {
            out.report(ErrorKind::BuiltInIdentifierAsType, ty.span, args![&ty.name]);
        }
    }
}

fn check_type_variables(parameters: &[Ident], out: &mut DiagnosticCollector) {
    for parameter in parameters {
        if is_built_in_identifier(&parameter.name) {
            out.report(
                ErrorKind::BuiltInIdentifierAsTypeVariableName,
                parameter.span,
                args![&parameter.name],
            );
        }
        check_reserved(parameter, out);
    }
}

fn check_reserved(name: &Ident, out: &mut DiagnosticCollector) {
    if is_reserved_word(&name.name) {
        out.report(ErrorKind::ReservedWordAsIdentifier, name.span, args![]);
    }
}
