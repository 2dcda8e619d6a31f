//! Validator for field initialization by constructors
//!
//! Each generative constructor may initialize a field once, through exactly
//! one of: the field's declaration, an initializing formal (`this.x`), or an
//! initializer list entry (`x = e`). The constructor's parameters and
//! initializers are visited in source order, so the diagnostic always lands
//! on the second site.
//!
//! Every final field without a declaration initializer must be initialized
//! by each non-redirecting generative constructor on its own; a sibling
//! constructor does not count.

use merlin_diagnostics::{args, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    ClassDecl, ClassId, ClassKind, ConstructorDecl, ConstructorId, InitializerKind, Parameter, Program,
    Span, VariableDecl, VariableId,
};
use rustc_hash::FxHashMap;

use crate::context::EvaluationContext;
use crate::validation::Validator;

/// Validator for initializing formals, initializer lists and final fields
pub struct FieldInitializerValidator;

impl FieldInitializerValidator {
    const NAME: &'static str = "field_initializers";

    pub fn new() -> Self {
        Self
    }
}

impl Default for FieldInitializerValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a field got its value within one constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Site {
    Declaration,
    Parameter,
    Initializer,
}

impl Validator for FieldInitializerValidator {
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
        let program = ctx.program();
        if class.kind == ClassKind::MixinApplication {
            return;
        }

        // Without a generative constructor only the implicit one exists
        let has_generative = class
            .constructors()
            .filter_map(|c| program.constructor(c))
            .any(ConstructorDecl::is_generative);
        if has_generative {
            return;
        }
        for (_, field) in final_fields(program, id) {
            out.report(
                ErrorKind::UninitializedFinalField,
                field.name.span,
                args![&field.name.name],
            );
        }
    }

    fn validate_parameters(
        &self,
        parameters: &[Parameter],
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if ctx.member.constructor().is_some() && ctx.function_depth == 0 {
            return;
        }
        for parameter in parameters.iter().filter(|p| p.is_field_formal) {
            out.report(ErrorKind::FieldInitializerOutsideConstructor, parameter.span, args![]);
        }
    }

    fn validate_constructor(
        &self,
        _id: ConstructorId,
        constructor: &ConstructorDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let program = ctx.program();
        let class = constructor.class;
        let redirecting = constructor.is_redirecting();

        let mut sites: FxHashMap<VariableId, Site> = FxHashMap::default();
        if let Some(decl) = program.class(class) {
            for field in decl.fields() {
                if program.variable(field).is_some_and(|v| v.initializer.is_some()) {
                    sites.insert(field, Site::Declaration);
                }
            }
        }

        for parameter in constructor.parameters.iter().filter(|p| p.is_field_formal) {
            if constructor.is_factory {
                out.report(ErrorKind::FieldInitializerFactoryConstructor, parameter.span, args![]);
                continue;
            }
            if redirecting {
                out.report(
                    ErrorKind::FieldInitializerRedirectingConstructor,
                    parameter.span,
                    args![],
                );
                continue;
            }

            let name = &parameter.name.name;
            let Some((field_id, field)) = program.find_field(class, name) else {
                out.report(
                    ErrorKind::InitializingFormalForNonExistantField,
                    parameter.span,
                    args![name],
                );
                continue;
            };
            if field.is_static {
                out.report(
                    ErrorKind::InitializingFormalForStaticField,
                    parameter.span,
                    args![name],
                );
                continue;
            }

            match sites.get(&field_id) {
                Some(Site::Declaration) if field.is_final_or_const() => out.report(
                    ErrorKind::FinalInitializedInDeclarationAndConstructor,
                    parameter.span,
                    args![name],
                ),
                Some(Site::Parameter) if field.is_final_or_const() => {
                    out.report(
                        ErrorKind::FinalInitializedMultipleTimes,
                        parameter.span,
                        args![name],
                    );
                }
                _ => {}
            }
            sites.insert(field_id, Site::Parameter);
        }

        for initializer in &constructor.initializers {
            let InitializerKind::Field { field: name, .. } = &initializer.kind else {
                continue;
            };
            if redirecting {
                out.report(
                    ErrorKind::FieldInitializerRedirectingConstructor,
                    initializer.span,
                    args![],
                );
                continue;
            }

            let Some((field_id, field)) = program.find_field(class, &name.name) else {
                out.report(ErrorKind::InitializerForNonExistantField, name.span, args![&name.name]);
                continue;
            };
            if field.is_static {
                out.report(ErrorKind::InitializerForStaticField, name.span, args![&name.name]);
                continue;
            }

            let kind = match sites.get(&field_id) {
                Some(Site::Declaration) if field.is_final_or_const() => {
                    Some(ErrorKind::FieldInitializedInInitializerAndDeclaration)
                }
                Some(Site::Declaration) | None => None,
                Some(Site::Parameter) => Some(ErrorKind::FieldInitializedInParameterAndInitializer),
                Some(Site::Initializer) => Some(ErrorKind::FieldInitializedByMultipleInitializers),
            };
            if let Some(kind) = kind {
                out.report(kind, name.span, args![&name.name]);
            }
            sites.insert(field_id, Site::Initializer);
        }

        if constructor.is_generative() && !redirecting {
            report_uninitialized(program, class, &sites, constructor.name_span(), out);
        }
    }
}

/// Final instance fields that have no initializer at their declaration.
fn final_fields(program: &Program, class: ClassId) -> Vec<(VariableId, &VariableDecl)> {
    let Some(decl) = program.class(class) else {
        return Vec::new();
    };
    decl.fields()
        .filter_map(|id| program.variable(id).map(|v| (id, v)))
        .filter(|(_, v)| v.is_instance_field() && v.is_final_or_const() && v.initializer.is_none())
        .collect()
}

fn report_uninitialized(
    program: &Program,
    class: ClassId,
    sites: &FxHashMap<VariableId, Site>,
    span: Span,
    out: &mut DiagnosticCollector,
) {
    for (id, field) in final_fields(program, class) {
        if !sites.contains_key(&id) {
            out.report(ErrorKind::UninitializedFinalField, span, args![&field.name.name]);
        }
    }
}
