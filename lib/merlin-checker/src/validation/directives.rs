//! Validator for import, export and part directives
//!
//! This validator checks that:
//! - Directive URIs are literal, well-formed and point at something
//! - Imports and exports target libraries, parts target part files
//! - Internal libraries are only imported or exported by internal libraries
//! - No name is exported by two different libraries
//! - Names used without a prefix are not provided by two imports
//! - Import prefixes do not collide with top-level declarations

use merlin_diagnostics::{args, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    Directive, DirectiveKind, Element, Expr, ExprKind, Library, LibraryId, Span, TypeName,
    TypeTarget, UriTarget, VariableOwner,
};

use crate::context::EvaluationContext;
use crate::namespace::{import_prefixes, top_level_names};
use crate::validation::Validator;

/// Validator for directives and library namespaces
pub struct DirectiveValidator;

impl DirectiveValidator {
    const NAME: &'static str = "directives";

    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectiveValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for DirectiveValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_library(
        &self,
        id: LibraryId,
        library: &Library,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        for conflict in ctx.session.namespaces.export_conflicts(id) {
            out.report(
                ErrorKind::AmbiguousExport,
                conflict.span,
                args![&conflict.name, library_uri(ctx, conflict.first), library_uri(ctx, conflict.second)],
            );
        }

        let prefixes = import_prefixes(library);
        for name in top_level_names(ctx.program(), library) {
            if prefixes.iter().any(|prefix| prefix.name == name.name) {
                out.report(
                    ErrorKind::PrefixCollidesWithTopLevelMember,
                    name.span,
                    args![&name.name],
                );
            }
        }
    }

    fn validate_directive(
        &self,
        directive: &Directive,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let uri = &directive.uri;
        if uri.interpolated {
            out.report(ErrorKind::UriWithInterpolation, uri.span, args![]);
            return;
        }

        let kind = match (&directive.kind, uri.target) {
            (_, UriTarget::Malformed) => ErrorKind::InvalidUri,
            (_, UriTarget::Missing) => ErrorKind::UriDoesNotExist,
            (DirectiveKind::Import { .. }, UriTarget::PartFile) => ErrorKind::ImportOfNonLibrary,
            (DirectiveKind::Export { .. }, UriTarget::PartFile) => ErrorKind::ExportOfNonLibrary,
            (DirectiveKind::Part, UriTarget::Library(_)) => ErrorKind::PartOfNonPart,
            (DirectiveKind::Part, UriTarget::PartFile) => return,
            (kind, UriTarget::Library(target)) => {
                let program = ctx.program();
                let target_internal = program.library(target).is_some_and(|l| l.is_internal);
                let own_internal = program.library(ctx.library).is_some_and(|l| l.is_internal);
                if !target_internal || own_internal {
                    return;
                }
                if matches!(kind, DirectiveKind::Export { .. }) {
                    ErrorKind::ExportInternalLibrary
                } else {
                    ErrorKind::ImportInternalLibrary
                }
            }
        };
        out.report(kind, uri.span, args![&uri.text]);
    }

    fn validate_expression(
        &self,
        expr: &Expr,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        match &expr.kind {
            ExprKind::Identifier { name, element } if may_be_imported(*element, ctx) => {
                check_ambiguous(name, expr.span, ctx, out);
            }
            ExprKind::Invocation {
                target: None,
                name,
                element,
                ..
            } if may_be_imported(*element, ctx) => {
                check_ambiguous(&name.name, name.span, ctx, out);
            }
            _ => {}
        }
    }

    fn validate_type_name(
        &self,
        ty: &TypeName,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        if !matches!(ty.target, TypeTarget::TypeParameter | TypeTarget::Dynamic | TypeTarget::Void) {
            check_ambiguous(&ty.name, ty.span, ctx, out);
        }
    }
}

/// Locals, parameters, members and prefixes shadow imported names.
fn may_be_imported(element: Element, ctx: &EvaluationContext<'_>) -> bool {
    match element {
        Element::Parameter | Element::Method { .. } | Element::Prefix => false,
        Element::Variable(id) => ctx
            .program()
            .variable(id)
            .is_some_and(|v| matches!(v.owner, VariableOwner::Library(_))),
        Element::Function | Element::Class(_) | Element::Typedef(_) | Element::Unresolved => true,
    }
}

fn check_ambiguous(
    name: &str,
    span: Span,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    let namespaces = &ctx.session.namespaces;
    if namespaces.is_defined(ctx.library, name) {
        return;
    }
    if let [first, second, ..] = namespaces.import_origins(ctx.library, name) {
        out.report(
            ErrorKind::AmbiguousImport,
            span,
            args![name, library_uri(ctx, *first), library_uri(ctx, *second)],
        );
    }
}

fn library_uri(ctx: &EvaluationContext<'_>, library: LibraryId) -> String {
    ctx.program()
        .library(library)
        .map_or_else(|| "<unknown>".to_string(), |l| l.uri.clone())
}
