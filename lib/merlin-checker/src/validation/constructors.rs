//! Validator for constructor declarations and their delegation
//!
//! This validator checks that:
//! - Constructors are named after their class, and named at most once
//! - Initializer lists hold at most one `this(...)` and one `super(...)`,
//!   and redirecting constructors do not call `super`
//! - Explicit and implicit `super` calls reach a generative constructor
//! - Redirections resolve and do not loop
//! - Constant constructors only redirect to constant constructors and live
//!   in classes without mutable instance fields
//!
//! Field initialization is checked by the field initializer validator.

use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind};
use merlin_resolved::{
    arity, ClassDecl, ClassId, ClassKind, ConstructorDecl, ConstructorId, Initializer, InitializerKind,
    Program,
};
use rustc_hash::FxHashSet;

use crate::context::EvaluationContext;
use crate::cycle::CycleDetector;
use crate::queries::{lookup_constructor, ConstructorLookup};
use crate::validation::Validator;

/// Validator for constructor naming, delegation and redirection
pub struct ConstructorValidator;

impl ConstructorValidator {
    const NAME: &'static str = "constructors";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstructorValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ConstructorValidator {
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

        let mut has_unnamed = false;
        let mut names = FxHashSet::default();
        for constructor in class.constructors().filter_map(|c| program.constructor(c)) {
            let Some(name) = &constructor.name else {
                if std::mem::replace(&mut has_unnamed, true) {
                    out.report(
                        ErrorKind::DuplicateConstructorDefault,
                        constructor.name_span(),
                        args![],
                    );
                }
                continue;
            };

            if !names.insert(name.name.as_str()) {
                out.report(
                    ErrorKind::DuplicateConstructorName,
                    constructor.name_span(),
                    args![&name.name],
                );
            }
            if program.find_field(id, &name.name).is_some() {
                out.report(
                    ErrorKind::ConflictingConstructorNameAndField,
                    name.span,
                    args![&name.name],
                );
            } else if program.find_method(id, &name.name).is_some() {
                out.report(
                    ErrorKind::ConflictingConstructorNameAndMethod,
                    name.span,
                    args![&name.name],
                );
            }
        }

        // The implicit constructor calls the superclass's unnamed constructor
        if class.kind == ClassKind::Declaration && !program.is_object(id) && !program.declares_constructors(id) {
            if let Some(superclass) = program.superclass_of(id) {
                if !has_default_generative(program, superclass) {
                    out.report(
                        ErrorKind::NoDefaultSuperConstructorImplicit,
                        class.name.span,
                        args![class_type(program, superclass)],
                    );
                }
            }
        }
    }

    fn validate_constructor(
        &self,
        id: ConstructorId,
        constructor: &ConstructorDecl,
        ctx: &EvaluationContext<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let program = ctx.program();
        let Some(class) = program.class(constructor.class) else {
            return;
        };

        if constructor.return_type.name != class.name.name {
            let kind = if constructor.is_factory {
                ErrorKind::InvalidFactoryNameNotAClass
            } else {
                ErrorKind::InvalidConstructorName
            };
            out.report(kind, constructor.return_type.span, args![]);
        }

        check_initializer_list(program, constructor, out);

        if constructor.is_generative() {
            check_super_call(program, constructor, out);
            check_this_calls(program, constructor, out);

            if constructor.is_const {
                let mutable_field = class
                    .fields()
                    .filter_map(|field| program.variable(field))
                    .any(|field| field.is_instance_field() && !field.is_final_or_const());
                if mutable_field {
                    out.report(
                        ErrorKind::ConstConstructorWithNonFinalField,
                        constructor.name_span(),
                        args![],
                    );
                }
            }
        } else if constructor.is_const {
            if let Some(redirect) = &constructor.redirect {
                let target = redirect_target(program, constructor).and_then(|t| program.constructor(t));
                if target.is_some_and(|target| !target.is_const) {
                    out.report(ErrorKind::RedirectToNonConstConstructor, redirect.span, args![]);
                }
            }
        }

        check_redirect_cycle(program, id, constructor, out);
    }
}

fn check_initializer_list(
    program: &Program,
    constructor: &ConstructorDecl,
    out: &mut DiagnosticCollector,
) {
    let redirecting = constructor.is_redirecting();
    let mut redirects = 0;
    let mut supers = 0;
    for initializer in &constructor.initializers {
        match &initializer.kind {
            InitializerKind::Redirect { .. } => {
                redirects += 1;
                if redirects > 1 {
                    out.report(
                        ErrorKind::MultipleRedirectingConstructorInvocations,
                        initializer.span,
                        args![],
                    );
                }
            }
            InitializerKind::Super { .. } => {
                supers += 1;
                if program.is_object(constructor.class) {
                    out.report(ErrorKind::SuperInitializerInObject, initializer.span, args![]);
                } else if redirecting {
                    out.report(ErrorKind::SuperInRedirectingConstructor, initializer.span, args![]);
                } else if supers > 1 {
                    out.report(ErrorKind::MultipleSuperInitializers, initializer.span, args![]);
                }
            }
            InitializerKind::Field { .. } => {}
        }
    }
}

/// The explicit `super(...)` call, or the implicit `super()` of a
/// non-redirecting generative constructor.
fn check_super_call(
    program: &Program,
    constructor: &ConstructorDecl,
    out: &mut DiagnosticCollector,
) {
    if constructor.is_redirecting() || program.is_object(constructor.class) {
        return;
    }
    let Some(superclass) = program.superclass_of(constructor.class) else {
        return;
    };

    let explicit = constructor.initializers.iter().find_map(|init| match &init.kind {
        InitializerKind::Super { constructor, .. } => Some((constructor.as_ref(), init)),
        _ => None,
    });

    let Some((name, initializer)) = explicit else {
        if !has_default_generative(program, superclass) {
            out.report(
                ErrorKind::NoDefaultSuperConstructorExplicit,
                constructor.name_span(),
                args![class_type(program, superclass)],
            );
        }
        return;
    };

    match lookup_constructor(program, superclass, name.map(|n| n.name.as_str())) {
        ConstructorLookup::Declared(_, target) if target.is_factory => {
            out.report(
                ErrorKind::NonGenerativeConstructor,
                initializer.span,
                args![target.display_name()],
            );
        }
        ConstructorLookup::Declared(..) | ConstructorLookup::Implicit => {}
        ConstructorLookup::Missing => report_undefined(program, superclass, name.map(|n| n.name.as_str()), initializer, out),
    }
}

/// `this(...)` must reach a generative constructor of the same class.
fn check_this_calls(
    program: &Program,
    constructor: &ConstructorDecl,
    out: &mut DiagnosticCollector,
) {
    for initializer in constructor.redirect_initializers() {
        let InitializerKind::Redirect {
            constructor: name,
            target,
            ..
        } = &initializer.kind
        else {
            continue;
        };
        let name = name.as_ref().map(|n| n.name.as_str());
        let resolved = target
            .and_then(|id| program.constructor(id))
            .or_else(|| program.find_constructor(constructor.class, name).map(|(_, decl)| decl));

        match resolved {
            Some(target) if target.is_factory => {
                out.report(
                    ErrorKind::NonGenerativeConstructor,
                    initializer.span,
                    args![target.display_name()],
                );
            }
            Some(_) => {}
            None => report_undefined(program, constructor.class, name, initializer, out),
        }
    }
}

fn report_undefined(
    program: &Program,
    class: ClassId,
    name: Option<&str>,
    initializer: &Initializer,
    out: &mut DiagnosticCollector,
) {
    match name {
        Some(name) => out.report(
            ErrorKind::UndefinedConstructorInInitializer,
            initializer.span,
            args![class_type(program, class), name],
        ),
        None => out.report(
            ErrorKind::UndefinedConstructorInInitializerDefault,
            initializer.span,
            args![class_type(program, class)],
        ),
    }
}

fn check_redirect_cycle(
    program: &Program,
    id: ConstructorId,
    constructor: &ConstructorDecl,
    out: &mut DiagnosticCollector,
) {
    let mut detector = CycleDetector::new();
    let mut current = id;
    loop {
        if let Err(cycle) = detector.enter(current) {
            if cycle.cycle().contains(&id) {
                let kind = if constructor.is_factory {
                    ErrorKind::RecursiveFactoryRedirect
                } else {
                    ErrorKind::RecursiveConstructorRedirect
                };
                tracing::debug!(
                    constructor = %constructor.display_name(),
                    length = cycle.cycle().len(),
                    "redirect cycle",
                );
                out.report(kind, constructor.name_span(), args![]);
            }
            return;
        }
        let Some(next) = program.constructor(current).and_then(|decl| redirect_target(program, decl)) else {
            return;
        };
        current = next;
    }
}

/// Where a redirecting constructor forwards to, when it resolves.
fn redirect_target(program: &Program, constructor: &ConstructorDecl) -> Option<ConstructorId> {
    if constructor.is_factory {
        let redirect = constructor.redirect.as_ref()?;
        return redirect.target.or_else(|| {
            let class = redirect.type_name.class_id()?;
            let name = redirect.constructor.as_ref().map(|n| n.name.as_str());
            program.find_constructor(class, name).map(|(id, _)| id)
        });
    }

    constructor.redirect_initializers().find_map(|init| match &init.kind {
        InitializerKind::Redirect {
            constructor: name,
            target,
            ..
        } => target.or_else(|| {
            let name = name.as_ref().map(|n| n.name.as_str());
            program.find_constructor(constructor.class, name).map(|(id, _)| id)
        }),
        _ => None,
    })
}

/// Whether `super()` with no arguments reaches a generative constructor.
fn has_default_generative(program: &Program, class: ClassId) -> bool {
    match lookup_constructor(program, class, None) {
        ConstructorLookup::Implicit => true,
        ConstructorLookup::Declared(_, constructor) => {
            constructor.is_generative() && arity(&constructor.parameters).required == 0
        }
        ConstructorLookup::Missing => false,
    }
}

fn class_type(program: &Program, class: ClassId) -> Argument {
    Argument::ty(program.class_name(class).unwrap_or("?"))
}
