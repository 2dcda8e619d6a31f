//! Validation pass infrastructure for the resolved program
//!
//! Every rule group is a validator. The runner walks the program once and
//! invokes every enabled validator at each node it visits, threading an
//! [`EvaluationContext`] down the walk.
//!
//! ## Architecture
//!
//! Validators implement the `Validator` trait with methods for each node type:
//! - `validate_library` - Called once per library, before its units
//! - `validate_directive` - Called for each import, export and part directive
//! - `validate_class` - Called for each class declaration
//! - `validate_variable` - Called for top-level variables, fields and locals
//! - `validate_method` / `validate_function` - Called for class methods and
//!   top-level or local functions
//! - `validate_constructor` - Called for each constructor, before its
//!   parameters, initializers and body are walked
//! - `validate_typedef` - Called for each function type alias
//! - `validate_parameters` - Called for every parameter list
//! - `validate_block` - Called for every statement list that opens a scope
//! - `validate_statement` / `validate_expression` - Called for each node in
//!   bodies and initializers
//! - `validate_type_name` - Called for each type reference
//! - `finalize` - Called after the entire program has been walked
//!
//! Validators only implement the methods they need - defaults are no-ops.
//! Some validators (like cycle detection) collect data during the walk
//! and perform analysis in `finalize`.

mod constants;
mod constructors;
mod control_flow;
mod directives;
mod duplicates;
mod field_initializers;
mod hierarchy;
mod mixins;
mod names;
mod operators;
mod overrides;
mod references;
mod switch;

use merlin_diagnostics::{DiagnosticCollector, DiagnosticSet};
use merlin_resolved::{
    ClassDecl, ClassId, ConstructorDecl, ConstructorId, Declaration, Directive, Expr, ExprKind,
    FunctionBody, FunctionDecl, InitializerKind, LibraryId, Library, Member, MethodDecl, Parameter,
    Program, Stmt, StmtKind, TypeName, TypedefDecl, TypedefId, VariableDecl, VariableId,
    VariableOwner,
};

use crate::config::ValidationConfig;
use crate::context::{EvaluationContext, MemberContext, Session};

pub use constants::ConstantValidator;
pub use constructors::ConstructorValidator;
pub use control_flow::ControlFlowValidator;
pub use directives::DirectiveValidator;
pub use duplicates::DuplicateDefinitionValidator;
pub use field_initializers::FieldInitializerValidator;
pub use hierarchy::HierarchyValidator;
pub use mixins::MixinValidator;
pub use names::NameValidator;
pub use operators::OperatorValidator;
pub use overrides::OverrideValidator;
pub use references::ReferenceValidator;
pub use switch::SwitchValidator;

/// Unified trait for all rule groups
///
/// Validators implement only the methods they need - all have default no-op implementations.
/// The walker calls each method at the appropriate point during traversal.
pub trait Validator: Send + Sync {
    /// Unique identifier for this validator, used by `ValidationConfig::disable`
    fn name(&self) -> &'static str;

    /// Validate a library as a whole
    ///
    /// Called before any of the library's units are walked, with a context
    /// for the defining unit.
    fn validate_library(
        &self,
        _id: LibraryId,
        _library: &Library,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate an import, export or part directive
    fn validate_directive(
        &self,
        _directive: &Directive,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a class declaration
    ///
    /// Called before the class's clauses and members are walked.
    fn validate_class(
        &self,
        _id: ClassId,
        _class: &ClassDecl,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a variable declaration: top-level, field or local
    fn validate_variable(
        &self,
        _id: VariableId,
        _variable: &VariableDecl,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a method, getter, setter or operator of a class
    fn validate_method(
        &self,
        _method: &MethodDecl,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a top-level or local function
    ///
    /// Local functions are seen with `ctx.function_depth > 0`.
    fn validate_function(
        &self,
        _function: &FunctionDecl,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a constructor
    ///
    /// The context's member is the constructor itself; its initializers are
    /// walked afterwards under `MemberContext::Initializers`.
    fn validate_constructor(
        &self,
        _id: ConstructorId,
        _constructor: &ConstructorDecl,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a function type alias
    fn validate_typedef(
        &self,
        _id: TypedefId,
        _typedef: &TypedefDecl,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a parameter list of any function-like declaration
    fn validate_parameters(
        &self,
        _parameters: &[Parameter],
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a statement list that forms one scope
    fn validate_block(
        &self,
        _statements: &[Stmt],
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a statement
    fn validate_statement(
        &self,
        _stmt: &Stmt,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate an expression
    ///
    /// `ctx.in_constant` is set below constant contexts, so validators that
    /// evaluate constants only start at the outermost one.
    fn validate_expression(
        &self,
        _expr: &Expr,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Validate a type reference
    ///
    /// Called for annotations, clauses and type arguments.
    fn validate_type_name(
        &self,
        _ty: &TypeName,
        _ctx: &EvaluationContext<'_>,
        _out: &mut DiagnosticCollector,
    ) {
    }

    /// Called after the entire program has been walked
    ///
    /// Validators that collect data during traversal and analyze it at the end
    /// implement this method (e.g., cycle detection).
    fn finalize(&self, _session: &Session<'_>, _out: &mut DiagnosticCollector) {}
}

/// Registry and runner for all validators
pub struct ValidationRunner {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidationRunner {
    /// Create a new validation runner with all registered validators
    pub fn new() -> Self {
        let validators: Vec<Box<dyn Validator>> = vec![
            Box::new(DirectiveValidator::new()),
            Box::new(HierarchyValidator::new()),
            Box::new(MixinValidator::new()),
            Box::new(NameValidator::new()),
            Box::new(DuplicateDefinitionValidator::new()),
            Box::new(ConstructorValidator::new()),
            Box::new(FieldInitializerValidator::new()),
            Box::new(ConstantValidator::new()),
            Box::new(OverrideValidator::new()),
            Box::new(ReferenceValidator::new()),
            Box::new(ControlFlowValidator::new()),
            Box::new(SwitchValidator::new()),
            Box::new(OperatorValidator::new()),
        ];

        Self { validators }
    }

    /// Names of every registered validator, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.validators.iter().map(|v| v.name())
    }

    /// Run all enabled validators using a single walk over the program
    pub fn run(&self, program: &Program, config: &ValidationConfig) -> DiagnosticSet {
        // Filter to only enabled validators
        let walker = Walker {
            validators: self
                .validators
                .iter()
                .filter(|v| config.is_enabled(v.name()))
                .map(|v| v.as_ref())
                .collect(),
            debug: config.debug_mode,
        };
        tracing::debug!(
            validators = walker.validators.len(),
            libraries = program.libraries.len(),
            "validation started"
        );

        let session = Session::new(program, config);
        let mut out = DiagnosticCollector::new();

        for (id, library) in program.libraries.iter() {
            walk_library(id, library, &walker, &session, &mut out);
        }

        // Finalize all validators
        walker.each(&mut out, |validator, out| validator.finalize(&session, out));

        let diagnostics = out.finish();
        tracing::debug!(
            diagnostics = diagnostics.len(),
            constants = session.constants().len(),
            "validation finished"
        );
        diagnostics
    }
}

impl Default for ValidationRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// The enabled validators of one run
struct Walker<'r> {
    validators: Vec<&'r dyn Validator>,
    debug: bool,
}

impl Walker<'_> {
    /// Call every validator, tagging its reports with its name in debug mode
    fn each(
        &self,
        out: &mut DiagnosticCollector,
        mut visit: impl FnMut(&dyn Validator, &mut DiagnosticCollector),
    ) {
        for validator in &self.validators {
            out.set_origin(self.debug.then(|| validator.name()));
            visit(*validator, out);
        }
        out.set_origin(None);
    }
}

fn walk_library(
    id: LibraryId,
    library: &Library,
    walker: &Walker<'_>,
    session: &Session<'_>,
    out: &mut DiagnosticCollector,
) {
    for (index, unit) in library.units.iter().enumerate() {
        let ctx = EvaluationContext::new(session, id, unit.source);
        if index == 0 {
            walker.each(out, |v, out| v.validate_library(id, library, &ctx, out));
        }

        for directive in &unit.directives {
            walker.each(out, |v, out| v.validate_directive(directive, &ctx, out));
        }

        for declaration in &unit.declarations {
            walk_declaration(declaration, walker, &ctx, out);
        }
    }
}

fn walk_declaration(
    declaration: &Declaration,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    let program = ctx.program();
    match declaration {
        Declaration::Class(id) => {
            if let Some(class) = program.class(*id) {
                walk_class(*id, class, walker, ctx, out);
            }
        }
        Declaration::Function(function) => {
            walk_function(function, walker, &ctx.with_member(MemberContext::TopLevelFunction), out);
        }
        Declaration::Variable(id) => {
            if let Some(variable) = program.variable(*id) {
                walk_variable(*id, variable, walker, ctx, out);
            }
        }
        Declaration::Typedef(id) => {
            if let Some(typedef) = program.typedef(*id) {
                let ctx = ctx.with_member(MemberContext::Typedef);
                walker.each(out, |v, out| v.validate_typedef(*id, typedef, &ctx, out));
                walk_signature(
                    typedef.return_type.as_ref(),
                    &typedef.parameters,
                    walker,
                    &ctx,
                    out,
                );
            }
        }
    }
}

fn walk_class(
    id: ClassId,
    class: &ClassDecl,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    let ctx = ctx.with_class(id);
    walker.each(out, |v, out| v.validate_class(id, class, &ctx, out));

    for ty in class.superclass.iter().chain(&class.mixins).chain(&class.interfaces) {
        walk_type_name(ty, walker, &ctx, out);
    }

    let program = ctx.program();
    for member in &class.members {
        match member {
            Member::Field(field) => {
                let Some(variable) = program.variable(*field) else {
                    continue;
                };
                let member = if variable.is_static {
                    MemberContext::StaticField
                } else {
                    MemberContext::InstanceField
                };
                walk_variable(*field, variable, walker, &ctx.with_member(member), out);
            }
            Member::Method(method) => {
                let member = if method.is_static {
                    MemberContext::StaticMethod
                } else {
                    MemberContext::InstanceMethod
                };
                let ctx = ctx.with_member(member);
                walker.each(out, |v, out| v.validate_method(method, &ctx, out));
                walk_signature(method.return_type.as_ref(), &method.parameters, walker, &ctx, out);
                if let Some(body) = &method.body {
                    walk_body(body, walker, &ctx, out);
                }
            }
            Member::Constructor(constructor) => {
                if let Some(decl) = program.constructor(*constructor) {
                    walk_constructor(*constructor, decl, walker, &ctx, out);
                }
            }
        }
    }
}

fn walk_variable(
    id: VariableId,
    variable: &VariableDecl,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    walker.each(out, |v, out| v.validate_variable(id, variable, ctx, out));

    if let Some(ty) = &variable.declared_type {
        walk_type_name(ty, walker, ctx, out);
    }

    if let Some(initializer) = &variable.initializer {
        let mut init_ctx = ctx.with_constant(variable.is_const);
        if variable.owner == VariableOwner::Local {
            init_ctx = init_ctx.with_initializing(id);
        }
        walk_expression(initializer, walker, &init_ctx, out);
    }
}

fn walk_function(
    function: &FunctionDecl,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    walker.each(out, |v, out| v.validate_function(function, ctx, out));
    walk_signature(function.return_type.as_ref(), &function.parameters, walker, ctx, out);
    if let Some(body) = &function.body {
        walk_body(body, walker, ctx, out);
    }
}

/// Parameters, initializers and body, in source order
fn walk_constructor(
    id: ConstructorId,
    constructor: &ConstructorDecl,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    let ctx = ctx.with_member(MemberContext::Constructor {
        id,
        generative: constructor.is_generative(),
    });
    walker.each(out, |v, out| v.validate_constructor(id, constructor, &ctx, out));
    walk_parameters(&constructor.parameters, walker, &ctx, out);

    let init_ctx = ctx
        .with_member(MemberContext::Initializers(id))
        .with_constant(constructor.is_const);
    for initializer in &constructor.initializers {
        match &initializer.kind {
            InitializerKind::Field { value, .. } => walk_expression(value, walker, &init_ctx, out),
            InitializerKind::Super { arguments, .. } | InitializerKind::Redirect { arguments, .. } => {
                for argument in arguments {
                    walk_expression(&argument.value, walker, &init_ctx, out);
                }
            }
        }
    }

    if let Some(redirect) = &constructor.redirect {
        walk_type_name(&redirect.type_name, walker, &ctx, out);
    }

    if let Some(body) = &constructor.body {
        walk_body(body, walker, &ctx, out);
    }
}

fn walk_signature(
    return_type: Option<&TypeName>,
    parameters: &[Parameter],
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    if let Some(ty) = return_type {
        walk_type_name(ty, walker, ctx, out);
    }
    walk_parameters(parameters, walker, ctx, out);
}

fn walk_parameters(
    parameters: &[Parameter],
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    walker.each(out, |v, out| v.validate_parameters(parameters, ctx, out));

    for parameter in parameters {
        if let Some(ty) = &parameter.declared_type {
            walk_type_name(ty, walker, ctx, out);
        }
        // Default values are constant contexts
        if let Some(default) = &parameter.default_value {
            walk_expression(default, walker, &ctx.with_constant(true), out);
        }
    }
}

fn walk_body(
    body: &FunctionBody,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    match body {
        FunctionBody::Block(block) => walk_block(&block.statements, walker, ctx, out),
        FunctionBody::Expression(expr) => walk_expression(expr, walker, ctx, out),
    }
}

fn walk_block(
    statements: &[Stmt],
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    walker.each(out, |v, out| v.validate_block(statements, ctx, out));
    for stmt in statements {
        walk_statement(stmt, walker, ctx, out);
    }
}

/// Walk a statement, calling validators
fn walk_statement(
    stmt: &Stmt,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    // Call all validators for this statement
    walker.each(out, |v, out| v.validate_statement(stmt, ctx, out));

    let program = ctx.program();
    let expr = |e: &Expr, out: &mut DiagnosticCollector| walk_expression(e, walker, ctx, out);

    // Walk nested nodes
    match &stmt.kind {
        StmtKind::Expression(e) => expr(e, out),
        StmtKind::Variable(id) => {
            if let Some(variable) = program.variable(*id) {
                walk_variable(*id, variable, walker, ctx, out);
            }
        }
        StmtKind::Block(block) => walk_block(&block.statements, walker, ctx, out),
        StmtKind::Return(value) => {
            if let Some(value) = value {
                expr(value, out);
            }
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            expr(condition, out);
            walk_statement(then_branch, walker, ctx, out);
            if let Some(else_branch) = else_branch {
                walk_statement(else_branch, walker, ctx, out);
            }
        }
        StmtKind::While { condition, body } => {
            expr(condition, out);
            walk_statement(body, walker, ctx, out);
        }
        StmtKind::DoWhile { body, condition } => {
            walk_statement(body, walker, ctx, out);
            expr(condition, out);
        }
        StmtKind::For {
            variables,
            condition,
            updates,
            body,
        } => {
            for id in variables {
                if let Some(variable) = program.variable(*id) {
                    walk_variable(*id, variable, walker, ctx, out);
                }
            }
            if let Some(condition) = condition {
                expr(condition, out);
            }
            for update in updates {
                expr(update, out);
            }
            walk_statement(body, walker, ctx, out);
        }
        StmtKind::ForIn { variable, iterable, body } => {
            if let Some(decl) = program.variable(*variable) {
                walk_variable(*variable, decl, walker, ctx, out);
            }
            expr(iterable, out);
            walk_statement(body, walker, ctx, out);
        }
        StmtKind::Labeled { labels, body } => {
            walk_statement(body, walker, &ctx.with_labels(labels), out);
        }
        StmtKind::Switch { subject, members } => {
            expr(subject, out);
            // Case labels are visible from every member of the switch
            let labels: Vec<_> = members.iter().flat_map(|m| m.labels.iter().cloned()).collect();
            let ctx = ctx.with_labels(&labels);
            for member in members {
                if let Some(case) = &member.expression {
                    walk_expression(case, walker, &ctx.with_constant(true), out);
                }
                walk_block(&member.statements, walker, &ctx, out);
            }
        }
        StmtKind::Try { body, catches, finally } => {
            walk_block(&body.statements, walker, ctx, out);
            for catch in catches {
                if let Some(ty) = &catch.exception_type {
                    walk_type_name(ty, walker, ctx, out);
                }
                walk_block(&catch.body.statements, walker, &ctx.with_catch(), out);
            }
            if let Some(finally) = finally {
                walk_block(&finally.statements, walker, ctx, out);
            }
        }
        StmtKind::LocalFunction(function) => {
            walk_function(function, walker, &ctx.enter_function(), out);
        }
        StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => {}
    }
}

/// Walk an expression, calling validators
fn walk_expression(
    expr: &Expr,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    // Call all validators for this expression
    walker.each(out, |v, out| v.validate_expression(expr, ctx, out));

    let rec = |e: &Expr, out: &mut DiagnosticCollector| walk_expression(e, walker, ctx, out);

    // Walk nested expressions
    match &expr.kind {
        ExprKind::Interpolation(parts) => {
            for part in parts {
                rec(part, out);
            }
        }
        ExprKind::PropertyAccess { target, .. } => rec(target, out),
        ExprKind::Unary { operand, .. } => rec(operand, out),
        ExprKind::Binary { left, right, .. } => {
            rec(left, out);
            rec(right, out);
        }
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => {
            rec(condition, out);
            rec(then_expr, out);
            rec(else_expr, out);
        }
        ExprKind::List {
            is_const,
            type_arguments,
            elements,
        } => {
            for ty in type_arguments {
                walk_type_name(ty, walker, ctx, out);
            }
            let ctx = ctx.with_constant(*is_const);
            for element in elements {
                walk_expression(element, walker, &ctx, out);
            }
        }
        ExprKind::Map {
            is_const,
            type_arguments,
            entries,
        } => {
            for ty in type_arguments {
                walk_type_name(ty, walker, ctx, out);
            }
            let ctx = ctx.with_constant(*is_const);
            for entry in entries {
                walk_expression(&entry.key, walker, &ctx, out);
                walk_expression(&entry.value, walker, &ctx, out);
            }
        }
        ExprKind::InstanceCreation {
            is_const,
            type_name,
            arguments,
            ..
        } => {
            walk_type_name(type_name, walker, ctx, out);
            let ctx = ctx.with_constant(*is_const);
            for argument in arguments {
                walk_expression(&argument.value, walker, &ctx, out);
            }
        }
        ExprKind::Invocation { target, arguments, .. } => {
            if let Some(target) = target {
                rec(target, out);
            }
            for argument in arguments {
                rec(&argument.value, out);
            }
        }
        ExprKind::Index { target, index } => {
            rec(target, out);
            rec(index, out);
        }
        ExprKind::Assignment { target, value } => {
            rec(target, out);
            rec(value, out);
        }
        ExprKind::TypeTest { expr, type_name, .. } | ExprKind::Cast { expr, type_name } => {
            rec(expr, out);
            walk_type_name(type_name, walker, ctx, out);
        }
        ExprKind::Throw(value) => rec(value, out),
        ExprKind::Closure { parameters, body } => {
            let ctx = ctx.enter_function();
            walk_parameters(parameters, walker, &ctx, out);
            walk_body(body, walker, &ctx, out);
        }
        ExprKind::Literal(_)
        | ExprKind::Identifier { .. }
        | ExprKind::PrefixedIdentifier { .. }
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::Rethrow
        | ExprKind::ArgumentDefinitionTest { .. } => {}
    }
}

fn walk_type_name(
    ty: &TypeName,
    walker: &Walker<'_>,
    ctx: &EvaluationContext<'_>,
    out: &mut DiagnosticCollector,
) {
    walker.each(out, |v, out| v.validate_type_name(ty, ctx, out));
    for argument in &ty.arguments {
        walk_type_name(argument, walker, ctx, out);
    }
}
