//! Hierarchy and member queries over the resolved program.
//!
//! Every walk carries a visited set, so cyclic hierarchies terminate.

use merlin_resolved::{
    Block, ClassId, ClassKind, ConstructorDecl, ConstructorId, Expr, ExprKind, FunctionBody,
    InitializerKind, Member, MethodDecl, MethodKind, Program, Stmt, StmtKind, TypeTarget,
    VariableId,
};
use rustc_hash::FxHashSet;

/// Core types that user classes may not extend or implement.
pub const DISALLOWED_SUPERTYPES: &[&str] = &["Null", "bool", "num", "int", "double", "String"];

pub fn is_disallowed_supertype(name: &str) -> bool {
    DISALLOWED_SUPERTYPES.contains(&name)
}

/// Identifiers with special meaning that still lex as identifiers.
pub const BUILT_IN_IDENTIFIERS: &[&str] = &[
    "abstract", "as", "dynamic", "export", "external", "factory", "get", "implements",
    "import", "library", "operator", "part", "set", "static", "typedef",
];

pub fn is_built_in_identifier(name: &str) -> bool {
    BUILT_IN_IDENTIFIERS.contains(&name)
}

pub const RESERVED_WORDS: &[&str] = &[
    "assert", "break", "case", "catch", "class", "const", "continue", "default", "do", "else",
    "enum", "extends", "false", "final", "finally", "for", "if", "in", "is", "new", "null",
    "rethrow", "return", "super", "switch", "this", "throw", "true", "try", "var", "void",
    "while", "with",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Direct supertypes named in `extends`, `with` and `implements`, in clause order.
pub fn direct_supertypes(program: &Program, class: ClassId) -> Vec<ClassId> {
    let Some(decl) = program.class(class) else {
        return Vec::new();
    };
    decl.superclass
        .iter()
        .chain(decl.mixins.iter())
        .chain(decl.interfaces.iter())
        .filter_map(|ty| ty.class_id())
        .collect()
}

/// Classes whose members `class` inherits, nearest first: mixins (last
/// applied first), then the superclass, then its mixins, and so on up to
/// the root.
pub fn ancestors(program: &Program, class: ClassId) -> Vec<ClassId> {
    let mut result = Vec::new();
    let mut visited = FxHashSet::default();
    visited.insert(class);

    let mut current = class;
    loop {
        let Some(decl) = program.class(current) else {
            break;
        };
        for mixin in decl.mixins.iter().rev().filter_map(|m| m.class_id()) {
            if visited.insert(mixin) {
                result.push(mixin);
            }
        }
        match program.superclass_of(current) {
            Some(next) if visited.insert(next) => {
                result.push(next);
                current = next;
            }
            _ => break,
        }
    }
    result
}

/// Every class reachable through `implements`, `extends` and `with`.
pub fn all_supertypes(program: &Program, class: ClassId) -> Vec<ClassId> {
    let mut result = Vec::new();
    let mut visited = FxHashSet::default();
    visited.insert(class);
    let mut queue = vec![class];
    while let Some(next) = queue.pop() {
        for supertype in direct_supertypes(program, next) {
            if visited.insert(supertype) {
                result.push(supertype);
                queue.push(supertype);
            }
        }
    }
    if let Some(object) = program.object_class {
        if visited.insert(object) {
            result.push(object);
        }
    }
    result
}

pub fn is_subclass_of(program: &Program, sub: ClassId, sup: ClassId) -> bool {
    sub == sup || all_supertypes(program, sub).contains(&sup)
}

/// An instance member visible through inheritance.
#[derive(Debug, Clone, Copy)]
pub enum InstanceMember<'p> {
    Field(VariableId),
    Method(&'p MethodDecl),
}

impl InstanceMember<'_> {
    /// Fields and getters both read as getters.
    pub fn is_getter_like(&self) -> bool {
        match self {
            InstanceMember::Field(_) => true,
            InstanceMember::Method(m) => m.kind == MethodKind::Getter,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, InstanceMember::Method(m) if m.kind == MethodKind::Method)
    }
}

/// Instance members called `name` declared directly in `class`.
pub fn declared_instance_members<'p>(
    program: &'p Program,
    class: ClassId,
    name: &str,
) -> Vec<InstanceMember<'p>> {
    let Some(decl) = program.class(class) else {
        return Vec::new();
    };
    decl.members
        .iter()
        .filter_map(|member| match member {
            Member::Field(id) => program
                .variable(*id)
                .filter(|v| !v.is_static && v.name.name == name)
                .map(|_| InstanceMember::Field(*id)),
            Member::Method(m) if !m.is_static && m.name.name == name => Some(InstanceMember::Method(m)),
            _ => None,
        })
        .collect()
}

/// Nearest inherited instance member called `name`, with its declaring class.
pub fn inherited_instance_member<'p>(
    program: &'p Program,
    class: ClassId,
    name: &str,
) -> Option<(ClassId, InstanceMember<'p>)> {
    ancestors(program, class).into_iter().find_map(|ancestor| {
        declared_instance_members(program, ancestor, name)
            .into_iter()
            .next()
            .map(|member| (ancestor, member))
    })
}

/// The method `name` overridden by a declaration in `class`: the nearest
/// one along the superclass chain, otherwise the first one among the
/// interfaces.
pub fn overridden_method<'p>(
    program: &'p Program,
    class: ClassId,
    name: &str,
) -> Option<(ClassId, &'p MethodDecl)> {
    let find = |candidate: ClassId| {
        program
            .class(candidate)?
            .methods()
            .find(|m| !m.is_static && m.kind == MethodKind::Method && m.name.name == name)
            .map(|m| (candidate, m))
    };
    ancestors(program, class)
        .into_iter()
        .find_map(find)
        .or_else(|| all_supertypes(program, class).into_iter().find_map(find))
}

/// Result of looking up a constructor the way a `super` or `new` call would.
#[derive(Debug, Clone, Copy)]
pub enum ConstructorLookup<'p> {
    Declared(ConstructorId, &'p ConstructorDecl),
    /// The class declares no constructors, so it has an implicit `C()`.
    Implicit,
    Missing,
}

/// Find a constructor; mixin applications forward their superclass's constructors.
pub fn lookup_constructor<'p>(
    program: &'p Program,
    class: ClassId,
    name: Option<&str>,
) -> ConstructorLookup<'p> {
    let mut visited = FxHashSet::default();
    let mut current = class;
    loop {
        if !visited.insert(current) {
            return ConstructorLookup::Missing;
        }
        let Some(decl) = program.class(current) else {
            return ConstructorLookup::Missing;
        };
        if decl.kind == ClassKind::MixinApplication && !program.declares_constructors(current) {
            match program.superclass_of(current) {
                Some(next) => {
                    current = next;
                    continue;
                }
                None => return ConstructorLookup::Missing,
            }
        }
        if let Some((id, ctor)) = program.find_constructor(current, name) {
            return ConstructorLookup::Declared(id, ctor);
        }
        if name.is_none() && !program.declares_constructors(current) {
            return ConstructorLookup::Implicit;
        }
        return ConstructorLookup::Missing;
    }
}

/// Declared type parameter count of a class or typedef.
pub fn type_parameter_count(program: &Program, target: TypeTarget) -> Option<usize> {
    match target {
        TypeTarget::Class(id) => program.class(id).map(|c| c.type_parameters.len()),
        TypeTarget::Typedef(id) => program.typedef(id).map(|t| t.type_parameters.len()),
        _ => None,
    }
}

/// Whether any member body or initializer of `class` mentions `super`.
pub fn references_super(program: &Program, class: ClassId) -> bool {
    let Some(decl) = program.class(class) else {
        return false;
    };
    decl.members.iter().any(|member| match member {
        Member::Method(method) => method.body.as_ref().is_some_and(body_mentions_super),
        Member::Field(id) => program
            .variable(*id)
            .and_then(|v| v.initializer.as_ref())
            .is_some_and(expr_mentions_super),
        Member::Constructor(id) => program.constructor(*id).is_some_and(|ctor| {
            ctor.body.as_ref().is_some_and(body_mentions_super)
                || ctor.initializers.iter().any(|init| match &init.kind {
                    InitializerKind::Field { value, .. } => expr_mentions_super(value),
                    InitializerKind::Super { .. } => true,
                    InitializerKind::Redirect { arguments, .. } => {
                        arguments.iter().any(|a| expr_mentions_super(&a.value))
                    }
                })
        }),
    })
}

fn body_mentions_super(body: &FunctionBody) -> bool {
    match body {
        FunctionBody::Block(block) => block_mentions_super(block),
        FunctionBody::Expression(expr) => expr_mentions_super(expr),
    }
}

fn block_mentions_super(block: &Block) -> bool {
    block.statements.iter().any(stmt_mentions_super)
}

fn stmt_mentions_super(stmt: &Stmt) -> bool {
    let expr = expr_mentions_super;
    match &stmt.kind {
        StmtKind::Expression(e) => expr(e),
        StmtKind::Return(e) => e.as_ref().is_some_and(expr),
        StmtKind::Block(block) => block_mentions_super(block),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            expr(condition)
                || stmt_mentions_super(then_branch)
                || else_branch.as_deref().is_some_and(stmt_mentions_super)
        }
        StmtKind::While { condition, body } | StmtKind::DoWhile { body, condition } => {
            expr(condition) || stmt_mentions_super(body)
        }
        StmtKind::For {
            condition,
            updates,
            body,
            ..
        } => {
            condition.as_ref().is_some_and(expr)
                || updates.iter().any(expr)
                || stmt_mentions_super(body)
        }
        StmtKind::ForIn { iterable, body, .. } => expr(iterable) || stmt_mentions_super(body),
        StmtKind::Labeled { body, .. } => stmt_mentions_super(body),
        StmtKind::Switch { subject, members } => {
            expr(subject)
                || members.iter().any(|m| {
                    m.expression.as_ref().is_some_and(expr) || m.statements.iter().any(stmt_mentions_super)
                })
        }
        StmtKind::Try {
            body,
            catches,
            finally,
        } => {
            block_mentions_super(body)
                || catches.iter().any(|c| block_mentions_super(&c.body))
                || finally.as_ref().is_some_and(block_mentions_super)
        }
        StmtKind::LocalFunction(function) => function.body.as_ref().is_some_and(body_mentions_super),
        // Local variable initializers live in the arena and are not reachable here.
        StmtKind::Variable(_) | StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => false,
    }
}

fn expr_mentions_super(expr: &Expr) -> bool {
    let rec = expr_mentions_super;
    match &expr.kind {
        ExprKind::Super => true,
        ExprKind::Interpolation(parts) => parts.iter().any(rec),
        ExprKind::PropertyAccess { target, .. } => rec(target),
        ExprKind::Unary { operand, .. } => rec(operand),
        ExprKind::Binary { left, right, .. } => rec(left) || rec(right),
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => rec(condition) || rec(then_expr) || rec(else_expr),
        ExprKind::List { elements, .. } => elements.iter().any(rec),
        ExprKind::Map { entries, .. } => entries.iter().any(|e| rec(&e.key) || rec(&e.value)),
        ExprKind::InstanceCreation { arguments, .. } => arguments.iter().any(|a| rec(&a.value)),
        ExprKind::Invocation {
            target, arguments, ..
        } => target.as_deref().is_some_and(rec) || arguments.iter().any(|a| rec(&a.value)),
        ExprKind::Index { target, index } => rec(target) || rec(index),
        ExprKind::Assignment { target, value } => rec(target) || rec(value),
        ExprKind::TypeTest { expr, .. } | ExprKind::Cast { expr, .. } => rec(expr),
        ExprKind::Throw(value) => rec(value),
        ExprKind::Closure { body, .. } => body_mentions_super(body),
        ExprKind::Literal(_)
        | ExprKind::Identifier { .. }
        | ExprKind::PrefixedIdentifier { .. }
        | ExprKind::This
        | ExprKind::Rethrow
        | ExprKind::ArgumentDefinitionTest { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlin_resolved::{CtorSpec, MethodSpec, ProgramBuilder, VarSpec};

    #[test]
    fn ancestors_follow_mixins_then_superclass() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let object = p.object_class(lib);
        let a = p.class(lib, "A");
        let m = p.class(lib, "M");
        let b = p.class(lib, "B");
        p.extends(b, "A");
        p.with_mixins(b, &["M"]);
        let program = p.finish();

        assert_eq!(ancestors(&program, b), vec![m, a, object]);
    }

    #[test]
    fn ancestors_stop_on_cycles() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let a = p.class(lib, "A");
        let b = p.class(lib, "B");
        p.extends(a, "B");
        p.extends(b, "A");
        let program = p.finish();

        assert_eq!(ancestors(&program, a), vec![b]);
        assert!(is_subclass_of(&program, a, b));
    }

    #[test]
    fn inherited_members_include_fields() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let a = p.class(lib, "A");
        p.field(a, VarSpec::new("size"));
        p.method(a, MethodSpec::method("grow"));
        let b = p.class(lib, "B");
        p.extends(b, "A");
        let program = p.finish();

        let (owner, member) = inherited_instance_member(&program, b, "size").unwrap();
        assert_eq!(owner, a);
        assert!(member.is_getter_like());
        assert!(overridden_method(&program, b, "grow").is_some());
        assert!(overridden_method(&program, b, "size").is_none());
    }

    #[test]
    fn implicit_and_forwarded_constructors() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let _object = p.object_class(lib);
        let s = p.class(lib, "S");
        p.constructor(s, CtorSpec::named("make"));
        let _m = p.class(lib, "M");
        let app = p.mixin_application(lib, "App", "S", &["M"]);
        let plain = p.class(lib, "Plain");
        let program = p.finish();

        assert!(matches!(lookup_constructor(&program, plain, None), ConstructorLookup::Implicit));
        assert!(matches!(
            lookup_constructor(&program, app, Some("make")),
            ConstructorLookup::Declared(..)
        ));
        assert!(matches!(lookup_constructor(&program, s, None), ConstructorLookup::Missing));
    }

    #[test]
    fn finds_super_in_method_bodies() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let m = p.class(lib, "M");
        let call = p.call(
            Some(p.super_expr()),
            "run",
            merlin_resolved::Element::Unresolved,
            vec![],
        );
        p.method(m, MethodSpec::method("run").body(vec![p.expr_stmt(call)]));
        let clean = p.class(lib, "Clean");
        p.method(clean, MethodSpec::method("run"));
        let program = p.finish();

        assert!(references_super(&program, m));
        assert!(!references_super(&program, clean));
    }

    #[test]
    fn word_lists() {
        assert!(is_disallowed_supertype("int"));
        assert!(!is_disallowed_supertype("Object"));
        assert!(is_built_in_identifier("typedef"));
        assert!(is_reserved_word("class"));
        assert!(!is_reserved_word("typedef"));
    }
}
