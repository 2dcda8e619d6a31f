//! Tests for class hierarchy validation
//!
//! These tests verify that supertype clauses are checked:
//! - Only classes may be extended or implemented
//! - Core types are off limits
//! - Repeated interfaces and inheritance cycles are reported
//! - Mixins follow the mixin restrictions

use merlin_test_suite::*;

mod implements {
    use super::*;

    #[test]
    fn repeated_interface_reported_at_second_occurrence() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        p.class(lib, "Foo");
        let bar = p.class(lib, "Bar");
        let first = p.ty("Foo");
        let second = p.ty("Foo");
        let second_span = second.span;
        p.implements_type(bar, first);
        p.implements_type(bar, second);

        Test::new(p.finish())
            .expect(HasErrorCount(1))
            .expect(HasKindCount(ErrorKind::ImplementsRepeated, 1))
            .expect(KindAt(ErrorKind::ImplementsRepeated, second_span))
            .expect(HasError("'Foo' can only be implemented once"));
    }

    #[test]
    fn distinct_interfaces_compile() {
        Test::build(|p| {
            let lib = p.library("main");
            p.class(lib, "A");
            p.class(lib, "B");
            let c = p.class(lib, "C");
            p.implements(c, &["A", "B"]);
        })
        .expect(Compiles);
    }

    #[test]
    fn implementing_dynamic() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.implements(c, &["dynamic"]);
        })
        .expect(HasKindCount(ErrorKind::ImplementsDynamic, 1));
    }

    #[test]
    fn implementing_core_type() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.implements(c, &["int"]);
        })
        .expect(HasKind(ErrorKind::ImplementsDisallowedClass))
        .expect(HasError("Classes cannot implement 'int'"));
    }

    #[test]
    fn implementing_typedef() {
        Test::build(|p| {
            let lib = p.library("main");
            p.typedef(lib, TypedefSpec::new("F"));
            let c = p.class(lib, "C");
            p.implements(c, &["F"]);
        })
        .expect(HasKindCount(ErrorKind::ImplementsNonClass, 1));
    }

    #[test]
    fn unresolved_interface_is_left_to_the_resolver() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.implements(c, &["Missing"]);
        })
        .expect(Compiles);
    }
}

mod extends {
    use super::*;

    #[test]
    fn extending_core_type() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.extends(c, "String");
        })
        .expect(HasKindCount(ErrorKind::ExtendsDisallowedClass, 1))
        .expect(Lacks(ErrorKind::ExtendsNonClass));
    }

    #[test]
    fn extending_type_parameter() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.type_parameters(c, &["T"]);
            p.extends(c, "T");
        })
        .expect(HasKindCount(ErrorKind::ExtendsNonClass, 1));
    }

    #[test]
    fn root_class_extends_nothing() {
        Test::build(|p| {
            let lib = p.library("core");
            p.class(lib, "Base");
            let object = p.object_class(lib);
            p.extends(object, "Base");
        })
        .expect(HasKindCount(ErrorKind::ObjectCannotExtendAnotherClass, 1));
    }
}

mod cycles {
    use super::*;

    #[test]
    fn class_extending_itself_is_a_base_case() {
        Test::build(|p| {
            let lib = p.library("main");
            let a = p.class(lib, "A");
            p.extends(a, "A");
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::RecursiveInterfaceInheritanceBaseCaseExtends))
        .expect(Lacks(ErrorKind::RecursiveInterfaceInheritance));
    }

    #[test]
    fn class_implementing_itself_is_a_base_case() {
        Test::build(|p| {
            let lib = p.library("main");
            let a = p.class(lib, "A");
            p.implements(a, &["A"]);
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::RecursiveInterfaceInheritanceBaseCaseImplements));
    }

    #[test]
    fn two_class_cycle_reports_both_classes() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let a = p.class(lib, "A");
        let b = p.class(lib, "B");
        p.implements(a, &["B"]);
        p.implements(b, &["A"]);
        let (a_span, b_span) = p.with_program(|program| {
            (
                program.class(a).unwrap().name.span,
                program.class(b).unwrap().name.span,
            )
        });

        Test::new(p.finish())
            .expect(HasErrorCount(2))
            .expect(HasKindCount(ErrorKind::RecursiveInterfaceInheritance, 2))
            .expect(KindAt(ErrorKind::RecursiveInterfaceInheritance, a_span))
            .expect(KindAt(ErrorKind::RecursiveInterfaceInheritance, b_span))
            .expect(HasError("'A' cannot be a superinterface of itself: A -> B -> A"))
            .expect(HasError("'B' cannot be a superinterface of itself: B -> A -> B"));
    }

    #[test]
    fn classes_leading_into_a_cycle_are_not_reported() {
        Test::build(|p| {
            let lib = p.library("main");
            let a = p.class(lib, "A");
            let b = p.class(lib, "B");
            let c = p.class(lib, "C");
            p.extends(a, "B");
            p.extends(b, "C");
            p.extends(c, "B");
        })
        .expect(HasKindCount(ErrorKind::RecursiveInterfaceInheritance, 2))
        .expect(HasError("B -> C -> B"));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        Test::build(|p| {
            let lib = p.library("main");
            p.class(lib, "Top");
            let left = p.class(lib, "Left");
            let right = p.class(lib, "Right");
            let bottom = p.class(lib, "Bottom");
            p.implements(left, &["Top"]);
            p.implements(right, &["Top"]);
            p.implements(bottom, &["Left", "Right"]);
        })
        .expect(Compiles);
    }

    #[test]
    fn typedef_referring_to_itself() {
        Test::build(|p| {
            let lib = p.library("main");
            p.typedef(lib, TypedefSpec::new("F").returns("F"));
        })
        .expect(HasKindCount(ErrorKind::RecursiveFunctionTypeAlias, 1));
    }
}

mod mixins {
    use super::*;

    #[test]
    fn plain_mixin_compiles() {
        Test::build(|p| {
            let lib = p.library("core");
            p.object_class(lib);
            let m = p.class(lib, "M");
            p.extends(m, "Object");
            let base = p.class(lib, "Base");
            p.extends(base, "Object");
            p.mixin_application(lib, "C", "Base", &["M"]);
        })
        .expect(Compiles);
    }

    #[test]
    fn mixin_declaring_constructor() {
        Test::build(|p| {
            let lib = p.library("main");
            let m = p.class(lib, "M");
            p.constructor(m, CtorSpec::unnamed());
            let c = p.class(lib, "C");
            p.with_mixins(c, &["M"]);
        })
        .expect(HasKindCount(ErrorKind::MixinDeclaresConstructor, 1))
        .expect(HasError("The class 'M' cannot be used as a mixin"));
    }

    #[test]
    fn mixin_with_superclass() {
        Test::build(|p| {
            let lib = p.library("main");
            p.class(lib, "Base");
            let m = p.class(lib, "M");
            p.extends(m, "Base");
            let c = p.class(lib, "C");
            p.with_mixins(c, &["M"]);
        })
        .expect(HasKindCount(ErrorKind::MixinInheritsFromNotObject, 1));
    }

    #[test]
    fn mixin_referencing_super() {
        Test::build(|p| {
            let lib = p.library("main");
            let m = p.class(lib, "M");
            let call = p.call(Some(p.super_expr()), "run", Element::Unresolved, vec![]);
            p.method(m, MethodSpec::method("run").body(vec![p.expr_stmt(call)]));
            let c = p.class(lib, "C");
            p.with_mixins(c, &["M"]);
        })
        .expect(HasKindCount(ErrorKind::MixinReferencesSuper, 1));
    }

    #[test]
    fn mixin_of_type_parameter() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.type_parameters(c, &["T"]);
            p.with_mixins(c, &["T"]);
        })
        .expect(HasKindCount(ErrorKind::MixinOfNonClass, 1));
    }

    #[test]
    fn mixin_application_over_typedef() {
        Test::build(|p| {
            let lib = p.library("main");
            p.typedef(lib, TypedefSpec::new("F"));
            p.class(lib, "M");
            p.mixin_application(lib, "C", "F", &["M"]);
        })
        .expect(HasKindCount(ErrorKind::MixinWithNonClassSuperclass, 1))
        .expect(Lacks(ErrorKind::ExtendsNonClass));
    }
}
