//! Tests for constructor and field initialization validation
//!
//! These tests verify that:
//! - Fields are initialized at most once per constructor
//! - Final fields are always initialized
//! - `super` and `this` calls reach generative constructors
//! - Redirections resolve and do not loop

use merlin_test_suite::*;

mod field_initialization {
    use super::*;

    #[test]
    fn final_field_initialized_in_declaration_and_initializer() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_().init(p.int(1)));
            p.constructor(c, CtorSpec::unnamed().init_field("x", p.int(2)));
        })
        .expect(HasErrorCount(1))
        .expect(HasKindCount(ErrorKind::FieldInitializedInInitializerAndDeclaration, 1))
        .expect(HasError("The final field 'x' already has a value"));
    }

    #[test]
    fn mutable_field_may_be_reinitialized() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").init(p.int(1)));
            p.constructor(c, CtorSpec::unnamed().init_field("x", p.int(2)));
        })
        .expect(Compiles);
    }

    #[test]
    fn formal_and_initializer_for_same_field() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let c = p.class(lib, "C");
        p.field(c, VarSpec::new("x"));
        let ctor = p.constructor(
            c,
            CtorSpec::unnamed()
                .param(ParamSpec::required("x").field_formal())
                .init_field("x", p.int(2)),
        );
        let field_span = p.with_program(|program| {
            match &program.constructor(ctor).unwrap().initializers[0].kind {
                InitializerKind::Field { field, .. } => field.span,
                _ => unreachable!(),
            }
        });

        Test::new(p.finish())
            .expect(HasErrorCount(1))
            .expect(KindAt(ErrorKind::FieldInitializedInParameterAndInitializer, field_span));
    }

    #[test]
    fn two_initializers_for_same_field() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x"));
            p.constructor(
                c,
                CtorSpec::unnamed()
                    .init_field("x", p.int(1))
                    .init_field("x", p.int(2)),
            );
        })
        .expect(HasKindCount(ErrorKind::FieldInitializedByMultipleInitializers, 1));
    }

    #[test]
    fn final_field_set_by_two_formals() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_());
            p.constructor(
                c,
                CtorSpec::unnamed()
                    .param(ParamSpec::required("x").field_formal())
                    .param(ParamSpec::optional("x").field_formal()),
            );
        })
        .expect(HasKindCount(ErrorKind::FinalInitializedMultipleTimes, 1));
    }

    #[test]
    fn formal_for_final_field_with_value() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_().init(p.int(0)));
            p.constructor(c, CtorSpec::unnamed().param(ParamSpec::required("x").field_formal()));
        })
        .expect(HasKindCount(ErrorKind::FinalInitializedInDeclarationAndConstructor, 1));
    }

    #[test]
    fn initializers_for_missing_and_static_fields() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("shared").static_());
            p.constructor(
                c,
                CtorSpec::unnamed()
                    .param(ParamSpec::required("missing").field_formal())
                    .param(ParamSpec::required("shared").field_formal())
                    .init_field("nowhere", p.int(1))
                    .init_field("shared", p.int(2)),
            );
        })
        .expect(HasErrorCount(4))
        .expect(HasKind(ErrorKind::InitializingFormalForNonExistantField))
        .expect(HasKind(ErrorKind::InitializingFormalForStaticField))
        .expect(HasKind(ErrorKind::InitializerForNonExistantField))
        .expect(HasKind(ErrorKind::InitializerForStaticField));
    }

    #[test]
    fn initializing_formals_outside_generative_constructors() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x"));
            p.constructor(
                c,
                CtorSpec::named("make")
                    .factory()
                    .param(ParamSpec::required("x").field_formal()),
            );
            p.method(c, MethodSpec::method("m").param(ParamSpec::required("x").field_formal()));
        })
        .expect(HasKindCount(ErrorKind::FieldInitializerFactoryConstructor, 1))
        .expect(HasKindCount(ErrorKind::FieldInitializerOutsideConstructor, 1));
    }
}

mod final_fields {
    use super::*;

    #[test]
    fn uninitialized_final_field_without_constructors() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_());
        })
        .expect(HasKindCount(ErrorKind::UninitializedFinalField, 1))
        .expect(HasMessage(ErrorKind::UninitializedFinalField, "'x'"));
    }

    #[test]
    fn each_constructor_initializes_on_its_own() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_());
            p.constructor(c, CtorSpec::unnamed().param(ParamSpec::required("x").field_formal()));
            p.constructor(c, CtorSpec::named("empty"));
        })
        .expect(HasErrorCount(1))
        .expect(HasKindCount(ErrorKind::UninitializedFinalField, 1));
    }

    #[test]
    fn redirecting_constructor_needs_no_initialization() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_());
            p.constructor(c, CtorSpec::unnamed().param(ParamSpec::required("x").field_formal()));
            p.constructor(c, CtorSpec::named("zero").this_call(None, vec![p.arg(p.int(0))]));
        })
        .expect(Compiles);
    }
}

mod delegation {
    use super::*;

    #[test]
    fn implicit_super_needs_default_constructor() {
        Test::build(|p| {
            let lib = p.library("main");
            let base = p.class(lib, "Base");
            p.constructor(base, CtorSpec::unnamed().param(ParamSpec::required("x")));
            let derived = p.class(lib, "Derived");
            p.extends(derived, "Base");
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::NoDefaultSuperConstructorImplicit))
        .expect(HasError("The class 'Base' does not have a default constructor"));
    }

    #[test]
    fn explicit_constructor_without_super_call() {
        Test::build(|p| {
            let lib = p.library("main");
            let base = p.class(lib, "Base");
            p.constructor(base, CtorSpec::named("named"));
            let derived = p.class(lib, "Derived");
            p.extends(derived, "Base");
            p.constructor(derived, CtorSpec::unnamed());
        })
        .expect(HasKindCount(ErrorKind::NoDefaultSuperConstructorExplicit, 1));
    }

    #[test]
    fn super_call_to_missing_and_factory_constructors() {
        Test::build(|p| {
            let lib = p.library("main");
            let base = p.class(lib, "Base");
            p.constructor(base, CtorSpec::named("make").factory());
            p.constructor(base, CtorSpec::named("plain"));
            let derived = p.class(lib, "Derived");
            p.extends(derived, "Base");
            p.constructor(derived, CtorSpec::named("a").super_call(Some("make"), vec![]));
            p.constructor(derived, CtorSpec::named("b").super_call(Some("absent"), vec![]));
            p.constructor(derived, CtorSpec::named("c").super_call(None, vec![]));
        })
        .expect(HasKindCount(ErrorKind::NonGenerativeConstructor, 1))
        .expect(HasKindCount(ErrorKind::UndefinedConstructorInInitializer, 1))
        .expect(HasKindCount(ErrorKind::UndefinedConstructorInInitializerDefault, 1))
        .expect(HasMessage(
            ErrorKind::NonGenerativeConstructor,
            "The generative constructor 'Base.make' expected",
        ));
    }

    #[test]
    fn super_in_redirecting_constructor() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::unnamed());
            p.constructor(
                c,
                CtorSpec::named("other")
                    .this_call(None, vec![])
                    .super_call(None, vec![]),
            );
        })
        .expect(HasKindCount(ErrorKind::SuperInRedirectingConstructor, 1));
    }

    #[test]
    fn repeated_delegation_in_initializer_list() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::unnamed());
            p.constructor(
                c,
                CtorSpec::named("twice").this_call(None, vec![]).this_call(None, vec![]),
            );
            p.constructor(
                c,
                CtorSpec::named("supers").super_call(None, vec![]).super_call(None, vec![]),
            );
        })
        .expect(HasKindCount(ErrorKind::MultipleRedirectingConstructorInvocations, 1))
        .expect(HasKindCount(ErrorKind::MultipleSuperInitializers, 1));
    }

    #[test]
    fn generative_redirect_cycle() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::named("a").this_call(Some("b"), vec![]));
            p.constructor(c, CtorSpec::named("b").this_call(Some("a"), vec![]));
        })
        .expect(HasErrorCount(2))
        .expect(HasKindCount(ErrorKind::RecursiveConstructorRedirect, 2));
    }

    #[test]
    fn factory_redirect_cycle() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let c = p.class(lib, "C");
        let first = p.constructor(c, CtorSpec::named("a").redirects_to("C", Some("b")));
        let second = p.constructor(c, CtorSpec::named("b").redirects_to("C", Some("a")));
        p.resolve_redirect(first, second);

        Test::new(p.finish())
            .expect(HasKindCount(ErrorKind::RecursiveFactoryRedirect, 2))
            .expect(Lacks(ErrorKind::RecursiveConstructorRedirect));
    }

    #[test]
    fn const_factory_redirecting_to_non_const() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let c = p.class(lib, "C");
        p.constructor(c, CtorSpec::named("plain"));
        p.constructor(c, CtorSpec::named("make").constant().redirects_to("C", Some("plain")));

        Test::new(p.finish()).expect(HasKindCount(ErrorKind::RedirectToNonConstConstructor, 1));
    }
}

mod declarations {
    use super::*;

    #[test]
    fn duplicate_constructors() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::unnamed());
            p.constructor(c, CtorSpec::unnamed());
            p.constructor(c, CtorSpec::named("n"));
            p.constructor(c, CtorSpec::named("n"));
        })
        .expect(HasKindCount(ErrorKind::DuplicateConstructorDefault, 1))
        .expect(HasKindCount(ErrorKind::DuplicateConstructorName, 1));
    }

    #[test]
    fn constructor_named_like_a_member() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("size"));
            p.method(c, MethodSpec::method("run"));
            p.constructor(c, CtorSpec::named("size"));
            p.constructor(c, CtorSpec::named("run"));
        })
        .expect(HasKindCount(ErrorKind::ConflictingConstructorNameAndField, 1))
        .expect(HasKindCount(ErrorKind::ConflictingConstructorNameAndMethod, 1));
    }

    #[test]
    fn constructor_written_with_another_class_name() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::named("a").written_as("D"));
            p.constructor(c, CtorSpec::named("b").written_as("D").factory());
        })
        .expect(HasKindCount(ErrorKind::InvalidConstructorName, 1))
        .expect(HasKindCount(ErrorKind::InvalidFactoryNameNotAClass, 1));
    }

    #[test]
    fn const_constructor_with_mutable_field() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("count"));
            p.constructor(c, CtorSpec::unnamed().constant());
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ConstConstructorWithNonFinalField));
    }

    #[test]
    fn generative_constructor_returning_value() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::unnamed().body(vec![p.ret(Some(p.int(1)))]));
            p.constructor(c, CtorSpec::named("early").body(vec![p.ret(None)]));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ReturnInGenerativeConstructor));
    }
}
