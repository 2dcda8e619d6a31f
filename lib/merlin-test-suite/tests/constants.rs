//! Tests for compile-time constant evaluation
//!
//! These tests verify that constant contexts are evaluated:
//! - `const` variables, default values and constant literals
//! - Constant constructor invocations, including what they throw
//! - Checked-mode assignability of constant field values

use merlin_test_suite::*;

mod variables {
    use super::*;

    #[test]
    fn integer_division_by_zero() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let division = p.binary(BinaryOp::TruncDiv, p.int(1), p.int(0));
        let span = division.span;
        p.top_level_variable(lib, VarSpec::new("x").constant().init(division));

        Test::new(p.finish())
            .expect(HasErrorCount(1))
            .expect(KindAt(ErrorKind::ConstEvalThrowsIdbze, span));
    }

    #[test]
    fn arithmetic_on_constants_compiles() {
        Test::build(|p| {
            let lib = p.library("main");
            let a = p.top_level_variable(lib, VarSpec::new("a").constant().init(p.int(6)));
            let sum = p.binary(BinaryOp::Mul, p.var_ref(a), p.int(7));
            p.top_level_variable(lib, VarSpec::new("b").constant().init(sum));
            let greeting = p.interpolation(vec![p.string("n = "), p.var_ref(a)]);
            p.top_level_variable(lib, VarSpec::new("s").constant().init(greeting));
        })
        .expect(Compiles);
    }

    #[test]
    fn constant_initialized_from_variable() {
        Test::build(|p| {
            let lib = p.library("main");
            let plain = p.top_level_variable(lib, VarSpec::new("plain").init(p.int(1)));
            p.top_level_variable(lib, VarSpec::new("c").constant().init(p.var_ref(plain)));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ConstInitializedWithNonConstantValue));
    }

    #[test]
    fn function_and_type_references_are_constant() {
        Test::build(|p| {
            let lib = p.library("main");
            p.function(lib, MethodSpec::method("f"));
            let c = p.class(lib, "C");
            p.method(c, MethodSpec::method("make").static_());
            p.method(c, MethodSpec::method("run"));
            p.top_level_variable(lib, VarSpec::new("a").constant().init(p.function_ref("f")));
            p.top_level_variable(lib, VarSpec::new("b").constant().init(p.class_ref(c)));
            let make = p.method_ref(c, "make", true);
            p.top_level_variable(lib, VarSpec::new("d").constant().init(make));
            let run = p.method_ref(c, "run", false);
            p.top_level_variable(lib, VarSpec::new("e").constant().init(run));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ConstInitializedWithNonConstantValue));
    }

    #[test]
    fn failing_constant_is_reported_once() {
        Test::build(|p| {
            let lib = p.library("main");
            let bad = p.binary(BinaryOp::And, p.bool(true), p.int(1));
            let a = p.top_level_variable(lib, VarSpec::new("a").constant().init(bad));
            p.top_level_variable(lib, VarSpec::new("b").constant().init(p.var_ref(a)));
            p.top_level_variable(lib, VarSpec::new("c").constant().init(p.var_ref(a)));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ConstEvalTypeBool));
    }

    #[test]
    fn recursive_constants() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let a = p.top_level_variable(lib, VarSpec::new("a").constant());
        let b = p.top_level_variable(lib, VarSpec::new("b").constant().init(p.var_ref(a)));
        let back = p.identifier("b", Element::Variable(b));
        let mut program = p.finish();
        if let Some(decl) = program.variables.get_mut(a) {
            decl.initializer = Some(back);
        }

        Test::new(program)
            .expect(HasErrorCount(1))
            .expect(HasKind(ErrorKind::RecursiveCompileTimeConstant));
    }

    #[test]
    fn conditional_needs_bool_condition() {
        Test::build(|p| {
            let lib = p.library("main");
            let choice = p.conditional(p.int(1), p.int(2), p.int(3));
            p.top_level_variable(lib, VarSpec::new("c").constant().init(choice));
        })
        .expect(HasKindCount(ErrorKind::ConstEvalTypeBool, 1));
    }
}

mod literals {
    use super::*;

    #[test]
    fn const_list_with_non_constant_element() {
        Test::build(|p| {
            let lib = p.library("main");
            let plain = p.top_level_variable(lib, VarSpec::new("plain").init(p.int(1)));
            let list = p.list(true, vec![], vec![p.int(0), p.var_ref(plain)]);
            let local = p.local(VarSpec::new("l").init(list));
            p.function(lib, MethodSpec::method("main").body(vec![local]));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::NonConstantListElement));
    }

    #[test]
    fn const_map_with_non_constant_key() {
        Test::build(|p| {
            let lib = p.library("main");
            let plain = p.top_level_variable(lib, VarSpec::new("plain").init(p.string("k")));
            let map = p.map(true, vec![], vec![(p.var_ref(plain), p.int(1))]);
            p.top_level_variable(lib, VarSpec::new("m").init(map));
        })
        .expect(HasKindCount(ErrorKind::NonConstantMapKey, 1));
    }

    #[test]
    fn missing_const_in_constant_context() {
        Test::build(|p| {
            let lib = p.library("main");
            let list = p.list(false, vec![], vec![p.int(1)]);
            p.top_level_variable(lib, VarSpec::new("l").constant().init(list));
        })
        .expect(HasKindCount(ErrorKind::MissingConstInListLiteral, 1));
    }

    #[test]
    fn type_parameter_in_const_list() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.type_parameters(c, &["T"]);
            let list = p.list(true, vec![p.ty("T")], vec![]);
            p.method(c, MethodSpec::method("m").body(vec![p.expr_stmt(list)]));
        })
        .expect(HasKindCount(ErrorKind::InvalidTypeArgumentInConstList, 1))
        .expect(HasError("such as 'T'"));
    }

    #[test]
    fn non_constant_default_value() {
        Test::build(|p| {
            let lib = p.library("main");
            let plain = p.top_level_variable(lib, VarSpec::new("plain").init(p.int(1)));
            p.function(
                lib,
                MethodSpec::method("f").param(ParamSpec::optional("x").default_value(p.var_ref(plain))),
            );
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::NonConstantDefaultValue));
    }
}

mod creations {
    use super::*;

    #[test]
    fn const_creation_of_non_const_constructor() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::unnamed());
            let creation = p.instance(true, p.ty("C"), None, vec![]);
            p.top_level_variable(lib, VarSpec::new("c").constant().init(creation));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ConstWithNonConst));
    }

    #[test]
    fn const_creation_of_undefined_constructor() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::unnamed().constant());
            let creation = p.instance(true, p.ty("C"), Some("missing"), vec![]);
            p.top_level_variable(lib, VarSpec::new("c").constant().init(creation));
        })
        .expect(HasKindCount(ErrorKind::ConstWithUndefinedConstructor, 1))
        .expect(HasError("does not have a constant constructor 'missing'"));
    }

    #[test]
    fn const_creation_with_wrong_arguments() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.constructor(c, CtorSpec::unnamed().constant().param(ParamSpec::required("a")));
            let too_few = p.instance(true, p.ty("C"), None, vec![]);
            p.top_level_variable(lib, VarSpec::new("x").constant().init(too_few));
            let too_many = p.instance(
                true,
                p.ty("C"),
                None,
                vec![p.arg(p.int(1)), p.arg(p.int(2))],
            );
            p.top_level_variable(lib, VarSpec::new("y").constant().init(too_many));
            let unknown_name = p.instance(
                true,
                p.ty("C"),
                None,
                vec![p.arg(p.int(1)), p.named_arg("b", p.int(2))],
            );
            p.top_level_variable(lib, VarSpec::new("z").constant().init(unknown_name));
        })
        .expect(HasErrorCount(3))
        .expect(HasKind(ErrorKind::NotEnoughRequiredArguments))
        .expect(HasKind(ErrorKind::ExtraPositionalArguments))
        .expect(HasKind(ErrorKind::UndefinedNamedParameter));
    }

    #[test]
    fn constant_constructor_that_throws() {
        Test::build(|p| {
            let lib = p.library("main");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_());
            let quotient = p.binary(BinaryOp::TruncDiv, p.int(1), p.param_ref("a"));
            p.constructor(
                c,
                CtorSpec::unnamed()
                    .constant()
                    .param(ParamSpec::required("a"))
                    .init_field("x", quotient),
            );
            let ok = p.instance(true, p.ty("C"), None, vec![p.arg(p.int(2))]);
            p.top_level_variable(lib, VarSpec::new("fine").constant().init(ok));
            let bad = p.instance(true, p.ty("C"), None, vec![p.arg(p.int(0))]);
            p.top_level_variable(lib, VarSpec::new("broken").constant().init(bad));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ConstConstructorThrowsException))
        .expect(Lacks(ErrorKind::ConstEvalThrowsIdbze));
    }

    #[test]
    fn non_constant_value_in_initializer_list() {
        Test::build(|p| {
            let lib = p.library("main");
            let plain = p.top_level_variable(lib, VarSpec::new("plain").init(p.int(1)));
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_());
            p.constructor(c, CtorSpec::unnamed().constant().init_field("x", p.var_ref(plain)));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::NonConstantValueInInitializer));
    }

    #[test]
    fn field_value_must_match_declared_type() {
        let build = || {
            let p = ProgramBuilder::new();
            let lib = p.library("core");
            p.class(lib, "int");
            let c = p.class(lib, "C");
            p.field(c, VarSpec::new("x").final_().typed("int"));
            p.constructor(
                c,
                CtorSpec::unnamed()
                    .constant()
                    .param(ParamSpec::required("x").field_formal()),
            );
            let creation = p.instance(true, p.ty("C"), None, vec![p.arg(p.string("text"))]);
            p.top_level_variable(lib, VarSpec::new("c").constant().init(creation));
            p.finish()
        };

        Test::new(build())
            .expect(HasErrorCount(1))
            .expect(
                HasError("The initializer type 'String' cannot be assigned to the field type 'int'"),
            );

        Test::new(build())
            .with_config(ValidationConfig::new().unchecked())
            .expect(Compiles)
            .expect(HasKindCount(ErrorKind::ConstFieldInitializerNotAssignable, 1));
    }
}
