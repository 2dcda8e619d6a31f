//! Tests for the evaluation run as a whole: ordering, determinism,
//! configuration and the serialized forms of programs and results.

use merlin_test_suite::*;

fn three_problems() -> Program {
    let p = ProgramBuilder::new();
    let lib = p.library("main");
    let a = p.class(lib, "A");
    p.implements(a, &["dynamic"]);
    let division = p.binary(BinaryOp::TruncDiv, p.int(1), p.int(0));
    p.top_level_variable(lib, VarSpec::new("x").constant().init(division));
    let b = p.class(lib, "B");
    p.method(b, MethodSpec::operator("+"));
    p.finish()
}

#[test]
fn diagnostics_are_in_source_order() {
    let mut test = Test::new(three_problems());
    let diagnostics = test.diagnostics();
    assert_eq!(diagnostics.len(), 3);

    let keys: Vec<_> = diagnostics.iter().map(|d| d.span.sort_key()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::ImplementsDynamic,
            ErrorKind::ConstEvalThrowsIdbze,
            ErrorKind::WrongNumberOfParametersForOperator,
        ]
    );
}

#[test]
fn checking_twice_gives_the_same_result() {
    let program = three_problems();
    let json = serde_json::to_string(&program).unwrap();
    let copy: Program = serde_json::from_str(&json).unwrap();

    let first = Test::new(program).diagnostics().clone();
    let second = Test::new(copy).diagnostics().clone();
    assert_eq!(first, second);
}

#[test]
fn diagnostic_set_serializes_as_a_list() {
    let diagnostics = Test::new(three_problems()).diagnostics().clone();
    let value = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(3));
    assert_eq!(value[0]["kind"], "IMPLEMENTS_DYNAMIC");

    let back: DiagnosticSet = serde_json::from_value(value).unwrap();
    assert_eq!(back, diagnostics);
}

#[test]
fn disabled_validators_do_not_report() {
    let config = ValidationConfig::new().without("hierarchy").without("operators");
    Test::new(three_problems())
        .with_config(config)
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::ConstEvalThrowsIdbze));
}

#[test]
fn debug_mode_records_the_reporting_validator() {
    let mut test = Test::new(three_problems()).with_config(ValidationConfig::new().with_debug_mode());
    let origins: Vec<_> = test.diagnostics().iter().map(|d| d.origin.clone()).collect();
    assert_eq!(
        origins,
        vec![
            Some("hierarchy".to_string()),
            Some("constants".to_string()),
            Some("operators".to_string()),
        ]
    );

    let mut plain = Test::new(three_problems());
    assert!(plain.diagnostics().iter().all(|d| d.origin.is_none()));
}

#[test]
fn unchecked_mode_downgrades_checked_mode_rules() {
    let build = || {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        p.class(lib, "int");
        let c = p.class(lib, "C");
        p.field(c, VarSpec::new("x").final_().typed("int"));
        p.constructor(
            c,
            CtorSpec::unnamed().constant().param(ParamSpec::required("x").field_formal()),
        );
        let creation = p.instance(true, p.ty("C"), None, vec![p.arg(p.bool(true))]);
        p.top_level_variable(lib, VarSpec::new("c").constant().init(creation));
        p.finish()
    };

    let mut checked = Test::new(build());
    let severities: Vec<_> = checked.diagnostics().iter().map(|d| d.severity).collect();
    assert_eq!(severities, vec![Severity::Error]);

    let mut unchecked = Test::new(build()).with_config(ValidationConfig::new().unchecked());
    let severities: Vec<_> = unchecked.diagnostics().iter().map(|d| d.severity).collect();
    assert_eq!(severities, vec![Severity::Warning]);
    assert!(!unchecked.diagnostics().has_errors());
}

#[test]
fn ids_without_declarations_report_nothing() {
    let p = ProgramBuilder::new();
    let lib = p.library("main");
    let gone = ClassId::from_raw(999);
    let sub = p.class(lib, "Sub");
    p.extends_type(sub, p.ty_as("Gone", TypeTarget::Class(gone)));
    p.constructor(sub, CtorSpec::unnamed().super_call(None, vec![]));
    p.class(lib, "Plain");
    let lost = p.identifier("lost", Element::Variable(VariableId::from_raw(555)));
    p.top_level_variable(lib, VarSpec::new("c").constant().init(lost));
    let creation = p.instance(true, p.ty_as("Gone", TypeTarget::Class(gone)), None, vec![]);
    p.top_level_variable(lib, VarSpec::new("d").constant().init(creation));
    let mut program = p.finish();
    program.object_class = Some(ClassId::from_raw(4242));

    let mut test = Test::new(program);
    let diagnostics = test.diagnostics();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn empty_program_has_no_diagnostics() {
    let mut test = Test::new(Program::default());
    assert!(test.diagnostics().is_empty());
}
