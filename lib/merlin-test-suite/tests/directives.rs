//! Tests for import, export and part directives

use merlin_test_suite::*;

mod uris {
    use super::*;

    #[test]
    fn library_imports_compile() {
        Test::build(|p| {
            let util = p.library("util");
            p.function(util, MethodSpec::method("helper"));
            let main = p.library("main");
            p.import(main, util);
            p.directive(main, DirectiveSpec::part(UriTarget::PartFile).uri("main_part.src"));
        })
        .expect(Compiles);
    }

    #[test]
    fn interpolated_uri() {
        Test::build(|p| {
            let main = p.library("main");
            p.directive(
                main,
                DirectiveSpec::import(UriTarget::Missing).uri("${dir}/lib.src").interpolated(),
            );
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::UriWithInterpolation))
        .expect(Lacks(ErrorKind::UriDoesNotExist));
    }

    #[test]
    fn malformed_and_missing_uris() {
        Test::build(|p| {
            let main = p.library("main");
            p.directive(main, DirectiveSpec::import(UriTarget::Malformed).uri("::"));
            p.directive(main, DirectiveSpec::export(UriTarget::Missing).uri("gone.src"));
        })
        .expect(HasErrorCount(2))
        .expect(HasKind(ErrorKind::InvalidUri))
        .expect(HasError("Target of URI does not exist: 'gone.src'"));
    }

    #[test]
    fn importing_and_exporting_a_part() {
        Test::build(|p| {
            let main = p.library("main");
            p.directive(main, DirectiveSpec::import(UriTarget::PartFile).uri("piece.src"));
            p.directive(main, DirectiveSpec::export(UriTarget::PartFile).uri("piece.src"));
        })
        .expect(HasKindCount(ErrorKind::ImportOfNonLibrary, 1))
        .expect(HasKindCount(ErrorKind::ExportOfNonLibrary, 1));
    }

    #[test]
    fn part_directive_naming_a_library() {
        Test::build(|p| {
            let other = p.library("other");
            let main = p.library("main");
            p.directive(main, DirectiveSpec::part(UriTarget::Library(other)));
        })
        .expect(HasKindCount(ErrorKind::PartOfNonPart, 1))
        .expect(HasError("'other'"));
    }
}

mod internal {
    use super::*;

    #[test]
    fn user_library_cannot_import_internal_library() {
        Test::build(|p| {
            let hidden = p.internal_library("_hidden");
            let main = p.library("main");
            p.import(main, hidden);
            p.export(main, hidden);
        })
        .expect(HasErrorCount(2))
        .expect(HasKind(ErrorKind::ImportInternalLibrary))
        .expect(HasKind(ErrorKind::ExportInternalLibrary));
    }

    #[test]
    fn internal_libraries_may_use_each_other() {
        Test::build(|p| {
            let hidden = p.internal_library("_hidden");
            let core = p.internal_library("_core");
            p.import(core, hidden);
        })
        .expect(Compiles);
    }
}

mod namespaces {
    use super::*;

    #[test]
    fn ambiguous_import_of_a_type() {
        Test::build(|p| {
            let a = p.library("a");
            p.class(a, "Shared");
            let b = p.library("b");
            p.class(b, "Shared");
            let main = p.library("main");
            p.import(main, a);
            p.import(main, b);
            p.top_level_variable(main, VarSpec::new("x").typed("Shared"));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::AmbiguousImport))
        .expect(HasError("The element 'Shared' is defined in the libraries 'a' and 'b'"));
    }

    #[test]
    fn ambiguous_import_through_an_export_cycle() {
        Test::build(|p| {
            let a = p.library("a");
            p.class(a, "Shared");
            let b = p.library("b");
            p.export(a, b);
            p.export(b, a);
            let c = p.library("c");
            p.class(c, "Shared");
            let main = p.library("main");
            p.import(main, b);
            p.import(main, c);
            p.top_level_variable(main, VarSpec::new("x").typed("Shared"));
        })
        .expect(HasErrorCount(1))
        .expect(HasKindCount(ErrorKind::AmbiguousImport, 1))
        .expect(HasError("The element 'Shared' is defined in the libraries 'a' and 'c'"));
    }

    #[test]
    fn ambiguous_import_of_a_function() {
        Test::build(|p| {
            let a = p.library("a");
            p.function(a, MethodSpec::method("run"));
            let b = p.library("b");
            p.function(b, MethodSpec::method("run"));
            let main = p.library("main");
            p.import(main, a);
            p.import(main, b);
            let call = p.call(None, "run", Element::Function, vec![]);
            p.function(main, MethodSpec::method("main").body(vec![p.expr_stmt(call)]));
        })
        .expect(HasKindCount(ErrorKind::AmbiguousImport, 1));
    }

    #[test]
    fn hide_combinator_resolves_the_ambiguity() {
        Test::build(|p| {
            let a = p.library("a");
            p.class(a, "Shared");
            let b = p.library("b");
            p.class(b, "Shared");
            let main = p.library("main");
            p.import(main, a);
            p.directive(main, DirectiveSpec::import(UriTarget::Library(b)).hide(&["Shared"]));
            p.top_level_variable(main, VarSpec::new("x").typed("Shared"));
        })
        .expect(Compiles);
    }

    #[test]
    fn prefixed_import_is_not_ambiguous() {
        Test::build(|p| {
            let a = p.library("a");
            p.class(a, "Shared");
            let b = p.library("b");
            p.class(b, "Shared");
            let main = p.library("main");
            p.import(main, a);
            p.directive(main, DirectiveSpec::import(UriTarget::Library(b)).prefix("b"));
            p.top_level_variable(main, VarSpec::new("x").typed("Shared"));
        })
        .expect(Compiles);
    }

    #[test]
    fn local_declaration_shadows_imports() {
        Test::build(|p| {
            let a = p.library("a");
            p.class(a, "Shared");
            let b = p.library("b");
            p.class(b, "Shared");
            let main = p.library("main");
            p.import(main, a);
            p.import(main, b);
            p.class(main, "Shared");
            p.top_level_variable(main, VarSpec::new("x").typed("Shared"));
        })
        .expect(Compiles);
    }

    #[test]
    fn ambiguous_export() {
        Test::build(|p| {
            let a = p.library("a");
            p.class(a, "Shared");
            let b = p.library("b");
            p.class(b, "Shared");
            let both = p.library("both");
            p.export(both, a);
            p.export(both, b);
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::AmbiguousExport));
    }

    #[test]
    fn reexporting_the_same_declaration_twice() {
        Test::build(|p| {
            let a = p.library("a");
            p.class(a, "Shared");
            let facade = p.library("facade");
            p.export(facade, a);
            let both = p.library("both");
            p.export(both, a);
            p.export(both, facade);
        })
        .expect(Compiles);
    }

    #[test]
    fn prefix_collides_with_top_level_member() {
        Test::build(|p| {
            let util = p.library("util");
            let main = p.library("main");
            p.directive(main, DirectiveSpec::import(UriTarget::Library(util)).prefix("util"));
            p.function(main, MethodSpec::method("util"));
        })
        .expect(HasErrorCount(1))
        .expect(HasKind(ErrorKind::PrefixCollidesWithTopLevelMember));
    }
}
