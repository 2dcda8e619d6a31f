//! Library namespaces: what each library exports and what its unprefixed
//! imports bring into scope.

use merlin_resolved::{
    Combinator, Declaration, DirectiveKind, Ident, Library, LibraryId, Program, Span, UriTarget,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Two export directives of one library providing the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConflict {
    pub name: String,
    /// URI of the later directive.
    pub span: Span,
    pub first: LibraryId,
    pub second: LibraryId,
}

#[derive(Debug, Default)]
pub struct Namespaces {
    defined: FxHashMap<LibraryId, FxHashSet<String>>,
    exported: FxHashMap<LibraryId, FxHashMap<String, LibraryId>>,
    conflicts: FxHashMap<LibraryId, Vec<ExportConflict>>,
    imported: FxHashMap<LibraryId, FxHashMap<String, Vec<LibraryId>>>,
}

impl Namespaces {
    pub fn compute(program: &Program) -> Self {
        let mut namespaces = Namespaces::default();
        for (id, library) in program.libraries.iter() {
            let names = top_level_names(program, library).into_iter().map(|i| i.name).collect();
            namespaces.defined.insert(id, names);
        }
        namespaces.settle_exports(program);
        for (id, library) in program.libraries.iter() {
            let imported = namespaces.import_namespace(library);
            namespaces.imported.insert(id, imported);
        }
        tracing::debug!(libraries = program.libraries.len(), "namespaces computed");
        namespaces
    }

    /// Whether `name` is declared at the top level of `library` itself.
    pub fn is_defined(&self, library: LibraryId, name: &str) -> bool {
        self.defined.get(&library).is_some_and(|names| names.contains(name))
    }

    pub fn exported(&self, library: LibraryId) -> Option<&FxHashMap<String, LibraryId>> {
        self.exported.get(&library)
    }

    pub fn export_conflicts(&self, library: LibraryId) -> &[ExportConflict] {
        self.conflicts.get(&library).map_or(&[], Vec::as_slice)
    }

    /// Distinct libraries that declare `name` among the unprefixed imports of `library`.
    pub fn import_origins(&self, library: LibraryId, name: &str) -> &[LibraryId] {
        self.imported
            .get(&library)
            .and_then(|names| names.get(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Export namespaces of every library.
    ///
    /// Each round re-merges every library's export directives against the
    /// previous round's namespaces, so names travel one export edge per round
    /// and export cycles settle once a round changes nothing.
    fn settle_exports(&mut self, program: &Program) {
        let mut exported: FxHashMap<LibraryId, FxHashMap<String, LibraryId>> = program
            .libraries
            .iter()
            .map(|(id, library)| (id, local_exports(program, id, library)))
            .collect();
        let mut conflicts = FxHashMap::default();

        for round in 0..=program.libraries.len() {
            let mut changed = false;
            let mut next = FxHashMap::default();
            conflicts.clear();
            for (id, library) in program.libraries.iter() {
                let (names, found) = merge_exports(program, id, library, &exported);
                changed |= exported.get(&id) != Some(&names);
                next.insert(id, names);
                conflicts.insert(id, found);
            }
            exported = next;
            if !changed {
                tracing::trace!(round, "export namespaces settled");
                break;
            }
        }

        self.exported = exported;
        self.conflicts = conflicts;
    }

    fn import_namespace(&self, library: &Library) -> FxHashMap<String, Vec<LibraryId>> {
        let mut names: FxHashMap<String, Vec<LibraryId>> = FxHashMap::default();
        for unit in &library.units {
            for directive in &unit.directives {
                let DirectiveKind::Import {
                    prefix: None,
                    combinators,
                } = &directive.kind
                else {
                    continue;
                };
                let UriTarget::Library(target) = directive.uri.target else {
                    continue;
                };
                let Some(exported) = self.exported.get(&target) else {
                    continue;
                };
                for (name, origin) in apply_combinators(exported.clone(), combinators) {
                    let origins = names.entry(name).or_default();
                    if !origins.contains(&origin) {
                        origins.push(origin);
                    }
                }
            }
        }
        names
    }
}

/// Public top-level names of `library`, each originating from `library` itself.
fn local_exports(
    program: &Program,
    id: LibraryId,
    library: &Library,
) -> FxHashMap<String, LibraryId> {
    top_level_names(program, library)
        .into_iter()
        .filter(|ident| !ident.name.starts_with('_'))
        .map(|ident| (ident.name, id))
        .collect()
}

/// One library's export namespace given the current namespaces of its export targets.
///
/// Local declarations win; among re-exports the earlier directive wins and a
/// different origin for the same name is recorded as a conflict.
fn merge_exports(
    program: &Program,
    id: LibraryId,
    library: &Library,
    exported: &FxHashMap<LibraryId, FxHashMap<String, LibraryId>>,
) -> (FxHashMap<String, LibraryId>, Vec<ExportConflict>) {
    let mut names = local_exports(program, id, library);
    let local: FxHashSet<String> = names.keys().cloned().collect();
    let mut conflicts = Vec::new();

    for directive in library.units.iter().flat_map(|unit| unit.directives.iter()) {
        let DirectiveKind::Export { combinators } = &directive.kind else {
            continue;
        };
        let UriTarget::Library(target) = directive.uri.target else {
            continue;
        };
        let Some(provided) = exported.get(&target) else {
            continue;
        };
        let mut provided: Vec<_> =
            apply_combinators(provided.clone(), combinators).into_iter().collect();
        provided.sort();
        for (name, origin) in provided {
            if local.contains(&name) {
                continue;
            }
            match names.get(&name) {
                Some(&existing) if existing != origin => conflicts.push(ExportConflict {
                    name,
                    span: directive.uri.span,
                    first: existing,
                    second: origin,
                }),
                Some(_) => {}
                None => {
                    names.insert(name, origin);
                }
            }
        }
    }
    (names, conflicts)
}

/// Names declared at the top level of every unit of `library`, in declaration order.
pub fn top_level_names(program: &Program, library: &Library) -> Vec<Ident> {
    library
        .units
        .iter()
        .flat_map(|unit| unit.declarations.iter())
        .filter_map(|declaration| match declaration {
            Declaration::Class(id) => program.class(*id).map(|c| c.name.clone()),
            Declaration::Function(function) => Some(function.name.clone()),
            Declaration::Variable(id) => program.variable(*id).map(|v| v.name.clone()),
            Declaration::Typedef(id) => program.typedef(*id).map(|t| t.name.clone()),
        })
        .collect()
}

/// Import prefixes declared by `library`.
pub fn import_prefixes(library: &Library) -> Vec<&Ident> {
    library
        .units
        .iter()
        .flat_map(|unit| unit.directives.iter())
        .filter_map(|directive| match &directive.kind {
            DirectiveKind::Import {
                prefix: Some(prefix),
                ..
            } => Some(prefix),
            _ => None,
        })
        .collect()
}

fn apply_combinators(
    mut names: FxHashMap<String, LibraryId>,
    combinators: &[Combinator],
) -> FxHashMap<String, LibraryId> {
    for combinator in combinators {
        match combinator {
            Combinator::Show(shown) => {
                names.retain(|name, _| shown.iter().any(|s| &s.name == name));
            }
            Combinator::Hide(hidden) => {
                names.retain(|name, _| !hidden.iter().any(|h| &h.name == name));
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlin_resolved::{DirectiveSpec, ProgramBuilder, VarSpec};

    #[test]
    fn exports_include_reexports() {
        let p = ProgramBuilder::new();
        let base = p.library("base");
        p.class(base, "Base");
        p.class(base, "_Hidden");
        let facade = p.library("facade");
        p.export(facade, base);
        let program = p.finish();

        let namespaces = Namespaces::compute(&program);
        let exported = namespaces.exported(facade).unwrap();
        assert_eq!(exported.get("Base"), Some(&base));
        assert!(!exported.contains_key("_Hidden"));
        assert!(namespaces.export_conflicts(facade).is_empty());
    }

    #[test]
    fn conflicting_exports_are_recorded() {
        let p = ProgramBuilder::new();
        let a = p.library("a");
        p.class(a, "Shared");
        let b = p.library("b");
        p.class(b, "Shared");
        let both = p.library("both");
        p.export(both, a);
        p.export(both, b);
        let program = p.finish();

        let namespaces = Namespaces::compute(&program);
        let conflicts = namespaces.export_conflicts(both);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name, "Shared");
        assert_eq!((conflicts[0].first, conflicts[0].second), (a, b));
    }

    #[test]
    fn combinators_filter_imports() {
        let p = ProgramBuilder::new();
        let a = p.library("a");
        p.class(a, "Shared");
        p.top_level_variable(a, VarSpec::new("onlyA"));
        let b = p.library("b");
        p.class(b, "Shared");
        let main = p.library("main");
        p.import(main, a);
        p.directive(main, DirectiveSpec::import(UriTarget::Library(b)).hide(&["Shared"]));
        let program = p.finish();

        let namespaces = Namespaces::compute(&program);
        assert_eq!(namespaces.import_origins(main, "Shared"), &[a]);
        assert_eq!(namespaces.import_origins(main, "onlyA"), &[a]);
    }

    #[test]
    fn export_cycles_terminate() {
        let p = ProgramBuilder::new();
        let a = p.library("a");
        p.class(a, "A");
        let b = p.library("b");
        p.class(b, "B");
        p.export(a, b);
        p.export(b, a);
        let program = p.finish();

        let namespaces = Namespaces::compute(&program);
        assert_eq!(namespaces.exported(a).unwrap().get("B"), Some(&b));
        assert_eq!(namespaces.exported(b).unwrap().get("A"), Some(&a));
        assert!(namespaces.export_conflicts(a).is_empty());
        assert!(namespaces.export_conflicts(b).is_empty());
    }

    #[test]
    fn names_reach_importers_through_an_export_cycle() {
        let p = ProgramBuilder::new();
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
        let program = p.finish();

        let namespaces = Namespaces::compute(&program);
        assert_eq!(namespaces.exported(b).unwrap().get("Shared"), Some(&a));
        assert_eq!(namespaces.import_origins(main, "Shared"), &[a, c]);
    }
}
