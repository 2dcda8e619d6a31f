use merlin_span::{SourceId, Span};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::catalog::{Argument, ErrorKind, Severity};
use crate::diagnostic::Diagnostic;

/// Accumulates diagnostics for one evaluation run.
///
/// Reports are deduplicated on kind, message and span as they arrive;
/// [`finish`](Self::finish) sorts them into source order.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(ErrorKind, Span, String)>,
    origin: Option<&'static str>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `kind` at `span` with its default severity.
    ///
    /// # Panics
    ///
    /// Panics when `arguments` does not match the kind's template. That is a
    /// mismatch between a validator and the catalog, never a property of the
    /// program being checked.
    pub fn report(&mut self, kind: ErrorKind, span: Span, arguments: Vec<Argument>) {
        self.report_with_severity(kind, span, arguments, kind.default_severity());
    }

    pub fn report_with_severity(
        &mut self,
        kind: ErrorKind,
        span: Span,
        arguments: Vec<Argument>,
        severity: Severity,
    ) {
        let message = match kind.format(&arguments) {
            Ok(message) => message,
            Err(error) => panic!("malformed report: {error}"),
        };

        if !self.seen.insert((kind, span, message.clone())) {
            tracing::trace!(kind = kind.name(), start = span.start, "duplicate diagnostic dropped");
            return;
        }

        tracing::trace!(
            kind = kind.name(),
            source = span.source.0,
            start = span.start,
            "diagnostic reported"
        );
        self.diagnostics.push(Diagnostic {
            kind,
            arguments,
            message,
            span,
            severity,
            origin: self.origin.map(str::to_string),
        });
    }

    /// Attribute subsequent reports to a validator (debug mode).
    pub fn set_origin(&mut self, origin: Option<&'static str>) {
        self.origin = origin;
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn finish(self) -> DiagnosticSet {
        let mut diagnostics = self.diagnostics;
        // Stable: reports at the same offset keep their emission order.
        diagnostics.sort_by_key(|d| d.span.sort_key());
        DiagnosticSet { diagnostics }
    }
}

/// The ordered result of one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticSet {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSet {
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Split into per-unit sets, ordered by source id.
    pub fn by_source(&self) -> Vec<(SourceId, DiagnosticSet)> {
        let mut sets: Vec<(SourceId, DiagnosticSet)> = Vec::new();
        for diagnostic in &self.diagnostics {
            match sets.last_mut() {
                Some((source, set)) if *source == diagnostic.span.source => {
                    set.diagnostics.push(diagnostic.clone());
                }
                _ => sets.push((
                    diagnostic.span.source,
                    DiagnosticSet {
                        diagnostics: vec![diagnostic.clone()],
                    },
                )),
            }
        }
        sets
    }
}

impl<'a> IntoIterator for &'a DiagnosticSet {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl IntoIterator for DiagnosticSet {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn at(source: u32, start: usize) -> Span {
        Span::new(SourceId(source), start, 1)
    }

    #[test]
    fn orders_by_source_then_offset() {
        let mut collector = DiagnosticCollector::new();
        collector.report(ErrorKind::ExtendsNonClass, at(1, 2), args![]);
        collector.report(ErrorKind::ImplementsDynamic, at(0, 9), args![]);
        collector.report(ErrorKind::MixinOfNonClass, at(0, 3), args![]);

        let set = collector.finish();
        let kinds: Vec<_> = set.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::MixinOfNonClass,
                ErrorKind::ImplementsDynamic,
                ErrorKind::ExtendsNonClass
            ]
        );
    }

    #[test]
    fn equal_offsets_keep_emission_order() {
        let mut collector = DiagnosticCollector::new();
        collector.report(ErrorKind::ImplementsDynamic, at(0, 4), args![]);
        collector.report(ErrorKind::ExtendsNonClass, at(0, 4), args![]);

        let set = collector.finish();
        assert_eq!(set.as_slice()[0].kind, ErrorKind::ImplementsDynamic);
        assert_eq!(set.as_slice()[1].kind, ErrorKind::ExtendsNonClass);
    }

    #[test]
    fn duplicates_collapse() {
        let mut collector = DiagnosticCollector::new();
        collector.report(ErrorKind::DuplicateDefinition, at(0, 4), args!["x"]);
        collector.report(ErrorKind::DuplicateDefinition, at(0, 4), args!["x"]);
        collector.report(ErrorKind::DuplicateDefinition, at(0, 4), args!["y"]);
        collector.report(ErrorKind::DuplicateDefinition, at(0, 8), args!["x"]);
        assert_eq!(collector.finish().len(), 3);
    }

    #[test]
    #[should_panic(expected = "malformed report")]
    fn wrong_arity_panics() {
        let mut collector = DiagnosticCollector::new();
        collector.report(ErrorKind::DuplicateDefinition, at(0, 0), args![]);
    }

    #[test]
    fn reserved_kinds_pass_through() {
        let mut collector = DiagnosticCollector::new();
        collector.report(ErrorKind::RecursiveCompileTimeConstant, at(0, 0), args![]);
        let set = collector.finish();
        assert_eq!(set.as_slice()[0].message, "");
        assert!(set.has_errors());
    }

    #[test]
    fn warnings_are_not_errors() {
        let mut collector = DiagnosticCollector::new();
        collector.report_with_severity(
            ErrorKind::ConstFieldInitializerNotAssignable,
            at(0, 0),
            args![Argument::ty("String"), Argument::ty("int")],
            Severity::Warning,
        );
        let set = collector.finish();
        assert!(!set.has_errors());
        assert_eq!(set.error_count(), 0);
    }

    #[test]
    fn origin_is_recorded() {
        let mut collector = DiagnosticCollector::new();
        collector.set_origin(Some("hierarchy"));
        collector.report(ErrorKind::ImplementsDynamic, at(0, 0), args![]);
        collector.set_origin(None);
        collector.report(ErrorKind::ExtendsNonClass, at(0, 1), args![]);
        let set = collector.finish();
        assert_eq!(set.as_slice()[0].origin.as_deref(), Some("hierarchy"));
        assert_eq!(set.as_slice()[1].origin, None);
    }

    #[test]
    fn splits_by_source() {
        let mut collector = DiagnosticCollector::new();
        collector.report(ErrorKind::ImplementsDynamic, at(2, 0), args![]);
        collector.report(ErrorKind::ImplementsDynamic, at(0, 0), args![]);
        collector.report(ErrorKind::ExtendsNonClass, at(0, 5), args![]);
        let sets = collector.finish().by_source();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].0, SourceId(0));
        assert_eq!(sets[0].1.len(), 2);
        assert_eq!(sets[1].0, SourceId(2));
    }
}
