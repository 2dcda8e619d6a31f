use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use merlin_span::SourceId;
use rustc_hash::FxHashMap;

pub use codespan_reporting::diagnostic::{Diagnostic, Label};
pub use codespan_reporting::term::termcolor;

/// Conversion of an engine diagnostic into a renderable codespan diagnostic.
pub trait IntoDiagnostic {
    /// The source unit the diagnostic points into.
    fn source(&self) -> SourceId;

    /// Convert into a codespan diagnostic against the given file id.
    fn into_diagnostic(&self, file_id: usize) -> Diagnostic<usize>;
}

/// Registry of source texts plus the rendered diagnostics waiting to be emitted.
pub struct DiagnosticContext {
    files: SimpleFiles<String, String>,
    diagnostics: Vec<Diagnostic<usize>>,
    file_map: FxHashMap<SourceId, usize>,
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            diagnostics: Vec::new(),
            file_map: FxHashMap::default(),
        }
    }

    /// Register the text of a compilation unit.
    ///
    /// Registering the same source twice keeps the first text.
    pub fn add_file(&mut self, source: SourceId, name: String, text: String) -> usize {
        if let Some(&id) = self.file_map.get(&source) {
            return id;
        }
        let id = self.files.add(name, text);
        self.file_map.insert(source, id);
        id
    }

    pub fn has_file(&self, source: SourceId) -> bool {
        self.file_map.contains_key(&source)
    }

    /// Render a diagnostic against its registered file.
    ///
    /// Returns false when the diagnostic's source was never registered.
    pub fn throw<D: IntoDiagnostic>(&mut self, diagnostic: &D) -> bool {
        let Some(&file_id) = self.file_map.get(&diagnostic.source()) else {
            return false;
        };
        self.diagnostics.push(diagnostic.into_diagnostic(file_id));
        true
    }

    /// Emit all diagnostics to stderr with color support.
    pub fn emit(&self) -> Result<(), codespan_reporting::files::Error> {
        let writer = StandardStream::stderr(ColorChoice::Auto);
        let mut lock = writer.lock();
        let result = self.emit_to(&mut lock);
        result
    }

    pub fn emit_to<W: termcolor::WriteColor>(
        &self,
        writer: &mut W,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();

        for diagnostic in &self.diagnostics {
            term::emit(writer, &config, &self.files, diagnostic)?;
        }

        Ok(())
    }
}

impl Default for DiagnosticContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlin_span::Span;
    use termcolor::NoColor;

    struct Unused {
        span: Span,
    }

    impl IntoDiagnostic for Unused {
        fn source(&self) -> SourceId {
            self.span.source
        }

        fn into_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
            Diagnostic::error()
                .with_message("value is never read")
                .with_labels(vec![Label::primary(file_id, self.span.range())])
        }
    }

    #[test]
    fn throw_requires_registered_source() {
        let mut ctx = DiagnosticContext::new();
        let unused = Unused {
            span: Span::new(SourceId(3), 0, 1),
        };
        assert!(!ctx.throw(&unused));
        assert!(!ctx.has_file(SourceId(3)));

        ctx.add_file(SourceId(3), "a.src".to_string(), "x = 1\n".to_string());
        assert!(ctx.throw(&unused));

        let mut out = NoColor::new(Vec::new());
        ctx.emit_to(&mut out).unwrap();
        assert!(String::from_utf8(out.into_inner()).unwrap().contains("a.src"));
    }

    #[test]
    fn add_file_is_idempotent_per_source() {
        let mut ctx = DiagnosticContext::new();
        let first = ctx.add_file(SourceId(0), "a".to_string(), "one".to_string());
        let second = ctx.add_file(SourceId(0), "b".to_string(), "two".to_string());
        assert_eq!(first, second);
        assert!(ctx.has_file(SourceId(0)));
    }

    #[test]
    fn emit_to_renders_message() {
        let mut ctx = DiagnosticContext::new();
        ctx.add_file(SourceId(0), "main.src".to_string(), "var x = 1;\n".to_string());
        ctx.throw(&Unused {
            span: Span::new(SourceId(0), 4, 1),
        });

        let mut out = NoColor::new(Vec::new());
        ctx.emit_to(&mut out).unwrap();
        let rendered = String::from_utf8(out.into_inner()).unwrap();
        assert!(rendered.contains("value is never read"));
        assert!(rendered.contains("main.src"));
    }

    #[test]
    fn emit_writes_to_stderr() {
        let mut ctx = DiagnosticContext::new();
        ctx.add_file(SourceId(1), "lib.src".to_string(), "x;\n".to_string());
        ctx.throw(&Unused {
            span: Span::new(SourceId(1), 0, 1),
        });
        assert!(ctx.emit().is_ok());
    }
}
