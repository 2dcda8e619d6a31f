use merlin_reporting::{IntoDiagnostic, Label};
use merlin_span::{SourceId, Span};
use serde::{Deserialize, Serialize};

use crate::catalog::{Argument, ErrorKind, Severity};

/// One reported violation.
///
/// The message is formatted once, when the diagnostic is reported, so two
/// diagnostics are duplicates exactly when kind, message and span agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub arguments: Vec<Argument>,
    pub message: String,
    pub span: Span,
    pub severity: Severity,
    /// Name of the validator that reported it, recorded in debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// The message shown to users; reserved kinds fall back to their name.
    pub fn display_message(&self) -> &str {
        if self.message.is_empty() {
            self.kind.name()
        } else {
            &self.message
        }
    }
}

impl IntoDiagnostic for Diagnostic {
    fn source(&self) -> SourceId {
        self.span.source
    }

    fn into_diagnostic(&self, file_id: usize) -> merlin_reporting::Diagnostic<usize> {
        let diagnostic = match self.severity {
            Severity::Error => merlin_reporting::Diagnostic::error(),
            Severity::Warning => merlin_reporting::Diagnostic::warning(),
        };

        let mut notes = Vec::new();
        let clause = self.kind.metadata().clause;
        if !clause.is_empty() {
            notes.push(format!("see {clause}"));
        }
        if let Some(origin) = &self.origin {
            notes.push(format!("reported by {origin}"));
        }

        diagnostic
            .with_code(self.kind.name())
            .with_message(self.display_message())
            .with_labels(vec![Label::primary(file_id, self.span.range())])
            .with_notes(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlin_reporting::{termcolor, DiagnosticContext};

    fn diagnostic(kind: ErrorKind, message: &str) -> Diagnostic {
        Diagnostic {
            kind,
            arguments: Vec::new(),
            message: message.to_string(),
            span: Span::new(SourceId(0), 6, 3),
            severity: Severity::Error,
            origin: None,
        }
    }

    #[test]
    fn reserved_kinds_render_their_name() {
        let d = diagnostic(ErrorKind::InvalidConstant, "");
        assert_eq!(d.display_message(), "INVALID_CONSTANT");
    }

    #[test]
    fn renders_code_and_clause() {
        let d = diagnostic(ErrorKind::ExtendsNonClass, "Classes can only extend other classes");
        let rendered = d.into_diagnostic(2);
        assert_eq!(rendered.code.as_deref(), Some("EXTENDS_NON_CLASS"));
        assert_eq!(rendered.notes, vec!["see 7.9 Superclasses".to_string()]);
        assert_eq!(rendered.labels[0].file_id, 2);
        assert_eq!(rendered.labels[0].range, 6..9);
    }

    #[test]
    fn renders_against_registered_unit() {
        let mut ctx = DiagnosticContext::new();
        ctx.add_file(SourceId(0), "main.src".to_string(), "class Foo {}\n".to_string());
        let d = diagnostic(ErrorKind::ExtendsNonClass, "Classes can only extend other classes");
        assert!(ctx.throw(&d));

        let mut out = termcolor::NoColor::new(Vec::new());
        ctx.emit_to(&mut out).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("error[EXTENDS_NON_CLASS]"));
        assert!(text.contains("main.src"));
    }

    #[test]
    fn origin_is_omitted_from_json_when_absent() {
        let d = diagnostic(ErrorKind::ExtendsNonClass, "Classes can only extend other classes");
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("origin"));
        assert!(json.contains("\"EXTENDS_NON_CLASS\""));
    }
}
