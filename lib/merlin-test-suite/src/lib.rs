//! Merlin Test Suite
//!
//! A fluent test API for checking resolved programs.
//!
//! # Example
//!
//! ```
//! use merlin_test_suite::*;
//!
//! #[test]
//! fn repeated_interface() {
//!     Test::build(|p| {
//!         let lib = p.library("main");
//!         p.class(lib, "Foo");
//!         let bar = p.class(lib, "Bar");
//!         p.implements(bar, &["Foo", "Foo"]);
//!     })
//!     .expect(HasKindCount(ErrorKind::ImplementsRepeated, 1))
//!     .expect(HasError("'Foo' can only be implemented once"));
//! }
//! ```
//!
//! # Available Expectations
//!
//! - `Compiles` / `Fails`: no errors at all, or at least one
//! - `HasError(text)`: some message contains `text`
//! - `HasMessage(kind, text)`: a diagnostic of `kind` whose message contains `text`
//! - `HasErrorCount(n)`: exactly `n` errors
//! - `HasKind(kind)` / `Lacks(kind)` / `HasKindCount(kind, n)`
//! - `KindAt(kind, span)`: a diagnostic of `kind` at exactly `span`

use merlin_checker::check_with_config;

// Re-export what test programs are written with
pub use merlin_checker::ValidationConfig;
pub use merlin_diagnostics::{DiagnosticSet, ErrorKind, Severity};
pub use merlin_resolved::*;

/// Test context containing the checked program and its diagnostics
pub struct TestContext {
    pub program: Program,
    pub diagnostics: DiagnosticSet,
}

/// A program under test
pub struct Test {
    program: Option<Program>,
    config: ValidationConfig,
    context: Option<TestContext>,
}

impl Test {
    /// Create a new test from a finished program
    pub fn new(program: Program) -> Self {
        Test {
            program: Some(program),
            config: ValidationConfig::default(),
            context: None,
        }
    }

    /// Create a test by describing the program with a builder
    pub fn build(f: impl FnOnce(&ProgramBuilder)) -> Self {
        let builder = ProgramBuilder::new();
        f(&builder);
        Self::new(builder.finish())
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Check the program once and store the result
    fn check(&mut self) -> &TestContext {
        let program = &mut self.program;
        let config = &self.config;
        self.context.get_or_insert_with(|| {
            let program = program.take().unwrap_or_default();
            let diagnostics = check_with_config(&program, config);
            TestContext {
                program,
                diagnostics,
            }
        })
    }

    /// The diagnostics of the run, for assertions the expectations don't cover
    pub fn diagnostics(&mut self) -> &DiagnosticSet {
        &self.check().diagnostics
    }

    /// Apply an expectation to this test
    pub fn expect<E: Expectable>(mut self, expectation: E) -> Self {
        let ctx = self.check();
        if let Err(e) = expectation.check(ctx) {
            if !ctx.diagnostics.is_empty() {
                eprintln!("\n--- Diagnostics ---");
                for diagnostic in ctx.diagnostics.iter() {
                    eprintln!(
                        "{} at {:?}..{}: {}",
                        diagnostic.name(),
                        diagnostic.span.source,
                        diagnostic.span.start,
                        diagnostic.display_message()
                    );
                }
            }
            panic!("Expectation failed: {}", e);
        }
        self
    }
}

/// Trait for test expectations
pub trait Expectable {
    fn check(&self, ctx: &TestContext) -> Result<(), String>;
}

fn names(diagnostics: &DiagnosticSet) -> Vec<&'static str> {
    diagnostics.iter().map(|d| d.name()).collect()
}

/// Expects the program to have no errors
pub struct Compiles;

impl Expectable for Compiles {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        if ctx.diagnostics.has_errors() {
            Err(format!(
                "Expected no errors, but got {}: {:?}",
                ctx.diagnostics.error_count(),
                names(&ctx.diagnostics)
            ))
        } else {
            Ok(())
        }
    }
}

/// Expects at least one error
pub struct Fails;

impl Expectable for Fails {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        if ctx.diagnostics.has_errors() {
            Ok(())
        } else {
            Err("Expected an error, but the program checked cleanly".to_string())
        }
    }
}

/// Expects a diagnostic whose message contains the given text
pub struct HasError(pub &'static str);

impl Expectable for HasError {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        if ctx.diagnostics.iter().any(|d| d.message.contains(self.0)) {
            return Ok(());
        }
        let messages: Vec<_> = ctx.diagnostics.iter().map(|d| d.message.as_str()).collect();
        Err(format!(
            "Expected an error containing '{}', but got: {:?}",
            self.0, messages
        ))
    }
}

/// Expects a diagnostic of a kind whose message contains the given text
pub struct HasMessage(pub ErrorKind, pub &'static str);

impl Expectable for HasMessage {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        let messages: Vec<_> = ctx.diagnostics.of_kind(self.0).map(|d| d.message.as_str()).collect();
        if messages.iter().any(|m| m.contains(self.1)) {
            Ok(())
        } else {
            Err(format!(
                "Expected {} containing '{}', but got: {:?}",
                self.0.name(),
                self.1,
                messages
            ))
        }
    }
}

/// Expects exactly N errors
pub struct HasErrorCount(pub usize);

impl Expectable for HasErrorCount {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        let actual = ctx.diagnostics.error_count();
        if actual == self.0 {
            Ok(())
        } else {
            Err(format!(
                "Expected {} error(s), but got {}: {:?}",
                self.0,
                actual,
                names(&ctx.diagnostics)
            ))
        }
    }
}

/// Expects at least one diagnostic of a kind
pub struct HasKind(pub ErrorKind);

impl Expectable for HasKind {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        if ctx.diagnostics.of_kind(self.0).next().is_some() {
            Ok(())
        } else {
            Err(format!(
                "Expected {}, but got: {:?}",
                self.0.name(),
                names(&ctx.diagnostics)
            ))
        }
    }
}

/// Expects no diagnostic of a kind
pub struct Lacks(pub ErrorKind);

impl Expectable for Lacks {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        match ctx.diagnostics.of_kind(self.0).count() {
            0 => Ok(()),
            n => Err(format!("Expected no {}, but got {}", self.0.name(), n)),
        }
    }
}

/// Expects exactly N diagnostics of a kind
pub struct HasKindCount(pub ErrorKind, pub usize);

impl Expectable for HasKindCount {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        let actual = ctx.diagnostics.of_kind(self.0).count();
        if actual == self.1 {
            Ok(())
        } else {
            Err(format!(
                "Expected {} {}, but got {}: {:?}",
                self.1,
                self.0.name(),
                actual,
                names(&ctx.diagnostics)
            ))
        }
    }
}

/// Expects a diagnostic of a kind at exactly the given span
pub struct KindAt(pub ErrorKind, pub Span);

impl Expectable for KindAt {
    fn check(&self, ctx: &TestContext) -> Result<(), String> {
        let spans: Vec<Span> = ctx.diagnostics.of_kind(self.0).map(|d| d.span).collect();
        if spans.contains(&self.1) {
            Ok(())
        } else {
            Err(format!(
                "Expected {} at {:?}, but found it at {:?}",
                self.0.name(),
                self.1,
                spans
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_compiles() {
        Test::build(|p| {
            p.library("main");
        })
        .expect(Compiles)
        .expect(HasErrorCount(0));
    }

    #[test]
    #[should_panic(expected = "Expectation failed")]
    fn failed_expectation_panics() {
        Test::build(|p| {
            p.library("main");
        })
        .expect(Fails);
    }
}
