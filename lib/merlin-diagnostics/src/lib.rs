//! Diagnostic catalog and collection.
//!
//! [`ErrorKind`] is the closed set of compile-time errors; each kind has
//! static [`ErrorMetadata`]. Validators report through a
//! [`DiagnosticCollector`], which formats, deduplicates and finally orders
//! the results into a [`DiagnosticSet`].

mod catalog;
mod collector;
mod diagnostic;

pub use catalog::{Argument, ErrorCategory, ErrorKind, ErrorMetadata, FormatError, Param, Severity};
pub use collector::{DiagnosticCollector, DiagnosticSet};
pub use diagnostic::Diagnostic;
