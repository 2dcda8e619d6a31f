//! Static-semantics checks for resolved programs
//!
//! This crate evaluates a [`Program`] handed over by the resolver against the
//! language's compile-time rules and collects the violations as a
//! [`DiagnosticSet`].
//!
//! # Architecture
//!
//! - `validation`: the single program walk and every rule group (`Validator`)
//! - `context`: run-wide `Session` state and the scoped `EvaluationContext`
//! - `constant`: compile-time constant evaluation with a per-run cache
//! - `queries`: hierarchy and member lookups shared by the validators
//! - `namespace`: export and import namespaces of every library
//! - `cycle`: cycle detection over id graphs
//!
//! # Usage
//!
//! ```ignore
//! use merlin_checker::{check_with_config, ValidationConfig};
//!
//! let config = ValidationConfig::new().without("overrides");
//! let diagnostics = check_with_config(&program, &config);
//! for diagnostic in diagnostics.iter() {
//!     println!("{}: {}", diagnostic.name(), diagnostic.message);
//! }
//! ```

pub mod config;
pub mod constant;
pub mod context;
pub mod cycle;
pub mod namespace;
pub mod queries;
pub mod validation;

pub use config::ValidationConfig;
pub use context::{EvaluationContext, MemberContext, Session};
pub use validation::{ValidationRunner, Validator};

use merlin_diagnostics::DiagnosticSet;
use merlin_resolved::Program;

/// Check `program` with every validator enabled.
pub fn check(program: &Program) -> DiagnosticSet {
    check_with_config(program, &ValidationConfig::default())
}

pub fn check_with_config(program: &Program, config: &ValidationConfig) -> DiagnosticSet {
    ValidationRunner::new().run(program, config)
}
