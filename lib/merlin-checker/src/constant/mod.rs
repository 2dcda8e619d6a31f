//! Compile-time constant evaluation.
//!
//! Constants are evaluated on demand and cached per variable, so a constant
//! referenced from many places is evaluated (and reported) once. The
//! evaluator tracks the variables and constructors it is currently inside;
//! re-entering one is a recursive constant definition.

mod evaluator;
mod value;

use merlin_resolved::{ConstructorId, VariableId};
use rustc_hash::FxHashMap;

use crate::cycle::CycleDetector;

pub use evaluator::{ConstantEvaluator, Fault};
pub use value::ConstValue;

/// Evaluation results shared by every validator of one run.
#[derive(Debug, Default)]
pub struct ConstantState {
    /// `None` marks a constant whose evaluation failed and was reported.
    variables: FxHashMap<VariableId, Option<ConstValue>>,
    variable_path: CycleDetector<VariableId>,
    constructor_path: CycleDetector<ConstructorId>,
}

impl ConstantState {
    /// Outer `None`: not evaluated yet.
    pub fn cached(&self, variable: VariableId) -> Option<Option<&ConstValue>> {
        self.variables.get(&variable).map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
