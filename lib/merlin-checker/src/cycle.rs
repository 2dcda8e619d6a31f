//! Cycle detection over id graphs.
//!
//! Used for class hierarchies, constant definitions, typedefs and
//! constructor redirections. Callers `enter` a node before following its
//! edges and `exit` once done; entering a node that is already on the
//! active path yields the [`Cycle`].

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashSet;

/// A path that returned to one of its own nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<T> {
    /// Active path plus the repeated node at the end.
    path: Vec<T>,
    /// Index of the first occurrence of the repeated node.
    cycle_start: usize,
}

impl<T: Clone + Debug> Cycle<T> {
    /// The nodes that form the loop, starting at the repeated node.
    pub fn cycle(&self) -> &[T] {
        &self.path[self.cycle_start..self.path.len() - 1]
    }

    /// The repeated node.
    pub fn entry(&self) -> &T {
        &self.path[self.cycle_start]
    }

    /// `A -> B -> A`, closing the loop at the entry node.
    pub fn render(&self, mut name: impl FnMut(&T) -> String) -> String {
        self.path[self.cycle_start..]
            .iter()
            .map(&mut name)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[derive(Debug)]
pub struct CycleDetector<T> {
    active: FxHashSet<T>,
    stack: Vec<T>,
}

impl<T: Clone + Eq + Hash + Debug> CycleDetector<T> {
    pub fn new() -> Self {
        Self {
            active: FxHashSet::default(),
            stack: Vec::new(),
        }
    }

    /// Push `node` onto the active path.
    ///
    /// On `Ok` the caller must `exit` once the node's edges are done.
    pub fn enter(&mut self, node: T) -> Result<(), Cycle<T>> {
        if self.active.contains(&node) {
            let mut path = self.stack.clone();
            path.push(node.clone());
            let cycle_start = path
                .iter()
                .position(|n| n == &node)
                .expect("active node is on the stack");
            return Err(Cycle { path, cycle_start });
        }

        self.active.insert(node.clone());
        self.stack.push(node);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics when no node is active.
    pub fn exit(&mut self) {
        let node = self
            .stack
            .pop()
            .expect("exit() without a matching enter()");
        self.active.remove(&node);
    }
}

impl<T: Clone + Eq + Hash + Debug> Default for CycleDetector<T> {
    fn default() -> Self {
        Self::new()
    }
}
