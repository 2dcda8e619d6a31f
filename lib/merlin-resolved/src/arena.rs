//! Append-only storage indexed by typed ids.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::ids::ArenaId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Arena<I, T> {
    entries: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn alloc(&mut self, value: T) -> I {
        let id = I::from_index(self.entries.len());
        self.entries.push(value);
        id
    }

    /// Lookup by id; ids from another program simply miss.
    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get(id.index())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entries.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, value)| (I::from_index(index), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ClassId;

    #[test]
    fn alloc_returns_sequential_ids() {
        let mut arena: Arena<ClassId, &str> = Arena::new();
        let a = arena.alloc("A");
        let b = arena.alloc("B");
        assert_eq!(a, ClassId(0));
        assert_eq!(b, ClassId(1));
        assert_eq!(arena.get(b), Some(&"B"));
    }

    #[test]
    fn missing_id_is_none() {
        let arena: Arena<ClassId, u8> = Arena::new();
        assert!(arena.get(ClassId(4)).is_none());
    }
}
