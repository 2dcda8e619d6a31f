//! Typed identifiers for the program arenas.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identifier that indexes one [`Arena`](crate::Arena).
pub trait ArenaId: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn to_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(LibraryId);
define_id!(ClassId);
define_id!(VariableId);
define_id!(ConstructorId);
define_id!(TypedefId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_names_the_table() {
        assert_eq!(format!("{:?}", ClassId::from_raw(7)), "ClassId(7)");
        assert_eq!(format!("{:?}", VariableId::from_index(2)), "VariableId(2)");
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&ConstructorId(3)).unwrap();
        assert_eq!(json, "3");
    }
}
