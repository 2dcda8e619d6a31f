use std::cmp::Ordering;

use merlin_resolved::{ClassId, Program};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// The value of a compile-time constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(BigInt),
    Double(f64),
    String(String),
    List(Vec<ConstValue>),
    Map(Vec<(ConstValue, ConstValue)>),
    Object(ClassId),
    Type(String),
    Function(String),
    /// A potentially constant value, such as a constructor parameter,
    /// whose concrete value is not known at this point.
    Unknown,
}

impl ConstValue {
    pub fn int(value: i64) -> Self {
        ConstValue::Int(BigInt::from(value))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ConstValue::Unknown)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, ConstValue::Bool(_) | ConstValue::Unknown)
    }

    pub fn is_int_or_null(&self) -> bool {
        matches!(self, ConstValue::Int(_) | ConstValue::Null | ConstValue::Unknown)
    }

    pub fn is_num_or_null(&self) -> bool {
        matches!(
            self,
            ConstValue::Int(_) | ConstValue::Double(_) | ConstValue::Null | ConstValue::Unknown
        )
    }

    pub fn is_bool_num_string_or_null(&self) -> bool {
        matches!(
            self,
            ConstValue::Bool(_)
                | ConstValue::Int(_)
                | ConstValue::Double(_)
                | ConstValue::String(_)
                | ConstValue::Null
                | ConstValue::Unknown
        )
    }

    /// The runtime type name, as shown in messages.
    pub fn type_name(&self, program: &Program) -> String {
        match self {
            ConstValue::Null => "Null".to_string(),
            ConstValue::Bool(_) => "bool".to_string(),
            ConstValue::Int(_) => "int".to_string(),
            ConstValue::Double(_) => "double".to_string(),
            ConstValue::String(_) => "String".to_string(),
            ConstValue::List(_) => "List".to_string(),
            ConstValue::Map(_) => "Map".to_string(),
            ConstValue::Object(class) => program.class_name(*class).unwrap_or("Object").to_string(),
            ConstValue::Type(_) => "Type".to_string(),
            ConstValue::Function(_) => "Function".to_string(),
            ConstValue::Unknown => "dynamic".to_string(),
        }
    }

    /// Source-like rendering of the value.
    pub fn render(&self, program: &Program) -> String {
        match self {
            ConstValue::Null => "null".to_string(),
            ConstValue::Bool(b) => b.to_string(),
            ConstValue::Int(i) => i.to_string(),
            ConstValue::Double(d) => d.to_string(),
            ConstValue::String(s) => format!("'{s}'"),
            ConstValue::Type(name) | ConstValue::Function(name) => name.clone(),
            ConstValue::Object(class) => format!("const {}()", program.class_name(*class).unwrap_or("?")),
            other => other.type_name(program),
        }
    }

    /// String conversion used by interpolation; `None` when unknown.
    pub fn interpolate(&self) -> Option<String> {
        match self {
            ConstValue::Null => Some("null".to_string()),
            ConstValue::Bool(b) => Some(b.to_string()),
            ConstValue::Int(i) => Some(i.to_string()),
            ConstValue::Double(d) => Some(d.to_string()),
            ConstValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// `==` between two constants; `None` when either side is unknown.
    pub fn equals(&self, other: &ConstValue) -> Option<bool> {
        match (self, other) {
            (ConstValue::Unknown, _) | (_, ConstValue::Unknown) => None,
            (ConstValue::Int(a), ConstValue::Double(b)) | (ConstValue::Double(b), ConstValue::Int(a)) => {
                Some(a.to_f64() == Some(*b))
            }
            (a, b) => Some(a == b),
        }
    }

    /// Numeric ordering for relational operators.
    pub fn compare(&self, other: &ConstValue) -> Option<Ordering> {
        match (self, other) {
            (ConstValue::Int(a), ConstValue::Int(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Int(i) => i.to_f64(),
            ConstValue::Double(d) => Some(*d),
            _ => None,
        }
    }
}
