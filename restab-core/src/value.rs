//! Value model for table entries.
//!
//! A [`Value`] mirrors one literal of a table description: a single
//! scalar, a brace-initialized sequence, or a nested [`ArrayResource`]
//! that gets its own static storage in the definition artifact.

use std::fmt;

use crate::array::ArrayResource;

/// A single formattable datum. How it is rendered is decided by a
/// [`Formatter`](crate::format::Formatter).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Symbolic or string data; the formatter decides whether it is quoted.
    Text(String),
}

impl Scalar {
    /// Short name of the scalar kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Bool(_) => "boolean",
            Scalar::Text(_) => "text",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// The value of one table entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// Compiled as `{ a, b, ... }`.
    Sequence(Vec<Value>),
    /// Nested array with its own storage; compiled as its qualified name.
    Array(ArrayResource),
}

impl Value {
    pub fn sequence(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(values.into_iter().collect())
    }

    /// Nested array resources in pre-order, which is also emission order.
    pub fn arrays(&self) -> Vec<&ArrayResource> {
        let mut found = Vec::new();
        self.collect_arrays(&mut found);
        found
    }

    fn collect_arrays<'a>(&'a self, found: &mut Vec<&'a ArrayResource>) {
        match self {
            Value::Scalar(_) => {}
            Value::Sequence(items) => {
                for item in items {
                    item.collect_arrays(found);
                }
            }
            Value::Array(array) => found.push(array),
        }
    }

    pub(crate) fn arrays_mut(&mut self) -> Vec<&mut ArrayResource> {
        let mut found = Vec::new();
        self.collect_arrays_mut(&mut found);
        found
    }

    fn collect_arrays_mut<'a>(&'a mut self, found: &mut Vec<&'a mut ArrayResource>) {
        match self {
            Value::Scalar(_) => {}
            Value::Sequence(items) => {
                for item in items {
                    item.collect_arrays_mut(found);
                }
            }
            Value::Array(array) => found.push(array),
        }
    }

    /// Scalars that are rendered with the owning table's formatter.
    ///
    /// Values inside nested arrays are excluded; those carry their own.
    pub(crate) fn scalars(&self) -> Vec<&Scalar> {
        match self {
            Value::Scalar(scalar) => vec![scalar],
            Value::Sequence(items) => items.iter().flat_map(Value::scalars).collect(),
            Value::Array(_) => Vec::new(),
        }
    }
}

macro_rules! value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(value.into())
                }
            }
        )*
    };
}

value_from_scalar!(Scalar, i64, i32, u32, f64, bool, &str, String);

impl From<ArrayResource> for Value {
    fn from(array: ArrayResource) -> Self {
        Value::Array(array)
    }
}
