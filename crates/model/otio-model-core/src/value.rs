//! Value: the closed set of types a metadata dictionary or vector can hold.

use otio_time_core::{RationalTime, TimeRange, TimeTransform};

use crate::dictionary::{Dictionary, Vector};
use crate::object::Object;

/// Lightweight kind enum for matching and for error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Bool,
    Int,
    Double,
    String,
    RationalTime,
    TimeRange,
    TimeTransform,
    Object,
    Dictionary,
    Vector,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    None,

    Bool(bool),

    Int(i64),

    Double(f64),

    String(String),

    RationalTime(RationalTime),

    TimeRange(TimeRange),

    TimeTransform(TimeTransform),

    /// Shared reference to another schema object (compared by identity).
    Object(Object),

    Dictionary(Dictionary),

    Vector(Vector),

    /// A schema-tagged value type this model does not represent, kept verbatim.
    Unknown {
        type_name: String,
        payload: serde_json::Value,
    },
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::RationalTime(_) => ValueKind::RationalTime,
            Value::TimeRange(_) => ValueKind::TimeRange,
            Value::TimeTransform(_) => ValueKind::TimeTransform,
            Value::Object(_) => ValueKind::Object,
            Value::Dictionary(_) => ValueKind::Dictionary,
            Value::Vector(_) => ValueKind::Vector,
            Value::Unknown { .. } => ValueKind::Unknown,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Doubles, and integers widened to doubles.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<RationalTime> {
        match self {
            Value::RationalTime(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<TimeRange> {
        match self {
            Value::TimeRange(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<TimeTransform> {
        match self {
            Value::TimeTransform(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Vector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector_mut(&mut self) -> Option<&mut Vector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<RationalTime> for Value {
    fn from(v: RationalTime) -> Self {
        Value::RationalTime(v)
    }
}

impl From<TimeRange> for Value {
    fn from(v: TimeRange) -> Self {
        Value::TimeRange(v)
    }
}

impl From<TimeTransform> for Value {
    fn from(v: TimeTransform) -> Self {
        Value::TimeTransform(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl From<Dictionary> for Value {
    fn from(v: Dictionary) -> Self {
        Value::Dictionary(v)
    }
}

impl From<Vector> for Value {
    fn from(v: Vector) -> Self {
        Value::Vector(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(Value::from(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from(3).kind(), ValueKind::Int);
        assert_eq!(Value::from(3.5).kind(), ValueKind::Double);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::from(None::<i64>).kind(), ValueKind::None);
        assert_eq!(
            Value::from(RationalTime::new(1.0, 24.0)).kind(),
            ValueKind::RationalTime
        );
    }

    #[test]
    fn accessors_are_strict_except_numeric_widening() {
        let v = Value::from(7i64);
        assert_eq!(v.as_i64(), Some(7));
        assert_eq!(v.as_f64(), Some(7.0));
        assert_eq!(v.as_str(), None);
        assert_eq!(Value::from(2.5).as_i64(), None);
    }
}
