use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::frame::DataType;

/// A single cell value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// One row of a nested frame, as ordered name/value pairs.
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Concrete type of this value, `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int32(_) => Some(DataType::Int32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Utf8(_) => Some(DataType::Utf8),
            Value::Struct(_) => Some(DataType::Group),
        }
    }

    /// Returns `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for `Null` and for a NaN float.
    pub fn is_na(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Integer view (`Int32` widens).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Float view of any numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(f64::from(*v)),
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Boolean view.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Nested field lookup for `Struct` values.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Ordering between comparable values.
    ///
    /// Numbers compare across widths (floats by total order), strings and
    /// booleans compare within their own type. Anything else is unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
            (Value::Int64(_) | Value::Int32(_), Value::Int64(_) | Value::Int32(_)) => {
                Some(self.as_i64()?.cmp(&other.as_i64()?))
            }
            (
                Value::Int32(_) | Value::Int64(_) | Value::Float64(_),
                Value::Int32(_) | Value::Int64(_) | Value::Float64(_),
            ) => Some(self.as_f64()?.total_cmp(&other.as_f64()?)),
            (Value::Utf8(a), Value::Utf8(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            // bitwise so that NaN groups with NaN when counting frequencies
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Utf8(a), Value::Utf8(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::Utf8(v) => v.hash(state),
            Value::Struct(fields) => fields.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(v) => f.write_str(v),
            Value::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Conversion of Rust values into cells, carrying the declared element type.
///
/// `declared_type` is what computed columns are typed with; `Value` itself
/// declares nothing and leaves the type to be inferred from the produced cells.
pub trait IntoValue {
    /// Element type every produced value conforms to, if statically known.
    fn declared_type() -> Option<DataType>;

    /// Convert into a cell.
    fn into_value(self) -> Value;
}

macro_rules! impl_into_value {
    ($ty:ty, $dtype:ident, $variant:ident) => {
        impl IntoValue for $ty {
            fn declared_type() -> Option<DataType> {
                Some(DataType::$dtype)
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_into_value!(bool, Boolean, Boolean);
impl_into_value!(i32, Int32, Int32);
impl_into_value!(i64, Int64, Int64);
impl_into_value!(f64, Float64, Float64);
impl_into_value!(String, Utf8, Utf8);

impl IntoValue for &str {
    fn declared_type() -> Option<DataType> {
        Some(DataType::Utf8)
    }

    fn into_value(self) -> Value {
        Value::Utf8(self.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn declared_type() -> Option<DataType> {
        T::declared_type()
    }

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: IntoValue> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.into_value()
    }
}

impl IntoValue for Value {
    fn declared_type() -> Option<DataType> {
        None
    }

    fn into_value(self) -> Value {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::{IntoValue, Value};
    use crate::frame::DataType;

    #[test]
    fn numeric_values_compare_across_widths() {
        assert_eq!(
            Value::Int32(3).compare(&Value::Int64(3)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Int64(2).compare(&Value::Float64(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Utf8("a".into()).compare(&Value::Int64(1)), None);
    }

    #[test]
    fn na_covers_null_and_nan() {
        assert!(Value::Null.is_na());
        assert!(Value::Float64(f64::NAN).is_na());
        assert!(!Value::Float64(0.0).is_na());
        assert!(!Value::Utf8(String::new()).is_na());
    }

    #[test]
    fn options_declare_inner_type() {
        assert_eq!(<Option<i64>>::declared_type(), Some(DataType::Int64));
        assert_eq!(<Value>::declared_type(), None);
        assert_eq!(None::<i64>.into_value(), Value::Null);
    }

    #[test]
    fn struct_display_lists_fields() {
        let v = Value::Struct(vec![
            ("a".to_string(), Value::Int64(1)),
            ("b".to_string(), Value::Null),
        ]);
        assert_eq!(v.to_string(), "{a: 1, b: null}");
        assert_eq!(v.field("a"), Some(&Value::Int64(1)));
    }
}
