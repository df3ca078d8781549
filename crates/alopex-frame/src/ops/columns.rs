use std::collections::HashMap;
use std::sync::Arc;

use crate::frame::{Column, ColumnType, DataType, Frame, Value};
use crate::{FrameError, Result};

/// Pending type conversion of a set of columns, created by [`Frame::cast`].
#[derive(Debug, Clone)]
pub struct CastClause<'a> {
    frame: &'a Frame,
    columns: Vec<String>,
}

impl<'a> CastClause<'a> {
    /// Convert the selected columns to `dtype`.
    ///
    /// Concrete targets convert each value (integers narrow only when they
    /// fit, floats become integers only when integral, strings are parsed);
    /// abstract targets only widen the declared type. Nullability is kept.
    pub fn to(self, dtype: DataType) -> Result<Frame> {
        let mut columns = self.frame.shared_columns().to_vec();
        for name in &self.columns {
            let index = self.frame.column_index(name)?;
            columns[index] = Arc::new(cast_column(&columns[index], dtype)?);
        }
        Frame::from_shared_with_height(columns, self.frame.height())
    }
}

fn cast_column(column: &Column, dtype: DataType) -> Result<Column> {
    let source = column.column_type();
    let mismatch = || {
        FrameError::type_mismatch(
            Some(column.name().to_string()),
            dtype.to_string(),
            source.to_string(),
        )
    };
    let values = match column.value_slice() {
        Some(values) if dtype != DataType::Group => values,
        _ => return Err(mismatch()),
    };

    let converted = values
        .iter()
        .map(|v| cast_value(v, dtype).ok_or_else(mismatch))
        .collect::<Result<Vec<_>>>()?;
    Column::with_type(
        column.name(),
        ColumnType::new(dtype).with_nullable(source.nullable),
        converted,
    )
}

fn cast_value(value: &Value, dtype: DataType) -> Option<Value> {
    if value.is_null() {
        return Some(Value::Null);
    }
    match dtype {
        DataType::Int32 => match value {
            Value::Int32(_) => Some(value.clone()),
            Value::Int64(v) => i32::try_from(*v).ok().map(Value::Int32),
            Value::Float64(v) => integral(*v)
                .and_then(|i| i32::try_from(i).ok())
                .map(Value::Int32),
            Value::Utf8(s) => s.trim().parse().ok().map(Value::Int32),
            _ => None,
        },
        DataType::Int64 => match value {
            Value::Int32(v) => Some(Value::Int64(i64::from(*v))),
            Value::Int64(_) => Some(value.clone()),
            Value::Float64(v) => integral(*v).map(Value::Int64),
            Value::Utf8(s) => s.trim().parse().ok().map(Value::Int64),
            _ => None,
        },
        DataType::Float64 => match value {
            Value::Utf8(s) => s.trim().parse().ok().map(Value::Float64),
            other => other.as_f64().map(Value::Float64),
        },
        DataType::Boolean => match value {
            Value::Boolean(_) => Some(value.clone()),
            Value::Utf8(s) => s.trim().parse().ok().map(Value::Boolean),
            _ => None,
        },
        DataType::Utf8 => match value {
            Value::Struct(_) => None,
            other => Some(Value::Utf8(other.to_string())),
        },
        abstract_type => value
            .data_type()
            .filter(|t| t.is_subtype_of(abstract_type))
            .map(|_| value.clone()),
    }
}

fn integral(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (v.fract() == 0.0 && in_range).then_some(v as i64)
}

impl Frame {
    /// Rename columns by `(old, new)` pairs.
    pub fn rename<S, T>(&self, renames: &[(S, T)]) -> Result<Frame>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut names: HashMap<usize, &str> = HashMap::new();
        for (old, new) in renames {
            names.insert(self.column_index(old.as_ref())?, new.as_ref());
        }
        let columns = self
            .shared_columns()
            .iter()
            .enumerate()
            .map(|(i, c)| match names.get(&i) {
                Some(new) => Arc::new(c.renamed(new)),
                None => c.clone(),
            })
            .collect();
        Frame::from_shared_with_height(columns, self.height())
    }

    /// Start a type conversion of the named columns.
    pub fn cast<S: AsRef<str>>(&self, columns: &[S]) -> CastClause<'_> {
        CastClause {
            frame: self,
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    /// Names of the columns whose type is `dtype` or one of its subtypes.
    ///
    /// Nullable columns are only included when `nullable_ok` is set.
    pub fn columns_of_type(&self, dtype: DataType, nullable_ok: bool) -> Vec<&str> {
        self.columns()
            .filter(|c| {
                let t = c.column_type();
                t.dtype.is_subtype_of(dtype) && (nullable_ok || !t.nullable)
            })
            .map(Column::name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::frame::{column_of, Column, ColumnType, DataType, Frame, Value};
    use crate::FrameError;

    fn df() -> Frame {
        Frame::new(vec![
            column_of("i", vec![1_i64, 2]),
            column_of("f", vec![Some(1.5_f64), None]),
            column_of("s", vec!["3", "4"]),
            column_of("b", vec![true, false]),
        ])
        .unwrap()
    }

    #[test]
    fn rename_keeps_position_and_data() {
        let out = df().rename(&[("s", "text"), ("i", "n")]).unwrap();
        assert_eq!(out.column_names(), vec!["n", "f", "text", "b"]);
        assert_eq!(out.get(1, "n").unwrap(), Value::Int64(2));
    }

    #[test]
    fn rename_to_existing_name_fails() {
        assert!(matches!(
            df().rename(&[("s", "i")]).unwrap_err(),
            FrameError::SchemaMismatch { .. }
        ));
        assert!(matches!(
            df().rename(&[("zz", "y")]).unwrap_err(),
            FrameError::ColumnNotFound { .. }
        ));
    }

    #[test]
    fn cast_between_concrete_types() {
        let out = df().cast(&["s"]).to(DataType::Int64).unwrap();
        assert_eq!(out.get(0, "s").unwrap(), Value::Int64(3));

        let out = df().cast(&["i", "b"]).to(DataType::Utf8).unwrap();
        assert_eq!(out.get(1, "i").unwrap(), Value::from("2"));
        assert_eq!(out.get(0, "b").unwrap(), Value::from("true"));

        let out = df().cast(&["i"]).to(DataType::Float64).unwrap();
        assert_eq!(
            out.column("i").unwrap().column_type(),
            ColumnType::new(DataType::Float64)
        );
    }

    #[test]
    fn cast_keeps_nullability_and_rejects_lossy_values() {
        let out = df().cast(&["f"]).to(DataType::Utf8).unwrap();
        assert_eq!(
            out.column("f").unwrap().column_type(),
            ColumnType::nullable(DataType::Utf8)
        );
        assert!(out.get(1, "f").unwrap().is_null());

        assert!(matches!(
            df().cast(&["f"]).to(DataType::Int64).unwrap_err(),
            FrameError::TypeMismatch { .. }
        ));
        assert!(matches!(
            df().cast(&["b"]).to(DataType::Int32).unwrap_err(),
            FrameError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn cast_to_abstract_type_widens() {
        let out = df().cast(&["i"]).to(DataType::Comparable).unwrap();
        assert_eq!(out.column("i").unwrap().dtype(), DataType::Comparable);
        assert!(df().cast(&["s"]).to(DataType::Number).is_err());
    }

    #[test]
    fn columns_of_type_follows_the_lattice() {
        let df = df();
        assert_eq!(df.columns_of_type(DataType::Number, false), vec!["i"]);
        assert_eq!(df.columns_of_type(DataType::Number, true), vec!["i", "f"]);
        assert_eq!(
            df.columns_of_type(DataType::Comparable, false),
            vec!["i", "s", "b"]
        );

        let grouped = Frame::new(vec![Column::group("g", df.clone())]).unwrap();
        assert_eq!(grouped.columns_of_type(DataType::Group, false), vec!["g"]);
    }
}
