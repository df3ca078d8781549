use std::sync::Arc;

use crate::frame::{common_supertype, ColumnType, DataType, Frame, IntoValue, Value};
use crate::{FrameError, Result};

/// A named column: either a typed sequence of values or a group of nested columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnData {
    Values {
        column_type: ColumnType,
        values: Arc<[Value]>,
    },
    Group(Frame),
}

impl Column {
    /// Build a value column from Rust values.
    ///
    /// The element type is `T`'s declared type (inferred from the values for
    /// `T = Value`); the column is nullable iff any value is null.
    pub fn new<T: IntoValue>(name: &str, values: Vec<T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(IntoValue::into_value).collect();
        Self::from_declared(name, T::declared_type(), values)
    }

    pub(crate) fn from_declared(
        name: &str,
        declared: Option<DataType>,
        values: Vec<Value>,
    ) -> Self {
        match declared {
            Some(dtype) => {
                let nullable = values.iter().any(Value::is_null);
                Self::from_parts(name, ColumnType { dtype, nullable }, values)
            }
            None => Self::from_values(name, values),
        }
    }

    /// Build a value column, inferring its type from the values.
    ///
    /// The element type is the common supertype of all non-null values
    /// (`Any` when there are none).
    pub fn from_values(name: &str, values: Vec<Value>) -> Self {
        let column_type = infer_type(&values);
        Self::from_parts(name, column_type, values)
    }

    /// Build a value column with an explicit type, checking every value against it.
    pub fn with_type(name: &str, column_type: ColumnType, values: Vec<Value>) -> Result<Self> {
        if column_type.dtype == DataType::Group {
            return Err(FrameError::invalid_operation(format!(
                "column '{name}': group columns must be built from a frame"
            )));
        }
        for v in &values {
            match v.data_type() {
                None if !column_type.nullable => {
                    return Err(FrameError::type_mismatch(
                        Some(name.to_string()),
                        column_type.to_string(),
                        "null",
                    ));
                }
                Some(actual) if !actual.is_subtype_of(column_type.dtype) => {
                    return Err(FrameError::type_mismatch(
                        Some(name.to_string()),
                        column_type.to_string(),
                        actual.to_string(),
                    ));
                }
                _ => {}
            }
        }
        Ok(Self::from_parts(name, column_type, values))
    }

    /// Build a group column whose rows are the rows of `frame`.
    pub fn group(name: &str, frame: Frame) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Group(frame),
        }
    }

    pub(crate) fn from_parts(name: &str, column_type: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Values {
                column_type,
                values: values.into(),
            },
        }
    }

    /// Return the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy of this column under a new name.
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: self.data.clone(),
        }
    }

    /// Return the declared column type (`Group` for group columns).
    pub fn column_type(&self) -> ColumnType {
        match &self.data {
            ColumnData::Values { column_type, .. } => *column_type,
            ColumnData::Group(_) => ColumnType::new(DataType::Group),
        }
    }

    /// Return the element type.
    pub fn dtype(&self) -> DataType {
        self.column_type().dtype
    }

    /// Return the number of rows.
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Values { values, .. } => values.len(),
            ColumnData::Group(frame) => frame.height(),
        }
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for group columns.
    pub fn is_group(&self) -> bool {
        matches!(self.data, ColumnData::Group(_))
    }

    /// Nested frame of a group column.
    pub fn group_frame(&self) -> Option<&Frame> {
        match &self.data {
            ColumnData::Group(frame) => Some(frame),
            ColumnData::Values { .. } => None,
        }
    }

    /// Stored values of a value column.
    pub fn value_slice(&self) -> Option<&[Value]> {
        match &self.data {
            ColumnData::Values { values, .. } => Some(values),
            ColumnData::Group(_) => None,
        }
    }

    /// Value at `index`; group rows are materialised as `Value::Struct`.
    pub fn get(&self, index: usize) -> Option<Value> {
        match &self.data {
            ColumnData::Values { values, .. } => values.get(index).cloned(),
            ColumnData::Group(frame) => frame.row(index).map(|row| row.to_struct()),
        }
    }

    /// All values of the column, group rows materialised as `Value::Struct`.
    pub fn to_values(&self) -> Vec<Value> {
        match &self.data {
            ColumnData::Values { values, .. } => values.to_vec(),
            ColumnData::Group(frame) => frame.rows().map(|row| row.to_struct()).collect(),
        }
    }

    /// Returns `true` if any value is null.
    pub fn has_nulls(&self) -> bool {
        match &self.data {
            ColumnData::Values { values, .. } => values.iter().any(Value::is_null),
            ColumnData::Group(_) => false,
        }
    }

    /// Gather rows by index, keeping the declared type.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let len = self.len();
        if let Some(bad) = indices.iter().find(|&&i| i >= len) {
            return Err(FrameError::invalid_operation(format!(
                "row index {bad} out of bounds for column '{}' of length {len}",
                self.name
            )));
        }
        let data = match &self.data {
            ColumnData::Values {
                column_type,
                values,
            } => ColumnData::Values {
                column_type: *column_type,
                values: indices.iter().map(|&i| values[i].clone()).collect(),
            },
            ColumnData::Group(frame) => ColumnData::Group(frame.take(indices)?),
        };
        Ok(Self {
            name: self.name.clone(),
            data,
        })
    }
}

/// Build a value column from Rust values (alias of [`Column::new`]).
pub fn column_of<T: IntoValue>(name: &str, values: Vec<T>) -> Column {
    Column::new(name, values)
}

fn infer_type(values: &[Value]) -> ColumnType {
    let nullable = values.iter().any(Value::is_null);
    let dtype =
        common_supertype(values.iter().filter_map(Value::data_type)).unwrap_or(DataType::Any);
    ColumnType { dtype, nullable }
}
