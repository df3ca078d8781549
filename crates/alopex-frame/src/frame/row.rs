use crate::frame::{Column, Frame, Value};
use crate::{FrameError, Result};

/// A read-only view of one row of a [`Frame`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    frame: &'a Frame,
    index: usize,
}

impl<'a> Row<'a> {
    pub(crate) fn new(frame: &'a Frame, index: usize) -> Self {
        Self { frame, index }
    }

    /// Position of this row in its frame.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The frame this row belongs to.
    pub fn frame(&self) -> &'a Frame {
        self.frame
    }

    /// The preceding row, `None` for the first row.
    pub fn prev(&self) -> Option<Row<'a>> {
        self.index
            .checked_sub(1)
            .map(|index| Row::new(self.frame, index))
    }

    /// The following row, `None` for the last row.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Option<Row<'a>> {
        self.frame.row(self.index + 1)
    }

    /// This row followed by every preceding row, nearest first.
    pub fn backward(&self) -> impl Iterator<Item = Row<'a>> {
        let frame = self.frame;
        (0..=self.index).rev().map(move |i| Row::new(frame, i))
    }

    /// Value of a column in this row.
    pub fn get(&self, column: &str) -> Result<Value> {
        let col = self.frame.column(column)?;
        col.get(self.index)
            .ok_or_else(|| FrameError::column_not_found(column))
    }

    /// Returns `true` if the value is null.
    pub fn is_null(&self, column: &str) -> Result<bool> {
        Ok(self.cell(column)?.map(Value::is_null).unwrap_or(false))
    }

    /// Non-null integer value (`Int32` widens).
    pub fn i64(&self, column: &str) -> Result<i64> {
        let value = self.get(column)?;
        value
            .as_i64()
            .ok_or_else(|| mismatch(column, "Int64", &value))
    }

    /// Non-null numeric value as a float.
    pub fn f64(&self, column: &str) -> Result<f64> {
        let value = self.get(column)?;
        value
            .as_f64()
            .ok_or_else(|| mismatch(column, "Number", &value))
    }

    /// Non-null boolean value.
    pub fn bool(&self, column: &str) -> Result<bool> {
        let value = self.get(column)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(column, "Boolean", &value))
    }

    /// Non-null string value, borrowed from the frame.
    pub fn str(&self, column: &str) -> Result<&'a str> {
        match self.cell(column)? {
            Some(Value::Utf8(s)) => Ok(s.as_str()),
            Some(other) => Err(mismatch(column, "Utf8", other)),
            None => Err(FrameError::type_mismatch(
                Some(column.to_string()),
                "Utf8",
                "Group",
            )),
        }
    }

    /// The matching row of a group column's nested frame.
    pub fn group(&self, column: &str) -> Result<Row<'a>> {
        let col: &'a Column = self.frame.column(column)?;
        let nested = col.group_frame().ok_or_else(|| {
            FrameError::type_mismatch(
                Some(column.to_string()),
                "Group",
                col.column_type().to_string(),
            )
        })?;
        Ok(Row::new(nested, self.index))
    }

    /// This row as a `Value::Struct` of all its cells.
    pub fn to_struct(&self) -> Value {
        Value::Struct(
            self.frame
                .columns()
                .map(|c| {
                    (
                        c.name().to_string(),
                        c.get(self.index).unwrap_or(Value::Null),
                    )
                })
                .collect(),
        )
    }

    // `None` for group columns, which have no stored cells.
    fn cell(&self, column: &str) -> Result<Option<&'a Value>> {
        let col: &'a Column = self.frame.column(column)?;
        Ok(col.value_slice().and_then(|values| values.get(self.index)))
    }
}

fn mismatch(column: &str, expected: &str, value: &Value) -> FrameError {
    let actual = value
        .data_type()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "null".to_string());
    FrameError::type_mismatch(Some(column.to_string()), expected, actual)
}
