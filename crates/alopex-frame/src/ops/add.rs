use std::sync::Arc;

use crate::frame::{Column, ColumnType, DataType, Frame, IntoValue, Row, Value};
use crate::Result;

/// Evaluate `expression` for every row of `frame` into a new column.
fn compute_column<R, F>(frame: &Frame, name: &str, expression: F) -> Result<Column>
where
    R: IntoValue,
    F: Fn(&Row<'_>) -> Result<R>,
{
    let values = frame
        .rows()
        .map(|row| expression(&row).map(IntoValue::into_value))
        .collect::<Result<Vec<_>>>()?;
    Ok(Column::from_declared(name, R::declared_type(), values))
}

/// Collects computed columns for [`Frame::add_all`] and [`Frame::map`].
///
/// Every expression sees the rows of the frame the builder was created from,
/// not the columns added alongside it.
pub struct ColumnsBuilder<'a> {
    frame: &'a Frame,
    columns: Vec<Column>,
}

impl<'a> ColumnsBuilder<'a> {
    fn new(frame: &'a Frame) -> Self {
        Self {
            frame,
            columns: Vec::new(),
        }
    }

    /// Add a computed column.
    pub fn add<R, F>(&mut self, name: &str, expression: F) -> Result<&mut Self>
    where
        R: IntoValue,
        F: Fn(&Row<'_>) -> Result<R>,
    {
        self.columns
            .push(compute_column(self.frame, name, expression)?);
        Ok(self)
    }

    /// Add an already built column.
    pub fn add_column(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }
}

impl Frame {
    /// Append a column computed from each row.
    ///
    /// The column type is `R`'s declared type (inferred from the produced
    /// values when `R` is [`Value`]), nullable iff any produced value is null.
    pub fn add<R, F>(&self, name: &str, expression: F) -> Result<Frame>
    where
        R: IntoValue,
        F: Fn(&Row<'_>) -> Result<R>,
    {
        let column = compute_column(self, name, expression)?;
        self.with_column(column)
    }

    /// Append an already built column.
    pub fn with_column(&self, column: Column) -> Result<Frame> {
        let mut columns = self.shared_columns().to_vec();
        columns.push(Arc::new(column));
        Frame::from_shared_with_height(columns, self.height())
    }

    /// Append several computed columns at once.
    pub fn add_all<F>(&self, body: F) -> Result<Frame>
    where
        F: FnOnce(&mut ColumnsBuilder<'_>) -> Result<()>,
    {
        let mut builder = ColumnsBuilder::new(self);
        body(&mut builder)?;
        let mut columns = self.shared_columns().to_vec();
        columns.extend(builder.columns.into_iter().map(Arc::new));
        Frame::from_shared_with_height(columns, self.height())
    }

    /// Build a new frame made only of computed columns.
    pub fn map<F>(&self, body: F) -> Result<Frame>
    where
        F: FnOnce(&mut ColumnsBuilder<'_>) -> Result<()>,
    {
        let mut builder = ColumnsBuilder::new(self);
        body(&mut builder)?;
        let columns = builder.columns.into_iter().map(Arc::new).collect();
        Frame::from_shared_with_height(columns, self.height())
    }

    /// Append an `Int32` column numbering rows from zero.
    pub fn add_row_number(&self, name: &str) -> Result<Frame> {
        let values = (0..self.height())
            .map(|i| {
                i32::try_from(i).map(Value::Int32).map_err(|_| {
                    crate::FrameError::invalid_operation(format!(
                        "row number {i} does not fit in Int32"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.with_column(Column::from_parts(
            name,
            ColumnType::new(DataType::Int32),
            values,
        ))
    }
}
