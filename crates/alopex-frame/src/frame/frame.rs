use std::collections::HashSet;
use std::sync::Arc;

use crate::frame::{Column, Row, Value};
use crate::{FrameError, Result};

/// An immutable table of uniquely named, equal-length columns.
///
/// Columns are shared between frames through `Arc`, so operators that only
/// reorder, drop or rename columns do not copy values.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Arc<Column>>,
    height: usize,
}

impl Frame {
    /// Construct a `Frame` from columns.
    ///
    /// Rejects duplicate names and columns of different lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        Self::from_shared(columns.into_iter().map(Arc::new).collect())
    }

    pub(crate) fn from_shared(columns: Vec<Arc<Column>>) -> Result<Self> {
        let height = columns.first().map(|c| c.len()).unwrap_or(0);
        Self::from_shared_with_height(columns, height)
    }

    pub(crate) fn from_shared_with_height(
        columns: Vec<Arc<Column>>,
        height: usize,
    ) -> Result<Self> {
        let mut seen_names = HashSet::with_capacity(columns.len());
        for c in &columns {
            if !seen_names.insert(c.name()) {
                return Err(FrameError::schema_mismatch(format!(
                    "duplicate column name '{}'",
                    c.name()
                )));
            }
        }

        for c in &columns {
            if c.len() != height {
                return Err(FrameError::schema_mismatch(format!(
                    "column length mismatch: '{}' has length {}, expected {}",
                    c.name(),
                    c.len(),
                    height
                )));
            }
        }

        Ok(Self { columns, height })
    }

    /// Return an empty `Frame` (no columns, no rows).
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            height: 0,
        }
    }

    /// A frame with no columns but `height` rows.
    ///
    /// Nested frames use this shape when an input contributes rows but no columns.
    pub fn of_height(height: usize) -> Self {
        Self {
            columns: Vec::new(),
            height,
        }
    }

    /// Return the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Return column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Get a column by name (case-sensitive).
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.try_column(name)
            .ok_or_else(|| FrameError::column_not_found(name))
    }

    /// Get a column by name, `None` when absent.
    pub fn try_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| FrameError::column_not_found(name))
    }

    /// Column at a position.
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index).map(|c| c.as_ref())
    }

    /// Iterate columns in order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().map(|c| c.as_ref())
    }

    pub(crate) fn shared_columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    /// Resolve names to positions, failing on the first unknown name.
    pub fn column_indices<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names.iter().map(|n| self.column_index(n.as_ref())).collect()
    }

    /// Row view at `index`.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.height).then(|| Row::new(self, index))
    }

    /// Iterate row views in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.height).map(move |i| Row::new(self, i))
    }

    /// Value of a cell.
    pub fn get(&self, row: usize, column: &str) -> Result<Value> {
        let col = self.column(column)?;
        col.get(row).ok_or_else(|| {
            FrameError::invalid_operation(format!(
                "row index {row} out of bounds for frame of height {}",
                self.height
            ))
        })
    }

    /// Gather rows by index into a new frame.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        if let Some(bad) = indices.iter().find(|&&i| i >= self.height) {
            return Err(FrameError::invalid_operation(format!(
                "row index {bad} out of bounds for frame of height {}",
                self.height
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(indices).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Self::from_shared_with_height(columns, indices.len())
    }

    /// Keep the rows for which `predicate` returns `true`.
    pub fn filter<F>(&self, predicate: F) -> Result<Self>
    where
        F: Fn(&Row<'_>) -> Result<bool>,
    {
        let mut keep = Vec::new();
        for row in self.rows() {
            if predicate(&row)? {
                keep.push(row.index());
            }
        }
        self.take(&keep)
    }

    /// Remove the rows for which `predicate` returns `true`.
    pub fn drop<F>(&self, predicate: F) -> Result<Self>
    where
        F: Fn(&Row<'_>) -> Result<bool>,
    {
        self.filter(|row| predicate(row).map(|d| !d))
    }

    /// The only row of a one-row frame.
    pub fn single_row(&self) -> Result<Row<'_>> {
        match self.height {
            1 => Ok(Row::new(self, 0)),
            n => Err(FrameError::invalid_operation(format!(
                "expected a single row, frame has {n}"
            ))),
        }
    }
}
