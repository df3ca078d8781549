use std::sync::Arc;

use crate::frame::{Column, Frame};
use crate::{FrameError, Result};

impl Frame {
    /// Move the named columns so the first of them lands at `index`.
    ///
    /// `index` counts positions among the columns that are not moved. Moved
    /// columns keep the order they were given in; the others keep theirs.
    pub fn move_to<S: AsRef<str>>(&self, index: usize, columns: &[S]) -> Result<Frame> {
        let (moved, others) = self.partition_columns(columns)?;
        if index > others.len() {
            return Err(FrameError::invalid_operation(format!(
                "cannot move columns to index {index}: only {} columns remain",
                others.len()
            )));
        }

        let mut out = Vec::with_capacity(self.width());
        out.extend_from_slice(&others[..index]);
        out.extend(moved);
        out.extend_from_slice(&others[index..]);
        Frame::from_shared_with_height(out, self.height())
    }

    /// Move the named columns to the front.
    pub fn move_to_left<S: AsRef<str>>(&self, columns: &[S]) -> Result<Frame> {
        self.move_to(0, columns)
    }

    /// Move the named columns to the back.
    pub fn move_to_right<S: AsRef<str>>(&self, columns: &[S]) -> Result<Frame> {
        let (moved, _) = self.partition_columns(columns)?;
        self.move_to(self.width() - moved.len(), columns)
    }

    // Selected columns in selection order (duplicates dropped), then the rest in frame order.
    fn partition_columns<S: AsRef<str>>(
        &self,
        columns: &[S],
    ) -> Result<(Vec<Arc<Column>>, Vec<Arc<Column>>)> {
        let mut indices: Vec<usize> = Vec::with_capacity(columns.len());
        for index in self.column_indices(columns)? {
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        let all = self.shared_columns();
        let moved = indices.iter().map(|&i| all[i].clone()).collect();
        let others = all
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, c)| c.clone())
            .collect();
        Ok((moved, others))
    }
}
