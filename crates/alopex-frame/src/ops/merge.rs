use std::sync::Arc;

use crate::frame::{common_supertype, Column, ColumnType, DataType, Frame, Value};
use crate::Result;

/// Concatenate the rows of `frames`, unifying their columns.
///
/// Columns appear in first-seen order. A frame lacking a column contributes
/// nulls for its rows and makes that column nullable. Column types are
/// reconciled to their most specific common supertype, which is `Any` for
/// unrelated types. Group columns present in every contributing frame are
/// merged recursively.
pub fn merge(frames: &[Frame]) -> Result<Frame> {
    match frames {
        [] => return Ok(Frame::empty()),
        [single] => return Ok(single.clone()),
        _ => {}
    }

    let mut names: Vec<&str> = Vec::new();
    for frame in frames {
        for name in frame.column_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let height = frames.iter().map(Frame::height).sum();
    let columns = names
        .into_iter()
        .map(|name| merge_column(frames, name).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;
    Frame::from_shared_with_height(columns, height)
}

fn merge_column(frames: &[Frame], name: &str) -> Result<Column> {
    let all_groups = frames
        .iter()
        .filter_map(|f| f.try_column(name))
        .all(Column::is_group);
    if all_groups {
        let nested = frames
            .iter()
            .map(|f| {
                f.try_column(name)
                    .and_then(Column::group_frame)
                    .cloned()
                    .unwrap_or_else(|| Frame::of_height(f.height()))
            })
            .collect::<Vec<_>>();
        return Ok(Column::group(name, merge(&nested)?));
    }

    let mut values = Vec::new();
    let mut nullable = false;
    let mut types: Vec<DataType> = Vec::new();

    for frame in frames {
        match frame.try_column(name) {
            Some(column) => {
                let column_type = column.column_type();
                nullable = nullable || column_type.nullable || column.has_nulls();
                if !types.contains(&column_type.dtype) {
                    types.push(column_type.dtype);
                }
                values.extend(column.to_values());
            }
            None => {
                if frame.height() > 0 {
                    nullable = true;
                }
                values.extend(std::iter::repeat(Value::Null).take(frame.height()));
            }
        }
    }

    let dtype = common_supertype(types.iter().copied()).unwrap_or(DataType::Any);
    if dtype == DataType::Any && types.len() > 1 {
        tracing::warn!(
            column = name,
            types = ?types,
            "merged column has no common type more specific than Any"
        );
    }

    Ok(Column::from_parts(
        name,
        ColumnType { dtype, nullable },
        values,
    ))
}

impl Frame {
    /// Merge this frame with `others` (see [`merge`]).
    pub fn union(&self, others: &[Frame]) -> Result<Frame> {
        let mut frames = Vec::with_capacity(others.len() + 1);
        frames.push(self.clone());
        frames.extend_from_slice(others);
        merge(&frames)
    }

    /// Append the rows of `other` below this frame (see [`merge`]).
    pub fn append(&self, other: &Frame) -> Result<Frame> {
        merge(&[self.clone(), other.clone()])
    }
}
