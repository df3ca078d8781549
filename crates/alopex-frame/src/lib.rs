//! `alopex-frame` is an in-memory, immutable data frame library with
//! format-guessing I/O.
//!
//! Frames are ordered sets of uniquely named, equal-length columns. A column
//! holds typed values or, as a group column, the rows of a nested frame.
//! Column types live in a small lattice (`Any`, `Comparable`, `Number`, ...)
//! so frames with different column types can be merged.
//!
//! Operators (`add`, `update`, `move_to`, `merge`, `group`, `ungroup`,
//! `drop_na`, `summary`, ...) never mutate their input; untouched columns are
//! shared with the result.
//!
//! Reading goes through a [`FrameReader`], which picks a format from a
//! [`FormatRegistry`] by extension or by trying each format in turn.

mod error;

/// Frame, column, row, value and type model.
pub mod frame;
/// Format registry, resolution and readers/writers.
pub mod io;
/// Transformation operators.
pub mod ops;

/// Re-export of the crate error type and result alias.
pub use crate::error::{FrameError, Result};
/// Re-export of the data model.
pub use crate::frame::{
    column_of, common_supertype, Column, ColumnType, DataType, Frame, IntoValue, Row, Value,
};
/// Re-export of format resolution.
pub use crate::io::{FormatRegistry, FrameReader, ReadFrame, ReadOptions, SupportedFormat};
/// Re-export of the merge entry point.
pub use crate::ops::merge;

/// Read a local path or URL with the built-in formats, choosing the format
/// by extension.
pub fn read_path(path: &str) -> Result<Frame> {
    FrameReader::default().read_path(path, &[])
}

/// Read a stream with the built-in formats, trying each in priority order.
pub fn read_stream<R: std::io::Read>(reader: R) -> Result<ReadFrame> {
    FrameReader::default().resolve_stream(reader, None, &[])
}
