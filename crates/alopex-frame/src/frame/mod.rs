mod column;
mod dtype;
#[allow(clippy::module_inception)]
mod frame;
mod row;
mod value;

/// Columns and the typed column constructor.
pub use column::{column_of, Column};
/// The type lattice.
pub use dtype::{common_supertype, ColumnType, DataType};
/// The frame itself.
pub use frame::Frame;
/// Row views.
pub use row::Row;
/// Cell values and conversions.
pub use value::{IntoValue, Value};
