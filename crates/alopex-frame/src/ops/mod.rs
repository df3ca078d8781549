//! Transformation operators on [`Frame`](crate::Frame).
//!
//! Every operator returns a new frame; columns that are not touched are
//! shared with the input.

mod add;
mod columns;
mod group;
mod merge;
mod na;
mod reorder;
mod sequential;
mod stats;
mod update;

pub use add::ColumnsBuilder;
pub use columns::CastClause;
pub use group::{GroupClause, GroupColsBy, UniqueNameGenerator};
pub use merge::merge;
pub use sequential::Difference;
pub use update::UpdateClause;
