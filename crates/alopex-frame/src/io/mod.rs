mod arrow;
mod csv;
mod format;
mod json;
mod markable;
mod options;
mod parquet;
mod resolve;

/// Arrow IPC format and writer.
pub use self::arrow::{write_arrow, ArrowFormat};
/// CSV / TSV formats and writer.
pub use self::csv::{write_csv, CsvFormat, TsvFormat};
/// Format trait and registry.
pub use self::format::{FormatRegistry, SupportedFormat};
/// JSON format.
pub use self::json::JsonFormat;
/// Rewindable stream adapter used by trial resolution.
pub use self::markable::MarkableReader;
/// I/O option types.
pub use self::options::{CsvReadOptions, ParquetReadOptions, ReadOptions, DEFAULT_LOOK_AHEAD_LIMIT};
/// Parquet format and writer.
pub use self::parquet::{write_parquet, ParquetFormat};
/// Format resolution entry points.
pub use self::resolve::{FrameReader, ReadFrame};
