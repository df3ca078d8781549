use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use crate::frame::Frame;
use crate::io::arrow::ArrowFormat;
use crate::io::csv::{CsvFormat, TsvFormat};
use crate::io::json::JsonFormat;
use crate::io::options::ReadOptions;
use crate::io::parquet::ParquetFormat;
use crate::{FrameError, Result};

/// A readable encoding that can be recognised by extension or by trial parsing.
pub trait SupportedFormat: fmt::Debug + Send + Sync {
    /// Short display name (`"csv"`, `"parquet"`, ...).
    fn name(&self) -> &str;

    /// Returns `true` if files with extension `ext` (lower-cased, without the
    /// dot) are expected to hold this format.
    fn accepts_extension(&self, ext: &str) -> bool;

    /// Trial parsing visits formats in ascending order of this value.
    fn test_order(&self) -> i32;

    /// Parse a frame from `reader`.
    ///
    /// `header` lists column names for inputs that carry none; formats that
    /// store their own schema ignore it.
    fn read_stream(&self, reader: &mut dyn Read, header: &[String]) -> Result<Frame>;

    /// Parse a frame from the file at `path`.
    fn read_file(&self, path: &Path, header: &[String]) -> Result<Frame> {
        let file = File::open(path).map_err(|source| FrameError::io_with_path(source, path))?;
        self.read_stream(&mut BufReader::new(file), header)
    }
}

/// Ordered set of formats consulted by a [`FrameReader`](crate::io::FrameReader).
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<Arc<dyn SupportedFormat>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin(&ReadOptions::default())
    }
}

impl FormatRegistry {
    /// A registry with no formats; every resolution against it fails.
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// The built-in formats configured with `options`: Parquet, Arrow IPC,
    /// JSON, CSV, TSV.
    pub fn builtin(options: &ReadOptions) -> Self {
        Self::empty()
            .with_format(ParquetFormat::new(options.parquet.clone()))
            .with_format(ArrowFormat)
            .with_format(JsonFormat)
            .with_format(CsvFormat::new(options.csv.clone()))
            .with_format(TsvFormat::new(options.csv.clone()))
    }

    /// Append a format.
    pub fn with_format<F: SupportedFormat + 'static>(mut self, format: F) -> Self {
        self.register(Arc::new(format));
        self
    }

    /// Append a shared format.
    pub fn register(&mut self, format: Arc<dyn SupportedFormat>) {
        self.formats.push(format);
    }

    /// Formats in registration order.
    pub fn formats(&self) -> &[Arc<dyn SupportedFormat>] {
        &self.formats
    }

    /// Returns `true` if no format is registered.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// First registered format accepting `ext` (compared case-insensitively).
    pub fn guess_for_extension(&self, ext: &str) -> Option<Arc<dyn SupportedFormat>> {
        let ext = ext.to_lowercase();
        self.formats
            .iter()
            .find(|f| f.accepts_extension(&ext))
            .cloned()
    }

    /// Format guessed from the extension of `path`.
    pub fn guess_for_path(&self, path: &Path) -> Option<Arc<dyn SupportedFormat>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.guess_for_extension(ext))
    }

    /// Formats in trial order: ascending `test_order`, ties in registration order.
    pub fn sorted_by_priority(&self) -> Vec<Arc<dyn SupportedFormat>> {
        let mut sorted = self.formats.clone();
        sorted.sort_by_key(|f| f.test_order());
        sorted
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::path::Path;

    use super::{FormatRegistry, SupportedFormat};
    use crate::frame::Frame;
    use crate::Result;

    #[derive(Debug)]
    struct Fake {
        name: &'static str,
        order: i32,
    }

    impl SupportedFormat for Fake {
        fn name(&self) -> &str {
            self.name
        }

        fn accepts_extension(&self, ext: &str) -> bool {
            ext == self.name
        }

        fn test_order(&self) -> i32 {
            self.order
        }

        fn read_stream(&self, _reader: &mut dyn Read, _header: &[String]) -> Result<Frame> {
            Ok(Frame::empty())
        }
    }

    #[test]
    fn builtin_registry_guesses_by_extension() {
        let registry = FormatRegistry::default();
        assert_eq!(registry.guess_for_extension("CSV").unwrap().name(), "csv");
        assert_eq!(
            registry
                .guess_for_path(Path::new("data/part.Parquet"))
                .unwrap()
                .name(),
            "parquet"
        );
        assert_eq!(registry.guess_for_extension("feather").unwrap().name(), "arrow");
        assert!(registry.guess_for_extension("xlsx").is_none());
        assert!(registry.guess_for_path(Path::new("noext")).is_none());
    }

    #[test]
    fn priority_sort_is_stable() {
        let registry = FormatRegistry::empty()
            .with_format(Fake { name: "b", order: 5 })
            .with_format(Fake { name: "a", order: 1 })
            .with_format(Fake { name: "c", order: 5 });
        let names: Vec<String> = registry
            .sorted_by_priority()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn first_registered_match_wins() {
        let registry = FormatRegistry::empty()
            .with_format(Fake { name: "x", order: 9 })
            .with_format(Fake { name: "x", order: 1 });
        assert_eq!(registry.guess_for_extension("x").unwrap().test_order(), 9);
        assert!(FormatRegistry::empty().is_empty());
    }
}
