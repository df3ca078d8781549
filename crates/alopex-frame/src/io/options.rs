use crate::{FrameError, Result};

/// Default number of bytes trial resolution may consume before a reset fails.
pub const DEFAULT_LOOK_AHEAD_LIMIT: usize = 10_000;

/// Reader settings shared by [`CsvFormat`](crate::io::CsvFormat) and
/// [`TsvFormat`](crate::io::TsvFormat); the delimiter comes from the format.
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// First line names the columns. Header hints given to a read win over
    /// this and mean the first line is data.
    pub has_header: bool,
    /// `None` leaves the reader default (`"`).
    pub quote_char: Option<u8>,
    /// Cell texts read as null, in addition to the empty cell.
    pub null_values: Vec<String>,
    /// Rows sampled to infer column types.
    pub infer_schema_length: usize,
    /// Rows per record batch handed to the CSV decoder.
    pub batch_size: usize,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            quote_char: Some(b'"'),
            null_values: Vec::new(),
            infer_schema_length: 100,
            batch_size: 1024,
        }
    }
}

impl CsvReadOptions {
    /// Set `has_header`.
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set `quote_char`.
    pub fn with_quote_char(mut self, quote_char: Option<u8>) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Replace the extra null markers.
    pub fn with_null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set `infer_schema_length`.
    pub fn with_infer_schema_length(mut self, infer_schema_length: usize) -> Self {
        self.infer_schema_length = infer_schema_length;
        self
    }

    /// Set `batch_size`.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.quote_char == Some(b'\0') {
            return Err(FrameError::configuration(
                "quote_char",
                "a NUL byte cannot be used as the quote character",
            ));
        }
        positive("batch_size", self.batch_size)
    }
}

/// Reader settings for [`ParquetFormat`](crate::io::ParquetFormat).
#[derive(Debug, Clone)]
pub struct ParquetReadOptions {
    /// Read only these top-level columns, in file order.
    pub columns: Option<Vec<String>>,
    /// Rows per record batch decoded from the file.
    pub batch_size: usize,
}

impl Default for ParquetReadOptions {
    fn default() -> Self {
        Self {
            columns: None,
            batch_size: 65_536,
        }
    }
}

impl ParquetReadOptions {
    /// Project the read onto the named columns.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set `batch_size`.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        positive("batch_size", self.batch_size)
    }
}

fn positive(option: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(FrameError::configuration(option, "must be greater than zero"));
    }
    Ok(())
}

/// Options for format resolution and the built-in formats.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Bytes a trial parse may consume before the stream can no longer be
    /// rewound for the next format.
    pub look_ahead_limit: usize,
    /// Options shared by the CSV and TSV formats.
    pub csv: CsvReadOptions,
    /// Options for the Parquet format.
    pub parquet: ParquetReadOptions,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            look_ahead_limit: DEFAULT_LOOK_AHEAD_LIMIT,
            csv: CsvReadOptions::default(),
            parquet: ParquetReadOptions::default(),
        }
    }
}

impl ReadOptions {
    /// Set `look_ahead_limit`.
    pub fn with_look_ahead_limit(mut self, look_ahead_limit: usize) -> Self {
        self.look_ahead_limit = look_ahead_limit;
        self
    }

    /// Set the options shared by CSV and TSV.
    pub fn with_csv(mut self, csv: CsvReadOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Set the Parquet options.
    pub fn with_parquet(mut self, parquet: ParquetReadOptions) -> Self {
        self.parquet = parquet;
        self
    }

    /// Check every option, reporting the first invalid one.
    pub fn validate(&self) -> Result<()> {
        positive("look_ahead_limit", self.look_ahead_limit)?;
        self.csv.validate()?;
        self.parquet.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{CsvReadOptions, ReadOptions, DEFAULT_LOOK_AHEAD_LIMIT};
    use crate::FrameError;

    #[test]
    fn defaults_are_valid() {
        let options = ReadOptions::default();
        assert_eq!(options.look_ahead_limit, DEFAULT_LOOK_AHEAD_LIMIT);
        options.validate().unwrap();
    }

    #[test]
    fn invalid_options_name_the_option() {
        let err = ReadOptions::default()
            .with_look_ahead_limit(0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Configuration { ref option, .. } if option == "look_ahead_limit"
        ));

        let err = ReadOptions::default()
            .with_csv(CsvReadOptions::default().with_quote_char(Some(b'\0')))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Configuration { ref option, .. } if option == "quote_char"
        ));
    }
}
