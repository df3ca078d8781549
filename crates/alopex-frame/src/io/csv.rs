use std::fs::File;
use std::io::{BufWriter, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow_csv::reader::{Format, ReaderBuilder};
use arrow_csv::WriterBuilder;
use regex::Regex;

use crate::frame::Frame;
use crate::io::format::SupportedFormat;
use crate::io::options::CsvReadOptions;
use crate::{FrameError, Result};

/// Comma-separated values.
#[derive(Debug, Clone, Default)]
pub struct CsvFormat {
    options: CsvReadOptions,
}

impl CsvFormat {
    /// CSV reader configured with `options`.
    pub fn new(options: CsvReadOptions) -> Self {
        Self { options }
    }
}

impl SupportedFormat for CsvFormat {
    fn name(&self) -> &str {
        "csv"
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        ext == "csv"
    }

    fn test_order(&self) -> i32 {
        20_000
    }

    fn read_stream(&self, reader: &mut dyn Read, header: &[String]) -> Result<Frame> {
        read_delimited(reader, b',', &self.options, header)
    }
}

/// Tab-separated values.
#[derive(Debug, Clone, Default)]
pub struct TsvFormat {
    options: CsvReadOptions,
}

impl TsvFormat {
    /// TSV reader configured with `options`.
    pub fn new(options: CsvReadOptions) -> Self {
        Self { options }
    }
}

impl SupportedFormat for TsvFormat {
    fn name(&self) -> &str {
        "tsv"
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        ext == "tsv"
    }

    fn test_order(&self) -> i32 {
        30_000
    }

    fn read_stream(&self, reader: &mut dyn Read, header: &[String]) -> Result<Frame> {
        read_delimited(reader, b'\t', &self.options, header)
    }
}

/// Write a `Frame` to a CSV file with a header row.
///
/// Group columns have no CSV representation and are rejected.
pub fn write_csv(path: impl AsRef<Path>, frame: &Frame) -> Result<()> {
    if let Some(group) = frame.columns().find(|c| c.is_group()) {
        return Err(FrameError::invalid_operation(format!(
            "cannot write group column '{}' to CSV",
            group.name()
        )));
    }

    let path = path.as_ref();
    let file = File::create(path).map_err(|source| FrameError::io_with_path(source, path))?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .build(BufWriter::new(file));

    writer
        .write(&frame.to_record_batch()?)
        .map_err(|source| FrameError::Arrow { source })?;

    Ok(())
}

// A non-empty `header` names the columns of an input without a header row.
fn read_delimited(
    reader: &mut dyn Read,
    delimiter: u8,
    options: &CsvReadOptions,
    header: &[String],
) -> Result<Frame> {
    options.validate()?;

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(FrameError::io)?;

    let has_header = header.is_empty() && options.has_header;
    let mut format = Format::default()
        .with_header(has_header)
        .with_delimiter(delimiter);

    if let Some(quote_char) = options.quote_char {
        format = format.with_quote(quote_char);
    }

    if let Some(regex) = null_regex(&options.null_values)? {
        format = format.with_null_regex(regex);
    }

    let (schema, _) = format
        .infer_schema(Cursor::new(&bytes), Some(options.infer_schema_length))
        .map_err(|source| FrameError::Arrow { source })?;
    let schema = apply_header(schema, header)?;
    if schema.fields().is_empty() {
        return Ok(Frame::empty());
    }

    let csv_reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(options.batch_size)
        .build(Cursor::new(bytes))
        .map_err(|source| FrameError::Arrow { source })?;

    let batches = csv_reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| FrameError::Arrow { source })?;

    Frame::from_record_batches(&schema, &batches)
}

// One anchored alternation of the escaped markers; `None` keeps arrow's empty-cell rule.
fn null_regex(markers: &[String]) -> Result<Option<Regex>> {
    if markers.is_empty() {
        return Ok(None);
    }
    let alternatives: Vec<String> = markers.iter().map(|m| regex::escape(m)).collect();
    Regex::new(&format!("^(?:{})$", alternatives.join("|")))
        .map(Some)
        .map_err(|e| FrameError::configuration("null_values", e.to_string()))
}

fn apply_header(schema: Schema, header: &[String]) -> Result<SchemaRef> {
    if header.is_empty() {
        return Ok(Arc::new(schema));
    }
    if header.len() != schema.fields().len() {
        return Err(FrameError::schema_mismatch(format!(
            "{} header names given for {} columns",
            header.len(),
            schema.fields().len()
        )));
    }
    let fields = schema
        .fields()
        .iter()
        .zip(header)
        .map(|(field, name)| Field::new(name, field.data_type().clone(), field.is_nullable()))
        .collect::<Vec<_>>();
    Ok(Arc::new(Schema::new(fields)))
}
