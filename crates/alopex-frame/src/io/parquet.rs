use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::record_batch::RecordBatchReader;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::{ArrowWriter, ProjectionMask};
use parquet::file::reader::ChunkReader;

use crate::frame::Frame;
use crate::io::format::SupportedFormat;
use crate::io::options::ParquetReadOptions;
use crate::{FrameError, Result};

const MAGIC: &[u8; 4] = b"PAR1";

/// Apache Parquet.
#[derive(Debug, Clone, Default)]
pub struct ParquetFormat {
    options: ParquetReadOptions,
}

impl ParquetFormat {
    /// Parquet reader configured with `options`.
    pub fn new(options: ParquetReadOptions) -> Self {
        Self { options }
    }
}

impl SupportedFormat for ParquetFormat {
    fn name(&self) -> &str {
        "parquet"
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        ext == "parquet"
    }

    fn test_order(&self) -> i32 {
        1_000
    }

    // Parquet needs random access, so the stream is buffered after the magic check.
    fn read_stream(&self, reader: &mut dyn Read, _header: &[String]) -> Result<Frame> {
        let mut magic = [0_u8; 4];
        reader.read_exact(&mut magic).map_err(FrameError::io)?;
        if &magic != MAGIC {
            return Err(FrameError::invalid_operation("not a Parquet file"));
        }
        let mut bytes = magic.to_vec();
        reader.read_to_end(&mut bytes).map_err(FrameError::io)?;
        read_parquet_from(Bytes::from(bytes), &self.options)
    }

    fn read_file(&self, path: &Path, _header: &[String]) -> Result<Frame> {
        let file = File::open(path).map_err(|source| FrameError::io_with_path(source, path))?;
        read_parquet_from(file, &self.options)
    }
}

/// Write a `Frame` to a Parquet file.
pub fn write_parquet(path: impl AsRef<Path>, frame: &Frame) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| FrameError::io_with_path(source, path))?;
    let batch = frame.to_record_batch()?;

    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .map_err(|source| FrameError::Parquet { source })?;

    writer
        .write(&batch)
        .map_err(|source| FrameError::Parquet { source })?;

    writer
        .close()
        .map_err(|source| FrameError::Parquet { source })?;

    Ok(())
}

fn read_parquet_from<T: ChunkReader + 'static>(
    input: T,
    options: &ParquetReadOptions,
) -> Result<Frame> {
    options.validate()?;

    let mut builder = ParquetRecordBatchReaderBuilder::try_new(input)
        .map_err(|source| FrameError::Parquet { source })?
        .with_batch_size(options.batch_size);

    if let Some(columns) = options.columns.as_deref() {
        let fields = builder.schema().fields().clone();
        let roots = columns
            .iter()
            .map(|name| {
                fields
                    .find(name)
                    .map(|(root, _)| root)
                    .ok_or_else(|| FrameError::column_not_found(name.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
        builder = builder.with_projection(mask);
    }

    let reader = builder
        .build()
        .map_err(|source| FrameError::Parquet { source })?;
    let schema = reader.schema();

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| FrameError::Arrow { source })?;

    Frame::from_record_batches(&schema, &batches)
}
