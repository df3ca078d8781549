use std::fs::File;
use std::io::{BufWriter, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float16Array, Float32Array, Float64Array, Int16Array,
    Int32Array, Int64Array, Int8Array, LargeStringArray, StringArray, StructArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType as ArrowType, Field, Fields, Schema, SchemaRef};
use arrow::ipc::reader::{FileReader, StreamReader};
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};

use crate::frame::{Column, ColumnType, DataType, Frame, Value};
use crate::io::format::SupportedFormat;
use crate::{FrameError, Result};

const FILE_MAGIC: &[u8; 6] = b"ARROW1";
const CONTINUATION: [u8; 4] = [0xff; 4];

/// Arrow IPC, in file (`.arrow`, `.feather`) or stream layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrowFormat;

impl SupportedFormat for ArrowFormat {
    fn name(&self) -> &str {
        "arrow"
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        matches!(ext, "arrow" | "feather" | "ipc")
    }

    fn test_order(&self) -> i32 {
        2_000
    }

    fn read_stream(&self, reader: &mut dyn Read, _header: &[String]) -> Result<Frame> {
        let mut prefix = [0_u8; 6];
        reader.read_exact(&mut prefix).map_err(FrameError::io)?;

        if &prefix == FILE_MAGIC {
            let mut bytes = prefix.to_vec();
            reader.read_to_end(&mut bytes).map_err(FrameError::io)?;
            let file_reader = FileReader::try_new(Cursor::new(bytes), None)
                .map_err(|source| FrameError::Arrow { source })?;
            let schema = file_reader.schema();
            let batches = file_reader
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|source| FrameError::Arrow { source })?;
            return Frame::from_record_batches(&schema, &batches);
        }

        if prefix[..4] != CONTINUATION {
            return Err(FrameError::invalid_operation("not an Arrow IPC stream"));
        }
        let stream_reader = StreamReader::try_new(Cursor::new(prefix).chain(reader), None)
            .map_err(|source| FrameError::Arrow { source })?;
        let schema = stream_reader.schema();
        let batches = stream_reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| FrameError::Arrow { source })?;
        Frame::from_record_batches(&schema, &batches)
    }
}

/// Write a `Frame` to an Arrow IPC file.
pub fn write_arrow(path: impl AsRef<Path>, frame: &Frame) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| FrameError::io_with_path(source, path))?;
    let batch = frame.to_record_batch()?;

    let mut writer = FileWriter::try_new(BufWriter::new(file), &batch.schema())
        .map_err(|source| FrameError::Arrow { source })?;
    writer
        .write(&batch)
        .map_err(|source| FrameError::Arrow { source })?;
    writer
        .finish()
        .map_err(|source| FrameError::Arrow { source })?;
    Ok(())
}

impl Frame {
    /// Build a frame from record batches sharing `schema`.
    ///
    /// Integer types narrower than 64 bits become `Int32`, wider or unsigned
    /// ones `Int64`; floats become `Float64`; structs become group columns.
    /// Types without a counterpart are rendered as strings. A column is
    /// nullable iff it holds a null.
    pub fn from_record_batches(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<Frame> {
        let height = batches.iter().map(RecordBatch::num_rows).sum();
        let mut columns = Vec::with_capacity(schema.fields().len());
        for (index, field) in schema.fields().iter().enumerate() {
            let mut arrays = Vec::with_capacity(batches.len());
            for batch in batches {
                if batch.schema().fields().len() != schema.fields().len() {
                    return Err(FrameError::schema_mismatch(
                        "record batch schema does not match",
                    ));
                }
                arrays.push(batch.column(index).clone());
            }
            columns.push(column_from_arrays(field.name(), field.data_type(), &arrays)?);
        }
        Frame::from_shared_with_height(columns.into_iter().map(Arc::new).collect(), height)
    }

    /// Build a frame from a single record batch.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Frame> {
        Self::from_record_batches(&batch.schema(), std::slice::from_ref(batch))
    }

    /// Arrow schema this frame converts to.
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::new(Schema::new(self.columns().map(arrow_field).collect::<Vec<_>>()))
    }

    /// Convert to a single record batch.
    ///
    /// `Number` columns become `Float64`; `Comparable` and `Any` columns are
    /// rendered as strings; group columns become structs.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let arrays = self
            .columns()
            .map(to_array)
            .collect::<Result<Vec<_>>>()?;
        let options = RecordBatchOptions::new().with_row_count(Some(self.height()));
        RecordBatch::try_new_with_options(self.arrow_schema(), arrays, &options).map_err(|e| {
            FrameError::schema_mismatch(format!("failed to build RecordBatch: {e}"))
        })
    }
}

fn column_from_arrays(name: &str, arrow_type: &ArrowType, arrays: &[ArrayRef]) -> Result<Column> {
    if let ArrowType::Struct(fields) = arrow_type {
        let mut nested = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let children = arrays
                .iter()
                .map(|a| downcast::<StructArray>(a.as_ref()).map(|s| s.column(index).clone()))
                .collect::<Result<Vec<_>>>()?;
            nested.push(Arc::new(column_from_arrays(
                field.name(),
                field.data_type(),
                &children,
            )?));
        }
        let height = arrays.iter().map(|a| a.len()).sum();
        return Ok(Column::group(
            name,
            Frame::from_shared_with_height(nested, height)?,
        ));
    }

    let dtype = match arrow_type {
        ArrowType::Int8 | ArrowType::Int16 | ArrowType::Int32 => DataType::Int32,
        ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => DataType::Int64,
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => DataType::Float64,
        ArrowType::Boolean => DataType::Boolean,
        ArrowType::Null => DataType::Any,
        _ => DataType::Utf8,
    };

    let mut values = Vec::new();
    for array in arrays {
        append_values(name, array.as_ref(), &mut values)?;
    }
    let nullable = *arrow_type == ArrowType::Null || values.iter().any(Value::is_null);
    Ok(Column::from_parts(name, ColumnType { dtype, nullable }, values))
}

fn append_values(name: &str, array: &dyn Array, out: &mut Vec<Value>) -> Result<()> {
    macro_rules! extend {
        ($array_type:ty, $convert:expr) => {
            out.extend(
                downcast::<$array_type>(array)?
                    .iter()
                    .map(|v| v.map_or(Value::Null, $convert)),
            )
        };
    }

    match array.data_type() {
        ArrowType::Int8 => extend!(Int8Array, |v| Value::Int32(i32::from(v))),
        ArrowType::Int16 => extend!(Int16Array, |v| Value::Int32(i32::from(v))),
        ArrowType::Int32 => extend!(Int32Array, Value::Int32),
        ArrowType::Int64 => extend!(Int64Array, Value::Int64),
        ArrowType::UInt8 => extend!(UInt8Array, |v| Value::Int64(i64::from(v))),
        ArrowType::UInt16 => extend!(UInt16Array, |v| Value::Int64(i64::from(v))),
        ArrowType::UInt32 => extend!(UInt32Array, |v| Value::Int64(i64::from(v))),
        ArrowType::UInt64 => {
            for v in downcast::<UInt64Array>(array)?.iter() {
                out.push(match v {
                    Some(v) => Value::Int64(i64::try_from(v).map_err(|_| {
                        FrameError::type_mismatch(Some(name.to_string()), "Int64", "UInt64")
                    })?),
                    None => Value::Null,
                });
            }
        }
        ArrowType::Float16 => extend!(Float16Array, |v| Value::Float64(f64::from(v))),
        ArrowType::Float32 => extend!(Float32Array, |v| Value::Float64(f64::from(v))),
        ArrowType::Float64 => extend!(Float64Array, Value::Float64),
        ArrowType::Boolean => extend!(BooleanArray, Value::Boolean),
        ArrowType::Utf8 => extend!(StringArray, |v: &str| Value::Utf8(v.to_string())),
        ArrowType::LargeUtf8 => extend!(LargeStringArray, |v: &str| Value::Utf8(v.to_string())),
        ArrowType::Null => out.extend(std::iter::repeat(Value::Null).take(array.len())),
        _ => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())
                .map_err(|source| FrameError::Arrow { source })?;
            for i in 0..array.len() {
                out.push(if array.is_null(i) {
                    Value::Null
                } else {
                    Value::Utf8(formatter.value(i).to_string())
                });
            }
        }
    }
    Ok(())
}

fn downcast<A: Array + 'static>(array: &dyn Array) -> Result<&A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        FrameError::invalid_operation(format!(
            "bad {} downcast",
            std::any::type_name::<A>()
        ))
    })
}

fn arrow_type(column: &Column) -> ArrowType {
    match column.group_frame() {
        Some(nested) => ArrowType::Struct(nested.columns().map(arrow_field).collect::<Fields>()),
        None => match column.dtype() {
            DataType::Int32 => ArrowType::Int32,
            DataType::Int64 => ArrowType::Int64,
            DataType::Float64 | DataType::Number => ArrowType::Float64,
            DataType::Boolean => ArrowType::Boolean,
            _ => ArrowType::Utf8,
        },
    }
}

fn arrow_field(column: &Column) -> Field {
    Field::new(
        column.name(),
        arrow_type(column),
        column.column_type().nullable,
    )
}

fn to_array(column: &Column) -> Result<ArrayRef> {
    if let Some(nested) = column.group_frame() {
        let arrays = nested.columns().map(to_array).collect::<Result<Vec<_>>>()?;
        let fields = nested.columns().map(arrow_field).collect::<Fields>();
        let array = if fields.is_empty() {
            StructArray::new_empty_fields(nested.height(), None)
        } else {
            StructArray::try_new(fields, arrays, None)
                .map_err(|source| FrameError::Arrow { source })?
        };
        return Ok(Arc::new(array));
    }

    let values = column.value_slice().unwrap_or_default();
    let array: ArrayRef = match arrow_type(column) {
        ArrowType::Int32 => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    Value::Int32(x) => Some(*x),
                    _ => None,
                })
                .collect::<Int32Array>(),
        ),
        ArrowType::Int64 => Arc::new(values.iter().map(Value::as_i64).collect::<Int64Array>()),
        ArrowType::Float64 => {
            Arc::new(values.iter().map(Value::as_f64).collect::<Float64Array>())
        }
        ArrowType::Boolean => {
            Arc::new(values.iter().map(Value::as_bool).collect::<BooleanArray>())
        }
        _ => Arc::new(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect::<StringArray>(),
        ),
    };
    Ok(array)
}
