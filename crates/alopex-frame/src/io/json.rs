use std::io::Read;
use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::frame::{Column, Frame, Value};
use crate::io::format::SupportedFormat;
use crate::{FrameError, Result};

/// JSON: an array of objects (one row each) or a single object (one row).
///
/// Keys become columns in first-seen order. A key whose present values are
/// all objects becomes a group column; arrays are kept as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl SupportedFormat for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        ext == "json"
    }

    fn test_order(&self) -> i32 {
        10_000
    }

    fn read_stream(&self, reader: &mut dyn Read, _header: &[String]) -> Result<Frame> {
        let document: Json =
            serde_json::from_reader(reader).map_err(|source| FrameError::Json { source })?;
        let rows = match document {
            Json::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Json::Object(map) => Ok(map),
                    other => Err(FrameError::invalid_operation(format!(
                        "expected a JSON object per row, found {}",
                        kind(&other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Json::Object(map) => vec![map],
            other => {
                return Err(FrameError::invalid_operation(format!(
                    "expected a JSON array or object, found {}",
                    kind(&other)
                )))
            }
        };
        frame_from_objects(&rows)
    }
}

fn frame_from_objects(rows: &[Map<String, Json>]) -> Result<Frame> {
    let mut keys: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let mut columns = Vec::with_capacity(keys.len());
    for key in keys {
        let cells: Vec<Option<&Json>> = rows.iter().map(|row| row.get(key)).collect();
        let present = cells.iter().flatten().filter(|v| !v.is_null());
        let mut present = present.peekable();
        let all_objects = present.peek().is_some() && present.all(|v| v.is_object());

        let column = if all_objects {
            let empty = Map::new();
            let nested: Vec<Map<String, Json>> = cells
                .iter()
                .map(|cell| match cell {
                    Some(Json::Object(map)) => map.clone(),
                    _ => empty.clone(),
                })
                .collect();
            let nested = frame_from_objects(&nested)?;
            let nested = if nested.width() == 0 {
                Frame::of_height(rows.len())
            } else {
                nested
            };
            Column::group(key, nested)
        } else {
            Column::from_values(key, cells.into_iter().map(to_value).collect())
        };
        columns.push(Arc::new(column));
    }
    Frame::from_shared_with_height(columns, rows.len())
}

fn to_value(cell: Option<&Json>) -> Value {
    match cell {
        None | Some(Json::Null) => Value::Null,
        Some(Json::Bool(b)) => Value::Boolean(*b),
        Some(Json::Number(n)) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map_or(Value::Null, Value::Float64),
        },
        Some(Json::String(s)) => Value::Utf8(s.clone()),
        Some(other) => Value::Utf8(other.to_string()),
    }
}

fn kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
