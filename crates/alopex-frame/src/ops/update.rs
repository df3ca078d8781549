use std::sync::Arc;

use crate::frame::{common_supertype, Column, ColumnType, DataType, Frame, IntoValue, Row, Value};
use crate::{FrameError, Result};

type UpdateFilter<'f> = Box<dyn Fn(&Row<'_>, &Value) -> Result<bool> + 'f>;

/// Pending update of a set of columns, created by [`Frame::update`].
pub struct UpdateClause<'a, 'f> {
    frame: &'a Frame,
    columns: Vec<String>,
    filter: Option<UpdateFilter<'f>>,
}

impl<'a, 'f> UpdateClause<'a, 'f> {
    /// Only replace cells for which `predicate(row, current)` holds.
    pub fn filter<'g, P>(self, predicate: P) -> UpdateClause<'a, 'g>
    where
        P: Fn(&Row<'_>, &Value) -> Result<bool> + 'g,
    {
        UpdateClause {
            frame: self.frame,
            columns: self.columns,
            filter: Some(Box::new(predicate)),
        }
    }

    /// Replace selected cells with `expression(row, current)`.
    pub fn with<R, F>(self, expression: F) -> Result<Frame>
    where
        R: IntoValue,
        F: Fn(&Row<'_>, &Value) -> Result<R>,
    {
        let frame = self.frame;
        let mut replaced = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let index = frame.column_index(name)?;
            let original = frame.column(name)?;
            if original.is_group() {
                return Err(FrameError::type_mismatch(
                    Some(name.clone()),
                    "value column",
                    "Group",
                ));
            }
            let current = original.to_values();

            let mut values = Vec::with_capacity(current.len());
            let mut kept_any = false;
            let mut produced_types = Vec::new();
            for (row, value) in frame.rows().zip(current) {
                let keep = match &self.filter {
                    Some(predicate) => !predicate(&row, &value)?,
                    None => false,
                };
                if keep {
                    kept_any = true;
                    values.push(value);
                } else {
                    let new_value = expression(&row, &value)?.into_value();
                    if let Some(t) = new_value.data_type() {
                        produced_types.push(t);
                    }
                    values.push(new_value);
                }
            }

            let column_type = updated_type(
                original.column_type(),
                R::declared_type(),
                &produced_types,
                kept_any,
                &values,
            );
            replaced.push((index, Column::with_type(name, column_type, values)?));
        }

        let mut columns = frame.shared_columns().to_vec();
        for (index, column) in replaced {
            columns[index] = Arc::new(column);
        }
        Frame::from_shared_with_height(columns, frame.height())
    }

    /// Replace selected cells with a constant.
    pub fn with_value<R>(self, value: R) -> Result<Frame>
    where
        R: IntoValue + Clone,
    {
        self.with(move |_, _| Ok(value.clone()))
    }

    /// Replace selected cells with null.
    pub fn with_null(self) -> Result<Frame> {
        self.with(|_, _| Ok(Value::Null))
    }
}

// The replacement type joins the original type whenever original cells survive.
fn updated_type(
    original: ColumnType,
    declared: Option<DataType>,
    produced: &[DataType],
    kept_any: bool,
    values: &[Value],
) -> ColumnType {
    let mut types = Vec::new();
    match declared {
        Some(t) if !produced.is_empty() => types.push(t),
        _ => types.extend_from_slice(produced),
    }
    if kept_any || types.is_empty() {
        types.push(original.dtype);
    }
    let dtype = common_supertype(types).unwrap_or(original.dtype);
    ColumnType {
        dtype,
        nullable: values.iter().any(Value::is_null),
    }
}

impl Frame {
    /// Start an update of the named columns.
    ///
    /// Unknown names are reported when the update is applied.
    pub fn update<S: AsRef<str>>(&self, columns: &[S]) -> UpdateClause<'_, 'static> {
        UpdateClause {
            frame: self,
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            filter: None,
        }
    }

    /// Start an update restricted to the null cells of the named columns.
    pub fn fill_nulls<S: AsRef<str>>(&self, columns: &[S]) -> UpdateClause<'_, 'static> {
        self.update(columns).filter(|_, v| Ok(v.is_null()))
    }
}

#[cfg(test)]
mod tests {
    use crate::frame::{column_of, ColumnType, DataType, Frame, Value};
    use crate::FrameError;

    fn df() -> Frame {
        Frame::new(vec![
            column_of("a", vec![Some(1_i64), None, Some(3)]),
            column_of("b", vec![10_i64, 20, 30]),
        ])
        .unwrap()
    }

    #[test]
    fn update_with_expression_replaces_all_cells() {
        let out = df()
            .update(&["b"])
            .with(|row, v| Ok(v.as_i64().unwrap_or(0) + row.index() as i64))
            .unwrap();
        assert_eq!(
            out.column("b").unwrap().to_values(),
            vec![Value::Int64(10), Value::Int64(21), Value::Int64(32)]
        );
        assert_eq!(out.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn filter_false_keeps_original_value() {
        let out = df()
            .update(&["b"])
            .filter(|_, v| Ok(v.as_i64().unwrap_or(0) > 15))
            .with_value(0_i64)
            .unwrap();
        assert_eq!(
            out.column("b").unwrap().to_values(),
            vec![Value::Int64(10), Value::Int64(0), Value::Int64(0)]
        );
    }

    #[test]
    fn fill_nulls_only_touches_nulls() {
        let out = df().fill_nulls(&["a"]).with_value(-1_i64).unwrap();
        let a = out.column("a").unwrap();
        assert_eq!(
            a.to_values(),
            vec![Value::Int64(1), Value::Int64(-1), Value::Int64(3)]
        );
        assert_eq!(a.column_type(), ColumnType::new(DataType::Int64));
    }

    #[test]
    fn with_null_makes_column_nullable() {
        let out = df()
            .update(&["b"])
            .filter(|row, _| Ok(row.index() == 0))
            .with_null()
            .unwrap();
        let b = out.column("b").unwrap();
        assert_eq!(b.column_type(), ColumnType::nullable(DataType::Int64));
        assert!(b.get(0).unwrap().is_null());
    }

    #[test]
    fn mixed_replacement_widens_type() {
        let out = df()
            .update(&["b"])
            .filter(|row, _| Ok(row.index() == 1))
            .with_value(2.5_f64)
            .unwrap();
        assert_eq!(out.column("b").unwrap().dtype(), DataType::Number);
    }

    #[test]
    fn unknown_column_is_reported() {
        let err = df().update(&["zz"]).with_null().unwrap_err();
        assert!(matches!(err, FrameError::ColumnNotFound { .. }));
    }

    #[test]
    fn expression_error_aborts_update() {
        let err = df()
            .update(&["a"])
            .with(|row, _| row.i64("a"))
            .unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { .. }));
    }
}
