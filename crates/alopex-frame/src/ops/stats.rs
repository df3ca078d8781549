use std::cmp::Ordering;
use std::collections::HashMap;

use crate::frame::{Column, Frame, Value};
use crate::{FrameError, Result};

impl Column {
    /// Smallest non-null value, `None` if every value is null.
    pub fn min(&self) -> Result<Option<Value>> {
        self.extreme(Ordering::Less)
    }

    /// Largest non-null value, `None` if every value is null.
    pub fn max(&self) -> Result<Option<Value>> {
        self.extreme(Ordering::Greater)
    }

    fn extreme(&self, wanted: Ordering) -> Result<Option<Value>> {
        // All-null columns carry no ordering, whatever type was inferred for them.
        if self
            .value_slice()
            .is_some_and(|values| values.iter().all(Value::is_null))
        {
            return Ok(None);
        }
        let values = self.comparable_values()?;
        let mut best: Option<&Value> = None;
        for value in values.iter().filter(|v| !v.is_null()) {
            best = match best {
                None => Some(value),
                Some(current) => match value.compare(current) {
                    Some(ord) if ord == wanted => Some(value),
                    Some(_) => Some(current),
                    None => {
                        return Err(FrameError::type_mismatch(
                            Some(self.name().to_string()),
                            "Comparable",
                            self.column_type().to_string(),
                        ))
                    }
                },
            };
        }
        Ok(best.cloned())
    }

    fn comparable_values(&self) -> Result<&[Value]> {
        match self.value_slice() {
            Some(values) if self.dtype().is_comparable() => Ok(values),
            _ => Err(FrameError::type_mismatch(
                Some(self.name().to_string()),
                "Comparable",
                self.column_type().to_string(),
            )),
        }
    }

    /// Sum of the non-null values as a float.
    pub fn sum(&self) -> Result<f64> {
        Ok(self.numeric_values()?.iter().sum())
    }

    /// Mean of the non-null values, `None` when there are none.
    ///
    /// A NaN makes the mean NaN unless `skip_na` is set, in which case NaN
    /// values are ignored like nulls.
    pub fn mean(&self, skip_na: bool) -> Result<Option<f64>> {
        let values: Vec<f64> = self
            .numeric_values()?
            .into_iter()
            .filter(|v| !(skip_na && v.is_nan()))
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    fn numeric_values(&self) -> Result<Vec<f64>> {
        let not_numeric = || {
            FrameError::type_mismatch(
                Some(self.name().to_string()),
                "Number",
                self.column_type().to_string(),
            )
        };
        let values = match self.value_slice() {
            Some(values) if self.dtype().is_numeric() => values,
            _ => return Err(not_numeric()),
        };
        values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| v.as_f64().ok_or_else(not_numeric))
            .collect()
    }

    /// Number of distinct values, null included.
    pub fn distinct_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.to_values().into_iter().filter(|v| seen.insert(v.clone())).count()
    }
}

impl Frame {
    /// One row per column describing its name, type, distinct values,
    /// percentage of nulls and most frequent value.
    pub fn summary(&self) -> Result<Frame> {
        let mut names = Vec::with_capacity(self.width());
        let mut types = Vec::with_capacity(self.width());
        let mut distinct = Vec::with_capacity(self.width());
        let mut nulls = Vec::with_capacity(self.width());
        let mut most_frequent = Vec::with_capacity(self.width());

        for column in self.columns() {
            let values = column.to_values();
            let null_count = values.iter().filter(|v| v.is_null()).count();

            names.push(column.name().to_string());
            types.push(column.column_type().to_string());
            distinct.push(column.distinct_count() as i64);
            nulls.push(null_count as f64 * 100.0 / values.len().max(1) as f64);
            most_frequent.push(most_frequent_value(values));
        }

        Frame::new(vec![
            Column::new("column", names),
            Column::new("type", types),
            Column::new("distinct values", distinct),
            Column::new("nulls %", nulls),
            Column::from_values("most frequent value", most_frequent),
        ])
    }
}

// Ties go to the value encountered first.
fn most_frequent_value(values: Vec<Value>) -> Value {
    let mut order: Vec<Value> = Vec::new();
    let mut counts: HashMap<Value, usize> = HashMap::new();
    for value in values {
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(Value, usize)> = None;
    for value in order {
        let count = counts.get(&value).copied().unwrap_or(0);
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use crate::frame::{column_of, Column, DataType, Frame, Value};
    use crate::FrameError;

    #[test]
    fn min_and_max_ignore_nulls() {
        let col = column_of("x", vec![Some(3_i64), None, Some(-1), Some(7)]);
        assert_eq!(col.min().unwrap(), Some(Value::Int64(-1)));
        assert_eq!(col.max().unwrap(), Some(Value::Int64(7)));

        let names = column_of("s", vec!["pear", "apple", "fig"]);
        assert_eq!(names.min().unwrap(), Some(Value::from("apple")));

        let nothing = column_of::<Option<i64>>("n", vec![None, None]);
        assert_eq!(nothing.max().unwrap(), None);
    }

    #[test]
    fn all_null_any_column_has_no_extremes() {
        let col = Column::from_values("e", vec![Value::Null, Value::Null]);
        assert_eq!(col.dtype(), DataType::Any);
        assert_eq!(col.min().unwrap(), None);
        assert_eq!(col.max().unwrap(), None);
    }

    #[test]
    fn min_over_mixed_numbers() {
        let col = Column::from_values("x", vec![Value::Int64(2), Value::Float64(1.5)]);
        assert_eq!(col.dtype(), DataType::Number);
        assert_eq!(col.min().unwrap(), Some(Value::Float64(1.5)));
    }

    #[test]
    fn min_rejects_non_comparable_columns() {
        let inner = Frame::new(vec![column_of("a", vec![1_i64])]).unwrap();
        let group = Column::group("g", inner);
        assert!(matches!(
            group.min().unwrap_err(),
            FrameError::TypeMismatch { .. }
        ));

        let mixed = Column::from_values("m", vec![Value::Int64(1), Value::Struct(vec![])]);
        assert_eq!(mixed.dtype(), DataType::Any);
        assert!(matches!(
            mixed.max().unwrap_err(),
            FrameError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn mean_with_nans_and_nulls() {
        let col = Column::from_values(
            "x",
            vec![
                Value::Int32(10),
                Value::Int32(20),
                Value::Float64(f64::NAN),
                Value::Null,
            ],
        );
        assert!(col.mean(false).unwrap().unwrap().is_nan());
        assert_eq!(col.mean(true).unwrap(), Some(15.0));
    }

    #[test]
    fn sum_and_mean_require_numbers() {
        let col = column_of("x", vec![1_i64, 2, 3]);
        assert_eq!(col.sum().unwrap(), 6.0);
        assert!(column_of("s", vec!["a"]).mean(false).is_err());
        assert_eq!(column_of::<f64>("e", vec![]).mean(false).unwrap(), None);
    }

    #[test]
    fn summary_describes_every_column() {
        let df = Frame::new(vec![
            column_of("a", vec![Some(1_i64), Some(1), None, Some(2)]),
            column_of("b", vec!["x", "y", "y", "x"]),
        ])
        .unwrap();
        let summary = df.summary().unwrap();

        assert_eq!(
            summary.column_names(),
            vec![
                "column",
                "type",
                "distinct values",
                "nulls %",
                "most frequent value"
            ]
        );
        assert_eq!(summary.height(), 2);
        assert_eq!(summary.get(0, "type").unwrap(), Value::from("Int64?"));
        assert_eq!(summary.get(0, "distinct values").unwrap(), Value::Int64(3));
        assert_eq!(summary.get(0, "nulls %").unwrap(), Value::Float64(25.0));
        assert_eq!(
            summary.get(0, "most frequent value").unwrap(),
            Value::Int64(1)
        );
        // tie between "x" and "y": first encountered wins
        assert_eq!(
            summary.get(1, "most frequent value").unwrap(),
            Value::from("x")
        );
    }

    #[test]
    fn summary_of_empty_column() {
        let df = Frame::new(vec![column_of::<i64>("a", vec![])]).unwrap();
        let summary = df.summary().unwrap();
        assert_eq!(summary.get(0, "nulls %").unwrap(), Value::Float64(0.0));
        assert_eq!(summary.get(0, "most frequent value").unwrap(), Value::Null);
    }
}
