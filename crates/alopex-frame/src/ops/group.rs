use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::frame::{Column, Frame};
use crate::{FrameError, Result};

/// Hands out column names that do not collide with names already taken.
///
/// A taken name gets the smallest numeric suffix that is still free:
/// `value`, `value1`, `value2`, ...
#[derive(Debug, Clone, Default)]
pub struct UniqueNameGenerator {
    taken: HashSet<String>,
}

impl UniqueNameGenerator {
    /// Start from an initial set of taken names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Reserve and return `preferred`, or the first free suffixed variant of it.
    pub fn add_unique(&mut self, preferred: &str) -> String {
        let name = if self.taken.contains(preferred) {
            (1..)
                .map(|k| format!("{preferred}{k}"))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_else(|| preferred.to_string())
        } else {
            preferred.to_string()
        };
        self.taken.insert(name.clone());
        name
    }

    /// Returns `true` if `name` is already reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}

/// Pending grouping of an explicit column selection, created by [`Frame::group`].
#[derive(Debug, Clone)]
pub struct GroupClause<'a> {
    frame: &'a Frame,
    columns: Vec<String>,
    renames: HashMap<String, String>,
}

impl<'a> GroupClause<'a> {
    /// Give a selected column a different name inside its group.
    pub fn rename(mut self, column: &str, name: &str) -> Self {
        self.renames.insert(column.to_string(), name.to_string());
        self
    }

    /// Nest every selected column under one group column called `name`.
    pub fn into_group(self, name: &str) -> Result<Frame> {
        self.into_groups_by(|_| name.to_string())
    }

    /// Nest each selected column under the group named by `group_name`.
    pub fn into_groups_by<F>(self, group_name: F) -> Result<Frame>
    where
        F: Fn(&Column) -> String,
    {
        let mut groups = HashMap::new();
        for name in &self.columns {
            let column = self.frame.column(name)?;
            groups.insert(name.clone(), group_name(column));
        }
        regroup(self.frame, &groups, &self.renames)
    }
}

/// Grouping of columns computed from the columns themselves, created by
/// [`Frame::group_cols_by`].
#[derive(Debug, Clone)]
pub struct GroupColsBy<'a> {
    frame: &'a Frame,
    grouping: Vec<(String, Vec<usize>)>,
}

impl<'a> GroupColsBy<'a> {
    /// Keep only the groups for which `predicate(group, members)` holds.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&str, &[&Column]) -> bool,
    {
        let frame = self.frame;
        let grouping = self
            .grouping
            .into_iter()
            .filter(|(group, members)| {
                let cols: Vec<&Column> = members
                    .iter()
                    .filter_map(|&i| frame.column_at(i))
                    .collect();
                predicate(group, &cols)
            })
            .collect();
        Self { frame, grouping }
    }

    /// Apply the grouping, naming each member inside its group with `rename`.
    pub fn into_renamed<F>(self, rename: F) -> Result<Frame>
    where
        F: Fn(&Column) -> String,
    {
        let mut groups = HashMap::new();
        let mut renames = HashMap::new();
        for (group, members) in &self.grouping {
            for &i in members {
                if let Some(column) = self.frame.column_at(i) {
                    groups.insert(column.name().to_string(), group.clone());
                    renames.insert(column.name().to_string(), rename(column));
                }
            }
        }
        regroup(self.frame, &groups, &renames)
    }

    /// Apply the grouping, keeping member names.
    pub fn finish(self) -> Result<Frame> {
        self.into_renamed(|c| c.name().to_string())
    }
}

// Replace each group's members by one group column placed at the lowest member index.
fn regroup(
    frame: &Frame,
    groups: &HashMap<String, String>,
    renames: &HashMap<String, String>,
) -> Result<Frame> {
    let mut members: Vec<(String, Vec<usize>)> = Vec::new();
    for (index, column) in frame.columns().enumerate() {
        let Some(group) = groups.get(column.name()) else {
            continue;
        };
        match members.iter_mut().find(|(g, _)| g == group) {
            Some((_, indices)) => indices.push(index),
            None => members.push((group.clone(), vec![index])),
        }
    }

    let insert_at: HashMap<usize, usize> = members
        .iter()
        .enumerate()
        .map(|(g, (_, indices))| (indices[0], g))
        .collect();

    let all = frame.shared_columns();
    let mut out = Vec::with_capacity(all.len());
    for (index, column) in all.iter().enumerate() {
        if let Some(&g) = insert_at.get(&index) {
            let (group, indices) = &members[g];
            let nested = indices
                .iter()
                .map(|&i| {
                    let member = &all[i];
                    match renames.get(member.name()) {
                        Some(name) if name != member.name() => Arc::new(member.renamed(name)),
                        _ => member.clone(),
                    }
                })
                .collect();
            let nested = Frame::from_shared_with_height(nested, frame.height())?;
            out.push(Arc::new(Column::group(group, nested)));
        } else if !groups.contains_key(column.name()) {
            out.push(column.clone());
        }
    }
    Frame::from_shared_with_height(out, frame.height())
}

impl Frame {
    /// Start grouping the named columns into nested group columns.
    pub fn group<S: AsRef<str>>(&self, columns: &[S]) -> GroupClause<'_> {
        GroupClause {
            frame: self,
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            renames: HashMap::new(),
        }
    }

    /// Group columns by an explicit `(column, group)` mapping.
    pub fn group_by_mapping<S, G>(&self, mapping: &[(S, G)]) -> Result<Frame>
    where
        S: AsRef<str>,
        G: AsRef<str>,
    {
        let mut groups = HashMap::new();
        for (column, group) in mapping {
            self.column_index(column.as_ref())?;
            groups.insert(column.as_ref().to_string(), group.as_ref().to_string());
        }
        regroup(self, &groups, &HashMap::new())
    }

    /// Group columns by the group name `group_name` assigns them; `None` leaves
    /// a column ungrouped.
    pub fn group_cols_by<F>(&self, group_name: F) -> GroupColsBy<'_>
    where
        F: Fn(&Column) -> Option<String>,
    {
        let mut grouping: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, column) in self.columns().enumerate() {
            let Some(group) = group_name(column) else {
                continue;
            };
            match grouping.iter_mut().find(|(g, _)| *g == group) {
                Some((_, indices)) => indices.push(index),
                None => grouping.push((group, vec![index])),
            }
        }
        GroupColsBy {
            frame: self,
            grouping,
        }
    }

    /// Replace each named group column with its nested columns, in place.
    ///
    /// Nested names that collide with the remaining columns, or with columns
    /// spliced earlier, get a numeric suffix.
    pub fn ungroup<S: AsRef<str>>(&self, columns: &[S]) -> Result<Frame> {
        let mut selected = HashSet::new();
        for index in self.column_indices(columns)? {
            let column = &self.shared_columns()[index];
            if !column.is_group() {
                return Err(FrameError::type_mismatch(
                    Some(column.name().to_string()),
                    "Group",
                    column.column_type().to_string(),
                ));
            }
            selected.insert(index);
        }

        let all = self.shared_columns();
        let mut names = UniqueNameGenerator::new(
            all.iter()
                .enumerate()
                .filter(|(i, _)| !selected.contains(i))
                .map(|(_, c)| c.name()),
        );

        let mut out = Vec::with_capacity(all.len());
        for (index, column) in all.iter().enumerate() {
            let nested = match column.group_frame() {
                Some(nested) if selected.contains(&index) => nested,
                _ => {
                    out.push(column.clone());
                    continue;
                }
            };
            for inner in nested.shared_columns() {
                let name = names.add_unique(inner.name());
                if name == inner.name() {
                    out.push(inner.clone());
                } else {
                    out.push(Arc::new(inner.renamed(&name)));
                }
            }
        }
        Frame::from_shared_with_height(out, self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::UniqueNameGenerator;
    use crate::frame::{column_of, Frame, Value};
    use crate::FrameError;

    fn df() -> Frame {
        Frame::new(vec![
            column_of("id", vec![1_i64, 2]),
            column_of("first", vec!["Ann", "Bob"]),
            column_of("age", vec![30_i64, 40]),
            column_of("last", vec!["Lee", "Kim"]),
        ])
        .unwrap()
    }

    #[test]
    fn generator_suffixes_taken_names() {
        let mut names = UniqueNameGenerator::new(["a", "a1"]);
        assert_eq!(names.add_unique("b"), "b");
        assert_eq!(names.add_unique("a"), "a2");
        assert_eq!(names.add_unique("a"), "a3");
        assert!(names.contains("b"));
    }

    #[test]
    fn group_inserts_at_lowest_member_index() {
        let out = df().group(&["last", "first"]).into_group("name").unwrap();
        assert_eq!(out.column_names(), vec!["id", "name", "age"]);
        let name = out.column("name").unwrap().group_frame().unwrap();
        // members keep frame order
        assert_eq!(name.column_names(), vec!["first", "last"]);
        assert_eq!(name.height(), 2);
    }

    #[test]
    fn group_with_rename() {
        let out = df()
            .group(&["first", "last"])
            .rename("first", "given")
            .into_group("name")
            .unwrap();
        let row = out.row(1).unwrap();
        assert_eq!(row.group("name").unwrap().str("given").unwrap(), "Bob");
    }

    #[test]
    fn group_by_mapping_builds_several_groups() {
        let out = df()
            .group_by_mapping(&[("age", "info"), ("first", "name"), ("last", "name")])
            .unwrap();
        assert_eq!(out.column_names(), vec!["id", "name", "info"]);
    }

    #[test]
    fn group_cols_by_with_filter_and_rename() {
        let df = Frame::new(vec![
            column_of("a_x", vec![1_i64]),
            column_of("b", vec![2_i64]),
            column_of("a_y", vec![3_i64]),
            column_of("c_z", vec![4_i64]),
        ])
        .unwrap();
        let out = df
            .group_cols_by(|c| c.name().split_once('_').map(|(p, _)| p.to_string()))
            .filter(|_, members| members.len() > 1)
            .into_renamed(|c| {
                c.name()
                    .split_once('_')
                    .map(|(_, s)| s.to_string())
                    .unwrap_or_default()
            })
            .unwrap();
        assert_eq!(out.column_names(), vec!["a", "b", "c_z"]);
        let a = out.column("a").unwrap().group_frame().unwrap();
        assert_eq!(a.column_names(), vec!["x", "y"]);
    }

    #[test]
    fn ungroup_restores_columns() {
        let df = df();
        let grouped = df.group(&["first", "last"]).into_group("name").unwrap();
        let ungrouped = grouped.ungroup(&["name"]).unwrap();
        assert_eq!(ungrouped.column_names(), vec!["id", "first", "last", "age"]);
        assert_eq!(
            ungrouped.column("last").unwrap().to_values(),
            vec![Value::from("Lee"), Value::from("Kim")]
        );
    }

    #[test]
    fn ungroup_renames_collisions() {
        let inner = Frame::new(vec![
            column_of("id", vec![7_i64]),
            column_of("v", vec![1_i64]),
        ])
        .unwrap();
        let df = Frame::new(vec![
            column_of("id", vec![1_i64]),
            crate::frame::Column::group("g", inner),
        ])
        .unwrap();
        let out = df.ungroup(&["g"]).unwrap();
        assert_eq!(out.column_names(), vec!["id", "id1", "v"]);
        assert_eq!(out.get(0, "id1").unwrap(), Value::Int64(7));
    }

    #[test]
    fn ungroup_rejects_value_columns() {
        let err = df().ungroup(&["age"]).unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { .. }));
    }

    #[test]
    fn group_unknown_column_is_reported() {
        let err = df().group(&["nope"]).into_group("g").unwrap_err();
        assert!(matches!(err, FrameError::ColumnNotFound { .. }));
    }
}
