use std::fmt;

/// Element types known to a frame, arranged in a fixed lattice.
///
/// `Any`, `Comparable` and `Number` are abstract: no value carries them, but
/// columns reconciled from several concrete types do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    /// Top of the lattice.
    Any,
    /// Values with a total order (booleans, numbers, strings).
    Comparable,
    /// Numeric values.
    Number,
    /// Boolean values.
    Boolean,
    /// 32-bit signed integers.
    Int32,
    /// 64-bit signed integers.
    Int64,
    /// 64-bit floats.
    Float64,
    /// UTF-8 strings.
    Utf8,
    /// Rows of a nested frame.
    Group,
}

impl DataType {
    /// Every registered type in declaration order.
    pub const ALL: [DataType; 9] = [
        DataType::Any,
        DataType::Comparable,
        DataType::Number,
        DataType::Boolean,
        DataType::Int32,
        DataType::Int64,
        DataType::Float64,
        DataType::Utf8,
        DataType::Group,
    ];

    /// Direct supertypes.
    pub fn parents(self) -> &'static [DataType] {
        use DataType::*;
        match self {
            Any => &[],
            Comparable | Number | Group => &[Any],
            Boolean | Utf8 => &[Comparable],
            Int32 | Int64 | Float64 => &[Number, Comparable],
        }
    }

    /// All strict supertypes, in lattice declaration order.
    pub fn ancestors(self) -> Vec<DataType> {
        let mut out = Vec::new();
        let mut stack = self.parents().to_vec();
        while let Some(t) = stack.pop() {
            if !out.contains(&t) {
                out.push(t);
                stack.extend_from_slice(t.parents());
            }
        }
        out.sort();
        out
    }

    /// Number of registered types that have `self` as a strict supertype.
    pub fn descendant_count(self) -> usize {
        Self::ALL
            .iter()
            .filter(|t| t.ancestors().contains(&self))
            .count()
    }

    /// Returns `true` if `self` equals `other` or `other` is one of its ancestors.
    pub fn is_subtype_of(self, other: DataType) -> bool {
        self == other || self.ancestors().contains(&other)
    }

    /// Returns `true` for numeric types, including the abstract `Number`.
    pub fn is_numeric(self) -> bool {
        self.is_subtype_of(DataType::Number)
    }

    /// Returns `true` if values of this type can be ordered.
    pub fn is_comparable(self) -> bool {
        self.is_subtype_of(DataType::Comparable)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Any => "Any",
            DataType::Comparable => "Comparable",
            DataType::Number => "Number",
            DataType::Boolean => "Boolean",
            DataType::Int32 => "Int32",
            DataType::Int64 => "Int64",
            DataType::Float64 => "Float64",
            DataType::Utf8 => "Utf8",
            DataType::Group => "Group",
        };
        f.write_str(name)
    }
}

/// Most specific common supertype of `types`.
///
/// Returns `None` for an empty input. When several unrelated candidates
/// remain, the one with the most ancestors wins; ties go to the candidate
/// with the fewest registered descendants, then to declaration order.
pub fn common_supertype<I>(types: I) -> Option<DataType>
where
    I: IntoIterator<Item = DataType>,
{
    let mut distinct: Vec<DataType> = Vec::new();
    for t in types {
        if !distinct.contains(&t) {
            distinct.push(t);
        }
    }

    match distinct.as_slice() {
        [] => return None,
        [single] => return Some(*single),
        _ => {}
    }

    let mut common: Option<Vec<DataType>> = None;
    for t in &distinct {
        let mut closure = t.ancestors();
        closure.push(*t);
        common = Some(match common {
            Some(set) => set.into_iter().filter(|c| closure.contains(c)).collect(),
            None => closure,
        });
    }
    let common = common.unwrap_or_default();

    let leaves: Vec<DataType> = common
        .iter()
        .copied()
        .filter(|c| !common.iter().any(|other| other.parents().contains(c)))
        .collect();

    let best = leaves.into_iter().min_by(|a, b| {
        b.ancestors()
            .len()
            .cmp(&a.ancestors().len())
            .then(a.descendant_count().cmp(&b.descendant_count()))
            .then(a.cmp(b))
    });

    Some(best.unwrap_or(DataType::Any))
}

/// Declared type of a column: an element type plus nullability.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ColumnType {
    /// Element type.
    pub dtype: DataType,
    /// Whether the column may contain nulls.
    pub nullable: bool,
}

impl ColumnType {
    /// A non-nullable column type.
    pub fn new(dtype: DataType) -> Self {
        Self {
            dtype,
            nullable: false,
        }
    }

    /// A nullable column type.
    pub fn nullable(dtype: DataType) -> Self {
        Self {
            dtype,
            nullable: true,
        }
    }

    /// Copy of this type with nullability replaced.
    pub fn with_nullable(self, nullable: bool) -> Self {
        Self {
            dtype: self.dtype,
            nullable,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dtype)?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}
