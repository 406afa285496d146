//! Field types, column references and the field mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Semantic role a CSV column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Person's display name.
    Name,
    /// Email address, the join key against the roster.
    Email,
    /// Job title / position.
    Position,
    /// Department or organisational unit.
    Department,
}

impl FieldType {
    /// All field types, in canonical order.
    pub const ALL: [FieldType; 4] = [
        FieldType::Name,
        FieldType::Email,
        FieldType::Position,
        FieldType::Department,
    ];

    /// Field types that are diffed against the roster (email is the key).
    pub const DIFFED: [FieldType; 3] = [FieldType::Name, FieldType::Position, FieldType::Department];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Name => "name",
            FieldType::Email => "email",
            FieldType::Position => "position",
            FieldType::Department => "department",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a field to the column(s) holding its value.
///
/// On the wire this is `3`, `[1, 2]` or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnRef {
    /// A single column.
    Single(usize),
    /// Several columns whose non-blank values are joined with a space.
    Composite(Vec<usize>),
    /// No column; the field resolves to an empty string.
    #[default]
    Absent,
}

impl ColumnRef {
    /// Whether this reference points at no column. An empty composite list
    /// counts as absent.
    pub fn is_absent(&self) -> bool {
        self.indices().is_empty()
    }

    /// Column indices referenced, in order.
    pub fn indices(&self) -> &[usize] {
        match self {
            ColumnRef::Single(idx) => std::slice::from_ref(idx),
            ColumnRef::Composite(indices) => indices,
            ColumnRef::Absent => &[],
        }
    }

    /// Whether every referenced index exists in a table with `column_count` columns.
    pub fn is_within(&self, column_count: usize) -> bool {
        self.indices().iter().all(|&idx| idx < column_count)
    }

    /// Resolve the field value for one row.
    ///
    /// Values are trimmed. Missing cells and out-of-range indices count as
    /// blank; composite references skip blanks and join the rest with a
    /// single space.
    pub fn resolve(&self, row: &[Option<String>]) -> String {
        let cell = |idx: usize| -> &str {
            row.get(idx)
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .unwrap_or("")
        };

        match self {
            ColumnRef::Single(idx) => cell(*idx).to_string(),
            ColumnRef::Composite(indices) => indices
                .iter()
                .map(|&idx| cell(idx))
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            ColumnRef::Absent => String::new(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Single(idx) => write!(f, "{}", idx),
            ColumnRef::Composite(indices) => {
                let parts: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
            ColumnRef::Absent => f.write_str("none"),
        }
    }
}

impl FromStr for ColumnRef {
    type Err = String;

    /// Parse `none`, `3` or `1,2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("null") {
            return Ok(ColumnRef::Absent);
        }

        let indices = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid column index: '{}'", part.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if indices.len() == 1 && !s.contains(',') {
            Ok(ColumnRef::Single(indices[0]))
        } else {
            Ok(ColumnRef::Composite(indices))
        }
    }
}

impl Serialize for ColumnRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnRef::Single(idx) => serializer.serialize_u64(*idx as u64),
            ColumnRef::Composite(indices) => indices.serialize(serializer),
            ColumnRef::Absent => serializer.serialize_none(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnRefRepr {
    Single(usize),
    Composite(Vec<usize>),
}

impl<'de> Deserialize<'de> for ColumnRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<ColumnRefRepr>::deserialize(deserializer)? {
            None => ColumnRef::Absent,
            Some(ColumnRefRepr::Single(idx)) => ColumnRef::Single(idx),
            Some(ColumnRefRepr::Composite(indices)) => ColumnRef::Composite(indices),
        })
    }
}

/// Mapping from each field type to its column reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub name: ColumnRef,
    #[serde(default)]
    pub email: ColumnRef,
    #[serde(default)]
    pub position: ColumnRef,
    #[serde(default)]
    pub department: ColumnRef,
}

impl FieldMapping {
    /// An empty mapping (every field absent).
    pub fn new() -> Self {
        Self::default()
    }

    /// Column reference for a field.
    pub fn get(&self, field: FieldType) -> &ColumnRef {
        match field {
            FieldType::Name => &self.name,
            FieldType::Email => &self.email,
            FieldType::Position => &self.position,
            FieldType::Department => &self.department,
        }
    }

    /// Replace the column reference for a field.
    pub fn set(&mut self, field: FieldType, column: ColumnRef) {
        match field {
            FieldType::Name => self.name = column,
            FieldType::Email => self.email = column,
            FieldType::Position => self.position = column,
            FieldType::Department => self.department = column,
        }
    }

    /// Builder-style [`FieldMapping::set`].
    pub fn with(mut self, field: FieldType, column: ColumnRef) -> Self {
        self.set(field, column);
        self
    }
}
