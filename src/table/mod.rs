//! In-memory record table.
//!
//! A [`Table`] is an ordered collection of rows sharing one column schema.
//! Tables are never mutated after construction: filtering, relabelling and
//! aggregation all produce new tables, so the loaded dataset can be shared by
//! reference for the lifetime of the process.

pub mod loader;

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::query::Predicate;

pub use loader::{load_csv, read_csv};

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Empty cell in the source file.
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Parse a raw cell according to the column type.
    pub fn parse(raw: &str, column_type: ColumnType) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Null;
        }
        match column_type {
            ColumnType::Number => raw
                .parse::<f64>()
                .map(Self::Number)
                .unwrap_or_else(|_| Self::Text(raw.to_string())),
            ColumnType::Text => Self::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Hashable identity used for grouping and distinct-value scans.
    pub(crate) fn key(&self) -> ValueKey {
        match self {
            Self::Null => ValueKey::Null,
            // Normalise -0.0 so it groups with 0.0.
            Self::Number(n) if *n == 0.0 => ValueKey::Number(0f64.to_bits()),
            Self::Number(n) => ValueKey::Number(n.to_bits()),
            Self::Text(s) => ValueKey::Text(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Null,
    Number(u64),
    Text(String),
}

/// Column type, inferred at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Column name + type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from a schema and rows.
    ///
    /// Rows shorter than the schema are padded with nulls and longer rows
    /// are truncated, so every row matches the schema width.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// An empty table with the same schema as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a column, failing if the table does not have it.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .with_context(|| format!("dataset is missing required column '{name}'"))
    }

    /// Look up a column that must hold numbers.
    pub fn require_numeric(&self, name: &str) -> Result<usize> {
        let idx = self.require_column(name)?;
        if self.columns[idx].column_type != ColumnType::Number {
            anyhow::bail!("column '{name}' must be numeric");
        }
        Ok(idx)
    }

    /// All cells of a column, in row order. Unknown columns yield nothing.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Distinct non-null values of a column in order of first appearance.
    pub fn distinct(&self, name: &str) -> Vec<Value> {
        let mut seen = std::collections::HashSet::new();
        self.column_values(name)
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert(v.key()))
            .cloned()
            .collect()
    }

    /// Minimum and maximum of a numeric column, ignoring nulls.
    pub fn numeric_range(&self, name: &str) -> Option<(f64, f64)> {
        self.column_values(name)
            .filter_map(Value::as_f64)
            .fold(None, |acc, n| match acc {
                None => Some((n, n)),
                Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
            })
    }

    /// Rows satisfying `predicate`, as a new table.
    pub fn filter(&self, predicate: &Predicate) -> Table {
        let bound = predicate.bind(self);
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| bound.matches(row))
                .cloned()
                .collect(),
        }
    }

    /// A new table with one column's cells rewritten by `f`.
    ///
    /// The column's type becomes `column_type`. Unknown columns return an
    /// unchanged copy.
    pub fn map_column<F>(&self, name: &str, column_type: ColumnType, f: F) -> Table
    where
        F: Fn(&Value) -> Value,
    {
        let Some(idx) = self.column_index(name) else {
            return self.clone();
        };
        let mut columns = self.columns.clone();
        columns[idx].column_type = column_type;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row[idx] = f(&row[idx]);
                row
            })
            .collect();
        Table { columns, rows }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec![
                Column::new("site", ColumnType::Text),
                Column::new("mass", ColumnType::Number),
            ],
            vec![
                vec!["A".into(), 10.0.into()],
                vec!["B".into(), 5.0.into()],
                vec!["A".into(), Value::Null],
                vec!["C".into(), 20.0.into()],
            ],
        )
    }

    #[test]
    fn distinct_keeps_first_occurrence_order() {
        let t = sample();
        assert_eq!(t.distinct("site"), vec!["A".into(), "B".into(), "C".into()]);
    }

    #[test]
    fn numeric_range_skips_nulls() {
        assert_eq!(sample().numeric_range("mass"), Some((5.0, 20.0)));
        assert_eq!(sample().numeric_range("nope"), None);
    }

    #[test]
    fn require_numeric_rejects_text_column() {
        let t = sample();
        assert!(t.require_numeric("mass").is_ok());
        assert!(t.require_numeric("site").is_err());
        assert!(t.require_column("missing").is_err());
    }

    #[test]
    fn new_pads_short_rows() {
        let t = Table::new(
            vec![
                Column::new("a", ColumnType::Text),
                Column::new("b", ColumnType::Number),
            ],
            vec![vec!["x".into()]],
        );
        assert_eq!(t.rows()[0], vec![Value::from("x"), Value::Null]);
    }

    #[test]
    fn map_column_does_not_touch_source() {
        let t = sample();
        let mapped = t.map_column("mass", ColumnType::Text, |v| match v {
            Value::Null => "none".into(),
            other => other.to_string().into(),
        });
        assert_eq!(mapped.rows()[2][1], Value::from("none"));
        assert_eq!(t.rows()[2][1], Value::Null);
        assert_eq!(mapped.columns()[1].column_type, ColumnType::Text);
    }

    #[test]
    fn value_display_trims_integral_numbers() {
        assert_eq!(Value::Number(1980.0).to_string(), "1980");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::Null, 1.5.into(), "x".into()]).unwrap();
        assert_eq!(json, r#"[null,1.5,"x"]"#);
    }
}
