//! Selection-to-query mapping.
//!
//! Translates the current control values into a row [`Predicate`] and a
//! [`CategoryMode`]. Mapping is pure: the same control values always yield
//! the same query, and placeholder values produce a defined no-op query
//! instead of an error.

use crate::controls::ControlValue;
use crate::table::{Table, Value, ValueKey};

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A row-level test, expressed over column names.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Always,
    Never,
    /// Cell equals the value exactly.
    Equals { column: String, value: Value },
    /// Numeric cell within `[low, high]`, inclusive on both ends.
    Between { column: String, low: f64, high: f64 },
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn equals(column: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            column: column.to_string(),
            value: value.into(),
        }
    }

    pub fn between(column: &str, low: f64, high: f64) -> Self {
        Self::Between {
            column: column.to_string(),
            low,
            high,
        }
    }

    /// Conjunction, flattening trivial operands.
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Self::Never, _) | (_, Self::Never) => Self::Never,
            (Self::Always, p) | (p, Self::Always) => p,
            (Self::And(mut a), Self::And(b)) => {
                a.extend(b);
                Self::And(a)
            }
            (Self::And(mut a), p) => {
                a.push(p);
                Self::And(a)
            }
            (p, Self::And(mut b)) => {
                b.insert(0, p);
                Self::And(b)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Resolve column names against a table's schema.
    ///
    /// A predicate over a column the table lacks matches nothing, as does an
    /// inverted or NaN range.
    pub(crate) fn bind(&self, table: &Table) -> BoundPredicate {
        match self {
            Self::Always => BoundPredicate::Always,
            Self::Never => BoundPredicate::Never,
            Self::Equals { column, value } => match table.column_index(column) {
                Some(idx) => BoundPredicate::Equals(idx, value.key()),
                None => BoundPredicate::Never,
            },
            Self::Between { column, low, high } => match table.column_index(column) {
                Some(idx) if low <= high => BoundPredicate::Between(idx, *low, *high),
                _ => BoundPredicate::Never,
            },
            Self::And(parts) => BoundPredicate::And(parts.iter().map(|p| p.bind(table)).collect()),
        }
    }
}

/// A [`Predicate`] with column names resolved to indices.
#[derive(Debug)]
pub(crate) enum BoundPredicate {
    Always,
    Never,
    Equals(usize, ValueKey),
    Between(usize, f64, f64),
    And(Vec<BoundPredicate>),
}

impl BoundPredicate {
    pub(crate) fn matches(&self, row: &[Value]) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Equals(idx, key) => row.get(*idx).is_some_and(|v| v.key() == *key),
            Self::Between(idx, low, high) => row
                .get(*idx)
                .and_then(Value::as_f64)
                .is_some_and(|v| *low <= v && v <= *high),
            Self::And(parts) => parts.iter().all(|p| p.matches(row)),
        }
    }
}

// ---------------------------------------------------------------------------
// Selection mapping
// ---------------------------------------------------------------------------

/// Which categories a selection covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryMode {
    /// The "all categories" sentinel.
    All,
    One(String),
}

impl CategoryMode {
    /// Name to embed in chart titles; `None` for the sentinel.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::One(name) => Some(name),
        }
    }
}

/// Result of mapping one output's control values.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// `None` when the category control holds no usable value.
    pub mode: Option<CategoryMode>,
    pub predicate: Predicate,
}

impl Query {
    /// The query used before any real selection: matches nothing.
    pub fn empty() -> Self {
        Self {
            mode: None,
            predicate: Predicate::Never,
        }
    }

    pub fn apply(&self, table: &Table) -> Table {
        table.filter(&self.predicate)
    }
}

/// Maps a category control (with an "all" sentinel) and an optional range
/// control onto a [`Query`].
#[derive(Debug, Clone)]
pub struct SelectionMapper {
    category_column: String,
    all_sentinel: String,
    range_column: Option<String>,
}

impl SelectionMapper {
    pub fn new(category_column: &str, all_sentinel: &str) -> Self {
        Self {
            category_column: category_column.to_string(),
            all_sentinel: all_sentinel.to_string(),
            range_column: None,
        }
    }

    /// Bound a numeric column by the range control.
    pub fn with_range(mut self, column: &str) -> Self {
        self.range_column = Some(column.to_string());
        self
    }

    pub fn all_sentinel(&self) -> &str {
        &self.all_sentinel
    }

    /// Interpret the category control alone.
    pub fn mode(&self, category: &ControlValue) -> Option<CategoryMode> {
        match category {
            ControlValue::Text(s) if *s == self.all_sentinel => Some(CategoryMode::All),
            ControlValue::Text(s) => Some(CategoryMode::One(s.clone())),
            ControlValue::Number(_) => Some(CategoryMode::One(category_label(category))),
            ControlValue::Unset | ControlValue::Range(..) => None,
        }
    }

    /// Map the current category and range values to a query.
    ///
    /// - unset category: [`Query::empty`]
    /// - sentinel: every row inside the range
    /// - specific category: rows of that category inside the range
    ///
    /// A range value that is not a pair leaves the range unrestricted. An
    /// inverted range (`low > high`) matches nothing.
    pub fn map(&self, category: &ControlValue, range: &ControlValue) -> Query {
        let Some(mode) = self.mode(category) else {
            return Query::empty();
        };

        let range_predicate = match (&self.range_column, range.as_range()) {
            (Some(column), Some((low, high))) if low <= high => Predicate::between(column, low, high),
            (Some(_), Some(_)) => Predicate::Never,
            _ => Predicate::Always,
        };

        let category_predicate = match &mode {
            CategoryMode::All => Predicate::Always,
            CategoryMode::One(name) => {
                let value = match category {
                    ControlValue::Number(n) => Value::Number(*n),
                    _ => Value::Text(name.clone()),
                };
                Predicate::Equals {
                    column: self.category_column.clone(),
                    value,
                }
            }
        };

        Query {
            mode: Some(mode),
            predicate: range_predicate.and(category_predicate),
        }
    }
}

fn category_label(value: &ControlValue) -> String {
    match value {
        ControlValue::Number(n) => Value::Number(*n).to_string(),
        ControlValue::Text(s) => s.clone(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
