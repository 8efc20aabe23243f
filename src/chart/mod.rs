//! Chart specifications.
//!
//! A [`ChartSpec`] is a declarative, engine-independent description of one
//! chart: its kind, title, axis labels and one or more traces of points. The
//! page's renderer consumes it once and discards it.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::table::{Table, Value, ValueKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
    Scatter,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pie => write!(f, "pie"),
            Self::Bar => write!(f, "bar"),
            Self::Line => write!(f, "line"),
            Self::Scatter => write!(f, "scatter"),
        }
    }
}

/// One point. For pie charts `x` is the slice name and `y` its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: Value,
    pub y: Value,
}

/// A series of points sharing one color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Color-group value; `None` when the chart has no color encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    /// Start describing a chart of `kind` plotting `y` against `x`.
    ///
    /// For pie charts `x` names the slices and `y` sizes them.
    pub fn encode<'a>(kind: ChartKind, x: &'a str, y: &'a str) -> ChartBuilder<'a> {
        ChartBuilder {
            kind,
            x,
            y,
            color: None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.traces.iter().map(|t| t.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChartBuilder<'a> {
    kind: ChartKind,
    x: &'a str,
    y: &'a str,
    color: Option<&'a str>,
}

impl<'a> ChartBuilder<'a> {
    /// Split points into one trace per distinct value of `column`.
    pub fn color(mut self, column: &'a str) -> Self {
        self.color = Some(column);
        self
    }

    /// Produce the chart from `table`.
    ///
    /// Total over well-formed input: a zero-row table (or one missing an
    /// encoded column) gives a chart with no traces.
    pub fn render(self, table: &Table, title: impl Into<String>) -> ChartSpec {
        ChartSpec {
            kind: self.kind,
            title: title.into(),
            x: self.x.to_string(),
            y: self.y.to_string(),
            color: self.color.map(str::to_string),
            traces: self.traces(table),
        }
    }

    fn traces(&self, table: &Table) -> Vec<Trace> {
        let (Some(xi), Some(yi)) = (table.column_index(self.x), table.column_index(self.y)) else {
            return Vec::new();
        };
        if table.is_empty() {
            return Vec::new();
        }

        let point = |row: &[Value]| Point {
            x: row[xi].clone(),
            y: row[yi].clone(),
        };

        let Some(ci) = self.color.and_then(|c| table.column_index(c)) else {
            return vec![Trace {
                name: None,
                points: table.rows().iter().map(|r| point(r.as_slice())).collect(),
            }];
        };

        let mut traces: Vec<Trace> = Vec::new();
        let mut index: HashMap<ValueKey, usize> = HashMap::new();
        for row in table.rows() {
            let slot = *index.entry(row[ci].key()).or_insert_with(|| {
                traces.push(Trace {
                    name: Some(row[ci].to_string()),
                    points: Vec::new(),
                });
                traces.len() - 1
            });
            traces[slot].points.push(point(row.as_slice()));
        }
        traces
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_csv;

    fn launches() -> Table {
        let csv = "\
Payload Mass (kg),class,Booster Version Category
500,1,v1.0
2000,0,FT
3000,1,v1.0
";
        read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn color_splits_traces_in_first_occurrence_order() {
        let spec = ChartSpec::encode(ChartKind::Scatter, "Payload Mass (kg)", "class")
            .color("Booster Version Category")
            .render(&launches(), "Payload vs. Outcome for All Sites");

        let names: Vec<_> = spec.traces.iter().map(|t| t.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["v1.0", "FT"]);
        assert_eq!(spec.traces[0].points.len(), 2);
        assert_eq!(spec.point_count(), 3);
    }

    #[test]
    fn zero_rows_render_an_empty_chart() {
        let spec = ChartSpec::encode(ChartKind::Pie, "class", "Payload Mass (kg)")
            .render(&launches().empty_like(), "Empty");
        assert!(spec.is_empty());
        assert!(spec.traces.is_empty());
        assert_eq!(spec.title, "Empty");
    }

    #[test]
    fn missing_column_renders_empty_chart() {
        let spec = ChartSpec::encode(ChartKind::Bar, "nope", "class").render(&launches(), "t");
        assert!(spec.is_empty());
    }

    #[test]
    fn serializes_to_stable_json() {
        let render = || {
            ChartSpec::encode(ChartKind::Line, "Payload Mass (kg)", "class").render(&launches(), "t")
        };
        let a = serde_json::to_string(&render()).unwrap();
        let b = serde_json::to_string(&render()).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(r#"{"kind":"line","title":"t","x":"Payload Mass (kg)","y":"class","traces":"#));
        assert!(a.contains(r#"{"x":500.0,"y":1.0}"#));
    }
}
