//! Control registry.
//!
//! Declares the interactive controls a dashboard exposes and derives their
//! legal domains from the loaded table: distinct values of a categorical
//! column, the min/max of a measurement column, or a contiguous span of
//! integer years. Domain derivation is pure; a missing column is a
//! configuration error reported at startup.

pub mod value;

use anyhow::Result;
use serde::Serialize;

use crate::table::{Table, Value};

pub use value::{ControlValue, ControlValues};

// ---------------------------------------------------------------------------
// Control declarations
// ---------------------------------------------------------------------------

/// One selectable dropdown entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: ControlValue,
}

impl DropdownOption {
    pub fn text(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: ControlValue::Text(label.to_string()),
        }
    }
}

/// A labelled tick on a range slider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderMark {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlKind {
    /// Single choice from a finite list.
    Dropdown {
        options: Vec<DropdownOption>,
        searchable: bool,
    },
    /// Closed numeric interval.
    RangeSlider {
        min: f64,
        max: f64,
        step: f64,
        marks: Vec<SliderMark>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub kind: ControlKind,
    pub default: ControlValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Control {
    pub fn new(id: &str, kind: ControlKind) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            kind,
            default: ControlValue::Unset,
            placeholder: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_default(mut self, default: impl Into<ControlValue>) -> Self {
        self.default = default.into();
        self
    }

    pub fn searchable(mut self) -> Self {
        if let ControlKind::Dropdown { searchable, .. } = &mut self.kind {
            *searchable = true;
        }
        self
    }

    /// Whether `value` lies in this control's domain. `Unset` is always
    /// accepted since every control starts out as a placeholder.
    pub fn accepts(&self, value: &ControlValue) -> bool {
        if value.is_unset() {
            return true;
        }
        match &self.kind {
            ControlKind::Dropdown { options, .. } => options.iter().any(|o| {
                o.value == *value
                    || (o.value.as_integer().is_some() && o.value.as_integer() == value.as_integer())
            }),
            ControlKind::RangeSlider { min, max, .. } => match value.as_range() {
                Some((lo, hi)) => *min <= lo && lo <= hi && hi <= *max,
                None => false,
            },
        }
    }

    /// Number of choices (dropdown) or the span (slider), for summaries.
    pub fn domain_summary(&self) -> String {
        match &self.kind {
            ControlKind::Dropdown { options, .. } => format!("{} options", options.len()),
            ControlKind::RangeSlider { min, max, step, .. } => {
                format!("[{}, {}] step {}", Value::Number(*min), Value::Number(*max), Value::Number(*step))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Domain derivation
// ---------------------------------------------------------------------------

/// Dropdown over the distinct values of `column`, optionally led by an
/// "all" sentinel option. The sentinel becomes the default.
pub fn category_dropdown(
    table: &Table,
    id: &str,
    column: &str,
    all_sentinel: Option<&str>,
) -> Result<Control> {
    table.require_column(column)?;

    let mut options: Vec<DropdownOption> = all_sentinel.map(DropdownOption::text).into_iter().collect();
    options.extend(table.distinct(column).into_iter().map(|v| {
        let label = v.to_string();
        let value = match v {
            Value::Number(n) => ControlValue::Number(n),
            _ => ControlValue::Text(label.clone()),
        };
        DropdownOption { label, value }
    }));

    let control = Control::new(
        id,
        ControlKind::Dropdown {
            options,
            searchable: false,
        },
    );
    Ok(match all_sentinel {
        Some(all) => control.with_default(all),
        None => control,
    })
}

/// Dropdown over a fixed list of text choices.
pub fn static_dropdown(id: &str, choices: &[&str]) -> Control {
    Control::new(
        id,
        ControlKind::Dropdown {
            options: choices.iter().map(|c| DropdownOption::text(c)).collect(),
            searchable: false,
        },
    )
}

/// Widest year span a year dropdown will enumerate.
pub const MAX_YEAR_SPAN: f64 = 10_000.0;

/// Dropdown with one option per integer year from the column's minimum to
/// its maximum, inclusive.
///
/// Fails when the observed span exceeds [`MAX_YEAR_SPAN`] or is not finite.
pub fn year_dropdown(table: &Table, id: &str, column: &str) -> Result<Control> {
    table.require_numeric(column)?;

    let options = match table.numeric_range(column) {
        Some((lo, hi)) if !(hi - lo <= MAX_YEAR_SPAN) => anyhow::bail!(
            "column '{column}' spans {} to {}, too wide for a year dropdown (limit {} years)",
            Value::Number(lo),
            Value::Number(hi),
            MAX_YEAR_SPAN
        ),
        Some((lo, hi)) => (lo.ceil() as i64..=hi.floor() as i64)
            .map(|year| DropdownOption {
                label: year.to_string(),
                value: ControlValue::Number(year as f64),
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(Control::new(
        id,
        ControlKind::Dropdown {
            options,
            searchable: false,
        },
    ))
}

/// Slider bounds and tick layout.
#[derive(Debug, Clone, Copy)]
pub struct SliderLayout {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub mark_every: f64,
}

/// Range slider over `column`. The default selection spans the column's
/// observed minimum and maximum; an empty column defaults to the full
/// slider range.
pub fn range_slider(table: &Table, id: &str, column: &str, layout: SliderLayout) -> Result<Control> {
    table.require_numeric(column)?;

    let mut marks = Vec::new();
    if layout.mark_every > 0.0 {
        let mut tick = layout.min;
        while tick <= layout.max {
            marks.push(SliderMark {
                value: tick,
                label: Value::Number(tick).to_string(),
            });
            tick += layout.mark_every;
        }
    }

    let (lo, hi) = table
        .numeric_range(column)
        .unwrap_or((layout.min, layout.max));

    Ok(Control::new(
        id,
        ControlKind::RangeSlider {
            min: layout.min,
            max: layout.max,
            step: layout.step,
            marks,
        },
    )
    .with_default(ControlValue::Range(lo, hi)))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The controls of one dashboard, in page order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ControlRegistry {
    controls: Vec<Control>,
}

impl ControlRegistry {
    pub fn new(controls: Vec<Control>) -> Self {
        Self { controls }
    }

    pub fn get(&self, id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Every control at its default value.
    pub fn defaults(&self) -> ControlValues {
        self.controls
            .iter()
            .fold(ControlValues::new(), |values, c| values.with(c.id.clone(), c.default.clone()))
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
Launch Site,Payload Mass (kg),class
CCAFS LC-40,0,0
VAFB SLC-4E,9600,1
CCAFS LC-40,525,1
KSC LC-39A,3000,1
";
        read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn category_dropdown_puts_sentinel_first() {
        let control =
            category_dropdown(&launches(), "site-dropdown", "Launch Site", Some("All Sites")).unwrap();
        let ControlKind::Dropdown { options, .. } = &control.kind else {
            panic!("expected dropdown");
        };
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["All Sites", "CCAFS LC-40", "VAFB SLC-4E", "KSC LC-39A"]);
        assert_eq!(control.default, ControlValue::Text("All Sites".into()));
    }

    #[test]
    fn category_dropdown_requires_column() {
        assert!(category_dropdown(&launches(), "x", "Site", None).is_err());
    }

    #[test]
    fn range_slider_defaults_to_observed_range() {
        let layout = SliderLayout {
            min: 0.0,
            max: 10000.0,
            step: 1000.0,
            mark_every: 2500.0,
        };
        let control = range_slider(&launches(), "payload-slider", "Payload Mass (kg)", layout).unwrap();
        assert_eq!(control.default, ControlValue::Range(0.0, 9600.0));

        let ControlKind::RangeSlider { marks, .. } = &control.kind else {
            panic!("expected slider");
        };
        let ticks: Vec<f64> = marks.iter().map(|m| m.value).collect();
        assert_eq!(ticks, vec![0.0, 2500.0, 5000.0, 7500.0, 10000.0]);
        assert_eq!(marks[1].label, "2500");
    }

    #[test]
    fn range_slider_rejects_text_column() {
        let layout = SliderLayout {
            min: 0.0,
            max: 1.0,
            step: 1.0,
            mark_every: 0.0,
        };
        assert!(range_slider(&launches(), "s", "Launch Site", layout).is_err());
    }

    #[test]
    fn year_dropdown_spans_min_to_max() {
        let table = read_csv("Year\n1982\n1980\n1982\n".as_bytes()).unwrap();
        let control = year_dropdown(&table, "select-year", "Year").unwrap();
        let ControlKind::Dropdown { options, .. } = &control.kind else {
            panic!("expected dropdown");
        };
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["1980", "1981", "1982"]);
        assert!(control.default.is_unset());
    }

    #[test]
    fn year_dropdown_rejects_unbounded_span() {
        let table = read_csv("Year\n0\n1e10\n".as_bytes()).unwrap();
        let err = year_dropdown(&table, "select-year", "Year").err().unwrap();
        assert!(err.to_string().contains("too wide for a year dropdown"));

        let table = read_csv("Year\n1980\ninf\n".as_bytes()).unwrap();
        assert!(year_dropdown(&table, "select-year", "Year").is_err());
    }

    #[test]
    fn year_dropdown_allows_span_at_limit() {
        let table = read_csv("Year\n0\n10000\n".as_bytes()).unwrap();
        let control = year_dropdown(&table, "select-year", "Year").unwrap();
        let ControlKind::Dropdown { options, .. } = &control.kind else {
            panic!("expected dropdown");
        };
        assert_eq!(options.len(), 10_001);
    }

    #[test]
    fn accepts_checks_domain() {
        let slider = range_slider(
            &launches(),
            "p",
            "Payload Mass (kg)",
            SliderLayout {
                min: 0.0,
                max: 10000.0,
                step: 1000.0,
                mark_every: 2500.0,
            },
        )
        .unwrap();
        assert!(slider.accepts(&ControlValue::Range(0.0, 10000.0)));
        assert!(!slider.accepts(&ControlValue::Range(5000.0, 1000.0)));
        assert!(!slider.accepts(&ControlValue::Text("x".into())));
        assert!(slider.accepts(&ControlValue::Unset));

        let years = year_dropdown(&read_csv("Year\n1980\n1981\n".as_bytes()).unwrap(), "y", "Year").unwrap();
        assert!(years.accepts(&ControlValue::Text("1981".into())));
        assert!(!years.accepts(&ControlValue::Number(1979.0)));
    }

    #[test]
    fn registry_defaults_cover_every_control() {
        let registry = ControlRegistry::new(vec![
            static_dropdown("report", &["A", "B"]),
            category_dropdown(&launches(), "site", "Launch Site", Some("All Sites")).unwrap(),
        ]);
        let defaults = registry.defaults();
        assert!(defaults.get("report").is_unset());
        assert_eq!(defaults.get("site"), &ControlValue::Text("All Sites".into()));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("site").is_some());
    }
}
