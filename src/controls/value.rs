//! Current control values, as supplied by the page on every change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The current value of one control.
///
/// Deserialized leniently from JSON: `null`, empty strings, and shapes no
/// control produces all read as [`ControlValue::Unset`] instead of failing,
/// so a half-initialised page still gets a well-formed answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum ControlValue {
    /// Placeholder: nothing selected yet.
    #[default]
    Unset,
    Text(String),
    Number(f64),
    /// Closed interval `[low, high]` from a range slider.
    Range(f64, f64),
}

impl ControlValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Range(lo, hi) => Some((*lo, *hi)),
            _ => None,
        }
    }

    /// Integer reading of the value; accepts numbers and numeric strings.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Parse a `--set` style CLI value: `a..b` or `a,b` is a range, a number
    /// is a number, the empty string is unset, anything else is text.
    pub fn parse_cli(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Unset;
        }
        let pair = raw.split_once("..").or_else(|| raw.split_once(','));
        if let Some((lo, hi)) = pair
            && let (Ok(lo), Ok(hi)) = (lo.trim().parse::<f64>(), hi.trim().parse::<f64>())
        {
            return Self::Range(lo, hi);
        }
        match raw.parse::<f64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(raw.to_string()),
        }
    }
}

impl From<serde_json::Value> for ControlValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match value {
            J::String(s) if s.is_empty() => Self::Unset,
            J::String(s) => Self::Text(s),
            J::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Unset),
            J::Array(items) => match items.as_slice() {
                [lo, hi] => match (lo.as_f64(), hi.as_f64()) {
                    (Some(lo), Some(hi)) => Self::Range(lo, hi),
                    _ => Self::Unset,
                },
                _ => Self::Unset,
            },
            _ => Self::Unset,
        }
    }
}

impl From<ControlValue> for serde_json::Value {
    fn from(value: ControlValue) -> Self {
        match value {
            ControlValue::Unset => serde_json::Value::Null,
            ControlValue::Text(s) => serde_json::Value::String(s),
            ControlValue::Number(n) => serde_json::json!(n),
            ControlValue::Range(lo, hi) => serde_json::json!([lo, hi]),
        }
    }
}

impl From<&str> for ControlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for ControlValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Every control's current value, keyed by control id.
///
/// Missing ids read as [`ControlValue::Unset`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlValues(BTreeMap<String, ControlValue>);

static UNSET: ControlValue = ControlValue::Unset;

impl ControlValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> &ControlValue {
        self.0.get(id).unwrap_or(&UNSET)
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<ControlValue>) {
        self.0.insert(id.into(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, id: impl Into<String>, value: impl Into<ControlValue>) -> Self {
        self.set(id, value);
        self
    }

    /// Only the values for the given ids; other entries are dropped.
    pub fn restrict_to(&self, ids: &[&str]) -> Self {
        Self(
            ids.iter()
                .map(|id| (id.to_string(), self.get(id).clone()))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ControlValue)> {
        self.0.iter()
    }
}
