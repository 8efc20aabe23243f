//! Dashboards: named outputs wired from the pipeline stages.
//!
//! Each dashboard declares its required columns, its controls, and a set of
//! outputs. An output is a pure function from the current values of its
//! declared input controls to an [`OutputValue`]; the host decides when to
//! call it.

pub mod launches;
pub mod sales;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::chart::ChartSpec;
use crate::controls::{ControlRegistry, ControlValues};
use crate::table::{self, Table};

pub use launches::LaunchesDashboard;
pub use sales::SalesDashboard;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// What an output produced for one set of control values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum OutputValue {
    Chart(ChartSpec),
    /// Ordered charts for a region hosting several.
    Charts(Vec<ChartSpec>),
    /// New `disabled` state of a control.
    Disabled(bool),
    /// Nothing to show for the current selection.
    Empty,
}

impl OutputValue {
    /// Number of charts carried.
    pub fn chart_count(&self) -> usize {
        match self {
            Self::Chart(_) => 1,
            Self::Charts(charts) => charts.len(),
            Self::Disabled(_) | Self::Empty => 0,
        }
    }

    /// Whether there is nothing to show: [`OutputValue::Empty`], or charts
    /// without a single point. A control state is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Chart(chart) => chart.is_empty(),
            Self::Charts(charts) => charts.iter().all(ChartSpec::is_empty),
            Self::Disabled(_) => false,
            Self::Empty => true,
        }
    }
}

/// Where an output's value lands on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "control", rename_all = "kebab-case")]
pub enum OutputTarget {
    /// A single chart region.
    Figure,
    /// A region laid out as a grid of charts.
    Grid,
    /// The `disabled` property of the named control.
    ControlDisabled(&'static str),
}

/// Declaration of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub id: &'static str,
    pub target: OutputTarget,
    /// Control ids whose values the output reads.
    pub inputs: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// Dashboard trait
// ---------------------------------------------------------------------------

/// A dashboard definition.
///
/// Implementations are stateless; the loaded data lives in a
/// [`DashboardContext`].
pub trait Dashboard: Send + Sync {
    fn id(&self) -> &'static str;
    fn title(&self) -> &'static str;

    /// Columns the dataset must provide.
    fn required_columns(&self) -> &'static [&'static str];

    /// Declare controls, deriving their domains from `table`.
    fn controls(&self, table: &Table) -> Result<ControlRegistry>;

    fn outputs(&self) -> &'static [OutputSpec];

    /// Compute `output` for the given values. Returns `None` for an output
    /// id this dashboard does not declare.
    fn render(&self, table: &Table, output: &str, values: &ControlValues) -> Option<OutputValue>;
}

/// Known dashboard definitions.
pub struct DashboardRegistry {
    dashboards: Vec<Box<dyn Dashboard>>,
}

impl Default for DashboardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardRegistry {
    pub fn new() -> Self {
        Self {
            dashboards: vec![Box::new(LaunchesDashboard::new()), Box::new(SalesDashboard::new())],
        }
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.dashboards.iter().map(|d| d.id()).collect()
    }

    /// Take the dashboard with the given id out of the registry.
    pub fn into_dashboard(self, id: &str) -> Result<Box<dyn Dashboard>> {
        let known = self.ids().join(", ");
        self.dashboards
            .into_iter()
            .find(|d| d.id() == id)
            .with_context(|| format!("unknown dashboard '{id}' (known: {known})"))
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a dashboard needs at request time, built once at startup.
///
/// Immutable after construction and passed by reference into every output
/// invocation.
pub struct DashboardContext {
    dashboard: Box<dyn Dashboard>,
    table: Table,
    controls: ControlRegistry,
    source: Option<PathBuf>,
}

/// Page description served to the frontend.
#[derive(Debug, Serialize)]
pub struct Layout<'a> {
    pub dashboard: &'static str,
    pub title: &'static str,
    pub controls: &'a ControlRegistry,
    pub outputs: &'static [OutputSpec],
}

impl DashboardContext {
    /// Validate `table` against the dashboard and derive its controls.
    ///
    /// Fails if a required column is missing or has the wrong type.
    pub fn new(dashboard: Box<dyn Dashboard>, table: Table) -> Result<Self> {
        for column in dashboard.required_columns() {
            table
                .require_column(column)
                .with_context(|| format!("dataset does not fit dashboard '{}'", dashboard.id()))?;
        }
        let controls = dashboard
            .controls(&table)
            .with_context(|| format!("failed to build controls for dashboard '{}'", dashboard.id()))?;

        Ok(Self {
            dashboard,
            table,
            controls,
            source: None,
        })
    }

    /// Load the dataset at `path` and build the context.
    pub fn load(dashboard: Box<dyn Dashboard>, path: &Path) -> Result<Self> {
        let table = table::load_csv(path)?;
        let mut ctx = Self::new(dashboard, table)?;
        ctx.source = Some(path.to_path_buf());
        Ok(ctx)
    }

    pub fn dashboard(&self) -> &dyn Dashboard {
        self.dashboard.as_ref()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn output(&self, id: &str) -> Option<&'static OutputSpec> {
        self.dashboard.outputs().iter().find(|o| o.id == id)
    }

    pub fn layout(&self) -> Layout<'_> {
        Layout {
            dashboard: self.dashboard.id(),
            title: self.dashboard.title(),
            controls: &self.controls,
            outputs: self.dashboard.outputs(),
        }
    }

    /// Compute an output from the current control values.
    ///
    /// Only the output's declared inputs are passed through; anything else
    /// in `values` is ignored. Returns `None` for an unknown output id.
    pub fn render(&self, output: &str, values: &ControlValues) -> Option<OutputValue> {
        let spec = self.output(output)?;
        let inputs = values.restrict_to(spec.inputs);
        self.dashboard.render(&self.table, output, &inputs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_csv;

    const LAUNCH_CSV: &str = "\
Launch Site,Payload Mass (kg),class,Booster Version Category
CCAFS LC-40,0,0,v1.0
KSC LC-39A,5300,1,FT
";

    #[test]
    fn registry_knows_both_dashboards() {
        let registry = DashboardRegistry::new();
        assert_eq!(registry.ids(), vec!["launches", "sales"]);
        assert!(DashboardRegistry::new().into_dashboard("sales").is_ok());
        let err = DashboardRegistry::new().into_dashboard("weather").err().unwrap();
        assert!(err.to_string().contains("unknown dashboard 'weather'"));
    }

    #[test]
    fn context_rejects_missing_columns() {
        let table = read_csv("Launch Site,class\nA,1\n".as_bytes()).unwrap();
        let dashboard = DashboardRegistry::new().into_dashboard("launches").unwrap();
        let err = DashboardContext::new(dashboard, table).err().unwrap();
        assert!(format!("{err:#}").contains("Payload Mass (kg)"));
    }

    #[test]
    fn unknown_output_renders_none() {
        let table = read_csv(LAUNCH_CSV.as_bytes()).unwrap();
        let ctx = DashboardContext::new(Box::new(LaunchesDashboard::new()), table).unwrap();
        assert!(ctx.render("nope", &ControlValues::new()).is_none());
    }

    #[test]
    fn layout_serializes_controls_and_outputs() {
        let table = read_csv(LAUNCH_CSV.as_bytes()).unwrap();
        let ctx = DashboardContext::new(Box::new(LaunchesDashboard::new()), table).unwrap();
        let json = serde_json::to_value(ctx.layout()).unwrap();

        assert_eq!(json["dashboard"], "launches");
        assert_eq!(json["controls"][0]["id"], "site-dropdown");
        assert_eq!(json["controls"][1]["kind"]["type"], "range-slider");
        assert_eq!(json["outputs"][0]["target"]["kind"], "figure");
    }

    #[test]
    fn output_value_emptiness() {
        let table = read_csv(LAUNCH_CSV.as_bytes()).unwrap();
        let ctx = DashboardContext::new(Box::new(LaunchesDashboard::new()), table).unwrap();

        let unset = ctx.render("success-pie-chart", &ControlValues::new()).unwrap();
        assert_eq!(unset.chart_count(), 1);
        assert!(unset.is_empty());

        let all = ControlValues::new().with("site-dropdown", "All Sites");
        assert!(!ctx.render("success-pie-chart", &all).unwrap().is_empty());

        assert!(!OutputValue::Disabled(true).is_empty());
        assert!(OutputValue::Empty.is_empty());
        assert!(OutputValue::Charts(Vec::new()).is_empty());
    }

    #[test]
    fn output_value_serializes_tagged() {
        let json = serde_json::to_string(&OutputValue::Disabled(true)).unwrap();
        assert_eq!(json, r#"{"type":"disabled","value":true}"#);
        let json = serde_json::to_string(&OutputValue::Empty).unwrap();
        assert_eq!(json, r#"{"type":"empty"}"#);
    }
}
