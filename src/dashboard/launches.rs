//! Launch records dashboard.
//!
//! One site dropdown (with an "All Sites" sentinel) and a payload range
//! slider feed a success pie chart and a payload-vs-outcome scatter chart.

use anyhow::Result;

use crate::aggregate::{self, Aggregate, COUNT_COLUMN, GroupBy};
use crate::chart::{ChartKind, ChartSpec};
use crate::controls::{self, ControlRegistry, ControlValues, SliderLayout};
use crate::query::{CategoryMode, Predicate, SelectionMapper};
use crate::table::Table;

use super::{Dashboard, OutputSpec, OutputTarget, OutputValue};

pub const SITE_COLUMN: &str = "Launch Site";
pub const PAYLOAD_COLUMN: &str = "Payload Mass (kg)";
pub const CLASS_COLUMN: &str = "class";
pub const BOOSTER_COLUMN: &str = "Booster Version Category";

pub const ALL_SITES: &str = "All Sites";

pub const SITE_DROPDOWN: &str = "site-dropdown";
pub const PAYLOAD_SLIDER: &str = "payload-slider";
pub const PIE_OUTPUT: &str = "success-pie-chart";
pub const SCATTER_OUTPUT: &str = "success-payload-scatter-chart";

const PAYLOAD_LAYOUT: SliderLayout = SliderLayout {
    min: 0.0,
    max: 10000.0,
    step: 1000.0,
    mark_every: 2500.0,
};

static OUTPUTS: [OutputSpec; 2] = [
    OutputSpec {
        id: PIE_OUTPUT,
        target: OutputTarget::Figure,
        inputs: &[SITE_DROPDOWN],
    },
    OutputSpec {
        id: SCATTER_OUTPUT,
        target: OutputTarget::Figure,
        inputs: &[SITE_DROPDOWN, PAYLOAD_SLIDER],
    },
];

pub struct LaunchesDashboard {
    mapper: SelectionMapper,
}

impl Default for LaunchesDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchesDashboard {
    pub fn new() -> Self {
        Self {
            mapper: SelectionMapper::new(SITE_COLUMN, ALL_SITES).with_range(PAYLOAD_COLUMN),
        }
    }

    /// Success pie: successes per site for the sentinel, success/failure
    /// split for a single site.
    pub fn success_pie(&self, table: &Table, values: &ControlValues) -> ChartSpec {
        match self.mapper.mode(values.get(SITE_DROPDOWN)) {
            Some(CategoryMode::One(site)) => {
                let rows = table.filter(&Predicate::equals(SITE_COLUMN, site.as_str()));
                let counts = aggregate::count_outcomes(&rows, CLASS_COLUMN);
                ChartSpec::encode(ChartKind::Pie, CLASS_COLUMN, COUNT_COLUMN)
                    .render(&counts, format!("Total Launches for site {site}"))
            }
            mode => {
                let successes = match mode {
                    Some(CategoryMode::All) => table.filter(&Predicate::equals(CLASS_COLUMN, 1.0)),
                    _ => table.empty_like(),
                };
                let counts = GroupBy::new(&[SITE_COLUMN], Aggregate::Count).apply(&successes);
                ChartSpec::encode(ChartKind::Pie, SITE_COLUMN, COUNT_COLUMN)
                    .render(&counts, "Total Success Launches by Site")
            }
        }
    }

    /// Payload vs. outcome scatter, colored by booster category.
    pub fn payload_scatter(&self, table: &Table, values: &ControlValues) -> ChartSpec {
        let query = self
            .mapper
            .map(values.get(SITE_DROPDOWN), values.get(PAYLOAD_SLIDER));
        let rows = query.apply(table);

        let title = match query.mode.as_ref().and_then(CategoryMode::name) {
            Some(site) => format!("Payload vs. Outcome for {site}"),
            None => format!("Payload vs. Outcome for {ALL_SITES}"),
        };

        ChartSpec::encode(ChartKind::Scatter, PAYLOAD_COLUMN, CLASS_COLUMN)
            .color(BOOSTER_COLUMN)
            .render(&rows, title)
    }
}

impl Dashboard for LaunchesDashboard {
    fn id(&self) -> &'static str {
        "launches"
    }

    fn title(&self) -> &'static str {
        "SpaceX Launch Records Dashboard"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[SITE_COLUMN, PAYLOAD_COLUMN, CLASS_COLUMN, BOOSTER_COLUMN]
    }

    fn controls(&self, table: &Table) -> Result<ControlRegistry> {
        table.require_numeric(CLASS_COLUMN)?;

        let site = controls::category_dropdown(table, SITE_DROPDOWN, SITE_COLUMN, Some(ALL_SITES))?
            .with_placeholder("Select a Launch Site here")
            .searchable();
        let payload = controls::range_slider(table, PAYLOAD_SLIDER, PAYLOAD_COLUMN, PAYLOAD_LAYOUT)?
            .with_label("Payload range (Kg):");

        Ok(ControlRegistry::new(vec![site, payload]))
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        &OUTPUTS
    }

    fn render(&self, table: &Table, output: &str, values: &ControlValues) -> Option<OutputValue> {
        match output {
            PIE_OUTPUT => Some(OutputValue::Chart(self.success_pie(table, values))),
            SCATTER_OUTPUT => Some(OutputValue::Chart(self.payload_scatter(table, values))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlValue;
    use crate::table::read_csv;

    fn table() -> Table {
        let csv = "\
Launch Site,Payload Mass (kg),class,Booster Version Category
CCAFS LC-40,0,0,v1.0
CCAFS LC-40,2000,1,FT
VAFB SLC-4E,9600,1,FT
";
        read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn unset_site_renders_empty_pie() {
        let spec = LaunchesDashboard::new().success_pie(&table(), &ControlValues::new());
        assert!(spec.is_empty());
        assert_eq!(spec.kind, ChartKind::Pie);
    }

    #[test]
    fn site_pie_title_names_the_site() {
        let values = ControlValues::new().with(SITE_DROPDOWN, "VAFB SLC-4E");
        let spec = LaunchesDashboard::new().success_pie(&table(), &values);
        assert_eq!(spec.title, "Total Launches for site VAFB SLC-4E");
        assert_eq!(spec.point_count(), 1);
    }

    #[test]
    fn scatter_respects_payload_range() {
        let values = ControlValues::new()
            .with(SITE_DROPDOWN, ALL_SITES)
            .with(PAYLOAD_SLIDER, ControlValue::Range(0.0, 2000.0));
        let spec = LaunchesDashboard::new().payload_scatter(&table(), &values);
        assert_eq!(spec.point_count(), 2);
        assert_eq!(spec.title, "Payload vs. Outcome for All Sites");
        assert_eq!(spec.color.as_deref(), Some(BOOSTER_COLUMN));
    }

    #[test]
    fn unknown_output_is_none() {
        let d = LaunchesDashboard::new();
        assert!(d.render(&table(), "output-container", &ControlValues::new()).is_none());
    }
}
