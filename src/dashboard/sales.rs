//! Automobile sales dashboard.
//!
//! A report dropdown chooses between yearly and recession-period
//! statistics; a year dropdown (enabled only for the yearly report) picks the
//! year. Each report fills a 2x2 grid of charts.

use anyhow::Result;

use crate::aggregate::{Aggregate, GroupBy};
use crate::chart::{ChartKind, ChartSpec};
use crate::controls::{self, ControlRegistry, ControlValue, ControlValues};
use crate::query::Predicate;
use crate::table::Table;

use super::{Dashboard, OutputSpec, OutputTarget, OutputValue};

pub const YEAR_COLUMN: &str = "Year";
pub const MONTH_COLUMN: &str = "Month";
pub const VEHICLE_COLUMN: &str = "Vehicle_Type";
pub const SALES_COLUMN: &str = "Automobile_Sales";
pub const ADVERTISING_COLUMN: &str = "Advertising_Expenditure";
pub const RECESSION_COLUMN: &str = "Recession";
pub const UNEMPLOYMENT_COLUMN: &str = "unemployment_rate";

pub const YEARLY_REPORT: &str = "Yearly Statistics";
pub const RECESSION_REPORT: &str = "Recession Period Statistics";

pub const REPORT_DROPDOWN: &str = "dropdown-statistics";
pub const YEAR_DROPDOWN: &str = "select-year";
pub const REPORT_OUTPUT: &str = "output-container";
pub const YEAR_DISABLED_OUTPUT: &str = "select-year-disabled";

static OUTPUTS: [OutputSpec; 2] = [
    OutputSpec {
        id: YEAR_DISABLED_OUTPUT,
        target: OutputTarget::ControlDisabled(YEAR_DROPDOWN),
        inputs: &[REPORT_DROPDOWN],
    },
    OutputSpec {
        id: REPORT_OUTPUT,
        target: OutputTarget::Grid,
        inputs: &[REPORT_DROPDOWN, YEAR_DROPDOWN],
    },
];

/// Which report the statistics dropdown selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Yearly,
    Recession,
}

impl Report {
    /// `None` for the placeholder or any unrecognized value.
    pub fn from_value(value: &ControlValue) -> Option<Self> {
        match value.as_text()? {
            YEARLY_REPORT => Some(Self::Yearly),
            RECESSION_REPORT => Some(Self::Recession),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SalesDashboard;

impl SalesDashboard {
    pub fn new() -> Self {
        Self
    }

    /// The year dropdown is usable only for the yearly report.
    pub fn year_disabled(report: &ControlValue) -> bool {
        Report::from_value(report) != Some(Report::Yearly)
    }

    /// Charts for the selected report, or `None` when the selection does not
    /// name a report (or names the yearly report without a valid year).
    pub fn report(&self, table: &Table, values: &ControlValues) -> Option<Vec<ChartSpec>> {
        match Report::from_value(values.get(REPORT_DROPDOWN))? {
            Report::Recession => Some(recession_charts(table)),
            Report::Yearly => {
                let year = values.get(YEAR_DROPDOWN).as_integer()?;
                Some(yearly_charts(table, year))
            }
        }
    }
}

/// Recession-period report. Only rows flagged as recession are used; the
/// year selection plays no part.
fn recession_charts(table: &Table) -> Vec<ChartSpec> {
    let recession = table.filter(&Predicate::equals(RECESSION_COLUMN, 1.0));

    let by_year = GroupBy::new(&[YEAR_COLUMN], Aggregate::Mean(SALES_COLUMN)).apply(&recession);
    let by_vehicle = GroupBy::new(&[VEHICLE_COLUMN], Aggregate::Mean(SALES_COLUMN)).apply(&recession);
    let advertising = GroupBy::new(&[VEHICLE_COLUMN], Aggregate::Sum(ADVERTISING_COLUMN)).apply(&recession);
    let unemployment = GroupBy::new(
        &[VEHICLE_COLUMN, UNEMPLOYMENT_COLUMN],
        Aggregate::Mean(SALES_COLUMN),
    )
    .apply(&recession);

    vec![
        ChartSpec::encode(ChartKind::Line, YEAR_COLUMN, SALES_COLUMN).render(
            &by_year,
            "Average Automobile Sales fluctuation over Recession Period",
        ),
        ChartSpec::encode(ChartKind::Bar, VEHICLE_COLUMN, SALES_COLUMN).render(
            &by_vehicle,
            "Average Vehicles Sold by Vehicle Type (Recession)",
        ),
        ChartSpec::encode(ChartKind::Pie, VEHICLE_COLUMN, ADVERTISING_COLUMN).render(
            &advertising,
            "Total Advertising Expenditure by Vehicle Type (Recession)",
        ),
        ChartSpec::encode(ChartKind::Bar, VEHICLE_COLUMN, SALES_COLUMN)
            .color(UNEMPLOYMENT_COLUMN)
            .render(
                &unemployment,
                "Effect of Unemployment Rate on Vehicle Type and Sales (Recession)",
            ),
    ]
}

/// Yearly report for `year`. The trend chart covers every year; the other
/// three use only that year's rows.
fn yearly_charts(table: &Table, year: i64) -> Vec<ChartSpec> {
    let trend = GroupBy::new(&[YEAR_COLUMN], Aggregate::Mean(SALES_COLUMN))
        .sorted()
        .apply(table);

    let rows = table.filter(&Predicate::equals(YEAR_COLUMN, year as f64));
    let monthly = GroupBy::new(&[MONTH_COLUMN], Aggregate::Sum(SALES_COLUMN)).apply(&rows);
    let by_vehicle = GroupBy::new(&[VEHICLE_COLUMN], Aggregate::Mean(SALES_COLUMN)).apply(&rows);
    let advertising = GroupBy::new(&[VEHICLE_COLUMN], Aggregate::Sum(ADVERTISING_COLUMN)).apply(&rows);

    vec![
        ChartSpec::encode(ChartKind::Line, YEAR_COLUMN, SALES_COLUMN)
            .render(&trend, "Average Automobile Sales Over All Years"),
        ChartSpec::encode(ChartKind::Line, MONTH_COLUMN, SALES_COLUMN)
            .render(&monthly, format!("Total Monthly Automobile Sales for {year}")),
        ChartSpec::encode(ChartKind::Bar, VEHICLE_COLUMN, SALES_COLUMN)
            .render(&by_vehicle, format!("Average Vehicles Sold by Vehicle Type in {year}")),
        ChartSpec::encode(ChartKind::Pie, VEHICLE_COLUMN, ADVERTISING_COLUMN)
            .render(&advertising, format!("Advertising Expenditure by Vehicle Type in {year}")),
    ]
}

impl Dashboard for SalesDashboard {
    fn id(&self) -> &'static str {
        "sales"
    }

    fn title(&self) -> &'static str {
        "Automobile Sales Statistics Dashboard"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[
            YEAR_COLUMN,
            MONTH_COLUMN,
            VEHICLE_COLUMN,
            SALES_COLUMN,
            ADVERTISING_COLUMN,
            RECESSION_COLUMN,
            UNEMPLOYMENT_COLUMN,
        ]
    }

    fn controls(&self, table: &Table) -> Result<ControlRegistry> {
        for column in [SALES_COLUMN, ADVERTISING_COLUMN, RECESSION_COLUMN] {
            table.require_numeric(column)?;
        }

        let report = controls::static_dropdown(REPORT_DROPDOWN, &[YEARLY_REPORT, RECESSION_REPORT])
            .with_label("Select Statistics:")
            .with_placeholder("Select a report type");
        let year = controls::year_dropdown(table, YEAR_DROPDOWN, YEAR_COLUMN)?.with_placeholder("Select-year");

        Ok(ControlRegistry::new(vec![report, year]))
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        &OUTPUTS
    }

    fn render(&self, table: &Table, output: &str, values: &ControlValues) -> Option<OutputValue> {
        match output {
            YEAR_DISABLED_OUTPUT => Some(OutputValue::Disabled(Self::year_disabled(
                values.get(REPORT_DROPDOWN),
            ))),
            REPORT_OUTPUT => Some(match self.report(table, values) {
                Some(charts) => OutputValue::Charts(charts),
                None => OutputValue::Empty,
            }),
            _ => None,
        }
    }
}
