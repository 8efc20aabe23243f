//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `chartboard serve`: load the dataset and run the dashboard host
//! - `chartboard controls`: list controls and their derived domains
//! - `chartboard render <output>`: compute one output and print its JSON
//! - `chartboard stats`: usage summary from the interaction log
//! - `chartboard health`: query a running host
//! - `chartboard config show|init|set|reset`: configuration management

use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;

use crate::analytics::events::EventLog;
use crate::analytics::reporter::{self, OutputUsage};
use crate::config::{self, ChartboardConfig};
use crate::controls::{ControlKind, ControlValue};
use crate::dashboard::{DashboardContext, DashboardRegistry};
use crate::web::{self, ServeOptions};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Load the configured dataset and build the dashboard context.
///
/// Any failure here (unknown dashboard, unreadable file, missing column) is
/// fatal: the caller must not go on to serve.
pub fn build_context(cfg: &ChartboardConfig) -> Result<DashboardContext> {
    let dashboard = DashboardRegistry::new().into_dashboard(&cfg.dashboard.kind)?;
    let path = cfg.dashboard.resolved_data_path();
    DashboardContext::load(dashboard, &path)
        .with_context(|| format!("cannot start dashboard '{}'", cfg.dashboard.kind))
}

// ---------------------------------------------------------------------------
// chartboard serve
// ---------------------------------------------------------------------------

pub fn run_serve(cfg: &ChartboardConfig) -> Result<()> {
    let ctx = build_context(cfg)?;
    let options = ServeOptions {
        debug: cfg.server.debug,
        open_browser: cfg.server.open_browser,
        log: EventLog::from_config(&cfg.logging),
    };
    web::serve(&cfg.server.addr(), &ctx, &options)
}

// ---------------------------------------------------------------------------
// chartboard controls
// ---------------------------------------------------------------------------

pub fn run_controls(cfg: &ChartboardConfig, format: OutputFormat) -> Result<()> {
    let ctx = build_context(cfg)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&ctx.layout())?);
        return Ok(());
    }

    println!("{}", ctx.dashboard().title().bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {:<22} {:<14} {:<20} Default",
        "Control", "Kind", "Domain"
    );
    println!("  {}", "-".repeat(58));
    for control in ctx.controls().iter() {
        let kind = match control.kind {
            ControlKind::Dropdown { .. } => "dropdown",
            ControlKind::RangeSlider { .. } => "range-slider",
        };
        println!(
            "  {:<22} {:<14} {:<20} {}",
            truncate(&control.id, 22),
            kind,
            control.domain_summary(),
            describe_value(&control.default).dimmed()
        );
    }
    println!();

    println!("{}", "Outputs".bold().cyan());
    for output in ctx.dashboard().outputs() {
        println!("  {:<32} <- {}", output.id, output.inputs.join(", "));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// chartboard render
// ---------------------------------------------------------------------------

/// Compute one output from the control defaults plus `sets` (`id=value`)
/// and print the resulting JSON.
pub fn run_render(cfg: &ChartboardConfig, output: &str, sets: &[String]) -> Result<()> {
    let ctx = build_context(cfg)?;

    if ctx.output(output).is_none() {
        let known: Vec<&str> = ctx.dashboard().outputs().iter().map(|o| o.id).collect();
        anyhow::bail!("unknown output '{output}' (known: {})", known.join(", "));
    }

    let mut values = ctx.controls().defaults();
    for set in sets {
        let (id, raw) = parse_assignment(set)?;
        let value = ControlValue::parse_cli(raw);
        match ctx.controls().get(id) {
            None => eprintln!("{} unknown control '{id}'", "warning:".yellow()),
            Some(control) if !control.accepts(&value) => eprintln!(
                "{} {} is outside the domain of '{id}'",
                "warning:".yellow(),
                describe_value(&value)
            ),
            Some(_) => {}
        }
        values.set(id, value);
    }

    let (value, elapsed_us) = web::compute_output(&ctx, &EventLog::disabled(), output, &values)
        .with_context(|| format!("output '{output}' produced no value"))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    eprintln!(
        "{}",
        format!("{} chart(s) in {elapsed_us}us", value.chart_count()).dimmed()
    );
    Ok(())
}

/// Split `id=value`.
fn parse_assignment(set: &str) -> Result<(&str, &str)> {
    set.split_once('=')
        .map(|(id, value)| (id.trim(), value))
        .with_context(|| format!("expected CONTROL=VALUE, got '{set}'"))
}

// ---------------------------------------------------------------------------
// chartboard stats
// ---------------------------------------------------------------------------

pub fn run_stats(cfg: &ChartboardConfig, format: OutputFormat) -> Result<()> {
    let log = EventLog::from_config(&cfg.logging);
    let usage = reporter::usage_by_output(&log.read_all());

    if usage.is_empty() {
        println!(
            "{}",
            "No interactions logged yet. Serve a dashboard and use it to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_usage_json(&usage)?,
        OutputFormat::Table => print_usage_table(&usage),
    }
    Ok(())
}

fn print_usage_table(usage: &[OutputUsage]) {
    println!("{}", "Output Usage".bold().cyan());
    println!("{}", "=".repeat(70));
    println!(
        "  {:<10} {:<32} {:>7} {:>8} {:>10}",
        "Dashboard", "Output", "Calls", "Empty", "Avg time"
    );
    println!("  {}", "-".repeat(68));

    for (i, u) in usage.iter().enumerate() {
        let line = format!(
            "  {:<10} {:<32} {:>7} {:>7.0}% {:>8.0}us",
            truncate(&u.dashboard, 10),
            truncate(&u.output, 32),
            u.count,
            u.empty_pct(),
            u.avg_duration_us,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_usage_json(usage: &[OutputUsage]) -> Result<()> {
    let value = serde_json::json!(usage
        .iter()
        .map(|u| serde_json::json!({
            "dashboard": u.dashboard,
            "output": u.output,
            "count": u.count,
            "empty": u.empty,
            "avg_duration_us": u.avg_duration_us,
        }))
        .collect::<Vec<_>>());
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// chartboard health
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct HealthReport {
    dashboard: String,
    title: String,
    rows: usize,
    #[serde(default)]
    source: Option<String>,
}

/// Check the local config and query a running host's `/api/health`.
pub fn run_health(cfg: &ChartboardConfig, url: Option<&str>) -> Result<()> {
    println!("{}", "chartboard Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.chartboard/config.toml found"
        } else {
            "not found (run `chartboard config init` to create)"
        },
    );

    let data_path = cfg.dashboard.resolved_data_path();
    print_health_item(
        "Dataset",
        data_path.exists(),
        &format!("{} ({})", data_path.display(), cfg.dashboard.kind),
    );

    let base = url
        .map(str::to_string)
        .unwrap_or_else(|| format!("http://{}", cfg.server.addr()));
    let endpoint = format!("{}/api/health", base.trim_end_matches('/'));

    match fetch_health(&endpoint) {
        Ok(report) => print_health_item(
            "Server",
            true,
            &format!(
                "{} '{}' serving {} rows{}",
                report.dashboard,
                report.title,
                report.rows,
                report
                    .source
                    .map(|s| format!(" from {s}"))
                    .unwrap_or_default()
            ),
        ),
        Err(e) => print_health_item("Server", false, &format!("not reachable at {base}: {e}")),
    }

    Ok(())
}

fn fetch_health(endpoint: &str) -> Result<HealthReport> {
    ureq::get(endpoint)
        .timeout(Duration::from_secs(5))
        .call()
        .context("health request failed")?
        .into_json()
        .context("failed to parse health response")
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// chartboard config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective chartboard Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    let mark = |exists: bool| if exists { "✓".green() } else { "·".dimmed() };
    println!("  {} {}", mark(global_exists), "~/.chartboard/config.toml".dimmed());
    println!("  {} {}", mark(project_exists), ".chartboard.toml".dimmed());
    println!("  {} {}", "·".dimmed(), "CHARTBOARD_* environment variables".dimmed());

    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    let path = config::set_config_value(key, value)?;
    println!(
        "{} Set {} = {} in {}",
        "✓".green().bold(),
        key.bold(),
        value,
        path.display()
    );
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn describe_value(value: &ControlValue) -> String {
    match value {
        ControlValue::Unset => "(unset)".to_string(),
        ControlValue::Text(s) => s.clone(),
        ControlValue::Number(n) => crate::table::Value::Number(*n).to_string(),
        ControlValue::Range(lo, hi) => format!("[{lo}, {hi}]"),
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
