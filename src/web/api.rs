//! JSON API handlers for the dashboard host.

use std::io::Cursor;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::analytics::events::{EventLog, InteractionEvent};
use crate::controls::ControlValues;
use crate::dashboard::{DashboardContext, OutputValue};

use super::{ServeOptions, content_type_json, error_response};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `POST /api/outputs/<id>` body.
#[derive(Debug, Default, Deserialize)]
struct OutputRequest {
    #[serde(default)]
    values: ControlValues,
}

#[derive(Serialize)]
struct OutputResponse<'a> {
    output: &'a str,
    value: OutputValue,
}

#[derive(Serialize)]
struct ColumnResponse {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
}

#[derive(Serialize)]
struct HealthResponse {
    dashboard: String,
    title: String,
    rows: usize,
    columns: Vec<ColumnResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

fn parse_output_request(body: &str) -> Result<OutputRequest> {
    if body.trim().is_empty() {
        return Ok(OutputRequest::default());
    }
    serde_json::from_str(body).context("invalid JSON in output request")
}

/// Compute one output, log it, and report the elapsed time.
///
/// Returns `None` for an output id the dashboard does not declare.
pub fn compute_output(
    ctx: &DashboardContext,
    log: &EventLog,
    output: &str,
    values: &ControlValues,
) -> Option<(OutputValue, u64)> {
    let spec = ctx.output(output)?;

    let started = Instant::now();
    let value = ctx.render(output, values)?;
    let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    log.record(&InteractionEvent::now(
        ctx.dashboard().id(),
        output,
        values.restrict_to(spec.inputs),
        &value,
        elapsed_us,
    ));

    Some((value, elapsed_us))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/layout`: title, controls with their domains, and outputs.
pub fn get_layout(ctx: &DashboardContext) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&ctx.layout())
}

/// `POST /api/outputs/<id>`: recompute one output.
///
/// Expects JSON body: `{ "values": { "site-dropdown": "All Sites", "payload-slider": [0, 10000] } }`
pub fn post_output(
    ctx: &DashboardContext,
    options: &ServeOptions,
    output: &str,
    body: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    if ctx.output(output).is_none() {
        return Ok(error_response(404, &format!("unknown output '{output}'")));
    }

    let request = match parse_output_request(body) {
        Ok(request) => request,
        Err(e) => return Ok(error_response(400, &format!("{e:#}"))),
    };

    let Some((value, elapsed_us)) = compute_output(ctx, &options.log, output, &request.values) else {
        return Ok(error_response(404, &format!("unknown output '{output}'")));
    };

    if options.debug {
        println!(
            "  {output}: {} chart(s) in {elapsed_us}us",
            value.chart_count()
        );
    }

    json_response(&OutputResponse { output, value })
}

/// `GET /api/health`: dataset summary.
pub fn get_health(ctx: &DashboardContext) -> Result<Response<Cursor<Vec<u8>>>> {
    let resp = HealthResponse {
        dashboard: ctx.dashboard().id().to_string(),
        title: ctx.dashboard().title().to_string(),
        rows: ctx.table().len(),
        columns: ctx
            .table()
            .columns()
            .iter()
            .map(|c| ColumnResponse {
                name: c.name.clone(),
                column_type: c.column_type.to_string(),
            })
            .collect(),
        source: ctx.source().map(|p| p.display().to_string()),
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
