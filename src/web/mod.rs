//! Embedded web host for a dashboard.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page dashboard UI
//! - JSON API endpoints for the layout, output computation, and health
//!
//! Requests are handled one at a time, so every output invocation runs to
//! completion before the next interaction is accepted.

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use colored::Colorize;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::analytics::events::EventLog;
use crate::dashboard::DashboardContext;

pub use api::compute_output;

/// Host behaviour toggles.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Print per-output timings.
    pub debug: bool,
    pub open_browser: bool,
    pub log: EventLog,
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Bind the HTTP server without starting the request loop.
pub fn bind(addr: &str) -> Result<Server> {
    Server::http(addr).map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))
}

/// Bind to `addr` and serve `ctx` until the process is stopped.
pub fn serve(addr: &str, ctx: &DashboardContext, options: &ServeOptions) -> Result<()> {
    let server = bind(addr)?;

    println!(
        "{} {} ({} rows)",
        ctx.dashboard().title().bold().cyan(),
        format!("running at http://{addr}").green(),
        ctx.table().len()
    );
    if let Some(path) = options.log.path() {
        println!("Logging interactions to {}", path.display());
    }
    println!("Press Ctrl+C to stop.\n");

    if options.open_browser {
        let _ = open_browser(&format!("http://{addr}"));
    }

    run(&server, ctx, options)
}

/// Handle requests on an already-bound server, sequentially.
///
/// Errors are answered per request without stopping the loop.
pub fn run(server: &Server, ctx: &DashboardContext, options: &ServeOptions) -> Result<()> {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            Some(read_body(&mut request))
        } else {
            None
        };

        let response = match body.transpose() {
            Err(e) => error_response(400, &format!("{e:#}")),
            Ok(body) => match dispatch(ctx, options, &method, &url, body.as_deref()) {
                Ok(resp) => resp,
                Err(e) => error_response(500, &format!("{e:#}")),
            },
        };
        let status = response.status_code().0;
        let _ = request.respond(response);

        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

/// Read the whole request body as UTF-8.
fn read_body(request: &mut Request) -> Result<String> {
    let mut buf = Vec::new();
    request
        .as_reader()
        .read_to_end(&mut buf)
        .context("failed to read request body")?;
    String::from_utf8(buf).context("request body is not valid UTF-8")
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn dispatch(
    ctx: &DashboardContext,
    options: &ServeOptions,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        (&Method::Get, "/api/layout") => api::get_layout(ctx),
        (&Method::Get, "/api/health") => api::get_health(ctx),
        (&Method::Post, p) if p.starts_with("/api/outputs/") => {
            let id = &p["/api/outputs/".len()..];
            api::post_output(ctx, options, id, body.unwrap_or_default())
        }

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    error_response(404, "not found")
}

/// JSON `{"error": ...}` with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header is valid")
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header is valid")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
