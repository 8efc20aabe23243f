use anyhow::Result;
use clap::{Parser, Subcommand};

use chartboard::cli;
use chartboard::config::{self, ChartboardConfig};

#[derive(Debug, Parser)]
#[command(name = "chartboard")]
#[command(about = "Interactive data dashboards over CSV datasets")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

/// Dataset selection shared by the commands that load one.
#[derive(Debug, clap::Args)]
struct DataArgs {
    /// Dashboard to load: launches, sales
    #[arg(long)]
    dashboard: Option<String>,
    /// CSV dataset path (defaults to `<dashboard>.csv`)
    #[arg(long)]
    data: Option<String>,
}

impl DataArgs {
    fn apply(self, cfg: &mut ChartboardConfig) {
        if let Some(kind) = self.dashboard {
            cfg.dashboard.kind = kind;
            // A dashboard switch without --data falls back to `<kind>.csv`.
            if self.data.is_none() {
                cfg.dashboard.data_path.clear();
            }
        }
        if let Some(data) = self.data {
            cfg.dashboard.data_path = data;
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the dataset and serve the dashboard in the browser
    Serve {
        #[command(flatten)]
        data: DataArgs,
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
        /// Print per-output timings
        #[arg(long)]
        debug: bool,
        /// Do not open a browser window
        #[arg(long)]
        no_browser: bool,
    },
    /// List controls with their derived domains and the outputs they drive
    Controls {
        #[command(flatten)]
        data: DataArgs,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Compute one output and print its JSON
    Render {
        /// Output id, e.g. success-pie-chart
        output: String,
        /// Control assignment CONTROL=VALUE (ranges as `low..high`); repeatable
        #[arg(long = "set", value_name = "CONTROL=VALUE")]
        sets: Vec<String>,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Show output usage from the interaction log
    Stats {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config, dataset, and a running host
    Health {
        /// Base URL of the host (defaults to the configured address)
        #[arg(long)]
        url: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.chartboard/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a config value, e.g. `server.port 8060`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let mut cfg = config::load();

    match app.command {
        Commands::Serve {
            data,
            host,
            port,
            debug,
            no_browser,
        } => {
            data.apply(&mut cfg);
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            cfg.server.debug |= debug;
            if no_browser {
                cfg.server.open_browser = false;
            }
            cli::run_serve(&cfg)
        }
        Commands::Controls { data, format } => {
            data.apply(&mut cfg);
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_controls(&cfg, fmt)
        }
        Commands::Render { output, sets, data } => {
            data.apply(&mut cfg);
            cli::run_render(&cfg, &output, &sets)
        }
        Commands::Stats { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(&cfg, fmt)
        }
        Commands::Health { url } => cli::run_health(&cfg, url.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
