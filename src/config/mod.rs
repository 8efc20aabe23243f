/// Configuration system for chartboard.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::ChartboardConfig::default()`]
/// 2. **User global config**: `~/.chartboard/config.toml`
/// 3. **Project local config**: `.chartboard.toml` in the current working directory
/// 4. **Environment variables**: `CHARTBOARD_*` overrides
///
/// Command-line flags are applied on top by the caller.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::ChartboardConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars. Each file only
/// overrides the keys it sets.
pub fn load() -> ChartboardConfig {
    let layers = [global_config_path(), project_config_path()]
        .into_iter()
        .filter_map(load_toml_file);
    let mut config = resolve(layers);

    apply_env_overrides(&mut config);

    config
}

/// Deep-merge TOML layers (later wins) over the built-in defaults.
fn resolve(layers: impl IntoIterator<Item = toml::Value>) -> ChartboardConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for layer in layers {
        merge(&mut merged, layer);
    }
    merged.try_into().unwrap_or_else(|e| {
        eprintln!("warning: ignoring merged config: {e}");
        ChartboardConfig::default()
    })
}

/// Overlay `overlay` onto `base`. Tables merge key by key; any other value
/// replaces what was there.
fn merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Load one TOML config layer, returning `None` if absent or malformed.
///
/// A layer is malformed when it is not valid TOML or does not fit the
/// schema on its own.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let layer = match toml::from_str::<toml::Value>(&content) {
        Ok(layer) => layer,
        Err(e) => {
            eprintln!("warning: ignoring malformed config {}: {e}", path.display());
            return None;
        }
    };
    if let Err(e) = layer.clone().try_into::<ChartboardConfig>() {
        eprintln!("warning: ignoring malformed config {}: {e}", path.display());
        return None;
    }
    Some(layer)
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.chartboard/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chartboard").join("config.toml"))
}

/// Path to the project local config: `.chartboard.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".chartboard.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Supported variables:
/// - `CHARTBOARD_HOST`: bind interface
/// - `CHARTBOARD_PORT`: bind port
/// - `CHARTBOARD_DEBUG`: debug mode (`1`/`true`/`yes`/`on`)
/// - `CHARTBOARD_DASHBOARD`: dashboard id
/// - `CHARTBOARD_DATA`: dataset path
/// - `CHARTBOARD_LOG`: interaction logging on/off
fn apply_env_overrides(config: &mut ChartboardConfig) {
    if let Ok(val) = std::env::var("CHARTBOARD_HOST")
        && !val.is_empty()
    {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("CHARTBOARD_PORT")
        && let Ok(port) = val.parse::<u16>()
    {
        config.server.port = port;
    }
    if let Ok(val) = std::env::var("CHARTBOARD_DEBUG") {
        config.server.debug = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("CHARTBOARD_DASHBOARD")
        && !val.is_empty()
    {
        config.dashboard.kind = val;
    }
    if let Ok(val) = std::env::var("CHARTBOARD_DATA")
        && !val.is_empty()
    {
        config.dashboard.data_path = val;
    }
    if let Ok(val) = std::env::var("CHARTBOARD_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.chartboard/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.chartboard/ directory")?;
    }

    fs::write(&path, ChartboardConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted config key (e.g. `server.port`) in the global file.
///
/// Starts from the existing file, or from the defaults when there is none.
pub fn set_config_value(key: &str, value: &str) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ChartboardConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value = toml::from_str(&content).context("failed to parse config as TOML")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values that would make the file unloadable.
    let updated = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<ChartboardConfig>(&updated)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(path)
}

/// Set a value in a TOML tree by dotted key, typed after the existing value.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be 'section.key', got '{key}'");
    };

    let mut current = root;
    for part in section.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults_tree() -> toml::Value {
        toml::from_str(&ChartboardConfig::default_toml()).unwrap()
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root = defaults_tree();
        set_toml_value(&mut root, "server.port", "9000").unwrap();
        assert_eq!(root["server"]["port"].as_integer(), Some(9000));
    }

    #[test]
    fn set_toml_value_updates_bool_and_string() {
        let mut root = defaults_tree();
        set_toml_value(&mut root, "server.debug", "on").unwrap();
        set_toml_value(&mut root, "dashboard.kind", "sales").unwrap();
        assert_eq!(root["server"]["debug"].as_bool(), Some(true));
        assert_eq!(root["dashboard"]["kind"].as_str(), Some("sales"));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root = defaults_tree();
        assert!(set_toml_value(&mut root, "server.port", "abc").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "server.nope", "x").is_err());
        assert!(set_toml_value(&mut root, "port", "1").is_err());
    }

    fn layer(toml_str: &str) -> toml::Value {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn project_layer_keeps_unrepeated_global_keys() {
        let global = layer("[server]\nport = 9000\ndebug = true\n");
        let project = layer("[dashboard]\nkind = \"sales\"\n");
        let config = resolve([global, project]);

        assert_eq!(config.server.port, 9000);
        assert!(config.server.debug);
        assert_eq!(config.dashboard.kind, "sales");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn later_layer_wins_per_key() {
        let global = layer("[server]\nport = 9000\nhost = \"0.0.0.0\"\n");
        let project = layer("[server]\nport = 9100\n");
        let config = resolve([global, project]);

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn merge_replaces_scalars_and_adds_keys() {
        let mut base = layer("[logging]\nenabled = true\n");
        merge(&mut base, layer("[logging]\nenabled = false\npath = \"/tmp/e.jsonl\"\n"));
        assert_eq!(base["logging"]["enabled"].as_bool(), Some(false));
        assert_eq!(base["logging"]["path"].as_str(), Some("/tmp/e.jsonl"));
    }

    #[test]
    fn no_layers_gives_defaults() {
        let config = resolve(Vec::<toml::Value>::new());
        assert_eq!(config.server.port, 8050);
        assert_eq!(config.dashboard.kind, "launches");
    }

    #[test]
    fn schema_mismatch_layer_is_skipped() {
        let dir = std::env::temp_dir().join(format!("chartboard-config-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();
        assert!(load_toml_file(Some(path.clone())).is_none());

        fs::write(&path, "[server]\nport = 9000\n").unwrap();
        assert!(load_toml_file(Some(path)).is_some());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn show_effective_config_round_trips() {
        let toml_str = show_effective_config().unwrap();
        let _: ChartboardConfig = toml::from_str(&toml_str).unwrap();
    }
}
