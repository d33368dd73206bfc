//! Configuration for mdjson.
//!
//! The config file is `mdjson.toml`, looked up in the working directory and
//! then under `~/.mdjson/`. CLI flags override config file values, which
//! override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MdJsonError, Result};
use crate::types::{CollisionPolicy, DEFAULT_OUTPUT_NAME, OutputMode};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "mdjson.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mdjson";

// ---------------------------------------------------------------------------
// Config structs (matching mdjson.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Options handed to the Markdown renderer.
    #[serde(default)]
    pub renderer: RenderOptions,
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Per-file or consolidated output.
    #[serde(default)]
    pub mode: OutputMode,

    /// Path of the consolidated document.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Behaviour when two documents map to the same tree key.
    #[serde(default)]
    pub collisions: CollisionPolicy,

    /// Pretty-print emitted JSON.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            filename: default_filename(),
            collisions: CollisionPolicy::default(),
            pretty: false,
        }
    }
}

fn default_filename() -> String {
    DEFAULT_OUTPUT_NAME.into()
}

/// `[renderer]` section.
///
/// A fixed set of typed options plus an open bag of extra entries that is
/// forwarded to the renderer as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Convert straight quotes and dashes into typographic equivalents.
    #[serde(default)]
    pub smartypants: bool,

    /// GitHub-flavoured extensions (tables, strikethrough, task lists, footnotes).
    #[serde(default = "default_true")]
    pub gfm: bool,

    /// Render soft line breaks as `<br />`.
    #[serde(default)]
    pub breaks: bool,

    /// Everything else, passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            smartypants: false,
            gfm: true,
            breaks: false,
            extra: BTreeMap::new(),
        }
    }
}

impl RenderOptions {
    /// Defaults with `smartypants` switched on.
    pub fn smartypants() -> Self {
        Self {
            smartypants: true,
            ..Self::default()
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Transform config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime transform configuration — merged from config file + CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformConfig {
    /// How a batch is emitted.
    pub mode: OutputMode,
    /// Consolidated output path.
    pub output_name: String,
    /// Tree collision behaviour.
    pub collisions: CollisionPolicy,
    /// Pretty-print emitted JSON.
    pub pretty: bool,
    /// Renderer options.
    pub renderer: RenderOptions,
    /// Stop a batch at its first failed document.
    pub fail_fast: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for TransformConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            mode: config.output.mode,
            output_name: config.output.filename.clone(),
            collisions: config.output.collisions,
            pretty: config.output.pretty,
            renderer: config.renderer.clone(),
            fail_fast: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.mdjson/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| MdJsonError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Resolve which config file applies, if any.
///
/// An explicit path always wins; otherwise `./mdjson.toml`, then
/// `~/.mdjson/mdjson.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    config_dir()
        .ok()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

/// Load the application config. Returns defaults if no file is found.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match resolve_config_path(explicit) {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MdJsonError::io(path, e))?;
    tracing::debug!(path = %path.display(), "loading config");
    parse_config(&content)
        .map_err(|e| MdJsonError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Parse config from TOML text.
pub fn parse_config(content: &str) -> std::result::Result<AppConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Write a default config file at `path`. Refuses to overwrite an existing file.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(MdJsonError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MdJsonError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| MdJsonError::config(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| MdJsonError::io(path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("content.json"));
        assert!(toml_str.contains("per-file"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed = parse_config(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn renderer_extras_are_kept() {
        let toml_str = r#"
[output]
mode = "consolidated"
filename = "blog.json"

[renderer]
smartypants = true
footnotes = false
langPrefix = "lang-"
"#;
        let config = parse_config(toml_str).expect("parse");
        assert_eq!(config.output.mode, OutputMode::Consolidated);
        assert_eq!(config.output.filename, "blog.json");
        assert!(config.renderer.smartypants);
        assert!(config.renderer.gfm);
        assert_eq!(config.renderer.extra.get("footnotes"), Some(&Value::Bool(false)));
        assert_eq!(
            config.renderer.extra.get("langPrefix"),
            Some(&Value::String("lang-".into()))
        );
    }

    #[test]
    fn mistyped_known_option_is_rejected() {
        let toml_str = r#"
[renderer]
smartypants = "yes"
"#;
        assert!(parse_config(toml_str).is_err());
    }

    #[test]
    fn transform_config_from_app_config() {
        let mut app = AppConfig::default();
        app.output.collisions = CollisionPolicy::Reject;
        let transform = TransformConfig::from(&app);
        assert_eq!(transform.mode, OutputMode::PerFile);
        assert_eq!(transform.output_name, "content.json");
        assert_eq!(transform.collisions, CollisionPolicy::Reject);
        assert!(!transform.renderer.smartypants);
        assert!(!transform.fail_fast);
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = Path::new("/nonexistent/custom.toml");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
        assert!(load_config(Some(path)).is_err());
    }
}
