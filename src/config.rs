//! Viewer configuration.
//!
//! Loaded from a TOML file (default `catalog-view.toml`). The file is sparse:
//! stock defaults are serialised to a TOML table, the user file is merged on
//! top key by key, and the result is deserialised and validated. A missing
//! file means "all defaults".
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:5000"
//! export_path = "/admin/download-xlsx"
//! delete_path = "/admin/delete-image"
//!
//! [export]
//! default_separator = "comma"   # comma | newline
//!
//! [[export.templates]]
//! name = "В строку"             # one URL per cell
//! in_cell = false
//!
//! [[export.templates]]
//! name = "В ячейку"             # all URLs of an article in one cell
//! in_cell = true
//!
//! [downloads]
//! dir = "."
//! ```
//!
//! Arrays are replaced wholesale by an override, so a user `[[export.templates]]`
//! list replaces the stock one. Unknown keys are rejected to catch typos early.

use crate::types::Separator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "catalog-view.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Where the export and delete endpoints live.
    pub server: ServerConfig,
    /// Document layouts and separator default.
    pub export: ExportConfig,
    /// Where generated documents are saved.
    pub downloads: DownloadsConfig,
}

impl ViewerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.server.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "server.base_url must start with http:// or https://".into(),
            ));
        }
        for (key, path) in [
            ("server.export_path", &self.server.export_path),
            ("server.delete_path", &self.server.delete_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!("{key} must start with '/'")));
            }
        }
        if self.export.templates.is_empty() {
            return Err(ConfigError::Validation(
                "export.templates must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for template in &self.export.templates {
            if template.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "export.templates names must not be blank".into(),
                ));
            }
            if !seen.insert(template.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate export template '{}'",
                    template.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Scheme, host and optional port, without trailing slash.
    pub base_url: String,
    /// POST target for document generation.
    pub export_path: String,
    /// POST target for image deletion.
    pub delete_path: String,
}

impl ServerConfig {
    pub fn export_url(&self) -> String {
        join_url(&self.base_url, &self.export_path)
    }

    pub fn delete_url(&self) -> String {
        join_url(&self.base_url, &self.delete_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim().trim_end_matches('/'), path)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            export_path: "/admin/download-xlsx".to_string(),
            delete_path: "/admin/delete-image".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Separator used when the CLI doesn't pass one.
    pub default_separator: Separator,
    /// Document layouts the server can render.
    pub templates: Vec<DocumentTemplate>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_separator: Separator::Comma,
            templates: vec![
                DocumentTemplate {
                    name: "В строку".to_string(),
                    in_cell: false,
                },
                DocumentTemplate {
                    name: "В ячейку".to_string(),
                    in_cell: true,
                },
            ],
        }
    }
}

/// A server-side spreadsheet layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentTemplate {
    pub name: String,
    /// Whether an article's URLs are joined into one cell (needs a separator).
    #[serde(default)]
    pub in_cell: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadsConfig {
    pub dir: PathBuf,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ViewerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ViewerConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ViewerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return resolve_config(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// A fully-commented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# catalog-view configuration
# ==========================
# Every key is optional; the values below are the defaults.

[server]
# Scheme, host and port of the archive server.
base_url = "http://localhost:5000"
# Endpoint that turns an export payload into a spreadsheet.
export_path = "/admin/download-xlsx"
# Endpoint that deletes an uploaded image and its thumbnail.
delete_path = "/admin/delete-image"

[export]
# Separator for in-cell layouts when none is given: "comma" or "newline".
default_separator = "comma"

# Layouts the server knows. Overriding this list replaces it entirely.
# in_cell = true joins all URLs of an article into one cell and sends the
# separator along with the payload.
[[export.templates]]
name = "В строку"
in_cell = false

[[export.templates]]
name = "В ячейку"
in_cell = true

[downloads]
# Directory generated documents are saved into.
dir = "."
"##
}
