// src/config.rs

use crate::fields::{FieldSpec, default_fields};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            export: ExportConfig::default(),
            fields: default_fields(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
    pub sheet_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "bills_data.xlsx".to_string(),
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl ExportConfig {
    /// Reject sheet names the xlsx writer would refuse at export time.
    pub fn validate(&self) -> Result<(), String> {
        let name = &self.sheet_name;
        if name.is_empty() {
            return Err("export.sheet_name must not be empty".to_string());
        }
        if name.chars().count() > 31 {
            return Err(format!(
                "export.sheet_name {name:?} is longer than 31 characters"
            ));
        }
        if let Some(c) = name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
            return Err(format!(
                "export.sheet_name {name:?} contains invalid character {c:?}"
            ));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(format!(
                "export.sheet_name {name:?} must not start or end with an apostrophe"
            ));
        }
        Ok(())
    }
}

const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        if cfg.fields.is_empty() {
            return Err("config lists no [[fields]]".into());
        }
        cfg.export.validate()?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file means defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if path.exists() {
            info!(path = %path.display(), "Loading config");
            Self::load(path)
        } else {
            info!(path = %path.display(), "No config file — using defaults");
            Ok(Self::default())
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
