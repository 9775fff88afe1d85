//! # Service Configuration
//!
//! Loaded once at startup from a YAML file (`laudo.yaml` by default, or the
//! path in `LAUDO_CONFIG`). Every section and field is optional; anything
//! missing falls back to the defaults below, and a missing file means
//! "all defaults".
//!
//! ```yaml
//! server:
//!   host: "127.0.0.1"
//!   port: 3000
//!   allowed_origin: "http://localhost:8080"
//!   static_dir: "static"
//! workbook:
//!   debounce_ms: 120
//!   dairy_price_key: "PECUÁRIA LEITEIRA"
//!   seed_defaults: true
//! data_directory: "data"
//! gallery:
//!   max_size_mb: 16
//! geography:
//!   enable_remote: true
//!   bundled_dataset: "data/estados-cidades.json"
//! ```

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::domain::gallery::{DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_SIZE_MB};
use crate::backend::domain::rows::DEFAULT_DAIRY_PRICE_KEY;
use crate::backend::domain::WorkbookConfig;

pub const CONFIG_ENV_VAR: &str = "LAUDO_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "laudo.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaudoConfig {
    pub server: ServerConfig,
    pub workbook: WorkbookSettings,
    /// Root directory for persisted photos
    pub data_directory: PathBuf,
    pub gallery: GallerySettings,
    pub geography: GeographySettings,
}

impl Default for LaudoConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            workbook: WorkbookSettings::default(),
            data_directory: PathBuf::from("data"),
            gallery: GallerySettings::default(),
            geography: GeographySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS
    pub allowed_origin: String,
    /// Directory served for non-API paths, if any
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origin: "http://localhost:8080".to_string(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookSettings {
    pub debounce_ms: u64,
    pub dairy_price_key: String,
    /// Start sessions with the default sheet rows
    pub seed_defaults: bool,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 120,
            dairy_price_key: DEFAULT_DAIRY_PRICE_KEY.to_string(),
            seed_defaults: true,
        }
    }
}

impl WorkbookSettings {
    pub fn to_workbook_config(&self) -> WorkbookConfig {
        WorkbookConfig {
            debounce_window: Duration::from_millis(self.debounce_ms),
            dairy_price_key: self.dairy_price_key.trim().to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    pub max_size_mb: u64,
    pub allowed_types: Vec<String>,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographySettings {
    /// Query the IBGE / BrasilAPI services before the bundled dataset
    pub enable_remote: bool,
    pub states_url: String,
    /// `{uf}` is replaced by the state code
    pub municipalities_url: String,
    /// JSON dataset used after the remote sources; a minimal built-in
    /// dataset is used when unset
    pub bundled_dataset: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for GeographySettings {
    fn default() -> Self {
        Self {
            enable_remote: true,
            states_url: "https://servicodados.ibge.gov.br/api/v1/localidades/estados".to_string(),
            municipalities_url: "https://brasilapi.com.br/api/ibge/municipios/v1/{uf}".to_string(),
            bundled_dataset: None,
            request_timeout_secs: 5,
        }
    }
}

impl GeographySettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl LaudoConfig {
    /// Load from `path`, or from `LAUDO_CONFIG` / `laudo.yaml` when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(CONFIG_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let yaml = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}
