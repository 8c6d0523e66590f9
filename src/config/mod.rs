use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory that holds uploaded sneaker photos
    #[serde(default = "default_storage_root")]
    pub root_path: PathBuf,
    /// URL prefix under which `root_path` is served; photos starting with it
    /// are treated as already stored
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_lookup_base_url")]
    pub base_url: String,
    /// Bearer key sent with every function invocation
    pub api_key: Option<String>,
    #[serde(default = "default_sku_function")]
    pub sku_function: String,
    #[serde(default = "default_barcode_function")]
    pub barcode_function: String,
    #[serde(
        default = "default_lookup_timeout",
        with = "duration_serde::duration"
    )]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Largest external image accepted for migration
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: usize,
    #[serde(
        default = "default_download_timeout",
        with = "duration_serde::duration"
    )]
    pub download_timeout: Duration,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_ROOT)
}

fn default_public_base_url() -> String {
    DEFAULT_PUBLIC_BASE_URL.to_string()
}

fn default_lookup_base_url() -> String {
    DEFAULT_LOOKUP_BASE_URL.to_string()
}

fn default_sku_function() -> String {
    DEFAULT_SKU_FUNCTION.to_string()
}

fn default_barcode_function() -> String {
    DEFAULT_BARCODE_FUNCTION.to_string()
}

fn default_lookup_timeout() -> Duration {
    Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS)
}

fn default_max_download_bytes() -> usize {
    DEFAULT_MAX_DOWNLOAD_BYTES
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: Some(DEFAULT_MAX_CONNECTIONS),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_storage_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_lookup_base_url(),
            api_key: None,
            sku_function: default_sku_function(),
            barcode_function: default_barcode_function(),
            request_timeout: default_lookup_timeout(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_download_bytes: default_max_download_bytes(),
            download_timeout: default_download_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            lookup: LookupConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
