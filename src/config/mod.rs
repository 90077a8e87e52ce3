//! Configuration loading and management
//!
//! Configuration is an explicit value handed to every component at
//! construction. It is read from YAML, from the environment, or both: a YAML
//! file named by `PROCUREMENT_CONFIG` provides the base and individual
//! variables override it.
//!
//! ```yaml
//! server:
//!   port: 3001
//!   static_dir: procurement
//! database:
//!   backend: mongodb
//!   uri: mongodb://localhost:27017/procurementapp
//! images:
//!   backend: local
//!   max_bytes: 10485760
//!   local_dir: uploads
//! ```

use crate::core::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Default image ceiling: 10 MiB
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Complete configuration of the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub images: ImageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the HTML pages and assets
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            static_dir: PathBuf::from("procurement"),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Record store selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Mongodb,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "mongodb" | "mongo" => Ok(StoreBackend::Mongodb),
            _ => Err("expected 'memory' or 'mongodb'".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub uri: String,
    /// Used when the URI names no database
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: "mongodb://localhost:27017/procurementapp".to_string(),
            name: "procurementapp".to_string(),
        }
    }
}

/// Image store selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackend {
    #[default]
    Local,
    Cloudinary,
}

impl FromStr for ImageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ImageBackend::Local),
            "cloudinary" => Ok(ImageBackend::Cloudinary),
            _ => Err("expected 'local' or 'cloudinary'".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub backend: ImageBackend,
    pub max_bytes: usize,
    pub local_dir: PathBuf,
    /// URL prefix under which local images are served
    pub public_prefix: String,
    pub cloudinary: CloudinaryConfig,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            backend: ImageBackend::default(),
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            local_dir: PathBuf::from("uploads"),
            public_prefix: "/uploads".to_string(),
            cloudinary: CloudinaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "procurement".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::ParseError {
                file: None,
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// Empty variables are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = match var("PROCUREMENT_CONFIG") {
            Some(path) => Self::from_yaml_file(&path)?,
            None => Self::default(),
        };

        if let Some(host) = var("HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("PORT") {
            config.server.port = parse_var("PORT", &port)?;
        }
        if let Some(dir) = var("STATIC_DIR") {
            config.server.static_dir = PathBuf::from(dir);
        }
        if let Some(backend) = var("STORE_BACKEND") {
            config.database.backend = parse_var("STORE_BACKEND", &backend)?;
        }
        if let Some(uri) = var("MONGODB_URI") {
            config.database.uri = uri;
        }
        if let Some(name) = var("MONGODB_DATABASE") {
            config.database.name = name;
        }
        if let Some(backend) = var("IMAGE_BACKEND") {
            config.images.backend = parse_var("IMAGE_BACKEND", &backend)?;
        }
        if let Some(dir) = var("UPLOAD_DIR") {
            config.images.local_dir = PathBuf::from(dir);
        }
        if let Some(max) = var("MAX_IMAGE_BYTES") {
            config.images.max_bytes = parse_var("MAX_IMAGE_BYTES", &max)?;
        }
        if let Some(name) = var("CLOUDINARY_CLOUD_NAME") {
            config.images.cloudinary.cloud_name = name;
        }
        if let Some(key) = var("CLOUDINARY_API_KEY") {
            config.images.cloudinary.api_key = key;
        }
        if let Some(secret) = var("CLOUDINARY_API_SECRET") {
            config.images.cloudinary.api_secret = secret;
        }

        Ok(config)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                message: "port must be non-zero".to_string(),
            }
            .into());
        }

        if self.images.max_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "images.max_bytes".to_string(),
                value: "0".to_string(),
                message: "image size limit must be positive".to_string(),
            }
            .into());
        }

        if self.images.backend == ImageBackend::Cloudinary {
            let credentials = &self.images.cloudinary;
            for (field, value) in [
                ("cloud_name", &credentials.cloud_name),
                ("api_key", &credentials.api_key),
                ("api_secret", &credentials.api_secret),
            ] {
                if value.is_empty() {
                    return Err(ConfigError::MissingField {
                        field: format!("images.cloudinary.{}", field),
                        context: "cloudinary image backend".to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}
