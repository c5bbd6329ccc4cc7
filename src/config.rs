//! Configuration management module
//!
//! Loads and validates environment-based configuration.
//! Designed to be production-ready and easily extensible.

use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid number format in environment variable")]
    ParseError,
}

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Upload limits for image batches
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Maximum number of images accepted in one request
    pub max_images: usize,
    /// Maximum size of a single uploaded image in bytes
    pub max_image_bytes: usize,
}

/// Inference model settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSettings {
    /// Directory holding externally supplied model files.
    /// When set, the registry verifies it at startup and refuses to start
    /// without it; when unset, the built-in placeholder predictors are used.
    pub model_dir: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub models: ModelSettings,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|_| SettingsError::ParseError)?;

        let max_images = env::var("MAX_IMAGES")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .map_err(|_| SettingsError::ParseError)?;

        let max_image_bytes = env::var("MAX_IMAGE_BYTES")
            .unwrap_or_else(|_| "8388608".into())
            .parse()
            .map_err(|_| SettingsError::ParseError)?;

        Ok(Self {
            server: ServerSettings {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
                port,
            },
            upload: UploadSettings {
                max_images,
                max_image_bytes,
            },
            models: ModelSettings {
                model_dir: env::var("MODEL_DIR").ok(),
            },
        })
    }
}
