//! Configuration management for crowdcam
//!
//! Provides loading, saving and validation of the counting-service endpoint
//! and capture artifact settings.

use crate::errors::CrowdcamError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrowdcamConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Counting service connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the counting service
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Multipart field name used for uploads
    pub upload_field: String,
}

/// Capture artifact settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// File name given to captured photos
    pub photo_file_name: String,
    /// File name given to recorded videos
    pub video_file_name: String,
    /// MIME type of recorded videos
    pub video_mime_type: String,
    /// Device preselected when a session opens
    pub default_device: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout_ms: 30_000,
            upload_field: "file".to_string(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            photo_file_name: "capture.png".to_string(),
            video_file_name: "capture.webm".to_string(),
            video_mime_type: crate::recording::VIDEO_MIME_TYPE.to_string(),
            default_device: None,
        }
    }
}

impl CrowdcamConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrowdcamError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| CrowdcamError::Config(format!("Failed to read config file: {}", e)))?;

        let config: CrowdcamConfig = toml::from_str(&contents)
            .map_err(|e| CrowdcamError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate().map_err(CrowdcamError::Config)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CrowdcamError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CrowdcamError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| CrowdcamError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| CrowdcamError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("crowdcam.toml")
    }

    /// Load from default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err("API base URL must not be empty".to_string());
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(format!("API base URL must be http(s): {}", base));
        }
        if self.api.timeout_ms == 0 {
            return Err("API timeout must be greater than zero".to_string());
        }
        if self.api.upload_field.trim().is_empty() {
            return Err("Upload field name must not be empty".to_string());
        }

        if self.capture.photo_file_name.trim().is_empty()
            || self.capture.video_file_name.trim().is_empty()
        {
            return Err("Capture file names must not be empty".to_string());
        }
        if !self.capture.video_mime_type.starts_with("video/") {
            return Err(format!(
                "Video MIME type must start with video/: {}",
                self.capture.video_mime_type
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = CrowdcamConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5001");
        assert_eq!(config.api.upload_field, "file");
        assert_eq!(config.capture.photo_file_name, "capture.png");
        assert_eq!(config.capture.video_file_name, "capture.webm");
        assert!(config.capture.default_device.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = CrowdcamConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_url = config.clone();
        bad_url.api.base_url = "ftp://example.org".to_string();
        assert!(bad_url.validate().is_err());

        let mut bad_timeout = CrowdcamConfig::default();
        bad_timeout.api.timeout_ms = 0;
        assert!(bad_timeout.validate().is_err());

        let mut bad_mime = CrowdcamConfig::default();
        bad_mime.capture.video_mime_type = "image/png".to_string();
        assert!(bad_mime.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("crowdcam.toml");

        let mut config = CrowdcamConfig::default();
        config.api.base_url = "https://counting.example.org".to_string();
        config.capture.default_device = Some("cam-2".to_string());
        config.save_to_file(&config_path).unwrap();

        let loaded = CrowdcamConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&CrowdcamConfig::default()).unwrap();
        assert!(toml_string.contains("[api]"));
        assert!(toml_string.contains("[capture]"));
        assert!(toml_string.contains("base_url"));
        assert!(toml_string.contains("video_mime_type"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[api]\nbase_url = \"http://10.0.0.5:5001\"\n").unwrap();

        let loaded = CrowdcamConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "http://10.0.0.5:5001");
        assert_eq!(loaded.api.timeout_ms, 30_000);
        assert_eq!(loaded.capture, CaptureConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[api]\ntimeout_ms = 0\n").unwrap();

        let err = CrowdcamConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, CrowdcamError::Config(_)));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = CrowdcamConfig::load_from_file("nonexistent_crowdcam.toml");
        assert_eq!(result.unwrap(), CrowdcamConfig::default());
    }
}
