//! Application configuration management.
//!
//! Handles loading and saving the application settings: where the catalog
//! API lives, how the player behaves, and the optional object-storage
//! credentials used by the upload facade.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::EngineConfig;
use crate::error::{Error, FileSystemError, Result};
use crate::session::RecoveryPolicy;

/// Default base URL of the catalog REST API.
pub const DEFAULT_API_BASE_URL: &str = "/api";

/// Default object-storage region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default lifetime of a presigned upload URL, in seconds.
pub const DEFAULT_UPLOAD_URL_EXPIRY_SECS: u64 = 3600;

/// Environment variables [`StorageConfig::from_env`] reads.
pub const STORAGE_ENV_VARS: [&str; 5] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_REGION",
    "AWS_S3_BUCKET_NAME",
    "AWS_CLOUDFRONT_DOMAIN",
];

/// Player behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Pointer inactivity before the controls hide, in milliseconds.
    #[serde(default = "default_hide_delay_ms")]
    pub controls_hide_delay_ms: u64,
    /// Order the quality menu by ascending bitrate instead of manifest order.
    #[serde(default)]
    pub sort_levels: bool,
    /// Adaptive engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Automatic recovery budget per source.
    #[serde(default)]
    pub recovery: RecoveryPolicy,
}

const fn default_hide_delay_ms() -> u64 {
    3000
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            controls_hide_delay_ms: default_hide_delay_ms(),
            sort_levels: false,
            engine: EngineConfig::default(),
            recovery: RecoveryPolicy::default(),
        }
    }
}

impl PlayerConfig {
    /// Controls hide delay as a [`Duration`].
    #[must_use]
    pub const fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    /// Builder: set the controls hide delay.
    #[must_use]
    pub const fn with_controls_hide_delay_ms(mut self, millis: u64) -> Self {
        self.controls_hide_delay_ms = millis;
        self
    }

    /// Builder: sort the quality menu by bitrate.
    #[must_use]
    pub const fn with_sort_levels(mut self, sort: bool) -> Self {
        self.sort_levels = sort;
        self
    }

    /// Builder: set the recovery budget.
    #[must_use]
    pub const fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }
}

/// Object-storage and CDN settings for uploads.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Bucket receiving uploads.
    pub bucket_name: String,
    /// Storage region.
    #[serde(default = "default_region")]
    pub region: String,
    /// CDN domain serving transcoded renditions.
    pub cdn_domain: String,
    /// Transcoding service endpoint.
    #[serde(default)]
    pub transcoder_endpoint: Option<String>,
    /// Role the transcoding service assumes.
    #[serde(default)]
    pub transcoder_role: Option<String>,
    /// Presigned upload URL lifetime in seconds.
    #[serde(default = "default_upload_url_expiry")]
    pub upload_url_expiry_secs: u64,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

const fn default_upload_url_expiry() -> u64 {
    DEFAULT_UPLOAD_URL_EXPIRY_SECS
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &mask_secret(&self.access_key_id))
            .field("secret_access_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("cdn_domain", &self.cdn_domain)
            .field("transcoder_endpoint", &self.transcoder_endpoint)
            .field("transcoder_role", &self.transcoder_role)
            .field("upload_url_expiry_secs", &self.upload_url_expiry_secs)
            .finish()
    }
}

impl StorageConfig {
    /// Read storage settings from the process environment.
    ///
    /// Returns `None` unless every variable in [`STORAGE_ENV_VARS`] is set
    /// and non-empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build storage settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            access_key_id: get("AWS_ACCESS_KEY_ID")?,
            secret_access_key: get("AWS_SECRET_ACCESS_KEY")?,
            region: get("AWS_REGION")?,
            bucket_name: get("AWS_S3_BUCKET_NAME")?,
            cdn_domain: get("AWS_CLOUDFRONT_DOMAIN")?,
            transcoder_endpoint: None,
            transcoder_role: None,
            upload_url_expiry_secs: DEFAULT_UPLOAD_URL_EXPIRY_SECS,
        };
        debug!("Storage configured for bucket {}", config.bucket_name);
        Some(config)
    }

    /// Access key masked for display, e.g. `****WXYZ`.
    #[must_use]
    pub fn masked_access_key(&self) -> String {
        mask_secret(&self.access_key_id)
    }
}

/// Keep only the last four characters of a credential.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    let tail: String = secret.chars().skip(count.saturating_sub(4)).collect();
    format!("****{tail}")
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the catalog REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Player behaviour.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Object storage, absent when uploads are disabled.
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            player: PlayerConfig::default(),
            storage: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, or create default if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        if !config_path.exists() {
            debug!("Config file not found, using defaults");
            let config = Self::default();
            if let Err(e) = config.save() {
                warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to read config file: {e}"),
            })
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;

        info!("Loaded config from {}", path.display());
        debug!(
            "API base URL: {}, uploads {}",
            config.api_base_url,
            if config.storage.is_some() {
                "enabled"
            } else {
                "disabled"
            }
        );

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::FileSystem(FileSystemError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    reason: format!("Failed to create config directory: {e}"),
                })
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write config file: {e}"),
            })
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Fill in storage settings from the environment when none are configured.
    #[must_use]
    pub fn with_env_storage(mut self) -> Self {
        if self.storage.is_none() {
            self.storage = StorageConfig::from_env();
        }
        self
    }

    /// Get the path to the config file.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        config_file_path()
    }
}

/// Get the path to the config file.
fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("marquee")
        .join("config.json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLEWXYZ"),
            ("AWS_SECRET_ACCESS_KEY", "s3cr3t"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_S3_BUCKET_NAME", "marquee-uploads"),
            ("AWS_CLOUDFRONT_DOMAIN", "d111.cloudfront.net"),
        ])
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "/api");
        assert_eq!(config.player.controls_hide_delay_ms, 3000);
        assert!(!config.player.sort_levels);
        assert_eq!(config.player.recovery.network_retries, 1);
        assert_eq!(config.player.recovery.media_recoveries, 1);
        assert!(config.storage.is_none());
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("nested").join("config.json");

        let config = AppConfig {
            api_base_url: "https://api.example.com".to_string(),
            player: PlayerConfig::default().with_sort_levels(true),
            storage: StorageConfig::from_lookup(|key| full_env().get(key).cloned()),
        };
        config.save_to(&path).expect("Should save");

        let loaded = AppConfig::load_from(&path).expect("Should load");
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"player":{"sort_levels":true}}"#).expect("Should parse");
        assert_eq!(config.api_base_url, "/api");
        assert!(config.player.sort_levels);
        assert_eq!(config.player.controls_hide_delay_ms, 3000);
        assert!(config.player.engine.enable_worker);
    }

    #[test]
    fn test_load_from_invalid_json() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("Should write");

        let result = AppConfig::load_from(&path);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let result = AppConfig::load_from(&temp_dir.path().join("absent.json"));
        assert!(matches!(
            result,
            Err(Error::FileSystem(FileSystemError::ReadFailed { .. }))
        ));
    }

    #[test]
    fn test_storage_from_lookup_requires_every_variable() {
        let vars = full_env();
        let storage = StorageConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(storage.region, "eu-west-1");
        assert_eq!(storage.upload_url_expiry_secs, 3600);

        for missing in STORAGE_ENV_VARS {
            let mut vars = full_env();
            vars.remove(missing);
            assert!(StorageConfig::from_lookup(|key| vars.get(key).cloned()).is_none());
        }

        let mut vars = full_env();
        vars.insert("AWS_REGION".to_string(), "  ".to_string());
        assert!(StorageConfig::from_lookup(|key| vars.get(key).cloned()).is_none());
    }

    #[test]
    fn test_storage_debug_redacts_secret() {
        let vars = full_env();
        let storage = StorageConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let debug = format!("{storage:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("AKIAEXAMPLEWXYZ"));
        assert!(debug.contains("****WXYZ"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AKIAEXAMPLEWXYZ"), "****WXYZ");
        assert_eq!(mask_secret("abc"), "****abc");
        assert_eq!(mask_secret(""), "****");
    }

    #[test]
    fn test_hide_delay_duration() {
        let config = PlayerConfig::default().with_controls_hide_delay_ms(1500);
        assert_eq!(config.controls_hide_delay(), Duration::from_millis(1500));
    }
}
