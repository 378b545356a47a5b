//! Configuration loaded from a TOML file plus environment overrides.
//!
//! ```toml
//! default_artifacts_expire_in = "30 days"
//! max_artifact_size_mb = 100
//! verify_sha256 = false
//! storage_root = "/var/lib/coffer/artifacts"
//!
//! [max_artifact_size_mb_by_type]
//! junit = 10
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{ExpireIn, ExpireInError, FileType, UnknownVariant};

pub const ENV_DEFAULT_EXPIRE_IN: &str = "COFFER_DEFAULT_ARTIFACTS_EXPIRE_IN";
pub const ENV_STORAGE_ROOT: &str = "COFFER_STORAGE_ROOT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid default_artifacts_expire_in: {0}")]
    DefaultExpireIn(#[source] ExpireInError),

    #[error("max_artifact_size_mb_by_type: {0}")]
    UnknownFileType(#[source] UnknownVariant),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Expiration used when an upload does not carry `expire_in`.
    pub default_artifacts_expire_in: Option<String>,

    /// Global artifact size limit in MiB (`None` = unlimited).
    pub max_artifact_size_mb: Option<u64>,

    /// Per-type size limits in MiB keyed by artifact type name, overriding
    /// the global one.
    pub max_artifact_size_mb_by_type: HashMap<String, u64>,

    /// Reject uploads whose content does not hash to the declared digest.
    pub verify_sha256: bool,

    /// Root directory of the local content store.
    pub storage_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_artifacts_expire_in: None,
            max_artifact_size_mb: Some(100),
            max_artifact_size_mb_by_type: HashMap::new(),
            verify_sha256: false,
            storage_root: PathBuf::from("./artifacts"),
        }
    }
}

impl Config {
    /// Load `path` (or defaults when `None`), apply environment overrides
    /// and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(expire_in) = lookup(ENV_DEFAULT_EXPIRE_IN) {
            self.default_artifacts_expire_in = Some(expire_in).filter(|s| !s.trim().is_empty());
        }
        if let Some(root) = lookup(ENV_STORAGE_ROOT).filter(|s| !s.is_empty()) {
            self.storage_root = PathBuf::from(root);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(expire_in) = &self.default_artifacts_expire_in {
            ExpireIn::parse(expire_in)
                .and_then(|e| e.deadline_from(Utc::now()))
                .map_err(ConfigError::DefaultExpireIn)?;
        }
        self.size_limits_by_type()?;
        Ok(())
    }

    /// Per-type limits in bytes.
    pub fn size_limits_by_type(&self) -> Result<HashMap<FileType, u64>, ConfigError> {
        self.max_artifact_size_mb_by_type
            .iter()
            .map(|(name, mb)| {
                let file_type = name.parse::<FileType>().map_err(ConfigError::UnknownFileType)?;
                Ok((file_type, mb_to_bytes(*mb)))
            })
            .collect()
    }

    /// Global limit in bytes.
    pub fn size_limit(&self) -> Option<u64> {
        self.max_artifact_size_mb.map(mb_to_bytes)
    }
}

fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_artifact_size_mb, Some(100));
    }

    #[test]
    fn parses_full_config() {
        let config = Config::from_toml(
            r#"
            default_artifacts_expire_in = "30 days"
            max_artifact_size_mb = 50
            verify_sha256 = true
            storage_root = "/srv/artifacts"

            [max_artifact_size_mb_by_type]
            junit = 10
            dependency_scanning = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.default_artifacts_expire_in.as_deref(), Some("30 days"));
        assert_eq!(config.max_artifact_size_mb, Some(50));
        assert!(config.verify_sha256);
        assert_eq!(config.storage_root, PathBuf::from("/srv/artifacts"));
        let limits = config.size_limits_by_type().unwrap();
        assert_eq!(limits.get(&FileType::Junit), Some(&(10 * 1024 * 1024)));
        assert_eq!(limits.get(&FileType::DependencyScanning), Some(&(5 * 1024 * 1024)));
    }

    #[test]
    fn unknown_type_in_size_limits_fails_validation() {
        let config = Config::from_toml("[max_artifact_size_mb_by_type]\ntarball = 1").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::UnknownFileType(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("expire = \"1 day\"").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::from_toml("default_artifacts_expire_in = \"30 days\"").unwrap();
        config.apply_env(|key| match key {
            ENV_DEFAULT_EXPIRE_IN => Some("1 day".to_string()),
            ENV_STORAGE_ROOT => Some("/tmp/coffer".to_string()),
            _ => None,
        });

        assert_eq!(config.default_artifacts_expire_in.as_deref(), Some("1 day"));
        assert_eq!(config.storage_root, PathBuf::from("/tmp/coffer"));
    }

    #[test]
    fn blank_env_clears_default_expiration() {
        let mut config = Config::from_toml("default_artifacts_expire_in = \"30 days\"").unwrap();
        config.apply_env(|key| (key == ENV_DEFAULT_EXPIRE_IN).then(String::new));
        assert_eq!(config.default_artifacts_expire_in, None);
    }

    #[test]
    fn invalid_default_expiration_fails_validation() {
        let config = Config::from_toml("default_artifacts_expire_in = \"someday\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultExpireIn(ExpireInError::Invalid(_)))
        ));
    }

    #[test]
    fn default_expiration_past_the_date_range_fails_validation() {
        let config = Config::from_toml("default_artifacts_expire_in = \"1000000 years\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultExpireIn(ExpireInError::OutOfRange(_)))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("coffer.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
