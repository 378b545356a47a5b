//! StaticSettings - 起動時に読み込んだ設定値をそのまま返す ApplicationSettings

use std::collections::HashMap;

use crate::config::{Config, ConfigError};
use crate::domain::FileType;
use crate::ports::ApplicationSettings;

#[derive(Debug, Clone)]
pub struct StaticSettings {
    pub default_artifacts_expire_in: Option<String>,

    /// Size limit applied to every type without its own entry.
    pub max_artifact_size: Option<u64>,
    pub max_artifact_size_by_type: HashMap<FileType, u64>,
    pub verify_sha256: bool,
}

/// Same values as `Config::default()`, including its global size limit.
impl Default for StaticSettings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            default_artifacts_expire_in: config.default_artifacts_expire_in.clone(),
            max_artifact_size: config.size_limit(),
            max_artifact_size_by_type: HashMap::new(),
            verify_sha256: config.verify_sha256,
        }
    }
}

impl StaticSettings {
    pub fn with_default_expire_in(mut self, expire_in: impl Into<String>) -> Self {
        self.default_artifacts_expire_in = Some(expire_in.into());
        self
    }

    pub fn with_max_artifact_size(mut self, bytes: u64) -> Self {
        self.max_artifact_size = Some(bytes);
        self
    }
}

impl TryFrom<&Config> for StaticSettings {
    type Error = ConfigError;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        Ok(Self {
            default_artifacts_expire_in: config.default_artifacts_expire_in.clone(),
            max_artifact_size: config.size_limit(),
            max_artifact_size_by_type: config.size_limits_by_type()?,
            verify_sha256: config.verify_sha256,
        })
    }
}

impl ApplicationSettings for StaticSettings {
    fn default_artifacts_expire_in(&self) -> Option<String> {
        self.default_artifacts_expire_in.clone()
    }

    fn max_artifact_size(&self, file_type: FileType) -> Option<u64> {
        self.max_artifact_size_by_type
            .get(&file_type)
            .copied()
            .or(self.max_artifact_size)
    }

    fn verify_sha256(&self) -> bool {
        self.verify_sha256
    }
}
