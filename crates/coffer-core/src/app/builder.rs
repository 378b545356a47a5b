//! ServiceBuilder - サービスの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須のポート（ArtifactStore, ContentStore）が無ければ build() が BuildError を返す
//! - それ以外は本番向けのデフォルト（SystemClock, ULID, tracing）で埋める

use std::sync::Arc;

use crate::app::service::CreateJobArtifactsService;
use crate::config::{Config, ConfigError};
use crate::impls::{LocalContentStore, StaticSettings, TracingErrorTracker};
use crate::ports::{
    ApplicationSettings, ArtifactStore, Clock, ContentStore, ErrorTracker, IdGenerator,
    SystemClock, UlidGenerator,
};

/// ServiceBuilder は CreateJobArtifactsService を構築
///
/// # 使用例
/// ```ignore
/// let service = ServiceBuilder::new()
///     .artifact_store(Arc::new(InMemoryArtifactStore::new()))
///     .content_store(Arc::new(LocalContentStore::new("/srv/artifacts")))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ServiceBuilder {
    artifacts: Option<Arc<dyn ArtifactStore>>,
    content: Option<Arc<dyn ContentStore>>,
    tracker: Option<Arc<dyn ErrorTracker>>,
    settings: Option<Arc<dyn ApplicationSettings>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はサービス構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing required port: {0}")]
    MissingPort(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local content store under `storage_root` and settings taken from `config`.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let settings = StaticSettings::try_from(config)?;
        Ok(Self::new()
            .content_store(Arc::new(LocalContentStore::new(&config.storage_root)))
            .settings(Arc::new(settings)))
    }

    pub fn artifact_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.artifacts = Some(store);
        self
    }

    pub fn content_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.content = Some(store);
        self
    }

    pub fn error_tracker(mut self, tracker: Arc<dyn ErrorTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn settings(mut self, settings: Arc<dyn ApplicationSettings>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<CreateJobArtifactsService, BuildError> {
        let artifacts = self.artifacts.ok_or(BuildError::MissingPort("artifact_store"))?;
        let content = self.content.ok_or(BuildError::MissingPort("content_store"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        Ok(CreateJobArtifactsService {
            artifacts,
            content,
            tracker: self.tracker.unwrap_or_else(|| Arc::new(TracingErrorTracker)),
            settings: self
                .settings
                .unwrap_or_else(|| Arc::new(StaticSettings::default())),
            clock,
            ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryArtifactStore;

    #[test]
    fn test_build_success() {
        let dir = tempfile::tempdir().unwrap();
        let service = ServiceBuilder::new()
            .artifact_store(Arc::new(InMemoryArtifactStore::new()))
            .content_store(Arc::new(LocalContentStore::new(dir.path())))
            .build();
        assert!(service.is_ok());
    }

    #[test]
    fn test_build_missing_artifact_store() {
        let dir = tempfile::tempdir().unwrap();
        let service = ServiceBuilder::new()
            .content_store(Arc::new(LocalContentStore::new(dir.path())))
            .build();
        assert!(matches!(service, Err(BuildError::MissingPort("artifact_store"))));
    }

    #[test]
    fn test_build_missing_content_store() {
        let service = ServiceBuilder::new()
            .artifact_store(Arc::new(InMemoryArtifactStore::new()))
            .build();
        assert!(matches!(service, Err(BuildError::MissingPort("content_store"))));
    }

    #[test]
    fn test_from_config_provides_content_store() {
        let service = ServiceBuilder::from_config(&Config::default())
            .unwrap()
            .artifact_store(Arc::new(InMemoryArtifactStore::new()))
            .build();
        assert!(service.is_ok());
    }

    #[test]
    fn test_from_config_rejects_unknown_size_limit_type() {
        let mut config = Config::default();
        config
            .max_artifact_size_mb_by_type
            .insert("tarball".to_string(), 1);
        assert!(matches!(
            ServiceBuilder::from_config(&config),
            Err(BuildError::Config(ConfigError::UnknownFileType(_)))
        ));
    }
}
