//! ApplicationSettings port - アプリケーション全体の設定値
//!
//! プロセス全体のシングルトンではなく、サービスに注入して 1 回の呼び出しにつき 1 度だけ読みます。

use crate::domain::FileType;

pub trait ApplicationSettings: Send + Sync {
    /// Expiration applied when the upload does not specify `expire_in`
    /// (e.g. `"30 days"`). `None` keeps artifacts forever.
    fn default_artifacts_expire_in(&self) -> Option<String>;

    /// Maximum accepted size in bytes for an artifact of `file_type`.
    fn max_artifact_size(&self, file_type: FileType) -> Option<u64>;

    /// Whether uploads must match the digest computed while storing them.
    fn verify_sha256(&self) -> bool {
        false
    }
}

impl<T: ApplicationSettings + ?Sized> ApplicationSettings for std::sync::Arc<T> {
    fn default_artifacts_expire_in(&self) -> Option<String> {
        (**self).default_artifacts_expire_in()
    }

    fn max_artifact_size(&self, file_type: FileType) -> Option<u64> {
        (**self).max_artifact_size(file_type)
    }

    fn verify_sha256(&self) -> bool {
        (**self).verify_sha256()
    }
}
