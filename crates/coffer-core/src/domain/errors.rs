//! Errors - サービス境界でのエラー分類
//!
//! ingestion の失敗はすべてここで分類され、`ServiceResponse` に変換されます。

use super::artifact::DigestError;
use super::outcome::{HttpStatus, ServiceResponse};
use super::params::ParamsError;

/// ErrorKind は失敗の運用分類
///
/// - Conflict: 同じ type の artifact が別の内容で既に存在（クライアント側のデータ不整合）
/// - Invalid: パラメータ不正
/// - TooLarge: サイズ上限超過
/// - Transient: I/O やリモートストレージの障害（呼び出し側でリトライ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    Invalid,
    TooLarge,
    Transient,
}

impl ErrorKind {
    pub fn http_status(&self) -> HttpStatus {
        match self {
            ErrorKind::Conflict | ErrorKind::Invalid => HttpStatus::BadRequest,
            ErrorKind::TooLarge => HttpStatus::PayloadTooLarge,
            ErrorKind::Transient => HttpStatus::ServiceUnavailable,
        }
    }
}

/// IngestError はサービス内部のエラー
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("another artifact of the same type already exists")]
    Conflict,

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Digest(#[from] DigestError),

    /// The job (or its project) is not known to the artifact store.
    #[error("{0}")]
    NotFound(String),

    #[error("sha256 checksum mismatch")]
    ChecksumMismatch,

    #[error("file size has reached maximum size limit")]
    TooLarge,

    #[error("{0}")]
    Transient(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IngestError {
    pub fn transient(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        IngestError::Transient(Box::new(source))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Conflict => ErrorKind::Conflict,
            IngestError::Params(_)
            | IngestError::Digest(_)
            | IngestError::NotFound(_)
            | IngestError::ChecksumMismatch => ErrorKind::Invalid,
            IngestError::TooLarge => ErrorKind::TooLarge,
            IngestError::Transient(_) => ErrorKind::Transient,
        }
    }

    /// Whether the error is reported to the error tracker.
    ///
    /// Conflicts are tracked alongside infrastructure faults; plain parameter
    /// errors are not.
    pub fn is_tracked(&self) -> bool {
        matches!(
            self,
            IngestError::Conflict | IngestError::ChecksumMismatch | IngestError::Transient(_)
        )
    }

    pub fn to_response(&self) -> ServiceResponse {
        ServiceResponse::error(self.kind().http_status(), self.to_string())
    }
}
