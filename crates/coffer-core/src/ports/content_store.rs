//! ContentStore port - artifact 本体の保存先（ローカルディスク / オブジェクトストレージ）
//!
//! 例外ではなく型付きのエラーを返すので、サービス側で分類（Transient など）できます。

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{StoredFile, UploadedFile};

#[derive(Debug, thiserror::Error)]
pub enum ContentStoreError {
    /// Local I/O failure while reading the upload or writing the content.
    #[error("{}", io_message(.source, .path))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A 5xx answer from a remote object storage backend.
    #[error("{message}")]
    RemoteServer { message: String },

    /// The remote service could not be reached or refused the request
    /// temporarily (auth server down, throttling, ...).
    #[error("{message}")]
    RemoteUnavailable { message: String },
}

impl ContentStoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContentStoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Renders like `Input/output error - some/path`: the OS description of the
/// error followed by the path it happened on.
fn io_message(source: &std::io::Error, path: &std::path::Path) -> String {
    let description = match source.raw_os_error() {
        // EIO
        Some(5) => "Input/output error".to_string(),
        _ => match source.kind() {
            std::io::ErrorKind::NotFound => "No such file or directory".to_string(),
            std::io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
            _ => strip_os_error_suffix(&source.to_string()),
        },
    };
    format!("{description} - {}", path.display())
}

/// `"Input/output error (os error 5)"` -> `"Input/output error"`
fn strip_os_error_suffix(message: &str) -> String {
    match message.rfind(" (os error ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

/// ContentStore は upload の中身を永続化する
///
/// # 設計原則
/// - `store` は key の場所に書き込み、書き込み中に計算した sha256 を返す
/// - `delete` は存在しない key に対しても成功する（補償処理で使う）
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn store(&self, key: &str, upload: &UploadedFile) -> Result<StoredFile, ContentStoreError>;

    async fn delete(&self, key: &str) -> Result<(), ContentStoreError>;

    /// Size of the upload in bytes, read before anything is written.
    async fn upload_size(&self, upload: &UploadedFile) -> Result<u64, ContentStoreError> {
        tokio::fs::metadata(upload.path())
            .await
            .map(|meta| meta.len())
            .map_err(|e| ContentStoreError::io(upload.path(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eio_renders_like_errno_message() {
        let err = ContentStoreError::io("some/path", std::io::Error::from_raw_os_error(5));
        assert_eq!(err.to_string(), "Input/output error - some/path");
    }

    #[test]
    fn not_found_renders_description_and_path() {
        let err = ContentStoreError::io(
            "missing.zip",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err.to_string(), "No such file or directory - missing.zip");
    }

    #[test]
    fn remote_errors_keep_their_message() {
        let err = ContentStoreError::RemoteServer {
            message: "Server error".to_string(),
        };
        assert_eq!(err.to_string(), "Server error");
    }

    #[test]
    fn os_error_suffix_is_stripped() {
        assert_eq!(
            strip_os_error_suffix("Disk quota exceeded (os error 122)"),
            "Disk quota exceeded"
        );
        assert_eq!(strip_os_error_suffix("custom"), "custom");
    }
}
