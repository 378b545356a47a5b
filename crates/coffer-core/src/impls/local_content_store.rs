//! LocalContentStore - ローカルディスクに artifact 本体を保存する ContentStore
//!
//! # 実装詳細
//! - `<root>/<key>` に書き込む（key はサービスが組み立てる相対パス）
//! - 一時ファイルに書いてから rename するので、途中で失敗しても key の場所には何も残らない
//! - 書き込みながら SHA-256 を計算する

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::domain::{Sha256Digest, StoredFile, UploadedFile};
use crate::ports::{ContentStore, ContentStoreError};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` under the root, refusing absolute keys and `..`.
    fn resolve(&self, key: &str) -> Result<PathBuf, ContentStoreError> {
        let relative = Path::new(key);
        let is_safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_safe {
            return Err(ContentStoreError::io(
                relative,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid storage key"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn store(&self, key: &str, upload: &UploadedFile) -> Result<StoredFile, ContentStoreError> {
        let dest = self.resolve(key)?;
        let mut source = tokio::fs::File::open(upload.path())
            .await
            .map_err(|e| ContentStoreError::io(upload.path(), e))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ContentStoreError::io(parent, e))?;
        }

        let tmp = dest.with_extension("part");
        let mut target = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| ContentStoreError::io(&tmp, e))?;

        let mut hasher = Sha256::new();
        let mut size = 0u64;
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let copied: Result<(), ContentStoreError> = async {
            loop {
                let n = source
                    .read(&mut buf)
                    .await
                    .map_err(|e| ContentStoreError::io(upload.path(), e))?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
                target
                    .write_all(&buf[..n])
                    .await
                    .map_err(|e| ContentStoreError::io(&tmp, e))?;
                size += n as u64;
            }
            target
                .sync_all()
                .await
                .map_err(|e| ContentStoreError::io(&tmp, e))
        }
        .await;

        if let Err(e) = copied {
            drop(target);
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        drop(target);

        tokio::fs::rename(&tmp, &dest)
            .await
            .map_err(|e| ContentStoreError::io(&dest, e))?;

        let sha256 = Sha256Digest::from_bytes(&hasher.finalize()).map_err(|e| {
            ContentStoreError::io(&dest, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        debug!(key, size, "stored artifact content");

        Ok(StoredFile {
            key: key.to_string(),
            size,
            sha256,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), ContentStoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ContentStoreError::io(&path, e)),
        }

        // 空になったディレクトリを root まで遡って片付ける
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == self.root.as_path() || tokio::fs::remove_dir(current).await.is_err() {
                break;
            }
            dir = current.parent();
        }
        debug!(key, "deleted artifact content");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(dir: &Path, name: &str, content: &[u8]) -> UploadedFile {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        UploadedFile::new(path, Sha256Digest::parse(&"0".repeat(64)).unwrap())
    }

    #[tokio::test]
    async fn store_copies_content_and_computes_digest() {
        let uploads = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(root.path());

        let file = upload(uploads.path(), "upload", b"hello");
        let stored = store.store("p/j/a/ci_build_artifacts.zip", &file).await.unwrap();

        assert_eq!(stored.size, 5);
        assert_eq!(
            stored.sha256.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        let written = std::fs::read(root.path().join("p/j/a/ci_build_artifacts.zip")).unwrap();
        assert_eq!(written, b"hello");
        assert!(!root.path().join("p/j/a/ci_build_artifacts.part").exists());
    }

    #[tokio::test]
    async fn missing_upload_is_an_io_error_with_path() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(root.path());
        let file = UploadedFile::new(
            root.path().join("nope"),
            Sha256Digest::parse(&"0".repeat(64)).unwrap(),
        );

        let err = store.store("p/j/a/file", &file).await.unwrap_err();
        assert!(matches!(err, ContentStoreError::Io { .. }));
        assert!(err.to_string().starts_with("No such file or directory - "));
    }

    #[tokio::test]
    async fn keys_cannot_escape_root() {
        let uploads = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(root.path());
        let file = upload(uploads.path(), "upload", b"x");

        assert!(store.store("../evil", &file).await.is_err());
        assert!(store.store("/etc/evil", &file).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_file_and_empty_dirs() {
        let uploads = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(root.path());
        let file = upload(uploads.path(), "upload", b"x");

        store.store("p/j/a/file.zip", &file).await.unwrap();
        store.delete("p/j/a/file.zip").await.unwrap();

        assert!(!root.path().join("p").exists());
        assert!(root.path().exists());
    }

    #[tokio::test]
    async fn delete_of_missing_key_succeeds() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(root.path());
        store.delete("p/j/a/never-written").await.unwrap();
    }
}
