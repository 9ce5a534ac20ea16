//! Local persistence of uploaded images
//!
//! Every request gets its own temp file under the upload directory. The file
//! lives as long as the returned handle and is removed on drop.

use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn persist_sync(dir: PathBuf, suffix: String, data: Vec<u8>) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        std::io::Write::write_all(&mut file, &data)?;
        Ok(file)
    }

    /// Write `data` to a fresh file, keeping the extension of `file_name`.
    pub async fn persist(&self, file_name: Option<&str>, data: &[u8]) -> Result<NamedTempFile> {
        let suffix = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let dir = self.dir.clone();
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || Self::persist_sync(dir, suffix, data))
            .await
            .map_err(|e| crate::Error::Invariant(format!("Upload persist task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_persist_writes_bytes_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let file = store.persist(Some("photo.png"), b"pixels").await.unwrap();

        assert!(file.path().starts_with(dir.path()));
        assert_eq!(file.path().extension().unwrap(), "png");
        assert_eq!(std::fs::read(file.path()).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_persist_gives_each_upload_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let first = store.persist(Some("a.png"), b"one").await.unwrap();
        let second = store.persist(Some("a.png"), b"two").await.unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(std::fs::read(first.path()).unwrap(), b"one");
        assert_eq!(std::fs::read(second.path()).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_persisted_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let file = store.persist(None, b"data").await.unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_suspicious_extension_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let file = store.persist(Some("evil.p/ng"), b"x").await.unwrap();
        assert!(file.path().starts_with(dir.path()));
    }

    #[test]
    fn test_new_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = UploadStore::new(&nested).unwrap();
        assert!(store.dir().is_dir());
    }
}
