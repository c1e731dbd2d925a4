// ABOUTME: Filesystem-backed media storage
// ABOUTME: Stores uploads as flat files under a configured root directory

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use super::MediaStorage;

/// Media store writing files under a single root directory
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    /// Create the store, making sure the root directory exists
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating media root {}", root.display()))?;
        Ok(Self { root })
    }

    /// Resolve a stored name, rejecting anything that escapes the root
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.contains("..")
            || name.contains('/')
            || name.contains(std::path::MAIN_SEPARATOR)
        {
            bail!("invalid media name: {name}");
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, name: &str, data: Bytes, _content_type: &str) -> Result<String> {
        // TODO: disambiguate colliding names with a numeric suffix instead of overwriting
        let path = self.resolve(name)?;
        fs::write(&path, &data)
            .await
            .with_context(|| format!("writing media file {}", path.display()))?;
        debug!(name = %name, bytes = data.len(), "stored media file");
        Ok(name.to_string())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        fs::remove_file(&full)
            .await
            .with_context(|| format!("removing media file {}", full.display()))?;
        debug!(name = %path, "removed media file");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let meta = fs::metadata(&self.root)
            .await
            .with_context(|| format!("media root {} is unreachable", self.root.display()))?;
        if !meta.is_dir() {
            bail!("media root {} is not a directory", self.root.display());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_and_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStorage::new(dir.path()).await.unwrap();

        let stored = store
            .upload("clip.mp4", Bytes::from_static(b"frames"), "video/mp4")
            .await
            .unwrap();
        assert_eq!(stored, "clip.mp4");
        assert_eq!(std::fs::read(dir.path().join("clip.mp4")).unwrap(), b"frames");

        store.delete("clip.mp4").await.unwrap();
        assert!(!dir.path().join("clip.mp4").exists());
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStorage::new(dir.path()).await.unwrap();

        assert!(store
            .upload("../escape", Bytes::from_static(b"x"), "text/plain")
            .await
            .is_err());
        assert!(store.delete("a/b").await.is_err());
    }

    #[tokio::test]
    async fn test_ping_checks_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStorage::new(dir.path()).await.unwrap();
        store.ping().await.unwrap();
    }
}
