//! Blob storage over the local filesystem
//!
//! Stands in for the managed object store: audio and cover payloads are
//! written under `<data>/media/{audio,covers}` and addressed by `/media/...`
//! URLs that the HTTP layer serves statically.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// URL prefix under which blobs are served
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Blob category, one subfolder each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Audio,
    Cover,
}

impl BlobKind {
    fn folder(&self) -> &'static str {
        match self {
            BlobKind::Audio => "audio",
            BlobKind::Cover => "covers",
        }
    }
}

/// Filesystem-backed blob store
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open the store, creating the media folders if needed
    pub fn new(root: PathBuf) -> Result<Self> {
        for kind in [BlobKind::Audio, BlobKind::Cover] {
            std::fs::create_dir_all(root.join(kind.folder()))?;
        }
        info!("Blob store at {}", root.display());
        Ok(Self { root })
    }

    /// Filesystem root served at `/media`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store a blob and return its serving URL
    pub async fn put(&self, kind: BlobKind, file_name: &str, bytes: &[u8]) -> Result<String> {
        validate_file_name(file_name)?;

        let path = self.root.join(kind.folder()).join(file_name);
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(format!("{}/{}/{}", MEDIA_URL_PREFIX, kind.folder(), file_name))
    }

    /// Delete a blob by its serving URL; unknown files are not an error
    pub async fn delete(&self, url: &str) -> Result<()> {
        let relative = url
            .strip_prefix(&format!("{}/", MEDIA_URL_PREFIX))
            .ok_or_else(|| Error::Storage(format!("Not a media URL: {}", url)))?;

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::Storage(format!("Invalid media path: {}", url)));
        }

        let path = self.root.join(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted blob {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::Storage(format!("Invalid blob file name: {}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().to_path_buf()).unwrap();

        let url = store.put(BlobKind::Audio, "a.wav", b"RIFF").await.unwrap();
        assert_eq!(url, "/media/audio/a.wav");
        assert!(dir.path().join("audio/a.wav").exists());

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join("audio/a.wav").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().to_path_buf()).unwrap();
        store.delete("/media/covers/missing.svg").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().to_path_buf()).unwrap();

        assert!(store.put(BlobKind::Cover, "../evil.svg", b"x").await.is_err());
        assert!(store.delete("/media/../etc/passwd").await.is_err());
        assert!(store.delete("/elsewhere/file").await.is_err());
    }
}
