//! Filesystem-backed media store
//!
//! Artifacts are written content-addressed (`<sha256>.<ext>`) so storing the
//! same bytes twice yields the same handle.

use async_trait::async_trait;
use content_studio_domain::model::MediaHandle;
use content_studio_domain::request::DownloadedMedia;
use content_studio_domain::{MediaError, MediaStore};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FsMediaStore {
    dir: PathBuf,
}

impl FsMediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn extension(mime_type: &str) -> &'static str {
    match mime_type {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "bin",
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn store(&self, media: DownloadedMedia) -> Result<MediaHandle, MediaError> {
        if media.bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        fs::create_dir_all(&self.dir).await?;
        let dir = fs::canonicalize(&self.dir).await?;

        let digest = format!("{:x}", Sha256::digest(&media.bytes));
        let path = dir.join(format!("{}.{}", digest, extension(&media.mime_type)));

        if fs::try_exists(&path).await? {
            tracing::debug!(path = %path.display(), "Artifact already stored");
        } else {
            fs::write(&path, &media.bytes).await?;
            tracing::info!(path = %path.display(), bytes = media.bytes.len(), "Stored artifact");
        }

        Ok(MediaHandle {
            uri: format!("file://{}", path.display()),
            path,
            mime_type: media.mime_type,
            size_bytes: media.bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn video(bytes: &[u8]) -> DownloadedMedia {
        DownloadedMedia {
            bytes: bytes.to_vec(),
            mime_type: "video/mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_writes_content_addressed_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(temp_dir.path().join("media"));

        let handle = store.store(video(b"frames")).await.unwrap();

        assert!(handle.uri.starts_with("file://"));
        assert_eq!(handle.path.extension().unwrap(), "mp4");
        assert_eq!(handle.size_bytes, 6);
        assert_eq!(std::fs::read(&handle.path).unwrap(), b"frames");
    }

    #[tokio::test]
    async fn test_same_bytes_yield_same_handle() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(temp_dir.path());

        let first = store.store(video(b"same")).await.unwrap();
        let second = store.store(video(b"same")).await.unwrap();
        let other = store.store(video(b"different")).await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first.path, other.path);
    }

    #[tokio::test]
    async fn test_empty_artifact_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(temp_dir.path());

        let err = store.store(video(b"")).await.unwrap_err();
        assert!(matches!(err, MediaError::Empty));
    }
}
