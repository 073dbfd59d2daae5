//! Output directory adapter

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::fs;
use tracing::debug;

use crate::application::ports::{MediaStorage, StorageError};
use crate::domain::capture::MediaKind;

/// Collision suffixes tried before giving up on a timestamp
const MAX_ATTEMPTS: u32 = 1000;

/// Fixed output directory for photos and videos
pub struct OutputDirectory {
    root: PathBuf,
}

impl OutputDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaStorage for OutputDirectory {
    async fn prepare(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::CreateDir {
                path: self.root.display().to_string(),
                message: e.to_string(),
            })
    }

    /// Reserves the name by creating an empty file, so two captures in the
    /// same second never share a path.
    async fn allocate(&self, kind: MediaKind, at: DateTime<Local>) -> Result<PathBuf, StorageError> {
        for attempt in 0..MAX_ATTEMPTS {
            let path = self.root.join(kind.file_name(at, attempt));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => {
                    debug!(path = %path.display(), "Allocated output file");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StorageError::Allocate(e.to_string())),
            }
        }
        Err(StorageError::Allocate(format!(
            "too many {} files named for {}",
            kind,
            at.format("%Y%m%d_%H%M%S")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[tokio::test]
    async fn prepare_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = OutputDirectory::new(dir.path().join("DCIM/GeoCam"));
        storage.prepare().await.unwrap();
        assert!(storage.root().is_dir());
    }

    #[tokio::test]
    async fn same_second_captures_get_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = OutputDirectory::new(dir.path());

        let first = storage.allocate(MediaKind::Photo, at()).await.unwrap();
        let second = storage.allocate(MediaKind::Photo, at()).await.unwrap();
        let video = storage.allocate(MediaKind::Video, at()).await.unwrap();

        assert_eq!(first.file_name().unwrap(), "IMG_20240305_140709.jpg");
        assert_eq!(second.file_name().unwrap(), "IMG_20240305_140709_1.jpg");
        assert_eq!(video.file_name().unwrap(), "VID_20240305_140709.mp4");
    }

    #[tokio::test]
    async fn missing_directory_fails_allocation() {
        let dir = tempfile::tempdir().unwrap();
        let storage = OutputDirectory::new(dir.path().join("absent"));
        assert!(matches!(
            storage.allocate(MediaKind::Photo, at()).await,
            Err(StorageError::Allocate(_))
        ));
    }
}
