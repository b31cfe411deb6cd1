use crate::errors::UploadError;
use async_trait::async_trait;
use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Content-addressed attachment storage: every file lives at
/// `<storage_root>/<uuid>`, no extension, no subdirectories. Adapted from the
/// teacher's `LocalFileStorageService`, simplified because an attachment's
/// UUID is already a stable, unique name (no per-entity path nesting needed).
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn write_new(&self, data: &[u8]) -> Result<Uuid, UploadError>;
    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>, UploadError>;
    async fn read_chunked<'a>(&self, uuid: Uuid) -> Result<tokio::fs::File, UploadError>;
    async fn delete(&self, uuid: Uuid) -> Result<(), UploadError>;
    async fn count_items(&self) -> Result<u64, UploadError>;
}

pub struct LocalFileStorage {
    root: PathBuf,
    max_items: u64,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, max_items: u64) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        #[cfg(unix)]
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o750))?;
        Ok(Self { root, max_items })
    }

    fn path_for(&self, uuid: Uuid) -> PathBuf {
        self.root.join(uuid.to_string())
    }

    /// Confirms a realized path hasn't escaped the storage root via a
    /// symlink or `..` component, the same check the teacher applies before
    /// trusting a relative path (spec.md §4.7).
    fn ensure_within_root(&self, path: &Path) -> Result<(), UploadError> {
        if path.starts_with(&self.root) {
            Ok(())
        } else {
            Err(UploadError::UnsafeTempPath)
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn write_new(&self, data: &[u8]) -> Result<Uuid, UploadError> {
        if self.count_items().await? >= self.max_items {
            return Err(UploadError::LimitExceeded);
        }

        let suffix: u32 = rand::rng().random();
        let tmp_path = self.root.join(format!("tmp-{suffix:08x}"));
        self.ensure_within_root(&tmp_path)?;

        let mut file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;
        file.write_all(data).await.map_err(|e| UploadError::Io(e.to_string()))?;
        file.flush().await.map_err(|e| UploadError::Io(e.to_string()))?;
        drop(file);

        #[cfg(unix)]
        fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o640))
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;

        let uuid = Uuid::new_v4();
        let dest = self.path_for(uuid);

        let rename_result = fs::rename(&tmp_path, &dest).await;
        // Always unlink the temp source; on a renamed success the source is
        // already gone so this is a best-effort no-op.
        let _ = fs::remove_file(&tmp_path).await;

        if let Err(e) = rename_result {
            let _ = fs::remove_file(&dest).await;
            return Err(UploadError::Io(e.to_string()));
        }

        Ok(uuid)
    }

    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>, UploadError> {
        let path = self.path_for(uuid);
        self.ensure_within_root(&path)?;
        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await.map_err(|e| UploadError::Io(e.to_string()))?;
        Ok(buf)
    }

    async fn read_chunked<'a>(&self, uuid: Uuid) -> Result<tokio::fs::File, UploadError> {
        let path = self.path_for(uuid);
        self.ensure_within_root(&path)?;
        fs::File::open(&path).await.map_err(|e| UploadError::Io(e.to_string()))
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), UploadError> {
        let path = self.path_for(uuid);
        self.ensure_within_root(&path)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::Io(e.to_string())),
        }
    }

    async fn count_items(&self) -> Result<u64, UploadError> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| UploadError::Io(e.to_string()))?;
        let mut count = 0u64;
        while let Some(entry) = entries.next_entry().await.map_err(|e| UploadError::Io(e.to_string()))? {
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                if !name.starts_with("tmp-") {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), 100).unwrap();

        let uuid = storage.write_new(b"hello world").await.unwrap();
        let data = storage.read(uuid).await.unwrap();
        assert_eq!(data, b"hello world");
        assert_eq!(storage.count_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent_when_file_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), 100).unwrap();
        let uuid = Uuid::new_v4();
        assert!(storage.delete(uuid).await.is_ok());
    }

    #[tokio::test]
    async fn write_fails_once_item_cap_is_reached() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), 1).unwrap();
        storage.write_new(b"first").await.unwrap();
        let result = storage.write_new(b"second").await;
        assert!(matches!(result, Err(UploadError::LimitExceeded)));
    }
}
