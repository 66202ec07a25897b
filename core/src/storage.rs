use std::io;
use std::path::Path;

/// What [`ensure_storage_dir`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDir {
    Existing,
    Created,
}

/// Make sure the extension's global storage directory exists.
///
/// Only the directory itself is created; its parent belongs to the host.
pub async fn ensure_storage_dir(path: &Path) -> io::Result<StorageDir> {
    if tokio::fs::try_exists(path).await? {
        return Ok(StorageDir::Existing);
    }
    tokio::fs::create_dir(path).await?;
    tracing::debug!(path = %path.display(), "Created global storage directory");
    Ok(StorageDir::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("globalStorage");

        assert_eq!(ensure_storage_dir(&storage).await.unwrap(), StorageDir::Created);
        assert!(storage.is_dir());
        assert_eq!(ensure_storage_dir(&storage).await.unwrap(), StorageDir::Existing);
    }

    #[tokio::test]
    async fn leaves_existing_directory_alone() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        std::fs::write(&marker, "keep").unwrap();

        assert_eq!(ensure_storage_dir(dir.path()).await.unwrap(), StorageDir::Existing);
        assert_eq!(std::fs::read_to_string(marker).unwrap(), "keep");
    }

    #[tokio::test]
    async fn missing_parent_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("absent").join("globalStorage");

        assert!(ensure_storage_dir(&storage).await.is_err());
        assert!(!storage.exists());
    }
}
