use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::{
    entities::image::ImageUpload,
    errors::StorageError,
    repositories::storage::ObjectStorage,
    utils::storage_path::{is_valid_object_path, path_from_url},
};

/// Stores images on the local filesystem; they are served back under `/media`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        LocalObjectStorage {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Filesystem location of an object path, if the path is acceptable.
    pub fn resolve(&self, object_path: &str) -> Option<PathBuf> {
        is_valid_object_path(object_path).then(|| self.root.join(object_path))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, image: &ImageUpload, path: &str) -> Result<String, StorageError> {
        let target = self
            .resolve(path)
            .ok_or_else(|| StorageError::UnknownReference(path.to_string()))?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &image.bytes).await?;

        tracing::debug!(path, size = image.size(), "Stored image locally");
        Ok(format!("{}/{}", self.public_base_url, path))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let target = path_from_url(&self.public_base_url, url)
            .and_then(|path| self.resolve(path))
            .ok_or_else(|| StorageError::UnknownReference(url.to_string()))?;

        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::UnknownReference(url.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn check(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageUpload {
        ImageUpload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn upload_then_delete_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost/media/");

        let url = storage.upload(&image(), "pages/1_a.png").await.unwrap();
        assert_eq!(url, "http://localhost/media/pages/1_a.png");
        assert!(dir.path().join("pages/1_a.png").exists());

        storage.delete(&url).await.unwrap();
        assert!(!dir.path().join("pages/1_a.png").exists());
    }

    #[tokio::test]
    async fn deleting_foreign_url_is_unknown_reference() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost/media");

        let err = storage.delete("https://other.host/pages/1_a.png").await.unwrap_err();
        assert!(matches!(err, StorageError::UnknownReference(_)));
    }

    #[tokio::test]
    async fn traversal_paths_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost/media");

        assert!(storage.upload(&image(), "../escape.png").await.is_err());
    }
}
