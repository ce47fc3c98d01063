use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::image::ImageUpload, errors::StorageError};

/// Object storage for project images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the payload under `path` and returns its public URL.
    async fn upload(&self, image: &ImageUpload, path: &str) -> Result<String, StorageError>;

    /// Deletes the object behind a URL previously returned by `upload`.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;

    async fn check(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: ObjectStorage + ?Sized> ObjectStorage for Arc<T> {
    async fn upload(&self, image: &ImageUpload, path: &str) -> Result<String, StorageError> {
        (**self).upload(image, path).await
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        (**self).delete(url).await
    }

    async fn check(&self) -> Result<(), StorageError> {
        (**self).check().await
    }
}
