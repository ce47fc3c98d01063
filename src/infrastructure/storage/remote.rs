use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use zeroize::Zeroizing;

use crate::{
    entities::image::ImageUpload,
    errors::StorageError,
    repositories::storage::ObjectStorage,
    settings::AppConfig,
    utils::storage_path::{is_valid_object_path, path_from_url},
};

/// Bucket storage reached over HTTP: `PUT`/`DELETE {endpoint}/{bucket}/{path}`
/// with a bearer token; objects are publicly readable under `public_base_url`.
#[derive(Clone)]
pub struct RemoteObjectStorage {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Zeroizing<String>,
    public_base_url: String,
}

impl RemoteObjectStorage {
    pub fn new(config: &AppConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.storage_timeout_secs))
            .build()
            .map_err(|e| StorageError::Http(e.to_string()))?;

        Ok(RemoteObjectStorage {
            client,
            endpoint: config.storage_endpoint.trim_end_matches('/').to_string(),
            bucket: config.storage_bucket.clone(),
            token: Zeroizing::new(config.storage_token.clone()),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}/{}", self.endpoint, self.bucket, encoded)
    }
}

#[async_trait]
impl ObjectStorage for RemoteObjectStorage {
    async fn upload(&self, image: &ImageUpload, path: &str) -> Result<String, StorageError> {
        if !is_valid_object_path(path) {
            return Err(StorageError::UnknownReference(path.to_string()));
        }

        self.client
            .put(self.object_url(path))
            .bearer_auth(self.token.as_str())
            .header(header::CONTENT_TYPE, &image.content_type)
            .body(image.bytes.clone())
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(path, size = image.size(), "Uploaded image to bucket");
        Ok(format!("{}/{}", self.public_base_url, path))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let path = path_from_url(&self.public_base_url, url)
            .ok_or_else(|| StorageError::UnknownReference(url.to_string()))?;

        let response = self.client
            .delete(self.object_url(path))
            .bearer_auth(self.token.as_str())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::UnknownReference(url.to_string()));
        }
        response.error_for_status()?;
        Ok(())
    }

    async fn check(&self) -> Result<(), StorageError> {
        self.client
            .head(format!("{}/{}", self.endpoint, self.bucket))
            .bearer_auth(self.token.as_str())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
