//! Bucketed object storage for uploaded images

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, StorageConfig};
use crate::error::{FieldErrors, ServiceError};

pub const HEADSHOT_BUCKET: &str = "advisor-headshots";
pub const BLOG_IMAGE_BUCKET: &str = "blog-images";
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `bucket/key` and return the public URL.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError>;
}

/// Files on local disk, served by the API under `/storage`
pub struct LocalStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalStore {
    pub fn new(dir: PathBuf, public_base_url: String) -> Self {
        Self {
            dir,
            public_base_url,
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, ServiceError> {
        let bucket_dir = self.dir.join(bucket);
        tokio::fs::create_dir_all(&bucket_dir)
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to create {}: {}", bucket_dir.display(), e)))?;
        tokio::fs::write(bucket_dir.join(key), bytes)
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to write {}/{}: {}", bucket, key, e)))?;
        Ok(format!("{}/storage/{}/{}", self.public_base_url, bucket, key))
    }
}

/// Supabase-storage compatible HTTP endpoint
pub struct HttpStore {
    client: Client,
    url: String,
    service_key: String,
}

impl HttpStore {
    pub fn new(url: String, service_key: String) -> Self {
        Self {
            client: Client::new(),
            url,
            service_key,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(format!("{}/object/{}/{}", self.url, bucket, key))
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Storage(format!("Upload rejected ({}): {}", status, body)));
        }

        Ok(format!("{}/object/public/{}/{}", self.url, bucket, key))
    }
}

pub fn from_config(config: &Config) -> Arc<dyn ObjectStore> {
    match &config.storage {
        StorageConfig::Local { dir } => {
            Arc::new(LocalStore::new(dir.clone(), config.public_base_url.clone()))
        }
        StorageConfig::Http { url, service_key } => {
            Arc::new(HttpStore::new(url.clone(), service_key.clone()))
        }
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Check type and size, then store the image under a fresh `uuid.ext` key.
pub async fn upload_image(
    store: &dyn ObjectStore,
    bucket: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<String, ServiceError> {
    let mut errors = FieldErrors::new();
    let ext = extension_for(content_type);
    if ext.is_none() {
        errors.add("file", "Only JPEG, PNG, WebP or GIF images are accepted");
    }
    if bytes.is_empty() {
        errors.add("file", "File is empty");
    } else if bytes.len() > MAX_UPLOAD_BYTES {
        errors.add("file", "Images must be 5 MB or smaller");
    }
    errors.into_result()?;

    let key = format!("{}.{}", Uuid::new_v4(), ext.unwrap_or("bin"));
    let size = bytes.len();
    let url = store.put(bucket, &key, bytes, content_type).await?;
    info!(bucket, key = %key, size, "Image stored");
    Ok(url)
}
