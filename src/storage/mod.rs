pub mod azure;
pub mod listing;
pub mod memory;
pub mod sas;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::errors::AppResult;

pub use azure::AzureBlobStore;
pub use memory::InMemoryBlobStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobInfo {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tamano")]
    pub size: u64,
    #[serde(
        rename = "ultima_modificacion",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlobContent {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Container-scoped file storage. Missing blobs surface as `NotFound`,
/// uploads that would replace an existing blob without `overwrite` as
/// `AlreadyExists`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the plain (unsigned) URL of the stored blob.
    async fn upload(
        &self,
        container: &str,
        name: &str,
        data: Vec<u8>,
        content_type: Option<String>,
        overwrite: bool,
    ) -> AppResult<String>;
    async fn download(&self, container: &str, name: &str) -> AppResult<BlobContent>;
    async fn delete(&self, container: &str, name: &str) -> AppResult<()>;
    async fn list(&self, container: &str) -> AppResult<Vec<BlobInfo>>;
    async fn exists(&self, container: &str, name: &str) -> AppResult<bool>;
    /// Read-only link valid for `ttl`.
    async fn signed_url(&self, container: &str, name: &str, ttl: Duration) -> AppResult<String>;
    async fn ensure_container(&self, container: &str) -> AppResult<()>;
    async fn health_check(&self) -> AppResult<()>;
}
