use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    storage::{BlobContent, BlobInfo, BlobStore},
};

#[derive(Clone)]
struct StoredBlob {
    content: BlobContent,
    info: BlobInfo,
}

/// Process-local blob store for tests. URLs use the `memory://` scheme.
#[derive(Default, Clone)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<BTreeMap<(String, String), StoredBlob>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn url(container: &str, name: &str) -> String {
        format!("memory://{}/{}", container, name)
    }
}

fn key(container: &str, name: &str) -> (String, String) {
    (container.to_string(), name.to_string())
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        container: &str,
        name: &str,
        data: Vec<u8>,
        content_type: Option<String>,
        overwrite: bool,
    ) -> AppResult<String> {
        let mut blobs = self.blobs.write().await;
        if !overwrite && blobs.contains_key(&key(container, name)) {
            return Err(AppError::AlreadyExists(format!(
                "Blob {}/{}",
                container, name
            )));
        }

        let info = BlobInfo {
            name: name.to_string(),
            size: data.len() as u64,
            last_modified: Some(Utc::now()),
        };
        blobs.insert(
            key(container, name),
            StoredBlob {
                content: BlobContent { data, content_type },
                info,
            },
        );
        Ok(Self::url(container, name))
    }

    async fn download(&self, container: &str, name: &str) -> AppResult<BlobContent> {
        self.blobs
            .read()
            .await
            .get(&key(container, name))
            .map(|b| b.content.clone())
            .ok_or_else(|| AppError::NotFound(format!("Blob {}/{}", container, name)))
    }

    async fn delete(&self, container: &str, name: &str) -> AppResult<()> {
        self.blobs
            .write()
            .await
            .remove(&key(container, name))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Blob {}/{}", container, name)))
    }

    async fn list(&self, container: &str) -> AppResult<Vec<BlobInfo>> {
        let blobs = self.blobs.read().await;
        Ok(blobs
            .iter()
            .filter(|((c, _), _)| c == container)
            .map(|(_, b)| b.info.clone())
            .collect())
    }

    async fn exists(&self, container: &str, name: &str) -> AppResult<bool> {
        Ok(self.blobs.read().await.contains_key(&key(container, name)))
    }

    async fn signed_url(&self, container: &str, name: &str, ttl: Duration) -> AppResult<String> {
        let expiry = (Utc::now() + ttl).timestamp();
        Ok(format!("{}?se={}", Self::url(container, name), expiry))
    }

    async fn ensure_container(&self, _container: &str) -> AppResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_without_overwrite_rejects_duplicates() {
        let store = InMemoryBlobStore::new();
        store
            .upload("recursos", "a.pdf", vec![1, 2, 3], None, false)
            .await
            .unwrap();

        let err = store
            .upload("recursos", "a.pdf", vec![4], None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));

        store
            .upload("recursos", "a.pdf", vec![4], None, true)
            .await
            .unwrap();
        assert_eq!(store.download("recursos", "a.pdf").await.unwrap().data, vec![4]);
    }

    #[tokio::test]
    async fn list_is_scoped_to_container() {
        let store = InMemoryBlobStore::new();
        store.upload("recursos", "a.pdf", vec![0; 5], None, false).await.unwrap();
        store.upload("videoinduccion", "v.mp4", vec![0; 9], None, false).await.unwrap();

        let listed = store.list("recursos").await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "a.pdf");
        assert_eq!(listed[0].size, 5);
    }

    #[tokio::test]
    async fn deleting_missing_blob_is_not_found() {
        let store = InMemoryBlobStore::new();
        let err = store.delete("recursos", "nada.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
