use std::{collections::HashSet, sync::Arc};

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            configuration::{INDUCTION_CONFIG_ID, INDUCTION_CONFIG_KIND},
            DocumentKind, InductionConfiguration, ResourceDocument,
        },
        dto::request::{CreateDocumentRequest, UpdateDocumentRequest, UpdateInductionRequest},
    },
    repositories::ConfigurationRepository,
    services::{
        required_field,
        resource_service::{ResourceService, UploadedFile},
    },
};

/// Onboarding page configuration and its embedded resource documents.
/// Every write is a read-modify-write of the whole document guarded by its
/// version.
pub struct ConfigurationService {
    repository: Arc<dyn ConfigurationRepository>,
    resources: Arc<ResourceService>,
}

fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    let value = required_field(value, field)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Se requiere el campo {}",
            field
        )));
    }
    Ok(value.to_string())
}

fn parse_kind(value: &str) -> AppResult<DocumentKind> {
    value.parse().map_err(AppError::ValidationError)
}

fn document_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Documento {} no encontrado", id))
}

impl ConfigurationService {
    pub fn new(
        repository: Arc<dyn ConfigurationRepository>,
        resources: Arc<ResourceService>,
    ) -> Self {
        Self {
            repository,
            resources,
        }
    }

    async fn stored(&self) -> AppResult<Option<InductionConfiguration>> {
        self.repository
            .find(INDUCTION_CONFIG_ID, INDUCTION_CONFIG_KIND)
            .await
    }

    /// Stored configuration, or the built-in default when none was saved.
    pub async fn get(&self) -> AppResult<InductionConfiguration> {
        Ok(self.stored().await?.unwrap_or_default())
    }

    async fn modify<T, F>(&self, change: F) -> AppResult<(InductionConfiguration, T)>
    where
        F: FnOnce(&mut InductionConfiguration) -> AppResult<T> + Send,
        T: Send,
    {
        let stored = self.stored().await?;
        let exists = stored.is_some();
        let mut config = stored.unwrap_or_default();

        let outcome = change(&mut config)?;
        config.modified_at = Some(Utc::now());

        let config = if exists {
            self.repository.replace(config).await?
        } else {
            self.repository.create(config).await?
        };
        Ok((config, outcome))
    }

    pub async fn update_induction(
        &self,
        request: UpdateInductionRequest,
    ) -> AppResult<InductionConfiguration> {
        let title = required_text(request.titulo, "titulo")?;
        let description = required_text(request.descripcion, "descripcion")?;
        let video_url = request.video_url.map(|u| u.trim().to_string());

        let (config, _) = self
            .modify(move |config| {
                config.title = title;
                config.description = description;
                if let Some(video_url) = video_url {
                    config.video_url = video_url;
                }
                Ok(())
            })
            .await?;

        log::info!("Updated induction configuration (version {})", config.version);
        Ok(config)
    }

    /// Uploads the onboarding video and points the configuration at a
    /// signed link to it.
    pub async fn upload_video(&self, file: UploadedFile) -> AppResult<String> {
        let video_url = self.resources.upload_induction_video(file).await?;

        let stored_url = video_url.clone();
        self.modify(move |config| {
            config.video_url = stored_url;
            Ok(())
        })
        .await?;

        log::info!("Induction video replaced");
        Ok(video_url)
    }

    pub async fn list_documents(&self, only_active: bool) -> AppResult<Vec<ResourceDocument>> {
        Ok(self.get().await?.sorted_documents(only_active))
    }

    /// Inactive documents are reported as gone rather than missing.
    pub async fn get_document(&self, id: &str) -> AppResult<ResourceDocument> {
        let config = self.get().await?;
        let document = config.document(id).ok_or_else(|| document_not_found(id))?;

        if !document.active {
            return Err(AppError::Gone(format!(
                "El documento {} no está disponible",
                id
            )));
        }
        Ok(document.clone())
    }

    pub async fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> AppResult<ResourceDocument> {
        let name = required_text(request.nombre, "nombre")?;
        let kind = parse_kind(&required_text(request.tipo, "tipo")?)?;
        let url = required_text(request.url, "url")?;
        let description = request.descripcion.unwrap_or_default();

        let (_, document) = self
            .modify(move |config| {
                let order = request.orden.unwrap_or_else(|| config.next_order());
                let mut document =
                    ResourceDocument::new(kind, &name, &url, description.trim(), order);
                if let Some(active) = request.activo {
                    document.active = active;
                }
                config.documents.push(document.clone());
                Ok(document)
            })
            .await?;

        log::info!("Created document {} ({})", document.id, document.name);
        Ok(document)
    }

    pub async fn update_document(
        &self,
        id: &str,
        request: UpdateDocumentRequest,
    ) -> AppResult<ResourceDocument> {
        let kind = request.tipo.as_deref().map(parse_kind).transpose()?;
        if request.nombre.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::ValidationError(
                "Se requiere el campo nombre".to_string(),
            ));
        }

        let (_, document) = self
            .modify(|config| {
                let document = config.document_mut(id).ok_or_else(|| document_not_found(id))?;
                if let Some(name) = request.nombre {
                    document.name = name.trim().to_string();
                }
                if let Some(kind) = kind {
                    document.kind = kind;
                }
                if let Some(url) = request.url {
                    document.url = url.trim().to_string();
                }
                if let Some(description) = request.descripcion {
                    document.description = description;
                }
                if let Some(order) = request.orden {
                    document.order = order;
                }
                if let Some(active) = request.activo {
                    document.active = active;
                }
                Ok(document.clone())
            })
            .await?;

        Ok(document)
    }

    /// Hard delete; deactivating is done through `update_document`.
    pub async fn delete_document(&self, id: &str) -> AppResult<()> {
        self.modify(|config| {
            if config.remove_document(id) {
                Ok(())
            } else {
                Err(document_not_found(id))
            }
        })
        .await?;

        log::info!("Deleted document {}", id);
        Ok(())
    }

    pub async fn reorder_documents(&self, ids: Vec<String>) -> AppResult<usize> {
        if ids.is_empty() {
            return Err(AppError::ValidationError(
                "Se requiere una lista de documentos en el campo orden".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(AppError::ValidationError(format!(
                "El documento {} aparece más de una vez en el orden",
                duplicate
            )));
        }
        let (_, updated) = self.modify(|config| Ok(config.reorder(&ids))).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryConfigurationRepository;

    fn service() -> ConfigurationService {
        ConfigurationService::new(
            Arc::new(InMemoryConfigurationRepository::new()),
            Arc::new(ResourceService::new(None, "videoinduccion", "recursos")),
        )
    }

    fn document(name: &str) -> CreateDocumentRequest {
        CreateDocumentRequest {
            nombre: Some(name.to_string()),
            tipo: Some("pdf".to_string()),
            url: Some(format!("https://docs/{}.pdf", name)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_returns_default_before_first_write() {
        let config = service().get().await.unwrap();
        assert_eq!(config.id, "induccion_general");
        assert_eq!(config.version, 0);
        assert!(config.documents.is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_title_and_description() {
        let err = service()
            .update_induction(UpdateInductionRequest {
                titulo: Some("   ".to_string()),
                descripcion: Some("desc".to_string()),
                video_url: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Se requiere el campo titulo");
    }

    #[tokio::test]
    async fn test_update_preserves_documents_and_bumps_version() {
        let service = service();
        service.create_document(document("manual")).await.unwrap();

        let config = service
            .update_induction(UpdateInductionRequest {
                titulo: Some(" Nueva inducción ".to_string()),
                descripcion: Some("Bienvenida".to_string()),
                video_url: None,
            })
            .await
            .unwrap();

        assert_eq!(config.title, "Nueva inducción");
        assert_eq!(config.documents.len(), 1);
        assert_eq!(config.version, 2);
        assert_eq!(config.video_url, "/videos/induccion.mp4");
    }

    #[tokio::test]
    async fn test_documents_default_to_next_order() {
        let service = service();
        let first = service.create_document(document("a")).await.unwrap();
        let second = service.create_document(document("b")).await.unwrap();

        assert_eq!(first.order, 1);
        assert_eq!(second.order, 2);
    }

    #[tokio::test]
    async fn test_invalid_document_kind_is_rejected() {
        let mut request = document("a");
        request.tipo = Some("exe".to_string());

        let err = service().create_document(request).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_inactive_document_is_gone() {
        let service = service();
        let created = service.create_document(document("a")).await.unwrap();

        service
            .update_document(
                &created.id,
                UpdateDocumentRequest {
                    activo: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service.get_document(&created.id).await,
            Err(AppError::Gone(_))
        ));
        assert!(service.list_documents(true).await.unwrap().is_empty());
        assert_eq!(service.list_documents(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_document_is_not_found() {
        let service = service();
        service.create_document(document("a")).await.unwrap();

        assert!(matches!(
            service.delete_document("doc_missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reorder_reports_updated_count() {
        let service = service();
        let a = service.create_document(document("a")).await.unwrap();
        let b = service.create_document(document("b")).await.unwrap();

        let updated = service
            .reorder_documents(vec![b.id.clone(), "doc_x".to_string(), a.id.clone()])
            .await
            .unwrap();

        let ordered: Vec<String> = service
            .list_documents(false)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(updated, 2);
        assert_eq!(ordered, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_reorder_rejects_repeated_ids() {
        let service = service();
        let a = service.create_document(document("a")).await.unwrap();
        let b = service.create_document(document("b")).await.unwrap();

        let err = service
            .reorder_documents(vec![a.id.clone(), b.id.clone(), a.id.clone()])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(service.get_document(&a.id).await.unwrap().order, 1);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let repository = Arc::new(InMemoryConfigurationRepository::new());
        let service = ConfigurationService::new(
            repository.clone(),
            Arc::new(ResourceService::new(None, "videoinduccion", "recursos")),
        );
        service.create_document(document("a")).await.unwrap();

        let mut stale = repository
            .find(INDUCTION_CONFIG_ID, INDUCTION_CONFIG_KIND)
            .await
            .unwrap()
            .unwrap();
        service.create_document(document("b")).await.unwrap();

        stale.title = "perdida".to_string();
        let err = repository.replace(stale).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
