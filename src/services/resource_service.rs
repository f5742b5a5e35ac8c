use std::sync::Arc;

use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::{AppError, AppResult},
    storage::{BlobContent, BlobInfo, BlobStore},
};

pub const MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "pptx", "xlsx", "txt"];

const DOWNLOAD_LINK_HOURS: i64 = 24;
const INDUCTION_VIDEO_LINK_DAYS: i64 = 30;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Video,
    Document,
}

impl ResourceKind {
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Video => VIDEO_EXTENSIONS,
            ResourceKind::Document => DOCUMENT_EXTENSIONS,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ResourceKind::Video => "Video",
            ResourceKind::Document => "Documento",
        }
    }
}

/// File received from a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Lower-cased extension without the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

pub fn check_extension(file_name: &str, kind: ResourceKind) -> AppResult<()> {
    let allowed = kind.allowed_extensions();
    match extension_of(file_name) {
        Some(extension) if allowed.contains(&extension.as_str()) => Ok(()),
        _ => Err(AppError::ValidationError(format!(
            "Tipo de archivo no permitido. Use: {}",
            allowed.join(", ")
        ))),
    }
}

/// Keeps only the base name and replaces anything outside
/// `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_file_name(file_name: &str) -> AppResult<String> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches(['.', '_']);

    if cleaned.is_empty() {
        return Err(AppError::ValidationError(
            "Nombre de archivo inválido".to_string(),
        ));
    }
    Ok(cleaned.to_string())
}

pub struct ResourceService {
    store: Option<Arc<dyn BlobStore>>,
    videos_container: String,
    documents_container: String,
}

impl ResourceService {
    pub fn new(
        store: Option<Arc<dyn BlobStore>>,
        videos_container: &str,
        documents_container: &str,
    ) -> Self {
        Self {
            store,
            videos_container: videos_container.to_string(),
            documents_container: documents_container.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> AppResult<&Arc<dyn BlobStore>> {
        self.store.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Azure Storage no está configurado".to_string())
        })
    }

    fn container(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::Video => &self.videos_container,
            ResourceKind::Document => &self.documents_container,
        }
    }

    pub async fn ensure_containers(&self) -> AppResult<()> {
        let store = self.store()?;
        store.ensure_container(&self.videos_container).await?;
        store.ensure_container(&self.documents_container).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.store()?.health_check().await
    }

    pub async fn list(&self, kind: ResourceKind) -> AppResult<Vec<BlobInfo>> {
        self.store()?.list(self.container(kind)).await
    }

    async fn require_existing(&self, kind: ResourceKind, name: &str) -> AppResult<()> {
        if !self.store()?.exists(self.container(kind), name).await? {
            return Err(AppError::NotFound(format!("{} no encontrado", kind.label())));
        }
        Ok(())
    }

    /// Read-only link valid for 24 hours.
    pub async fn download_link(&self, kind: ResourceKind, name: &str) -> AppResult<String> {
        self.require_existing(kind, name).await?;
        self.store()?
            .signed_url(
                self.container(kind),
                name,
                Duration::hours(DOWNLOAD_LINK_HOURS),
            )
            .await
    }

    pub async fn download_document(&self, name: &str) -> AppResult<BlobContent> {
        let store = self.store()?;
        store
            .download(&self.documents_container, name)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Documento no encontrado".to_string()),
                other => other,
            })
    }

    /// Stores a new resource; an existing blob with the same name is a
    /// conflict.
    pub async fn upload(&self, kind: ResourceKind, file: UploadedFile) -> AppResult<String> {
        let store = self.store()?;
        check_extension(&file.file_name, kind)?;
        let name = sanitize_file_name(&file.file_name)?;

        store
            .upload(self.container(kind), &name, file.data, file.content_type, false)
            .await
            .map_err(|e| match e {
                AppError::AlreadyExists(_) => {
                    AppError::AlreadyExists(format!("Ya existe un archivo llamado {}", name))
                }
                other => other,
            })
    }

    pub async fn delete(&self, kind: ResourceKind, name: &str) -> AppResult<()> {
        self.store()?
            .delete(self.container(kind), name)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(format!("{} no encontrado", kind.label())),
                other => other,
            })?;
        log::info!("Deleted {} {}", kind.label().to_lowercase(), name);
        Ok(())
    }

    /// Replaces the onboarding video and returns a 30-day read link to it.
    pub async fn upload_induction_video(&self, file: UploadedFile) -> AppResult<String> {
        let store = self.store()?;
        check_extension(&file.file_name, ResourceKind::Video)?;
        if file.data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::ValidationError(format!(
                "El archivo es demasiado grande. Máximo: {}MB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        let name = sanitize_file_name(&file.file_name)?;

        store
            .upload(&self.videos_container, &name, file.data, file.content_type, true)
            .await?;
        store
            .signed_url(
                &self.videos_container,
                &name,
                Duration::days(INDUCTION_VIDEO_LINK_DAYS),
            )
            .await
    }
}
