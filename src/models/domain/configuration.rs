use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INDUCTION_CONFIG_ID: &str = "induccion_general";
pub const INDUCTION_CONFIG_KIND: &str = "induccion";

const DEFAULT_TITLE: &str = "Inducción gestión por procesos";
const DEFAULT_VIDEO_URL: &str = "/videos/induccion.mp4";
const DEFAULT_DESCRIPTION: &str =
    "En esta sesión cubriremos los pilares fundamentales de nuestra organización.";

/// Singleton configuration document for the onboarding page. Resource
/// documents are embedded and rewritten together with the parent.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct InductionConfiguration {
    pub id: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "documentos", default)]
    pub documents: Vec<ResourceDocument>,
    #[serde(
        rename = "fecha_modificacion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_at: Option<DateTime<Utc>>,
    /// Bumped on every write; writers must present the version they read.
    #[serde(default)]
    pub version: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceDocument {
    pub id: String,
    #[serde(rename = "tipo")]
    pub kind: DocumentKind,
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "orden", default = "default_order")]
    pub order: i32,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

fn default_order() -> i32 {
    999
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Xlsx,
    Pptx,
    Link,
    Otro,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::Pdf,
        DocumentKind::Docx,
        DocumentKind::Xlsx,
        DocumentKind::Pptx,
        DocumentKind::Link,
        DocumentKind::Otro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Xlsx => "xlsx",
            DocumentKind::Pptx => "pptx",
            DocumentKind::Link => "link",
            DocumentKind::Otro => "otro",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        DocumentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == value)
            .ok_or_else(|| {
                let valid: Vec<&str> = DocumentKind::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "Tipo de archivo inválido. Debe ser uno de: {}",
                    valid.join(", ")
                )
            })
    }
}

impl ResourceDocument {
    pub fn new(kind: DocumentKind, name: &str, url: &str, description: &str, order: i32) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        ResourceDocument {
            id: format!("doc_{}", &suffix[..8]),
            kind,
            name: name.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            order,
            active: true,
        }
    }
}

impl Default for InductionConfiguration {
    fn default() -> Self {
        InductionConfiguration {
            id: INDUCTION_CONFIG_ID.to_string(),
            kind: INDUCTION_CONFIG_KIND.to_string(),
            title: DEFAULT_TITLE.to_string(),
            video_url: DEFAULT_VIDEO_URL.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            documents: Vec::new(),
            modified_at: None,
            version: 0,
        }
    }
}

impl InductionConfiguration {
    /// Documents sorted by `orden`, optionally restricted to active ones.
    pub fn sorted_documents(&self, only_active: bool) -> Vec<ResourceDocument> {
        let mut documents: Vec<ResourceDocument> = self
            .documents
            .iter()
            .filter(|d| !only_active || d.active)
            .cloned()
            .collect();
        documents.sort_by_key(|d| d.order);
        documents
    }

    pub fn document(&self, id: &str) -> Option<&ResourceDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn document_mut(&mut self, id: &str) -> Option<&mut ResourceDocument> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    pub fn next_order(&self) -> i32 {
        self.documents.len() as i32 + 1
    }

    /// Returns `false` when no document had the given id.
    pub fn remove_document(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        self.documents.len() != before
    }

    /// Assigns `orden = position + 1` to every listed document, skipping
    /// unknown ids. A repeated id keeps its first position. Returns how many
    /// distinct documents were reordered.
    pub fn reorder(&mut self, ids: &[String]) -> usize {
        let mut seen = HashSet::new();
        let mut updated = 0;
        for (position, id) in ids.iter().enumerate() {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if let Some(document) = self.document_mut(id) {
                document.order = position as i32 + 1;
                updated += 1;
            }
        }
        updated
    }
}
