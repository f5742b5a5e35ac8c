use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Session,
};

/// Date bounds compare against the stored `fecha_inicio` string, so both
/// plain dates (`2024-01-31`) and full timestamps work.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: i64,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> AppResult<Session>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>>;
    /// Newest first.
    async fn list(&self, filter: &SessionFilter) -> AppResult<Vec<Session>>;
    async fn list_all(&self) -> AppResult<Vec<Session>>;
    async fn update(&self, session: Session) -> AppResult<Session>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

pub struct MongoSessionRepository {
    collection: Collection<Session>,
}

impl MongoSessionRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for sessions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let started_index = IndexModel::builder()
            .keys(doc! { "fecha_inicio": -1 })
            .options(
                IndexOptions::builder()
                    .name("fecha_inicio_desc".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(started_index).await?;

        log::info!("Successfully created indexes for sessions collection");
        Ok(())
    }
}

fn date_filter(filter: &SessionFilter) -> Document {
    let mut range = Document::new();
    if let Some(from) = &filter.from {
        range.insert("$gte", from.as_str());
    }
    if let Some(to) = &filter.to {
        range.insert("$lte", to.as_str());
    }

    if range.is_empty() {
        doc! {}
    } else {
        doc! { "fecha_inicio": range }
    }
}

#[async_trait]
impl SessionRepository for MongoSessionRepository {
    async fn create(&self, session: Session) -> AppResult<Session> {
        self.collection.insert_one(&session).await?;
        Ok(session)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>> {
        let session = self.collection.find_one(doc! { "id": id }).await?;
        Ok(session)
    }

    async fn list(&self, filter: &SessionFilter) -> AppResult<Vec<Session>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "fecha_inicio": -1 })
            .limit(Some(filter.limit))
            .build();

        let cursor = self
            .collection
            .find(date_filter(filter))
            .with_options(find_options)
            .await?;
        let items: Vec<Session> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn list_all(&self) -> AppResult<Vec<Session>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "fecha_inicio": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! {})
            .with_options(find_options)
            .await?;
        let items: Vec<Session> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn update(&self, session: Session) -> AppResult<Session> {
        let result = self
            .collection
            .replace_one(doc! { "id": &session.id }, &session)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Sesión {} no encontrada", session.id)));
        }
        Ok(session)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_filter_is_empty_without_bounds() {
        assert!(date_filter(&SessionFilter::default()).is_empty());
    }

    #[test]
    fn date_filter_uses_inclusive_bounds() {
        let filter = SessionFilter {
            from: Some("2024-01-01".to_string()),
            to: Some("2024-02-01".to_string()),
            limit: 10,
        };

        let document = date_filter(&filter);
        let range = document.get_document("fecha_inicio").unwrap();

        assert_eq!(range.get_str("$gte").unwrap(), "2024-01-01");
        assert_eq!(range.get_str("$lte").unwrap(), "2024-02-01");
    }
}
