use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::UserProgress,
};

use super::is_duplicate_key;

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>>;
    async fn create(&self, progress: UserProgress) -> AppResult<UserProgress>;
    async fn update(&self, progress: UserProgress) -> AppResult<UserProgress>;
}

pub struct MongoProgressRepository {
    collection: Collection<UserProgress>,
}

impl MongoProgressRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for progress collection");

        let user_index = IndexModel::builder()
            .keys(doc! { "usuario_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("usuario_id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(user_index).await?;

        log::info!("Successfully created indexes for progress collection");
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for MongoProgressRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
        let progress = self
            .collection
            .find_one(doc! { "usuario_id": user_id })
            .await?;
        Ok(progress)
    }

    async fn create(&self, progress: UserProgress) -> AppResult<UserProgress> {
        match self.collection.insert_one(&progress).await {
            Ok(_) => Ok(progress),
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyExists(format!(
                "Ya existe progreso para el usuario {}",
                progress.user_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, progress: UserProgress) -> AppResult<UserProgress> {
        let result = self
            .collection
            .replace_one(
                doc! { "id": &progress.id, "usuario_id": &progress.user_id },
                &progress,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Progreso no encontrado para el usuario {}",
                progress.user_id
            )));
        }
        Ok(progress)
    }
}
