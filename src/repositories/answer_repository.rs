use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::QuizAnswer};

#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn create(&self, answer: QuizAnswer) -> AppResult<QuizAnswer>;
    /// Lists below are newest first.
    async fn list_by_session(&self, session_id: &str) -> AppResult<Vec<QuizAnswer>>;
    async fn list_by_session_and_quiz(
        &self,
        session_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAnswer>>;
    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAnswer>>;
    async fn list_all(&self) -> AppResult<Vec<QuizAnswer>>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

pub struct MongoAnswerRepository {
    collection: Collection<QuizAnswer>,
}

impl MongoAnswerRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for answers collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let session_index = IndexModel::builder()
            .keys(doc! { "sesion_id": 1, "cuestionario_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("sesion_cuestionario".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(session_index).await?;

        log::info!("Successfully created indexes for answers collection");
        Ok(())
    }

    async fn newest_first(&self, filter: Document) -> AppResult<Vec<QuizAnswer>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "fecha_completado": -1 })
            .build();
        let cursor = self.collection.find(filter).with_options(find_options).await?;
        let items: Vec<QuizAnswer> = cursor.try_collect().await?;
        Ok(items)
    }
}

#[async_trait]
impl AnswerRepository for MongoAnswerRepository {
    async fn create(&self, answer: QuizAnswer) -> AppResult<QuizAnswer> {
        self.collection.insert_one(&answer).await?;
        Ok(answer)
    }

    async fn list_by_session(&self, session_id: &str) -> AppResult<Vec<QuizAnswer>> {
        self.newest_first(doc! { "sesion_id": session_id }).await
    }

    async fn list_by_session_and_quiz(
        &self,
        session_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAnswer>> {
        self.newest_first(doc! { "sesion_id": session_id, "cuestionario_id": quiz_id })
            .await
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAnswer>> {
        self.newest_first(doc! { "cuestionario_id": quiz_id }).await
    }

    async fn list_all(&self) -> AppResult<Vec<QuizAnswer>> {
        self.newest_first(doc! {}).await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
