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
    models::domain::Question,
};

/// Questions are partitioned by `cuestionario_id`; single-question reads and
/// writes always carry both keys.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, question: Question) -> AppResult<Question>;
    async fn find(&self, id: &str, quiz_id: &str) -> AppResult<Option<Question>>;
    /// Active questions of one quiz ordered by `orden`.
    async fn list_active_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Question>>;
    /// Active questions of every quiz ordered by quiz and `orden`.
    async fn list_active(&self) -> AppResult<Vec<Question>>;
    /// Every question, inactive ones included, ordered by quiz and `orden`.
    async fn list_all(&self) -> AppResult<Vec<Question>>;
    async fn update(&self, question: Question) -> AppResult<Question>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "cuestionario_id": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("cuestionario_id_id_unique".to_string())
                    .build(),
            )
            .build();

        let order_index = IndexModel::builder()
            .keys(doc! { "cuestionario_id": 1, "activo": 1, "orden": 1 })
            .options(
                IndexOptions::builder()
                    .name("cuestionario_activo_orden".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(order_index).await?;

        log::info!("Successfully created indexes for questions collection");
        Ok(())
    }

    async fn find_sorted(&self, filter: Document, sort: Document) -> AppResult<Vec<Question>> {
        let find_options = FindOptions::builder().sort(sort).build();
        let cursor = self.collection.find(filter).with_options(find_options).await?;
        let items: Vec<Question> = cursor.try_collect().await?;
        Ok(items)
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn create(&self, question: Question) -> AppResult<Question> {
        self.collection.insert_one(&question).await?;
        Ok(question)
    }

    async fn find(&self, id: &str, quiz_id: &str) -> AppResult<Option<Question>> {
        let question = self
            .collection
            .find_one(doc! { "id": id, "cuestionario_id": quiz_id })
            .await?;
        Ok(question)
    }

    async fn list_active_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Question>> {
        self.find_sorted(
            doc! { "cuestionario_id": quiz_id, "activo": true },
            doc! { "orden": 1 },
        )
        .await
    }

    async fn list_active(&self) -> AppResult<Vec<Question>> {
        self.find_sorted(
            doc! { "activo": true },
            doc! { "cuestionario_id": 1, "orden": 1 },
        )
        .await
    }

    async fn list_all(&self) -> AppResult<Vec<Question>> {
        self.find_sorted(doc! {}, doc! { "cuestionario_id": 1, "orden": 1 })
            .await
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let result = self
            .collection
            .replace_one(
                doc! { "id": &question.id, "cuestionario_id": &question.quiz_id },
                &question,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Pregunta {} no encontrada",
                question.id
            )));
        }
        Ok(question)
    }
}
