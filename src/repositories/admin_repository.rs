use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Admin,
};

use super::is_duplicate_key;

/// Emails passed in must already be normalized.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>>;
    /// Ordered by email.
    async fn list(&self) -> AppResult<Vec<Admin>>;
    async fn create(&self, admin: Admin) -> AppResult<Admin>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, email: &str) -> AppResult<bool>;
}

pub struct MongoAdminRepository {
    collection: Collection<Admin>,
}

impl MongoAdminRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for admins collection");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(email_index).await?;

        log::info!("Successfully created indexes for admins collection");
        Ok(())
    }
}

#[async_trait]
impl AdminRepository for MongoAdminRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let admin = self
            .collection
            .find_one(doc! { "id": email, "email": email })
            .await?;
        Ok(admin)
    }

    async fn list(&self) -> AppResult<Vec<Admin>> {
        let find_options = FindOptions::builder().sort(doc! { "email": 1 }).build();
        let cursor = self
            .collection
            .find(doc! {})
            .with_options(find_options)
            .await?;
        let items: Vec<Admin> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn create(&self, admin: Admin) -> AppResult<Admin> {
        match self.collection.insert_one(&admin).await {
            Ok(_) => Ok(admin),
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyExists(format!(
                "El administrador {} ya existe",
                admin.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, email: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "id": email, "email": email })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
