use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::InductionConfiguration,
};

use super::is_duplicate_key;

pub(crate) fn version_conflict(id: &str) -> AppError {
    AppError::Conflict(format!(
        "La configuración {} fue modificada por otra solicitud, intente de nuevo",
        id
    ))
}

#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    async fn find(&self, id: &str, kind: &str) -> AppResult<Option<InductionConfiguration>>;
    /// Stores a configuration that did not exist yet, at version 1. Losing
    /// a concurrent first write yields `Conflict`.
    async fn create(&self, config: InductionConfiguration) -> AppResult<InductionConfiguration>;
    /// Writes `config` only if the stored version still equals
    /// `config.version`; the stored copy gets the next version. A mismatch
    /// yields `Conflict`.
    async fn replace(&self, config: InductionConfiguration) -> AppResult<InductionConfiguration>;
}

pub struct MongoConfigurationRepository {
    collection: Collection<InductionConfiguration>,
}

impl MongoConfigurationRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for configuration collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "tipo": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("tipo_id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        log::info!("Successfully created indexes for configuration collection");
        Ok(())
    }
}

#[async_trait]
impl ConfigurationRepository for MongoConfigurationRepository {
    async fn find(&self, id: &str, kind: &str) -> AppResult<Option<InductionConfiguration>> {
        let config = self
            .collection
            .find_one(doc! { "id": id, "tipo": kind })
            .await?;
        Ok(config)
    }

    async fn create(
        &self,
        mut config: InductionConfiguration,
    ) -> AppResult<InductionConfiguration> {
        config.version = 1;
        match self.collection.insert_one(&config).await {
            Ok(_) => Ok(config),
            Err(e) if is_duplicate_key(&e) => Err(version_conflict(&config.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(
        &self,
        mut config: InductionConfiguration,
    ) -> AppResult<InductionConfiguration> {
        let expected = config.version;
        config.version = expected + 1;

        let result = self
            .collection
            .replace_one(
                doc! { "id": &config.id, "tipo": &config.kind, "version": expected },
                &config,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(version_conflict(&config.id));
        }
        Ok(config)
    }
}
