use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::{
    auth::{IdentityProvider, JwtService, MicrosoftIdentityProvider},
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        memory::{
            InMemoryAdminRepository, InMemoryAnswerRepository, InMemoryConfigurationRepository,
            InMemoryProgressRepository, InMemoryQuestionRepository, InMemorySessionRepository,
        },
        AdminRepository, AnswerRepository, ConfigurationRepository, MongoAdminRepository,
        MongoAnswerRepository, MongoConfigurationRepository, MongoProgressRepository,
        MongoQuestionRepository, MongoSessionRepository, ProgressRepository, QuestionRepository,
        SessionRepository,
    },
    services::{
        admin_service::AdminService, answer_service::AnswerService,
        configuration_service::ConfigurationService, progress_service::ProgressService,
        question_service::QuestionService, report_service::ReportService,
        resource_service::ResourceService, session_service::SessionService,
    },
    storage::{AzureBlobStore, BlobStore},
};

/// Document-store handles behind their traits.
#[derive(Clone)]
pub struct Repositories {
    pub sessions: Arc<dyn SessionRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub admins: Arc<dyn AdminRepository>,
    pub configuration: Arc<dyn ConfigurationRepository>,
}

impl Repositories {
    pub async fn mongo(db: &Database, config: &Config) -> AppResult<Self> {
        let sessions = MongoSessionRepository::new(db, &config.sessions_collection);
        sessions.ensure_indexes().await?;
        let progress = MongoProgressRepository::new(db, &config.progress_collection);
        progress.ensure_indexes().await?;
        let questions = MongoQuestionRepository::new(db, &config.questions_collection);
        questions.ensure_indexes().await?;
        let answers = MongoAnswerRepository::new(db, &config.answers_collection);
        answers.ensure_indexes().await?;
        let admins = MongoAdminRepository::new(db, &config.admins_collection);
        admins.ensure_indexes().await?;
        let configuration = MongoConfigurationRepository::new(db, &config.configuration_collection);
        configuration.ensure_indexes().await?;

        Ok(Self {
            sessions: Arc::new(sessions),
            progress: Arc::new(progress),
            questions: Arc::new(questions),
            answers: Arc::new(answers),
            admins: Arc::new(admins),
            configuration: Arc::new(configuration),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionRepository::new()),
            progress: Arc::new(InMemoryProgressRepository::new()),
            questions: Arc::new(InMemoryQuestionRepository::new()),
            answers: Arc::new(InMemoryAnswerRepository::new()),
            admins: Arc::new(InMemoryAdminRepository::new()),
            configuration: Arc::new(InMemoryConfigurationRepository::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Option<Database>,
    pub jwt: Arc<JwtService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub session_service: Arc<SessionService>,
    pub progress_service: Arc<ProgressService>,
    pub question_service: Arc<QuestionService>,
    pub answer_service: Arc<AnswerService>,
    pub admin_service: Arc<AdminService>,
    pub configuration_service: Arc<ConfigurationService>,
    pub resource_service: Arc<ResourceService>,
    pub report_service: Arc<ReportService>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;
        let repositories = Repositories::mongo(&db, &config).await?;

        let blob_store: Option<Arc<dyn BlobStore>> = match &config.storage_connection_string {
            Some(connection_string) => {
                let store = AzureBlobStore::from_connection_string(connection_string.expose_secret())?;
                log::info!("Using Azure Storage account '{}'", store.account_name());
                Some(Arc::new(store))
            }
            None => {
                log::warn!("AZURE_STORAGE_CONNECTION_STRING not set; file endpoints are disabled");
                None
            }
        };
        let identity = Arc::new(MicrosoftIdentityProvider::new(&config));

        let state = Self::from_parts(config, Some(db), repositories, blob_store, identity);

        if state.resource_service.is_configured() {
            if let Err(e) = state.resource_service.ensure_containers().await {
                log::warn!("Could not prepare blob containers: {}", e);
            }
        }

        Ok(state)
    }

    /// Wires services over already-built backends.
    pub fn from_parts(
        config: Config,
        database: Option<Database>,
        repositories: Repositories,
        blob_store: Option<Arc<dyn BlobStore>>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let total_items = config.progress_total_items;

        let session_service = Arc::new(SessionService::new(
            repositories.sessions.clone(),
            total_items,
        ));
        let resource_service = Arc::new(ResourceService::new(
            blob_store,
            &config.videos_container,
            &config.resources_container,
        ));

        Self {
            jwt: Arc::new(JwtService::new(
                &config.jwt_secret,
                config.jwt_expiration_hours,
            )),
            identity,
            progress_service: Arc::new(ProgressService::new(
                repositories.progress.clone(),
                total_items,
            )),
            question_service: Arc::new(QuestionService::new(repositories.questions.clone())),
            answer_service: Arc::new(AnswerService::new(
                repositories.answers.clone(),
                session_service.clone(),
            )),
            admin_service: Arc::new(AdminService::new(
                repositories.admins.clone(),
                &config.admin_email_domain,
            )),
            configuration_service: Arc::new(ConfigurationService::new(
                repositories.configuration.clone(),
                resource_service.clone(),
            )),
            report_service: Arc::new(ReportService::new(
                repositories.sessions,
                repositories.answers,
                repositories.questions,
            )),
            session_service,
            resource_service,
            database,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::MockIdentityProvider;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_from_parts_without_storage() {
        let state = AppState::from_parts(
            Config::test_config(),
            None,
            Repositories::in_memory(),
            None,
            Arc::new(MockIdentityProvider::new()),
        );

        assert!(!state.resource_service.is_configured());
        assert!(state.database.is_none());
        assert_eq!(state.jwt.expiration_hours(), 1);
    }
}
