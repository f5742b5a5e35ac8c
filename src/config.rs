use std::env;
use secrecy::SecretString;

const DEV_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub sessions_collection: String,
    pub progress_collection: String,
    pub questions_collection: String,
    pub answers_collection: String,
    pub admins_collection: String,
    pub configuration_collection: String,
    pub storage_connection_string: Option<SecretString>,
    pub videos_container: String,
    pub resources_container: String,
    pub azure_client_id: String,
    pub azure_client_secret: SecretString,
    pub azure_tenant_id: String,
    pub azure_redirect_uri: String,
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub admin_email_domain: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub progress_total_items: usize,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app_env: var_or("APP_ENV", "desarrollo"),
            mongo_conn_string: var_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: var_or("MONGO_DB_NAME", "induccion_gxp"),
            sessions_collection: var_or("SESSIONS_COLLECTION", "sesiones"),
            progress_collection: var_or("PROGRESS_COLLECTION", "progreso"),
            questions_collection: var_or("QUESTIONS_COLLECTION", "preguntas"),
            answers_collection: var_or("ANSWERS_COLLECTION", "respuestas"),
            admins_collection: var_or("ADMINS_COLLECTION", "administradores"),
            configuration_collection: var_or("CONFIGURATION_COLLECTION", "configuracion"),
            storage_connection_string: env::var("AZURE_STORAGE_CONNECTION_STRING")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(SecretString::from),
            videos_container: var_or("AZURE_STORAGE_CONTAINER_VIDEOS", "videoinduccion"),
            resources_container: var_or("AZURE_STORAGE_CONTAINER_RECURSOS", "recursos"),
            azure_client_id: var_or("AZURE_CLIENT_ID", "azure_client_id"),
            azure_client_secret: SecretString::from(var_or(
                "AZURE_CLIENT_SECRET",
                "azure_client_secret",
            )),
            azure_tenant_id: var_or("AZURE_TENANT_ID", "common"),
            azure_redirect_uri: var_or(
                "AZURE_REDIRECT_URI",
                "http://localhost:8080/api/auth/callback",
            ),
            frontend_url: var_or("FRONTEND_URL", "http://localhost:5173"),
            cors_origins: var_or("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            admin_email_domain: var_or("ADMIN_EMAIL_DOMAIN", "@fundacionsantodomingo.org"),
            web_server_host: var_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: SecretString::from(var_or("JWT_SECRET", DEV_JWT_SECRET)),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(8),
            progress_total_items: env::var("PROGRESS_TOTAL_ITEMS")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(10),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.app_env.as_str(), "produccion" | "production")
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEV_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.azure_client_secret.expose_secret() == "azure_client_secret" {
            panic!(
                "FATAL: AZURE_CLIENT_SECRET is using default value! Set AZURE_CLIENT_SECRET environment variable."
            );
        }

        if self.azure_client_id == "azure_client_id" {
            panic!(
                "FATAL: AZURE_CLIENT_ID is using default value! Set AZURE_CLIENT_ID environment variable."
            );
        }
    }

    /// Fixed settings for test suites; no storage account configured.
    pub fn test_config() -> Self {
        Self {
            app_env: "test".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "induccion-test".to_string(),
            sessions_collection: "sesiones".to_string(),
            progress_collection: "progreso".to_string(),
            questions_collection: "preguntas".to_string(),
            answers_collection: "respuestas".to_string(),
            admins_collection: "administradores".to_string(),
            configuration_collection: "configuracion".to_string(),
            storage_connection_string: None,
            videos_container: "videoinduccion".to_string(),
            resources_container: "recursos".to_string(),
            azure_client_id: "client-id".to_string(),
            azure_client_secret: SecretString::from("client-secret".to_string()),
            azure_tenant_id: "tenant-id".to_string(),
            azure_redirect_uri: "http://localhost:8080/api/auth/callback".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            admin_email_domain: "@fundacionsantodomingo.org".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            progress_total_items: 10,
        }
    }
}
