pub mod admin_handler;
pub mod answer_handler;
pub mod auth_handler;
pub mod configuration_handler;
pub mod document_handler;
pub mod health_handler;
pub mod progress_handler;
pub mod question_handler;
pub mod resource_handler;
pub mod session_handler;
pub mod upload;

use actix_web::web;

use crate::errors::AppError;

/// Malformed bodies and query strings surface as validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("JSON inválido: {}", err)).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Parámetros inválidos: {}", err)).into()
    })
}

/// Registers every route. Literal segments are registered ahead of `{id}`
/// captures on the same prefix.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(query_config());

    health_handler::configure(cfg);
    session_handler::configure(cfg);
    progress_handler::configure(cfg);
    question_handler::configure(cfg);
    answer_handler::configure(cfg);
    configuration_handler::configure(cfg);
    document_handler::configure(cfg);
    resource_handler::configure(cfg);
    admin_handler::configure(cfg);
    auth_handler::configure(cfg);
}
