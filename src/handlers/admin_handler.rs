use actix_web::{delete, get, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedAdmin,
    errors::AppError,
    models::dto::response::{BulkDeleteResponse, MessageResponse},
};

#[get("/api/admin/sesiones/todas")]
async fn all_sessions(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let overview = state.report_service.all_sessions().await?;
    Ok(HttpResponse::Ok().json(overview))
}

#[get("/api/admin/respuestas/todas")]
async fn all_answers(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let overview = state.report_service.all_answers().await?;
    Ok(HttpResponse::Ok().json(overview))
}

#[get("/api/admin/preguntas/todas")]
async fn all_questions(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let overview = state.report_service.all_questions().await?;
    Ok(HttpResponse::Ok().json(overview))
}

#[get("/api/admin/estadisticas")]
async fn statistics(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let statistics = state.report_service.statistics().await?;
    Ok(HttpResponse::Ok().json(statistics))
}

#[delete("/api/admin/sesiones/vaciar")]
async fn purge_sessions(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let deleted = state.report_service.purge_sessions().await?;
    log::warn!("{} purged {} sessions", admin.0.email(), deleted);

    Ok(HttpResponse::Ok().json(BulkDeleteResponse {
        mensaje: format!("{} sesiones eliminadas exitosamente", deleted),
        total_eliminados: deleted,
    }))
}

#[delete("/api/admin/respuestas/vaciar")]
async fn purge_answers(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let deleted = state.report_service.purge_answers().await?;
    log::warn!("{} purged {} answers", admin.0.email(), deleted);

    Ok(HttpResponse::Ok().json(BulkDeleteResponse {
        mensaje: format!("{} respuestas eliminadas exitosamente", deleted),
        total_eliminados: deleted,
    }))
}

#[delete("/api/admin/respuestas/{id}")]
async fn delete_answer(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.answer_service.delete(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Respuesta eliminada exitosamente")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(all_sessions)
        .service(all_answers)
        .service(all_questions)
        .service(statistics)
        .service(purge_sessions)
        .service(purge_answers)
        .service(delete_answer);
}
