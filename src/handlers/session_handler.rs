use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{
            CreateSessionRequest, MarkModuleRequest, MarkVideoRequest, SessionListQuery,
            UpdateSessionRequest,
        },
        response::MessageResponse,
    },
    services::MarkResult,
};

#[post("/api/sesiones")]
async fn create_session(
    state: web::Data<AppState>,
    request: Option<web::Json<CreateSessionRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = request.map(|r| r.into_inner()).unwrap_or_default();
    let session = state.session_service.create_session(request).await?;
    Ok(HttpResponse::Created().json(session))
}

#[get("/api/sesiones/estadisticas")]
async fn session_statistics(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let statistics = state.session_service.statistics().await?;
    Ok(HttpResponse::Ok().json(statistics))
}

#[get("/api/sesiones")]
async fn list_sessions(
    state: web::Data<AppState>,
    query: web::Query<SessionListQuery>,
) -> Result<HttpResponse, AppError> {
    let sessions = state
        .session_service
        .list_sessions(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(sessions))
}

#[get("/api/sesiones/{id}")]
async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = state.session_service.get_session(&id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[put("/api/sesiones/{id}")]
async fn update_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state
        .session_service
        .update_session(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/api/sesiones/{id}/video")]
async fn mark_video(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<MarkVideoRequest>,
) -> Result<HttpResponse, AppError> {
    match state
        .session_service
        .mark_video(&id, request.into_inner())
        .await?
    {
        MarkResult::Recorded(session) => Ok(HttpResponse::Ok().json(session)),
        MarkResult::Unchanged => {
            Ok(HttpResponse::Ok().json(MessageResponse::new("Video ya marcado como visto")))
        }
    }
}

#[post("/api/sesiones/{id}/modulo")]
async fn mark_module(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<MarkModuleRequest>,
) -> Result<HttpResponse, AppError> {
    match state
        .session_service
        .mark_module(&id, request.into_inner())
        .await?
    {
        MarkResult::Recorded(session) => Ok(HttpResponse::Ok().json(session)),
        MarkResult::Unchanged => {
            Ok(HttpResponse::Ok().json(MessageResponse::new("Módulo ya completado")))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_session)
        .service(session_statistics)
        .service(list_sessions)
        .service(get_session)
        .service(update_session)
        .service(mark_video)
        .service(mark_module);
}
