use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{MarkModuleRequest, MarkVideoRequest, UpdateProgressRequest},
        response::MessageResponse,
    },
    services::{progress_service::ProgressLookup, MarkResult},
};

#[get("/api/progreso/{usuario_id}")]
async fn get_progress(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    match state.progress_service.get_or_create(&user_id).await? {
        ProgressLookup::Existing(progress) => Ok(HttpResponse::Ok().json(progress)),
        ProgressLookup::Created(progress) => Ok(HttpResponse::Created().json(progress)),
    }
}

#[post("/api/progreso/{usuario_id}/video")]
async fn mark_video(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    request: web::Json<MarkVideoRequest>,
) -> Result<HttpResponse, AppError> {
    match state
        .progress_service
        .mark_video(&user_id, request.into_inner())
        .await?
    {
        MarkResult::Recorded(progress) => Ok(HttpResponse::Ok().json(progress)),
        MarkResult::Unchanged => {
            Ok(HttpResponse::Ok().json(MessageResponse::new("Video ya marcado como visto")))
        }
    }
}

#[post("/api/progreso/{usuario_id}/modulo")]
async fn mark_module(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    request: web::Json<MarkModuleRequest>,
) -> Result<HttpResponse, AppError> {
    match state
        .progress_service
        .mark_module(&user_id, request.into_inner())
        .await?
    {
        MarkResult::Recorded(progress) => Ok(HttpResponse::Ok().json(progress)),
        MarkResult::Unchanged => {
            Ok(HttpResponse::Ok().json(MessageResponse::new("Módulo ya completado")))
        }
    }
}

#[put("/api/progreso/{usuario_id}")]
async fn update_progress(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    request: web::Json<UpdateProgressRequest>,
) -> Result<HttpResponse, AppError> {
    let progress = state
        .progress_service
        .update(&user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_progress)
        .service(mark_video)
        .service(mark_module)
        .service(update_progress);
}
