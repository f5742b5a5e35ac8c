use actix_multipart::Multipart;
use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedAdmin,
    errors::AppError,
    handlers::upload::read_file_field,
    models::dto::{
        request::UpdateInductionRequest,
        response::{ConfigurationUpdatedResponse, VideoUploadedResponse},
    },
};

#[get("/api/configuracion/induccion")]
async fn get_induction(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let config = state.configuration_service.get().await?;
    Ok(HttpResponse::Ok().json(config))
}

#[put("/api/configuracion/induccion")]
async fn update_induction(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    request: web::Json<UpdateInductionRequest>,
) -> Result<HttpResponse, AppError> {
    let config = state
        .configuration_service
        .update_induction(request.into_inner())
        .await?;
    log::info!("Induction configuration updated by {}", admin.0.email());

    Ok(HttpResponse::Ok().json(ConfigurationUpdatedResponse {
        mensaje: "Configuración actualizada exitosamente".to_string(),
        configuracion: config,
    }))
}

#[post("/api/configuracion/induccion/video")]
async fn upload_induction_video(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let file = read_file_field(payload, "video").await?;
    let video_url = state.configuration_service.upload_video(file).await?;

    Ok(HttpResponse::Ok().json(VideoUploadedResponse {
        mensaje: "Video subido exitosamente".to_string(),
        video_url,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_induction)
        .service(update_induction)
        .service(upload_induction_video);
}
