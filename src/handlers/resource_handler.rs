use actix_multipart::Multipart;
use actix_web::{
    delete, get,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    post, web, HttpResponse,
};

use crate::{
    app_state::AppState,
    auth::AuthenticatedAdmin,
    errors::AppError,
    handlers::upload::read_file_field,
    models::dto::response::{MessageResponse, SignedUrlResponse, UploadResponse},
    services::resource_service::ResourceKind,
};

const UPLOAD_FIELD: &str = "archivo";

#[get("/api/recursos/videos")]
async fn list_videos(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let videos = state.resource_service.list(ResourceKind::Video).await?;
    Ok(HttpResponse::Ok().json(videos))
}

#[get("/api/recursos/documentos")]
async fn list_documents(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let documents = state.resource_service.list(ResourceKind::Document).await?;
    Ok(HttpResponse::Ok().json(documents))
}

#[get("/api/recursos/videos/{nombre}")]
async fn video_link(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let url = state
        .resource_service
        .download_link(ResourceKind::Video, &name)
        .await?;
    Ok(HttpResponse::Ok().json(SignedUrlResponse { url }))
}

#[get("/api/recursos/documentos/{nombre}")]
async fn document_link(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let url = state
        .resource_service
        .download_link(ResourceKind::Document, &name)
        .await?;
    Ok(HttpResponse::Ok().json(SignedUrlResponse { url }))
}

#[get("/api/recursos/documentos/{nombre}/contenido")]
async fn download_document(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = name.into_inner();
    let content = state.resource_service.download_document(&name).await?;

    Ok(HttpResponse::Ok()
        .content_type(
            content
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        )
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(name)],
        })
        .body(content.data))
}

#[post("/api/recursos/videos")]
async fn upload_video(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let file = read_file_field(payload, UPLOAD_FIELD).await?;
    let url = state
        .resource_service
        .upload(ResourceKind::Video, file)
        .await?;

    Ok(HttpResponse::Created().json(UploadResponse {
        mensaje: "Video subido exitosamente".to_string(),
        url,
    }))
}

#[post("/api/recursos/documentos")]
async fn upload_document(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let file = read_file_field(payload, UPLOAD_FIELD).await?;
    let url = state
        .resource_service
        .upload(ResourceKind::Document, file)
        .await?;

    Ok(HttpResponse::Created().json(UploadResponse {
        mensaje: "Documento subido exitosamente".to_string(),
        url,
    }))
}

#[delete("/api/recursos/videos/{nombre}")]
async fn delete_video(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state
        .resource_service
        .delete(ResourceKind::Video, &name)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Video eliminado exitosamente")))
}

#[delete("/api/recursos/documentos/{nombre}")]
async fn delete_document(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state
        .resource_service
        .delete(ResourceKind::Document, &name)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Documento eliminado exitosamente")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_videos)
        .service(list_documents)
        .service(video_link)
        .service(document_link)
        .service(download_document)
        .service(upload_video)
        .service(upload_document)
        .service(delete_video)
        .service(delete_document);
}
