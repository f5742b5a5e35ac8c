use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedAdmin,
    errors::AppError,
    models::dto::{
        request::{CreateDocumentRequest, ReorderDocumentsRequest, UpdateDocumentRequest},
        response::{DocumentCreatedResponse, MessageResponse, ReorderResponse},
    },
};

#[get("/api/documentos")]
async fn list_active_documents(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let documents = state.configuration_service.list_documents(true).await?;
    Ok(HttpResponse::Ok().json(documents))
}

#[get("/api/documentos/todos")]
async fn list_all_documents(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let documents = state.configuration_service.list_documents(false).await?;
    Ok(HttpResponse::Ok().json(documents))
}

#[put("/api/documentos/reordenar")]
async fn reorder_documents(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    request: web::Json<ReorderDocumentsRequest>,
) -> Result<HttpResponse, AppError> {
    let total = state
        .configuration_service
        .reorder_documents(request.into_inner().orden)
        .await?;

    Ok(HttpResponse::Ok().json(ReorderResponse {
        mensaje: "Documentos reordenados exitosamente".to_string(),
        total,
    }))
}

#[get("/api/documentos/{id}")]
async fn get_document(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let document = state.configuration_service.get_document(&id).await?;
    Ok(HttpResponse::Ok().json(document))
}

#[post("/api/documentos")]
async fn create_document(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    request: web::Json<CreateDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let document = state
        .configuration_service
        .create_document(request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(DocumentCreatedResponse {
        mensaje: "Documento creado exitosamente".to_string(),
        documento: document,
    }))
}

#[put("/api/documentos/{id}")]
async fn update_document(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    id: web::Path<String>,
    request: web::Json<UpdateDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let document = state
        .configuration_service
        .update_document(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(document))
}

#[delete("/api/documentos/{id}")]
async fn delete_document(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.configuration_service.delete_document(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Documento eliminado exitosamente")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_active_documents)
        .service(list_all_documents)
        .service(reorder_documents)
        .service(get_document)
        .service(create_document)
        .service(update_document)
        .service(delete_document);
}
