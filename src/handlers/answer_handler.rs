use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState, errors::AppError, models::dto::request::SubmitAnswersRequest,
};

#[post("/api/cuestionarios/respuesta")]
async fn submit_answers(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswersRequest>,
) -> Result<HttpResponse, AppError> {
    let answer = state.answer_service.submit(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(answer))
}

#[get("/api/cuestionarios/respuestas/{sesion_id}")]
async fn session_answers(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let answers = state.answer_service.list_for_session(&session_id).await?;
    Ok(HttpResponse::Ok().json(answers))
}

#[get("/api/cuestionarios/respuestas/{sesion_id}/{cuestionario_id}")]
async fn session_quiz_answers(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (session_id, quiz_id) = path.into_inner();
    let answers = state
        .answer_service
        .list_for_session_quiz(&session_id, &quiz_id)
        .await?;
    Ok(HttpResponse::Ok().json(answers))
}

#[get("/api/cuestionarios/estadisticas/{cuestionario_id}")]
async fn quiz_statistics(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let statistics = state.answer_service.statistics(&quiz_id).await?;
    Ok(HttpResponse::Ok().json(statistics))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_answers)
        .service(session_answers)
        .service(session_quiz_answers)
        .service(quiz_statistics);
}
