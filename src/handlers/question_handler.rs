use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedAdmin,
    errors::AppError,
    models::dto::{
        request::{CreateQuestionRequest, QuizPartitionQuery, UpdateQuestionRequest},
        response::MessageResponse,
    },
};

#[get("/api/preguntas/cuestionarios")]
async fn list_quizzes(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let quizzes = state.question_service.list_quizzes().await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[get("/api/preguntas/cuestionario/{cuestionario_id}")]
async fn list_quiz_questions(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let questions = state.question_service.list_for_quiz(&quiz_id).await?;
    Ok(HttpResponse::Ok().json(questions))
}

#[post("/api/preguntas/cuestionario")]
async fn create_question(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    request: web::Json<CreateQuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let question = state
        .question_service
        .create_question(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(question))
}

#[put("/api/preguntas/cuestionario/{pregunta_id}")]
async fn update_question(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    id: web::Path<String>,
    request: web::Json<UpdateQuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let question = state
        .question_service
        .update_question(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(question))
}

#[delete("/api/preguntas/cuestionario/{pregunta_id}")]
async fn delete_question(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
    id: web::Path<String>,
    query: web::Query<QuizPartitionQuery>,
) -> Result<HttpResponse, AppError> {
    state
        .question_service
        .deactivate_question(&id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Pregunta desactivada exitosamente")))
}

#[post("/api/preguntas/inicializar-datos")]
async fn seed_questions(
    state: web::Data<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
    let response = state.question_service.seed_sample_quiz().await?;
    Ok(HttpResponse::Created().json(response))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_quizzes)
        .service(list_quiz_questions)
        .service(create_question)
        .service(update_question)
        .service(delete_question)
        .service(seed_questions);
}
