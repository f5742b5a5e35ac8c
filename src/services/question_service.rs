use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Question, QuestionOption, QuestionType},
        dto::{
            request::{CreateQuestionRequest, QuizPartitionQuery, UpdateQuestionRequest},
            response::{QuizSummary, SeedResponse},
        },
    },
    repositories::QuestionRepository,
    services::required_field,
};

const SAMPLE_QUIZ_ID: &str = "cuestionario_gestion_procesos";
const SAMPLE_QUIZ_TITLE: &str = "Evaluación - Gestión por Procesos";

pub struct QuestionService {
    repository: Arc<dyn QuestionRepository>,
}

fn parse_type(value: &str) -> AppResult<QuestionType> {
    value.parse().map_err(AppError::ValidationError)
}

/// Choice questions need options; true/false questions need the answer.
fn check_shape(question: &Question) -> AppResult<()> {
    if question.question_type.requires_options() && question.options.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Las preguntas de tipo {} requieren opciones",
            question.question_type
        )));
    }
    if question.question_type.requires_correct_answer()
        && question.correct_answer.as_ref().map_or(true, Value::is_null)
    {
        return Err(AppError::ValidationError(format!(
            "Las preguntas de tipo {} requieren respuesta_correcta",
            question.question_type
        )));
    }
    Ok(())
}

impl QuestionService {
    pub fn new(repository: Arc<dyn QuestionRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_for_quiz(&self, quiz_id: &str) -> AppResult<Vec<Question>> {
        self.repository.list_active_by_quiz(quiz_id).await
    }

    pub async fn create_question(&self, request: CreateQuestionRequest) -> AppResult<Question> {
        request.validate()?;
        let question_type = parse_type(&request.tipo)?;

        let mut question = Question::new(
            request.cuestionario_id.trim(),
            request.cuestionario_titulo.as_deref().unwrap_or_default(),
            request.orden,
            request.pregunta.trim(),
            question_type,
            request.opciones.unwrap_or_default(),
            request.respuesta_correcta,
            request.explicacion.as_deref().unwrap_or_default(),
        );
        if let Some(active) = request.activo {
            question.active = active;
        }
        check_shape(&question)?;

        let question = self.repository.create(question).await?;
        log::info!(
            "Created question {} in quiz {}",
            question.id,
            question.quiz_id
        );
        Ok(question)
    }

    async fn find(&self, id: &str, quiz_id: &str) -> AppResult<Question> {
        self.repository
            .find(id, quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pregunta {} no encontrada", id)))
    }

    /// `cuestionario_id` in the body locates the question; it is not
    /// rewritten.
    pub async fn update_question(
        &self,
        id: &str,
        request: UpdateQuestionRequest,
    ) -> AppResult<Question> {
        let quiz_id = required_field(request.cuestionario_id, "cuestionario_id")?;
        let mut question = self.find(id, &quiz_id).await?;

        if let Some(title) = request.cuestionario_titulo {
            question.quiz_title = title;
        }
        if let Some(order) = request.orden {
            question.order = order;
        }
        if let Some(text) = request.pregunta {
            if text.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Campo requerido: pregunta".to_string(),
                ));
            }
            question.text = text.trim().to_string();
        }
        if let Some(kind) = request.tipo {
            question.question_type = parse_type(&kind)?;
        }
        if let Some(options) = request.opciones {
            question.options = options;
        }
        if let Some(answer) = request.respuesta_correcta {
            question.correct_answer = Some(answer);
        }
        if let Some(explanation) = request.explicacion {
            question.explanation = explanation;
        }
        if let Some(active) = request.activo {
            question.active = active;
        }
        check_shape(&question)?;
        question.modified_at = Utc::now();

        self.repository.update(question).await
    }

    /// Soft delete: the question stays stored with `activo = false`.
    pub async fn deactivate_question(&self, id: &str, query: QuizPartitionQuery) -> AppResult<()> {
        let quiz_id = required_field(query.cuestionario_id, "cuestionario_id")?;
        let mut question = self.find(id, &quiz_id).await?;

        question.active = false;
        question.modified_at = Utc::now();
        self.repository.update(question).await?;

        log::info!("Deactivated question {} in quiz {}", id, quiz_id);
        Ok(())
    }

    pub async fn list_quizzes(&self) -> AppResult<Vec<QuizSummary>> {
        let questions = self.repository.list_active().await?;
        Ok(distinct_quizzes(&questions))
    }

    pub async fn list_all(&self) -> AppResult<Vec<Question>> {
        self.repository.list_all().await
    }

    pub async fn seed_sample_quiz(&self) -> AppResult<SeedResponse> {
        let mut ids = Vec::new();
        for question in sample_questions() {
            match self.repository.create(question).await {
                Ok(created) => ids.push(created.id),
                Err(e) => log::warn!("Could not seed sample question: {}", e),
            }
        }

        Ok(SeedResponse {
            mensaje: format!("{} preguntas creadas exitosamente", ids.len()),
            ids,
        })
    }
}

/// First title seen per quiz id, in quiz id order.
pub fn distinct_quizzes(questions: &[Question]) -> Vec<QuizSummary> {
    let mut quizzes: Vec<QuizSummary> = Vec::new();
    for question in questions {
        if quizzes.iter().any(|q| q.cuestionario_id == question.quiz_id) {
            continue;
        }
        quizzes.push(QuizSummary {
            cuestionario_id: question.quiz_id.clone(),
            cuestionario_titulo: question.quiz_title.clone(),
        });
    }
    quizzes.sort_by(|a, b| a.cuestionario_id.cmp(&b.cuestionario_id));
    quizzes
}

fn sample_questions() -> Vec<Question> {
    vec![
        Question::new(
            SAMPLE_QUIZ_ID,
            SAMPLE_QUIZ_TITLE,
            1,
            "¿Qué es la gestión por procesos?",
            QuestionType::SingleChoice,
            vec![
                QuestionOption::new("a", "Un modelo de gestión centrado en las actividades", false),
                QuestionOption::new(
                    "b",
                    "Un enfoque que organiza las actividades en procesos interrelacionados",
                    true,
                ),
                QuestionOption::new("c", "Una herramienta de control financiero", false),
            ],
            None,
            "La gestión por procesos organiza las actividades en procesos interrelacionados para mejorar la eficiencia.",
        ),
        Question::new(
            SAMPLE_QUIZ_ID,
            SAMPLE_QUIZ_TITLE,
            2,
            "La gestión por procesos mejora la eficiencia organizacional",
            QuestionType::TrueFalse,
            Vec::new(),
            Some(Value::Bool(true)),
            "La gestión por procesos efectivamente mejora la eficiencia al optimizar flujos de trabajo.",
        ),
        Question::new(
            SAMPLE_QUIZ_ID,
            SAMPLE_QUIZ_TITLE,
            3,
            "¿Cuál es un beneficio de la gestión por procesos?",
            QuestionType::SingleChoice,
            vec![
                QuestionOption::new("a", "Mayor burocracia", false),
                QuestionOption::new("b", "Optimización de recursos", true),
                QuestionOption::new("c", "Más jerarquías", false),
            ],
            None,
            "Uno de los principales beneficios es la optimización de recursos y reducción de desperdicios.",
        ),
    ]
}
