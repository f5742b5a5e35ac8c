use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            answer::{grade, round2},
            QuizAnswer,
        },
        dto::{request::SubmitAnswersRequest, response::QuizStatistics},
    },
    repositories::AnswerRepository,
    services::session_service::SessionService,
};

const UNTITLED_QUIZ: &str = "Sin título";

pub struct AnswerService {
    repository: Arc<dyn AnswerRepository>,
    sessions: Arc<SessionService>,
}

impl AnswerService {
    pub fn new(repository: Arc<dyn AnswerRepository>, sessions: Arc<SessionService>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Grades and stores one attempt, then records the quiz on the session.
    pub async fn submit(&self, request: SubmitAnswersRequest) -> AppResult<QuizAnswer> {
        request.validate()?;

        let grade = grade(&request.respuestas);
        let answer = QuizAnswer {
            id: Uuid::new_v4().to_string(),
            session_id: request.sesion_id,
            quiz_id: request.cuestionario_id,
            quiz_title: request
                .cuestionario_titulo
                .unwrap_or_else(|| UNTITLED_QUIZ.to_string()),
            responses: request.respuestas,
            score: request.calificacion.unwrap_or(grade.score),
            total_questions: grade.total as i32,
            correct_count: grade.correct as i32,
            incorrect_count: (grade.total - grade.correct) as i32,
            accuracy: grade.score,
            passed: request.aprobado.unwrap_or(grade.passed),
            time_spent_seconds: request.tiempo_empleado,
            completed_at: Utc::now(),
        };

        let answer = self.repository.create(answer).await?;
        log::info!(
            "Stored answer {} for session {} (quiz {}, score {})",
            answer.id,
            answer.session_id,
            answer.quiz_id,
            answer.score
        );

        if let Err(e) = self
            .sessions
            .record_quiz_completion(&answer.session_id, &answer.quiz_id)
            .await
        {
            log::warn!(
                "Answer {} stored but session {} was not updated: {}",
                answer.id,
                answer.session_id,
                e
            );
        }

        Ok(answer)
    }

    pub async fn list_for_session(&self, session_id: &str) -> AppResult<Vec<QuizAnswer>> {
        self.repository.list_by_session(session_id).await
    }

    pub async fn list_for_session_quiz(
        &self,
        session_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAnswer>> {
        let answers = self
            .repository
            .list_by_session_and_quiz(session_id, quiz_id)
            .await?;

        if answers.is_empty() {
            return Err(AppError::NotFound("No se encontraron respuestas".to_string()));
        }
        Ok(answers)
    }

    pub async fn statistics(&self, quiz_id: &str) -> AppResult<QuizStatistics> {
        let answers = self.repository.list_by_quiz(quiz_id).await?;
        Ok(quiz_statistics(quiz_id, &answers))
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!("Respuesta {} no encontrada", id)));
        }
        log::info!("Deleted answer {}", id);
        Ok(())
    }
}

pub fn quiz_statistics(quiz_id: &str, answers: &[QuizAnswer]) -> QuizStatistics {
    let total = answers.len();
    if total == 0 {
        return QuizStatistics {
            cuestionario_id: quiz_id.to_string(),
            total_respuestas: 0,
            aprobados: 0,
            reprobados: 0,
            porcentaje_aprobacion: 0.0,
            calificacion_promedio: 0.0,
        };
    }

    let passed = answers.iter().filter(|a| a.passed).count();
    let score_sum: f64 = answers.iter().map(|a| a.score).sum();

    QuizStatistics {
        cuestionario_id: quiz_id.to_string(),
        total_respuestas: total,
        aprobados: passed,
        reprobados: total - passed,
        porcentaje_aprobacion: round2(passed as f64 / total as f64 * 100.0),
        calificacion_promedio: round2(score_sum / total as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            domain::QuestionResponse,
            dto::request::CreateSessionRequest,
        },
        repositories::memory::{InMemoryAnswerRepository, InMemorySessionRepository},
    };
    use serde_json::{json, Value};

    fn services() -> (AnswerService, Arc<SessionService>) {
        let sessions = Arc::new(SessionService::new(
            Arc::new(InMemorySessionRepository::new()),
            10,
        ));
        let answers = AnswerService::new(
            Arc::new(InMemoryAnswerRepository::new()),
            Arc::clone(&sessions),
        );
        (answers, sessions)
    }

    fn response(user: Value, expected: Value) -> QuestionResponse {
        QuestionResponse {
            order: 1,
            title: "P".to_string(),
            question: "¿?".to_string(),
            question_type: "opcion-multiple".to_string(),
            options: None,
            correct_answer: expected,
            user_answer: user,
            is_correct: None,
        }
    }

    fn submission(session_id: &str, responses: Vec<QuestionResponse>) -> SubmitAnswersRequest {
        SubmitAnswersRequest {
            sesion_id: session_id.to_string(),
            cuestionario_id: "gxp".to_string(),
            cuestionario_titulo: None,
            respuestas: responses,
            calificacion: None,
            aprobado: None,
            tiempo_empleado: Some(95),
        }
    }

    fn answer_with(score: f64, passed: bool) -> QuizAnswer {
        QuizAnswer {
            id: Uuid::new_v4().to_string(),
            session_id: "s".to_string(),
            quiz_id: "gxp".to_string(),
            quiz_title: String::new(),
            responses: Vec::new(),
            score,
            total_questions: 0,
            correct_count: 0,
            incorrect_count: 0,
            accuracy: score,
            passed,
            time_spent_seconds: None,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_statistics_without_answers_are_zero() {
        let stats = quiz_statistics("gxp", &[]);
        assert_eq!(stats.total_respuestas, 0);
        assert_eq!(stats.porcentaje_aprobacion, 0.0);
        assert_eq!(stats.calificacion_promedio, 0.0);
    }

    #[test]
    fn test_statistics_aggregate_answers() {
        let answers = vec![
            answer_with(100.0, true),
            answer_with(66.67, false),
            answer_with(80.0, true),
        ];

        let stats = quiz_statistics("gxp", &answers);

        assert_eq!(stats.aprobados, 2);
        assert_eq!(stats.reprobados, 1);
        assert_eq!(stats.porcentaje_aprobacion, 66.67);
        assert_eq!(stats.calificacion_promedio, 82.22);
    }

    #[tokio::test]
    async fn test_submit_scores_and_updates_session() {
        let (answers, sessions) = services();
        let session = sessions
            .create_session(CreateSessionRequest::default())
            .await
            .unwrap();

        let stored = answers
            .submit(submission(
                &session.id,
                vec![
                    response(json!("b"), json!("b")),
                    response(json!("a"), json!("b")),
                    response(json!(true), json!(true)),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(stored.score, 66.67);
        assert_eq!(stored.accuracy, 66.67);
        assert_eq!(stored.correct_count, 2);
        assert_eq!(stored.incorrect_count, 1);
        assert!(!stored.passed);
        assert_eq!(stored.quiz_title, "Sin título");

        let session = sessions.get_session(&session.id).await.unwrap();
        assert_eq!(session.completed_quizzes, vec!["gxp".to_string()]);
        assert_eq!(session.attempts, 2);
    }

    #[tokio::test]
    async fn test_caller_overrides_score_and_pass_flag() {
        let (answers, _) = services();
        let mut request = submission("s-1", vec![response(json!("a"), json!("b"))]);
        request.calificacion = Some(75.0);
        request.aprobado = Some(true);

        let stored = answers.submit(request).await.unwrap();

        assert_eq!(stored.score, 75.0);
        assert_eq!(stored.accuracy, 0.0);
        assert!(stored.passed);
    }

    #[tokio::test]
    async fn test_missing_attempts_are_not_found() {
        let (answers, _) = services();
        let err = answers.list_for_session_quiz("s", "gxp").await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: No se encontraron respuestas");
    }

    #[tokio::test]
    async fn test_delete_missing_answer_is_not_found() {
        let (answers, _) = services();
        assert!(matches!(
            answers.delete("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
