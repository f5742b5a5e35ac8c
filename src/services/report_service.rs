use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use crate::{
    errors::AppResult,
    models::{
        domain::{
            answer::{round2, PASSING_SCORE},
            Question, QuizAnswer, Session,
        },
        dto::response::{
            AdminStatistics, AnswerTotals, AnswersOverview, QuestionTotals, QuestionsOverview,
            SessionTotals, SessionsOverview,
        },
    },
    repositories::{AnswerRepository, QuestionRepository, SessionRepository},
};

/// Admin-wide listings, aggregate figures and bulk clean-up.
pub struct ReportService {
    sessions: Arc<dyn SessionRepository>,
    answers: Arc<dyn AnswerRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl ReportService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        answers: Arc<dyn AnswerRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            sessions,
            answers,
            questions,
        }
    }

    pub async fn all_sessions(&self) -> AppResult<SessionsOverview> {
        let sessions = self.sessions.list_all().await?;
        Ok(SessionsOverview {
            total: sessions.len(),
            sesiones: sessions,
        })
    }

    pub async fn all_answers(&self) -> AppResult<AnswersOverview> {
        let answers = self.answers.list_all().await?;
        Ok(AnswersOverview {
            total: answers.len(),
            respuestas: answers,
        })
    }

    pub async fn all_questions(&self) -> AppResult<QuestionsOverview> {
        let questions = self.questions.list_all().await?;
        Ok(QuestionsOverview {
            total: questions.len(),
            cuestionarios: group_by_quiz(&questions),
            preguntas: questions,
        })
    }

    pub async fn statistics(&self) -> AppResult<AdminStatistics> {
        let sessions = self.sessions.list_all().await?;
        let answers = self.answers.list_all().await?;
        let active_questions = self.questions.list_active().await?.len();

        Ok(admin_statistics(&sessions, &answers, active_questions))
    }

    /// Deletes every session, skipping (and logging) individual failures.
    pub async fn purge_sessions(&self) -> AppResult<usize> {
        let sessions = self.sessions.list_all().await?;
        let mut deleted = 0;
        for session in sessions {
            match self.sessions.delete(&session.id).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => log::warn!("Could not delete session {}: {}", session.id, e),
            }
        }

        log::info!("Purged {} sessions", deleted);
        Ok(deleted)
    }

    /// Deletes every stored answer, skipping (and logging) individual failures.
    pub async fn purge_answers(&self) -> AppResult<usize> {
        let answers = self.answers.list_all().await?;
        let mut deleted = 0;
        for answer in answers {
            match self.answers.delete(&answer.id).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => log::warn!("Could not delete answer {}: {}", answer.id, e),
            }
        }

        log::info!("Purged {} answers", deleted);
        Ok(deleted)
    }
}

pub fn group_by_quiz(questions: &[Question]) -> BTreeMap<String, Vec<Question>> {
    let mut groups: BTreeMap<String, Vec<Question>> = BTreeMap::new();
    for question in questions {
        groups
            .entry(question.quiz_id.clone())
            .or_default()
            .push(question.clone());
    }
    groups
}

/// A stored answer counts as passed when its score reaches the passing mark,
/// regardless of any caller-supplied flag.
pub fn admin_statistics(
    sessions: &[Session],
    answers: &[QuizAnswer],
    active_questions: usize,
) -> AdminStatistics {
    let sessions_with_answers: HashSet<&str> =
        answers.iter().map(|a| a.session_id.as_str()).collect();
    let passed = answers.iter().filter(|a| a.score >= PASSING_SCORE).count();
    let average = if answers.is_empty() {
        0.0
    } else {
        round2(answers.iter().map(|a| a.score).sum::<f64>() / answers.len() as f64)
    };

    AdminStatistics {
        sesiones: SessionTotals {
            total: sessions.len(),
            sesiones_con_respuestas: sessions_with_answers.len(),
        },
        respuestas: AnswerTotals {
            total: answers.len(),
            aprobados: passed,
            reprobados: answers.len() - passed,
            promedio_calificacion: average,
        },
        preguntas: QuestionTotals {
            total_activas: active_questions,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::QuestionType,
        repositories::memory::{
            InMemoryAnswerRepository, InMemoryQuestionRepository, InMemorySessionRepository,
        },
    };
    use chrono::Utc;
    use serde_json::Map;

    fn answer(session_id: &str, score: f64) -> QuizAnswer {
        QuizAnswer {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            quiz_id: "gxp".to_string(),
            quiz_title: String::new(),
            responses: Vec::new(),
            score,
            total_questions: 1,
            correct_count: 0,
            incorrect_count: 1,
            accuracy: score,
            passed: true,
            time_spent_seconds: None,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_statistics_with_no_data_are_zero() {
        let stats = admin_statistics(&[], &[], 0);

        assert_eq!(stats.sesiones.total, 0);
        assert_eq!(stats.respuestas.total, 0);
        assert_eq!(stats.respuestas.promedio_calificacion, 0.0);
    }

    #[test]
    fn test_statistics_use_score_threshold() {
        let sessions = vec![Session::new(Map::new()), Session::new(Map::new())];
        let answers = vec![answer("s1", 70.0), answer("s1", 40.0), answer("s2", 95.5)];

        let stats = admin_statistics(&sessions, &answers, 7);

        assert_eq!(stats.sesiones.total, 2);
        assert_eq!(stats.sesiones.sesiones_con_respuestas, 2);
        assert_eq!(stats.respuestas.aprobados, 2);
        assert_eq!(stats.respuestas.reprobados, 1);
        assert_eq!(stats.respuestas.promedio_calificacion, 68.5);
        assert_eq!(stats.preguntas.total_activas, 7);
    }

    #[test]
    fn test_group_by_quiz() {
        let questions = vec![
            Question::new("a", "A", 1, "1", QuestionType::FreeText, vec![], None, ""),
            Question::new("b", "B", 1, "2", QuestionType::FreeText, vec![], None, ""),
            Question::new("a", "A", 2, "3", QuestionType::FreeText, vec![], None, ""),
        ];

        let groups = group_by_quiz(&questions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["a"].len(), 2);
        assert_eq!(groups["b"].len(), 1);
    }

    #[tokio::test]
    async fn test_purges_report_deleted_counts() {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let answers = Arc::new(InMemoryAnswerRepository::new());
        for _ in 0..3 {
            sessions.create(Session::new(Map::new())).await.unwrap();
        }
        answers.create(answer("s1", 80.0)).await.unwrap();

        let service = ReportService::new(
            sessions.clone(),
            answers.clone(),
            Arc::new(InMemoryQuestionRepository::new()),
        );

        assert_eq!(service.purge_sessions().await.unwrap(), 3);
        assert_eq!(service.purge_answers().await.unwrap(), 1);
        assert_eq!(service.all_sessions().await.unwrap().total, 0);
        assert_eq!(service.purge_answers().await.unwrap(), 0);
    }
}
