use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimum score (percent) required to pass a quiz.
pub const PASSING_SCORE: f64 = 70.0;

/// One answered question as submitted by the client.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuestionResponse {
    #[serde(rename = "orden")]
    pub order: i32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "pregunta")]
    pub question: String,
    #[serde(rename = "tipo_pregunta")]
    pub question_type: String,
    #[serde(rename = "opciones", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    #[serde(rename = "respuesta_correcta")]
    pub correct_answer: Value,
    #[serde(rename = "respuesta_usuario")]
    pub user_answer: Value,
    #[serde(rename = "es_correcta", default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl QuestionResponse {
    /// The submitted flag wins; otherwise the user's answer is compared
    /// with the expected one.
    pub fn evaluate(&self) -> bool {
        self.is_correct
            .unwrap_or_else(|| self.user_answer == self.correct_answer)
    }
}

/// Stored quiz attempt.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizAnswer {
    pub id: String,
    #[serde(rename = "sesion_id")]
    pub session_id: String,
    #[serde(rename = "cuestionario_id")]
    pub quiz_id: String,
    #[serde(rename = "cuestionario_titulo", default)]
    pub quiz_title: String,
    #[serde(rename = "respuestas")]
    pub responses: Vec<QuestionResponse>,
    #[serde(rename = "calificacion")]
    pub score: f64,
    #[serde(rename = "total_preguntas")]
    pub total_questions: i32,
    #[serde(rename = "respuestas_correctas")]
    pub correct_count: i32,
    #[serde(rename = "respuestas_incorrectas")]
    pub incorrect_count: i32,
    #[serde(rename = "porcentaje_acierto")]
    pub accuracy: f64,
    #[serde(rename = "aprobado")]
    pub passed: bool,
    #[serde(rename = "tiempo_empleado", default)]
    pub time_spent_seconds: Option<i64>,
    #[serde(rename = "fecha_completado")]
    pub completed_at: DateTime<Utc>,
}

/// Outcome of grading a set of responses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grade {
    pub total: usize,
    pub correct: usize,
    pub score: f64,
    pub passed: bool,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `round(correct / total * 100, 2)`, zero for an empty quiz.
pub fn score_percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(correct as f64 / total as f64 * 100.0)
}

pub fn grade(responses: &[QuestionResponse]) -> Grade {
    let total = responses.len();
    let correct = responses.iter().filter(|r| r.evaluate()).count();
    let score = score_percentage(correct, total);

    Grade {
        total,
        correct,
        score,
        passed: score >= PASSING_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(user: Value, expected: Value, flag: Option<bool>) -> QuestionResponse {
        QuestionResponse {
            order: 1,
            title: "Pregunta".to_string(),
            question: "¿?".to_string(),
            question_type: "opcion-multiple".to_string(),
            options: None,
            correct_answer: expected,
            user_answer: user,
            is_correct: flag,
        }
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        assert_eq!(score_percentage(1, 3), 33.33);
        assert_eq!(score_percentage(2, 3), 66.67);
        assert_eq!(score_percentage(3, 3), 100.0);
        assert_eq!(score_percentage(0, 0), 0.0);
    }

    #[test]
    fn grade_applies_seventy_percent_threshold() {
        let mut responses: Vec<_> = (0..7)
            .map(|_| response(json!("a"), json!("a"), Some(true)))
            .collect();
        responses.extend((0..3).map(|_| response(json!("b"), json!("a"), Some(false))));

        let grade = grade(&responses);
        assert_eq!(grade.total, 10);
        assert_eq!(grade.correct, 7);
        assert_eq!(grade.score, 70.0);
        assert!(grade.passed);
    }

    #[test]
    fn grade_below_threshold_fails() {
        let responses = vec![
            response(json!("a"), json!("a"), Some(true)),
            response(json!("b"), json!("a"), Some(false)),
        ];

        let grade = grade(&responses);
        assert_eq!(grade.score, 50.0);
        assert!(!grade.passed);
    }

    #[test]
    fn missing_flag_falls_back_to_answer_comparison() {
        assert!(response(json!(true), json!(true), None).evaluate());
        assert!(!response(json!("Opción A"), json!("Opción B"), None).evaluate());
        assert!(!response(json!("x"), json!("x"), Some(false)).evaluate());
    }
}
