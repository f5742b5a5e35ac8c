use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "cuestionario_id")]
    pub quiz_id: String,
    #[serde(rename = "cuestionario_titulo", default)]
    pub quiz_title: String,
    #[serde(rename = "orden")]
    pub order: i32,
    #[serde(rename = "pregunta")]
    pub text: String,
    #[serde(rename = "tipo")]
    pub question_type: QuestionType,
    #[serde(rename = "opciones", default)]
    pub options: Vec<QuestionOption>,
    #[serde(
        rename = "respuesta_correcta",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer: Option<Value>,
    #[serde(rename = "explicacion", default)]
    pub explanation: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fecha_modificacion")]
    pub modified_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub id: String,
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "correcta", default)]
    pub correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum QuestionType {
    /// One correct option among several.
    #[serde(rename = "opcion-multiple")]
    SingleChoice,
    /// Any subset of options may be correct.
    #[serde(rename = "seleccion-multiple")]
    MultipleChoice,
    #[serde(rename = "verdadero-falso")]
    TrueFalse,
    #[serde(rename = "likert")]
    Likert,
    #[serde(rename = "texto-libre")]
    FreeText,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::Likert,
        QuestionType::FreeText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "opcion-multiple",
            QuestionType::MultipleChoice => "seleccion-multiple",
            QuestionType::TrueFalse => "verdadero-falso",
            QuestionType::Likert => "likert",
            QuestionType::FreeText => "texto-libre",
        }
    }

    pub fn requires_options(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultipleChoice | QuestionType::Likert
        )
    }

    pub fn requires_correct_answer(&self) -> bool {
        matches!(self, QuestionType::TrueFalse)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| format!("Tipo de pregunta inválido: '{}'", value))
    }
}

impl Question {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quiz_id: &str,
        quiz_title: &str,
        order: i32,
        text: &str,
        question_type: QuestionType,
        options: Vec<QuestionOption>,
        correct_answer: Option<Value>,
        explanation: &str,
    ) -> Self {
        let now = Utc::now();
        Question {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz_id.to_string(),
            quiz_title: quiz_title.to_string(),
            order,
            text: text.to_string(),
            question_type,
            options,
            correct_answer,
            explanation: explanation.to_string(),
            active: true,
            created_at: now,
            modified_at: now,
        }
    }
}

impl QuestionOption {
    pub fn new(id: &str, text: &str, correct: bool) -> Self {
        QuestionOption {
            id: id.to_string(),
            text: text.to_string(),
            correct,
        }
    }
}
