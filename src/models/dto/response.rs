use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::domain::{Admin, Question, QuizAnswer, ResourceDocument, Session};

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub mensaje: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            mensaje: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatistics {
    pub total_sesiones: usize,
    pub sesiones_completadas: usize,
    pub sesiones_incompletas: usize,
    pub porcentaje_completado_promedio: f64,
    pub total_intentos: i64,
    pub promedio_intentos_por_sesion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizStatistics {
    pub cuestionario_id: String,
    pub total_respuestas: usize,
    pub aprobados: usize,
    pub reprobados: usize,
    pub porcentaje_aprobacion: f64,
    pub calificacion_promedio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionTotals {
    pub total: usize,
    pub sesiones_con_respuestas: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerTotals {
    pub total: usize,
    pub aprobados: usize,
    pub reprobados: usize,
    pub promedio_calificacion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionTotals {
    pub total_activas: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStatistics {
    pub sesiones: SessionTotals,
    pub respuestas: AnswerTotals,
    pub preguntas: QuestionTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionsOverview {
    pub total: usize,
    pub sesiones: Vec<Session>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswersOverview {
    pub total: usize,
    pub respuestas: Vec<QuizAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionsOverview {
    pub total: usize,
    pub cuestionarios: BTreeMap<String, Vec<Question>>,
    pub preguntas: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub cuestionario_id: String,
    pub cuestionario_titulo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedResponse {
    pub mensaje: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteResponse {
    pub mensaje: String,
    pub total_eliminados: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReorderResponse {
    pub mensaje: String,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentCreatedResponse {
    pub mensaje: String,
    pub documento: ResourceDocument,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationUpdatedResponse<T: Serialize> {
    pub mensaje: String,
    pub configuracion: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoUploadedResponse {
    pub mensaje: String,
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminsOverview {
    pub total: usize,
    pub administradores: Vec<Admin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminCheckResponse {
    pub es_administrador: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub autenticado: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub es_administrador: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub auth_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedUrlResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub mensaje: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_user_response_omits_absent_fields() {
        let json = serde_json::to_value(CurrentUserResponse {
            autenticado: false,
            email: None,
            nombre: None,
            es_administrador: None,
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "autenticado": false }));
    }

    #[test]
    fn admin_check_response_for_unknown_email_is_minimal() {
        let json = serde_json::to_value(AdminCheckResponse {
            es_administrador: false,
            email: None,
            rol: None,
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "es_administrador": false }));
    }
}
