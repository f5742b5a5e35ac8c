use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::models::domain::{QuestionOption, QuestionResponse};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSessionRequest {
    pub modulos_completados: Option<Vec<String>>,
    pub videos_vistos: Option<Vec<String>>,
    pub cuestionarios_completados: Option<Vec<String>>,
    #[validate(range(min = 0, max = 100))]
    pub porcentaje_completado: Option<i32>,
    #[validate(range(min = 1))]
    pub intentos: Option<i32>,
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    pub modulos_completados: Option<Vec<String>>,
    pub videos_vistos: Option<Vec<String>>,
    pub cuestionarios_completados: Option<Vec<String>>,
    #[validate(range(min = 0, max = 100))]
    pub porcentaje_completado: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkVideoRequest {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkModuleRequest {
    pub modulo_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SessionListQuery {
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub limite: Option<i64>,
}

impl SessionListQuery {
    pub fn limit(&self) -> i64 {
        self.limite.unwrap_or(100)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "Campo requerido: cuestionario_id"))]
    pub cuestionario_id: String,
    pub cuestionario_titulo: Option<String>,
    pub orden: i32,
    #[validate(length(min = 1, message = "Campo requerido: pregunta"))]
    pub pregunta: String,
    pub tipo: String,
    pub opciones: Option<Vec<QuestionOption>>,
    pub respuesta_correcta: Option<Value>,
    pub explicacion: Option<String>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuestionRequest {
    pub cuestionario_id: Option<String>,
    pub cuestionario_titulo: Option<String>,
    pub orden: Option<i32>,
    pub pregunta: Option<String>,
    pub tipo: Option<String>,
    pub opciones: Option<Vec<QuestionOption>>,
    pub respuesta_correcta: Option<Value>,
    pub explicacion: Option<String>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizPartitionQuery {
    pub cuestionario_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(length(min = 1, message = "Campo requerido: sesion_id"))]
    pub sesion_id: String,
    #[validate(length(min = 1, message = "Campo requerido: cuestionario_id"))]
    pub cuestionario_id: String,
    pub cuestionario_titulo: Option<String>,
    #[validate(length(
        min = 1,
        message = "El campo respuestas debe ser un array con al menos una pregunta"
    ))]
    pub respuestas: Vec<QuestionResponse>,
    /// Caller-supplied override of the computed score.
    pub calificacion: Option<f64>,
    /// Caller-supplied override of the pass flag.
    pub aprobado: Option<bool>,
    #[validate(range(min = 0))]
    pub tiempo_empleado: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInductionRequest {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDocumentRequest {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    #[serde(alias = "link")]
    pub url: Option<String>,
    pub descripcion: Option<String>,
    pub orden: Option<i32>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentRequest {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    #[serde(alias = "link")]
    pub url: Option<String>,
    pub descripcion: Option<String>,
    pub orden: Option<i32>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderDocumentsRequest {
    #[serde(alias = "documentos")]
    pub orden: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminEmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn submit_request_requires_at_least_one_response() {
        let request: SubmitAnswersRequest = serde_json::from_str(
            r#"{"sesion_id": "s-1", "cuestionario_id": "q-1", "respuestas": []}"#,
        )
        .unwrap();

        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("al menos una pregunta"));
    }

    #[test]
    fn submit_request_reports_missing_question_field() {
        let parsed = serde_json::from_str::<SubmitAnswersRequest>(
            r#"{
                "sesion_id": "s-1",
                "cuestionario_id": "q-1",
                "respuestas": [{"orden": 1, "titulo": "t", "pregunta": "p",
                                "tipo_pregunta": "verdadero_falso", "respuesta_correcta": true}]
            }"#,
        );

        let err = parsed.unwrap_err().to_string();
        assert!(err.contains("respuesta_usuario"));
    }

    #[test]
    fn session_update_rejects_out_of_range_percentage() {
        let request = UpdateSessionRequest {
            porcentaje_completado: Some(140),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn document_request_accepts_legacy_link_field() {
        let request: CreateDocumentRequest =
            serde_json::from_str(r#"{"nombre": "Manual", "tipo": "pdf", "link": "https://x/m.pdf"}"#)
                .unwrap();
        assert_eq!(request.url.as_deref(), Some("https://x/m.pdf"));
    }

    #[test]
    fn reorder_request_accepts_documentos_alias() {
        let request: ReorderDocumentsRequest =
            serde_json::from_str(r#"{"documentos": ["b", "a"]}"#).unwrap();
        assert_eq!(request.orden, vec!["b", "a"]);
    }

    #[test]
    fn session_list_query_defaults_limit() {
        assert_eq!(SessionListQuery::default().limit(), 100);
    }
}
