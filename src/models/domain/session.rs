use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::domain::progress::ProgressRecord;

/// Anonymous visitor's progress through the onboarding flow.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub id: String,
    #[serde(rename = "fecha_inicio")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "ultima_actividad")]
    pub last_activity: DateTime<Utc>,
    #[serde(rename = "modulos_completados", default)]
    pub completed_modules: Vec<String>,
    #[serde(rename = "videos_vistos", default)]
    pub watched_videos: Vec<String>,
    #[serde(rename = "cuestionarios_completados", default)]
    pub completed_quizzes: Vec<String>,
    #[serde(rename = "porcentaje_completado", default)]
    pub completion_percentage: i32,
    #[serde(rename = "intentos", default = "default_attempts")]
    pub attempts: i32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_attempts() -> i32 {
    1
}

impl Session {
    pub fn new(metadata: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: now,
            last_activity: now,
            completed_modules: Vec::new(),
            watched_videos: Vec::new(),
            completed_quizzes: Vec::new(),
            completion_percentage: 0,
            attempts: 1,
            metadata,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completion_percentage >= 100
    }
}

impl ProgressRecord for Session {
    fn watched_videos_mut(&mut self) -> &mut Vec<String> {
        &mut self.watched_videos
    }

    fn completed_modules_mut(&mut self) -> &mut Vec<String> {
        &mut self.completed_modules
    }

    fn completed_quizzes_mut(&mut self) -> &mut Vec<String> {
        &mut self.completed_quizzes
    }

    fn set_completion_percentage(&mut self, value: i32) {
        self.completion_percentage = value;
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_empty_with_one_attempt() {
        let session = Session::new(Map::new());

        assert!(!session.id.is_empty());
        assert_eq!(session.attempts, 1);
        assert_eq!(session.completion_percentage, 0);
        assert!(session.watched_videos.is_empty());
        assert!(!session.is_complete());
    }

    #[test]
    fn session_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "s-1",
            "fecha_inicio": "2025-03-01T10:00:00Z",
            "ultima_actividad": "2025-03-01T10:05:00Z"
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, "s-1");
        assert_eq!(session.attempts, 1);
        assert!(session.metadata.is_empty());
        assert!(session.completed_quizzes.is_empty());
    }

    #[test]
    fn marking_module_on_session_is_idempotent() {
        let mut session = Session::new(Map::new());

        assert!(session.mark_module("procesos"));
        assert!(!session.mark_module("procesos"));
        assert_eq!(session.completed_modules.len(), 1);
    }
}
