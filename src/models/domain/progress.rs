use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Percentage of onboarding content consumed, capped at 100.
pub fn completion_percentage(completed_items: usize, total_items: usize) -> i32 {
    if total_items == 0 {
        return 0;
    }
    (completed_items * 100 / total_items).min(100) as i32
}

/// Shared bookkeeping for anything that tracks watched videos, completed
/// modules and completed quizzes.
pub trait ProgressRecord {
    fn watched_videos_mut(&mut self) -> &mut Vec<String>;
    fn completed_modules_mut(&mut self) -> &mut Vec<String>;
    fn completed_quizzes_mut(&mut self) -> &mut Vec<String>;
    fn set_completion_percentage(&mut self, value: i32);
    fn touch(&mut self);

    fn recompute_percentage(&mut self, total_items: usize) {
        let completed = self.watched_videos_mut().len() + self.completed_quizzes_mut().len();
        self.set_completion_percentage(completion_percentage(completed, total_items));
    }

    /// Returns `false` when the video was already recorded.
    fn mark_video(&mut self, video_id: &str, total_items: usize) -> bool {
        if !push_unique(self.watched_videos_mut(), video_id) {
            return false;
        }
        self.recompute_percentage(total_items);
        self.touch();
        true
    }

    /// Returns `false` when the module was already recorded.
    fn mark_module(&mut self, module_id: &str) -> bool {
        if !push_unique(self.completed_modules_mut(), module_id) {
            return false;
        }
        self.touch();
        true
    }

    /// Returns `false` when the quiz was already recorded.
    fn mark_quiz(&mut self, quiz_id: &str, total_items: usize) -> bool {
        if !push_unique(self.completed_quizzes_mut(), quiz_id) {
            return false;
        }
        self.recompute_percentage(total_items);
        self.touch();
        true
    }
}

fn push_unique(items: &mut Vec<String>, value: &str) -> bool {
    if items.iter().any(|existing| existing == value) {
        return false;
    }
    items.push(value.to_string());
    true
}

/// Progress of an identified user, keyed by `usuario_id`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserProgress {
    pub id: String,
    #[serde(rename = "usuario_id")]
    pub user_id: String,
    #[serde(rename = "modulos_completados", default)]
    pub completed_modules: Vec<String>,
    #[serde(rename = "videos_vistos", default)]
    pub watched_videos: Vec<String>,
    #[serde(rename = "cuestionarios_completados", default)]
    pub completed_quizzes: Vec<String>,
    #[serde(rename = "porcentaje_completado", default)]
    pub completion_percentage: i32,
    #[serde(rename = "fecha_inicio")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "ultima_actividad")]
    pub last_activity: DateTime<Utc>,
}

impl UserProgress {
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            completed_modules: Vec::new(),
            watched_videos: Vec::new(),
            completed_quizzes: Vec::new(),
            completion_percentage: 0,
            started_at: now,
            last_activity: now,
        }
    }
}

impl ProgressRecord for UserProgress {
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
    fn completion_percentage_is_floored_and_capped() {
        assert_eq!(completion_percentage(0, 10), 0);
        assert_eq!(completion_percentage(3, 10), 30);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(14, 10), 100);
        assert_eq!(completion_percentage(5, 0), 0);
    }

    #[test]
    fn marking_the_same_video_twice_is_idempotent() {
        let mut progress = UserProgress::new("user-1");

        assert!(progress.mark_video("intro", 10));
        assert!(!progress.mark_video("intro", 10));

        assert_eq!(progress.watched_videos, vec!["intro".to_string()]);
        assert_eq!(progress.completion_percentage, 10);
    }

    #[test]
    fn modules_do_not_count_towards_percentage() {
        let mut progress = UserProgress::new("user-1");

        assert!(progress.mark_module("bienvenida"));
        assert!(!progress.mark_module("bienvenida"));

        assert_eq!(progress.completed_modules.len(), 1);
        assert_eq!(progress.completion_percentage, 0);
    }

    #[test]
    fn quizzes_and_videos_share_the_percentage() {
        let mut progress = UserProgress::new("user-1");

        progress.mark_video("intro", 4);
        progress.mark_quiz("cuestionario_gxp", 4);

        assert_eq!(progress.completion_percentage, 50);
    }

    #[test]
    fn user_progress_serializes_with_wire_names() {
        let progress = UserProgress::new("user-7");
        let json = serde_json::to_value(&progress).unwrap();

        assert_eq!(json["usuario_id"], "user-7");
        assert!(json["videos_vistos"].as_array().unwrap().is_empty());
        assert_eq!(json["porcentaje_completado"], 0);
    }
}
