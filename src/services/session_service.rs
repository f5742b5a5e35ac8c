use std::sync::Arc;

use serde_json::Map;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{answer::round2, ProgressRecord, Session},
        dto::{
            request::{
                CreateSessionRequest, MarkModuleRequest, MarkVideoRequest, SessionListQuery,
                UpdateSessionRequest,
            },
            response::SessionStatistics,
        },
    },
    repositories::{SessionFilter, SessionRepository},
    services::{required_field, MarkResult},
};

pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    total_items: usize,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository>, total_items: usize) -> Self {
        Self {
            repository,
            total_items,
        }
    }

    pub async fn create_session(&self, request: CreateSessionRequest) -> AppResult<Session> {
        let session = Session::new(request.metadata.unwrap_or_else(Map::new));
        let session = self.repository.create(session).await?;

        log::info!("Created session {}", session.id);
        Ok(session)
    }

    pub async fn get_session(&self, id: &str) -> AppResult<Session> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sesión {} no encontrada", id)))
    }

    pub async fn update_session(
        &self,
        id: &str,
        request: UpdateSessionRequest,
    ) -> AppResult<Session> {
        request.validate()?;
        let mut session = self.get_session(id).await?;

        if let Some(modules) = request.modulos_completados {
            session.completed_modules = modules;
        }
        if let Some(videos) = request.videos_vistos {
            session.watched_videos = videos;
        }
        if let Some(quizzes) = request.cuestionarios_completados {
            session.completed_quizzes = quizzes;
        }
        if let Some(percentage) = request.porcentaje_completado {
            session.completion_percentage = percentage;
        }
        if let Some(attempts) = request.intentos {
            session.attempts = attempts;
        }
        if let Some(metadata) = request.metadata {
            session.metadata = metadata;
        }
        session.touch();

        self.repository.update(session).await
    }

    pub async fn mark_video(
        &self,
        id: &str,
        request: MarkVideoRequest,
    ) -> AppResult<MarkResult<Session>> {
        let video_id = required_field(request.video_id, "video_id")?;
        let mut session = self.get_session(id).await?;

        if !session.mark_video(&video_id, self.total_items) {
            return Ok(MarkResult::Unchanged);
        }
        Ok(MarkResult::Recorded(self.repository.update(session).await?))
    }

    pub async fn mark_module(
        &self,
        id: &str,
        request: MarkModuleRequest,
    ) -> AppResult<MarkResult<Session>> {
        let module_id = required_field(request.modulo_id, "modulo_id")?;
        let mut session = self.get_session(id).await?;

        if !session.mark_module(&module_id) {
            return Ok(MarkResult::Unchanged);
        }
        Ok(MarkResult::Recorded(self.repository.update(session).await?))
    }

    /// Adds the quiz to the session's completed list the first time it is
    /// answered and counts the attempt. Unknown sessions are ignored.
    pub async fn record_quiz_completion(&self, id: &str, quiz_id: &str) -> AppResult<()> {
        let Some(mut session) = self.repository.find_by_id(id).await? else {
            log::warn!("Answer stored for unknown session {}", id);
            return Ok(());
        };

        if session.mark_quiz(quiz_id, self.total_items) {
            session.attempts += 1;
            self.repository.update(session).await?;
        }
        Ok(())
    }

    pub async fn list_sessions(&self, query: SessionListQuery) -> AppResult<Vec<Session>> {
        query.validate()?;
        let filter = SessionFilter {
            limit: query.limit(),
            from: query.fecha_desde,
            to: query.fecha_hasta,
        };
        self.repository.list(&filter).await
    }

    pub async fn statistics(&self) -> AppResult<SessionStatistics> {
        let sessions = self.repository.list_all().await?;
        Ok(session_statistics(&sessions))
    }
}

pub fn session_statistics(sessions: &[Session]) -> SessionStatistics {
    let total = sessions.len();
    if total == 0 {
        return SessionStatistics {
            total_sesiones: 0,
            sesiones_completadas: 0,
            sesiones_incompletas: 0,
            porcentaje_completado_promedio: 0.0,
            total_intentos: 0,
            promedio_intentos_por_sesion: 0.0,
        };
    }

    let completed = sessions.iter().filter(|s| s.is_complete()).count();
    let percentage_sum: i64 = sessions.iter().map(|s| s.completion_percentage as i64).sum();
    let attempts: i64 = sessions.iter().map(|s| s.attempts as i64).sum();

    SessionStatistics {
        total_sesiones: total,
        sesiones_completadas: completed,
        sesiones_incompletas: total - completed,
        porcentaje_completado_promedio: round2(percentage_sum as f64 / total as f64),
        total_intentos: attempts,
        promedio_intentos_por_sesion: round2(attempts as f64 / total as f64),
    }
}
