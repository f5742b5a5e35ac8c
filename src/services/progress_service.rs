use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{ProgressRecord, UserProgress},
        dto::request::{MarkModuleRequest, MarkVideoRequest, UpdateProgressRequest},
    },
    repositories::ProgressRepository,
    services::{required_field, MarkResult},
};

/// Outcome of reading progress: either it existed or it was just created.
pub enum ProgressLookup {
    Existing(UserProgress),
    Created(UserProgress),
}

pub struct ProgressService {
    repository: Arc<dyn ProgressRepository>,
    total_items: usize,
}

impl ProgressService {
    pub fn new(repository: Arc<dyn ProgressRepository>, total_items: usize) -> Self {
        Self {
            repository,
            total_items,
        }
    }

    pub async fn get_or_create(&self, user_id: &str) -> AppResult<ProgressLookup> {
        if let Some(progress) = self.repository.find_by_user(user_id).await? {
            return Ok(ProgressLookup::Existing(progress));
        }

        match self.repository.create(UserProgress::new(user_id)).await {
            Ok(progress) => {
                log::info!("Created progress record for user {}", user_id);
                Ok(ProgressLookup::Created(progress))
            }
            // Lost a creation race; the other request's record is the one to use.
            Err(AppError::AlreadyExists(_)) => Ok(ProgressLookup::Existing(self.find(user_id).await?)),
            Err(e) => Err(e),
        }
    }

    async fn find(&self, user_id: &str) -> AppResult<UserProgress> {
        self.repository.find_by_user(user_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Progreso no encontrado para el usuario {}", user_id))
        })
    }

    pub async fn mark_video(
        &self,
        user_id: &str,
        request: MarkVideoRequest,
    ) -> AppResult<MarkResult<UserProgress>> {
        let video_id = required_field(request.video_id, "video_id")?;
        let mut progress = self.find(user_id).await?;

        if !progress.mark_video(&video_id, self.total_items) {
            return Ok(MarkResult::Unchanged);
        }
        Ok(MarkResult::Recorded(self.repository.update(progress).await?))
    }

    pub async fn mark_module(
        &self,
        user_id: &str,
        request: MarkModuleRequest,
    ) -> AppResult<MarkResult<UserProgress>> {
        let module_id = required_field(request.modulo_id, "modulo_id")?;
        let mut progress = self.find(user_id).await?;

        if !progress.mark_module(&module_id) {
            return Ok(MarkResult::Unchanged);
        }
        Ok(MarkResult::Recorded(self.repository.update(progress).await?))
    }

    pub async fn update(
        &self,
        user_id: &str,
        request: UpdateProgressRequest,
    ) -> AppResult<UserProgress> {
        request.validate()?;
        let mut progress = self.find(user_id).await?;

        if let Some(modules) = request.modulos_completados {
            progress.completed_modules = modules;
        }
        if let Some(videos) = request.videos_vistos {
            progress.watched_videos = videos;
        }
        if let Some(quizzes) = request.cuestionarios_completados {
            progress.completed_quizzes = quizzes;
        }
        if let Some(percentage) = request.porcentaje_completado {
            progress.completion_percentage = percentage;
        }
        progress.touch();

        self.repository.update(progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryProgressRepository;

    fn service() -> ProgressService {
        ProgressService::new(Arc::new(InMemoryProgressRepository::new()), 10)
    }

    #[tokio::test]
    async fn test_first_read_creates_progress() {
        let service = service();

        let first = service.get_or_create("user-1").await.unwrap();
        let second = service.get_or_create("user-1").await.unwrap();

        assert!(matches!(first, ProgressLookup::Created(_)));
        assert!(matches!(second, ProgressLookup::Existing(_)));
    }

    #[tokio::test]
    async fn test_marking_without_record_is_not_found() {
        let err = service()
            .mark_module(
                "nobody",
                MarkModuleRequest {
                    modulo_id: Some("m1".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_lists() {
        let service = service();
        service.get_or_create("user-2").await.unwrap();

        let updated = service
            .update(
                "user-2",
                UpdateProgressRequest {
                    videos_vistos: Some(vec!["a".to_string(), "b".to_string()]),
                    porcentaje_completado: Some(20),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.watched_videos.len(), 2);
        assert_eq!(updated.completion_percentage, 20);
    }
}
