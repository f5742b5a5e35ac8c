//! In-memory repositories backed by `tokio::sync::RwLock`, used by the test
//! suites and by local runs without a database.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Admin, InductionConfiguration, Question, QuizAnswer, Session, UserProgress},
};

use super::{
    configuration_repository::version_conflict, AdminRepository, AnswerRepository,
    ConfigurationRepository, ProgressRepository, QuestionRepository, SessionFilter,
    SessionRepository,
};

/// Same textual form the document store holds, so range filters behave alike.
fn stored_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[derive(Default, Clone)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_sessions_first(mut items: Vec<Session>) -> Vec<Session> {
    items.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    items
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> AppResult<Session> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::AlreadyExists(format!(
                "Sesión {} ya existe",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn list(&self, filter: &SessionFilter) -> AppResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let items: Vec<Session> = sessions
            .values()
            .filter(|s| {
                let started = stored_timestamp(&s.started_at);
                filter.from.as_deref().map_or(true, |from| started.as_str() >= from)
                    && filter.to.as_deref().map_or(true, |to| started.as_str() <= to)
            })
            .cloned()
            .collect();

        let mut items = newest_sessions_first(items);
        items.truncate(filter.limit.max(0) as usize);
        Ok(items)
    }

    async fn list_all(&self) -> AppResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        Ok(newest_sessions_first(sessions.values().cloned().collect()))
    }

    async fn update(&self, session: Session) -> AppResult<Session> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(session)
            }
            None => Err(AppError::NotFound(format!(
                "Sesión {} no encontrada",
                session.id
            ))),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryProgressRepository {
    records: Arc<RwLock<HashMap<String, UserProgress>>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn create(&self, progress: UserProgress) -> AppResult<UserProgress> {
        let mut records = self.records.write().await;
        if records.contains_key(&progress.user_id) {
            return Err(AppError::AlreadyExists(format!(
                "Ya existe progreso para el usuario {}",
                progress.user_id
            )));
        }
        records.insert(progress.user_id.clone(), progress.clone());
        Ok(progress)
    }

    async fn update(&self, progress: UserProgress) -> AppResult<UserProgress> {
        let mut records = self.records.write().await;
        match records.get_mut(&progress.user_id) {
            Some(stored) if stored.id == progress.id => {
                *stored = progress.clone();
                Ok(progress)
            }
            _ => Err(AppError::NotFound(format!(
                "Progreso no encontrado para el usuario {}",
                progress.user_id
            ))),
        }
    }
}

/// Keyed by `(cuestionario_id, id)`.
#[derive(Default, Clone)]
pub struct InMemoryQuestionRepository {
    questions: Arc<RwLock<HashMap<(String, String), Question>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn create(&self, question: Question) -> AppResult<Question> {
        let key = (question.quiz_id.clone(), question.id.clone());
        let mut questions = self.questions.write().await;
        if questions.contains_key(&key) {
            return Err(AppError::AlreadyExists(format!(
                "Pregunta {} ya existe",
                question.id
            )));
        }
        questions.insert(key, question.clone());
        Ok(question)
    }

    async fn find(&self, id: &str, quiz_id: &str) -> AppResult<Option<Question>> {
        let questions = self.questions.read().await;
        Ok(questions
            .get(&(quiz_id.to_string(), id.to_string()))
            .cloned())
    }

    async fn list_active_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<Question> = questions
            .values()
            .filter(|q| q.active && q.quiz_id == quiz_id)
            .cloned()
            .collect();
        items.sort_by_key(|q| q.order);
        Ok(items)
    }

    async fn list_active(&self) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<Question> = questions.values().filter(|q| q.active).cloned().collect();
        items.sort_by(|a, b| a.quiz_id.cmp(&b.quiz_id).then(a.order.cmp(&b.order)));
        Ok(items)
    }

    async fn list_all(&self) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<Question> = questions.values().cloned().collect();
        items.sort_by(|a, b| a.quiz_id.cmp(&b.quiz_id).then(a.order.cmp(&b.order)));
        Ok(items)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let key = (question.quiz_id.clone(), question.id.clone());
        let mut questions = self.questions.write().await;
        match questions.get_mut(&key) {
            Some(stored) => {
                *stored = question.clone();
                Ok(question)
            }
            None => Err(AppError::NotFound(format!(
                "Pregunta {} no encontrada",
                question.id
            ))),
        }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAnswerRepository {
    answers: Arc<RwLock<HashMap<String, QuizAnswer>>>,
}

impl InMemoryAnswerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first<F>(&self, predicate: F) -> Vec<QuizAnswer>
    where
        F: Fn(&QuizAnswer) -> bool,
    {
        let answers = self.answers.read().await;
        let mut items: Vec<QuizAnswer> = answers.values().filter(|a| predicate(a)).cloned().collect();
        items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        items
    }
}

#[async_trait]
impl AnswerRepository for InMemoryAnswerRepository {
    async fn create(&self, answer: QuizAnswer) -> AppResult<QuizAnswer> {
        let mut answers = self.answers.write().await;
        if answers.contains_key(&answer.id) {
            return Err(AppError::AlreadyExists(format!(
                "Respuesta {} ya existe",
                answer.id
            )));
        }
        answers.insert(answer.id.clone(), answer.clone());
        Ok(answer)
    }

    async fn list_by_session(&self, session_id: &str) -> AppResult<Vec<QuizAnswer>> {
        Ok(self.newest_first(|a| a.session_id == session_id).await)
    }

    async fn list_by_session_and_quiz(
        &self,
        session_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAnswer>> {
        Ok(self
            .newest_first(|a| a.session_id == session_id && a.quiz_id == quiz_id)
            .await)
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAnswer>> {
        Ok(self.newest_first(|a| a.quiz_id == quiz_id).await)
    }

    async fn list_all(&self) -> AppResult<Vec<QuizAnswer>> {
        Ok(self.newest_first(|_| true).await)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.answers.write().await.remove(id).is_some())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAdminRepository {
    admins: Arc<RwLock<HashMap<String, Admin>>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_admins(emails: &[&str]) -> Self {
        let repository = Self::new();
        {
            let mut admins = repository.admins.write().await;
            for email in emails {
                let admin = Admin::new(email);
                admins.insert(admin.email.clone(), admin);
            }
        }
        repository
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        Ok(self.admins.read().await.get(email).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Admin>> {
        let admins = self.admins.read().await;
        let mut items: Vec<Admin> = admins.values().cloned().collect();
        items.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(items)
    }

    async fn create(&self, admin: Admin) -> AppResult<Admin> {
        let mut admins = self.admins.write().await;
        if admins.contains_key(&admin.email) {
            return Err(AppError::AlreadyExists(format!(
                "El administrador {} ya existe",
                admin.email
            )));
        }
        admins.insert(admin.email.clone(), admin.clone());
        Ok(admin)
    }

    async fn delete(&self, email: &str) -> AppResult<bool> {
        Ok(self.admins.write().await.remove(email).is_some())
    }
}

/// Keyed by `(tipo, id)`.
#[derive(Default, Clone)]
pub struct InMemoryConfigurationRepository {
    configs: Arc<RwLock<HashMap<(String, String), InductionConfiguration>>>,
}

impl InMemoryConfigurationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigurationRepository for InMemoryConfigurationRepository {
    async fn find(&self, id: &str, kind: &str) -> AppResult<Option<InductionConfiguration>> {
        let configs = self.configs.read().await;
        Ok(configs.get(&(kind.to_string(), id.to_string())).cloned())
    }

    async fn create(
        &self,
        mut config: InductionConfiguration,
    ) -> AppResult<InductionConfiguration> {
        let key = (config.kind.clone(), config.id.clone());
        let mut configs = self.configs.write().await;
        if configs.contains_key(&key) {
            return Err(version_conflict(&config.id));
        }
        config.version = 1;
        configs.insert(key, config.clone());
        Ok(config)
    }

    async fn replace(
        &self,
        mut config: InductionConfiguration,
    ) -> AppResult<InductionConfiguration> {
        let key = (config.kind.clone(), config.id.clone());
        let mut configs = self.configs.write().await;
        match configs.get_mut(&key) {
            Some(stored) if stored.version == config.version => {
                config.version += 1;
                *stored = config.clone();
                Ok(config)
            }
            _ => Err(version_conflict(&config.id)),
        }
    }
}
