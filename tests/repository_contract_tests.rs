use chrono::{Duration, Utc};
use serde_json::{json, Map};

use induccion_server::{
    errors::AppError,
    models::domain::{
        Admin, InductionConfiguration, Question, QuestionType, QuizAnswer, Session, UserProgress,
    },
    repositories::{
        memory::{
            InMemoryAdminRepository, InMemoryAnswerRepository, InMemoryConfigurationRepository,
            InMemoryProgressRepository, InMemoryQuestionRepository, InMemorySessionRepository,
        },
        AdminRepository, AnswerRepository, ConfigurationRepository, ProgressRepository,
        QuestionRepository, SessionFilter, SessionRepository,
    },
};

fn session_started_days_ago(days: i64) -> Session {
    let mut session = Session::new(Map::new());
    session.started_at = Utc::now() - Duration::days(days);
    session
}

fn answer(session_id: &str, quiz_id: &str, minutes_ago: i64) -> QuizAnswer {
    QuizAnswer {
        id: uuid::Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        quiz_id: quiz_id.to_string(),
        quiz_title: "Evaluación".to_string(),
        responses: Vec::new(),
        score: 80.0,
        total_questions: 5,
        correct_count: 4,
        incorrect_count: 1,
        accuracy: 80.0,
        passed: true,
        time_spent_seconds: Some(120),
        completed_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

fn question(quiz_id: &str, order: i32) -> Question {
    Question::new(
        quiz_id,
        "Cuestionario",
        order,
        &format!("Pregunta {}", order),
        QuestionType::TrueFalse,
        Vec::new(),
        Some(json!(true)),
        "",
    )
}

#[tokio::test]
async fn session_list_is_newest_first_and_limited() {
    let repo = InMemorySessionRepository::new();
    for days in [3, 1, 2] {
        repo.create(session_started_days_ago(days)).await.unwrap();
    }

    let listed = repo
        .list(&SessionFilter {
            from: None,
            to: None,
            limit: 2,
        })
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed[0].started_at > listed[1].started_at);
}

#[tokio::test]
async fn session_list_applies_date_range() {
    let repo = InMemorySessionRepository::new();
    repo.create(session_started_days_ago(10)).await.unwrap();
    let recent = repo.create(session_started_days_ago(1)).await.unwrap();

    let from = (Utc::now() - Duration::days(5)).format("%Y-%m-%d").to_string();
    let listed = repo
        .list(&SessionFilter {
            from: Some(from),
            to: None,
            limit: 100,
        })
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, recent.id);
}

#[tokio::test]
async fn session_update_of_missing_record_is_not_found() {
    let repo = InMemorySessionRepository::new();

    let result = repo.update(Session::new(Map::new())).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn session_delete_reports_whether_anything_was_removed() {
    let repo = InMemorySessionRepository::new();
    let session = repo.create(Session::new(Map::new())).await.unwrap();

    assert!(repo.delete(&session.id).await.unwrap());
    assert!(!repo.delete(&session.id).await.unwrap());
}

#[tokio::test]
async fn progress_is_unique_per_user() {
    let repo = InMemoryProgressRepository::new();
    repo.create(UserProgress::new("user-1")).await.unwrap();

    let duplicate = repo.create(UserProgress::new("user-1")).await;

    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));
    assert!(repo.find_by_user("user-2").await.unwrap().is_none());
}

#[tokio::test]
async fn questions_are_partitioned_by_quiz() {
    let repo = InMemoryQuestionRepository::new();
    let first = repo.create(question("gxp", 2)).await.unwrap();
    repo.create(question("gxp", 1)).await.unwrap();
    repo.create(question("seguridad", 1)).await.unwrap();

    assert!(repo.find(&first.id, "seguridad").await.unwrap().is_none());
    assert!(repo.find(&first.id, "gxp").await.unwrap().is_some());

    let gxp = repo.list_active_by_quiz("gxp").await.unwrap();
    let orders: Vec<i32> = gxp.iter().map(|q| q.order).collect();
    assert_eq!(orders, vec![1, 2]);
}

#[tokio::test]
async fn inactive_questions_are_hidden_from_active_listings() {
    let repo = InMemoryQuestionRepository::new();
    let mut stored = repo.create(question("gxp", 1)).await.unwrap();
    repo.create(question("gxp", 2)).await.unwrap();

    stored.active = false;
    repo.update(stored).await.unwrap();

    assert_eq!(repo.list_active_by_quiz("gxp").await.unwrap().len(), 1);
    assert_eq!(repo.list_active().await.unwrap().len(), 1);
    assert_eq!(repo.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn answers_are_listed_newest_first() {
    let repo = InMemoryAnswerRepository::new();
    repo.create(answer("s-1", "gxp", 30)).await.unwrap();
    let latest = repo.create(answer("s-1", "gxp", 1)).await.unwrap();
    repo.create(answer("s-1", "seguridad", 10)).await.unwrap();
    repo.create(answer("s-2", "gxp", 5)).await.unwrap();

    let by_session = repo.list_by_session("s-1").await.unwrap();
    assert_eq!(by_session.len(), 3);
    assert_eq!(by_session[0].id, latest.id);

    assert_eq!(repo.list_by_session_and_quiz("s-1", "gxp").await.unwrap().len(), 2);
    assert_eq!(repo.list_by_quiz("gxp").await.unwrap().len(), 3);
    assert_eq!(repo.list_all().await.unwrap().len(), 4);
}

#[tokio::test]
async fn admins_are_sorted_and_unique() {
    let repo = InMemoryAdminRepository::new();
    repo.create(Admin::new("zoe@fundacionsantodomingo.org")).await.unwrap();
    repo.create(Admin::new("ana@fundacionsantodomingo.org")).await.unwrap();

    let duplicate = repo.create(Admin::new("ANA@fundacionsantodomingo.org")).await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    let emails: Vec<String> = repo.list().await.unwrap().into_iter().map(|a| a.email).collect();
    assert_eq!(
        emails,
        vec!["ana@fundacionsantodomingo.org", "zoe@fundacionsantodomingo.org"]
    );
    assert!(repo.delete("zoe@fundacionsantodomingo.org").await.unwrap());
    assert!(!repo.delete("zoe@fundacionsantodomingo.org").await.unwrap());
}

#[tokio::test]
async fn configuration_writes_bump_the_version() {
    let repo = InMemoryConfigurationRepository::new();
    let created = repo.create(InductionConfiguration::default()).await.unwrap();
    assert_eq!(created.version, 1);

    let mut edited = created.clone();
    edited.title = "Nueva inducción".to_string();
    let replaced = repo.replace(edited).await.unwrap();
    assert_eq!(replaced.version, 2);

    let stored = repo
        .find(&created.id, &created.kind)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Nueva inducción");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn configuration_replace_with_stale_version_conflicts() {
    let repo = InMemoryConfigurationRepository::new();
    let created = repo.create(InductionConfiguration::default()).await.unwrap();

    repo.replace(created.clone()).await.unwrap();
    let stale = repo.replace(created).await;

    assert!(matches!(stale, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn configuration_cannot_be_created_twice() {
    let repo = InMemoryConfigurationRepository::new();
    repo.create(InductionConfiguration::default()).await.unwrap();

    let second = repo.create(InductionConfiguration::default()).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}
