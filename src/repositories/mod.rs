pub mod admin_repository;
pub mod answer_repository;
pub mod configuration_repository;
pub mod memory;
pub mod progress_repository;
pub mod question_repository;
pub mod session_repository;

use mongodb::error::{ErrorKind, WriteFailure};

pub use admin_repository::{AdminRepository, MongoAdminRepository};
pub use answer_repository::{AnswerRepository, MongoAnswerRepository};
pub use configuration_repository::{ConfigurationRepository, MongoConfigurationRepository};
pub use progress_repository::{MongoProgressRepository, ProgressRepository};
pub use question_repository::{MongoQuestionRepository, QuestionRepository};
pub use session_repository::{MongoSessionRepository, SessionFilter, SessionRepository};

const DUPLICATE_KEY_CODE: i32 = 11000;

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}
