pub mod admin;
pub mod answer;
pub mod configuration;
pub mod progress;
pub mod question;
pub mod session;

pub use admin::Admin;
pub use answer::{QuestionResponse, QuizAnswer};
pub use configuration::{DocumentKind, InductionConfiguration, ResourceDocument};
pub use progress::{ProgressRecord, UserProgress};
pub use question::{Question, QuestionOption, QuestionType};
pub use session::Session;
