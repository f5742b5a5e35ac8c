pub mod admin_service;
pub mod answer_service;
pub mod configuration_service;
pub mod progress_service;
pub mod question_service;
pub mod report_service;
pub mod resource_service;
pub mod session_service;

use crate::errors::{AppError, AppResult};

/// Result of an idempotent append: either the record changed or the item
/// was already present.
#[derive(Debug)]
pub enum MarkResult<T> {
    Recorded(T),
    Unchanged,
}

pub(crate) fn required_field(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError(format!("Se requiere el campo {}", field)))
}
