use thiserror::Error;

use crate::model::{QuestionError, SessionResultError, SettingsError};

/// Any validation failure raised by the domain model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    SessionResult(#[from] SessionResultError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
