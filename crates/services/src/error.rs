//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SettingsError;
use storage::repository::StorageError;

/// Errors emitted when a session cannot start.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("question catalogue is not ready")]
    NotReady,
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
