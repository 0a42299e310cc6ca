use std::sync::Arc;

use quiz_core::model::{ExamSettings, ExamSettingsDraft};
use storage::repository::PreferencesRepository;

use crate::error::PreferencesError;

#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn PreferencesRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferencesRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn load(&self) -> Result<ExamSettings, PreferencesError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Load settings, falling back to defaults when the store is unreadable.
    pub async fn load_or_default(&self) -> ExamSettings {
        match self.load().await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(error = %err, "preferences unreadable, using defaults");
                ExamSettings::default()
            }
        }
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` if validation fails or persistence fails.
    pub async fn save(&self, draft: ExamSettingsDraft) -> Result<ExamSettings, PreferencesError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }
}
