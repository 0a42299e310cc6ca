//! Flat TOML key-value file holding user preferences.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::{ExamSettings, ExamSettingsDraft, Language, PassPolicy};
use serde::{Deserialize, Serialize};

use crate::repository::{PreferencesRepository, StorageError};

const POLICY_FIXED: &str = "fixed";
const POLICY_MAJORITY: &str = "majority";

/// On-disk shape. Every key is optional; missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesRecord {
    pub selected_language: Option<String>,
    pub test_duration: Option<u32>,
    pub is_sound_on: Option<bool>,
    pub pass_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_threshold: Option<u32>,
    pub question_count: Option<u32>,
    pub group_size: Option<u32>,
    pub warning_seconds: Option<u32>,
}

impl PreferencesRecord {
    #[must_use]
    pub fn from_settings(settings: &ExamSettings) -> Self {
        let (policy, threshold) = match settings.pass_policy() {
            PassPolicy::FixedThreshold { min_correct } => (POLICY_FIXED, Some(min_correct)),
            PassPolicy::StrictMajority => (POLICY_MAJORITY, None),
        };
        Self {
            selected_language: Some(settings.translation_language().code().to_owned()),
            test_duration: Some(settings.test_duration_secs()),
            is_sound_on: Some(settings.sound_on()),
            pass_policy: Some(policy.to_owned()),
            pass_threshold: threshold,
            question_count: Some(settings.question_count()),
            group_size: Some(settings.group_size()),
            warning_seconds: Some(settings.warning_threshold_secs()),
        }
    }

    /// Merge stored values over defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for an unknown pass policy or
    /// values that fail settings validation.
    pub fn into_settings(self) -> Result<ExamSettings, StorageError> {
        let defaults = ExamSettingsDraft::default();
        let pass_policy = match self.pass_policy.as_deref() {
            None => defaults.pass_policy,
            Some(POLICY_MAJORITY) => PassPolicy::StrictMajority,
            Some(POLICY_FIXED) => self
                .pass_threshold
                .map_or(PassPolicy::OFFICIAL, |min_correct| PassPolicy::FixedThreshold {
                    min_correct,
                }),
            Some(other) => {
                return Err(StorageError::Serialization(format!(
                    "unknown pass policy: {other}"
                )));
            }
        };

        ExamSettingsDraft {
            translation_language: self
                .selected_language
                .as_deref()
                .map_or(defaults.translation_language, |code| {
                    Language::from_code(Some(code))
                }),
            test_duration_secs: self.test_duration.unwrap_or(defaults.test_duration_secs),
            sound_on: self.is_sound_on.unwrap_or(defaults.sound_on),
            pass_policy,
            question_count: self.question_count.unwrap_or(defaults.question_count),
            group_size: self.group_size.unwrap_or(defaults.group_size),
            warning_threshold_secs: self
                .warning_seconds
                .unwrap_or(defaults.warning_threshold_secs),
        }
        .validate()
        .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

/// Preferences persisted to a single TOML file.
#[derive(Clone, Debug)]
pub struct TomlPreferencesStore {
    path: PathBuf,
}

impl TomlPreferencesStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PreferencesRepository for TomlPreferencesStore {
    async fn get_settings(&self) -> Result<Option<ExamSettings>, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let record: PreferencesRecord = toml::from_str(&contents)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        record.into_settings().map(Some)
    }

    async fn save_settings(&self, settings: &ExamSettings) -> Result<(), StorageError> {
        let record = PreferencesRecord::from_settings(settings);
        let contents = toml::to_string(&record)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, contents).await?;
        tracing::debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}
