use thiserror::Error;

use crate::model::{Language, PassPolicy};

/// Questions in one official test.
pub const DEFAULT_QUESTION_COUNT: u32 = 33;
/// Catalogue questions per topic group used when sampling a test.
pub const DEFAULT_GROUP_SIZE: u32 = 10;
/// Remaining seconds below which the countdown is flagged as low.
pub const DEFAULT_WARNING_SECS: u32 = 60;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("test duration must be > 0 seconds")]
    InvalidTestDuration,

    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("sampling group size must be > 0")]
    InvalidGroupSize,

    #[error("pass threshold ({threshold}) exceeds the question count ({count})")]
    UnreachableThreshold { threshold: u32, count: u32 },
}

//
// ─── TEST DURATION ─────────────────────────────────────────────────────────────
//

/// Durations offered by the settings picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestDuration {
    Minutes15,
    Minutes30,
    Minutes45,
    Minutes60,
    Minutes90,
}

impl TestDuration {
    pub const ALL: [TestDuration; 5] = [
        TestDuration::Minutes15,
        TestDuration::Minutes30,
        TestDuration::Minutes45,
        TestDuration::Minutes60,
        TestDuration::Minutes90,
    ];

    #[must_use]
    pub fn secs(self) -> u32 {
        match self {
            Self::Minutes15 => 900,
            Self::Minutes30 => 1_800,
            Self::Minutes45 => 2_700,
            Self::Minutes60 => 3_600,
            Self::Minutes90 => 5_400,
        }
    }

    #[must_use]
    pub fn from_secs(secs: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|duration| duration.secs() == secs)
    }

    /// Label in `MM:00` form.
    #[must_use]
    pub fn formatted(self) -> String {
        format!("{:02}:00", self.secs() / 60)
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// User preferences consumed by exam sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSettings {
    translation_language: Language,
    test_duration_secs: u32,
    sound_on: bool,
    pass_policy: PassPolicy,
    question_count: u32,
    group_size: u32,
    warning_threshold_secs: u32,
}

/// Editable form of `ExamSettings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSettingsDraft {
    pub translation_language: Language,
    pub test_duration_secs: u32,
    pub sound_on: bool,
    pub pass_policy: PassPolicy,
    pub question_count: u32,
    pub group_size: u32,
    pub warning_threshold_secs: u32,
}

impl Default for ExamSettingsDraft {
    fn default() -> Self {
        Self {
            translation_language: Language::default(),
            test_duration_secs: TestDuration::Minutes30.secs(),
            sound_on: true,
            pass_policy: PassPolicy::default(),
            question_count: DEFAULT_QUESTION_COUNT,
            group_size: DEFAULT_GROUP_SIZE,
            warning_threshold_secs: DEFAULT_WARNING_SECS,
        }
    }
}

impl ExamSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a count or duration is zero, or a fixed
    /// pass threshold can never be reached with the configured question count.
    pub fn validate(self) -> Result<ExamSettings, SettingsError> {
        if self.test_duration_secs == 0 {
            return Err(SettingsError::InvalidTestDuration);
        }
        if self.question_count == 0 {
            return Err(SettingsError::InvalidQuestionCount);
        }
        if self.group_size == 0 {
            return Err(SettingsError::InvalidGroupSize);
        }
        if let PassPolicy::FixedThreshold { min_correct } = self.pass_policy {
            if min_correct > self.question_count {
                return Err(SettingsError::UnreachableThreshold {
                    threshold: min_correct,
                    count: self.question_count,
                });
            }
        }

        Ok(ExamSettings {
            translation_language: self.translation_language,
            test_duration_secs: self.test_duration_secs,
            sound_on: self.sound_on,
            pass_policy: self.pass_policy,
            question_count: self.question_count,
            group_size: self.group_size,
            warning_threshold_secs: self.warning_threshold_secs,
        })
    }
}

impl ExamSettings {
    #[must_use]
    pub fn translation_language(&self) -> Language {
        self.translation_language
    }

    #[must_use]
    pub fn test_duration_secs(&self) -> u32 {
        self.test_duration_secs
    }

    #[must_use]
    pub fn sound_on(&self) -> bool {
        self.sound_on
    }

    #[must_use]
    pub fn pass_policy(&self) -> PassPolicy {
        self.pass_policy
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn group_size(&self) -> u32 {
        self.group_size
    }

    #[must_use]
    pub fn warning_threshold_secs(&self) -> u32 {
        self.warning_threshold_secs
    }

    /// Copy the settings back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> ExamSettingsDraft {
        ExamSettingsDraft {
            translation_language: self.translation_language,
            test_duration_secs: self.test_duration_secs,
            sound_on: self.sound_on,
            pass_policy: self.pass_policy,
            question_count: self.question_count,
            group_size: self.group_size,
            warning_threshold_secs: self.warning_threshold_secs,
        }
    }
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            translation_language: Language::default(),
            test_duration_secs: TestDuration::Minutes30.secs(),
            sound_on: true,
            pass_policy: PassPolicy::default(),
            question_count: DEFAULT_QUESTION_COUNT,
            group_size: DEFAULT_GROUP_SIZE,
            warning_threshold_secs: DEFAULT_WARNING_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = ExamSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, ExamSettings::default());
        assert_eq!(settings.test_duration_secs(), 1_800);
        assert_eq!(settings.translation_language(), Language::En);
        assert_eq!(settings.question_count(), 33);
    }

    #[test]
    fn rejects_zero_duration() {
        let draft = ExamSettingsDraft {
            test_duration_secs: 0,
            ..ExamSettingsDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err(), SettingsError::InvalidTestDuration);
    }

    #[test]
    fn rejects_unreachable_threshold() {
        let draft = ExamSettingsDraft {
            question_count: 10,
            pass_policy: PassPolicy::FixedThreshold { min_correct: 17 },
            ..ExamSettingsDraft::default()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            SettingsError::UnreachableThreshold {
                threshold: 17,
                count: 10
            }
        );
    }

    #[test]
    fn majority_policy_ignores_threshold_check() {
        let draft = ExamSettingsDraft {
            question_count: 5,
            pass_policy: PassPolicy::StrictMajority,
            ..ExamSettingsDraft::default()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn duration_presets() {
        assert_eq!(TestDuration::from_secs(2_700), Some(TestDuration::Minutes45));
        assert_eq!(TestDuration::from_secs(1_000), None);
        assert_eq!(TestDuration::Minutes90.formatted(), "90:00");
    }
}
