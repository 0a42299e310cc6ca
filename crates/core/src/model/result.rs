use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ExamMode, PassPolicy, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionResultError {
    #[error("a session result needs at least one question")]
    Empty,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Terminal snapshot of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    session_id: SessionId,
    mode: ExamMode,
    correct: u32,
    total: u32,
    passed: bool,
    elapsed_secs: u32,
    completed_at: DateTime<Utc>,
}

impl SessionResult {
    /// Score a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionResultError::Empty` for a zero-question session and
    /// `SessionResultError::CorrectExceedsTotal` when the tally is impossible.
    pub fn new(
        session_id: SessionId,
        mode: ExamMode,
        correct: u32,
        total: u32,
        policy: PassPolicy,
        elapsed_secs: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionResultError> {
        if total == 0 {
            return Err(SessionResultError::Empty);
        }
        if correct > total {
            return Err(SessionResultError::CorrectExceedsTotal { correct, total });
        }

        Ok(Self {
            session_id,
            mode,
            correct,
            total,
            passed: policy.is_passed(correct, total),
            elapsed_secs,
            completed_at,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.mode
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
