use std::sync::Arc;

use quiz_core::model::Question;
use storage::repository::QuestionRepository;

/// Outcome of loading the catalogue.
#[derive(Debug, Clone)]
pub enum BankState {
    Ready(Arc<[Question]>),
    /// Missing, unreadable or empty catalogue. Sessions must not start.
    NotReady,
}

/// Loads the question catalogue and collapses every failure into `NotReady`.
#[derive(Clone)]
pub struct QuestionBank {
    repo: Arc<dyn QuestionRepository>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(repo: Arc<dyn QuestionRepository>) -> Self {
        Self { repo }
    }

    pub async fn load(&self) -> BankState {
        match self.repo.load_questions().await {
            Ok(questions) if questions.is_empty() => {
                tracing::warn!("question catalogue is empty");
                BankState::NotReady
            }
            Ok(questions) => {
                tracing::info!(count = questions.len(), "question catalogue loaded");
                BankState::Ready(questions.into())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load question catalogue");
                BankState::NotReady
            }
        }
    }
}
