use async_trait::async_trait;
use quiz_core::model::{
    Answer, AnswerId, ExamSettings, Question, QuestionDraft, QuestionError, Translations,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound
        } else {
            StorageError::Io(err.to_string())
        }
    }
}

/// Persisted shape of an answer inside a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub original: String,
    #[serde(default)]
    pub translations: Translations,
}

/// Persisted shape of a question inside a dataset.
///
/// Mirrors the domain `Question` so adapters can decode without leaking
/// serialization concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: String,
    pub original: String,
    #[serde(default)]
    pub translations: Translations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub answers: Vec<AnswerRecord>,
    pub correct_answer_id: String,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().as_str().to_owned(),
            original: question.original().to_owned(),
            translations: question.translations().clone(),
            image: question.image().map(str::to_owned),
            answers: question
                .answers()
                .iter()
                .map(|answer| AnswerRecord {
                    id: answer.id().as_str().to_owned(),
                    original: answer.original().to_owned(),
                    translations: answer.translations().clone(),
                })
                .collect(),
            correct_answer_id: question.correct_answer_id().as_str().to_owned(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the record violates question invariants.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        QuestionDraft {
            id: self.id,
            original: self.original,
            translations: self.translations,
            image: self.image,
            answers: self
                .answers
                .into_iter()
                .map(|answer| {
                    Answer::new(AnswerId::new(answer.id), answer.original, answer.translations)
                })
                .collect(),
            correct_answer_id: self.correct_answer_id,
        }
        .validate()
    }
}

/// Top-level document of a bundled dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionCatalog {
    pub questions: Vec<QuestionRecord>,
}

/// Source of the question catalogue.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Load every usable question, in catalogue order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the dataset is missing or cannot be decoded.
    async fn load_questions(&self) -> Result<Vec<Question>, StorageError>;
}

/// Key-value store for user preferences.
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Fetch stored settings, `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if stored preferences cannot be read.
    async fn get_settings(&self) -> Result<Option<ExamSettings>, StorageError>;

    /// Persist settings, replacing previous values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &ExamSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    settings: Arc<Mutex<Option<ExamSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
            settings: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn load_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl PreferencesRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<ExamSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_settings(&self, settings: &ExamSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}
