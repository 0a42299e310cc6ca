//! Question catalogue stored as a bundled JSON document.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::Question;

use crate::repository::{QuestionCatalog, QuestionRepository, StorageError};

#[derive(Clone, Debug)]
enum Source {
    File(PathBuf),
    Bytes(Arc<[u8]>),
}

/// Reads `{"questions": [...]}` documents from disk or from embedded bytes.
#[derive(Clone, Debug)]
pub struct JsonQuestionRepository {
    source: Source,
}

impl JsonQuestionRepository {
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    /// Use a dataset compiled into the binary (e.g. via `include_str!`).
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            source: Source::Bytes(bytes.into()),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Bytes(_) => None,
        }
    }
}

#[async_trait]
impl QuestionRepository for JsonQuestionRepository {
    async fn load_questions(&self) -> Result<Vec<Question>, StorageError> {
        match &self.source {
            Source::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                decode_catalog(&bytes)
            }
            Source::Bytes(bytes) => decode_catalog(bytes),
        }
    }
}

/// Decode a catalogue, keeping catalogue order.
///
/// Records with an empty id are dropped silently. Records that fail
/// validation or repeat an earlier id are dropped with a warning, so one bad
/// entry never takes the whole catalogue down.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the document is not a catalogue.
pub fn decode_catalog(bytes: &[u8]) -> Result<Vec<Question>, StorageError> {
    let catalog: QuestionCatalog =
        serde_json::from_slice(bytes).map_err(|err| StorageError::Serialization(err.to_string()))?;

    let mut seen = HashSet::with_capacity(catalog.questions.len());
    let mut questions = Vec::with_capacity(catalog.questions.len());
    for record in catalog.questions {
        if record.id.is_empty() {
            continue;
        }
        let id = record.id.clone();
        match record.into_question() {
            Ok(question) => {
                if seen.insert(question.id().clone()) {
                    questions.push(question);
                } else {
                    tracing::warn!(question = %id, "skipping duplicate question id");
                }
            }
            Err(err) => tracing::warn!(question = %id, error = %err, "skipping invalid question"),
        }
    }

    tracing::debug!(count = questions.len(), "decoded question catalogue");
    Ok(questions)
}
