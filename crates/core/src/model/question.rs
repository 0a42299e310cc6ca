use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::model::ids::{AnswerId, QuestionId};
use crate::model::language::Language;

/// Translated texts keyed by language code.
pub type Translations = BTreeMap<String, String>;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    BlankId,

    #[error("question {question} has no answers")]
    NoAnswers { question: QuestionId },

    #[error("question {question} has an answer with an empty id")]
    BlankAnswerId { question: QuestionId },

    #[error("question {question} repeats answer id {answer}")]
    DuplicateAnswerId {
        question: QuestionId,
        answer: AnswerId,
    },

    #[error("question {question} marks unknown answer {answer} as correct")]
    UnknownCorrectAnswer {
        question: QuestionId,
        answer: AnswerId,
    },
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    id: AnswerId,
    original: String,
    translations: Translations,
}

impl Answer {
    #[must_use]
    pub fn new(id: AnswerId, original: impl Into<String>, translations: Translations) -> Self {
        Self {
            id,
            original: original.into(),
            translations,
        }
    }

    #[must_use]
    pub fn id(&self) -> &AnswerId {
        &self.id
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Text in the given language, or the original text when no translation
    /// exists (or no language is requested).
    #[must_use]
    pub fn text(&self, language: Option<Language>) -> &str {
        localized(&self.original, &self.translations, language)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it comes out of a dataset.
#[derive(Debug, Clone, Default)]
pub struct QuestionDraft {
    pub id: String,
    pub original: String,
    pub translations: Translations,
    pub image: Option<String>,
    pub answers: Vec<Answer>,
    pub correct_answer_id: String,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the id is blank, there are no answers,
    /// answer ids are blank or repeated, or the correct answer id does not
    /// reference one of the answers.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = QuestionId::new(self.id);
        if id.is_blank() {
            return Err(QuestionError::BlankId);
        }
        if self.answers.is_empty() {
            return Err(QuestionError::NoAnswers { question: id });
        }

        let mut seen = HashSet::with_capacity(self.answers.len());
        for answer in &self.answers {
            if answer.id().is_blank() {
                return Err(QuestionError::BlankAnswerId { question: id });
            }
            if !seen.insert(answer.id()) {
                return Err(QuestionError::DuplicateAnswerId {
                    question: id,
                    answer: answer.id().clone(),
                });
            }
        }

        let correct_answer_id = AnswerId::new(self.correct_answer_id);
        let Some(correct_index) = self
            .answers
            .iter()
            .position(|answer| answer.id() == &correct_answer_id)
        else {
            return Err(QuestionError::UnknownCorrectAnswer {
                question: id,
                answer: correct_answer_id,
            });
        };

        Ok(Question {
            id,
            original: self.original,
            translations: self.translations,
            image: self.image.filter(|image| !image.trim().is_empty()),
            answers: self.answers,
            correct_index,
        })
    }
}

/// A validated multiple-choice question.
///
/// The correct answer is always one of `answers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    original: String,
    translations: Translations,
    image: Option<String>,
    answers: Vec<Answer>,
    correct_index: usize,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, id: &AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.id() == id)
    }

    #[must_use]
    pub fn correct_answer(&self) -> &Answer {
        &self.answers[self.correct_index]
    }

    #[must_use]
    pub fn correct_answer_id(&self) -> &AnswerId {
        self.correct_answer().id()
    }

    #[must_use]
    pub fn is_correct(&self, answer_id: &AnswerId) -> bool {
        self.correct_answer_id() == answer_id
    }

    /// Prompt in the given language, falling back to the original text.
    #[must_use]
    pub fn text(&self, language: Option<Language>) -> &str {
        localized(&self.original, &self.translations, language)
    }
}

fn localized<'a>(
    original: &'a str,
    translations: &'a Translations,
    language: Option<Language>,
) -> &'a str {
    language
        .and_then(|language| translations.get(language.code()))
        .map(String::as_str)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(original)
}
