use quiz_core::model::QuestionId;

use super::plan::WorkingSet;

/// One row of the picker list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    /// Position in the working set, as accepted by `ExamSession::jump_to`.
    pub index: usize,
    pub question_id: QuestionId,
    pub is_current: bool,
}

/// Digit-by-digit search over question ids.
///
/// An empty query lists every question; otherwise a question matches when
/// its id contains the typed digits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPicker {
    query: String,
}

impl QuestionPicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Append a digit. Returns false (and leaves the query alone) for
    /// anything else.
    pub fn push_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        self.query.push(digit);
        true
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }

    /// Replace the query with the digits found in `input`.
    pub fn set_query(&mut self, input: &str) {
        self.clear();
        for digit in input.chars() {
            self.push_digit(digit);
        }
    }

    #[must_use]
    pub fn matches(&self, set: &WorkingSet, current: Option<usize>) -> Vec<PickerEntry> {
        set.questions()
            .iter()
            .enumerate()
            .filter(|(_, question)| question.id().as_str().contains(self.query.as_str()))
            .map(|(index, question)| PickerEntry {
                index,
                question_id: question.id().clone(),
                is_current: current == Some(index),
            })
            .collect()
    }
}
