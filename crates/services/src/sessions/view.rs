use quiz_core::model::{AnswerId, QuestionId, SessionResult};

use super::service::ExamSession;

/// How one answer should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    /// Nothing selected yet on this question.
    Unselected,
    SelectedCorrect,
    SelectedIncorrect,
    /// Another answer was selected; `correct` marks the right one.
    Other { correct: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerView {
    pub id: AnswerId,
    pub text: String,
    pub state: AnswerState,
}

/// Presentation-agnostic snapshot of a running session.
///
/// Carries no formatting beyond picking the display language; the front end
/// decides how to render time and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub question_id: QuestionId,
    pub prompt: String,
    pub image: Option<String>,
    pub answers: Vec<AnswerView>,
    /// Zero-based position in the working set.
    pub position: usize,
    pub total: usize,
    /// Questions scored so far.
    pub answered: usize,
    pub correct: u32,
    pub remaining_secs: Option<u32>,
    pub low_time: bool,
    pub showing_translation: bool,
    pub can_go_back: bool,
    pub can_advance: bool,
    pub can_jump: bool,
}

impl SessionView {
    /// Snapshot the current question, `None` once the session is finished.
    #[must_use]
    pub fn from_session(session: &ExamSession) -> Option<Self> {
        let position = session.index()?;
        let question = session.current_question()?;
        let language = session.display_language();
        let selection = session.selection();

        let answers = question
            .answers()
            .iter()
            .map(|answer| {
                let is_correct = question.is_correct(answer.id());
                let state = match selection {
                    None => AnswerState::Unselected,
                    Some(selected) if selected == answer.id() => {
                        if is_correct {
                            AnswerState::SelectedCorrect
                        } else {
                            AnswerState::SelectedIncorrect
                        }
                    }
                    Some(_) => AnswerState::Other {
                        correct: is_correct,
                    },
                };
                AnswerView {
                    id: answer.id().clone(),
                    text: answer.text(language).to_owned(),
                    state,
                }
            })
            .collect();

        Some(Self {
            question_id: question.id().clone(),
            prompt: question.text(language).to_owned(),
            image: question.image().map(str::to_owned),
            answers,
            position,
            total: session.total(),
            answered: session.progress().answered,
            correct: session.correct_count(),
            remaining_secs: session.remaining_secs(),
            low_time: session.is_low_time(),
            showing_translation: session.showing_translation(),
            can_go_back: session.can_go_back(),
            can_advance: session.can_advance(),
            can_jump: session.can_jump(),
        })
    }
}

/// Final screen data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub title: String,
    pub correct: u32,
    pub total: u32,
    pub passed: bool,
    pub elapsed_secs: u32,
}

impl From<&SessionResult> for ResultView {
    fn from(result: &SessionResult) -> Self {
        Self {
            title: result.mode().title(),
            correct: result.correct(),
            total: result.total(),
            passed: result.passed(),
            elapsed_secs: result.elapsed_secs(),
        }
    }
}
