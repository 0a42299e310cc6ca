mod picker;
mod plan;
mod progress;
mod rules;
mod service;
mod timer;
mod view;
mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use picker::{PickerEntry, QuestionPicker};
pub use plan::{QuestionSelector, WorkingSet};
pub use progress::SessionProgress;
pub use rules::{NavigationRules, Reselect};
pub use service::{ExamSession, TickOutcome, Transition};
pub use timer::{Countdown, TICK_PERIOD};
pub use view::{AnswerState, AnswerView, ResultView, SessionView};
pub use workflow::{ExamLoopService, RunningSession, SessionAction, SessionHost};
