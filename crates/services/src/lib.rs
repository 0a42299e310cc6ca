#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod feedback;
pub mod preferences_service;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use bank::{BankState, QuestionBank};
pub use error::{PreferencesError, SessionError};
pub use feedback::{FeedbackCue, FeedbackSink, SilentFeedback};
pub use preferences_service::PreferencesService;

pub use sessions::{
    AnswerState, AnswerView, Countdown, ExamLoopService, ExamSession, NavigationRules,
    PickerEntry, QuestionPicker, QuestionSelector, Reselect, ResultView, RunningSession,
    SessionAction, SessionHost, SessionProgress, SessionView, TickOutcome, Transition,
    WorkingSet,
};
