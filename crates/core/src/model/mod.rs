mod ids;
mod language;
mod mode;
mod pass_policy;
mod question;
mod result;
mod settings;

pub use ids::{AnswerId, QuestionId, SessionId};
pub use language::Language;
pub use mode::ExamMode;
pub use pass_policy::PassPolicy;
pub use question::{Answer, Question, QuestionDraft, QuestionError, Translations};
pub use result::{SessionResult, SessionResultError};
pub use settings::{
    DEFAULT_GROUP_SIZE, DEFAULT_QUESTION_COUNT, DEFAULT_WARNING_SECS, ExamSettings,
    ExamSettingsDraft, SettingsError, TestDuration,
};
