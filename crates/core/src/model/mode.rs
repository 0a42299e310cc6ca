use serde::{Deserialize, Serialize};

/// How a session is run.
///
/// Practice walks the whole catalogue in its canonical order with free
/// navigation. Test draws a fixed-size sample and runs against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExamMode {
    Practice,
    Test { count: usize },
}

impl ExamMode {
    #[must_use]
    pub fn title(self) -> String {
        match self {
            Self::Practice => "Practice".to_owned(),
            Self::Test { count } => format!("Test {count}"),
        }
    }
}
