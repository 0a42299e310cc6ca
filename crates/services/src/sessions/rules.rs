use quiz_core::model::ExamMode;

/// What happens when an answered question is tapped again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reselect {
    /// The first answer stands; later taps are ignored.
    Locked,
    /// The highlighted answer may change, the recorded score does not.
    Explore,
}

/// Navigation permissions for one mode, as a table rather than branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationRules {
    pub can_go_back: bool,
    pub can_jump: bool,
    pub advance_requires_answer: bool,
    pub reselect: Reselect,
    pub timed: bool,
}

impl NavigationRules {
    pub const PRACTICE: NavigationRules = NavigationRules {
        can_go_back: true,
        can_jump: true,
        advance_requires_answer: false,
        reselect: Reselect::Explore,
        timed: false,
    };

    pub const TEST: NavigationRules = NavigationRules {
        can_go_back: false,
        can_jump: false,
        advance_requires_answer: true,
        reselect: Reselect::Locked,
        timed: true,
    };

    #[must_use]
    pub fn for_mode(mode: ExamMode) -> Self {
        match mode {
            ExamMode::Practice => Self::PRACTICE,
            ExamMode::Test { .. } => Self::TEST,
        }
    }

    #[must_use]
    pub fn with_reselect(mut self, reselect: Reselect) -> Self {
        self.reselect = reselect;
        self
    }
}
