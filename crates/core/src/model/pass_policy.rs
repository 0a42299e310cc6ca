/// Rule deciding whether a finished session counts as passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPolicy {
    /// Passed when at least `min_correct` answers were right.
    FixedThreshold { min_correct: u32 },
    /// Passed when more than half of the questions were answered correctly.
    StrictMajority,
}

impl PassPolicy {
    /// The citizenship-test rule: 17 of 33.
    pub const OFFICIAL: PassPolicy = PassPolicy::FixedThreshold { min_correct: 17 };

    #[must_use]
    pub fn is_passed(self, correct: u32, total: u32) -> bool {
        match self {
            Self::FixedThreshold { min_correct } => correct >= min_correct,
            Self::StrictMajority => u64::from(correct) * 2 > u64::from(total),
        }
    }
}

impl Default for PassPolicy {
    fn default() -> Self {
        Self::OFFICIAL
    }
}
