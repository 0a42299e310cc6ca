use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;

use quiz_core::model::{ExamMode, ExamSettings, Question};

/// Ordered questions assigned to one session. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingSet {
    mode: ExamMode,
    questions: Arc<[Question]>,
}

impl WorkingSet {
    #[must_use]
    pub fn new(mode: ExamMode, questions: impl Into<Arc<[Question]>>) -> Self {
        Self {
            mode,
            questions: questions.into(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.mode
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Builds working sets from the full catalogue.
///
/// Tests are drawn by stratified sampling: the catalogue is cut into
/// contiguous groups of `group_size` (one topic each), one question is drawn
/// per group, any shortfall is filled from the unused pool, and the result is
/// shuffled so the group structure does not show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSelector {
    group_size: usize,
}

impl QuestionSelector {
    #[must_use]
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size: group_size.max(1),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ExamSettings) -> Self {
        Self::new(usize::try_from(settings.group_size()).unwrap_or(usize::MAX))
    }

    #[must_use]
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Select the working set for `mode`.
    ///
    /// - `Practice` keeps every question in catalogue order.
    /// - `Test { count }` draws `min(count, questions.len())` distinct questions
    ///   and records the drawn count as the set's mode.
    ///
    /// The same `rng` state always produces the same set.
    pub fn select<R: Rng + ?Sized>(
        &self,
        questions: &[Question],
        mode: ExamMode,
        rng: &mut R,
    ) -> WorkingSet {
        match mode {
            ExamMode::Practice => WorkingSet::new(mode, questions.to_vec()),
            ExamMode::Test { count } => {
                let picked: Vec<Question> = self
                    .sample_indices(questions.len(), count, rng)
                    .into_iter()
                    .map(|index| questions[index].clone())
                    .collect();
                let drawn = ExamMode::Test {
                    count: picked.len(),
                };
                WorkingSet::new(drawn, picked)
            }
        }
    }

    fn sample_indices<R: Rng + ?Sized>(&self, len: usize, count: usize, rng: &mut R) -> Vec<usize> {
        let count = count.min(len);
        if count == 0 {
            return Vec::new();
        }

        let mut picked: Vec<usize> = (0..len)
            .step_by(self.group_size)
            .map(|start| {
                let end = start.saturating_add(self.group_size).min(len);
                rng.random_range(start..end)
            })
            .collect();

        if picked.len() > count {
            picked.shuffle(rng);
            picked.truncate(count);
        } else if picked.len() < count {
            let taken: HashSet<usize> = picked.iter().copied().collect();
            let mut pool: Vec<usize> = (0..len).filter(|i| !taken.contains(i)).collect();
            pool.shuffle(rng);
            let missing = count - picked.len();
            picked.extend(pool.into_iter().take(missing));
        }

        picked.shuffle(rng);
        picked
    }
}

impl Default for QuestionSelector {
    fn default() -> Self {
        Self::new(usize::try_from(quiz_core::model::DEFAULT_GROUP_SIZE).unwrap_or(10))
    }
}
