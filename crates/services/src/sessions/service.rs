use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{
    AnswerId, ExamMode, ExamSettings, Language, PassPolicy, Question, SessionId, SessionResult,
};

use super::plan::WorkingSet;
use super::progress::SessionProgress;
use super::rules::{NavigationRules, Reselect};
use crate::error::SessionError;
use crate::feedback::{FeedbackCue, FeedbackSink, SilentFeedback};

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// What a user-driven call did to the session.
///
/// Out-of-contract calls (double taps, advancing unanswered, anything after
/// the session finished) come back as `Ignored` instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Ignored,
    /// An answer was highlighted. `scored` is false when the question had
    /// already been counted earlier in the session.
    Answered { correct: bool, scored: bool },
    Moved { index: usize },
    TranslationToggled { showing: bool },
    Finished(SessionResult),
}

/// What a timer tick did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Ticked { remaining_secs: u32, low_time: bool },
    Expired(SessionResult),
}

type FinishCallback = Box<dyn FnOnce(&SessionResult)>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Active {
        index: usize,
        selection: Option<AnswerId>,
    },
    Finished(SessionResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One practice or test run over a working set.
///
/// Every mutation happens through `&mut self` on the caller's thread; the
/// countdown feeds in through `tick`.
pub struct ExamSession {
    id: SessionId,
    working_set: WorkingSet,
    rules: NavigationRules,
    pass_policy: PassPolicy,
    state: State,
    correct: u32,
    scored: Vec<bool>,
    duration_secs: u32,
    remaining_secs: Option<u32>,
    warning_secs: u32,
    language: Language,
    show_translation: bool,
    sound_on: bool,
    clock: Clock,
    started_at: DateTime<Utc>,
    feedback: Arc<dyn FeedbackSink>,
    on_finished: Option<FinishCallback>,
}

impl ExamSession {
    /// Start a session over `working_set` using the user's settings.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the working set has no questions.
    pub fn new(
        working_set: WorkingSet,
        settings: &ExamSettings,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        if working_set.is_empty() {
            return Err(SessionError::Empty);
        }

        let rules = NavigationRules::for_mode(working_set.mode());
        let remaining_secs = rules.timed.then_some(settings.test_duration_secs());
        let scored = vec![false; working_set.len()];
        let session = Self {
            id: SessionId::generate(),
            working_set,
            rules,
            pass_policy: settings.pass_policy(),
            state: State::Active {
                index: 0,
                selection: None,
            },
            correct: 0,
            scored,
            duration_secs: settings.test_duration_secs(),
            remaining_secs,
            warning_secs: settings.warning_threshold_secs(),
            language: settings.translation_language(),
            show_translation: false,
            sound_on: settings.sound_on(),
            clock,
            started_at: clock.now(),
            feedback: Arc::new(SilentFeedback),
            on_finished: None,
        };

        tracing::info!(
            session = %session.id,
            mode = ?session.mode(),
            questions = session.total(),
            "session started"
        );
        Ok(session)
    }

    /// Replace the rules picked from the mode.
    #[must_use]
    pub fn with_rules(mut self, rules: NavigationRules) -> Self {
        self.remaining_secs = rules.timed.then_some(self.duration_secs);
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Register the completion callback. It runs exactly once, when the
    /// session finishes.
    #[must_use]
    pub fn on_finished(mut self, callback: impl FnOnce(&SessionResult) + 'static) -> Self {
        self.on_finished = Some(Box::new(callback));
        self
    }

    // ─── Queries ───────────────────────────────────────────────────────────────

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.working_set.mode()
    }

    #[must_use]
    pub fn rules(&self) -> NavigationRules {
        self.rules
    }

    #[must_use]
    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.working_set.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    /// Index of the current question, `None` once finished.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match &self.state {
            State::Active { index, .. } => Some(*index),
            State::Finished(_) => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.index().and_then(|index| self.working_set.get(index))
    }

    #[must_use]
    pub fn selection(&self) -> Option<&AnswerId> {
        match &self.state {
            State::Active { selection, .. } => selection.as_ref(),
            State::Finished(_) => None,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished(_))
    }

    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        match &self.state {
            State::Finished(result) => Some(result),
            State::Active { .. } => None,
        }
    }

    /// Seconds left on the countdown; `None` for untimed sessions.
    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining_secs
    }

    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.remaining_secs
            .is_some_and(|remaining| remaining < self.warning_secs)
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.rules.can_go_back && self.index().is_some_and(|index| index > 0)
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        match &self.state {
            State::Active { selection, .. } => {
                !self.rules.advance_requires_answer || selection.is_some()
            }
            State::Finished(_) => false,
        }
    }

    #[must_use]
    pub fn can_jump(&self) -> bool {
        self.rules.can_jump && !self.is_finished()
    }

    #[must_use]
    pub fn showing_translation(&self) -> bool {
        self.show_translation
    }

    /// Language used for prompts right now: the preferred translation when
    /// toggled on, otherwise the original text.
    #[must_use]
    pub fn display_language(&self) -> Option<Language> {
        self.show_translation.then_some(self.language)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let answered = self.scored.iter().filter(|scored| **scored).count();
        SessionProgress {
            total: self.total(),
            answered,
            remaining: self.total().saturating_sub(answered),
            is_complete: self.is_finished(),
        }
    }

    // ─── Transitions ───────────────────────────────────────────────────────────

    /// Highlight an answer for the current question and score it.
    pub fn select_answer(&mut self, answer_id: &AnswerId) -> Transition {
        let State::Active { index, selection } = &mut self.state else {
            tracing::trace!(session = %self.id, "select after finish ignored");
            return Transition::Ignored;
        };
        let index = *index;
        let Some(question) = self.working_set.get(index) else {
            return Transition::Ignored;
        };
        if question.answer(answer_id).is_none() {
            tracing::debug!(session = %self.id, answer = %answer_id, "unknown answer ignored");
            return Transition::Ignored;
        }

        if let Some(previous) = selection.as_ref() {
            if self.rules.reselect == Reselect::Locked || previous == answer_id {
                tracing::trace!(session = %self.id, index, "reselect ignored");
                return Transition::Ignored;
            }
        }

        let correct = question.is_correct(answer_id);
        *selection = Some(answer_id.clone());

        let scored = !self.scored[index];
        if scored {
            self.scored[index] = true;
            if correct {
                self.correct += 1;
            }
        }

        self.emit(if correct {
            FeedbackCue::Correct
        } else {
            FeedbackCue::Wrong
        });
        Transition::Answered { correct, scored }
    }

    /// Move to the next question, or finish from the last one.
    pub fn advance(&mut self) -> Transition {
        let State::Active { index, selection } = &mut self.state else {
            return Transition::Ignored;
        };
        if self.rules.advance_requires_answer && selection.is_none() {
            tracing::trace!(session = %self.id, "advance without answer ignored");
            return Transition::Ignored;
        }

        if *index + 1 < self.working_set.len() {
            *index += 1;
            *selection = None;
            Transition::Moved { index: *index }
        } else {
            self.finish()
        }
    }

    pub fn go_back(&mut self) -> Transition {
        if !self.rules.can_go_back {
            return Transition::Ignored;
        }
        let State::Active { index, selection } = &mut self.state else {
            return Transition::Ignored;
        };
        if *index == 0 {
            return Transition::Ignored;
        }
        *index -= 1;
        *selection = None;
        Transition::Moved { index: *index }
    }

    /// Jump straight to `target` (the question picker). Selection is reset.
    pub fn jump_to(&mut self, target: usize) -> Transition {
        if !self.rules.can_jump || target >= self.working_set.len() {
            return Transition::Ignored;
        }
        let State::Active { index, selection } = &mut self.state else {
            return Transition::Ignored;
        };
        *index = target;
        *selection = None;
        Transition::Moved { index: target }
    }

    pub fn toggle_translation(&mut self) -> Transition {
        if self.is_finished() {
            return Transition::Ignored;
        }
        self.show_translation = !self.show_translation;
        Transition::TranslationToggled {
            showing: self.show_translation,
        }
    }

    /// End the session now with whatever has been scored so far.
    pub fn force_finish(&mut self) -> Transition {
        if self.is_finished() {
            return Transition::Ignored;
        }
        self.finish()
    }

    /// Apply one countdown tick.
    ///
    /// A tick that finds the clock already at zero finishes the session.
    pub fn tick(&mut self) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::Ignored;
        }
        let Some(remaining) = self.remaining_secs else {
            return TickOutcome::Ignored;
        };

        if remaining > 0 {
            let remaining = remaining - 1;
            self.remaining_secs = Some(remaining);
            tracing::trace!(session = %self.id, remaining, "tick");
            return TickOutcome::Ticked {
                remaining_secs: remaining,
                low_time: self.is_low_time(),
            };
        }

        tracing::info!(session = %self.id, "time is up");
        match self.finish() {
            Transition::Finished(result) => TickOutcome::Expired(result),
            _ => TickOutcome::Ignored,
        }
    }

    fn elapsed_secs(&self) -> u32 {
        match self.remaining_secs {
            Some(remaining) => self.duration_secs.saturating_sub(remaining),
            None => self.clock.seconds_since(self.started_at),
        }
    }

    fn finish(&mut self) -> Transition {
        let total = u32::try_from(self.working_set.len()).unwrap_or(u32::MAX);
        let result = match SessionResult::new(
            self.id,
            self.mode(),
            self.correct,
            total,
            self.pass_policy,
            self.elapsed_secs(),
            self.clock.now(),
        ) {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(session = %self.id, error = %err, "could not score session");
                return Transition::Ignored;
            }
        };

        self.state = State::Finished(result.clone());
        tracing::info!(
            session = %self.id,
            correct = result.correct(),
            total = result.total(),
            passed = result.passed(),
            elapsed_secs = result.elapsed_secs(),
            "session finished"
        );

        self.emit(if result.passed() {
            FeedbackCue::Passed
        } else {
            FeedbackCue::Failed
        });
        if let Some(callback) = self.on_finished.take() {
            callback(&result);
        }
        Transition::Finished(result)
    }

    fn emit(&self, cue: FeedbackCue) {
        if self.sound_on {
            self.feedback.cue(cue);
        }
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("id", &self.id)
            .field("mode", &self.mode())
            .field("questions_len", &self.working_set.len())
            .field("state", &self.state)
            .field("correct", &self.correct)
            .field("remaining_secs", &self.remaining_secs)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;

    use chrono::Duration;
    use quiz_core::model::ExamSettingsDraft;
    use quiz_core::time::{fixed_clock, fixed_now};

    use crate::sessions::test_support::{build_question, build_questions};

    fn settings() -> ExamSettings {
        ExamSettingsDraft::default().validate().unwrap()
    }

    fn settings_with(draft: ExamSettingsDraft) -> ExamSettings {
        draft.validate().unwrap()
    }

    fn test_session(count: usize) -> ExamSession {
        let set = WorkingSet::new(ExamMode::Test { count }, build_questions(count));
        ExamSession::new(set, &settings(), fixed_clock()).unwrap()
    }

    fn practice_session(count: usize) -> ExamSession {
        let set = WorkingSet::new(ExamMode::Practice, build_questions(count));
        ExamSession::new(set, &settings(), fixed_clock()).unwrap()
    }

    fn right() -> AnswerId {
        AnswerId::new("a")
    }

    fn wrong() -> AnswerId {
        AnswerId::new("b")
    }

    #[derive(Default)]
    struct RecordingFeedback(Mutex<Vec<FeedbackCue>>);

    impl FeedbackSink for RecordingFeedback {
        fn cue(&self, cue: FeedbackCue) {
            self.0.lock().unwrap().push(cue);
        }
    }

    #[test]
    fn empty_working_set_is_rejected() {
        let set = WorkingSet::new(ExamMode::Practice, Vec::new());
        let err = ExamSession::new(set, &settings(), fixed_clock()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn starts_at_first_question_without_selection() {
        let session = test_session(3);
        assert_eq!(session.index(), Some(0));
        assert!(session.selection().is_none());
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.remaining_secs(), Some(1_800));
        assert!(!session.can_advance());
        assert!(!session.can_go_back());
    }

    #[test]
    fn two_question_test_scenario() {
        let q1 = build_question("1", "A1");
        let q2 = build_question("2", "A2");
        let set = WorkingSet::new(ExamMode::Test { count: 2 }, vec![q1, q2]);
        let mut session = ExamSession::new(set, &settings(), fixed_clock()).unwrap();

        session.select_answer(&AnswerId::new("A1"));
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.advance(), Transition::Moved { index: 1 });

        session.select_answer(&AnswerId::new("X"));
        assert_eq!(session.correct_count(), 1);

        let Transition::Finished(result) = session.advance() else {
            panic!("expected finish");
        };
        assert_eq!(result.correct(), 1);
        assert_eq!(result.total(), 2);
        assert!(session.is_finished());
    }

    #[test]
    fn test_mode_double_select_counts_once() {
        let mut session = test_session(2);
        let first = session.select_answer(&right());
        assert_eq!(
            first,
            Transition::Answered {
                correct: true,
                scored: true
            }
        );
        assert_eq!(session.select_answer(&right()), Transition::Ignored);
        assert_eq!(session.correct_count(), 1);
    }

    #[test]
    fn test_mode_locks_first_answer() {
        let mut session = test_session(2);
        session.select_answer(&wrong());
        assert_eq!(session.select_answer(&right()), Transition::Ignored);
        assert_eq!(session.selection(), Some(&wrong()));
        assert_eq!(session.correct_count(), 0);
    }

    #[test]
    fn practice_reselect_does_not_change_score() {
        let mut session = practice_session(2);
        session.select_answer(&wrong());
        let again = session.select_answer(&right());
        assert_eq!(
            again,
            Transition::Answered {
                correct: true,
                scored: false
            }
        );
        assert_eq!(session.selection(), Some(&right()));
        assert_eq!(session.correct_count(), 0);
    }

    #[test]
    fn practice_revisit_counts_question_once() {
        let mut session = practice_session(2);
        session.select_answer(&right());
        session.advance();
        session.go_back();
        assert!(session.selection().is_none());
        session.select_answer(&right());
        assert_eq!(session.correct_count(), 1);
    }

    #[test]
    fn unknown_answer_is_ignored() {
        let mut session = test_session(2);
        assert_eq!(session.select_answer(&AnswerId::new("zz")), Transition::Ignored);
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_mode_cannot_advance_unanswered() {
        let mut session = test_session(3);
        assert_eq!(session.advance(), Transition::Ignored);
        assert_eq!(session.index(), Some(0));
    }

    #[test]
    fn advance_moves_by_one_and_clears_selection() {
        let mut session = test_session(3);
        session.select_answer(&right());
        assert_eq!(session.advance(), Transition::Moved { index: 1 });
        assert!(session.selection().is_none());
    }

    #[test]
    fn advance_from_last_finishes() {
        let mut session = practice_session(1);
        assert!(matches!(session.advance(), Transition::Finished(_)));
        assert_eq!(session.advance(), Transition::Ignored);
    }

    #[test]
    fn practice_navigates_freely() {
        let mut session = practice_session(5);
        assert_eq!(session.advance(), Transition::Moved { index: 1 });
        assert_eq!(session.go_back(), Transition::Moved { index: 0 });
        assert_eq!(session.go_back(), Transition::Ignored);
        assert_eq!(session.jump_to(4), Transition::Moved { index: 4 });
        assert_eq!(session.jump_to(5), Transition::Ignored);
    }

    #[test]
    fn jump_clears_selection() {
        let mut session = practice_session(5);
        session.select_answer(&right());
        session.jump_to(3);
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_mode_forbids_back_and_jump() {
        let mut session = test_session(3);
        session.select_answer(&right());
        session.advance();
        assert_eq!(session.go_back(), Transition::Ignored);
        assert_eq!(session.jump_to(0), Transition::Ignored);
        assert_eq!(session.index(), Some(1));
    }

    #[test]
    fn force_finish_at_any_index_reports_full_total() {
        for stop_at in 0..4 {
            let mut session = test_session(4);
            for _ in 0..stop_at {
                session.select_answer(&right());
                session.advance();
            }
            let Transition::Finished(result) = session.force_finish() else {
                panic!("expected finish");
            };
            assert_eq!(result.total(), 4);
            assert_eq!(result.correct(), u32::try_from(stop_at).unwrap());
            assert!(result.correct() <= result.total());
        }
    }

    #[test]
    fn force_finish_twice_is_ignored() {
        let mut session = test_session(2);
        session.force_finish();
        assert_eq!(session.force_finish(), Transition::Ignored);
    }

    #[test]
    fn timer_expires_on_tick_after_zero() {
        let settings = settings_with(ExamSettingsDraft {
            test_duration_secs: 1,
            ..ExamSettingsDraft::default()
        });
        let set = WorkingSet::new(ExamMode::Test { count: 2 }, build_questions(2));
        let mut session = ExamSession::new(set, &settings, fixed_clock()).unwrap();

        assert_eq!(
            session.tick(),
            TickOutcome::Ticked {
                remaining_secs: 0,
                low_time: true
            }
        );
        assert!(!session.is_finished());

        let TickOutcome::Expired(result) = session.tick() else {
            panic!("expected expiry");
        };
        assert_eq!(result.elapsed_secs(), 1);
        assert!(session.is_finished());
        assert_eq!(session.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn low_time_flag_below_threshold() {
        let settings = settings_with(ExamSettingsDraft {
            test_duration_secs: 61,
            warning_threshold_secs: 60,
            ..ExamSettingsDraft::default()
        });
        let set = WorkingSet::new(ExamMode::Test { count: 1 }, build_questions(1));
        let mut session = ExamSession::new(set, &settings, fixed_clock()).unwrap();

        assert_eq!(
            session.tick(),
            TickOutcome::Ticked {
                remaining_secs: 60,
                low_time: false
            }
        );
        assert_eq!(
            session.tick(),
            TickOutcome::Ticked {
                remaining_secs: 59,
                low_time: true
            }
        );
    }

    #[test]
    fn practice_ignores_ticks_and_uses_clock_for_elapsed() {
        let mut session = practice_session(2);
        assert!(session.remaining_secs().is_none());
        assert_eq!(session.tick(), TickOutcome::Ignored);

        session.clock.advance(Duration::seconds(42));

        let Transition::Finished(result) = session.force_finish() else {
            panic!("expected finish");
        };
        assert_eq!(result.elapsed_secs(), 42);
        assert_eq!(result.completed_at(), fixed_now() + Duration::seconds(42));
    }

    #[test]
    fn elapsed_time_in_test_counts_ticks() {
        let mut session = test_session(2);
        for _ in 0..90 {
            session.tick();
        }
        let Transition::Finished(result) = session.force_finish() else {
            panic!("expected finish");
        };
        assert_eq!(result.elapsed_secs(), 90);
    }

    #[test]
    fn pass_policy_comes_from_settings() {
        let settings = settings_with(ExamSettingsDraft {
            pass_policy: PassPolicy::StrictMajority,
            ..ExamSettingsDraft::default()
        });
        let set = WorkingSet::new(ExamMode::Test { count: 3 }, build_questions(3));
        let mut session = ExamSession::new(set, &settings, fixed_clock()).unwrap();
        for _ in 0..2 {
            session.select_answer(&right());
            session.advance();
        }
        session.select_answer(&wrong());
        let Transition::Finished(result) = session.advance() else {
            panic!("expected finish");
        };
        assert_eq!(result.correct(), 2);
        assert!(result.passed());
    }

    #[test]
    fn completion_callback_fires_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut session = test_session(1).on_finished(move |result| {
            sink.borrow_mut().push(result.correct());
        });

        session.select_answer(&right());
        session.advance();
        session.force_finish();
        session.tick();

        assert_eq!(*calls.borrow(), vec![1]);
    }

    #[test]
    fn feedback_cues_follow_sound_setting() {
        let recorder = Arc::new(RecordingFeedback::default());
        let mut session = test_session(1).with_feedback(recorder.clone());
        session.select_answer(&wrong());
        session.advance();
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![FeedbackCue::Wrong, FeedbackCue::Failed]
        );

        let muted = settings_with(ExamSettingsDraft {
            sound_on: false,
            ..ExamSettingsDraft::default()
        });
        let quiet = Arc::new(RecordingFeedback::default());
        let set = WorkingSet::new(ExamMode::Test { count: 1 }, build_questions(1));
        let mut session = ExamSession::new(set, &muted, fixed_clock())
            .unwrap()
            .with_feedback(quiet.clone());
        session.select_answer(&right());
        session.advance();
        assert!(quiet.0.lock().unwrap().is_empty());
    }

    #[test]
    fn custom_rules_allow_reselect_in_test() {
        let rules = NavigationRules::TEST.with_reselect(Reselect::Explore);
        let mut session = test_session(2).with_rules(rules);
        session.select_answer(&wrong());
        session.select_answer(&right());
        assert_eq!(session.selection(), Some(&right()));
        assert_eq!(session.correct_count(), 0);
    }

    #[test]
    fn translation_toggle_switches_display_language() {
        let mut session = practice_session(1);
        assert_eq!(session.display_language(), None);
        assert_eq!(
            session.toggle_translation(),
            Transition::TranslationToggled { showing: true }
        );
        assert_eq!(session.display_language(), Some(Language::En));
    }

    #[test]
    fn progress_tracks_scored_questions() {
        let mut session = practice_session(3);
        session.select_answer(&right());
        session.advance();
        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.is_complete);
    }
}
