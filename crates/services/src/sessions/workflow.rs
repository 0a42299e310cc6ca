use rand::Rng;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{AnswerId, ExamMode, ExamSettings};

use super::plan::QuestionSelector;
use super::service::{ExamSession, TickOutcome, Transition};
use super::timer::Countdown;
use super::view::SessionView;
use crate::bank::{BankState, QuestionBank};
use crate::error::SessionError;
use crate::feedback::{FeedbackSink, SilentFeedback};

/// User input a front end forwards to the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Select(AnswerId),
    Advance,
    Back,
    JumpTo(usize),
    ToggleTranslation,
    Finish,
}

/// A session paired with the countdown that drives it.
///
/// Every path that finishes the session cancels the countdown, so no tick
/// arrives after the result.
#[derive(Debug)]
pub struct RunningSession {
    session: ExamSession,
    countdown: Countdown,
}

impl RunningSession {
    /// Wrap `session`, starting a countdown if its rules are timed.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(session: ExamSession) -> Self {
        let countdown = if session.rules().timed {
            Countdown::start()
        } else {
            Countdown::idle()
        };
        Self::with_countdown(session, countdown)
    }

    #[must_use]
    pub fn with_countdown(session: ExamSession, countdown: Countdown) -> Self {
        let mut running = Self { session, countdown };
        running.settle();
        running
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    #[must_use]
    pub fn view(&self) -> Option<SessionView> {
        SessionView::from_session(&self.session)
    }

    pub fn apply(&mut self, action: SessionAction) -> Transition {
        let transition = match action {
            SessionAction::Select(answer_id) => self.session.select_answer(&answer_id),
            SessionAction::Advance => self.session.advance(),
            SessionAction::Back => self.session.go_back(),
            SessionAction::JumpTo(index) => self.session.jump_to(index),
            SessionAction::ToggleTranslation => self.session.toggle_translation(),
            SessionAction::Finish => self.session.force_finish(),
        };
        self.settle();
        transition
    }

    /// Wait for the next countdown tick and apply it.
    ///
    /// Cancel safe: dropping the future before it resolves leaves the
    /// session untouched. Never resolves for untimed or finished sessions.
    pub async fn next_tick(&mut self) -> TickOutcome {
        self.countdown.tick().await;
        let outcome = self.session.tick();
        self.settle();
        outcome
    }

    pub fn cancel(&mut self) {
        self.countdown.cancel();
    }

    fn settle(&mut self) {
        if self.session.is_finished() {
            self.countdown.cancel();
        }
    }
}

/// Owns at most one running session.
#[derive(Debug, Default)]
pub struct SessionHost {
    current: Option<RunningSession>,
}

impl SessionHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `running`, cancelling whatever ran before.
    pub fn start(&mut self, running: RunningSession) -> &mut RunningSession {
        self.stop();
        self.current.insert(running)
    }

    /// Cancel and discard the current session.
    pub fn stop(&mut self) {
        if let Some(mut previous) = self.current.take() {
            previous.cancel();
            tracing::debug!(session = %previous.session().id(), "session discarded");
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&RunningSession> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut RunningSession> {
        self.current.as_mut()
    }
}

/// Builds sessions from the catalogue.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    bank: QuestionBank,
    feedback: Arc<dyn FeedbackSink>,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(clock: Clock, bank: QuestionBank) -> Self {
        Self {
            clock,
            bank,
            feedback: Arc::new(SilentFeedback),
        }
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    /// The test mode configured by `settings`.
    #[must_use]
    pub fn test_mode(settings: &ExamSettings) -> ExamMode {
        ExamMode::Test {
            count: usize::try_from(settings.question_count()).unwrap_or(usize::MAX),
        }
    }

    /// Load the catalogue, draw a working set and build a session.
    ///
    /// The session is not running yet; attach a completion callback and hand
    /// it to `RunningSession::new`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotReady` when the catalogue cannot be used and
    /// `SessionError::Empty` when the draw yields no questions.
    pub async fn build_session<R: Rng + ?Sized>(
        &self,
        mode: ExamMode,
        settings: &ExamSettings,
        rng: &mut R,
    ) -> Result<ExamSession, SessionError> {
        let BankState::Ready(questions) = self.bank.load().await else {
            return Err(SessionError::NotReady);
        };
        let working_set = QuestionSelector::from_settings(settings).select(&questions, mode, rng);
        let session = ExamSession::new(working_set, settings, self.clock)?;
        Ok(session.with_feedback(Arc::clone(&self.feedback)))
    }

    /// Build a session and start its countdown.
    ///
    /// # Errors
    ///
    /// Same as `build_session`.
    pub async fn start_session<R: Rng + ?Sized>(
        &self,
        mode: ExamMode,
        settings: &ExamSettings,
        rng: &mut R,
    ) -> Result<RunningSession, SessionError> {
        let session = self.build_session(mode, settings, rng).await?;
        Ok(RunningSession::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::ExamSettingsDraft;
    use quiz_core::time::fixed_clock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;
    use storage::repository::InMemoryRepository;

    use crate::sessions::plan::WorkingSet;
    use crate::sessions::test_support::build_questions;

    fn service(questions: usize) -> ExamLoopService {
        let repo = InMemoryRepository::with_questions(build_questions(questions));
        ExamLoopService::new(fixed_clock(), QuestionBank::new(Arc::new(repo)))
    }

    fn timed_session(duration_secs: u32) -> ExamSession {
        let settings = ExamSettingsDraft {
            test_duration_secs: duration_secs,
            ..ExamSettingsDraft::default()
        }
        .validate()
        .unwrap();
        let set = WorkingSet::new(ExamMode::Test { count: 2 }, build_questions(2));
        ExamSession::new(set, &settings, fixed_clock()).unwrap()
    }

    #[tokio::test]
    async fn empty_catalogue_is_not_ready() {
        let svc = service(0);
        let mut rng = StdRng::seed_from_u64(1);
        let err = svc
            .start_session(ExamMode::Practice, &ExamSettings::default(), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotReady));
    }

    #[tokio::test]
    async fn zero_count_test_is_empty() {
        let svc = service(5);
        let mut rng = StdRng::seed_from_u64(1);
        let err = svc
            .start_session(ExamMode::Test { count: 0 }, &ExamSettings::default(), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[tokio::test]
    async fn test_session_draws_configured_count() {
        let svc = service(300);
        let settings = ExamSettings::default();
        let mut rng = StdRng::seed_from_u64(9);
        let running = svc
            .start_session(ExamLoopService::test_mode(&settings), &settings, &mut rng)
            .await
            .unwrap();
        assert_eq!(running.session().total(), 33);
        assert!(running.view().is_some());
    }

    #[tokio::test]
    async fn small_catalogue_test_reports_drawn_count() {
        let svc = service(20);
        let settings = ExamSettings::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut running = svc
            .start_session(ExamLoopService::test_mode(&settings), &settings, &mut rng)
            .await
            .unwrap();
        assert_eq!(running.session().mode(), ExamMode::Test { count: 20 });

        let Transition::Finished(result) = running.apply(SessionAction::Finish) else {
            panic!("expected finish");
        };
        assert_eq!(result.total(), 20);
        assert_eq!(result.mode().title(), "Test 20");
    }

    #[tokio::test]
    async fn practice_session_has_idle_countdown() {
        let svc = service(4);
        let mut rng = StdRng::seed_from_u64(1);
        let mut running = svc
            .start_session(ExamMode::Practice, &ExamSettings::default(), &mut rng)
            .await
            .unwrap();
        let tick = tokio::time::timeout(Duration::from_millis(10), running.next_tick()).await;
        assert!(tick.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expires_session() {
        let mut running = RunningSession::new(timed_session(2));

        assert!(matches!(
            running.next_tick().await,
            TickOutcome::Ticked { remaining_secs: 1, .. }
        ));
        assert!(matches!(
            running.next_tick().await,
            TickOutcome::Ticked { remaining_secs: 0, .. }
        ));
        let TickOutcome::Expired(result) = running.next_tick().await else {
            panic!("expected expiry");
        };
        assert_eq!(result.elapsed_secs(), 2);
        assert!(running.is_finished());

        let after = tokio::time::timeout(Duration::from_secs(5), running.next_tick()).await;
        assert!(after.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_by_action_silences_countdown() {
        let mut running = RunningSession::new(timed_session(60));
        assert!(matches!(
            running.apply(SessionAction::Finish),
            Transition::Finished(_)
        ));
        let after = tokio::time::timeout(Duration::from_secs(5), running.next_tick()).await;
        assert!(after.is_err());
        assert_eq!(running.apply(SessionAction::Advance), Transition::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_routes_actions() {
        let mut running = RunningSession::new(timed_session(60));
        let answered = running.apply(SessionAction::Select(AnswerId::new("a")));
        assert_eq!(
            answered,
            Transition::Answered {
                correct: true,
                scored: true
            }
        );
        assert_eq!(running.apply(SessionAction::Back), Transition::Ignored);
        assert_eq!(
            running.apply(SessionAction::Advance),
            Transition::Moved { index: 1 }
        );
        assert_eq!(
            running.apply(SessionAction::ToggleTranslation),
            Transition::TranslationToggled { showing: true }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn host_replaces_and_stops_sessions() {
        let mut host = SessionHost::new();
        let first = RunningSession::new(timed_session(60));
        let first_id = first.session().id();
        host.start(first);

        let second = RunningSession::new(timed_session(60));
        let second_id = second.session().id();
        host.start(second);
        assert_ne!(first_id, second_id);
        assert_eq!(host.current().unwrap().session().id(), second_id);

        host.current_mut()
            .unwrap()
            .apply(SessionAction::Select(AnswerId::new("a")));
        host.stop();
        assert!(host.current().is_none());
    }
}
