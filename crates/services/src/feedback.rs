//! Fire-and-forget cues for sound and haptics.

/// Moments the presentation layer may want to celebrate or lament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    Correct,
    Wrong,
    Passed,
    Failed,
}

/// Receives cues from a running session.
///
/// Implementations must return promptly; sessions never wait on playback.
pub trait FeedbackSink: Send + Sync {
    fn cue(&self, cue: FeedbackCue);
}

/// Sink that drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn cue(&self, _cue: FeedbackCue) {}
}
