use std::future;
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Period of the exam countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Cancellable one-second ticker for timed sessions.
///
/// The first tick fires one period after `start`. Once cancelled, `tick`
/// never resolves, so a `tokio::select!` branch on it simply goes quiet.
#[derive(Debug)]
pub struct Countdown {
    interval: Option<Interval>,
}

impl Countdown {
    #[must_use]
    pub fn start() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval: Some(interval),
        }
    }

    /// A countdown that never ticks, for untimed sessions.
    #[must_use]
    pub fn idle() -> Self {
        Self { interval: None }
    }

    pub fn cancel(&mut self) {
        if self.interval.take().is_some() {
            tracing::debug!("countdown cancelled");
        }
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}
