use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use web_time::Instant;

/// Source of "now" for session timing.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    base: Instant,
    offset_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::Relaxed))
    }
}

/// Elapsed play time: now minus start minus time spent paused.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GameTimer {
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl GameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none() && self.paused_at.is_none()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    pub fn start_at(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Freezes the timer for good.
    pub fn stop_at(&mut self, now: Instant) {
        if self.started_at.is_none() || self.stopped_at.is_some() {
            return;
        }
        self.resume_at(now);
        self.stopped_at = Some(now);
    }

    pub fn pause_at(&mut self, now: Instant) {
        if self.is_running() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume_at(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let end = self.stopped_at.or(self.paused_at).unwrap_or(now);
        end.saturating_duration_since(started_at)
            .saturating_sub(self.paused_total)
    }
}

/// `MM:SS`, or `H:MM:SS` from one hour on.
pub fn format_elapsed(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_excludes_pauses_and_freezes_on_stop() {
        let clock = ManualClock::new();
        let mut timer = GameTimer::new();
        assert_eq!(timer.elapsed_at(clock.now()), Duration::ZERO);

        timer.start_at(clock.now());
        clock.advance(Duration::from_secs(10));
        timer.pause_at(clock.now());
        clock.advance(Duration::from_secs(30));
        assert_eq!(timer.elapsed_at(clock.now()), Duration::from_secs(10));

        timer.resume_at(clock.now());
        clock.advance(Duration::from_secs(5));
        assert_eq!(timer.elapsed_at(clock.now()), Duration::from_secs(15));

        timer.stop_at(clock.now());
        clock.advance(Duration::from_secs(100));
        assert_eq!(timer.elapsed_at(clock.now()), Duration::from_secs(15));
        assert!(timer.is_stopped());
    }

    #[test]
    fn stopping_while_paused_keeps_paused_time_out() {
        let clock = ManualClock::new();
        let mut timer = GameTimer::new();

        timer.start_at(clock.now());
        clock.advance(Duration::from_secs(3));
        timer.pause_at(clock.now());
        clock.advance(Duration::from_secs(7));
        timer.stop_at(clock.now());

        assert_eq!(timer.elapsed_at(clock.now()), Duration::from_secs(3));
    }

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3725), "1:02:05");
    }
}
