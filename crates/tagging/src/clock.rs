//! Match clock: wall-clock anchors plus the coarse display clock.
//!
//! Every duration is derived from recorded instants (`session_start_ms`,
//! `pause_start_ms`, `total_paused_ms`) so a pause/resume cycle never gains
//! or loses time, no matter how irregularly the one-second tick arrives.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of wall-clock time, injectable so pause arithmetic can be tested
/// without real waits.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 { chrono::Utc::now().timestamp_millis() }
}

/// Hand-driven clock. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(start_ms: i64) -> Self { Self(Arc::new(AtomicI64::new(start_ms))) }

    pub fn set(&self, ms: i64) { self.0.store(ms, Ordering::SeqCst); }

    pub fn advance_ms(&self, ms: i64) { self.0.fetch_add(ms, Ordering::SeqCst); }

    pub fn advance_secs(&self, secs: i64) { self.advance_ms(secs * 1000); }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 { self.0.load(Ordering::SeqCst) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockState {
    /// Display clock for the current period, whole seconds.
    pub elapsed_seconds: u32,
    pub session_start_ms: Option<i64>,
    pub total_paused_ms: i64,
    /// Set while the clock is stopped (paused, halftime, finished).
    pub pause_start_ms: Option<i64>,
}

impl ClockState {
    pub fn is_started(&self) -> bool { self.session_start_ms.is_some() }

    pub fn is_running(&self) -> bool { self.is_started() && self.pause_start_ms.is_none() }

    pub fn started(self, now: i64) -> Self {
        Self { session_start_ms: Some(now), total_paused_ms: 0, pause_start_ms: None, ..self }
    }

    /// Stopping an already stopped clock keeps the original pause instant.
    pub fn paused(self, now: i64) -> Self {
        if !self.is_running() { return self; }
        Self { pause_start_ms: Some(now), ..self }
    }

    pub fn resumed(self, now: i64) -> Self {
        match self.pause_start_ms {
            Some(p) => Self {
                total_paused_ms: self.total_paused_ms + (now - p).max(0),
                pause_start_ms: None,
                ..self
            },
            None => self,
        }
    }

    pub fn ticked(self) -> Self {
        if !self.is_running() { return self; }
        Self { elapsed_seconds: self.elapsed_seconds.saturating_add(1), ..self }
    }

    pub fn adjusted(self, delta_seconds: i64) -> Self {
        let next = (self.elapsed_seconds as i64).saturating_add(delta_seconds).clamp(0, u32::MAX as i64);
        Self { elapsed_seconds: next as u32, ..self }
    }

    pub fn with_display(self, elapsed_seconds: u32) -> Self { Self { elapsed_seconds, ..self } }

    /// Absolute elapsed match time. Frozen at the pause instant while stopped.
    pub fn absolute_elapsed_ms(&self, now: i64) -> i64 {
        let Some(start) = self.session_start_ms else { return 0; };
        let reference = self.pause_start_ms.unwrap_or(now);
        (reference - start - self.total_paused_ms).max(0)
    }
}

/// `MM:SS`, minutes are not wrapped at 60.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Clock state bound to a time source.
pub struct ClockEngine {
    source: Arc<dyn Clock>,
    state: ClockState,
}

impl ClockEngine {
    pub fn new(source: Arc<dyn Clock>) -> Self { Self { source, state: ClockState::default() } }

    pub fn now_ms(&self) -> i64 { self.source.now_ms() }

    pub fn state(&self) -> ClockState { self.state }

    pub fn restore(&mut self, state: ClockState) { self.state = state; }

    pub fn start(&mut self) { self.state = self.state.started(self.now_ms()); }

    pub fn pause(&mut self) { self.state = self.state.paused(self.now_ms()); }

    pub fn resume(&mut self) { self.state = self.state.resumed(self.now_ms()); }

    pub fn tick(&mut self) { self.state = self.state.ticked(); }

    pub fn adjust(&mut self, delta_seconds: i64) { self.state = self.state.adjusted(delta_seconds); }

    pub fn reset_display(&mut self) { self.state = self.state.with_display(0); }

    pub fn is_running(&self) -> bool { self.state.is_running() }

    pub fn current_absolute_elapsed_ms(&self) -> i64 { self.state.absolute_elapsed_ms(self.now_ms()) }

    pub fn current_display_seconds(&self) -> u32 { self.state.elapsed_seconds }

    pub fn formatted(&self) -> String { format_clock(self.state.elapsed_seconds) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_at(ms: i64) -> (ManualClock, ClockEngine) {
        let clock = ManualClock::new(ms);
        let engine = ClockEngine::new(Arc::new(clock.clone()));
        (clock, engine)
    }

    #[test]
    fn not_started_reports_zero() {
        let (clock, engine) = engine_at(50_000);
        clock.advance_secs(30);
        assert_eq!(engine.current_absolute_elapsed_ms(), 0);
        assert!(!engine.is_running());
    }

    #[test]
    fn pause_freezes_absolute_time() {
        let (clock, mut engine) = engine_at(1_000);
        engine.start();
        clock.advance_ms(12_345);
        engine.pause();
        clock.advance_secs(600);
        assert_eq!(engine.current_absolute_elapsed_ms(), 12_345);
    }

    #[test]
    fn resume_does_not_catch_up_paused_time() {
        let (clock, mut engine) = engine_at(0);
        engine.start();
        clock.advance_secs(20);
        engine.pause();
        clock.advance_secs(90);
        engine.resume();
        assert_eq!(engine.current_absolute_elapsed_ms(), 20_000);
        clock.advance_secs(5);
        engine.pause();
        clock.advance_secs(7);
        engine.resume();
        assert_eq!(engine.current_absolute_elapsed_ms(), 25_000);
    }

    #[test]
    fn tick_only_counts_while_running() {
        let (_clock, mut engine) = engine_at(0);
        engine.tick();
        assert_eq!(engine.current_display_seconds(), 0);
        engine.start();
        engine.tick();
        engine.tick();
        engine.pause();
        engine.tick();
        assert_eq!(engine.current_display_seconds(), 2);
    }

    #[test]
    fn second_pause_keeps_first_instant() {
        let state = ClockState::default().started(0).paused(4_000).paused(9_000);
        assert_eq!(state.pause_start_ms, Some(4_000));
    }

    #[test]
    fn adjust_is_floored_at_zero() {
        let state = ClockState::default().with_display(3).adjusted(-10);
        assert_eq!(state.elapsed_seconds, 0);
        assert_eq!(state.adjusted(75).elapsed_seconds, 75);
    }

    #[test]
    fn extreme_adjustments_saturate() {
        let state = ClockState::default().with_display(5);
        assert_eq!(state.adjusted(i64::MAX).elapsed_seconds, u32::MAX);
        assert_eq!(state.adjusted(i64::MIN).elapsed_seconds, 0);
        assert_eq!(state.with_display(u32::MAX).adjusted(1).elapsed_seconds, u32::MAX);
    }

    #[test]
    fn formats_minutes_past_the_hour() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3_725), "62:05");
    }
}
