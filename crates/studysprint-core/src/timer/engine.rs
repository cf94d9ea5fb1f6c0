//! Countdown engine for a single phase.
//!
//! The engine is a wall-clock-based state machine. It owns no thread and no
//! ticker: every operation takes the current time in epoch milliseconds and
//! the caller decides how often to `tick()`.
//!
//! Remaining time is always derived from the phase's absolute end time, so a
//! late or skipped tick never causes drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> PhaseComplete -> stopped
//! ```

use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Which phase the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Idle,
    Sprint,
    Break,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Sprint => "sprint",
            Mode::Break => "break",
        }
    }
}

/// Core countdown engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: Mode,
    phase_duration_ms: u64,
    /// Absolute end of the phase. Only `Some` while counting down.
    end_epoch_ms: Option<u64>,
    remaining_ms: u64,
    paused: bool,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            phase_duration_ms: 0,
            end_epoch_ms: None,
            remaining_ms: 0,
            paused: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase_duration_ms(&self) -> u64 {
        self.phase_duration_ms
    }

    pub fn end_epoch_ms(&self) -> Option<u64> {
        self.end_epoch_ms
    }

    /// Cached remaining time as of the last operation.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Counting down right now (not idle, not paused, not stopped).
    pub fn is_running(&self) -> bool {
        self.end_epoch_ms.is_some()
    }

    /// Remaining time at `now_ms` without mutating the engine.
    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match self.end_epoch_ms {
            Some(end) => end.saturating_sub(now_ms).min(self.remaining_ms),
            None => self.remaining_ms,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new phase, discarding whatever was running before.
    pub fn start(&mut self, mode: Mode, duration_ms: u64, now_ms: u64) -> Event {
        self.stop();
        self.mode = mode;
        self.phase_duration_ms = duration_ms;
        self.remaining_ms = duration_ms;
        self.paused = false;
        if mode != Mode::Idle {
            self.end_epoch_ms = Some(now_ms.saturating_add(duration_ms));
        }
        Event::PhaseStarted { mode, duration_ms }
    }

    pub fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if self.mode == Mode::Idle || self.paused {
            return None;
        }
        let end = self.end_epoch_ms.take()?;
        self.remaining_ms = end.saturating_sub(now_ms).min(self.remaining_ms);
        self.paused = true;
        Some(Event::Paused {
            remaining_ms: self.remaining_ms,
        })
    }

    pub fn resume(&mut self, now_ms: u64) -> Option<Event> {
        if self.mode == Mode::Idle || !self.paused || self.remaining_ms == 0 {
            return None;
        }
        self.paused = false;
        self.end_epoch_ms = Some(now_ms.saturating_add(self.remaining_ms));
        Some(Event::Resumed {
            remaining_ms: self.remaining_ms,
        })
    }

    /// Halt the countdown. The mode is kept so the caller can sequence the
    /// next phase; use [`TimerEngine::reset`] to go back to idle.
    pub fn stop(&mut self) {
        self.end_epoch_ms = None;
        self.remaining_ms = 0;
        self.paused = false;
    }

    pub fn reset(&mut self) {
        self.stop();
        self.mode = Mode::Idle;
        self.phase_duration_ms = 0;
    }

    /// Call periodically while running.
    ///
    /// Returns `PhaseComplete` once the end time has passed (and stops the
    /// engine), otherwise a `Tick` with the recomputed remaining time.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let end = self.end_epoch_ms?;
        // Clamp so a wall clock stepping backwards cannot add time back.
        self.remaining_ms = end.saturating_sub(now_ms).min(self.remaining_ms);
        if self.remaining_ms == 0 {
            let mode = self.mode;
            self.stop();
            return Some(Event::PhaseComplete { mode });
        }
        Some(Event::Tick {
            mode: self.mode,
            remaining_ms: self.remaining_ms,
        })
    }
}

/// `MM:SS`, rounded down to whole seconds.
pub fn format_remaining(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
