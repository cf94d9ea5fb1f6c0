//! Sprint → break → reflection sequencing.
//!
//! [`TimerController`] owns the countdown engine, the idle tracker and the
//! single live tick handle. All commands run synchronously on one thread and
//! return the events they produced, in order.
//!
//! ```text
//! Setup --start_sprint--> Sprint --complete--> Break --complete--> Reflection
//!                           |                    |                     |
//!                           +--end_sprint_early--+--skip_break---------+
//!                                                                      |
//! Setup <--------------------- record_reflection / return_home --------+
//! ```

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::storage::{Rating, SessionStore, TimerSettings, DEFAULT_GOAL};
use crate::ticker::TickScheduler;
use crate::timer::{IdleTracker, Mode, TimerEngine};

/// Where the user is in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Setup,
    Sprint,
    Break,
    Reflection,
}

/// Everything the presentation layer can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartSprint { goal: String },
    SkipGoal,
    Pause,
    Resume,
    EndSprintEarly,
    SkipBreak,
    RecordReflection { rating: Option<i64>, note: String },
    ReturnHome,
    UserInteraction,
}

pub struct TimerController<C: Clock, S: TickScheduler> {
    clock: C,
    scheduler: S,
    settings: TimerSettings,
    engine: TimerEngine,
    idle: IdleTracker,
    stage: Stage,
    goal: String,
    ticker: Option<S::Handle>,
    generation: u64,
}

impl<C: Clock, S: TickScheduler> TimerController<C, S> {
    pub fn new(clock: C, scheduler: S, settings: TimerSettings) -> Self {
        let idle = IdleTracker::new(settings.idle_threshold_ms, clock.now_ms());
        Self {
            clock,
            scheduler,
            settings,
            engine: TimerEngine::new(),
            idle,
            stage: Stage::Setup,
            goal: String::new(),
            ticker: None,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn idle_hint_shown(&self) -> bool {
        self.idle.hint_shown()
    }

    /// Generation of the live tick handle; ticks carrying any other value
    /// are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Remaining time right now, without advancing anything.
    pub fn remaining_ms(&self) -> u64 {
        self.engine.remaining_at(self.clock.now_ms())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Route a [`Command`] to its handler.
    ///
    /// # Errors
    /// Only `RecordReflection` can fail, see [`Self::record_reflection`].
    pub fn dispatch(
        &mut self,
        command: Command,
        store: &SessionStore,
    ) -> Result<Vec<Event>, CoreError> {
        let events = match command {
            Command::StartSprint { goal } => self.start_sprint(&goal),
            Command::SkipGoal => self.skip_goal(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::EndSprintEarly => self.end_sprint_early(),
            Command::SkipBreak => self.skip_break(),
            Command::RecordReflection { rating, note } => {
                return self.record_reflection(store, rating, &note)
            }
            Command::ReturnHome => self.return_home(),
            Command::UserInteraction => self.user_interaction(),
        };
        Ok(events)
    }

    pub fn start_sprint(&mut self, goal: &str) -> Vec<Event> {
        let goal = goal.trim();
        self.goal = if goal.is_empty() {
            DEFAULT_GOAL.to_string()
        } else {
            goal.to_string()
        };
        self.stage = Stage::Sprint;
        let mut events = Vec::new();
        self.clear_idle_hint(&mut events);
        events.push(self.start_phase(Mode::Sprint, self.settings.sprint_ms));
        events
    }

    pub fn skip_goal(&mut self) -> Vec<Event> {
        self.start_sprint("")
    }

    pub fn pause(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        match self.engine.pause(now) {
            Some(event) => {
                self.ticker = None;
                vec![event]
            }
            None => Vec::new(),
        }
    }

    pub fn resume(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        match self.engine.resume(now) {
            Some(event) => {
                self.arm_ticker();
                vec![event]
            }
            None => Vec::new(),
        }
    }

    /// Cut the sprint short. Counts exactly like a completed cycle.
    pub fn end_sprint_early(&mut self) -> Vec<Event> {
        if self.stage != Stage::Sprint {
            return Vec::new();
        }
        tracing::debug!(remaining_ms = self.remaining_ms(), "sprint ended early");
        let mut events = Vec::new();
        self.stop(&mut events);
        self.request_reflection(&mut events);
        events
    }

    pub fn skip_break(&mut self) -> Vec<Event> {
        if self.stage != Stage::Break {
            return Vec::new();
        }
        tracing::debug!(remaining_ms = self.remaining_ms(), "break skipped");
        let mut events = Vec::new();
        self.stop(&mut events);
        self.request_reflection(&mut events);
        events
    }

    /// Save the pending reflection and go back to setup.
    ///
    /// # Errors
    /// Validation errors (no pending reflection, missing or out-of-range
    /// rating) leave the store untouched. Write failures are passed through.
    pub fn record_reflection(
        &mut self,
        store: &SessionStore,
        rating: Option<i64>,
        note: &str,
    ) -> Result<Vec<Event>, CoreError> {
        if self.stage != Stage::Reflection {
            return Err(ValidationError::NoReflectionPending.into());
        }
        let rating = Rating::new(rating, self.settings.rating_scale)?;
        let today = self.clock.today();
        store.record_session(rating, note, &self.goal, today)?;
        self.stage = Stage::Setup;
        Ok(vec![Event::SessionRecorded {
            statistics: store.compute_statistics(today),
        }])
    }

    /// Abandon whatever is going on and go back to setup. Nothing is recorded.
    pub fn return_home(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.stop(&mut events);
        self.engine.reset();
        self.stage = Stage::Setup;
        events.push(Event::ReturnedHome);
        events
    }

    pub fn user_interaction(&mut self) -> Vec<Event> {
        if self.idle.record_interaction(self.clock.now_ms()) {
            vec![Event::IdleHintCleared]
        } else {
            Vec::new()
        }
    }

    /// Handle one tick from the scheduler.
    ///
    /// Ticks from a handle that has since been replaced or dropped are
    /// ignored.
    pub fn on_tick(&mut self, generation: u64) -> Vec<Event> {
        if self.ticker.is_none() || generation != self.generation {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        match self.engine.tick(now) {
            Some(Event::PhaseComplete { mode }) => {
                events.push(Event::PhaseComplete { mode });
                self.complete_phase(mode, &mut events);
            }
            Some(event) => {
                events.push(event);
                if self.engine.mode() == Mode::Sprint && self.idle.evaluate(now) {
                    events.push(Event::IdleHintShown);
                }
            }
            None => {}
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_phase(&mut self, mode: Mode, duration_ms: u64) -> Event {
        // Release the previous handle before a new one exists.
        self.ticker = None;
        let event = self.engine.start(mode, duration_ms, self.clock.now_ms());
        self.arm_ticker();
        tracing::debug!(mode = mode.label(), duration_ms, "phase started");
        event
    }

    fn arm_ticker(&mut self) {
        self.ticker = None;
        self.generation += 1;
        self.ticker = Some(
            self.scheduler
                .schedule(self.settings.tick_interval, self.generation),
        );
    }

    fn complete_phase(&mut self, mode: Mode, events: &mut Vec<Event>) {
        self.stop(events);
        match mode {
            Mode::Sprint => {
                self.stage = Stage::Break;
                events.push(self.start_phase(Mode::Break, self.settings.break_ms));
            }
            Mode::Break => self.request_reflection(events),
            Mode::Idle => {}
        }
    }

    fn stop(&mut self, events: &mut Vec<Event>) {
        self.ticker = None;
        self.engine.stop();
        self.clear_idle_hint(events);
    }

    fn clear_idle_hint(&mut self, events: &mut Vec<Event>) {
        if self.idle.clear() {
            events.push(Event::IdleHintCleared);
        }
    }

    fn request_reflection(&mut self, events: &mut Vec<Event>) {
        self.engine.reset();
        self.stage = Stage::Reflection;
        tracing::debug!(goal = %self.goal, "reflection requested");
        events.push(Event::ReflectionRequested {
            goal: self.goal.clone(),
        });
    }
}
