//! # studysprint core library
//!
//! Business logic for a single-user focus-sprint timer: a sprint, then a
//! break, then a short reflection (rating + note) that is logged. The CLI is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based countdown; remaining time is always
//!   derived from the phase end time, never decremented
//! - **Controller**: sequences sprint → break → reflection, owns the idle
//!   tracker and the single repeating tick handle
//! - **Storage**: session history as a JSON blob in SQLite, TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerController`]: command entry point
//! - [`TimerEngine`]: countdown state machine
//! - [`SessionStore`]: session persistence, streak and statistics
//! - [`Config`]: application configuration management

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod storage;
pub mod ticker;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Command, Stage, TimerController};
pub use error::{ConfigError, CoreError, DatabaseError, DeserializationError, ValidationError};
pub use events::Event;
pub use storage::{
    Config, Database, PersistedState, Rating, Session, SessionStore, Statistics, TimerOverrides,
    TimerSettings,
};
pub use ticker::{ManualScheduler, TickScheduler, TokioTicker};
pub use timer::{format_remaining, IdleTracker, Mode, TimerEngine};
