mod engine;
mod idle;

pub use engine::{format_remaining, Mode, TimerEngine};
pub use idle::IdleTracker;
