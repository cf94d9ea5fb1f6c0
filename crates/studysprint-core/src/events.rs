use serde::{Deserialize, Serialize};

use crate::storage::Statistics;
use crate::timer::Mode;

/// Every state change in the controller produces an Event.
/// The presentation layer renders them; it holds no timer state of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PhaseStarted {
        mode: Mode,
        duration_ms: u64,
    },
    Tick {
        mode: Mode,
        remaining_ms: u64,
    },
    PhaseComplete {
        mode: Mode,
    },
    Paused {
        remaining_ms: u64,
    },
    Resumed {
        remaining_ms: u64,
    },
    IdleHintShown,
    IdleHintCleared,
    /// The cycle finished (or was cut short) and a rating is wanted.
    ReflectionRequested {
        goal: String,
    },
    SessionRecorded {
        statistics: Statistics,
    },
    ReturnedHome,
}

impl Event {
    /// Short machine name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PhaseStarted { .. } => "phase_started",
            Event::Tick { .. } => "tick",
            Event::PhaseComplete { .. } => "phase_complete",
            Event::Paused { .. } => "paused",
            Event::Resumed { .. } => "resumed",
            Event::IdleHintShown => "idle_hint_shown",
            Event::IdleHintCleared => "idle_hint_cleared",
            Event::ReflectionRequested { .. } => "reflection_requested",
            Event::SessionRecorded { .. } => "session_recorded",
            Event::ReturnedHome => "returned_home",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_kind() {
        let events = [
            Event::Tick {
                mode: Mode::Sprint,
                remaining_ms: 1_000,
            },
            Event::IdleHintShown,
            Event::ReflectionRequested {
                goal: "essay".into(),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.kind());
        }
    }

    #[test]
    fn tick_serializes_mode_lowercase() {
        let json = serde_json::to_string(&Event::PhaseComplete { mode: Mode::Break }).unwrap();
        assert_eq!(json, r#"{"type":"phase_complete","mode":"break"}"#);
    }
}
