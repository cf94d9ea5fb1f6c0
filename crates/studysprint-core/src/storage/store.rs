//! Session history and derived statistics.
//!
//! The whole history lives in one JSON blob under [`STATE_KEY`]. Every read
//! loads it fully; every `record_session` is a read-modify-write of the
//! complete blob.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::streak::update_streak;
use super::{Database, PersistedState, Rating, Session, DEFAULT_GOAL};
use crate::error::{CoreError, DatabaseError, DeserializationError};

/// Key the blob is stored under.
pub const STATE_KEY: &str = "studySprintData";

/// Shown instead of an average when nothing has been recorded.
pub const AVERAGE_PLACEHOLDER: &str = "–";

/// Streak length from which the flame marker is shown.
const HOT_STREAK: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Statistics {
    pub today_sessions: usize,
    pub total_sessions: usize,
    pub streak: u32,
    /// `None` when there are no sessions.
    pub average_rating: Option<f64>,
}

impl Statistics {
    /// Mean rating with one decimal, or [`AVERAGE_PLACEHOLDER`].
    pub fn average_rating_display(&self) -> String {
        match self.average_rating {
            Some(avg) => format!("{avg:.1}"),
            None => AVERAGE_PLACEHOLDER.to_string(),
        }
    }

    pub fn streak_display(&self) -> String {
        if self.streak >= HOT_STREAK {
            format!("{} 🔥", self.streak)
        } else {
            self.streak.to_string()
        }
    }
}

pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Decode the stored blob. `Ok(default)` when nothing is stored yet.
    ///
    /// # Errors
    /// `CoreError::Database` when the row cannot be read,
    /// `CoreError::Deserialization` when the blob is not valid state.
    pub fn try_load(&self) -> Result<PersistedState, CoreError> {
        match self.db.kv_get(STATE_KEY)? {
            Some(raw) => Ok(decode(&raw)?),
            None => Ok(PersistedState::default()),
        }
    }

    /// Load the persisted state. Missing or corrupt data yields the empty
    /// state; this never fails.
    pub fn load(&self) -> PersistedState {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable session data");
            PersistedState::default()
        })
    }

    /// State to build the next write on. A corrupt blob is replaced, but a
    /// failed read is an error so the history is never overwritten blind.
    fn load_for_update(&self) -> Result<PersistedState, DatabaseError> {
        let Some(raw) = self.db.kv_get(STATE_KEY)? else {
            return Ok(PersistedState::default());
        };
        Ok(decode(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "replacing unreadable session data");
            PersistedState::default()
        }))
    }

    /// Overwrite the stored blob with `state`.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn save(&self, state: &PersistedState) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(state)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        self.db.kv_set(STATE_KEY, &json)
    }

    /// Append a session for `today`, update the streak and persist.
    ///
    /// An empty goal is stored as [`DEFAULT_GOAL`].
    ///
    /// # Errors
    /// Returns an error if the stored state cannot be read or the updated
    /// state cannot be written. Nothing is written when the read fails.
    pub fn record_session(
        &self,
        rating: Rating,
        note: &str,
        goal: &str,
        today: NaiveDate,
    ) -> Result<PersistedState, DatabaseError> {
        let mut state = self.load_for_update()?;
        let goal = goal.trim();
        state.sessions.push(Session {
            date: today,
            goal: if goal.is_empty() {
                DEFAULT_GOAL.to_string()
            } else {
                goal.to_string()
            },
            rating: rating.value(),
            note: note.trim().to_string(),
        });
        update_streak(&mut state, today);
        self.save(&state)?;
        tracing::debug!(
            total = state.sessions.len(),
            streak = state.streak,
            "session recorded"
        );
        Ok(state)
    }

    /// Recomputed from the full history on every call.
    pub fn compute_statistics(&self, today: NaiveDate) -> Statistics {
        statistics_for(&self.load(), today)
    }
}

fn decode(raw: &str) -> Result<PersistedState, DeserializationError> {
    Ok(serde_json::from_str(raw)?)
}

fn statistics_for(state: &PersistedState, today: NaiveDate) -> Statistics {
    let today_sessions = state.sessions.iter().filter(|s| s.date == today).count();
    let total_sessions = state.sessions.len();
    let average_rating = if total_sessions == 0 {
        None
    } else {
        let sum: u64 = state.sessions.iter().map(|s| u64::from(s.rating)).sum();
        Some(sum as f64 / total_sessions as f64)
    };
    Statistics {
        today_sessions,
        total_sessions,
        streak: state.streak,
        average_rating,
    }
}
