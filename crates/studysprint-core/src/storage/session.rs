use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Goal recorded when the user starts a sprint without naming one.
pub const DEFAULT_GOAL: &str = "(no specific goal)";

/// A validated reflection rating in `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    /// # Errors
    /// `RatingRequired` for `None`, `RatingOutOfRange` outside `1..=max`.
    pub fn new(value: Option<i64>, max: u8) -> Result<Self, ValidationError> {
        let value = value.ok_or(ValidationError::RatingRequired)?;
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=max).contains(v))
            .map(Self)
            .ok_or(ValidationError::RatingOutOfRange { value, max })
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// One finished sprint/break cycle, written when the reflection is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub date: NaiveDate,
    #[serde(default = "default_goal")]
    pub goal: String,
    pub rating: u8,
    #[serde(default)]
    pub note: String,
}

fn default_goal() -> String {
    DEFAULT_GOAL.to_string()
}

/// Everything that survives a restart.
///
/// Field names follow the stored JSON (`lastUseDate`) so older blobs stay
/// readable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub last_use_date: Option<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
}
