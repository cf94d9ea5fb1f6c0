//! Consecutive-day streak accounting.
//!
//! The streak only ever compares the stored `last_use_date` with the date of
//! the session being appended. It is never rebuilt from history.

use chrono::{Duration, NaiveDate};

use super::PersistedState;

/// `true` when `current` falls in (0, 1.5 days] after `previous`.
///
/// The half-day slack absorbs timezone and DST skew between stored dates.
pub fn is_following_day(previous: NaiveDate, current: NaiveDate) -> bool {
    let diff = current.signed_duration_since(previous);
    diff > Duration::zero() && diff <= Duration::hours(36)
}

/// Apply one recorded session on `today` to the streak counters.
pub fn update_streak(state: &mut PersistedState, today: NaiveDate) {
    match state.last_use_date {
        None => {
            state.streak = 1;
            state.last_use_date = Some(today);
        }
        Some(last) if last == today => {}
        Some(last) if is_following_day(last, today) => {
            state.streak = state.streak.saturating_add(1);
            state.last_use_date = Some(today);
        }
        Some(_) => {
            state.streak = 1;
            state.last_use_date = Some(today);
        }
    }
}
