//! Idle-hint hysteresis.
//!
//! The hint is raised at most once per idle episode. An episode ends on the
//! next user interaction (or when the phase stops).

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleTracker {
    threshold_ms: u64,
    last_interaction_ms: u64,
    hint_shown: bool,
}

impl IdleTracker {
    pub fn new(threshold_ms: u64, now_ms: u64) -> Self {
        Self {
            threshold_ms,
            last_interaction_ms: now_ms,
            hint_shown: false,
        }
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    pub fn last_interaction_ms(&self) -> u64 {
        self.last_interaction_ms
    }

    pub fn hint_shown(&self) -> bool {
        self.hint_shown
    }

    /// Record user input. Returns `true` if a visible hint was dismissed.
    pub fn record_interaction(&mut self, now_ms: u64) -> bool {
        self.last_interaction_ms = now_ms;
        std::mem::replace(&mut self.hint_shown, false)
    }

    /// Drop the hint without touching the interaction time.
    /// Returns `true` if a visible hint was dismissed.
    pub fn clear(&mut self) -> bool {
        std::mem::replace(&mut self.hint_shown, false)
    }

    /// Returns `true` exactly when the hint should appear now.
    pub fn evaluate(&mut self, now_ms: u64) -> bool {
        if self.hint_shown {
            return false;
        }
        if now_ms.saturating_sub(self.last_interaction_ms) >= self.threshold_ms {
            self.hint_shown = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_episode() {
        let mut idle = IdleTracker::new(12_000, 0);
        assert!(!idle.evaluate(11_999));
        assert!(idle.evaluate(12_000));
        assert!(!idle.evaluate(30_000));
        assert!(!idle.evaluate(90_000));
    }

    #[test]
    fn interaction_starts_new_episode() {
        let mut idle = IdleTracker::new(1_000, 0);
        assert!(idle.evaluate(1_000));
        assert!(idle.record_interaction(1_500));
        assert!(!idle.hint_shown());
        assert!(!idle.evaluate(2_000));
        assert!(idle.evaluate(2_500));
    }

    #[test]
    fn interaction_without_hint_reports_nothing_to_clear() {
        let mut idle = IdleTracker::new(1_000, 0);
        assert!(!idle.record_interaction(200));
        assert_eq!(idle.last_interaction_ms(), 200);
    }

    #[test]
    fn clear_keeps_interaction_time() {
        let mut idle = IdleTracker::new(1_000, 0);
        idle.evaluate(5_000);
        assert!(idle.clear());
        assert!(!idle.clear());
        // Still idle since t=0, so the next evaluation re-raises it.
        assert!(idle.evaluate(5_001));
    }
}
