//! Time sources.
//!
//! The controller never reads the system clock directly so tests can drive
//! it with a [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Local, NaiveDate};

pub trait Clock {
    /// Wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Today's local calendar date.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
    today: Rc<Cell<NaiveDate>>,
}

impl ManualClock {
    pub fn new(now_ms: u64, today: NaiveDate) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(now_ms)),
            today: Rc::new(Cell::new(today)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set_now(&self, ms: u64) {
        self.now_ms.set(ms);
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.today.set(today);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}
