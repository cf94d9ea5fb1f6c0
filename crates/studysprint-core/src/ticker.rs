//! Repeating tick sources.
//!
//! A scheduler hands out one handle per running phase. Dropping the handle
//! cancels the ticks, so whoever owns the handle owns the ticker: replacing
//! it in `start` releases the previous one.
//!
//! Every tick carries the generation it was scheduled with. A tick that was
//! already queued when its handle was dropped still arrives, and the
//! controller discards it by comparing generations.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub trait TickScheduler {
    /// Cancels the ticks when dropped.
    type Handle;

    fn schedule(&mut self, period: Duration, generation: u64) -> Self::Handle;
}

/// Ticks delivered over an mpsc channel from a tokio interval task.
#[derive(Debug, Clone)]
pub struct TokioTicker {
    runtime: Handle,
    tx: mpsc::UnboundedSender<u64>,
}

impl TokioTicker {
    /// Returns the scheduler and the receiver the event loop should poll.
    pub fn new(runtime: Handle) -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { runtime, tx }, rx)
    }
}

#[derive(Debug)]
pub struct TickHandle {
    task: JoinHandle<()>,
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TickScheduler for TokioTicker {
    type Handle = TickHandle;

    fn schedule(&mut self, period: Duration, generation: u64) -> TickHandle {
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(generation).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(generation, period_ms = period.as_millis() as u64, "ticker scheduled");
        TickHandle { task }
    }
}

/// Scheduler that never fires on its own. Tests deliver ticks by hand and
/// use the counters to check that no handle leaks.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    active: Rc<Cell<usize>>,
    scheduled: Rc<Cell<usize>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles currently alive.
    pub fn active_handles(&self) -> usize {
        self.active.get()
    }

    /// Handles ever created.
    pub fn total_scheduled(&self) -> usize {
        self.scheduled.get()
    }
}

#[derive(Debug)]
pub struct ManualHandle {
    active: Rc<Cell<usize>>,
    pub generation: u64,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.active.set(self.active.get() - 1);
    }
}

impl TickScheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule(&mut self, _period: Duration, generation: u64) -> ManualHandle {
        self.active.set(self.active.get() + 1);
        self.scheduled.set(self.scheduled.get() + 1);
        ManualHandle {
            active: Rc::clone(&self.active),
            generation,
        }
    }
}
