//! Integration tests for the sprint cycle driven through the controller.

use std::time::Duration;

use chrono::NaiveDate;
use proptest::prelude::*;
use studysprint_core::{
    Database, Event, ManualClock, ManualScheduler, Mode, SessionStore, Stage, TimerController,
    TimerEngine, TimerSettings,
};

fn settings() -> TimerSettings {
    TimerSettings {
        sprint_ms: 25 * 60_000,
        break_ms: 5 * 60_000,
        idle_threshold_ms: 12_000,
        tick_interval: Duration::from_secs(1),
        rating_scale: 5,
    }
}

fn controller() -> (
    TimerController<ManualClock, ManualScheduler>,
    ManualClock,
    ManualScheduler,
) {
    let clock = ManualClock::new(1_700_000_000_000, NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
    let scheduler = ManualScheduler::new();
    let controller = TimerController::new(clock.clone(), scheduler.clone(), settings());
    (controller, clock, scheduler)
}

/// Tick once per second until `pred` matches an event or `limit` ticks pass.
fn run_until(
    controller: &mut TimerController<ManualClock, ManualScheduler>,
    clock: &ManualClock,
    limit: usize,
    pred: impl Fn(&Event) -> bool,
) -> Vec<Event> {
    let mut seen = Vec::new();
    for _ in 0..limit {
        clock.advance(1_000);
        let generation = controller.generation();
        let events = controller.on_tick(generation);
        let done = events.iter().any(&pred);
        seen.extend(events);
        if done {
            break;
        }
    }
    seen
}

#[test]
fn test_full_cycle_records_one_session() {
    let (mut controller, clock, scheduler) = controller();
    let store = SessionStore::new(Database::open_memory().unwrap());

    controller.start_sprint("Chapter 4 problems");
    let sprint = run_until(&mut controller, &clock, 2_000, |e| {
        matches!(e, Event::PhaseComplete { mode: Mode::Sprint })
    });
    let ticks = sprint
        .iter()
        .filter(|e| matches!(e, Event::Tick { .. }))
        .count();
    assert_eq!(ticks, 25 * 60 - 1);
    assert_eq!(controller.stage(), Stage::Break);
    // The user never touched anything, so the hint fired exactly once.
    assert_eq!(
        sprint.iter().filter(|e| **e == Event::IdleHintShown).count(),
        1
    );

    let brk = run_until(&mut controller, &clock, 2_000, |e| {
        matches!(e, Event::ReflectionRequested { .. })
    });
    assert!(brk.contains(&Event::PhaseComplete { mode: Mode::Break }));
    assert!(!brk.contains(&Event::IdleHintShown));
    assert_eq!(scheduler.active_handles(), 0);

    controller.record_reflection(&store, Some(5), "solid").unwrap();
    let state = store.load();
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.sessions[0].goal, "Chapter 4 problems");
    assert_eq!(state.streak, 1);
}

#[test]
fn test_start_cancels_previous_phase() {
    let (mut controller, clock, scheduler) = controller();
    controller.start_sprint("first");
    let stale = controller.generation();
    clock.advance(60_000);
    controller.start_sprint("second");

    // A tick queued by the first ticker arrives after the restart.
    clock.advance(25 * 60_000);
    assert!(controller.on_tick(stale).is_empty());

    let generation = controller.generation();
    let events = controller.on_tick(generation);
    let completions = events
        .iter()
        .filter(|e| matches!(e, Event::PhaseComplete { .. }))
        .count();
    assert_eq!(completions, 1);
    assert_eq!(scheduler.active_handles(), 1);
    assert_eq!(controller.stage(), Stage::Break);
}

#[test]
fn test_delayed_ticks_do_not_drift() {
    let (mut controller, clock, _) = controller();
    controller.start_sprint("");
    controller.user_interaction();
    // Ticks arrive late and irregularly; remaining time follows the clock.
    for delay in [1_300, 2_700, 900, 5_000] {
        clock.advance(delay);
    }
    let generation = controller.generation();
    assert_eq!(
        controller.on_tick(generation),
        vec![Event::Tick {
            mode: Mode::Sprint,
            remaining_ms: 25 * 60_000 - 9_900
        }]
    );
}

#[derive(Debug, Clone)]
enum Op {
    Wait(u64),
    Pause,
    Resume,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..120_000).prop_map(Op::Wait),
        Just(Op::Pause),
        Just(Op::Resume),
    ]
}

proptest! {
    #[test]
    fn remaining_never_increases_while_running_and_freezes_while_paused(
        ops in proptest::collection::vec(op(), 1..60)
    ) {
        let mut engine = TimerEngine::new();
        let mut now = 0u64;
        engine.start(Mode::Sprint, 25 * 60_000, now);
        let mut last = engine.remaining_ms();

        for op in ops {
            match op {
                Op::Wait(ms) => {
                    now += ms;
                    let was_paused = engine.is_paused();
                    engine.tick(now);
                    if was_paused {
                        prop_assert_eq!(engine.remaining_ms(), last);
                    } else {
                        prop_assert!(engine.remaining_ms() <= last);
                    }
                }
                Op::Pause => {
                    engine.pause(now);
                    prop_assert!(engine.remaining_ms() <= last);
                }
                Op::Resume => {
                    engine.resume(now);
                    prop_assert_eq!(engine.remaining_ms(), last);
                }
            }
            last = engine.remaining_ms();
        }
    }
}
