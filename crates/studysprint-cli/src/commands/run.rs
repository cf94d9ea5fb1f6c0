//! Interactive sprint loop.
//!
//! Ticks and typed lines are serialised through one `select!` on a
//! current-thread runtime, so the controller is never touched concurrently.

use std::io::Write;

use clap::Args;
use studysprint_core::{
    format_remaining, Clock, Command, Config, CoreError, Database, Event, SessionStore,
    SystemClock, TimerController, TimerOverrides, TimerSettings, TokioTicker,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

use super::stats::print_summary;

#[derive(Args)]
pub struct RunArgs {
    /// Print one JSON event per line instead of text
    #[arg(long)]
    json: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Stats,
    Help,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word {
        "start" => Command::StartSprint {
            goal: rest.to_string(),
        },
        "skip-goal" => Command::SkipGoal,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "end" => Command::EndSprintEarly,
        "skip-break" => Command::SkipBreak,
        "home" => Command::ReturnHome,
        "save" => parse_save(rest),
        "stats" => return Input::Stats,
        "help" | "?" => return Input::Help,
        "quit" | "exit" => return Input::Quit,
        other => return Input::Unknown(other.to_string()),
    };
    Input::Command(command)
}

/// `save <rating> [note…]`. Without an integer first word the whole rest is
/// the note and the rating is missing. Out-of-range integers are kept so the
/// range check can report them.
fn parse_save(rest: &str) -> Command {
    let (first, tail) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => (first, tail.trim()),
        None => (rest, ""),
    };
    match first.parse::<i64>() {
        Ok(rating) => Command::RecordReflection {
            rating: Some(rating),
            note: tail.to_string(),
        },
        Err(_) => Command::RecordReflection {
            rating: None,
            note: rest.to_string(),
        },
    }
}

pub fn run(args: RunArgs, overrides: TimerOverrides) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    config.apply_overrides(overrides)?;
    let settings = config.timer_settings();
    let store = SessionStore::new(Database::open()?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(event_loop(settings, &store, Renderer::new(args.json)));
    // The stdin reader sits in a blocking read that cannot be cancelled.
    runtime.shutdown_background();
    result
}

async fn event_loop(
    settings: TimerSettings,
    store: &SessionStore,
    mut out: Renderer,
) -> Result<(), Box<dyn std::error::Error>> {
    let (ticker, mut ticks) = TokioTicker::new(Handle::current());
    let mut controller = TimerController::new(SystemClock, ticker, settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    out.banner(&settings);

    loop {
        tokio::select! {
            Some(generation) = ticks.recv() => {
                out.events(&controller.on_tick(generation), &settings);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                out.events(&controller.user_interaction(), &settings);
                match parse_line(&line) {
                    Input::Command(command) => match controller.dispatch(command, store) {
                        Ok(events) => out.events(&events, &settings),
                        Err(CoreError::Validation(e)) => out.error(&e.to_string()),
                        Err(e) => return Err(e.into()),
                    },
                    Input::Stats => out.stats(store),
                    Input::Help => out.help(),
                    Input::Quit => break,
                    Input::Unknown(word) => out.error(&format!("unknown command: {word} (try 'help')")),
                }
            }
        }
    }
    out.finish();
    Ok(())
}

struct Renderer {
    json: bool,
    /// A `\r` countdown line is on screen without a trailing newline.
    mid_line: bool,
}

impl Renderer {
    fn new(json: bool) -> Self {
        Self {
            json,
            mid_line: false,
        }
    }

    fn line(&mut self, text: &str) {
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
        println!("{text}");
    }

    fn banner(&mut self, settings: &TimerSettings) {
        if self.json {
            return;
        }
        self.line(&format!(
            "studysprint: {} sprint, {} break. Type 'help' for commands.",
            format_remaining(settings.sprint_ms),
            format_remaining(settings.break_ms)
        ));
    }

    fn help(&mut self) {
        if self.json {
            return;
        }
        for text in [
            "start [goal]     start a sprint",
            "skip-goal        start a sprint without a goal",
            "pause / resume   pause or resume the countdown",
            "end              end the sprint now and reflect",
            "skip-break       skip the break and reflect",
            "save <n> [note]  save the reflection with rating n",
            "home             abandon and go back to setup",
            "stats            show statistics",
            "quit             leave",
        ] {
            self.line(text);
        }
    }

    fn error(&mut self, message: &str) {
        if self.json {
            let value = serde_json::json!({ "type": "error", "message": message });
            self.line(&value.to_string());
        } else {
            self.line(&format!("error: {message}"));
        }
    }

    fn stats(&mut self, store: &SessionStore) {
        let stats = store.compute_statistics(SystemClock.today());
        if self.json {
            let value = serde_json::json!({ "type": "statistics", "statistics": stats });
            self.line(&value.to_string());
        } else {
            if self.mid_line {
                println!();
                self.mid_line = false;
            }
            print_summary(&stats);
        }
    }

    fn events(&mut self, events: &[Event], settings: &TimerSettings) {
        for event in events {
            if self.json {
                match serde_json::to_string(event) {
                    Ok(json) => self.line(&json),
                    Err(e) => tracing::warn!(error = %e, "could not encode event"),
                }
            } else {
                self.text(event, settings);
            }
        }
    }

    fn text(&mut self, event: &Event, settings: &TimerSettings) {
        match event {
            Event::PhaseStarted { mode, duration_ms } => {
                self.line(&format!("{} started ({})", mode.label(), format_remaining(*duration_ms)));
            }
            Event::Tick { mode, remaining_ms } => {
                print!("\r{} {}", mode.label(), format_remaining(*remaining_ms));
                let _ = std::io::stdout().flush();
                self.mid_line = true;
            }
            Event::PhaseComplete { mode } => self.line(&format!("{} complete", mode.label())),
            Event::Paused { remaining_ms } => {
                self.line(&format!("paused at {}", format_remaining(*remaining_ms)));
            }
            Event::Resumed { remaining_ms } => {
                self.line(&format!("resumed at {}", format_remaining(*remaining_ms)));
            }
            Event::IdleHintShown => self.line("Stuck? Type anything to carry on."),
            Event::IdleHintCleared => {}
            Event::ReflectionRequested { goal } => {
                self.line(&format!(
                    "How did \"{goal}\" go? save <1-{}> [note]",
                    settings.rating_scale
                ));
            }
            Event::SessionRecorded { statistics } => {
                self.line("Sprint saved!");
                print_summary(statistics);
            }
            Event::ReturnedHome => self.line("back to setup"),
        }
    }

    fn finish(&mut self) {
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
    }
}
