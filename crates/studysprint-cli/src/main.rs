use clap::{Args, Parser, Subcommand};
use studysprint_core::TimerOverrides;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studysprint", version, about = "Focus sprints with breaks and reflections")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    timer: TimerArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Startup overrides; they never touch the config file.
#[derive(Args, Debug, Clone, Copy)]
struct TimerArgs {
    /// Sprint length in minutes (fractions allowed)
    #[arg(long, global = true, env = "STUDYSPRINT_SPRINT_MINUTES")]
    sprint_minutes: Option<f64>,
    /// Break length in minutes (fractions allowed)
    #[arg(long, global = true, env = "STUDYSPRINT_BREAK_MINUTES")]
    break_minutes: Option<f64>,
    /// Inactivity before the "stuck?" hint, in milliseconds
    #[arg(long, global = true, env = "STUDYSPRINT_IDLE_THRESHOLD_MS")]
    idle_threshold_ms: Option<u64>,
}

impl From<TimerArgs> for TimerOverrides {
    fn from(args: TimerArgs) -> Self {
        TimerOverrides {
            sprint_minutes: args.sprint_minutes,
            break_minutes: args.break_minutes,
            idle_threshold_ms: args.idle_threshold_ms,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run sprints interactively
    Run(commands::run::RunArgs),
    /// Session statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Recorded sessions as JSON
    Sessions {
        /// Only the most recent N sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.timer.into()),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Sessions { limit } => commands::stats::sessions(limit),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
