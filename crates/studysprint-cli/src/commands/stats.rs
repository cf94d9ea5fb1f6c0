use studysprint_core::{Clock, Database, SessionStore, Statistics, SystemClock};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::new(Database::open()?);
    let stats = store.compute_statistics(SystemClock.today());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(&stats);
    }
    Ok(())
}

pub fn sessions(limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::new(Database::open()?);
    let sessions = store.load().sessions;
    let skip = limit.map_or(0, |n| sessions.len().saturating_sub(n));
    println!("{}", serde_json::to_string_pretty(&sessions[skip..])?);
    Ok(())
}

pub fn print_summary(stats: &Statistics) {
    println!("Today:   {}", stats.today_sessions);
    println!("Streak:  {}", stats.streak_display());
    println!("Total:   {}", stats.total_sessions);
    println!("Average: {}", stats.average_rating_display());
}
