use chime_core::SqliteHistory;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's completed focus sessions
    Today,
    /// All-time completed focus sessions
    All,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let stats = runtime.block_on(async { SqliteHistory::open()?.stats().await })?;

    let summary = match action {
        StatsAction::Today => serde_json::json!({
            "sessions": stats.today_sessions,
            "focus_min": stats.today_focus_min,
        }),
        StatsAction::All => serde_json::to_value(&stats)?,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
