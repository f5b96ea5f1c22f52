//! Rugby Sim entry point
//!
//! Loads rosters and tuning, then either prints an instant result or paces a
//! stepped match to completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use rugby_sim::sim::{MatchEvent, Score};
use rugby_sim::{MatchConfig, MatchState, Result, Team, quick_result};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Match tuning JSON, stock values for anything missing
    #[arg(long)]
    config: Option<PathBuf>,
    /// Home roster JSON
    #[arg(long)]
    home: Option<PathBuf>,
    /// Away roster JSON
    #[arg(long)]
    away: Option<PathBuf>,
    /// Print the statistical result without simulating
    #[arg(long)]
    instant: bool,
    /// Skip to the end after this many steps
    #[arg(long)]
    skip_after: Option<u32>,
    /// Sleep one step interval between steps
    #[arg(long)]
    realtime: bool,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn load_team(path: Option<&Path>, fallback: &str) -> Result<Team> {
    match path {
        Some(path) => {
            let team = Team::from_json(&std::fs::read_to_string(path)?)?;
            log::info!(
                "Loaded {} ({} players, average skill {:.1}) from {}",
                team.name,
                team.len(),
                team.average_skill(),
                path.display()
            );
            if team.is_empty() {
                log::warn!("{} has no players", team.name);
            }
            Ok(team)
        }
        None => Ok(Team::balanced(fallback)),
    }
}

fn describe(event: &MatchEvent) -> Option<String> {
    let line = match event {
        MatchEvent::Try { side, scorer } => format!("TRY {} ({scorer})", side.as_str()),
        MatchEvent::Conversion { kicker, success, .. } => {
            format!("Conversion by {kicker} {}", if *success { "good" } else { "missed" })
        }
        MatchEvent::PenaltyGoal { side, kicker } => {
            format!("Penalty goal {} ({kicker})", side.as_str())
        }
        MatchEvent::Interception { player, .. } => format!("Intercepted by {player}"),
        _ => return None,
    };
    Some(line)
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    let home = load_team(cli.home.as_deref(), "Home XV")?;
    let away = load_team(cli.away.as_deref(), "Away XV")?;
    let seed = cli.seed.unwrap_or_else(rand::random);

    if cli.instant {
        let score = quick_result(&home, &away, &config, seed);
        println!("{} {} - {} {}", home.name, score.home, score.away, away.name);
        return Ok(());
    }

    let interval = Duration::from_millis(config.clock.step_interval_ms);
    let mut state = MatchState::new(Arc::new(home), Arc::new(away), config, seed)?;
    state.on_finish(|score: Score| log::info!("Final whistle delivered: {score}"));

    while !state.is_finished() {
        if cli.skip_after.is_some_and(|n| state.clock().step >= n) {
            state.skip();
            break;
        }
        state.step();
        for record in state.drain_events() {
            if let Some(line) = describe(&record.event) {
                log::info!("{}' {line}", state.minute());
            }
        }
        if cli.realtime {
            std::thread::sleep(interval);
        }
    }
    state.drain_events();

    let score = state.acknowledge().unwrap_or_else(|| state.score());
    if cli.json {
        println!("{}", state.snapshot().to_json()?);
    } else {
        let home = state.team(rugby_sim::Side::Home);
        let away = state.team(rugby_sim::Side::Away);
        let suffix = if state.was_skipped() { " (skipped)" } else { "" };
        println!("{} {} - {} {}{suffix}", home.name, score.home, score.away, away.name);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rugby Sim starting...");

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
