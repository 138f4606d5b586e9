//! Headless driver for the quizmines engine: lists profiles, auto-plays
//! seeded games and replays their event logs.

use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use clap::{Parser, Subcommand, ValueEnum};
use quizmines_core::{
    EndReason, PlayerIdentity, SafeZone, SessionSummary, TurnPolicy, format_elapsed, replay,
};

use crate::config::ProfilesFile;
use crate::history::{EventLog, HistoryFile};
use crate::simulate::Simulation;
use crate::trivia::{Contestant, QuestionBank};

mod autoplay;
mod config;
mod history;
mod simulate;
mod trivia;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the built-in profiles, and those of a file, as TOML
    Profiles {
        /// Extra `[[profile]]` tables to validate and list
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Auto-play seeded games
    Simulate(SimulateArgs),
    /// Recompute standings from an event log written by `simulate --events`
    Replay {
        /// JSON-lines event log
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    /// Built-in tier or a profile name from --profiles
    #[arg(short, long, default_value = "easy")]
    difficulty: String,

    /// TOML file with extra profiles
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Seed of the first game, later games count up from it; random if unset
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u32,

    /// Player names, one for a solo game or two for a duel
    #[arg(short, long = "player", value_name = "NAME")]
    players: Vec<String>,

    #[arg(long, value_enum, default_value_t = PolicyArg::EveryAction)]
    turn_policy: PolicyArg,

    #[arg(long, value_enum, default_value_t = ZoneArg::Neighborhood)]
    safe_zone: ZoneArg,

    /// TOML trivia bank with `[[question]]` tables
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Probability that a question is answered correctly
    #[arg(long, default_value_t = 0.75)]
    accuracy: f64,

    /// Probability that a question is deferred instead of answered
    #[arg(long, default_value_t = 0.0)]
    defer_rate: f64,

    /// Append session summaries to this JSON-lines file
    #[arg(long)]
    history: Option<PathBuf>,

    /// Append event logs to this JSON-lines file
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    EveryAction,
    ContinueOnCascade,
}

impl From<PolicyArg> for TurnPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::EveryAction => Self::EveryAction,
            PolicyArg::ContinueOnCascade => Self::ContinueOnCascade,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ZoneArg {
    Cell,
    Neighborhood,
}

impl From<ZoneArg> for SafeZone {
    fn from(arg: ZoneArg) -> Self {
        match arg {
            ZoneArg::Cell => Self::Cell,
            ZoneArg::Neighborhood => Self::Neighborhood,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Profiles { file } => profiles(file),
        Command::Simulate(args) => simulate(args),
        Command::Replay { path } => replay_events(path),
    }
}

fn profiles(file: Option<PathBuf>) -> Result<()> {
    let mut listed = config::builtin_profiles();
    if let Some(path) = file {
        let extra = ProfilesFile::load(&path)?;
        extra.validate(SafeZone::default())?;
        log::debug!("Loaded {} profiles from {}", extra.profiles.len(), path.display());
        listed.profiles.extend(extra.profiles);
    }
    print!("{}", listed.to_toml()?);
    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<()> {
    ensure!(args.games > 0, "Nothing to play, --games must be at least 1");
    ensure!(
        (0.0..=1.0).contains(&args.defer_rate),
        "Defer rate must be between 0 and 1, got {}",
        args.defer_rate
    );

    let players: Vec<PlayerIdentity> = match args.players.len() {
        0 => vec![PlayerIdentity::new("player")],
        1 | 2 => args.players.into_iter().map(PlayerIdentity::new).collect(),
        count => bail!("A game seats one or two players, got {count}"),
    };
    let safe_zone = SafeZone::from(args.safe_zone);
    let profile_file = args.profiles.as_deref().map(ProfilesFile::load).transpose()?;
    if let Some(file) = &profile_file {
        file.validate(safe_zone)?;
    }
    let profile = config::find_profile(&args.difficulty, profile_file.as_ref())?;
    let mut bank = match &args.questions {
        Some(path) => QuestionBank::load(path)?,
        None => QuestionBank::builtin()?,
    };
    log::debug!("Question bank holds {} questions", bank.len());

    let simulation = Simulation {
        profile,
        players,
        turn_policy: args.turn_policy.into(),
        safe_zone,
        contestant: Contestant::new(args.accuracy)?,
        defer_rate: args.defer_rate,
    };
    let mut history = args.history.as_ref().map(HistoryFile::new);
    let mut archived: Vec<SessionSummary> = Vec::new();
    let first_seed = args.seed.unwrap_or_else(rand::random);
    let mut wins = 0;

    for game in 0..args.games {
        let seed = first_seed.wrapping_add(game.into());
        let record = match &mut history {
            Some(file) => {
                file.set_seed(seed);
                simulation.play(seed, &mut bank, file)?
            }
            None => simulation.play(seed, &mut bank, &mut archived)?,
        };
        if record.summary.end_reason == EndReason::Won {
            wins += 1;
        }
        println!("game {} seed {}: {}", game + 1, seed, describe(&record.summary));
        log::debug!("Feedback for seed {seed}: {:?}", record.feedback);

        if let Some(file) = &mut history {
            file.flush()?;
        }
        if let Some(path) = &args.events {
            history::append_lines(path, &[record.events])
                .with_context(|| format!("Could not save event log to {}", path.display()))?;
        }
    }

    if args.games > 1 {
        println!("won {} of {} games", wins, args.games);
    }
    if history.is_some() {
        log::info!("Recorded {} sessions", args.games);
    }
    Ok(())
}

fn replay_events(path: PathBuf) -> Result<()> {
    let logs: Vec<EventLog> = history::read_lines(&path)?;
    for entry in &logs {
        let standings = replay(&entry.profile, entry.players, &entry.events);
        println!(
            "seed {} ({}, {} events)",
            entry.seed,
            entry.profile.name,
            entry.events.len()
        );
        for (index, stats) in standings.iter().enumerate() {
            println!(
                "  player {}: score {} lives {}/{}",
                index + 1,
                stats.score,
                stats.lives,
                stats.lives_cap
            );
        }
    }
    Ok(())
}

fn describe(summary: &SessionSummary) -> String {
    let outcome = match summary.end_reason {
        EndReason::Won => "won",
        EndReason::LostNoLives => "out of lives",
        EndReason::GaveUp => "gave up",
    };
    let winner = match summary.winner {
        Some(slot) => summary
            .players
            .get(slot.index())
            .map_or("?", |player| player.identity.name.as_str()),
        None => "nobody",
    };
    let standings: Vec<String> = summary
        .players
        .iter()
        .map(|player| {
            format!(
                "{} {} pts {}/{} lives",
                player.identity.name, player.score, player.lives, player.lives_cap
            )
        })
        .collect();
    format!(
        "{} on {} after {} turns in {}, winner {} [{}]",
        outcome,
        summary.difficulty,
        summary.turns,
        format_elapsed(summary.elapsed_secs),
        winner,
        standings.join(", ")
    )
}
