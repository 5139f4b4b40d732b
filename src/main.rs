//! Fortune Wheel entry point
//!
//! Headless runner: loads settings, then lets the demo player work through
//! a few rounds while the log shows what the engine is doing.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use fortune_wheel::autoplay::play_round;
#[cfg(not(target_arch = "wasm32"))]
use fortune_wheel::{GameSession, Settings};

/// Safety net for a demo player that never finishes a round
#[cfg(not(target_arch = "wasm32"))]
const MAX_MOVES_PER_ROUND: u32 = 1000;

/// Play Fortune Wheel rounds with the demo player
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Settings JSON file (defaults are used when absent or unreadable)
    settings: Option<PathBuf>,
    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,
    /// Override the number of rounds to play
    #[arg(long)]
    rounds: Option<u32>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Args {
    fn settings(&self) -> Settings {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path).unwrap_or_else(|e| {
                log::warn!("Failed to load settings: {}, using defaults", e);
                Settings::default()
            }),
            None => Settings::default(),
        };
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(rounds) = self.rounds {
            settings.rounds = rounds;
        }
        settings
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Fortune Wheel (native) starting...");

    let args = Args::parse();
    let mut session = match GameSession::from_settings(args.settings()) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to start session: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Seed: {}", session.seed());
    println!(
        "{} phrases in: {}",
        session.selector().len(),
        session.selector().categories().join(", ")
    );

    let rounds = session.settings().rounds.max(1);
    for round in 1..=rounds {
        if round > 1 && session.next_round().is_none() {
            log::warn!("Phrase database exhausted after {} rounds", round - 1);
            break;
        }

        let summary = match play_round(&mut session, MAX_MOVES_PER_ROUND) {
            Ok(summary) => summary,
            Err(e) => {
                log::error!("Round {} aborted: {} ({})", round, e, e.code());
                return ExitCode::FAILURE;
            }
        };

        println!(
            "Round {}: [{}] {} - {} in {} spins, score {}",
            round,
            summary.category,
            summary.phrase,
            if summary.won { "solved" } else { "unsolved" },
            summary.spins,
            summary.score
        );
    }

    println!("Final score: {}", session.machine().score());
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is the product on wasm
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_settings() {
        let argv = ["fortune-wheel", "--seed", "7", "--rounds", "5"];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.settings, None);
        let settings = args.settings();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.rounds, 5);
    }

    #[test]
    fn test_unreadable_settings_fall_back_to_defaults() {
        let argv = ["fortune-wheel", "/definitely/not/here.json"];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(
            args.settings,
            Some(PathBuf::from("/definitely/not/here.json"))
        );
        assert_eq!(args.settings(), Settings::default());
    }
}
