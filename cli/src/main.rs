use anyhow::Result;
use arcade_core::{GameId, Leaderboard, MAX_ENTRIES};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io;
use std::path::PathBuf;

mod menu;
mod play;
mod scores;
mod session;
mod settings;

use play::PlayOptions;
use session::{Console, Session};
use settings::Settings;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Settings file [default: arcade.toml when present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Leaderboard file [default: scores.json]
    #[arg(long, value_name = "FILE", env = "ARCADE_SCORES")]
    scores: Option<PathBuf>,

    /// Name to record scores under instead of asking
    #[arg(short, long, env = "ARCADE_PLAYER")]
    player: Option<String>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Pick games from a menu (the default)
    Menu,
    /// Play one game directly
    Play {
        game: GameId,
        #[command(flatten)]
        options: PlayOptions,
    },
    /// Show the best scores
    Leaderboard {
        /// Only this game
        game: Option<GameId>,
        #[arg(short, long, default_value_t = MAX_ENTRIES)]
        limit: usize,
    },
    /// List the games and their leaderboard keys
    Games,
}

fn games() -> String {
    GameId::ALL
        .iter()
        .map(|game| format!("{:<12} {}", game.key(), game.title()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(log_level) = args.verbose.log_level() {
        env_logger::Builder::new()
            .filter_level(log_level.to_level_filter())
            .init();
    }

    let settings = Settings::load(args.config.as_deref())?;
    let resolved = settings.resolve(args.player, args.scores);
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);
    log::debug!("scores: {}", resolved.scores.display());

    let console = Console::new(io::stdin().lock(), io::stdout());
    let leaderboard = Leaderboard::new(resolved.scores);
    let mut session = Session::new(console, settings, leaderboard, resolved.player, seed);

    match args.command.unwrap_or(Command::Menu) {
        Command::Menu => menu::run(&mut session),
        Command::Play { game, options } => play::play(&mut session, game, &options),
        Command::Leaderboard { game, limit } => scores::show(&mut session, game, limit),
        Command::Games => session.write_line(games()),
    }
}
