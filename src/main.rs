//! Merge Grid demo
//!
//! Plays a seeded game headlessly, then replays the recorded directions
//! and checks the final state hash matches.
//!
//! Usage: `merge-grid [config.json]`. The seed comes from `MERGE_GRID_SEED`
//! (a number, or any label to hash); log level from `RUST_LOG`.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use merge_grid::{
    GRID_SIZE, TICK_RATE, VERSION,
    core::rng::derive_seed,
    game::{
        config::GameConfig,
        events::GameEventData,
        input::Direction,
        sequencer::{replay_game, Game},
        terminal::legal_directions,
    },
};

/// Preference order for the autoplayer: keep tiles packed in the bottom-left.
const PREFERENCE: [Direction; 4] = [Direction::Down, Direction::Left, Direction::Right, Direction::Up];

/// Safety stop for the demo.
const MAX_TURNS: usize = 5000;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Merge Grid v{}", VERSION);
    info!("Grid: {}x{}, default tick rate: {} Hz", GRID_SIZE, GRID_SIZE, TICK_RATE);

    let config = load_config()?;
    let seed = load_seed();

    demo_game(config, seed)
}

fn load_config() -> Result<GameConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            let config = GameConfig::from_json(&json)
                .with_context(|| format!("parsing config {path}"))?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        None => Ok(GameConfig::default()),
    }
}

fn load_seed() -> u64 {
    match std::env::var("MERGE_GRID_SEED") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| derive_seed(raw.as_bytes())),
        Err(_) => 12345,
    }
}

/// Autoplay a game, then verify determinism by replaying it.
fn demo_game(config: GameConfig, seed: u64) -> Result<()> {
    info!("=== Starting Demo Game ===");
    info!("RNG Seed: {}", seed);

    let mut game = Game::new(config.clone(), seed)?;
    game.take_events();

    let mut played = Vec::new();
    let mut total_events = 0;

    while played.len() < MAX_TURNS {
        if game.is_terminal() && !game.resume_after_win() {
            break;
        }

        let legal = legal_directions(game.board());
        let Some(direction) = PREFERENCE.into_iter().find(|d| legal[d.index()]) else {
            warn!("no legal direction on a live board");
            break;
        };

        let Some(report) = game.run_turn(direction) else {
            warn!(%direction, "direction refused");
            break;
        };
        played.push(direction);
        total_events += report.events.len();

        for event in &report.events {
            match &event.data {
                GameEventData::GameWon { score } => {
                    info!("Reached the winning tile at turn {} (score {})", played.len(), score);
                }
                GameEventData::GameOver { score, hi_score } => {
                    info!("Game over after {} turns: score {}, hi-score {}", played.len(), score, hi_score);
                }
                _ => {}
            }
        }

        if played.len() % 100 == 0 {
            info!("Turn {}: score {}, max tile {}", played.len(), game.score(), 1u64 << game.max_exp());
        }
    }

    // Print final results
    info!("=== Game Results ===");
    info!("\n{}", game.board());
    info!("Score: {}  Moves: {}  Tiles moved: {}", game.score(), game.moves(), game.tiles_moved());
    info!("Ticks: {}  Total events: {}", game.tick(), total_events);

    debug!("Snapshot: {}", serde_json::to_string(&game.snapshot())?);

    let hash = game.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay_game(config, seed, &played)?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("DETERMINISM FAILURE: Hashes differ!")
    }
}
