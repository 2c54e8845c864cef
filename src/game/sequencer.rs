//! Turn Sequencer
//!
//! The tick-driven state machine that owns a game. One accepted direction
//! becomes one turn:
//!
//! ```text
//! Idle ─submit─▶ Slide1 ─settle─▶ Merge ─settle─▶ Slide2 ─settle─┬─▶ Spawn ─delay─▶ Evaluate
//!   ▲                                                            └──(nothing moved)──▶ Evaluate
//!   └──────────────────── Continue ◀── Evaluate ──▶ Terminal (Won / NoMoves)
//! ```
//!
//! Each phase runs its resolve pass once on entry, then waits, one
//! animation step per tick, until every cell is settled. Phases never
//! overlap. Input is only accepted in `Idle`.

use serde::{Serialize, Deserialize};
use tracing::debug;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::GRID_SIZE;
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::GridVec;
use crate::game::board::{Board, BoardSnapshot, SpawnedTile};
use crate::game::config::{ConfigError, GameConfig};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::Direction;
use crate::game::resolver::{resolve, Phase};
use crate::game::terminal::{self, Verdict};

// =============================================================================
// TURN RECORDS
// =============================================================================

/// What one turn did. Built up while the turn is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Direction captured when the turn started
    pub direction: Direction,
    /// Slide and merge steps across all three passes
    pub moved: u32,
    /// Merges initiated in the merge pass
    pub merges: u32,
    /// Points committed during this turn
    pub score_delta: u64,
    /// Tile placed after the turn, if it changed the board
    pub spawned: Option<SpawnedTile>,
}

impl TurnOutcome {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            moved: 0,
            merges: 0,
            score_delta: 0,
            spawned: None,
        }
    }

    /// Did any tile move or merge?
    #[inline]
    pub fn changed(&self) -> bool {
        self.moved > 0
    }
}

/// Why the game stopped accepting input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalReason {
    /// Winning tile reached; play may resume
    Won,
    /// Nothing can move
    NoMoves,
}

/// Sequencer state. Each in-flight phase carries the turn it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Awaiting a direction
    Idle,
    /// First slide pass, waiting for settle
    Slide1(TurnOutcome),
    /// Merge pass, waiting for settle (merges commit here)
    Merge(TurnOutcome),
    /// Second slide pass, waiting for settle
    Slide2(TurnOutcome),
    /// Pacing delay before the spawn
    Spawn {
        /// Turn in flight
        turn: TurnOutcome,
        /// Ticks left before the tile appears
        delay_ticks: u32,
    },
    /// Win/loss check on the next tick
    Evaluate(TurnOutcome),
    /// Input refused until `new_game` or `resume_after_win`
    Terminal(TerminalReason),
}

impl TurnPhase {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Slide1(_) => "slide1",
            TurnPhase::Merge(_) => "merge",
            TurnPhase::Slide2(_) => "slide2",
            TurnPhase::Spawn { .. } => "spawn",
            TurnPhase::Evaluate(_) => "evaluate",
            TurnPhase::Terminal(_) => "terminal",
        }
    }

    /// A turn is being animated or evaluated.
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, TurnPhase::Idle | TurnPhase::Terminal(_))
    }

    /// The turn in flight, if any.
    pub fn turn(&self) -> Option<&TurnOutcome> {
        match self {
            TurnPhase::Slide1(turn)
            | TurnPhase::Merge(turn)
            | TurnPhase::Slide2(turn)
            | TurnPhase::Spawn { turn, .. }
            | TurnPhase::Evaluate(turn) => Some(turn),
            TurnPhase::Idle | TurnPhase::Terminal(_) => None,
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            TurnPhase::Idle => 0,
            TurnPhase::Slide1(_) => 1,
            TurnPhase::Merge(_) => 2,
            TurnPhase::Slide2(_) => 3,
            TurnPhase::Spawn { .. } => 4,
            TurnPhase::Evaluate(_) => 5,
            TurnPhase::Terminal(TerminalReason::Won) => 6,
            TurnPhase::Terminal(TerminalReason::NoMoves) => 7,
        }
    }
}

/// Result of one or more ticks.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated
    pub events: Vec<GameEvent>,
    /// Turn that finished evaluation, if any
    pub completed: Option<TurnOutcome>,
    /// Game is in a terminal state after the tick
    pub terminal: bool,
}

impl TickResult {
    fn absorb(&mut self, other: TickResult) {
        self.events.extend(other.events);
        if other.completed.is_some() {
            self.completed = other.completed;
        }
        self.terminal = other.terminal;
    }
}

// =============================================================================
// GAME
// =============================================================================

/// Complete state of one game plus the process-lifetime hi-score.
///
/// The shell owns this value, feeds it directions and ticks, and reads it
/// for rendering. Nothing here is global.
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    board: Board,
    phase: TurnPhase,
    rng_seed: u64,
    rng: DeterministicRng,
    tick: u64,
    score: u64,
    hi_score: u64,
    won: bool,
    moves: u32,
    tiles_moved: u64,
    idle_ms: u64,
    last_outcome: Option<TurnOutcome>,
    pending_events: Vec<GameEvent>,
}

impl Game {
    /// Start a fresh game with starting tiles placed.
    pub fn new(config: GameConfig, rng_seed: u64) -> Result<Self, ConfigError> {
        let mut game = Self::from_board(config, rng_seed, Board::new())?;
        game.new_game();
        Ok(game)
    }

    /// Take over an existing settled position (puzzles, tests).
    ///
    /// A position already holding the winning tile counts as won; a dead
    /// position starts terminal.
    pub fn from_board(config: GameConfig, rng_seed: u64, board: Board) -> Result<Self, ConfigError> {
        config.validate()?;

        let won = terminal::has_won(&board, config.winning_exp);
        let phase = if terminal::is_game_over(&board) {
            TurnPhase::Terminal(TerminalReason::NoMoves)
        } else {
            TurnPhase::Idle
        };

        Ok(Self {
            config,
            board,
            phase,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            tick: 0,
            score: 0,
            hi_score: 0,
            won,
            moves: 0,
            tiles_moved: 0,
            idle_ms: 0,
            last_outcome: None,
            pending_events: Vec::new(),
        })
    }

    // =========================================================================
    // Shell entry points
    // =========================================================================

    /// Clear the board and place the starting tiles. Hi-score is kept.
    pub fn new_game(&mut self) {
        self.board.reset();
        self.phase = TurnPhase::Idle;
        self.score = 0;
        self.won = false;
        self.moves = 0;
        self.tiles_moved = 0;
        self.idle_ms = 0;
        self.last_outcome = None;

        let starting_tiles: Vec<SpawnedTile> = (0..self.config.starting_tiles)
            .filter_map(|_| self.board.spawn(&mut self.rng, &self.config.spawn))
            .collect();

        debug!(tiles = starting_tiles.len(), hi_score = self.hi_score, "new game");
        self.push_event(GameEvent::new_game(self.tick, starting_tiles));
    }

    /// Shell-level reset; same as [`Game::new_game`].
    pub fn reset(&mut self) {
        self.new_game();
    }

    /// Start a turn. Accepted only while idle; returns whether it was.
    pub fn submit_direction(&mut self, direction: Direction) -> bool {
        if self.phase != TurnPhase::Idle {
            debug!(%direction, phase = self.phase.name(), "input ignored");
            return false;
        }

        self.idle_ms = 0;
        self.board.clear_turn_flags();

        let mut turn = TurnOutcome::new(direction);
        turn.moved = resolve(&mut self.board, direction, Phase::Slide);

        debug!(%direction, tick = self.tick, "turn started");
        self.push_event(GameEvent::turn_started(self.tick, direction));
        self.phase = TurnPhase::Slide1(turn);
        true
    }

    /// Start a turn from a raw vector. Non-cardinal vectors are refused
    /// without touching the board.
    pub fn submit_vector(&mut self, vector: GridVec) -> bool {
        match Direction::from_vector(vector) {
            Ok(direction) => self.submit_direction(direction),
            Err(err) => {
                debug!(%err, "input rejected");
                false
            }
        }
    }

    /// Continue after a win without touching the board.
    ///
    /// Returns false unless the game is stopped on a win.
    pub fn resume_after_win(&mut self) -> bool {
        if self.phase != TurnPhase::Terminal(TerminalReason::Won) {
            return false;
        }

        self.idle_ms = 0;
        self.push_event(GameEvent::new(self.tick, GameEventData::Resumed));

        // A winning board can also be a dead one
        self.phase = if terminal::is_game_over(&self.board) {
            self.push_event(GameEvent::game_over(self.tick, self.score, self.hi_score));
            TurnPhase::Terminal(TerminalReason::NoMoves)
        } else {
            TurnPhase::Idle
        };
        debug!(phase = self.phase.name(), "resumed after win");
        true
    }

    /// Run one animation tick.
    ///
    /// While idle this only feeds the inactivity clock and counts down the
    /// cosmetic merge emphasis; tile values, positions, score and phase are
    /// untouched.
    pub fn advance(&mut self, elapsed_ms: u32) -> TickResult {
        let mut result = TickResult::default();

        self.tick += 1;
        self.board.decay_rewards();

        let phase = std::mem::replace(&mut self.phase, TurnPhase::Idle);
        #[cfg(feature = "debug-tracing")]
        let before = phase.name();

        self.phase = match phase {
            TurnPhase::Idle => {
                self.idle_ms = self.idle_ms.saturating_add(u64::from(elapsed_ms));
                TurnPhase::Idle
            }
            TurnPhase::Terminal(reason) => TurnPhase::Terminal(reason),
            TurnPhase::Slide1(mut turn) => {
                if self.settle_step(&mut turn) {
                    let merged = resolve(&mut self.board, turn.direction, Phase::Merge);
                    turn.moved += merged;
                    turn.merges += merged;
                    TurnPhase::Merge(turn)
                } else {
                    TurnPhase::Slide1(turn)
                }
            }
            TurnPhase::Merge(mut turn) => {
                if self.settle_step(&mut turn) {
                    turn.moved += resolve(&mut self.board, turn.direction, Phase::Slide);
                    TurnPhase::Slide2(turn)
                } else {
                    TurnPhase::Merge(turn)
                }
            }
            TurnPhase::Slide2(mut turn) => {
                if !self.settle_step(&mut turn) {
                    TurnPhase::Slide2(turn)
                } else if turn.changed() {
                    TurnPhase::Spawn {
                        turn,
                        delay_ticks: self.config.spawn_delay_ticks,
                    }
                } else {
                    TurnPhase::Evaluate(turn)
                }
            }
            TurnPhase::Spawn { turn, delay_ticks } if delay_ticks > 0 => TurnPhase::Spawn {
                turn,
                delay_ticks: delay_ticks - 1,
            },
            TurnPhase::Spawn { mut turn, .. } => {
                turn.spawned = self.board.spawn(&mut self.rng, &self.config.spawn);
                if let Some(tile) = turn.spawned {
                    self.push_event(GameEvent::tile_spawned(self.tick, tile));
                }
                TurnPhase::Evaluate(turn)
            }
            TurnPhase::Evaluate(turn) => self.finish_turn(turn, &mut result),
        };

        #[cfg(feature = "debug-tracing")]
        if before != self.phase.name() {
            trace!(tick = self.tick, from = before, to = self.phase.name(), "phase transition");
        }

        result.terminal = self.is_terminal();
        result.events = self.take_events();
        result
    }

    /// Submit a direction and tick until the turn is evaluated.
    ///
    /// Returns `None` if the direction was not accepted.
    pub fn run_turn(&mut self, direction: Direction) -> Option<TickResult> {
        if !self.submit_direction(direction) {
            return None;
        }

        let mut report = TickResult {
            events: self.take_events(),
            ..TickResult::default()
        };
        let tick_ms = self.config.tick_interval_ms();

        for _ in 0..self.max_turn_ticks() {
            report.absorb(self.advance(tick_ms));
            if report.completed.is_some() {
                break;
            }
        }
        debug_assert!(report.completed.is_some(), "turn exceeded its tick bound");
        Some(report)
    }

    /// Upper bound on ticks from acceptance to evaluation.
    pub fn max_turn_ticks(&self) -> u32 {
        3 * GRID_SIZE as u32 + self.config.spawn_delay_ticks + 3
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// One animation step; scores merges that commit. True once settled.
    fn settle_step(&mut self, turn: &mut TurnOutcome) -> bool {
        for commit in self.board.step_animation(self.config.reward_ticks) {
            let points = commit.points();
            self.score = self.score.saturating_add(points);
            self.hi_score = self.hi_score.max(self.score);
            turn.score_delta += points;
            self.push_event(GameEvent::merge_committed(self.tick, commit, self.score));
        }
        self.board.is_settled()
    }

    /// Record the turn and decide where the game goes next.
    fn finish_turn(&mut self, turn: TurnOutcome, result: &mut TickResult) -> TurnPhase {
        self.board.clear_turn_flags();

        if turn.changed() {
            self.moves += 1;
        }
        self.tiles_moved += u64::from(turn.moved);
        self.last_outcome = Some(turn);
        result.completed = Some(turn);
        self.push_event(GameEvent::turn_completed(self.tick, turn));

        match terminal::evaluate(&self.board, self.config.winning_exp, self.won) {
            Verdict::Won => {
                self.won = true;
                debug!(score = self.score, moves = self.moves, "game won");
                self.push_event(GameEvent::game_won(self.tick, self.score));
                TurnPhase::Terminal(TerminalReason::Won)
            }
            Verdict::GameOver => {
                debug!(score = self.score, hi_score = self.hi_score, "game over");
                self.push_event(GameEvent::game_over(self.tick, self.score, self.hi_score));
                TurnPhase::Terminal(TerminalReason::NoMoves)
            }
            Verdict::Continue => TurnPhase::Idle,
        }
    }

    fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    /// Board, for rendering. Must not be mutated between ticks.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Exponent and visual position of every cell.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// Current sequencer state.
    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    /// Configuration in effect.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// All animation has converged.
    pub fn is_settled(&self) -> bool {
        self.board.is_settled()
    }

    /// Waiting for input.
    pub fn is_idle(&self) -> bool {
        self.phase == TurnPhase::Idle
    }

    /// Stopped on a win or a dead board.
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, TurnPhase::Terminal(_))
    }

    /// Sticky: set on the first win, cleared only by `new_game`.
    pub fn has_won(&self) -> bool {
        self.won
    }

    /// Score of the current game.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Best score seen by this value, across games.
    pub fn hi_score(&self) -> u64 {
        self.hi_score
    }

    /// Turns that changed the board.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Total slide and merge steps this game.
    pub fn tiles_moved(&self) -> u64 {
        self.tiles_moved
    }

    /// Largest exponent on the board.
    pub fn max_exp(&self) -> u8 {
        self.board.max_exp()
    }

    /// Ticks advanced since creation.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seed this game's generator started from.
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Milliseconds spent idle since the last accepted input.
    pub fn idle_ms(&self) -> u64 {
        self.idle_ms
    }

    /// Idle longer than the configured timeout. Never true mid-turn.
    pub fn is_inactive(&self) -> bool {
        self.is_idle()
            && self
                .config
                .inactivity_timeout_ms
                .is_some_and(|timeout| self.idle_ms >= u64::from(timeout))
    }

    /// Most recently evaluated turn.
    pub fn last_outcome(&self) -> Option<&TurnOutcome> {
        self.last_outcome.as_ref()
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            self.board.hash_into(hasher);

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);

            hasher.update_u8(self.phase.discriminant());
            hasher.update_u64(self.score);
            hasher.update_u64(self.hi_score);
            hasher.update_bool(self.won);
            hasher.update_u32(self.moves);
            hasher.update_u64(self.tiles_moved);
        })
    }
}

/// Replay a game from a seed and the directions played.
///
/// Stops early on a dead board; resumes automatically after a win.
pub fn replay_game(
    config: GameConfig,
    rng_seed: u64,
    directions: &[Direction],
) -> Result<(Game, Vec<GameEvent>), ConfigError> {
    let mut game = Game::new(config, rng_seed)?;
    let mut all_events = game.take_events();

    for &direction in directions {
        if game.is_terminal() && !game.resume_after_win() {
            break;
        }
        if let Some(report) = game.run_turn(direction) {
            all_events.extend(report.events);
        }
    }

    Ok((game, all_events))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::MergeCommit;
    use proptest::prelude::*;

    type Rows = [[u8; GRID_SIZE]; GRID_SIZE];

    fn game_from(rows: Rows) -> Game {
        Game::from_board(GameConfig::default(), 12345, Board::from_exponents(rows)).unwrap()
    }

    fn occupied(game: &Game) -> usize {
        GRID_SIZE * GRID_SIZE - game.board().count_empty()
    }

    /// Resolver-only turn (no spawn), for predicting the pre-spawn board.
    fn expected_without_spawn(rows: Rows, direction: Direction) -> Board {
        let mut board = Board::from_exponents(rows);
        for phase in [Phase::Slide, Phase::Merge, Phase::Slide] {
            resolve(&mut board, direction, phase);
            while !board.is_settled() {
                board.step_animation(0);
            }
        }
        board
    }

    #[test]
    fn test_new_game_places_starting_tiles() {
        let mut game = Game::new(GameConfig::default(), 42).unwrap();

        assert!(game.is_idle());
        assert_eq!(occupied(&game), 2);
        assert_eq!(game.score(), 0);
        assert!(game.is_settled());

        let events = game.take_events();
        assert!(matches!(
            &events[0].data,
            GameEventData::NewGame { starting_tiles } if starting_tiles.len() == 2
        ));
        for cell in game.board().cells().filter(|c| !c.is_empty()) {
            assert!(cell.value_exp == 1 || cell.value_exp == 2);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig { tick_rate_hz: 0, ..GameConfig::default() };
        assert!(matches!(Game::new(config, 1), Err(ConfigError::TickRate)));
    }

    #[test]
    fn test_scenario_pair_merges_left() {
        let mut game = game_from([
            [1, 1, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);

        let report = game.run_turn(Direction::Left).unwrap();
        let outcome = report.completed.unwrap();

        assert_eq!(game.board().cell_at(0, 0).value_exp, 2);
        assert_eq!(game.score(), 4);
        assert_eq!(outcome.score_delta, 4);
        assert!(outcome.moved > 0);
        assert_eq!(outcome.merges, 1);

        let spawned = outcome.spawned.expect("changing turn spawns");
        assert_ne!((spawned.col, spawned.row), (0, 0));
        assert!(spawned.value_exp == 1 || spawned.value_exp == 2);
        assert_eq!(occupied(&game), 2);
        assert!(game.is_idle());
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_scenario_blocked_row_is_noop() {
        let mut game = game_from([
            [1, 2, 3, 4],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let before = game.board().clone();

        let outcome = game.run_turn(Direction::Left).unwrap().completed.unwrap();

        assert_eq!(outcome.moved, 0);
        assert_eq!(outcome.spawned, None);
        assert_eq!(game.board(), &before);
        assert_eq!(game.score(), 0);
        assert_eq!(game.moves(), 0);
        assert!(game.is_idle());
    }

    #[test]
    fn test_scenario_dead_board_is_terminal() {
        let mut game = game_from([
            [3, 4, 3, 4],
            [4, 3, 4, 3],
            [3, 4, 3, 4],
            [0, 5, 6, 5],
        ]);

        let report = game.run_turn(Direction::Left).unwrap();

        // Only slot left is (3, 3); neither spawn value pairs with 5 or 4
        assert!(report.terminal);
        assert!(game.is_terminal());
        assert!(!game.has_won());
        assert_eq!(game.phase(), &TurnPhase::Terminal(TerminalReason::NoMoves));
        assert!(report.events.iter().any(|e| matches!(e.data, GameEventData::GameOver { .. })));
        assert!(!game.submit_direction(Direction::Right));
        assert!(!game.resume_after_win());
    }

    #[test]
    fn test_dead_position_starts_terminal() {
        let game = game_from([
            [1, 2, 1, 2],
            [2, 1, 2, 1],
            [1, 2, 1, 2],
            [2, 1, 2, 1],
        ]);

        assert!(game.is_terminal());
        assert!(!game.has_won());
    }

    #[test]
    fn test_scenario_win_then_resume() {
        let mut game = game_from([
            [10, 10, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [1, 0, 0, 0],
        ]);
        assert!(!game.has_won());

        let report = game.run_turn(Direction::Left).unwrap();

        assert!(game.has_won());
        assert_eq!(game.phase(), &TurnPhase::Terminal(TerminalReason::Won));
        assert!(report.events.iter().any(|e| matches!(e.data, GameEventData::GameWon { .. })));
        assert_eq!(game.board().cell_at(0, 0).value_exp, 11);
        assert!(!game.submit_direction(Direction::Down));

        let board_before = game.board().clone();
        assert!(game.resume_after_win());
        assert!(game.is_idle());
        assert_eq!(game.board(), &board_before);
        assert!(game.has_won());

        // The 2048 tile is still there; no second win transition
        game.run_turn(Direction::Right).unwrap();
        assert!(!game.is_terminal());
        assert!(game.has_won());
        assert!(!game.resume_after_win());
    }

    #[test]
    fn test_resume_onto_dead_board_is_game_over() {
        let mut game = game_from([
            [3, 4, 3, 4],
            [4, 3, 4, 3],
            [3, 4, 3, 4],
            [10, 10, 5, 6],
        ]);

        // 10+10 wins and the spawn fills (3, 3), which pairs with neither 4 nor 6
        game.run_turn(Direction::Left).unwrap();
        assert_eq!(game.phase(), &TurnPhase::Terminal(TerminalReason::Won));
        assert_eq!(game.board().cell_at(0, 3).value_exp, 11);
        assert!(!game.board().any_empty());

        assert!(game.resume_after_win());
        assert_eq!(game.phase(), &TurnPhase::Terminal(TerminalReason::NoMoves));
        assert!(game.has_won());

        let events = game.take_events();
        assert!(matches!(events[0].data, GameEventData::Resumed));
        assert!(events.iter().any(|e| matches!(e.data, GameEventData::GameOver { .. })));
        assert!(!game.resume_after_win());
        assert!(!game.submit_direction(Direction::Right));
    }

    #[test]
    fn test_score_commits_on_settle() {
        let mut game = game_from([
            [1, 1, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);

        assert!(game.submit_direction(Direction::Left));
        assert!(matches!(game.phase(), TurnPhase::Slide1(_)));

        // Slide1 had nothing to move: settles, merge pass begins
        game.advance(17);
        assert!(matches!(game.phase(), TurnPhase::Merge(_)));
        assert_eq!(game.score(), 0, "merge initiated but not committed");
        assert_eq!(game.board().cell_at(0, 0).value_exp, 1);

        let result = game.advance(17);
        assert_eq!(game.score(), 4);
        assert_eq!(game.board().cell_at(0, 0).value_exp, 2);
        assert!(result.events.iter().any(|e| matches!(
            e.data,
            GameEventData::MergeCommitted { commit: MergeCommit { col: 0, row: 0, value_exp: 2 }, points: 4, .. }
        )));
    }

    #[test]
    fn test_phase_order() {
        let mut game = game_from([
            [0, 1, 0, 1],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        assert!(game.submit_direction(Direction::Left));

        let mut names = vec![game.phase().name()];
        while !game.is_idle() {
            game.advance(17);
            if names.last() != Some(&game.phase().name()) {
                names.push(game.phase().name());
            }
        }

        assert_eq!(names, ["slide1", "merge", "slide2", "spawn", "evaluate", "idle"]);
        assert_eq!(game.board().cell_at(0, 0).value_exp, 2);
    }

    #[test]
    fn test_noop_turn_skips_spawn_phase() {
        let mut game = game_from([
            [1, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        assert!(game.submit_direction(Direction::Up));

        let mut saw_spawn = false;
        while !game.is_idle() {
            game.advance(17);
            saw_spawn |= matches!(game.phase(), TurnPhase::Spawn { .. });
        }
        assert!(!saw_spawn);
    }

    #[test]
    fn test_input_ignored_during_turn() {
        let mut game = game_from([
            [0, 0, 0, 1],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);

        assert!(game.submit_direction(Direction::Left));
        assert!(game.phase().is_in_flight());
        assert!(!game.submit_direction(Direction::Right));
        assert_eq!(game.phase().turn().map(|t| t.direction), Some(Direction::Left));

        while !game.is_idle() {
            assert!(!game.submit_direction(Direction::Down));
            game.advance(17);
        }
        assert_eq!(game.last_outcome().map(|t| t.direction), Some(Direction::Left));
    }

    #[test]
    fn test_submit_vector_rejects_diagonal() {
        let mut game = game_from([
            [0, 0, 0, 1],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let before = game.board().clone();

        assert!(!game.submit_vector(GridVec::new(1, 1)));
        assert!(!game.submit_vector(GridVec::ZERO));
        assert!(game.is_idle());
        assert_eq!(game.board(), &before);

        assert!(game.submit_vector(GridVec::LEFT));
    }

    #[test]
    fn test_advance_idle_is_noop() {
        let mut game = game_from([
            [1, 0, 0, 0],
            [0, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let before = game.board().clone();

        for _ in 0..10 {
            let result = game.advance(17);
            assert!(result.events.is_empty());
            assert!(result.completed.is_none());
        }

        assert_eq!(game.board(), &before);
        assert_eq!(game.score(), 0);
        assert!(game.is_idle());
        assert_eq!(game.idle_ms(), 170);
    }

    #[test]
    fn test_idle_advance_only_decays_rewards() {
        let mut game = game_from([
            [2, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        game.board.cell_mut(0, 0).reward_ticks = 2;
        let exponents = game.board().exponents();

        game.advance(17);
        assert_eq!(game.board().cell_at(0, 0).reward_ticks, 1);
        game.advance(17);
        game.advance(17);
        assert_eq!(game.board().cell_at(0, 0).reward_ticks, 0);

        assert_eq!(game.board().exponents(), exponents);
        assert!(game.is_settled());
        assert_eq!(game.score(), 0);
        assert!(game.is_idle());
    }

    #[test]
    fn test_inactivity_only_counts_while_idle() {
        let config = GameConfig {
            inactivity_timeout_ms: Some(50),
            ..GameConfig::default()
        };
        let board = Board::from_exponents([
            [0, 0, 0, 1],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let mut game = Game::from_board(config, 9, board).unwrap();

        assert!(game.submit_direction(Direction::Left));
        while !game.is_idle() {
            game.advance(1000);
            assert!(!game.is_inactive());
            assert_eq!(game.idle_ms(), 0);
        }

        game.advance(30);
        assert!(!game.is_inactive());
        game.advance(30);
        assert!(game.is_inactive());

        assert!(game.submit_direction(Direction::Right));
        assert_eq!(game.idle_ms(), 0);
    }

    #[test]
    fn test_hi_score_survives_new_game() {
        let mut game = game_from([
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);

        game.run_turn(Direction::Left).unwrap();
        assert_eq!(game.score(), 8);
        assert_eq!(game.hi_score(), 8);

        game.new_game();
        assert_eq!(game.score(), 0);
        assert_eq!(game.hi_score(), 8);
        assert!(!game.has_won());
        assert_eq!(game.moves(), 0);
        assert_eq!(occupied(&game), 2);
    }

    #[test]
    fn test_totals_accumulate() {
        let mut game = game_from([
            [0, 0, 0, 1],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);

        let outcome = game.run_turn(Direction::Left).unwrap().completed.unwrap();
        assert_eq!(outcome.moved, 3);
        assert_eq!(game.tiles_moved(), 3);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_turn_within_tick_bound() {
        let mut game = game_from([
            [0, 0, 0, 1],
            [0, 0, 1, 0],
            [0, 1, 0, 0],
            [1, 0, 0, 0],
        ]);
        assert!(game.submit_direction(Direction::Left));

        let mut ticks = 0;
        while !game.is_idle() {
            game.advance(17);
            ticks += 1;
        }
        assert!(ticks <= game.max_turn_ticks());
    }

    #[test]
    fn test_replay_determinism() {
        let directions: Vec<Direction> = (0..200)
            .map(|i| Direction::ALL[(i * 7 + i / 3) % 4])
            .collect();

        let (game1, events1) = replay_game(GameConfig::default(), 99999, &directions).unwrap();
        let (game2, events2) = replay_game(GameConfig::default(), 99999, &directions).unwrap();
        let (game3, _) = replay_game(GameConfig::default(), 11111, &directions).unwrap();

        assert_eq!(game1.compute_hash(), game2.compute_hash());
        assert_eq!(events1, events2);
        assert_ne!(game1.compute_hash(), game3.compute_hash());
    }

    fn rows_strategy() -> impl Strategy<Value = Rows> {
        prop::array::uniform4(prop::array::uniform4(prop_oneof![
            2 => Just(0u8),
            3 => 1u8..=5,
        ]))
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn prop_noop_and_spawn_guarantee(
            rows in rows_strategy(),
            dir in prop::sample::select(Direction::ALL.to_vec()),
            seed in any::<u64>()
        ) {
            let mut game = Game::from_board(GameConfig::default(), seed, Board::from_exponents(rows)).unwrap();
            prop_assume!(game.is_idle());

            let before = game.board().clone();
            let expected = expected_without_spawn(rows, dir);
            let outcome = game.run_turn(dir).unwrap().completed.unwrap();

            if outcome.moved == 0 {
                prop_assert_eq!(game.board(), &before);
                prop_assert_eq!(outcome.spawned, None);
            } else {
                let tile = outcome.spawned.expect("changing turn spawns");
                prop_assert!(tile.value_exp == 1 || tile.value_exp == 2);
                prop_assert!(expected.is_empty(tile.col, tile.row));

                let mut after = game.board().exponents();
                after[tile.row][tile.col] = 0;
                prop_assert_eq!(after, expected.exponents());
                prop_assert_eq!(
                    game.board().count_empty() + 1,
                    expected.count_empty()
                );
            }
        }
    }
}
