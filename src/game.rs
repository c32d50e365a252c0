//! Core game state and logic
//!
//! `Game` owns the whole session: board, active and next piece, score and the
//! drop timer. It is driven by two inputs only, `process_action` for player
//! commands and `tick` for elapsed time, and reports every visible change as a
//! `GameEvent` for the front end to drain.

use crate::board::Board;
use crate::piece::Piece;
use crate::randomizer::Randomizer;
use crate::score::Score;
use crate::tetromino::{RotationDirection, TetrominoType};
use std::time::Duration;

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    /// Before the first start, after game over, or after an explicit stop
    #[default]
    Stopped,
    Running,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateCW,
    RotateCCW,
    SoftDropStart,
    SoftDropStop,
    HardDrop,
    StartGame,
    Quit,
}

/// Outbound notifications, in the order the changes happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    BoardChanged(Board),
    ActivePieceChanged(Option<Piece>),
    NextPieceChanged(TetrominoType),
    ProgressChanged { score: u64, lines: u32, level: u32 },
    GameOver { final_score: u64 },
}

/// The main game struct
pub struct Game {
    /// The game board
    pub board: Board,
    /// Current falling piece
    pub current_piece: Option<Piece>,
    /// Piece that spawns after the current one
    pub next_piece: Option<TetrominoType>,
    /// Piece randomizer
    randomizer: Randomizer,
    /// Score tracking
    pub score: Score,
    /// Current game state
    pub state: GameState,
    /// Whether soft drop is held
    soft_dropping: bool,
    /// Time accumulated towards the next automatic drop
    drop_timer: Duration,
    /// Pending notifications
    events: Vec<GameEvent>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create a stopped game with an OS-seeded randomizer
    pub fn new() -> Self {
        Self::with_randomizer(Randomizer::new())
    }

    /// Create a stopped game with a reproducible piece sequence
    pub fn with_seed(seed: u64) -> Self {
        Self::with_randomizer(Randomizer::with_seed(seed))
    }

    fn with_randomizer(randomizer: Randomizer) -> Self {
        Self {
            board: Board::new(),
            current_piece: None,
            next_piece: None,
            randomizer,
            score: Score::new(),
            state: GameState::Stopped,
            soft_dropping: false,
            drop_timer: Duration::ZERO,
            events: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == GameState::Running
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) {
        if action == Action::StartGame {
            self.start();
            return;
        }

        if self.state != GameState::Running {
            return;
        }

        match action {
            Action::MoveLeft => self.move_piece(-1, 0),
            Action::MoveRight => self.move_piece(1, 0),
            Action::RotateCW => self.rotate(RotationDirection::Clockwise),
            Action::RotateCCW => self.rotate(RotationDirection::CounterClockwise),
            Action::SoftDropStart => self.soft_dropping = true,
            Action::SoftDropStop => self.soft_dropping = false,
            Action::HardDrop => self.hard_drop(),
            Action::Quit => self.stop(),
            Action::StartGame => {}
        }
    }

    /// Advance the drop timer by `elapsed` (call every frame)
    pub fn tick(&mut self, elapsed: Duration) {
        if self.state != GameState::Running {
            return;
        }

        self.drop_timer += elapsed;
        if self.drop_timer <= self.effective_drop_interval() {
            return;
        }

        let moved = match &mut self.current_piece {
            Some(piece) => piece.try_move(0, 1, &self.board),
            None => false,
        };
        if moved {
            self.emit_active_piece();
        } else {
            self.lock_and_spawn();
        }
        self.drop_timer = Duration::ZERO;
    }

    /// Interval between automatic drops, accounting for soft drop
    pub fn effective_drop_interval(&self) -> Duration {
        if self.soft_dropping {
            self.score.soft_drop_interval()
        } else {
            self.score.drop_interval()
        }
    }

    /// Reset everything and spawn the first pair of pieces
    fn start(&mut self) {
        self.board = Board::new();
        self.score = Score::new();
        self.current_piece = None;
        self.next_piece = None;
        self.soft_dropping = false;
        self.drop_timer = Duration::ZERO;
        self.state = GameState::Running;
        tracing::info!("game started");

        self.events.push(GameEvent::BoardChanged(self.board.clone()));
        self.emit_progress();
        self.spawn();
    }

    /// Stop without a game over
    fn stop(&mut self) {
        tracing::info!(score = self.score.points, "game stopped");
        self.state = GameState::Stopped;
        self.soft_dropping = false;
    }

    /// Promote the next piece to current and draw a new next piece
    ///
    /// Ends the game if the new piece has no room at its spawn position.
    fn spawn(&mut self) {
        let piece_type = match self.next_piece.take() {
            Some(next) => next,
            None => self.randomizer.next(),
        };
        let next = self.randomizer.next();
        self.next_piece = Some(next);
        self.events.push(GameEvent::NextPieceChanged(next));

        let piece = Piece::new(piece_type);
        if piece.collides(&self.board) {
            self.game_over();
            return;
        }

        tracing::debug!(piece = ?piece_type, next = ?next, "spawned piece");
        self.current_piece = Some(piece);
        self.emit_active_piece();
    }

    fn game_over(&mut self) {
        tracing::info!(
            score = self.score.points,
            lines = self.score.lines,
            level = self.score.level,
            "game over"
        );
        self.state = GameState::Stopped;
        self.soft_dropping = false;
        self.current_piece = None;
        self.emit_active_piece();
        self.events.push(GameEvent::GameOver {
            final_score: self.score.points,
        });
    }

    fn move_piece(&mut self, dx: i32, dy: i32) {
        if let Some(piece) = &mut self.current_piece {
            if piece.try_move(dx, dy, &self.board) {
                self.emit_active_piece();
            }
        }
    }

    fn rotate(&mut self, direction: RotationDirection) {
        if let Some(piece) = &mut self.current_piece {
            if piece.rotate(direction, &self.board) {
                self.emit_active_piece();
            }
        }
    }

    fn hard_drop(&mut self) {
        let Some(piece) = &mut self.current_piece else {
            return;
        };

        let distance = piece.hard_drop(&self.board);
        self.score.add_hard_drop(distance);
        tracing::debug!(distance, "hard drop");
        self.emit_progress();
        self.lock_and_spawn();
    }

    /// Lock the current piece, clear rows and spawn the next piece
    fn lock_and_spawn(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };

        self.board.lock(&piece.shape, piece.x, piece.y, piece.color());

        let lines_cleared = self.board.clear_full_rows();
        if lines_cleared > 0 {
            self.score.add_clear(lines_cleared);
            tracing::debug!(
                lines = lines_cleared,
                total = self.score.lines,
                level = self.score.level,
                "cleared lines"
            );
            self.emit_progress();
        }
        self.events.push(GameEvent::BoardChanged(self.board.clone()));

        self.spawn();
    }

    fn emit_active_piece(&mut self) {
        self.events
            .push(GameEvent::ActivePieceChanged(self.current_piece.clone()));
    }

    fn emit_progress(&mut self) {
        self.events.push(GameEvent::ProgressChanged {
            score: self.score.points,
            lines: self.score.lines,
            level: self.score.level,
        });
    }
}
