//! Active falling piece logic

use crate::board::{collides, Board, BOARD_WIDTH};
use crate::tetromino::{RotationDirection, Shape, TetrominoType};
use ratatui::style::Color;

/// Horizontal offsets tried, in order, when a rotation collides
pub const WALL_KICKS: [i32; 5] = [0, 1, -1, 2, -2];

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current (possibly rotated) shape
    pub shape: Shape,
    /// Column of the shape's bounding box left edge
    pub x: i32,
    /// Row of the shape's bounding box top edge (may be negative)
    pub y: i32,
}

impl Piece {
    /// Create a new piece at the spawn position: top row, horizontally centered
    pub fn new(piece_type: TetrominoType) -> Self {
        let shape = piece_type.shape();
        Self {
            piece_type,
            shape,
            x: (BOARD_WIDTH / 2) as i32 - (shape.size() / 2) as i32,
            y: 0,
        }
    }

    /// Create a piece with an explicit shape and position
    #[allow(dead_code)]
    pub fn with_shape(piece_type: TetrominoType, shape: Shape, x: i32, y: i32) -> Self {
        Self {
            piece_type,
            shape,
            x,
            y,
        }
    }

    pub fn color(&self) -> Color {
        self.piece_type.color()
    }

    /// Absolute (row, col) of every occupied cell
    pub fn block_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.occupied().map(|(r, c)| (self.y + r, self.x + c))
    }

    /// Whether the piece overlaps walls, floor or locked cells where it is
    pub fn collides(&self, board: &Board) -> bool {
        collides(&self.shape, self.x, self.y, board)
    }

    /// Try to translate by (dx, dy), returns true if successful
    pub fn try_move(&mut self, dx: i32, dy: i32, board: &Board) -> bool {
        if collides(&self.shape, self.x + dx, self.y + dy, board) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        true
    }

    /// Try to rotate, shifting sideways through `WALL_KICKS` if needed
    pub fn rotate(&mut self, direction: RotationDirection, board: &Board) -> bool {
        let rotated = self.shape.rotated(direction);

        for kick in WALL_KICKS {
            if !collides(&rotated, self.x + kick, self.y, board) {
                self.shape = rotated;
                self.x += kick;
                return true;
            }
        }

        false
    }

    /// Hard drop - move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> u32 {
        let mut distance = 0;
        while self.try_move(0, 1, board) {
            distance += 1;
        }
        distance
    }

    /// Row the piece would land on if hard dropped
    pub fn ghost_y(&self, board: &Board) -> i32 {
        let mut ghost_y = self.y;
        while !collides(&self.shape, self.x, ghost_y + 1, board) {
            ghost_y += 1;
        }
        ghost_y
    }
}
