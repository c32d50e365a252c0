//! Tetromino definitions and shapes
//!
//! The 7 standard tetrominoes, each described by a square occupancy matrix in
//! piece-local coordinates (row 0 at the top, col 0 at the left).

use ratatui::style::Color;

/// Largest bounding box of any catalog shape
pub const MAX_SHAPE_SIZE: usize = 4;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
    J, // Blue - J-shape
    L, // Orange - L-shape
}

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Rgb(0x00, 0xf0, 0xf0),
            TetrominoType::O => Color::Rgb(0xf0, 0xf0, 0x00),
            TetrominoType::T => Color::Rgb(0xa0, 0x00, 0xf0),
            TetrominoType::S => Color::Rgb(0x00, 0xf0, 0x00),
            TetrominoType::Z => Color::Rgb(0xf0, 0x00, 0x00),
            TetrominoType::J => Color::Rgb(0x00, 0x00, 0xf0),
            TetrominoType::L => Color::Rgb(0xf0, 0xa0, 0x00),
        }
    }

    /// All tetromino types, in catalog order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Get the canonical (spawn orientation) shape of this tetromino
    pub fn shape(&self) -> Shape {
        match self {
            TetrominoType::I => Shape::from_rows([
                [0, 0, 0, 0],
                [1, 1, 1, 1],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
            ]),
            TetrominoType::O => Shape::from_rows([
                [1, 1],
                [1, 1],
            ]),
            TetrominoType::T => Shape::from_rows([
                [0, 1, 0],
                [1, 1, 1],
                [0, 0, 0],
            ]),
            TetrominoType::S => Shape::from_rows([
                [0, 1, 1],
                [1, 1, 0],
                [0, 0, 0],
            ]),
            TetrominoType::Z => Shape::from_rows([
                [1, 1, 0],
                [0, 1, 1],
                [0, 0, 0],
            ]),
            TetrominoType::J => Shape::from_rows([
                [1, 0, 0],
                [1, 1, 1],
                [0, 0, 0],
            ]),
            TetrominoType::L => Shape::from_rows([
                [0, 0, 1],
                [1, 1, 1],
                [0, 0, 0],
            ]),
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// An N×N occupancy matrix, N <= MAX_SHAPE_SIZE
///
/// Cells outside the N×N window are always empty. Rotation never changes N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Build a shape from a square matrix of 0/1 values
    pub fn from_rows<const N: usize>(rows: [[u8; N]; N]) -> Self {
        assert!(N > 0 && N <= MAX_SHAPE_SIZE, "shape size out of range: {}", N);
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                cells[r][c] = value != 0;
            }
        }
        Self { size: N, cells }
    }

    /// Side length of the bounding box
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the sub-cell at (row, col) is occupied
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// Iterate occupied sub-cells as (row, col) offsets
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |r| {
            (0..self.size)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (r as i32, c as i32))
        })
    }

    /// Return a copy rotated by 90 degrees
    pub fn rotated(&self, direction: RotationDirection) -> Shape {
        let n = self.size;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for r in 0..n {
            for c in 0..n {
                match direction {
                    RotationDirection::Clockwise => cells[c][n - 1 - r] = self.cells[r][c],
                    RotationDirection::CounterClockwise => cells[n - 1 - c][r] = self.cells[r][c],
                }
            }
        }
        Self { size: n, cells }
    }
}
