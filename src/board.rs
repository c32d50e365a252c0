//! Game board representation and collision detection

use crate::tetromino::Shape;
use ratatui::style::Color;

/// Board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top, row increases downward
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        let row = row as usize;
        let col = col as usize;
        if row >= BOARD_HEIGHT || col >= BOARD_WIDTH {
            return None;
        }
        Some(self.cells[row][col])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let row = row as usize;
        let col = col as usize;
        if row >= BOARD_HEIGHT || col >= BOARD_WIDTH {
            return false;
        }
        self.cells[row][col] = cell;
        true
    }

    /// Whether a cell is blocked. Out-of-bounds positions count as blocked.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_none_or(|cell| cell.is_filled())
    }

    /// Lock a shape onto the board with its top-left corner at (x, y)
    ///
    /// Sub-cells above the board (row < 0) are dropped.
    pub fn lock(&mut self, shape: &Shape, x: i32, y: i32, color: Color) {
        for (r, c) in shape.occupied() {
            let row = y + r;
            if row >= 0 {
                self.set(row, x + c, Cell::Filled(color));
            }
        }
    }

    /// Clear completed rows and return the number cleared
    ///
    /// Surviving rows keep their relative order and sink to the bottom; the
    /// freed rows reappear empty at the top.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut write_row = BOARD_HEIGHT;

        for read_row in (0..BOARD_HEIGHT).rev() {
            if !self.is_row_full(read_row) {
                write_row -= 1;
                if write_row != read_row {
                    self.cells[write_row] = self.cells[read_row];
                }
            }
        }

        for row in 0..write_row {
            self.cells[row] = [Cell::Empty; BOARD_WIDTH];
        }

        write_row
    }

    /// Check if a row is completely filled
    fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Check if the board is completely empty
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.cells.iter()
    }
}

/// Whether `shape` placed with its top-left corner at (x, y) hits a wall, the
/// floor, or a locked cell
///
/// Rows above the board never collide with board contents, so pieces may sit
/// partially above row 0.
pub fn collides(shape: &Shape, x: i32, y: i32, board: &Board) -> bool {
    shape.occupied().any(|(r, c)| {
        let row = y + r;
        let col = x + c;
        if col < 0 || col >= BOARD_WIDTH as i32 || row >= BOARD_HEIGHT as i32 {
            return true;
        }
        row >= 0 && board.is_occupied(row, col)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::TetrominoType;

    fn fill_row(board: &mut Board, row: i32, color: Color) {
        for col in 0..BOARD_WIDTH {
            board.set(row, col as i32, Cell::Filled(color));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.rows().count(), BOARD_HEIGHT);
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 5, Cell::Filled(Color::Red)));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(Color::Red)));
        assert!(board.is_occupied(5, 5));
        assert!(!board.is_occupied(5, 6));
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(BOARD_HEIGHT as i32, 0), None);
        assert_eq!(board.get(0, BOARD_WIDTH as i32), None);
        assert!(board.is_occupied(-1, 0));
        assert!(board.is_occupied(0, BOARD_WIDTH as i32));
    }

    #[test]
    fn test_lock_skips_cells_above_board() {
        let mut board = Board::new();
        // O piece straddling the top edge: its top row is at -1
        board.lock(&TetrominoType::O.shape(), 3, -1, Color::Yellow);
        assert_eq!(board.get(0, 3), Some(Cell::Filled(Color::Yellow)));
        assert_eq!(board.get(0, 4), Some(Cell::Filled(Color::Yellow)));
        let filled = board
            .rows()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_filled())
            .count();
        assert_eq!(filled, 2);
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::new();
        fill_row(&mut board, 19, Color::Cyan);
        board.set(18, 0, Cell::Filled(Color::Red));

        let cleared = board.clear_full_rows();
        assert_eq!(cleared, 1);
        // The block from row 18 should now be on row 19
        assert_eq!(board.get(19, 0), Some(Cell::Filled(Color::Red)));
        assert!(board.get(18, 0).unwrap().is_empty());
    }

    #[test]
    fn test_clear_adjacent_rows_shifts_rows_above() {
        let mut board = Board::new();
        fill_row(&mut board, 5, Color::Cyan);
        fill_row(&mut board, 6, Color::Cyan);
        board.set(3, 1, Cell::Filled(Color::Red));
        board.set(4, 2, Cell::Filled(Color::Green));

        assert_eq!(board.clear_full_rows(), 2);

        assert_eq!(board.get(5, 1), Some(Cell::Filled(Color::Red)));
        assert_eq!(board.get(6, 2), Some(Cell::Filled(Color::Green)));
        let filled: Vec<_> = board
            .rows()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_filled())
                    .map(move |(c, _)| (r, c))
            })
            .collect();
        assert_eq!(filled, vec![(5, 1), (6, 2)]);
        let empty_rows = board
            .rows()
            .filter(|row| row.iter().all(|cell| cell.is_empty()))
            .count();
        assert_eq!(empty_rows, 18);
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut board = Board::new();
        fill_row(&mut board, 19, Color::Cyan);
        fill_row(&mut board, 17, Color::Cyan);
        board.set(18, 4, Cell::Filled(Color::Red));
        board.set(16, 7, Cell::Filled(Color::Blue));

        assert_eq!(board.clear_full_rows(), 2);
        assert_eq!(board.get(19, 4), Some(Cell::Filled(Color::Red)));
        assert_eq!(board.get(18, 7), Some(Cell::Filled(Color::Blue)));
        assert!(board.get(17, 7).unwrap().is_empty());
    }

    #[test]
    fn test_clear_four_rows() {
        let mut board = Board::new();
        for row in 16..20 {
            fill_row(&mut board, row, Color::Cyan);
        }
        assert_eq!(board.clear_full_rows(), 4);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_nothing() {
        let mut board = Board::new();
        board.set(19, 0, Cell::Filled(Color::Red));
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_collides_with_walls_and_floor() {
        let board = Board::new();
        let shape = TetrominoType::O.shape();
        assert!(!collides(&shape, 0, 0, &board));
        assert!(collides(&shape, -1, 0, &board));
        assert!(collides(&shape, BOARD_WIDTH as i32 - 1, 0, &board));
        assert!(!collides(&shape, 0, BOARD_HEIGHT as i32 - 2, &board));
        assert!(collides(&shape, 0, BOARD_HEIGHT as i32 - 1, &board));
    }

    #[test]
    fn test_collides_for_every_out_of_bounds_placement() {
        let board = Board::new();
        for piece in TetrominoType::all() {
            let shape = piece.shape();
            for y in -4..BOARD_HEIGHT as i32 + 4 {
                for x in -4..BOARD_WIDTH as i32 + 4 {
                    let out_of_bounds = shape.occupied().any(|(r, c)| {
                        let col = x + c;
                        col < 0 || col >= BOARD_WIDTH as i32 || y + r >= BOARD_HEIGHT as i32
                    });
                    assert_eq!(
                        collides(&shape, x, y, &board),
                        out_of_bounds,
                        "{:?} at ({}, {})",
                        piece,
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_above_board_is_free() {
        let mut board = Board::new();
        fill_row(&mut board, 0, Color::Red);
        // I piece's filled row is its second row; at y = -1 it sits on row 0
        let shape = TetrominoType::I.shape();
        assert!(collides(&shape, 3, -1, &board));
        assert!(!collides(&shape, 3, -2, &board));
    }

    #[test]
    fn test_collides_with_locked_cells() {
        let mut board = Board::new();
        board.set(10, 4, Cell::Filled(Color::Red));
        let shape = TetrominoType::O.shape();
        assert!(collides(&shape, 4, 9, &board));
        assert!(collides(&shape, 3, 10, &board));
        assert!(!collides(&shape, 5, 9, &board));
    }
}
