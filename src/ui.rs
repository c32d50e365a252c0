//! Terminal UI rendering with ratatui
//!
//! The renderer never reads `Game` directly. `View` is rebuilt from the
//! `GameEvent`s the core emits, and drawing only looks at the view.

use crate::board::{Board, Cell, BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::GameEvent;
use crate::piece::Piece;
use crate::settings::Settings;
use crate::tetromino::TetrominoType;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Total width needed: board(22) + next/stats(18) = 40
const GAME_WIDTH: u16 = 40;
/// Total height needed: board(20) + 2 for borders = 22
const GAME_HEIGHT: u16 = 22;

/// What the player is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No game started yet
    Idle,
    Playing,
    GameOver { final_score: u64 },
}

/// Render-side copy of the game, maintained from core events
#[derive(Debug, Clone)]
pub struct View {
    pub board: Board,
    pub active: Option<Piece>,
    pub next: Option<TetrominoType>,
    pub score: u64,
    pub lines: u32,
    pub level: u32,
    pub status: Status,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            active: None,
            next: None,
            score: 0,
            lines: 0,
            level: 1,
            status: Status::Idle,
        }
    }

    /// Fold one core event into the view
    pub fn apply(&mut self, event: GameEvent) {
        match event {
            GameEvent::BoardChanged(board) => self.board = board,
            GameEvent::ActivePieceChanged(piece) => {
                if piece.is_some() {
                    self.status = Status::Playing;
                }
                self.active = piece;
            }
            GameEvent::NextPieceChanged(next) => self.next = Some(next),
            GameEvent::ProgressChanged {
                score,
                lines,
                level,
            } => {
                self.score = score;
                self.lines = lines;
                self.level = level;
            }
            GameEvent::GameOver { final_score } => {
                self.status = Status::GameOver { final_score };
            }
        }
    }
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, view: &View, settings: &Settings) {
    let area = frame.area();
    let (block_char, ghost_char) = settings.visual.block_chars();
    let ghost_char = settings.visual.show_ghost.then_some(ghost_char);

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Create main layout: board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(18), // Next piece + stats
        ])
        .split(game_area);

    render_board(frame, main_layout[0], view, block_char, ghost_char);

    // Right side: next piece and stats
    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next piece
            Constraint::Min(8),    // Stats
        ])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], view.next, block_char);
    render_stats(frame, right_layout[1], view);

    let start_key = settings
        .keys
        .start
        .first()
        .map(String::as_str)
        .unwrap_or("start");

    // Overlays
    match view.status {
        Status::Idle => render_overlay(
            frame,
            area,
            "BLOCKFALL",
            "",
            &format!("Press {} to start", start_key),
        ),
        Status::GameOver { final_score } => render_overlay(
            frame,
            area,
            "GAME OVER",
            &format!("Score: {}", final_score),
            &format!("{} to play again", start_key),
        ),
        Status::Playing => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the next piece preview
fn render_next(frame: &mut Frame, area: Rect, next: Option<TetrominoType>, block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece_type) = next {
        render_mini_piece(frame, inner, piece_type, block_char);
    }
}

/// Render a small piece preview
fn render_mini_piece(frame: &mut Frame, area: Rect, piece_type: TetrominoType, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let color = piece_type.color();
    let shape = piece_type.shape();
    let size = shape.size();

    // Only rows that contain part of the piece
    let lines: Vec<Line> = (0..size)
        .filter(|&row| (0..size).any(|col| shape.is_filled(row, col)))
        .map(|row| {
            let spans: Vec<Span> = (0..size)
                .map(|col| {
                    if shape.is_filled(row, col) {
                        Span::styled(block_char, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(
    frame: &mut Frame,
    area: Rect,
    view: &View,
    block_char: &str,
    ghost_char: Option<&str>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let active_cells: Vec<(i32, i32)> = view
        .active
        .as_ref()
        .map(|piece| piece.block_positions().collect())
        .unwrap_or_default();

    let ghost_cells: Vec<(i32, i32)> = match (&view.active, ghost_char) {
        (Some(piece), Some(_)) => {
            let mut ghost = piece.clone();
            ghost.y = piece.ghost_y(&view.board);
            ghost.block_positions().collect()
        }
        _ => Vec::new(),
    };

    let active_color = view.active.as_ref().map(Piece::color);

    let mut lines: Vec<Line> = Vec::with_capacity(BOARD_HEIGHT);
    for (row, cells) in view.board.rows().enumerate() {
        let mut spans = Vec::with_capacity(BOARD_WIDTH);

        for (col, cell) in cells.iter().enumerate() {
            let pos = (row as i32, col as i32);
            let (text, style) = match (active_color, ghost_char) {
                (Some(color), _) if active_cells.contains(&pos) => {
                    (block_char, Style::default().fg(color))
                }
                (Some(color), Some(ghost)) if ghost_cells.contains(&pos) => {
                    (ghost, Style::default().fg(color).dim())
                }
                _ => match *cell {
                    Cell::Filled(color) => (block_char, Style::default().fg(color)),
                    Cell::Empty => (EMPTY, Style::default()),
                },
            };

            spans.push(Span::styled(text, style));
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = Style::default().fg(Color::Gray);
    let lines = vec![
        Line::from(Span::styled("SCORE", label)),
        Line::from(Span::styled(
            format!("{}", view.score),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LEVEL", label)),
        Line::from(Span::styled(
            format!("{}", view.level),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", label)),
        Line::from(Span::styled(
            format!("{}", view.lines),
            Style::default().fg(Color::Green),
        )),
    ];

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for start/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str, hint: &str) {
    let popup_width = 26u16;
    let popup_height = 6u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::White)),
        Line::styled(hint, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
