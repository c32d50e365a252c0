//! Scoring, level progression and drop speed

use std::time::Duration;

/// Points per simultaneous line clear, indexed by line count (0-4)
pub const LINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];

/// Points per cell descended during a hard drop
pub const HARD_DROP_POINTS: u64 = 2;

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Drop interval at level 1, in milliseconds
const INITIAL_DROP_MS: u64 = 800;
/// Interval reduction per level, in milliseconds
const DROP_STEP_MS: u64 = 50;
/// Fastest automatic drop interval, in milliseconds
const MIN_DROP_MS: u64 = 100;
/// Soft drop divides the interval by this factor...
const SOFT_DROP_DIVISOR: u64 = 10;
/// ...but never goes below this, in milliseconds
const MIN_SOFT_DROP_MS: u64 = 50;

/// Score, line and level tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level (starts at 1)
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Record a lock that cleared `lines` rows at once
    ///
    /// Points use the level in effect before the clear. A board 10 wide can't
    /// clear more than 4 rows in one lock; larger counts score nothing.
    pub fn add_clear(&mut self, lines: usize) {
        if lines == 0 {
            return;
        }

        let base = LINE_SCORES.get(lines).copied().unwrap_or(0);
        self.points += base * self.level as u64;

        self.lines += lines as u32;
        self.level = self.lines / LINES_PER_LEVEL + 1;
    }

    /// Add score for a hard drop of `cells` rows
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * HARD_DROP_POINTS;
    }

    /// Automatic drop interval for the current level
    pub fn drop_interval(&self) -> Duration {
        let step = (self.level.saturating_sub(1) as u64).saturating_mul(DROP_STEP_MS);
        Duration::from_millis(INITIAL_DROP_MS.saturating_sub(step).max(MIN_DROP_MS))
    }

    /// Drop interval while soft drop is held
    pub fn soft_drop_interval(&self) -> Duration {
        let interval = self.drop_interval().as_millis() as u64;
        Duration::from_millis((interval / SOFT_DROP_DIVISOR).max(MIN_SOFT_DROP_MS))
    }
}
