use serde::{Deserialize, Serialize};

/// What a cell holds. Fixed once the grid is laid out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellContent {
    /// Plain safe cell with the number of adjacent mines (0..=8).
    Empty(u8),
    Mine,
    Question,
    Bonus,
    Penalty,
}

impl CellContent {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// Question, Bonus or Penalty.
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Question | Self::Bonus | Self::Penalty)
    }

    pub const fn is_safe(self) -> bool {
        !self.is_mine()
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::Empty(0)
    }
}

/// Player-visible state of a cell.
///
/// Allowed transitions: `Hidden -> Revealed`, `Hidden <-> Flagged`,
/// `Hidden -> PendingAnswer -> Revealed` (question cells only).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
    /// A question cell that was uncovered but whose answer is not resolved yet.
    PendingAnswer,
}

impl CellState {
    pub const fn is_uncovered(self) -> bool {
        matches!(self, Self::Revealed | Self::PendingAnswer)
    }

    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    pub state: CellState,
}
