use core::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a renderer may know about a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibleCell {
    #[default]
    Hidden,
    Flagged,
    Empty(u8),
    Mine,
    Question {
        pending: bool,
    },
    Bonus,
    Penalty,
}

impl VisibleCell {
    fn symbol(self) -> char {
        match self {
            Self::Hidden => '#',
            Self::Flagged => 'F',
            Self::Empty(0) => '.',
            Self::Empty(count) => char::from(b'0' + count.min(8)),
            Self::Mine => '*',
            Self::Question { .. } => '?',
            Self::Bonus => '+',
            Self::Penalty => '-',
        }
    }
}

/// Player-facing view of a board, with the content of covered cells hidden.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: Coord2,
    pub remaining_mines: isize,
    pub cells: Array2<VisibleCell>,
}

impl BoardSnapshot {
    /// A board nobody has touched yet.
    pub fn untouched(size: Coord2, mines: CellCount) -> Self {
        Self {
            size,
            remaining_mines: mines as isize,
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub fn from_grid(grid: &Grid) -> Self {
        Self::build(grid, false)
    }

    /// Like [`BoardSnapshot::from_grid`] but also uncovers unflagged mines,
    /// for finished games.
    pub fn with_mines_shown(grid: &Grid) -> Self {
        Self::build(grid, true)
    }

    fn build(grid: &Grid, show_mines: bool) -> Self {
        let size = grid.size();
        let mut cells = Array2::default(size.to_nd_index());

        for coords in grid.iter_coords() {
            let cell = grid[coords];
            cells[coords.to_nd_index()] = match (cell.state, cell.content) {
                (CellState::Flagged, _) => VisibleCell::Flagged,
                (CellState::Hidden, CellContent::Mine) if show_mines => VisibleCell::Mine,
                (CellState::Hidden, _) => VisibleCell::Hidden,
                (CellState::PendingAnswer, _) => VisibleCell::Question { pending: true },
                (CellState::Revealed, CellContent::Empty(count)) => VisibleCell::Empty(count),
                (CellState::Revealed, CellContent::Mine) => VisibleCell::Mine,
                (CellState::Revealed, CellContent::Question) => {
                    VisibleCell::Question { pending: false }
                }
                (CellState::Revealed, CellContent::Bonus) => VisibleCell::Bonus,
                (CellState::Revealed, CellContent::Penalty) => VisibleCell::Penalty,
            };
        }

        Self {
            size,
            remaining_mines: grid.remaining_mines_estimate(),
            cells,
        }
    }

    pub fn cell(&self, coords: Coord2) -> Result<VisibleCell> {
        if in_bounds(coords, self.size) {
            Ok(self.cells[coords.to_nd_index()])
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.cells.dim() != expected {
            return Err(GameError::InvalidBoardShape);
        }
        Ok(())
    }
}

/// One text row per grid row.
impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
