//! Game engine for a trivia-flavoured minesweeper with lives, score and an
//! optional second player.
//!
//! The engine is driven through [`GameSession`]; the lower layers ([`Grid`],
//! the [`reveal`] functions, the [`RandomBoardGenerator`] and the ledger) are
//! public for callers that want to run them on their own.

use serde::{Deserialize, Serialize};

pub use cell::*;
pub use difficulty::*;
pub use error::*;
pub use feedback::*;
pub use generator::*;
pub use grid::*;
pub use ledger::*;
pub use reveal::{FlagOutcome, RevealOutcome, RevealReport, check_win};
pub use session::*;
pub use snapshot::*;
pub use timer::*;
pub use turn::*;
pub use types::*;

mod cell;
mod difficulty;
mod error;
mod feedback;
mod generator;
mod grid;
mod ledger;
pub mod reveal;
mod session;
mod snapshot;
mod timer;
mod turn;
mod types;

/// Dimensions and populations of a board to generate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub mines: CellCount,
    pub specials: SpecialCounts,
}

impl BoardConfig {
    pub const fn new(size: Coord2, mines: CellCount, specials: SpecialCounts) -> Self {
        Self {
            size,
            mines,
            specials,
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_count(self.size)
    }

    /// Mines plus special cells.
    pub const fn occupied_cells(&self) -> CellCount {
        self.mines.saturating_add(self.specials.total())
    }

    /// Checks that the populations fit next to the largest zone `safe_zone`
    /// can protect, leaving at least one more free cell.
    pub fn check_capacity(&self, safe_zone: SafeZone) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(GameError::InvalidProfile);
        }
        let protected = safe_zone.max_cells().min(self.total_cells());
        if self.occupied_cells() >= self.total_cells() - protected {
            Err(GameError::InsufficientCells)
        } else {
            Ok(())
        }
    }
}
