//! Reveal engine: flood-fill cascade, flag toggling and win detection.
//!
//! Everything here is a plain function over a [`Grid`]; no state is kept
//! between calls.

use std::collections::VecDeque;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

/// What the explicitly revealed cell turned out to be.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    /// A plain cell, possibly the start of a cascade.
    Safe,
    MineHit,
    /// The cell is now waiting for a trivia answer.
    Question,
    Bonus,
    Penalty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    /// Every cell that changed state, the explicitly revealed one first.
    pub uncovered: Vec<Coord2>,
}

impl RevealReport {
    /// Whether the reveal opened more than the clicked cell.
    pub fn cascaded(&self) -> bool {
        self.uncovered.len() > 1
    }

    /// Number of plain cells uncovered, the unit of reveal scoring.
    pub fn plain_cells(&self) -> CellCount {
        match self.outcome {
            RevealOutcome::Safe => self.uncovered.len().try_into().unwrap_or(CellCount::MAX),
            _ => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagOutcome {
    Flagged,
    Unflagged,
}

/// Reveals a hidden cell, cascading through zero-count regions.
///
/// Mines and special cells are only ever uncovered by a direct reveal, the
/// cascade stops in front of them.
pub fn reveal(grid: &mut Grid, coords: Coord2) -> Result<RevealReport> {
    use CellContent::*;

    let coords = grid.validate_coords(coords)?;
    let cell = grid[coords];
    if cell.state != CellState::Hidden {
        return Err(GameError::InvalidCell);
    }

    let outcome = match cell.content {
        Mine => {
            grid.set_state(coords, CellState::Revealed);
            log::debug!("Mine hit at {:?}", coords);
            RevealOutcome::MineHit
        }
        Question => {
            grid.set_state(coords, CellState::PendingAnswer);
            RevealOutcome::Question
        }
        Bonus => {
            grid.set_state(coords, CellState::Revealed);
            RevealOutcome::Bonus
        }
        Penalty => {
            grid.set_state(coords, CellState::Revealed);
            RevealOutcome::Penalty
        }
        Empty(0) => {
            let uncovered = cascade(grid, coords);
            return Ok(RevealReport {
                outcome: RevealOutcome::Safe,
                uncovered,
            });
        }
        Empty(count) => {
            grid.set_state(coords, CellState::Revealed);
            log::debug!("Reveal cell at {:?}, mine count: {}", coords, count);
            RevealOutcome::Safe
        }
    };

    Ok(RevealReport {
        outcome,
        uncovered: vec![coords],
    })
}

/// Breadth-first flood fill from a zero cell with a visited guard, so every
/// cell is looked at once at most.
fn cascade(grid: &mut Grid, origin: Coord2) -> Vec<Coord2> {
    let mut uncovered = vec![origin];
    grid.set_state(origin, CellState::Revealed);

    let mut visited: HashSet<Coord2> = HashSet::from([origin]);
    let mut to_visit: VecDeque<_> = grid.iter_neighbors(origin).collect();
    log::trace!(
        "Starting flood-fill from {:?}, initial neighbors: {:?}",
        origin,
        to_visit
    );

    while let Some(visit_coords) = to_visit.pop_front() {
        if !visited.insert(visit_coords) {
            continue;
        }

        let cell = grid[visit_coords];
        let CellContent::Empty(count) = cell.content else {
            continue;
        };
        if cell.state != CellState::Hidden {
            log::trace!("Skipping cell at {:?}", visit_coords);
            continue;
        }

        grid.set_state(visit_coords, CellState::Revealed);
        uncovered.push(visit_coords);
        log::trace!(
            "Flood revealed cell at {:?}, mine count: {}",
            visit_coords,
            count
        );

        if count == 0 {
            to_visit.extend(
                grid.iter_neighbors(visit_coords)
                    .filter(|pos| !visited.contains(pos)),
            );
        }
    }

    log::debug!("Cascade from {:?} uncovered {} cells", origin, uncovered.len());
    uncovered
}

/// Flips a cell between hidden and flagged. Over-flagging is allowed.
pub fn toggle_flag(grid: &mut Grid, coords: Coord2) -> Result<FlagOutcome> {
    let coords = grid.validate_coords(coords)?;

    let outcome = match grid[coords].state {
        CellState::Hidden => {
            grid.set_state(coords, CellState::Flagged);
            FlagOutcome::Flagged
        }
        CellState::Flagged => {
            grid.set_state(coords, CellState::Hidden);
            FlagOutcome::Unflagged
        }
        CellState::Revealed | CellState::PendingAnswer => return Err(GameError::InvalidCell),
    };

    if grid.remaining_mines_estimate() < 0 {
        log::warn!(
            "More flags than mines: {} flags for {} mines",
            grid.flagged_count(),
            grid.mine_count()
        );
    }
    Ok(outcome)
}

/// True once every non-mine cell is revealed and no question is left open.
/// Mines may stay hidden or flagged.
pub fn check_win(grid: &Grid) -> bool {
    grid.uncovered_safe_count() == grid.safe_cell_count() && grid.pending_answer_count() == 0
}

/// Resolves a question cell once its answer is known.
pub(crate) fn settle_question(grid: &mut Grid, coords: Coord2) -> Result<()> {
    let coords = grid.validate_coords(coords)?;
    if grid[coords].state != CellState::PendingAnswer {
        return Err(GameError::InvalidCell);
    }
    grid.set_state(coords, CellState::Revealed);
    Ok(())
}
