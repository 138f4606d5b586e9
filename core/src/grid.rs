use core::num::Saturating;
use core::ops::Index;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// How many of each special cell kind a grid carries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCounts {
    pub questions: CellCount,
    pub bonuses: CellCount,
    pub penalties: CellCount,
}

impl SpecialCounts {
    pub const fn new(questions: CellCount, bonuses: CellCount, penalties: CellCount) -> Self {
        Self {
            questions,
            bonuses,
            penalties,
        }
    }

    pub const fn total(&self) -> CellCount {
        self.questions
            .saturating_add(self.bonuses)
            .saturating_add(self.penalties)
    }
}

/// Explicit positions for every non-empty cell of a grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placements {
    pub mines: Vec<Coord2>,
    pub questions: Vec<Coord2>,
    pub bonuses: Vec<Coord2>,
    pub penalties: Vec<Coord2>,
}

/// The cell matrix of one game.
///
/// Contents are fixed at construction, only cell states change afterwards and
/// only through the reveal engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
    mine_count: CellCount,
    specials: SpecialCounts,
    flagged_count: Saturating<CellCount>,
    uncovered_safe: Saturating<CellCount>,
    pending_answers: Saturating<CellCount>,
}

impl Grid {
    pub fn from_layout(size: Coord2, placements: &Placements) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidBoardShape);
        }

        let mut contents: Array2<Option<CellContent>> = Array2::default(size.to_nd_index());
        let groups = [
            (&placements.mines, CellContent::Mine),
            (&placements.questions, CellContent::Question),
            (&placements.bonuses, CellContent::Bonus),
            (&placements.penalties, CellContent::Penalty),
        ];
        for (coords_list, content) in groups {
            for &coords in coords_list {
                if !in_bounds(coords, size) {
                    return Err(GameError::OutOfBounds);
                }
                let slot = &mut contents[coords.to_nd_index()];
                if slot.is_some() {
                    return Err(GameError::InvalidCell);
                }
                *slot = Some(content);
            }
        }

        let occupied = placements.mines.len()
            + placements.questions.len()
            + placements.bonuses.len()
            + placements.penalties.len();
        if occupied >= usize::from(cell_count(size)) {
            return Err(GameError::InsufficientCells);
        }

        let cells = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            let content = contents[[row, col]].unwrap_or_else(|| {
                let mines = NeighborIter::new((row as Coord, col as Coord), size)
                    .filter(|&pos| contents[pos.to_nd_index()] == Some(CellContent::Mine))
                    .count();
                CellContent::Empty(mines as u8)
            });
            Cell {
                content,
                state: CellState::Hidden,
            }
        });

        let count = |list: &Vec<Coord2>| -> CellCount { list.len().try_into().unwrap() };
        Ok(Self {
            cells,
            mine_count: count(&placements.mines),
            specials: SpecialCounts::new(
                count(&placements.questions),
                count(&placements.bonuses),
                count(&placements.penalties),
            ),
            flagged_count: Saturating(0),
            uncovered_safe: Saturating(0),
            pending_answers: Saturating(0),
        })
    }

    /// Builds a grid from text rows: `*` mine, `?` question, `+` bonus,
    /// `-` penalty, anything else a plain cell.
    pub fn from_ascii(rows: &[&str]) -> Result<Self> {
        let height: Coord = rows
            .len()
            .try_into()
            .map_err(|_| GameError::InvalidBoardShape)?;
        let width = rows.first().map_or(0, |row| row.chars().count());
        let width: Coord = width.try_into().map_err(|_| GameError::InvalidBoardShape)?;

        let mut placements = Placements::default();
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != usize::from(width) {
                return Err(GameError::InvalidBoardShape);
            }
            for (col, ch) in line.chars().enumerate() {
                let coords = (row as Coord, col as Coord);
                match ch {
                    '*' => placements.mines.push(coords),
                    '?' => placements.questions.push(coords),
                    '+' => placements.bonuses.push(coords),
                    '-' => placements.penalties.push(coords),
                    _ => {}
                }
            }
        }

        Self::from_layout((height, width), &placements)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self[coords])
    }

    pub fn neighbors_of(&self, coords: Coord2) -> Result<NeighborIter> {
        let coords = self.validate_coords(coords)?;
        Ok(NeighborIter::new(coords, self.size()))
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn special_counts(&self) -> SpecialCounts {
        self.specials
    }

    /// Non-mine cells, special cells included.
    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    /// Safe cells in `Revealed` or `PendingAnswer` state.
    pub fn uncovered_safe_count(&self) -> CellCount {
        self.uncovered_safe.0
    }

    pub fn pending_answer_count(&self) -> CellCount {
        self.pending_answers.0
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count.0
    }

    /// Total mines minus placed flags; negative when over-flagged.
    pub fn remaining_mines_estimate(&self) -> isize {
        (self.mine_count as isize) - (self.flagged_count.0 as isize)
    }

    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub(crate) fn set_state(&mut self, coords: Coord2, next: CellState) {
        use CellState::*;

        let cell = &mut self.cells[coords.to_nd_index()];
        debug_assert!(
            matches!(
                (cell.state, next),
                (Hidden, Revealed | Flagged | PendingAnswer)
                    | (Flagged, Hidden)
                    | (PendingAnswer, Revealed)
            ),
            "illegal cell transition {:?} -> {:?} at {:?}",
            cell.state,
            next,
            coords
        );

        match (cell.state, next) {
            (Hidden, Flagged) => self.flagged_count += 1,
            (Flagged, Hidden) => self.flagged_count -= 1,
            (Hidden, Revealed) if cell.content.is_safe() => self.uncovered_safe += 1,
            (Hidden, PendingAnswer) => {
                self.uncovered_safe += 1;
                self.pending_answers += 1;
            }
            (PendingAnswer, Revealed) => self.pending_answers -= 1,
            _ => {}
        }
        cell.state = next;
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_counts_only_count_mines() {
        let grid = Grid::from_ascii(&["*?.", "+.-", "..*"]).unwrap();

        assert_eq!(grid[(0, 2)].content, CellContent::Empty(0));
        assert_eq!(grid[(1, 1)].content, CellContent::Empty(2));
        assert_eq!(grid[(2, 0)].content, CellContent::Empty(0));
        assert_eq!(grid[(2, 1)].content, CellContent::Empty(1));
        assert_eq!(grid[(0, 1)].content, CellContent::Question);
        assert_eq!(grid.mine_count(), 2);
        assert_eq!(grid.special_counts(), SpecialCounts::new(1, 1, 1));
        assert_eq!(grid.safe_cell_count(), 7);
    }

    #[test]
    fn cell_at_rejects_out_of_bounds() {
        let grid = Grid::from_ascii(&["*..", "..."]).unwrap();

        assert_eq!(grid.size(), (2, 3));
        assert!(grid.cell_at((1, 2)).is_ok());
        assert_eq!(grid.cell_at((2, 0)), Err(GameError::OutOfBounds));
        assert_eq!(grid.cell_at((0, 3)), Err(GameError::OutOfBounds));
        assert!(grid.neighbors_of((5, 5)).is_err());
    }

    #[test]
    fn neighbors_of_corner_has_three() {
        let grid = Grid::from_ascii(&["...", "...", "..*"]).unwrap();
        let neighbors: Vec<_> = grid.neighbors_of((0, 0)).unwrap().collect();

        assert_eq!(neighbors.len(), 3);
        assert!(neighbors.contains(&(1, 1)));
    }

    #[test]
    fn layout_rejects_overlaps_and_full_boards() {
        let overlapping = Placements {
            mines: vec![(0, 0)],
            bonuses: vec![(0, 0)],
            ..Default::default()
        };
        assert_eq!(
            Grid::from_layout((2, 2), &overlapping),
            Err(GameError::InvalidCell)
        );

        assert_eq!(
            Grid::from_ascii(&["**", "?+"]),
            Err(GameError::InsufficientCells)
        );
        assert_eq!(
            Grid::from_ascii(&["**", "*"]),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn flag_bookkeeping_tracks_estimate() {
        let mut grid = Grid::from_ascii(&["*..", "..."]).unwrap();

        grid.set_state((0, 1), CellState::Flagged);
        grid.set_state((0, 2), CellState::Flagged);
        assert_eq!(grid.flagged_count(), 2);
        assert_eq!(grid.remaining_mines_estimate(), -1);

        grid.set_state((0, 2), CellState::Hidden);
        assert_eq!(grid.remaining_mines_estimate(), 0);
    }
}
