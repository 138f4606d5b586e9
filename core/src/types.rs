/// Single coordinate axis used for grid rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Number of cells on a board of `size`.
pub const fn cell_count(size: Coord2) -> CellCount {
    (size.0 as CellCount).saturating_mul(size.1 as CellCount)
}

/// Whether `coords` lies inside a grid of `size`.
pub const fn in_bounds(coords: Coord2, size: Coord2) -> bool {
    coords.0 < size.0 && coords.1 < size.1
}

/// Chebyshev distance, used for the 3x3 protected zone around the first reveal.
pub const fn chebyshev(a: Coord2, b: Coord2) -> Coord {
    let dr = a.0.abs_diff(b.0);
    let dc = a.1.abs_diff(b.1);
    if dr > dc { dr } else { dc }
}

/// Walks the 3x3 block around a cell in reading order, clipped to the
/// board and skipping the cell itself. Empty for an off-board center.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    first_col: Coord,
    last: Coord2,
    next: Option<Coord2>,
}

impl NeighborIter {
    pub fn new(center: Coord2, size: Coord2) -> Self {
        let (row, col) = center;
        let last = (
            row.saturating_add(1).min(size.0.saturating_sub(1)),
            col.saturating_add(1).min(size.1.saturating_sub(1)),
        );
        Self {
            center,
            first_col: col.saturating_sub(1),
            last,
            next: in_bounds(center, size).then(|| (row.saturating_sub(1), col.saturating_sub(1))),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.next?;
            let (row, col) = current;
            self.next = if col < self.last.1 {
                Some((row, col + 1))
            } else if row < self.last.0 {
                Some((row + 1, self.first_col))
            } else {
                None
            };
            if current != self.center {
                return Some(current);
            }
        }
    }
}
