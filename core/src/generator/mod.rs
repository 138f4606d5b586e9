use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self, config: BoardConfig) -> Result<Grid>;
}

/// Cells around the first reveal that are guaranteed plain and mine-free.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeZone {
    /// Only the revealed cell itself.
    Cell,
    /// The revealed cell and its (edge-clipped) 3x3 neighborhood, so the
    /// first reveal always opens a cascade.
    #[default]
    Neighborhood,
}

impl SafeZone {
    pub const fn protects(self, origin: Coord2, coords: Coord2) -> bool {
        match self {
            Self::Cell => origin.0 == coords.0 && origin.1 == coords.1,
            Self::Neighborhood => chebyshev(origin, coords) <= 1,
        }
    }

    /// Largest number of cells the zone can cover, used when checking a
    /// configuration before the first reveal is known.
    pub const fn max_cells(self) -> CellCount {
        match self {
            Self::Cell => 1,
            Self::Neighborhood => 9,
        }
    }
}
