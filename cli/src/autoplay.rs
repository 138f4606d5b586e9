//! A simple board player working only from what a player can see.
//!
//! It applies the two single-cell minesweeper rules and guesses uniformly
//! among covered cells when neither rule fires.

use quizmines_core::{BoardSnapshot, Coord, Coord2, NeighborIter, VisibleCell};
use rand::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Move {
    Reveal(Coord2),
    Flag(Coord2),
}

/// Picks the next move for `snapshot`, `None` when nothing is left to touch.
pub fn next_move<R: Rng + ?Sized>(snapshot: &BoardSnapshot, rng: &mut R) -> Option<Move> {
    if let Some(deduced) = deduce(snapshot) {
        return Some(deduced);
    }

    let hidden: Vec<Coord2> = cells(snapshot)
        .filter(|&(_, cell)| cell == VisibleCell::Hidden)
        .map(|(coords, _)| coords)
        .collect();
    hidden.choose(rng).copied().map(Move::Reveal)
}

/// For every number: if its known mines (flags and mines already hit)
/// account for all of them the remaining hidden neighbors are safe, and if
/// known mines plus hidden neighbors are exactly its count those neighbors
/// are all mines.
fn deduce(snapshot: &BoardSnapshot) -> Option<Move> {
    for (coords, cell) in cells(snapshot) {
        let VisibleCell::Empty(count @ 1..) = cell else {
            continue;
        };

        let mut known = 0;
        let mut hidden = Vec::new();
        for pos in NeighborIter::new(coords, snapshot.size) {
            match snapshot.cell(pos) {
                Ok(VisibleCell::Flagged | VisibleCell::Mine) => known += 1,
                Ok(VisibleCell::Hidden) => hidden.push(pos),
                _ => {}
            }
        }

        let Some(&first) = hidden.first() else {
            continue;
        };
        if known == count {
            log::trace!("{coords:?} is satisfied, {first:?} is safe");
            return Some(Move::Reveal(first));
        }
        if usize::from(known) + hidden.len() == usize::from(count) {
            log::trace!("{coords:?} needs every neighbor, {first:?} is a mine");
            return Some(Move::Flag(first));
        }
    }
    None
}

fn cells(snapshot: &BoardSnapshot) -> impl Iterator<Item = (Coord2, VisibleCell)> + '_ {
    snapshot
        .cells
        .indexed_iter()
        .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
}
