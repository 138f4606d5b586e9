use rand::prelude::*;

use super::*;

/// Generation strategy that keeps the first revealed cell (and optionally its
/// neighbors) clear, and is otherwise uniformly random.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
    origin: Coord2,
    safe_zone: SafeZone,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64, origin: Coord2, safe_zone: SafeZone) -> Self {
        Self {
            seed,
            origin,
            safe_zone,
        }
    }

    /// Same placement as [`BoardGenerator::generate`] but drawing from the
    /// given random source instead of the seed.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        config: BoardConfig,
        rng: &mut R,
    ) -> Result<Grid> {
        if !in_bounds(self.origin, config.size) {
            return Err(GameError::OutOfBounds);
        }

        let mut eligible: Vec<Coord2> = (0..config.size.0)
            .flat_map(|row| (0..config.size.1).map(move |col| (row, col)))
            .filter(|&coords| !self.safe_zone.protects(self.origin, coords))
            .collect();

        let needed = usize::from(config.mines) + usize::from(config.specials.total());
        if needed >= eligible.len() {
            log::debug!(
                "Cannot place {} mines and specials, only {} cells outside the safe zone",
                needed,
                eligible.len()
            );
            return Err(GameError::InsufficientCells);
        }

        let (chosen, _) = eligible.partial_shuffle(rng, needed);

        let specials = config.specials;
        let (mines, rest) = chosen.split_at(config.mines.into());
        let (questions, rest) = rest.split_at(specials.questions.into());
        let (bonuses, penalties) = rest.split_at(specials.bonuses.into());

        let placements = Placements {
            mines: mines.to_vec(),
            questions: questions.to_vec(),
            bonuses: bonuses.to_vec(),
            penalties: penalties.to_vec(),
        };
        log::debug!(
            "Generated {}x{} board with {} mines and {:?} around {:?}",
            config.size.0,
            config.size.1,
            config.mines,
            specials,
            self.origin
        );

        Grid::from_layout(config.size, &placements)
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: BoardConfig) -> Result<Grid> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        self.generate_with_rng(config, &mut rng)
    }
}
