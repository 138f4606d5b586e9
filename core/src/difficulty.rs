use serde::{Deserialize, Serialize};

use crate::*;

/// Built-in difficulty tiers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Value of a bonus, penalty or question cell on this tier.
    pub const fn special_points(self) -> i32 {
        match self {
            Self::Easy => 8,
            Self::Medium => 12,
            Self::Hard => 16,
        }
    }

    pub fn profile(self) -> DifficultyProfile {
        let ((rows, cols), mines, specials, starting_lives) = match self {
            Self::Easy => ((9, 9), 10, SpecialCounts::new(2, 1, 1), 3),
            Self::Medium => ((16, 16), 40, SpecialCounts::new(4, 2, 2), 3),
            Self::Hard => ((16, 30), 99, SpecialCounts::new(6, 3, 3), 2),
        };
        let points = self.special_points();

        DifficultyProfile {
            name: self.name().into(),
            rows,
            cols,
            mines,
            specials,
            starting_lives,
            reveal_points: 1,
            mine_hit_points: 0,
            bonus_points: points,
            penalty_points: points,
            question_points: points,
        }
    }
}

/// Everything a difficulty tier decides: board shape, populations, lives and
/// point values. Loaded once per session and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub name: String,
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
    #[serde(default)]
    pub specials: SpecialCounts,
    pub starting_lives: u8,
    /// Points for every plain cell a reveal uncovers.
    pub reveal_points: i32,
    /// Score change on a mine hit, usually zero or negative.
    #[serde(default)]
    pub mine_hit_points: i32,
    pub bonus_points: i32,
    pub penalty_points: i32,
    pub question_points: i32,
}

impl DifficultyProfile {
    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn board_config(&self) -> BoardConfig {
        BoardConfig::new(self.size(), self.mines, self.specials)
    }

    pub fn mine_density(&self) -> f32 {
        let total = self.board_config().total_cells();
        if total == 0 {
            0.0
        } else {
            f32::from(self.mines) / f32::from(total)
        }
    }

    pub fn validate(&self, safe_zone: SafeZone) -> Result<()> {
        if self.starting_lives == 0 {
            return Err(GameError::InvalidProfile);
        }
        self.board_config().check_capacity(safe_zone)
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Difficulty::default().profile()
    }
}

impl From<Difficulty> for DifficultyProfile {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_tiers_are_valid() {
        for difficulty in Difficulty::ALL {
            let profile = difficulty.profile();
            assert_eq!(profile.validate(SafeZone::Neighborhood), Ok(()));
            assert_eq!(profile.name, difficulty.name());
        }
    }

    #[test]
    fn easy_is_classic_beginner_board() {
        let profile = Difficulty::Easy.profile();

        assert_eq!(profile.size(), (9, 9));
        assert_eq!(profile.mines, 10);
        assert_eq!(profile.bonus_points, 8);
        assert!((profile.mine_density() - 10.0 / 81.0).abs() < f32::EPSILON);
    }

    #[test]
    fn special_points_scale_with_tier() {
        assert_eq!(Difficulty::Medium.profile().bonus_points, 12);
        assert_eq!(Difficulty::Hard.profile().penalty_points, 16);
    }

    #[test]
    fn rejects_zero_lives_and_overfull_boards() {
        let mut profile = Difficulty::Easy.profile();
        profile.starting_lives = 0;
        assert_eq!(
            profile.validate(SafeZone::Cell),
            Err(GameError::InvalidProfile)
        );

        let mut profile = Difficulty::Easy.profile();
        profile.mines = 70;
        assert_eq!(
            profile.validate(SafeZone::Neighborhood),
            Err(GameError::InsufficientCells)
        );
    }
}
