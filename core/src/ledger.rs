//! Score and lives bookkeeping.
//!
//! [`delta`] is a pure function of the profile and an event. [`PlayerStats`]
//! applies deltas with the lives cap, so replaying the event log of a session
//! reproduces its final standings.

use serde::{Deserialize, Serialize};

use crate::*;

/// Something that moves score or lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Plain cells uncovered by one reveal, cascade included.
    CellsRevealed(CellCount),
    MineHit,
    Bonus,
    Penalty,
    QuestionAnswered { correct: bool },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub score: i32,
    pub lives: i8,
}

impl Delta {
    pub const ZERO: Delta = Delta { score: 0, lives: 0 };

    pub const fn new(score: i32, lives: i8) -> Self {
        Self { score, lives }
    }
}

impl core::ops::Add for Delta {
    type Output = Delta;

    fn add(self, rhs: Self) -> Self::Output {
        Delta {
            score: self.score.saturating_add(rhs.score),
            lives: self.lives.saturating_add(rhs.lives),
        }
    }
}

/// Score and lives change for `event` under `profile`, before clamping.
pub fn delta(profile: &DifficultyProfile, event: LedgerEvent) -> Delta {
    use LedgerEvent::*;

    match event {
        CellsRevealed(count) => Delta::new(profile.reveal_points.saturating_mul(count.into()), 0),
        MineHit => Delta::new(profile.mine_hit_points, -1),
        Bonus => Delta::new(profile.bonus_points, 1),
        Penalty => Delta::new(profile.penalty_points.saturating_neg(), -1),
        QuestionAnswered { correct: true } => Delta::new(profile.question_points, 1),
        QuestionAnswered { correct: false } => {
            Delta::new(profile.question_points.saturating_neg(), -1)
        }
    }
}

/// Running score and lives of one player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// May go negative.
    pub score: i32,
    pub lives: u8,
    pub lives_cap: u8,
}

impl PlayerStats {
    pub fn new(profile: &DifficultyProfile) -> Self {
        Self {
            score: 0,
            lives: profile.starting_lives,
            lives_cap: profile.starting_lives,
        }
    }

    /// Applies an event and returns the change that actually happened after
    /// the lives cap and floor.
    pub fn apply(&mut self, profile: &DifficultyProfile, event: LedgerEvent) -> Delta {
        let raw = delta(profile, event);

        let score = self.score.saturating_add(raw.score);
        let lives = (i16::from(self.lives) + i16::from(raw.lives)).clamp(0, self.lives_cap.into());
        let lives = u8::try_from(lives).unwrap_or(0);

        let applied = Delta::new(
            score.saturating_sub(self.score),
            i8::try_from(i16::from(lives) - i16::from(self.lives)).unwrap_or(0),
        );
        self.score = score;
        self.lives = lives;
        applied
    }

    pub const fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }
}

/// One ledger event attributed to the player it happened to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub player: PlayerSlot,
    pub event: LedgerEvent,
}

/// Recomputes every player's standings from an event log.
pub fn replay<'a>(
    profile: &DifficultyProfile,
    player_count: usize,
    events: impl IntoIterator<Item = &'a LoggedEvent>,
) -> Vec<PlayerStats> {
    let mut stats = vec![PlayerStats::new(profile); player_count];
    for logged in events {
        if let Some(player) = stats.get_mut(logged.player.index()) {
            player.apply(profile, logged.event);
        } else {
            log::warn!("Ignoring event for unknown player {:?}", logged.player);
        }
    }
    stats
}
