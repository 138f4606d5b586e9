use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::*;

/// Seat of a player in a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::One),
            1 => Some(Self::Two),
            _ => None,
        }
    }
}

/// Who a player is. Owned by the caller, the engine only carries it along.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl PlayerIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub identity: PlayerIdentity,
    pub stats: PlayerStats,
    flag_mode: bool,
    deferred: VecDeque<Coord2>,
}

impl Player {
    pub fn new(identity: PlayerIdentity, profile: &DifficultyProfile) -> Self {
        Self {
            identity,
            stats: PlayerStats::new(profile),
            flag_mode: false,
            deferred: VecDeque::new(),
        }
    }

    /// Client-side interaction mode: taps place flags instead of revealing.
    /// The engine never looks at it.
    pub fn flag_mode(&self) -> bool {
        self.flag_mode
    }

    /// Questions this player put off, oldest first.
    pub fn deferred_questions(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.deferred.iter().copied()
    }

    pub(crate) fn defer(&mut self, coords: Coord2) {
        self.deferred.push_back(coords);
    }

    pub(crate) fn take_deferred(&mut self) -> Option<Coord2> {
        self.deferred.pop_front()
    }
}

/// When the active player hands over to the other one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPolicy {
    /// Every reveal, flag, answer or deferral ends the turn.
    #[default]
    EveryAction,
    /// A reveal that cascaded without hitting a mine keeps the turn, and flags
    /// never end it.
    ContinueOnCascade,
}

/// A completed player action, as far as turn handling cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnAction {
    Reveal { cascaded: bool, mine_hit: bool },
    Flag,
    Answer,
    Defer,
}

impl TurnPolicy {
    pub const fn ends_turn(self, action: TurnAction) -> bool {
        match (self, action) {
            (Self::EveryAction, _) => true,
            (Self::ContinueOnCascade, TurnAction::Reveal { cascaded, mine_hit }) => {
                !cascaded || mine_hit
            }
            (Self::ContinueOnCascade, TurnAction::Flag) => false,
            (Self::ContinueOnCascade, TurnAction::Answer | TurnAction::Defer) => true,
        }
    }
}

/// Tracks whose turn it is in a one or two player session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnController {
    players: Vec<Player>,
    active: PlayerSlot,
    turn: u32,
    policy: TurnPolicy,
}

impl TurnController {
    pub fn new(players: Vec<Player>, policy: TurnPolicy) -> Result<Self> {
        if players.is_empty() || players.len() > 2 {
            return Err(GameError::InvalidProfile);
        }
        Ok(Self {
            players,
            active: PlayerSlot::One,
            turn: 1,
            policy,
        })
    }

    pub fn is_multiplayer(&self) -> bool {
        self.players.len() > 1
    }

    pub fn active(&self) -> PlayerSlot {
        self.active
    }

    /// Turn counter, starting at 1.
    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    pub fn policy(&self) -> TurnPolicy {
        self.policy
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, slot: PlayerSlot) -> Result<&Player> {
        self.players.get(slot.index()).ok_or(GameError::WrongTurn)
    }

    pub(crate) fn player_mut(&mut self, slot: PlayerSlot) -> Result<&mut Player> {
        self.players.get_mut(slot.index()).ok_or(GameError::WrongTurn)
    }

    pub(crate) fn active_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.active.index()]
    }

    pub fn check_turn(&self, slot: PlayerSlot) -> Result<()> {
        self.player(slot)?;
        if slot == self.active {
            Ok(())
        } else {
            Err(GameError::WrongTurn)
        }
    }

    /// Records a completed action, passing the turn when the policy says so.
    /// Returns whether the turn ended.
    pub(crate) fn complete(&mut self, action: TurnAction) -> bool {
        if !self.policy.ends_turn(action) {
            return false;
        }
        self.advance();
        true
    }

    pub(crate) fn advance(&mut self) -> PlayerSlot {
        self.turn = self.turn.saturating_add(1);
        if self.is_multiplayer() {
            self.active = self.active.other();
        }
        log::trace!("Turn {} goes to {:?}", self.turn, self.active);
        self.active
    }

    /// Single-player only, see [`Player::flag_mode`].
    pub fn toggle_flag_mode(&mut self) -> Result<bool> {
        if self.is_multiplayer() {
            return Err(GameError::InvalidProfile);
        }
        let player = self.active_player_mut();
        player.flag_mode = !player.flag_mode;
        Ok(player.flag_mode)
    }
}
