use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Lifecycle of a session.
///
/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won | LostNoLives | GaveUp
/// - Won | LostNoLives | GaveUp -> Archived
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress,
    Won,
    LostNoLives,
    GaveUp,
    Archived,
}

impl SessionState {
    /// Game over, waiting to be archived.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::LostNoLives | Self::GaveUp)
    }

    pub const fn is_finished(self) -> bool {
        self.is_terminal() || matches!(self, Self::Archived)
    }

    pub const fn end_reason(self) -> Option<EndReason> {
        match self {
            Self::Won => Some(EndReason::Won),
            Self::LostNoLives => Some(EndReason::LostNoLives),
            Self::GaveUp => Some(EndReason::GaveUp),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Won,
    LostNoLives,
    GaveUp,
}

impl From<EndReason> for SessionState {
    fn from(reason: EndReason) -> Self {
        match reason {
            EndReason::Won => Self::Won,
            EndReason::LostNoLives => Self::LostNoLives,
            EndReason::GaveUp => Self::GaveUp,
        }
    }
}

/// Inputs for a new session, supplied by whoever sets the game up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub profile: DifficultyProfile,
    pub players: Vec<PlayerIdentity>,
    #[serde(default)]
    pub turn_policy: TurnPolicy,
    #[serde(default)]
    pub safe_zone: SafeZone,
    /// Seed for board generation.
    pub seed: u64,
}

impl SessionConfig {
    pub fn single(profile: DifficultyProfile, player: PlayerIdentity, seed: u64) -> Self {
        Self {
            profile,
            players: vec![player],
            turn_policy: TurnPolicy::default(),
            safe_zone: SafeZone::default(),
            seed,
        }
    }

    pub fn versus(
        profile: DifficultyProfile,
        first: PlayerIdentity,
        second: PlayerIdentity,
        seed: u64,
    ) -> Self {
        Self {
            players: vec![first, second],
            ..Self::single(profile, PlayerIdentity::default(), seed)
        }
    }
}

/// A question cell waiting for the trivia collaborator's verdict.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuestion {
    pub coords: Coord2,
    pub player: PlayerSlot,
}

/// Final standing of one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub identity: PlayerIdentity,
    pub score: i32,
    pub lives: u8,
    pub lives_cap: u8,
}

/// Handed to the history collaborator once a session is over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub players: Vec<PlayerResult>,
    pub difficulty: String,
    pub elapsed_secs: u64,
    pub end_reason: EndReason,
    pub winner: Option<PlayerSlot>,
    pub turns: u32,
}

/// Result of one accepted player action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReport {
    /// Who acted.
    pub player: PlayerSlot,
    pub reveal: Option<RevealReport>,
    pub flag: Option<FlagOutcome>,
    /// Ledger events booked by this action.
    pub events: SmallVec<[LedgerEvent; 2]>,
    /// Score and lives change after clamping.
    pub delta: Delta,
    /// A question the now-active player has to answer before anything else.
    pub awaiting_answer: Option<PendingQuestion>,
    pub state: SessionState,
    /// Whose turn it is after the action.
    pub active_player: PlayerSlot,
    pub turn_passed: bool,
    pub feedback: SmallVec<[Feedback; 4]>,
}

impl ActionReport {
    fn new(player: PlayerSlot) -> Self {
        Self {
            player,
            reveal: None,
            flag: None,
            events: SmallVec::new(),
            delta: Delta::ZERO,
            awaiting_answer: None,
            state: SessionState::InProgress,
            active_player: player,
            turn_passed: false,
            feedback: SmallVec::new(),
        }
    }

    /// Forwards the feedback events of this action.
    pub fn dispatch(&self, sink: &mut impl FeedbackSink) {
        for &event in &self.feedback {
            sink.notify(event);
        }
    }
}

/// One game from setup to archive.
///
/// Owns its grid, players and timer. Every operation validates before it
/// mutates, so a failed call leaves the session as it was.
#[derive(Clone, Debug)]
pub struct GameSession<C: Clock = SystemClock> {
    profile: DifficultyProfile,
    safe_zone: SafeZone,
    seed: u64,
    grid: Option<Grid>,
    turns: TurnController,
    timer: GameTimer,
    clock: C,
    state: SessionState,
    pending: Option<PendingQuestion>,
    event_log: Vec<LoggedEvent>,
    summary: Option<SessionSummary>,
}

impl GameSession<SystemClock> {
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> GameSession<C> {
    pub fn with_clock(config: SessionConfig, clock: C) -> Result<Self> {
        config.profile.validate(config.safe_zone)?;

        let players = config
            .players
            .into_iter()
            .map(|identity| Player::new(identity, &config.profile))
            .collect();
        let turns = TurnController::new(players, config.turn_policy)?;

        Ok(Self {
            profile: config.profile,
            safe_zone: config.safe_zone,
            seed: config.seed,
            grid: None,
            turns,
            timer: GameTimer::new(),
            clock,
            state: SessionState::NotStarted,
            pending: None,
            event_log: Vec::new(),
            summary: None,
        })
    }

    /// Uses an already laid out grid instead of generating one on the first
    /// reveal. Its size and populations must be those of the profile.
    pub fn with_grid(mut self, grid: Grid) -> Result<Self> {
        if self.state != SessionState::NotStarted {
            return Err(GameError::NotInProgress);
        }
        let expected = self.profile.board_config();
        if grid.size() != expected.size
            || grid.mine_count() != expected.mines
            || grid.special_counts() != expected.specials
        {
            log::debug!(
                "Preset grid {:?} with {} mines does not fit profile {}",
                grid.size(),
                grid.mine_count(),
                self.profile.name
            );
            return Err(GameError::InvalidBoardShape);
        }
        self.grid = Some(grid);
        Ok(self)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// `None` until the first reveal lays out the board.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn players(&self) -> &[Player] {
        self.turns.players()
    }

    pub fn player(&self, slot: PlayerSlot) -> Result<&Player> {
        self.turns.player(slot)
    }

    pub fn active_player(&self) -> PlayerSlot {
        self.turns.active()
    }

    pub fn turn_number(&self) -> u32 {
        self.turns.turn_number()
    }

    pub fn pending_question(&self) -> Option<PendingQuestion> {
        self.pending
    }

    pub fn event_log(&self) -> &[LoggedEvent] {
        &self.event_log
    }

    /// Available from the moment the session ends.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_at(self.clock.now()).as_secs()
    }

    /// Elapsed time formatted for a timer display.
    pub fn timer_display(&self) -> String {
        format_elapsed(self.elapsed_secs())
    }

    pub fn remaining_mines_estimate(&self) -> isize {
        self.grid
            .as_ref()
            .map_or(self.profile.mines as isize, Grid::remaining_mines_estimate)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        match &self.grid {
            None => BoardSnapshot::untouched(self.profile.size(), self.profile.mines),
            Some(grid) if self.state.is_finished() => BoardSnapshot::with_mines_shown(grid),
            Some(grid) => BoardSnapshot::from_grid(grid),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::NotStarted {
            return Err(GameError::NotInProgress);
        }
        self.timer.start_at(self.clock.now());
        self.state = SessionState::InProgress;
        log::debug!(
            "Session started: {} with {} player(s)",
            self.profile.name,
            self.turns.players().len()
        );
        Ok(())
    }

    pub fn pause_timer(&mut self) -> Result<()> {
        self.check_in_progress()?;
        self.timer.pause_at(self.clock.now());
        Ok(())
    }

    pub fn resume_timer(&mut self) -> Result<()> {
        self.check_in_progress()?;
        self.timer.resume_at(self.clock.now());
        Ok(())
    }

    /// Single-player flag mode switch; does not touch the game state.
    pub fn toggle_flag_mode(&mut self) -> Result<bool> {
        self.turns.toggle_flag_mode()
    }

    pub fn reveal(&mut self, player: PlayerSlot, coords: Coord2) -> Result<ActionReport> {
        self.check_action(player)?;

        if self.grid.is_none() {
            let generator = RandomBoardGenerator::new(self.seed, coords, self.safe_zone);
            self.grid = Some(generator.generate(self.profile.board_config())?);
        }
        let Some(grid) = self.grid.as_mut() else {
            return Err(GameError::InvalidBoardShape);
        };
        let reveal = reveal::reveal(grid, coords)?;

        let mut report = ActionReport::new(player);
        match reveal.outcome {
            RevealOutcome::Safe => {
                self.book(&mut report, LedgerEvent::CellsRevealed(reveal.plain_cells()))
            }
            RevealOutcome::MineHit => {
                report.feedback.push(Feedback::MineHit);
                self.book(&mut report, LedgerEvent::MineHit);
            }
            RevealOutcome::Bonus => {
                report.feedback.push(Feedback::Bonus);
                self.book(&mut report, LedgerEvent::Bonus);
            }
            RevealOutcome::Penalty => {
                report.feedback.push(Feedback::Penalty);
                self.book(&mut report, LedgerEvent::Penalty);
            }
            RevealOutcome::Question => {
                report.feedback.push(Feedback::Question);
                self.pending = Some(PendingQuestion { coords, player });
            }
        }

        let action = TurnAction::Reveal {
            cascaded: reveal.cascaded(),
            mine_hit: reveal.outcome == RevealOutcome::MineHit,
        };
        report.reveal = Some(reveal);
        self.settle(&mut report, action);
        Ok(report)
    }

    pub fn toggle_flag(&mut self, player: PlayerSlot, coords: Coord2) -> Result<ActionReport> {
        self.check_action(player)?;

        let Some(grid) = &mut self.grid else {
            return if in_bounds(coords, self.profile.size()) {
                Err(GameError::InvalidCell)
            } else {
                Err(GameError::OutOfBounds)
            };
        };
        let flag = reveal::toggle_flag(grid, coords)?;

        let mut report = ActionReport::new(player);
        report.flag = Some(flag);
        report.feedback.push(Feedback::FlagToggled);
        self.settle(&mut report, TurnAction::Flag);
        Ok(report)
    }

    /// Resolves the active question with the trivia verdict.
    pub fn answer_question(&mut self, player: PlayerSlot, correct: bool) -> Result<ActionReport> {
        let question = self.check_question(player)?;
        let grid = self.grid.as_mut().ok_or(GameError::NoPendingQuestion)?;
        reveal::settle_question(grid, question.coords)?;
        self.pending = None;

        let mut report = ActionReport::new(player);
        report.feedback.push(if correct {
            Feedback::AnswerCorrect
        } else {
            Feedback::AnswerWrong
        });
        self.book(&mut report, LedgerEvent::QuestionAnswered { correct });
        self.settle(&mut report, TurnAction::Answer);
        Ok(report)
    }

    /// Puts the active question off until this player's next turn.
    pub fn defer_question(&mut self, player: PlayerSlot) -> Result<ActionReport> {
        let question = self.check_question(player)?;
        self.turns.player_mut(player)?.defer(question.coords);
        self.pending = None;
        log::debug!("{:?} deferred question at {:?}", player, question.coords);

        let mut report = ActionReport::new(player);
        self.settle(&mut report, TurnAction::Defer);
        Ok(report)
    }

    /// Abandons the game. Any seated player may quit at any time while the
    /// game is running.
    pub fn give_up(&mut self, player: PlayerSlot) -> Result<ActionReport> {
        self.check_in_progress()?;
        self.turns.player(player)?;

        let mut report = ActionReport::new(player);
        self.finish(EndReason::GaveUp, Some(player));
        report.feedback.push(Feedback::GaveUp);
        report.state = self.state;
        report.active_player = self.turns.active();
        Ok(report)
    }

    /// Hands the summary to the history collaborator and retires the session.
    pub fn archive(&mut self, sink: &mut impl HistorySink) -> Result<SessionSummary> {
        if !self.state.is_terminal() {
            return Err(GameError::NotFinished);
        }
        let summary = self.summary.clone().ok_or(GameError::NotFinished)?;
        sink.record(&summary);
        self.state = SessionState::Archived;
        log::debug!("Session archived after {} turns", summary.turns);
        Ok(summary)
    }

    fn check_in_progress(&self) -> Result<()> {
        if self.state == SessionState::InProgress {
            Ok(())
        } else {
            Err(GameError::NotInProgress)
        }
    }

    fn check_action(&self, player: PlayerSlot) -> Result<()> {
        self.check_in_progress()?;
        self.turns.check_turn(player)?;
        if self.pending.is_some() {
            return Err(GameError::AwaitingAnswer);
        }
        Ok(())
    }

    fn check_question(&self, player: PlayerSlot) -> Result<PendingQuestion> {
        self.check_in_progress()?;
        self.turns.check_turn(player)?;
        match self.pending {
            Some(question) if question.player == player => Ok(question),
            Some(_) => Err(GameError::WrongTurn),
            None => Err(GameError::NoPendingQuestion),
        }
    }

    /// Applies a ledger event to the acting player and logs it.
    fn book(&mut self, report: &mut ActionReport, event: LedgerEvent) {
        let player = self.turns.active_player_mut();
        let applied = player.stats.apply(&self.profile, event);
        report.events.push(event);
        report.delta = report.delta + applied;
        self.event_log.push(LoggedEvent {
            player: report.player,
            event,
        });
    }

    /// Checks for the end of the game right after the action, then hands the
    /// turn over when the policy says so.
    fn settle(&mut self, report: &mut ActionReport, action: TurnAction) {
        let actor = report.player;
        let out_of_lives = self
            .turns
            .player(actor)
            .is_ok_and(|player| player.stats.is_out_of_lives());
        let cleared = self.grid.as_ref().is_some_and(check_win);

        if out_of_lives {
            let winner = self.turns.is_multiplayer().then(|| actor.other());
            self.finish(EndReason::LostNoLives, winner);
            report.feedback.push(Feedback::Lost);
        } else if cleared {
            self.finish(EndReason::Won, self.leader());
            report.feedback.push(Feedback::Won);
        } else if self.pending.is_none() && self.turns.complete(action) {
            report.turn_passed = true;
            let next = self.turns.active();
            if self.turns.is_multiplayer() {
                report.feedback.push(Feedback::TurnPassed(next));
            }
            self.resume_deferred(next);
        }

        report.state = self.state;
        report.active_player = self.turns.active();
        report.awaiting_answer = self.pending;
    }

    /// Brings back the oldest question `slot` put off, if any.
    fn resume_deferred(&mut self, slot: PlayerSlot) {
        if self.pending.is_some() {
            return;
        }
        if let Ok(player) = self.turns.player_mut(slot) {
            if let Some(coords) = player.take_deferred() {
                log::debug!("{:?} resumes deferred question at {:?}", slot, coords);
                self.pending = Some(PendingQuestion {
                    coords,
                    player: slot,
                });
            }
        }
    }

    /// Player with the best score; ties have no winner.
    fn leader(&self) -> Option<PlayerSlot> {
        match self.turns.players() {
            [_] => Some(PlayerSlot::One),
            [one, two] => match one.stats.score.cmp(&two.stats.score) {
                core::cmp::Ordering::Greater => Some(PlayerSlot::One),
                core::cmp::Ordering::Less => Some(PlayerSlot::Two),
                core::cmp::Ordering::Equal => None,
            },
            _ => None,
        }
    }

    fn finish(&mut self, reason: EndReason, winner_or_quitter: Option<PlayerSlot>) {
        let winner = match reason {
            EndReason::GaveUp if self.turns.is_multiplayer() => {
                winner_or_quitter.map(PlayerSlot::other)
            }
            EndReason::GaveUp => None,
            _ => winner_or_quitter,
        };

        self.timer.stop_at(self.clock.now());
        self.state = reason.into();

        let summary = SessionSummary {
            players: self
                .turns
                .players()
                .iter()
                .map(|player| PlayerResult {
                    identity: player.identity.clone(),
                    score: player.stats.score,
                    lives: player.stats.lives,
                    lives_cap: player.stats.lives_cap,
                })
                .collect(),
            difficulty: self.profile.name.clone(),
            elapsed_secs: self.elapsed_secs(),
            end_reason: reason,
            winner,
            turns: self.turns.turn_number(),
        };
        log::debug!(
            "Session ended: {:?} after {}s, winner {:?}",
            reason,
            summary.elapsed_secs,
            winner
        );
        self.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn profile(rows: &[&str], lives: u8) -> DifficultyProfile {
        let grid = Grid::from_ascii(rows).unwrap();
        let (rows, cols) = grid.size();
        DifficultyProfile {
            name: "Test".into(),
            rows,
            cols,
            mines: grid.mine_count(),
            specials: grid.special_counts(),
            starting_lives: lives,
            reveal_points: 1,
            mine_hit_points: 0,
            bonus_points: 12,
            penalty_points: 12,
            question_points: 10,
        }
    }

    fn session(rows: &[&str], lives: u8, players: usize) -> GameSession<ManualClock> {
        session_with_policy(rows, lives, players, TurnPolicy::EveryAction)
    }

    fn session_with_policy(
        rows: &[&str],
        lives: u8,
        players: usize,
        turn_policy: TurnPolicy,
    ) -> GameSession<ManualClock> {
        let profile = profile(rows, lives);
        let identities = (0..players)
            .map(|i| PlayerIdentity::new(format!("player {}", i + 1)))
            .collect();
        let config = SessionConfig {
            profile,
            players: identities,
            turn_policy,
            safe_zone: SafeZone::Cell,
            seed: 0,
        };
        let mut session = GameSession::with_clock(config, ManualClock::new())
            .unwrap()
            .with_grid(Grid::from_ascii(rows).unwrap())
            .unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn actions_rejected_before_start_and_after_end() {
        let profile = profile(&["*..", "..."], 3);
        let config = SessionConfig {
            safe_zone: SafeZone::Cell,
            ..SessionConfig::single(profile, PlayerIdentity::new("solo"), 1)
        };
        let mut session = GameSession::new(config).unwrap();

        assert_eq!(
            session.reveal(PlayerSlot::One, (1, 2)),
            Err(GameError::NotInProgress)
        );
        session.start().unwrap();
        assert_eq!(session.start(), Err(GameError::NotInProgress));

        session.give_up(PlayerSlot::One).unwrap();
        assert_eq!(session.state(), SessionState::GaveUp);
        assert_eq!(
            session.toggle_flag(PlayerSlot::One, (0, 0)),
            Err(GameError::NotInProgress)
        );
    }

    #[test]
    fn three_mine_hits_end_a_three_life_game() {
        let mut session = session(&["***", "..."], 3, 1);

        let report = session.reveal(PlayerSlot::One, (0, 0)).unwrap();
        assert_eq!(report.delta, Delta::new(0, -1));
        assert_eq!(session.player(PlayerSlot::One).unwrap().stats.lives, 2);
        assert_eq!(session.state(), SessionState::InProgress);

        session.reveal(PlayerSlot::One, (0, 1)).unwrap();
        assert_eq!(session.player(PlayerSlot::One).unwrap().stats.lives, 1);
        assert_eq!(session.state(), SessionState::InProgress);

        let report = session.reveal(PlayerSlot::One, (0, 2)).unwrap();
        assert_eq!(session.player(PlayerSlot::One).unwrap().stats.lives, 0);
        assert_eq!(report.state, SessionState::LostNoLives);
        assert!(report.feedback.contains(&Feedback::Lost));
        assert_eq!(session.summary().unwrap().winner, None);
    }

    #[test]
    fn clearing_the_board_wins() {
        let mut session = session(&["*..", "..."], 3, 1);

        let report = session.reveal(PlayerSlot::One, (0, 2)).unwrap();
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(report.delta.score, 4);

        let report = session.reveal(PlayerSlot::One, (1, 0)).unwrap();
        assert_eq!(report.state, SessionState::Won);
        assert!(report.feedback.contains(&Feedback::Won));

        let summary = session.summary().unwrap();
        assert_eq!(summary.end_reason, EndReason::Won);
        assert_eq!(summary.winner, Some(PlayerSlot::One));
        assert_eq!(summary.players[0].score, 5);
    }

    #[test]
    fn failed_action_leaves_session_untouched() {
        let mut session = session(&["*..", "..."], 3, 1);
        session.reveal(PlayerSlot::One, (1, 2)).unwrap();
        let before = session.snapshot();
        let turn = session.turn_number();

        assert_eq!(
            session.reveal(PlayerSlot::One, (1, 2)),
            Err(GameError::InvalidCell)
        );
        assert_eq!(
            session.reveal(PlayerSlot::One, (7, 7)),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.turn_number(), turn);
        assert_eq!(session.event_log().len(), 1);
    }

    #[test]
    fn question_blocks_actions_until_answered() {
        let mut session = session(&["*?.", "..."], 3, 1);

        let report = session.reveal(PlayerSlot::One, (0, 1)).unwrap();
        assert_eq!(
            report.awaiting_answer,
            Some(PendingQuestion {
                coords: (0, 1),
                player: PlayerSlot::One
            })
        );
        assert!(!report.turn_passed);
        assert_eq!(
            session.reveal(PlayerSlot::One, (1, 2)),
            Err(GameError::AwaitingAnswer)
        );

        let report = session.answer_question(PlayerSlot::One, false).unwrap();
        assert_eq!(report.delta, Delta::new(-10, -1));
        assert_eq!(session.pending_question(), None);
        assert_eq!(
            session.answer_question(PlayerSlot::One, true),
            Err(GameError::NoPendingQuestion)
        );
    }

    #[test]
    fn answering_the_last_question_wins() {
        let mut session = session(&["*?", ".."], 3, 1);
        session.reveal(PlayerSlot::One, (1, 0)).unwrap();
        session.reveal(PlayerSlot::One, (1, 1)).unwrap();

        let report = session.reveal(PlayerSlot::One, (0, 1)).unwrap();
        assert_eq!(report.state, SessionState::InProgress);

        let report = session.answer_question(PlayerSlot::One, true).unwrap();
        assert_eq!(report.state, SessionState::Won);
        // lives were already at the cap
        assert_eq!(report.delta, Delta::new(10, 0));
    }

    #[test]
    fn deferred_question_returns_on_next_turn() {
        let mut session = session(&["*?.", "...", "..."], 3, 2);

        session.reveal(PlayerSlot::One, (0, 1)).unwrap();
        let report = session.defer_question(PlayerSlot::One).unwrap();
        assert!(report.turn_passed);
        assert_eq!(report.active_player, PlayerSlot::Two);
        assert_eq!(report.awaiting_answer, None);

        let report = session.toggle_flag(PlayerSlot::Two, (0, 0)).unwrap();
        assert_eq!(report.active_player, PlayerSlot::One);
        assert_eq!(
            report.awaiting_answer,
            Some(PendingQuestion {
                coords: (0, 1),
                player: PlayerSlot::One
            })
        );
        assert_eq!(
            session.reveal(PlayerSlot::One, (2, 2)),
            Err(GameError::AwaitingAnswer)
        );
        session.answer_question(PlayerSlot::One, true).unwrap();
        assert_eq!(session.active_player(), PlayerSlot::Two);
    }

    #[test]
    fn single_player_deferral_comes_straight_back() {
        let mut session = session(&["*?.", "..."], 3, 1);

        session.reveal(PlayerSlot::One, (0, 1)).unwrap();
        let report = session.defer_question(PlayerSlot::One).unwrap();

        assert_eq!(report.awaiting_answer.map(|q| q.coords), Some((0, 1)));
    }

    #[test]
    fn mine_hit_costs_only_the_active_player_and_passes_turn() {
        let mut session = session(&["*..", "...", "..."], 3, 2);

        assert_eq!(
            session.reveal(PlayerSlot::Two, (0, 0)),
            Err(GameError::WrongTurn)
        );
        let report = session.reveal(PlayerSlot::One, (0, 0)).unwrap();

        assert_eq!(session.player(PlayerSlot::One).unwrap().stats.lives, 2);
        assert_eq!(session.player(PlayerSlot::Two).unwrap().stats.lives, 3);
        assert_eq!(report.active_player, PlayerSlot::Two);
        assert!(report.feedback.contains(&Feedback::TurnPassed(PlayerSlot::Two)));
    }

    #[test]
    fn cascade_policy_keeps_the_turn_in_a_duel() {
        let rows = ["..*.?", "..*..", "***.."];
        let mut session = session_with_policy(&rows, 3, 2, TurnPolicy::ContinueOnCascade);

        let report = session.reveal(PlayerSlot::One, (0, 0)).unwrap();
        assert!(report.reveal.unwrap().cascaded());
        assert!(!report.turn_passed);
        assert_eq!(report.active_player, PlayerSlot::One);

        let report = session.toggle_flag(PlayerSlot::One, (0, 2)).unwrap();
        assert!(!report.turn_passed);
        assert_eq!(report.active_player, PlayerSlot::One);

        let report = session.reveal(PlayerSlot::One, (2, 0)).unwrap();
        assert_eq!(report.reveal.unwrap().outcome, RevealOutcome::MineHit);
        assert_eq!(report.active_player, PlayerSlot::Two);

        session.reveal(PlayerSlot::Two, (0, 4)).unwrap();
        assert_eq!(session.active_player(), PlayerSlot::Two);
        let report = session.defer_question(PlayerSlot::Two).unwrap();
        assert_eq!(report.active_player, PlayerSlot::One);
        assert_eq!(report.awaiting_answer, None);

        // a plain number does not cascade, so the turn and the question go back
        let report = session.reveal(PlayerSlot::One, (0, 3)).unwrap();
        assert!(!report.reveal.unwrap().cascaded());
        assert_eq!(report.active_player, PlayerSlot::Two);
        assert_eq!(
            report.awaiting_answer,
            Some(PendingQuestion {
                coords: (0, 4),
                player: PlayerSlot::Two
            })
        );

        let report = session.answer_question(PlayerSlot::Two, true).unwrap();
        assert_eq!(report.active_player, PlayerSlot::One);

        let report = session.reveal(PlayerSlot::One, (1, 4)).unwrap();
        assert!(report.reveal.unwrap().cascaded());
        assert_eq!(report.state, SessionState::Won);
    }

    #[test]
    fn preset_grid_must_fit_the_profile() {
        let config = SessionConfig {
            safe_zone: SafeZone::Cell,
            ..SessionConfig::single(profile(&["*..", "..."], 3), PlayerIdentity::new("solo"), 0)
        };
        let preset = |rows: &[&str]| {
            GameSession::new(config.clone())
                .unwrap()
                .with_grid(Grid::from_ascii(rows).unwrap())
        };

        let mismatched: [&[&str]; 3] = [&["*...", "...."], &["**.", "..."], &["*?.", "..."]];
        for rows in mismatched {
            assert_eq!(preset(rows).err(), Some(GameError::InvalidBoardShape));
        }

        let session = preset(&["..*", "..."]).unwrap();
        assert_eq!(session.snapshot().remaining_mines, 1);
    }

    #[test]
    fn two_player_loss_names_the_survivor() {
        let mut session = session(&["**.", "..."], 1, 2);

        session.reveal(PlayerSlot::One, (0, 0)).unwrap();

        assert_eq!(session.state(), SessionState::LostNoLives);
        assert_eq!(session.summary().unwrap().winner, Some(PlayerSlot::Two));
    }

    #[test]
    fn giving_up_forfeits_to_the_opponent() {
        let mut session = session(&["*..", "..."], 3, 2);

        session.give_up(PlayerSlot::Two).unwrap();

        assert_eq!(session.summary().unwrap().winner, Some(PlayerSlot::One));
        assert_eq!(
            session.give_up(PlayerSlot::One),
            Err(GameError::NotInProgress)
        );
    }

    #[test]
    fn terminal_state_freezes_timer_and_archives_once() {
        let clock = ManualClock::new();
        let profile = profile(&["*..", "..."], 3);
        let config = SessionConfig {
            safe_zone: SafeZone::Cell,
            ..SessionConfig::single(profile, PlayerIdentity::new("solo"), 9)
        };
        let mut session = GameSession::with_clock(config, clock.clone()).unwrap();
        let mut history: Vec<SessionSummary> = Vec::new();

        assert_eq!(session.archive(&mut history), Err(GameError::NotFinished));
        session.start().unwrap();
        clock.advance(Duration::from_secs(65));
        assert_eq!(session.timer_display(), "01:05");

        session.give_up(PlayerSlot::One).unwrap();
        clock.advance(Duration::from_secs(30));
        assert_eq!(session.elapsed_secs(), 65);

        let summary = session.archive(&mut history).unwrap();
        assert_eq!(summary.elapsed_secs, 65);
        assert_eq!(summary.end_reason, EndReason::GaveUp);
        assert_eq!(history, vec![summary]);
        assert_eq!(session.state(), SessionState::Archived);
        assert_eq!(session.archive(&mut history), Err(GameError::NotFinished));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn first_reveal_generates_a_safe_board() {
        let config = SessionConfig::single(
            Difficulty::Easy.profile(),
            PlayerIdentity::new("solo"),
            1234,
        );
        let mut session = GameSession::new(config).unwrap();
        session.start().unwrap();
        assert_eq!(
            session.toggle_flag(PlayerSlot::One, (0, 0)),
            Err(GameError::InvalidCell)
        );
        assert!(session.grid().is_none());

        let report = session.reveal(PlayerSlot::One, (4, 4)).unwrap();

        let reveal = report.reveal.unwrap();
        assert_eq!(reveal.outcome, RevealOutcome::Safe);
        assert!(reveal.cascaded());
        assert_eq!(session.grid().unwrap().mine_count(), 10);
    }

    #[test]
    fn flag_mode_does_not_touch_game_state() {
        let mut session = session(&["*..", "..."], 3, 1);
        let before = session.snapshot();

        assert_eq!(session.toggle_flag_mode(), Ok(true));

        assert_eq!(session.snapshot(), before);
        assert_eq!(session.turn_number(), 1);
    }
}
