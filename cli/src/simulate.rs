//! Seeded auto-play of whole sessions.

use anyhow::{Context, Result};
use quizmines_core::*;
use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::autoplay::{self, Move};
use crate::history::EventLog;
use crate::trivia::{Contestant, QuestionBank};

/// Settings shared by every simulated game.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub profile: DifficultyProfile,
    pub players: Vec<PlayerIdentity>,
    pub turn_policy: TurnPolicy,
    pub safe_zone: SafeZone,
    pub contestant: Contestant,
    /// Chance that a question gets put off instead of answered.
    pub defer_rate: f64,
}

/// A finished game.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub summary: SessionSummary,
    pub events: EventLog,
    pub feedback: FeedbackTally,
}

/// Counts feedback events, standing in for a sound player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackTally {
    pub mine_hits: u32,
    pub flags: u32,
    pub bonuses: u32,
    pub penalties: u32,
    pub questions: u32,
    pub correct_answers: u32,
    pub turn_changes: u32,
}

impl FeedbackSink for FeedbackTally {
    fn notify(&mut self, event: Feedback) {
        log::trace!("feedback: {event:?}");
        match event {
            Feedback::MineHit => self.mine_hits += 1,
            Feedback::FlagToggled => self.flags += 1,
            Feedback::Bonus => self.bonuses += 1,
            Feedback::Penalty => self.penalties += 1,
            Feedback::Question => self.questions += 1,
            Feedback::AnswerCorrect => self.correct_answers += 1,
            Feedback::TurnPassed(_) => self.turn_changes += 1,
            Feedback::AnswerWrong | Feedback::Won | Feedback::Lost | Feedback::GaveUp => {}
        }
    }
}

impl Simulation {
    /// Plays one game to the end and archives it into `history`.
    pub fn play(
        &self,
        seed: u64,
        bank: &mut QuestionBank,
        history: &mut impl HistorySink,
    ) -> Result<GameRecord> {
        let config = SessionConfig {
            profile: self.profile.clone(),
            players: self.players.clone(),
            turn_policy: self.turn_policy,
            safe_zone: self.safe_zone,
            seed,
        };
        let mut session = GameSession::new(config).context("Could not set up session")?;
        let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed_cafe);
        let mut feedback = FeedbackTally::default();

        session.start()?;
        // Every move uncovers or flags a cell, deferrals aside.
        let max_steps = usize::from(self.profile.board_config().total_cells()) * 4;
        let mut steps = 0;

        while session.state() == SessionState::InProgress {
            steps += 1;
            if steps > max_steps {
                log::warn!("Seed {seed}: no end after {max_steps} steps, giving up");
                session.give_up(session.active_player())?.dispatch(&mut feedback);
                break;
            }

            let player = session.active_player();
            let report = if session.pending_question().is_some() {
                if rng.random_bool(self.defer_rate) {
                    session.defer_question(player)?
                } else {
                    let question = bank.next_question();
                    let answer = self.contestant.answer(question, &mut rng);
                    log::debug!(
                        "{:?} answers {:?} to {:?}: {}",
                        player,
                        answer.given,
                        question.prompt,
                        if answer.correct { "right" } else { "wrong" }
                    );
                    session.answer_question(player, answer.correct)?
                }
            } else {
                match autoplay::next_move(&session.snapshot(), &mut rng) {
                    Some(Move::Reveal(coords)) => session.reveal(player, coords)?,
                    Some(Move::Flag(coords)) => session.toggle_flag(player, coords)?,
                    None => {
                        log::warn!("Seed {seed}: no move left on a running game");
                        session.give_up(player)?
                    }
                }
            };
            report.dispatch(&mut feedback);
        }

        let summary = session.archive(history)?;
        let events = EventLog {
            seed,
            profile: self.profile.clone(),
            players: self.players.len(),
            events: session.event_log().to_vec(),
        };
        Ok(GameRecord {
            summary,
            events,
            feedback,
        })
    }
}
