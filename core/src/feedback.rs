use serde::{Deserialize, Serialize};

use crate::*;

/// Named game events for sound or other fire-and-forget feedback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    MineHit,
    FlagToggled,
    Bonus,
    Penalty,
    Question,
    AnswerCorrect,
    AnswerWrong,
    TurnPassed(PlayerSlot),
    Won,
    Lost,
    GaveUp,
}

pub trait FeedbackSink {
    fn notify(&mut self, event: Feedback);
}

impl FeedbackSink for Vec<Feedback> {
    fn notify(&mut self, event: Feedback) {
        self.push(event);
    }
}

/// Drops everything.
impl FeedbackSink for () {
    fn notify(&mut self, _event: Feedback) {}
}

/// Receives the summary of a finished session. Nothing is ever read back.
pub trait HistorySink {
    fn record(&mut self, summary: &SessionSummary);
}

impl HistorySink for Vec<SessionSummary> {
    fn record(&mut self, summary: &SessionSummary) {
        self.push(summary.clone());
    }
}
