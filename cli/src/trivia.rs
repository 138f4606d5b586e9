//! Question bank and a simulated contestant that answers from it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

const DEFAULT_QUESTIONS: &str = include_str!("../questions.toml");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub answer: String,
    /// Multiple-choice options, the answer among them. Empty for open
    /// questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl Question {
    pub fn is_correct(&self, given: &str) -> bool {
        given.trim().eq_ignore_ascii_case(self.answer.trim())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuestionBank {
    #[serde(rename = "question")]
    questions: Vec<Question>,
    #[serde(skip)]
    next: usize,
}

impl QuestionBank {
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_QUESTIONS).context("Built-in question bank is broken")
    }

    pub fn parse(text: &str) -> Result<Self> {
        let bank: Self = toml::from_str(text).context("Invalid question bank")?;
        ensure!(!bank.questions.is_empty(), "Question bank has no questions");
        for question in &bank.questions {
            if question.answer.trim().is_empty() {
                bail!("Question {:?} has no answer", question.prompt);
            }
            if !question.choices.is_empty()
                && !question.choices.iter().any(|choice| question.is_correct(choice))
            {
                bail!("Answer of {:?} is not among its choices", question.prompt);
            }
        }
        Ok(bank)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Could not load {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Cycles through the bank in file order.
    pub fn next_question(&mut self) -> &Question {
        let index = self.next % self.questions.len();
        self.next = self.next.wrapping_add(1);
        &self.questions[index]
    }
}

/// What the contestant said and whether it counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    pub given: String,
    pub correct: bool,
}

/// Knows the right answer with a fixed probability and guesses otherwise.
#[derive(Copy, Clone, Debug)]
pub struct Contestant {
    accuracy: f64,
}

impl Contestant {
    pub fn new(accuracy: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&accuracy),
            "Accuracy must be between 0 and 1, got {accuracy}"
        );
        Ok(Self { accuracy })
    }

    pub fn answer<R: Rng + ?Sized>(&self, question: &Question, rng: &mut R) -> Answer {
        let given = if rng.random_bool(self.accuracy) {
            question.answer.clone()
        } else {
            let wrong: Vec<&String> = question
                .choices
                .iter()
                .filter(|choice| !question.is_correct(choice))
                .collect();
            match wrong.choose(rng) {
                Some(choice) => (*choice).clone(),
                None => String::from("no idea"),
            }
        };
        Answer {
            correct: question.is_correct(&given),
            given,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn builtin_bank_is_valid_and_cycles() {
        let mut bank = QuestionBank::builtin().unwrap();
        let count = bank.len();
        assert!(count > 0);

        let first = bank.next_question().clone();
        for _ in 1..count {
            bank.next_question();
        }
        assert_eq!(bank.next_question(), &first);
    }

    #[test]
    fn rejects_answer_missing_from_choices() {
        let text = r#"
[[question]]
prompt = "2 + 2?"
answer = "4"
choices = ["3", "5"]
"#;
        assert!(QuestionBank::parse(text).is_err());
        assert!(QuestionBank::parse("question = []").is_err());
    }

    #[test]
    fn contestant_accuracy_extremes() {
        let question = Question {
            prompt: "Capital of France?".into(),
            answer: "Paris".into(),
            choices: vec!["Lyon".into(), "paris".into()],
        };
        let mut rng = SmallRng::seed_from_u64(3);

        let sure = Contestant::new(1.0).unwrap();
        let clueless = Contestant::new(0.0).unwrap();
        for _ in 0..20 {
            assert!(sure.answer(&question, &mut rng).correct);
            assert_eq!(
                clueless.answer(&question, &mut rng),
                Answer {
                    given: "Lyon".into(),
                    correct: false
                }
            );
        }
        assert!(Contestant::new(1.5).is_err());
    }
}
