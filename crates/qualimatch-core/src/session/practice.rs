use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{Design, Phase, Source};
use crate::record::PracticeAttempt;
use crate::scoring::{ItemScore, Progress};
use crate::store::{keys, read_json_or, write_json};

use super::{Card, Session};

/// Immediate feedback for a practice check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    HalfRight,
    NotYet,
}

impl Verdict {
    pub fn from_points(points: u8) -> Self {
        match points {
            2.. => Verdict::Correct,
            1 => Verdict::HalfRight,
            0 => Verdict::NotYet,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Correct => "Correct",
            Verdict::HalfRight => "Half-right",
            Verdict::NotYet => "Not yet",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of checking one practice card.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeOutcome {
    pub attempt: PracticeAttempt,
    pub verdict: Verdict,
    pub explanation: String,
    pub teacher_note: Option<String>,
}

impl<'a> Session<'a> {
    /// Practice cards in this seed's order, with every option shuffled.
    pub fn practice_cards(&self) -> Vec<Card<'a>> {
        self.cards(Phase::Practice, &Progress::new())
    }

    /// Score one practice answer and append it to the attempt log.
    pub fn check_practice(
        &mut self,
        card_id: &str,
        design: Option<Design>,
        source: Option<Source>,
    ) -> Result<PracticeOutcome, SessionError> {
        let (Some(design), Some(source)) = (design, source) else {
            return Err(SessionError::IncompletePractice);
        };
        let card = self
            .bank
            .find(Phase::Practice, card_id)
            .ok_or_else(|| SessionError::UnknownItem {
                phase: Phase::Practice,
                item_id: card_id.to_string(),
            })?;

        let score = ItemScore::compute(card, design, source);
        let attempt = PracticeAttempt {
            pid: self.ctx.pid_or_anon().to_string(),
            card_id: card.id.clone(),
            chosen_design: design,
            chosen_source: source,
            design_correct: score.design_correct,
            source_correct: score.source_correct,
            points: score.points,
            timestamp: self.clock.now(),
            seed: self.ctx.seed.clone(),
        };

        let key = keys::practice(self.ctx.pid_or_anon(), &self.ctx.seed);
        let mut log: Vec<PracticeAttempt> = read_json_or(&*self.store, &key);
        log.push(attempt.clone());
        write_json(self.store, &key, &log)?;
        tracing::debug!(card = %card.id, points = score.points, attempts = log.len(), "practice attempt logged");

        Ok(PracticeOutcome {
            attempt,
            verdict: Verdict::from_points(score.points),
            explanation: card.explanation.clone(),
            teacher_note: card.teacher_note.clone(),
        })
    }

    /// Every logged attempt, oldest first.
    pub fn practice_attempts(&self) -> Vec<PracticeAttempt> {
        let key = keys::practice(self.ctx.pid_or_anon(), &self.ctx.seed);
        read_json_or(&*self.store, &key)
    }

    /// Attempts for export. Needs a participant id and at least one attempt.
    pub fn practice_export(&self) -> Result<Vec<PracticeAttempt>, SessionError> {
        self.ctx.participant()?;
        let attempts = self.practice_attempts();
        if attempts.is_empty() {
            return Err(SessionError::NoPracticeAttempts);
        }
        Ok(attempts)
    }

    pub fn reset_practice(&mut self) -> Result<(), SessionError> {
        let key = keys::practice(self.ctx.pid_or_anon(), &self.ctx.seed);
        self.store.delete(&key)?;
        tracing::info!(pid = self.ctx.pid_or_anon(), "practice attempts cleared");
        Ok(())
    }
}
