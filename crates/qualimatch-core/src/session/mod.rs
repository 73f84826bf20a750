//! Session orchestration over a bank, a store, and a clock.
//!
//! A [`Session`] is scoped to one participant and one seed. All persisted
//! state goes through [`KvStore`], so the same flows run against a JSON file
//! in the CLI and an in-memory map in tests.

mod build;
mod practice;
mod quiz;

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

pub use build::{AlignmentCheck, DraftEdit};
pub use practice::{PracticeOutcome, Verdict};
pub use quiz::{Card, QuizView};

use crate::error::SessionError;
use crate::inference::Thresholds;
use crate::model::{Bank, Phase};
use crate::rng::normalize_seed;
use crate::store::{read_json, write_json, KvStore, ANON, PID_KEY};

/// Longest participant id kept after normalisation.
pub const MAX_PID_LEN: usize = 64;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Trim, replace whitespace runs with `_`, and cap the length.
pub fn normalize_pid(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(MAX_PID_LEN)
        .collect()
}

/// Participant and seed a session is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub seed: String,
    /// `None` until the learner enters a participant id.
    pub pid: Option<String>,
}

impl SessionContext {
    pub fn new(seed: Option<&str>, pid: Option<&str>) -> Self {
        Self {
            seed: normalize_seed(seed),
            pid: pid.map(normalize_pid).filter(|p| !p.is_empty()),
        }
    }

    /// The participant id used in storage keys.
    pub fn pid_or_anon(&self) -> &str {
        self.pid.as_deref().unwrap_or(ANON)
    }

    /// The participant id, required for scoring and saving.
    pub fn participant(&self) -> Result<&str, SessionError> {
        self.pid.as_deref().ok_or(SessionError::MissingParticipant)
    }
}

/// The participant id remembered in the store, if any.
pub fn stored_participant(store: &dyn KvStore) -> Option<String> {
    read_json::<String>(store, PID_KEY)
        .map(|p| normalize_pid(&p))
        .filter(|p| !p.is_empty())
}

/// One learner's session.
pub struct Session<'a> {
    bank: &'a Bank,
    store: &'a mut dyn KvStore,
    clock: &'a dyn Clock,
    ctx: SessionContext,
    thresholds: Thresholds,
}

impl<'a> Session<'a> {
    pub fn new(
        bank: &'a Bank,
        store: &'a mut dyn KvStore,
        clock: &'a dyn Clock,
        ctx: SessionContext,
    ) -> Self {
        Self {
            bank,
            store,
            clock,
            ctx,
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn bank(&self) -> &'a Bank {
        self.bank
    }

    pub fn seed(&self) -> &str {
        &self.ctx.seed
    }

    /// Remember a participant id and carry over any anonymous quiz state for
    /// the current seed. Returns the normalised id.
    pub fn set_participant(&mut self, raw: &str) -> Result<String, SessionError> {
        let pid = normalize_pid(raw);
        if pid.is_empty() {
            return Err(SessionError::MissingParticipant);
        }
        write_json(self.store, PID_KEY, &pid)?;
        self.ctx.pid = Some(pid.clone());
        for phase in [Phase::Pretest, Phase::Posttest] {
            self.migrate_anonymous(phase)?;
        }
        tracing::info!(pid = %pid, seed = %self.ctx.seed, "participant set");
        Ok(pid)
    }

    /// Forget the remembered participant id. Stored progress is kept.
    pub fn clear_participant(&mut self) -> Result<(), SessionError> {
        self.store.delete(PID_KEY)?;
        self.ctx.pid = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::builtin_bank;
    use crate::store::{keys, MemoryStore};

    #[test]
    fn pid_normalisation() {
        assert_eq!(normalize_pid("  Alex   Cruz \t"), "Alex_Cruz");
        assert_eq!(normalize_pid("   "), "");
        let long = "x".repeat(100);
        assert_eq!(normalize_pid(&long).len(), MAX_PID_LEN);
    }

    #[test]
    fn context_defaults() {
        let ctx = SessionContext::new(Some("  "), Some("  "));
        assert_eq!(ctx.seed, "default");
        assert_eq!(ctx.pid, None);
        assert_eq!(ctx.pid_or_anon(), ANON);
        assert!(matches!(ctx.participant(), Err(SessionError::MissingParticipant)));

        let ctx = SessionContext::new(Some(" s1 "), Some("Alex Cruz"));
        assert_eq!(ctx.seed, "s1");
        assert_eq!(ctx.participant().unwrap(), "Alex_Cruz");
    }

    #[test]
    fn fixed_clock_advances() {
        let start = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = FixedClock::new(start);
        clock.advance(Duration::milliseconds(1500));
        assert_eq!((clock.now() - start).num_milliseconds(), 1500);
    }

    #[test]
    fn set_participant_remembers_and_migrates() {
        let bank = builtin_bank().unwrap();
        let clock = SystemClock;
        let mut store = MemoryStore::new();
        store
            .set(&keys::progress(Phase::Pretest, ANON, "default"), "{}".into())
            .unwrap();

        let mut session = Session::new(&bank, &mut store, &clock, SessionContext::new(None, None));
        assert!(session.set_participant("   ").is_err());
        assert_eq!(session.set_participant(" alex ").unwrap(), "alex");
        assert_eq!(session.context().pid.as_deref(), Some("alex"));

        assert_eq!(stored_participant(&store).as_deref(), Some("alex"));
        assert!(store.contains(&keys::progress(Phase::Pretest, "alex", "default")));
    }

    #[test]
    fn clear_participant_forgets_id() {
        let bank = builtin_bank().unwrap();
        let clock = SystemClock;
        let mut store = MemoryStore::new();
        let mut session = Session::new(&bank, &mut store, &clock, SessionContext::new(None, None));
        session.set_participant("alex").unwrap();
        session.clear_participant().unwrap();
        assert_eq!(session.context().pid, None);
        assert_eq!(stored_participant(&store), None);
    }
}
