use chrono::{DateTime, Utc};

use crate::error::SessionError;
use crate::model::{Design, Item, Phase, Source};
use crate::ordering::{item_order_rng, option_rng, shuffle, OptionKind};
use crate::record::{QuizItemRow, SubmissionRecord, SubmissionSummary};
use crate::scoring::{score_items, Progress, Selection};
use crate::store::{keys, read_json, read_json_or, write_json, ANON};

use super::Session;

/// One item as presented: shuffled options plus the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Card<'a> {
    pub item: &'a Item,
    pub design_options: Vec<Design>,
    pub source_options: Vec<Source>,
    pub selection: Selection,
}

/// Everything needed to render a quiz phase.
#[derive(Debug, Clone)]
pub struct QuizView<'a> {
    pub phase: Phase,
    pub cards: Vec<Card<'a>>,
    pub elapsed_ms: u64,
    /// Shown again so the learner can still export after a restart.
    pub last: Option<SubmissionRecord>,
}

impl QuizView<'_> {
    pub fn answered(&self) -> usize {
        self.cards.iter().filter(|c| c.selection.is_complete()).count()
    }
}

fn ensure_quiz(phase: Phase) -> Result<(), SessionError> {
    if phase.is_quiz() {
        Ok(())
    } else {
        Err(SessionError::NotAQuiz(phase))
    }
}

impl<'a> Session<'a> {
    /// Items of a phase in this seed's presentation order.
    pub fn ordered_items(&self, phase: Phase) -> Vec<&'a Item> {
        let items: Vec<&'a Item> = self.bank.items(phase).iter().collect();
        shuffle(&items, &mut item_order_rng(&self.ctx.seed, phase))
    }

    /// An item's design and source options in this seed's order.
    pub fn ordered_options(&self, phase: Phase, item: &Item) -> (Vec<Design>, Vec<Source>) {
        let seed = &self.ctx.seed;
        let designs = shuffle(
            &item.design_options(),
            &mut option_rng(seed, phase, &item.id, OptionKind::Design),
        );
        let sources = shuffle(
            &item.source_options(),
            &mut option_rng(seed, phase, &item.id, OptionKind::Source),
        );
        (designs, sources)
    }

    pub(super) fn cards(&self, phase: Phase, progress: &Progress) -> Vec<Card<'a>> {
        self.ordered_items(phase)
            .into_iter()
            .map(|item| {
                let (design_options, source_options) = self.ordered_options(phase, item);
                Card {
                    item,
                    design_options,
                    source_options,
                    selection: progress.get(&item.id).copied().unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Open a quiz phase, starting its timer if it is not running yet.
    pub fn open_quiz(&mut self, phase: Phase) -> Result<QuizView<'a>, SessionError> {
        ensure_quiz(phase)?;
        self.ensure_timer(phase)?;
        let progress = self.progress(phase);
        Ok(QuizView {
            phase,
            cards: self.cards(phase, &progress),
            elapsed_ms: self.elapsed_ms(phase),
            last: self.last_submission(phase),
        })
    }

    /// Current selections for a quiz phase.
    pub fn progress(&self, phase: Phase) -> Progress {
        let key = keys::progress(phase, self.ctx.pid_or_anon(), &self.ctx.seed);
        read_json_or(&*self.store, &key)
    }

    /// Record a choice for one item. Fields left as `None` keep their
    /// current value.
    pub fn select(
        &mut self,
        phase: Phase,
        item_id: &str,
        design: Option<Design>,
        source: Option<Source>,
    ) -> Result<Selection, SessionError> {
        ensure_quiz(phase)?;
        if self.bank.find(phase, item_id).is_none() {
            return Err(SessionError::UnknownItem {
                phase,
                item_id: item_id.to_string(),
            });
        }
        self.ensure_timer(phase)?;

        let mut progress = self.progress(phase);
        let entry = progress.entry(item_id.to_string()).or_default();
        if design.is_some() {
            entry.design = design;
        }
        if source.is_some() {
            entry.source = source;
        }
        let selection = *entry;

        let key = keys::progress(phase, self.ctx.pid_or_anon(), &self.ctx.seed);
        write_json(self.store, &key, &progress)?;
        Ok(selection)
    }

    /// Start the phase timer unless it already runs. Returns the start time.
    pub fn ensure_timer(&mut self, phase: Phase) -> Result<DateTime<Utc>, SessionError> {
        if let Some(start) = self.timer_start(phase) {
            return Ok(start);
        }
        let now = self.clock.now();
        let key = keys::timer(phase, self.ctx.pid_or_anon(), &self.ctx.seed);
        self.store.set(&key, now.timestamp_millis().to_string())?;
        tracing::debug!(%phase, key = %key, "started timer");
        Ok(now)
    }

    fn timer_start(&self, phase: Phase) -> Option<DateTime<Utc>> {
        let key = keys::timer(phase, self.ctx.pid_or_anon(), &self.ctx.seed);
        let raw = self.store.get(&key)?;
        match raw.trim().parse::<i64>().ok().and_then(DateTime::from_timestamp_millis) {
            Some(start) => Some(start),
            None => {
                tracing::warn!(key = %key, "ignoring corrupted timer value");
                None
            }
        }
    }

    /// Milliseconds since the phase timer started; 0 when it has not.
    pub fn elapsed_ms(&self, phase: Phase) -> u64 {
        let Some(start) = self.timer_start(phase) else {
            return 0;
        };
        let elapsed = (self.clock.now() - start).num_milliseconds();
        u64::try_from(elapsed).unwrap_or(0)
    }

    /// Score and persist a quiz submission. A later valid submission replaces
    /// the stored one.
    pub fn submit(&mut self, phase: Phase) -> Result<SubmissionRecord, SessionError> {
        ensure_quiz(phase)?;
        let pid = self.ctx.participant()?.to_string();
        self.migrate_anonymous(phase)?;

        let items = self.ordered_items(phase);
        let progress = self.progress(phase);
        let card = score_items(&items, &progress)?;

        let labels = &self.bank.labels;
        let rows = card
            .items
            .iter()
            .map(|s| QuizItemRow {
                item_id: s.item.id.clone(),
                topic: s.item.topic.clone(),
                rq: s.item.rq.clone(),
                chosen_design: s.design,
                chosen_design_label: labels.design(s.design).to_string(),
                chosen_source: s.source,
                chosen_source_label: labels.source(s.source).to_string(),
                correct_design: s.item.correct_design,
                correct_source: s.item.correct_source,
                design_correct: s.score.design_correct,
                source_correct: s.score.source_correct,
                points: s.score.points,
            })
            .collect();

        let record = SubmissionRecord {
            rows,
            summary: SubmissionSummary {
                pid: pid.clone(),
                phase,
                seed: self.ctx.seed.clone(),
                total_points: card.totals.total_points,
                max_points: card.totals.max_points,
                percent: card.totals.percent,
                elapsed_ms: self.elapsed_ms(phase),
                timestamp: self.clock.now(),
            },
        };

        let key = keys::last(phase, &pid, &self.ctx.seed);
        write_json(self.store, &key, &record)?;
        tracing::info!(
            %phase,
            pid = %pid,
            seed = %self.ctx.seed,
            total = record.summary.total_points,
            max = record.summary.max_points,
            "submission saved"
        );
        Ok(record)
    }

    /// The stored submission for a phase, if any.
    pub fn last_submission(&self, phase: Phase) -> Option<SubmissionRecord> {
        let key = keys::last(phase, self.ctx.pid_or_anon(), &self.ctx.seed);
        read_json(&*self.store, &key)
    }

    /// The stored submission, or an error naming the phase.
    pub fn quiz_export(&self, phase: Phase) -> Result<SubmissionRecord, SessionError> {
        ensure_quiz(phase)?;
        self.last_submission(phase)
            .ok_or(SessionError::NoSubmission(phase))
    }

    /// Clear progress, the last submission, and the timer for a phase.
    pub fn reset_quiz(&mut self, phase: Phase) -> Result<(), SessionError> {
        ensure_quiz(phase)?;
        let (pid, seed) = (self.ctx.pid_or_anon(), self.ctx.seed.as_str());
        let doomed = [
            keys::progress(phase, pid, seed),
            keys::last(phase, pid, seed),
            keys::timer(phase, pid, seed),
        ];
        for key in &doomed {
            self.store.delete(key)?;
        }
        tracing::info!(%phase, pid, seed, "quiz reset");
        Ok(())
    }

    /// Copy anonymous progress, timer, and last result for a phase to the
    /// current participant. Existing participant keys are never overwritten.
    /// Returns how many keys were copied.
    pub fn migrate_anonymous(&mut self, phase: Phase) -> Result<usize, SessionError> {
        let Some(pid) = self.ctx.pid.clone() else {
            return Ok(0);
        };
        if pid == ANON {
            return Ok(0);
        }
        let seed = self.ctx.seed.clone();
        let key_fns: [fn(Phase, &str, &str) -> String; 3] = [keys::progress, keys::timer, keys::last];

        let mut copied = 0;
        for key_fn in key_fns {
            let from = key_fn(phase, ANON, &seed);
            let to = key_fn(phase, &pid, &seed);
            if let Some(value) = self.store.get(&from) {
                if !self.store.contains(&to) {
                    self.store.set(&to, value)?;
                    copied += 1;
                }
            }
        }
        if copied > 0 {
            tracing::info!(%phase, pid = %pid, copied, "migrated anonymous state");
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::bank::builtin_bank;
    use crate::model::Bank;
    use crate::session::{FixedClock, SessionContext};
    use crate::store::{KvStore, MemoryStore};

    fn clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn answer_all(session: &mut Session<'_>, bank: &Bank, phase: Phase, correct: bool) {
        for item in bank.items(phase) {
            let (design, source) = if correct {
                (item.correct_design, item.correct_source)
            } else {
                (item.distractor_designs[0], item.distractor_sources[0])
            };
            session.select(phase, &item.id, Some(design), None).unwrap();
            session.select(phase, &item.id, None, Some(source)).unwrap();
        }
    }

    #[test]
    fn all_correct_pretest_scores_full_marks() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        let ctx = SessionContext::new(Some("default"), Some("alex"));
        let mut session = Session::new(&bank, &mut store, &clock, ctx);

        session.open_quiz(Phase::Pretest).unwrap();
        answer_all(&mut session, &bank, Phase::Pretest, true);
        clock.advance(Duration::seconds(90));

        let record = session.submit(Phase::Pretest).unwrap();
        assert_eq!(record.summary.total_points, 20);
        assert_eq!(record.summary.max_points, 20);
        assert_eq!(record.summary.percent, 100);
        assert_eq!(record.summary.elapsed_ms, 90_000);
        assert_eq!(record.rows.len(), 10);
        assert!(record.rows.iter().all(|r| r.points == 2));

        let order: Vec<&str> = session
            .ordered_items(Phase::Pretest)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        let rows: Vec<&str> = record.rows.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(order, rows);

        assert_eq!(session.last_submission(Phase::Pretest), Some(record));
        assert!(store.contains("qm_last_pretest_alex_default"));
    }

    #[test]
    fn all_wrong_posttest_scores_zero() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        let mut session =
            Session::new(&bank, &mut store, &clock, SessionContext::new(None, Some("bea")));
        answer_all(&mut session, &bank, Phase::Posttest, false);
        let record = session.submit(Phase::Posttest).unwrap();
        assert_eq!(record.summary.total_points, 0);
        assert_eq!(record.summary.percent, 0);
    }

    #[test]
    fn submit_requires_participant() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        let mut session = Session::new(&bank, &mut store, &clock, SessionContext::new(None, None));
        answer_all(&mut session, &bank, Phase::Pretest, true);
        assert!(matches!(
            session.submit(Phase::Pretest),
            Err(SessionError::MissingParticipant)
        ));
    }

    #[test]
    fn incomplete_submission_is_refused_and_nothing_saved() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        let mut session =
            Session::new(&bank, &mut store, &clock, SessionContext::new(None, Some("alex")));
        let first = &bank.pretest[0];
        session
            .select(Phase::Pretest, &first.id, Some(first.correct_design), None)
            .unwrap();

        match session.submit(Phase::Pretest) {
            Err(SessionError::IncompleteSubmission {
                missing_design,
                missing_source,
            }) => {
                assert_eq!(missing_design.len(), 9);
                assert_eq!(missing_source.len(), 10);
                assert!(!missing_design.contains(&first.id));
            }
            other => panic!("expected incomplete submission, got {other:?}"),
        }
        assert_eq!(session.last_submission(Phase::Pretest), None);
    }

    #[test]
    fn resubmission_replaces_record() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        let mut session =
            Session::new(&bank, &mut store, &clock, SessionContext::new(None, Some("alex")));
        answer_all(&mut session, &bank, Phase::Pretest, false);
        assert_eq!(session.submit(Phase::Pretest).unwrap().summary.total_points, 0);
        answer_all(&mut session, &bank, Phase::Pretest, true);
        session.submit(Phase::Pretest).unwrap();
        let last = session.quiz_export(Phase::Pretest).unwrap();
        assert_eq!(last.summary.total_points, 20);
    }

    #[test]
    fn ordering_is_stable_per_seed() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut a = MemoryStore::new();
        let mut b = MemoryStore::new();
        let s1 = Session::new(&bank, &mut a, &clock, SessionContext::new(Some("s1"), None));
        let s2 = Session::new(&bank, &mut b, &clock, SessionContext::new(Some("s1"), Some("x")));
        assert_eq!(s1.ordered_items(Phase::Posttest), s2.ordered_items(Phase::Posttest));
        let item = &bank.posttest[3];
        assert_eq!(
            s1.ordered_options(Phase::Posttest, item),
            s2.ordered_options(Phase::Posttest, item)
        );
        let (designs, sources) = s1.ordered_options(Phase::Posttest, item);
        assert!(designs.contains(&item.correct_design));
        assert!(sources.contains(&item.correct_source));
        assert_eq!(designs.len(), 1 + item.distractor_designs.len());
    }

    #[test]
    fn select_merges_and_validates() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        let mut session = Session::new(&bank, &mut store, &clock, SessionContext::new(None, None));
        let id = bank.pretest[2].id.clone();

        session
            .select(Phase::Pretest, &id, Some(Design::Ethnography), None)
            .unwrap();
        let sel = session
            .select(Phase::Pretest, &id, None, Some(Source::Observation))
            .unwrap();
        assert_eq!(sel.design, Some(Design::Ethnography));
        assert_eq!(sel.source, Some(Source::Observation));

        assert!(matches!(
            session.select(Phase::Pretest, "nope", Some(Design::Ethnography), None),
            Err(SessionError::UnknownItem { .. })
        ));
        assert!(matches!(
            session.select(Phase::Practice, &id, None, None),
            Err(SessionError::NotAQuiz(Phase::Practice))
        ));
    }

    #[test]
    fn timer_survives_reopen_and_clears_on_reset() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        let mut session =
            Session::new(&bank, &mut store, &clock, SessionContext::new(None, Some("alex")));
        session.open_quiz(Phase::Posttest).unwrap();
        clock.advance(Duration::seconds(30));
        let view = session.open_quiz(Phase::Posttest).unwrap();
        assert_eq!(view.elapsed_ms, 30_000);
        assert_eq!(view.cards.len(), 10);
        assert_eq!(view.answered(), 0);

        session.reset_quiz(Phase::Posttest).unwrap();
        assert_eq!(session.elapsed_ms(Phase::Posttest), 0);
        assert!(session.progress(Phase::Posttest).is_empty());
    }

    #[test]
    fn corrupted_progress_reads_as_empty() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        store
            .set("qm_prog_pretest_alex_default", "not json".into())
            .unwrap();
        store.set("qm_timer_pretest_alex_default", "soon".into()).unwrap();
        let session =
            Session::new(&bank, &mut store, &clock, SessionContext::new(None, Some("alex")));
        assert!(session.progress(Phase::Pretest).is_empty());
        assert_eq!(session.elapsed_ms(Phase::Pretest), 0);
    }

    #[test]
    fn anonymous_progress_migrates_without_overwriting() {
        let bank = builtin_bank().unwrap();
        let clock = clock();
        let mut store = MemoryStore::new();
        {
            let mut anon =
                Session::new(&bank, &mut store, &clock, SessionContext::new(None, None));
            anon.open_quiz(Phase::Pretest).unwrap();
            answer_all(&mut anon, &bank, Phase::Pretest, true);
        }
        store
            .set("qm_timer_pretest_alex_default", "0".into())
            .unwrap();

        let mut session =
            Session::new(&bank, &mut store, &clock, SessionContext::new(None, Some("alex")));
        assert_eq!(session.migrate_anonymous(Phase::Pretest).unwrap(), 1);
        assert_eq!(session.progress(Phase::Pretest).len(), 10);
        assert_eq!(session.migrate_anonymous(Phase::Pretest).unwrap(), 0);
        assert_eq!(
            store.get("qm_timer_pretest_alex_default").as_deref(),
            Some("0")
        );
    }
}
