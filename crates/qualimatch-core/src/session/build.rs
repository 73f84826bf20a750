use crate::error::SessionError;
use crate::feedback::{compose, AlignmentInput, Feedback};
use crate::inference::{analyze, Analysis};
use crate::model::{Design, Source};
use crate::record::{BuildDraft, BuildRecord};
use crate::store::{keys, read_json, read_json_or, write_json};

use super::Session;

/// Changes to apply to the build draft. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct DraftEdit {
    pub topic: Option<String>,
    pub rq: Option<String>,
    pub design: Option<Design>,
    pub source: Option<Source>,
}

/// Outcome of an alignment check, tied to the draft it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentCheck {
    pub draft: BuildDraft,
    pub analysis: Analysis,
    pub feedback: Feedback,
}

impl AlignmentCheck {
    /// True when this check was computed for exactly `draft`.
    pub fn matches(&self, draft: &BuildDraft) -> bool {
        self.draft == *draft
    }
}

impl Session<'_> {
    /// The saved draft, or an empty one.
    pub fn build_draft(&self) -> BuildDraft {
        let key = keys::build_draft(self.ctx.pid_or_anon(), &self.ctx.seed);
        read_json_or(&*self.store, &key)
    }

    /// Apply an edit and persist the resulting draft.
    pub fn edit_draft(&mut self, edit: DraftEdit) -> Result<BuildDraft, SessionError> {
        let mut draft = self.build_draft();
        if let Some(topic) = edit.topic {
            draft.topic = topic;
        }
        if let Some(rq) = edit.rq {
            draft.rq = rq;
        }
        if edit.design.is_some() {
            draft.design = edit.design;
        }
        if edit.source.is_some() {
            draft.source = edit.source;
        }
        let key = keys::build_draft(self.ctx.pid_or_anon(), &self.ctx.seed);
        write_json(self.store, &key, &draft)?;
        Ok(draft)
    }

    /// Run inference and feedback for a draft. Repeatable; nothing is stored.
    pub fn check_alignment(&self, draft: &BuildDraft) -> Result<AlignmentCheck, SessionError> {
        let rq = draft.rq.trim();
        if rq.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        let topic = draft.topic.trim();
        let analysis = analyze(topic, rq, &self.thresholds);
        let feedback = compose(&AlignmentInput {
            analysis: &analysis,
            topic,
            chosen_design: draft.design,
            chosen_source: draft.source,
            labels: &self.bank.labels,
        });
        tracing::debug!(
            suggested = ?feedback.suggested,
            flag = %feedback.flag,
            "alignment checked"
        );
        Ok(AlignmentCheck {
            draft: draft.clone(),
            analysis,
            feedback,
        })
    }

    /// Save a complete draft as the build record. A check is reused only if
    /// it belongs to this exact draft; otherwise alignment is recomputed.
    pub fn save_build(
        &mut self,
        draft: &BuildDraft,
        check: Option<&AlignmentCheck>,
    ) -> Result<BuildRecord, SessionError> {
        let pid = self.ctx.participant()?.to_string();
        let missing = draft.missing_fields();
        let (Some(design), Some(source)) = (draft.design, draft.source) else {
            return Err(SessionError::IncompleteBuild { missing });
        };
        if !missing.is_empty() {
            return Err(SessionError::IncompleteBuild { missing });
        }

        let fresh;
        let check = match check.filter(|c| c.matches(draft)) {
            Some(c) => c,
            None => {
                fresh = self.check_alignment(draft)?;
                &fresh
            }
        };

        let record = BuildRecord {
            pid: pid.clone(),
            topic: draft.topic.trim().to_string(),
            rq: draft.rq.trim().to_string(),
            chosen_design: design,
            chosen_source: source,
            suggested_design: check.feedback.suggested,
            alignment_flag: check.feedback.flag,
            feedback_text: check.feedback.text.clone(),
            timestamp: self.clock.now(),
            seed: self.ctx.seed.clone(),
        };

        let key = keys::build_last(&pid, &self.ctx.seed);
        write_json(self.store, &key, &record)?;
        tracing::info!(pid = %pid, flag = %record.alignment_flag, "build entry saved");
        Ok(record)
    }

    /// The last saved build entry, if any.
    pub fn build_record(&self) -> Option<BuildRecord> {
        let key = keys::build_last(self.ctx.pid_or_anon(), &self.ctx.seed);
        read_json(&*self.store, &key)
    }

    /// The saved entry for export. Needs a participant id.
    pub fn build_export(&self) -> Result<BuildRecord, SessionError> {
        self.ctx.participant()?;
        self.build_record().ok_or(SessionError::NoBuildRecord)
    }

    /// Clear the draft and the saved entry.
    pub fn reset_build(&mut self) -> Result<(), SessionError> {
        let (pid, seed) = (self.ctx.pid_or_anon(), self.ctx.seed.as_str());
        self.store.delete(&keys::build_last(pid, seed))?;
        self.store.delete(&keys::build_draft(pid, seed))?;
        tracing::info!(pid, "build draft cleared");
        Ok(())
    }
}
