//! Records persisted in the key-value store.
//!
//! These are plain serde structs; the store keeps them as JSON strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feedback::AlignmentFlag;
use crate::model::{Design, Phase, Source};

/// One scored row of a quiz submission, in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItemRow {
    pub item_id: String,
    pub topic: String,
    pub rq: String,
    pub chosen_design: Design,
    pub chosen_design_label: String,
    pub chosen_source: Source,
    pub chosen_source_label: String,
    pub correct_design: Design,
    pub correct_source: Source,
    pub design_correct: u8,
    pub source_correct: u8,
    pub points: u8,
}

/// Aggregate line of a quiz submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub pid: String,
    pub phase: Phase,
    pub seed: String,
    pub total_points: u32,
    pub max_points: u32,
    pub percent: u32,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// The last scored quiz submission for a phase + participant + seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub rows: Vec<QuizItemRow>,
    pub summary: SubmissionSummary,
}

/// One entry in the append-only practice log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAttempt {
    pub pid: String,
    pub card_id: String,
    pub chosen_design: Design,
    pub chosen_source: Source,
    pub design_correct: u8,
    pub source_correct: u8,
    pub points: u8,
    pub timestamp: DateTime<Utc>,
    pub seed: String,
}

/// Work-in-progress build entry. Overwritten on every edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDraft {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub rq: String,
    #[serde(default)]
    pub design: Option<Design>,
    #[serde(default)]
    pub source: Option<Source>,
}

impl BuildDraft {
    /// Names of required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.rq.trim().is_empty() {
            missing.push("research question");
        }
        if self.design.is_none() {
            missing.push("design");
        }
        if self.source.is_none() {
            missing.push("data source");
        }
        missing
    }
}

/// The last saved build entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub pid: String,
    pub topic: String,
    pub rq: String,
    pub chosen_design: Design,
    pub chosen_source: Source,
    pub suggested_design: Option<Design>,
    pub alignment_flag: AlignmentFlag,
    pub feedback_text: String,
    pub timestamp: DateTime<Utc>,
    pub seed: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_missing_fields() {
        let mut draft = BuildDraft::default();
        assert_eq!(
            draft.missing_fields(),
            vec!["research question", "design", "data source"]
        );
        draft.rq = "  ".into();
        draft.design = Some(Design::Ethnography);
        assert_eq!(draft.missing_fields(), vec!["research question", "data source"]);
        draft.rq = "What norms?".into();
        draft.source = Some(Source::Observation);
        assert!(draft.missing_fields().is_empty());
    }

    #[test]
    fn draft_tolerates_partial_json() {
        let draft: BuildDraft = serde_json::from_str(r#"{"rq":"why?"}"#).unwrap();
        assert_eq!(draft.rq, "why?");
        assert_eq!(draft.design, None);
        assert!(draft.topic.is_empty());
    }
}
