//! Session and store error types.
//!
//! Every variant is recoverable: the learner fixes the input (or the store
//! path) and repeats the action.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Phase;

/// Errors surfaced to the learner by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Scoring and saving require a non-anonymous participant id.
    #[error("enter your participant code first")]
    MissingParticipant,

    /// At least one item lacks a design or a data source choice.
    #[error("answer all items (design + data source): {}", describe_missing(.missing_design, .missing_source))]
    IncompleteSubmission {
        missing_design: Vec<String>,
        missing_source: Vec<String>,
    },

    /// A practice check needs both choices.
    #[error("pick both a design and a data source")]
    IncompletePractice,

    /// Alignment check without a research question.
    #[error("write your research question first")]
    EmptyQuestion,

    /// Build save without all required fields.
    #[error("fill in your {}", .missing.join(", "))]
    IncompleteBuild { missing: Vec<&'static str> },

    #[error("unknown item '{item_id}' in {phase}")]
    UnknownItem { phase: Phase, item_id: String },

    #[error("{0} is not a quiz phase")]
    NotAQuiz(Phase),

    #[error("no submission yet for {0}")]
    NoSubmission(Phase),

    #[error("no practice attempts saved yet")]
    NoPracticeAttempts,

    #[error("no saved build entry yet")]
    NoBuildRecord,

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn describe_missing(missing_design: &[String], missing_source: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing_design.is_empty() {
        parts.push(format!("missing design for {}", missing_design.join(", ")));
    }
    if !missing_source.is_empty() {
        parts.push(format!("missing data source for {}", missing_source.join(", ")));
    }
    parts.join("; ")
}

/// Failures of a persistent store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode store value: {0}")]
    Encode(#[from] serde_json::Error),
}
