//! CSV generation with fixed headers.
//!
//! Fields are quoted per RFC 4180 (only when they contain a comma, quote,
//! CR or LF; quotes are doubled). Lines are joined with `\n`.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use qualimatch_core::model::Phase;
use qualimatch_core::record::{BuildRecord, PracticeAttempt, SubmissionRecord};

pub const QUIZ_ITEM_HEADERS: [&str; 17] = [
    "pid",
    "phase",
    "item_id",
    "topic",
    "rq",
    "chosen_design_id",
    "chosen_design_label",
    "chosen_source_id",
    "chosen_source_label",
    "correct_design_id",
    "correct_source_id",
    "design_correct",
    "source_correct",
    "points_0to2",
    "elapsed_ms",
    "timestamp_iso",
    "seed",
];

pub const QUIZ_SUMMARY_HEADERS: [&str; 8] = [
    "pid",
    "phase",
    "total_points",
    "max_points",
    "percent",
    "elapsed_ms_total",
    "timestamp_iso",
    "seed",
];

pub const PRACTICE_HEADERS: [&str; 10] = [
    "pid",
    "phase",
    "card_id",
    "chosen_design_id",
    "chosen_source_id",
    "design_correct",
    "source_correct",
    "points_0to2",
    "timestamp_iso",
    "seed",
];

pub const BUILD_HEADERS: [&str; 11] = [
    "pid",
    "phase",
    "topic",
    "rq_text",
    "chosen_design_id",
    "chosen_source_id",
    "suggested_design_id",
    "alignment_flag",
    "feedback_text",
    "timestamp_iso",
    "seed",
];

/// Quote a field if it contains a comma, quote, CR, or LF.
pub fn csv_escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Join escaped fields into one line.
pub fn csv_line(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-03-01T08:00:00.000Z`.
pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Item rows, a blank spacer line, then the summary block.
pub fn quiz_csv(record: &SubmissionRecord) -> String {
    let summary = &record.summary;
    let timestamp = iso_timestamp(&summary.timestamp);
    let elapsed = summary.elapsed_ms.to_string();

    let mut lines = vec![QUIZ_ITEM_HEADERS.join(",")];
    for row in &record.rows {
        lines.push(csv_line(&[
            summary.pid.as_str(),
            summary.phase.as_str(),
            &row.item_id,
            &row.topic,
            &row.rq,
            row.chosen_design.as_str(),
            &row.chosen_design_label,
            row.chosen_source.as_str(),
            &row.chosen_source_label,
            row.correct_design.as_str(),
            row.correct_source.as_str(),
            &row.design_correct.to_string(),
            &row.source_correct.to_string(),
            &row.points.to_string(),
            &elapsed,
            &timestamp,
            &summary.seed,
        ]));
    }
    lines.push(String::new());
    lines.push(QUIZ_SUMMARY_HEADERS.join(","));
    lines.push(csv_line(&[
        summary.pid.as_str(),
        summary.phase.as_str(),
        &summary.total_points.to_string(),
        &summary.max_points.to_string(),
        &summary.percent.to_string(),
        &elapsed,
        &timestamp,
        &summary.seed,
    ]));
    lines.join("\n")
}

/// One line per logged attempt.
pub fn practice_csv(attempts: &[PracticeAttempt]) -> String {
    let mut lines = vec![PRACTICE_HEADERS.join(",")];
    for a in attempts {
        lines.push(csv_line(&[
            a.pid.as_str(),
            Phase::Practice.as_str(),
            &a.card_id,
            a.chosen_design.as_str(),
            a.chosen_source.as_str(),
            &a.design_correct.to_string(),
            &a.source_correct.to_string(),
            &a.points.to_string(),
            &iso_timestamp(&a.timestamp),
            &a.seed,
        ]));
    }
    lines.join("\n")
}

/// Header plus the single saved build entry.
pub fn build_csv(record: &BuildRecord) -> String {
    let line = csv_line(&[
        record.pid.as_str(),
        Phase::Build.as_str(),
        &record.topic,
        &record.rq,
        record.chosen_design.as_str(),
        record.chosen_source.as_str(),
        record.suggested_design.map(|d| d.as_str()).unwrap_or(""),
        record.alignment_flag.as_str(),
        &record.feedback_text,
        &iso_timestamp(&record.timestamp),
        &record.seed,
    ]);
    [BUILD_HEADERS.join(","), line].join("\n")
}

pub fn quiz_file_name(phase: Phase, pid: &str, seed: &str) -> String {
    format!("{phase}_{pid}_{seed}.csv")
}

pub fn practice_file_name(pid: &str, seed: &str) -> String {
    format!("practice_{pid}_{seed}.csv")
}

pub fn build_file_name(pid: &str, seed: &str) -> String {
    format!("build_{pid}_{seed}.csv")
}

/// Write CSV text to a file, creating parent directories.
pub fn write_csv(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
