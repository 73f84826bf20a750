//! Turns an [`Analysis`] and the learner's choices into a verdict.
//!
//! Pure: no storage, no clock. Everything comes from the inputs and the fixed
//! tables in [`crate::rules`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inference::{Analysis, Confidence};
use crate::model::{Design, Labels, Source};
use crate::rules::{rules_for, source_tip};

/// Most example rewrites appended to one piece of feedback.
pub const MAX_REWRITES: usize = 2;

/// Badge shown for a generic question with no inferred design.
pub const GENERIC_BADGE: &str = "A bit general";

/// Overall alignment verdict, as exported in CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentFlag {
    Good,
    Mismatch,
    Ok,
}

impl AlignmentFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentFlag::Good => "good",
            AlignmentFlag::Mismatch => "mismatch",
            AlignmentFlag::Ok => "ok",
        }
    }
}

impl fmt::Display for AlignmentFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to [`compose`].
#[derive(Debug, Clone, Copy)]
pub struct AlignmentInput<'a> {
    pub analysis: &'a Analysis,
    pub topic: &'a str,
    pub chosen_design: Option<Design>,
    pub chosen_source: Option<Source>,
    pub labels: &'a Labels,
}

/// Composed verdict for a build entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub suggested: Option<Design>,
    pub flag: AlignmentFlag,
    pub badge_label: String,
    /// Full explanation, including any rewrites.
    pub text: String,
    pub rewrites: Vec<String>,
}

/// Example research questions for a design, with the topic filled in.
pub fn example_rewrites(design: Design, topic: &str) -> Vec<String> {
    let topic = topic.trim();
    let topic = if topic.is_empty() {
        "[your topic]".to_string()
    } else {
        topic.to_lowercase()
    };
    rules_for(design)
        .rewrites
        .iter()
        .take(MAX_REWRITES)
        .map(|t| t.replace("{topic}", &topic))
        .collect()
}

fn append_rewrites(text: &mut String, rewrites: &[String]) {
    if rewrites.is_empty() {
        return;
    }
    text.push_str(" Example rewrites:");
    for (i, rw) in rewrites.iter().enumerate() {
        text.push_str(&format!(" ({}) {}", i + 1, rw));
    }
}

fn join_labels(labels: &Labels, sources: &[Source]) -> String {
    let names: Vec<&str> = sources.iter().map(|s| labels.source(*s)).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        Some((last, _)) => (*last).to_string(),
        None => String::new(),
    }
}

/// Apply the feedback policy, in priority order:
/// generic with no inference, then an inferred design, then the fallback.
pub fn compose(input: &AlignmentInput<'_>) -> Feedback {
    let inference = &input.analysis.inference;
    let labels = input.labels;

    let Some(suggested) = inference.suggested else {
        if input.analysis.too_generic {
            let rewrites = example_rewrites(inference.leading(), input.topic);
            let mut text = String::from(
                "Your RQ reads as a general question. Add one concrete clue: a bounded setting \
                 (one class, section, or club), a timeframe (this semester, Quarter 3), or whose \
                 perspective you are studying.",
            );
            append_rewrites(&mut text, &rewrites);
            return Feedback {
                suggested: None,
                flag: AlignmentFlag::Ok,
                badge_label: GENERIC_BADGE.to_string(),
                text,
                rewrites,
            };
        }
        return Feedback {
            suggested: None,
            flag: AlignmentFlag::Ok,
            badge_label: "Needs more clue".to_string(),
            text: "Your RQ is still broad. Add clearer signal words: lived experience or meaning, \
                   culture or norms, a bounded class or program, a process or steps, or a story \
                   over time."
                .to_string(),
            rewrites: Vec::new(),
        };
    };

    let rules = rules_for(suggested);
    let sug_label = labels.design(suggested);
    let why = format!("Why: {}", rules.reason);

    let (flag, badge_label, mut text) = match input.chosen_design {
        None => (
            AlignmentFlag::Ok,
            format!("Suggested: {sug_label}"),
            format!(
                "{why} Suggested design: {sug_label}. Now select a design and check again to see if it aligns."
            ),
        ),
        Some(chosen) if chosen == suggested => {
            let flag = if inference.confidence >= Confidence::Medium {
                AlignmentFlag::Good
            } else {
                AlignmentFlag::Ok
            };
            let badge = match flag {
                AlignmentFlag::Good => "Aligned",
                _ => "Likely aligned",
            };
            let mut text =
                format!("{why} Your chosen design ({sug_label}) matches what your RQ is asking.");
            if input.analysis.too_generic {
                text.push_str(
                    " Narrow the scope: add a timeframe or setting, for example one section during this semester.",
                );
            }
            match input.chosen_source {
                Some(source) => text.push_str(&format!(
                    " Data source tip ({}): {}",
                    labels.source(source),
                    source_tip(suggested, source)
                )),
                None => text.push_str(&format!(
                    " Recommended data sources for {sug_label}: {}.",
                    join_labels(labels, rules.source_hints)
                )),
            }
            (flag, badge.to_string(), text)
        }
        Some(chosen) => {
            let chosen_label = labels.design(chosen);
            if inference.confidence == Confidence::Strong {
                (
                    AlignmentFlag::Mismatch,
                    format!("Mismatch (suggested: {sug_label})"),
                    format!(
                        "{why} Your RQ wording leans strongly toward {sug_label}, but you selected \
                         {chosen_label}. These two choices conflict: either revise the RQ to fit \
                         {chosen_label} or switch your design to {sug_label}."
                    ),
                )
            } else {
                (
                    AlignmentFlag::Ok,
                    format!("Check fit (suggested: {sug_label})"),
                    format!(
                        "{why} Your RQ could fit either {sug_label} or {chosen_label}; it leans \
                         slightly toward {sug_label}. Make your wording more specific so the \
                         design choice is clear."
                    ),
                )
            }
        }
    };

    let rewrites = example_rewrites(suggested, input.topic);
    append_rewrites(&mut text, &rewrites);

    Feedback {
        suggested: Some(suggested),
        flag,
        badge_label,
        text,
        rewrites,
    }
}
