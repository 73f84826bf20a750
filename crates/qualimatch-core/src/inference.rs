//! Rule-based research-question → design inference.
//!
//! Lexical only: each design's cue patterns are matched against normalised
//! text and weighted, the designs are ranked, and a confidence tier decides
//! whether a suggestion is emitted at all. A separate detector flags
//! questions that are too generic to classify well.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Design;
use crate::rules::{rules_for, DesignRules, DESIGN_RULES, GENERIC_STEMS, QUALIFIER_PATTERNS};

/// How sure the engine is about its top suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::None => "none",
            Confidence::Weak => "weak",
            Confidence::Medium => "medium",
            Confidence::Strong => "strong",
        })
    }
}

/// Tuning parameters for scoring and confidence tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Score added by an ordinary cue match.
    pub cue_weight: u32,
    /// Score added when the matched phrase is on the strong-signal list.
    pub strong_weight: u32,
    pub strong_min: u32,
    pub strong_margin: u32,
    pub medium_min: u32,
    pub medium_margin: u32,
    pub weak_min: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cue_weight: 1,
            strong_weight: 2,
            strong_min: 5,
            strong_margin: 2,
            medium_min: 3,
            medium_margin: 1,
            weak_min: 2,
        }
    }
}

impl Thresholds {
    /// Confidence tier for the best and runner-up scores.
    pub fn confidence(&self, top: u32, second: u32) -> Confidence {
        if top >= self.strong_min && top >= second.saturating_add(self.strong_margin) {
            Confidence::Strong
        } else if top >= self.medium_min && top >= second.saturating_add(self.medium_margin) {
            Confidence::Medium
        } else if top >= self.weak_min {
            Confidence::Weak
        } else {
            Confidence::None
        }
    }
}

/// One cue pattern that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueMatch {
    pub design: Design,
    pub pattern: String,
    /// The text the pattern matched.
    pub phrase: String,
    pub weight: u32,
}

/// Outcome of inferring a design from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Only set when `confidence` is not `None`.
    pub suggested: Option<Design>,
    pub confidence: Confidence,
    pub scores: BTreeMap<Design, u32>,
    /// Designs by descending score; ties keep table order.
    pub ranking: Vec<Design>,
    pub matches: Vec<CueMatch>,
    pub top_score: u32,
    pub second_score: u32,
    /// Rationale for the suggestion, empty when there is none.
    pub reason: String,
}

impl InferenceResult {
    /// Highest-ranked design regardless of confidence.
    pub fn leading(&self) -> Design {
        self.ranking.first().copied().unwrap_or(Design::ALL[0])
    }

    /// Matches that contributed to one design.
    pub fn matches_for(&self, design: Design) -> impl Iterator<Item = &CueMatch> {
        self.matches.iter().filter(move |m| m.design == design)
    }
}

struct CompiledRules {
    rules: &'static DesignRules,
    cues: Vec<Regex>,
}

static COMPILED: LazyLock<Vec<CompiledRules>> = LazyLock::new(|| {
    DESIGN_RULES
        .iter()
        .map(|rules| CompiledRules {
            rules,
            cues: rules
                .cues
                .iter()
                .map(|p| Regex::new(p).expect("cue patterns are valid regexes"))
                .collect(),
        })
        .collect()
});

static QUALIFIERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    QUALIFIER_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("qualifier patterns are valid regexes"))
        .collect()
});

/// Lowercase, fold anything that is not a letter, digit, or whitespace to a
/// space, and collapse whitespace runs.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Infer a design with the default thresholds.
pub fn infer(text: &str) -> InferenceResult {
    infer_with(text, &Thresholds::default())
}

/// Infer a design from free text.
pub fn infer_with(text: &str, thresholds: &Thresholds) -> InferenceResult {
    let normalized = normalize(text);
    let mut scores = BTreeMap::new();
    let mut matches = Vec::new();

    for compiled in COMPILED.iter() {
        let design = compiled.rules.design;
        let mut score = 0;
        for (re, pattern) in compiled.cues.iter().zip(compiled.rules.cues) {
            let found: Vec<&str> = re.find_iter(&normalized).map(|m| m.as_str()).collect();
            let Some(&first) = found.first() else {
                continue;
            };
            // Any occurrence carrying a strong phrase upgrades the cue.
            let strong = found
                .iter()
                .copied()
                .find(|phrase| compiled.rules.strong.iter().any(|s| phrase.contains(s)));
            let (phrase, weight) = match strong {
                Some(phrase) => (phrase, thresholds.strong_weight),
                None => (first, thresholds.cue_weight),
            };
            score += weight;
            matches.push(CueMatch {
                design,
                pattern: (*pattern).to_string(),
                phrase: phrase.to_string(),
                weight,
            });
        }
        scores.insert(design, score);
    }

    // Stable sort keeps table order among equal scores.
    let mut ranking: Vec<Design> = Design::ALL.to_vec();
    ranking.sort_by(|a, b| scores[b].cmp(&scores[a]));

    let top_score = scores[&ranking[0]];
    let second_score = scores[&ranking[1]];
    let confidence = thresholds.confidence(top_score, second_score);
    let suggested = (confidence != Confidence::None).then(|| ranking[0]);
    let reason = suggested
        .map(|d| rules_for(d).reason.to_string())
        .unwrap_or_default();

    tracing::debug!(
        ?suggested,
        %confidence,
        top_score,
        second_score,
        "inferred design"
    );

    InferenceResult {
        suggested,
        confidence,
        scores,
        ranking,
        matches,
        top_score,
        second_score,
        reason,
    }
}

/// True when the text uses a generic question stem and carries no qualifier
/// (bounded setting, named section or strand, time marker, perspective).
pub fn is_too_generic(text: &str) -> bool {
    let normalized = normalize(text);
    let has_stem = GENERIC_STEMS.iter().any(|stem| normalized.contains(stem));
    has_stem && !QUALIFIERS.iter().any(|re| re.is_match(&normalized))
}

/// Inference plus generic-phrasing detection for one build entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub inference: InferenceResult,
    pub too_generic: bool,
}

/// Analyse a topic and research question. Cues are read from both; the
/// generic check looks at the question alone.
pub fn analyze(topic: &str, rq: &str, thresholds: &Thresholds) -> Analysis {
    let joined = format!("{} {}", topic.trim(), rq.trim());
    Analysis {
        inference: infer_with(joined.trim(), thresholds),
        too_generic: is_too_generic(rq),
    }
}
