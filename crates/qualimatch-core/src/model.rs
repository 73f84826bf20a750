//! Core data model types for qualimatch.
//!
//! Designs and data sources are closed sets; items come from an external,
//! read-only bank (see [`crate::bank`]).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A qualitative research design.
///
/// Declaration order is the rule-table order used to break inference ties,
/// so it must not be rearranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Design {
    Phenomenology,
    CaseStudy,
    Ethnography,
    GroundedTheory,
    NarrativeInquiry,
}

impl Design {
    /// All designs in table order.
    pub const ALL: [Design; 5] = [
        Design::Phenomenology,
        Design::CaseStudy,
        Design::Ethnography,
        Design::GroundedTheory,
        Design::NarrativeInquiry,
    ];

    /// Stable identifier used in storage keys and CSV exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Design::Phenomenology => "phenomenology",
            Design::CaseStudy => "case_study",
            Design::Ethnography => "ethnography",
            Design::GroundedTheory => "grounded_theory",
            Design::NarrativeInquiry => "narrative_inquiry",
        }
    }

    /// Label used when a bank does not override it.
    pub fn default_label(&self) -> &'static str {
        match self {
            Design::Phenomenology => "Phenomenology",
            Design::CaseStudy => "Case Study",
            Design::Ethnography => "Ethnography",
            Design::GroundedTheory => "Grounded Theory",
            Design::NarrativeInquiry => "Narrative Inquiry",
        }
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Design {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "phenomenology" => Ok(Design::Phenomenology),
            "case_study" => Ok(Design::CaseStudy),
            "ethnography" => Ok(Design::Ethnography),
            "grounded_theory" => Ok(Design::GroundedTheory),
            "narrative_inquiry" | "narrative" => Ok(Design::NarrativeInquiry),
            other => Err(format!("unknown design: {other}")),
        }
    }
}

/// A qualitative data-collection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Interview,
    FocusGroup,
    Observation,
    DocumentAnalysis,
    ArtifactAnalysis,
}

impl Source {
    /// All data sources in table order.
    pub const ALL: [Source; 5] = [
        Source::Interview,
        Source::FocusGroup,
        Source::Observation,
        Source::DocumentAnalysis,
        Source::ArtifactAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Interview => "interview",
            Source::FocusGroup => "focus_group",
            Source::Observation => "observation",
            Source::DocumentAnalysis => "document_analysis",
            Source::ArtifactAnalysis => "artifact_analysis",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Source::Interview => "Interview",
            Source::FocusGroup => "Focus Group Discussion (FGD)",
            Source::Observation => "Observation",
            Source::DocumentAnalysis => "Document Analysis",
            Source::ArtifactAnalysis => "Artifact Analysis",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "interview" => Ok(Source::Interview),
            "focus_group" | "fgd" => Ok(Source::FocusGroup),
            "observation" => Ok(Source::Observation),
            "document_analysis" => Ok(Source::DocumentAnalysis),
            "artifact_analysis" => Ok(Source::ArtifactAnalysis),
            other => Err(format!("unknown data source: {other}")),
        }
    }
}

/// A session mode with its own persisted state namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pretest,
    Posttest,
    Practice,
    Build,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pretest => "pretest",
            Phase::Posttest => "posttest",
            Phase::Practice => "practice",
            Phase::Build => "build",
        }
    }

    /// Pretest and posttest are scored as a whole on submit.
    pub fn is_quiz(&self) -> bool {
        matches!(self, Phase::Pretest | Phase::Posttest)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretest" | "pre" => Ok(Phase::Pretest),
            "posttest" | "post" => Ok(Phase::Posttest),
            "practice" => Ok(Phase::Practice),
            "build" => Ok(Phase::Build),
            other => Err(format!("unknown phase: {other}")),
        }
    }
}

/// A single quiz or practice unit from the item bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier within its collection (e.g. "pre_01").
    pub id: String,
    /// Short topic line shown above the question.
    pub topic: String,
    /// The research question the learner classifies.
    pub rq: String,
    pub correct_design: Design,
    pub correct_source: Source,
    /// Wrong design options offered alongside the correct one.
    /// Empty for practice cards, which offer every design.
    #[serde(default)]
    pub distractor_designs: Vec<Design>,
    #[serde(default)]
    pub distractor_sources: Vec<Source>,
    /// Why the correct pair fits.
    pub explanation: String,
    /// Optional facilitator prompt (practice cards).
    #[serde(default)]
    pub teacher_note: Option<String>,
}

impl Item {
    /// Design options before shuffling: the correct design followed by the
    /// distractors, or every design when no distractors are given.
    pub fn design_options(&self) -> Vec<Design> {
        if self.distractor_designs.is_empty() {
            return Design::ALL.to_vec();
        }
        std::iter::once(self.correct_design)
            .chain(self.distractor_designs.iter().copied())
            .collect()
    }

    /// Source options before shuffling.
    pub fn source_options(&self) -> Vec<Source> {
        if self.distractor_sources.is_empty() {
            return Source::ALL.to_vec();
        }
        std::iter::once(self.correct_source)
            .chain(self.distractor_sources.iter().copied())
            .collect()
    }
}

/// Human-readable labels for designs and sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    pub designs: BTreeMap<Design, String>,
    pub sources: BTreeMap<Source, String>,
}

impl Labels {
    pub fn design(&self, design: Design) -> &str {
        self.designs
            .get(&design)
            .map(String::as_str)
            .unwrap_or_else(|| design.default_label())
    }

    pub fn source(&self, source: Source) -> &str {
        self.sources
            .get(&source)
            .map(String::as_str)
            .unwrap_or_else(|| source.default_label())
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            designs: Design::ALL
                .iter()
                .map(|d| (*d, d.default_label().to_string()))
                .collect(),
            sources: Source::ALL
                .iter()
                .map(|s| (*s, s.default_label().to_string()))
                .collect(),
        }
    }
}

/// The validated item bank, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    pub labels: Labels,
    pub pretest: Vec<Item>,
    pub posttest: Vec<Item>,
    pub practice: Vec<Item>,
}

impl Bank {
    /// Items for a phase. Build mode has no items.
    pub fn items(&self, phase: Phase) -> &[Item] {
        match phase {
            Phase::Pretest => &self.pretest,
            Phase::Posttest => &self.posttest,
            Phase::Practice => &self.practice,
            Phase::Build => &[],
        }
    }

    pub fn find(&self, phase: Phase, item_id: &str) -> Option<&Item> {
        self.items(phase).iter().find(|it| it.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_display_and_parse() {
        assert_eq!(Design::CaseStudy.to_string(), "case_study");
        assert_eq!("case_study".parse::<Design>().unwrap(), Design::CaseStudy);
        assert_eq!(
            "Grounded Theory".parse::<Design>().unwrap(),
            Design::GroundedTheory
        );
        assert_eq!(
            "narrative-inquiry".parse::<Design>().unwrap(),
            Design::NarrativeInquiry
        );
        assert!("survey".parse::<Design>().is_err());
    }

    #[test]
    fn source_display_and_parse() {
        assert_eq!(Source::FocusGroup.to_string(), "focus_group");
        assert_eq!("FGD".parse::<Source>().unwrap(), Source::FocusGroup);
        assert!("questionnaire".parse::<Source>().is_err());
    }

    #[test]
    fn design_order_is_table_order() {
        let mut shuffled = vec![
            Design::NarrativeInquiry,
            Design::Phenomenology,
            Design::GroundedTheory,
            Design::CaseStudy,
            Design::Ethnography,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Design::ALL.to_vec());
    }

    #[test]
    fn item_options_include_correct_answer() {
        let item = Item {
            id: "x".into(),
            topic: "t".into(),
            rq: "q".into(),
            correct_design: Design::Ethnography,
            correct_source: Source::Observation,
            distractor_designs: vec![Design::CaseStudy, Design::Phenomenology],
            distractor_sources: vec![],
            explanation: String::new(),
            teacher_note: None,
        };
        assert_eq!(
            item.design_options(),
            vec![Design::Ethnography, Design::CaseStudy, Design::Phenomenology]
        );
        assert_eq!(item.source_options(), Source::ALL.to_vec());
    }

    #[test]
    fn labels_default_cover_everything() {
        let labels = Labels::default();
        assert_eq!(labels.design(Design::CaseStudy), "Case Study");
        assert_eq!(labels.source(Source::FocusGroup), "Focus Group Discussion (FGD)");
    }

    #[test]
    fn phase_parse() {
        assert_eq!("pre".parse::<Phase>().unwrap(), Phase::Pretest);
        assert!(Phase::Posttest.is_quiz());
        assert!(!Phase::Practice.is_quiz());
    }
}
