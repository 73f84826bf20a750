//! Per-item and aggregate scoring for quiz and practice answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{Design, Item, Source};

/// The learner's current choices for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub design: Option<Design>,
    #[serde(default)]
    pub source: Option<Source>,
}

impl Selection {
    pub fn is_complete(&self) -> bool {
        self.design.is_some() && self.source.is_some()
    }
}

/// Item id → current selection, for one phase + participant + seed.
pub type Progress = BTreeMap<String, Selection>;

/// Correctness of one answered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScore {
    pub design_correct: u8,
    pub source_correct: u8,
    /// 0–2.
    pub points: u8,
}

impl ItemScore {
    pub fn compute(item: &Item, design: Design, source: Source) -> Self {
        let design_correct = u8::from(design == item.correct_design);
        let source_correct = u8::from(source == item.correct_source);
        Self {
            design_correct,
            source_correct,
            points: design_correct + source_correct,
        }
    }
}

/// Aggregate score of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_points: u32,
    pub max_points: u32,
    pub percent: u32,
}

impl Totals {
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a ItemScore>) -> Self {
        let mut total_points = 0u32;
        let mut count = 0u32;
        for s in scores {
            total_points += u32::from(s.points);
            count += 1;
        }
        let max_points = count * 2;
        Self {
            total_points,
            max_points,
            percent: percent(total_points, max_points),
        }
    }
}

/// `round(100 * total / max)`, or 0 when there is nothing to score.
pub fn percent(total: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (100.0 * f64::from(total) / f64::from(max)).round() as u32
}

/// A fully answered item with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<'a> {
    pub item: &'a Item,
    pub design: Design,
    pub source: Source,
    pub score: ItemScore,
}

/// Scores for an ordered list of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard<'a> {
    pub items: Vec<ScoredItem<'a>>,
    pub totals: Totals,
}

/// Refuse unless every item has both a design and a source chosen.
pub fn ensure_complete(items: &[&Item], progress: &Progress) -> Result<(), SessionError> {
    let mut missing_design = Vec::new();
    let mut missing_source = Vec::new();
    for item in items {
        let sel = progress.get(&item.id).copied().unwrap_or_default();
        if sel.design.is_none() {
            missing_design.push(item.id.clone());
        }
        if sel.source.is_none() {
            missing_source.push(item.id.clone());
        }
    }
    if missing_design.is_empty() && missing_source.is_empty() {
        Ok(())
    } else {
        Err(SessionError::IncompleteSubmission {
            missing_design,
            missing_source,
        })
    }
}

/// Score items in presentation order. This is a hard gate: an incomplete
/// progress map yields an error, never partial credit.
pub fn score_items<'a>(items: &[&'a Item], progress: &Progress) -> Result<Scorecard<'a>, SessionError> {
    ensure_complete(items, progress)?;

    let scored: Vec<ScoredItem<'a>> = items
        .iter()
        .filter_map(|&item| {
            let sel = progress.get(&item.id)?;
            let (design, source) = (sel.design?, sel.source?);
            Some(ScoredItem {
                item,
                design,
                source,
                score: ItemScore::compute(item, design, source),
            })
        })
        .collect();

    let totals = Totals::from_scores(scored.iter().map(|s| &s.score));
    Ok(Scorecard {
        items: scored,
        totals,
    })
}
