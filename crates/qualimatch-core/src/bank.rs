//! TOML item bank loader and validator.
//!
//! The bank is read once at startup. Structural problems (unknown design or
//! source ids, missing labels, empty collections) fail the load; softer
//! issues are reported by [`validate_bank`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Bank, Design, Item, Labels, Phase, Source};

/// The bank shipped with the tool.
pub const BUILTIN_BANK: &str = include_str!("../banks/default.toml");

#[derive(Debug, Deserialize)]
struct TomlBank {
    labels: TomlLabels,
    #[serde(default)]
    pretest: Vec<TomlItem>,
    #[serde(default)]
    posttest: Vec<TomlItem>,
    #[serde(default)]
    practice: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlLabels {
    #[serde(default)]
    designs: BTreeMap<String, String>,
    #[serde(default)]
    sources: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    id: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    rq: String,
    correct_design: String,
    correct_source: String,
    #[serde(default)]
    distractor_designs: Vec<String>,
    #[serde(default)]
    distractor_sources: Vec<String>,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    teacher_note: Option<String>,
}

fn convert_item(phase: Phase, raw: TomlItem) -> Result<Item> {
    let ctx = || format!("{phase} item '{}'", raw.id);
    let correct_design: Design = raw
        .correct_design
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .with_context(ctx)?;
    let correct_source: Source = raw
        .correct_source
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .with_context(ctx)?;
    let distractor_designs = raw
        .distractor_designs
        .iter()
        .map(|d| d.parse::<Design>().map_err(|e| anyhow::anyhow!(e)))
        .collect::<Result<Vec<_>>>()
        .with_context(ctx)?;
    let distractor_sources = raw
        .distractor_sources
        .iter()
        .map(|s| s.parse::<Source>().map_err(|e| anyhow::anyhow!(e)))
        .collect::<Result<Vec<_>>>()
        .with_context(ctx)?;

    Ok(Item {
        id: raw.id,
        topic: raw.topic,
        rq: raw.rq,
        correct_design,
        correct_source,
        distractor_designs,
        distractor_sources,
        explanation: raw.explanation,
        teacher_note: raw.teacher_note.filter(|n| !n.trim().is_empty()),
    })
}

fn convert_labels(raw: TomlLabels) -> Result<Labels> {
    let mut designs = BTreeMap::new();
    for (id, label) in raw.designs {
        let design: Design = id.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        designs.insert(design, label);
    }
    let mut sources = BTreeMap::new();
    for (id, label) in raw.sources {
        let source: Source = id.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        sources.insert(source, label);
    }

    let missing: Vec<&str> = Design::ALL
        .iter()
        .filter(|d| !designs.contains_key(d))
        .map(|d| d.as_str())
        .chain(
            Source::ALL
                .iter()
                .filter(|s| !sources.contains_key(s))
                .map(|s| s.as_str()),
        )
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("labels missing for: {}", missing.join(", "));
    }

    Ok(Labels { designs, sources })
}

/// Read and parse a bank file.
pub fn parse_bank(path: &Path) -> Result<Bank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read item bank: {}", path.display()))?;
    parse_bank_str(&content, path)
}

/// Parse a TOML bank body. `source_path` is only used in error messages.
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<Bank> {
    let parsed: TomlBank = toml::from_str(content)
        .with_context(|| format!("failed to parse item bank: {}", source_path.display()))?;

    let labels = convert_labels(parsed.labels)
        .with_context(|| format!("invalid labels in {}", source_path.display()))?;

    let mut collections = Vec::with_capacity(3);
    for (phase, raw_items) in [
        (Phase::Pretest, parsed.pretest),
        (Phase::Posttest, parsed.posttest),
        (Phase::Practice, parsed.practice),
    ] {
        if raw_items.is_empty() {
            anyhow::bail!("item bank {} has no {phase} items", source_path.display());
        }
        let items = raw_items
            .into_iter()
            .map(|raw| convert_item(phase, raw))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("invalid item bank: {}", source_path.display()))?;
        collections.push(items);
    }
    let practice = collections.pop().unwrap_or_default();
    let posttest = collections.pop().unwrap_or_default();
    let pretest = collections.pop().unwrap_or_default();

    Ok(Bank {
        labels,
        pretest,
        posttest,
        practice,
    })
}

/// The built-in bank.
pub fn builtin_bank() -> Result<Bank> {
    parse_bank_str(BUILTIN_BANK, Path::new("<builtin>"))
}

/// Load a bank from `path`, or the built-in bank when none is given.
pub fn load_bank(path: Option<&Path>) -> Result<Bank> {
    let bank = match path {
        Some(p) => parse_bank(p)?,
        None => builtin_bank()?,
    };
    tracing::info!(
        pretest = bank.pretest.len(),
        posttest = bank.posttest.len(),
        practice = bank.practice.len(),
        "loaded item bank"
    );
    Ok(bank)
}

/// A non-fatal issue found in a bank.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub phase: Phase,
    /// The item id (if applicable).
    pub item_id: Option<String>,
    pub message: String,
}

fn has_duplicates<T: Eq + std::hash::Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::new();
    values.iter().any(|v| !seen.insert(v))
}

/// Check a parsed bank for common authoring mistakes.
pub fn validate_bank(bank: &Bank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for phase in [Phase::Pretest, Phase::Posttest, Phase::Practice] {
        let items = bank.items(phase);
        let mut warn = |item: &Item, message: String| {
            warnings.push(ValidationWarning {
                phase,
                item_id: Some(item.id.clone()),
                message,
            })
        };

        let mut seen_ids = HashSet::new();
        for item in items {
            if !seen_ids.insert(item.id.as_str()) {
                warn(item, format!("duplicate item ID: {}", item.id));
            }
            if item.rq.trim().is_empty() {
                warn(item, "research question is empty".into());
            }
            if item.distractor_designs.contains(&item.correct_design) {
                warn(item, "distractor designs include the correct design".into());
            }
            if item.distractor_sources.contains(&item.correct_source) {
                warn(item, "distractor sources include the correct source".into());
            }
            if has_duplicates(&item.distractor_designs) {
                warn(item, "distractor designs contain duplicates".into());
            }
            if has_duplicates(&item.distractor_sources) {
                warn(item, "distractor sources contain duplicates".into());
            }
            if phase.is_quiz()
                && (item.distractor_designs.is_empty() || item.distractor_sources.is_empty())
            {
                warn(item, "no distractors given; every option will be offered".into());
            }
        }
    }

    warnings
}
