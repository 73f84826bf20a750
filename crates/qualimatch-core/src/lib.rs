//! qualimatch-core: Seeded ordering, scoring, and design-alignment inference.
//!
//! This crate defines the data model, the deterministic ordering and scoring
//! engine, the rule-based research-question inference used in build mode,
//! and the session flows that persist learner state through a key-value
//! store.

pub mod bank;
pub mod config;
pub mod error;
pub mod feedback;
pub mod inference;
pub mod model;
pub mod ordering;
pub mod record;
pub mod rng;
pub mod rules;
pub mod scoring;
pub mod session;
pub mod store;
