//! Case-to-gear matching engine.
//!
//! Pairs protective cases with gear through dimensional fit, protection
//! alignment, feature heuristics, and user feedback, and keeps the persisted
//! match records current.

pub mod alternatives;
pub mod confidence;
pub mod dimensions;
pub mod features;
pub mod feedback;
pub mod matcher;
pub mod options;
pub mod scoring;
pub mod types;

#[cfg(test)]
pub(crate) mod testkit;

pub use alternatives::RecommendationEngine;
pub use confidence::calculate_confidence_score;
pub use features::{recommended_protection, FeaturePreferences};
pub use feedback::{FeedbackAggregator, FeedbackOutcome};
pub use matcher::CaseMatcher;
pub use options::{
    AlternativeOptions, BatchMatchOptions, MatchOptions, SortDirection, SortField,
};
pub use scoring::{price_category, ScoreCalculator, ScoringWeights};
pub use types::{
    BatchMatchSummary, CaseRecommendation, MatchOutcome, RecommendationType, ScoredCase,
};

/// Default compatibility sub-score weights.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    dimension: 0.40,
    protection: 0.25,
    features: 0.20,
    rating: 0.15,
};

/// Candidates below this compatibility score are dropped by default.
pub const MIN_COMPATIBILITY_SCORE: i64 = 70;

/// Default page size for `find_compatible_cases`.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Default cap for merged alternative recommendations.
pub const DEFAULT_MAX_ALTERNATIVES: usize = 5;

/// Margin required on every internal axis for a case to be eligible at all.
pub const CLEARANCE_BUFFER: f64 = 0.5;

/// Neutral score used when a feature signal has nothing to evaluate.
pub const NEUTRAL_FEATURE_SCORE: i64 = 75;

/// Default fan-out width for the batch matching pass.
pub const DEFAULT_BATCH_WORKERS: usize = 4;
