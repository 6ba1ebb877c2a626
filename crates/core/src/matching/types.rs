//! Output types for the matching and recommendation operations.

use serde::{Deserialize, Serialize};

use crate::domain::{Case, DimensionFit, PriceCategory};

/// A catalog case annotated with its computed scores for one gear item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCase {
    pub case: Case,
    pub compatibility_score: i64,
    /// Absent when the case geometry was degenerate.
    pub dimension_fit: Option<DimensionFit>,
    pub feature_score: i64,
    pub price_category: PriceCategory,
}

/// Result of a `find_compatible_cases` run: the ranked candidates plus how
/// many eligible cases were skipped instead of aborting the run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub candidates: Vec<ScoredCase>,
    pub skipped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Budget,
    Premium,
    AlternativeSize,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Budget => "budget",
            RecommendationType::Premium => "premium",
            RecommendationType::AlternativeSize => "alternative_size",
        }
    }
}

/// One alternative candidate: the scored case, which derivation produced it,
/// and the confidence estimate used for recommendation ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseRecommendation {
    pub case: Case,
    pub recommendation_type: RecommendationType,
    pub compatibility_score: i64,
    pub confidence_score: i64,
}

/// Partial-result summary for the batch matching pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMatchSummary {
    /// Gear items whose candidate search completed.
    pub gear_processed: usize,
    /// Match rows upserted across all gear.
    pub matches_persisted: usize,
    /// Candidates dropped by per-candidate failures.
    pub candidates_skipped: usize,
    /// Gear items whose search failed outright (logged and skipped).
    pub gear_failed: usize,
    /// True when the run stopped early on cancellation.
    pub cancelled: bool,
}
