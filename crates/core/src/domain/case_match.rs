use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::case::{CaseId, ProtectionLevel};
use super::gear::GearId;

/// Per-axis fit percentages (gear axis / case internal axis x 100) plus the
/// arithmetic mean across the three axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionFit {
    pub length_pct: f64,
    pub width_pct: f64,
    pub height_pct: f64,
    pub overall_pct: f64,
}

impl DimensionFit {
    pub fn axes(&self) -> [f64; 3] {
        [self.length_pct, self.width_pct, self.height_pct]
    }

    /// Placeholder fit used when a match is synthesized from feedback alone,
    /// before any dimensional scoring ran for the pair.
    pub fn neutral() -> Self {
        Self { length_pct: 75.0, width_pct: 75.0, height_pct: 75.0, overall_pct: 75.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    Budget,
    MidRange,
    Premium,
}

impl PriceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceCategory::Budget => "budget",
            PriceCategory::MidRange => "mid_range",
            PriceCategory::Premium => "premium",
        }
    }

    pub fn parse(value: &str) -> Option<PriceCategory> {
        match value {
            "budget" => Some(PriceCategory::Budget),
            "mid_range" => Some(PriceCategory::MidRange),
            "premium" => Some(PriceCategory::Premium),
            _ => None,
        }
    }
}

/// The engine's primary output record: the scored association between one
/// gear item and one case. At most one row exists per (gear_id, case_id);
/// re-scoring upserts in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseMatch {
    pub gear_id: GearId,
    pub case_id: CaseId,
    /// 0-100 integer compatibility score.
    pub compatibility_score: i64,
    pub dimension_fit: DimensionFit,
    pub feature_score: i64,
    pub price_category: PriceCategory,
    /// Protection level copied at scoring time, not live-joined.
    pub protection: ProtectionLevel,
    pub feedback_count: i64,
    pub positive_count: i64,
    pub negative_count: i64,
    /// Average user rating mapped to 0-100; `None` until feedback exists.
    pub user_feedback_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CaseMatch {
    /// Fresh match with no feedback history.
    pub fn scored(
        gear_id: GearId,
        case_id: CaseId,
        compatibility_score: i64,
        dimension_fit: DimensionFit,
        feature_score: i64,
        price_category: PriceCategory,
        protection: ProtectionLevel,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            gear_id,
            case_id,
            compatibility_score,
            dimension_fit,
            feature_score,
            price_category,
            protection,
            feedback_count: 0,
            positive_count: 0,
            negative_count: 0,
            user_feedback_score: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Carry feedback aggregates from an already-stored row into a re-scored
    /// match, so a matcher re-run never clobbers the feedback history.
    pub fn preserving_feedback(mut self, existing: &CaseMatch) -> Self {
        self.feedback_count = existing.feedback_count;
        self.positive_count = existing.positive_count;
        self.negative_count = existing.negative_count;
        self.user_feedback_score = existing.user_feedback_score;
        self.created_at = existing.created_at;
        self
    }
}
