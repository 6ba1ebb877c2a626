use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::case::CaseId;
use super::gear::GearId;

/// One user submission against a match pair. Append-only: users may submit
/// any number of times and every record is retained and averaged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchFeedback {
    pub id: Uuid,
    pub gear_id: GearId,
    pub case_id: CaseId,
    /// Overall rating, 1-5.
    pub rating: u8,
    pub fit_accuracy: Option<u8>,
    pub protection_quality: Option<u8>,
    pub value_for_money: Option<u8>,
    pub purchased: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-facing input for a feedback submission; id and timestamp are
/// assigned by the aggregator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub gear_id: GearId,
    pub case_id: CaseId,
    pub rating: u8,
    pub fit_accuracy: Option<u8>,
    pub protection_quality: Option<u8>,
    pub value_for_money: Option<u8>,
    pub purchased: bool,
    pub comment: Option<String>,
}

impl NewFeedback {
    pub fn new(gear_id: GearId, case_id: CaseId, rating: u8) -> Self {
        Self {
            gear_id,
            case_id,
            rating,
            fit_accuracy: None,
            protection_quality: None,
            value_for_money: None,
            purchased: false,
            comment: None,
        }
    }

    pub fn into_record(self, now: DateTime<Utc>) -> MatchFeedback {
        MatchFeedback {
            id: Uuid::new_v4(),
            gear_id: self.gear_id,
            case_id: self.case_id,
            rating: self.rating,
            fit_accuracy: self.fit_accuracy,
            protection_quality: self.protection_quality,
            value_for_money: self.value_for_money,
            purchased: self.purchased,
            comment: self.comment,
            created_at: now,
        }
    }
}
