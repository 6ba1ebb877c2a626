//! Alternative recommendation derivation: budget, premium, and
//! alternative-size candidates around an accepted primary match.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::confidence::calculate_confidence_score;
use super::matcher::CaseMatcher;
use super::options::{AlternativeOptions, MatchOptions, SortDirection, SortField};
use super::types::{CaseRecommendation, RecommendationType, ScoredCase};
use crate::domain::{Case, CaseId, Gear, GearId};
use crate::errors::{EngineError, EngineResult};
use crate::repository::{CaseRepository, GearRepository};

/// Relative per-axis difference beyond which a candidate counts as a
/// structurally different form factor.
const ALTERNATIVE_SIZE_THRESHOLD: f64 = 0.20;

pub struct RecommendationEngine {
    gear: Arc<dyn GearRepository>,
    cases: Arc<dyn CaseRepository>,
    matcher: CaseMatcher,
}

impl RecommendationEngine {
    pub fn new(
        gear: Arc<dyn GearRepository>,
        cases: Arc<dyn CaseRepository>,
        matcher: CaseMatcher,
    ) -> Self {
        Self { gear, cases, matcher }
    }

    /// Derive the three alternative pools around the primary match, merge,
    /// filter by brand preferences, dedupe, and rank by compatibility.
    pub async fn generate_alternatives(
        &self,
        gear_id: &GearId,
        primary_case_id: &CaseId,
        options: &AlternativeOptions,
    ) -> EngineResult<Vec<CaseRecommendation>> {
        if options.max_alternatives == 0 {
            return Err(EngineError::invalid_input("max_alternatives must be at least 1"));
        }

        let gear = self
            .gear
            .find_by_id(gear_id)
            .await?
            .ok_or_else(|| EngineError::not_found("gear", gear_id.as_str()))?;
        let primary = self
            .cases
            .find_by_id(primary_case_id)
            .await?
            .ok_or_else(|| EngineError::not_found("case", primary_case_id.as_str()))?;

        let mut pool: Vec<CaseRecommendation> = Vec::new();
        self.collect_budget(&gear, &primary, &mut pool).await?;
        self.collect_premium(&gear, &primary, options, &mut pool).await?;
        self.collect_alternative_size(&gear, &primary, &mut pool).await?;

        if !options.excluded_brands.is_empty() {
            pool.retain(|rec| {
                !options
                    .excluded_brands
                    .iter()
                    .any(|brand| brand.eq_ignore_ascii_case(&rec.case.brand))
            });
        }
        if !options.preferred_brands.is_empty() {
            pool.retain(|rec| {
                options
                    .preferred_brands
                    .iter()
                    .any(|brand| brand.eq_ignore_ascii_case(&rec.case.brand))
            });
        }

        pool.sort_by(|a, b| {
            b.compatibility_score
                .cmp(&a.compatibility_score)
                .then_with(|| a.case.id.0.cmp(&b.case.id.0))
        });

        let mut seen: HashSet<String> = HashSet::new();
        pool.retain(|rec| seen.insert(rec.case.id.0.clone()));
        pool.truncate(options.max_alternatives);

        info!(
            event_name = "recommendations.generated",
            gear_id = %gear_id,
            primary_case_id = %primary_case_id,
            alternatives = pool.len(),
            "alternative recommendations generated"
        );

        Ok(pool)
    }

    /// Cheaper candidates: the 90% ceiling rides in the catalog query, the
    /// 60% quality floor and the strictly-below check are applied after.
    /// Both bounds are deliberately independent checks.
    async fn collect_budget(
        &self,
        gear: &Gear,
        primary: &Case,
        pool: &mut Vec<CaseRecommendation>,
    ) -> EngineResult<()> {
        let ceiling = primary.price * Decimal::new(90, 2);
        let floor = primary.price * Decimal::new(60, 2);

        let options = MatchOptions::default()
            .with_max_price(ceiling)
            .with_protection(primary.protection)
            .with_sort(SortField::Price, SortDirection::Ascending)
            .with_max_results(3);

        let outcome = self.matcher.find_compatible_for(gear, &options).await?;
        for candidate in outcome.candidates {
            if candidate.case.price >= floor && candidate.case.price < primary.price {
                pool.push(self.recommendation(gear, candidate, RecommendationType::Budget));
            } else {
                debug!(
                    event_name = "recommendations.budget.outside_band",
                    case_id = %candidate.case.id,
                    "budget candidate fell outside the price band"
                );
            }
        }
        Ok(())
    }

    /// Higher-protection candidates priced within the configured band above
    /// the primary.
    async fn collect_premium(
        &self,
        gear: &Gear,
        primary: &Case,
        options: &AlternativeOptions,
        pool: &mut Vec<CaseRecommendation>,
    ) -> EngineResult<()> {
        let floor = primary.price * Decimal::new(110, 2);
        let ceiling = primary.price
            * Decimal::from(100 + options.max_price_difference_percent as i64)
            / Decimal::from(100);

        let match_options = MatchOptions::default()
            .with_protection(primary.protection.stepped_up())
            .with_sort(SortField::CompatibilityScore, SortDirection::Descending)
            .with_max_results(3);

        let outcome = self.matcher.find_compatible_for(gear, &match_options).await?;
        for candidate in outcome.candidates {
            if candidate.case.price >= floor && candidate.case.price <= ceiling {
                pool.push(self.recommendation(gear, candidate, RecommendationType::Premium));
            }
        }
        Ok(())
    }

    /// Structurally different candidates: top of the compatibility ranking
    /// whose interior deviates from the primary by more than 20% on at
    /// least one axis.
    async fn collect_alternative_size(
        &self,
        gear: &Gear,
        primary: &Case,
        pool: &mut Vec<CaseRecommendation>,
    ) -> EngineResult<()> {
        let match_options = MatchOptions::default()
            .with_sort(SortField::CompatibilityScore, SortDirection::Descending)
            .with_max_results(5);

        let outcome = self.matcher.find_compatible_for(gear, &match_options).await?;
        for candidate in outcome.candidates {
            if candidate.case.id == primary.id {
                continue;
            }
            if differs_in_form_factor(&candidate.case, primary) {
                pool.push(self.recommendation(gear, candidate, RecommendationType::AlternativeSize));
            }
        }
        Ok(())
    }

    fn recommendation(
        &self,
        gear: &Gear,
        candidate: ScoredCase,
        recommendation_type: RecommendationType,
    ) -> CaseRecommendation {
        let confidence_score = calculate_confidence_score(gear, &candidate.case);
        CaseRecommendation {
            compatibility_score: candidate.compatibility_score,
            confidence_score,
            recommendation_type,
            case: candidate.case,
        }
    }
}

fn differs_in_form_factor(candidate: &Case, primary: &Case) -> bool {
    let candidate_axes = candidate.internal.axes();
    let primary_axes = primary.internal.axes();

    candidate_axes.iter().zip(primary_axes.iter()).any(|(cand, prim)| {
        *prim > 0.0 && ((cand - prim).abs() / prim) > ALTERNATIVE_SIZE_THRESHOLD
    })
}
