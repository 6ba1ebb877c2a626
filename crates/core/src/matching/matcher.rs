//! Catalog matcher: eligibility filtering, scoring, ranking, and idempotent
//! match persistence.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::options::{BatchMatchOptions, MatchOptions, SortDirection, SortField};
use super::scoring::{ScoreCalculator, ScoringWeights};
use super::types::{BatchMatchSummary, MatchOutcome, ScoredCase};
use super::{CLEARANCE_BUFFER, DEFAULT_BATCH_WORKERS};
use crate::domain::{Case, CaseMatch, Gear, GearId};
use crate::errors::{EngineError, EngineResult};
use crate::repository::{CaseFilter, CaseRepository, CaseSort, GearRepository, MatchRepository};

/// Finds, ranks, and persists compatible cases for gear. Repositories are
/// injected once at construction; the matcher itself is cheap to clone.
#[derive(Clone)]
pub struct CaseMatcher {
    gear: Arc<dyn GearRepository>,
    cases: Arc<dyn CaseRepository>,
    matches: Arc<dyn MatchRepository>,
    calculator: ScoreCalculator,
    clearance: f64,
    batch_workers: usize,
}

impl CaseMatcher {
    pub fn new(
        gear: Arc<dyn GearRepository>,
        cases: Arc<dyn CaseRepository>,
        matches: Arc<dyn MatchRepository>,
    ) -> Self {
        Self {
            gear,
            cases,
            matches,
            calculator: ScoreCalculator::new(),
            clearance: CLEARANCE_BUFFER,
            batch_workers: DEFAULT_BATCH_WORKERS,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.calculator = ScoreCalculator::with_weights(weights);
        self
    }

    pub fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    pub fn with_batch_workers(mut self, workers: usize) -> Self {
        self.batch_workers = workers.max(1);
        self
    }

    /// Resolve the gear, then search. An unknown id aborts before anything
    /// is persisted.
    pub async fn find_compatible_cases(
        &self,
        gear_id: &GearId,
        options: &MatchOptions,
    ) -> EngineResult<MatchOutcome> {
        let gear = self
            .gear
            .find_by_id(gear_id)
            .await?
            .ok_or_else(|| EngineError::not_found("gear", gear_id.as_str()))?;

        self.find_compatible_for(&gear, options).await
    }

    /// Search with an already-resolved gear item.
    pub async fn find_compatible_for(
        &self,
        gear: &Gear,
        options: &MatchOptions,
    ) -> EngineResult<MatchOutcome> {
        validate_options(options)?;

        let filter = self.eligibility_filter(gear, options);
        let eligible = self.cases.find_by_query(&filter, CaseSort::default(), 0, None).await?;
        if eligible.is_empty() {
            debug!(
                event_name = "matching.search.no_eligible_cases",
                gear_id = %gear.id,
                "no case passed the hard eligibility filter"
            );
            return Ok(MatchOutcome::default());
        }

        let mut skipped = 0usize;
        let mut scored: Vec<ScoredCase> = Vec::with_capacity(eligible.len());
        for case in &eligible {
            let candidate = self.calculator.score_case(gear, case, options);
            if candidate.dimension_fit.is_none() {
                warn!(
                    event_name = "matching.candidate.skipped",
                    gear_id = %gear.id,
                    case_id = %case.id,
                    "degenerate internal geometry, candidate skipped"
                );
                skipped += 1;
                continue;
            }
            scored.push(candidate);
        }

        scored.retain(|candidate| candidate.compatibility_score >= options.min_score);
        sort_candidates(&mut scored, options.sort_by, options.direction);
        scored.truncate(options.max_results);

        self.persist_candidates(&gear.id, &scored).await?;

        info!(
            event_name = "matching.search.completed",
            gear_id = %gear.id,
            candidates = scored.len(),
            skipped,
            "compatible case search completed"
        );

        Ok(MatchOutcome { candidates: scored, skipped })
    }

    /// Single-pair compatibility score, no persistence.
    pub fn calculate_compatibility_score(
        &self,
        gear: &Gear,
        case: &Case,
        options: &MatchOptions,
    ) -> i64 {
        self.calculator.compatibility_score(gear, case, options)
    }

    /// Cross-product pass over the whole gear catalog. Gear items fan out
    /// across a bounded worker pool; each item's upsert batch stays
    /// sequential so concurrent writes to one (gear, case) key cannot race.
    /// A single gear failure is logged and counted, never fatal.
    pub async fn match_all_gear(
        &self,
        options: &BatchMatchOptions,
        cancel: CancellationToken,
    ) -> EngineResult<BatchMatchSummary> {
        let all_gear = self.gear.list(0, None).await?;
        let workers = options.workers.unwrap_or(self.batch_workers).max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks: JoinSet<(GearId, Option<EngineResult<MatchOutcome>>)> = JoinSet::new();
        let mut summary = BatchMatchSummary::default();

        info!(
            event_name = "matching.batch.started",
            gear_count = all_gear.len(),
            workers,
            "batch matching pass started"
        );

        for gear in all_gear {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let matcher = self.clone();
            let match_options = options.match_options.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (gear.id, None),
                };
                if cancel.is_cancelled() {
                    return (gear.id, None);
                }
                let outcome = matcher.find_compatible_for(&gear, &match_options).await;
                (gear.id, Some(outcome))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, None)) => summary.cancelled = true,
                Ok((_, Some(Ok(outcome)))) => {
                    summary.gear_processed += 1;
                    summary.matches_persisted += outcome.candidates.len();
                    summary.candidates_skipped += outcome.skipped;
                }
                Ok((gear_id, Some(Err(error)))) => {
                    warn!(
                        event_name = "matching.batch.gear_failed",
                        gear_id = %gear_id,
                        error = %error,
                        "candidate search failed, continuing batch"
                    );
                    summary.gear_failed += 1;
                }
                Err(join_error) => {
                    warn!(
                        event_name = "matching.batch.task_panicked",
                        error = %join_error,
                        "batch worker aborted, continuing batch"
                    );
                    summary.gear_failed += 1;
                }
            }
        }

        info!(
            event_name = "matching.batch.completed",
            gear_processed = summary.gear_processed,
            matches_persisted = summary.matches_persisted,
            gear_failed = summary.gear_failed,
            cancelled = summary.cancelled,
            "batch matching pass finished"
        );

        Ok(summary)
    }

    /// The hard constraint rides in the query itself: ineligible cases are
    /// never fetched, scored, or persisted.
    fn eligibility_filter(&self, gear: &Gear, options: &MatchOptions) -> CaseFilter {
        let [length, width, height] = gear.dimensions.axes();
        CaseFilter {
            min_internal: Some([
                length + self.clearance,
                width + self.clearance,
                height + self.clearance,
            ]),
            max_price: options.max_price,
            protection: options.protection,
            waterproof: options.require_waterproof.then_some(true),
            shockproof: options.require_shockproof.then_some(true),
            has_handle: options.require_handle.then_some(true),
            has_wheels: options.require_wheels.then_some(true),
            has_lock: None,
            brands: (!options.brands.is_empty()).then(|| options.brands.clone()),
        }
    }

    /// Upsert the final candidate list, carrying any existing feedback
    /// aggregates forward so a re-run only refreshes the scoring fields.
    async fn persist_candidates(
        &self,
        gear_id: &GearId,
        candidates: &[ScoredCase],
    ) -> EngineResult<()> {
        let now = Utc::now();
        for candidate in candidates {
            let Some(fit) = candidate.dimension_fit else { continue };

            let mut record = CaseMatch::scored(
                gear_id.clone(),
                candidate.case.id.clone(),
                candidate.compatibility_score,
                fit,
                candidate.feature_score,
                candidate.price_category,
                candidate.case.protection,
                now,
            );
            if let Some(existing) = self.matches.find_by_pair(gear_id, &candidate.case.id).await? {
                record = record.preserving_feedback(&existing);
            }
            self.matches.upsert(record).await?;
        }
        Ok(())
    }
}

fn validate_options(options: &MatchOptions) -> EngineResult<()> {
    if let Some(max_price) = options.max_price {
        if max_price < Decimal::ZERO {
            return Err(EngineError::invalid_input("max_price must not be negative"));
        }
    }
    if !(0..=100).contains(&options.min_score) {
        return Err(EngineError::invalid_input("min_score must be within 0-100"));
    }
    if options.max_results == 0 {
        return Err(EngineError::invalid_input("max_results must be at least 1"));
    }
    Ok(())
}

fn sort_candidates(candidates: &mut [ScoredCase], field: SortField, direction: SortDirection) {
    candidates.sort_by(|a, b| {
        let ordering = match field {
            SortField::CompatibilityScore => a.compatibility_score.cmp(&b.compatibility_score),
            SortField::Price => a.case.price.cmp(&b.case.price),
            SortField::Rating => a
                .case
                .rating
                .unwrap_or(0.0)
                .partial_cmp(&b.case.rating.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal),
        };
        let ordering = match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        // Stable tiebreak keeps repeated runs deterministic.
        ordering.then_with(|| a.case.id.0.cmp(&b.case.id.0))
    });
}
