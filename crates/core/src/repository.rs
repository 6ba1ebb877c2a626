//! Repository seams the engine consumes. Implementations live in
//! `casefit-db`; the engine only ever sees these traits, injected at
//! construction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{Case, CaseId, CaseMatch, Gear, GearId, MatchFeedback, ProtectionLevel};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl RepositoryError {
    pub fn storage(error: impl std::fmt::Display) -> Self {
        RepositoryError::Storage(error.to_string())
    }

    pub fn decode(error: impl std::fmt::Display) -> Self {
        RepositoryError::Decode(error.to_string())
    }
}

/// Query predicate over the case catalog. Every field is optional; a default
/// filter matches everything. Predicates compose as a conjunction and are
/// expressible as equality, range, and set-membership checks so a SQL
/// implementation can push them into a WHERE clause.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaseFilter {
    /// Minimum internal dimensions on each axis (length, width, height).
    /// Carries the hard eligibility constraint: gear axis + clearance.
    pub min_internal: Option<[f64; 3]>,
    pub max_price: Option<Decimal>,
    pub protection: Option<ProtectionLevel>,
    pub waterproof: Option<bool>,
    pub shockproof: Option<bool>,
    pub has_handle: Option<bool>,
    pub has_wheels: Option<bool>,
    pub has_lock: Option<bool>,
    /// Brand allow-list (`IN` semantics); `None` admits every brand.
    pub brands: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseSortField {
    Price,
    Rating,
    #[default]
    Popularity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseSort {
    pub field: CaseSortField,
    pub descending: bool,
}

impl Default for CaseSort {
    fn default() -> Self {
        // Catalog listings default to most-reviewed first.
        Self { field: CaseSortField::Popularity, descending: true }
    }
}

impl CaseSort {
    pub fn price_ascending() -> Self {
        Self { field: CaseSortField::Price, descending: false }
    }

    pub fn rating_descending() -> Self {
        Self { field: CaseSortField::Rating, descending: true }
    }
}

#[async_trait]
pub trait GearRepository: Send + Sync {
    async fn find_by_id(&self, id: &GearId) -> Result<Option<Gear>, RepositoryError>;

    /// Popularity-ordered catalog page.
    async fn list(&self, skip: u32, limit: Option<u32>) -> Result<Vec<Gear>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    async fn save(&self, gear: Gear) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CaseRepository: Send + Sync {
    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError>;

    async fn find_by_query(
        &self,
        filter: &CaseFilter,
        sort: CaseSort,
        skip: u32,
        limit: Option<u32>,
    ) -> Result<Vec<Case>, RepositoryError>;

    async fn count(&self, filter: &CaseFilter) -> Result<u64, RepositoryError>;

    async fn save(&self, case: Case) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Option<CaseMatch>, RepositoryError>;

    /// Full-row write keyed by the unique (gear_id, case_id) pair. Repeated
    /// upserts with identical input must leave identical stored state;
    /// concurrent upserts to the same key serialize, last write wins.
    async fn upsert(&self, case_match: CaseMatch) -> Result<(), RepositoryError>;

    async fn list_for_gear(&self, gear_id: &GearId) -> Result<Vec<CaseMatch>, RepositoryError>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Append-only; records are never overwritten or deduplicated.
    async fn append(&self, feedback: MatchFeedback) -> Result<(), RepositoryError>;

    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Vec<MatchFeedback>, RepositoryError>;
}
