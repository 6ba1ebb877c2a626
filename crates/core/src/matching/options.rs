//! Per-operation option structs with named fields and documented defaults,
//! replacing the source system's loosely-typed filter bags.

use rust_decimal::Decimal;

use super::features::FeaturePreferences;
use super::{DEFAULT_MAX_ALTERNATIVES, DEFAULT_MAX_RESULTS, MIN_COMPATIBILITY_SCORE};
use crate::domain::ProtectionLevel;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CompatibilityScore,
    Price,
    Rating,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Options for `CaseMatcher::find_compatible_cases`.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchOptions {
    /// Soft price ceiling applied in the catalog query.
    pub max_price: Option<Decimal>,
    /// Require exactly this protection level.
    pub protection: Option<ProtectionLevel>,
    pub require_waterproof: bool,
    pub require_shockproof: bool,
    pub require_handle: bool,
    pub require_wheels: bool,
    /// Brand allow-list; empty means any brand.
    pub brands: Vec<String>,
    /// Caller wishlist matched against case feature lists (overlap
    /// sub-score). Empty means the neutral default applies.
    pub preferred_features: Vec<String>,
    /// Material/color preferences consulted by the feature heuristics.
    pub feature_preferences: FeaturePreferences,
    /// Candidates scoring below this are dropped. Default 70.
    pub min_score: i64,
    /// Default: compatibility score.
    pub sort_by: SortField,
    /// Default: descending.
    pub direction: SortDirection,
    /// Default 20.
    pub max_results: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_price: None,
            protection: None,
            require_waterproof: false,
            require_shockproof: false,
            require_handle: false,
            require_wheels: false,
            brands: Vec::new(),
            preferred_features: Vec::new(),
            feature_preferences: FeaturePreferences::default(),
            min_score: MIN_COMPATIBILITY_SCORE,
            sort_by: SortField::default(),
            direction: SortDirection::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl MatchOptions {
    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_protection(mut self, protection: ProtectionLevel) -> Self {
        self.protection = Some(protection);
        self
    }

    pub fn with_preferred_features(mut self, features: Vec<String>) -> Self {
        self.preferred_features = features;
        self
    }

    pub fn with_min_score(mut self, min_score: i64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_sort(mut self, sort_by: SortField, direction: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.direction = direction;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Options for `RecommendationEngine::generate_alternatives`.
#[derive(Clone, Debug, PartialEq)]
pub struct AlternativeOptions {
    /// Cap on the merged recommendation list. Default 5.
    pub max_alternatives: usize,
    /// Premium candidates may cost at most this percent above the primary.
    /// Default 50.
    pub max_price_difference_percent: u32,
    pub preferred_brands: Vec<String>,
    pub excluded_brands: Vec<String>,
}

impl Default for AlternativeOptions {
    fn default() -> Self {
        Self {
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            max_price_difference_percent: 50,
            preferred_brands: Vec::new(),
            excluded_brands: Vec::new(),
        }
    }
}

/// Options for the exhaustive gear-by-gear batch matching pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchMatchOptions {
    /// Per-gear matching options.
    pub match_options: MatchOptions,
    /// Bounded fan-out width; `None` uses the configured default.
    pub workers: Option<usize>,
}
