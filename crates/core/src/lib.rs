pub mod config;
pub mod domain;
pub mod errors;
pub mod matching;
pub mod repository;

pub use domain::{
    Case, CaseId, CaseMatch, DimensionFit, DimensionUnit, Dimensions, Gear, GearId, MatchFeedback,
    NewFeedback, PriceCategory, ProtectionLevel, Weight, WeightUnit,
};
pub use errors::{EngineError, EngineResult};
pub use matching::{
    calculate_confidence_score, AlternativeOptions, BatchMatchOptions, BatchMatchSummary,
    CaseMatcher, CaseRecommendation, FeaturePreferences, FeedbackAggregator, FeedbackOutcome,
    MatchOptions, MatchOutcome, RecommendationEngine, RecommendationType, ScoreCalculator,
    ScoredCase, ScoringWeights, SortDirection, SortField,
};
pub use repository::{
    CaseFilter, CaseRepository, CaseSort, CaseSortField, FeedbackRepository, GearRepository,
    MatchRepository, RepositoryError,
};
