//! Compatibility scoring: the weighted blend of dimension, protection,
//! feature-overlap, and rating sub-scores.

use rust_decimal::Decimal;

use super::dimensions;
use super::features::{heuristic_feature_score, FeaturePreferences};
use super::options::MatchOptions;
use super::types::ScoredCase;
use super::NEUTRAL_FEATURE_SCORE;
use crate::domain::{Case, Gear, PriceCategory, ProtectionLevel};

/// Weights for the compatibility sub-scores. The defaults favor physical
/// fit, then protection, then features, then social proof.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight for the dimension score (default: 0.40)
    pub dimension: f64,
    /// Weight for the protection score (default: 0.25)
    pub protection: f64,
    /// Weight for the preferred-feature overlap score (default: 0.20)
    pub features: f64,
    /// Weight for the rating score (default: 0.15)
    pub rating: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self { weights: ScoringWeights::default() }
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// The primary 0-100 integer compatibility score for a (gear, case) pair.
    pub fn compatibility_score(&self, gear: &Gear, case: &Case, options: &MatchOptions) -> i64 {
        let (_, dimension) = dimensions::evaluate(&gear.dimensions, &case.internal);
        let protection = protection_score(case.protection);
        let features = feature_overlap_score(case, &options.preferred_features);
        let rating = rating_score(case.rating);

        let total = dimension as f64 * self.weights.dimension
            + protection as f64 * self.weights.protection
            + features as f64 * self.weights.features
            + rating as f64 * self.weights.rating;

        (total.round() as i64).clamp(0, 100)
    }

    /// Full scored-candidate assembly: compatibility plus the breakdown
    /// fields the match record persists.
    pub fn score_case(&self, gear: &Gear, case: &Case, options: &MatchOptions) -> ScoredCase {
        let (dimension_fit, _) = dimensions::evaluate(&gear.dimensions, &case.internal);
        let compatibility_score = self.compatibility_score(gear, case, options);
        let feature_score = heuristic_feature_score(gear, case, &options.feature_preferences);

        ScoredCase {
            price_category: price_category(case.price),
            compatibility_score,
            dimension_fit,
            feature_score,
            case: case.clone(),
        }
    }
}

/// High=100, Medium=75, Low=50.
pub fn protection_score(level: ProtectionLevel) -> i64 {
    match level {
        ProtectionLevel::High => 100,
        ProtectionLevel::Medium => 75,
        ProtectionLevel::Low => 50,
    }
}

/// Fraction of the caller's preferred features present in the case's feature
/// list (substring, case-insensitive), as 0-100. Neutral 75 when the caller
/// expressed no preference.
pub fn feature_overlap_score(case: &Case, preferred: &[String]) -> i64 {
    if preferred.is_empty() {
        return NEUTRAL_FEATURE_SCORE;
    }

    let features: Vec<String> = case.features.iter().map(|f| f.to_lowercase()).collect();
    let matched = preferred
        .iter()
        .filter(|wanted| {
            let wanted = wanted.to_lowercase();
            features.iter().any(|feature| feature.contains(&wanted))
        })
        .count();

    (matched as f64 / preferred.len() as f64 * 100.0).round() as i64
}

/// rating/5 x 100; the neutral 50 when unrated.
pub fn rating_score(rating: Option<f64>) -> i64 {
    match rating {
        Some(value) if value > 0.0 => (value / 5.0 * 100.0).round() as i64,
        _ => 50,
    }
}

/// Currency-agnostic numeric classification: below 50 budget, above 150
/// premium, mid-range between.
pub fn price_category(price: Decimal) -> PriceCategory {
    if price < Decimal::from(50) {
        PriceCategory::Budget
    } else if price > Decimal::from(150) {
        PriceCategory::Premium
    } else {
        PriceCategory::MidRange
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CaseId, DimensionUnit, Dimensions, GearId, Weight, WeightUnit,
    };

    fn gear(l: f64, w: f64, h: f64) -> Gear {
        Gear {
            id: GearId::new("gear-1"),
            name: "Stage Synth".to_owned(),
            category: "synthesizer".to_owned(),
            gear_type: "analog".to_owned(),
            dimensions: Dimensions::new(l, w, h, DimensionUnit::In),
            weight: Weight::new(7.0, WeightUnit::Kg),
            popularity: 10,
        }
    }

    fn case(protection: ProtectionLevel, rating: Option<f64>, features: Vec<&str>) -> Case {
        Case {
            id: CaseId::new("case-1"),
            name: "Tour Case".to_owned(),
            brand: "Vanguard".to_owned(),
            internal: Dimensions::new(20.0, 10.0, 5.0, DimensionUnit::In),
            external: None,
            weight: Weight::new(3.0, WeightUnit::Kg),
            price: Decimal::from(120),
            currency: "USD".to_owned(),
            rating,
            review_count: 30,
            protection,
            waterproof: true,
            shockproof: true,
            has_handle: true,
            has_wheels: false,
            has_lock: true,
            material: "abs".to_owned(),
            color: "black".to_owned(),
            description: "padded flight case".to_owned(),
            features: features.into_iter().map(str::to_owned).collect(),
        }
    }

    #[test]
    fn worked_example_from_the_rating_blend() {
        // dim 100 (90% fit), protection High, 3/3 features, rating 4.0:
        // round(100*0.4 + 100*0.25 + 100*0.2 + 80*0.15) = 97
        let gear = gear(18.0, 9.0, 4.5);
        let case = case(
            ProtectionLevel::High,
            Some(4.0),
            vec!["padded interior", "lockable latches", "wheels"],
        );
        let options = MatchOptions::default().with_preferred_features(vec![
            "padded".to_owned(),
            "lock".to_owned(),
            "wheels".to_owned(),
        ]);

        let score = ScoreCalculator::new().compatibility_score(&gear, &case, &options);
        assert_eq!(score, 97);
    }

    #[test]
    fn score_is_always_within_bounds() {
        let gear = gear(25.0, 15.0, 8.0);
        let case = case(ProtectionLevel::Low, None, vec![]);
        let score =
            ScoreCalculator::new().compatibility_score(&gear, &case, &MatchOptions::default());
        assert!((0..=100).contains(&score));
    }

    #[test]
    fn feature_overlap_counts_substring_hits() {
        let case = case(ProtectionLevel::High, None, vec!["padded interior", "TSA lock"]);
        assert_eq!(feature_overlap_score(&case, &["padded".to_owned(), "lock".to_owned()]), 100);
        assert_eq!(feature_overlap_score(&case, &["padded".to_owned(), "wheels".to_owned()]), 50);
        assert_eq!(feature_overlap_score(&case, &[]), 75);
    }

    #[test]
    fn rating_defaults_to_neutral_when_unrated() {
        assert_eq!(rating_score(None), 50);
        assert_eq!(rating_score(Some(0.0)), 50);
        assert_eq!(rating_score(Some(4.0)), 80);
        assert_eq!(rating_score(Some(5.0)), 100);
    }

    #[test]
    fn price_category_boundaries() {
        assert_eq!(price_category(Decimal::from(49)), PriceCategory::Budget);
        assert_eq!(price_category(Decimal::from(50)), PriceCategory::MidRange);
        assert_eq!(price_category(Decimal::from(150)), PriceCategory::MidRange);
        assert_eq!(price_category(Decimal::from(151)), PriceCategory::Premium);
    }

    #[test]
    fn degenerate_geometry_zeroes_the_dimension_term() {
        let gear = gear(18.0, 9.0, 4.5);
        let mut broken = case(ProtectionLevel::High, Some(5.0), vec![]);
        broken.internal = Dimensions::new(20.0, 0.0, 5.0, DimensionUnit::In);

        // protection 100*0.25 + features 75*0.2 + rating 100*0.15 = 55
        let score =
            ScoreCalculator::new().compatibility_score(&gear, &broken, &MatchOptions::default());
        assert_eq!(score, 55);
    }
}
