//! Feature heuristics: how well a case's declared features suit a piece of
//! gear, independent of dimensional fit.
//!
//! This is deliberately distinct from the compatibility scorer's
//! preferred-feature overlap: overlap measures the caller's wishlist, this
//! measures what the gear itself implies.

use crate::domain::{Case, Gear, ProtectionLevel};

use super::NEUTRAL_FEATURE_SCORE;

const PADDING_KEYWORDS: &[&str] = &["padding", "padded", "foam", "plush", "cushion"];
const COMPARTMENT_KEYWORDS: &[&str] = &["compartment", "divider", "pocket", "organizer"];

/// Gear classes that call for a hard, high-protection case: fragile or
/// analog equipment that does not survive impact.
const HIGH_PROTECTION_CLASSES: &[&str] =
    &["synth", "analog", "vintage", "tube", "microphone", "turntable", "modular"];

/// Digital and interface-class gear tolerates a medium shell.
const MEDIUM_PROTECTION_CLASSES: &[&str] =
    &["digital", "interface", "controller", "mixer", "sampler", "drum machine", "groovebox"];

/// Pedals and small accessories are the most forgiving.
const LOW_PROTECTION_CLASSES: &[&str] = &["pedal", "stompbox", "accessory", "cable"];

/// Caller-supplied soft preferences consulted by the heuristic factors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeaturePreferences {
    pub materials: Vec<String>,
    pub colors: Vec<String>,
}

impl FeaturePreferences {
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.colors.is_empty()
    }
}

/// Protection level the gear's category/type implies. Unlisted classes
/// default to Medium.
pub fn recommended_protection(category: &str, gear_type: &str) -> ProtectionLevel {
    let category = category.to_lowercase();
    let gear_type = gear_type.to_lowercase();
    let matches_class = |classes: &[&str]| {
        classes.iter().any(|class| category.contains(class) || gear_type.contains(class))
    };

    if matches_class(HIGH_PROTECTION_CLASSES) {
        ProtectionLevel::High
    } else if matches_class(LOW_PROTECTION_CLASSES) {
        ProtectionLevel::Low
    } else if matches_class(MEDIUM_PROTECTION_CLASSES) {
        ProtectionLevel::Medium
    } else {
        ProtectionLevel::Medium
    }
}

/// Exact match 100, adjacent tier 75, two tiers apart 25.
fn protection_alignment_score(recommended: ProtectionLevel, actual: ProtectionLevel) -> i64 {
    match recommended.tier().abs_diff(actual.tier()) {
        0 => 100,
        1 => 75,
        _ => 25,
    }
}

/// A lighter case relative to its payload is always preferable.
fn weight_ratio_score(case_kg: f64, gear_kg: f64) -> i64 {
    let ratio = case_kg / gear_kg;
    if ratio <= 0.5 {
        100
    } else if ratio <= 0.75 {
        75
    } else if ratio <= 1.0 {
        50
    } else {
        25
    }
}

fn presence_score(haystack: &str, keywords: &[&str]) -> i64 {
    if keywords.iter().any(|keyword| haystack.contains(keyword)) {
        100
    } else {
        0
    }
}

fn preference_score(value: &str, preferred: &[String]) -> i64 {
    let value = value.to_lowercase();
    let matched = preferred.iter().any(|preference| {
        let preference = preference.to_lowercase();
        value.contains(&preference) || preference.contains(&value)
    });
    if matched {
        100
    } else {
        0
    }
}

/// Average 0-100 contribution over the factors that actually applied; the
/// neutral 75 when nothing could be evaluated.
pub fn heuristic_feature_score(gear: &Gear, case: &Case, prefs: &FeaturePreferences) -> i64 {
    let haystack = case.search_text();
    let mut contributions: Vec<i64> = Vec::with_capacity(6);

    contributions.push(presence_score(&haystack, PADDING_KEYWORDS));
    contributions.push(presence_score(&haystack, COMPARTMENT_KEYWORDS));

    if !prefs.materials.is_empty() {
        contributions.push(preference_score(&case.material, &prefs.materials));
    }
    if !prefs.colors.is_empty() {
        contributions.push(preference_score(&case.color, &prefs.colors));
    }

    let gear_kg = gear.weight.in_kg();
    let case_kg = case.weight.in_kg();
    if gear_kg > 0.0 && case_kg > 0.0 {
        contributions.push(weight_ratio_score(case_kg, gear_kg));
    }

    let recommended = recommended_protection(&gear.category, &gear.gear_type);
    contributions.push(protection_alignment_score(recommended, case.protection));

    if contributions.is_empty() {
        return NEUTRAL_FEATURE_SCORE;
    }

    let total: i64 = contributions.iter().sum();
    (total as f64 / contributions.len() as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{
        CaseId, DimensionUnit, Dimensions, GearId, Weight, WeightUnit,
    };

    fn sample_gear(category: &str, gear_type: &str, weight_kg: f64) -> Gear {
        Gear {
            id: GearId::new("gear-1"),
            name: "Test Gear".to_owned(),
            category: category.to_owned(),
            gear_type: gear_type.to_owned(),
            dimensions: Dimensions::new(18.0, 9.0, 4.5, DimensionUnit::In),
            weight: Weight::new(weight_kg, WeightUnit::Kg),
            popularity: 0,
        }
    }

    fn sample_case(description: &str, protection: ProtectionLevel, weight_kg: f64) -> Case {
        Case {
            id: CaseId::new("case-1"),
            name: "Road Case".to_owned(),
            brand: "Vanguard".to_owned(),
            internal: Dimensions::new(20.0, 10.0, 5.0, DimensionUnit::In),
            external: None,
            weight: Weight::new(weight_kg, WeightUnit::Kg),
            price: Decimal::from(100),
            currency: "USD".to_owned(),
            rating: Some(4.0),
            review_count: 12,
            protection,
            waterproof: false,
            shockproof: true,
            has_handle: true,
            has_wheels: false,
            has_lock: false,
            material: "molded plastic".to_owned(),
            color: "black".to_owned(),
            description: description.to_owned(),
            features: vec![],
        }
    }

    #[test]
    fn recommended_protection_follows_gear_class() {
        assert_eq!(recommended_protection("synthesizer", "analog"), ProtectionLevel::High);
        assert_eq!(recommended_protection("audio interface", "digital"), ProtectionLevel::Medium);
        assert_eq!(recommended_protection("effects pedal", ""), ProtectionLevel::Low);
        assert_eq!(recommended_protection("unknown thing", ""), ProtectionLevel::Medium);
    }

    #[test]
    fn padding_and_compartments_count_when_mentioned_anywhere() {
        let gear = sample_gear("synthesizer", "analog", 5.0);
        let mut case =
            sample_case("dense foam interior with a cable compartment", ProtectionLevel::High, 2.0);

        let with_both = heuristic_feature_score(&gear, &case, &FeaturePreferences::default());

        case.description = "plain shell".to_owned();
        let with_neither = heuristic_feature_score(&gear, &case, &FeaturePreferences::default());

        assert!(with_both > with_neither);
    }

    #[test]
    fn aligned_protection_beats_mismatch() {
        let gear = sample_gear("synthesizer", "analog", 5.0);
        let aligned = sample_case("foam lined", ProtectionLevel::High, 2.0);
        let mismatched = sample_case("foam lined", ProtectionLevel::Low, 2.0);

        let prefs = FeaturePreferences::default();
        assert!(
            heuristic_feature_score(&gear, &aligned, &prefs)
                > heuristic_feature_score(&gear, &mismatched, &prefs)
        );
    }

    #[test]
    fn lighter_case_scores_better() {
        let gear = sample_gear("mixer", "digital", 8.0);
        let light = sample_case("padded", ProtectionLevel::Medium, 2.0);
        let heavy = sample_case("padded", ProtectionLevel::Medium, 10.0);

        let prefs = FeaturePreferences::default();
        assert!(
            heuristic_feature_score(&gear, &light, &prefs)
                > heuristic_feature_score(&gear, &heavy, &prefs)
        );
    }

    #[test]
    fn material_preference_is_substring_and_case_insensitive() {
        let gear = sample_gear("mixer", "digital", 8.0);
        let case = sample_case("padded", ProtectionLevel::Medium, 2.0);

        let matching = FeaturePreferences { materials: vec!["Plastic".to_owned()], colors: vec![] };
        let missing = FeaturePreferences { materials: vec!["aluminum".to_owned()], colors: vec![] };

        assert!(
            heuristic_feature_score(&gear, &case, &matching)
                > heuristic_feature_score(&gear, &case, &missing)
        );
    }

    #[test]
    fn weight_ratio_bands() {
        assert_eq!(weight_ratio_score(1.0, 4.0), 100);
        assert_eq!(weight_ratio_score(3.0, 4.0), 75);
        assert_eq!(weight_ratio_score(4.0, 4.0), 50);
        assert_eq!(weight_ratio_score(5.0, 4.0), 25);
    }
}
