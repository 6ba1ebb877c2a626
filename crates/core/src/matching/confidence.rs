//! Confidence estimation for alternative recommendations.
//!
//! Confidence is a secondary 0-100 signal, separate from the compatibility
//! score: it rewards cases that look purpose-built for the gear and whose
//! per-axis fit sits close to the ideal band.

use super::dimensions::fit_percentages;
use super::features::recommended_protection;
use super::options::MatchOptions;
use super::scoring::ScoreCalculator;
use crate::domain::{Case, Gear, ProtectionLevel};

/// Points granted when a case's copy mentions the gear alongside the word
/// "case", suggesting it was designed for this kind of payload.
const DESIGNED_FOR_POINTS: i64 = 20;

const HIGH_PROTECTION_FEATURE_WEIGHTS: &[(&str, i64)] =
    &[("hardshell", 40), ("foam", 30), ("lock", 15), ("waterproof", 15)];
const MEDIUM_PROTECTION_FEATURE_WEIGHTS: &[(&str, i64)] =
    &[("padded", 40), ("compartment", 25), ("shockproof", 20), ("handle", 15)];
const LOW_PROTECTION_FEATURE_WEIGHTS: &[(&str, i64)] =
    &[("lightweight", 40), ("pocket", 30), ("compact", 20), ("strap", 10)];

/// `0.5·compatibility + 0.20·designed-for + 0.15·fit-closeness +
/// 0.15·category-features`, clamped to [0,100].
pub fn calculate_confidence_score(gear: &Gear, case: &Case) -> i64 {
    let compatibility =
        ScoreCalculator::new().compatibility_score(gear, case, &MatchOptions::default());

    let total = compatibility as f64 * 0.5
        + designed_for_score(gear, case) as f64 * 0.20
        + fit_closeness_score(gear, case) as f64 * 0.15
        + category_feature_score(gear, case) as f64 * 0.15;

    (total.round() as i64).clamp(0, 100)
}

/// 20 when the case's name/description mentions a gear keyword (type,
/// category, or a name token) co-occurring with the literal word "case".
fn designed_for_score(gear: &Gear, case: &Case) -> i64 {
    let haystack = format!("{} {}", case.name.to_lowercase(), case.description.to_lowercase());
    if !haystack.contains("case") {
        return 0;
    }

    let mut keywords: Vec<String> =
        vec![gear.gear_type.to_lowercase(), gear.category.to_lowercase()];
    keywords.extend(
        gear.name
            .to_lowercase()
            .split_whitespace()
            .filter(|token| token.len() >= 3)
            .map(str::to_owned),
    );

    if keywords.iter().any(|keyword| !keyword.is_empty() && haystack.contains(keyword.as_str())) {
        DESIGNED_FOR_POINTS
    } else {
        0
    }
}

/// Per-axis closeness table averaged over the three axes. Degenerate
/// geometry bottoms out at the table floor rather than erroring.
fn fit_closeness_score(gear: &Gear, case: &Case) -> i64 {
    let Some(fit) = fit_percentages(&gear.dimensions, &case.internal) else {
        return 30;
    };

    let per_axis: i64 = fit.axes().iter().map(|pct| axis_closeness(*pct)).sum();
    (per_axis as f64 / 3.0).round() as i64
}

fn axis_closeness(pct: f64) -> i64 {
    if (75.0..=90.0).contains(&pct) {
        100
    } else if (90.0..=95.0).contains(&pct) || (70.0..75.0).contains(&pct) {
        80
    } else if (60.0..70.0).contains(&pct) || (95.0..=100.0).contains(&pct) {
        60
    } else {
        30
    }
}

/// Category-driven feature appropriateness: each protection class weights
/// its own keyword set, summed over hits and capped at 100.
fn category_feature_score(gear: &Gear, case: &Case) -> i64 {
    let weights = match recommended_protection(&gear.category, &gear.gear_type) {
        ProtectionLevel::High => HIGH_PROTECTION_FEATURE_WEIGHTS,
        ProtectionLevel::Medium => MEDIUM_PROTECTION_FEATURE_WEIGHTS,
        ProtectionLevel::Low => LOW_PROTECTION_FEATURE_WEIGHTS,
    };

    let haystack = case.search_text();
    let total: i64 = weights
        .iter()
        .filter(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, weight)| weight)
        .sum();

    total.min(100)
}
