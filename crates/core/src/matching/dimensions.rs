//! Dimension fit evaluation: pure, deterministic, side-effect free.

use crate::domain::{DimensionFit, Dimensions};

/// Per-axis fit percentages and their mean. Returns `None` when any case
/// internal axis is non-positive (degenerate geometry); callers score that
/// as 0 rather than erroring.
pub fn fit_percentages(gear: &Dimensions, internal: &Dimensions) -> Option<DimensionFit> {
    let gear_axes = gear.axes();
    let case_axes = internal.axes();

    if case_axes.iter().any(|axis| *axis <= 0.0) {
        return None;
    }

    let pct = |index: usize| gear_axes[index] / case_axes[index] * 100.0;
    let (length_pct, width_pct, height_pct) = (pct(0), pct(1), pct(2));

    Some(DimensionFit {
        length_pct,
        width_pct,
        height_pct,
        overall_pct: (length_pct + width_pct + height_pct) / 3.0,
    })
}

/// Piecewise dimension score over the overall fit percentage.
///
/// 70-90 is the ideal band (snug but not tight). Below 70 the score decays
/// linearly toward 70 as the case gets roomier; between 90 and 100 it falls
/// off steeply; above 100 the gear does not fit and the score is 0.
pub fn dimension_score(overall_pct: f64) -> i64 {
    if overall_pct > 100.0 {
        0
    } else if overall_pct > 90.0 {
        (100.0 - (overall_pct - 90.0) * 10.0).round() as i64
    } else if overall_pct >= 70.0 {
        100
    } else {
        (70.0 + (overall_pct / 70.0) * 30.0).round() as i64
    }
}

/// Combined convenience: fit breakdown plus score, with degenerate geometry
/// collapsing to score 0 and no breakdown.
pub fn evaluate(gear: &Dimensions, internal: &Dimensions) -> (Option<DimensionFit>, i64) {
    match fit_percentages(gear, internal) {
        Some(fit) => {
            let score = dimension_score(fit.overall_pct);
            (Some(fit), score)
        }
        None => (None, 0),
    }
}
