use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::json;

use casefit_core::domain::{GearId, ProtectionLevel};
use casefit_core::matching::{FeaturePreferences, MatchOptions, SortDirection, SortField};

use crate::commands::{
    build_engine, build_runtime, engine_error_parts, load_config, open_pool, CommandFailure,
    CommandResult,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Compatibility,
    Price,
    Rating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Asc,
    Desc,
}

pub(crate) fn parse_protection(value: &str) -> Result<ProtectionLevel, String> {
    ProtectionLevel::parse(value)
        .ok_or_else(|| format!("unknown protection level `{value}` (low, medium, high)"))
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Gear identifier to find compatible cases for
    pub gear_id: String,
    /// Soft price ceiling
    #[arg(long)]
    pub max_price: Option<Decimal>,
    /// Require exactly this protection level (low, medium, high)
    #[arg(long, value_parser = parse_protection)]
    pub protection: Option<ProtectionLevel>,
    #[arg(long)]
    pub waterproof: bool,
    #[arg(long)]
    pub shockproof: bool,
    #[arg(long)]
    pub handle: bool,
    #[arg(long)]
    pub wheels: bool,
    /// Brand allow-list (repeatable)
    #[arg(long = "brand")]
    pub brands: Vec<String>,
    /// Preferred feature keywords (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<String>,
    /// Preferred materials (repeatable)
    #[arg(long = "material")]
    pub materials: Vec<String>,
    /// Preferred colors (repeatable)
    #[arg(long = "color")]
    pub colors: Vec<String>,
    /// Minimum compatibility score, 0-100
    #[arg(long)]
    pub min_score: Option<i64>,
    #[arg(long, value_enum, default_value_t = SortKey::Compatibility)]
    pub sort_by: SortKey,
    #[arg(long, value_enum, default_value_t = Direction::Desc)]
    pub direction: Direction,
    #[arg(long)]
    pub max_results: Option<usize>,
}

impl MatchArgs {
    pub(crate) fn to_options(&self, default_min_score: i64, default_max: usize) -> MatchOptions {
        MatchOptions {
            max_price: self.max_price,
            protection: self.protection,
            require_waterproof: self.waterproof,
            require_shockproof: self.shockproof,
            require_handle: self.handle,
            require_wheels: self.wheels,
            brands: self.brands.clone(),
            preferred_features: self.features.clone(),
            feature_preferences: FeaturePreferences {
                materials: self.materials.clone(),
                colors: self.colors.clone(),
            },
            min_score: self.min_score.unwrap_or(default_min_score),
            sort_by: match self.sort_by {
                SortKey::Compatibility => SortField::CompatibilityScore,
                SortKey::Price => SortField::Price,
                SortKey::Rating => SortField::Rating,
            },
            direction: match self.direction {
                Direction::Asc => SortDirection::Ascending,
                Direction::Desc => SortDirection::Descending,
            },
            max_results: self.max_results.unwrap_or(default_max),
        }
    }
}

pub fn run(args: &MatchArgs) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err((class, message, code)) => {
            return CommandResult::failure("match", class, message, code)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((class, message, code)) => {
            return CommandResult::failure("match", class, message, code)
        }
    };

    let options =
        args.to_options(config.engine.min_compatibility_score, config.engine.max_results);

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        let engine = build_engine(&pool, &config);

        let outcome = engine
            .matcher
            .find_compatible_cases(&GearId::new(args.gear_id.clone()), &options)
            .await
            .map_err(engine_error_parts)?;

        pool.close().await;
        Ok::<_, CommandFailure>(outcome)
    });

    match result {
        Ok(outcome) => {
            let candidates: Vec<serde_json::Value> = outcome
                .candidates
                .iter()
                .map(|candidate| {
                    json!({
                        "case_id": candidate.case.id.as_str(),
                        "name": candidate.case.name,
                        "brand": candidate.case.brand,
                        "price": candidate.case.price,
                        "currency": candidate.case.currency,
                        "compatibility_score": candidate.compatibility_score,
                        "overall_fit_pct": candidate.dimension_fit.map(|fit| fit.overall_pct),
                        "feature_score": candidate.feature_score,
                        "price_category": candidate.price_category.as_str(),
                        "protection": candidate.case.protection.as_str(),
                    })
                })
                .collect();

            CommandResult::success_with_data(
                "match",
                format!(
                    "{} compatible case(s) found for {} ({} skipped)",
                    outcome.candidates.len(),
                    args.gear_id,
                    outcome.skipped
                ),
                json!({ "candidates": candidates, "skipped": outcome.skipped }),
            )
        }
        Err((class, message, code)) => CommandResult::failure("match", class, message, code),
    }
}
