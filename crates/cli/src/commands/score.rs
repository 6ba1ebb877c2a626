use clap::Args;
use serde_json::json;

use casefit_core::domain::{CaseId, GearId};
use casefit_core::matching::{
    calculate_confidence_score, dimensions, price_category, MatchOptions,
};
use casefit_core::repository::{CaseRepository, GearRepository};
use casefit_db::repositories::{SqlCaseRepository, SqlGearRepository};

use crate::commands::{
    build_engine, build_runtime, engine_error_parts, load_config, open_pool, CommandFailure,
    CommandResult,
};

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Gear identifier
    pub gear_id: String,
    /// Case identifier
    pub case_id: String,
    /// Preferred feature keywords for the overlap sub-score (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<String>,
}

pub fn run(args: &ScoreArgs) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err((class, message, code)) => {
            return CommandResult::failure("score", class, message, code)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((class, message, code)) => {
            return CommandResult::failure("score", class, message, code)
        }
    };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        let engine = build_engine(&pool, &config);

        let gear_repo = SqlGearRepository::new(pool.clone());
        let case_repo = SqlCaseRepository::new(pool.clone());

        let gear = gear_repo
            .find_by_id(&GearId::new(args.gear_id.clone()))
            .await
            .map_err(|error| engine_error_parts(error.into()))?
            .ok_or(("not_found", format!("gear not found: {}", args.gear_id), 6u8))?;
        let case = case_repo
            .find_by_id(&CaseId::new(args.case_id.clone()))
            .await
            .map_err(|error| engine_error_parts(error.into()))?
            .ok_or(("not_found", format!("case not found: {}", args.case_id), 6u8))?;

        let options = MatchOptions {
            preferred_features: args.features.clone(),
            ..MatchOptions::default()
        };
        let compatibility = engine.matcher.calculate_compatibility_score(&gear, &case, &options);
        let confidence = calculate_confidence_score(&gear, &case);
        let (fit, dimension_score) = dimensions::evaluate(&gear.dimensions, &case.internal);

        pool.close().await;
        Ok::<_, CommandFailure>(json!({
            "gear_id": gear.id.as_str(),
            "case_id": case.id.as_str(),
            "compatibility_score": compatibility,
            "confidence_score": confidence,
            "dimension_score": dimension_score,
            "overall_fit_pct": fit.map(|f| f.overall_pct),
            "price_category": price_category(case.price).as_str(),
        }))
    });

    match result {
        Ok(data) => {
            let message = format!(
                "compatibility {} for {} in {}",
                data["compatibility_score"], args.gear_id, args.case_id
            );
            CommandResult::success_with_data("score", message, data)
        }
        Err((class, message, code)) => CommandResult::failure("score", class, message, code),
    }
}
