use clap::Args;
use serde_json::json;

use casefit_core::domain::{CaseId, GearId};
use casefit_core::matching::AlternativeOptions;

use crate::commands::{
    build_engine, build_runtime, engine_error_parts, load_config, open_pool, CommandFailure,
    CommandResult,
};

#[derive(Debug, Args)]
pub struct AlternativesArgs {
    /// Gear identifier
    pub gear_id: String,
    /// The accepted primary case to derive alternatives around
    pub case_id: String,
    /// Cap on the merged recommendation list
    #[arg(long)]
    pub max_alternatives: Option<usize>,
    /// Premium candidates may cost at most this percent above the primary
    #[arg(long)]
    pub max_price_difference: Option<u32>,
    /// Brand allow-list for the merged result (repeatable)
    #[arg(long = "prefer-brand")]
    pub preferred_brands: Vec<String>,
    /// Brands to exclude from the merged result (repeatable)
    #[arg(long = "exclude-brand")]
    pub excluded_brands: Vec<String>,
}

pub fn run(args: &AlternativesArgs) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err((class, message, code)) => {
            return CommandResult::failure("alternatives", class, message, code)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((class, message, code)) => {
            return CommandResult::failure("alternatives", class, message, code)
        }
    };

    let mut options = AlternativeOptions {
        max_alternatives: args.max_alternatives.unwrap_or(config.engine.max_alternatives),
        preferred_brands: args.preferred_brands.clone(),
        excluded_brands: args.excluded_brands.clone(),
        ..AlternativeOptions::default()
    };
    if let Some(percent) = args.max_price_difference {
        options.max_price_difference_percent = percent;
    }

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        let engine = build_engine(&pool, &config);

        let recommendations = engine
            .recommendations
            .generate_alternatives(
                &GearId::new(args.gear_id.clone()),
                &CaseId::new(args.case_id.clone()),
                &options,
            )
            .await
            .map_err(engine_error_parts)?;

        pool.close().await;
        Ok::<_, CommandFailure>(recommendations)
    });

    match result {
        Ok(recommendations) => {
            let entries: Vec<serde_json::Value> = recommendations
                .iter()
                .map(|rec| {
                    json!({
                        "case_id": rec.case.id.as_str(),
                        "name": rec.case.name,
                        "brand": rec.case.brand,
                        "price": rec.case.price,
                        "recommendation_type": rec.recommendation_type.as_str(),
                        "compatibility_score": rec.compatibility_score,
                        "confidence_score": rec.confidence_score,
                    })
                })
                .collect();

            CommandResult::success_with_data(
                "alternatives",
                format!(
                    "{} alternative(s) derived around {}",
                    recommendations.len(),
                    args.case_id
                ),
                json!({ "alternatives": entries }),
            )
        }
        Err((class, message, code)) => {
            CommandResult::failure("alternatives", class, message, code)
        }
    }
}
