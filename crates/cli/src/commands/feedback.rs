use clap::Args;
use serde_json::json;

use casefit_core::domain::{CaseId, GearId, NewFeedback};

use crate::commands::{
    build_engine, build_runtime, engine_error_parts, load_config, open_pool, CommandFailure,
    CommandResult,
};

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    /// Gear identifier
    pub gear_id: String,
    /// Case identifier
    pub case_id: String,
    /// Overall rating, 1-5
    #[arg(long)]
    pub rating: u8,
    /// Fit accuracy sub-rating, 1-5
    #[arg(long)]
    pub fit: Option<u8>,
    /// Protection quality sub-rating, 1-5
    #[arg(long)]
    pub protection_quality: Option<u8>,
    /// Value-for-money sub-rating, 1-5
    #[arg(long)]
    pub value: Option<u8>,
    /// Whether the user actually purchased the case
    #[arg(long)]
    pub purchased: bool,
    #[arg(long)]
    pub comment: Option<String>,
}

pub fn run(args: &FeedbackArgs) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err((class, message, code)) => {
            return CommandResult::failure("feedback", class, message, code)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((class, message, code)) => {
            return CommandResult::failure("feedback", class, message, code)
        }
    };

    let submission = NewFeedback {
        gear_id: GearId::new(args.gear_id.clone()),
        case_id: CaseId::new(args.case_id.clone()),
        rating: args.rating,
        fit_accuracy: args.fit,
        protection_quality: args.protection_quality,
        value_for_money: args.value,
        purchased: args.purchased,
        comment: args.comment.clone(),
    };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        let engine = build_engine(&pool, &config);

        let outcome =
            engine.feedback.submit_feedback(submission).await.map_err(engine_error_parts)?;

        pool.close().await;
        Ok::<_, CommandFailure>(outcome)
    });

    match result {
        Ok(outcome) => CommandResult::success_with_data(
            "feedback",
            format!(
                "feedback stored; compatibility for the pair is now {}",
                outcome.case_match.compatibility_score
            ),
            json!({
                "feedback_id": outcome.feedback.id,
                "compatibility_score": outcome.case_match.compatibility_score,
                "feedback_count": outcome.case_match.feedback_count,
                "positive_count": outcome.case_match.positive_count,
                "negative_count": outcome.case_match.negative_count,
                "user_feedback_score": outcome.case_match.user_feedback_score,
            }),
        ),
        Err((class, message, code)) => {
            CommandResult::failure("feedback", class, message, code)
        }
    }
}
