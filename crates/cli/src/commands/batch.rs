use std::time::Duration;

use clap::Args;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use casefit_core::matching::BatchMatchOptions;

use crate::commands::{
    build_engine, build_runtime, engine_error_parts, load_config, open_pool, CommandFailure,
    CommandResult,
};

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Bounded fan-out width; defaults to the configured worker count
    #[arg(long)]
    pub workers: Option<usize>,
    /// Abort the pass after this many seconds, keeping partial results
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

pub fn run(args: &BatchArgs) -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err((class, message, code)) => {
            return CommandResult::failure("batch", class, message, code)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((class, message, code)) => {
            return CommandResult::failure("batch", class, message, code)
        }
    };

    let options = BatchMatchOptions { workers: args.workers, ..BatchMatchOptions::default() };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        let engine = build_engine(&pool, &config);

        let cancel = CancellationToken::new();
        if let Some(secs) = args.timeout_secs {
            let deadline_token = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                deadline_token.cancel();
            });
        }

        let summary = engine
            .matcher
            .match_all_gear(&options, cancel)
            .await
            .map_err(engine_error_parts)?;

        pool.close().await;
        Ok::<_, CommandFailure>(summary)
    });

    match result {
        Ok(summary) => CommandResult::success_with_data(
            "batch",
            format!(
                "batch pass finished: {} gear processed, {} matches persisted, {} failed{}",
                summary.gear_processed,
                summary.matches_persisted,
                summary.gear_failed,
                if summary.cancelled { " (cancelled early)" } else { "" }
            ),
            json!({
                "gear_processed": summary.gear_processed,
                "matches_persisted": summary.matches_persisted,
                "candidates_skipped": summary.candidates_skipped,
                "gear_failed": summary.gear_failed,
                "cancelled": summary.cancelled,
            }),
        ),
        Err((class, message, code)) => CommandResult::failure("batch", class, message, code),
    }
}
