use casefit_db::DemoCatalog;

use crate::commands::{build_runtime, load_config, open_pool, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err((class, message, code)) => return CommandResult::failure("seed", class, message, code),
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((class, message, code)) => return CommandResult::failure("seed", class, message, code),
    };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;

        let summary = DemoCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verified = DemoCatalog::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        pool.close().await;

        if verified {
            Ok(summary)
        } else {
            Err(("seed_verification", "seed rows missing after load".to_string(), 6u8))
        }
    });

    match result {
        Ok(summary) => CommandResult::success(
            "seed",
            format!(
                "demo catalog loaded: {} gear items, {} cases",
                summary.gear_seeded, summary.cases_seeded
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
