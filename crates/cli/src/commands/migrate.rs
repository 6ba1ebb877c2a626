use crate::commands::{build_runtime, load_config, open_pool, CommandFailure, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err((class, message, code)) => {
            return CommandResult::failure("migrate", class, message, code)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err((class, message, code)) => {
            return CommandResult::failure("migrate", class, message, code)
        }
    };

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        pool.close().await;
        Ok::<(), CommandFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}
