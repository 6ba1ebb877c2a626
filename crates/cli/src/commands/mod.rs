pub mod alternatives;
pub mod batch;
pub mod doctor;
pub mod feedback;
pub mod match_cases;
pub mod migrate;
pub mod score;
pub mod seed;

use std::sync::Arc;

use serde::Serialize;

use casefit_core::config::{AppConfig, LoadOptions};
use casefit_core::matching::{CaseMatcher, FeedbackAggregator, RecommendationEngine};
use casefit_db::repositories::{
    CachedCaseRepository, SqlCaseRepository, SqlFeedbackRepository, SqlGearRepository,
    SqlMatchRepository,
};
use casefit_db::{connect_with_settings, migrations, DbPool};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::build(command, "ok", None, message.into(), None, 0)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self::build(command, "ok", None, message.into(), Some(data), 0)
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::build(command, "error", Some(error_class), message.into(), None, exit_code)
    }

    fn build(
        command: &str,
        status: &str,
        error_class: Option<&str>,
        message: String,
        data: Option<serde_json::Value>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: error_class.map(str::to_string),
            message,
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Failure carried back to the command wrapper: error class, message, exit code.
pub(crate) type CommandFailure = (&'static str, String, u8);

pub(crate) fn load_config() -> Result<AppConfig, CommandFailure> {
    AppConfig::load(LoadOptions::default())
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), 2))
}

pub(crate) fn build_runtime() -> Result<tokio::runtime::Runtime, CommandFailure> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        ("runtime_init", format!("failed to initialize async runtime: {error}"), 3)
    })
}

pub(crate) async fn open_pool(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), 4))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), 5))?;

    Ok(pool)
}

/// Engine wiring: repositories constructed once and injected, the case
/// catalog wrapped in the TTL read cache.
pub(crate) struct Engine {
    pub matcher: CaseMatcher,
    pub recommendations: RecommendationEngine,
    pub feedback: FeedbackAggregator,
}

pub(crate) fn build_engine(pool: &DbPool, config: &AppConfig) -> Engine {
    let gear = Arc::new(SqlGearRepository::new(pool.clone()));
    let cases: Arc<CachedCaseRepository> = Arc::new(CachedCaseRepository::new(
        Arc::new(SqlCaseRepository::new(pool.clone())),
        std::time::Duration::from_secs(config.engine.catalog_cache_ttl_secs),
    ));
    let matches = Arc::new(SqlMatchRepository::new(pool.clone()));
    let feedback = Arc::new(SqlFeedbackRepository::new(pool.clone()));

    let matcher = CaseMatcher::new(gear.clone(), cases.clone(), matches.clone())
        .with_clearance(config.engine.clearance_buffer)
        .with_batch_workers(config.engine.batch_workers);
    let recommendations = RecommendationEngine::new(gear, cases, matcher.clone());
    let feedback = FeedbackAggregator::new(feedback, matches);

    Engine { matcher, recommendations, feedback }
}

pub(crate) fn engine_error_parts(error: casefit_core::EngineError) -> CommandFailure {
    use casefit_core::EngineError;

    let (class, code) = match &error {
        EngineError::NotFound { .. } => ("not_found", 6),
        EngineError::InvalidInput(_) => ("invalid_input", 2),
        EngineError::Repository(_) => ("repository", 4),
    };
    (class, error.to_string(), code)
}
