use thiserror::Error;

use crate::repository::RepositoryError;

/// Failures surfaced by engine operations.
///
/// Geometry problems are deliberately absent: a case with a zero internal
/// axis or gear that does not fit scores 0 and is excluded, it never errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound { entity, id: id.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_entity_and_id() {
        let error = EngineError::not_found("gear", "gear-77");
        assert_eq!(error.to_string(), "gear not found: gear-77");
    }

    #[test]
    fn repository_errors_pass_through() {
        let error = EngineError::from(RepositoryError::Decode("bad row".to_owned()));
        assert_eq!(error.to_string(), "decode error: bad row");
    }
}
