use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use casefit_core::repository::RepositoryError;

pub mod cached;
pub mod case;
pub mod case_match;
pub mod feedback;
pub mod gear;
pub mod memory;

pub use cached::CachedCaseRepository;
pub use case::SqlCaseRepository;
pub use case_match::SqlMatchRepository;
pub use feedback::SqlFeedbackRepository;
pub use gear::SqlGearRepository;
pub use memory::{
    InMemoryCaseRepository, InMemoryFeedbackRepository, InMemoryGearRepository,
    InMemoryMatchRepository,
};

pub(crate) fn db_err(error: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(error)
}

/// Prices live in the store as integer cents so range predicates stay exact
/// and SQL-orderable.
pub(crate) fn price_to_cents(price: Decimal) -> Result<i64, RepositoryError> {
    (price * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| RepositoryError::decode(format!("price out of range: {price}")))
}

pub(crate) fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| RepositoryError::decode(format!("bad timestamp `{value}`: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_round_trips_through_cents() {
        let price = Decimal::new(12_999, 2); // 129.99
        let cents = price_to_cents(price).expect("to cents");
        assert_eq!(cents, 12_999);
        assert_eq!(cents_to_price(cents), price);
    }

    #[test]
    fn malformed_timestamp_is_a_decode_error() {
        assert!(matches!(parse_timestamp("yesterday"), Err(RepositoryError::Decode(_))));
    }
}
