pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoCatalog, SeedSummary};
pub use repositories::{
    CachedCaseRepository, InMemoryCaseRepository, InMemoryFeedbackRepository,
    InMemoryGearRepository, InMemoryMatchRepository, SqlCaseRepository, SqlFeedbackRepository,
    SqlGearRepository, SqlMatchRepository,
};
