pub mod case;
pub mod case_match;
pub mod feedback;
pub mod gear;
pub mod units;

pub use case::{Case, CaseId, ProtectionLevel};
pub use case_match::{CaseMatch, DimensionFit, PriceCategory};
pub use feedback::{MatchFeedback, NewFeedback};
pub use gear::{Gear, GearId};
pub use units::{DimensionUnit, Dimensions, Weight, WeightUnit};
