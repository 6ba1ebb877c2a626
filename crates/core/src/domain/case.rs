use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::units::{Dimensions, Weight};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionLevel {
    Low,
    Medium,
    High,
}

impl ProtectionLevel {
    /// Numeric tier used for adjacency checks (Low=0, Medium=1, High=2).
    pub fn tier(&self) -> u8 {
        match self {
            ProtectionLevel::Low => 0,
            ProtectionLevel::Medium => 1,
            ProtectionLevel::High => 2,
        }
    }

    /// One tier up, saturating at High. Drives the premium recommendation
    /// preference.
    pub fn stepped_up(&self) -> ProtectionLevel {
        match self {
            ProtectionLevel::Low => ProtectionLevel::Medium,
            ProtectionLevel::Medium | ProtectionLevel::High => ProtectionLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectionLevel::Low => "low",
            ProtectionLevel::Medium => "medium",
            ProtectionLevel::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<ProtectionLevel> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(ProtectionLevel::Low),
            "medium" => Some(ProtectionLevel::Medium),
            "high" => Some(ProtectionLevel::High),
            _ => None,
        }
    }
}

/// A protective case from the catalog. Read-only to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub name: String,
    pub brand: String,
    /// Interior dimensions; the hard eligibility constraint compares against
    /// these, never the external shell.
    pub internal: Dimensions,
    pub external: Option<Dimensions>,
    pub weight: Weight,
    pub price: Decimal,
    pub currency: String,
    /// Average review rating on a 0-5 scale; `None` when unrated.
    pub rating: Option<f64>,
    pub review_count: i64,
    pub protection: ProtectionLevel,
    pub waterproof: bool,
    pub shockproof: bool,
    pub has_handle: bool,
    pub has_wheels: bool,
    pub has_lock: bool,
    pub material: String,
    pub color: String,
    pub description: String,
    pub features: Vec<String>,
}

impl Case {
    /// Lowercased searchable text: name, description, and declared features.
    /// The keyword heuristics treat a hit in any of the three as presence.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.name.len() + self.description.len() + self.features.iter().map(String::len).sum::<usize>() + 16,
        );
        text.push_str(&self.name.to_lowercase());
        text.push(' ');
        text.push_str(&self.description.to_lowercase());
        for feature in &self.features {
            text.push(' ');
            text.push_str(&feature.to_lowercase());
        }
        text
    }

    pub fn mentions(&self, keyword: &str) -> bool {
        self.search_text().contains(&keyword.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_up_saturates_at_high() {
        assert_eq!(ProtectionLevel::Low.stepped_up(), ProtectionLevel::Medium);
        assert_eq!(ProtectionLevel::Medium.stepped_up(), ProtectionLevel::High);
        assert_eq!(ProtectionLevel::High.stepped_up(), ProtectionLevel::High);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ProtectionLevel::parse("HIGH"), Some(ProtectionLevel::High));
        assert_eq!(ProtectionLevel::parse("medium"), Some(ProtectionLevel::Medium));
        assert_eq!(ProtectionLevel::parse("none"), None);
    }
}
