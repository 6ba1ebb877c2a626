//! Shared in-memory fixtures for engine tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    Case, CaseId, CaseMatch, DimensionUnit, Dimensions, Gear, GearId, MatchFeedback,
    ProtectionLevel, Weight, WeightUnit,
};
use crate::repository::{
    CaseFilter, CaseRepository, CaseSort, FeedbackRepository, GearRepository, MatchRepository,
    RepositoryError,
};

pub fn gear_fixture(id: &str, length: f64, width: f64, height: f64) -> Gear {
    Gear {
        id: GearId::new(id),
        name: format!("Gear {id}"),
        category: "synthesizer".to_owned(),
        gear_type: "analog".to_owned(),
        dimensions: Dimensions::new(length, width, height, DimensionUnit::In),
        weight: Weight::new(6.0, WeightUnit::Kg),
        popularity: 5,
    }
}

pub fn case_fixture(id: &str, length: f64, width: f64, height: f64) -> Case {
    Case {
        id: CaseId::new(id),
        name: format!("Case {id}"),
        brand: "Vanguard".to_owned(),
        internal: Dimensions::new(length, width, height, DimensionUnit::In),
        external: None,
        weight: Weight::new(3.0, WeightUnit::Kg),
        price: Decimal::from(120),
        currency: "USD".to_owned(),
        rating: Some(4.5),
        review_count: 25,
        protection: ProtectionLevel::High,
        waterproof: true,
        shockproof: true,
        has_handle: true,
        has_wheels: false,
        has_lock: true,
        material: "abs".to_owned(),
        color: "black".to_owned(),
        description: "padded hard case with foam interior and accessory compartment".to_owned(),
        features: vec!["padded interior".to_owned(), "TSA lock".to_owned()],
    }
}

/// One shared in-memory backing store behind all four repository traits.
/// Plain `std` locks: every critical section is short and never held across
/// an await point.
#[derive(Clone, Default)]
pub struct TestStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    gear: RwLock<HashMap<String, Gear>>,
    cases: RwLock<HashMap<String, Case>>,
    matches: RwLock<HashMap<(String, String), CaseMatch>>,
    feedback: RwLock<Vec<MatchFeedback>>,
}

impl TestStore {
    pub fn gear(&self) -> Arc<dyn GearRepository> {
        Arc::new(self.clone())
    }

    pub fn cases(&self) -> Arc<dyn CaseRepository> {
        Arc::new(self.clone())
    }

    pub fn matches(&self) -> Arc<dyn MatchRepository> {
        Arc::new(self.clone())
    }

    pub fn feedback(&self) -> Arc<dyn FeedbackRepository> {
        Arc::new(self.clone())
    }

    pub fn add_gear(&self, gear: Gear) {
        self.inner.gear.write().expect("gear lock").insert(gear.id.0.clone(), gear);
    }

    pub fn add_case(&self, case: Case) {
        self.inner.cases.write().expect("case lock").insert(case.id.0.clone(), case);
    }

    pub fn put_match(&self, case_match: CaseMatch) {
        let key = (case_match.gear_id.0.clone(), case_match.case_id.0.clone());
        self.inner.matches.write().expect("match lock").insert(key, case_match);
    }

    pub async fn all_matches(&self) -> Vec<CaseMatch> {
        self.inner.matches.read().expect("match lock").values().cloned().collect()
    }

    pub async fn feedback_len(&self) -> usize {
        self.inner.feedback.read().expect("feedback lock").len()
    }
}

fn filter_admits(filter: &CaseFilter, case: &Case) -> bool {
    if let Some([min_l, min_w, min_h]) = filter.min_internal {
        let [l, w, h] = case.internal.axes();
        if l < min_l || w < min_w || h < min_h {
            return false;
        }
    }
    if let Some(max_price) = filter.max_price {
        if case.price > max_price {
            return false;
        }
    }
    if let Some(protection) = filter.protection {
        if case.protection != protection {
            return false;
        }
    }
    let flag_checks = [
        (filter.waterproof, case.waterproof),
        (filter.shockproof, case.shockproof),
        (filter.has_handle, case.has_handle),
        (filter.has_wheels, case.has_wheels),
        (filter.has_lock, case.has_lock),
    ];
    for (wanted, actual) in flag_checks {
        if let Some(wanted) = wanted {
            if actual != wanted {
                return false;
            }
        }
    }
    if let Some(brands) = &filter.brands {
        if !brands.iter().any(|brand| brand.eq_ignore_ascii_case(&case.brand)) {
            return false;
        }
    }
    true
}

#[async_trait]
impl GearRepository for TestStore {
    async fn find_by_id(&self, id: &GearId) -> Result<Option<Gear>, RepositoryError> {
        Ok(self.inner.gear.read().expect("gear lock").get(&id.0).cloned())
    }

    async fn list(&self, skip: u32, limit: Option<u32>) -> Result<Vec<Gear>, RepositoryError> {
        let mut all: Vec<Gear> =
            self.inner.gear.read().expect("gear lock").values().cloned().collect();
        all.sort_by(|a, b| b.popularity.cmp(&a.popularity).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(all
            .into_iter()
            .skip(skip as usize)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.inner.gear.read().expect("gear lock").len() as u64)
    }

    async fn save(&self, gear: Gear) -> Result<(), RepositoryError> {
        self.inner.gear.write().expect("gear lock").insert(gear.id.0.clone(), gear);
        Ok(())
    }
}

#[async_trait]
impl CaseRepository for TestStore {
    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        Ok(self.inner.cases.read().expect("case lock").get(&id.0).cloned())
    }

    async fn find_by_query(
        &self,
        filter: &CaseFilter,
        _sort: CaseSort,
        skip: u32,
        limit: Option<u32>,
    ) -> Result<Vec<Case>, RepositoryError> {
        let mut matched: Vec<Case> = self
            .inner
            .cases
            .read()
            .expect("case lock")
            .values()
            .filter(|case| filter_admits(filter, case))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(matched
            .into_iter()
            .skip(skip as usize)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, filter: &CaseFilter) -> Result<u64, RepositoryError> {
        Ok(self
            .inner
            .cases
            .read()
            .expect("case lock")
            .values()
            .filter(|case| filter_admits(filter, case))
            .count() as u64)
    }

    async fn save(&self, case: Case) -> Result<(), RepositoryError> {
        self.inner.cases.write().expect("case lock").insert(case.id.0.clone(), case);
        Ok(())
    }
}

#[async_trait]
impl MatchRepository for TestStore {
    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Option<CaseMatch>, RepositoryError> {
        let key = (gear_id.0.clone(), case_id.0.clone());
        Ok(self.inner.matches.read().expect("match lock").get(&key).cloned())
    }

    async fn upsert(&self, case_match: CaseMatch) -> Result<(), RepositoryError> {
        let key = (case_match.gear_id.0.clone(), case_match.case_id.0.clone());
        self.inner.matches.write().expect("match lock").insert(key, case_match);
        Ok(())
    }

    async fn list_for_gear(&self, gear_id: &GearId) -> Result<Vec<CaseMatch>, RepositoryError> {
        let mut rows: Vec<CaseMatch> = self
            .inner
            .matches
            .read()
            .expect("match lock")
            .values()
            .filter(|m| m.gear_id == *gear_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
        Ok(rows)
    }
}

#[async_trait]
impl FeedbackRepository for TestStore {
    async fn append(&self, feedback: MatchFeedback) -> Result<(), RepositoryError> {
        self.inner.feedback.write().expect("feedback lock").push(feedback);
        Ok(())
    }

    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Vec<MatchFeedback>, RepositoryError> {
        Ok(self
            .inner
            .feedback
            .read()
            .expect("feedback lock")
            .iter()
            .filter(|f| f.gear_id == *gear_id && f.case_id == *case_id)
            .cloned()
            .collect())
    }
}
