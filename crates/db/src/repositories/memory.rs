//! In-memory repository implementations over `tokio::sync::RwLock`. Used as
//! test doubles and as a wiring alternative when no database is wanted.

use std::collections::HashMap;

use tokio::sync::RwLock;

use casefit_core::domain::{Case, CaseId, CaseMatch, Gear, GearId, MatchFeedback};
use casefit_core::repository::{
    CaseFilter, CaseRepository, CaseSort, CaseSortField, FeedbackRepository, GearRepository,
    MatchRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryGearRepository {
    gear: RwLock<HashMap<String, Gear>>,
}

#[async_trait::async_trait]
impl GearRepository for InMemoryGearRepository {
    async fn find_by_id(&self, id: &GearId) -> Result<Option<Gear>, RepositoryError> {
        let gear = self.gear.read().await;
        Ok(gear.get(&id.0).cloned())
    }

    async fn list(&self, skip: u32, limit: Option<u32>) -> Result<Vec<Gear>, RepositoryError> {
        let gear = self.gear.read().await;
        let mut all: Vec<Gear> = gear.values().cloned().collect();
        all.sort_by(|a, b| b.popularity.cmp(&a.popularity).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(all
            .into_iter()
            .skip(skip as usize)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.gear.read().await.len() as u64)
    }

    async fn save(&self, gear: Gear) -> Result<(), RepositoryError> {
        let mut store = self.gear.write().await;
        store.insert(gear.id.0.clone(), gear);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCaseRepository {
    cases: RwLock<HashMap<String, Case>>,
}

fn admits(filter: &CaseFilter, case: &Case) -> bool {
    if let Some([min_length, min_width, min_height]) = filter.min_internal {
        let [length, width, height] = case.internal.axes();
        if length < min_length || width < min_width || height < min_height {
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
    for (wanted, actual) in [
        (filter.waterproof, case.waterproof),
        (filter.shockproof, case.shockproof),
        (filter.has_handle, case.has_handle),
        (filter.has_wheels, case.has_wheels),
        (filter.has_lock, case.has_lock),
    ] {
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

fn order(cases: &mut [Case], sort: CaseSort) {
    cases.sort_by(|a, b| {
        let ordering = match sort.field {
            CaseSortField::Price => a.price.cmp(&b.price),
            CaseSortField::Rating => a
                .rating
                .unwrap_or(0.0)
                .partial_cmp(&b.rating.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal),
            CaseSortField::Popularity => a.review_count.cmp(&b.review_count),
        };
        let ordering = if sort.descending { ordering.reverse() } else { ordering };
        ordering.then_with(|| a.id.0.cmp(&b.id.0))
    });
}

#[async_trait::async_trait]
impl CaseRepository for InMemoryCaseRepository {
    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        let cases = self.cases.read().await;
        Ok(cases.get(&id.0).cloned())
    }

    async fn find_by_query(
        &self,
        filter: &CaseFilter,
        sort: CaseSort,
        skip: u32,
        limit: Option<u32>,
    ) -> Result<Vec<Case>, RepositoryError> {
        let cases = self.cases.read().await;
        let mut matched: Vec<Case> =
            cases.values().filter(|case| admits(filter, case)).cloned().collect();
        order(&mut matched, sort);
        Ok(matched
            .into_iter()
            .skip(skip as usize)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, filter: &CaseFilter) -> Result<u64, RepositoryError> {
        let cases = self.cases.read().await;
        Ok(cases.values().filter(|case| admits(filter, case)).count() as u64)
    }

    async fn save(&self, case: Case) -> Result<(), RepositoryError> {
        let mut store = self.cases.write().await;
        store.insert(case.id.0.clone(), case);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<HashMap<(String, String), CaseMatch>>,
}

#[async_trait::async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Option<CaseMatch>, RepositoryError> {
        let matches = self.matches.read().await;
        Ok(matches.get(&(gear_id.0.clone(), case_id.0.clone())).cloned())
    }

    async fn upsert(&self, case_match: CaseMatch) -> Result<(), RepositoryError> {
        let mut matches = self.matches.write().await;
        let key = (case_match.gear_id.0.clone(), case_match.case_id.0.clone());
        matches.insert(key, case_match);
        Ok(())
    }

    async fn list_for_gear(&self, gear_id: &GearId) -> Result<Vec<CaseMatch>, RepositoryError> {
        let matches = self.matches.read().await;
        let mut rows: Vec<CaseMatch> =
            matches.values().filter(|m| m.gear_id == *gear_id).cloned().collect();
        rows.sort_by(|a, b| {
            b.compatibility_score
                .cmp(&a.compatibility_score)
                .then_with(|| a.case_id.0.cmp(&b.case_id.0))
        });
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    feedback: RwLock<Vec<MatchFeedback>>,
}

#[async_trait::async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn append(&self, feedback: MatchFeedback) -> Result<(), RepositoryError> {
        let mut store = self.feedback.write().await;
        store.push(feedback);
        Ok(())
    }

    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Vec<MatchFeedback>, RepositoryError> {
        let store = self.feedback.read().await;
        Ok(store
            .iter()
            .filter(|f| f.gear_id == *gear_id && f.case_id == *case_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use casefit_core::domain::{
        DimensionFit, DimensionUnit, Dimensions, PriceCategory, ProtectionLevel, Weight,
        WeightUnit,
    };

    use super::*;

    fn sample_case(id: &str, price: i64, review_count: i64) -> Case {
        Case {
            id: CaseId::new(id),
            name: format!("Case {id}"),
            brand: "Vanguard".to_owned(),
            internal: Dimensions::new(20.0, 10.0, 5.0, DimensionUnit::In),
            external: None,
            weight: Weight::new(3.0, WeightUnit::Kg),
            price: Decimal::from(price),
            currency: "USD".to_owned(),
            rating: Some(4.0),
            review_count,
            protection: ProtectionLevel::High,
            waterproof: true,
            shockproof: true,
            has_handle: true,
            has_wheels: false,
            has_lock: false,
            material: "abs".to_owned(),
            color: "black".to_owned(),
            description: "padded".to_owned(),
            features: vec![],
        }
    }

    #[tokio::test]
    async fn case_query_filters_and_sorts() {
        let repo = InMemoryCaseRepository::default();
        repo.save(sample_case("a", 40, 5)).await.expect("save");
        repo.save(sample_case("b", 120, 50)).await.expect("save");

        let filter =
            CaseFilter { max_price: Some(Decimal::from(100)), ..CaseFilter::default() };
        let found =
            repo.find_by_query(&filter, CaseSort::default(), 0, None).await.expect("query");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "a");

        // default ordering: most-reviewed first
        let all = repo
            .find_by_query(&CaseFilter::default(), CaseSort::default(), 0, None)
            .await
            .expect("query");
        assert_eq!(all[0].id.as_str(), "b");
    }

    #[tokio::test]
    async fn match_upsert_keeps_one_row_per_pair() {
        let repo = InMemoryMatchRepository::default();
        let first = CaseMatch::scored(
            GearId::new("g"),
            CaseId::new("c"),
            80,
            DimensionFit::neutral(),
            75,
            PriceCategory::MidRange,
            ProtectionLevel::High,
            Utc::now(),
        );
        let mut second = first.clone();
        second.compatibility_score = 90;

        repo.upsert(first).await.expect("first");
        repo.upsert(second).await.expect("second");

        let listed = repo.list_for_gear(&GearId::new("g")).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].compatibility_score, 90);
    }
}
