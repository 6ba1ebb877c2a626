//! Cache-aside decorator for the case catalog.
//!
//! Catalog reads dominate the matching workload and the catalog itself
//! changes rarely, so query results are held for an explicit TTL. Writes go
//! straight through and drop the whole cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use casefit_core::domain::{Case, CaseId};
use casefit_core::repository::{CaseFilter, CaseRepository, CaseSort, RepositoryError};

struct Entry<T> {
    stored_at: Instant,
    value: T,
}

impl<T: Clone> Entry<T> {
    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.stored_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

pub struct CachedCaseRepository {
    inner: Arc<dyn CaseRepository>,
    ttl: Duration,
    queries: Mutex<HashMap<String, Entry<Vec<Case>>>>,
    counts: Mutex<HashMap<String, Entry<u64>>>,
}

impl CachedCaseRepository {
    pub fn new(inner: Arc<dyn CaseRepository>, ttl: Duration) -> Self {
        Self { inner, ttl, queries: Mutex::new(HashMap::new()), counts: Mutex::new(HashMap::new()) }
    }

    fn query_key(filter: &CaseFilter, sort: CaseSort, skip: u32, limit: Option<u32>) -> String {
        format!("{filter:?}|{sort:?}|{skip}|{limit:?}")
    }

    async fn invalidate(&self) {
        self.queries.lock().await.clear();
        self.counts.lock().await.clear();
    }
}

#[async_trait::async_trait]
impl CaseRepository for CachedCaseRepository {
    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        // Point lookups are cheap and rare; not worth staleness.
        self.inner.find_by_id(id).await
    }

    async fn find_by_query(
        &self,
        filter: &CaseFilter,
        sort: CaseSort,
        skip: u32,
        limit: Option<u32>,
    ) -> Result<Vec<Case>, RepositoryError> {
        let key = Self::query_key(filter, sort, skip, limit);

        if let Some(entry) = self.queries.lock().await.get(&key) {
            if let Some(cases) = entry.fresh(self.ttl) {
                return Ok(cases);
            }
        }

        let cases = self.inner.find_by_query(filter, sort, skip, limit).await?;
        self.queries
            .lock()
            .await
            .insert(key, Entry { stored_at: Instant::now(), value: cases.clone() });
        Ok(cases)
    }

    async fn count(&self, filter: &CaseFilter) -> Result<u64, RepositoryError> {
        let key = format!("{filter:?}");

        if let Some(entry) = self.counts.lock().await.get(&key) {
            if let Some(count) = entry.fresh(self.ttl) {
                return Ok(count);
            }
        }

        let count = self.inner.count(filter).await?;
        self.counts.lock().await.insert(key, Entry { stored_at: Instant::now(), value: count });
        Ok(count)
    }

    async fn save(&self, case: Case) -> Result<(), RepositoryError> {
        self.inner.save(case).await?;
        self.invalidate().await;
        Ok(())
    }
}
