use sqlx::Row;

use casefit_core::domain::{
    CaseId, CaseMatch, DimensionFit, GearId, PriceCategory, ProtectionLevel,
};
use casefit_core::repository::{MatchRepository, RepositoryError};

use super::{db_err, parse_timestamp};
use crate::DbPool;

pub struct SqlMatchRepository {
    pool: DbPool,
}

impl SqlMatchRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const MATCH_COLUMNS: &str = "gear_id, case_id, compatibility_score, fit_length_pct, \
     fit_width_pct, fit_height_pct, fit_overall_pct, feature_score, price_category, \
     protection, feedback_count, positive_count, negative_count, user_feedback_score, \
     created_at, updated_at";

fn row_to_match(row: &sqlx::sqlite::SqliteRow) -> Result<CaseMatch, RepositoryError> {
    let gear_id: String = row.try_get("gear_id").map_err(RepositoryError::decode)?;
    let case_id: String = row.try_get("case_id").map_err(RepositoryError::decode)?;
    let compatibility_score: i64 =
        row.try_get("compatibility_score").map_err(RepositoryError::decode)?;
    let fit_length_pct: f64 = row.try_get("fit_length_pct").map_err(RepositoryError::decode)?;
    let fit_width_pct: f64 = row.try_get("fit_width_pct").map_err(RepositoryError::decode)?;
    let fit_height_pct: f64 = row.try_get("fit_height_pct").map_err(RepositoryError::decode)?;
    let fit_overall_pct: f64 =
        row.try_get("fit_overall_pct").map_err(RepositoryError::decode)?;
    let feature_score: i64 = row.try_get("feature_score").map_err(RepositoryError::decode)?;
    let price_category: String =
        row.try_get("price_category").map_err(RepositoryError::decode)?;
    let protection: String = row.try_get("protection").map_err(RepositoryError::decode)?;
    let feedback_count: i64 = row.try_get("feedback_count").map_err(RepositoryError::decode)?;
    let positive_count: i64 = row.try_get("positive_count").map_err(RepositoryError::decode)?;
    let negative_count: i64 = row.try_get("negative_count").map_err(RepositoryError::decode)?;
    let user_feedback_score: Option<f64> =
        row.try_get("user_feedback_score").map_err(RepositoryError::decode)?;
    let created_at: String = row.try_get("created_at").map_err(RepositoryError::decode)?;
    let updated_at: String = row.try_get("updated_at").map_err(RepositoryError::decode)?;

    let price_category = PriceCategory::parse(&price_category)
        .ok_or_else(|| RepositoryError::decode(format!("unknown price category `{price_category}`")))?;
    let protection = ProtectionLevel::parse(&protection)
        .ok_or_else(|| RepositoryError::decode(format!("unknown protection level `{protection}`")))?;

    Ok(CaseMatch {
        gear_id: GearId(gear_id),
        case_id: CaseId(case_id),
        compatibility_score,
        dimension_fit: DimensionFit {
            length_pct: fit_length_pct,
            width_pct: fit_width_pct,
            height_pct: fit_height_pct,
            overall_pct: fit_overall_pct,
        },
        feature_score,
        price_category,
        protection,
        feedback_count,
        positive_count,
        negative_count,
        user_feedback_score,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait::async_trait]
impl MatchRepository for SqlMatchRepository {
    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Option<CaseMatch>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM case_match WHERE gear_id = ? AND case_id = ?"
        ))
        .bind(&gear_id.0)
        .bind(&case_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(row_to_match).transpose()
    }

    async fn upsert(&self, case_match: CaseMatch) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO case_match
                (gear_id, case_id, compatibility_score, fit_length_pct, fit_width_pct,
                 fit_height_pct, fit_overall_pct, feature_score, price_category, protection,
                 feedback_count, positive_count, negative_count, user_feedback_score,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(gear_id, case_id) DO UPDATE SET
                compatibility_score = excluded.compatibility_score,
                fit_length_pct = excluded.fit_length_pct,
                fit_width_pct = excluded.fit_width_pct,
                fit_height_pct = excluded.fit_height_pct,
                fit_overall_pct = excluded.fit_overall_pct,
                feature_score = excluded.feature_score,
                price_category = excluded.price_category,
                protection = excluded.protection,
                feedback_count = excluded.feedback_count,
                positive_count = excluded.positive_count,
                negative_count = excluded.negative_count,
                user_feedback_score = excluded.user_feedback_score,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
        )
        .bind(&case_match.gear_id.0)
        .bind(&case_match.case_id.0)
        .bind(case_match.compatibility_score)
        .bind(case_match.dimension_fit.length_pct)
        .bind(case_match.dimension_fit.width_pct)
        .bind(case_match.dimension_fit.height_pct)
        .bind(case_match.dimension_fit.overall_pct)
        .bind(case_match.feature_score)
        .bind(case_match.price_category.as_str())
        .bind(case_match.protection.as_str())
        .bind(case_match.feedback_count)
        .bind(case_match.positive_count)
        .bind(case_match.negative_count)
        .bind(case_match.user_feedback_score)
        .bind(case_match.created_at.to_rfc3339())
        .bind(case_match.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_for_gear(&self, gear_id: &GearId) -> Result<Vec<CaseMatch>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM case_match
             WHERE gear_id = ?
             ORDER BY compatibility_score DESC, case_id ASC"
        ))
        .bind(&gear_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_match).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample_match(gear: &str, case: &str, score: i64) -> CaseMatch {
        CaseMatch::scored(
            GearId::new(gear),
            CaseId::new(case),
            score,
            DimensionFit {
                length_pct: 90.0,
                width_pct: 90.0,
                height_pct: 90.0,
                overall_pct: 90.0,
            },
            82,
            PriceCategory::MidRange,
            ProtectionLevel::High,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn upsert_then_find_round_trip() {
        let repo = SqlMatchRepository::new(setup().await);
        let record = sample_match("gear-1", "case-1", 94);

        repo.upsert(record.clone()).await.expect("upsert");
        let found = repo
            .find_by_pair(&record.gear_id, &record.case_id)
            .await
            .expect("find")
            .expect("some");

        assert_eq!(found.compatibility_score, 94);
        assert_eq!(found.dimension_fit, record.dimension_fit);
        assert_eq!(found.price_category, PriceCategory::MidRange);
    }

    #[tokio::test]
    async fn pair_uniqueness_holds_across_upserts() {
        let pool = setup().await;
        let repo = SqlMatchRepository::new(pool.clone());

        repo.upsert(sample_match("gear-1", "case-1", 80)).await.expect("first");
        repo.upsert(sample_match("gear-1", "case-1", 91)).await.expect("second");

        let count = sqlx::query("SELECT COUNT(*) AS count FROM case_match")
            .fetch_one(&pool)
            .await
            .expect("count query")
            .get::<i64, _>("count");
        assert_eq!(count, 1);

        let found = repo
            .find_by_pair(&GearId::new("gear-1"), &CaseId::new("case-1"))
            .await
            .expect("find")
            .expect("some");
        assert_eq!(found.compatibility_score, 91);
    }

    #[tokio::test]
    async fn identical_upserts_are_idempotent() {
        let repo = SqlMatchRepository::new(setup().await);
        let record = sample_match("gear-1", "case-1", 88);

        repo.upsert(record.clone()).await.expect("first");
        repo.upsert(record.clone()).await.expect("second");

        let found = repo
            .find_by_pair(&record.gear_id, &record.case_id)
            .await
            .expect("find")
            .expect("some");
        assert_eq!(found.compatibility_score, record.compatibility_score);
        assert_eq!(found.feedback_count, record.feedback_count);
    }

    #[tokio::test]
    async fn list_for_gear_ranks_by_score() {
        let repo = SqlMatchRepository::new(setup().await);
        repo.upsert(sample_match("gear-1", "case-a", 75)).await.expect("upsert");
        repo.upsert(sample_match("gear-1", "case-b", 92)).await.expect("upsert");
        repo.upsert(sample_match("gear-2", "case-a", 99)).await.expect("upsert");

        let listed = repo.list_for_gear(&GearId::new("gear-1")).await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|m| m.case_id.as_str()).collect();
        assert_eq!(ids, vec!["case-b", "case-a"]);
    }
}
