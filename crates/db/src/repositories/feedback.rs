use sqlx::Row;
use uuid::Uuid;

use casefit_core::domain::{CaseId, GearId, MatchFeedback};
use casefit_core::repository::{FeedbackRepository, RepositoryError};

use super::{db_err, parse_timestamp};
use crate::DbPool;

pub struct SqlFeedbackRepository {
    pool: DbPool,
}

impl SqlFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn rating_column(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<u8>, RepositoryError> {
    let value: Option<i64> = row.try_get(column).map_err(RepositoryError::decode)?;
    value
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| RepositoryError::decode(format!("{column} out of range: {v}")))
        })
        .transpose()
}

fn row_to_feedback(row: &sqlx::sqlite::SqliteRow) -> Result<MatchFeedback, RepositoryError> {
    let id: String = row.try_get("id").map_err(RepositoryError::decode)?;
    let gear_id: String = row.try_get("gear_id").map_err(RepositoryError::decode)?;
    let case_id: String = row.try_get("case_id").map_err(RepositoryError::decode)?;
    let rating: i64 = row.try_get("rating").map_err(RepositoryError::decode)?;
    let purchased: bool = row.try_get("purchased").map_err(RepositoryError::decode)?;
    let comment: Option<String> = row.try_get("comment").map_err(RepositoryError::decode)?;
    let created_at: String = row.try_get("created_at").map_err(RepositoryError::decode)?;

    let id = Uuid::parse_str(&id)
        .map_err(|error| RepositoryError::decode(format!("bad feedback id `{id}`: {error}")))?;
    let rating = u8::try_from(rating)
        .map_err(|_| RepositoryError::decode(format!("rating out of range: {rating}")))?;

    Ok(MatchFeedback {
        id,
        gear_id: GearId(gear_id),
        case_id: CaseId(case_id),
        rating,
        fit_accuracy: rating_column(row, "fit_accuracy")?,
        protection_quality: rating_column(row, "protection_quality")?,
        value_for_money: rating_column(row, "value_for_money")?,
        purchased,
        comment,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait::async_trait]
impl FeedbackRepository for SqlFeedbackRepository {
    async fn append(&self, feedback: MatchFeedback) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO match_feedback
                (id, gear_id, case_id, rating, fit_accuracy, protection_quality,
                 value_for_money, purchased, comment, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(feedback.id.to_string())
        .bind(&feedback.gear_id.0)
        .bind(&feedback.case_id.0)
        .bind(i64::from(feedback.rating))
        .bind(feedback.fit_accuracy.map(i64::from))
        .bind(feedback.protection_quality.map(i64::from))
        .bind(feedback.value_for_money.map(i64::from))
        .bind(feedback.purchased)
        .bind(&feedback.comment)
        .bind(feedback.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_pair(
        &self,
        gear_id: &GearId,
        case_id: &CaseId,
    ) -> Result<Vec<MatchFeedback>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, gear_id, case_id, rating, fit_accuracy, protection_quality,
                    value_for_money, purchased, comment, created_at
             FROM match_feedback
             WHERE gear_id = ? AND case_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(&gear_id.0)
        .bind(&case_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_feedback).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use casefit_core::domain::NewFeedback;

    use super::*;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample_feedback(rating: u8) -> MatchFeedback {
        let mut submission =
            NewFeedback::new(GearId::new("gear-1"), CaseId::new("case-1"), rating);
        submission.purchased = true;
        submission.comment = Some("snug fit, solid latches".to_owned());
        submission.into_record(Utc::now())
    }

    #[tokio::test]
    async fn append_and_find_round_trip() {
        let repo = SqlFeedbackRepository::new(setup().await);
        let record = sample_feedback(5);

        repo.append(record.clone()).await.expect("append");
        let found =
            repo.find_by_pair(&record.gear_id, &record.case_id).await.expect("find");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0], record);
    }

    #[tokio::test]
    async fn multiple_submissions_are_all_retained() {
        let repo = SqlFeedbackRepository::new(setup().await);
        for rating in [5, 4, 5] {
            repo.append(sample_feedback(rating)).await.expect("append");
        }

        let found = repo
            .find_by_pair(&GearId::new("gear-1"), &CaseId::new("case-1"))
            .await
            .expect("find");
        assert_eq!(found.len(), 3);
        let ratings: Vec<u8> = found.iter().map(|f| f.rating).collect();
        assert_eq!(ratings.iter().sum::<u8>(), 14);
    }

    #[tokio::test]
    async fn pairs_are_isolated() {
        let repo = SqlFeedbackRepository::new(setup().await);
        repo.append(sample_feedback(4)).await.expect("append");

        let other = repo
            .find_by_pair(&GearId::new("gear-1"), &CaseId::new("other-case"))
            .await
            .expect("find");
        assert!(other.is_empty());
    }
}
