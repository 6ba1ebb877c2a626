use sqlx::Row;

use casefit_core::domain::{DimensionUnit, Dimensions, Gear, GearId, Weight, WeightUnit};
use casefit_core::repository::{GearRepository, RepositoryError};

use super::db_err;
use crate::DbPool;

pub struct SqlGearRepository {
    pool: DbPool,
}

impl SqlGearRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const GEAR_COLUMNS: &str = "id, name, category, gear_type, length, width, height, \
     dimension_unit, weight_value, weight_unit, popularity";

fn row_to_gear(row: &sqlx::sqlite::SqliteRow) -> Result<Gear, RepositoryError> {
    let id: String = row.try_get("id").map_err(RepositoryError::decode)?;
    let name: String = row.try_get("name").map_err(RepositoryError::decode)?;
    let category: String = row.try_get("category").map_err(RepositoryError::decode)?;
    let gear_type: String = row.try_get("gear_type").map_err(RepositoryError::decode)?;
    let length: f64 = row.try_get("length").map_err(RepositoryError::decode)?;
    let width: f64 = row.try_get("width").map_err(RepositoryError::decode)?;
    let height: f64 = row.try_get("height").map_err(RepositoryError::decode)?;
    let dimension_unit: String =
        row.try_get("dimension_unit").map_err(RepositoryError::decode)?;
    let weight_value: f64 = row.try_get("weight_value").map_err(RepositoryError::decode)?;
    let weight_unit: String = row.try_get("weight_unit").map_err(RepositoryError::decode)?;
    let popularity: i64 = row.try_get("popularity").map_err(RepositoryError::decode)?;

    let dimension_unit = DimensionUnit::parse(&dimension_unit)
        .ok_or_else(|| RepositoryError::decode(format!("unknown dimension unit `{dimension_unit}`")))?;
    let weight_unit = WeightUnit::parse(&weight_unit)
        .ok_or_else(|| RepositoryError::decode(format!("unknown weight unit `{weight_unit}`")))?;

    Ok(Gear {
        id: GearId(id),
        name,
        category,
        gear_type,
        dimensions: Dimensions::new(length, width, height, dimension_unit),
        weight: Weight::new(weight_value, weight_unit),
        popularity,
    })
}

#[async_trait::async_trait]
impl GearRepository for SqlGearRepository {
    async fn find_by_id(&self, id: &GearId) -> Result<Option<Gear>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {GEAR_COLUMNS} FROM gear WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(row_to_gear).transpose()
    }

    async fn list(&self, skip: u32, limit: Option<u32>) -> Result<Vec<Gear>, RepositoryError> {
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = sqlx::query(&format!(
            "SELECT {GEAR_COLUMNS} FROM gear
             ORDER BY popularity DESC, id ASC
             LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(i64::from(skip))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_gear).collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM gear")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let count: i64 = row.try_get("count").map_err(RepositoryError::decode)?;
        Ok(count as u64)
    }

    async fn save(&self, gear: Gear) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO gear
                (id, name, category, gear_type, length, width, height,
                 dimension_unit, weight_value, weight_unit, popularity)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                gear_type = excluded.gear_type,
                length = excluded.length,
                width = excluded.width,
                height = excluded.height,
                dimension_unit = excluded.dimension_unit,
                weight_value = excluded.weight_value,
                weight_unit = excluded.weight_unit,
                popularity = excluded.popularity",
        )
        .bind(&gear.id.0)
        .bind(&gear.name)
        .bind(&gear.category)
        .bind(&gear.gear_type)
        .bind(gear.dimensions.length)
        .bind(gear.dimensions.width)
        .bind(gear.dimensions.height)
        .bind(gear.dimensions.unit.as_str())
        .bind(gear.weight.value)
        .bind(gear.weight.unit.as_str())
        .bind(gear.popularity)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use casefit_core::domain::{DimensionUnit, Dimensions, Weight, WeightUnit};

    use super::*;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample_gear(id: &str, popularity: i64) -> Gear {
        Gear {
            id: GearId::new(id),
            name: format!("Gear {id}"),
            category: "synthesizer".to_owned(),
            gear_type: "analog".to_owned(),
            dimensions: Dimensions::new(18.0, 9.0, 4.5, DimensionUnit::In),
            weight: Weight::new(6.2, WeightUnit::Kg),
            popularity,
        }
    }

    #[tokio::test]
    async fn save_and_find_round_trip() {
        let repo = SqlGearRepository::new(setup().await);
        let gear = sample_gear("gear-1", 7);

        repo.save(gear.clone()).await.expect("save");
        let found = repo.find_by_id(&gear.id).await.expect("find");

        assert_eq!(found, Some(gear));
    }

    #[tokio::test]
    async fn save_twice_updates_in_place() {
        let repo = SqlGearRepository::new(setup().await);
        let mut gear = sample_gear("gear-1", 7);
        repo.save(gear.clone()).await.expect("first save");

        gear.name = "Renamed".to_owned();
        repo.save(gear.clone()).await.expect("second save");

        assert_eq!(repo.count().await.expect("count"), 1);
        let found = repo.find_by_id(&gear.id).await.expect("find").expect("some");
        assert_eq!(found.name, "Renamed");
    }

    #[tokio::test]
    async fn list_orders_by_popularity() {
        let repo = SqlGearRepository::new(setup().await);
        repo.save(sample_gear("niche", 1)).await.expect("save");
        repo.save(sample_gear("hit", 50)).await.expect("save");

        let listed = repo.list(0, None).await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["hit", "niche"]);
    }

    #[tokio::test]
    async fn missing_gear_is_none() {
        let repo = SqlGearRepository::new(setup().await);
        assert_eq!(repo.find_by_id(&GearId::new("ghost")).await.expect("find"), None);
    }
}
