use sqlx::{QueryBuilder, Row, Sqlite};

use casefit_core::domain::{
    Case, CaseId, DimensionUnit, Dimensions, ProtectionLevel, Weight, WeightUnit,
};
use casefit_core::repository::{
    CaseFilter, CaseRepository, CaseSort, CaseSortField, RepositoryError,
};

use super::{cents_to_price, db_err, price_to_cents};
use crate::DbPool;

pub struct SqlCaseRepository {
    pool: DbPool,
}

impl SqlCaseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const CASE_COLUMNS: &str = "id, name, brand, internal_length, internal_width, internal_height, \
     external_length, external_width, external_height, dimension_unit, \
     weight_value, weight_unit, price_cents, currency, rating, review_count, \
     protection, waterproof, shockproof, has_handle, has_wheels, has_lock, \
     material, color, description, features";

fn row_to_case(row: &sqlx::sqlite::SqliteRow) -> Result<Case, RepositoryError> {
    let id: String = row.try_get("id").map_err(RepositoryError::decode)?;
    let name: String = row.try_get("name").map_err(RepositoryError::decode)?;
    let brand: String = row.try_get("brand").map_err(RepositoryError::decode)?;
    let internal_length: f64 =
        row.try_get("internal_length").map_err(RepositoryError::decode)?;
    let internal_width: f64 = row.try_get("internal_width").map_err(RepositoryError::decode)?;
    let internal_height: f64 =
        row.try_get("internal_height").map_err(RepositoryError::decode)?;
    let external_length: Option<f64> =
        row.try_get("external_length").map_err(RepositoryError::decode)?;
    let external_width: Option<f64> =
        row.try_get("external_width").map_err(RepositoryError::decode)?;
    let external_height: Option<f64> =
        row.try_get("external_height").map_err(RepositoryError::decode)?;
    let dimension_unit: String =
        row.try_get("dimension_unit").map_err(RepositoryError::decode)?;
    let weight_value: f64 = row.try_get("weight_value").map_err(RepositoryError::decode)?;
    let weight_unit: String = row.try_get("weight_unit").map_err(RepositoryError::decode)?;
    let price_cents: i64 = row.try_get("price_cents").map_err(RepositoryError::decode)?;
    let currency: String = row.try_get("currency").map_err(RepositoryError::decode)?;
    let rating: Option<f64> = row.try_get("rating").map_err(RepositoryError::decode)?;
    let review_count: i64 = row.try_get("review_count").map_err(RepositoryError::decode)?;
    let protection: String = row.try_get("protection").map_err(RepositoryError::decode)?;
    let waterproof: bool = row.try_get("waterproof").map_err(RepositoryError::decode)?;
    let shockproof: bool = row.try_get("shockproof").map_err(RepositoryError::decode)?;
    let has_handle: bool = row.try_get("has_handle").map_err(RepositoryError::decode)?;
    let has_wheels: bool = row.try_get("has_wheels").map_err(RepositoryError::decode)?;
    let has_lock: bool = row.try_get("has_lock").map_err(RepositoryError::decode)?;
    let material: String = row.try_get("material").map_err(RepositoryError::decode)?;
    let color: String = row.try_get("color").map_err(RepositoryError::decode)?;
    let description: String = row.try_get("description").map_err(RepositoryError::decode)?;
    let features_json: String = row.try_get("features").map_err(RepositoryError::decode)?;

    let dimension_unit = DimensionUnit::parse(&dimension_unit)
        .ok_or_else(|| RepositoryError::decode(format!("unknown dimension unit `{dimension_unit}`")))?;
    let weight_unit = WeightUnit::parse(&weight_unit)
        .ok_or_else(|| RepositoryError::decode(format!("unknown weight unit `{weight_unit}`")))?;
    let protection = ProtectionLevel::parse(&protection)
        .ok_or_else(|| RepositoryError::decode(format!("unknown protection level `{protection}`")))?;
    let features: Vec<String> = serde_json::from_str(&features_json)
        .map_err(|error| RepositoryError::decode(format!("bad feature list: {error}")))?;

    let external = match (external_length, external_width, external_height) {
        (Some(length), Some(width), Some(height)) => {
            Some(Dimensions::new(length, width, height, dimension_unit))
        }
        _ => None,
    };

    Ok(Case {
        id: CaseId(id),
        name,
        brand,
        internal: Dimensions::new(internal_length, internal_width, internal_height, dimension_unit),
        external,
        weight: Weight::new(weight_value, weight_unit),
        price: cents_to_price(price_cents),
        currency,
        rating,
        review_count,
        protection,
        waterproof,
        shockproof,
        has_handle,
        has_wheels,
        has_lock,
        material,
        color,
        description,
        features,
    })
}

/// Compile the filter conjunction onto the builder. Every predicate is an
/// equality, range, or `IN` check over indexed-or-cheap columns.
fn push_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    filter: &CaseFilter,
) -> Result<(), RepositoryError> {
    builder.push(" WHERE 1 = 1");

    if let Some([min_length, min_width, min_height]) = filter.min_internal {
        builder.push(" AND internal_length >= ").push_bind(min_length);
        builder.push(" AND internal_width >= ").push_bind(min_width);
        builder.push(" AND internal_height >= ").push_bind(min_height);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price_cents <= ").push_bind(price_to_cents(max_price)?);
    }
    if let Some(protection) = filter.protection {
        builder.push(" AND protection = ").push_bind(protection.as_str());
    }
    for (column, wanted) in [
        ("waterproof", filter.waterproof),
        ("shockproof", filter.shockproof),
        ("has_handle", filter.has_handle),
        ("has_wheels", filter.has_wheels),
        ("has_lock", filter.has_lock),
    ] {
        if let Some(wanted) = wanted {
            builder.push(format!(" AND {column} = ")).push_bind(wanted);
        }
    }
    if let Some(brands) = &filter.brands {
        if !brands.is_empty() {
            builder.push(" AND brand IN (");
            let mut separated = builder.separated(", ");
            for brand in brands {
                separated.push_bind(brand.clone());
            }
            separated.push_unseparated(")");
        }
    }
    Ok(())
}

fn push_order(builder: &mut QueryBuilder<'_, Sqlite>, sort: CaseSort) {
    builder.push(" ORDER BY ");
    builder.push(match sort.field {
        CaseSortField::Price => "price_cents",
        CaseSortField::Rating => "rating",
        // review volume stands in for popularity on the case side
        CaseSortField::Popularity => "review_count",
    });
    builder.push(if sort.descending { " DESC" } else { " ASC" });
    builder.push(", id ASC");
}

#[async_trait::async_trait]
impl CaseRepository for SqlCaseRepository {
    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(row_to_case).transpose()
    }

    async fn find_by_query(
        &self,
        filter: &CaseFilter,
        sort: CaseSort,
        skip: u32,
        limit: Option<u32>,
    ) -> Result<Vec<Case>, RepositoryError> {
        let mut builder = QueryBuilder::new(format!("SELECT {CASE_COLUMNS} FROM cases"));
        push_filters(&mut builder, filter)?;
        push_order(&mut builder, sort);
        builder.push(" LIMIT ").push_bind(limit.map(i64::from).unwrap_or(-1));
        builder.push(" OFFSET ").push_bind(i64::from(skip));

        let rows = builder.build().fetch_all(&self.pool).await.map_err(db_err)?;
        rows.iter().map(row_to_case).collect()
    }

    async fn count(&self, filter: &CaseFilter) -> Result<u64, RepositoryError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) AS count FROM cases");
        push_filters(&mut builder, filter)?;

        let row = builder.build().fetch_one(&self.pool).await.map_err(db_err)?;
        let count: i64 = row.try_get("count").map_err(RepositoryError::decode)?;
        Ok(count as u64)
    }

    async fn save(&self, case: Case) -> Result<(), RepositoryError> {
        let features_json = serde_json::to_string(&case.features)
            .map_err(|error| RepositoryError::decode(format!("bad feature list: {error}")))?;

        sqlx::query(
            "INSERT INTO cases
                (id, name, brand, internal_length, internal_width, internal_height,
                 external_length, external_width, external_height, dimension_unit,
                 weight_value, weight_unit, price_cents, currency, rating, review_count,
                 protection, waterproof, shockproof, has_handle, has_wheels, has_lock,
                 material, color, description, features)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                brand = excluded.brand,
                internal_length = excluded.internal_length,
                internal_width = excluded.internal_width,
                internal_height = excluded.internal_height,
                external_length = excluded.external_length,
                external_width = excluded.external_width,
                external_height = excluded.external_height,
                dimension_unit = excluded.dimension_unit,
                weight_value = excluded.weight_value,
                weight_unit = excluded.weight_unit,
                price_cents = excluded.price_cents,
                currency = excluded.currency,
                rating = excluded.rating,
                review_count = excluded.review_count,
                protection = excluded.protection,
                waterproof = excluded.waterproof,
                shockproof = excluded.shockproof,
                has_handle = excluded.has_handle,
                has_wheels = excluded.has_wheels,
                has_lock = excluded.has_lock,
                material = excluded.material,
                color = excluded.color,
                description = excluded.description,
                features = excluded.features",
        )
        .bind(&case.id.0)
        .bind(&case.name)
        .bind(&case.brand)
        .bind(case.internal.length)
        .bind(case.internal.width)
        .bind(case.internal.height)
        .bind(case.external.map(|d| d.length))
        .bind(case.external.map(|d| d.width))
        .bind(case.external.map(|d| d.height))
        .bind(case.internal.unit.as_str())
        .bind(case.weight.value)
        .bind(case.weight.unit.as_str())
        .bind(price_to_cents(case.price)?)
        .bind(&case.currency)
        .bind(case.rating)
        .bind(case.review_count)
        .bind(case.protection.as_str())
        .bind(case.waterproof)
        .bind(case.shockproof)
        .bind(case.has_handle)
        .bind(case.has_wheels)
        .bind(case.has_lock)
        .bind(&case.material)
        .bind(&case.color)
        .bind(&case.description)
        .bind(features_json)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
