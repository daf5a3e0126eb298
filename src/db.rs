use std::collections::HashMap;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

use crate::importer::{self, SalesRow};
use crate::models::{
    CategoryTotal, DashboardFilter, DatasetRecord, SellerChanges, SellerRankingRow, SellerRecord,
    SeriesPoint,
};

const DEMO_CSV: &str = include_str!("../demo/sales_with_seller.csv");
const DEMO_DATASET_NAME: &str = "Demo - Sales (CSV seed)";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn get_or_create_seller(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    name: &str,
) -> anyhow::Result<Uuid> {
    let seller_id: Uuid = sqlx::query(
        r#"
        INSERT INTO sales_insights.sellers (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(&mut **tx)
    .await?
    .get("id");

    Ok(seller_id)
}

fn dataset_row_count(rows: usize) -> anyhow::Result<i32> {
    i32::try_from(rows).with_context(|| format!("{rows} rows do not fit in one dataset"))
}

/// Stores parsed rows as a new dataset and returns its id.
pub async fn import_rows(
    pool: &PgPool,
    name: &str,
    source_filename: Option<&str>,
    rows: &[SalesRow],
) -> anyhow::Result<Uuid> {
    let mut tx = pool.begin().await?;
    let dataset_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO sales_insights.datasets (id, name, source_filename, status)
        VALUES ($1, $2, $3, 'processing')
        "#,
    )
    .bind(dataset_id)
    .bind(name)
    .bind(source_filename)
    .execute(&mut *tx)
    .await?;

    let mut seller_cache: HashMap<String, Uuid> = HashMap::new();
    for row in rows {
        let seller_id = match row.seller_name.as_deref() {
            Some(seller_name) => match seller_cache.get(seller_name) {
                Some(id) => Some(*id),
                None => {
                    let id = get_or_create_seller(&mut tx, seller_name).await?;
                    seller_cache.insert(seller_name.to_string(), id);
                    Some(id)
                }
            },
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO sales_insights.records
            (dataset_id, seller_id, event_date, category, value)
            VALUES ($1, $2, $3, $4, $5::numeric(14, 2))
            "#,
        )
        .bind(dataset_id)
        .bind(seller_id)
        .bind(row.event_date)
        .bind(row.category.as_deref())
        .bind(row.value)
        .execute(&mut *tx)
        .await?;
    }

    let row_count = dataset_row_count(rows.len())?;
    let date_min = rows.iter().map(|r| r.event_date).min();
    let date_max = rows.iter().map(|r| r.event_date).max();
    sqlx::query(
        r#"
        UPDATE sales_insights.datasets
        SET row_count = $2, date_min = $3, date_max = $4, status = 'ready'
        WHERE id = $1
        "#,
    )
    .bind(dataset_id)
    .bind(row_count)
    .bind(date_min)
    .bind(date_max)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(%dataset_id, rows = rows.len(), sellers = seller_cache.len(), "dataset imported");
    Ok(dataset_id)
}

fn dataset_from_row(row: &sqlx::postgres::PgRow) -> DatasetRecord {
    DatasetRecord {
        id: row.get("id"),
        name: row.get("name"),
        source_filename: row.get("source_filename"),
        status: row.get("status"),
        row_count: row.get("row_count"),
        date_min: row.get("date_min"),
        date_max: row.get("date_max"),
    }
}

const DATASET_COLUMNS: &str =
    "SELECT id, name, source_filename, status, row_count, date_min, date_max FROM sales_insights.datasets";

pub async fn list_datasets(pool: &PgPool) -> anyhow::Result<Vec<DatasetRecord>> {
    let rows = sqlx::query(&format!("{DATASET_COLUMNS} ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(dataset_from_row).collect())
}

/// Looks up the given dataset, or the most recent one when no id is passed.
pub async fn resolve_dataset(pool: &PgPool, id: Option<Uuid>) -> anyhow::Result<DatasetRecord> {
    let row = match id {
        Some(id) => sqlx::query(&format!("{DATASET_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .with_context(|| format!("dataset {id} not found"))?,
        None => sqlx::query(&format!("{DATASET_COLUMNS} ORDER BY created_at DESC LIMIT 1"))
            .fetch_optional(pool)
            .await?
            .context("no datasets imported yet")?,
    };
    Ok(dataset_from_row(&row))
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &DashboardFilter) {
    query.push(" WHERE r.dataset_id = ").push_bind(filter.dataset_id);
    if let Some(start) = filter.start {
        query.push(" AND r.event_date >= ").push_bind(start);
    }
    if let Some(end) = filter.end {
        query.push(" AND r.event_date <= ").push_bind(end);
    }
    if let Some(seller_id) = filter.seller_id {
        query.push(" AND r.seller_id = ").push_bind(seller_id);
    }
}

pub async fn fetch_series(pool: &PgPool, filter: &DashboardFilter) -> anyhow::Result<Vec<SeriesPoint>> {
    filter.validate()?;
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT r.event_date, COALESCE(SUM(r.value), 0)::float8 AS value FROM sales_insights.records r",
    );
    push_filter(&mut query, filter);
    query.push(" GROUP BY r.event_date ORDER BY r.event_date ASC");

    let rows = query.build().fetch_all(pool).await?;
    let mut series = Vec::with_capacity(rows.len());
    for row in rows {
        let date: NaiveDate = row.get("event_date");
        series.push(SeriesPoint::new(date.to_string(), row.get::<f64, _>("value")));
    }
    Ok(series)
}

pub async fn fetch_seller_ranking(
    pool: &PgPool,
    filter: &DashboardFilter,
    limit: i64,
) -> anyhow::Result<Vec<SellerRankingRow>> {
    filter.validate()?;
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT s.id AS seller_id, s.name AS seller_name, \
         COALESCE(SUM(r.value), 0)::float8 AS total_value, \
         COUNT(DISTINCT r.event_date) AS days \
         FROM sales_insights.sellers s \
         JOIN sales_insights.records r ON r.seller_id = s.id",
    );
    push_filter(&mut query, filter);
    query
        .push(" GROUP BY s.id, s.name ORDER BY total_value DESC, s.name ASC LIMIT ")
        .push_bind(limit);

    let rows = query.build().fetch_all(pool).await?;
    let mut ranking = Vec::with_capacity(rows.len());
    for row in rows {
        let seller_id: Uuid = row.get("seller_id");
        let total_value: f64 = row.get("total_value");
        let days: i64 = row.get("days");
        ranking.push(SellerRankingRow {
            seller_id: seller_id.to_string(),
            seller_name: row.get("seller_name"),
            total_value,
            avg_daily_value: if days > 0 { total_value / days as f64 } else { 0.0 },
            days: days.max(0) as u32,
        });
    }
    Ok(ranking)
}

pub async fn fetch_top_categories(
    pool: &PgPool,
    filter: &DashboardFilter,
    limit: i64,
) -> anyhow::Result<Vec<CategoryTotal>> {
    filter.validate()?;
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT r.category, COALESCE(SUM(r.value), 0)::float8 AS value FROM sales_insights.records r",
    );
    push_filter(&mut query, filter);
    query
        .push(" AND r.category IS NOT NULL GROUP BY r.category ORDER BY value DESC LIMIT ")
        .push_bind(limit);

    let rows = query.build().fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| CategoryTotal {
            category: row.get("category"),
            value: row.get("value"),
        })
        .collect())
}

/// Imports the bundled demo dataset when no dataset exists yet.
pub async fn seed_if_empty(pool: &PgPool) -> anyhow::Result<Option<Uuid>> {
    let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM sales_insights.datasets")
        .fetch_one(pool)
        .await?
        .get("count");
    if count > 0 {
        info!(count, "datasets already present, skipping seed");
        return Ok(None);
    }

    let rows = demo_rows()?;
    let dataset_id = import_rows(pool, DEMO_DATASET_NAME, Some("sales_with_seller.csv"), &rows).await?;
    Ok(Some(dataset_id))
}

fn demo_rows() -> anyhow::Result<Vec<SalesRow>> {
    importer::parse_sales_csv(csv::Reader::from_reader(DEMO_CSV.as_bytes()))
        .context("bundled demo CSV is invalid")
}

pub async fn update_dataset(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    status: Option<&str>,
) -> anyhow::Result<DatasetRecord> {
    let row = sqlx::query(
        r#"
        UPDATE sales_insights.datasets
        SET name = COALESCE($2, name), status = COALESCE($3, status)
        WHERE id = $1
        RETURNING id, name, source_filename, status, row_count, date_min, date_max
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("dataset {id} not found"))?;

    Ok(dataset_from_row(&row))
}

/// Deletes a dataset together with its records.
pub async fn delete_dataset(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
    let result = sqlx::query("DELETE FROM sales_insights.datasets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    anyhow::ensure!(result.rows_affected() > 0, "dataset {id} not found");
    Ok(())
}

fn seller_from_row(row: &sqlx::postgres::PgRow) -> SellerRecord {
    SellerRecord {
        id: row.get("id"),
        name: row.get("name"),
        region: row.get("region"),
        is_active: row.get("is_active"),
    }
}

pub async fn create_seller(
    pool: &PgPool,
    name: &str,
    region: Option<&str>,
    is_active: bool,
) -> anyhow::Result<SellerRecord> {
    let row = sqlx::query(
        r#"
        INSERT INTO sales_insights.sellers (id, name, region, is_active)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO NOTHING
        RETURNING id, name, region, is_active
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(region)
    .bind(is_active)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("seller name {name:?} already exists"))?;

    Ok(seller_from_row(&row))
}

pub async fn list_sellers(pool: &PgPool, search: Option<&str>) -> anyhow::Result<Vec<SellerRecord>> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT id, name, region, is_active FROM sales_insights.sellers",
    );
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        query.push(" WHERE name ILIKE ").push_bind(format!("%{search}%"));
    }
    query.push(" ORDER BY name ASC");

    let rows = query.build().fetch_all(pool).await?;
    Ok(rows.iter().map(seller_from_row).collect())
}

pub async fn update_seller(
    pool: &PgPool,
    id: Uuid,
    changes: &SellerChanges,
) -> anyhow::Result<SellerRecord> {
    if let Some(name) = changes.name.as_deref() {
        let duplicate = sqlx::query(
            "SELECT 1 FROM sales_insights.sellers WHERE name = $1 AND id <> $2",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        anyhow::ensure!(duplicate.is_none(), "seller name {name:?} already exists");
    }

    let row = sqlx::query(
        r#"
        UPDATE sales_insights.sellers
        SET name = COALESCE($2, name),
            region = CASE WHEN $3 THEN $4 ELSE region END,
            is_active = COALESCE($5, is_active)
        WHERE id = $1
        RETURNING id, name, region, is_active
        "#,
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.region.is_some())
    .bind(changes.region.clone().flatten())
    .bind(changes.is_active)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("seller {id} not found"))?;

    Ok(seller_from_row(&row))
}

/// Deletes a seller; their records stay in place without a seller.
pub async fn delete_seller(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
    let result = sqlx::query("DELETE FROM sales_insights.sellers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    anyhow::ensure!(result.rows_affected() > 0, "seller {id} not found");
    Ok(())
}

/// Links a record to a seller, or unlinks it when `seller_id` is `None`.
pub async fn assign_record_seller(
    pool: &PgPool,
    record_id: i64,
    seller_id: Option<Uuid>,
) -> anyhow::Result<()> {
    if let Some(seller_id) = seller_id {
        let exists = sqlx::query("SELECT 1 FROM sales_insights.sellers WHERE id = $1")
            .bind(seller_id)
            .fetch_optional(pool)
            .await?;
        anyhow::ensure!(exists.is_some(), "seller {seller_id} not found");
    }

    let result = sqlx::query("UPDATE sales_insights.records SET seller_id = $2 WHERE id = $1")
        .bind(record_id)
        .bind(seller_id)
        .execute(pool)
        .await?;
    anyhow::ensure!(result.rows_affected() > 0, "record {record_id} not found");
    Ok(())
}
