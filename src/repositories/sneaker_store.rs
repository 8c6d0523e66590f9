//! SQLite row store for sneakers

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use super::traits::Repository;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Brand, Gender, NewSneaker, Photo, SneakerPatch, SneakerRecord, SneakerStatus};
use crate::utils::datetime::DateTimeParser;

/// Query parameters for listing sneakers
#[derive(Debug, Clone, Default)]
pub struct SneakerQuery {
    pub owner_id: Option<Uuid>,
    pub limit: Option<u32>,
}

impl SneakerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Any repository that stores sneaker rows
pub trait SneakerRows:
    Repository<
    SneakerRecord,
    Uuid,
    CreateRequest = NewSneaker,
    UpdateRequest = SneakerPatch,
    Query = SneakerQuery,
>
{
}

impl<T> SneakerRows for T where
    T: Repository<
        SneakerRecord,
        Uuid,
        CreateRequest = NewSneaker,
        UpdateRequest = SneakerPatch,
        Query = SneakerQuery,
    >
{
}

#[derive(Clone)]
pub struct SqliteSneakerStore {
    pool: Pool<Sqlite>,
}

impl SqliteSneakerStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn parse_column<T: FromStr>(column: &str, value: String) -> RepositoryResult<T> {
        value
            .parse::<T>()
            .map_err(|_| RepositoryError::invalid_column(column, value))
    }

    fn parse_uuid(column: &str, value: String) -> RepositoryResult<Uuid> {
        Uuid::parse_str(&value).map_err(|_| RepositoryError::invalid_column(column, value))
    }

    fn row_to_sneaker(row: &sqlx::sqlite::SqliteRow) -> RepositoryResult<SneakerRecord> {
        let condition: i64 = row.try_get("condition")?;
        let condition = u8::try_from(condition)
            .map_err(|_| RepositoryError::invalid_column("condition", condition.to_string()))?;

        let images_json: String = row.try_get("images")?;
        let images: Vec<Photo> = serde_json::from_str(&images_json)?;

        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(SneakerRecord {
            id: Self::parse_uuid("id", row.try_get("id")?)?,
            owner_id: Self::parse_uuid("owner_id", row.try_get("owner_id")?)?,
            brand: Self::parse_column::<Brand>("brand", row.try_get("brand")?)?,
            model: row.try_get("model")?,
            size_eu: row.try_get("size_eu")?,
            size_us: row.try_get("size_us")?,
            condition,
            status: Self::parse_column::<SneakerStatus>("status", row.try_get("status")?)?,
            price_paid: row.try_get("price_paid")?,
            description: row.try_get("description")?,
            images,
            og_box: row.try_get("og_box")?,
            ds: row.try_get("ds")?,
            gender: Self::parse_column::<Gender>("gender", row.try_get("gender")?)?,
            sku: row.try_get("sku")?,
            estimated_value: row.try_get("estimated_value")?,
            created_at: DateTimeParser::parse_flexible(&created_at)?,
            updated_at: DateTimeParser::parse_flexible(&updated_at)?,
        })
    }
}

#[async_trait]
impl Repository<SneakerRecord, Uuid> for SqliteSneakerStore {
    type CreateRequest = NewSneaker;
    type UpdateRequest = SneakerPatch;
    type Query = SneakerQuery;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<SneakerRecord>> {
        let row = sqlx::query("SELECT * FROM sneakers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_sneaker).transpose()
    }

    async fn find_all(&self, query: Self::Query) -> RepositoryResult<Vec<SneakerRecord>> {
        let mut sql = String::from("SELECT * FROM sneakers");
        if query.owner_id.is_some() {
            sql.push_str(" WHERE owner_id = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id");
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut query_builder = sqlx::query(&sql);
        if let Some(owner_id) = query.owner_id {
            query_builder = query_builder.bind(owner_id.to_string());
        }

        let rows = query_builder.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_sneaker).collect()
    }

    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<SneakerRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let now_str = DateTimeParser::format_for_storage(&now);

        sqlx::query(
            r#"
            INSERT INTO sneakers (id, owner_id, brand, model, size_eu, size_us, condition, status, price_paid, description, images, og_box, ds, gender, sku, estimated_value, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '[]', ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(request.owner_id.to_string())
        .bind(request.brand.as_str())
        .bind(&request.model)
        .bind(request.size_eu)
        .bind(request.size_us)
        .bind(request.condition as i64)
        .bind(request.status.as_str())
        .bind(request.price_paid)
        .bind(&request.description)
        .bind(request.og_box)
        .bind(request.ds)
        .bind(request.gender.as_str())
        .bind(&request.sku)
        .bind(request.estimated_value)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await?;

        debug!("Inserted sneaker row {}", id);

        Ok(SneakerRecord {
            id,
            owner_id: request.owner_id,
            brand: request.brand,
            model: request.model,
            size_eu: request.size_eu,
            size_us: request.size_us,
            condition: request.condition,
            status: request.status,
            price_paid: request.price_paid,
            description: request.description,
            images: Vec::new(),
            og_box: request.og_box,
            ds: request.ds,
            gender: request.gender,
            sku: request.sku,
            estimated_value: request.estimated_value,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, id: Uuid, request: Self::UpdateRequest) -> RepositoryResult<SneakerRecord> {
        let mut record = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::record_not_found("sneakers", "id", id.to_string()))?;

        request.apply_to(&mut record);
        record.updated_at = Utc::now();
        let images_json = serde_json::to_string(&record.images)?;

        sqlx::query(
            r#"
            UPDATE sneakers
            SET brand = ?, model = ?, size_eu = ?, size_us = ?, condition = ?, status = ?, price_paid = ?, description = ?, images = ?, og_box = ?, ds = ?, gender = ?, sku = ?, estimated_value = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.brand.as_str())
        .bind(&record.model)
        .bind(record.size_eu)
        .bind(record.size_us)
        .bind(record.condition as i64)
        .bind(record.status.as_str())
        .bind(record.price_paid)
        .bind(&record.description)
        .bind(&images_json)
        .bind(record.og_box)
        .bind(record.ds)
        .bind(record.gender.as_str())
        .bind(&record.sku)
        .bind(record.estimated_value)
        .bind(DateTimeParser::format_for_storage(&record.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM sneakers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::record_not_found(
                "sneakers",
                "id",
                id.to_string(),
            ));
        }
        Ok(())
    }

    async fn count(&self, query: Self::Query) -> RepositoryResult<u64> {
        let count: i64 = match query.owner_id {
            Some(owner_id) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM sneakers WHERE owner_id = ?")
                    .bind(owner_id.to_string())
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM sneakers")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count as u64)
    }
}
