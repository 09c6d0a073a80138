use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::{Counter, NewRecommendation, Recommendation, RecommendationFilter, LIKE_COLUMN},
};

use super::RecommendationStore;

fn columns() -> String {
    format!(
        "id, product_id, recommended_id, recommendation_type, status, {}, dislike, \
         created_at, last_updated",
        LIKE_COLUMN
    )
}

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Recommendation store backed by the `recommendations` table
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn filtered_query(filter: &RecommendationFilter) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM recommendations WHERE TRUE",
            columns()
        ));

        if let Some(product_id) = filter.product_id {
            query.push(" AND product_id = ").push_bind(product_id);
        }
        if let Some(recommended_id) = filter.recommended_id {
            query.push(" AND recommended_id = ").push_bind(recommended_id);
        }
        if let Some(kind) = filter.recommendation_type {
            query.push(" AND recommendation_type = ").push_bind(kind);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }

        match filter.sort_field() {
            Some(field) => {
                let direction = if filter.is_descending() { "DESC" } else { "ASC" };
                query.push(format!(" ORDER BY {} {}, id ASC", field.column(), direction));
            }
            None => {
                if let Some(sort_by) = &filter.sort_by {
                    tracing::warn!(sort_by = %sort_by, "Ignoring unknown sort field");
                }
                query.push(" ORDER BY id ASC");
            }
        }

        if let Some((offset, limit)) = filter.window() {
            query.push(" LIMIT ").push_bind(limit);
            query.push(" OFFSET ").push_bind(offset);
        }

        query
    }
}

#[async_trait::async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let record = sqlx::query_as::<_, Recommendation>(&format!(
            "SELECT {} FROM recommendations WHERE id = $1",
            columns()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_filter(
        &self,
        filter: &RecommendationFilter,
    ) -> AppResult<Vec<Recommendation>> {
        let records = Self::filtered_query(filter)
            .build_query_as::<Recommendation>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn create(&self, values: NewRecommendation) -> AppResult<Recommendation> {
        let record = sqlx::query_as::<_, Recommendation>(&format!(
            "INSERT INTO recommendations \
             (product_id, recommended_id, recommendation_type, status, {like}, dislike) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {columns}",
            like = LIKE_COLUMN,
            columns = columns()
        ))
        .bind(values.product_id)
        .bind(values.recommended_id)
        .bind(values.recommendation_type)
        .bind(values.status)
        .bind(values.like)
        .bind(values.dislike)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update(&self, record: &Recommendation) -> AppResult<Option<Recommendation>> {
        let updated = sqlx::query_as::<_, Recommendation>(&format!(
            "UPDATE recommendations SET product_id = $2, recommended_id = $3, \
             recommendation_type = $4, status = $5, {like} = $6, dislike = $7, \
             last_updated = now() WHERE id = $1 RETURNING {columns}",
            like = LIKE_COLUMN,
            columns = columns()
        ))
        .bind(record.id)
        .bind(record.product_id)
        .bind(record.recommended_id)
        .bind(record.recommendation_type)
        .bind(record.status)
        .bind(record.like)
        .bind(record.dislike)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recommendations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment(&self, id: i64, counter: Counter) -> AppResult<Option<Recommendation>> {
        let column = counter.column();
        let updated = sqlx::query_as::<_, Recommendation>(&format!(
            "UPDATE recommendations SET {column} = {column} + 1, last_updated = now() \
             WHERE id = $1 RETURNING {}",
            columns()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
