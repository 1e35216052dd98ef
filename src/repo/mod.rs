/// Repository layer for favorite persistence
use crate::domain::{Favorite, Source};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Persistence for user-saved items. The store, not the handler, is the
/// source of truth for duplicate detection: `add` on an existing
/// (user, type, image_url) tuple reports `false` instead of erroring.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Insert a favorite; returns whether a new row was created
    async fn add(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
        title: &str,
        description: &str,
        api_data: Value,
    ) -> ApiResult<bool>;

    /// Delete a favorite; returns whether a matching row existed
    async fn remove(&self, user_id: i64, favorite_type: Source, image_url: &str)
        -> ApiResult<bool>;

    /// List a user's favorites, newest first, optionally filtered by type
    async fn list(&self, user_id: i64, filter: Option<Source>) -> ApiResult<Vec<Favorite>>;

    async fn is_favorited(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
    ) -> ApiResult<bool>;

    /// Bulk lookup of favorited image URLs, used to annotate photo grids
    async fn favorited_urls(
        &self,
        user_id: i64,
        favorite_type: Source,
    ) -> ApiResult<HashSet<String>>;
}

/// Postgres-backed favorite store
#[derive(Clone)]
pub struct PgFavoriteStore {
    pool: PgPool,
}

impl PgFavoriteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type FavoriteRow = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    Value,
    DateTime<Utc>,
);

fn row_to_favorite(row: FavoriteRow) -> ApiResult<Favorite> {
    let (id, user_id, favorite_type, title, description, image_url, api_data, created_at) = row;
    let favorite_type = favorite_type
        .parse::<Source>()
        .map_err(|_| ApiError::Internal(format!("unknown favorite_type in row {}", id)))?;
    Ok(Favorite {
        id,
        user_id,
        favorite_type,
        title,
        description,
        image_url,
        api_data,
        created_at,
    })
}

#[async_trait]
impl FavoriteStore for PgFavoriteStore {
    async fn add(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
        title: &str,
        description: &str,
        api_data: Value,
    ) -> ApiResult<bool> {
        // The unique index makes this race-safe: concurrent inserts of the
        // same tuple resolve to exactly one created row.
        let result = sqlx::query(
            "INSERT INTO favorites(user_id, favorite_type, title, description, image_url, api_data)
             VALUES($1,$2,$3,$4,$5,$6)
             ON CONFLICT (user_id, favorite_type, image_url) DO NOTHING",
        )
        .bind(user_id)
        .bind(favorite_type.as_str())
        .bind(title)
        .bind(description)
        .bind(image_url)
        .bind(api_data)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "DELETE FROM favorites
             WHERE user_id = $1 AND favorite_type = $2 AND image_url = $3",
        )
        .bind(user_id)
        .bind(favorite_type.as_str())
        .bind(image_url)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, user_id: i64, filter: Option<Source>) -> ApiResult<Vec<Favorite>> {
        let rows = match filter {
            Some(favorite_type) => {
                sqlx::query_as::<_, FavoriteRow>(
                    "SELECT id, user_id, favorite_type, title, description, image_url, api_data, created_at
                     FROM favorites
                     WHERE user_id = $1 AND favorite_type = $2
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(user_id)
                .bind(favorite_type.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FavoriteRow>(
                    "SELECT id, user_id, favorite_type, title, description, image_url, api_data, created_at
                     FROM favorites
                     WHERE user_id = $1
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(row_to_favorite).collect()
    }

    async fn is_favorited(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
    ) -> ApiResult<bool> {
        let row = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(
                SELECT 1 FROM favorites
                WHERE user_id = $1 AND favorite_type = $2 AND image_url = $3
             )",
        )
        .bind(user_id)
        .bind(favorite_type.as_str())
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn favorited_urls(
        &self,
        user_id: i64,
        favorite_type: Source,
    ) -> ApiResult<HashSet<String>> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT image_url FROM favorites
             WHERE user_id = $1 AND favorite_type = $2",
        )
        .bind(user_id)
        .bind(favorite_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(url,)| url).collect())
    }
}

/// In-memory favorite store. Enforces the same (user, type, image_url)
/// uniqueness invariant as the Postgres unique index; used in tests and
/// for running the service without a database.
#[derive(Default)]
pub struct MemoryFavoriteStore {
    rows: RwLock<Vec<Favorite>>,
}

impl MemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cascade-delete all favorites owned by a user, mirroring the
    /// ON DELETE CASCADE foreign key in the Postgres schema
    pub async fn remove_user(&self, user_id: i64) -> usize {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|f| f.user_id != user_id);
        before - rows.len()
    }
}

#[async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    async fn add(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
        title: &str,
        description: &str,
        api_data: Value,
    ) -> ApiResult<bool> {
        let mut rows = self.rows.write().await;

        let exists = rows.iter().any(|f| {
            f.user_id == user_id && f.favorite_type == favorite_type && f.image_url == image_url
        });
        if exists {
            return Ok(false);
        }

        let id = rows.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        rows.push(Favorite {
            id,
            user_id,
            favorite_type,
            title: title.to_string(),
            description: description.to_string(),
            image_url: image_url.to_string(),
            api_data,
            created_at: Utc::now(),
        });

        Ok(true)
    }

    async fn remove(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
    ) -> ApiResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|f| {
            !(f.user_id == user_id && f.favorite_type == favorite_type && f.image_url == image_url)
        });
        Ok(rows.len() < before)
    }

    async fn list(&self, user_id: i64, filter: Option<Source>) -> ApiResult<Vec<Favorite>> {
        let rows = self.rows.read().await;
        let mut result: Vec<Favorite> = rows
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter(|f| filter.map_or(true, |t| f.favorite_type == t))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn is_favorited(
        &self,
        user_id: i64,
        favorite_type: Source,
        image_url: &str,
    ) -> ApiResult<bool> {
        let rows = self.rows.read().await;
        Ok(rows.iter().any(|f| {
            f.user_id == user_id && f.favorite_type == favorite_type && f.image_url == image_url
        }))
    }

    async fn favorited_urls(
        &self,
        user_id: i64,
        favorite_type: Source,
    ) -> ApiResult<HashSet<String>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|f| f.user_id == user_id && f.favorite_type == favorite_type)
            .map(|f| f.image_url.clone())
            .collect())
    }
}

/// Initialize database tables. The users table belongs to the external auth
/// layer; a minimal definition is created here so the cascade foreign key is
/// expressible when the service boots first.
pub async fn init_db(pool: &PgPool) -> ApiResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users(
            id BIGSERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS favorites(
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            favorite_type TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            image_url TEXT NOT NULL,
            api_data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_favorites_user_type_url
         ON favorites(user_id, favorite_type, image_url)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_favorites_user_created
         ON favorites(user_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
