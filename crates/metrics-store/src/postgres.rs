//! `sqlx`/Postgres-backed [`CatalogStore`].
//!
//! Each App is stored as a row with a `JSONB` document column plus a
//! denormalized `tracked` column so the Daily job's `{tracked: true}`
//! filter is a plain indexed `WHERE`, not a JSONB containment query.

use async_trait::async_trait;
use metrics_core::{App, AppId, ExceptionEntry, StaticData};
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::{check_capacity, AppFilter, BoxCursor, CatalogStore, Collection, StoreError, VecCursor};

/// Production [`CatalogStore`] backed by a Postgres `JSONB` document table.
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AppRow {
    doc: serde_json::Value,
}

#[derive(sqlx::FromRow)]
struct ExceptionRow {
    doc: serde_json::Value,
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self))]
    async fn count_and_cursor(
        &self,
        collection: Collection,
        filter: AppFilter,
    ) -> Result<(usize, BoxCursor), StoreError> {
        let docs: Vec<serde_json::Value> = match collection {
            Collection::Stats => {
                let rows: Vec<AppRow> = match filter {
                    AppFilter::All => {
                        sqlx::query_as("SELECT doc FROM app_documents")
                            .fetch_all(&self.pool)
                            .await?
                    }
                    AppFilter::TrackedOnly => {
                        sqlx::query_as("SELECT doc FROM app_documents WHERE tracked = true")
                            .fetch_all(&self.pool)
                            .await?
                    }
                };
                rows.into_iter().map(|r| r.doc).collect()
            }
            Collection::Exceptions => {
                let rows: Vec<ExceptionRow> = sqlx::query_as("SELECT doc FROM exception_documents")
                    .fetch_all(&self.pool)
                    .await?;
                rows.into_iter().map(|r| r.doc).collect()
            }
        };

        let count = docs.len();
        debug!(collection = ?collection, count, "opened cursor");
        check_capacity(count)?;
        Ok((count, Box::new(VecCursor::new(docs))))
    }

    #[instrument(skip(self))]
    async fn get_static_data(&self) -> Result<Vec<StaticData>, StoreError> {
        let rows: Vec<AppRow> = sqlx::query_as("SELECT doc FROM app_documents")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| {
                let app: App = serde_json::from_value(r.doc)?;
                Ok(app.static_data)
            })
            .collect()
    }

    #[instrument(skip(self), fields(app_id = %id))]
    async fn get_app(&self, id: &AppId) -> Result<App, StoreError> {
        let row: Option<AppRow> = sqlx::query_as("SELECT doc FROM app_documents WHERE id = $1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::from_value(row.doc)?)
    }

    #[instrument(skip(self), fields(app_id = %app.id))]
    async fn insert_app(&self, app: &App) -> Result<(), StoreError> {
        let doc = serde_json::to_value(app)?;
        sqlx::query(
            "INSERT INTO app_documents (id, doc, tracked) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc, tracked = EXCLUDED.tracked",
        )
        .bind(&app.id.0)
        .bind(&doc)
        .bind(app.tracked)
        .execute(&self.pool)
        .await?;

        debug!("app inserted");
        Ok(())
    }

    #[instrument(skip(self), fields(app_id = %app.id))]
    async fn replace_app(&self, app: &App) -> Result<(), StoreError> {
        let doc = serde_json::to_value(app)?;
        let result = sqlx::query(
            "UPDATE app_documents SET doc = $2, tracked = $3 WHERE id = $1",
        )
        .bind(&app.id.0)
        .bind(&doc)
        .bind(app.tracked)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(app.id.to_string()));
        }
        debug!("app replaced");
        Ok(())
    }

    #[instrument(skip(self), fields(app_id = %id))]
    async fn set_tracked(&self, id: &AppId, tracked: bool) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE app_documents SET tracked = $2,
                doc = jsonb_set(doc, '{tracked}', to_jsonb($2::bool))
             WHERE id = $1",
        )
        .bind(&id.0)
        .bind(tracked)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(app_id = %entry.ref_id))]
    async fn push_exception(&self, entry: &ExceptionEntry) -> Result<(), StoreError> {
        let doc = serde_json::to_value(entry)?;
        sqlx::query(
            "INSERT INTO exception_documents (id, doc) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(&entry.id.0)
        .bind(&doc)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn flush(&self, collection: Collection) -> Result<(), StoreError> {
        let table = match collection {
            Collection::Stats => "app_documents",
            Collection::Exceptions => "exception_documents",
        };
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
