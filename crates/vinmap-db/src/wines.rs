//! PostgreSQL wine repository.
//!
//! Each wine is one JSONB document in the `wine` table. The id lives in its
//! own column and is never duplicated inside the document.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use vinmap_core::{Error, NewWine, Result, Wine, WineRepository, WineUpdate};

/// PostgreSQL implementation of WineRepository.
#[derive(Clone)]
pub struct PgWineRepository {
    pool: Pool<Postgres>,
}

impl PgWineRepository {
    /// Create a new PgWineRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_wine(row: &sqlx::postgres::PgRow) -> Result<Wine> {
    let id: Uuid = row.get("id");
    let doc: Value = row.get("doc");
    Wine::from_document(id, doc)
}

#[async_trait]
impl WineRepository for PgWineRepository {
    async fn list_all(&self) -> Result<Vec<Wine>> {
        let rows = sqlx::query("SELECT id, doc FROM wine ORDER BY created_at_utc, id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "wines",
            op = "list_all",
            result_count = rows.len(),
            "Loaded wine documents"
        );

        // Undecodable documents are logged and left out of the listing.
        Ok(rows
            .iter()
            .filter_map(|row| match row_to_wine(row) {
                Ok(wine) => Some(wine),
                Err(e) => {
                    warn!(
                        subsystem = "db",
                        component = "wines",
                        op = "list_all",
                        wine_id = %row.get::<Uuid, _>("id"),
                        error = %e,
                        "Skipping undecodable wine document"
                    );
                    None
                }
            })
            .collect())
    }

    async fn fetch(&self, id: Uuid) -> Result<Wine> {
        let row = sqlx::query("SELECT id, doc FROM wine WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::WineNotFound(id))?;

        row_to_wine(&row)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Wine>> {
        let row = sqlx::query(
            r#"
            SELECT id, doc
            FROM wine
            WHERE doc->>'name' = $1
            ORDER BY created_at_utc, id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(row_to_wine).transpose()
    }

    async fn insert(&self, wine: NewWine) -> Result<Wine> {
        let wine = Wine::from_new(Uuid::now_v7(), wine, Utc::now());
        let doc = wine.to_document()?;

        sqlx::query("INSERT INTO wine (id, doc, created_at_utc) VALUES ($1, $2, $3)")
            .bind(wine.id)
            .bind(&doc)
            .bind(wine.timestamp)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "wines",
            op = "insert",
            wine_id = %wine.id,
            "Inserted wine"
        );
        Ok(wine)
    }

    async fn update(&self, id: Uuid, update: WineUpdate) -> Result<Wine> {
        let patch = update.to_patch()?;

        let row = sqlx::query("UPDATE wine SET doc = doc || $2 WHERE id = $1 RETURNING id, doc")
            .bind(id)
            .bind(&patch)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::WineNotFound(id))?;

        debug!(
            subsystem = "db",
            component = "wines",
            op = "update",
            wine_id = %id,
            "Merged wine patch"
        );
        row_to_wine(&row)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM wine WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::WineNotFound(id));
        }
        Ok(())
    }
}
