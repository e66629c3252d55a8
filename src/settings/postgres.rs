use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use super::SettingsStore;

#[derive(Debug, Clone)]
pub struct PostgresSettingsStore {
    pool: PgPool,
}

impl PostgresSettingsStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS word_filter_options (
                 name TEXT PRIMARY KEY,
                 value TEXT NOT NULL,
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for PostgresSettingsStore {
    async fn get_option(&self, name: &str) -> anyhow::Result<Option<String>> {
        let value = sqlx::query_as::<_, (String,)>(
            "SELECT value
             FROM word_filter_options
             WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| row.0);

        Ok(value)
    }

    async fn update_option(&self, name: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO word_filter_options (name, value, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (name)
             DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
        )
        .bind(name)
        .bind(value)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_option(&self, name: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM word_filter_options WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
