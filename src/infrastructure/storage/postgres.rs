//! PostgreSQL storage implementation with connection pooling

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::DomainError;
use crate::domain::storage::{EntityUpdate, Storage, StorageEntity, StorageKey};

use super::unique_violation;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/users".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

/// PostgreSQL document storage
///
/// Stores entities as JSONB documents in a `(key, data)` table. Every entry in
/// `StorageEntity::UNIQUE_FIELDS` gets a unique expression index on
/// `data->>'field'`, so the database decides races between concurrent writers.
/// `update_with` holds a row lock (`SELECT ... FOR UPDATE`) from read to write.
pub struct PostgresStorage<E>
where
    E: StorageEntity,
{
    pool: PgPool,
    table_name: String,
    _phantom: PhantomData<E>,
}

impl<E> Debug for PostgresStorage<E>
where
    E: StorageEntity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStorage")
            .field("table_name", &self.table_name)
            .finish()
    }
}

/// Name of the unique index backing `field`
fn unique_index_name(table_name: &str, field: &str) -> String {
    format!("{}_{}_key", table_name, field)
}

impl<E> PostgresStorage<E>
where
    E: StorageEntity,
{
    /// Creates a new PostgreSQL storage with the given pool and table name
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    /// Creates a new PostgreSQL storage with connection pooling
    pub async fn connect(
        config: &PostgresConfig,
        table_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool, table_name))
    }

    /// Ensures the storage table and its unique indexes exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key VARCHAR(255) PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        for field in E::UNIQUE_FIELDS {
            let query = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((data->>'{}'))",
                unique_index_name(&self.table_name, field),
                self.table_name,
                field
            );

            sqlx::query(&query)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to create index on '{}': {}", field, e))
                })?;
        }

        Ok(())
    }

    /// Map a failed INSERT/UPDATE, turning unique violations into conflicts
    fn map_write_error(
        &self,
        err: sqlx::Error,
        key: &str,
        data: &Value,
        action: &str,
    ) -> DomainError {
        let unique_constraint = err
            .as_database_error()
            .filter(|db_err| db_err.is_unique_violation())
            .map(|db_err| db_err.constraint().unwrap_or_default().to_string());

        match unique_constraint {
            Some(constraint) => {
                let field = E::UNIQUE_FIELDS
                    .iter()
                    .find(|field| unique_index_name(&self.table_name, field) == constraint);

                match field {
                    Some(field) => {
                        unique_violation(field, data.get(*field).unwrap_or(&Value::Null))
                    }
                    None => DomainError::conflict(format!(
                        "Entity with key '{}' already exists",
                        key
                    )),
                }
            }
            None => DomainError::storage(format!("Failed to {} entity: {}", action, err)),
        }
    }
}

fn from_row<E: StorageEntity>(row: &sqlx::postgres::PgRow) -> Result<E, DomainError> {
    let data: Value = row.get("data");
    serde_json::from_value(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize entity: {}", e)))
}

#[async_trait]
impl<E> Storage<E> for PostgresStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let query = format!("SELECT data FROM {} WHERE key = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get entity: {}", e)))?;

        result.as_ref().map(from_row::<E>).transpose()
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let query = format!("SELECT data FROM {} ORDER BY created_at", self.table_name);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entities: {}", e)))?;

        rows.iter().map(from_row::<E>).collect()
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = serde_json::to_value(&entity)
            .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

        let query = format!(
            r#"
            INSERT INTO {} (key, data)
            VALUES ($1, $2)
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_write_error(e, &key, &data, "create"))?;

        Ok(entity)
    }

    async fn update_with(
        &self,
        key: &E::Key,
        update: EntityUpdate<E>,
    ) -> Result<Option<E>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let select = format!(
            "SELECT data FROM {} WHERE key = $1 FOR UPDATE",
            self.table_name
        );

        let row = sqlx::query(&select)
            .bind(key.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to lock entity: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut entity = from_row::<E>(&row)?;
        update(&mut entity)?;

        if entity.key() != key {
            return Err(DomainError::internal(format!(
                "Update changed the key of entity '{}'",
                key.as_str()
            )));
        }

        let data = serde_json::to_value(&entity)
            .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

        let query = format!(
            r#"
            UPDATE {}
            SET data = $2, updated_at = NOW()
            WHERE key = $1
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(key.as_str())
            .bind(&data)
            .execute(&mut *tx)
            .await
            .map_err(|e| self.map_write_error(e, key.as_str(), &data, "update"))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit update: {}", e)))?;

        Ok(Some(entity))
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let query = format!("DELETE FROM {} WHERE key = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entity: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) as count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count entities: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }
}
