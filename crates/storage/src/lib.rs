//! SeaORM-backed storage adapters that satisfy the domain storage traits
//! while keeping the database backend swappable (SQLite by default,
//! PostgreSQL via feature flag).

mod catalog_store;
mod earning_store;
mod entity;
mod errors;
mod ledger_store;
mod migration;
mod profile_store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use migration::run_migrations;
use primeadview_domain::storage::StorageResult;
use sea_orm::{Database, DatabaseConnection};

use errors::StorageError;

/// Shared storage handle used by the HTTP API and the test suites.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorage {
    /// Connects to the provided database URL and ensures the schema is
    /// present.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::from_source)?;
        run_migrations(&db).await?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}
