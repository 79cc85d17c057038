//! Car make repository
//!
//! Makes own their models; deleting a make cascades through the
//! `car_models.car_make_id` foreign key.

use crate::db::DynDatabasePool;
use crate::models::{CarMake, NewCarMake, SeedMake};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Car make repository trait
#[async_trait]
pub trait CarMakeRepository: Send + Sync {
    /// Create a new make
    async fn create(&self, make: &NewCarMake) -> Result<CarMake>;

    /// Count makes
    async fn count(&self) -> Result<i64>;

    /// Delete a make and all of its models. Returns false if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Insert makes together with their models in a single transaction.
    ///
    /// Returns the number of models inserted.
    async fn seed(&self, makes: &[SeedMake]) -> Result<usize>;
}

/// SQLx-based car make repository implementation
pub struct SqlxCarMakeRepository {
    pool: DynDatabasePool,
}

impl SqlxCarMakeRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CarMakeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CarMakeRepository for SqlxCarMakeRepository {
    async fn create(&self, make: &NewCarMake) -> Result<CarMake> {
        let result = sqlx::query("INSERT INTO car_makes (name, description) VALUES (?, ?)")
            .bind(&make.name)
            .bind(&make.description)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to create car make")?;

        Ok(CarMake {
            id: result.last_insert_rowid(),
            name: make.name.clone(),
            description: make.description.clone(),
        })
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM car_makes")
            .fetch_one(self.pool.as_sqlite())
            .await
            .context("Failed to count car makes")?;
        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM car_makes WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to delete car make")?;

        Ok(result.rows_affected() > 0)
    }

    async fn seed(&self, makes: &[SeedMake]) -> Result<usize> {
        let mut tx = self
            .pool
            .as_sqlite()
            .begin()
            .await
            .context("Failed to start seed transaction")?;
        let mut models = 0;

        for make in makes {
            let make_id = sqlx::query("INSERT INTO car_makes (name, description) VALUES (?, ?)")
                .bind(make.name)
                .bind(make.description)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to seed car make {}", make.name))?
                .last_insert_rowid();

            for model in &make.models {
                sqlx::query(
                    "INSERT INTO car_models (car_make_id, name, body_type, year) VALUES (?, ?, ?, ?)",
                )
                .bind(make_id)
                .bind(model.name)
                .bind(model.body_type.to_string())
                .bind(model.year)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to seed car model {}", model.name))?;
                models += 1;
            }
        }

        tx.commit().await.context("Failed to commit seed transaction")?;
        Ok(models)
    }
}
