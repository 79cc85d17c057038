//! Car model repository

use crate::db::DynDatabasePool;
use crate::models::{BodyType, CarModel, CarModelWithMake, NewCarModel};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

/// Car model repository trait
#[async_trait]
pub trait CarModelRepository: Send + Sync {
    /// Create a model under an existing make
    async fn create(&self, model: &NewCarModel) -> Result<CarModel>;

    /// All models joined with their make's name, ordered by model id
    async fn list_with_make(&self) -> Result<Vec<CarModelWithMake>>;
}

/// SQLx-based car model repository implementation
pub struct SqlxCarModelRepository {
    pool: DynDatabasePool,
}

impl SqlxCarModelRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CarModelRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CarModelRepository for SqlxCarModelRepository {
    async fn create(&self, model: &NewCarModel) -> Result<CarModel> {
        let result = sqlx::query(
            "INSERT INTO car_models (car_make_id, name, body_type, year) VALUES (?, ?, ?, ?)",
        )
        .bind(model.car_make_id)
        .bind(&model.name)
        .bind(model.body_type.to_string())
        .bind(model.year)
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to create car model")?;

        Ok(CarModel {
            id: result.last_insert_rowid(),
            car_make_id: model.car_make_id,
            name: model.name.clone(),
            body_type: model.body_type,
            year: model.year,
        })
    }

    async fn list_with_make(&self) -> Result<Vec<CarModelWithMake>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.name, mk.name AS make_name, m.body_type, m.year
            FROM car_models m
            INNER JOIN car_makes mk ON mk.id = m.car_make_id
            ORDER BY m.id
            "#,
        )
        .fetch_all(self.pool.as_sqlite())
        .await
        .context("Failed to list car models")?;

        rows.iter().map(row_to_model_with_make).collect()
    }
}

fn row_to_model_with_make(row: &sqlx::sqlite::SqliteRow) -> Result<CarModelWithMake> {
    let body_type: String = row.try_get("body_type")?;

    Ok(CarModelWithMake {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        make_name: row.try_get("make_name")?,
        body_type: BodyType::from_str(&body_type)?,
        year: row.try_get("year")?,
    })
}
