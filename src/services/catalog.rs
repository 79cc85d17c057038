//! Car catalog service
//!
//! Lists car models with their makes and seeds the catalog the first time it
//! is read from an empty database. Seeding only looks at the make table, so
//! emptying the models later never re-triggers it.

use crate::db::repositories::{CarMakeRepository, CarModelRepository};
use crate::models::{
    BodyType, CarMake, CarModel, CarModelWithMake, NewCarMake, NewCarModel, SeedMake, SeedModel,
};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Catalog service
pub struct CatalogService {
    make_repo: Arc<dyn CarMakeRepository>,
    model_repo: Arc<dyn CarModelRepository>,
    /// Serializes the check-then-seed step across concurrent first requests
    seed_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(
        make_repo: Arc<dyn CarMakeRepository>,
        model_repo: Arc<dyn CarModelRepository>,
    ) -> Self {
        Self {
            make_repo,
            model_repo,
            seed_lock: Mutex::new(()),
        }
    }

    /// All car models joined with their make, seeding first if no make exists.
    pub async fn list_car_models(&self) -> Result<Vec<CarModelWithMake>, CatalogError> {
        self.ensure_seeded().await?;

        let models = self
            .model_repo
            .list_with_make()
            .await
            .context("Failed to list car models")?;
        Ok(models)
    }

    /// Seed the catalog if the make table is empty. Returns true if it seeded.
    pub async fn ensure_seeded(&self) -> Result<bool, CatalogError> {
        let _guard = self.seed_lock.lock().await;

        let count = self
            .make_repo
            .count()
            .await
            .context("Failed to count car makes")?;
        if count > 0 {
            return Ok(false);
        }

        let inserted = self
            .make_repo
            .seed(&seed_data())
            .await
            .context("Failed to seed car catalog")?;
        tracing::info!("Seeded car catalog with {} models", inserted);

        Ok(true)
    }

    /// Add a make
    pub async fn create_make(&self, input: NewCarMake) -> Result<CarMake, CatalogError> {
        if input.name.trim().is_empty() {
            return Err(CatalogError::Validation(
                "Make name cannot be empty".to_string(),
            ));
        }

        let make = self
            .make_repo
            .create(&input)
            .await
            .context("Failed to create car make")?;
        Ok(make)
    }

    /// Add a model to an existing make, enforcing the year range and name
    pub async fn create_model(&self, input: NewCarModel) -> Result<CarModel, CatalogError> {
        input.validate().map_err(CatalogError::Validation)?;

        let model = self
            .model_repo
            .create(&input)
            .await
            .context("Failed to create car model")?;
        Ok(model)
    }

    /// Delete a make and every model that belongs to it
    pub async fn delete_make(&self, id: i64) -> Result<bool, CatalogError> {
        let deleted = self
            .make_repo
            .delete(id)
            .await
            .context("Failed to delete car make")?;
        Ok(deleted)
    }
}

fn model(name: &'static str, body_type: BodyType) -> SeedModel {
    SeedModel {
        name,
        body_type,
        year: 2023,
    }
}

/// The initial catalog: five makes with three models each.
pub fn seed_data() -> Vec<SeedMake> {
    use BodyType::{Sedan, Suv};

    vec![
        SeedMake {
            name: "NISSAN",
            description: "Great cars. Japanese technology",
            models: vec![
                model("Pathfinder", Suv),
                model("Qashqai", Suv),
                model("XTRAIL", Suv),
            ],
        },
        SeedMake {
            name: "Mercedes",
            description: "Great cars. German technology",
            models: vec![
                model("A-Class", Suv),
                model("C-Class", Suv),
                model("E-Class", Suv),
            ],
        },
        SeedMake {
            name: "Audi",
            description: "Great cars. German technology",
            models: vec![model("A4", Suv), model("A5", Suv), model("A6", Suv)],
        },
        SeedMake {
            name: "Kia",
            description: "Great cars. Korean technology",
            models: vec![
                model("Sorrento", Suv),
                model("Carnival", Suv),
                model("Cerato", Sedan),
            ],
        },
        SeedMake {
            name: "Toyota",
            description: "Great cars. Japanese technology",
            models: vec![
                model("Corolla", Sedan),
                model("Camry", Sedan),
                model("Kluger", Suv),
            ],
        },
    ]
}
