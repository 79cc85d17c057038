//! Car catalog API
//!
//! - GET /api/v1/get_cars - All car models with their make, seeding the
//!   catalog on first use

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::CarModelWithMake;

#[derive(Debug, Serialize)]
pub struct CarModelEntry {
    #[serde(rename = "CarModel")]
    pub car_model: String,
    #[serde(rename = "CarMake")]
    pub car_make: String,
}

impl From<CarModelWithMake> for CarModelEntry {
    fn from(model: CarModelWithMake) -> Self {
        Self {
            car_model: model.name,
            car_make: model.make_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CarModelsResponse {
    #[serde(rename = "CarModels")]
    pub car_models: Vec<CarModelEntry>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/get_cars", get(get_cars))
}

/// GET /api/v1/get_cars
async fn get_cars(State(state): State<AppState>) -> Result<Json<CarModelsResponse>, ApiError> {
    let models = state
        .catalog_service
        .list_car_models()
        .await
        .map_err(|e| {
            tracing::error!("Failed to list car models: {}", e);
            ApiError::internal_error(e.to_string())
        })?;

    Ok(Json(CarModelsResponse {
        car_models: models.into_iter().map(CarModelEntry::from).collect(),
    }))
}
