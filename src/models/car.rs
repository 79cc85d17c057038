//! Car catalog models
//!
//! A `CarMake` owns many `CarModel`s. Deleting a make removes its models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Oldest model year accepted by the catalog
pub const MIN_MODEL_YEAR: i32 = 2015;
/// Newest model year accepted by the catalog
pub const MAX_MODEL_YEAR: i32 = 2023;

/// A car manufacturer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarMake {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// A vehicle model belonging to one make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarModel {
    pub id: i64,
    pub car_make_id: i64,
    pub name: String,
    pub body_type: BodyType,
    pub year: i32,
}

/// A model joined with the name of its make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarModelWithMake {
    pub id: i64,
    pub name: String,
    pub make_name: String,
    pub body_type: BodyType,
    pub year: i32,
}

/// Body style of a car model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyType {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Wagon,
}

impl Default for BodyType {
    fn default() -> Self {
        Self::Suv
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyType::Sedan => write!(f, "Sedan"),
            BodyType::Suv => write!(f, "SUV"),
            BodyType::Wagon => write!(f, "Wagon"),
        }
    }
}

impl FromStr for BodyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sedan" => Ok(BodyType::Sedan),
            "suv" => Ok(BodyType::Suv),
            "wagon" => Ok(BodyType::Wagon),
            _ => Err(anyhow::anyhow!("Invalid body type: {}", s)),
        }
    }
}

/// Input for creating a make
#[derive(Debug, Clone)]
pub struct NewCarMake {
    pub name: String,
    pub description: String,
}

/// Input for creating a model under an existing make
#[derive(Debug, Clone)]
pub struct NewCarModel {
    pub car_make_id: i64,
    pub name: String,
    pub body_type: BodyType,
    pub year: i32,
}

impl NewCarModel {
    /// Check the write-time invariants of a model.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if !(MIN_MODEL_YEAR..=MAX_MODEL_YEAR).contains(&self.year) {
            return Err(format!(
                "Model year {} is outside {}..={}",
                self.year, MIN_MODEL_YEAR, MAX_MODEL_YEAR
            ));
        }
        Ok(())
    }
}

/// A model to insert as part of a seeded make
#[derive(Debug, Clone)]
pub struct SeedModel {
    pub name: &'static str,
    pub body_type: BodyType,
    pub year: i32,
}

/// A make and its models, inserted together when the catalog is seeded
#[derive(Debug, Clone)]
pub struct SeedMake {
    pub name: &'static str,
    pub description: &'static str,
    pub models: Vec<SeedModel>,
}
