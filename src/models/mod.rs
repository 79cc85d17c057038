//! Data models
//!
//! Models represent:
//! - Database entities (User, Session, CarMake, CarModel)
//! - Request-side value types for the external dealer services
//! - Sentiment labels and scores

mod car;
mod dealer;
mod sentiment;
mod session;
mod user;

pub use car::{
    BodyType, CarMake, CarModel, CarModelWithMake, NewCarMake, NewCarModel, SeedMake, SeedModel,
    MAX_MODEL_YEAR, MIN_MODEL_YEAR,
};
pub use dealer::{DealerId, InventoryFilter, InventoryQuery};
pub use sentiment::{SentimentLabel, SentimentResponse, SentimentScores};
pub use session::{Session, SESSION_DURATION_DAYS};
pub use user::{CreateUserInput, User};
