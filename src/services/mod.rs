//! Services layer - Business logic
//!
//! Services are responsible for:
//! - Implementing business rules (registration, catalog seeding)
//! - Coordinating between repositories and external services
//! - Handling validation and error cases

pub mod catalog;
pub mod gateway;
pub mod password;
pub mod reviews;
pub mod sentiment;
pub mod user;

pub use catalog::{CatalogError, CatalogService};
pub use gateway::{DealerGateway, GatewayError, ReviewClassifier};
pub use password::{hash_password, verify_password};
pub use reviews::{enrich_reviews, ReviewService, UNKNOWN_SENTIMENT};
pub use sentiment::{analyze, classify, DynPolarityScorer, PolarityScorer, VaderScorer};
pub use user::{UserService, UserServiceError};
