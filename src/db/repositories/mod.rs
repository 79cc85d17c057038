//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the operations for a specific entity.

pub mod car_make;
pub mod car_model;
pub mod session;
pub mod user;

pub use car_make::{CarMakeRepository, SqlxCarMakeRepository};
pub use car_model::{CarModelRepository, SqlxCarModelRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
