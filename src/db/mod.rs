//! Database layer
//!
//! SQLite storage for user accounts, login sessions and the car catalog.
//!
//! # Usage
//!
//! ```ignore
//! use dealership::config::DatabaseConfig;
//! use dealership::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool, SqliteDatabase};
