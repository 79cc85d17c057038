//! Dealership - car dealership review portal backend
//!
//! Car catalog, user sessions, and a proxy to the external dealer, review
//! and inventory services. Dealer reviews are enriched with sentiment labels
//! from a lexicon-based analyzer that ships as a second binary.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_support;
