//! SSO Service Library
//!
//! Registers users, verifies login credentials, and mints per-application
//! session tokens. The authentication core sits behind narrow persistence
//! traits so it can run against PostgreSQL or an in-memory store.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Password hashing and token minting
//! - `errors` - Error taxonomy and HTTP error mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Data models
//! - `observability` - Metrics and log-privacy helpers
//! - `repositories` - Persistence traits and their implementations
//! - `routes` - Router construction
//! - `services` - Business logic layer

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
