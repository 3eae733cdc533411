//! Sweet shop backend
//!
//! Catalog management, stock purchase/restock and token-based
//! authentication over a JSON HTTP API.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
