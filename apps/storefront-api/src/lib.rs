//! # Storefront API
//!
//! JSON-over-HTTP server for the storefront: accounts, catalog, orders.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront API                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes::auth  │  │routes::products│  │  routes::orders            ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • list / get   │  │ • create / list / get      ││
//! │  │ • login        │  │ • create       │  │ • update                   ││
//! │  │ • me           │  │ • update/delete│  │ • cancel                   ││
//! │  └───────┬────────┘  └───────┬────────┘  └─────────────┬──────────────┘│
//! │          │                   │                          │               │
//! │  ┌───────┴───────────────────┴──────────────────────────┴────────────┐ │
//! │  │                         AppState                                   │ │
//! │  │                                                                    │ │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐ │ │
//! │  │  │  Database    │  │  AppConfig   │  │  JwtManager              │ │ │
//! │  │  │  (SQLite)    │  │  (env)       │  │  (bearer tokens)         │ │ │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘ │ │
//! │  └────────────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is read first when present):
//! - `DATABASE_URL` - SQLite location (default: `sqlite://storefront.db`)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `HTTP_HOST` / `HTTP_PORT` - Bind address (default: 0.0.0.0:8000)
//! - `SECRET_KEY` - Secret for JWT signing
//! - `ALGORITHM` - HS256, HS384 or HS512 (default: HS256)
//! - `ACCESS_TOKEN_EXPIRE_MINUTES` - Token lifetime (default: 30)

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;

// Re-exports
pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::build_router;

use auth::JwtManager;
use storefront_db::Database;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub jwt: JwtManager,
}

impl AppState {
    /// Builds state from an open database and loaded configuration.
    pub fn new(db: Database, config: AppConfig) -> Self {
        let jwt = JwtManager::new(
            &config.secret_key,
            config.algorithm,
            config.access_token_expire_minutes,
        );

        AppState { db, config, jwt }
    }
}
