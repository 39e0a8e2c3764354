//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().create_order(user_id, draft)                      │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create_order / get_order / list_orders                            │
//! │  └── update_order / cancel_order                                       │
//! │       │                                                                 │
//! │       │  SQL (inside a transaction where it matters)                   │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and stock
//! - [`UserRepository`](user::UserRepository) - Accounts and uniqueness
//! - [`OrderRepository`](order::OrderRepository) - Transactional order workflow
//!
//! ## Write Transactions
//! Transactions that read and then write open with `BEGIN IMMEDIATE`.
//! A deferred transaction only asks for the write lock at its first write;
//! if another writer committed after its first read, SQLite answers
//! `SQLITE_BUSY` at once instead of waiting out the busy timeout.
//! Taking the lock up front makes concurrent writers queue instead.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::DbResult;

pub mod order;
pub mod product;
pub mod user;

/// Starts a transaction that holds the database write lock from its
/// first statement.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
