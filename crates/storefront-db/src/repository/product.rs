//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - CRUD with partial updates (`ProductPatch`)
//! - Category filter with skip/limit paging
//! - Guarded stock adjustments
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, compute, write back                               │
//! │     SELECT stock ...; UPDATE products SET stock = 7                │
//! │     (two requests can both read 10 and both write 7)               │
//! │                                                                     │
//! │  ✅ CORRECT: relative update guarded in the WHERE clause           │
//! │     UPDATE products SET stock = stock - 3                          │
//! │     WHERE id = ? AND stock - 3 >= 0                                │
//! │                                                                     │
//! │  Zero rows affected → product missing, not enough stock, or the    │
//! │  result would pass MAX_STOCK.                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;
use storefront_core::{
    CoreError, Pagination, Product, ProductDraft, ProductFilter, ProductPatch, ValidationError,
    MAX_STOCK,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock, category, image_url, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.create(draft).await?;
/// let page = repo.list(&ProductFilter::default(), Pagination::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// The draft must already be validated (`ProductDraft::validate`).
    pub async fn create(&self, draft: ProductDraft) -> DbResult<Product> {
        debug!(name = %draft.name, price = %draft.price, "Creating product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products (name, description, price_cents, stock, category, image_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.cents())
            .bind(draft.stock)
            .bind(&draft.category)
            .bind(&draft.image_url)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        debug!(id = product.id, "Product created");
        Ok(product)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Lists products, optionally filtered by exact category, ordered by id.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: Pagination,
    ) -> DbResult<Vec<Product>> {
        debug!(category = ?filter.category, skip = page.skip, limit = page.limit, "Listing products");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE (?1 IS NULL OR category = ?1) \
             ORDER BY id \
             LIMIT ?2 OFFSET ?3"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&filter.category)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// The patch must already be validated (`ProductPatch::validate`).
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, patch: ProductPatch) -> DbResult<Product> {
        debug!(id, "Updating product");

        let mut tx = begin_write(&self.pool).await?;

        let mut product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        patch.apply(&mut product);
        product.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock = ?5,
                category = ?6,
                image_url = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Hard-deletes a product.
    ///
    /// Orders keep their snapshot line items; nothing references the row.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Applies `delta` to the product's stock.
    ///
    /// Negative deltas are refused with `InsufficientStock` when they
    /// would take stock below zero, positive ones with a validation error
    /// past `MAX_STOCK`; the row is left unchanged either way.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<Product> {
        debug!(id, delta, "Adjusting stock");

        let mut tx = begin_write(&self.pool).await?;
        let now = Utc::now();

        if !apply_stock_delta(&mut tx, id, delta, now).await? {
            let product = fetch_product(&mut tx, id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", id))?;
            if delta > 0 {
                return Err(CoreError::from(ValidationError::OutOfRange {
                    field: "stock".to_string(),
                    min: 0,
                    max: MAX_STOCK,
                })
                .into());
            }
            return Err(CoreError::InsufficientStock {
                product_id: id,
                available: product.stock,
                requested: -delta,
            }
            .into());
        }

        let product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;
        Ok(product)
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-Level Helpers
// =============================================================================
// These take a bare connection so the order engine can run them inside its
// own transaction. Never pass the pool here while a transaction is open.

/// Loads a single product on `conn`.
pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: i64,
) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(product)
}

/// Loads every product in `ids` that still exists, keyed by id.
pub(crate) async fn fetch_products(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> DbResult<HashMap<i64, Product>> {
    let mut found = HashMap::new();
    for &id in ids {
        if found.contains_key(&id) {
            continue;
        }
        if let Some(product) = fetch_product(&mut *conn, id).await? {
            found.insert(id, product);
        }
    }
    Ok(found)
}

/// Adds `delta` to stock unless the result would leave `0..=MAX_STOCK`.
///
/// Returns `false` when no row changed: the product is missing or the
/// guard refused the delta. SQLite turns an overflowing `stock + delta`
/// into a REAL, which the upper bound also refuses.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    id: i64,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET
            stock = stock + ?2,
            updated_at = ?3
        WHERE id = ?1 AND stock + ?2 BETWEEN 0 AND ?4
        "#,
    )
    .bind(id)
    .bind(delta)
    .bind(now)
    .bind(MAX_STOCK)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================
