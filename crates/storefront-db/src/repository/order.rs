//! # Order Repository
//!
//! The order engine: placement, retrieval, updates and cancellation.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (one transaction)                                            │
//! │     └── load products → price_order() → decrement stock → INSERT       │
//! │     └── any failure rolls back every stock change                      │
//! │                                                                         │
//! │  2. UPDATE                                                             │
//! │     └── pending → processing → completed                               │
//! │     └── shipping address while not terminal                            │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL (one transaction)                                │
//! │     └── restore stock from the snapshot → status = cancelled           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every statement inside a transaction runs on the transaction's own
//! connection. Going back to the pool mid-transaction would wait on the
//! connection the transaction holds (the in-memory pool has exactly one).

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::begin_write;
use crate::repository::product::{apply_stock_delta, fetch_product, fetch_products};
use storefront_core::order::{check_transition, ensure_cancellable, ensure_owner, price_order, restock_plan};
use storefront_core::{
    CoreError, Order, OrderDraft, OrderLineItem, OrderPatch, OrderStatus, Pagination,
};

const ORDER_COLUMNS: &str =
    "id, user_id, total_cents, status, shipping_address, items, created_at, updated_at";

/// Row shape of the `orders` table; `items` is a JSON array.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    total_cents: i64,
    status: OrderStatus,
    shipping_address: String,
    items: Json<Vec<OrderLineItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            total_cents: row.total_cents,
            status: row.status,
            shipping_address: row.shipping_address,
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for `user_id`.
    ///
    /// ## Steps (all inside one transaction)
    /// 1. Load every referenced product
    /// 2. Price the request against the catalog (existence, stock, total)
    /// 3. Decrement stock per product with a guarded UPDATE
    /// 4. Insert the order with snapshot line items, status `pending`
    ///
    /// The draft must already be validated (`OrderDraft::validate`).
    ///
    /// ## Errors
    /// * `ProductNotFound` - first missing product in request order
    /// * `InsufficientStock` - no stock was changed
    pub async fn create_order(&self, user_id: i64, draft: OrderDraft) -> DbResult<Order> {
        debug!(user_id, lines = draft.items.len(), "Creating order");

        let mut tx = begin_write(&self.pool).await?;

        let ids: Vec<i64> = draft.items.iter().map(|i| i.product_id).collect();
        let catalog = fetch_products(&mut tx, &ids).await?;
        let priced = price_order(&draft.items, &catalog)?;

        let now = Utc::now();
        for (product_id, quantity) in priced.stock_demand() {
            if !apply_stock_delta(&mut tx, product_id, -quantity, now).await? {
                // Stock moved between the read and the guarded update
                let available = fetch_product(&mut tx, product_id)
                    .await?
                    .ok_or(CoreError::ProductNotFound(product_id))?
                    .stock;
                return Err(CoreError::InsufficientStock {
                    product_id,
                    available,
                    requested: quantity,
                }
                .into());
            }
        }

        let sql = format!(
            "INSERT INTO orders (user_id, total_cents, status, shipping_address, items, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
             RETURNING {ORDER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .bind(priced.total.cents())
            .bind(OrderStatus::Pending)
            .bind(&draft.shipping_address)
            .bind(Json(&priced.lines))
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let order = Order::from(row);
        info!(
            order_id = order.id,
            user_id,
            total = %order.total(),
            "Order placed"
        );
        Ok(order)
    }

    /// Gets an order owned by `user_id`.
    ///
    /// ## Errors
    /// * `OrderNotFound` - no such order
    /// * `OrderForbidden` - order belongs to another user
    pub async fn get_order(&self, user_id: i64, order_id: i64) -> DbResult<Order> {
        let mut conn = self.pool.acquire().await?;
        let order = load_order(&mut conn, order_id).await?;
        ensure_owner(&order, user_id)?;
        Ok(order)
    }

    /// Lists `user_id`'s orders, newest first.
    pub async fn list_orders(&self, user_id: i64, page: Pagination) -> DbResult<Vec<Order>> {
        debug!(user_id, skip = page.skip, limit = page.limit, "Listing orders");

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT ?2 OFFSET ?3"
        );

        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Applies a status and/or shipping address change.
    ///
    /// Moving to `cancelled` restores stock exactly like
    /// [`cancel_order`](Self::cancel_order). The patch must already be
    /// validated (`OrderPatch::validate`).
    ///
    /// ## Errors
    /// * `OrderNotFound` / `OrderForbidden`
    /// * `InvalidStateTransition` - terminal order or backwards move
    pub async fn update_order(
        &self,
        user_id: i64,
        order_id: i64,
        patch: OrderPatch,
    ) -> DbResult<Order> {
        debug!(user_id, order_id, status = ?patch.status, "Updating order");

        let mut tx = begin_write(&self.pool).await?;

        let mut order = load_order(&mut tx, order_id).await?;
        ensure_owner(&order, user_id)?;

        let now = Utc::now();
        if let Some(to) = patch.status {
            check_transition(order.id, order.status, to)?;
            if to == OrderStatus::Cancelled {
                restore_stock(&mut tx, &order, now).await?;
            }
            order.status = to;
        }
        if let Some(address) = patch.shipping_address {
            order.shipping_address = address;
        }
        order.updated_at = now;

        save_order_state(&mut tx, &order).await?;
        tx.commit().await?;

        info!(order_id, status = %order.status, "Order updated");
        Ok(order)
    }

    /// Cancels an order and restores stock from its snapshot.
    ///
    /// Products deleted since the order was placed are skipped. All
    /// restorations and the status change commit together.
    ///
    /// ## Errors
    /// * `OrderNotFound` / `OrderForbidden`
    /// * `CannotCancelCompleted` / `AlreadyCancelled`
    pub async fn cancel_order(&self, user_id: i64, order_id: i64) -> DbResult<Order> {
        debug!(user_id, order_id, "Cancelling order");

        let mut tx = begin_write(&self.pool).await?;

        let mut order = load_order(&mut tx, order_id).await?;
        ensure_owner(&order, user_id)?;
        ensure_cancellable(&order)?;

        let now = Utc::now();
        restore_stock(&mut tx, &order, now).await?;

        order.status = OrderStatus::Cancelled;
        order.updated_at = now;
        save_order_state(&mut tx, &order).await?;

        tx.commit().await?;

        info!(order_id, user_id, "Order cancelled");
        Ok(order)
    }
}

// =============================================================================
// Connection-Level Helpers
// =============================================================================

async fn load_order(conn: &mut SqliteConnection, order_id: i64) -> DbResult<Order> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(order_id)
        .fetch_optional(conn)
        .await?
        .ok_or(CoreError::OrderNotFound(order_id))?;

    Ok(row.into())
}

async fn save_order_state(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE orders SET
            status = ?2,
            shipping_address = ?3,
            updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(order.id)
    .bind(order.status)
    .bind(&order.shipping_address)
    .bind(order.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gives each snapshot line's quantity back to its product.
async fn restore_stock(
    conn: &mut SqliteConnection,
    order: &Order,
    now: DateTime<Utc>,
) -> DbResult<()> {
    for (product_id, quantity) in restock_plan(order) {
        if !apply_stock_delta(&mut *conn, product_id, quantity, now).await? {
            warn!(
                order_id = order.id,
                product_id, quantity, "Product no longer exists, stock not restored"
            );
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
