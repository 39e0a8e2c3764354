//! # Order Rules
//!
//! Pure order logic: pricing a request against the catalog, ownership
//! and the status state machine. The database layer runs these inside
//! its transactions; nothing here touches storage.
//!
//! ## Order Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderDraft ──validate()──► OrderDraft (trimmed, sizes checked)         │
//! │       │                                                                 │
//! │       ▼   (db layer loads referenced products inside the tx)           │
//! │  price_order(items, catalog)                                            │
//! │       │                                                                 │
//! │       ├── pass 1: every product exists   ──► ProductNotFound           │
//! │       ├── pass 2: combined qty ≤ stock   ──► InsufficientStock         │
//! │       ▼                                                                 │
//! │  PricedOrder { lines: snapshots, total: Σ catalog price × qty }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog price is authoritative. A price sent by the client is kept
//! on the snapshot as `quoted_price_cents` and never enters the total.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Order, OrderItemRequest, OrderLineItem, OrderStatus, Product};

// =============================================================================
// Pricing
// =============================================================================

/// Result of pricing an order request.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    /// Snapshot line items in request order.
    pub lines: Vec<OrderLineItem>,
    /// Sum of line totals.
    pub total: Money,
}

impl PricedOrder {
    /// Quantity to take from stock per product, duplicates combined.
    ///
    /// Products appear in first-requested order.
    pub fn stock_demand(&self) -> Vec<(i64, i64)> {
        combine_quantities(self.lines.iter().map(|l| (l.product_id, l.quantity)))
    }
}

fn combine_quantities(pairs: impl Iterator<Item = (i64, i64)>) -> Vec<(i64, i64)> {
    let mut demand: Vec<(i64, i64)> = Vec::new();
    for (product_id, quantity) in pairs {
        match demand.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, total)) => *total += quantity,
            None => demand.push((product_id, quantity)),
        }
    }
    demand
}

/// Prices `items` against the products in `catalog`.
///
/// ## Rules
/// - Every referenced product must exist (first missing id, in request
///   order, is reported)
/// - For each product the combined requested quantity must not exceed
///   stock
/// - Line name and unit price are copied from the catalog
/// - A total that does not fit in `i64` cents is a validation error
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use chrono::Utc;
/// use storefront_core::order::price_order;
/// use storefront_core::{Money, OrderItemRequest, Product};
///
/// let now = Utc::now();
/// let mug = Product {
///     id: 1, name: "Mug".into(), description: None, price_cents: 2999,
///     stock: 10, category: None, image_url: None,
///     created_at: now, updated_at: now,
/// };
/// let catalog = HashMap::from([(1, mug)]);
/// let items = [OrderItemRequest { product_id: 1, quantity: 2, quoted_price: None }];
///
/// let priced = price_order(&items, &catalog).unwrap();
/// assert_eq!(priced.total, Money::from_cents(5998));
/// ```
pub fn price_order(
    items: &[OrderItemRequest],
    catalog: &HashMap<i64, Product>,
) -> CoreResult<PricedOrder> {
    for item in items {
        if !catalog.contains_key(&item.product_id) {
            return Err(CoreError::ProductNotFound(item.product_id));
        }
    }

    let demand = combine_quantities(items.iter().map(|i| (i.product_id, i.quantity)));
    for (product_id, requested) in demand {
        let product = catalog
            .get(&product_id)
            .ok_or(CoreError::ProductNotFound(product_id))?;
        if !product.has_stock(requested) {
            return Err(CoreError::InsufficientStock {
                product_id,
                available: product.stock,
                requested,
            });
        }
    }

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = catalog
            .get(&item.product_id)
            .ok_or(CoreError::ProductNotFound(item.product_id))?;
        lines.push(OrderLineItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity: item.quantity,
            unit_price_cents: product.price_cents,
            quoted_price_cents: item.quoted_price.map(|p| p.cents()),
        });
    }

    let total = lines
        .iter()
        .map(OrderLineItem::line_total)
        .try_fold(Money::zero(), |acc, line| acc.checked_add(line?))
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "total_amount".to_string(),
            min: 1,
            max: i64::MAX,
        })?;

    Ok(PricedOrder { lines, total })
}

// =============================================================================
// Ownership
// =============================================================================

/// Fails with `OrderForbidden` unless `user_id` owns `order`.
pub fn ensure_owner(order: &Order, user_id: i64) -> CoreResult<()> {
    if order.user_id != user_id {
        return Err(CoreError::OrderForbidden { order_id: order.id });
    }
    Ok(())
}

// =============================================================================
// Status State Machine
// =============================================================================

/// Checks a status change requested through an order update.
///
/// ## Allowed
/// ```text
/// pending    ──► processing | completed | cancelled
/// processing ──► completed | cancelled
/// same status on a non-terminal order (no-op)
/// ```
/// Terminal orders reject every status change, and moving backwards in
/// the lifecycle is rejected.
pub fn check_transition(order_id: i64, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    let allowed = match (from, to) {
        (OrderStatus::Completed | OrderStatus::Cancelled, _) => false,
        (_, OrderStatus::Cancelled) => true,
        (OrderStatus::Pending, _) => true,
        (OrderStatus::Processing, OrderStatus::Processing | OrderStatus::Completed) => true,
        (OrderStatus::Processing, OrderStatus::Pending) => false,
    };

    if !allowed {
        return Err(CoreError::InvalidStateTransition { order_id, from, to });
    }
    Ok(())
}

/// Checks that `order` may be cancelled.
///
/// Completed and already-cancelled orders fail with distinct errors.
pub fn ensure_cancellable(order: &Order) -> CoreResult<()> {
    match order.status {
        OrderStatus::Completed => Err(CoreError::CannotCancelCompleted(order.id)),
        OrderStatus::Cancelled => Err(CoreError::AlreadyCancelled(order.id)),
        OrderStatus::Pending | OrderStatus::Processing => Ok(()),
    }
}

/// Quantity to give back to stock per product when `order` is cancelled.
pub fn restock_plan(order: &Order) -> Vec<(i64, i64)> {
    combine_quantities(order.items.iter().map(|l| (l.product_id, l.quantity)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: format!("Product {id}"),
            description: None,
            price_cents,
            stock,
            category: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(product_id: i64, quantity: i64) -> OrderItemRequest {
        OrderItemRequest {
            product_id,
            quantity,
            quoted_price: None,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    fn order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: 9,
            user_id: 1,
            total_cents: 5998,
            status,
            shipping_address: "123 Test Street".to_string(),
            items: vec![
                OrderLineItem {
                    product_id: 1,
                    name: "Product 1".to_string(),
                    quantity: 2,
                    unit_price_cents: 2999,
                    quoted_price_cents: None,
                },
                OrderLineItem {
                    product_id: 1,
                    name: "Product 1".to_string(),
                    quantity: 3,
                    unit_price_cents: 2999,
                    quoted_price_cents: None,
                },
            ],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_price_order_uses_catalog_price() {
        let catalog = catalog(vec![product(1, 2999, 100), product(2, 500, 5)]);
        let items = vec![
            OrderItemRequest {
                product_id: 1,
                quantity: 2,
                quoted_price: Some(Money::from_cents(1)),
            },
            item(2, 1),
        ];

        let priced = price_order(&items, &catalog).unwrap();

        assert_eq!(priced.total.cents(), 2999 * 2 + 500);
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[0].unit_price_cents, 2999);
        assert_eq!(priced.lines[0].quoted_price_cents, Some(1));
        assert_eq!(priced.lines[0].name, "Product 1");
        assert_eq!(priced.lines[1].product_id, 2);
    }

    #[test]
    fn test_price_order_reports_first_missing_product() {
        let catalog = catalog(vec![product(1, 2999, 100)]);
        let items = vec![item(1, 1), item(99999, 1), item(42, 1)];

        let err = price_order(&items, &catalog).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(99999)));
    }

    #[test]
    fn test_price_order_missing_product_wins_over_stock() {
        let catalog = catalog(vec![product(1, 2999, 1)]);
        let items = vec![item(1, 50), item(2, 1)];

        let err = price_order(&items, &catalog).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(2)));
    }

    #[test]
    fn test_price_order_insufficient_stock() {
        let catalog = catalog(vec![product(1, 2999, 100)]);
        let items = vec![item(1, 200)];

        let err = price_order(&items, &catalog).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, 1);
                assert_eq!(available, 100);
                assert_eq!(requested, 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_price_order_combines_duplicate_lines() {
        let catalog = catalog(vec![product(1, 100, 5)]);

        let ok = price_order(&[item(1, 2), item(1, 3)], &catalog).unwrap();
        assert_eq!(ok.stock_demand(), vec![(1, 5)]);
        assert_eq!(ok.total.cents(), 500);

        let err = price_order(&[item(1, 3), item(1, 3)], &catalog).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { requested: 6, .. }
        ));
    }

    #[test]
    fn test_price_order_total_overflow_is_rejected() {
        // Rows written before the price cap existed can still hold this
        let catalog = catalog(vec![
            product(1, i64::MAX / 2 + 1, 10),
            product(2, i64::MAX / 4, 10),
        ]);

        let err = price_order(&[item(1, 2)], &catalog).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));

        let err = price_order(&[item(2, 3), item(2, 3)], &catalog).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_ensure_owner() {
        let o = order(OrderStatus::Pending);
        assert!(ensure_owner(&o, 1).is_ok());
        assert!(matches!(
            ensure_owner(&o, 2),
            Err(CoreError::OrderForbidden { order_id: 9 })
        ));
    }

    #[test]
    fn test_transitions_forward() {
        use OrderStatus::*;
        assert!(check_transition(1, Pending, Processing).is_ok());
        assert!(check_transition(1, Pending, Completed).is_ok());
        assert!(check_transition(1, Pending, Cancelled).is_ok());
        assert!(check_transition(1, Processing, Completed).is_ok());
        assert!(check_transition(1, Processing, Cancelled).is_ok());
        assert!(check_transition(1, Pending, Pending).is_ok());
        assert!(check_transition(1, Processing, Processing).is_ok());
    }

    #[test]
    fn test_transitions_rejected() {
        use OrderStatus::*;
        assert!(check_transition(1, Processing, Pending).is_err());
        for to in OrderStatus::ALL {
            assert!(check_transition(1, Completed, to).is_err());
            assert!(check_transition(1, Cancelled, to).is_err());
        }
    }

    #[test]
    fn test_ensure_cancellable() {
        assert!(ensure_cancellable(&order(OrderStatus::Pending)).is_ok());
        assert!(ensure_cancellable(&order(OrderStatus::Processing)).is_ok());
        assert!(matches!(
            ensure_cancellable(&order(OrderStatus::Completed)),
            Err(CoreError::CannotCancelCompleted(9))
        ));
        assert!(matches!(
            ensure_cancellable(&order(OrderStatus::Cancelled)),
            Err(CoreError::AlreadyCancelled(9))
        ));
    }

    #[test]
    fn test_restock_plan_combines_lines() {
        assert_eq!(restock_plan(&order(OrderStatus::Pending)), vec![(1, 5)]);
    }
}
