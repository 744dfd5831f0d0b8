//! Order business logic - Placing orders and moving them through their lifecycle.
//!
//! Placing an order writes the order, its lines and the matching payment transaction
//! in one database transaction. Status changes afterwards are single writes validated
//! by [`crate::core::status::Lifecycle`].

use crate::{
    core::{status::Lifecycle, user::require_approved_vendor},
    entities::{Order, OrderItem, OrderStatus, Product, order, order_item, transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// One requested line of a new order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    /// Product to buy
    pub product_id: i64,
    /// Units wanted
    pub quantity: i32,
}

/// Input for [`place_order`]
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Ordering customer
    pub user_id: i64,
    /// Vendor to order from
    pub vendor_id: i64,
    /// Requested lines
    pub lines: Vec<OrderLine>,
    /// Requested delivery date
    pub delivery_date: NaiveDate,
    /// Optional time slot
    pub delivery_slot: Option<String>,
}

/// Places an order in `pending` status.
///
/// Every product must belong to the vendor, be available and not deleted. The total is
/// computed from current product prices, which are copied onto the order lines. A
/// payment transaction for the total is recorded alongside the order.
///
/// # Errors
/// Returns an error if:
/// - There are no lines or a quantity is not positive
/// - The vendor is unknown or not approved
/// - A product is unknown, unavailable or sold by a different vendor
/// - Any database write fails (nothing is written in that case)
pub async fn place_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<order::Model> {
    if new_order.lines.is_empty() {
        return Err(Error::Validation {
            message: "An order needs at least one product".to_string(),
        });
    }

    if let Some(line) = new_order.lines.iter().find(|l| l.quantity <= 0) {
        return Err(Error::InvalidQuantity {
            quantity: line.quantity,
        });
    }

    let txn = db.begin().await?;

    require_approved_vendor(&txn, new_order.vendor_id).await?;

    let mut priced_lines = Vec::with_capacity(new_order.lines.len());
    for line in &new_order.lines {
        let product = Product::find_by_id(line.product_id)
            .one(&txn)
            .await?
            .filter(|p| !p.is_deleted && p.vendor_id == new_order.vendor_id)
            .ok_or(Error::NotFound {
                entity: "product",
                id: line.product_id,
            })?;

        if !product.is_available {
            return Err(Error::Validation {
                message: format!("{} is currently unavailable", product.name),
            });
        }

        priced_lines.push((*line, product.price));
    }

    let total: f64 = priced_lines
        .iter()
        .map(|(line, price)| price * f64::from(line.quantity))
        .sum();

    let now = chrono::Utc::now();
    let order = order::ActiveModel {
        user_id: Set(new_order.user_id),
        vendor_id: Set(new_order.vendor_id),
        status: Set(OrderStatus::Pending),
        total_amount: Set(total),
        delivery_date: Set(new_order.delivery_date),
        delivery_slot: Set(new_order.delivery_slot),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (line, unit_price) in priced_lines {
        order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(unit_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    transaction::ActiveModel {
        user_id: Set(order.user_id),
        vendor_id: Set(order.vendor_id),
        amount: Set(total),
        description: Set(format!("Order #{}", order.id)),
        date: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Order {} placed by user {} with vendor {} for {:.2}",
        order.id, order.user_id, order.vendor_id, total
    );
    Ok(order)
}

/// Retrieves an order by id
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Retrieves the lines of an order in insertion order
pub async fn get_order_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Orders placed by a customer, newest first
pub async fn get_orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Orders received by a vendor, newest first
pub async fn get_orders_for_vendor(
    db: &DatabaseConnection,
    vendor_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::VendorId.eq(vendor_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every order, newest first
pub async fn get_all_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order to `target`.
///
/// Exactly one write sets the status and the last-updated timestamp; every other
/// column is left as stored. Nothing is written when the transition is rejected.
///
/// # Errors
/// [`Error::NotFound`] for an unknown order, [`Error::AlreadyFinal`] when the order is
/// delivered or cancelled, [`Error::InvalidTransition`] for any other illegal target.
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    target: OrderStatus,
) -> Result<order::Model> {
    let order = get_order_by_id(db, order_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "order",
            id: order_id,
        })?;

    let current = order.status;
    current.check_transition(target)?;

    let mut active: order::ActiveModel = order.into();
    active.status = Set(target);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;

    info!("Order {} moved {} -> {}", order_id, current, target);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::product::set_product_availability;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_place_order_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut request = NewOrder {
            user_id: 1,
            vendor_id: 2,
            lines: Vec::new(),
            delivery_date: test_date(),
            delivery_slot: None,
        };
        let result = place_order(&db, request.clone()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        request.lines = vec![
            OrderLine {
                product_id: 1,
                quantity: 2,
            },
            OrderLine {
                product_id: 2,
                quantity: 0,
            },
        ];
        let result = place_order(&db, request).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_computes_total_and_records_payment() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let paneer = create_custom_product(&db, vendor.id, "Paneer", 2.5).await?;

        let order = place_order(
            &db,
            NewOrder {
                user_id: customer.id,
                vendor_id: vendor.id,
                lines: vec![
                    OrderLine {
                        product_id: milk.id,
                        quantity: 2,
                    },
                    OrderLine {
                        product_id: paneer.id,
                        quantity: 1,
                    },
                ],
                delivery_date: test_date(),
                delivery_slot: Some("6-8 AM".to_string()),
            },
        )
        .await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, 2.0 * milk.price + 2.5);
        assert_eq!(order.delivery_slot.as_deref(), Some("6-8 AM"));

        let items = get_order_items(&db, order.id).await?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, milk.id);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].unit_price, 2.5);

        let payments =
            crate::core::transaction::get_transactions_for_user(&db, customer.id).await?;
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, order.total_amount);
        assert_eq!(payments[0].description, format!("Order #{}", order.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_rejects_foreign_or_unavailable_products() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let other = create_test_vendor(&db, "Hilltop Farm").await?;
        let ghee = create_test_product(&db, other.id, "Ghee").await?;

        let foreign = place_order(
            &db,
            NewOrder {
                user_id: customer.id,
                vendor_id: vendor.id,
                lines: vec![OrderLine {
                    product_id: ghee.id,
                    quantity: 1,
                }],
                delivery_date: test_date(),
                delivery_slot: None,
            },
        )
        .await;
        assert!(matches!(
            foreign.unwrap_err(),
            Error::NotFound {
                entity: "product",
                ..
            }
        ));

        set_product_availability(&db, milk.id, false).await?;
        let unavailable = place_order(
            &db,
            NewOrder {
                user_id: customer.id,
                vendor_id: vendor.id,
                lines: vec![OrderLine {
                    product_id: milk.id,
                    quantity: 1,
                }],
                delivery_date: test_date(),
                delivery_slot: None,
            },
        )
        .await;
        assert!(matches!(unavailable.unwrap_err(), Error::Validation { .. }));

        // Nothing was written by the failed attempts
        assert!(get_orders_for_user(&db, customer.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_requires_approved_vendor() -> Result<()> {
        let (db, customer, _vendor, _milk) = setup_marketplace().await?;
        let pending = create_pending_vendor(&db, "Hilltop Farm").await?;

        let result = place_order(
            &db,
            NewOrder {
                user_id: customer.id,
                vendor_id: pending.id,
                lines: vec![OrderLine {
                    product_id: 1,
                    quantity: 1,
                }],
                delivery_date: test_date(),
                delivery_slot: None,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::VendorNotApproved { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_pending_order_then_already_final() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let order = create_test_order(&db, customer.id, vendor.id, milk.id).await?;

        let cancelled = update_order_status(&db, order.id, OrderStatus::Cancelled).await?;
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let again = update_order_status(&db, order.id, OrderStatus::Processing).await;
        let err = again.unwrap_err();
        assert!(matches!(err, Error::AlreadyFinal { .. }));
        assert!(err.is_rejected_transition());

        let stored = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        Ok(())
    }

    #[tokio::test]
    async fn test_transition_changes_only_status_and_timestamp() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let order = create_test_order(&db, customer.id, vendor.id, milk.id).await?;

        let updated = update_order_status(&db, order.id, OrderStatus::Processing).await?;
        assert_eq!(updated.status, OrderStatus::Processing);
        assert!(updated.updated_at >= order.updated_at);

        let expected = order::Model {
            status: OrderStatus::Processing,
            updated_at: updated.updated_at,
            ..order
        };
        assert_eq!(updated, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_order_lifecycle() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let order = create_test_order(&db, customer.id, vendor.id, milk.id).await?;

        for target in [
            OrderStatus::Processing,
            OrderStatus::Delayed,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            let updated = update_order_status(&db, order.id, target).await?;
            assert_eq!(updated.status, target);
        }

        let result = update_order_status(&db, order.id, OrderStatus::Cancelled).await;
        assert!(matches!(result.unwrap_err(), Error::AlreadyFinal { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_transition_performs_no_write() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let order = create_test_order(&db, customer.id, vendor.id, milk.id).await?;

        let result = update_order_status(&db, order.id, OrderStatus::Delivered).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { .. }
        ));

        let stored = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(stored, order);

        let missing = update_order_status(&db, 999, OrderStatus::Processing).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_order_listings() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let other_customer = create_test_user(&db, "Ben").await?;

        let first = create_test_order(&db, customer.id, vendor.id, milk.id).await?;
        let second = create_test_order(&db, other_customer.id, vendor.id, milk.id).await?;
        let third = create_test_order(&db, customer.id, vendor.id, milk.id).await?;

        let mine: Vec<i64> = get_orders_for_user(&db, customer.id)
            .await?
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(mine, vec![third.id, first.id]);

        let vendor_orders = get_orders_for_vendor(&db, vendor.id).await?;
        assert_eq!(vendor_orders.len(), 3);
        assert_eq!(vendor_orders[1].id, second.id);

        assert_eq!(get_all_orders(&db).await?.len(), 3);
        assert!(get_orders_for_vendor(&db, customer.id).await?.is_empty());
        Ok(())
    }
}
