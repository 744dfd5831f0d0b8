//! Delivery business logic - Individual drop-offs for subscriptions and orders.

use crate::{
    core::status::Lifecycle,
    entities::{Delivery, DeliveryStatus, delivery},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// What a delivery is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// A day of a recurring subscription
    Subscription(i64),
    /// A one-off order
    Order(i64),
}

/// Input for [`schedule_delivery`]
#[derive(Debug, Clone, Copy)]
pub struct NewDelivery {
    /// Owning subscription or order
    pub target: DeliveryTarget,
    /// Planned date
    pub scheduled_for: NaiveDate,
    /// Initial status, normally [`DeliveryStatus::Scheduled`]
    pub status: DeliveryStatus,
}

impl NewDelivery {
    /// A `scheduled` delivery for `target` on `date`
    #[must_use]
    pub const fn scheduled(target: DeliveryTarget, date: NaiveDate) -> Self {
        Self {
            target,
            scheduled_for: date,
            status: DeliveryStatus::Scheduled,
        }
    }
}

impl From<NewDelivery> for delivery::ActiveModel {
    fn from(new_delivery: NewDelivery) -> Self {
        let (subscription_id, order_id) = match new_delivery.target {
            DeliveryTarget::Subscription(id) => (Some(id), None),
            DeliveryTarget::Order(id) => (None, Some(id)),
        };
        Self {
            subscription_id: Set(subscription_id),
            order_id: Set(order_id),
            status: Set(new_delivery.status),
            scheduled_for: Set(new_delivery.scheduled_for),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
    }
}

/// Inserts a delivery. Works on a plain connection or inside a transaction.
///
/// # Errors
/// Returns an error if the insert fails.
pub async fn schedule_delivery<C>(db: &C, new_delivery: NewDelivery) -> Result<delivery::Model>
where
    C: ConnectionTrait,
{
    let active: delivery::ActiveModel = new_delivery.into();
    active.insert(db).await.map_err(Into::into)
}

/// Retrieves a delivery by id
pub async fn get_delivery_by_id(
    db: &DatabaseConnection,
    delivery_id: i64,
) -> Result<Option<delivery::Model>> {
    Delivery::find_by_id(delivery_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deliveries of a subscription, most recent date first
pub async fn get_deliveries_for_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<Vec<delivery::Model>> {
    Delivery::find()
        .filter(delivery::Column::SubscriptionId.eq(subscription_id))
        .order_by_desc(delivery::Column::ScheduledFor)
        .order_by_desc(delivery::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deliveries of an order, most recent date first
pub async fn get_deliveries_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<delivery::Model>> {
    Delivery::find()
        .filter(delivery::Column::OrderId.eq(order_id))
        .order_by_desc(delivery::Column::ScheduledFor)
        .order_by_desc(delivery::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Subscription ids that already have a delivery on `date`
pub async fn subscriptions_with_delivery_on(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Vec<i64>> {
    let deliveries = Delivery::find()
        .filter(delivery::Column::ScheduledFor.eq(date))
        .filter(delivery::Column::SubscriptionId.is_not_null())
        .all(db)
        .await?;

    Ok(deliveries
        .into_iter()
        .filter_map(|d| d.subscription_id)
        .collect())
}

/// Moves a delivery to `target` with a single write of status and timestamp.
///
/// # Errors
/// [`Error::NotFound`], [`Error::AlreadyFinal`] or [`Error::InvalidTransition`].
pub async fn update_delivery_status(
    db: &DatabaseConnection,
    delivery_id: i64,
    target: DeliveryStatus,
) -> Result<delivery::Model> {
    let delivery = get_delivery_by_id(db, delivery_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "delivery",
            id: delivery_id,
        })?;

    let current = delivery.status;
    current.check_transition(target)?;

    let mut active: delivery::ActiveModel = delivery.into();
    active.status = Set(target);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;

    info!("Delivery {} moved {} -> {}", delivery_id, current, target);
    Ok(updated)
}
