//! Subscription business logic - Recurring deliveries, vacations and status changes.
//!
//! The vacation window is stored next to the status but never changes it. What a
//! screen shows is derived by [`display_status`]: inside an active vacation window a
//! subscription reads "On Vacation", otherwise it reads its stored status.

use crate::{
    core::{status::Lifecycle, user::require_approved_vendor},
    entities::{Frequency, Product, Subscription, SubscriptionStatus, subscription},
    errors::{Error, Result},
};
use chrono::{Duration, NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::fmt;
use tracing::info;

/// Status as presented to people, derived from stored status and vacation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionDisplayStatus {
    /// Stored `active`, not on vacation
    Active,
    /// Inside the vacation window
    OnVacation,
    /// Stored `paused`
    Paused,
    /// Stored `completed`
    Completed,
    /// Stored `cancelled`
    Cancelled,
}

impl SubscriptionDisplayStatus {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnVacation => "On Vacation",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for SubscriptionDisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether `now` falls inside the subscription's vacation window (bounds inclusive)
#[must_use]
pub fn is_on_vacation(subscription: &subscription::Model, now: DateTimeUtc) -> bool {
    if !subscription.vacation_mode {
        return false;
    }
    match (subscription.vacation_start, subscription.vacation_end) {
        (Some(start), Some(end)) => start <= now && now <= end,
        _ => false,
    }
}

/// Whether the vacation window covers any part of `date` (UTC calendar day)
#[must_use]
pub fn is_on_vacation_on(subscription: &subscription::Model, date: NaiveDate) -> bool {
    if !subscription.vacation_mode {
        return false;
    }
    let day_start = date.and_time(NaiveTime::MIN).and_utc();
    let next_day = day_start + Duration::days(1);
    match (subscription.vacation_start, subscription.vacation_end) {
        (Some(start), Some(end)) => start < next_day && end >= day_start,
        _ => false,
    }
}

/// Derives the status to display at `now`.
///
/// An active vacation window takes precedence over whatever status is stored.
#[must_use]
pub fn display_status(
    subscription: &subscription::Model,
    now: DateTimeUtc,
) -> SubscriptionDisplayStatus {
    if is_on_vacation(subscription, now) {
        return SubscriptionDisplayStatus::OnVacation;
    }
    match subscription.status {
        SubscriptionStatus::Active => SubscriptionDisplayStatus::Active,
        SubscriptionStatus::Paused => SubscriptionDisplayStatus::Paused,
        SubscriptionStatus::Completed => SubscriptionDisplayStatus::Completed,
        SubscriptionStatus::Cancelled => SubscriptionDisplayStatus::Cancelled,
    }
}

/// Whether the subscription's cadence and date range call for a delivery on `date`.
///
/// Status and vacation are not considered here.
#[must_use]
pub fn is_due_on(subscription: &subscription::Model, date: NaiveDate) -> bool {
    if date < subscription.start_date {
        return false;
    }
    if subscription.end_date.is_some_and(|end| date > end) {
        return false;
    }
    let elapsed = (date - subscription.start_date).num_days();
    elapsed % subscription.frequency.interval_days() == 0
}

/// Input for [`create_subscription`]
#[derive(Debug, Clone)]
pub struct NewSubscription {
    /// Subscribing customer
    pub user_id: i64,
    /// Delivering vendor
    pub vendor_id: i64,
    /// Product delivered
    pub product_id: i64,
    /// Units per delivery
    pub quantity: i32,
    /// Delivery cadence
    pub frequency: Frequency,
    /// First delivery date
    pub start_date: NaiveDate,
    /// Last delivery date
    pub end_date: Option<NaiveDate>,
}

/// Creates an `active` subscription without a vacation window.
///
/// # Errors
/// Returns an error if:
/// - The quantity is not positive or the end date precedes the start date
/// - The vendor is unknown or not approved
/// - The product is unknown, deleted or sold by a different vendor
/// - The database insert fails
pub async fn create_subscription(
    db: &DatabaseConnection,
    new_subscription: NewSubscription,
) -> Result<subscription::Model> {
    if new_subscription.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: new_subscription.quantity,
        });
    }

    if new_subscription
        .end_date
        .is_some_and(|end| end < new_subscription.start_date)
    {
        return Err(Error::Validation {
            message: "Subscription end date cannot precede its start date".to_string(),
        });
    }

    require_approved_vendor(db, new_subscription.vendor_id).await?;

    Product::find_by_id(new_subscription.product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted && p.vendor_id == new_subscription.vendor_id)
        .ok_or(Error::NotFound {
            entity: "product",
            id: new_subscription.product_id,
        })?;

    let now = chrono::Utc::now();
    let subscription = subscription::ActiveModel {
        user_id: Set(new_subscription.user_id),
        vendor_id: Set(new_subscription.vendor_id),
        product_id: Set(new_subscription.product_id),
        quantity: Set(new_subscription.quantity),
        frequency: Set(new_subscription.frequency),
        status: Set(SubscriptionStatus::Active),
        start_date: Set(new_subscription.start_date),
        end_date: Set(new_subscription.end_date),
        vacation_mode: Set(false),
        vacation_start: Set(None),
        vacation_end: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    subscription.insert(db).await.map_err(Into::into)
}

/// Retrieves a subscription by id
pub async fn get_subscription_by_id(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<Option<subscription::Model>> {
    Subscription::find_by_id(subscription_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<subscription::Model> {
    get_subscription_by_id(db, subscription_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "subscription",
            id: subscription_id,
        })
}

/// Subscriptions of a customer, newest first
pub async fn get_subscriptions_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .order_by_desc(subscription::Column::CreatedAt)
        .order_by_desc(subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Subscriptions served by a vendor, newest first
pub async fn get_subscriptions_for_vendor(
    db: &DatabaseConnection,
    vendor_id: i64,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::VendorId.eq(vendor_id))
        .order_by_desc(subscription::Column::CreatedAt)
        .order_by_desc(subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every subscription, newest first
pub async fn get_all_subscriptions(db: &DatabaseConnection) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .order_by_desc(subscription::Column::CreatedAt)
        .order_by_desc(subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Subscriptions with stored status `active`, oldest first
pub async fn get_active_subscriptions(
    db: &DatabaseConnection,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .order_by_asc(subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a subscription to `target`.
///
/// Exactly one write sets the status and the last-updated timestamp. Nothing is
/// written when the transition is rejected.
///
/// # Errors
/// [`Error::NotFound`] for an unknown subscription, [`Error::AlreadyFinal`] when it is
/// completed or cancelled, [`Error::InvalidTransition`] for any other illegal target.
pub async fn update_subscription_status(
    db: &DatabaseConnection,
    subscription_id: i64,
    target: SubscriptionStatus,
) -> Result<subscription::Model> {
    let subscription = require_subscription(db, subscription_id).await?;

    let current = subscription.status;
    current.check_transition(target)?;

    let mut active: subscription::ActiveModel = subscription.into();
    active.status = Set(target);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;

    info!(
        "Subscription {} moved {} -> {}",
        subscription_id, current, target
    );
    Ok(updated)
}

/// Sets a vacation window. Deliveries inside it are skipped by the daily run.
///
/// # Errors
/// Returns an error if the window ends before it starts, the subscription does not
/// exist, or it is already completed or cancelled.
pub async fn set_vacation(
    db: &DatabaseConnection,
    subscription_id: i64,
    start: DateTimeUtc,
    end: DateTimeUtc,
) -> Result<subscription::Model> {
    if end < start {
        return Err(Error::Validation {
            message: "Vacation cannot end before it starts".to_string(),
        });
    }

    let subscription = require_subscription(db, subscription_id).await?;
    if subscription.status.is_terminal() {
        return Err(Error::AlreadyFinal {
            entity: SubscriptionStatus::ENTITY,
            status: subscription.status.to_string(),
        });
    }

    let mut active: subscription::ActiveModel = subscription.into();
    active.vacation_mode = Set(true);
    active.vacation_start = Set(Some(start));
    active.vacation_end = Set(Some(end));
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;

    info!(
        "Subscription {} on vacation from {} to {}",
        subscription_id, start, end
    );
    Ok(updated)
}

/// Removes the vacation window
///
/// # Errors
/// Returns an error if the subscription does not exist or the update fails.
pub async fn clear_vacation(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<subscription::Model> {
    let subscription = require_subscription(db, subscription_id).await?;

    let mut active: subscription::ActiveModel = subscription.into();
    active.vacation_mode = Set(false);
    active.vacation_start = Set(None);
    active.vacation_end = Set(None);
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn model(status: SubscriptionStatus, frequency: Frequency) -> subscription::Model {
        let now = Utc::now();
        subscription::Model {
            id: 1,
            user_id: 1,
            vendor_id: 2,
            product_id: 3,
            quantity: 1,
            frequency,
            status,
            start_date: test_date(),
            end_date: None,
            vacation_mode: false,
            vacation_start: None,
            vacation_end: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn on_vacation(mut sub: subscription::Model, now: DateTimeUtc) -> subscription::Model {
        sub.vacation_mode = true;
        sub.vacation_start = Some(now - Duration::days(1));
        sub.vacation_end = Some(now + Duration::days(5));
        sub
    }

    #[test]
    fn test_active_subscription_inside_window_shows_on_vacation() {
        let now = Utc::now();
        let sub = on_vacation(model(SubscriptionStatus::Active, Frequency::Daily), now);

        assert_eq!(display_status(&sub, now), SubscriptionDisplayStatus::OnVacation);
        assert_eq!(display_status(&sub, now).to_string(), "On Vacation");
        // The stored status is untouched
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_vacation_overrides_any_stored_status() {
        let now = Utc::now();
        for status in [
            SubscriptionStatus::Paused,
            SubscriptionStatus::Completed,
            SubscriptionStatus::Cancelled,
        ] {
            let sub = on_vacation(model(status, Frequency::Daily), now);
            assert_eq!(display_status(&sub, now), SubscriptionDisplayStatus::OnVacation);
        }
    }

    #[test]
    fn test_outside_window_shows_stored_status() {
        let now = Utc::now();
        let sub = on_vacation(model(SubscriptionStatus::Active, Frequency::Daily), now);

        let before = now - Duration::days(2);
        let after = now + Duration::days(6);
        assert_eq!(display_status(&sub, before), SubscriptionDisplayStatus::Active);
        assert_eq!(display_status(&sub, after), SubscriptionDisplayStatus::Active);

        // Window bounds are inclusive
        assert!(is_on_vacation(&sub, sub.vacation_start.unwrap()));
        assert!(is_on_vacation(&sub, sub.vacation_end.unwrap()));

        // Flag off means no vacation even with dates present
        let mut flag_off = sub;
        flag_off.vacation_mode = false;
        assert_eq!(display_status(&flag_off, now), SubscriptionDisplayStatus::Active);

        let paused = model(SubscriptionStatus::Paused, Frequency::Daily);
        assert_eq!(display_status(&paused, now).label(), "Paused");
    }

    #[test]
    fn test_vacation_on_date_uses_the_calendar_day() {
        let day = test_date();
        let mut sub = model(SubscriptionStatus::Active, Frequency::Daily);
        sub.vacation_mode = true;
        sub.vacation_start = Some(day.and_hms_opt(18, 0, 0).unwrap().and_utc());
        sub.vacation_end = Some((day + Duration::days(2)).and_hms_opt(6, 0, 0).unwrap().and_utc());

        assert!(!is_on_vacation_on(&sub, day - Duration::days(1)));
        // Starting in the evening still covers that day
        assert!(is_on_vacation_on(&sub, day));
        assert!(is_on_vacation_on(&sub, day + Duration::days(1)));
        assert!(is_on_vacation_on(&sub, day + Duration::days(2)));
        assert!(!is_on_vacation_on(&sub, day + Duration::days(3)));

        sub.vacation_mode = false;
        assert!(!is_on_vacation_on(&sub, day));
    }

    #[test]
    fn test_is_due_on_follows_frequency_and_range() {
        let start = test_date();
        let daily = model(SubscriptionStatus::Active, Frequency::Daily);
        let alternate = model(SubscriptionStatus::Active, Frequency::AlternateDays);
        let weekly = model(SubscriptionStatus::Active, Frequency::Weekly);

        assert!(!is_due_on(&daily, start - Duration::days(1)));
        assert!(is_due_on(&daily, start));
        assert!(is_due_on(&daily, start + Duration::days(3)));

        assert!(is_due_on(&alternate, start + Duration::days(2)));
        assert!(!is_due_on(&alternate, start + Duration::days(3)));

        assert!(is_due_on(&weekly, start + Duration::days(14)));
        assert!(!is_due_on(&weekly, start + Duration::days(6)));

        let mut bounded = daily;
        bounded.end_date = Some(start + Duration::days(2));
        assert!(is_due_on(&bounded, start + Duration::days(2)));
        assert!(!is_due_on(&bounded, start + Duration::days(3)));
    }

    #[tokio::test]
    async fn test_create_subscription_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let request = NewSubscription {
            user_id: 1,
            vendor_id: 2,
            product_id: 3,
            quantity: 0,
            frequency: Frequency::Daily,
            start_date: test_date(),
            end_date: None,
        };

        let result = create_subscription(&db, request.clone()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));

        let result = create_subscription(
            &db,
            NewSubscription {
                quantity: 1,
                end_date: Some(test_date() - Duration::days(1)),
                ..request
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list_subscriptions() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;

        let sub = create_test_subscription(&db, customer.id, vendor.id, milk.id).await?;
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(!sub.vacation_mode);

        assert_eq!(get_subscriptions_for_user(&db, customer.id).await?.len(), 1);
        assert_eq!(get_subscriptions_for_vendor(&db, vendor.id).await?.len(), 1);
        assert_eq!(get_active_subscriptions(&db).await?.len(), 1);
        assert_eq!(get_all_subscriptions(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_subscription_pause_resume_cancel() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let sub = create_test_subscription(&db, customer.id, vendor.id, milk.id).await?;

        let paused = update_subscription_status(&db, sub.id, SubscriptionStatus::Paused).await?;
        assert_eq!(paused.status, SubscriptionStatus::Paused);
        assert!(get_active_subscriptions(&db).await?.is_empty());

        // Paused cannot complete directly
        let result = update_subscription_status(&db, sub.id, SubscriptionStatus::Completed).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidTransition { .. }
        ));

        update_subscription_status(&db, sub.id, SubscriptionStatus::Active).await?;
        let cancelled =
            update_subscription_status(&db, sub.id, SubscriptionStatus::Cancelled).await?;
        assert_eq!(cancelled.quantity, sub.quantity);
        assert_eq!(cancelled.start_date, sub.start_date);

        let result = update_subscription_status(&db, sub.id, SubscriptionStatus::Active).await;
        assert!(matches!(result.unwrap_err(), Error::AlreadyFinal { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_and_clear_vacation() -> Result<()> {
        let (db, customer, vendor, milk) = setup_marketplace().await?;
        let sub = create_test_subscription(&db, customer.id, vendor.id, milk.id).await?;
        let now = Utc::now();

        let bad = set_vacation(&db, sub.id, now, now - Duration::days(1)).await;
        assert!(matches!(bad.unwrap_err(), Error::Validation { .. }));

        let on_leave =
            set_vacation(&db, sub.id, now - Duration::days(1), now + Duration::days(5)).await?;
        assert!(on_leave.vacation_mode);
        assert_eq!(on_leave.status, SubscriptionStatus::Active);
        assert_eq!(display_status(&on_leave, now), SubscriptionDisplayStatus::OnVacation);

        let back = clear_vacation(&db, sub.id).await?;
        assert!(!back.vacation_mode);
        assert!(back.vacation_start.is_none());
        assert_eq!(display_status(&back, now), SubscriptionDisplayStatus::Active);

        update_subscription_status(&db, sub.id, SubscriptionStatus::Cancelled).await?;
        let closed = set_vacation(&db, sub.id, now, now + Duration::days(1)).await;
        assert!(matches!(closed.unwrap_err(), Error::AlreadyFinal { .. }));

        Ok(())
    }
}
