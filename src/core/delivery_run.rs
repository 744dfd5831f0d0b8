//! Daily delivery run
//!
//! Once per day every active subscription that is due gets a delivery row: `delivered`
//! for ordinary subscriptions, `skipped` for those inside a vacation window. The writes
//! are independent and issued together, so one failing insert does not undo the
//! others. The date of the last clean run is kept in the `system_state` table.

use crate::{
    core::{
        delivery::{DeliveryTarget, NewDelivery, schedule_delivery, subscriptions_with_delivery_on},
        subscription::{get_active_subscriptions, is_due_on, is_on_vacation_on},
    },
    entities::{DeliveryStatus, SystemState, system_state},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use sea_orm::{Set, prelude::*};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

const LAST_DELIVERY_RUN_KEY: &str = "last_delivery_run";

/// Outcome of one daily run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryRunResult {
    /// Date the run covered
    pub run_date: NaiveDate,
    /// Subscriptions marked delivered
    pub delivered: Vec<i64>,
    /// Subscriptions skipped because of a vacation window
    pub skipped_on_vacation: Vec<i64>,
    /// Active subscriptions with nothing due on the run date
    pub not_due: Vec<i64>,
    /// Subscriptions that already had a delivery for the run date
    pub already_recorded: Vec<i64>,
    /// Subscriptions whose delivery could not be written, with the reason
    pub failures: Vec<(i64, String)>,
}

impl DeliveryRunResult {
    /// Whether every due subscription was written
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary for logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Delivery run {} - delivered: {}, on vacation: {}, not due: {}, already recorded: {}, failed: {}",
            self.run_date,
            self.delivered.len(),
            self.skipped_on_vacation.len(),
            self.not_due.len(),
            self.already_recorded.len(),
            self.failures.len()
        )
    }
}

/// Whether the run for `today` still has to happen.
///
/// True when no run was ever recorded or the last recorded run is older than `today`.
pub async fn is_delivery_run_needed(db: &DatabaseConnection, today: NaiveDate) -> Result<bool> {
    let last_run = get_last_delivery_run_date(db).await?;
    Ok(last_run.is_none_or(|last| last < today))
}

/// Date of the last complete run, if any
///
/// # Errors
/// [`Error::Config`] if the stored value is not a `YYYY-MM-DD` date.
pub async fn get_last_delivery_run_date(db: &DatabaseConnection) -> Result<Option<NaiveDate>> {
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_DELIVERY_RUN_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => NaiveDate::parse_from_str(&s.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("Failed to parse last delivery run date: {e}"),
            }),
        None => Ok(None),
    }
}

/// Stores `date` as the last complete run, inserting or updating the row
pub async fn set_last_delivery_run_date<C>(db: &C, date: NaiveDate) -> Result<()>
where
    C: ConnectionTrait,
{
    let date_str = date.format("%Y-%m-%d").to_string();
    let now = Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_DELIVERY_RUN_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(date_str);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(LAST_DELIVERY_RUN_KEY.to_string()),
            value: Set(date_str),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    Ok(())
}

/// Records today's deliveries for every due active subscription.
///
/// A subscription whose vacation window covers any part of `today` gets a `skipped`
/// row instead. Subscriptions that already have a delivery for `today` are left
/// alone, so running again after a partial failure only retries the missing ones.
/// The run date is stored only when nothing failed.
///
/// # Returns
/// * `Ok(Some(result))` - The run happened
/// * `Ok(None)` - A complete run for `today` was already recorded
#[instrument(skip(db))]
pub async fn process_daily_deliveries(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Option<DeliveryRunResult>> {
    if !is_delivery_run_needed(db, today).await? {
        info!("Delivery run for {} already done", today);
        return Ok(None);
    }

    let recorded: HashSet<i64> = subscriptions_with_delivery_on(db, today)
        .await?
        .into_iter()
        .collect();

    let mut result = DeliveryRunResult {
        run_date: today,
        ..Default::default()
    };
    let mut pending = Vec::new();

    for subscription in get_active_subscriptions(db).await? {
        if !is_due_on(&subscription, today) {
            result.not_due.push(subscription.id);
        } else if recorded.contains(&subscription.id) {
            result.already_recorded.push(subscription.id);
        } else {
            let status = if is_on_vacation_on(&subscription, today) {
                DeliveryStatus::Skipped
            } else {
                DeliveryStatus::Delivered
            };
            pending.push((subscription.id, status));
        }
    }

    let writes = pending.iter().map(|&(subscription_id, status)| async move {
        let new_delivery = NewDelivery {
            target: DeliveryTarget::Subscription(subscription_id),
            scheduled_for: today,
            status,
        };
        (subscription_id, status, schedule_delivery(db, new_delivery).await)
    });

    for (subscription_id, status, outcome) in join_all(writes).await {
        match outcome {
            Ok(_) if status == DeliveryStatus::Skipped => {
                result.skipped_on_vacation.push(subscription_id);
            }
            Ok(_) => result.delivered.push(subscription_id),
            Err(e) => {
                warn!("Delivery for subscription {} failed: {}", subscription_id, e);
                result.failures.push((subscription_id, e.to_string()));
            }
        }
    }

    if result.is_complete() {
        set_last_delivery_run_date(db, today).await?;
    }

    info!("{}", result.summary());
    Ok(Some(result))
}
