//! Report generation business logic.
//!
//! Per-vendor summaries built from orders, subscriptions and payments. All functions
//! return structured data that a presentation layer can format.

use crate::{
    core::{
        order::get_orders_for_vendor,
        search::NameLookup,
        subscription::{get_subscriptions_for_vendor, is_on_vacation},
        transaction::get_transactions_for_vendor,
        user::require_vendor,
    },
    entities::{OrderStatus, SubscriptionStatus, transaction, user},
    errors::Result,
};
use sea_orm::{DatabaseConnection, prelude::DateTimeUtc};
use std::collections::HashMap;

/// Summary of one vendor's business
#[derive(Debug, Clone)]
pub struct VendorSummary {
    /// The vendor being reported on
    pub vendor: user::Model,
    /// Number of orders per stored status; statuses with no orders are absent
    pub order_counts: HashMap<OrderStatus, usize>,
    /// Subscriptions with stored status `active`
    pub active_subscriptions: usize,
    /// Active subscriptions currently inside a vacation window
    pub subscriptions_on_vacation: usize,
    /// Sum of all payments received
    pub revenue: f64,
    /// Most recent payments, newest first
    pub recent_transactions: Vec<transaction::Model>,
}

impl VendorSummary {
    /// Orders in `status`
    #[must_use]
    pub fn orders_in(&self, status: OrderStatus) -> usize {
        self.order_counts.get(&status).copied().unwrap_or(0)
    }

    /// Orders that are neither delivered nor cancelled
    #[must_use]
    pub fn open_orders(&self) -> usize {
        self.order_counts
            .iter()
            .filter(|(status, _)| {
                !matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled)
            })
            .map(|(_, count)| count)
            .sum()
    }
}

/// Builds the summary for a vendor.
///
/// `now` decides which subscriptions count as on vacation.
///
/// # Arguments
/// * `db` - Database connection
/// * `vendor_id` - Vendor to report on
/// * `transaction_limit` - Maximum number of recent payments to include (default 10)
///
/// # Errors
/// [`crate::errors::Error::NotFound`] when the id is not a vendor, or any query failure.
pub async fn vendor_summary(
    db: &DatabaseConnection,
    vendor_id: i64,
    now: DateTimeUtc,
    transaction_limit: Option<usize>,
) -> Result<VendorSummary> {
    let vendor = require_vendor(db, vendor_id).await?;

    let mut order_counts = HashMap::new();
    for order in get_orders_for_vendor(db, vendor_id).await? {
        *order_counts.entry(order.status).or_insert(0) += 1;
    }

    let active: Vec<_> = get_subscriptions_for_vendor(db, vendor_id)
        .await?
        .into_iter()
        .filter(|s| s.status == SubscriptionStatus::Active)
        .collect();
    let subscriptions_on_vacation = active.iter().filter(|s| is_on_vacation(s, now)).count();

    let transactions = get_transactions_for_vendor(db, vendor_id).await?;
    let revenue = transactions.iter().map(|t| t.amount).sum();
    let recent_transactions = transactions
        .into_iter()
        .take(transaction_limit.unwrap_or(10))
        .collect();

    Ok(VendorSummary {
        vendor,
        order_counts,
        active_subscriptions: active.len(),
        subscriptions_on_vacation,
        revenue,
        recent_transactions,
    })
}

/// Formats an amount with two decimals (e.g. `"₹12.50"`)
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("₹{amount:.2}")
}

/// One-line description of a payment, naming the payer
#[must_use]
pub fn format_transaction_summary(transaction: &transaction::Model, names: &NameLookup) -> String {
    format!(
        "{} - {} from {} ({})",
        format_amount(transaction.amount),
        transaction.description,
        names.display_name(transaction.user_id),
        transaction.date.format("%Y-%m-%d")
    )
}
