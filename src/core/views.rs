//! Screen loaders.
//!
//! Each loader fetches the records a screen lists, resolves counterparty names,
//! applies the status filter and search query, and never fails: a failed load comes
//! back as an empty screen carrying a [`Notice`] to display.

use crate::{
    core::{
        order::{get_all_orders, get_orders_for_user, get_orders_for_vendor},
        product::get_all_products,
        search::{
            ActivityKind, ActivityRecord, NameLookup, Searchable, StatusFilter, UNKNOWN_NAME,
            UNKNOWN_PRODUCT, filter_activity, filter_records, merge_activity, search_records,
        },
        status::{Lifecycle, StatusAction},
        subscription::{
            SubscriptionDisplayStatus, display_status, get_all_subscriptions,
            get_subscriptions_for_user, get_subscriptions_for_vendor,
        },
        transaction::get_all_transactions,
        user::{list_all_users, list_approved_vendors, list_pending_vendors},
    },
    entities::{ApprovalStatus, OrderStatus, SubscriptionStatus, order, subscription, user},
    errors::{Notice, Result, recover},
};
use futures::TryFutureExt;
use sea_orm::{DatabaseConnection, prelude::DateTimeUtc};
use std::collections::HashMap;

/// Rows of a list screen plus an optional message for the user
#[derive(Debug, Clone)]
pub struct Screen<T> {
    /// Rows to list, already filtered
    pub rows: Vec<T>,
    /// Message to show, set when loading failed
    pub notice: Option<Notice>,
}

impl<T> Default for Screen<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            notice: None,
        }
    }
}

impl<T> Screen<T> {
    fn load(result: Result<Vec<T>>, context: &str) -> Self {
        let (rows, notice) = recover(result, context);
        Self { rows, notice }
    }

    /// Whether there is nothing to list
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An order with its counterparties resolved
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    /// Stored order
    pub order: order::Model,
    /// Ordering customer's name
    pub customer_name: String,
    /// Vendor's name
    pub vendor_name: String,
    /// Status changes the order can still take
    pub actions: Vec<StatusAction<OrderStatus>>,
}

impl OrderRow {
    fn new(order: order::Model, names: &NameLookup) -> Self {
        Self {
            customer_name: names.display_name(order.user_id).to_string(),
            vendor_name: names.display_name(order.vendor_id).to_string(),
            actions: order.status.actions(),
            order,
        }
    }
}

/// A subscription with names and its display status resolved
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRow {
    /// Stored subscription
    pub subscription: subscription::Model,
    /// Subscribing customer's name
    pub customer_name: String,
    /// Vendor's name
    pub vendor_name: String,
    /// Product name, or `"N/A"` when the product is gone
    pub product_name: String,
    /// Status to show, vacation-aware
    pub display_status: SubscriptionDisplayStatus,
    /// Status changes the subscription can still take
    pub actions: Vec<StatusAction<SubscriptionStatus>>,
}

/// An entry of the admin activity feed with names resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRow {
    /// The record
    pub record: ActivityRecord,
    /// Customer's name
    pub customer_name: String,
    /// Vendor's name
    pub vendor_name: String,
}

/// A vendor awaiting a decision
#[derive(Debug, Clone, PartialEq)]
pub struct VendorApprovalRow {
    /// The vendor
    pub vendor: user::Model,
    /// Approve / reject actions
    pub actions: Vec<StatusAction<ApprovalStatus>>,
}

async fn name_lookup(db: &DatabaseConnection) -> Result<NameLookup> {
    Ok(NameLookup::from_users(&list_all_users(db).await?))
}

async fn order_rows(
    db: &DatabaseConnection,
    orders: Vec<order::Model>,
    status: StatusFilter<OrderStatus>,
    query: &str,
) -> Result<Vec<OrderRow>> {
    let names = name_lookup(db).await?;
    Ok(filter_records(orders, &status, query, &names)
        .into_iter()
        .map(|o| OrderRow::new(o, &names))
        .collect())
}

async fn subscription_rows(
    db: &DatabaseConnection,
    subscriptions: Vec<subscription::Model>,
    status: StatusFilter<SubscriptionStatus>,
    query: &str,
    now: DateTimeUtc,
) -> Result<Vec<SubscriptionRow>> {
    let names = name_lookup(db).await?;
    let products: HashMap<i64, String> = get_all_products(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    Ok(filter_records(subscriptions, &status, query, &names)
        .into_iter()
        .map(|s| SubscriptionRow {
            customer_name: names.display_name(s.user_id).to_string(),
            vendor_name: names.display_name(s.vendor_id).to_string(),
            product_name: products
                .get(&s.product_id)
                .map_or_else(|| UNKNOWN_PRODUCT.to_string(), Clone::clone),
            display_status: display_status(&s, now),
            actions: s.status.actions(),
            subscription: s,
        })
        .collect())
}

async fn activity_rows(
    db: &DatabaseConnection,
    kind: StatusFilter<ActivityKind>,
    query: &str,
) -> Result<Vec<ActivityRow>> {
    let merged = merge_activity(
        get_all_orders(db).await?,
        get_all_subscriptions(db).await?,
        get_all_transactions(db).await?,
    );
    let names = name_lookup(db).await?;

    Ok(filter_activity(merged, &kind, query, &names)
        .into_iter()
        .map(|record| {
            // Feed records list the customer first, then the vendor
            let ids = record.counterparty_ids();
            let name_at = |i: usize| {
                ids.get(i)
                    .map_or(UNKNOWN_NAME, |&id| names.display_name(id))
                    .to_string()
            };
            ActivityRow {
                customer_name: name_at(0),
                vendor_name: name_at(1),
                record,
            }
        })
        .collect())
}

/// A customer's orders
pub async fn user_order_history(
    db: &DatabaseConnection,
    user_id: i64,
    status: StatusFilter<OrderStatus>,
    query: &str,
) -> Screen<OrderRow> {
    let result = get_orders_for_user(db, user_id)
        .and_then(|orders| order_rows(db, orders, status, query))
        .await;
    Screen::load(result, "order history")
}

/// A customer's subscriptions
pub async fn user_subscription_history(
    db: &DatabaseConnection,
    user_id: i64,
    status: StatusFilter<SubscriptionStatus>,
    query: &str,
    now: DateTimeUtc,
) -> Screen<SubscriptionRow> {
    let result = get_subscriptions_for_user(db, user_id)
        .and_then(|subscriptions| subscription_rows(db, subscriptions, status, query, now))
        .await;
    Screen::load(result, "subscription history")
}

/// Orders a vendor has to handle
pub async fn vendor_orders(
    db: &DatabaseConnection,
    vendor_id: i64,
    status: StatusFilter<OrderStatus>,
    query: &str,
) -> Screen<OrderRow> {
    let result = get_orders_for_vendor(db, vendor_id)
        .and_then(|orders| order_rows(db, orders, status, query))
        .await;
    Screen::load(result, "vendor orders")
}

/// Subscriptions a vendor serves
pub async fn vendor_subscriptions(
    db: &DatabaseConnection,
    vendor_id: i64,
    status: StatusFilter<SubscriptionStatus>,
    query: &str,
    now: DateTimeUtc,
) -> Screen<SubscriptionRow> {
    let result = get_subscriptions_for_vendor(db, vendor_id)
        .and_then(|subscriptions| subscription_rows(db, subscriptions, status, query, now))
        .await;
    Screen::load(result, "vendor subscriptions")
}

/// Every order, subscription and payment, newest first
pub async fn admin_activity(
    db: &DatabaseConnection,
    kind: StatusFilter<ActivityKind>,
    query: &str,
) -> Screen<ActivityRow> {
    Screen::load(activity_rows(db, kind, query).await, "activity")
}

/// Approved vendors a customer can browse, searchable by name
pub async fn vendor_listing(db: &DatabaseConnection, query: &str) -> Screen<user::Model> {
    let result = list_approved_vendors(db).await.map(|vendors| {
        let names = NameLookup::from_users(&vendors);
        search_records(vendors, query, &names)
    });
    Screen::load(result, "vendors")
}

/// Vendors waiting for approval, oldest first, with the decisions on offer
pub async fn vendor_approval_queue(db: &DatabaseConnection) -> Screen<VendorApprovalRow> {
    let result = list_pending_vendors(db).await.map(|vendors| {
        vendors
            .into_iter()
            .map(|vendor| VendorApprovalRow {
                actions: ApprovalStatus::Pending.actions(),
                vendor,
            })
            .collect()
    });
    Screen::load(result, "vendor approvals")
}
