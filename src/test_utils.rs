//! Shared test utilities for `milkman`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating marketplace records with sensible defaults.

use crate::{
    core::{
        order::{self, NewOrder, OrderLine},
        product::{self, NewProduct},
        subscription::{self, NewSubscription},
        user::{self, NewUser},
    },
    entities::{self, ApprovalStatus, Frequency, Role},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output through the test harness. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Fixed date used as "today" in tests (2024-05-01)
#[allow(clippy::unwrap_used)]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn phone_for(name: &str) -> String {
    format!("555-{:04}", name.len())
}

/// Creates a customer account.
///
/// # Defaults
/// * phone: derived from the name
/// * address: "1 Test Lane"
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::UserModel> {
    user::create_user(
        db,
        NewUser {
            name: name.to_string(),
            phone: phone_for(name),
            email: None,
            address: Some("1 Test Lane".to_string()),
            role: Role::User,
        },
    )
    .await
}

/// Creates a vendor still waiting for approval
pub async fn create_pending_vendor(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::UserModel> {
    user::create_user(
        db,
        NewUser {
            name: name.to_string(),
            phone: phone_for(name),
            email: None,
            address: None,
            role: Role::Vendor,
        },
    )
    .await
}

/// Creates an approved vendor
pub async fn create_test_vendor(db: &DatabaseConnection, name: &str) -> Result<entities::UserModel> {
    let vendor = create_pending_vendor(db, name).await?;
    user::update_vendor_approval(db, vendor.id, ApprovalStatus::Approved).await
}

/// Creates a product with sensible defaults.
///
/// # Defaults
/// * unit: "1 L"
/// * price: 1.2
pub async fn create_test_product(
    db: &DatabaseConnection,
    vendor_id: i64,
    name: &str,
) -> Result<entities::ProductModel> {
    create_custom_product(db, vendor_id, name, 1.2).await
}

/// Creates a product with a custom price
pub async fn create_custom_product(
    db: &DatabaseConnection,
    vendor_id: i64,
    name: &str,
    price: f64,
) -> Result<entities::ProductModel> {
    product::create_product(
        db,
        NewProduct {
            vendor_id,
            name: name.to_string(),
            unit: "1 L".to_string(),
            price,
        },
    )
    .await
}

/// Places a one-line order for two units, delivered on [`test_date`]
pub async fn create_test_order(
    db: &DatabaseConnection,
    user_id: i64,
    vendor_id: i64,
    product_id: i64,
) -> Result<entities::OrderModel> {
    order::place_order(
        db,
        NewOrder {
            user_id,
            vendor_id,
            lines: vec![OrderLine {
                product_id,
                quantity: 2,
            }],
            delivery_date: test_date(),
            delivery_slot: None,
        },
    )
    .await
}

/// Creates a daily, open-ended subscription for one unit starting on [`test_date`]
pub async fn create_test_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    vendor_id: i64,
    product_id: i64,
) -> Result<entities::SubscriptionModel> {
    create_custom_subscription(
        db,
        user_id,
        vendor_id,
        product_id,
        Frequency::Daily,
        test_date(),
    )
    .await
}

/// Creates a subscription with a custom frequency and start date
pub async fn create_custom_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    vendor_id: i64,
    product_id: i64,
    frequency: Frequency,
    start_date: NaiveDate,
) -> Result<entities::SubscriptionModel> {
    subscription::create_subscription(
        db,
        NewSubscription {
            user_id,
            vendor_id,
            product_id,
            quantity: 1,
            frequency,
            start_date,
            end_date: None,
        },
    )
    .await
}

/// Sets up a marketplace with one customer, one approved vendor and one product.
/// Returns (db, customer, vendor, product) for common test scenarios.
pub async fn setup_marketplace() -> Result<(
    DatabaseConnection,
    entities::UserModel,
    entities::UserModel,
    entities::ProductModel,
)> {
    let db = setup_test_db().await?;
    let customer = create_test_user(&db, "Asha Rao").await?;
    let vendor = create_test_vendor(&db, "Green Valley Dairy").await?;
    let milk = create_test_product(&db, vendor.id, "Cow Milk").await?;
    Ok((db, customer, vendor, milk))
}
