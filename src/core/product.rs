//! Product business logic - Handles the vendor's product catalogue.
//!
//! This module provides functions for creating, retrieving, updating, and managing products.
//! Only approved vendors can list products. Deleting is a soft delete so that past orders
//! and subscriptions keep a valid product reference, and availability can be toggled
//! without deleting anything.

use crate::{
    core::user::require_approved_vendor,
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Input for [`create_product`]
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Selling vendor
    pub vendor_id: i64,
    /// Product name
    pub name: String,
    /// Unit description
    pub unit: String,
    /// Price per unit
    pub price: f64,
}

fn validate_product_fields(name: &str, unit: &str, price: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if unit.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product unit cannot be empty".to_string(),
        });
    }

    if price < 0.0 || !price.is_finite() {
        return Err(Error::InvalidAmount { amount: price });
    }

    Ok(())
}

/// Retrieves all active (non-deleted) products of a vendor, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_products_for_vendor(
    db: &DatabaseConnection,
    vendor_id: i64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::VendorId.eq(vendor_id))
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the products of a vendor that customers can currently order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_available_products_for_vendor(
    db: &DatabaseConnection,
    vendor_id: i64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::VendorId.eq(vendor_id))
        .filter(product::Column::IsDeleted.eq(false))
        .filter(product::Column::IsAvailable.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every product, deleted ones included, for resolving names in history lists.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID, including deleted ones.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product for an approved vendor, performing input validation.
///
/// New products are available immediately.
///
/// # Errors
/// Returns an error if:
/// - The name or unit is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The vendor does not exist or is not approved
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    new_product: NewProduct,
) -> Result<product::Model> {
    validate_product_fields(&new_product.name, &new_product.unit, new_product.price)?;
    require_approved_vendor(db, new_product.vendor_id).await?;

    let now = chrono::Utc::now();

    let product = product::ActiveModel {
        vendor_id: Set(new_product.vendor_id),
        name: Set(new_product.name.trim().to_string()),
        unit: Set(new_product.unit.trim().to_string()),
        price: Set(new_product.price),
        is_available: Set(true),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

async fn find_live_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::NotFound {
            entity: "product",
            id: product_id,
        })
}

/// Updates an existing product's name, unit and price, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The name or unit is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The product does not exist or is already deleted
/// - The database update operation fails
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    new_name: String,
    new_unit: String,
    new_price: f64,
) -> Result<product::Model> {
    validate_product_fields(&new_name, &new_unit, new_price)?;

    let mut product: product::ActiveModel = find_live_product(db, product_id).await?.into();
    product.name = Set(new_name.trim().to_string());
    product.unit = Set(new_unit.trim().to_string());
    product.price = Set(new_price);
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Shows or hides a product for new orders.
///
/// # Errors
/// Returns an error if the product does not exist or is deleted, or the update fails.
pub async fn set_product_availability(
    db: &DatabaseConnection,
    product_id: i64,
    is_available: bool,
) -> Result<product::Model> {
    let mut product: product::ActiveModel = find_live_product(db, product_id).await?.into();
    product.is_available = Set(is_available);
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Soft deletes a product by marking it as deleted, preserving order history.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist or is already deleted
/// - The database update operation fails
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = find_live_product(db, product_id).await?.into();
    product.is_deleted = Set(true);
    product.is_available = Set(false);
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}
