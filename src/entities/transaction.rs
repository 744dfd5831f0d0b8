//! Transaction entity - A payment from a customer to a vendor.
//!
//! Each transaction has a `user_id`, `vendor_id`, amount, description and date.
//! Placing an order records one automatically; other payments are recorded directly.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Paying customer
    pub user_id: i64,
    /// Receiving vendor
    pub vendor_id: i64,
    /// Amount paid, always positive
    pub amount: f64,
    /// Human-readable description (e.g. "Order #12")
    pub description: String,
    /// When the payment happened
    pub date: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Paying customer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Customer,
    /// Receiving vendor
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VendorId",
        to = "super::user::Column::Id"
    )]
    Vendor,
}

impl ActiveModelBehavior for ActiveModel {}
