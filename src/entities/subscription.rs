//! Subscription entity - Recurring delivery of one product from one vendor.
//!
//! A subscription may carry a vacation window. While `now` is inside the window
//! deliveries are suspended, but the stored status is left untouched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored subscription status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Deliveries are running
    #[sea_orm(string_value = "active")]
    Active,
    /// Deliveries are on hold until resumed
    #[sea_orm(string_value = "paused")]
    Paused,
    /// Ran to its end date
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Stopped early
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl SubscriptionStatus {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// How often a subscription delivers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every day
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every second day counted from the start date
    #[sea_orm(string_value = "alternate_days")]
    AlternateDays,
    /// Same weekday as the start date
    #[sea_orm(string_value = "weekly")]
    Weekly,
}

impl Frequency {
    /// Days between two deliveries
    #[must_use]
    pub const fn interval_days(self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::AlternateDays => 2,
            Self::Weekly => 7,
        }
    }
}

/// Subscription database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
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
    /// Current stored status
    pub status: SubscriptionStatus,
    /// First delivery date
    pub start_date: Date,
    /// Last delivery date, open-ended when `None`
    pub end_date: Option<Date>,
    /// Whether a vacation window is set
    pub vacation_mode: bool,
    /// Vacation window start
    pub vacation_start: Option<DateTimeUtc>,
    /// Vacation window end
    pub vacation_end: Option<DateTimeUtc>,
    /// When the subscription was created
    pub created_at: DateTimeUtc,
    /// When the subscription was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Subscription and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Subscribing customer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Customer,
    /// Delivering vendor
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VendorId",
        to = "super::user::Column::Id"
    )]
    Vendor,
    /// Product delivered
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// Deliveries made for this subscription
    #[sea_orm(has_many = "super::delivery::Entity")]
    Deliveries,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deliveries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
