//! Delivery entity - A single drop-off, made for either a subscription or an order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored delivery status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Planned for its date
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// On the road
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    /// Dropped off
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Running late
    #[sea_orm(string_value = "delayed")]
    Delayed,
    /// Not made for this date
    #[sea_orm(string_value = "skipped")]
    Skipped,
}

impl DeliveryStatus {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Delayed => "Delayed",
            Self::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::OutForDelivery => write!(f, "out_for_delivery"),
            Self::Delivered => write!(f, "delivered"),
            Self::Delayed => write!(f, "delayed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Delivery database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    /// Unique identifier for the delivery
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Subscription this delivery serves, if any
    pub subscription_id: Option<i64>,
    /// Order this delivery serves, if any
    pub order_id: Option<i64>,
    /// Current status
    pub status: DeliveryStatus,
    /// Date the delivery is planned for
    pub scheduled_for: Date,
    /// When the delivery was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Delivery and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning subscription
    #[sea_orm(
        belongs_to = "super::subscription::Entity",
        from = "Column::SubscriptionId",
        to = "super::subscription::Column::Id"
    )]
    Subscription,
    /// Owning order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
