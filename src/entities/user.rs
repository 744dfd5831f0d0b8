//! User entity - Customers, vendors and administrators share one table.
//!
//! Vendors carry an approval status that an administrator moves from `pending`
//! to `approved` or `rejected`. For every other role the approval column is null.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an account, which decides the screens it sees
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Customer ordering milk
    #[sea_orm(string_value = "user")]
    User,
    /// Dairy vendor selling products
    #[sea_orm(string_value = "vendor")]
    Vendor,
    /// Marketplace administrator
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Vendor => write!(f, "vendor"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Vendor approval state
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Waiting for an administrator
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Allowed to sell
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Turned down
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (shop name for vendors)
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Optional e-mail address
    pub email: Option<String>,
    /// Delivery or shop address
    pub address: Option<String>,
    /// Account role
    pub role: Role,
    /// Approval status, only set for vendors
    pub approval_status: Option<ApprovalStatus>,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Users are referenced by orders, subscriptions, products and transactions,
/// always through two distinct columns, so relations are declared on the child side.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
