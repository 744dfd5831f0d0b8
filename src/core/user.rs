//! User business logic - Accounts, roles and vendor approval.
//!
//! New vendors start in `pending` approval and cannot trade until an administrator
//! approves them. Approval changes go through the status lifecycle engine like any
//! other status change.

use crate::{
    core::status::Lifecycle,
    entities::{ApprovalStatus, Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Input for [`create_user`]
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Optional e-mail
    pub email: Option<String>,
    /// Optional address
    pub address: Option<String>,
    /// Account role
    pub role: Role,
}

/// Creates an account. Vendors are created with `pending` approval.
///
/// # Errors
/// Returns an error if the name or phone is blank or the insert fails.
pub async fn create_user<C>(db: &C, new_user: NewUser) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if new_user.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Name cannot be empty".to_string(),
        });
    }

    if new_user.phone.trim().is_empty() {
        return Err(Error::Validation {
            message: "Phone number cannot be empty".to_string(),
        });
    }

    let approval_status = (new_user.role == Role::Vendor).then_some(ApprovalStatus::Pending);

    let user = user::ActiveModel {
        name: Set(new_user.name.trim().to_string()),
        phone: Set(new_user.phone.trim().to_string()),
        email: Set(new_user.email),
        address: Set(new_user.address),
        role: Set(new_user.role),
        approval_status: Set(approval_status),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    user.insert(db).await.map_err(Into::into)
}

/// Finds a user by id
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Lists all users, ordered by name
pub async fn list_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists users with the given role, ordered by name
pub async fn list_users_by_role(db: &DatabaseConnection, role: Role) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(role))
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists vendors with the given approval status, oldest sign-up first
pub async fn list_vendors_by_approval(
    db: &DatabaseConnection,
    approval: ApprovalStatus,
) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(Role::Vendor))
        .filter(user::Column::ApprovalStatus.eq(approval))
        .order_by_asc(user::Column::CreatedAt)
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Vendors waiting for approval
pub async fn list_pending_vendors(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    list_vendors_by_approval(db, ApprovalStatus::Pending).await
}

/// Vendors cleared to trade
pub async fn list_approved_vendors(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    list_vendors_by_approval(db, ApprovalStatus::Approved).await
}

/// Loads a user that must be a vendor
///
/// # Errors
/// [`Error::NotFound`] when the id is unknown or belongs to a non-vendor.
pub async fn require_vendor<C>(db: &C, vendor_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user_by_id(db, vendor_id)
        .await?
        .filter(|u| u.role == Role::Vendor)
        .ok_or(Error::NotFound {
            entity: "vendor",
            id: vendor_id,
        })
}

/// Loads a vendor and fails unless it is approved.
///
/// # Errors
/// [`Error::NotFound`] when the id is not a vendor, [`Error::VendorNotApproved`]
/// when the vendor is pending or rejected.
pub async fn require_approved_vendor<C>(db: &C, vendor_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let vendor = require_vendor(db, vendor_id).await?;

    if vendor.approval_status != Some(ApprovalStatus::Approved) {
        return Err(Error::VendorNotApproved { vendor_id });
    }

    Ok(vendor)
}

/// Moves a vendor's approval status along the approval lifecycle.
///
/// Performs a single write of the approval column. The returned row reflects the
/// stored state; lists must be fetched again to observe the change.
///
/// # Errors
/// [`Error::NotFound`] when the id is not a vendor; [`Error::AlreadyFinal`] or
/// [`Error::InvalidTransition`] when the change is not allowed.
pub async fn update_vendor_approval(
    db: &DatabaseConnection,
    vendor_id: i64,
    target: ApprovalStatus,
) -> Result<user::Model> {
    let vendor = require_vendor(db, vendor_id).await?;

    let current = vendor.approval_status.unwrap_or(ApprovalStatus::Pending);
    current.check_transition(target)?;

    let mut active: user::ActiveModel = vendor.into();
    active.approval_status = Set(Some(target));
    let updated = active.update(db).await?;

    info!("Vendor {} approval changed {} -> {}", vendor_id, current, target);
    Ok(updated)
}
