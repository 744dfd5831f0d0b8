//! Catalog seeding from the settings file.
//!
//! Vendors are matched by name and products by name within their vendor, so running
//! the seed again only adds what is missing.

use crate::{
    config::settings::{Settings, VendorSeed},
    core::{
        product::{NewProduct, create_product, get_products_for_vendor},
        user::{NewUser, create_user, list_users_by_role, update_vendor_approval},
    },
    entities::{ApprovalStatus, Role, user},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use tracing::{debug, info};

/// What a seed run added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Vendors created and approved
    pub vendors_created: usize,
    /// Products created
    pub products_created: usize,
}

async fn ensure_vendor(
    db: &DatabaseConnection,
    existing: &[user::Model],
    seed: &VendorSeed,
) -> Result<(user::Model, bool)> {
    if let Some(vendor) = existing.iter().find(|v| v.name == seed.name) {
        return Ok((vendor.clone(), false));
    }

    let vendor = create_user(
        db,
        NewUser {
            name: seed.name.clone(),
            phone: seed.phone.clone(),
            email: None,
            address: seed.address.clone(),
            role: Role::Vendor,
        },
    )
    .await?;
    let vendor = update_vendor_approval(db, vendor.id, ApprovalStatus::Approved).await?;
    Ok((vendor, true))
}

/// Creates the configured vendors (approved) and their products when absent.
///
/// # Errors
/// Returns an error if a seed entry is invalid or a database write fails. Entries
/// written before the failure are kept.
pub async fn seed_catalog(db: &DatabaseConnection, settings: &Settings) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    if settings.vendors.is_empty() {
        return Ok(report);
    }

    let existing = list_users_by_role(db, Role::Vendor).await?;

    for seed in &settings.vendors {
        let (vendor, created) = ensure_vendor(db, &existing, seed).await?;
        if created {
            report.vendors_created += 1;
        }

        let known: HashSet<String> = get_products_for_vendor(db, vendor.id)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();

        for product in seed.products.iter().filter(|p| !known.contains(&p.name)) {
            create_product(
                db,
                NewProduct {
                    vendor_id: vendor.id,
                    name: product.name.clone(),
                    unit: product.unit.clone(),
                    price: product.price,
                },
            )
            .await?;
            debug!("Seeded product {} for {}", product.name, vendor.name);
            report.products_created += 1;
        }
    }

    info!(
        "Seeded {} vendors and {} products",
        report.vendors_created, report.products_created
    );
    Ok(report)
}
