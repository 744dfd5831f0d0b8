//! Transaction business logic - Payments from customers to vendors.
//!
//! Order payments are written by [`crate::core::order::place_order`]. Anything else
//! (subscription billing, manual settlements) goes through [`record_transaction`].

use crate::{
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Records a payment.
///
/// # Errors
/// Returns an error if:
/// - The amount is zero, negative or not finite
/// - The description is empty or whitespace-only
/// - The database insert fails
pub async fn record_transaction<C>(
    db: &C,
    user_id: i64,
    vendor_id: i64,
    amount: f64,
    description: String,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    if description.trim().is_empty() {
        return Err(Error::Validation {
            message: "Transaction description cannot be empty".to_string(),
        });
    }

    let transaction = transaction::ActiveModel {
        user_id: Set(user_id),
        vendor_id: Set(vendor_id),
        amount: Set(amount),
        description: Set(description.trim().to_string()),
        date: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Recorded transaction {} of {:.2} from user {} to vendor {}",
        transaction.id, amount, user_id, vendor_id
    );
    Ok(transaction)
}

/// Retrieves a transaction by id
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Payments made by a customer, newest first
pub async fn get_transactions_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Payments received by a vendor, newest first
pub async fn get_transactions_for_vendor(
    db: &DatabaseConnection,
    vendor_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::VendorId.eq(vendor_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every payment, newest first
pub async fn get_all_transactions(db: &DatabaseConnection) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_record_transaction_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Test zero amount validation
        let result = record_transaction(&db, 1, 2, 0.0, "Milk".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.0 }
        ));

        // Test negative amount validation
        let result = record_transaction(&db, 1, 2, -5.0, "Milk".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // Test infinite amount validation
        let result = record_transaction(&db, 1, 2, f64::INFINITY, "Milk".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // Test blank description validation
        let result = record_transaction(&db, 1, 2, 5.0, "  ".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_and_list_transactions() -> Result<()> {
        let db = setup_test_db().await?;
        let asha = create_test_user(&db, "Asha").await?;
        let ravi = create_test_user(&db, "Ravi").await?;
        let dairy = create_test_vendor(&db, "Green Valley Dairy").await?;
        let farm = create_test_vendor(&db, "Hilltop Farm").await?;

        let first = record_transaction(&db, asha.id, dairy.id, 30.0, "March milk".to_string())
            .await?;
        let second =
            record_transaction(&db, asha.id, farm.id, 12.5, "Paneer".to_string()).await?;
        record_transaction(&db, ravi.id, dairy.id, 8.0, "Curd".to_string()).await?;

        assert_eq!(first.amount, 30.0);
        assert_eq!(first.description, "March milk");

        let for_asha = get_transactions_for_user(&db, asha.id).await?;
        let ids: Vec<i64> = for_asha.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        assert_eq!(get_transactions_for_vendor(&db, dairy.id).await?.len(), 2);
        assert_eq!(get_all_transactions(&db).await?.len(), 3);
        assert_eq!(get_transaction_by_id(&db, first.id).await?.unwrap(), first);
        assert!(get_transaction_by_id(&db, 999).await?.is_none());

        Ok(())
    }
}
