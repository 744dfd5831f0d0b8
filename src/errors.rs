//! Unified error type for the marketplace core.
//!
//! Every fallible operation returns [`Result`]. Errors also know how they should be
//! surfaced to a person looking at a screen, see [`Error::notice`] and [`recover`].

use thiserror::Error;

/// Message shown for any data-layer failure. The underlying error is logged, not displayed.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// All errors produced by the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A referenced record does not exist (or is soft-deleted)
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"order"`
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// Transition requested from a terminal status
    #[error("{entity} is already {status}; no further changes are possible")]
    AlreadyFinal {
        /// Entity kind
        entity: &'static str,
        /// Current terminal status
        status: String,
    },

    /// Transition target is not reachable from the current status
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        /// Entity kind
        entity: &'static str,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Money amount that is negative, zero where not allowed, or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending amount
        amount: f64,
    },

    /// Item quantity that is not strictly positive
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Offending quantity
        quantity: i32,
    },

    /// Input failed a validation rule
    #[error("{message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// The vendor exists but is not approved for business
    #[error("Vendor {vendor_id} is not approved")]
    VendorNotApproved {
        /// Vendor user id
        vendor_id: i64,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// How loudly a notice should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing failed, the request was simply not applicable
    Info,
    /// The user supplied something unacceptable
    Warning,
    /// The data layer failed
    Error,
}

/// A message meant for the person using a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Display severity
    pub severity: Severity,
    /// Display text
    pub message: String,
}

impl Error {
    /// Maps the error to what a screen should show.
    ///
    /// Database and configuration failures collapse into [`GENERIC_FAILURE_MESSAGE`];
    /// rejected transitions are informational; everything else is a warning carrying
    /// the error's own message.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Database(_) | Self::Config { .. } => Notice {
                severity: Severity::Error,
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            },
            Self::AlreadyFinal { .. } | Self::InvalidTransition { .. } => Notice {
                severity: Severity::Info,
                message: self.to_string(),
            },
            _ => Notice {
                severity: Severity::Warning,
                message: self.to_string(),
            },
        }
    }

    /// True for rejected status changes, which never touch the database
    #[must_use]
    pub const fn is_rejected_transition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyFinal { .. } | Self::InvalidTransition { .. }
        )
    }
}

/// Recovers a screen load to an empty-but-valid state.
///
/// On failure the error is logged with `context` and the default value is returned
/// together with the notice to display.
pub fn recover<T: Default>(result: Result<T>, context: &str) -> (T, Option<Notice>) {
    match result {
        Ok(value) => (value, None),
        Err(e) => {
            tracing::error!("Failed to load {}: {}", context, e);
            (T::default(), Some(e.notice()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_are_generic() {
        let err = Error::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        let notice = err.notice();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, GENERIC_FAILURE_MESSAGE);
        assert!(!notice.message.contains("disk"));
    }

    #[test]
    fn test_transition_errors_are_informational() {
        let err = Error::AlreadyFinal {
            entity: "order",
            status: "cancelled".to_string(),
        };
        assert!(err.is_rejected_transition());
        let notice = err.notice();
        assert_eq!(notice.severity, Severity::Info);
        assert!(notice.message.contains("already cancelled"));
    }

    #[test]
    fn test_recover_returns_default_on_failure() {
        let failed: Result<Vec<i64>> = Err(Error::NotFound {
            entity: "order",
            id: 7,
        });
        let (items, notice) = recover(failed, "orders");
        assert!(items.is_empty());
        assert_eq!(notice.map(|n| n.severity), Some(Severity::Warning));

        let (items, notice) = recover(Ok(vec![1, 2]), "orders");
        assert_eq!(items, vec![1, 2]);
        assert!(notice.is_none());
    }
}
