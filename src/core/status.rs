//! Status lifecycle engine.
//!
//! Every stored status enumeration implements [`Lifecycle`], which owns its transition
//! table. The table decides three things: which statuses are terminal, whether a
//! requested change is legal, and which actions a vendor or administrator is offered.
//! Persisting a transition is done by the entity modules (`order`, `subscription`,
//! `delivery`, `user`), which call [`Lifecycle::check_transition`] before writing.

use crate::{
    entities::{ApprovalStatus, DeliveryStatus, OrderStatus, SubscriptionStatus},
    errors::{Error, Result},
};
use std::fmt;

/// An action a screen may offer for a record in a given status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusAction<S> {
    /// Status the action moves the record to
    pub target: S,
    /// Button label
    pub label: &'static str,
}

/// A status enumeration with a fixed transition table.
pub trait Lifecycle: Copy + Eq + fmt::Display + 'static {
    /// Entity name used in error messages
    const ENTITY: &'static str;

    /// Legal next statuses, in the order actions are offered. Empty when terminal.
    fn next_statuses(self) -> &'static [Self];

    /// Label of the action that moves a record into `target`
    fn action_label(target: Self) -> &'static str;

    /// Whether no transition leaves this status
    fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }

    /// Whether `target` is directly reachable
    fn can_transition_to(self, target: Self) -> bool {
        self.next_statuses().contains(&target)
    }

    /// Validates a requested transition without performing it.
    ///
    /// # Errors
    /// [`Error::AlreadyFinal`] when `self` is terminal, [`Error::InvalidTransition`]
    /// when `target` is not a legal next status.
    fn check_transition(self, target: Self) -> Result<()> {
        if self.is_terminal() {
            return Err(Error::AlreadyFinal {
                entity: Self::ENTITY,
                status: self.to_string(),
            });
        }
        if !self.can_transition_to(target) {
            return Err(Error::InvalidTransition {
                entity: Self::ENTITY,
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    /// Actions to offer for a record currently in this status
    fn actions(self) -> Vec<StatusAction<Self>> {
        self.next_statuses()
            .iter()
            .map(|&target| StatusAction {
                target,
                label: Self::action_label(target),
            })
            .collect()
    }
}

impl Lifecycle for OrderStatus {
    const ENTITY: &'static str = "order";

    fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::OutForDelivery, Self::Cancelled],
            Self::Processing => &[Self::OutForDelivery, Self::Delayed, Self::Cancelled],
            Self::OutForDelivery => &[Self::Delivered, Self::Delayed, Self::Cancelled],
            Self::Delayed => &[Self::Processing, Self::OutForDelivery, Self::Cancelled],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    fn action_label(target: Self) -> &'static str {
        match target {
            Self::Pending => "Reopen",
            Self::Processing => "Start Processing",
            Self::OutForDelivery => "Send Out for Delivery",
            Self::Delivered => "Mark Delivered",
            Self::Delayed => "Mark Delayed",
            Self::Cancelled => "Cancel Order",
        }
    }
}

impl Lifecycle for SubscriptionStatus {
    const ENTITY: &'static str = "subscription";

    fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Paused, Self::Completed, Self::Cancelled],
            Self::Paused => &[Self::Active, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    fn action_label(target: Self) -> &'static str {
        match target {
            Self::Active => "Resume",
            Self::Paused => "Pause",
            Self::Completed => "Mark Completed",
            Self::Cancelled => "Cancel Subscription",
        }
    }
}

impl Lifecycle for DeliveryStatus {
    const ENTITY: &'static str = "delivery";

    fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::OutForDelivery, Self::Delayed, Self::Skipped],
            Self::OutForDelivery => &[Self::Delivered, Self::Delayed],
            Self::Delayed => &[Self::OutForDelivery, Self::Skipped],
            Self::Delivered | Self::Skipped => &[],
        }
    }

    fn action_label(target: Self) -> &'static str {
        match target {
            Self::Scheduled => "Reschedule",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Mark Delivered",
            Self::Delayed => "Mark Delayed",
            Self::Skipped => "Skip",
        }
    }
}

impl Lifecycle for ApprovalStatus {
    const ENTITY: &'static str = "vendor";

    fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    fn action_label(target: Self) -> &'static str {
        match target {
            Self::Pending => "Reset",
            Self::Approved => "Approve",
            Self::Rejected => "Reject",
        }
    }
}
