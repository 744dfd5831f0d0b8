//! Filter and search engine shared by every list screen.
//!
//! Records are narrowed by an optional status filter and a free-text query. The query
//! matches, case-insensitively, the display name of any counterparty (customer or
//! vendor) or the record's own identifier. Mixed collections for the admin activity
//! feed are merged and sorted newest first with a stable sort, so records with equal
//! dates keep the order they were supplied in.

use crate::entities::{order, subscription, transaction, user};
use sea_orm::prelude::DateTimeUtc;
use std::collections::HashMap;

/// Placeholder shown for a counterparty that cannot be resolved
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder shown for a product that cannot be resolved
pub const UNKNOWN_PRODUCT: &str = "N/A";

/// Restricts a list to one status, or lets everything through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter<S> {
    /// Keep every record
    #[default]
    All,
    /// Keep records whose status equals this one
    Only(S),
}

impl<S: PartialEq> StatusFilter<S> {
    /// Whether a record with `status` passes the filter
    pub fn matches(&self, status: &S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Maps user ids to display names
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    names: HashMap<i64, String>,
}

impl NameLookup {
    /// Builds a lookup from user rows
    #[must_use]
    pub fn from_users(users: &[user::Model]) -> Self {
        users
            .iter()
            .map(|u| (u.id, u.name.clone()))
            .collect()
    }

    /// Adds or replaces a name
    pub fn insert(&mut self, id: i64, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// Name for `id`, if known
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Name for `id`, or [`UNKNOWN_NAME`]
    #[must_use]
    pub fn display_name(&self, id: i64) -> &str {
        self.get(id).unwrap_or(UNKNOWN_NAME)
    }
}

impl FromIterator<(i64, String)> for NameLookup {
    fn from_iter<I: IntoIterator<Item = (i64, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// A record that can be found by free-text search
pub trait Searchable {
    /// The record's own identifier
    fn record_id(&self) -> i64;

    /// Ids of the users whose names the query may match
    fn counterparty_ids(&self) -> Vec<i64>;

    /// Date used for newest-first ordering
    fn occurred_at(&self) -> DateTimeUtc;
}

/// A record with a stored status
pub trait HasStatus {
    /// Status enumeration
    type Status: PartialEq + Copy;

    /// Current stored status
    fn status(&self) -> Self::Status;
}

impl Searchable for order::Model {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn counterparty_ids(&self) -> Vec<i64> {
        vec![self.user_id, self.vendor_id]
    }

    fn occurred_at(&self) -> DateTimeUtc {
        self.created_at
    }
}

impl HasStatus for order::Model {
    type Status = order::OrderStatus;

    fn status(&self) -> Self::Status {
        self.status
    }
}

impl Searchable for subscription::Model {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn counterparty_ids(&self) -> Vec<i64> {
        vec![self.user_id, self.vendor_id]
    }

    fn occurred_at(&self) -> DateTimeUtc {
        self.created_at
    }
}

impl HasStatus for subscription::Model {
    type Status = subscription::SubscriptionStatus;

    fn status(&self) -> Self::Status {
        self.status
    }
}

impl Searchable for transaction::Model {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn counterparty_ids(&self) -> Vec<i64> {
        vec![self.user_id, self.vendor_id]
    }

    fn occurred_at(&self) -> DateTimeUtc {
        self.date
    }
}

impl Searchable for user::Model {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn counterparty_ids(&self) -> Vec<i64> {
        vec![self.id]
    }

    fn occurred_at(&self) -> DateTimeUtc {
        self.created_at
    }
}

/// Lower-cased, trimmed query; `None` when there is nothing to search for
fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn matches_normalized<T: Searchable>(record: &T, needle: &str, lookup: &NameLookup) -> bool {
    if record.record_id().to_string().contains(needle) {
        return true;
    }
    record
        .counterparty_ids()
        .into_iter()
        .any(|id| lookup.display_name(id).to_lowercase().contains(needle))
}

/// Whether `record` matches a free-text query. An empty query matches everything.
///
/// The identifier is compared as text, so `"1"` matches records 1, 10, 21 and so on.
pub fn matches_query<T: Searchable>(record: &T, query: &str, lookup: &NameLookup) -> bool {
    normalize_query(query).is_none_or(|needle| matches_normalized(record, &needle, lookup))
}

/// Keeps records matching `query`, preserving input order
pub fn search_records<T: Searchable>(
    records: Vec<T>,
    query: &str,
    lookup: &NameLookup,
) -> Vec<T> {
    let Some(needle) = normalize_query(query) else {
        return records;
    };
    records
        .into_iter()
        .filter(|r| matches_normalized(r, &needle, lookup))
        .collect()
}

/// Keeps records passing both the status filter and the query, preserving input order
pub fn filter_records<T>(
    records: Vec<T>,
    status: &StatusFilter<T::Status>,
    query: &str,
    lookup: &NameLookup,
) -> Vec<T>
where
    T: Searchable + HasStatus,
{
    let by_status: Vec<T> = records
        .into_iter()
        .filter(|r| status.matches(&r.status()))
        .collect();
    search_records(by_status, query, lookup)
}

/// Sorts newest first; equal dates keep their relative order
pub fn sort_newest_first<T: Searchable>(records: &mut [T]) {
    records.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));
}

/// Kinds of record shown in the admin activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// One-off orders
    Order,
    /// Subscriptions
    Subscription,
    /// Payments
    Transaction,
}

/// One entry of the admin activity feed
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityRecord {
    /// An order
    Order(order::Model),
    /// A subscription
    Subscription(subscription::Model),
    /// A payment
    Transaction(transaction::Model),
}

impl ActivityRecord {
    /// Which kind of record this is
    #[must_use]
    pub const fn kind(&self) -> ActivityKind {
        match self {
            Self::Order(_) => ActivityKind::Order,
            Self::Subscription(_) => ActivityKind::Subscription,
            Self::Transaction(_) => ActivityKind::Transaction,
        }
    }

    /// Status label for display; transactions have none
    #[must_use]
    pub const fn status_label(&self) -> Option<&'static str> {
        match self {
            Self::Order(o) => Some(o.status.label()),
            Self::Subscription(s) => Some(s.status.label()),
            Self::Transaction(_) => None,
        }
    }

    /// Amount involved, when the record carries one
    #[must_use]
    pub const fn amount(&self) -> Option<f64> {
        match self {
            Self::Order(o) => Some(o.total_amount),
            Self::Subscription(_) => None,
            Self::Transaction(t) => Some(t.amount),
        }
    }
}

impl Searchable for ActivityRecord {
    fn record_id(&self) -> i64 {
        match self {
            Self::Order(o) => o.record_id(),
            Self::Subscription(s) => s.record_id(),
            Self::Transaction(t) => t.record_id(),
        }
    }

    fn counterparty_ids(&self) -> Vec<i64> {
        match self {
            Self::Order(o) => o.counterparty_ids(),
            Self::Subscription(s) => s.counterparty_ids(),
            Self::Transaction(t) => t.counterparty_ids(),
        }
    }

    fn occurred_at(&self) -> DateTimeUtc {
        match self {
            Self::Order(o) => o.occurred_at(),
            Self::Subscription(s) => s.occurred_at(),
            Self::Transaction(t) => t.occurred_at(),
        }
    }
}

/// Merges orders, subscriptions and transactions into one feed, newest first.
///
/// Inputs are concatenated in that order before a stable sort, which fixes the
/// tie-break for equal dates.
#[must_use]
pub fn merge_activity(
    orders: Vec<order::Model>,
    subscriptions: Vec<subscription::Model>,
    transactions: Vec<transaction::Model>,
) -> Vec<ActivityRecord> {
    let mut merged: Vec<ActivityRecord> = orders
        .into_iter()
        .map(ActivityRecord::Order)
        .chain(subscriptions.into_iter().map(ActivityRecord::Subscription))
        .chain(transactions.into_iter().map(ActivityRecord::Transaction))
        .collect();
    sort_newest_first(&mut merged);
    merged
}

/// Narrows a merged feed by kind and query
#[must_use]
pub fn filter_activity(
    records: Vec<ActivityRecord>,
    kind: &StatusFilter<ActivityKind>,
    query: &str,
    lookup: &NameLookup,
) -> Vec<ActivityRecord> {
    let by_kind: Vec<ActivityRecord> = records
        .into_iter()
        .filter(|r| kind.matches(&r.kind()))
        .collect();
    search_records(by_kind, query, lookup)
}
