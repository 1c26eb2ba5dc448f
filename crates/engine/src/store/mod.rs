//! Storage port for activity records.
//!
//! The ledger is written once against [`ActivityStore`]; each backend the
//! project has lived on (relational database, JSON document) is an adapter
//! conforming to the same contract. Adapters own write serialization and
//! timeouts; the ledger performs one logical read-modify-write per
//! operation and does no locking of its own, so concurrent payments against
//! the same activity can race on backends without per-record transactions.

use thiserror::Error;

use crate::{
    Money,
    activities::{Activity, PaymentStatus},
};

mod database;
mod json;

pub use database::DatabaseStore;
pub use json::JsonStore;

/// Backend faults. Propagated by the ledger as
/// [`LedgerError::Storage`](crate::LedgerError::Storage), i.e. a fault and
/// never a client-input error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
    #[error("storage i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Record handed to [`ActivityStore::insert`]; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewActivity {
    pub name: String,
    pub sector: Option<String>,
    pub total_cost: Money,
    pub paid_alex_rute: Money,
    pub paid_diego_ana: Money,
    pub payment_date: Option<String>,
    pub status: PaymentStatus,
}

/// Partial update for [`ActivityStore::update_fields`].
///
/// `None` fields are left untouched. An accumulator and the status it
/// implies are always patched in the same call so no backend persists them
/// apart.
#[derive(Clone, Debug, Default)]
pub struct ActivityPatch {
    pub paid_alex_rute: Option<Money>,
    pub paid_diego_ana: Option<Money>,
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<Option<String>>,
}

#[allow(async_fn_in_trait)]
pub trait ActivityStore: Send + Sync {
    /// Activities matching `name` (case-insensitive, trimmed), narrowed to
    /// `sector` when given. Ordered by id.
    async fn find_by_name_sector(
        &self,
        name: &str,
        sector: Option<&str>,
    ) -> Result<Vec<Activity>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>, StoreError>;

    /// All activities, ordered by id.
    async fn list_all(&self) -> Result<Vec<Activity>, StoreError>;

    /// Persists a new record and returns its assigned id. Ids are
    /// monotonically increasing and never reused after deletion.
    async fn insert(&self, new: NewActivity) -> Result<i64, StoreError>;

    async fn update_fields(&self, id: i64, patch: ActivityPatch) -> Result<(), StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// Shared name/sector matching rule so every adapter answers lookups the
/// same way.
fn matches(activity: &Activity, name: &str, sector: Option<&str>) -> bool {
    if !activity.name.trim().eq_ignore_ascii_case(name.trim()) {
        return false;
    }
    match sector {
        None => true,
        Some(wanted) => activity
            .sector
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(wanted.trim())),
    }
}

fn apply_patch(activity: &mut Activity, patch: ActivityPatch) {
    if let Some(paid) = patch.paid_alex_rute {
        activity.paid_alex_rute = paid;
    }
    if let Some(paid) = patch.paid_diego_ana {
        activity.paid_diego_ana = paid;
    }
    if let Some(status) = patch.status {
        activity.status = status;
    }
    if let Some(date) = patch.payment_date {
        activity.payment_date = date;
    }
}
