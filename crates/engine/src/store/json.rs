//! JSON-document adapter for the storage port.
//!
//! The whole ledger lives in a single JSON file; every mutation rewrites
//! it. `next_id` is persisted alongside the records so ids are never
//! reused after a deletion. Without a path the store is volatile, which is
//! what the tests use.

use std::{
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

use super::{ActivityPatch, ActivityStore, NewActivity, StoreError};
use crate::{
    Money,
    activities::{Activity, PaymentStatus},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredActivity {
    id: i64,
    name: String,
    sector: Option<String>,
    total_cost_cents: i64,
    paid_alex_rute_cents: i64,
    paid_diego_ana_cents: i64,
    status: String,
    payment_date: Option<String>,
}

impl From<&Activity> for StoredActivity {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            sector: activity.sector.clone(),
            total_cost_cents: activity.total_cost.cents(),
            paid_alex_rute_cents: activity.paid_alex_rute.cents(),
            paid_diego_ana_cents: activity.paid_diego_ana.cents(),
            status: activity.status.as_str().to_string(),
            payment_date: activity.payment_date.clone(),
        }
    }
}

impl TryFrom<&StoredActivity> for Activity {
    type Error = StoreError;

    fn try_from(stored: &StoredActivity) -> Result<Self, Self::Error> {
        let status = PaymentStatus::try_from(stored.status.as_str())
            .map_err(|_| StoreError::Corrupt(format!("activity {} status", stored.id)))?;
        Ok(Activity {
            id: stored.id,
            name: stored.name.clone(),
            sector: stored.sector.clone(),
            total_cost: Money::from_cents(stored.total_cost_cents),
            paid_alex_rute: Money::from_cents(stored.paid_alex_rute_cents),
            paid_diego_ana: Money::from_cents(stored.paid_diego_ana_cents),
            payment_date: stored.payment_date.clone(),
            status,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    next_id: i64,
    activities: Vec<StoredActivity>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            next_id: 1,
            activities: Vec::new(),
        }
    }
}

/// Storage adapter backed by a JSON document on disk.
#[derive(Debug)]
pub struct JsonStore {
    path: Option<PathBuf>,
    state: Mutex<Document>,
}

impl JsonStore {
    /// Volatile store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(Document::default()),
        }
    }

    /// Opens (or initializes) a store backed by `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut document = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str::<Document>(&contents)?
        } else {
            Document::default()
        };
        // `list_all` promises id order regardless of how the file was edited.
        document.activities.sort_by_key(|stored| stored.id);
        Ok(Self {
            path: Some(path),
            state: Mutex::new(document),
        })
    }

    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            let contents = serde_json::to_vec_pretty(document)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Document> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActivityStore for JsonStore {
    async fn find_by_name_sector(
        &self,
        name: &str,
        sector: Option<&str>,
    ) -> Result<Vec<Activity>, StoreError> {
        let all = self.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|activity| super::matches(activity, name, sector))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>, StoreError> {
        let document = self.lock();
        document
            .activities
            .iter()
            .find(|stored| stored.id == id)
            .map(Activity::try_from)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Activity>, StoreError> {
        let document = self.lock();
        document.activities.iter().map(Activity::try_from).collect()
    }

    async fn insert(&self, new: NewActivity) -> Result<i64, StoreError> {
        let mut document = self.lock();
        let id = document.next_id;
        document.next_id += 1;
        document.activities.push(StoredActivity {
            id,
            name: new.name,
            sector: new.sector,
            total_cost_cents: new.total_cost.cents(),
            paid_alex_rute_cents: new.paid_alex_rute.cents(),
            paid_diego_ana_cents: new.paid_diego_ana.cents(),
            status: new.status.as_str().to_string(),
            payment_date: new.payment_date,
        });
        // A failed write must not leave the in-memory state ahead of the
        // file, so the mutation is rolled back before the error surfaces.
        if let Err(err) = self.persist(&document) {
            document.activities.pop();
            document.next_id = id;
            return Err(err);
        }
        Ok(id)
    }

    async fn update_fields(&self, id: i64, patch: ActivityPatch) -> Result<(), StoreError> {
        let mut document = self.lock();
        let index = document
            .activities
            .iter()
            .position(|stored| stored.id == id)
            .ok_or_else(|| StoreError::Corrupt(format!("activity {id} vanished")))?;

        let previous = document.activities[index].clone();
        let mut activity = Activity::try_from(&previous)?;
        super::apply_patch(&mut activity, patch);
        document.activities[index] = StoredActivity::from(&activity);

        if let Err(err) = self.persist(&document) {
            document.activities[index] = previous;
            return Err(err);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut document = self.lock();
        let Some(index) = document
            .activities
            .iter()
            .position(|stored| stored.id == id)
        else {
            return Ok(());
        };

        let removed = document.activities.remove(index);
        if let Err(err) = self.persist(&document) {
            document.activities.insert(index, removed);
            return Err(err);
        }
        Ok(())
    }
}
