//! Ledger engine for the shared construction-expense tracker.
//!
//! Tracks expense activities split between the two payer couples, applies
//! partial payments against them and derives the paid/pending status. The
//! engine is written once against the [`ActivityStore`] port; the concrete
//! backend (SQLite via sea-orm, JSON document) is injected by the
//! composition root.

pub use activities::{Activity, ActivityDraft, PaymentStatus};
pub use error::LedgerError;
pub use money::Money;
pub use payers::Payer;
pub use store::{ActivityPatch, ActivityStore, DatabaseStore, JsonStore, NewActivity, StoreError};

mod activities;
mod error;
mod money;
mod payers;
pub mod store;
mod util;

use std::sync::Arc;

type ResultLedger<T> = Result<T, LedgerError>;

/// Invalidation seam for read caches held by the calling layer.
///
/// The ledger never reads through a cache; it only signals that listings
/// changed after a successful mutation.
pub trait ReadCache: Send + Sync {
    fn invalidate_listings(&self);
}

/// Reference to an activity by name, with the sector as optional
/// disambiguator for same-named activities.
#[derive(Clone, Copy, Debug)]
pub struct ActivityRef<'a> {
    pub name: &'a str,
    pub sector: Option<&'a str>,
}

/// Result of a successful payment application.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentReceipt {
    pub activity_id: i64,
    pub activity: String,
    pub payer: Payer,
    pub amount: Money,
    /// The normalized date echoed back to the caller. Stored as the
    /// activity's last payment date when supplied.
    pub date: Option<String>,
    pub status: PaymentStatus,
    pub remaining: Money,
    pub message: String,
}

/// Activity with its recomputed remaining balance, as returned by
/// [`Ledger::list_pending`].
#[derive(Clone, Debug, PartialEq)]
pub struct PendingActivity {
    pub activity: Activity,
    pub remaining: Money,
}

/// Outcome of a bulk status recompute.
///
/// `updated` counts the records visited; when the iteration stops early on
/// a storage fault the count achieved so far is reported alongside it
/// rather than thrown away.
#[derive(Debug)]
pub struct RecomputeOutcome {
    pub updated: u64,
    pub fault: Option<StoreError>,
}

pub struct Ledger<S> {
    store: S,
    cache: Option<Arc<dyn ReadCache>>,
}

impl<S: ActivityStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store, cache: None }
    }

    /// Registers a read cache to invalidate after mutations.
    #[must_use]
    pub fn with_read_cache(mut self, cache: Arc<dyn ReadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The injected store handle, e.g. for health checks.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_listings();
        }
    }

    /// Creates a new activity with accumulators at zero and status pending.
    pub async fn create_activity(&self, draft: ActivityDraft) -> ResultLedger<Activity> {
        draft.validate()?;

        let name = draft.name.trim().to_string();
        let sector = Some(draft.sector.trim().to_string());
        let payment_date = draft.date.as_deref().map(util::normalize_date);

        let id = self
            .store
            .insert(NewActivity {
                name: name.clone(),
                sector: sector.clone(),
                total_cost: draft.total_cost,
                paid_alex_rute: Money::ZERO,
                paid_diego_ana: Money::ZERO,
                payment_date: payment_date.clone(),
                status: PaymentStatus::Pending,
            })
            .await?;
        self.invalidate_cache();

        Ok(Activity {
            id,
            name,
            sector,
            total_cost: draft.total_cost,
            paid_alex_rute: Money::ZERO,
            paid_diego_ana: Money::ZERO,
            payment_date,
            status: PaymentStatus::Pending,
        })
    }

    /// Applies a payment to one activity: parses the amount, resolves the
    /// payer, adds the amount to exactly one accumulator and persists the
    /// new accumulator together with the recomputed status.
    pub async fn apply_payment(
        &self,
        reference: ActivityRef<'_>,
        amount_raw: &str,
        payer_raw: &str,
        date: Option<&str>,
    ) -> ResultLedger<PaymentReceipt> {
        let amount = Money::parse(amount_raw)?;
        // Accumulators are monotonic; there is no refund operation.
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmountFormat(
                amount_raw.trim().to_string(),
            ));
        }
        let payer = Payer::resolve(payer_raw)?;
        let activity = self.resolve_activity(reference).await?;

        let (paid_alex_rute, paid_diego_ana) = match payer {
            Payer::AlexRute => (activity.paid_alex_rute + amount, activity.paid_diego_ana),
            Payer::DiegoAna => (activity.paid_alex_rute, activity.paid_diego_ana + amount),
        };
        let status = PaymentStatus::derive(activity.total_cost, paid_alex_rute + paid_diego_ana);
        let normalized_date = date.map(util::normalize_date);

        let mut patch = ActivityPatch {
            status: Some(status),
            ..Default::default()
        };
        match payer {
            Payer::AlexRute => patch.paid_alex_rute = Some(paid_alex_rute),
            Payer::DiegoAna => patch.paid_diego_ana = Some(paid_diego_ana),
        }
        if let Some(date) = &normalized_date {
            patch.payment_date = Some(Some(date.clone()));
        }

        self.store.update_fields(activity.id, patch).await?;
        self.invalidate_cache();

        let paid_total = paid_alex_rute + paid_diego_ana;
        let remaining = if paid_total >= activity.total_cost {
            Money::ZERO
        } else {
            activity.total_cost - paid_total
        };
        let message = format!(
            "Payment of {amount} registered for '{name}' by {payer}",
            name = activity.name,
            payer = payer.display_name(),
        );

        Ok(PaymentReceipt {
            activity_id: activity.id,
            activity: activity.name,
            payer,
            amount,
            date: normalized_date,
            status,
            remaining,
            message,
        })
    }

    async fn resolve_activity(&self, reference: ActivityRef<'_>) -> ResultLedger<Activity> {
        let mut candidates = self
            .store
            .find_by_name_sector(reference.name, reference.sector)
            .await?;
        // A wrong sector must not hide an otherwise unambiguous name match.
        if candidates.is_empty() && reference.sector.is_some() {
            candidates = self.store.find_by_name_sector(reference.name, None).await?;
        }
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::ActivityNotFound(reference.name.trim().to_string()))
    }

    /// Re-derives the status of every activity from its current
    /// accumulators. Accumulators are untouched, so the operation is
    /// idempotent and safe after any external bulk edit.
    pub async fn recompute_all_status(&self) -> ResultLedger<RecomputeOutcome> {
        let activities = self.store.list_all().await?;

        let mut updated = 0u64;
        for activity in activities {
            let patch = ActivityPatch {
                status: Some(activity.derived_status()),
                ..Default::default()
            };
            if let Err(fault) = self.store.update_fields(activity.id, patch).await {
                return Ok(RecomputeOutcome {
                    updated,
                    fault: Some(fault),
                });
            }
            updated += 1;
        }

        self.invalidate_cache();
        Ok(RecomputeOutcome {
            updated,
            fault: None,
        })
    }

    /// All activities, ordered by id. The status field is re-derived from
    /// the accumulators on read; a stale stored flag never leaves the
    /// engine.
    pub async fn list_activities(&self) -> ResultLedger<Vec<Activity>> {
        let mut activities = self.store.list_all().await?;
        for activity in &mut activities {
            activity.status = activity.derived_status();
        }
        Ok(activities)
    }

    /// Activities with a positive remaining balance.
    ///
    /// Both the filter and the status carried by the returned records are
    /// recomputed from the balance, never read from the stored flag, so a
    /// stale flag can not leak a settled activity into the pending list
    /// (or hide an unsettled one).
    pub async fn list_pending(&self) -> ResultLedger<Vec<PendingActivity>> {
        let activities = self.store.list_all().await?;
        Ok(activities
            .into_iter()
            .filter_map(|mut activity| {
                activity.status = activity.derived_status();
                let remaining = activity.remaining();
                remaining
                    .is_positive()
                    .then(|| PendingActivity {
                        activity,
                        remaining,
                    })
            })
            .collect())
    }

    /// Activities whose accumulated payments cover the total cost. Like
    /// [`list_pending`](Self::list_pending), the condition and the returned
    /// status are recomputed on read.
    pub async fn list_paid(&self) -> ResultLedger<Vec<Activity>> {
        let activities = self.store.list_all().await?;
        Ok(activities
            .into_iter()
            .filter_map(|mut activity| {
                activity.status = activity.derived_status();
                (activity.status == PaymentStatus::Paid).then_some(activity)
            })
            .collect())
    }

    /// Hard-deletes an activity and returns the deleted record.
    pub async fn delete_activity(&self, id: i64) -> ResultLedger<Activity> {
        let activity = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::ActivityNotFound(id.to_string()))?;
        self.store.delete(id).await?;
        self.invalidate_cache();
        Ok(activity)
    }

    /// Sum of all activities' total costs; zero on an empty set.
    pub async fn total_cost_sum(&self) -> ResultLedger<Money> {
        let activities = self.store.list_all().await?;
        Ok(activities
            .iter()
            .fold(Money::ZERO, |acc, activity| acc + activity.total_cost))
    }

    /// Sum of both accumulators over all activities; zero on an empty set.
    pub async fn total_paid_sum(&self) -> ResultLedger<Money> {
        let activities = self.store.list_all().await?;
        Ok(activities
            .iter()
            .fold(Money::ZERO, |acc, activity| acc + activity.paid_total()))
    }

    /// Sum of one group's contributions over all activities.
    pub async fn total_paid_by(&self, payer: Payer) -> ResultLedger<Money> {
        let activities = self.store.list_all().await?;
        Ok(activities
            .iter()
            .fold(Money::ZERO, |acc, activity| acc + activity.paid_by(payer)))
    }
}
