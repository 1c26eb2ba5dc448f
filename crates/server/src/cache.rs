//! Short-lived read cache for the listing endpoints.
//!
//! Entries expire after a fixed TTL and every mutation going through the
//! ledger invalidates all slots, so a read after a write always sees fresh
//! data; the TTL only bounds staleness for writes that bypass the service
//! (direct spreadsheet or database edits).

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use api_types::activity::{ActivityView, PendingActivityView};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct Slot<T> {
    value: T,
    stored_at: Instant,
}

struct Slots {
    all: Option<Slot<Vec<ActivityView>>>,
    pending: Option<Slot<Vec<PendingActivityView>>>,
    paid: Option<Slot<Vec<ActivityView>>>,
}

pub struct ListingCache {
    ttl: Duration,
    slots: Mutex<Slots>,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(Slots {
                all: None,
                pending: None,
                paid: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh<T: Clone>(&self, slot: &Option<Slot<T>>) -> Option<T> {
        slot.as_ref()
            .filter(|slot| slot.stored_at.elapsed() < self.ttl)
            .map(|slot| slot.value.clone())
    }

    pub fn get_all(&self) -> Option<Vec<ActivityView>> {
        self.fresh(&self.lock().all)
    }

    pub fn put_all(&self, value: Vec<ActivityView>) {
        self.lock().all = Some(Slot {
            value,
            stored_at: Instant::now(),
        });
    }

    pub fn get_pending(&self) -> Option<Vec<PendingActivityView>> {
        self.fresh(&self.lock().pending)
    }

    pub fn put_pending(&self, value: Vec<PendingActivityView>) {
        self.lock().pending = Some(Slot {
            value,
            stored_at: Instant::now(),
        });
    }

    pub fn get_paid(&self) -> Option<Vec<ActivityView>> {
        self.fresh(&self.lock().paid)
    }

    pub fn put_paid(&self, value: Vec<ActivityView>) {
        self.lock().paid = Some(Slot {
            value,
            stored_at: Instant::now(),
        });
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl engine::ReadCache for ListingCache {
    fn invalidate_listings(&self) {
        let mut slots = self.lock();
        slots.all = None;
        slots.pending = None;
        slots.paid = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ReadCache;

    fn view(id: i64) -> ActivityView {
        ActivityView {
            id,
            name: "Fundação".to_string(),
            sector: None,
            total_cost: 100.0,
            paid_alex_rute: 0.0,
            paid_diego_ana: 0.0,
            payment_date: None,
            status: api_types::PaymentStatus::Pending,
        }
    }

    #[test]
    fn serves_within_ttl() {
        let cache = ListingCache::new(Duration::from_secs(60));
        assert!(cache.get_all().is_none());
        cache.put_all(vec![view(1)]);
        assert_eq!(cache.get_all().unwrap().len(), 1);
    }

    #[test]
    fn expires_after_ttl() {
        let cache = ListingCache::new(Duration::ZERO);
        cache.put_all(vec![view(1)]);
        assert!(cache.get_all().is_none());
    }

    #[test]
    fn invalidation_clears_every_slot() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.put_all(vec![view(1)]);
        cache.put_paid(vec![view(2)]);
        cache.put_pending(vec![PendingActivityView {
            activity: view(3),
            remaining: 100.0,
        }]);

        cache.invalidate_listings();

        assert!(cache.get_all().is_none());
        assert!(cache.get_pending().is_none());
        assert!(cache.get_paid().is_none());
    }
}
