use sea_orm::{Database, DatabaseConnection};

use engine::{
    Activity, ActivityDraft, ActivityPatch, ActivityRef, ActivityStore, DatabaseStore, JsonStore,
    Ledger, LedgerError, Money, NewActivity, Payer, PaymentStatus, StoreError,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> (Ledger<DatabaseStore>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::new(DatabaseStore::new(db.clone()));
    (ledger, db)
}

fn json_ledger() -> Ledger<JsonStore> {
    Ledger::new(JsonStore::in_memory())
}

fn draft(name: &str, sector: &str, total: &str) -> ActivityDraft {
    ActivityDraft {
        name: name.to_string(),
        sector: sector.to_string(),
        total_cost: Money::parse(total).unwrap(),
        date: None,
    }
}

fn by_name(name: &str) -> ActivityRef<'_> {
    ActivityRef { name, sector: None }
}

#[tokio::test]
async fn create_activity_starts_pending_with_zero_accumulators() {
    let (ledger, _db) = ledger_with_db().await;

    let activity = ledger
        .create_activity(ActivityDraft {
            date: Some("2026-01-15".to_string()),
            ..draft("Fundação", "Estrutura", "R$ 1.500,00")
        })
        .await
        .unwrap();

    assert_eq!(activity.status, PaymentStatus::Pending);
    assert_eq!(activity.paid_alex_rute, Money::ZERO);
    assert_eq!(activity.paid_diego_ana, Money::ZERO);
    assert_eq!(activity.total_cost.cents(), 150000);
    assert_eq!(activity.payment_date.as_deref(), Some("15/01/2026"));
}

#[tokio::test]
async fn create_activity_rejects_blank_fields_and_bad_amounts() {
    let (ledger, _db) = ledger_with_db().await;

    let err = ledger
        .create_activity(draft("  ", "Estrutura", "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidActivityInput(_)));

    let err = ledger
        .create_activity(draft("Fundação", "   ", "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidActivityInput(_)));

    let err = ledger
        .create_activity(draft("Fundação", "Estrutura", "0"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidActivityInput(_)));

    // Nothing got persisted by the failed attempts.
    assert!(ledger.list_activities().await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_moves_exactly_one_accumulator() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .create_activity(draft("Fundação", "Estrutura", "R$ 100,00"))
        .await
        .unwrap();

    let receipt = ledger
        .apply_payment(by_name("Fundação"), "R$ 40,00", "Alex", None)
        .await
        .unwrap();
    assert_eq!(receipt.payer, Payer::AlexRute);
    assert_eq!(receipt.amount.cents(), 4000);
    assert_eq!(receipt.status, PaymentStatus::Pending);
    assert_eq!(receipt.remaining.cents(), 6000);

    let activity = &ledger.list_activities().await.unwrap()[0];
    assert_eq!(activity.paid_alex_rute.cents(), 4000);
    assert_eq!(activity.paid_diego_ana.cents(), 0);
    assert_eq!(activity.total_cost.cents(), 10000);
}

#[tokio::test]
async fn full_coverage_flips_status_to_paid() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .create_activity(draft("Fundação", "Estrutura", "R$ 100,00"))
        .await
        .unwrap();

    ledger
        .apply_payment(by_name("Fundação"), "40,00", "alex-rute", None)
        .await
        .unwrap();
    let receipt = ledger
        .apply_payment(by_name("Fundação"), "60,00", "Ana", Some("2026-02-01"))
        .await
        .unwrap();

    assert_eq!(receipt.payer, Payer::DiegoAna);
    assert_eq!(receipt.status, PaymentStatus::Paid);
    assert_eq!(receipt.remaining, Money::ZERO);
    assert_eq!(receipt.date.as_deref(), Some("01/02/2026"));

    let activity = &ledger.list_activities().await.unwrap()[0];
    assert_eq!(activity.status, PaymentStatus::Paid);
    assert_eq!(activity.payment_date.as_deref(), Some("01/02/2026"));
}

#[tokio::test]
async fn payment_rejects_bad_amount_payer_and_unknown_activity() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .create_activity(draft("Fundação", "Estrutura", "R$ 100,00"))
        .await
        .unwrap();

    let err = ledger
        .apply_payment(by_name("Fundação"), "abc", "Alex", None)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidAmountFormat("abc".to_string()));

    // Negative and zero amounts never touch the accumulators.
    let err = ledger
        .apply_payment(by_name("Fundação"), "-10,00", "Alex", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmountFormat(_)));

    let err = ledger
        .apply_payment(by_name("Fundação"), "10,00", "Carlos", None)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::UnrecognizedPayer("Carlos".to_string()));

    let err = ledger
        .apply_payment(by_name("Telhado"), "10,00", "Alex", None)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::ActivityNotFound("Telhado".to_string()));

    let activity = &ledger.list_activities().await.unwrap()[0];
    assert_eq!(activity.paid_total(), Money::ZERO);
    assert_eq!(activity.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn sector_disambiguates_and_falls_back_when_wrong() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .create_activity(draft("Pintura", "Interna", "R$ 100,00"))
        .await
        .unwrap();
    ledger
        .create_activity(draft("Pintura", "Externa", "R$ 200,00"))
        .await
        .unwrap();

    let receipt = ledger
        .apply_payment(
            ActivityRef {
                name: "pintura",
                sector: Some("externa"),
            },
            "50,00",
            "Diego",
            None,
        )
        .await
        .unwrap();
    assert_eq!(receipt.remaining.cents(), 15000);

    // A sector that matches nothing falls back to the name-only lookup
    // instead of failing.
    let receipt = ledger
        .apply_payment(
            ActivityRef {
                name: "Pintura",
                sector: Some("Hidráulica"),
            },
            "100,00",
            "Rute",
            None,
        )
        .await
        .unwrap();
    assert_eq!(receipt.payer, Payer::AlexRute);

    let activities = ledger.list_activities().await.unwrap();
    let interna = activities
        .iter()
        .find(|a| a.sector.as_deref() == Some("Interna"))
        .unwrap();
    assert_eq!(interna.paid_alex_rute.cents(), 10000);
    assert_eq!(interna.status, PaymentStatus::Paid);
}

#[tokio::test]
async fn pending_and_paid_lists_recompute_instead_of_trusting_the_flag() {
    let (ledger, _db) = ledger_with_db().await;

    // A record whose stored flag went stale, as after a bulk spreadsheet
    // import: fully covered yet still marked pending.
    ledger
        .store()
        .insert(NewActivity {
            name: "Alvenaria".to_string(),
            sector: Some("Estrutura".to_string()),
            total_cost: Money::from_cents(10000),
            paid_alex_rute: Money::from_cents(4000),
            paid_diego_ana: Money::from_cents(6000),
            payment_date: None,
            status: PaymentStatus::Pending,
        })
        .await
        .unwrap();
    // And the inverse: marked paid while money is still missing.
    ledger
        .store()
        .insert(NewActivity {
            name: "Reboco".to_string(),
            sector: Some("Estrutura".to_string()),
            total_cost: Money::from_cents(10000),
            paid_alex_rute: Money::from_cents(4000),
            paid_diego_ana: Money::ZERO,
            payment_date: None,
            status: PaymentStatus::Paid,
        })
        .await
        .unwrap();

    let pending = ledger.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].activity.name, "Reboco");
    assert_eq!(pending[0].remaining.cents(), 6000);
    // The returned record carries the re-derived status, not the stale
    // stored flag.
    assert_eq!(pending[0].activity.status, PaymentStatus::Pending);

    let paid = ledger.list_paid().await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].name, "Alvenaria");
    assert_eq!(paid[0].status, PaymentStatus::Paid);

    let all = ledger.list_activities().await.unwrap();
    assert_eq!(all[0].status, PaymentStatus::Paid);
    assert_eq!(all[1].status, PaymentStatus::Pending);
}

#[tokio::test]
async fn recompute_repairs_stale_flags_and_is_idempotent() {
    let (ledger, _db) = ledger_with_db().await;
    ledger
        .store()
        .insert(NewActivity {
            name: "Alvenaria".to_string(),
            sector: None,
            total_cost: Money::from_cents(10000),
            paid_alex_rute: Money::from_cents(10000),
            paid_diego_ana: Money::ZERO,
            payment_date: None,
            status: PaymentStatus::Pending,
        })
        .await
        .unwrap();
    ledger
        .store()
        .insert(NewActivity {
            name: "Reboco".to_string(),
            sector: None,
            total_cost: Money::from_cents(10000),
            paid_alex_rute: Money::ZERO,
            paid_diego_ana: Money::ZERO,
            payment_date: None,
            status: PaymentStatus::Paid,
        })
        .await
        .unwrap();

    let outcome = ledger.recompute_all_status().await.unwrap();
    assert_eq!(outcome.updated, 2);
    assert!(outcome.fault.is_none());

    let activities = ledger.list_activities().await.unwrap();
    assert_eq!(activities[0].status, PaymentStatus::Paid);
    assert_eq!(activities[1].status, PaymentStatus::Pending);

    // Accumulators are untouched, so running it again changes nothing.
    let outcome = ledger.recompute_all_status().await.unwrap();
    assert_eq!(outcome.updated, 2);
    assert_eq!(ledger.list_activities().await.unwrap(), activities);
}

/// Backend whose writes start failing once a quota of successful updates
/// is spent, as a disk does when it fills mid-sweep.
struct FillingDisk {
    inner: JsonStore,
    update_quota: usize,
    updates: std::sync::atomic::AtomicUsize,
}

impl ActivityStore for FillingDisk {
    async fn find_by_name_sector(
        &self,
        name: &str,
        sector: Option<&str>,
    ) -> Result<Vec<Activity>, StoreError> {
        self.inner.find_by_name_sector(name, sector).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn list_all(&self) -> Result<Vec<Activity>, StoreError> {
        self.inner.list_all().await
    }

    async fn insert(&self, new: NewActivity) -> Result<i64, StoreError> {
        self.inner.insert(new).await
    }

    async fn update_fields(&self, id: i64, patch: ActivityPatch) -> Result<(), StoreError> {
        let spent = self
            .updates
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if spent >= self.update_quota {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.update_fields(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn recompute_reports_partial_progress_when_storage_fails_mid_sweep() {
    let ledger = Ledger::new(FillingDisk {
        inner: JsonStore::in_memory(),
        update_quota: 2,
        updates: std::sync::atomic::AtomicUsize::new(0),
    });
    for name in ["Fundação", "Alvenaria", "Reboco", "Telhado"] {
        ledger
            .create_activity(draft(name, "Estrutura", "100,00"))
            .await
            .unwrap();
    }

    let outcome = ledger.recompute_all_status().await.unwrap();
    assert_eq!(outcome.updated, 2);
    assert!(outcome.fault.is_some());
}

#[tokio::test]
async fn totals_fold_over_all_activities() {
    let (ledger, _db) = ledger_with_db().await;
    assert_eq!(ledger.total_cost_sum().await.unwrap(), Money::ZERO);
    assert_eq!(ledger.total_paid_sum().await.unwrap(), Money::ZERO);

    ledger
        .create_activity(draft("Fundação", "Estrutura", "100,00"))
        .await
        .unwrap();
    ledger
        .create_activity(draft("Telhado", "Cobertura", "250,00"))
        .await
        .unwrap();
    ledger
        .apply_payment(by_name("Fundação"), "40,00", "Alex", None)
        .await
        .unwrap();
    ledger
        .apply_payment(by_name("Telhado"), "30,00", "Diego", None)
        .await
        .unwrap();

    assert_eq!(ledger.total_cost_sum().await.unwrap().cents(), 35000);
    assert_eq!(ledger.total_paid_sum().await.unwrap().cents(), 7000);
    assert_eq!(
        ledger.total_paid_by(Payer::AlexRute).await.unwrap().cents(),
        4000
    );
    assert_eq!(
        ledger.total_paid_by(Payer::DiegoAna).await.unwrap().cents(),
        3000
    );
}

#[tokio::test]
async fn delete_removes_record_and_reports_unknown_ids() {
    let (ledger, _db) = ledger_with_db().await;
    let created = ledger
        .create_activity(draft("Fundação", "Estrutura", "100,00"))
        .await
        .unwrap();

    let deleted = ledger.delete_activity(created.id).await.unwrap();
    assert_eq!(deleted.name, "Fundação");
    assert!(ledger.list_activities().await.unwrap().is_empty());

    let err = ledger.delete_activity(created.id).await.unwrap_err();
    assert_eq!(err, LedgerError::ActivityNotFound(created.id.to_string()));
}

#[tokio::test]
async fn json_store_behaves_like_the_database_store() {
    let ledger = json_ledger();
    ledger
        .create_activity(draft("Fundação", "Estrutura", "R$ 100,00"))
        .await
        .unwrap();

    let receipt = ledger
        .apply_payment(by_name("fundação"), "R$ 100,00", "rute", None)
        .await
        .unwrap();
    assert_eq!(receipt.status, PaymentStatus::Paid);

    assert!(ledger.list_pending().await.unwrap().is_empty());
    assert_eq!(ledger.list_paid().await.unwrap().len(), 1);
    assert_eq!(ledger.total_paid_sum().await.unwrap().cents(), 10000);
}

#[tokio::test]
async fn json_store_never_reuses_ids_after_delete() {
    let ledger = json_ledger();
    let first = ledger
        .create_activity(draft("Fundação", "Estrutura", "100,00"))
        .await
        .unwrap();
    ledger.delete_activity(first.id).await.unwrap();

    let second = ledger
        .create_activity(draft("Telhado", "Cobertura", "100,00"))
        .await
        .unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn json_store_rolls_back_memory_when_the_write_fails() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();
    let dir = root.join(format!("rollback_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    // The parent directory does not exist yet, so every write fails.
    let store = JsonStore::open(dir.join("ledger.json")).unwrap();
    let err = store
        .insert(NewActivity {
            name: "Fundação".to_string(),
            sector: None,
            total_cost: Money::from_cents(10000),
            paid_alex_rute: Money::ZERO,
            paid_diego_ana: Money::ZERO,
            payment_date: None,
            status: PaymentStatus::Pending,
        })
        .await;
    assert!(matches!(err, Err(StoreError::Io(_))));
    assert!(store.list_all().await.unwrap().is_empty());

    // Once the directory exists the rolled-back id is handed out afresh.
    std::fs::create_dir_all(&dir).unwrap();
    let id = store
        .insert(NewActivity {
            name: "Fundação".to_string(),
            sector: None,
            total_cost: Money::from_cents(10000),
            paid_alex_rute: Money::ZERO,
            paid_diego_ana: Money::ZERO,
            payment_date: None,
            status: PaymentStatus::Pending,
        })
        .await
        .unwrap();
    assert_eq!(id, 1);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn json_store_persists_across_reopen() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();
    let path = root.join(format!("ledger_{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let ledger = Ledger::new(JsonStore::open(&path).unwrap());
        ledger
            .create_activity(draft("Fundação", "Estrutura", "100,00"))
            .await
            .unwrap();
        ledger
            .apply_payment(by_name("Fundação"), "40,00", "Alex", Some("2026-03-10"))
            .await
            .unwrap();
    }

    let ledger = Ledger::new(JsonStore::open(&path).unwrap());
    let activities = ledger.list_activities().await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].paid_alex_rute.cents(), 4000);
    assert_eq!(activities[0].payment_date.as_deref(), Some("10/03/2026"));
    assert_eq!(activities[0].status, PaymentStatus::Pending);

    let _ = std::fs::remove_file(path);
}
