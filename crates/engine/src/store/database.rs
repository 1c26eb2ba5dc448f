//! sea-orm adapter for the storage port.
//!
//! Schema lives in the `migration` crate; this module only maps between
//! the entity model and the domain [`Activity`].

use sea_orm::{ActiveValue, DatabaseConnection, QueryOrder, entity::prelude::*};

use super::{ActivityPatch, ActivityStore, NewActivity, StoreError};
use crate::{
    Money,
    activities::{Activity, PaymentStatus},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub sector: Option<String>,
    pub total_cost_cents: i64,
    pub paid_alex_rute_cents: i64,
    pub paid_diego_ana_cents: i64,
    pub status: String,
    pub payment_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Activity {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = PaymentStatus::try_from(model.status.as_str())
            .map_err(|_| StoreError::Corrupt(format!("activity {} status", model.id)))?;
        Ok(Activity {
            id: model.id,
            name: model.name,
            sector: model.sector,
            total_cost: Money::from_cents(model.total_cost_cents),
            paid_alex_rute: Money::from_cents(model.paid_alex_rute_cents),
            paid_diego_ana: Money::from_cents(model.paid_diego_ana_cents),
            payment_date: model.payment_date,
            status,
        })
    }
}

impl From<NewActivity> for ActiveModel {
    fn from(new: NewActivity) -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(new.name),
            sector: ActiveValue::Set(new.sector),
            total_cost_cents: ActiveValue::Set(new.total_cost.cents()),
            paid_alex_rute_cents: ActiveValue::Set(new.paid_alex_rute.cents()),
            paid_diego_ana_cents: ActiveValue::Set(new.paid_diego_ana.cents()),
            status: ActiveValue::Set(new.status.as_str().to_string()),
            payment_date: ActiveValue::Set(new.payment_date),
        }
    }
}

/// Storage adapter backed by a sea-orm [`DatabaseConnection`] (SQLite in
/// the shipped configuration).
#[derive(Clone, Debug)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connection reachability test for health checks.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(StoreError::from)
    }
}

impl ActivityStore for DatabaseStore {
    async fn find_by_name_sector(
        &self,
        name: &str,
        sector: Option<&str>,
    ) -> Result<Vec<Activity>, StoreError> {
        // Matching is case-insensitive and trimmed; filtering in the engine's
        // shared rule keeps the adapters behaviorally identical across
        // backends and collations.
        let all = self.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|activity| super::matches(activity, name, sector))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>, StoreError> {
        let model = Entity::find_by_id(id).one(&self.db).await?;
        model.map(Activity::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Activity>, StoreError> {
        let models = Entity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(Activity::try_from).collect()
    }

    async fn insert(&self, new: NewActivity) -> Result<i64, StoreError> {
        let model = ActiveModel::from(new).insert(&self.db).await?;
        Ok(model.id)
    }

    async fn update_fields(&self, id: i64, patch: ActivityPatch) -> Result<(), StoreError> {
        let mut active = ActiveModel {
            id: ActiveValue::Set(id),
            ..Default::default()
        };
        if let Some(paid) = patch.paid_alex_rute {
            active.paid_alex_rute_cents = ActiveValue::Set(paid.cents());
        }
        if let Some(paid) = patch.paid_diego_ana {
            active.paid_diego_ana_cents = ActiveValue::Set(paid.cents());
        }
        if let Some(status) = patch.status {
            active.status = ActiveValue::Set(status.as_str().to_string());
        }
        if let Some(date) = patch.payment_date {
            active.payment_date = ActiveValue::Set(date);
        }
        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
