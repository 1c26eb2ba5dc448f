//! Activity API endpoints

use api_types::activity::{
    ActivityCreated, ActivityDeleted, ActivityNew, ActivityView, PendingActivityView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{Activity, ActivityDraft, Money, PaymentStatus};

pub(crate) fn map_status(status: PaymentStatus) -> api_types::PaymentStatus {
    match status {
        PaymentStatus::Pending => api_types::PaymentStatus::Pending,
        PaymentStatus::Paid => api_types::PaymentStatus::Paid,
    }
}

pub(crate) fn view(activity: Activity) -> ActivityView {
    ActivityView {
        id: activity.id,
        name: activity.name,
        sector: activity.sector,
        total_cost: activity.total_cost.to_major_f64(),
        paid_alex_rute: activity.paid_alex_rute.to_major_f64(),
        paid_diego_ana: activity.paid_diego_ana.to_major_f64(),
        payment_date: activity.payment_date,
        status: map_status(activity.status),
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ActivityView>>, ServerError> {
    if let Some(views) = state.cache.get_all() {
        return Ok(Json(views));
    }

    let views: Vec<ActivityView> = state
        .ledger
        .list_activities()
        .await?
        .into_iter()
        .map(view)
        .collect();
    state.cache.put_all(views.clone());
    Ok(Json(views))
}

pub async fn list_pending(
    State(state): State<ServerState>,
) -> Result<Json<Vec<PendingActivityView>>, ServerError> {
    if let Some(views) = state.cache.get_pending() {
        return Ok(Json(views));
    }

    let views: Vec<PendingActivityView> = state
        .ledger
        .list_pending()
        .await?
        .into_iter()
        .map(|pending| PendingActivityView {
            activity: view(pending.activity),
            remaining: pending.remaining.to_major_f64(),
        })
        .collect();
    state.cache.put_pending(views.clone());
    Ok(Json(views))
}

pub async fn list_paid(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ActivityView>>, ServerError> {
    if let Some(views) = state.cache.get_paid() {
        return Ok(Json(views));
    }

    let views: Vec<ActivityView> = state
        .ledger
        .list_paid()
        .await?
        .into_iter()
        .map(view)
        .collect();
    state.cache.put_paid(views.clone());
    Ok(Json(views))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ActivityNew>,
) -> Result<(StatusCode, Json<ActivityCreated>), ServerError> {
    let total_cost = Money::parse(&payload.total_cost)?;
    let activity = state
        .ledger
        .create_activity(ActivityDraft {
            name: payload.name,
            sector: payload.sector,
            total_cost,
            date: payload.date,
        })
        .await?;

    let message = format!("Activity '{}' created", activity.name);
    Ok((
        StatusCode::CREATED,
        Json(ActivityCreated {
            id: activity.id,
            message,
        }),
    ))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ActivityDeleted>, ServerError> {
    let deleted = state.ledger.delete_activity(id).await?;
    Ok(Json(ActivityDeleted {
        message: format!("Activity '{}' deleted", deleted.name),
    }))
}
