//! Payment API endpoints

use api_types::payment::{PaymentRegister, PaymentRegistered};
use axum::{Json, extract::State};

use crate::{ServerError, activities, server::ServerState};
use engine::ActivityRef;

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentRegister>,
) -> Result<Json<PaymentRegistered>, ServerError> {
    let receipt = state
        .ledger
        .apply_payment(
            ActivityRef {
                name: &payload.activity,
                sector: payload.sector.as_deref(),
            },
            &payload.amount,
            &payload.payer,
            payload.date.as_deref(),
        )
        .await?;

    // The payment itself is already persisted; a failing sweep over the
    // other records must not turn it into a client-facing error.
    match state.ledger.recompute_all_status().await {
        Ok(outcome) => {
            if let Some(fault) = outcome.fault {
                tracing::error!("status sweep stopped after {}: {fault}", outcome.updated);
            }
        }
        Err(err) => tracing::error!("status sweep failed: {err}"),
    }

    Ok(Json(PaymentRegistered {
        message: receipt.message,
        date: receipt.date,
        status: activities::map_status(receipt.status),
        remaining: receipt.remaining.to_major_f64(),
    }))
}
