//! Bulk status recompute endpoint

use api_types::status::RecomputeResponse;
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

pub async fn recompute(
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<RecomputeResponse>), ServerError> {
    let outcome = state.ledger.recompute_all_status().await?;

    match outcome.fault {
        None => Ok((
            StatusCode::OK,
            Json(RecomputeResponse {
                updated: outcome.updated,
                completed: true,
            }),
        )),
        Some(fault) => {
            // Partial progress is reported rather than discarded.
            tracing::error!("status sweep stopped after {}: {fault}", outcome.updated);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RecomputeResponse {
                    updated: outcome.updated,
                    completed: false,
                }),
            ))
        }
    }
}
