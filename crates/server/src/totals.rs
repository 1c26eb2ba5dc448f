//! Totals API endpoint

use api_types::totals::TotalsView;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::Payer;

pub async fn get_totals(State(state): State<ServerState>) -> Result<Json<TotalsView>, ServerError> {
    let ledger = &state.ledger;

    let total_cost = ledger.total_cost_sum().await?;
    let total_paid = ledger.total_paid_sum().await?;
    let paid_alex_rute = ledger.total_paid_by(Payer::AlexRute).await?;
    let paid_diego_ana = ledger.total_paid_by(Payer::DiegoAna).await?;

    Ok(Json(TotalsView {
        total_cost: total_cost.to_major_f64(),
        total_paid: total_paid.to_major_f64(),
        paid_alex_rute: paid_alex_rute.to_major_f64(),
        paid_diego_ana: paid_diego_ana.to_major_f64(),
    }))
}
