use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{ListingCache, OcrClient, activities, payments, receipts, status, totals};
use api_types::health::HealthView;
use engine::{DatabaseStore, Ledger};

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger<DatabaseStore>>,
    pub cache: Arc<ListingCache>,
    pub ocr: Arc<OcrClient>,
}

async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthView>) {
    match state.ledger.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthView {
                status: "ok".to_string(),
                database: "connected".to_string(),
            }),
        ),
        Err(err) => {
            tracing::error!("health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthView {
                    status: "degraded".to_string(),
                    database: "unavailable".to_string(),
                }),
            )
        }
    }
}

pub fn app(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/activities", get(activities::list).post(activities::create))
        .route("/activities/pending", get(activities::list_pending))
        .route("/activities/paid", get(activities::list_paid))
        .route("/activities/{id}", axum::routing::delete(activities::remove))
        .route("/payments", post(payments::register))
        .route("/status/recompute", post(status::recompute))
        .route("/totals", get(totals::get_totals))
        .route("/receipts", post(receipts::process))
        .route("/receipts/text", post(receipts::parse_text))
        .with_state(state)
}

pub async fn run(state: ServerState) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await
}

