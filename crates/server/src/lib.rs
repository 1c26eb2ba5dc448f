use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::LedgerError;
use serde::Serialize;

pub use cache::ListingCache;
pub use receipts::OcrClient;
pub use server::{ServerState, app, run, run_with_listener};

mod activities;
mod cache;
mod payments;
mod receipts;
mod server;
mod status;
mod totals;

pub mod types {
    pub mod activity {
        pub use api_types::activity::{
            ActivityCreated, ActivityDeleted, ActivityNew, ActivityView, PendingActivityView,
        };
    }

    pub mod payment {
        pub use api_types::payment::{PaymentRegister, PaymentRegistered};
    }

    pub mod status {
        pub use api_types::status::RecomputeResponse;
    }

    pub mod totals {
        pub use api_types::totals::TotalsView;
    }

    pub mod receipt {
        pub use api_types::receipt::{ReceiptParsed, ReceiptText, ReceiptUpload};
    }

    pub mod health {
        pub use api_types::health::HealthView;
    }
}

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
    Ocr(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::ActivityNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::InvalidAmountFormat(_)
        | LedgerError::UnrecognizedPayer(_)
        | LedgerError::InvalidActivityInput(_) => StatusCode::BAD_REQUEST,
    }
}

/// Storage faults are logged server-side and replaced with an opaque body;
/// backend details never reach the client.
fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Storage(store_err) => {
            tracing::error!("storage error: {store_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Ocr(err) => {
                tracing::error!("ocr error: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "receipt service unavailable".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}
