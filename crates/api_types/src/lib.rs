//! Wire types shared between the HTTP server and its clients.
//!
//! Monetary amounts travel as strings on the way in (the server parses the
//! Brazilian format) and as floats in reais on the way out.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

pub mod activity {
    use super::*;

    /// Request body for creating an activity.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityNew {
        pub name: String,
        pub sector: String,
        /// Amount string, e.g. `"R$ 1.500,00"` or `"1500.00"`.
        pub total_cost: String,
        /// Optional date, `YYYY-MM-DD` or `DD/MM/YYYY`.
        pub date: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ActivityView {
        pub id: i64,
        pub name: String,
        pub sector: Option<String>,
        pub total_cost: f64,
        pub paid_alex_rute: f64,
        pub paid_diego_ana: f64,
        pub payment_date: Option<String>,
        pub status: PaymentStatus,
    }

    /// An unsettled activity with its open balance.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PendingActivityView {
        #[serde(flatten)]
        pub activity: ActivityView,
        pub remaining: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityCreated {
        pub id: i64,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivityDeleted {
        pub message: String,
    }
}

pub mod payment {
    use super::*;

    /// Request body for registering a payment against an activity.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentRegister {
        /// Activity name; matched case-insensitively.
        pub activity: String,
        /// Optional sector to disambiguate same-named activities.
        pub sector: Option<String>,
        /// Payer couple or any member alias, e.g. `"Alex"` or `"diego-ana"`.
        pub payer: String,
        /// Amount string in Brazilian or plain decimal format.
        pub amount: String,
        /// Optional payment date, `YYYY-MM-DD` or `DD/MM/YYYY`.
        pub date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentRegistered {
        pub message: String,
        pub date: Option<String>,
        pub status: PaymentStatus,
        pub remaining: f64,
    }
}

pub mod status {
    use super::*;

    /// Response of the bulk status recompute.
    ///
    /// `completed` is `false` when the sweep stopped early on a storage
    /// fault; `updated` still reports the records visited until then.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecomputeResponse {
        pub updated: u64,
        pub completed: bool,
    }
}

pub mod totals {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TotalsView {
        pub total_cost: f64,
        pub total_paid: f64,
        pub paid_alex_rute: f64,
        pub paid_diego_ana: f64,
    }
}

pub mod receipt {
    use super::*;

    /// Request body for uploading a receipt image.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptUpload {
        /// Base64-encoded image bytes.
        pub file_base64: String,
        /// Image type hint for the OCR provider, e.g. `"PNG"` or `"JPG"`.
        pub filetype: Option<String>,
    }

    /// Request body for parsing already-extracted receipt text.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptText {
        pub text: String,
    }

    /// Fields recognized in a receipt; any of them may be missing.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptParsed {
        pub amount: Option<String>,
        pub date: Option<String>,
        pub payer_name: Option<String>,
        pub full_text: String,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HealthView {
        pub status: String,
        pub database: String,
    }
}
