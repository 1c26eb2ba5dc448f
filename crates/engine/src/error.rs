//! The module contains the errors the ledger can throw.
//!
//! Client-input errors echo the offending value so the caller can correct
//! it; [`Storage`] wraps backend faults and must never be shown to clients
//! verbatim.
//!
//! [`Storage`]: LedgerError::Storage
use thiserror::Error;

use crate::store::StoreError;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid amount format: \"{0}\"")]
    InvalidAmountFormat(String),
    #[error("payer \"{0}\" not recognized. Use 'Alex-Rute' or 'Diego-Ana'")]
    UnrecognizedPayer(String),
    #[error("invalid activity input: {0}")]
    InvalidActivityInput(String),
    #[error("activity \"{0}\" not found")]
    ActivityNotFound(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmountFormat(a), Self::InvalidAmountFormat(b)) => a == b,
            (Self::UnrecognizedPayer(a), Self::UnrecognizedPayer(b)) => a == b,
            (Self::InvalidActivityInput(a), Self::InvalidActivityInput(b)) => a == b,
            (Self::ActivityNotFound(a), Self::ActivityNotFound(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
