//! The module contains the representation of an expense activity.
//!
//! An activity is one line of the construction budget: a total cost and two
//! running payment accumulators, one per payer couple. `status` is derived
//! data kept denormalized for fast reads; it must always be re-derivable
//! from the three numeric fields.

use serde::{Deserialize, Serialize};

use crate::{LedgerError, Money, Payer};

/// Payment state of an activity.
///
/// `Paid` holds **iff** the two accumulators together cover the total cost.
/// Accumulators only ever increase, so `Paid` is terminal by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    /// The single status rule: paid iff the accumulated payments cover the
    /// total cost.
    #[must_use]
    pub fn derive(total_cost: Money, paid_total: Money) -> Self {
        if paid_total >= total_cost {
            Self::Paid
        } else {
            Self::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(LedgerError::InvalidActivityInput(format!(
                "invalid status: {other}"
            ))),
        }
    }
}

/// One expense/work item tracked for payment completion.
#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    /// Store-assigned identifier, never reused after deletion.
    pub id: i64,
    pub name: String,
    /// Optional grouping tag, also the disambiguator for same-named
    /// activities.
    pub sector: Option<String>,
    /// Set once at creation; payments never modify it.
    pub total_cost: Money,
    pub paid_alex_rute: Money,
    pub paid_diego_ana: Money,
    /// Last-recorded payment date (`DD/MM/YYYY`), informational only.
    pub payment_date: Option<String>,
    pub status: PaymentStatus,
}

impl Activity {
    /// Sum of both payment accumulators.
    #[must_use]
    pub fn paid_total(&self) -> Money {
        self.paid_alex_rute + self.paid_diego_ana
    }

    /// Remaining balance, clamped at zero for overpaid activities.
    #[must_use]
    pub fn remaining(&self) -> Money {
        let remaining = self.total_cost - self.paid_total();
        if remaining.is_negative() {
            Money::ZERO
        } else {
            remaining
        }
    }

    /// Status recomputed from the numeric fields, ignoring the stored flag.
    #[must_use]
    pub fn derived_status(&self) -> PaymentStatus {
        PaymentStatus::derive(self.total_cost, self.paid_total())
    }

    /// Accumulated contribution of one payer group.
    #[must_use]
    pub fn paid_by(&self, payer: Payer) -> Money {
        match payer {
            Payer::AlexRute => self.paid_alex_rute,
            Payer::DiegoAna => self.paid_diego_ana,
        }
    }
}

/// Input for creating an activity.
#[derive(Clone, Debug)]
pub struct ActivityDraft {
    pub name: String,
    pub sector: String,
    pub total_cost: Money,
    /// Optional date, `YYYY-MM-DD` or `DD/MM/YYYY`.
    pub date: Option<String>,
}

impl ActivityDraft {
    pub(crate) fn validate(&self) -> Result<(), LedgerError> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidActivityInput(
                "name must not be empty".to_string(),
            ));
        }
        if self.sector.trim().is_empty() {
            return Err(LedgerError::InvalidActivityInput(
                "sector must not be empty".to_string(),
            ));
        }
        if !self.total_cost.is_positive() {
            return Err(LedgerError::InvalidActivityInput(format!(
                "total cost must be positive, got {}",
                self.total_cost
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(total_cents: i64, alex_cents: i64, diego_cents: i64) -> Activity {
        Activity {
            id: 1,
            name: "Fundação".to_string(),
            sector: Some("Estrutura".to_string()),
            total_cost: Money::from_cents(total_cents),
            paid_alex_rute: Money::from_cents(alex_cents),
            paid_diego_ana: Money::from_cents(diego_cents),
            payment_date: None,
            status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn status_rule() {
        assert_eq!(
            PaymentStatus::derive(Money::from_cents(10000), Money::from_cents(9999)),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::derive(Money::from_cents(10000), Money::from_cents(10000)),
            PaymentStatus::Paid
        );
        assert_eq!(
            PaymentStatus::derive(Money::from_cents(10000), Money::from_cents(10001)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn remaining_clamps_at_zero() {
        assert_eq!(activity(10000, 4000, 0).remaining().cents(), 6000);
        assert_eq!(activity(10000, 4000, 6000).remaining().cents(), 0);
        assert_eq!(activity(10000, 8000, 6000).remaining().cents(), 0);
    }

    #[test]
    fn derived_status_ignores_stored_flag() {
        // Stored as pending but fully covered: the derivation wins.
        let stale = activity(10000, 4000, 6000);
        assert_eq!(stale.status, PaymentStatus::Pending);
        assert_eq!(stale.derived_status(), PaymentStatus::Paid);
    }

    #[test]
    fn draft_validation() {
        let draft = ActivityDraft {
            name: "Fundação".to_string(),
            sector: "Estrutura".to_string(),
            total_cost: Money::from_cents(10000),
            date: None,
        };
        assert!(draft.validate().is_ok());

        let blank_name = ActivityDraft {
            name: "  ".to_string(),
            ..draft.clone()
        };
        assert!(blank_name.validate().is_err());

        let zero_cost = ActivityDraft {
            total_cost: Money::ZERO,
            ..draft
        };
        assert!(zero_cost.validate().is_err());
    }
}
