//! Resolution of free-text payer identifiers into the two payer couples.
//!
//! Every payment belongs to exactly one of the two groups that split the
//! construction costs. Receipt OCR output is noisy, so resolution is
//! two-phase: exact alias match first, then substring inference over the
//! member names, Alex-Rute checked before Diego-Ana.

use serde::{Deserialize, Serialize};

use crate::LedgerError;

const ALEX_RUTE_ALIASES: [&str; 4] = ["alex-rute", "alex rute", "alex", "rute"];
const DIEGO_ANA_ALIASES: [&str; 4] = ["diego-ana", "diego ana", "diego", "ana"];

const ALEX_RUTE_MEMBERS: [&str; 2] = ["alex", "rute"];
const DIEGO_ANA_MEMBERS: [&str; 2] = ["diego", "ana"];

/// One of the two payer couples tracked per activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payer {
    AlexRute,
    DiegoAna,
}

impl Payer {
    /// Resolves a free-text payer identifier to a group.
    ///
    /// Fails with [`LedgerError::UnrecognizedPayer`] when neither the alias
    /// sets nor the member-name substrings match; callers surface that as a
    /// client-input error.
    pub fn resolve(raw: &str) -> Result<Self, LedgerError> {
        let normalized = raw.trim().to_lowercase();

        if ALEX_RUTE_ALIASES.contains(&normalized.as_str()) {
            return Ok(Self::AlexRute);
        }
        if DIEGO_ANA_ALIASES.contains(&normalized.as_str()) {
            return Ok(Self::DiegoAna);
        }

        // Inference for names extracted from receipts ("Alexsandro M. Silva").
        if ALEX_RUTE_MEMBERS.iter().any(|m| normalized.contains(m)) {
            return Ok(Self::AlexRute);
        }
        if DIEGO_ANA_MEMBERS.iter().any(|m| normalized.contains(m)) {
            return Ok(Self::DiegoAna);
        }

        Err(LedgerError::UnrecognizedPayer(raw.trim().to_string()))
    }

    /// Canonical column identifier used by storage adapters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlexRute => "alex_rute",
            Self::DiegoAna => "diego_ana",
        }
    }

    /// Human-facing group name, as written in confirmation messages.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::AlexRute => "Alex-Rute",
            Self::DiegoAna => "Diego-Ana",
        }
    }
}

impl core::fmt::Display for Payer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl TryFrom<&str> for Payer {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "alex_rute" => Ok(Self::AlexRute),
            "diego_ana" => Ok(Self::DiegoAna),
            other => Err(LedgerError::UnrecognizedPayer(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_aliases_resolve() {
        assert_eq!(Payer::resolve("Alex-Rute").unwrap(), Payer::AlexRute);
        assert_eq!(Payer::resolve("alex rute").unwrap(), Payer::AlexRute);
        assert_eq!(Payer::resolve("rute").unwrap(), Payer::AlexRute);
        assert_eq!(Payer::resolve("diego-ana").unwrap(), Payer::DiegoAna);
        assert_eq!(Payer::resolve("Diego").unwrap(), Payer::DiegoAna);
        assert_eq!(Payer::resolve("ANA").unwrap(), Payer::DiegoAna);
    }

    #[test]
    fn substring_inference_resolves_receipt_names() {
        assert_eq!(
            Payer::resolve("Alexsandro M. Silva").unwrap(),
            Payer::AlexRute
        );
        assert_eq!(Payer::resolve("Diego de Souza").unwrap(), Payer::DiegoAna);
        // "Mariana" carries "ana"; group A member names are checked first.
        assert_eq!(Payer::resolve("Mariana").unwrap(), Payer::DiegoAna);
    }

    #[test]
    fn unknown_payer_is_rejected() {
        assert_eq!(
            Payer::resolve("Carlos"),
            Err(LedgerError::UnrecognizedPayer("Carlos".to_string()))
        );
        assert!(Payer::resolve("").is_err());
    }
}
