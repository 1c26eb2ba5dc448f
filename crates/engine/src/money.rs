use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use crate::LedgerError;

/// Money amount represented as **integer centavos**.
///
/// Use this type for **all** monetary values in the ledger (activity costs,
/// accumulated payments, sums) to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::from_cents(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "R$ 12.34");
/// ```
///
/// Parsing from user input accepts the plain decimal format as well as the
/// Brazilian one (`R$ 1.234,56`):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!(Money::parse("1.234,56").unwrap().cents(), 123456);
/// assert_eq!(Money::parse("R$ 45,00").unwrap().cents(), 4500);
/// assert_eq!(Money::parse("45.00").unwrap().cents(), 4500);
/// assert!(Money::parse("not-a-number").is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer centavos.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in centavos.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Value in major units (reais) as a float, for read-side views only.
    #[must_use]
    pub fn to_major_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a currency string into centavos.
    ///
    /// Cleaning rules, in order:
    /// - an `R$` marker and surrounding whitespace are stripped;
    /// - if the cleaned string contains a comma it is treated as Brazilian
    ///   format: all `.` (thousands separators) are removed, then `,` becomes
    ///   the decimal point;
    /// - otherwise the cleaned string already uses `.` as decimal point.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings with [`LedgerError::InvalidAmountFormat`]
    ///   echoing the raw input
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let invalid = || LedgerError::InvalidAmountFormat(raw.trim().to_string());

        let cleaned = raw.replace("R$", "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(invalid());
        }

        let normalized = if cleaned.contains(',') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.to_string()
        };

        let (sign, rest) = if let Some(stripped) = normalized.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = normalized.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, normalized.as_str())
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut parts = rest.split('.');
        let reais_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if reais_str.is_empty() || !reais_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let reais: i64 = reais_str.parse().map_err(|_| invalid())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(invalid()),
                }
            }
        };

        let total = reais
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or_else(invalid)?
        } else {
            total
        };

        Ok(Money(signed))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let reais = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}R$ {reais}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}
