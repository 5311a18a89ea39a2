//! Charge types.
//!
//! Amounts are `u64` minor units (cents for USD), so a negative charge cannot
//! be expressed. Charges are never persisted locally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};
use crate::ids::CardId;

/// A lowercase three-letter ISO 4217 currency code.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parse and normalize an ISO currency code.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidCurrency` unless the input is exactly
    /// three ASCII letters.
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(PaymentError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// The normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request to charge a stored card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Local card to charge.
    pub card_id: CardId,
    /// Amount in minor currency units.
    pub amount_in_cents: u64,
    /// Charge currency.
    pub currency: Currency,
}

impl ChargeRequest {
    /// Build a charge request from a raw currency code.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidCurrency` for a malformed code.
    pub fn new(card_id: CardId, amount_in_cents: u64, iso_currency: &str) -> Result<Self> {
        Ok(Self {
            card_id,
            amount_in_cents,
            currency: Currency::new(iso_currency)?,
        })
    }
}

/// What the payment backend reported for a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeOutcome {
    /// Backend charge id (e.g. `ch_...`).
    pub id: String,
    /// Amount charged in minor units.
    pub amount: u64,
    /// Charge currency.
    pub currency: Currency,
    /// Backend status string (`succeeded`, `pending`, `failed`).
    pub status: String,
    /// Whether the funds were captured.
    pub paid: bool,
}

impl ChargeOutcome {
    /// Whether the backend reports the charge as paid and succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.paid && self.status == "succeeded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_is_normalized() {
        assert_eq!(Currency::new("USD").unwrap().as_str(), "usd");
        assert_eq!(Currency::new(" eur ").unwrap().to_string(), "eur");
    }

    #[test]
    fn currency_rejects_bad_codes() {
        for bad in ["", "us", "usdd", "u$d", "12a"] {
            assert!(
                matches!(Currency::new(bad), Err(PaymentError::InvalidCurrency(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn charge_request_parses_currency() {
        let req = ChargeRequest::new(CardId::new(1), 500, "usd").unwrap();
        assert_eq!(req.amount_in_cents, 500);
        assert_eq!(req.currency.as_str(), "usd");
        assert!(ChargeRequest::new(CardId::new(1), 500, "dollars").is_err());
    }

    #[test]
    fn outcome_success_requires_paid_and_succeeded() {
        let mut outcome = ChargeOutcome {
            id: "ch_1".into(),
            amount: 500,
            currency: Currency::new("usd").unwrap(),
            status: "succeeded".into(),
            paid: true,
        };
        assert!(outcome.succeeded());
        outcome.status = "pending".into();
        assert!(!outcome.succeeded());
    }
}
