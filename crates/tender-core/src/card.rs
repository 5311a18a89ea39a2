//! Card types for tender.
//!
//! A card moves through three shapes:
//!
//! 1. `CardParams` - what the client submits: an opaque service token plus
//!    display metadata and the billing zip. Lives for one request.
//! 2. `NewCard` - what gets inserted: the metadata, the backend-issued
//!    `SourceRef` and the zip hash. The token and zip are gone.
//! 3. `CardRecord` - a stored `NewCard` with its local id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};
use crate::ids::{CardId, ServiceToken, SourceRef, UserId};
use crate::secret::Zip5Hash;

/// Card submission from the client.
#[derive(Clone, Deserialize)]
pub struct CardParams {
    /// Client-side token representing the card.
    pub service_token: ServiceToken,

    /// Name printed on the card.
    pub cardholder_name: String,

    /// Last four digits, for display.
    pub last4: String,

    /// Card brand as reported by the client SDK (e.g. "Visa").
    pub brand: String,

    /// Expiry month, 1-12.
    pub exp_month: u8,

    /// Expiry year, four digits.
    pub exp_year: u16,

    /// Billing postal code. Only a hash of its first five characters is kept.
    pub address_zip: String,
}

impl CardParams {
    /// Check the display metadata.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidCardDetails` if `last4` is not exactly
    /// four ASCII digits or the expiry is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.last4.len() != 4 || !self.last4.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::InvalidCardDetails(
                "last4 must be exactly four digits".into(),
            ));
        }
        if !(1..=12).contains(&self.exp_month) {
            return Err(PaymentError::InvalidCardDetails(format!(
                "expiry month {} is out of range",
                self.exp_month
            )));
        }
        if !(1000..=9999).contains(&self.exp_year) {
            return Err(PaymentError::InvalidCardDetails(format!(
                "expiry year {} must have four digits",
                self.exp_year
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for CardParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardParams")
            .field("service_token", &self.service_token)
            .field("cardholder_name", &self.cardholder_name)
            .field("last4", &self.last4)
            .field("brand", &self.brand)
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("address_zip", &"<redacted>")
            .finish()
    }
}

/// A card ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    /// Owning user.
    pub user_id: UserId,
    /// Last four digits.
    pub last4: String,
    /// Name printed on the card.
    pub cardholder_name: String,
    /// Expiry month.
    pub exp_month: u8,
    /// Expiry year.
    pub exp_year: u16,
    /// Card brand.
    pub brand: String,
    /// Backend-issued card source.
    pub remote_token: SourceRef,
    /// Hash of the billing zip prefix.
    pub zip5_hash: Zip5Hash,
}

impl NewCard {
    /// Assemble the insertable card from a submission and the derived values.
    #[must_use]
    pub fn from_params(
        user_id: UserId,
        params: &CardParams,
        remote_token: SourceRef,
        zip5_hash: Zip5Hash,
    ) -> Self {
        Self {
            user_id,
            last4: params.last4.clone(),
            cardholder_name: params.cardholder_name.clone(),
            exp_month: params.exp_month,
            exp_year: params.exp_year,
            brand: params.brand.clone(),
            remote_token,
            zip5_hash,
        }
    }
}

/// A stored card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    /// Local identifier.
    pub id: CardId,
    /// Owning user.
    pub user_id: UserId,
    /// Last four digits.
    pub last4: String,
    /// Name printed on the card.
    pub cardholder_name: String,
    /// Expiry month.
    pub exp_month: u8,
    /// Expiry year.
    pub exp_year: u16,
    /// Card brand.
    pub brand: String,
    /// Backend-issued card source.
    pub remote_token: SourceRef,
    /// Hash of the billing zip prefix.
    pub zip5_hash: Zip5Hash,
}

impl CardRecord {
    /// Attach a storage-assigned id to an inserted card.
    #[must_use]
    pub fn from_new(id: CardId, card: NewCard) -> Self {
        Self {
            id,
            user_id: card.user_id,
            last4: card.last4,
            cardholder_name: card.cardholder_name,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
            brand: card.brand,
            remote_token: card.remote_token,
            zip5_hash: card.zip5_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CardParams {
        CardParams {
            service_token: ServiceToken::new("tok_1").unwrap(),
            cardholder_name: "Ada Lovelace".into(),
            last4: "4242".into(),
            brand: "Visa".into(),
            exp_month: 12,
            exp_year: 2030,
            address_zip: "94107".into(),
        }
    }

    #[test]
    fn valid_params_pass() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn last4_must_be_four_digits() {
        for bad in ["424", "42424", "42a2", "４２４２"] {
            let mut p = params();
            p.last4 = bad.into();
            assert!(
                matches!(p.validate(), Err(PaymentError::InvalidCardDetails(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn expiry_is_range_checked() {
        let mut p = params();
        p.exp_month = 13;
        assert!(p.validate().is_err());

        let mut p = params();
        p.exp_year = 30;
        assert!(p.validate().is_err());
    }

    #[test]
    fn debug_hides_zip_and_token() {
        let rendered = format!("{:?}", params());
        assert!(!rendered.contains("94107"));
        assert!(!rendered.contains("tok_1"));
        assert!(rendered.contains("4242"));
    }

    #[test]
    fn params_deserialize_from_snake_case_json() {
        let p: CardParams = serde_json::from_value(serde_json::json!({
            "service_token": "tok_abc",
            "cardholder_name": "A",
            "last4": "1111",
            "brand": "Visa",
            "exp_month": 1,
            "exp_year": 2031,
            "address_zip": "12345"
        }))
        .unwrap();
        assert_eq!(p.service_token.expose(), "tok_abc");
    }
}
