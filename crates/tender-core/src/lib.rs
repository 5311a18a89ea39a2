//! Core types and utilities for tender.
//!
//! This crate provides the foundational types shared by every payment driver:
//!
//! - **Identifiers**: `UserId`, `CardId` (local) and `RemoteCustomerId`,
//!   `SourceRef`, `ServiceToken` (backend side)
//! - **Users**: `User`
//! - **Cards**: `CardParams`, `NewCard`, `CardRecord`
//! - **Charges**: `Currency`, `ChargeRequest`, `ChargeOutcome`
//! - **Secrets**: `Zip5Hash` and the one-way postal code derivation
//!
//! # Card data
//!
//! Nothing in this crate can hold a full card number or CVV. A card is known
//! locally only by its display metadata, the opaque reference the payment
//! backend issued for it, and a salted hash of the billing postal code.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod card;
pub mod charge;
pub mod error;
pub mod ids;
pub mod secret;
pub mod user;

pub use card::{CardParams, CardRecord, NewCard};
pub use charge::{ChargeOutcome, ChargeRequest, Currency};
pub use error::{PaymentError, Result};
pub use ids::{CardId, IdError, RemoteCustomerId, ServiceToken, SourceRef, UserId};
pub use secret::{derive_zip5_hash, Zip5Hash, ZIP_PREFIX_LEN};
pub use user::User;
