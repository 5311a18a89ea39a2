//! Stripe integration.
//!
//! Stripe handles:
//! - Customer registration
//! - Card sources created from Stripe.js tokens
//! - Charges against a customer's card source
//!
//! The `stripe` driver wires a `StripeClient` into a generic backend conn.

pub mod client;
pub mod driver;
pub mod types;

pub use client::{StripeClient, StripeError};
pub use driver::StripeDriver;
pub use types::*;
