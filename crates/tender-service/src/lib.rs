//! Tender payment drivers.
//!
//! This crate provides the pluggable payment layer of tender:
//!
//! - A [`DriverRegistry`] mapping names to payment drivers
//! - The [`Conn`] a driver opens, which binds users to remote customers,
//!   onboards cards, charges them and deletes them
//! - The `stripe` driver, built on [`StripeClient`]
//! - The card HTTP routes a driver installs when opened
//!
//! # Card data
//!
//! Card numbers never reach this process. Clients tokenize cards with the
//! payment service's browser library and submit only the token plus display
//! metadata; the postal code is kept as a salted one-way hash of its prefix.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handler is async for axum

pub mod backend;
pub mod config;
pub mod conn;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stripe;

pub use backend::{BackendError, BackendResult, PaymentBackend};
pub use config::ServiceConfig;
pub use conn::BackendConn;
pub use driver::{Conn, Driver, DriverConfig, DriverRegistry};
pub use error::{ApiError, ApiResult};
pub use routes::{create_router, RouteInstaller};
pub use state::CardState;
pub use stripe::{StripeClient, StripeDriver, StripeError};
