//! API handlers.

pub mod cards;
pub mod health;
