//! Identifier types for tender.
//!
//! Local identities (`UserId`, `CardId`) are database integer keys. Remote
//! identities (`RemoteCustomerId`, `SourceRef`) are opaque strings issued by
//! the payment backend. Keeping them as distinct newtypes means a local id can
//! never be passed where a backend reference is expected.
//!
//! # Macro-based ID Types
//!
//! The `int_id_type!` and `remote_id_type!` macros reduce boilerplate and keep
//! serialization, parsing and display consistent across identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define an integer-keyed local identifier.
///
/// Generates a newtype wrapper around `i64` with:
/// - `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (as a bare number)
/// - `FromStr`, `Display`, `Debug`
macro_rules! int_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database key.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Return the raw database key.
            #[must_use]
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| IdError::InvalidInteger(s.to_string()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

/// Macro to define an opaque backend-issued reference.
///
/// Generates a newtype wrapper around `String` that refuses empty values when
/// parsed or deserialized.
macro_rules! remote_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a backend-issued value.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Empty` if the value is blank.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(IdError::Empty(stringify!($name)));
                }
                Ok(Self(value))
            }

            /// Borrow the raw value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

int_id_type!(UserId, "A local user identifier.\n\nUsers are owned by the host application; tender only reads them and writes their remote customer binding.");
int_id_type!(CardId, "A local card record identifier, assigned by the storage layer on insert.");

remote_id_type!(RemoteCustomerId, "A customer identifier issued by the payment backend (e.g. `cus_...`).");
remote_id_type!(SourceRef, "A chargeable card source reference issued by the payment backend (e.g. `card_...`).\n\nThis is what a `CardRecord` stores instead of any card number.");

/// A single-use token produced client-side by the payment backend's JS SDK.
///
/// The token stands in for the card number, which never reaches this server.
/// It is consumed once when the card is registered with the backend and is
/// not persisted. `Debug` output is redacted so it cannot end up in logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ServiceToken(String);

impl ServiceToken {
    /// Wrap a client-supplied token.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` if the token is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdError::Empty("ServiceToken"));
        }
        Ok(Self(value))
    }

    /// Expose the raw token for the single outbound call that consumes it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceToken(<redacted>)")
    }
}

impl TryFrom<String> for ServiceToken {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid integer key.
    #[error("invalid integer identifier: {0}")]
    InvalidInteger(String),

    /// A backend reference was blank.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}
