//! Domain identifiers
//!
//! `AccountId` and `ItemId` are validated string newtypes. Identifiers are
//! supplied by callers (account creation is external to this system), so the
//! constructors reject the characters that would make composite listing
//! members ambiguous.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Maximum identifier length in bytes
pub const MAX_ID_LENGTH: usize = 128;

/// Error returned when an identifier fails validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    /// Identifier was empty
    #[error("identifier is empty")]
    Empty,

    /// Identifier exceeds [`MAX_ID_LENGTH`]
    #[error("identifier is {0} bytes, limit is {MAX_ID_LENGTH}")]
    TooLong(usize),

    /// Identifier contains a character that is not allowed
    ///
    /// `:` separates the item and seller halves of a listing member, and
    /// whitespace/control characters have no place in a key.
    #[error("identifier contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

fn validate(s: &str) -> std::result::Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.len() > MAX_ID_LENGTH {
        return Err(IdError::TooLong(s.len()));
    }
    if let Some(c) = s.chars().find(|c| *c == ':' || c.is_whitespace() || c.is_control()) {
        return Err(IdError::ForbiddenChar(c));
    }
    Ok(())
}

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $random_prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from a caller-supplied string
            ///
            /// # Errors
            /// Returns an [`IdError`] if the string is empty, too long, or
            /// contains `:`, whitespace, or control characters.
            pub fn new(id: impl Into<String>) -> std::result::Result<Self, IdError> {
                let id = id.into();
                validate(&id)?;
                Ok(Self(id))
            }

            /// Generate a fresh random identifier (UUID v4)
            pub fn random() -> Self {
                Self(format!(concat!($random_prefix, "-{}"), Uuid::new_v4()))
            }

            /// View the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(s: String) -> std::result::Result<Self, IdError> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

id_type!(
    /// Identifier of one account
    AccountId,
    "acct"
);

id_type!(
    /// Identifier of one tradable item
    ItemId,
    "item"
);
