//! Core types for Bazaar
//!
//! This crate defines the foundational types used throughout the system:
//! - Key: string key addressing one entry in the store
//! - AccountId / ItemId: validated domain identifiers
//! - Value: scalar value enum for hash fields
//! - EntryKind: discriminates the container kinds the store holds
//! - Price: non-negative integer money amount
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry_kind;
pub mod error;
pub mod ids;
pub mod key;
pub mod money;
pub mod value;

// Re-export commonly used types
pub use entry_kind::EntryKind;
pub use error::{Error, Result};
pub use ids::{AccountId, IdError, ItemId};
pub use key::Key;
pub use money::Price;
pub use value::Value;
