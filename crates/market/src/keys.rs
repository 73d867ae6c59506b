//! Key layout of the marketplace
//!
//! The whole layout lives here so the shape of the keyspace is visible in
//! one place:
//!
//! ```text
//! account:{account_id}     hash   field "funds" → integer units
//! inventory:{account_id}   set    item ids currently held
//! market:listings          sorted member "{item}:{seller}" → asking price
//! ```

use bazaar_core::{AccountId, ItemId, Key};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of the single market listing structure
pub const MARKET_KEY: &str = "market:listings";

/// Hash field holding an account's funds balance
pub const FUNDS_FIELD: &str = "funds";

/// Key of an account record
pub fn account(id: &AccountId) -> Key {
    Key::new(format!("account:{id}"))
}

/// Key of an account's inventory set
pub fn inventory(id: &AccountId) -> Key {
    Key::new(format!("inventory:{id}"))
}

/// Key of the market listing structure
pub fn market() -> Key {
    Key::new(MARKET_KEY)
}

/// Identity of one market offer: one item, by one seller
///
/// Encoded into the listing structure as the member `{item}:{seller}`.
/// Identifier validation forbids `:` inside ids, so the encoding is
/// unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listing {
    /// The item on offer
    pub item: ItemId,
    /// The account selling it
    pub seller: AccountId,
}

impl Listing {
    /// Create a listing identity
    pub fn new(item: ItemId, seller: AccountId) -> Self {
        Listing { item, seller }
    }

    /// The member string stored in the market structure
    pub fn member(&self) -> String {
        format!("{}:{}", self.item, self.seller)
    }

    /// Decode a member string back into a listing identity
    ///
    /// Returns None for members that do not parse as `{item}:{seller}` with
    /// both halves valid identifiers.
    pub fn parse_member(member: &str) -> Option<Listing> {
        let (item, seller) = member.split_once(':')?;
        Some(Listing {
            item: ItemId::new(item).ok()?,
            seller: AccountId::new(seller).ok()?,
        })
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item, self.seller)
    }
}
