//! Ledger configuration
//!
//! Per-operation deadline windows and the conflict backoff. Listing gets a
//! short window; purchasing a longer one, since it is the higher-value,
//! lower-frequency operation.

use bazaar_txn::Backoff;
use std::time::Duration;

/// Configuration for ledger operation deadlines and retry behavior
///
/// # Example
/// ```
/// use bazaar_market::MarketConfig;
/// use std::time::Duration;
///
/// let config = MarketConfig::default()
///     .with_purchase_window(Duration::from_secs(10));
/// assert_eq!(config.purchase_window, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketConfig {
    /// Deadline window for `list_item` and `delist_item`
    pub list_window: Duration,
    /// Deadline window for `purchase_item`
    pub purchase_window: Duration,
    /// Backoff applied between conflicting attempts
    pub backoff: Backoff,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            list_window: Duration::from_secs(5),
            purchase_window: Duration::from_secs(30),
            backoff: Backoff::default(),
        }
    }
}

impl MarketConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listing/delisting window
    pub fn with_list_window(mut self, window: Duration) -> Self {
        self.list_window = window;
        self
    }

    /// Set the purchase window
    pub fn with_purchase_window(mut self, window: Duration) -> Self {
        self.purchase_window = window;
        self
    }

    /// Set the conflict backoff
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_operation_profile() {
        let config = MarketConfig::default();
        // Listing is quick; purchasing gets the long window
        assert!(config.list_window < config.purchase_window);
        assert_eq!(config.list_window, Duration::from_secs(5));
        assert_eq!(config.purchase_window, Duration::from_secs(30));
    }

    #[test]
    fn builders_replace_fields() {
        let config = MarketConfig::new()
            .with_list_window(Duration::from_millis(100))
            .with_purchase_window(Duration::from_millis(200))
            .with_backoff(Backoff::none());
        assert_eq!(config.list_window, Duration::from_millis(100));
        assert_eq!(config.purchase_window, Duration::from_millis(200));
        assert_eq!(config.backoff, Backoff::none());
    }
}
