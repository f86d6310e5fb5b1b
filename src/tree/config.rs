//! Configuration types for the path walker

use clap::ValueEnum;

/// How the walker treats keys that arrive out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OrderCheck {
    /// Fail the run on the first key sorting before its predecessor
    #[default]
    Strict,
    /// Log a warning and keep going
    Warn,
    /// Assume the listing is sorted and never compare keys
    Trust,
}

/// Configuration for path walking behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    pub order_check: OrderCheck,
}
