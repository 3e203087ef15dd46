//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Network configuration.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Market creation parameters.
    #[serde(default)]
    pub markets: MarketsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Chain the session is connected to.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Symbol of the payment currency used for bonds and tickets.
    #[serde(default = "default_payment_currency")]
    pub payment_currency: String,
    /// Decimals of the payment currency's base unit.
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u32,
}

fn default_chain_id() -> u64 {
    10 // Optimism mainnet
}

fn default_payment_currency() -> String {
    "THALES".to_string()
}

fn default_currency_decimals() -> u32 {
    18
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            payment_currency: default_payment_currency(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

/// Market creation parameters.
///
/// On a live network these are read from the market manager contract;
/// the configured values are used by the simulator and as fallbacks.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsConfig {
    /// Bond a market creator must deposit.
    #[serde(default = "default_fixed_bond_amount")]
    pub fixed_bond_amount: Decimal,
    /// Minimum time between now and the end of positioning.
    #[serde(default = "default_minimum_positioning_duration")]
    pub minimum_positioning_duration_secs: u64,
    /// Default positioning window offered by a fresh draft.
    #[serde(default = "default_positioning_duration")]
    pub default_positioning_duration_secs: u64,
    /// Maximum number of tags per market.
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
    /// Maximum number of positions per market.
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
    /// Maximum characters for the question and data source fields.
    #[serde(default = "default_max_input_characters")]
    pub max_input_characters: usize,
}

fn default_fixed_bond_amount() -> Decimal {
    Decimal::from(100)
}

fn default_minimum_positioning_duration() -> u64 {
    28_800 // 8 hours
}

fn default_positioning_duration() -> u64 {
    604_800 // 7 days
}

fn default_max_tags() -> usize {
    5
}

fn default_max_positions() -> usize {
    10
}

fn default_max_input_characters() -> usize {
    1100
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            fixed_bond_amount: default_fixed_bond_amount(),
            minimum_positioning_duration_secs: default_minimum_positioning_duration(),
            default_positioning_duration_secs: default_positioning_duration(),
            max_tags: default_max_tags(),
            max_positions: default_max_positions(),
            max_input_characters: default_max_input_characters(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("EXOTIC").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
