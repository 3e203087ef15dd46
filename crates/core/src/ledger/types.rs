//! Ledger call, receipt and event types.

use std::fmt;
use std::future::Future;

use exotic_shared::config::MarketsConfig;
use exotic_shared::types::{Address, TokenAmount, TxHash};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Name of the event the market manager emits for a new market.
pub const MARKET_CREATED_EVENT: &str = "MarketCreated";

/// Market creation parameters published by the market manager contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketsParameters {
    /// Bond a market creator must deposit.
    pub fixed_bond_amount: TokenAmount,
    /// Minimum time between now and the end of positioning.
    pub minimum_positioning_duration_secs: u64,
    /// Positioning window a fresh draft starts with.
    pub default_positioning_duration_secs: u64,
    /// Maximum number of tags per market.
    pub max_tags: usize,
    /// Maximum number of positions per market.
    pub max_positions: usize,
    /// Maximum characters for the question and data source.
    pub max_input_characters: usize,
}

impl From<&MarketsConfig> for MarketsParameters {
    fn from(config: &MarketsConfig) -> Self {
        Self {
            fixed_bond_amount: TokenAmount::new(config.fixed_bond_amount),
            minimum_positioning_duration_secs: config.minimum_positioning_duration_secs,
            default_positioning_duration_secs: config.default_positioning_duration_secs,
            max_tags: config.max_tags,
            max_positions: config.max_positions,
            max_input_characters: config.max_input_characters,
        }
    }
}

impl Default for MarketsParameters {
    fn default() -> Self {
        Self::from(&MarketsConfig::default())
    }
}

/// Arguments of the market manager's `createExoticMarket` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMarketCall {
    /// Market question.
    pub question: String,
    /// Where the result will be sourced from.
    pub data_source: String,
    /// End of positioning in epoch seconds.
    pub end_of_positioning: i64,
    /// Ticket price in base units (0 for open-bid markets).
    pub ticket_price: u128,
    /// Whether participants may withdraw before maturity.
    pub withdrawal_allowed: bool,
    /// Tag identifiers.
    pub tags: Vec<u64>,
    /// Number of positions.
    pub position_count: usize,
    /// Position phrases in order.
    pub positions: Vec<String>,
}

/// Arguments of the oracle council's `voteForDispute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCall {
    /// Disputed market.
    pub market: Address,
    /// Dispute number within the market.
    pub dispute_number: u64,
    /// Voting option code.
    pub vote: i32,
    /// Outcome position (0 unless the vote accepts a result).
    pub position: i32,
}

/// A council member's vote as recorded on the ledger.
///
/// `-1` in either field means nothing has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedVote {
    /// Recorded voting option code.
    pub vote: i32,
    /// Recorded outcome position.
    pub position: i32,
}

impl ConfirmedVote {
    /// No vote recorded.
    pub const NONE: Self = Self {
        vote: -1,
        position: -1,
    };
}

/// An event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Event name.
    pub name: String,
    /// Decoded event arguments, keyed by ABI parameter name.
    pub data: serde_json::Value,
}

impl LedgerEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Decodes the event arguments.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, LedgerError> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Arguments of the `MarketCreated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCreatedEvent {
    /// Address of the new market contract.
    pub market_address: Address,
    /// The market question.
    pub market_question: String,
    /// Creator of the market.
    pub market_owner: Address,
}

/// Confirmation data of an included transaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the transaction.
    pub transaction_hash: Option<TxHash>,
    /// True if execution reverted.
    pub reverted: bool,
    /// Emitted events in order.
    pub events: Vec<LedgerEvent>,
}

impl Receipt {
    /// Returns true if the receipt carries a success marker.
    ///
    /// A receipt confirms the transaction when it did not revert and has
    /// either a transaction hash or at least one event.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        !self.reverted && (self.transaction_hash.is_some() || !self.events.is_empty())
    }

    /// The last emitted event.
    #[must_use]
    pub fn last_event(&self) -> Option<&LedgerEvent> {
        self.events.last()
    }

    /// Decodes the `MarketCreated` event, expected to be the last one emitted.
    pub fn market_created(&self) -> Result<MarketCreatedEvent, LedgerError> {
        let event = self
            .last_event()
            .ok_or_else(|| LedgerError::Decode("receipt has no events".to_string()))?;
        if event.name != MARKET_CREATED_EVENT {
            return Err(LedgerError::Decode(format!(
                "last event is {}, expected {MARKET_CREATED_EVENT}",
                event.name
            )));
        }
        event.decode()
    }
}

/// A submitted transaction awaiting inclusion.
///
/// There is no way to cancel a submitted transaction; dropping the handle
/// only stops observing it.
pub struct TxHandle {
    hash: TxHash,
    receipt: BoxFuture<'static, Result<Receipt, LedgerError>>,
}

impl TxHandle {
    /// Creates a handle from the transaction hash and a receipt future.
    pub fn new<F>(hash: TxHash, receipt: F) -> Self
    where
        F: Future<Output = Result<Receipt, LedgerError>> + Send + 'static,
    {
        Self {
            hash,
            receipt: Box::pin(receipt),
        }
    }

    /// Hash of the submitted transaction.
    #[must_use]
    pub fn hash(&self) -> &TxHash {
        &self.hash
    }

    /// Waits until the transaction is included and returns its receipt.
    pub async fn await_receipt(self) -> Result<Receipt, LedgerError> {
        self.receipt.await
    }
}

impl fmt::Debug for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxHandle").field("hash", &self.hash).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn market_created(addr: Address) -> LedgerEvent {
        LedgerEvent::new(
            MARKET_CREATED_EVENT,
            json!({
                "marketAddress": addr.to_string(),
                "marketQuestion": "Will it rain?",
                "marketOwner": Address::from_low_byte(1).to_string(),
            }),
        )
    }

    #[test]
    fn test_receipt_success_marker() {
        let with_hash = Receipt {
            transaction_hash: Some(TxHash("0x01".into())),
            ..Receipt::default()
        };
        assert!(with_hash.is_confirmed());

        let with_events = Receipt {
            events: vec![LedgerEvent::new("Approval", json!({}))],
            ..Receipt::default()
        };
        assert!(with_events.is_confirmed());

        assert!(!Receipt::default().is_confirmed());

        let reverted = Receipt {
            reverted: true,
            ..with_hash
        };
        assert!(!reverted.is_confirmed());
    }

    #[test]
    fn test_market_created_uses_last_event() {
        let market = Address::from_low_byte(0xee);
        let receipt = Receipt {
            transaction_hash: Some(TxHash("0x02".into())),
            reverted: false,
            events: vec![LedgerEvent::new("Transfer", json!({})), market_created(market)],
        };
        let event = receipt.market_created().unwrap();
        assert_eq!(event.market_address, market);
        assert_eq!(event.market_question, "Will it rain?");
    }

    #[test]
    fn test_market_created_missing() {
        let receipt = Receipt {
            transaction_hash: Some(TxHash("0x03".into())),
            ..Receipt::default()
        };
        assert!(matches!(
            receipt.market_created(),
            Err(LedgerError::Decode(_))
        ));

        let wrong_last = Receipt {
            events: vec![LedgerEvent::new("Transfer", json!({}))],
            ..Receipt::default()
        };
        assert!(matches!(
            wrong_last.market_created(),
            Err(LedgerError::Decode(_))
        ));
    }

    #[test]
    fn test_markets_parameters_from_config() {
        let params = MarketsParameters::default();
        assert_eq!(params.max_tags, 5);
        assert_eq!(params.fixed_bond_amount, TokenAmount::new(100.into()));
    }

    #[tokio::test]
    async fn test_tx_handle_resolves_receipt() {
        let hash = TxHash("0x04".into());
        let handle = TxHandle::new(hash.clone(), async move {
            Ok(Receipt {
                transaction_hash: Some(TxHash("0x04".into())),
                ..Receipt::default()
            })
        });
        assert_eq!(handle.hash(), &hash);
        let receipt = handle.await_receipt().await.unwrap();
        assert!(receipt.is_confirmed());
    }
}
