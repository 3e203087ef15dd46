//! Transaction workflow domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use exotic_shared::types::{PendingTxId, TxHash};
use serde::{Deserialize, Serialize};

use crate::notify::Notice;

/// Kind of ledger write a workflow submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxKind {
    /// Allowance approval for the bonds contract.
    Approve,
    /// Market creation.
    CreateMarket,
    /// Dispute vote.
    CastVote,
}

impl TxKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::CreateMarket => "create-market",
            Self::CastVote => "cast-vote",
        }
    }

    /// Message shown when a transaction of this kind confirms.
    #[must_use]
    pub const fn success_notice(&self) -> Notice {
        match self {
            Self::Approve => Notice::ApproveSuccess,
            Self::CreateMarket => Notice::CreateMarketSuccess,
            Self::CastVote => Notice::VoteSuccess,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a pending transaction.
///
/// - Submitted → Confirmed (receipt carries a success marker)
/// - Submitted → Failed (rejected, reverted or unusable receipt)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Handed to the wallet, not yet settled.
    Submitted,
    /// Included with a success marker.
    Confirmed,
    /// Rejected or reverted.
    Failed,
}

impl TxStatus {
    /// Returns true once the transaction has settled.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

/// A transaction issued by a workflow and not yet settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Local identifier.
    pub id: PendingTxId,
    /// What is being submitted.
    pub kind: TxKind,
    /// Current status.
    pub status: TxStatus,
    /// When the workflow issued it.
    pub submitted_at: DateTime<Utc>,
    /// Hash, once the wallet has broadcast it.
    pub hash: Option<TxHash>,
}

impl PendingTransaction {
    /// Creates a freshly submitted transaction.
    #[must_use]
    pub fn submitted(kind: TxKind) -> Self {
        Self {
            id: PendingTxId::new(),
            kind,
            status: TxStatus::Submitted,
            submitted_at: Utc::now(),
            hash: None,
        }
    }
}
