//! Market domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How participants take positions in a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketType {
    /// Fixed ticket price per position.
    #[default]
    Ticket,
    /// Participants bid any amount.
    OpenBid,
}

impl MarketType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ticket => "TICKET",
            Self::OpenBid => "OPEN_BID",
        }
    }

    /// The other market type.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ticket => Self::OpenBid,
            Self::OpenBid => Self::Ticket,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A market tag as published by the tags registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// On-chain tag identifier.
    pub id: u64,
    /// Display label.
    pub label: String,
}

impl Tag {
    /// Creates a tag.
    #[must_use]
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A tag offered for selection. Tags already on the draft are disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSuggestion {
    /// The tag.
    pub tag: Tag,
    /// True while the tag is on the draft.
    pub disabled: bool,
}

/// A draft field that still needs input, in the order it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingField {
    /// Question is blank.
    Question,
    /// Data source is blank.
    DataSource,
    /// At least one position is blank.
    Positions,
    /// Ticket market without a positive ticket price.
    TicketPrice,
    /// No tag selected.
    Tags,
}

impl MissingField {
    /// Translation key of the prompt asking for the field.
    #[must_use]
    pub const fn label_key(&self) -> &'static str {
        match self {
            Self::Question => "common.errors.enter-question",
            Self::DataSource => "common.errors.enter-data-source",
            Self::Positions => "common.errors.enter-positions",
            Self::TicketPrice => "common.errors.enter-ticket-price",
            Self::Tags => "common.errors.enter-tags",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label_key())
    }
}

/// Position labels of a created market.
///
/// On-chain position indices are 1-based; 0 is reserved for "cancel".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketPositions(pub Vec<String>);

impl MarketPositions {
    /// Label of the position at on-chain index `index`.
    #[must_use]
    pub fn label_for(&self, index: u64) -> Option<&str> {
        let offset = usize::try_from(index.checked_sub(1)?).ok()?;
        self.0.get(offset).map(String::as_str)
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the market has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
