//! Draft field predicates and the first-missing-field ladder.

use exotic_shared::types::TokenAmount;

use super::draft::MarketDraft;
use super::types::{MarketType, MissingField};
use crate::rules::{Rule, first_match};

/// Which draft fields have been filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldStatus {
    /// Market type the ticket price requirement depends on.
    pub market_type: MarketType,
    /// Question is non-blank.
    pub question_entered: bool,
    /// Data source is non-blank.
    pub data_source_entered: bool,
    /// Ticket price is positive, or the market is open-bid.
    pub ticket_price_entered: bool,
    /// Every position is non-blank.
    pub positions_entered: bool,
    /// At least one tag is selected.
    pub tags_entered: bool,
}

/// Missing fields in the order they are reported.
const MISSING_FIELD_RULES: [Rule<FieldStatus, MissingField>; 5] = [
    Rule::new("question", |s| !s.question_entered, |_| MissingField::Question),
    Rule::new(
        "data-source",
        |s| !s.data_source_entered,
        |_| MissingField::DataSource,
    ),
    Rule::new("positions", |s| !s.positions_entered, |_| MissingField::Positions),
    Rule::new(
        "ticket-price",
        |s| s.market_type == MarketType::Ticket && !s.ticket_price_entered,
        |_| MissingField::TicketPrice,
    ),
    Rule::new("tags", |s| !s.tags_entered, |_| MissingField::Tags),
];

impl FieldStatus {
    /// Evaluates every field predicate on `draft`.
    #[must_use]
    pub fn of(draft: &MarketDraft) -> Self {
        let market_type = draft.market_type();
        Self {
            market_type,
            question_entered: !draft.question().trim().is_empty(),
            data_source_entered: !draft.data_source().trim().is_empty(),
            ticket_price_entered: match market_type {
                MarketType::Ticket => draft
                    .ticket_price()
                    .is_some_and(|price| price > TokenAmount::ZERO),
                MarketType::OpenBid => true,
            },
            positions_entered: draft.positions().iter().all(|p| !p.trim().is_empty()),
            tags_entered: !draft.tags().is_empty(),
        }
    }

    /// Returns true if every field has been filled in.
    #[must_use]
    pub fn all_entered(&self) -> bool {
        self.question_entered
            && self.data_source_entered
            && self.ticket_price_entered
            && self.positions_entered
            && self.tags_entered
    }

    /// The first field still missing, if any.
    #[must_use]
    pub fn first_missing(&self) -> Option<MissingField> {
        first_match(self, &MISSING_FIELD_RULES)
    }
}

/// Returns true if `balance` cannot cover `bond`.
///
/// A zero balance is insufficient even when the bond is zero.
#[must_use]
pub fn insufficient_balance(balance: TokenAmount, bond: TokenAmount) -> bool {
    balance < bond || balance.is_zero()
}
