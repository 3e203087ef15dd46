//! Property-based tests for draft validation.
//!
//! The missing-field ladder always reports the first blank field in the
//! fixed order question, data source, positions, ticket price, tags.

use chrono::Utc;
use exotic_shared::types::TokenAmount;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::draft::MarketDraft;
use super::types::{MarketType, MissingField, Tag};
use super::validation::FieldStatus;
use crate::ledger::MarketsParameters;

/// Which fields a generated draft fills in.
#[derive(Debug, Clone, Copy)]
struct Filled {
    question: bool,
    data_source: bool,
    positions: bool,
    ticket_price: bool,
    tags: bool,
    open_bid: bool,
}

fn arb_filled() -> impl Strategy<Value = Filled> {
    (any::<[bool; 5]>(), any::<bool>()).prop_map(|(f, open_bid)| Filled {
        question: f[0],
        data_source: f[1],
        positions: f[2],
        ticket_price: f[3],
        tags: f[4],
        open_bid,
    })
}

/// Strategy for text that is blank after trimming.
fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

/// Strategy for text with at least one visible character.
fn arb_text() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9?]{1,16}[ ]{0,2}"
}

fn build(filled: Filled, text: &str, blank: &str, price_cents: i64) -> MarketDraft {
    let mut draft = MarketDraft::new(
        &MarketsParameters::default(),
        Utc::now(),
        vec![Tag::new(1, "Sports")],
    );
    let pick = |entered: bool| if entered { text } else { blank };
    draft.set_question(pick(filled.question));
    draft.set_data_source(pick(filled.data_source));
    draft.set_position(0, text).expect("position 0");
    draft.set_position(1, pick(filled.positions)).expect("position 1");
    if filled.ticket_price {
        draft
            .set_ticket_price(TokenAmount::new(Decimal::new(price_cents, 2)))
            .expect("non-negative price");
    }
    if filled.tags {
        draft.add_tag(1).expect("known tag");
    }
    if filled.open_bid {
        draft.set_market_type(MarketType::OpenBid);
    }
    draft
}

fn expected_first_missing(filled: Filled) -> Option<MissingField> {
    [
        (filled.question, MissingField::Question),
        (filled.data_source, MissingField::DataSource),
        (filled.positions, MissingField::Positions),
        (filled.ticket_price || filled.open_bid, MissingField::TicketPrice),
        (filled.tags, MissingField::Tags),
    ]
    .into_iter()
    .find(|(entered, _)| !entered)
    .map(|(_, field)| field)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The first blank field in the fixed order is reported.
    #[test]
    fn prop_first_missing_follows_fixed_order(
        filled in arb_filled(),
        text in arb_text(),
        blank in arb_blank(),
        price_cents in 1i64..1_000_000i64,
    ) {
        let draft = build(filled, &text, &blank, price_cents);
        let status = FieldStatus::of(&draft);

        prop_assert_eq!(status.first_missing(), expected_first_missing(filled));
        prop_assert_eq!(status.all_entered(), status.first_missing().is_none());
    }

    /// Open-bid markets never ask for a ticket price.
    #[test]
    fn prop_open_bid_never_missing_ticket_price(
        filled in arb_filled(),
        text in arb_text(),
        blank in arb_blank(),
    ) {
        let draft = build(Filled { open_bid: true, ..filled }, &text, &blank, 100);
        let status = FieldStatus::of(&draft);

        prop_assert!(status.ticket_price_entered);
        prop_assert_ne!(status.first_missing(), Some(MissingField::TicketPrice));
    }
}
