//! Property-based tests for MarketCreationFlow.
//!
//! Covers the submit action ladder's precedence and the consistency of
//! the submitted creation call with the draft.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use exotic_shared::types::{Address, TokenAmount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::draft::MarketDraft;
use super::flow::{CreateMarketAction, MarketCreationFlow};
use super::types::{MarketType, Tag};
use crate::allowance::ApprovalLocks;
use crate::ledger::{InMemoryLedger, LedgerWriter, MarketsParameters, Submission};
use crate::notify::{RecordingNavigator, RecordingNotifier};
use crate::session::SessionContext;

const CREATOR: Address = Address::from_low_byte(7);

fn available_tags() -> Vec<Tag> {
    (1..=8).map(|id| Tag::new(id, format!("tag-{id}"))).collect()
}

/// A draft that satisfies every field predicate.
#[derive(Debug, Clone)]
struct CompleteDraft {
    question: String,
    data_source: String,
    positions: Vec<String>,
    open_bid: bool,
    price_cents: i64,
    tag_picks: Vec<u64>,
    withdrawal_allowed: bool,
    end_offset_hours: i64,
}

fn arb_complete_draft() -> impl Strategy<Value = CompleteDraft> {
    (
        "[a-zA-Z?]{1,40}",
        "[a-z.]{1,20}",
        proptest::collection::vec("[a-zA-Z]{1,12}", 2..=10),
        any::<bool>(),
        1i64..10_000_000i64,
        proptest::collection::vec(1u64..=8, 1..12),
        any::<bool>(),
        -48i64..24 * 60,
    )
        .prop_map(
            |(
                question,
                data_source,
                positions,
                open_bid,
                price_cents,
                tag_picks,
                withdrawal_allowed,
                end_offset_hours,
            )| CompleteDraft {
                question,
                data_source,
                positions,
                open_bid,
                price_cents,
                tag_picks,
                withdrawal_allowed,
                end_offset_hours,
            },
        )
}

impl CompleteDraft {
    /// Builds the draft; returns it with the distinct tags actually added.
    fn build(&self, params: &MarketsParameters) -> (MarketDraft, Vec<u64>) {
        let now = Utc::now();
        let mut draft = MarketDraft::new(params, now, available_tags());
        draft.set_question(&self.question);
        draft.set_data_source(&self.data_source);
        while draft.positions().len() < self.positions.len() {
            draft.add_position().expect("within max positions");
        }
        for (i, text) in self.positions.iter().enumerate() {
            draft.set_position(i, text).expect("position in range");
        }
        draft
            .set_ticket_price(TokenAmount::new(Decimal::new(self.price_cents, 2)))
            .expect("non-negative price");
        if self.open_bid {
            draft.toggle_market_type();
        }
        if !self.withdrawal_allowed {
            draft.toggle_withdrawal();
        }

        let mut added = Vec::new();
        for id in &self.tag_picks {
            if draft.add_tag(*id).is_ok() && !added.contains(id) {
                added.push(*id);
            }
        }
        draft.set_positioning_end(now + chrono::Duration::hours(self.end_offset_hours));
        (draft, added)
    }
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn flow_for(ledger: &InMemoryLedger, draft: MarketDraft) -> MarketCreationFlow {
    MarketCreationFlow::new(
        MarketsParameters::default(),
        ledger.bonds_spender(),
        18,
        ApprovalLocks::new(),
        Arc::new(RecordingNotifier::new()),
        Arc::new(RecordingNavigator::new()),
    )
    .with_draft(draft)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Without a signer the action is "connect wallet" whatever else holds.
    #[test]
    fn prop_no_signer_always_connect_wallet(
        input in arb_complete_draft(),
        balance_units in 0i64..1_000i64,
        blank_question in any::<bool>(),
    ) {
        let params = MarketsParameters::default();
        let (mut draft, _) = input.build(&params);
        if blank_question {
            draft.set_question("");
        }
        let ledger = InMemoryLedger::new(params, 18);
        ledger.set_balance(CREATOR, TokenAmount::new(Decimal::from(balance_units)));
        let flow = flow_for(&ledger, draft);
        run(flow.refresh(&ledger, &SessionContext::connected(CREATOR, 10)));

        prop_assert_eq!(
            flow.action(&SessionContext::disconnected(10)),
            CreateMarketAction::ConnectWallet
        );
    }

    /// A complete, authorized, funded draft submits a call consistent
    /// with the draft.
    #[test]
    fn prop_submitted_call_matches_draft(input in arb_complete_draft()) {
        let params = MarketsParameters::default();
        let (draft, distinct_tags) = input.build(&params);
        let ledger = InMemoryLedger::new(params.clone(), 18);
        ledger.set_balance(CREATOR, TokenAmount::new(Decimal::from(1_000)));
        ledger.set_allowance(CREATOR, ledger.bonds_spender(), params.fixed_bond_amount);
        let flow = flow_for(&ledger, draft.clone());
        let session = SessionContext::connected(CREATOR, 10);

        run(flow.refresh(&ledger, &session));
        prop_assert_eq!(
            flow.action(&session),
            CreateMarketAction::CreateMarket { in_progress: false }
        );
        let market = run(flow.submit(&session, &ledger));
        prop_assert!(market.is_ok());

        let submissions = ledger.submissions();
        prop_assert_eq!(submissions.len(), 1);
        let Submission::CreateMarket { signer, call } = &submissions[0] else {
            return Err(TestCaseError::fail("expected a create-market submission"));
        };
        prop_assert_eq!(*signer, CREATOR);
        prop_assert_eq!(call.ticket_price == 0, draft.market_type() == MarketType::OpenBid);
        prop_assert_eq!(&call.tags, &distinct_tags);
        prop_assert_eq!(call.tags.iter().collect::<HashSet<_>>().len(), call.tags.len());
        prop_assert_eq!(call.position_count, call.positions.len());
        prop_assert_eq!(&call.positions, &input.positions);
        prop_assert_eq!(call.end_of_positioning, draft.positioning_end().timestamp());
        prop_assert_eq!(call.withdrawal_allowed, input.withdrawal_allowed);
    }
}
