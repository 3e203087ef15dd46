//! Property-based tests for DisputeVotingMachine.
//!
//! Covers the disabled winning position, the submit control ladder and
//! the confirmed vote after a successful submission.

use std::sync::Arc;

use exotic_shared::types::Address;
use proptest::prelude::*;

use super::machine::DisputeVotingMachine;
use super::types::{DisputeInfo, DisputeVotingOption, VoteAction};
use crate::ledger::{ConfirmedVote, InMemoryLedger, MarketsParameters};
use crate::notify::RecordingNotifier;
use crate::session::SessionContext;

const MEMBER: Address = Address::from_low_byte(0xc1);

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn positions(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Position {i}")).collect()
}

fn machine(
    count: usize,
    winning: i32,
    confirmed: ConfirmedVote,
    member: bool,
) -> DisputeVotingMachine {
    let dispute = DisputeInfo {
        market: Address::from_low_byte(0xee),
        dispute_number: 1,
        is_in_positioning_phase: false,
    };
    DisputeVotingMachine::new(
        dispute,
        &positions(count),
        winning,
        confirmed,
        Arc::new(RecordingNotifier::new()),
    )
    .with_council_member(member)
}

fn arb_resolved_option() -> impl Strategy<Value = DisputeVotingOption> {
    prop_oneof![
        Just(DisputeVotingOption::AcceptResult),
        Just(DisputeVotingOption::AcceptReset),
        Just(DisputeVotingOption::RefuseMature),
    ]
}

proptest! {
    /// The candidate carrying the winning position is disabled and cannot
    /// be selected; every other candidate can.
    #[test]
    fn prop_winning_position_disabled(count in 2usize..10, winning in 1i32..10) {
        prop_assume!(usize::try_from(winning).unwrap() <= count);
        let machine = machine(count, winning, ConfirmedVote::NONE, true);
        machine.select_vote(DisputeVotingOption::AcceptResult).unwrap();

        prop_assert_eq!(machine.candidates().len(), count + 1);
        for candidate in machine.candidates() {
            prop_assert_eq!(candidate.disabled, candidate.value == winning);
            prop_assert_eq!(machine.select_position(candidate.value).is_ok(), !candidate.disabled);
        }
        prop_assert!(machine.selectable_positions().iter().all(|c| c.value != winning));
    }

    /// Without a selected vote the control always asks for one.
    #[test]
    fn prop_no_vote_asks_for_vote(vote in -1i32..=0, position in -1i32..5) {
        let machine = machine(3, 1, ConfirmedVote { vote, position }, true);
        prop_assert_eq!(machine.action(), Some(VoteAction::SelectVote));
    }

    /// Accepting a result without an outcome always asks for the outcome.
    #[test]
    fn prop_accept_result_asks_for_outcome(confirmed_vote in -1i32..=6) {
        let machine = machine(3, 1, ConfirmedVote { vote: confirmed_vote, position: -1 }, true);
        machine.select_vote(DisputeVotingOption::AcceptResult).unwrap();
        prop_assert_eq!(machine.action(), Some(VoteAction::SelectOutcome));
    }

    /// A selection equal to the recorded vote renders no control.
    #[test]
    fn prop_unchanged_renders_nothing(option in arb_resolved_option(), position in 0i32..3) {
        let position = if option == DisputeVotingOption::AcceptResult { position } else { 0 };
        let confirmed = ConfirmedVote { vote: option.code(), position };
        let machine = machine(2, 1, confirmed, true);
        prop_assert_eq!(machine.action(), None);
    }

    /// Non-members never get a control.
    #[test]
    fn prop_non_member_renders_nothing(option in arb_resolved_option()) {
        let machine = machine(3, 1, ConfirmedVote::NONE, false);
        machine.select_vote(option).unwrap();
        prop_assert_eq!(machine.action(), None);
    }

    /// After a confirmed vote the recorded vote equals what was sent and the
    /// control disappears.
    #[test]
    fn prop_confirmed_vote_matches_submission(
        option in arb_resolved_option(),
        pick in 0usize..3,
    ) {
        let (confirmed, state, action) = run(async {
            let ledger = InMemoryLedger::new(MarketsParameters::default(), 18);
            ledger.add_council_member(MEMBER);
            let machine = machine(2, 1, ConfirmedVote::NONE, true);
            machine.select_vote(option).unwrap();
            let enabled: Vec<i32> = machine.selectable_positions().iter().map(|c| c.value).collect();
            if !enabled.is_empty() {
                machine.select_position(enabled[pick % enabled.len()]).unwrap();
            }
            let confirmed = machine
                .submit(&SessionContext::connected(MEMBER, 10), &ledger)
                .await
                .unwrap();
            (confirmed, machine.state(), machine.action())
        });

        prop_assert_eq!(confirmed.vote, option.code());
        if option != DisputeVotingOption::AcceptResult {
            prop_assert_eq!(confirmed.position, 0);
        }
        prop_assert_eq!(state.confirmed(), confirmed);
        prop_assert!(!state.changed());
        prop_assert_eq!(action, None);
    }
}
