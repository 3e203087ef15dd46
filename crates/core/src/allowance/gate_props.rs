//! Property-based tests for the allowance gate.

use exotic_shared::types::{Address, TokenAmount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::gate::{Allowance, AllowanceGate};
use crate::ledger::{FaultPlan, InMemoryLedger, MarketsParameters};

const OWNER: Address = Address::from_low_byte(1);
const SPENDER: Address = Address::from_low_byte(0xb0);

/// Strategy for non-negative amounts with up to 6 decimals.
fn arb_amount() -> impl Strategy<Value = TokenAmount> {
    (0i64..1_000_000_000i64).prop_map(|n| TokenAmount::new(Decimal::new(n, 6)))
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// `authorized` holds iff current >= required, with no hidden history.
    #[test]
    fn prop_authorized_iff_current_covers_required(
        current in arb_amount(),
        required in arb_amount(),
    ) {
        let allowance = Allowance {
            owner: Some(OWNER),
            spender: SPENDER,
            required,
            current,
        };
        prop_assert_eq!(allowance.authorized(), current >= required);
    }

    /// After any sequence of refreshes the gate reflects only the last read.
    #[test]
    fn prop_refresh_depends_only_on_latest_inputs(
        steps in proptest::collection::vec((arb_amount(), arb_amount()), 1..6),
    ) {
        let ledger = InMemoryLedger::new(MarketsParameters::default(), 18);
        let gate = AllowanceGate::new(SPENDER, TokenAmount::ZERO);

        for (current, required) in &steps {
            ledger.set_allowance(OWNER, SPENDER, *current);
            run(gate.refresh(&ledger, OWNER, SPENDER, *required));
        }

        let (current, required) = steps[steps.len() - 1];
        prop_assert_eq!(gate.authorized(), current >= required);
        prop_assert_eq!(gate.snapshot().current, current);
    }

    /// Failed reads never change the snapshot.
    #[test]
    fn prop_failed_read_is_a_no_op(
        current in arb_amount(),
        required in arb_amount(),
        later in arb_amount(),
    ) {
        let ledger = InMemoryLedger::new(MarketsParameters::default(), 18);
        ledger.set_allowance(OWNER, SPENDER, current);
        let gate = AllowanceGate::new(SPENDER, TokenAmount::ZERO);
        run(gate.refresh(&ledger, OWNER, SPENDER, required));
        let before = gate.snapshot();

        ledger.set_faults(FaultPlan { fail_reads: true, ..FaultPlan::default() });
        run(gate.refresh(&ledger, OWNER, SPENDER, later));

        prop_assert_eq!(gate.snapshot(), before);
    }
}
