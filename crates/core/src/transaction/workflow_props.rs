//! Property-based tests for TransactionWorkflow.
//!
//! Whatever the ledger does, a settled workflow is idle again and shows
//! exactly one notification per accepted submission.

use std::sync::Arc;

use exotic_shared::types::{Address, TxHash};
use proptest::prelude::*;

use super::error::TransactionError;
use super::types::{TxKind, TxStatus};
use super::workflow::TransactionWorkflow;
use crate::ledger::{LedgerError, LedgerEvent, Receipt, TxHandle};
use crate::notify::{NotificationKind, RecordingNotifier};
use crate::session::SessionContext;

/// Simulated ledger behavior for one submission.
#[derive(Debug, Clone, Copy)]
enum Outcome {
    Confirm { with_events: bool },
    RejectSubmission,
    Revert,
    FailReceipt,
    EmptyReceipt,
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        any::<bool>().prop_map(|with_events| Outcome::Confirm { with_events }),
        Just(Outcome::RejectSubmission),
        Just(Outcome::Revert),
        Just(Outcome::FailReceipt),
        Just(Outcome::EmptyReceipt),
    ]
}

fn arb_kind() -> impl Strategy<Value = TxKind> {
    prop_oneof![
        Just(TxKind::Approve),
        Just(TxKind::CreateMarket),
        Just(TxKind::CastVote),
    ]
}

async fn build(outcome: Outcome) -> Result<TxHandle, LedgerError> {
    let hash = TxHash("0x01".into());
    let receipt = match outcome {
        Outcome::RejectSubmission => return Err(LedgerError::rejected("denied")),
        Outcome::Confirm { with_events } => Ok(Receipt {
            transaction_hash: Some(hash.clone()),
            reverted: false,
            events: if with_events {
                vec![LedgerEvent::new("Approval", serde_json::json!({}))]
            } else {
                Vec::new()
            },
        }),
        Outcome::Revert => Ok(Receipt {
            transaction_hash: Some(hash.clone()),
            reverted: true,
            events: Vec::new(),
        }),
        Outcome::FailReceipt => Err(LedgerError::reverted("out of gas")),
        Outcome::EmptyReceipt => Ok(Receipt::default()),
    };
    Ok(TxHandle::new(hash, async move { receipt }))
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Busy is cleared and every submission's notification is settled.
    #[test]
    fn prop_busy_cleared_after_any_sequence(
        kind in arb_kind(),
        outcomes in proptest::collection::vec(arb_outcome(), 1..8),
    ) {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(kind, notifier.clone());
        let session = SessionContext::connected(Address::from_low_byte(9), 10);

        for outcome in &outcomes {
            let outcome = *outcome;
            let result = run(workflow.submit(&session, move |_| build(outcome), |_| Ok(())));
            prop_assert!(!workflow.is_busy());

            let settled = workflow.last_settled().expect("settled record");
            match outcome {
                Outcome::Confirm { .. } => {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(settled.status, TxStatus::Confirmed);
                }
                _ => {
                    prop_assert!(matches!(
                        result,
                        Err(TransactionError::SubmissionRejected(_) | TransactionError::ConfirmationFailed(_))
                    ));
                    prop_assert_eq!(settled.status, TxStatus::Failed);
                }
            }
        }

        let notifications = notifier.notifications();
        prop_assert_eq!(notifications.len(), outcomes.len());
        for (notification, outcome) in notifications.iter().zip(&outcomes) {
            let expected = if matches!(outcome, Outcome::Confirm { .. }) {
                NotificationKind::Success
            } else {
                NotificationKind::Error
            };
            prop_assert_eq!(notification.kind, expected);
        }
    }

    /// Without a signer nothing is submitted, whatever the ledger would do.
    #[test]
    fn prop_no_signer_never_submits(kind in arb_kind(), outcome in arb_outcome()) {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(kind, notifier.clone());
        let session = SessionContext::disconnected(10);

        let result = run(workflow.submit(&session, move |_| build(outcome), |_| Ok(())));

        prop_assert!(result.as_ref().is_err_and(TransactionError::is_not_ready));
        prop_assert!(workflow.last_settled().is_none());
        prop_assert!(notifier.notifications().is_empty());
    }
}
