//! Transaction workflow: submit, await the receipt, react.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use exotic_shared::types::{Address, NotificationId, TxHash};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::error::{NotReadyReason, TransactionError};
use super::types::{PendingTransaction, TxKind, TxStatus};
use crate::ledger::{LedgerError, Receipt, TxHandle};
use crate::notify::{Notice, Notifier};
use crate::session::SessionContext;

type ReceiptWatcher = JoinHandle<Result<Receipt, LedgerError>>;

/// Runs one kind of ledger write for one call site.
///
/// The workflow is busy from the moment a submission passes its
/// preconditions until the transaction settles. A broadcast transaction
/// cannot be cancelled: if the caller drops the future after the wallet
/// returned a hash, the transaction stays live and a background task
/// settles it once its receipt arrives.
pub struct TransactionWorkflow {
    kind: TxKind,
    notifier: Arc<dyn Notifier>,
    slots: Arc<Slots>,
}

#[derive(Default)]
struct Slots {
    live: Mutex<Option<PendingTransaction>>,
    last_settled: Mutex<Option<PendingTransaction>>,
}

impl Slots {
    fn settle(&self, status: TxStatus) {
        let taken = lock(&self.live).take();
        if let Some(mut tx) = taken {
            tx.status = status;
            *lock(&self.last_settled) = Some(tx);
        }
    }
}

impl TransactionWorkflow {
    /// Creates an idle workflow.
    #[must_use]
    pub fn new(kind: TxKind, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            kind,
            notifier,
            slots: Arc::default(),
        }
    }

    /// The kind of transaction this workflow submits.
    #[must_use]
    pub fn kind(&self) -> TxKind {
        self.kind
    }

    /// Returns true while a transaction is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        lock(&self.slots.live).is_some()
    }

    /// The transaction currently in flight.
    #[must_use]
    pub fn pending(&self) -> Option<PendingTransaction> {
        lock(&self.slots.live).clone()
    }

    /// The most recently settled transaction.
    #[must_use]
    pub fn last_settled(&self) -> Option<PendingTransaction> {
        lock(&self.slots.last_settled).clone()
    }

    /// Submits a transaction and reacts to its receipt.
    ///
    /// `build` receives the signer and produces the transaction handle.
    /// `on_confirmed` extracts the domain result from a confirmed receipt.
    ///
    /// # Errors
    ///
    /// - `NotReady` if no signer is connected or a transaction is already
    ///   in flight. Nothing is submitted and no notification is shown.
    /// - `SubmissionRejected` / `ConfirmationFailed` if the transaction
    ///   fails. The pending notification turns into an error.
    /// - Whatever `on_confirmed` returns, after the success notification.
    pub async fn submit<B, Fut, H, T>(
        &self,
        session: &SessionContext,
        build: B,
        on_confirmed: H,
    ) -> Result<T, TransactionError>
    where
        B: FnOnce(Address) -> Fut,
        Fut: Future<Output = Result<TxHandle, LedgerError>>,
        H: FnOnce(&Receipt) -> Result<T, TransactionError>,
    {
        self.submit_holding(session, (), build, on_confirmed).await
    }

    /// Like [`Self::submit`], keeping `hold` alive until the transaction
    /// settles, even if the caller stops observing it.
    pub async fn submit_holding<K, B, Fut, H, T>(
        &self,
        session: &SessionContext,
        hold: K,
        build: B,
        on_confirmed: H,
    ) -> Result<T, TransactionError>
    where
        K: Send + 'static,
        B: FnOnce(Address) -> Fut,
        Fut: Future<Output = Result<TxHandle, LedgerError>>,
        H: FnOnce(&Receipt) -> Result<T, TransactionError>,
    {
        let Some(signer) = session.signer() else {
            debug!(tx_kind = %self.kind, "refused: no signer");
            return Err(self.not_ready(NotReadyReason::NoSigner));
        };
        let mut guard = self.begin(Box::new(hold))?;

        let notification = self.notifier.notify_pending(Notice::TransactionPending);
        guard.notification = Some(notification);
        info!(tx_kind = %self.kind, signer = %signer, "submitting transaction");

        match self.send_and_confirm(&mut guard, signer, build).await {
            Ok(receipt) => {
                guard.settle(TxStatus::Confirmed);
                self.notifier
                    .notify_success(notification, self.kind.success_notice());
                info!(
                    tx_kind = %self.kind,
                    tx_hash = ?receipt.transaction_hash,
                    "transaction confirmed"
                );
                let result = on_confirmed(&receipt);
                if let Err(e) = &result {
                    warn!(tx_kind = %self.kind, error = %e, "confirmed receipt not usable");
                }
                result
            }
            Err(e) => {
                guard.settle(TxStatus::Failed);
                self.notifier.notify_error(notification, Notice::UnknownError);
                error!(tx_kind = %self.kind, error = %e, "transaction failed");
                Err(e)
            }
        }
    }

    async fn send_and_confirm<B, Fut>(
        &self,
        guard: &mut BusyGuard<'_>,
        signer: Address,
        build: B,
    ) -> Result<Receipt, TransactionError>
    where
        B: FnOnce(Address) -> Fut,
        Fut: Future<Output = Result<TxHandle, LedgerError>>,
    {
        let handle = build(signer)
            .await
            .map_err(TransactionError::from_submission)?;
        guard.record_hash(handle.hash().clone());
        debug!(tx_kind = %self.kind, tx_hash = %handle.hash(), "awaiting receipt");

        let receipt = match Handle::try_current() {
            Ok(runtime) => {
                let (_, watcher) = guard
                    .watcher
                    .insert((runtime.clone(), runtime.spawn(handle.await_receipt())));
                let joined = watcher.await;
                guard.watcher = None;
                joined.unwrap_or_else(|e| {
                    Err(LedgerError::read(format!("receipt watcher stopped: {e}")))
                })
            }
            // Without a runtime the receipt can only be awaited inline.
            Err(_) => handle.await_receipt().await,
        }
        .map_err(TransactionError::from_confirmation)?;

        if receipt.is_confirmed() {
            Ok(receipt)
        } else {
            Err(TransactionError::ConfirmationFailed(format!(
                "receipt for {} carries no success marker",
                receipt
                    .transaction_hash
                    .as_ref()
                    .map_or_else(|| "unknown transaction".to_string(), ToString::to_string)
            )))
        }
    }

    /// Marks the workflow busy, refusing if it already is.
    fn begin(&self, hold: Box<dyn Send>) -> Result<BusyGuard<'_>, TransactionError> {
        let mut live = lock(&self.slots.live);
        if live.is_some() {
            debug!(tx_kind = %self.kind, "refused: already pending");
            return Err(self.not_ready(NotReadyReason::AlreadyPending));
        }
        *live = Some(PendingTransaction::submitted(self.kind));
        Ok(BusyGuard {
            workflow: self,
            status: TxStatus::Submitted,
            notification: None,
            watcher: None,
            hold: Some(hold),
        })
    }

    fn not_ready(&self, reason: NotReadyReason) -> TransactionError {
        TransactionError::NotReady {
            kind: self.kind,
            reason,
        }
    }
}

/// Settles the busy slot when dropped.
///
/// A guard dropped while its receipt watcher still runs hands the slot
/// over to a task that settles it when the receipt arrives.
struct BusyGuard<'a> {
    workflow: &'a TransactionWorkflow,
    status: TxStatus,
    notification: Option<NotificationId>,
    watcher: Option<(Handle, ReceiptWatcher)>,
    hold: Option<Box<dyn Send>>,
}

impl BusyGuard<'_> {
    fn record_hash(&self, hash: TxHash) {
        if let Some(tx) = lock(&self.workflow.slots.live).as_mut() {
            tx.hash = Some(hash);
        }
    }

    fn settle(&mut self, status: TxStatus) {
        self.status = status;
    }

    fn detach(&mut self, runtime: &Handle, watcher: ReceiptWatcher) {
        let kind = self.workflow.kind;
        let slots = Arc::clone(&self.workflow.slots);
        let notifier = Arc::clone(&self.workflow.notifier);
        let notification = self.notification;
        let hold = self.hold.take();
        warn!(tx_kind = %kind, "stopped observing transaction, keeping it live until it settles");

        runtime.spawn(async move {
            let confirmed = matches!(watcher.await, Ok(Ok(receipt)) if receipt.is_confirmed());
            let status = if confirmed {
                TxStatus::Confirmed
            } else {
                TxStatus::Failed
            };
            slots.settle(status);
            if let Some(id) = notification {
                if confirmed {
                    notifier.notify_success(id, kind.success_notice());
                } else {
                    notifier.notify_error(id, Notice::UnknownError);
                }
            }
            info!(tx_kind = %kind, status = ?status, "unobserved transaction settled");
            drop(hold);
        });
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if let Some((runtime, watcher)) = self.watcher.take() {
            if !self.status.is_settled() {
                self.detach(&runtime, watcher);
                return;
            }
        }
        if !self.status.is_settled() {
            // Dropped before the wallet returned a hash; nothing to watch.
            debug!(tx_kind = %self.workflow.kind, "submission abandoned before broadcast");
        }
        self.workflow.slots.settle(self.status);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerEvent;
    use crate::notify::{MockNotifier, NotificationKind, RecordingNotifier};
    use exotic_shared::types::NotificationId;

    fn session() -> SessionContext {
        SessionContext::connected(Address::from_low_byte(1), 10)
    }

    fn confirmed_handle() -> TxHandle {
        TxHandle::new(TxHash("0xaa".into()), async {
            Ok(Receipt {
                transaction_hash: Some(TxHash("0xaa".into())),
                reverted: false,
                events: vec![LedgerEvent::new("Approval", serde_json::json!({}))],
            })
        })
    }

    fn reverted_handle() -> TxHandle {
        TxHandle::new(TxHash("0xbb".into()), async {
            Ok(Receipt {
                transaction_hash: Some(TxHash("0xbb".into())),
                reverted: true,
                events: Vec::new(),
            })
        })
    }

    #[tokio::test]
    async fn test_confirmed_path() {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(TxKind::Approve, notifier.clone());

        let result = workflow
            .submit(
                &session(),
                |_| async { Ok(confirmed_handle()) },
                |receipt| Ok(receipt.events.len()),
            )
            .await;

        assert_eq!(result, Ok(1));
        assert!(!workflow.is_busy());
        let settled = workflow.last_settled().unwrap();
        assert_eq!(settled.status, TxStatus::Confirmed);
        assert_eq!(settled.hash, Some(TxHash("0xaa".into())));

        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);
        assert_eq!(notifications[0].notice, Notice::ApproveSuccess);
    }

    #[tokio::test]
    async fn test_rejected_submission() {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(TxKind::CreateMarket, notifier.clone());

        let result: Result<(), _> = workflow
            .submit(
                &session(),
                |_| async { Err(LedgerError::rejected("user denied")) },
                |_| Ok(()),
            )
            .await;

        assert!(matches!(result, Err(TransactionError::SubmissionRejected(_))));
        assert!(!workflow.is_busy());
        assert_eq!(workflow.last_settled().unwrap().status, TxStatus::Failed);
        assert_eq!(notifier.notifications()[0].kind, NotificationKind::Error);
        assert_eq!(notifier.notifications()[0].notice, Notice::UnknownError);
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(TxKind::CastVote, notifier.clone());
        let mut handler_called = false;

        let result = workflow
            .submit(
                &session(),
                |_| async { Ok(reverted_handle()) },
                |_| {
                    handler_called = true;
                    Ok(())
                },
            )
            .await;

        assert!(matches!(result, Err(TransactionError::ConfirmationFailed(_))));
        assert!(!handler_called);
        assert!(!workflow.is_busy());
        assert_eq!(notifier.notifications()[0].kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_no_signer_is_silent() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify_pending().never();
        notifier.expect_notify_error().never();
        let workflow = TransactionWorkflow::new(TxKind::Approve, Arc::new(notifier));
        let mut built = false;

        let result = workflow
            .submit(
                &SessionContext::disconnected(10),
                |_| {
                    built = true;
                    async { Ok(confirmed_handle()) }
                },
                |_| Ok(()),
            )
            .await;

        assert_eq!(
            result,
            Err(TransactionError::NotReady {
                kind: TxKind::Approve,
                reason: NotReadyReason::NoSigner,
            })
        );
        assert!(!built);
        assert!(!workflow.is_busy());
    }

    #[tokio::test]
    async fn test_reentrant_submit_refused_while_busy() {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(TxKind::CastVote, notifier.clone());
        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let session = session();

        let first = workflow.submit(
            &session,
            |_| async move {
                Ok(TxHandle::new(TxHash("0xcc".into()), async move {
                    let _ = wait.await;
                    Ok(Receipt {
                        transaction_hash: Some(TxHash("0xcc".into())),
                        ..Receipt::default()
                    })
                }))
            },
            |_| Ok("first"),
        );

        let second = async {
            tokio::task::yield_now().await;
            assert!(workflow.is_busy());
            assert_eq!(workflow.pending().unwrap().hash, Some(TxHash("0xcc".into())));
            let refused = workflow
                .submit(&session, |_| async { Ok(confirmed_handle()) }, |_| Ok("second"))
                .await;
            let _ = release.send(());
            refused
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first, Ok("first"));
        assert_eq!(
            second,
            Err(TransactionError::NotReady {
                kind: TxKind::CastVote,
                reason: NotReadyReason::AlreadyPending,
            })
        );
        assert!(!workflow.is_busy());
        assert_eq!(notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_handler_error_after_success_notification() {
        let mut notifier = MockNotifier::new();
        let id = NotificationId::new();
        notifier.expect_notify_pending().times(1).return_const(id);
        notifier
            .expect_notify_success()
            .withf(move |got, notice| *got == id && *notice == Notice::CreateMarketSuccess)
            .times(1)
            .return_const(());
        notifier.expect_notify_error().never();
        let workflow = TransactionWorkflow::new(TxKind::CreateMarket, Arc::new(notifier));

        let result: Result<(), _> = workflow
            .submit(
                &session(),
                |_| async { Ok(confirmed_handle()) },
                |_| Err(TransactionError::MalformedReceipt("no event".into())),
            )
            .await;

        assert!(matches!(result, Err(TransactionError::MalformedReceipt(_))));
        assert!(!workflow.is_busy());
    }

    #[tokio::test]
    async fn test_dropped_before_broadcast_clears_busy() {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(TxKind::Approve, notifier);
        let session = session();

        let never = workflow.submit(
            &session,
            |_| futures::future::pending::<Result<TxHandle, LedgerError>>(),
            |_| Ok(()),
        );
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(10), never).await;

        assert!(outcome.is_err());
        assert!(!workflow.is_busy());
        assert_eq!(workflow.last_settled().unwrap().status, TxStatus::Submitted);
    }

    #[tokio::test]
    async fn test_dropped_after_broadcast_stays_live_until_settled() {
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = TransactionWorkflow::new(TxKind::Approve, notifier.clone());
        let session = session();
        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let (held, dropped) = tokio::sync::oneshot::channel::<()>();

        let observed = workflow.submit_holding(
            &session,
            held,
            |_| async move {
                Ok(TxHandle::new(TxHash("0xdd".into()), async move {
                    let _ = wait.await;
                    Ok(Receipt {
                        transaction_hash: Some(TxHash("0xdd".into())),
                        ..Receipt::default()
                    })
                }))
            },
            |_| Ok(()),
        );
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(10), observed).await;
        assert!(outcome.is_err());

        assert!(workflow.is_busy());
        assert_eq!(workflow.pending().unwrap().hash, Some(TxHash("0xdd".into())));
        let mut built = false;
        let refused = workflow
            .submit(
                &session,
                |_| {
                    built = true;
                    async { Ok(confirmed_handle()) }
                },
                |_| Ok(()),
            )
            .await;
        assert_eq!(
            refused,
            Err(TransactionError::NotReady {
                kind: TxKind::Approve,
                reason: NotReadyReason::AlreadyPending,
            })
        );
        assert!(!built);

        let _ = release.send(());
        // The hold is released only once the transaction settles.
        assert!(dropped.await.is_err());
        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while workflow.is_busy() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let settled = workflow.last_settled().unwrap();
        assert_eq!(settled.status, TxStatus::Confirmed);
        assert_eq!(settled.hash, Some(TxHash("0xdd".into())));
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);
    }
}
