//! One run of an action handler.
//!
//! # Lifecycle
//!
//! ```text
//! running ──► success
//!    │
//!    └──────► error
//! ```
//!
//! Exactly one transition, never reversed. A handler that returns `Ok`
//! ends in `success`; one that returns `Err` or panics ends in `error`. The
//! underlying cause is logged, never handed back to the invoker.
//!
//! # Published snapshots
//!
//! Every change goes through the transaction's [`StateContainer`], so
//! observers see, in order:
//!
//! 1. `{running, request}` when the handler asks for input
//! 2. `{running, none}` the moment a valid response is accepted
//! 3. `{success | error, none}` when the handler finishes
//!
//! # Single flight
//!
//! At most one request is pending. Concurrent `io` calls from the same
//! handler queue behind each other, and a response that arrives while
//! nothing is pending is rejected, never buffered.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::context::{self, IoContext, IoHandler};
use crate::error::{IoError, TransactionError};
use crate::io::{IoMethod, IoValue};
use crate::rendezvous::IoRendezvous;
use crate::state::{lock, Snapshot, SnapshotStream, StateContainer, Subscription};

// =============================================================================
// Identity + State
// =============================================================================

/// Transaction identifier, unique within one manager, allocated from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Running,
    Success,
    Error,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Running)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Running => write!(f, "running"),
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Error => write!(f, "error"),
        }
    }
}

/// The value published by a transaction: `{status, pendingIORequest}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionState {
    pub status: TransactionStatus,
    #[serde(rename = "pendingIORequest")]
    pub pending_io_request: Option<IoMethod>,
}

impl TransactionState {
    pub fn running() -> Self {
        Self {
            status: TransactionStatus::Running,
            pending_io_request: None,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// One in-progress or completed invocation of an action.
pub struct Transaction {
    id: TransactionId,
    action_name: String,
    created_at: DateTime<Utc>,
    state: StateContainer<TransactionState>,
    /// Only locked inside a state patch, and never across notification.
    pending: Mutex<Option<Arc<IoRendezvous>>>,
}

impl Transaction {
    /// Create the transaction and start its handler on the tokio runtime.
    ///
    /// Returns immediately; the handler runs in the background.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(id: TransactionId, action_name: impl Into<String>, action: &Action) -> Arc<Self> {
        let transaction = Arc::new(Self {
            id,
            action_name: action_name.into(),
            created_at: Utc::now(),
            state: StateContainer::new(TransactionState::running()),
            pending: Mutex::new(None),
        });

        let io: Arc<dyn IoHandler> = Arc::new(TransactionIo {
            transaction: transaction.clone(),
            in_flight: tokio::sync::Mutex::new(()),
        });
        let io_context = IoContext::new(id, io);
        let run = action.run();

        info!(
            transaction_id = %id,
            action = %transaction.action_name,
            "transaction started"
        );

        let handle = transaction.clone();
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(context::scope(io_context, run))
                .catch_unwind()
                .await;
            handle.finish(outcome);
        });

        transaction
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current snapshot.
    pub fn state(&self) -> Snapshot<TransactionState> {
        self.state.get_state()
    }

    pub fn status(&self) -> TransactionStatus {
        self.state.get_state().value.status
    }

    /// The outstanding request descriptor, if any.
    pub fn pending_io_request(&self) -> Option<IoMethod> {
        self.state.get_state().value.pending_io_request
    }

    /// Push channel: current snapshot, then one per change.
    pub fn watch(&self) -> SnapshotStream<TransactionState> {
        self.state.watch()
    }

    /// Register a callback for every future change.
    ///
    /// Callbacks may read the transaction. Answering a request from inside
    /// a callback deadlocks; spawn the call to
    /// [`respond_to_io_request`](Transaction::respond_to_io_request) instead.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot<TransactionState>) + Send + Sync + 'static,
    {
        self.state.subscribe(callback)
    }

    /// Hand a response body to the pending request.
    ///
    /// - No pending request: [`TransactionError::NoPendingRequest`].
    /// - Invalid body: [`TransactionError::Validation`]; the request stays
    ///   pending and the handler stays suspended.
    /// - Valid body: the request is cleared, then the handler resumes.
    ///
    /// Never changes the status.
    pub fn respond_to_io_request(&self, body: &Value) -> Result<(), TransactionError> {
        let rendezvous = lock(&self.pending)
            .clone()
            .ok_or(TransactionError::NoPendingRequest(self.id))?;
        let method = rendezvous.method().method_name();

        let value = rendezvous.method().parse_response(body).map_err(|failure| {
            debug!(
                transaction_id = %self.id,
                method,
                error = %failure,
                "IO response rejected"
            );
            TransactionError::Validation(failure)
        })?;

        // A concurrent response or the end of the run may have taken it
        let cleared = self.state.patch_state_if(|s| {
            let mut pending = lock(&self.pending);
            if !is_same_request(&pending, &rendezvous) {
                return false;
            }
            pending.take();
            s.pending_io_request = None;
            true
        });
        if cleared.is_none() {
            return Err(TransactionError::NoPendingRequest(self.id));
        }

        if rendezvous.resolve(value).is_err() {
            debug!(transaction_id = %self.id, method, "IO caller went away before the response");
            return Err(TransactionError::NoPendingRequest(self.id));
        }

        info!(transaction_id = %self.id, method, "IO response accepted");
        Ok(())
    }

    /// Park `rendezvous` as the pending request and publish it.
    fn begin_io_request(&self, rendezvous: Arc<IoRendezvous>) -> Result<(), IoError> {
        let method = rendezvous.method().clone();

        let published = self.state.patch_state_if(|s| {
            if s.status.is_terminal() {
                return false;
            }
            *lock(&self.pending) = Some(rendezvous);
            s.pending_io_request = Some(method.clone());
            true
        });

        if published.is_none() {
            warn!(
                transaction_id = %self.id,
                method = method.method_name(),
                "IO request issued after the transaction finished"
            );
            return Err(IoError::Abandoned {
                method_name: method.method_name(),
            });
        }

        info!(
            transaction_id = %self.id,
            method = method.method_name(),
            label = method.label(),
            "IO request issued"
        );
        Ok(())
    }

    /// Clear `rendezvous` if it is still the pending request.
    fn abandon_io_request(&self, rendezvous: &Arc<IoRendezvous>) {
        let cleared = self.state.patch_state_if(|s| {
            let mut pending = lock(&self.pending);
            if !is_same_request(&pending, rendezvous) {
                return false;
            }
            pending.take();
            s.pending_io_request = None;
            true
        });

        if cleared.is_some() {
            debug!(transaction_id = %self.id, "IO request abandoned by handler");
        }
    }

    /// Terminal transition. Called once, by the run task.
    fn finish(&self, outcome: Result<anyhow::Result<()>, Box<dyn Any + Send>>) {
        let status = match outcome {
            Ok(Ok(())) => {
                info!(
                    transaction_id = %self.id,
                    action = %self.action_name,
                    "transaction succeeded"
                );
                TransactionStatus::Success
            }
            Ok(Err(e)) => {
                error!(
                    transaction_id = %self.id,
                    action = %self.action_name,
                    error = %format!("{:#}", e),
                    "transaction failed"
                );
                TransactionStatus::Error
            }
            Err(panic) => {
                error!(
                    transaction_id = %self.id,
                    action = %self.action_name,
                    panic = %panic_message(panic.as_ref()),
                    "action handler panicked"
                );
                TransactionStatus::Error
            }
        };

        let mut orphaned = None;
        let finished = self.state.patch_state_if(|s| {
            if s.status.is_terminal() {
                return false;
            }
            orphaned = lock(&self.pending).take();
            *s = TransactionState {
                status,
                pending_io_request: None,
            };
            true
        });

        if finished.is_none() {
            warn!(transaction_id = %self.id, "transaction already finished");
            return;
        }

        // An io call that escaped the handler's scope is still waiting
        if let Some(rendezvous) = orphaned {
            if rendezvous.close() {
                debug!(
                    transaction_id = %self.id,
                    method = rendezvous.method().method_name(),
                    "pending IO request abandoned at finish"
                );
            }
        }
    }
}

fn is_same_request(pending: &Option<Arc<IoRendezvous>>, rendezvous: &Arc<IoRendezvous>) -> bool {
    pending
        .as_ref()
        .is_some_and(|current| Arc::ptr_eq(current, rendezvous))
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("action_name", &self.action_name)
            .field("state", &self.state())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// =============================================================================
// IO bridge
// =============================================================================

/// The [`IoHandler`] bound into a transaction's handler scope.
struct TransactionIo {
    transaction: Arc<Transaction>,
    /// Serializes concurrent `io` calls from the same handler.
    in_flight: tokio::sync::Mutex<()>,
}

#[async_trait]
impl IoHandler for TransactionIo {
    async fn issue(&self, method: IoMethod) -> Result<IoValue, IoError> {
        let _in_flight = self.in_flight.lock().await;

        let (rendezvous, waiter) = IoRendezvous::new(method);
        let rendezvous = Arc::new(rendezvous);
        self.transaction.begin_io_request(rendezvous.clone())?;

        // Clears the request if this call is dropped before a response lands
        let _guard = PendingGuard {
            transaction: &self.transaction,
            rendezvous,
        };

        waiter.await
    }
}

struct PendingGuard<'a> {
    transaction: &'a Transaction,
    rendezvous: Arc<IoRendezvous>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.transaction.abandon_io_request(&self.rendezvous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{self, IoValue};
    use futures::StreamExt;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    async fn wait_for(
        transaction: &Transaction,
        predicate: impl Fn(&TransactionState) -> bool,
    ) -> Snapshot<TransactionState> {
        let mut stream = transaction.watch();
        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(snapshot) = stream.next().await {
                if predicate(&snapshot.value) {
                    return snapshot;
                }
            }
            panic!("state stream ended");
        })
        .await
        .expect("timed out waiting for transaction state")
    }

    async fn wait_finished(transaction: &Transaction) -> Snapshot<TransactionState> {
        wait_for(transaction, |s| s.status.is_terminal()).await
    }

    async fn wait_pending(transaction: &Transaction) -> Snapshot<TransactionState> {
        wait_for(transaction, |s| s.pending_io_request.is_some()).await
    }

    #[tokio::test]
    async fn test_handler_without_io_succeeds() {
        let action = Action::new(|| async { Ok(()) });
        let transaction = Transaction::start(TransactionId(0), "noop", &action);

        let snapshot = wait_finished(&transaction).await;

        assert_eq!(snapshot.value.status, TransactionStatus::Success);
        assert_eq!(snapshot.value.pending_io_request, None);
        assert_eq!(snapshot.version, 1);
    }

    #[tokio::test]
    async fn test_handler_error_ends_in_error() {
        let action = Action::new(|| async { anyhow::bail!("boom") });
        let transaction = Transaction::start(TransactionId(0), "fails", &action);

        let snapshot = wait_finished(&transaction).await;
        assert_eq!(snapshot.value.status, TransactionStatus::Error);
    }

    #[tokio::test]
    async fn test_handler_panic_ends_in_error() {
        let action = Action::new(|| async {
            if true {
                panic!("handler blew up");
            }
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "panics", &action);

        let snapshot = wait_finished(&transaction).await;
        assert_eq!(snapshot.value.status, TransactionStatus::Error);
    }

    #[tokio::test]
    async fn test_io_round_trip_publishes_in_order() {
        let action = Action::new(|| async {
            let name = io::input_text("What is your name?").await?;
            anyhow::ensure!(name == "Ada", "unexpected name {name}");
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "hello", &action);
        let mut stream = transaction.watch();

        let pending = wait_pending(&transaction).await;
        assert_eq!(
            pending.value.pending_io_request,
            Some(IoMethod::InputText("What is your name?".into()))
        );

        transaction.respond_to_io_request(&json!("Ada")).unwrap();
        wait_finished(&transaction).await;

        let mut seen = Vec::new();
        while let Some(snapshot) = stream.next().await {
            let done = snapshot.value.status.is_terminal();
            seen.push(snapshot);
            if done {
                break;
            }
        }

        let versions: Vec<u64> = seen.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![0, 1, 2, 3]);
        assert!(seen[1].value.pending_io_request.is_some());
        assert_eq!(seen[2].value, TransactionState::running());
        assert_eq!(seen[3].value.status, TransactionStatus::Success);
        assert_eq!(seen[3].value.pending_io_request, None);
    }

    #[tokio::test]
    async fn test_invalid_response_leaves_request_pending() {
        let resumed = Arc::new(AtomicBool::new(false));
        let flag = resumed.clone();
        let action = Action::new(move || {
            let flag = flag.clone();
            async move {
                io::input_text("Name").await?;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });
        let transaction = Transaction::start(TransactionId(0), "hello", &action);
        let before = wait_pending(&transaction).await;

        let err = transaction.respond_to_io_request(&json!(42)).unwrap_err();
        assert!(matches!(err, TransactionError::Validation(_)));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!resumed.load(Ordering::SeqCst));
        assert_eq!(transaction.state(), before);
        assert_eq!(
            transaction.pending_io_request(),
            Some(IoMethod::InputText("Name".into()))
        );

        transaction.respond_to_io_request(&json!("Ada")).unwrap();
        wait_finished(&transaction).await;
        assert!(resumed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_respond_without_pending_request() {
        let action = Action::new(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(4), "sleepy", &action);

        let err = transaction.respond_to_io_request(&json!("x")).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::NoPendingRequest(TransactionId(4))
        ));

        wait_finished(&transaction).await;
        let err = transaction.respond_to_io_request(&json!("x")).unwrap_err();
        assert!(matches!(err, TransactionError::NoPendingRequest(_)));
    }

    #[tokio::test]
    async fn test_second_response_is_rejected() {
        let action = Action::new(|| async {
            io::input_text("first").await?;
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "once", &action);
        wait_pending(&transaction).await;

        transaction.respond_to_io_request(&json!("a")).unwrap();
        assert!(matches!(
            transaction.respond_to_io_request(&json!("b")),
            Err(TransactionError::NoPendingRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_sequential_requests() {
        let action = Action::new(|| async {
            let first = io::input_text("What is your first name?").await?;
            let age = io::input_number("How old are you?").await?;
            anyhow::ensure!(first == "Ada" && age == 36.0);
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "two_step", &action);

        wait_for(&transaction, |s| {
            matches!(s.pending_io_request, Some(IoMethod::InputText(_)))
        })
        .await;
        transaction.respond_to_io_request(&json!("Ada")).unwrap();

        wait_for(&transaction, |s| {
            matches!(s.pending_io_request, Some(IoMethod::InputNumber(_)))
        })
        .await;
        transaction.respond_to_io_request(&json!(36)).unwrap();

        let snapshot = wait_finished(&transaction).await;
        assert_eq!(snapshot.value.status, TransactionStatus::Success);
        assert_eq!(snapshot.version, 5);
    }

    #[tokio::test]
    async fn test_concurrent_io_calls_are_single_flight() {
        let action = Action::new(|| async {
            let (a, b) = tokio::join!(io::input_text("a"), io::input_text("b"));
            a?;
            b?;
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "joined", &action);

        // Never two requests at once: every published state holds at most one
        let max_pending = Arc::new(AtomicUsize::new(0));
        let observed = max_pending.clone();
        let _sub = transaction.subscribe(move |snapshot| {
            let n = usize::from(snapshot.value.pending_io_request.is_some());
            observed.fetch_max(n, Ordering::SeqCst);
        });

        for _ in 0..2 {
            let snapshot = wait_pending(&transaction).await;
            let label = snapshot
                .value
                .pending_io_request
                .as_ref()
                .map(|m| m.label().to_string())
                .unwrap();
            transaction.respond_to_io_request(&json!(label)).unwrap();
        }

        let snapshot = wait_finished(&transaction).await;
        assert_eq!(snapshot.value.status, TransactionStatus::Success);
        assert_eq!(max_pending.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_io_call_clears_request() {
        let action = Action::new(|| async {
            let answered = tokio::time::timeout(Duration::from_millis(30), io::input_text("Quick!"))
                .await
                .is_ok();
            anyhow::ensure!(!answered, "should have timed out");
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "impatient", &action);

        wait_pending(&transaction).await;
        wait_for(&transaction, |s| s.pending_io_request.is_none()).await;

        assert!(matches!(
            transaction.respond_to_io_request(&json!("too late")),
            Err(TransactionError::NoPendingRequest(_))
        ));
        assert_eq!(transaction.status(), TransactionStatus::Running);
    }

    #[tokio::test]
    async fn test_io_after_finish_is_abandoned() {
        let (sender, receiver) = tokio::sync::oneshot::channel();
        let sender = Arc::new(Mutex::new(Some(sender)));
        let action = Action::new(move || {
            let sender = sender.clone();
            async move {
                let escaped = context::current()?;
                if let Some(sender) = sender.lock().unwrap().take() {
                    let _ = sender.send(escaped);
                }
                Ok(())
            }
        });
        let transaction = Transaction::start(TransactionId(0), "escapes", &action);
        wait_finished(&transaction).await;

        let escaped = receiver.await.unwrap();
        let result = escaped.issue(IoMethod::InputText("late".into())).await;

        assert_eq!(
            result,
            Err(IoError::Abandoned {
                method_name: "INPUT_TEXT"
            })
        );
        assert_eq!(transaction.state().value.pending_io_request, None);
        assert_eq!(transaction.status(), TransactionStatus::Success);
    }

    #[tokio::test]
    async fn test_escaped_pending_io_is_abandoned_at_finish() {
        let (sender, receiver) = tokio::sync::oneshot::channel();
        let sender = Arc::new(Mutex::new(Some(sender)));
        let release = Arc::new(tokio::sync::Notify::new());
        let gate = release.clone();
        let action = Action::new(move || {
            let sender = sender.clone();
            let gate = gate.clone();
            async move {
                let escaped = context::current()?;
                let call = tokio::spawn(async move {
                    escaped.issue(IoMethod::InputText("escaped".into())).await
                });
                if let Some(sender) = sender.lock().unwrap().take() {
                    let _ = sender.send(call);
                }
                gate.notified().await;
                Ok(())
            }
        });
        let transaction = Transaction::start(TransactionId(0), "escapes", &action);
        let call = receiver.await.unwrap();

        wait_pending(&transaction).await;
        release.notify_one();
        let done = wait_finished(&transaction).await;
        assert_eq!(done.value.status, TransactionStatus::Success);
        assert_eq!(done.value.pending_io_request, None);

        let result = tokio::time::timeout(Duration::from_secs(1), call)
            .await
            .expect("escaped io call never resolved")
            .unwrap();
        assert_eq!(
            result,
            Err(IoError::Abandoned {
                method_name: "INPUT_TEXT"
            })
        );
        assert!(matches!(
            transaction.respond_to_io_request(&json!("too late")),
            Err(TransactionError::NoPendingRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_subscriber_can_read_transaction() {
        let action = Action::new(|| async {
            io::input_text("Name").await?;
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "hello", &action);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reader = transaction.clone();
        let sub = transaction.subscribe(move |snapshot| {
            let pending = reader.pending_io_request();
            assert_eq!(reader.state(), *snapshot);
            sink.lock().unwrap().push(pending);
        });

        wait_pending(&transaction).await;
        transaction.respond_to_io_request(&json!("Ada")).unwrap();
        wait_finished(&transaction).await;
        sub.unsubscribe();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some(IoMethod::InputText("Name".into())), None, None]
        );
    }

    #[tokio::test]
    async fn test_subscriber_answers_by_spawning() {
        let action = Action::new(|| async {
            let name = io::input_text("Name").await?;
            anyhow::ensure!(name == "Ada", "unexpected name {name}");
            Ok(())
        });
        let transaction = Transaction::start(TransactionId(0), "hello", &action);

        let answerer = transaction.clone();
        let sub = transaction.subscribe(move |snapshot| {
            if snapshot.value.pending_io_request.is_some() {
                let answerer = answerer.clone();
                tokio::spawn(async move { answerer.respond_to_io_request(&json!("Ada")) });
            }
        });

        let done = wait_finished(&transaction).await;
        sub.unsubscribe();

        assert_eq!(done.value.status, TransactionStatus::Success);
        assert_eq!(done.version, 3);
    }

    #[test]
    fn test_state_wire_shape() {
        let state = TransactionState {
            status: TransactionStatus::Running,
            pending_io_request: Some(IoMethod::InputText("What is your name?".into())),
        };
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "status": "running",
                "pendingIORequest": {
                    "methodName": "INPUT_TEXT",
                    "props": {"label": "What is your name?"}
                }
            })
        );

        let idle = serde_json::to_value(TransactionState::running()).unwrap();
        assert_eq!(idle, json!({"status": "running", "pendingIORequest": null}));
    }

    #[test]
    fn test_io_value_is_plain_json() {
        assert_eq!(
            serde_json::to_value(IoValue::Text("Ada".into())).unwrap(),
            json!("Ada")
        );
    }
}
