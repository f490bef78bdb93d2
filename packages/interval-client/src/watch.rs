//! Follow one transaction through both channels.
//!
//! A [`TransactionWatcher`] listens to the snapshot event stream and also
//! polls `get_transaction_state`, both on every push message and on a fixed
//! interval. Everything goes through a [`Reconciler`], so callers only see a
//! state when the resolved value actually changes.
//!
//! If the event stream breaks the watcher keeps going on polling alone.

use std::time::Duration;

use futures::StreamExt;
use interval_core::{Snapshot, TransactionId, TransactionState};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::client::IntervalClient;
use crate::error::Result;
use crate::events::SnapshotEvents;
use crate::reconciler::Reconciler;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct TransactionWatcher {
    client: IntervalClient,
    transaction_id: TransactionId,
    events: Option<SnapshotEvents>,
    poll: Interval,
    reconciler: Reconciler<TransactionState>,
}

enum Step {
    Push(Option<Result<Snapshot<TransactionState>>>),
    Poll,
}

impl TransactionWatcher {
    /// Open the event stream for `transaction_id` and start watching.
    pub async fn new(client: IntervalClient, transaction_id: TransactionId) -> Result<Self> {
        Self::with_poll_interval(client, transaction_id, DEFAULT_POLL_INTERVAL).await
    }

    pub async fn with_poll_interval(
        client: IntervalClient,
        transaction_id: TransactionId,
        every: Duration,
    ) -> Result<Self> {
        let events = client.events(transaction_id).await?;

        let mut poll = tokio::time::interval(every);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self {
            client,
            transaction_id,
            events: Some(events),
            poll,
            reconciler: Reconciler::new(),
        })
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// The latest resolved snapshot, if any has been seen.
    pub fn current(&self) -> Option<&Snapshot<TransactionState>> {
        self.reconciler.current()
    }

    /// Wait for the next change of the resolved state.
    ///
    /// Fails only when a poll fails; event stream failures downgrade the
    /// watcher to polling.
    pub async fn next(&mut self) -> Result<Snapshot<TransactionState>> {
        loop {
            let step = tokio::select! {
                event = next_push(&mut self.events) => Step::Push(event),
                _ = self.poll.tick() => Step::Poll,
            };

            let changed = match step {
                Step::Push(Some(Ok(snapshot))) => {
                    debug!(
                        transaction_id = %self.transaction_id,
                        version = snapshot.version,
                        "push snapshot"
                    );
                    let pushed = self.reconciler.observe_push(snapshot);
                    let pulled = self.pull().await?;
                    pushed || pulled
                }
                Step::Push(Some(Err(e))) => {
                    warn!(
                        transaction_id = %self.transaction_id,
                        error = %e,
                        "event stream failed, falling back to polling"
                    );
                    self.events = None;
                    false
                }
                Step::Push(None) => {
                    debug!(transaction_id = %self.transaction_id, "event stream ended");
                    self.events = None;
                    false
                }
                Step::Poll => self.pull().await?,
            };

            if changed {
                if let Some(current) = self.reconciler.current() {
                    return Ok(current.clone());
                }
            }
        }
    }

    /// Drive the watcher until the resolved state matches `predicate`.
    ///
    /// Returns immediately if the state already seen matches.
    pub async fn wait_until<F>(&mut self, predicate: F) -> Result<Snapshot<TransactionState>>
    where
        F: Fn(&TransactionState) -> bool,
    {
        if let Some(current) = self.reconciler.current() {
            if predicate(&current.value) {
                return Ok(current.clone());
            }
        }

        loop {
            let snapshot = self.next().await?;
            if predicate(&snapshot.value) {
                return Ok(snapshot);
            }
        }
    }

    async fn pull(&mut self) -> Result<bool> {
        let snapshot = self.client.get_state(self.transaction_id).await?;
        Ok(self.reconciler.observe_pull(snapshot))
    }
}

async fn next_push(
    events: &mut Option<SnapshotEvents>,
) -> Option<Result<Snapshot<TransactionState>>> {
    match events {
        Some(events) => events.next().await,
        None => std::future::pending().await,
    }
}

impl std::fmt::Debug for TransactionWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionWatcher")
            .field("transaction_id", &self.transaction_id)
            .field("streaming", &self.events.is_some())
            .field("current", &self.reconciler.current())
            .finish()
    }
}
