//! Registry of actions and the transactions started from them.
//!
//! The manager is the only entry point the edge talks to: it resolves action
//! names, allocates transaction ids and routes responses to the transaction
//! that is waiting for them.
//!
//! Transactions live for the manager's lifetime. Nothing is evicted.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::error::TransactionError;
use crate::state::{lock, Snapshot, SnapshotStream};
use crate::transaction::{Transaction, TransactionId, TransactionState, TransactionStatus};

/// What `invoke` hands back: the new id and the state at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub transaction_id: TransactionId,
    pub state: Snapshot<TransactionState>,
}

/// One row of `list_transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub transaction_id: TransactionId,
    pub action_name: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl TransactionSummary {
    fn of(transaction: &Transaction) -> Self {
        Self {
            transaction_id: transaction.id(),
            action_name: transaction.action_name().to_string(),
            status: transaction.status(),
            created_at: transaction.created_at(),
        }
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    transactions: HashMap<TransactionId, Arc<Transaction>>,
}

/// Starts transactions by action name and routes operations to them.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct TransactionManager {
    actions: BTreeMap<String, Action>,
    /// Id allocation and insertion happen under this one lock.
    registry: Mutex<Registry>,
}

impl TransactionManager {
    pub fn builder() -> TransactionManagerBuilder {
        TransactionManagerBuilder::default()
    }

    /// Start a new transaction of `action_name`.
    ///
    /// Returns as soon as the handler is scheduled; it does not wait for the
    /// handler to reach its first IO request or to finish.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the handler is
    /// spawned onto the current one.
    pub fn invoke(&self, action_name: &str) -> Result<Invocation, TransactionError> {
        let action = self
            .actions
            .get(action_name)
            .ok_or_else(|| TransactionError::ActionNotFound(action_name.to_string()))?;

        let transaction = {
            let mut registry = lock(&self.registry);
            let id = TransactionId(registry.next_id);
            registry.next_id += 1;

            let transaction = Transaction::start(id, action_name, action);
            registry.transactions.insert(id, transaction.clone());
            transaction
        };

        debug!(
            transaction_id = %transaction.id(),
            action = action_name,
            "transaction registered"
        );

        Ok(Invocation {
            transaction_id: transaction.id(),
            state: transaction.state(),
        })
    }

    pub fn get_transaction(&self, id: TransactionId) -> Result<Arc<Transaction>, TransactionError> {
        lock(&self.registry)
            .transactions
            .get(&id)
            .cloned()
            .ok_or(TransactionError::TransactionNotFound(id))
    }

    /// Current snapshot of one transaction.
    pub fn get_state(&self, id: TransactionId) -> Result<Snapshot<TransactionState>, TransactionError> {
        Ok(self.get_transaction(id)?.state())
    }

    /// Route a response body to the transaction's pending request.
    pub fn respond_to_io_request(
        &self,
        id: TransactionId,
        body: &Value,
    ) -> Result<(), TransactionError> {
        self.get_transaction(id)?.respond_to_io_request(body)
    }

    /// Registered action names, sorted.
    pub fn list_actions(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    /// All transactions, ordered by id.
    pub fn list_transactions(&self) -> Vec<TransactionSummary> {
        let transactions: Vec<Arc<Transaction>> =
            lock(&self.registry).transactions.values().cloned().collect();

        let mut summaries: Vec<TransactionSummary> =
            transactions.iter().map(|t| TransactionSummary::of(t)).collect();
        summaries.sort_by_key(|s| s.transaction_id);
        summaries
    }

    /// Push channel for one transaction: current snapshot, then every change.
    ///
    /// The stream never ends on its own; drop it to stop observing.
    pub fn subscribe(
        &self,
        id: TransactionId,
    ) -> Result<SnapshotStream<TransactionState>, TransactionError> {
        Ok(self.get_transaction(id)?.watch())
    }

    pub fn has_action(&self, action_name: &str) -> bool {
        self.actions.contains_key(action_name)
    }

    pub fn transaction_count(&self) -> usize {
        lock(&self.registry).transactions.len()
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("transactions", &self.transaction_count())
            .finish()
    }
}

/// Builder for [`TransactionManager`].
#[derive(Default)]
pub struct TransactionManagerBuilder {
    actions: BTreeMap<String, Action>,
}

impl TransactionManagerBuilder {
    /// Register `action` under `name`. A later registration of the same name
    /// replaces the earlier one.
    pub fn action(mut self, name: impl Into<String>, action: Action) -> Self {
        let name = name.into();
        if self.actions.insert(name.clone(), action).is_some() {
            warn!(action = %name, "action registered twice, keeping the last one");
        }
        self
    }

    pub fn build(self) -> TransactionManager {
        info!(actions = self.actions.len(), "transaction manager ready");
        TransactionManager {
            actions: self.actions,
            registry: Mutex::new(Registry::default()),
        }
    }
}
