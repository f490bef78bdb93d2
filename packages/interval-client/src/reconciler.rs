//! Merge push and pull views of one versioned state.
//!
//! The push channel (event stream) and the pull channel (state queries) are
//! both eventually consistent views of the same server-side container.
//! Versions only go up on the server, so "highest version wins" never
//! reverts to stale data, whatever order the two channels deliver in.

use interval_core::Snapshot;
use tracing::warn;

/// Pick the value to show from the latest push and pull snapshots.
///
/// - both present: the higher version wins, a tie goes to push
/// - one present: that one
/// - neither: `None` (render a loading state)
pub fn resolve<'a, T>(
    push: Option<&'a Snapshot<T>>,
    pull: Option<&'a Snapshot<T>>,
) -> Option<&'a T> {
    pick(push, pull).map(|snapshot| &snapshot.value)
}

fn pick<'a, T>(
    push: Option<&'a Snapshot<T>>,
    pull: Option<&'a Snapshot<T>>,
) -> Option<&'a Snapshot<T>> {
    match (push, pull) {
        (Some(push), Some(pull)) if pull.version > push.version => Some(pull),
        (Some(push), _) => Some(push),
        (None, pull) => pull,
    }
}

/// Holds the latest snapshot seen on each channel.
#[derive(Debug, Clone)]
pub struct Reconciler<T> {
    push: Option<Snapshot<T>>,
    pull: Option<Snapshot<T>>,
}

impl<T> Default for Reconciler<T> {
    fn default() -> Self {
        Self {
            push: None,
            pull: None,
        }
    }
}

impl<T: Clone + PartialEq> Reconciler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot from the push channel.
    ///
    /// Returns `true` if the resolved value changed.
    pub fn observe_push(&mut self, snapshot: Snapshot<T>) -> bool {
        self.observe(snapshot, Channel::Push)
    }

    /// Record a snapshot from the pull channel.
    ///
    /// Returns `true` if the resolved value changed.
    pub fn observe_pull(&mut self, snapshot: Snapshot<T>) -> bool {
        self.observe(snapshot, Channel::Pull)
    }

    /// The winning snapshot.
    pub fn current(&self) -> Option<&Snapshot<T>> {
        pick(self.push.as_ref(), self.pull.as_ref())
    }

    /// The winning value.
    pub fn value(&self) -> Option<&T> {
        resolve(self.push.as_ref(), self.pull.as_ref())
    }

    pub fn push(&self) -> Option<&Snapshot<T>> {
        self.push.as_ref()
    }

    pub fn pull(&self) -> Option<&Snapshot<T>> {
        self.pull.as_ref()
    }

    /// Whether the two channels hold different values under the same
    /// version. The server never does this, so it points at a bug upstream.
    pub fn has_conflict(&self) -> bool {
        match (&self.push, &self.pull) {
            (Some(push), Some(pull)) => disagree(push, pull),
            _ => false,
        }
    }

    fn observe(&mut self, snapshot: Snapshot<T>, channel: Channel) -> bool {
        let before = self.value().cloned();

        let (slot, other) = match channel {
            Channel::Push => (&mut self.push, &self.pull),
            Channel::Pull => (&mut self.pull, &self.push),
        };

        if let Some(other) = other {
            if disagree(other, &snapshot) {
                warn!(
                    version = snapshot.version,
                    "push and pull disagree at the same version"
                );
            }
        }

        // Duplicates and stale deliveries are no-ops
        if let Some(held) = slot.as_ref() {
            if !snapshot.is_newer_than(held) {
                return false;
            }
        }
        *slot = Some(snapshot);

        self.value() != before.as_ref()
    }
}

fn disagree<T: PartialEq>(a: &Snapshot<T>, b: &Snapshot<T>) -> bool {
    a.version == b.version && a.value != b.value
}

#[derive(Clone, Copy)]
enum Channel {
    Push,
    Pull,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(value: &str, version: u64) -> Snapshot<String> {
        Snapshot {
            value: value.to_string(),
            version,
        }
    }

    #[test]
    fn test_resolve_prefers_higher_version() {
        let push = snap("push", 3);
        let pull = snap("pull", 5);
        assert_eq!(resolve(Some(&push), Some(&pull)), Some(&"pull".to_string()));

        let push = snap("push", 5);
        let pull = snap("pull", 3);
        assert_eq!(resolve(Some(&push), Some(&pull)), Some(&"push".to_string()));
    }

    #[test]
    fn test_same_version_different_values_keeps_push() {
        let mut reconciler = Reconciler::new();

        assert!(reconciler.observe_push(snap("push", 4)));
        assert!(!reconciler.has_conflict());

        assert!(!reconciler.observe_pull(snap("pull", 4)));
        assert!(reconciler.has_conflict());
        assert_eq!(reconciler.value(), Some(&"push".to_string()));
        assert_eq!(reconciler.pull(), Some(&snap("pull", 4)));

        // A newer version on either side settles it
        assert!(reconciler.observe_pull(snap("pull", 5)));
        assert!(!reconciler.has_conflict());
        assert_eq!(reconciler.value(), Some(&"pull".to_string()));
    }

    #[test]
    fn test_same_version_same_value_is_not_a_conflict() {
        let mut reconciler = Reconciler::new();
        reconciler.observe_pull(snap("same", 2));
        assert!(!reconciler.observe_push(snap("same", 2)));
        assert!(!reconciler.has_conflict());
    }

    #[test]
    fn test_resolve_tie_is_the_shared_value() {
        let push = snap("same", 4);
        let pull = snap("same", 4);
        assert_eq!(resolve(Some(&push), Some(&pull)), Some(&"same".to_string()));
    }

    #[test]
    fn test_resolve_single_or_none() {
        let only = snap("only", 1);
        assert_eq!(resolve(Some(&only), None), Some(&"only".to_string()));
        assert_eq!(resolve(None, Some(&only)), Some(&"only".to_string()));
        assert_eq!(resolve::<String>(None, None), None);
    }

    #[test]
    fn test_reconciler_ignores_stale_pull() {
        let mut reconciler = Reconciler::new();

        assert!(reconciler.observe_push(snap("b", 2)));
        // Late pull response from before the push
        assert!(!reconciler.observe_pull(snap("a", 1)));

        assert_eq!(reconciler.value(), Some(&"b".to_string()));
        assert_eq!(reconciler.current().map(|s| s.version), Some(2));
    }

    #[test]
    fn test_reconciler_duplicate_delivery_is_noop() {
        let mut reconciler = Reconciler::new();

        assert!(reconciler.observe_push(snap("a", 1)));
        assert!(!reconciler.observe_push(snap("a", 1)));
        assert!(!reconciler.observe_pull(snap("a", 1)));

        assert_eq!(reconciler.push().map(|s| s.version), Some(1));
        assert_eq!(reconciler.pull().map(|s| s.version), Some(1));
    }

    #[test]
    fn test_reconciler_out_of_order_push() {
        let mut reconciler = Reconciler::new();

        assert!(reconciler.observe_push(snap("c", 3)));
        assert!(!reconciler.observe_push(snap("b", 2)));
        assert!(reconciler.observe_pull(snap("d", 4)));

        assert_eq!(reconciler.value(), Some(&"d".to_string()));
    }

    #[test]
    fn test_reconciler_empty() {
        let reconciler: Reconciler<String> = Reconciler::new();
        assert!(reconciler.value().is_none());
        assert!(reconciler.current().is_none());
    }
}
