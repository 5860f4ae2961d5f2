//! Change notifications for views over the tree model

use crate::tree::TreeIndex;

/// A change to the model, scoped to the smallest affected subtree
///
/// `RowsAboutToBe*` events are delivered while the affected indices are
/// still in their old state; the matching completion event follows once the
/// cache has been updated. Every event of an operation is delivered before
/// that operation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// The whole model was rebuilt (stage bound, rebound or unbound)
    Reset,
    /// Rows `first..=last` are about to appear under `parent`
    RowsAboutToBeInserted {
        parent: TreeIndex,
        first: usize,
        last: usize,
    },
    /// Rows `first..=last` now exist under `parent`
    RowsInserted {
        parent: TreeIndex,
        first: usize,
        last: usize,
    },
    /// Rows `first..=last` under `parent` are about to be dropped
    RowsAboutToBeRemoved {
        parent: TreeIndex,
        first: usize,
        last: usize,
    },
    /// Rows `first..=last` under `parent` were dropped; their indices are stale
    RowsRemoved {
        parent: TreeIndex,
        first: usize,
        last: usize,
    },
    /// The row's data changed in place; its index stays valid
    DataChanged { index: TreeIndex },
}

/// Receives model change notifications
pub trait ModelObserver {
    fn on_event(&mut self, event: &ModelEvent);
}

impl<F> ModelObserver for F
where
    F: FnMut(&ModelEvent),
{
    fn on_event(&mut self, event: &ModelEvent) {
        self(event)
    }
}
