//! Read-only query adapters consumed by the scheduling layer.
//!
//! [`NodeLister`] and [`PodLister`] are the seam between the snapshot core
//! and the external predicate/priority code: the scheduling layer observes
//! cluster state exclusively through them. [`NodeView`] and [`PodView`] are
//! the borrowing implementations over whichever [`SnapshotState`] is
//! currently active. Because they borrow, mutating the snapshot while a
//! view is alive is rejected at compile time.

use schedsim_types::{LabelSelector, NodeName, Pod};

use crate::error::SnapshotError;
use crate::state::{NodeRecord, SnapshotState};

/// Structural pod filter supplied by the scheduling layer.
pub type PodFilter = dyn Fn(&Pod) -> bool;

/// Node-side queries the scheduling layer issues.
pub trait NodeLister {
    /// All node records, unordered.
    fn list(&self) -> Vec<&NodeRecord>;

    /// Only the records holding at least one pod that declares inter-pod
    /// (anti-)affinity, the subset affinity predicates actually need.
    fn list_with_affinity_pods(&self) -> Vec<&NodeRecord>;

    /// The record for `name`, or [`SnapshotError::NodeNotFound`].
    fn get(&self, name: &NodeName) -> Result<&NodeRecord, SnapshotError>;
}

/// Pod-side queries the scheduling layer issues.
pub trait PodLister {
    /// All pods whose labels match `selector`, across all nodes, unordered.
    fn list(&self, selector: &LabelSelector) -> Vec<&Pod>;

    /// Pods satisfying both `filter` and `selector`. The two filters
    /// commute; identities are unique so duplicates cannot occur.
    fn filtered_list(&self, filter: &PodFilter, selector: &LabelSelector) -> Vec<&Pod>;
}

/// Borrowing [`NodeLister`] over the active snapshot state.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    state: &'a SnapshotState,
}

impl<'a> NodeView<'a> {
    pub(crate) fn new(state: &'a SnapshotState) -> Self {
        Self { state }
    }
}

impl NodeLister for NodeView<'_> {
    fn list(&self) -> Vec<&NodeRecord> {
        self.state.records().collect()
    }

    fn list_with_affinity_pods(&self) -> Vec<&NodeRecord> {
        self.state
            .records()
            .filter(|record| record.has_pods_with_affinity())
            .collect()
    }

    fn get(&self, name: &NodeName) -> Result<&NodeRecord, SnapshotError> {
        self.state
            .get(name)
            .ok_or_else(|| SnapshotError::NodeNotFound(name.clone()))
    }
}

/// Borrowing [`PodLister`] over the active snapshot state.
#[derive(Debug, Clone, Copy)]
pub struct PodView<'a> {
    state: &'a SnapshotState,
}

impl<'a> PodView<'a> {
    pub(crate) fn new(state: &'a SnapshotState) -> Self {
        Self { state }
    }
}

impl PodLister for PodView<'_> {
    fn list(&self, selector: &LabelSelector) -> Vec<&Pod> {
        self.filtered_list(&|_| true, selector)
    }

    fn filtered_list(&self, filter: &PodFilter, selector: &LabelSelector) -> Vec<&Pod> {
        self.state
            .records()
            .flat_map(NodeRecord::pods)
            .filter(|&pod| filter(pod) && selector.matches(pod.labels()))
            .collect()
    }
}
