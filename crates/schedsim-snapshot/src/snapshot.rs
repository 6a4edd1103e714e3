//! The transaction manager: committed state plus an optional pending layer.

use schedsim_types::{Node, NodeName, Pod, PodId};

use crate::error::SnapshotError;
use crate::state::SnapshotState;
use crate::view::{NodeView, PodView};

/// Transactional, in-memory snapshot of cluster topology.
///
/// Holds exactly one committed [`SnapshotState`] and, while a speculative
/// trial is in flight, one pending copy of it. Every read and write is
/// routed to the pending layer if present, otherwise to the committed one.
/// [`fork`](Self::fork) opens a trial, [`commit`](Self::commit) keeps its
/// whole batch of mutations, [`revert`](Self::revert) discards it, with no
/// hand-written inverse operations required.
///
/// `pending` being `None` means "not forked"; `Some(empty)` is a forked
/// trial whose state happens to be empty. The two are never confused.
///
/// Not a nested or concurrent transaction system: one pending layer at a
/// time, one logical thread of control. Callers needing parallel trials use
/// one `ClusterSnapshot` per worker.
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    committed: SnapshotState,
    pending: Option<SnapshotState>,
}

impl ClusterSnapshot {
    /// Creates an empty, unforked snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> &SnapshotState {
        self.pending.as_ref().unwrap_or(&self.committed)
    }

    fn active_mut(&mut self) -> &mut SnapshotState {
        self.pending.as_mut().unwrap_or(&mut self.committed)
    }

    /// Returns true while a forked trial is in flight.
    pub fn is_forked(&self) -> bool {
        self.pending.is_some()
    }

    // ========================================================================
    // Mutations (routed to the active state)
    // ========================================================================

    /// Adds a node to the snapshot.
    pub fn add_node(&mut self, node: Node) -> Result<(), SnapshotError> {
        tracing::trace!(node = %node.name(), forked = self.is_forked(), "add node");
        self.active_mut().add_node(node)
    }

    /// Removes a node and every pod scheduled onto it.
    pub fn remove_node(&mut self, name: &NodeName) -> Result<(), SnapshotError> {
        tracing::trace!(node = %name, forked = self.is_forked(), "remove node");
        self.active_mut().remove_node(name)
    }

    /// Adds a pod to the snapshot, scheduling it onto the given node.
    pub fn add_pod(&mut self, pod: Pod, node_name: &NodeName) -> Result<(), SnapshotError> {
        tracing::trace!(pod = %pod.id(), node = %node_name, forked = self.is_forked(), "add pod");
        self.active_mut().add_pod(pod, node_name)
    }

    /// Removes a pod from the snapshot, returning it.
    pub fn remove_pod(&mut self, id: &PodId) -> Result<Pod, SnapshotError> {
        tracing::trace!(pod = %id, forked = self.is_forked(), "remove pod");
        self.active_mut().remove_pod(id)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// All nodes in the active state, unordered.
    pub fn get_all_nodes(&self) -> Vec<&Node> {
        self.active().all_nodes()
    }

    /// All pods in the active state, unordered.
    pub fn get_all_pods(&self) -> Vec<&Pod> {
        self.active().all_pods()
    }

    /// Read adapter over the active state's nodes.
    pub fn nodes(&self) -> NodeView<'_> {
        NodeView::new(self.active())
    }

    /// Read adapter over the active state's pods.
    pub fn pods(&self) -> PodView<'_> {
        PodView::new(self.active())
    }

    // ========================================================================
    // Transaction Lifecycle
    // ========================================================================

    /// Opens a speculative trial by deep-copying the committed state into a
    /// pending layer.
    ///
    /// All subsequent reads and writes observe the pending layer until
    /// [`commit`](Self::commit) or [`revert`](Self::revert) resolves it.
    /// Forking an already-forked snapshot fails with
    /// [`SnapshotError::AlreadyForked`] and changes nothing.
    ///
    /// Cost is O(nodes + pods): the copy is a whole-state clone.
    pub fn fork(&mut self) -> Result<(), SnapshotError> {
        if self.pending.is_some() {
            return Err(SnapshotError::AlreadyForked);
        }
        tracing::debug!(
            nodes = self.committed.node_count(),
            pods = self.committed.pod_count(),
            "fork snapshot"
        );
        self.pending = Some(self.committed.clone());
        Ok(())
    }

    /// Discards the pending layer, restoring the pre-fork view.
    ///
    /// A no-op when not forked, so cleanup paths may call this
    /// unconditionally.
    pub fn revert(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("revert snapshot fork");
        }
    }

    /// Promotes the pending layer to be the new committed state.
    ///
    /// A no-op when not forked. This is the only way mutations made while
    /// forked become durable in the committed state.
    pub fn commit(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(
                nodes = pending.node_count(),
                pods = pending.pod_count(),
                "commit snapshot fork"
            );
            self.committed = pending;
        }
    }

    /// Resets to an empty, unforked snapshot, discarding all state.
    pub fn clear(&mut self) {
        tracing::debug!("clear snapshot");
        self.committed = SnapshotState::new();
        self.pending = None;
    }
}
