//! Snapshot state: the node/pod aggregate one transaction layer owns.
//!
//! [`SnapshotState`] is a plain owned value. `Clone` is a deep copy (every
//! collection is owned, nothing is shared), which is exactly the copy that
//! backs [`ClusterSnapshot::fork`](crate::ClusterSnapshot::fork). Mutations
//! validate every precondition before touching any map, so a failed
//! operation never leaves partial state behind.

use std::collections::BTreeMap;

use schedsim_types::{Node, NodeName, Pod, PodId};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

// ============================================================================
// Node Record
// ============================================================================

/// One node plus the pods currently assigned to it.
///
/// Keeps a running count of assigned pods that declare inter-pod
/// (anti-)affinity so [`has_pods_with_affinity`](Self::has_pods_with_affinity)
/// is O(1); the scheduling layer asks that question for every node on every
/// affinity-predicate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    node: Node,
    pods: BTreeMap<PodId, Pod>,
    affinity_pods: usize,
}

impl NodeRecord {
    pub(crate) fn new(node: Node) -> Self {
        Self {
            node,
            pods: BTreeMap::new(),
            affinity_pods: 0,
        }
    }

    /// The node this record wraps.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The pods assigned to this node. Iteration order carries no meaning.
    pub fn pods(&self) -> impl Iterator<Item = &Pod> {
        self.pods.values()
    }

    /// Number of pods assigned to this node.
    pub fn pod_count(&self) -> usize {
        self.pods.len()
    }

    /// Returns true if at least one assigned pod declares inter-pod
    /// affinity or anti-affinity.
    pub fn has_pods_with_affinity(&self) -> bool {
        self.affinity_pods > 0
    }

    /// Inserts a pod. Caller has already established the id is globally
    /// unique.
    pub(crate) fn insert_pod(&mut self, pod: Pod) {
        if pod.has_pod_affinity() {
            self.affinity_pods += 1;
        }
        let previous = self.pods.insert(pod.id().clone(), pod);
        debug_assert!(previous.is_none(), "pod id was not globally unique");
    }

    /// Removes a pod by id, returning it if present.
    pub(crate) fn take_pod(&mut self, id: &PodId) -> Option<Pod> {
        let pod = self.pods.remove(id)?;
        if pod.has_pod_affinity() {
            self.affinity_pods -= 1;
        }
        Some(pod)
    }
}

// ============================================================================
// Snapshot State
// ============================================================================

/// The full topology one transaction layer owns: every node record plus a
/// pod-identity index.
///
/// The index maps each pod id to the node holding it. It makes "every pod is
/// reachable from exactly one record" a structural invariant: duplicate
/// insertion is detected at the index, and removal never has to scan nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotState {
    records: BTreeMap<NodeName, NodeRecord>,
    pod_index: BTreeMap<PodId, NodeName>,
}

impl SnapshotState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new record for `node` with no pods assigned.
    pub fn add_node(&mut self, node: Node) -> Result<(), SnapshotError> {
        if self.records.contains_key(node.name()) {
            return Err(SnapshotError::NodeAlreadyExists(node.name().clone()));
        }
        self.records
            .insert(node.name().clone(), NodeRecord::new(node));
        Ok(())
    }

    /// Removes the record for `name`, discarding every pod it held.
    ///
    /// Pod removal is part of the same operation: afterwards no pod of the
    /// removed node remains reachable, directly or via the index.
    pub fn remove_node(&mut self, name: &NodeName) -> Result<(), SnapshotError> {
        let Some(record) = self.records.remove(name) else {
            return Err(SnapshotError::NodeNotFound(name.clone()));
        };
        for pod in record.pods() {
            let indexed = self.pod_index.remove(pod.id());
            debug_assert_eq!(indexed.as_ref(), Some(name), "pod index out of sync");
        }
        Ok(())
    }

    /// Assigns `pod` to the node named `node_name`.
    ///
    /// Fails with [`SnapshotError::NodeNotFound`] if the node is absent and
    /// with [`SnapshotError::PodAlreadyExists`] if the pod identity is
    /// already present anywhere in the snapshot.
    pub fn add_pod(&mut self, pod: Pod, node_name: &NodeName) -> Result<(), SnapshotError> {
        if !self.records.contains_key(node_name) {
            return Err(SnapshotError::NodeNotFound(node_name.clone()));
        }
        if let Some(holder) = self.pod_index.get(pod.id()) {
            return Err(SnapshotError::PodAlreadyExists {
                pod: pod.id().clone(),
                node: holder.clone(),
            });
        }

        self.pod_index.insert(pod.id().clone(), node_name.clone());
        let record = self
            .records
            .get_mut(node_name)
            .expect("node existence checked above");
        record.insert_pod(pod);
        Ok(())
    }

    /// Removes the pod with identity `id` from whichever node holds it.
    pub fn remove_pod(&mut self, id: &PodId) -> Result<Pod, SnapshotError> {
        let Some(node_name) = self.pod_index.remove(id) else {
            return Err(SnapshotError::PodNotFound(id.clone()));
        };
        let record = self
            .records
            .get_mut(&node_name)
            .expect("pod index references a live node record");
        let pod = record
            .take_pod(id)
            .expect("indexed pod is present on its record");
        Ok(pod)
    }

    /// The record for `name`, if present.
    pub fn get(&self, name: &NodeName) -> Option<&NodeRecord> {
        self.records.get(name)
    }

    /// Returns true if a record for `name` exists.
    pub fn contains_node(&self, name: &NodeName) -> bool {
        self.records.contains_key(name)
    }

    /// All node records. Iteration order carries no meaning.
    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.records.values()
    }

    /// All nodes across all records, unordered.
    pub fn all_nodes(&self) -> Vec<&Node> {
        self.records.values().map(NodeRecord::node).collect()
    }

    /// All pods across all records, unordered.
    pub fn all_pods(&self) -> Vec<&Pod> {
        self.records.values().flat_map(NodeRecord::pods).collect()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.records.len()
    }

    /// Number of pods across all nodes.
    pub fn pod_count(&self) -> usize {
        self.pod_index.len()
    }
}
