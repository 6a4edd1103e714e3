//! Error taxonomy for snapshot operations.

use schedsim_types::{NodeName, PodId};

/// Errors returned by snapshot mutations and lookups.
///
/// All variants are deterministic functions of current state and input;
/// none involve I/O, so there is never anything to retry. `revert` and
/// `commit` without an active fork are successful no-ops, not errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    // Node errors
    #[error("node {0} already in snapshot")]
    NodeAlreadyExists(NodeName),

    #[error("node {0} not in snapshot")]
    NodeNotFound(NodeName),

    // Pod errors
    #[error("pod {0} not in snapshot")]
    PodNotFound(PodId),

    #[error("pod {pod} already in snapshot on node {node}")]
    PodAlreadyExists { pod: PodId, node: NodeName },

    // Transaction errors
    #[error("snapshot already forked")]
    AlreadyForked,
}
