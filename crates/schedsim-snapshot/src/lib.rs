//! # schedsim-snapshot: Transactional cluster-topology snapshot
//!
//! An in-memory, transactional view of cluster topology (nodes and the pods
//! scheduled onto them) for scheduling simulation. A simulator stages a
//! batch of speculative placements, evaluates feasibility against the
//! staged state, then keeps or discards the whole batch atomically.
//!
//! ## Key Principles
//!
//! - **No IO**: purely in-memory and ephemeral; nothing is persisted
//! - **Deterministic**: every operation is a pure function of state + input
//! - **Single writer**: no internal locking; one trial at a time per
//!   snapshot instance
//!
//! ## Architecture
//!
//! - [`state`]: [`SnapshotState`] and [`NodeRecord`], the owned topology
//!   aggregate one transaction layer holds
//! - [`snapshot`]: [`ClusterSnapshot`], committed plus optional pending
//!   layer, with `fork` / `commit` / `revert`
//! - [`view`]: [`NodeView`] / [`PodView`] read adapters behind the
//!   [`NodeLister`] / [`PodLister`] seams the scheduling layer consumes
//! - [`error`]: the [`SnapshotError`] taxonomy
//!
//! ## Example
//!
//! ```
//! use schedsim_snapshot::ClusterSnapshot;
//! use schedsim_types::{Node, Pod};
//!
//! let mut snapshot = ClusterSnapshot::new();
//! snapshot.add_node(Node::new("n1"))?;
//! snapshot.add_pod(Pod::new("default", "web-0"), &"n1".into())?;
//!
//! // Trial: what if web-1 also landed on n1?
//! snapshot.fork()?;
//! snapshot.add_pod(Pod::new("default", "web-1"), &"n1".into())?;
//! assert_eq!(snapshot.get_all_pods().len(), 2);
//!
//! // Not feasible, discard the whole trial.
//! snapshot.revert();
//! assert_eq!(snapshot.get_all_pods().len(), 1);
//! # Ok::<(), schedsim_snapshot::SnapshotError>(())
//! ```

pub mod error;
pub mod snapshot;
pub mod state;
pub mod view;


// Re-export commonly used items
pub use error::SnapshotError;
pub use snapshot::ClusterSnapshot;
pub use state::{NodeRecord, SnapshotState};
pub use view::{NodeLister, NodeView, PodFilter, PodLister, PodView};
