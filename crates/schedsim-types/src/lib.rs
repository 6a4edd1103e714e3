//! # schedsim-types: Cluster object model for schedsim
//!
//! This crate contains the value types shared across the schedsim system:
//! - Identity types ([`NodeName`], [`PodId`])
//! - Cluster objects ([`Node`], [`Pod`])
//! - Label machinery ([`Labels`], [`LabelSelector`], [`LabelRequirement`])
//! - Inter-pod affinity declarations ([`AffinityTerm`], [`AffinityKind`])
//!
//! Everything here is a plain owned value: no interior mutability, no I/O.
//! The snapshot core aggregates these objects but never interprets them
//! beyond identity, labels, and the presence of affinity terms.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A pod's (or node's) label set. Keys are unique; values are opaque.
pub type Labels = BTreeMap<String, String>;

// ============================================================================
// Identity Types
// ============================================================================

/// Unique name of a node within a cluster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeName(String);

impl NodeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for NodeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<NodeName> for String {
    fn from(value: NodeName) -> Self {
        value.0
    }
}

/// Unique identity of a pod: the (namespace, name) pair.
///
/// Unique across the whole cluster, not per node; a pod is assigned to
/// exactly one node at a time. Serializes as the `"namespace/name"` string
/// so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PodId {
    namespace: String,
    name: String,
}

impl PodId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for PodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for PodId {
    type Err = ParsePodIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = s.split_once('/').ok_or(ParsePodIdError)?;
        if namespace.is_empty() || name.is_empty() {
            return Err(ParsePodIdError);
        }
        Ok(Self::new(namespace, name))
    }
}

impl Serialize for PodId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PodId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when a pod id string is not of the form `namespace/name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePodIdError;

impl Display for ParsePodIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pod id must be of the form namespace/name")
    }
}

impl std::error::Error for ParsePodIdError {}

// ============================================================================
// Label Selectors
// ============================================================================

/// Operator of a set-based label requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorOp {
    /// Label must exist and its value must be in the requirement's set.
    In,
    /// Label must be absent, or present with a value outside the set.
    NotIn,
    /// Label key must be present, value irrelevant.
    Exists,
    /// Label key must be absent.
    DoesNotExist,
}

/// One set-based clause of a [`LabelSelector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequirement {
    pub key: String,
    pub op: SelectorOp,
    pub values: BTreeSet<String>,
}

impl LabelRequirement {
    pub fn new(key: impl Into<String>, op: SelectorOp, values: BTreeSet<String>) -> Self {
        Self {
            key: key.into(),
            op,
            values,
        }
    }

    /// Returns true if the given label set satisfies this requirement.
    pub fn matches(&self, labels: &Labels) -> bool {
        match self.op {
            SelectorOp::In => labels.get(&self.key).is_some_and(|v| self.values.contains(v)),
            SelectorOp::NotIn => labels.get(&self.key).is_none_or(|v| !self.values.contains(v)),
            SelectorOp::Exists => labels.contains_key(&self.key),
            SelectorOp::DoesNotExist => !labels.contains_key(&self.key),
        }
    }
}

/// A predicate over label sets: equality clauses plus set-based requirements.
///
/// A label set matches when every equality clause and every requirement
/// holds (conjunction). The empty selector matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelSelector {
    match_labels: Labels,
    requirements: Vec<LabelRequirement>,
}

impl LabelSelector {
    /// The selector that matches every label set.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Adds an equality clause: `key` must be present with exactly `value`.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.into(), value.into());
        self
    }

    /// Adds a set-based requirement clause.
    pub fn with_requirement(mut self, requirement: LabelRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Returns true when no clause constrains anything.
    pub fn is_everything(&self) -> bool {
        self.match_labels.is_empty() && self.requirements.is_empty()
    }

    /// Returns true if the given label set satisfies every clause.
    pub fn matches(&self, labels: &Labels) -> bool {
        self.match_labels
            .iter()
            .all(|(k, v)| labels.get(k) == Some(v))
            && self.requirements.iter().all(|r| r.matches(labels))
    }
}

// ============================================================================
// Affinity Declarations
// ============================================================================

/// Whether an affinity term attracts or repels co-location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffinityKind {
    /// Prefer/require placement near pods matching the selector.
    Affinity,
    /// Prefer/require placement away from pods matching the selector.
    AntiAffinity,
}

/// One inter-pod affinity or anti-affinity rule declared by a pod.
///
/// The snapshot core never evaluates these rules; it only records their
/// presence so the scheduling layer can cheaply find the nodes that carry
/// affinity-relevant pods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityTerm {
    pub kind: AffinityKind,
    pub selector: LabelSelector,
    /// Node label key defining the topology domain the rule spans
    /// (e.g. a hostname or zone key).
    pub topology_key: String,
}

impl AffinityTerm {
    pub fn new(kind: AffinityKind, selector: LabelSelector, topology_key: impl Into<String>) -> Self {
        Self {
            kind,
            selector,
            topology_key: topology_key.into(),
        }
    }
}

// ============================================================================
// Cluster Objects
// ============================================================================

/// A cluster node, identified by its unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    name: NodeName,
    labels: Labels,
}

impl Node {
    pub fn new(name: impl Into<NodeName>) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

/// A pod, identified by its (namespace, name) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    id: PodId,
    labels: Labels,
    affinity_terms: Vec<AffinityTerm>,
}

impl Pod {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PodId::new(namespace, name),
            labels: Labels::new(),
            affinity_terms: Vec::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_affinity_term(mut self, term: AffinityTerm) -> Self {
        self.affinity_terms.push(term);
        self
    }

    pub fn id(&self) -> &PodId {
        &self.id
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn affinity_terms(&self) -> &[AffinityTerm] {
        &self.affinity_terms
    }

    /// Returns true if this pod declares at least one inter-pod affinity or
    /// anti-affinity rule.
    pub fn has_pod_affinity(&self) -> bool {
        !self.affinity_terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn values(vs: &[&str]) -> BTreeSet<String> {
        vs.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn pod_id_displays_as_namespace_slash_name() {
        let id = PodId::new("kube-system", "coredns-5d78c9869d");
        assert_eq!(id.to_string(), "kube-system/coredns-5d78c9869d");
    }

    #[test]
    fn pod_id_parses_its_display_form() {
        let id: PodId = "default/web-0".parse().expect("well-formed pod id");
        assert_eq!(id, PodId::new("default", "web-0"));
        assert_eq!(id.namespace(), "default");
        assert_eq!(id.name(), "web-0");
    }

    #[test_case(""; "empty")]
    #[test_case("no-slash"; "missing separator")]
    #[test_case("/name"; "empty namespace")]
    #[test_case("ns/"; "empty name")]
    fn malformed_pod_ids_fail_to_parse(input: &str) {
        assert!(input.parse::<PodId>().is_err());
    }

    #[test]
    fn pod_id_serializes_as_a_plain_string() {
        let id = PodId::new("default", "web-0");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"default/web-0\"");

        let back: PodId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn empty_selector_matches_everything() {
        let selector = LabelSelector::everything();
        assert!(selector.is_everything());
        assert!(selector.matches(&Labels::new()));
        assert!(selector.matches(&labels(&[("app", "web")])));
    }

    #[test]
    fn equality_clause_requires_exact_value() {
        let selector = LabelSelector::everything().with_label("app", "web");
        assert!(selector.matches(&labels(&[("app", "web"), ("tier", "front")])));
        assert!(!selector.matches(&labels(&[("app", "db")])));
        assert!(!selector.matches(&Labels::new()));
    }

    #[test_case(SelectorOp::In, &[("env", "prod")], true; "in with member value")]
    #[test_case(SelectorOp::In, &[("env", "dev")], false; "in with non member value")]
    #[test_case(SelectorOp::In, &[], false; "in with absent key")]
    #[test_case(SelectorOp::NotIn, &[("env", "dev")], true; "not in with non member value")]
    #[test_case(SelectorOp::NotIn, &[("env", "prod")], false; "not in with member value")]
    #[test_case(SelectorOp::NotIn, &[], true; "not in with absent key")]
    #[test_case(SelectorOp::Exists, &[("env", "anything")], true; "exists with present key")]
    #[test_case(SelectorOp::Exists, &[], false; "exists with absent key")]
    #[test_case(SelectorOp::DoesNotExist, &[], true; "does not exist with absent key")]
    #[test_case(SelectorOp::DoesNotExist, &[("env", "prod")], false; "does not exist with present key")]
    fn requirement_operators(op: SelectorOp, label_pairs: &[(&str, &str)], expected: bool) {
        let req = LabelRequirement::new("env", op, values(&["prod", "staging"]));
        assert_eq!(req.matches(&labels(label_pairs)), expected);
    }

    #[test]
    fn selector_clauses_are_a_conjunction() {
        let selector = LabelSelector::everything()
            .with_label("app", "web")
            .with_requirement(LabelRequirement::new(
                "env",
                SelectorOp::In,
                values(&["prod"]),
            ));

        assert!(selector.matches(&labels(&[("app", "web"), ("env", "prod")])));
        assert!(!selector.matches(&labels(&[("app", "web"), ("env", "dev")])));
        assert!(!selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn pod_affinity_flag_reflects_declared_terms() {
        let plain = Pod::new("default", "plain");
        assert!(!plain.has_pod_affinity());

        let affine = Pod::new("default", "affine").with_affinity_term(AffinityTerm::new(
            AffinityKind::AntiAffinity,
            LabelSelector::everything().with_label("app", "web"),
            "kubernetes.io/hostname",
        ));
        assert!(affine.has_pod_affinity());
        assert_eq!(affine.affinity_terms().len(), 1);
    }

    #[test]
    fn pod_serde_round_trip() {
        let pod = Pod::new("default", "web-0")
            .with_label("app", "web")
            .with_affinity_term(AffinityTerm::new(
                AffinityKind::Affinity,
                LabelSelector::everything().with_label("app", "cache"),
                "topology.kubernetes.io/zone",
            ));

        let json = serde_json::to_string(&pod).expect("serialize");
        let back: Pod = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, pod);
    }
}
