//! Query interface of a leveled multi-valued decision diagram.
//!
//! The explanation and counting engines never look inside a concrete diagram:
//! they only use the queries of the [`Diagram`] trait. The structural queries
//! (postorder, successors, levels, domains) are required; the semantic ones
//! ([`predict`][Diagram::predict] and
//! [`path_to_other_class`][Diagram::path_to_other_class]) have default
//! implementations on top of them.

use num_rational::BigRational;

use crate::error::{check_mask, Error, Result};
use crate::types::{Class, Level, NodeId, Value};

/// A labeled edge `source --value--> target`.
///
/// Several edges may share a target (multi-edge). The multiplicity of the pair
/// `(source, target)` is the number of such edges.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Edge {
    pub target: NodeId,
    pub value: Value,
}

impl Edge {
    pub const fn new(value: Value, target: NodeId) -> Self {
        Self { target, value }
    }
}

pub trait Diagram {
    /// Number of decision features.
    fn nf(&self) -> usize;

    /// Number of class labels. Leaf classes lie in `0..n_classes`.
    fn n_classes(&self) -> usize;

    /// Upper bound (exclusive) on node indices, for dense per-node tables.
    fn node_count(&self) -> usize;

    fn root(&self) -> NodeId;

    /// Nodes reachable from the root, children before parents.
    fn postorder(&self) -> &[NodeId];

    fn is_leaf(&self, node: NodeId) -> bool;

    /// Class stored in a leaf.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a leaf.
    fn leaf_class(&self, node: NodeId) -> Class;

    /// Feature tested by a decision node.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a leaf.
    fn node_feature(&self, node: NodeId) -> usize;

    /// Outgoing edges of a node (empty for leaves).
    fn successors(&self, node: NodeId) -> &[Edge];

    fn feature_level(&self, feature: usize) -> Level;

    fn level_feature(&self, level: Level) -> usize;

    fn domain_size(&self, feature: usize) -> usize;

    /// Probability of `value` for `feature`, in `[0, 1]`.
    fn value_probability(&self, feature: usize, value: Value) -> &BigRational;

    /// Level of a node. Leaves sit at level `nf`, below every feature.
    fn node_level(&self, node: NodeId) -> Level {
        if self.is_leaf(node) {
            Level::leaves(self.nf())
        } else {
            self.feature_level(self.node_feature(node))
        }
    }

    /// Checks that `instance` has one in-domain value per feature.
    fn check_instance(&self, instance: &[Value]) -> Result<()> {
        if instance.len() != self.nf() {
            return Err(Error::InstanceLength {
                expected: self.nf(),
                actual: instance.len(),
            });
        }
        for (feature, &value) in instance.iter().enumerate() {
            let domain_size = self.domain_size(feature);
            if value >= domain_size {
                return Err(Error::ValueOutOfDomain {
                    feature,
                    value,
                    domain_size,
                });
            }
        }
        Ok(())
    }

    fn check_class(&self, class: Class) -> Result<()> {
        if class as usize >= self.n_classes() {
            return Err(Error::ClassOutOfRange {
                class,
                n_classes: self.n_classes(),
            });
        }
        Ok(())
    }

    fn check_feature(&self, feature: usize) -> Result<()> {
        if feature >= self.nf() {
            return Err(Error::FeatureOutOfRange { feature, nf: self.nf() });
        }
        Ok(())
    }

    /// Classifies `instance` by following, from the root, the edge labeled
    /// with the instance value at each decision node.
    fn predict(&self, instance: &[Value]) -> Result<Class> {
        self.check_instance(instance)?;
        let mut node = self.root();
        while !self.is_leaf(node) {
            let feature = self.node_feature(node);
            let value = instance[feature];
            node = self
                .successors(node)
                .iter()
                .find(|e| e.value == value)
                .map(|e| e.target)
                .ok_or(Error::NoMatchingEdge { node, feature, value })?;
        }
        Ok(self.leaf_class(node))
    }

    /// Returns whether some completion of `instance` reaches a leaf whose class
    /// differs from `target`, when the features marked in `universal` range over
    /// their whole domain and the others are pinned to the instance.
    fn path_to_other_class(&self, instance: &[Value], target: Class, universal: &[bool]) -> Result<bool> {
        self.check_instance(instance)?;
        check_mask(universal, self.nf())?;

        let mut reach = vec![false; self.node_count()];
        for &node in self.postorder() {
            let r = if self.is_leaf(node) {
                self.leaf_class(node) != target
            } else {
                let feature = self.node_feature(node);
                self.successors(node)
                    .iter()
                    .any(|e| (universal[feature] || e.value == instance[feature]) && reach[e.target.index()])
            };
            reach[node.index()] = r;
        }
        Ok(reach[self.root().index()])
    }
}
