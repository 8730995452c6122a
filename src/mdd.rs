//! Ordered multi-valued decision diagrams.
//!
//! An [`Mdd`] is a leveled DAG: every decision node tests one feature, every
//! leaf carries a class, and along every edge the level strictly increases.
//! A node may have several edges to the same child (one per value leading
//! there), and an edge may skip levels: skipped features do not influence the
//! outcome on that path.
//!
//! Diagrams are immutable once built. The postorder of reachable nodes is
//! computed once by [`MddBuilder::build`] and shared by every query.
//!
//! # Examples
//!
//! ```
//! use mdd_xp::diagram::Diagram;
//! use mdd_xp::mdd::MddBuilder;
//!
//! // class = x0 (feature x1 is irrelevant)
//! let mut builder = MddBuilder::new(2);
//! let x0 = builder.add_feature("x0", 2);
//! builder.add_feature("x1", 2);
//! let zero = builder.leaf(0);
//! let one = builder.leaf(1);
//! let root = builder.node(x0, [(0, zero), (1, one)]);
//! let mdd = builder.build(root).unwrap();
//!
//! assert_eq!(mdd.predict(&[1, 0]).unwrap(), 1);
//! assert_eq!(mdd.predict(&[0, 1]).unwrap(), 0);
//! ```

use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

use log::debug;
use num_rational::BigRational;

use crate::diagram::{Diagram, Edge};
use crate::distribution::FeatureDistribution;
use crate::error::{Error, Result};
use crate::types::{Class, Level, NodeId, Value};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Feature {
    pub name: String,
    pub domain_size: usize,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node {
    Leaf(Class),
    Decision { feature: usize, edges: Vec<Edge> },
}

pub struct Mdd {
    features: Vec<Feature>,
    feat2lvl: Vec<Level>,
    lvl2feat: Vec<usize>,
    n_classes: usize,
    nodes: Vec<Node>,
    root: NodeId,
    postorder: Vec<NodeId>,
    distribution: FeatureDistribution,
}

impl Debug for Mdd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mdd")
            .field("nf", &self.features.len())
            .field("n_classes", &self.n_classes)
            .field("nodes", &self.nodes.len())
            .field("reachable", &self.postorder.len())
            .field("root", &self.root)
            .finish()
    }
}

impl Mdd {
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, index: usize) -> &Feature {
        &self.features[index]
    }

    pub fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node.index()]
    }

    /// Features in level order (top to bottom).
    pub fn order(&self) -> &[usize] {
        &self.lvl2feat
    }

    pub fn distribution(&self) -> &FeatureDistribution {
        &self.distribution
    }

    /// Number of reachable nodes (leaves included).
    pub fn size(&self) -> usize {
        self.postorder.len()
    }

    /// Number of edges from `source` to `target`.
    pub fn multiplicity(&self, source: NodeId, target: NodeId) -> usize {
        self.successors(source).iter().filter(|e| e.target == target).count()
    }

    /// Distinct children of a node, each with its multiplicity, in first-edge order.
    pub fn children(&self, node: NodeId) -> Vec<(NodeId, usize)> {
        let mut res: Vec<(NodeId, usize)> = Vec::new();
        for e in self.successors(node) {
            match res.iter_mut().find(|(t, _)| *t == e.target) {
                Some((_, m)) => *m += 1,
                None => res.push((e.target, 1)),
            }
        }
        res
    }

    /// Replaces the value distribution used by value functions.
    pub fn set_distribution(&mut self, distribution: FeatureDistribution) -> Result<()> {
        check_distribution(&self.features, &distribution)?;
        self.distribution = distribution;
        Ok(())
    }
}

impl Diagram for Mdd {
    fn nf(&self) -> usize {
        self.features.len()
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn postorder(&self) -> &[NodeId] {
        &self.postorder
    }

    fn is_leaf(&self, node: NodeId) -> bool {
        matches!(self.node(node), Node::Leaf(_))
    }

    fn leaf_class(&self, node: NodeId) -> Class {
        match self.node(node) {
            Node::Leaf(class) => *class,
            Node::Decision { .. } => panic!("Node {} is not a leaf", node),
        }
    }

    fn node_feature(&self, node: NodeId) -> usize {
        match self.node(node) {
            Node::Decision { feature, .. } => *feature,
            Node::Leaf(_) => panic!("Node {} is a leaf", node),
        }
    }

    fn successors(&self, node: NodeId) -> &[Edge] {
        match self.node(node) {
            Node::Decision { edges, .. } => edges,
            Node::Leaf(_) => &[],
        }
    }

    fn feature_level(&self, feature: usize) -> Level {
        self.feat2lvl[feature]
    }

    fn level_feature(&self, level: Level) -> usize {
        self.lvl2feat[level.index()]
    }

    fn domain_size(&self, feature: usize) -> usize {
        self.features[feature].domain_size
    }

    fn value_probability(&self, feature: usize, value: Value) -> &BigRational {
        self.distribution.probability(feature, value)
    }
}

fn check_distribution(features: &[Feature], distribution: &FeatureDistribution) -> Result<()> {
    if distribution.num_features() != features.len() {
        return Err(Error::InvalidDiagram(format!(
            "distribution covers {} features, diagram has {}",
            distribution.num_features(),
            features.len()
        )));
    }
    for (i, f) in features.iter().enumerate() {
        if distribution.domain_size(i) != f.domain_size {
            return Err(Error::InvalidDiagram(format!(
                "distribution of feature '{}' has {} values, domain has {}",
                f.name,
                distribution.domain_size(i),
                f.domain_size
            )));
        }
    }
    Ok(())
}

/// Incremental constructor for [`Mdd`].
///
/// Nodes are added bottom-up: a node may only refer to nodes created before it.
/// All structural checks are deferred to [`build`][MddBuilder::build].
#[derive(Debug, Clone)]
pub struct MddBuilder {
    n_classes: usize,
    features: Vec<Feature>,
    order: Option<Vec<usize>>,
    nodes: Vec<Node>,
    distribution: Option<FeatureDistribution>,
}

impl MddBuilder {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            features: Vec::new(),
            order: None,
            nodes: Vec::new(),
            distribution: None,
        }
    }

    /// Declares a feature and returns its index.
    pub fn add_feature(&mut self, name: impl Into<String>, domain_size: usize) -> usize {
        self.features.push(Feature {
            name: name.into(),
            domain_size,
        });
        self.features.len() - 1
    }

    /// Sets the level order: `order[level]` is the feature tested at that level.
    ///
    /// Defaults to the declaration order.
    pub fn order(&mut self, order: Vec<usize>) -> &mut Self {
        self.order = Some(order);
        self
    }

    /// Sets the value distribution. Defaults to uniform.
    pub fn distribution(&mut self, distribution: FeatureDistribution) -> &mut Self {
        self.distribution = Some(distribution);
        self
    }

    pub fn leaf(&mut self, class: Class) -> NodeId {
        self.push(Node::Leaf(class))
    }

    /// Adds a decision node on `feature` with edges `(value, child)`.
    pub fn node(&mut self, feature: usize, edges: impl IntoIterator<Item = (Value, NodeId)>) -> NodeId {
        let edges = edges.into_iter().map(|(v, t)| Edge::new(v, t)).collect();
        self.push(Node::Decision { feature, edges })
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId::new((self.nodes.len() - 1) as u32)
    }

    pub fn build(self, root: NodeId) -> Result<Mdd> {
        let nf = self.features.len();
        if nf == 0 {
            return Err(Error::InvalidDiagram("diagram has no features".to_string()));
        }
        if let Some(f) = self.features.iter().find(|f| f.domain_size == 0) {
            return Err(Error::InvalidDiagram(format!("feature '{}' has an empty domain", f.name)));
        }
        if self.n_classes == 0 {
            return Err(Error::InvalidDiagram("diagram has no classes".to_string()));
        }
        if root.index() >= self.nodes.len() {
            return Err(Error::InvalidDiagram(format!("root {} does not exist", root)));
        }

        let lvl2feat = self.order.unwrap_or_else(|| (0..nf).collect());
        let mut feat2lvl = vec![None; nf];
        if lvl2feat.len() != nf {
            return Err(Error::InvalidDiagram(format!(
                "order has {} entries, expected {}",
                lvl2feat.len(),
                nf
            )));
        }
        for (level, &feature) in lvl2feat.iter().enumerate() {
            if feature >= nf || feat2lvl[feature].is_some() {
                return Err(Error::InvalidDiagram(format!(
                    "order {:?} is not a permutation of 0..{}",
                    lvl2feat, nf
                )));
            }
            feat2lvl[feature] = Some(Level::new(level));
        }
        let feat2lvl: Vec<Level> = feat2lvl.into_iter().flatten().collect();

        let level_of = |node: &Node| match node {
            Node::Leaf(_) => Level::leaves(nf),
            Node::Decision { feature, .. } => feat2lvl[*feature],
        };

        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId::new(i as u32);
            match node {
                Node::Leaf(class) => {
                    if *class as usize >= self.n_classes {
                        return Err(Error::ClassOutOfRange {
                            class: *class,
                            n_classes: self.n_classes,
                        });
                    }
                }
                Node::Decision { feature, edges } => {
                    if *feature >= nf {
                        return Err(Error::FeatureOutOfRange { feature: *feature, nf });
                    }
                    if edges.is_empty() {
                        return Err(Error::InvalidDiagram(format!("node {} has no outgoing edges", id)));
                    }
                    let domain_size = self.features[*feature].domain_size;
                    let mut seen = HashSet::new();
                    for e in edges {
                        if e.value >= domain_size {
                            return Err(Error::ValueOutOfDomain {
                                feature: *feature,
                                value: e.value,
                                domain_size,
                            });
                        }
                        // Each value labels at most one edge; a shared child gets one edge per value.
                        if !seen.insert(e.value) {
                            return Err(Error::InvalidDiagram(format!(
                                "node {} has several edges for value {}",
                                id, e.value
                            )));
                        }
                        if e.target.index() >= i {
                            return Err(Error::InvalidDiagram(format!(
                                "node {} refers to {}, which is not created before it",
                                id, e.target
                            )));
                        }
                        if level_of(&self.nodes[e.target.index()]) <= feat2lvl[*feature] {
                            return Err(Error::InvalidDiagram(format!(
                                "edge {} -> {} does not go down in the order",
                                id, e.target
                            )));
                        }
                    }
                }
            }
        }

        let distribution = match self.distribution {
            Some(d) => {
                check_distribution(&self.features, &d)?;
                d
            }
            None => {
                let sizes: Vec<usize> = self.features.iter().map(|f| f.domain_size).collect();
                FeatureDistribution::uniform(&sizes)
            }
        };

        let postorder = compute_postorder(&self.nodes, root);
        debug!(
            "build: nf = {}, classes = {}, nodes = {}, reachable = {}",
            nf,
            self.n_classes,
            self.nodes.len(),
            postorder.len()
        );

        Ok(Mdd {
            features: self.features,
            feat2lvl,
            lvl2feat,
            n_classes: self.n_classes,
            nodes: self.nodes,
            root,
            postorder,
            distribution,
        })
    }
}

/// Iterative depth-first postorder of the nodes reachable from `root`.
fn compute_postorder(nodes: &[Node], root: NodeId) -> Vec<NodeId> {
    let mut visited = vec![false; nodes.len()];
    let mut order = Vec::new();
    // (node, index of the next edge to explore)
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    visited[root.index()] = true;

    while let Some((node, next)) = stack.pop() {
        let edges: &[Edge] = match &nodes[node.index()] {
            Node::Decision { edges, .. } => edges,
            Node::Leaf(_) => &[],
        };
        match edges[next..].iter().position(|e| !visited[e.target.index()]) {
            Some(offset) => {
                let child = edges[next + offset].target;
                visited[child.index()] = true;
                stack.push((node, next + offset + 1));
                stack.push((child, 0));
            }
            None => order.push(node),
        }
    }

    order
}
