//! MDD to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Leaves** are rendered as squares at the bottom (sink rank), labeled with their class
//! - **Decision nodes** are rendered as circles labeled with the feature name,
//!   grouped by the level of their feature
//! - **Edges** between the same pair of nodes are merged into one edge labeled with all
//!   their values, e.g. `0,2`
//!
//! # Examples
//!
//! ```
//! use mdd_xp::mdd::MddBuilder;
//!
//! let mut b = MddBuilder::new(2);
//! let x = b.add_feature("x", 3);
//! let zero = b.leaf(0);
//! let one = b.leaf(1);
//! let root = b.node(x, [(0, zero), (1, one), (2, zero)]);
//! let mdd = b.build(root).unwrap();
//!
//! let dot = mdd.to_dot().unwrap();
//! assert!(dot.contains("label=\"0,2\""));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::diagram::Diagram;
use crate::mdd::{Mdd, Node};
use crate::types::NodeId;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for decision nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for leaves (default: "square")
    pub leaf_shape: &'static str,
    /// Style for edges (default: "solid")
    pub edge_style: &'static str,
    /// Prefix leaf labels with their class index, e.g. `c1` (default: false)
    pub class_prefix: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            leaf_shape: "square",
            edge_style: "solid",
            class_prefix: false,
        }
    }
}

impl Mdd {
    /// Converts the diagram to DOT (Graphviz) format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the diagram to DOT format with custom configuration.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        // Group decision nodes by level, leaves go to the sink rank
        let mut levels = BTreeMap::<usize, Vec<NodeId>>::new();
        let mut leaves = Vec::new();
        for &id in self.postorder() {
            if self.is_leaf(id) {
                leaves.push(id);
            } else {
                levels.entry(self.node_level(id).index()).or_default().push(id);
            }
        }

        writeln!(dot, "{{ rank=sink")?;
        for &id in leaves.iter() {
            let class = self.leaf_class(id);
            let label = if config.class_prefix {
                format!("c{}", class)
            } else {
                format!("{}", class)
            };
            writeln!(dot, "{} [shape={}, label=\"{}\"];", id.index(), config.leaf_shape, label)?;
        }
        writeln!(dot, "}}")?;

        for level in levels.values() {
            writeln!(dot, "{{ rank=same")?;
            for &id in level.iter() {
                let name = &self.feature(self.node_feature(id)).name;
                writeln!(dot, "{} [label=\"{}\"];", id.index(), name)?;
            }
            writeln!(dot, "}}")?;
        }

        for &id in self.postorder() {
            let Node::Decision { edges, .. } = self.node(id) else {
                continue;
            };
            let mut grouped = BTreeMap::<NodeId, Vec<String>>::new();
            for e in edges {
                grouped.entry(e.target).or_default().push(e.value.to_string());
            }
            for (target, values) in grouped {
                writeln!(
                    dot,
                    "{} -> {} [style={}, label=\"{}\"];",
                    id.index(),
                    target.index(),
                    config.edge_style,
                    values.join(",")
                )?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
