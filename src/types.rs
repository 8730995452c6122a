//! Type-safe wrappers for diagram nodes, levels and feature masks.
//!
//! This module provides newtype wrappers that enforce compile-time distinction
//! between node handles and level indices, plus the two mask polarities used
//! by the explanation engines.
use std::fmt;

/// A node handle inside an [`Mdd`][crate::mdd::Mdd].
///
/// Node handles are dense indices into the diagram's node storage.
/// They are only meaningful for the diagram that produced them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node handle with the given index.
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Returns the raw node index as a `usize`.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<NodeId> for usize {
    fn from(node: NodeId) -> Self {
        node.index()
    }
}

/// Position of a feature in the diagram order.
///
/// Feature levels are `0..nf`; every leaf sits at level `nf`. An edge from
/// level `a` to level `b > a + 1` skips the features at the levels in between,
/// which the path then ignores.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Level(usize);

impl Level {
    pub fn new(index: usize) -> Self {
        Level(index)
    }

    /// Level shared by all leaves of a diagram over `nf` features.
    pub fn leaves(nf: usize) -> Self {
        Level(nf)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Class label stored in a leaf.
pub type Class = u32;

/// Feature value, as an index into the feature's domain.
pub type Value = usize;

/// Returns the mask with every entry flipped.
///
/// Converts between the "fixed" polarity (`true` = feature belongs to the candidate)
/// and the "universal" polarity (`true` = feature is released).
pub fn complement(mask: &[bool]) -> Vec<bool> {
    mask.iter().map(|&b| !b).collect()
}

/// Builds a mask of length `nf` with `true` exactly at the given features.
pub fn mask_of(nf: usize, features: &[usize]) -> Vec<bool> {
    let mut mask = vec![false; nf];
    for &i in features {
        mask[i] = true;
    }
    mask
}

/// Returns the indices of the `true` entries of the mask, in ascending order.
pub fn support(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &b)| if b { Some(i) } else { None })
        .collect()
}
