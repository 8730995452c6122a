//! Error type shared by every engine of the crate.
//!
//! Precondition violations are fatal for the call that detects them: no engine
//! returns a partial result after an `Err`.

use thiserror::Error;

use crate::types::{Class, NodeId, Value};

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A fixed/universal mask does not have one entry per feature.
    #[error("Mask has length {actual}, expected {expected}")]
    MaskLength { expected: usize, actual: usize },

    /// An instance does not have one value per feature.
    #[error("Instance has {actual} values, expected {expected}")]
    InstanceLength { expected: usize, actual: usize },

    #[error("Feature index {feature} is out of range (nf = {nf})")]
    FeatureOutOfRange { feature: usize, nf: usize },

    #[error("Class {class} is out of range (number of classes = {n_classes})")]
    ClassOutOfRange { class: Class, n_classes: usize },

    #[error("Value {value} is outside the domain of feature {feature} (size {domain_size})")]
    ValueOutOfDomain {
        feature: usize,
        value: Value,
        domain_size: usize,
    },

    /// Local minimization ended with no feature left.
    ///
    /// Happens when the target is not the prediction of the instance (empty CXp),
    /// or when the diagram is constant (empty AXp).
    #[error("Computed {kind} is empty")]
    EmptyExplanation { kind: &'static str },

    /// The seed handed to local minimization is not a weak explanation.
    #[error("Initial {kind} seed is not a weak explanation")]
    NotWeakExplanation { kind: &'static str },

    #[error("Unknown value function '{0}' (expected 'expected' or 'similarity')")]
    UnknownValueFunction(String),

    #[error("Unsupported model kind '{0}'")]
    UnsupportedModel(String),

    #[error("Invalid diagram: {0}")]
    InvalidDiagram(String),

    #[error("Node {node} has no outgoing edge for value {value} of feature {feature}")]
    NoMatchingEdge {
        node: NodeId,
        feature: usize,
        value: Value,
    },

    #[error("Invalid feature order: {0}")]
    InvalidOrder(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SAT solver error: {0}")]
    Sat(String),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Checks that `mask` has exactly `nf` entries.
pub(crate) fn check_mask(mask: &[bool], nf: usize) -> Result<()> {
    if mask.len() != nf {
        return Err(Error::MaskLength {
            expected: nf,
            actual: mask.len(),
        });
    }
    Ok(())
}
