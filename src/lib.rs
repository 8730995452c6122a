//! # mdd-xp: Formal Explanations for Decision Diagram Classifiers
//!
//! **`mdd-xp`** explains the predictions of classifiers represented as **ordered
//! multi-valued decision diagrams (MDDs)**, with guarantees rather than estimates.
//!
//! ## What is explained?
//!
//! Given an instance and its predicted class, the crate answers two questions:
//!
//! - *Why this class?* An **abductive explanation** (AXp) is a minimal set of
//!   features whose values alone force the prediction.
//! - *Why not another class?* A **contrastive explanation** (CXp) is a minimal
//!   set of features which, when released, allow the prediction to change.
//!
//! The two families are minimal hitting sets of each other. Both are enumerated
//! completely by a SAT-guided loop, and the duality can be verified afterwards.
//!
//! In addition, the crate computes **exact Shapley (SHAP) scores**: the value of
//! every coalition is an exact model count on the diagram, evaluated over all
//! coalitions.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mdd_xp::explain::Explainer;
//! use mdd_xp::mdd::MddBuilder;
//! use mdd_xp::shap::{ShapExplainer, ValueFunction};
//!
//! // class = x0 AND x1
//! let mut b = MddBuilder::new(2);
//! let x0 = b.add_feature("x0", 2);
//! let x1 = b.add_feature("x1", 2);
//! let zero = b.leaf(0);
//! let one = b.leaf(1);
//! let n1 = b.node(x1, [(0, zero), (1, one)]);
//! let root = b.node(x0, [(0, zero), (1, n1)]);
//! let mdd = b.build(root).unwrap();
//!
//! // 1. Enumerate all explanations of the prediction for (1, 0)
//! let xp = Explainer::for_prediction(&mdd, vec![1, 0]).unwrap();
//! let res = xp.enumerate().unwrap();
//! assert_eq!(res.axps, vec![vec![1]]);
//! assert_eq!(res.cxps, vec![vec![1]]);
//! assert!(res.check_duality().is_ok());
//!
//! // 2. Exact SHAP scores
//! let shap = ShapExplainer::new(&mdd);
//! let scores = shap.shapley_scores(&[1, 1], ValueFunction::Expected).unwrap();
//! assert!((scores[0] - 0.375).abs() < 1e-9);
//! ```
//!
//! ## Core Components
//!
//! - **[`mdd`]**: The diagram itself and its builder.
//! - **[`count`]**: Exact model counting under partial instances.
//! - **[`explain`]** and **[`enumerate`]**: Computing one or all AXps/CXps.
//! - **[`shap`]**: Exact Shapley scores.
//! - **[`mhs`]**: Duality check between AXps and CXps.
//! - **[`io`]** and **[`dot`]**: Text format and Graphviz export.

pub mod count;
pub mod diagram;
pub mod distribution;
pub mod dot;
pub mod enumerate;
pub mod error;
pub mod explain;
pub mod io;
pub mod mdd;
pub mod mhs;
pub mod sat;
pub mod shap;
pub mod types;
pub mod utils;
