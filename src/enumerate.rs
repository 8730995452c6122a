//! Complete enumeration of AXps and CXps (MARCO).
//!
//! A SAT oracle proposes candidate universal masks. Each candidate is either a
//! weak CXp (it opens a path to another class) or the complement of a weak AXp
//! (it does not). The candidate is shrunk to a minimal explanation, recorded,
//! and blocked in the oracle:
//!
//! ```text
//! Solving -> ModelFound -> CxpBranch | AxpBranch -> BlockClause -> Solving
//!    |
//!    +-- unsat --> Exhausted
//! ```
//!
//! A blocked CXp forbids every candidate releasing all of its features; a blocked
//! AXp forbids every candidate pinning all of its features. No explanation is
//! found twice, and the loop stops exactly when every AXp and every CXp has been
//! found.

use std::time::Instant;

use log::{debug, info};

use crate::diagram::Diagram;
use crate::error::Result;
use crate::explain::Explainer;
use crate::mhs::{check_mhs, MhsViolation};
use crate::sat::FeatureOracle;
use crate::types::complement;

/// All AXps and CXps of one `(instance, target)` pair, in discovery order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Explanations {
    pub axps: Vec<Vec<usize>>,
    pub cxps: Vec<Vec<usize>>,
}

impl Explanations {
    /// Number of AXps each feature occurs in.
    pub fn feature_occurrences(&self, nf: usize) -> Vec<usize> {
        let mut counts = vec![0; nf];
        for axp in &self.axps {
            for &i in axp {
                counts[i] += 1;
            }
        }
        counts
    }

    /// Features occurring in at least one AXp, in ascending order.
    pub fn relevant_features(&self) -> Vec<usize> {
        let mut features: Vec<usize> = self.axps.iter().flatten().copied().collect();
        features.sort_unstable();
        features.dedup();
        features
    }

    /// Features occurring in no AXp, in ascending order.
    pub fn irrelevant_features(&self, nf: usize) -> Vec<usize> {
        let relevant = self.relevant_features();
        (0..nf).filter(|i| relevant.binary_search(i).is_err()).collect()
    }

    /// Checks that the AXps and CXps are minimal hitting sets of each other.
    pub fn check_duality(&self) -> std::result::Result<(), MhsViolation> {
        check_mhs(&self.axps, &self.cxps)
    }
}

impl<'a, D: Diagram> Explainer<'a, D> {
    /// Enumerates every AXp and every CXp of the explained prediction.
    pub fn enumerate(&self) -> Result<Explanations> {
        let time_start = Instant::now();
        let mut oracle = FeatureOracle::new(self.nf());
        let mut res = Explanations::default();

        while let Some(universal) = oracle.next_candidate()? {
            if self.reaches_other(&universal)? {
                let cxp = self.shrink_cxp(universal)?;
                debug!("enumerate: CXp #{} = {:?}", res.cxps.len() + 1, cxp);
                oracle.block_cxp(&cxp);
                res.cxps.push(cxp);
            } else {
                let axp = self.shrink_axp(complement(&universal))?;
                debug!("enumerate: AXp #{} = {:?}", res.axps.len() + 1, axp);
                oracle.block_axp(&axp);
                res.axps.push(axp);
            }
        }

        info!(
            "#AXp: {}, #CXp: {}, runtime: {:.3}s",
            res.axps.len(),
            res.cxps.len(),
            time_start.elapsed().as_secs_f64()
        );
        Ok(res)
    }
}
