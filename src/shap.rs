//! Exact SHAP scores by definition.
//!
//! The Shapley value of feature `i` for an instance is
//!
//! ```text
//! sum over S ⊆ F \ {i} of |S|! (nf - |S| - 1)! / nf! * (v(S ∪ {i}) - v(S))
//! ```
//!
//! where `v(S)` is a characteristic function evaluated with the features of `S`
//! pinned to the instance and every other feature universal. All `2^(nf-1)`
//! coalitions are enumerated; each evaluation of `v` is a polynomial model count
//! on the diagram, so the whole computation is exact.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

use log::debug;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::count::ModelCounter;
use crate::diagram::Diagram;
use crate::error::{Error, Result};
use crate::types::Value;
use crate::utils::{powerset, shapley_weight};

/// Characteristic function used for attribution.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ValueFunction {
    /// Expected class value over the released features.
    #[default]
    Expected,
    /// Weight of the completions that keep the prediction of the instance.
    Similarity,
}

impl FromStr for ValueFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "expected" => Ok(ValueFunction::Expected),
            "similarity" => Ok(ValueFunction::Similarity),
            _ => Err(Error::UnknownValueFunction(s.to_string())),
        }
    }
}

impl Display for ValueFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueFunction::Expected => write!(f, "expected"),
            ValueFunction::Similarity => write!(f, "similarity"),
        }
    }
}

pub struct ShapExplainer<'a, D: Diagram> {
    counter: ModelCounter<'a, D>,
}

impl<'a, D: Diagram> ShapExplainer<'a, D> {
    pub fn new(dd: &'a D) -> Self {
        Self {
            counter: ModelCounter::new(dd),
        }
    }

    pub fn counter(&self) -> &ModelCounter<'a, D> {
        &self.counter
    }

    /// Evaluates the characteristic function `vf` with the given universal mask.
    pub fn value(&self, instance: &[Value], universal: &[bool], vf: ValueFunction) -> Result<BigRational> {
        match vf {
            ValueFunction::Expected => self.counter.expected_value(instance, universal),
            ValueFunction::Similarity => self.counter.similarity_value(instance, universal),
        }
    }

    /// Exact Shapley value of `feature` as a rational number.
    pub fn shapley_score_exact(&self, instance: &[Value], feature: usize, vf: ValueFunction) -> Result<BigRational> {
        let dd = self.counter.diagram();
        dd.check_instance(instance)?;
        dd.check_feature(feature)?;

        let time_start = Instant::now();
        let nf = dd.nf();
        let others: Vec<usize> = (0..nf).filter(|&i| i != feature).collect();

        let mut score = BigRational::zero();
        let mut coalitions = 0usize;
        for s in powerset(&others) {
            coalitions += 1;
            let mut universal = vec![true; nf];
            for &i in &s {
                universal[i] = false;
            }

            universal[feature] = false;
            let with_feature = self.value(instance, &universal, vf)?;
            universal[feature] = true;
            let without_feature = self.value(instance, &universal, vf)?;

            let marginal = with_feature - without_feature;
            if marginal.is_zero() {
                continue;
            }
            score += shapley_weight(s.len(), nf) * marginal;
        }

        debug!(
            "shapley_score(feature = {}, vf = {}) = {} over {} coalitions in {:.3}s",
            feature,
            vf,
            score,
            coalitions,
            time_start.elapsed().as_secs_f64()
        );
        Ok(score)
    }

    /// Shapley value of `feature`, rounded to `f64` only after exact accumulation.
    pub fn shapley_score(&self, instance: &[Value], feature: usize, vf: ValueFunction) -> Result<f64> {
        let score = self.shapley_score_exact(instance, feature, vf)?;
        Ok(to_f64(&score))
    }

    /// Shapley values of every feature, in feature order.
    pub fn shapley_scores(&self, instance: &[Value], vf: ValueFunction) -> Result<Vec<f64>> {
        (0..self.counter.diagram().nf())
            .map(|feature| self.shapley_score(instance, feature, vf))
            .collect()
    }
}

pub(crate) fn to_f64(x: &BigRational) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}
