//! Per-feature value distributions.
//!
//! Value functions weight completions by the probability of the instance value
//! of every released feature, assuming independence across features. The
//! probabilities are kept as exact rationals so that value functions stay exact.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::error::{Error, Result};
use crate::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDistribution {
    probs: Vec<Vec<BigRational>>,
}

impl FeatureDistribution {
    /// Uniform distribution: every value of a feature with domain size `d` has probability `1/d`.
    pub fn uniform(domain_sizes: &[usize]) -> Self {
        let probs = domain_sizes
            .iter()
            .map(|&d| {
                let p = BigRational::new(BigInt::one(), BigInt::from(d.max(1)));
                vec![p; d]
            })
            .collect();
        Self { probs }
    }

    /// Explicit exact probabilities, one row per feature.
    pub fn from_rationals(domain_sizes: &[usize], probs: Vec<Vec<BigRational>>) -> Result<Self> {
        if probs.len() != domain_sizes.len() {
            return Err(Error::InvalidDiagram(format!(
                "distribution has {} rows, expected {}",
                probs.len(),
                domain_sizes.len()
            )));
        }
        for (feature, (row, &d)) in probs.iter().zip(domain_sizes).enumerate() {
            if row.len() != d {
                return Err(Error::InvalidDiagram(format!(
                    "distribution of feature {} has {} entries, expected {}",
                    feature,
                    row.len(),
                    d
                )));
            }
            if let Some(p) = row.iter().find(|p| **p < BigRational::zero() || **p > BigRational::one()) {
                return Err(Error::InvalidDiagram(format!(
                    "probability {} of feature {} is outside [0, 1]",
                    p, feature
                )));
            }
        }
        Ok(Self { probs })
    }

    /// Explicit floating-point probabilities, converted exactly to rationals.
    pub fn from_probabilities(domain_sizes: &[usize], probs: &[Vec<f64>]) -> Result<Self> {
        let probs = probs
            .iter()
            .enumerate()
            .map(|(feature, row)| {
                row.iter()
                    .map(|&p| {
                        BigRational::from_float(p).ok_or_else(|| {
                            Error::InvalidDiagram(format!("probability {} of feature {} is not finite", p, feature))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rationals(domain_sizes, probs)
    }

    /// Empirical distribution: the frequency of each value among `samples`.
    pub fn from_samples(domain_sizes: &[usize], samples: &[Vec<Value>]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::InvalidDiagram(
                "cannot estimate a distribution from zero samples".to_string(),
            ));
        }
        let mut counts: Vec<Vec<u64>> = domain_sizes.iter().map(|&d| vec![0; d]).collect();
        for sample in samples {
            if sample.len() != domain_sizes.len() {
                return Err(Error::InstanceLength {
                    expected: domain_sizes.len(),
                    actual: sample.len(),
                });
            }
            for (feature, &value) in sample.iter().enumerate() {
                let domain_size = domain_sizes[feature];
                if value >= domain_size {
                    return Err(Error::ValueOutOfDomain {
                        feature,
                        value,
                        domain_size,
                    });
                }
                counts[feature][value] += 1;
            }
        }
        let total = BigInt::from(samples.len());
        let probs = counts
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|c| BigRational::new(BigInt::from(c), total.clone()))
                    .collect()
            })
            .collect();
        Ok(Self { probs })
    }

    pub fn num_features(&self) -> usize {
        self.probs.len()
    }

    pub fn domain_size(&self, feature: usize) -> usize {
        self.probs[feature].len()
    }

    pub fn probability(&self, feature: usize, value: Value) -> &BigRational {
        &self.probs[feature][value]
    }

    pub fn row(&self, feature: usize) -> &[BigRational] {
        &self.probs[feature]
    }
}
