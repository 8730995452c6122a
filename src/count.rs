//! Exact model counting and value functions over partially free instances.
//!
//! For an instance, a target class and a universal mask, [`ModelCounter::count`]
//! returns how many completions of the instance (over the universal features,
//! the other features being pinned) the diagram classifies as the target.
//! The count is a dynamic program over the postorder of the diagram:
//!
//! - a leaf counts 1 if it carries the target class, 0 otherwise;
//! - a node on a universal feature sums over all its edges (so a multi-edge
//!   counts once per value it carries);
//! - a node on a fixed feature only follows the edges labeled with the
//!   instance value;
//! - every edge is weighted by the product of the domain sizes of the
//!   universal features whose levels it skips.
//!
//! The value functions used for Shapley attribution are derived from these
//! counts, weighted by the probability of the instance value of every
//! universal feature.

use std::time::Instant;

use log::debug;
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::diagram::Diagram;
use crate::error::{check_mask, Result};
use crate::types::{Class, Level, Value};

pub struct ModelCounter<'a, D: Diagram> {
    dd: &'a D,
}

impl<'a, D: Diagram> ModelCounter<'a, D> {
    pub fn new(dd: &'a D) -> Self {
        Self { dd }
    }

    pub fn diagram(&self) -> &'a D {
        self.dd
    }

    /// Product of the domain sizes of the universal features at levels strictly between `from` and `to`.
    fn gap_product(&self, from: Option<Level>, to: Level, universal: &[bool]) -> BigUint {
        let start = from.map_or(0, |l| l.index() + 1);
        let mut prod = BigUint::one();
        for level in start..to.index() {
            let feature = self.dd.level_feature(Level::new(level));
            if universal[feature] {
                prod *= BigUint::from(self.dd.domain_size(feature));
            }
        }
        prod
    }

    /// Number of completions of `instance` classified as `target`.
    pub fn count(&self, instance: &[Value], target: Class, universal: &[bool]) -> Result<BigUint> {
        self.dd.check_instance(instance)?;
        self.dd.check_class(target)?;
        check_mask(universal, self.dd.nf())?;
        Ok(self.count_unchecked(instance, target, universal))
    }

    fn count_unchecked(&self, instance: &[Value], target: Class, universal: &[bool]) -> BigUint {
        let time_start = Instant::now();
        let dd = self.dd;
        let mut counts: Vec<BigUint> = vec![BigUint::zero(); dd.node_count()];

        for &node in dd.postorder() {
            let total = if dd.is_leaf(node) {
                if dd.leaf_class(node) == target {
                    BigUint::one()
                } else {
                    BigUint::zero()
                }
            } else {
                let feature = dd.node_feature(node);
                let level = dd.feature_level(feature);
                let mut total = BigUint::zero();
                for e in dd.successors(node) {
                    // Parallel edges carrying the same value are all summed.
                    if !universal[feature] && e.value != instance[feature] {
                        continue;
                    }
                    let child = &counts[e.target.index()];
                    if child.is_zero() {
                        continue;
                    }
                    let gap = self.gap_product(Some(level), dd.node_level(e.target), universal);
                    total += child * gap;
                }
                total
            };
            counts[node.index()] = total;
        }

        let root = dd.root();
        let n_models = &counts[root.index()] * self.gap_product(None, dd.node_level(root), universal);
        debug!(
            "count(target = {}) = {} in {:.3}s",
            target,
            n_models,
            time_start.elapsed().as_secs_f64()
        );
        n_models
    }

    /// Model counts for every class, indexed by class.
    pub fn count_all(&self, instance: &[Value], universal: &[bool]) -> Result<Vec<BigUint>> {
        self.dd.check_instance(instance)?;
        check_mask(universal, self.dd.nf())?;
        Ok((0..self.dd.n_classes() as Class)
            .map(|class| self.count_unchecked(instance, class, universal))
            .collect())
    }

    /// Product over universal features of the probability of the instance value.
    pub fn probability_weight(&self, instance: &[Value], universal: &[bool]) -> Result<BigRational> {
        self.dd.check_instance(instance)?;
        check_mask(universal, self.dd.nf())?;
        let mut weight = BigRational::one();
        for (feature, &u) in universal.iter().enumerate() {
            if u {
                weight *= self.dd.value_probability(feature, instance[feature]).clone();
            }
        }
        Ok(weight)
    }

    /// Expected-value characteristic function:
    /// `sum_c c * count(instance, c, universal)`, times the probability weight.
    pub fn expected_value(&self, instance: &[Value], universal: &[bool]) -> Result<BigRational> {
        let counts = self.count_all(instance, universal)?;
        let sum: BigInt = counts
            .into_iter()
            .enumerate()
            .map(|(class, cnt)| BigInt::from(class) * BigInt::from(cnt))
            .sum();
        Ok(BigRational::from_integer(sum) * self.probability_weight(instance, universal)?)
    }

    /// Similarity characteristic function: the number of completions that keep the
    /// prediction of `instance`, times the probability weight.
    pub fn similarity_value(&self, instance: &[Value], universal: &[bool]) -> Result<BigRational> {
        let prediction = self.dd.predict(instance)?;
        let cnt = self.count(instance, prediction, universal)?;
        Ok(BigRational::from_integer(BigInt::from(cnt)) * self.probability_weight(instance, universal)?)
    }
}
