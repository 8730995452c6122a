//! Formal explanations of one prediction.
//!
//! An **abductive explanation** (AXp) is a subset-minimal set of features whose
//! instance values alone guarantee the target class: pinning them and releasing
//! every other feature leaves no path to another class. A **contrastive
//! explanation** (CXp) is a subset-minimal set of features whose release alone
//! opens a path to another class.
//!
//! [`Explainer::find_axp`] and [`Explainer::find_cxp`] compute one explanation
//! each by deletion: features are visited in the configured [`FeatureOrder`],
//! and a feature is dropped from the candidate whenever the candidate stays an
//! explanation without it. Dropped features are never re-added, so one pass
//! suffices and the result is subset-minimal. When several explanations exist,
//! the visiting order decides which one is returned.
//!
//! # Examples
//!
//! ```
//! use mdd_xp::explain::Explainer;
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
//! let xp = Explainer::for_prediction(&mdd, vec![1, 0]).unwrap();
//! assert_eq!(xp.find_axp(None).unwrap(), vec![0]);
//! assert_eq!(xp.find_cxp(None).unwrap(), vec![0]);
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

use log::debug;

use crate::diagram::Diagram;
use crate::error::{check_mask, Error, Result};
use crate::types::{complement, mask_of, support, Class, Value};

/// Order in which local minimization visits the features.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum FeatureOrder {
    /// Feature `0` first.
    #[default]
    Ascending,
    /// Feature `nf - 1` first.
    Descending,
    /// Explicit permutation of `0..nf`.
    Custom(Vec<usize>),
}

impl FeatureOrder {
    /// Materializes the order for `nf` features.
    pub fn resolve(&self, nf: usize) -> Result<Vec<usize>> {
        match self {
            FeatureOrder::Ascending => Ok((0..nf).collect()),
            FeatureOrder::Descending => Ok((0..nf).rev().collect()),
            FeatureOrder::Custom(order) => {
                let mut seen = vec![false; nf];
                for &i in order {
                    if i >= nf || seen[i] {
                        return Err(Error::InvalidOrder(format!(
                            "{:?} is not a permutation of 0..{}",
                            order, nf
                        )));
                    }
                    seen[i] = true;
                }
                if order.len() != nf {
                    return Err(Error::InvalidOrder(format!(
                        "{:?} has {} entries, expected {}",
                        order,
                        order.len(),
                        nf
                    )));
                }
                Ok(order.clone())
            }
        }
    }
}

impl FromStr for FeatureOrder {
    type Err = Error;

    /// Parses `asc`, `desc`, or a comma-separated permutation such as `2,0,1`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" | "ascending" => Ok(FeatureOrder::Ascending),
            "desc" | "descending" => Ok(FeatureOrder::Descending),
            _ => s
                .split(',')
                .map(|x| {
                    x.trim()
                        .parse::<usize>()
                        .map_err(|_| Error::InvalidOrder(format!("cannot parse '{}'", s)))
                })
                .collect::<Result<Vec<_>>>()
                .map(FeatureOrder::Custom),
        }
    }
}

impl Display for FeatureOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureOrder::Ascending => write!(f, "asc"),
            FeatureOrder::Descending => write!(f, "desc"),
            FeatureOrder::Custom(order) => {
                let parts: Vec<String> = order.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// Configuration of the explanation engines.
#[derive(Debug, Clone, Default)]
pub struct XpConfig {
    pub order: FeatureOrder,
}

/// Explanation engine for one `(instance, target)` pair.
pub struct Explainer<'a, D: Diagram> {
    dd: &'a D,
    instance: Vec<Value>,
    target: Class,
    order: Vec<usize>,
}

impl<'a, D: Diagram> Explainer<'a, D> {
    pub fn new(dd: &'a D, instance: Vec<Value>, target: Class) -> Result<Self> {
        Self::with_config(dd, instance, target, &XpConfig::default())
    }

    pub fn with_config(dd: &'a D, instance: Vec<Value>, target: Class, config: &XpConfig) -> Result<Self> {
        dd.check_instance(&instance)?;
        dd.check_class(target)?;
        let order = config.order.resolve(dd.nf())?;
        Ok(Self {
            dd,
            instance,
            target,
            order,
        })
    }

    /// Explains the diagram's own prediction for `instance`.
    pub fn for_prediction(dd: &'a D, instance: Vec<Value>) -> Result<Self> {
        let target = dd.predict(&instance)?;
        Self::new(dd, instance, target)
    }

    pub fn diagram(&self) -> &'a D {
        self.dd
    }

    pub fn instance(&self) -> &[Value] {
        &self.instance
    }

    pub fn target(&self) -> Class {
        self.target
    }

    pub fn nf(&self) -> usize {
        self.dd.nf()
    }

    pub(crate) fn reaches_other(&self, universal: &[bool]) -> Result<bool> {
        self.dd.path_to_other_class(&self.instance, self.target, universal)
    }

    /// Computes one AXp, starting from the features marked in `fixed` (all by default).
    ///
    /// The seed must already be a weak AXp.
    pub fn find_axp(&self, fixed: Option<&[bool]>) -> Result<Vec<usize>> {
        let fix = match fixed {
            Some(mask) => {
                check_mask(mask, self.nf())?;
                mask.to_vec()
            }
            None => vec![true; self.nf()],
        };
        if self.reaches_other(&complement(&fix))? {
            return Err(Error::NotWeakExplanation { kind: "AXp" });
        }
        self.shrink_axp(fix)
    }

    /// Computes one CXp, starting from the features marked in `universal` (all by default).
    ///
    /// The seed must already be a weak CXp.
    pub fn find_cxp(&self, universal: Option<&[bool]>) -> Result<Vec<usize>> {
        let univ = match universal {
            Some(mask) => {
                check_mask(mask, self.nf())?;
                mask.to_vec()
            }
            None => vec![true; self.nf()],
        };
        if !self.reaches_other(&univ)? {
            return Err(Error::NotWeakExplanation { kind: "CXp" });
        }
        self.shrink_cxp(univ)
    }

    /// Deletion-based minimization of a weak AXp given as a fixed mask.
    pub(crate) fn shrink_axp(&self, mut fix: Vec<bool>) -> Result<Vec<usize>> {
        let time_start = Instant::now();
        for &i in &self.order {
            if fix[i] {
                fix[i] = false;
                if self.reaches_other(&complement(&fix))? {
                    fix[i] = true;
                }
            }
        }
        let axp = support(&fix);
        if axp.is_empty() {
            return Err(Error::EmptyExplanation { kind: "AXp" });
        }
        debug!("AXp: {:?} in {:.3}s", axp, time_start.elapsed().as_secs_f64());
        Ok(axp)
    }

    /// Deletion-based minimization of a weak CXp given as a universal mask.
    pub(crate) fn shrink_cxp(&self, mut univ: Vec<bool>) -> Result<Vec<usize>> {
        let time_start = Instant::now();
        for &i in &self.order {
            if univ[i] {
                univ[i] = false;
                if !self.reaches_other(&univ)? {
                    univ[i] = true;
                }
            }
        }
        let cxp = support(&univ);
        if cxp.is_empty() {
            return Err(Error::EmptyExplanation { kind: "CXp" });
        }
        debug!("CXp: {:?} in {:.3}s", cxp, time_start.elapsed().as_secs_f64());
        Ok(cxp)
    }

    fn check_features(&self, features: &[usize]) -> Result<()> {
        for &i in features {
            self.dd.check_feature(i)?;
        }
        Ok(())
    }

    /// Checks that `axp` is a weak AXp and that dropping any of its features breaks it.
    pub fn check_axp(&self, axp: &[usize]) -> Result<bool> {
        self.check_features(axp)?;
        if axp.is_empty() {
            debug!("given AXp is empty");
            return Ok(false);
        }
        let mut univ = complement(&mask_of(self.nf(), axp));
        if self.reaches_other(&univ)? {
            debug!("given AXp {:?} is not a weak AXp", axp);
            return Ok(false);
        }
        for i in support(&complement(&univ)) {
            univ[i] = true;
            if !self.reaches_other(&univ)? {
                debug!("given AXp {:?} is not subset-minimal: {} is redundant", axp, i);
                return Ok(false);
            }
            univ[i] = false;
        }
        Ok(true)
    }

    /// Checks that `cxp` is a weak CXp and that keeping any of its features fixed breaks it.
    pub fn check_cxp(&self, cxp: &[usize]) -> Result<bool> {
        self.check_features(cxp)?;
        if cxp.is_empty() {
            debug!("given CXp is empty");
            return Ok(false);
        }
        let mut univ = mask_of(self.nf(), cxp);
        if !self.reaches_other(&univ)? {
            debug!("given CXp {:?} is not a weak CXp", cxp);
            return Ok(false);
        }
        for i in support(&univ) {
            univ[i] = false;
            if self.reaches_other(&univ)? {
                debug!("given CXp {:?} is not subset-minimal: {} is redundant", cxp, i);
                return Ok(false);
            }
            univ[i] = true;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::mdd::{Mdd, MddBuilder};

    /// Two binary features, class = x0 (x1 irrelevant).
    fn first_feature_mdd() -> Mdd {
        let mut b = MddBuilder::new(2);
        let x0 = b.add_feature("x0", 2);
        b.add_feature("x1", 2);
        let zero = b.leaf(0);
        let one = b.leaf(1);
        let root = b.node(x0, [(0, zero), (1, one)]);
        b.build(root).unwrap()
    }

    /// Three binary features, class = x0 OR x1 OR x2.
    fn or3_mdd() -> Mdd {
        let mut b = MddBuilder::new(2);
        let x0 = b.add_feature("x0", 2);
        let x1 = b.add_feature("x1", 2);
        let x2 = b.add_feature("x2", 2);
        let zero = b.leaf(0);
        let one = b.leaf(1);
        let n2 = b.node(x2, [(0, zero), (1, one)]);
        let n1 = b.node(x1, [(0, n2), (1, one)]);
        let root = b.node(x0, [(0, n1), (1, one)]);
        b.build(root).unwrap()
    }

    #[test]
    fn test_irrelevant_feature() {
        let mdd = first_feature_mdd();
        for inst in [vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]] {
            let xp = Explainer::for_prediction(&mdd, inst).unwrap();
            assert_eq!(xp.find_axp(None).unwrap(), vec![0]);
            assert_eq!(xp.find_cxp(None).unwrap(), vec![0]);
            assert!(!xp.check_cxp(&[1]).unwrap());
        }
    }

    #[test]
    fn test_order_selects_explanation() {
        let mdd = or3_mdd();
        // Every true feature alone is an AXp.
        let inst = vec![1, 1, 1];
        let asc = Explainer::for_prediction(&mdd, inst.clone()).unwrap();
        assert_eq!(asc.find_axp(None).unwrap(), vec![2]);

        let config = XpConfig {
            order: FeatureOrder::Descending,
        };
        let desc = Explainer::with_config(&mdd, inst.clone(), 1, &config).unwrap();
        assert_eq!(desc.find_axp(None).unwrap(), vec![0]);

        let config = XpConfig {
            order: FeatureOrder::Custom(vec![0, 2, 1]),
        };
        let custom = Explainer::with_config(&mdd, inst, 1, &config).unwrap();
        assert_eq!(custom.find_axp(None).unwrap(), vec![1]);
    }

    #[test]
    fn test_cxp_needs_all_true_features() {
        let mdd = or3_mdd();
        let xp = Explainer::for_prediction(&mdd, vec![1, 0, 1]).unwrap();
        assert_eq!(xp.find_cxp(None).unwrap(), vec![0, 2]);
        assert!(xp.check_cxp(&[0, 2]).unwrap());
        assert!(!xp.check_cxp(&[0]).unwrap());
        assert!(!xp.check_cxp(&[0, 1, 2]).unwrap());
    }

    #[test]
    fn test_seeded_axp() {
        let mdd = or3_mdd();
        let xp = Explainer::for_prediction(&mdd, vec![1, 0, 1]).unwrap();
        assert_eq!(xp.find_axp(Some(&[true, true, false])).unwrap(), vec![0]);
        assert_eq!(xp.find_axp(Some(&[false, true, true])).unwrap(), vec![2]);
        assert!(matches!(
            xp.find_axp(Some(&[false, true, false])),
            Err(Error::NotWeakExplanation { kind: "AXp" })
        ));
    }

    #[test]
    fn test_seeded_cxp() {
        let mdd = or3_mdd();
        let xp = Explainer::for_prediction(&mdd, vec![1, 0, 1]).unwrap();
        assert_eq!(xp.find_cxp(Some(&[true, true, true])).unwrap(), vec![0, 2]);
        assert!(matches!(
            xp.find_cxp(Some(&[true, true, false])),
            Err(Error::NotWeakExplanation { kind: "CXp" })
        ));
    }

    #[test]
    fn test_find_axp_deterministic() {
        let mdd = or3_mdd();
        let xp = Explainer::for_prediction(&mdd, vec![1, 1, 0]).unwrap();
        let seed = [true, true, true];
        assert_eq!(xp.find_axp(Some(&seed)).unwrap(), xp.find_axp(Some(&seed)).unwrap());
    }

    #[test]
    fn test_check_axp() {
        let mdd = or3_mdd();
        let xp = Explainer::for_prediction(&mdd, vec![0, 0, 0]).unwrap();
        // Predicted 0: every feature must stay pinned.
        assert!(xp.check_axp(&[0, 1, 2]).unwrap());
        assert!(!xp.check_axp(&[0, 1]).unwrap());
        assert!(!xp.check_axp(&[]).unwrap());
        assert!(matches!(xp.check_axp(&[3]), Err(Error::FeatureOutOfRange { feature: 3, .. })));
    }

    #[test]
    fn test_bad_mask_length() {
        let mdd = or3_mdd();
        let xp = Explainer::for_prediction(&mdd, vec![0, 0, 0]).unwrap();
        assert!(matches!(
            xp.find_axp(Some(&[true])),
            Err(Error::MaskLength { expected: 3, actual: 1 })
        ));
        assert!(matches!(
            xp.find_cxp(Some(&[true; 4])),
            Err(Error::MaskLength { expected: 3, actual: 4 })
        ));
    }

    #[test]
    fn test_wrong_target() {
        let mdd = or3_mdd();
        // Instance predicted 1, explained as 0: pinning everything still leads elsewhere.
        let xp = Explainer::new(&mdd, vec![1, 0, 0], 0).unwrap();
        assert!(matches!(xp.find_axp(None), Err(Error::NotWeakExplanation { .. })));
        assert!(matches!(
            xp.shrink_cxp(vec![false; 3]),
            Err(Error::EmptyExplanation { kind: "CXp" })
        ));
    }

    #[test]
    fn test_constant_diagram() {
        let mut b = MddBuilder::new(2);
        b.add_feature("x0", 2);
        let one = b.leaf(1);
        let mdd = b.build(one).unwrap();
        let xp = Explainer::for_prediction(&mdd, vec![0]).unwrap();
        assert!(matches!(xp.find_axp(None), Err(Error::EmptyExplanation { kind: "AXp" })));
        assert!(matches!(xp.find_cxp(None), Err(Error::NotWeakExplanation { kind: "CXp" })));
    }

    #[test]
    fn test_feature_order_parse() {
        assert_eq!("asc".parse::<FeatureOrder>().unwrap(), FeatureOrder::Ascending);
        assert_eq!("descending".parse::<FeatureOrder>().unwrap(), FeatureOrder::Descending);
        assert_eq!(
            "2, 0,1".parse::<FeatureOrder>().unwrap(),
            FeatureOrder::Custom(vec![2, 0, 1])
        );
        assert!("x".parse::<FeatureOrder>().is_err());
        assert!(FeatureOrder::Custom(vec![0, 0]).resolve(2).is_err());
        assert!(FeatureOrder::Custom(vec![0]).resolve(2).is_err());
        assert_eq!(FeatureOrder::Custom(vec![1, 0]).to_string(), "1,0");
    }

    #[test]
    fn test_rejects_bad_target() {
        let mdd = or3_mdd();
        assert!(matches!(
            Explainer::new(&mdd, vec![0, 0, 0], 7),
            Err(Error::ClassOutOfRange { class: 7, .. })
        ));
    }
}
