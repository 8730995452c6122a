//! Minimal hitting set duality check between AXps and CXps.
//!
//! For a fixed `(instance, target)` pair, the family of all AXps and the family
//! of all CXps are minimal hitting sets of each other. [`check_mhs`] verifies
//! this on the output of an enumeration and reports the first broken property.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use log::warn;

/// Which family a set belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Family {
    Axp,
    Cxp,
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::Axp => write!(f, "AXp"),
            Family::Cxp => write!(f, "CXp"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MhsViolation {
    /// One of the families is empty.
    Empty { axps: usize, cxps: usize },
    /// Two sets of the same family are comparable (one contains the other).
    NotUnique {
        family: Family,
        first: Vec<usize>,
        second: Vec<usize>,
    },
    /// An AXp and a CXp are disjoint.
    NotHitting { axp: Vec<usize>, cxp: Vec<usize> },
    /// Removing `element` from `set` still hits every set of the other family.
    NotMinimal {
        family: Family,
        set: Vec<usize>,
        element: usize,
    },
}

impl Display for MhsViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MhsViolation::Empty { axps, cxps } => {
                write!(f, "input empty: {} AXp(s), {} CXp(s)", axps, cxps)
            }
            MhsViolation::NotUnique { family, first, second } => {
                write!(f, "{} is not unique: {:?}, {:?}", family, first, second)
            }
            MhsViolation::NotHitting { axp, cxp } => {
                write!(f, "not a hitting set: AXp {:?}, CXp {:?}", axp, cxp)
            }
            MhsViolation::NotMinimal { family, set, element } => {
                write!(
                    f,
                    "{} {:?} is not a minimal hitting set: {} is redundant",
                    family, set, element
                )
            }
        }
    }
}

impl std::error::Error for MhsViolation {}

fn to_sets(family: &[Vec<usize>]) -> Vec<BTreeSet<usize>> {
    family.iter().map(|s| s.iter().copied().collect()).collect()
}

fn to_vec(set: &BTreeSet<usize>) -> Vec<usize> {
    set.iter().copied().collect()
}

fn check_unique(family: Family, sets: &[BTreeSet<usize>]) -> Result<(), MhsViolation> {
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i + 1..] {
            if a.is_subset(b) || b.is_subset(a) {
                return Err(MhsViolation::NotUnique {
                    family,
                    first: to_vec(a),
                    second: to_vec(b),
                });
            }
        }
    }
    Ok(())
}

/// Every element of every set of `family` is needed to hit all of `others`.
fn check_minimal(family: Family, sets: &[BTreeSet<usize>], others: &[BTreeSet<usize>]) -> Result<(), MhsViolation> {
    for set in sets {
        for &element in set {
            let hits_all = others
                .iter()
                .all(|other| other.iter().any(|x| *x != element && set.contains(x)));
            if hits_all {
                return Err(MhsViolation::NotMinimal {
                    family,
                    set: to_vec(set),
                    element,
                });
            }
        }
    }
    Ok(())
}

fn check(axps: &[Vec<usize>], cxps: &[Vec<usize>]) -> Result<(), MhsViolation> {
    if axps.is_empty() || cxps.is_empty() {
        return Err(MhsViolation::Empty {
            axps: axps.len(),
            cxps: cxps.len(),
        });
    }
    let axps = to_sets(axps);
    let cxps = to_sets(cxps);

    check_unique(Family::Axp, &axps)?;
    check_unique(Family::Cxp, &cxps)?;

    for axp in &axps {
        for cxp in &cxps {
            if axp.is_disjoint(cxp) {
                return Err(MhsViolation::NotHitting {
                    axp: to_vec(axp),
                    cxp: to_vec(cxp),
                });
            }
        }
    }

    check_minimal(Family::Axp, &axps, &cxps)?;
    check_minimal(Family::Cxp, &cxps, &axps)?;
    Ok(())
}

/// Checks that `axps` and `cxps` are minimal hitting sets of each other.
///
/// A violation is also logged as a warning.
pub fn check_mhs(axps: &[Vec<usize>], cxps: &[Vec<usize>]) -> Result<(), MhsViolation> {
    check(axps, cxps).inspect_err(|v| warn!("duality check failed: {}", v))
}
