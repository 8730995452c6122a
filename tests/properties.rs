//! Property tests of the explanation and attribution engines.
//!
//! Every engine is compared against exhaustive enumeration of the feature space
//! on small pseudo-random diagrams.

use std::collections::BTreeSet;

use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::Zero;
use test_log::test;

use mdd_xp::count::ModelCounter;
use mdd_xp::diagram::Diagram;
use mdd_xp::explain::Explainer;
use mdd_xp::mdd::{Mdd, MddBuilder};
use mdd_xp::mhs::check_mhs;
use mdd_xp::shap::{ShapExplainer, ValueFunction};
use mdd_xp::types::NodeId;

// ─── Helpers ───────────────────────────────────────────────────────────────────

/// Small deterministic generator (64-bit LCG).
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

/// Builds a random diagram with the given domain sizes, in ascending level order.
///
/// Each level gets a couple of nodes whose children are drawn from all nodes
/// below, so edges freely skip levels and share children.
fn random_mdd(seed: u64, domains: &[usize], n_classes: usize) -> Mdd {
    let mut rng = Lcg(seed);
    let mut b = MddBuilder::new(n_classes);
    for (i, &d) in domains.iter().enumerate() {
        b.add_feature(format!("x{}", i), d);
    }
    let mut below: Vec<NodeId> = (0..n_classes as u32).map(|c| b.leaf(c)).collect();
    for feature in (0..domains.len()).rev() {
        let mut layer = Vec::new();
        for _ in 0..2 {
            let edges: Vec<(usize, NodeId)> = (0..domains[feature])
                .map(|v| (v, below[rng.next(below.len())]))
                .collect();
            layer.push(b.node(feature, edges));
        }
        below.extend(layer);
    }
    let root = *below.last().unwrap();
    b.build(root).unwrap()
}

/// Every point of the feature space.
fn all_points(mdd: &Mdd) -> Vec<Vec<usize>> {
    let mut res = vec![vec![]];
    for f in 0..mdd.nf() {
        let mut next = Vec::new();
        for prefix in &res {
            for v in 0..mdd.domain_size(f) {
                let mut p = prefix.clone();
                p.push(v);
                next.push(p);
            }
        }
        res = next;
    }
    res
}

/// Classes of all completions of `inst` over the universal features.
fn completions(mdd: &Mdd, inst: &[usize], universal: &[bool]) -> Vec<u32> {
    all_points(mdd)
        .into_iter()
        .filter(|p| (0..mdd.nf()).all(|i| universal[i] || p[i] == inst[i]))
        .map(|p| mdd.predict(&p).unwrap())
        .collect()
}

/// Whether every point of the feature space gets the same class.
fn is_constant(mdd: &Mdd) -> bool {
    let classes: BTreeSet<u32> = all_points(mdd).iter().map(|p| mdd.predict(p).unwrap()).collect();
    classes.len() == 1
}

fn subsets(nf: usize) -> impl Iterator<Item = Vec<usize>> {
    (0..1usize << nf).map(move |bits| (0..nf).filter(|i| bits >> i & 1 == 1).collect())
}

fn mask(nf: usize, set: &[usize], value: bool) -> Vec<bool> {
    let mut m = vec![!value; nf];
    for &i in set {
        m[i] = value;
    }
    m
}

/// All subset-minimal sets satisfying a monotone `weak` predicate.
fn minimal_sets(nf: usize, weak: impl Fn(&[usize]) -> bool) -> BTreeSet<Vec<usize>> {
    let weak_sets: Vec<Vec<usize>> = subsets(nf).filter(|s| weak(s)).collect();
    weak_sets
        .iter()
        .filter(|s| {
            !weak_sets
                .iter()
                .any(|t| t.len() < s.len() && t.iter().all(|x| s.contains(x)))
        })
        .cloned()
        .collect()
}

fn brute_force_axps(mdd: &Mdd, inst: &[usize], target: u32) -> BTreeSet<Vec<usize>> {
    let nf = mdd.nf();
    minimal_sets(nf, |s| {
        completions(mdd, inst, &mask(nf, s, false)).iter().all(|&c| c == target)
    })
}

fn brute_force_cxps(mdd: &Mdd, inst: &[usize], target: u32) -> BTreeSet<Vec<usize>> {
    let nf = mdd.nf();
    minimal_sets(nf, |s| {
        completions(mdd, inst, &mask(nf, s, true)).iter().any(|&c| c != target)
    })
}

const SEEDS: [u64; 6] = [1, 7, 42, 2024, 31337, 99991];

// ─── Counting ──────────────────────────────────────────────────────────────────

#[test]
fn count_matches_enumeration() {
    for seed in SEEDS {
        let mdd = random_mdd(seed, &[2, 3, 2], 3);
        let counter = ModelCounter::new(&mdd);
        let inst = vec![1, 2, 0];
        for u in subsets(3) {
            let universal = mask(3, &u, true);
            let classes = completions(&mdd, &inst, &universal);
            for target in 0..3 {
                let expected = classes.iter().filter(|&&c| c == target).count();
                assert_eq!(
                    counter.count(&inst, target, &universal).unwrap(),
                    BigUint::from(expected),
                    "seed {}, universal {:?}, target {}",
                    seed,
                    u,
                    target
                );
            }
        }
    }
}

#[test]
fn count_all_fixed_is_prediction_indicator() {
    let mdd = random_mdd(5, &[2, 2, 2], 2);
    let counter = ModelCounter::new(&mdd);
    for inst in all_points(&mdd) {
        let pred = mdd.predict(&inst).unwrap();
        for target in 0..2 {
            let expected = BigUint::from((pred == target) as u32);
            assert_eq!(counter.count(&inst, target, &[false; 3]).unwrap(), expected);
        }
    }
}

#[test]
fn count_all_universal_is_class_size() {
    let mdd = random_mdd(11, &[2, 2, 2], 2);
    let counter = ModelCounter::new(&mdd);
    let points = all_points(&mdd);
    let total: BigUint = (0..2)
        .map(|target| {
            let n = points.iter().filter(|p| mdd.predict(p).unwrap() == target).count();
            let c = counter.count(&[0, 0, 0], target, &[true; 3]).unwrap();
            assert_eq!(c, BigUint::from(n));
            c
        })
        .sum();
    assert_eq!(total, BigUint::from(8u32));
}

// ─── Explanations ──────────────────────────────────────────────────────────────

#[test]
fn enumeration_matches_brute_force() {
    for seed in SEEDS {
        let mdd = random_mdd(seed, &[2, 3, 2, 2], 3);
        if is_constant(&mdd) {
            continue;
        }
        for inst in all_points(&mdd) {
            let target = mdd.predict(&inst).unwrap();
            let xp = Explainer::new(&mdd, inst.clone(), target).unwrap();
            let res = xp.enumerate().unwrap();

            let axps: BTreeSet<Vec<usize>> = res.axps.iter().cloned().collect();
            let cxps: BTreeSet<Vec<usize>> = res.cxps.iter().cloned().collect();
            assert_eq!(axps.len(), res.axps.len(), "duplicate AXp");
            assert_eq!(cxps.len(), res.cxps.len(), "duplicate CXp");

            assert_eq!(axps, brute_force_axps(&mdd, &inst, target), "seed {}, {:?}", seed, inst);
            assert_eq!(cxps, brute_force_cxps(&mdd, &inst, target), "seed {}, {:?}", seed, inst);
            assert_eq!(check_mhs(&res.axps, &res.cxps), Ok(()));
        }
    }
}

#[test]
fn every_enumerated_set_is_a_minimal_explanation() {
    for seed in SEEDS {
        let mdd = random_mdd(seed, &[3, 2, 2], 2);
        if is_constant(&mdd) {
            continue;
        }
        check_enumerated_sets(&mdd);
    }
}

fn check_enumerated_sets(mdd: &Mdd) {
    for inst in all_points(mdd) {
        let xp = Explainer::for_prediction(mdd, inst).unwrap();
        let res = xp.enumerate().unwrap();
        for axp in &res.axps {
            assert!(!mdd.path_to_other_class(xp.instance(), xp.target(), &mask(3, axp, false)).unwrap());
            for &i in axp {
                let smaller: Vec<usize> = axp.iter().copied().filter(|&j| j != i).collect();
                assert!(mdd.path_to_other_class(xp.instance(), xp.target(), &mask(3, &smaller, false)).unwrap());
            }
        }
        for cxp in &res.cxps {
            assert!(mdd.path_to_other_class(xp.instance(), xp.target(), &mask(3, cxp, true)).unwrap());
            for &i in cxp {
                let smaller: Vec<usize> = cxp.iter().copied().filter(|&j| j != i).collect();
                assert!(!mdd.path_to_other_class(xp.instance(), xp.target(), &mask(3, &smaller, true)).unwrap());
            }
        }
    }
}

#[test]
fn single_explanations_belong_to_the_families() {
    for seed in SEEDS {
        let mdd = random_mdd(seed, &[2, 2, 3, 2], 3);
        if is_constant(&mdd) {
            continue;
        }
        check_single_explanations(&mdd);
    }
}

fn check_single_explanations(mdd: &Mdd) {
    for inst in all_points(mdd) {
        let target = mdd.predict(&inst).unwrap();
        let axps = brute_force_axps(mdd, &inst, target);
        let cxps = brute_force_cxps(mdd, &inst, target);
        let xp = Explainer::new(mdd, inst, target).unwrap();
        let axp = xp.find_axp(None).unwrap();
        assert!(axps.contains(&axp));
        assert_eq!(xp.find_axp(None).unwrap(), axp);
        let cxp = xp.find_cxp(None).unwrap();
        assert!(cxps.contains(&cxp));
        assert_eq!(xp.find_cxp(None).unwrap(), cxp);
    }
}

#[test]
fn irrelevant_second_feature() {
    let mut b = MddBuilder::new(2);
    let x0 = b.add_feature("x0", 2);
    b.add_feature("x1", 2);
    let zero = b.leaf(0);
    let one = b.leaf(1);
    let root = b.node(x0, [(0, zero), (1, one)]);
    let mdd = b.build(root).unwrap();

    for inst in all_points(&mdd) {
        let xp = Explainer::for_prediction(&mdd, inst).unwrap();
        assert_eq!(xp.find_axp(None).unwrap(), vec![0]);
        assert_eq!(xp.find_cxp(None).unwrap(), vec![0]);
        assert!(!xp.check_cxp(&[1]).unwrap());
        let res = xp.enumerate().unwrap();
        assert_eq!(res.axps, vec![vec![0]]);
        assert_eq!(res.cxps, vec![vec![0]]);
        assert!(res.check_duality().is_ok());
    }
}

// ─── Shapley ───────────────────────────────────────────────────────────────────

#[test]
fn shapley_efficiency() {
    for seed in SEEDS {
        let mdd = random_mdd(seed, &[2, 3, 2, 2], 3);
        let shap = ShapExplainer::new(&mdd);
        for inst in [vec![0, 0, 0, 0], vec![1, 2, 1, 0], vec![0, 1, 1, 1]] {
            for vf in [ValueFunction::Expected, ValueFunction::Similarity] {
                let v_full = shap.value(&inst, &[false; 4], vf).unwrap();
                let v_empty = shap.value(&inst, &[true; 4], vf).unwrap();

                let exact: BigRational = (0..4)
                    .map(|i| shap.shapley_score_exact(&inst, i, vf).unwrap())
                    .fold(BigRational::zero(), |acc, x| acc + x);
                assert_eq!(exact, &v_full - &v_empty);

                let sum: f64 = shap.shapley_scores(&inst, vf).unwrap().iter().sum();
                let diff = num_traits::ToPrimitive::to_f64(&(v_full - v_empty)).unwrap();
                assert!((sum - diff).abs() < 1e-6, "seed {}: {} != {}", seed, sum, diff);
            }
        }
    }
}

#[test]
fn shapley_of_irrelevant_feature_is_zero() {
    // x1 is never tested
    let mut b = MddBuilder::new(3);
    let x0 = b.add_feature("x0", 3);
    b.add_feature("x1", 2);
    let x2 = b.add_feature("x2", 2);
    let leaves: Vec<NodeId> = (0..3).map(|c| b.leaf(c)).collect();
    let n2 = b.node(x2, [(0, leaves[1]), (1, leaves[2])]);
    let root = b.node(x0, [(0, leaves[0]), (1, n2), (2, leaves[2])]);
    let mdd = b.build(root).unwrap();

    let shap = ShapExplainer::new(&mdd);
    for inst in all_points(&mdd) {
        assert!(shap.shapley_score_exact(&inst, 1, ValueFunction::Expected).unwrap().is_zero());
    }
}

// ─── I/O ───────────────────────────────────────────────────────────────────────

#[test]
fn sample_diagram() {
    let mdd = Mdd::from_mdd_string(include_str!("../demos/data/tennis.mdd")).unwrap();
    assert_eq!(mdd.nf(), 3);

    // overcast is always a yes
    for h in 0..2 {
        for w in 0..2 {
            assert_eq!(mdd.predict(&[1, h, w]).unwrap(), 1);
        }
    }
    let xp = Explainer::for_prediction(&mdd, vec![1, 0, 1]).unwrap();
    let res = xp.enumerate().unwrap();
    assert_eq!(res.axps, vec![vec![0]]);
    assert_eq!(res.irrelevant_features(3), vec![1, 2]);

    let again = Mdd::from_mdd_string(&mdd.to_mdd_string()).unwrap();
    for p in all_points(&mdd) {
        assert_eq!(again.predict(&p).unwrap(), mdd.predict(&p).unwrap());
    }
}
