//! Incremental SAT oracle over feature variables.
//!
//! The oracle owns one boolean variable `u_i` per feature, meaning "feature `i`
//! is universal in the candidate". Feature indices map to solver variables
//! through a plain vector; the pool lives exactly as long as the oracle.
//!
//! Blocking clauses:
//!
//! - after a CXp `C`: `OR_{i in C} ¬u_i` forbids every candidate releasing a superset of `C`;
//! - after an AXp `A`: `OR_{i in A} u_i` forbids every candidate pinning a superset of `A`.

use std::collections::HashSet;

use log::debug;
use varisat::{ExtendFormula, Lit, Solver, Var};

use crate::error::{Error, Result};

pub struct FeatureOracle {
    solver: Solver<'static>,
    vars: Vec<Var>,
    num_clauses: usize,
}

impl FeatureOracle {
    pub fn new(nf: usize) -> Self {
        let mut solver = Solver::new();
        let vars: Vec<Var> = (0..nf).map(|_| solver.new_var()).collect();
        Self {
            solver,
            vars,
            num_clauses: 0,
        }
    }

    pub fn num_features(&self) -> usize {
        self.vars.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.num_clauses
    }

    /// Literal `u_i` (feature `i` universal) or its negation.
    fn lit(&self, feature: usize, universal: bool) -> Lit {
        self.vars[feature].lit(universal)
    }

    fn add_clause(&mut self, lits: &[Lit]) {
        assert!(!lits.is_empty(), "Blocking clause must not be empty");
        self.solver.add_clause(lits);
        self.num_clauses += 1;
    }

    /// Solves the current formula and returns the candidate universal mask,
    /// or `None` once the formula is unsatisfiable.
    pub fn next_candidate(&mut self) -> Result<Option<Vec<bool>>> {
        let sat = self.solver.solve().map_err(|e| Error::Sat(e.to_string()))?;
        if !sat {
            debug!("oracle: unsat after {} clauses", self.num_clauses);
            return Ok(None);
        }
        let model = self
            .solver
            .model()
            .ok_or_else(|| Error::Sat("solver reported SAT without a model".to_string()))?;

        let positive: HashSet<Var> = model.iter().filter(|l| l.is_positive()).map(|l| l.var()).collect();
        let universal = self.vars.iter().map(|v| positive.contains(v)).collect();
        Ok(Some(universal))
    }

    /// Forbids candidates in which every feature of `cxp` is universal.
    pub fn block_cxp(&mut self, cxp: &[usize]) {
        let clause: Vec<Lit> = cxp.iter().map(|&i| self.lit(i, false)).collect();
        self.add_clause(&clause);
    }

    /// Forbids candidates in which every feature of `axp` is fixed.
    pub fn block_axp(&mut self, axp: &[usize]) {
        let clause: Vec<Lit> = axp.iter().map(|&i| self.lit(i, true)).collect();
        self.add_clause(&clause);
    }
}
