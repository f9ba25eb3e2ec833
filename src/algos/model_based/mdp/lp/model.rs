//! Primal LP of the Bellman optimality equations.
//!
//! For every reachable state `s` there is one free variable `v_s`, and for
//! every action `a` one row
//!
//! ```text
//! v_s - gamma * Σ_{s' reachable} p(s,a,s') v_{s'} >= r(s,a)
//! ```
//!
//! Terminal and unreachable successors contribute the constant 0. Minimising
//! `Σ v_s` over these super-solutions of the Bellman operator yields `v*`.

use super::MdpProblem;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::partition::StateKind;
use itertools::iproduct;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Position of a decision variable in [`Model::variables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarIndex(pub usize);

/// `Σ terms >= rhs`, the row contributed by taking `action` in `state`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub state: Discrete,
    pub action: Discrete,
    pub terms: Vec<(VarIndex, Continous)>,
    pub rhs: Continous,
}

impl Constraint {
    pub fn lhs(&self, x: &[Continous]) -> Continous {
        self.terms.iter().map(|&(VarIndex(i), c)| c * x[i]).sum()
    }
}

/// Minimisation LP over free variables, one per reachable state.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    variables: Vec<Discrete>,
    index: Vec<Option<VarIndex>>,
    objective: Vec<Continous>,
    constraints: Vec<Constraint>,
}

impl Model {
    /// State owning each variable, in variable order.
    pub fn variables(&self) -> &[Discrete] {
        &self.variables
    }

    pub fn var_of(&self, s: Discrete) -> Option<VarIndex> {
        self.index.get(s).copied().flatten()
    }

    pub fn state_of(&self, var: VarIndex) -> Discrete {
        self.variables[var.0]
    }

    pub fn objective(&self) -> &[Continous] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective_value(&self, x: &[Continous]) -> Continous {
        self.objective.iter().zip(x).map(|(c, x)| c * x).sum()
    }
}

pub struct ModelBuilder {
    probability_tolerance: Continous,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

impl ModelBuilder {
    pub fn new(probability_tolerance: Continous) -> Self {
        Self {
            probability_tolerance,
        }
    }

    /// Validates `problem` and emits one variable per reachable state and one
    /// row per reachable `(state, action)`.
    pub fn build(&self, problem: &MdpProblem) -> Result<Model> {
        self.validate(problem)?;

        let MdpProblem {
            tensors,
            gamma,
            partition,
        } = problem;
        let (n_s, n_a) = (tensors.n_s(), tensors.n_a());

        let variables = partition.reachable().to_vec();
        let mut index = vec![None; n_s];
        for (i, &s) in variables.iter().enumerate() {
            index[s] = Some(VarIndex(i));
        }

        let mut constraints = Vec::with_capacity(variables.len() * n_a);
        for (&s, a) in iproduct!(&variables, 0..n_a) {
            let mut coeffs = BTreeMap::new();
            if let Some(var) = index[s] {
                *coeffs.entry(var).or_insert(0.) += 1.;
            }
            for s_next in 0..n_s {
                let p = tensors.p[[s, a, s_next]];
                if p == 0. {
                    continue;
                }
                if let Some(var) = index[s_next] {
                    *coeffs.entry(var).or_insert(0.) -= gamma * p;
                }
            }

            constraints.push(Constraint {
                state: s,
                action: a,
                terms: coeffs.into_iter().filter(|&(_, c)| c != 0.).collect(),
                rhs: tensors.r[[s, a]],
            });
        }

        debug!(
            event = "model_built",
            variables = variables.len(),
            constraints = constraints.len(),
            gamma = *gamma,
        );

        Ok(Model {
            objective: vec![1.; variables.len()],
            variables,
            index,
            constraints,
        })
    }

    fn validate(&self, problem: &MdpProblem) -> Result<()> {
        let MdpProblem {
            tensors,
            gamma,
            partition,
        } = problem;
        let (n_s, n_a) = (tensors.n_s(), tensors.n_a());

        if !(0.0..=1.0).contains(gamma) {
            return Err(MdpError::invalid(format!("gamma must lie in [0, 1], got {gamma}")));
        }
        if partition.reachable().is_empty() {
            return Err(MdpError::invalid("reachable state set is empty"));
        }
        if n_a == 0 {
            return Err(MdpError::invalid("action space is empty"));
        }
        if tensors.p.dim() != (n_s, n_a, n_s) {
            return Err(MdpError::invalid(format!(
                "transition tensor has shape {:?}, expected {:?}",
                tensors.p.dim(),
                (n_s, n_a, n_s)
            )));
        }
        if partition.n_s() != n_s {
            return Err(MdpError::invalid(format!(
                "partition covers {} states but the tensors have {n_s}",
                partition.n_s()
            )));
        }

        for (&s, a) in iproduct!(partition.reachable(), 0..n_a) {
            let r = tensors.r[[s, a]];
            if !r.is_finite() {
                return Err(MdpError::invalid(format!("reward r({s}, {a}) = {r} is not finite")));
            }

            let mut mass = 0.;
            for s_next in 0..n_s {
                let p = tensors.p[[s, a, s_next]];
                if !(0.0..=1.0 + self.probability_tolerance).contains(&p) {
                    return Err(MdpError::invalid(format!(
                        "probability p({s}, {a}, {s_next}) = {p} is outside [0, 1]"
                    )));
                }
                if p > 0. && partition.kind(s_next) == Some(StateKind::Unreachable) {
                    warn!(
                        state = s,
                        action = a,
                        next_state = s_next,
                        probability = p,
                        "transition into an unreachable state, valued as 0"
                    );
                }
                mass += p;
            }

            if (mass - 1.).abs() > self.probability_tolerance {
                return Err(MdpError::invalid(format!(
                    "transition probabilities of ({s}, {a}) sum to {mass}, not 1"
                )));
            }
        }

        if *gamma == 1. {
            check_absorption(problem)?;
        }

        Ok(())
    }
}

/// Without discounting, the LP is bounded only if every reachable state can
/// leave the reachable set with positive probability under some actions.
fn check_absorption(problem: &MdpProblem) -> Result<()> {
    let MdpProblem {
        tensors, partition, ..
    } = problem;
    let (n_s, n_a) = (tensors.n_s(), tensors.n_a());

    let mut escapes = (0..n_s)
        .map(|s| !partition.is_reachable(s))
        .collect::<Vec<_>>();

    loop {
        let mut changed = false;
        for &s in partition.reachable() {
            if escapes[s] {
                continue;
            }
            let leaves = iproduct!(0..n_a, 0..n_s)
                .any(|(a, s_next)| tensors.p[[s, a, s_next]] > 0. && escapes[s_next]);
            if leaves {
                escapes[s] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    match partition.reachable().iter().find(|&&s| !escapes[s]) {
        Some(s) => Err(MdpError::invalid(format!(
            "gamma = 1 but state {s} can never reach a terminal state"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdps::{partition::StatePartition, tensors::Tensors};
    use float_eq::*;
    use ndarray::{Array2, Array3};

    /// 0 -> 1 -> 2 (terminal), one action.
    fn chain(gamma: Continous) -> MdpProblem {
        let r = Array2::from_shape_vec((3, 1), vec![1., 2., 0.]).unwrap();
        let mut p = Array3::<f64>::zeros((3, 1, 3));
        p[[0, 0, 1]] = 1.;
        p[[1, 0, 2]] = 1.;

        MdpProblem {
            tensors: Tensors::new(r, p),
            gamma,
            partition: StatePartition::new(3, [2], []).unwrap(),
        }
    }

    #[test]
    fn one_variable_per_reachable_state() {
        let model = ModelBuilder::default().build(&chain(0.5)).unwrap();

        assert_eq!(model.variables(), &[0, 1]);
        assert_eq!(model.var_of(1), Some(VarIndex(1)));
        assert_eq!(model.var_of(2), None);
        assert_eq!(model.var_of(99), None);
        assert_eq!(model.state_of(VarIndex(0)), 0);
        assert_eq!(model.objective(), &[1., 1.]);
    }

    #[test]
    fn terminal_successors_are_constants() {
        let model = ModelBuilder::default().build(&chain(0.5)).unwrap();
        let rows = model.constraints();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].terms, vec![(VarIndex(0), 1.), (VarIndex(1), -0.5)]);
        assert_float_eq!(rows[0].rhs, 1., abs <= 0.);
        assert_eq!(rows[1].terms, vec![(VarIndex(1), 1.)]);
        assert_float_eq!(rows[1].rhs, 2., abs <= 0.);
    }

    #[test]
    fn self_loops_merge_into_one_coefficient() {
        let mut problem = chain(0.5);
        problem.tensors.p[[0, 0, 1]] = 0.5;
        problem.tensors.p[[0, 0, 0]] = 0.5;

        let model = ModelBuilder::default().build(&problem).unwrap();

        assert_eq!(
            model.constraints()[0].terms,
            vec![(VarIndex(0), 0.75), (VarIndex(1), -0.25)]
        );
    }

    #[test]
    fn lhs_and_objective_evaluate_assignments() {
        let model = ModelBuilder::default().build(&chain(0.5)).unwrap();
        let x = [2., 2.];

        assert_float_eq!(model.constraints()[0].lhs(&x), 1., abs <= 1e-12);
        assert_float_eq!(model.objective_value(&x), 4., abs <= 1e-12);
    }

    #[test]
    fn half_mass_row_is_invalid() {
        let mut problem = chain(0.9);
        problem.tensors.p[[1, 0, 2]] = 0.5;

        let err = ModelBuilder::default().build(&problem).unwrap_err();

        assert!(matches!(err, MdpError::InvalidMdp(_)));
        assert!(err.to_string().contains("sum to 0.5"));
    }

    #[test]
    fn gamma_out_of_range_is_invalid() {
        for gamma in [-0.1, 1.01, Continous::NAN] {
            let err = ModelBuilder::default().build(&chain(gamma)).unwrap_err();
            assert!(matches!(err, MdpError::InvalidMdp(_)), "gamma = {gamma}");
        }
    }

    #[test]
    fn empty_reachable_set_is_invalid() {
        let mut problem = chain(0.9);
        problem.partition = StatePartition::new(3, [0, 1, 2], []).unwrap();

        let err = ModelBuilder::default().build(&problem).unwrap_err();

        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn undiscounted_trap_is_invalid() {
        let mut problem = chain(1.);
        problem.tensors.p[[1, 0, 2]] = 0.;
        problem.tensors.p[[1, 0, 1]] = 1.;

        let err = ModelBuilder::default().build(&problem).unwrap_err();

        assert!(err.to_string().contains("state 0 can never reach"));
    }

    #[test]
    fn undiscounted_chain_is_accepted() {
        assert!(ModelBuilder::default().build(&chain(1.)).is_ok());
    }

    #[test]
    fn mismatched_partition_is_invalid() {
        let mut problem = chain(0.9);
        problem.partition = StatePartition::new(4, [2, 3], []).unwrap();

        assert!(ModelBuilder::default().build(&problem).is_err());
    }
}
