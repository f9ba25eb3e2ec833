use super::model::{Model, VarIndex};
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Reachable state → optimal value.
pub type ValueFunction = BTreeMap<Discrete, Continous>;

/// Optimal assignment of a [`Model`].
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub values: ValueFunction,
    pub objective: Continous,
}

/// Simplex backend. Holds no state between solves.
pub struct LpSolver {
    feasibility_tolerance: Continous,
}

impl Default for LpSolver {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

impl LpSolver {
    pub fn new(feasibility_tolerance: Continous) -> Self {
        Self {
            feasibility_tolerance,
        }
    }

    /// Takes ownership of the model: it is not reused once solved.
    pub fn solve(&self, model: Model) -> Result<LpSolution> {
        info!(
            event = "solve_start",
            variables = model.variables().len(),
            constraints = model.constraints().len(),
        );

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars = model
            .objective()
            .iter()
            .map(|&c| problem.add_var(c, (Continous::NEG_INFINITY, Continous::INFINITY)))
            .collect::<Vec<Variable>>();

        let mut skipped = 0;
        for row in model.constraints() {
            if row.terms.is_empty() {
                // 0 >= rhs
                if row.rhs > self.tolerance_for(row.rhs) {
                    return Err(MdpError::Infeasible);
                }
                skipped += 1;
                continue;
            }

            let mut expr = LinearExpr::empty();
            for &(VarIndex(i), c) in &row.terms {
                expr.add(vars[i], c);
            }
            problem.add_constraint(expr, ComparisonOp::Ge, row.rhs);
        }
        debug!(event = "rows_skipped", count = skipped);

        let solution = problem.solve().map_err(|e| match e {
            microlp::Error::Infeasible => MdpError::Infeasible,
            microlp::Error::Unbounded => MdpError::Unbounded,
            #[allow(unreachable_patterns)]
            other => MdpError::Numerical(other.to_string()),
        })?;

        let x = vars.iter().map(|&v| solution[v]).collect::<Vec<_>>();
        self.verify(&model, &x)?;

        let objective = model.objective_value(&x);
        info!(event = "solve_end", objective = objective);

        Ok(LpSolution {
            values: model.variables().iter().copied().zip(x).collect(),
            objective,
        })
    }

    fn tolerance_for(&self, rhs: Continous) -> Continous {
        self.feasibility_tolerance * rhs.abs().max(1.)
    }

    fn verify(&self, model: &Model, x: &[Continous]) -> Result<()> {
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(MdpError::Numerical(format!(
                "value of state {} is {}",
                model.state_of(VarIndex(i)),
                x[i]
            )));
        }

        for row in model.constraints() {
            let violation = row.rhs - row.lhs(x);
            if violation > self.tolerance_for(row.rhs) {
                return Err(MdpError::Numerical(format!(
                    "constraint for state {}, action {} violated by {violation}",
                    row.state, row.action
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::MdpProblem;
    use super::*;
    use crate::algos::model_based::mdp::lp::model::ModelBuilder;
    use crate::mdps::{partition::StatePartition, tensors::Tensors};
    use float_eq::*;
    use ndarray::{Array2, Array3};

    fn self_loop(reward: Continous, gamma: Continous) -> MdpProblem {
        // state 0 loops on action 0, exits to terminal 1 on action 1
        let r = Array2::from_shape_vec((2, 2), vec![reward, 0., 0., 0.]).unwrap();
        let mut p = Array3::<f64>::zeros((2, 2, 2));
        p[[0, 0, 0]] = 1.;
        p[[0, 1, 1]] = 1.;

        MdpProblem {
            tensors: Tensors::new(r, p),
            gamma,
            partition: StatePartition::new(2, [1], []).unwrap(),
        }
    }

    fn solve(problem: &MdpProblem) -> Result<LpSolution> {
        let model = ModelBuilder::default().build(problem)?;
        LpSolver::default().solve(model)
    }

    #[test]
    fn geometric_series() {
        let sol = solve(&self_loop(1., 0.9)).unwrap();

        assert_float_eq!(sol.values[&0], 10., abs <= 1e-6);
        assert_float_eq!(sol.objective, 10., abs <= 1e-6);
    }

    #[test]
    fn leaving_beats_a_negative_loop() {
        let sol = solve(&self_loop(-1., 1.)).unwrap();

        assert_float_eq!(sol.values[&0], 0., abs <= 1e-6);
    }

    #[test]
    fn undiscounted_positive_loop_is_infeasible() {
        let err = solve(&self_loop(1., 1.)).unwrap_err();

        assert!(matches!(err, MdpError::Infeasible));
    }

    #[test]
    fn solves_are_independent() {
        let a = solve(&self_loop(1., 0.5)).unwrap();
        let _ = solve(&self_loop(3., 0.9)).unwrap();
        let b = solve(&self_loop(1., 0.5)).unwrap();

        assert_eq!(a, b);
        assert_float_eq!(a.values[&0], 2., abs <= 1e-6);
    }
}
