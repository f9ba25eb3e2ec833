//! Exact planning by linear programming: build → solve → extract.
//!
//! Ref: Puterman 1994, §6.9 "Linear Programming".

pub mod export;
pub mod model;
pub mod policy;
pub mod solver;

use super::MdpSolver;
use crate::common::defs::*;
use crate::config::LpConfig;
use crate::error::Result;
use crate::mdps::{
    partition::{StateKind, StatePartition},
    tensors::Tensors,
    Mdp,
};
use model::{Model, ModelBuilder};
use policy::{Policy, PolicyExtractor, QTable};
use serde::Serialize;
use solver::{LpSolver, ValueFunction};
use std::rc::Rc;
use tracing::info;

/// Everything one solve reads: `(r, p, gamma, partition)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MdpProblem {
    pub tensors: Tensors,
    pub gamma: Continous,
    pub partition: StatePartition,
}

/// Result of one solve. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpPlan {
    objective: Continous,
    values: ValueFunction,
    policy: Policy,
    #[serde(skip)]
    q_values: QTable,
    #[serde(skip)]
    partition: StatePartition,
}

impl LpPlan {
    /// `Σ v(s)` over reachable states.
    pub fn objective(&self) -> Continous {
        self.objective
    }

    /// Optimal value of every reachable state.
    pub fn values(&self) -> &ValueFunction {
        &self.values
    }

    /// [`LpPlan::values`] plus the fixed 0 of every terminal state.
    pub fn values_with_terminals(&self) -> ValueFunction {
        let mut values = self.values.clone();
        values.extend(self.partition.terminal().map(|s| (s, 0.)));
        values
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn q_values(&self) -> &QTable {
        &self.q_values
    }
}

impl MdpSolver for LpPlan {
    fn v_star(&self, s: Discrete) -> Option<Continous> {
        match self.partition.kind(s)? {
            StateKind::Reachable => self.values.get(&s).copied(),
            StateKind::Terminal => Some(0.),
            StateKind::Unreachable => None,
        }
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        self.q_values.get(&(s, a)).copied()
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        self.policy.get(&s).copied()
    }
}

pub struct LinearProgramming {
    mdp: Rc<dyn Mdp>,
    problem: MdpProblem,
    config: LpConfig,
}

impl LinearProgramming {
    /// Reduces the oracle to `(r, p)` once; the discount comes from `config`.
    pub fn new(mdp: Rc<dyn Mdp>, partition: StatePartition, config: LpConfig) -> Result<Self> {
        let tensors = Tensors::from_mdp(mdp.as_ref(), &partition)?;
        let problem = MdpProblem {
            tensors,
            gamma: config.gamma,
            partition,
        };

        Ok(Self {
            mdp,
            problem,
            config,
        })
    }

    pub fn problem(&self) -> &MdpProblem {
        &self.problem
    }

    pub fn build_model(&self) -> Result<Model> {
        ModelBuilder::new(self.config.probability_tolerance).build(&self.problem)
    }

    /// Solves `model`, which must come from [`LinearProgramming::build_model`],
    /// and extracts the greedy policy from the raw transitions.
    pub fn solve_model(&self, model: Model) -> Result<LpPlan> {
        let solution = LpSolver::new(self.config.feasibility_tolerance).solve(model)?;

        let transitions = self.mdp.transitions();
        let greedy = PolicyExtractor::new(
            &transitions,
            &self.problem.partition,
            self.problem.tensors.n_a(),
            self.problem.gamma,
        )
        .extract(&solution.values)?;

        info!(
            event = "plan_ready",
            states = solution.values.len(),
            objective = solution.objective,
        );

        Ok(LpPlan {
            objective: solution.objective,
            values: solution.values,
            policy: greedy.policy,
            q_values: greedy.q_values,
            partition: self.problem.partition.clone(),
        })
    }

    pub fn exec(&self) -> Result<LpPlan> {
        let model = self.build_model()?;
        self.solve_model(model)
    }
}

/// One-shot solve with default tolerances.
pub fn solve_mdp<T, U>(mdp: Rc<dyn Mdp>, terminal: T, unreachable: U, gamma: Continous) -> Result<LpPlan>
where
    T: IntoIterator<Item = Discrete>,
    U: IntoIterator<Item = Discrete>,
{
    let partition = StatePartition::new(mdp.n_s(), terminal, unreachable)?;
    LinearProgramming::new(mdp, partition, LpConfig::default().with_gamma(gamma))?.exec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::simple_golf::SimpleGolf;
    use crate::error::MdpError;
    use float_eq::*;
    use rstest::rstest;

    fn golf(gamma: Continous) -> LpPlan {
        solve_mdp(Rc::new(SimpleGolf::new()), [SimpleGolf::HOLE], [], gamma).unwrap()
    }

    #[test]
    fn simple_golf_discounted() {
        let plan = golf(0.9);

        assert_float_eq!(plan.v_star(SimpleGolf::GREEN).unwrap(), 9. / 0.91, abs <= 1e-6);
        assert_float_eq!(
            plan.v_star(SimpleGolf::FAIRWAY).unwrap(),
            0.81 * (9. / 0.91) / 0.91,
            abs <= 1e-6
        );
        assert_eq!(plan.pi_star(SimpleGolf::FAIRWAY), Some(0));
        assert_eq!(plan.pi_star(SimpleGolf::GREEN), Some(2));
    }

    #[rstest]
    #[case(0.5)]
    #[case(0.9)]
    #[case(1.)]
    fn terminal_value_is_fixed_at_zero(#[case] gamma: Continous) {
        let plan = golf(gamma);

        assert_eq!(plan.v_star(SimpleGolf::HOLE), Some(0.));
        assert_eq!(plan.pi_star(SimpleGolf::HOLE), None);
        assert_eq!(plan.q_star(SimpleGolf::HOLE, 0), None);
        assert_eq!(plan.values_with_terminals()[&SimpleGolf::HOLE], 0.);
        assert!(!plan.values().contains_key(&SimpleGolf::HOLE));
    }

    #[test]
    fn undiscounted_golf_always_sinks_the_putt() {
        let plan = golf(1.);

        assert_float_eq!(plan.v_star(SimpleGolf::FAIRWAY).unwrap(), 10., abs <= 1e-6);
        assert_float_eq!(plan.v_star(SimpleGolf::GREEN).unwrap(), 10., abs <= 1e-6);
        assert_float_eq!(plan.objective(), 20., abs <= 1e-5);
    }

    #[test]
    fn q_star_matches_v_star_at_the_greedy_action() {
        let plan = golf(0.9);

        for s in [SimpleGolf::FAIRWAY, SimpleGolf::GREEN] {
            let a = plan.pi_star(s).unwrap();
            assert_float_eq!(plan.q_star(s, a).unwrap(), plan.v_star(s).unwrap(), abs <= 1e-6);
        }
    }

    #[test]
    fn unreachable_states_have_no_value() {
        let plan = solve_mdp(Rc::new(SimpleGolf::new()), [SimpleGolf::HOLE], [], 0.9).unwrap();

        assert_eq!(plan.v_star(42), None);
    }

    #[test]
    fn build_then_solve_equals_exec() {
        let mdp: Rc<dyn Mdp> = Rc::new(SimpleGolf::new());
        let partition = StatePartition::new(3, [SimpleGolf::HOLE], []).unwrap();
        let lp = LinearProgramming::new(mdp, partition, LpConfig::default().with_gamma(0.8)).unwrap();

        let model = lp.build_model().unwrap();
        assert_eq!(model.constraints().len(), 6);

        assert_eq!(lp.solve_model(model).unwrap(), lp.exec().unwrap());
        assert_float_eq!(lp.problem().gamma, 0.8, abs <= 0.);
    }

    #[test]
    fn invalid_gamma_fails_before_solving() {
        let err = solve_mdp(Rc::new(SimpleGolf::new()), [SimpleGolf::HOLE], [], 1.2).unwrap_err();

        assert!(matches!(err, MdpError::InvalidMdp(_)));
    }

    #[test]
    fn plan_serializes_values_and_policy() {
        let json = serde_json::to_value(golf(0.9)).unwrap();

        assert_eq!(json["policy"]["1"], 2);
        assert!(json.get("q_values").is_none());
    }
}
