use super::solver::ValueFunction;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::partition::{StateKind, StatePartition};
use std::collections::BTreeMap;

/// Reachable state → greedy action.
pub type Policy = BTreeMap<Discrete, Discrete>;

/// `(state, action)` → one-step lookahead value.
pub type QTable = BTreeMap<(Discrete, Discrete), Continous>;

#[derive(Debug, Clone, PartialEq)]
pub struct Greedy {
    pub policy: Policy,
    pub q_values: QTable,
}

/// One-step Bellman lookahead on the raw transitions, not on the LP.
pub struct PolicyExtractor<'a> {
    transitions: &'a Transitions,
    partition: &'a StatePartition,
    n_a: usize,
    gamma: Continous,
}

impl<'a> PolicyExtractor<'a> {
    pub fn new(
        transitions: &'a Transitions,
        partition: &'a StatePartition,
        n_a: usize,
        gamma: Continous,
    ) -> Self {
        Self {
            transitions,
            partition,
            n_a,
            gamma,
        }
    }

    /// `π(s) = argmax_a Q(s,a)` for every reachable `s`. Ties go to the lowest
    /// action index.
    pub fn extract(&self, v: &ValueFunction) -> Result<Greedy> {
        let mut policy = Policy::new();
        let mut q_values = QTable::new();

        for &s in self.partition.reachable() {
            let mut best: Option<(Discrete, Continous)> = None;
            for a in 0..self.n_a {
                let q = self.q(v, s, a)?;
                q_values.insert((s, a), q);
                // strict: an equal Q later in the scan never displaces the first
                if best.map_or(true, |(_, q_max)| q > q_max) {
                    best = Some((a, q));
                }
            }

            let (a, _) = best.ok_or_else(|| {
                MdpError::invalid(format!("no action has a comparable Q-value in state {s}"))
            })?;
            policy.insert(s, a);
        }

        Ok(Greedy { policy, q_values })
    }

    /// `Q(s,a) = Σ prob · (reward + gamma · v(s'))`.
    pub fn q(&self, v: &ValueFunction, s: Discrete, a: Discrete) -> Result<Continous> {
        let ts = self.transitions.get(&(s, a)).ok_or_else(|| {
            MdpError::invalid(format!("no transitions for state {s}, action {a}"))
        })?;

        ts.iter().try_fold(0., |acc, t| -> Result<Continous> {
            Ok(acc + t.probability * (t.reward + self.gamma * self.value_of(v, t.next_state)?))
        })
    }

    fn value_of(&self, v: &ValueFunction, s: Discrete) -> Result<Continous> {
        if let Some(&value) = v.get(&s) {
            return Ok(value);
        }

        match self.partition.kind(s) {
            Some(StateKind::Terminal | StateKind::Unreachable) => Ok(0.),
            Some(StateKind::Reachable) => Err(MdpError::invalid(format!(
                "value function has no entry for reachable state {s}"
            ))),
            None => Err(MdpError::invalid(format!(
                "successor {s} is outside 0..{}",
                self.partition.n_s()
            ))),
        }
    }
}
