use super::{partition::StatePartition, Mdp};
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use itertools::iproduct;
use ndarray::{Array2, Array3};

/// Expected reward `r[s, a]` and transition probability `p[s, a, s']`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensors {
    pub r: Array2<Continous>,
    pub p: Array3<Continous>,
}

impl Tensors {
    pub fn new(r: Array2<Continous>, p: Array3<Continous>) -> Self {
        Self { r, p }
    }

    /// Weighted-sum reduction of the oracle over reachable states. Rows of
    /// terminal and unreachable states stay zero.
    pub fn from_mdp(mdp: &dyn Mdp, partition: &StatePartition) -> Result<Self> {
        let (n_s, n_a) = (mdp.n_s(), mdp.n_a());
        if partition.n_s() != n_s {
            return Err(MdpError::invalid(format!(
                "partition covers {} states but the MDP has {n_s}",
                partition.n_s()
            )));
        }

        let transitions = mdp.transitions();
        let mut r = Array2::zeros((n_s, n_a));
        let mut p = Array3::zeros((n_s, n_a, n_s));

        for (&s, a) in iproduct!(partition.reachable(), 0..n_a) {
            let ts = transitions.get(&(s, a)).ok_or_else(|| {
                MdpError::invalid(format!("no transitions for state {s}, action {a}"))
            })?;
            for t in ts {
                if t.next_state >= n_s {
                    return Err(MdpError::invalid(format!(
                        "transition ({s}, {a}) leads to state {} outside 0..{n_s}",
                        t.next_state
                    )));
                }
                r[[s, a]] += t.probability * t.reward;
                p[[s, a, t.next_state]] += t.probability;
            }
        }

        Ok(Self { r, p })
    }

    pub fn n_s(&self) -> usize {
        self.r.nrows()
    }

    pub fn n_a(&self) -> usize {
        self.r.ncols()
    }
}
