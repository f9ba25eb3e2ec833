use crate::common::defs::*;
use crate::error::{MdpError, Result};
use std::collections::BTreeSet;

/// Which of the three disjoint classes a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Reachable,
    Terminal,
    Unreachable,
}

/// Split of `0..n_s` into reachable, terminal and unreachable states.
///
/// Only reachable states carry a decision variable. Terminal and unreachable
/// states have a fixed value of 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePartition {
    kinds: Vec<StateKind>,
    reachable: Vec<Discrete>,
}

impl StatePartition {
    /// Everything not named as terminal or unreachable is reachable.
    pub fn new<T, U>(n_s: usize, terminal: T, unreachable: U) -> Result<Self>
    where
        T: IntoIterator<Item = Discrete>,
        U: IntoIterator<Item = Discrete>,
    {
        let mut kinds = vec![StateKind::Reachable; n_s];

        for (set, kind) in [
            (terminal.into_iter().collect::<BTreeSet<_>>(), StateKind::Terminal),
            (unreachable.into_iter().collect::<BTreeSet<_>>(), StateKind::Unreachable),
        ] {
            for s in set {
                let slot = kinds.get_mut(s).ok_or_else(|| {
                    MdpError::invalid(format!("{kind:?} state {s} is outside 0..{n_s}"))
                })?;
                if *slot != StateKind::Reachable {
                    return Err(MdpError::invalid(format!(
                        "state {s} is both {:?} and {kind:?}",
                        *slot
                    )));
                }
                *slot = kind;
            }
        }

        let reachable = kinds
            .iter()
            .enumerate()
            .filter(|(_, &k)| k == StateKind::Reachable)
            .map(|(s, _)| s)
            .collect();

        Ok(Self { kinds, reachable })
    }

    pub fn n_s(&self) -> usize {
        self.kinds.len()
    }

    pub fn kind(&self, s: Discrete) -> Option<StateKind> {
        self.kinds.get(s).copied()
    }

    pub fn is_reachable(&self, s: Discrete) -> bool {
        self.kind(s) == Some(StateKind::Reachable)
    }

    /// Reachable states in increasing id order.
    pub fn reachable(&self) -> &[Discrete] {
        &self.reachable
    }

    pub fn terminal(&self) -> impl Iterator<Item = Discrete> + '_ {
        self.of_kind(StateKind::Terminal)
    }

    pub fn unreachable(&self) -> impl Iterator<Item = Discrete> + '_ {
        self.of_kind(StateKind::Unreachable)
    }

    fn of_kind(&self, kind: StateKind) -> impl Iterator<Item = Discrete> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .filter(move |(_, &k)| k == kind)
            .map(|(s, _)| s)
    }
}
