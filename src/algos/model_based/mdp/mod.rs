pub mod lp;

use crate::common::defs::*;

/// Answers for a solved MDP. `None` where the quantity is undefined, e.g. the
/// action of a terminal state.
pub trait MdpSolver {
    fn v_star(&self, s: Discrete) -> Option<Continous>;

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    fn pi_star(&self, s: Discrete) -> Option<Discrete>;
}
