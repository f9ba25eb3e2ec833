pub mod partition;
pub mod tabular;
pub mod tensors;

use crate::common::defs::*;
use std::rc::Rc;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Only the model is exposed here; the discount is chosen per solve.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    fn transitions(&self) -> Rc<Transitions>;
}
