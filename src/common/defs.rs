use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type Discrete = usize;
pub type Continous = f64;

/// One outcome of taking an action in a state, as exposed by gymnasium's `env.P[s][a]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub probability: Continous,
    pub next_state: Discrete,
    pub reward: Continous,
    pub done: bool,
}

impl Transition {
    pub fn new(probability: Continous, next_state: Discrete, reward: Continous, done: bool) -> Self {
        Self {
            probability,
            next_state,
            reward,
            done,
        }
    }
}

pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;
