use super::Mdp;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::rc::Rc;

/// `(probability, next_state, reward, terminated)`, the tuple layout of `env.P[s][a]`.
type RawTransition = (Continous, Discrete, Continous, bool);

#[derive(Deserialize)]
struct TransitionsPayload {
    transitions: HashMap<String, HashMap<String, Vec<RawTransition>>>,
}

/// An MDP whose transition table was handed over as data.
#[derive(Debug, Clone)]
pub struct TabularMdp {
    n_s: usize,
    n_a: usize,
    transitions: Rc<Transitions>,
}

impl TabularMdp {
    pub fn new(n_s: usize, n_a: usize, transitions: Transitions) -> Self {
        Self {
            n_s,
            n_a,
            transitions: Rc::new(transitions),
        }
    }

    /// Parses the body of gymnasium-http-api's `GET /v1/envs/<id>/transitions/`.
    ///
    /// State and action keys must be the decimal ids `0..n` with every state
    /// listing the same actions.
    pub fn from_json(json: &str) -> Result<Self> {
        let payload: TransitionsPayload = serde_json::from_str(json)?;

        let n_s = payload.transitions.len();
        let n_a = payload
            .transitions
            .values()
            .next()
            .map(|acts| acts.len())
            .unwrap_or_default();

        let mut transitions: Transitions = HashMap::new();
        for (s_key, acts) in &payload.transitions {
            let s = parse_id(s_key, n_s, "state")?;
            if acts.len() != n_a {
                return Err(MdpError::invalid(format!(
                    "state {s} lists {} actions, expected {n_a}",
                    acts.len()
                )));
            }
            for (a_key, ts) in acts {
                let a = parse_id(a_key, n_a, "action")?;
                let ts = ts
                    .iter()
                    .map(|&(probability, next_state, reward, done)| Transition {
                        probability,
                        next_state,
                        reward,
                        done,
                    })
                    .collect();
                transitions.insert((s, a), ts);
            }
        }

        Ok(Self::new(n_s, n_a, transitions))
    }
}

fn parse_id(key: &str, n: usize, what: &str) -> Result<Discrete> {
    key.parse::<Discrete>()
        .ok()
        .filter(|&id| id < n)
        .ok_or_else(|| MdpError::invalid(format!("{what} key '{key}' is not an id in 0..{n}")))
}

impl Mdp for TabularMdp {
    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }
}
