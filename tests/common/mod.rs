use itertools::iproduct;
use mdp_lp::{mdps::tabular::TabularMdp, *};
use rand::prelude::*;
use std::collections::HashMap;

/// `max_a [r(s,a) + gamma Σ p(s,a,s') v(s')] - v(s)` for every reachable state.
#[allow(dead_code)]
pub fn bellman_residuals(plan: &LpPlan, problem: &MdpProblem) -> Vec<Continous> {
    let MdpProblem {
        tensors,
        gamma,
        partition,
    } = problem;
    let v = plan.values_with_terminals();
    let value = |s: Discrete| v.get(&s).copied().unwrap_or_default();

    partition
        .reachable()
        .iter()
        .map(|&s| {
            let best = (0..tensors.n_a())
                .map(|a| {
                    tensors.r[[s, a]]
                        + gamma
                            * (0..tensors.n_s())
                                .map(|s_next| tensors.p[[s, a, s_next]] * value(s_next))
                                .sum::<Continous>()
                })
                .fold(Continous::NEG_INFINITY, Continous::max);
            best - value(s)
        })
        .collect()
}

/// `n_s - 1` reachable states and one terminal state (the last). Every action
/// spreads its mass over three random successors.
#[allow(dead_code)]
pub fn random_mdp(seed: u64, n_s: usize, n_a: usize) -> TabularMdp {
    let rng = &mut StdRng::seed_from_u64(seed);
    let terminal = n_s - 1;

    let mut transitions = HashMap::new();
    for (s, a) in iproduct!(0..n_s, 0..n_a) {
        if s == terminal {
            transitions.insert((s, a), vec![Transition::new(1., s, 0., true)]);
            continue;
        }

        let weights = (0..3).map(|_| rng.gen_range(0.1..1.0)).collect::<Vec<Continous>>();
        let total = weights.iter().sum::<Continous>();
        let ts = weights
            .iter()
            .map(|w| {
                let next = rng.gen_range(0..n_s);
                Transition::new(w / total, next, rng.gen_range(-1.0..1.0), next == terminal)
            })
            .collect();
        transitions.insert((s, a), ts);
    }

    TabularMdp::new(n_s, n_a, transitions)
}

#[allow(dead_code)]
pub fn lp_for(mdp: std::rc::Rc<dyn Mdp>, terminal: &[Discrete], unreachable: &[Discrete], gamma: Continous) -> LinearProgramming {
    let partition = StatePartition::new(
        mdp.n_s(),
        terminal.iter().copied(),
        unreachable.iter().copied(),
    )
    .unwrap();
    LinearProgramming::new(mdp, partition, LpConfig::default().with_gamma(gamma)).unwrap()
}
