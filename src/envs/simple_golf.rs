use crate::common::defs::*;
use crate::mdps::Mdp;
use std::rc::Rc;

/// https://towardsdatascience.com/reinforcement-learning-an-easy-introduction-to-value-iteration-e4cfe0731fd5
///
/// States: 0 fairway, 1 green, 2 in the hole (terminal).
/// Actions: 0 hit to green, 1 hit to fairway, 2 hit in hole.
/// Shots that make no sense from a lie leave the ball where it is.
pub struct SimpleGolf {
    n_s: usize,
    n_a: usize,
    transitions: Rc<Transitions>,
}

impl SimpleGolf {
    pub const FAIRWAY: Discrete = 0;
    pub const GREEN: Discrete = 1;
    pub const HOLE: Discrete = 2;

    pub fn new() -> Self {
        let stay = |s| vec![Transition::new(1., s, 0., s == Self::HOLE)];

        let transitions = Transitions::from([
            (
                (Self::FAIRWAY, 0),
                vec![
                    Transition::new(0.9, Self::GREEN, 0., false),
                    Transition::new(0.1, Self::FAIRWAY, 0., false),
                ],
            ),
            ((Self::FAIRWAY, 1), stay(Self::FAIRWAY)),
            ((Self::FAIRWAY, 2), stay(Self::FAIRWAY)),
            ((Self::GREEN, 0), stay(Self::GREEN)),
            (
                (Self::GREEN, 1),
                vec![
                    Transition::new(0.9, Self::FAIRWAY, 0., false),
                    Transition::new(0.1, Self::GREEN, 0., false),
                ],
            ),
            (
                (Self::GREEN, 2),
                vec![
                    Transition::new(0.9, Self::HOLE, 10., true),
                    Transition::new(0.1, Self::GREEN, 0., false),
                ],
            ),
            ((Self::HOLE, 0), stay(Self::HOLE)),
            ((Self::HOLE, 1), stay(Self::HOLE)),
            ((Self::HOLE, 2), stay(Self::HOLE)),
        ]);

        Self {
            n_s: 3,
            n_a: 3,
            transitions: Rc::new(transitions),
        }
    }
}

impl Default for SimpleGolf {
    fn default() -> Self {
        Self::new()
    }
}

impl Mdp for SimpleGolf {
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
