use crate::common::defs::*;
use crate::mdps::Mdp;
use itertools::iproduct;
use std::ops::RangeInclusive;
use std::rc::Rc;

/// Refer: https://gymnasium.farama.org/environments/toy_text/cliff_walking/
///
/// 4x12 grid, start at the bottom-left corner, goal at the bottom-right, cliff
/// in between. Each move costs -1; stepping into the cliff costs -100 and
/// sends the agent back to the start.
pub struct CliffWalking {
    transitions: Rc<Transitions>,
}

impl CliffWalking {
    pub const ROWS: usize = 4;
    pub const COLS: usize = 12;
    pub const START: Discrete = 36;
    pub const GOAL: Discrete = 47;
    pub const CLIFF: RangeInclusive<Discrete> = 37..=46;

    pub const UP: Discrete = 0;
    pub const RIGHT: Discrete = 1;
    pub const DOWN: Discrete = 2;
    pub const LEFT: Discrete = 3;

    pub fn new() -> Self {
        let transitions = iproduct!(0..Self::ROWS * Self::COLS, 0..4)
            .map(|(s, a)| ((s, a), vec![Self::step(s, a)]))
            .collect::<Transitions>();

        Self {
            transitions: Rc::new(transitions),
        }
    }

    /// The player never rests on the goal.
    pub fn terminal_states(&self) -> Vec<Discrete> {
        vec![Self::GOAL]
    }

    /// The player never rests on the cliff either; falling resets to the start.
    pub fn unreachable_states(&self) -> Vec<Discrete> {
        Self::CLIFF.collect()
    }

    fn step(s: Discrete, a: Discrete) -> Transition {
        let (row, col) = (s / Self::COLS, s % Self::COLS);
        let (row, col) = match a {
            Self::UP => (row.saturating_sub(1), col),
            Self::RIGHT => (row, (col + 1).min(Self::COLS - 1)),
            Self::DOWN => ((row + 1).min(Self::ROWS - 1), col),
            _ => (row, col.saturating_sub(1)),
        };
        let next = row * Self::COLS + col;

        if Self::CLIFF.contains(&next) {
            Transition::new(1., Self::START, -100., false)
        } else {
            Transition::new(1., next, -1., next == Self::GOAL)
        }
    }
}

impl Default for CliffWalking {
    fn default() -> Self {
        Self::new()
    }
}

impl Mdp for CliffWalking {
    fn n_s(&self) -> usize {
        Self::ROWS * Self::COLS
    }

    fn n_a(&self) -> usize {
        4
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }
}
