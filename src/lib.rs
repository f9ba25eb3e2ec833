//! Exact planning for small, fully known MDPs: the Bellman optimality
//! equations are solved as a linear program and the greedy policy is read off
//! the optimal value function.

pub mod algos;
pub mod common;
pub mod config;
pub mod envs;
pub mod error;
pub mod mdps;
pub mod ui;

pub use algos::model_based::mdp::{
    lp::{solve_mdp, LinearProgramming, LpPlan, MdpProblem},
    MdpSolver,
};
pub use common::defs::*;
pub use config::LpConfig;
pub use error::{MdpError, Result};
pub use mdps::{partition::StatePartition, tensors::Tensors, Mdp};
