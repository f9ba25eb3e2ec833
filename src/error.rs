//! Error types for LP planning.

use thiserror::Error;

/// Every way a build → solve → extract pipeline can fail.
#[derive(Debug, Error)]
pub enum MdpError {
    /// Malformed shapes, discount out of range, probability mass not summing to 1,
    /// or a value/transition entry missing where one is required.
    #[error("Invalid MDP: {0}")]
    InvalidMdp(String),

    /// No assignment satisfies every Bellman constraint.
    #[error("LP is infeasible")]
    Infeasible,

    /// The objective is unbounded below.
    #[error("LP is unbounded")]
    Unbounded,

    /// The backend failed or returned an assignment outside tolerance.
    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MdpError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidMdp(msg.into())
    }
}

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, MdpError>;
