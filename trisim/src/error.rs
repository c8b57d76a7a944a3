//! Error types for the simulation core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Rejected preset or parameter set. The engine keeps its prior state.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two bodies sit on top of each other while softening is zero.
    #[error("degenerate configuration: bodies {first} and {second} have zero separation with zero softening")]
    DegenerateConfiguration { first: usize, second: usize },

    /// Non-positive (or non-finite) step size handed to an integrator.
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f64),
}

pub type Result<T> = std::result::Result<T, EngineError>;
