use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or driving a model
///
/// Construction errors (`InvalidRackLayout`, `MalformedAutomaton`, `ProbabilityMass`,
/// `InvalidProbability`, `Config`) abort the build entirely. Per-call errors (`UnreachableState`,
/// `IllegalAction`) leave the environment untouched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid rack layout: {0}")]
    InvalidRackLayout(String),

    #[error("State {0} is not in the reachable state space")]
    UnreachableState(String),

    #[error("Action {action} is not available in state {state}")]
    IllegalAction { action: String, state: String },

    #[error("Automaton has no transition from {state} on symbol {symbol}")]
    MalformedAutomaton { state: String, symbol: String },

    #[error("Outcome probabilities of state {state} under {action} sum to {total}, expected 1")]
    ProbabilityMass {
        state: usize,
        action: String,
        total: f64,
    },

    #[error("Outcome of state {state} under {action} has probability {prob}, outside [0, 1]")]
    InvalidProbability {
        state: usize,
        action: String,
        prob: f64,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
