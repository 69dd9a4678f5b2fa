/// Automata that track task progress
pub mod dfa;

/// Environment and dynamics traits
pub mod env;

/// Crate error type
pub mod error;

/// Explicit MDP construction, products with automata, and the step/reset facade
pub mod mdp;

/// Environment registration
pub mod registration;

/// Rendering collaborators
pub mod render;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use error::{Error, Result};
