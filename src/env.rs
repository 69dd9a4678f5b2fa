use std::{fmt::Debug, hash::Hash};

use crate::error::Result;

/// A single possible result of taking an action in a state
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<S> {
    pub next_state: S,
    pub prob: f64,
    pub reward: f64,
}

impl<S> Outcome<S> {
    /// An outcome that happens with certainty
    pub fn certain(next_state: S, reward: f64) -> Self {
        Self {
            next_state,
            prob: 1.0,
            reward,
        }
    }
}

/// The full dynamics of a finite Markov decision process
///
/// Anything implementing this capability can be explored into an explicit
/// [`MdpModel`](crate::mdp::MdpModel) and driven through an [`MdpEnv`](crate::mdp::MdpEnv).
/// Implementors are stateless with respect to the agent: every query names the state it is about.
pub trait Dynamics {
    /// A value-typed state, compared by structural equality
    type State: Clone + Eq + Hash + Debug;

    /// An action an agent can take
    type Action: Copy + Eq + Hash + Debug;

    /// The legal actions in `state`
    ///
    /// Terminal states are never queried.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// The distribution over successor states and rewards for taking `action` in `state`
    ///
    /// Only called with actions returned by [`available_actions`](Dynamics::available_actions).
    /// The returned list must be nonempty and its probabilities must sum to one.
    fn transition(
        &self,
        state: &Self::State,
        action: Self::Action,
    ) -> Result<Vec<Outcome<Self::State>>>;

    /// Determine if the state is terminal
    fn is_terminal(&self, state: &Self::State) -> bool;
}

/// Auxiliary diagnostics for a single [`Step`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepInfo {
    /// Index of the new state in the model's state space
    pub state_index: usize,
    /// Probability of the sampled outcome
    pub probability: f64,
    /// Steps taken since the last reset
    pub steps: usize,
    /// Whether the episode hit its time limit on this step
    pub truncated: bool,
}

/// The result of [`Environment::step`]
#[derive(Clone, Debug, PartialEq)]
pub struct Step<O> {
    pub observation: O,
    pub reward: f64,
    /// `true` iff the new state is terminal
    pub done: bool,
    pub info: StepInfo,
}

/// A stateful environment an agent interacts with one step at a time
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Get the available actions for the current state
    fn actions(&self) -> Vec<Self::Action>;

    /// Determine if the current state is active or terminal
    fn is_active(&self) -> bool;

    /// Update the environment in response to an action taken by an agent
    ///
    /// An action that is not available leaves the environment untouched and returns an error.
    fn step(&mut self, action: Self::Action) -> Result<Step<Self::State>>;

    /// Reset the environment to its initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}
