use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use log::info;

use super::{
    state_space::StateSpace,
    transition::{check_mass, Transition, TransitionModel},
};
use crate::{env::Dynamics, error::Result};

/// An explicit finite MDP: the reachable state space and the transition structure over it
///
/// Built once and immutable afterwards. Share it between environments with an [`Arc`](std::sync::Arc).
#[derive(Clone, Debug)]
pub struct MdpModel<S, A> {
    states: StateSpace<S>,
    transitions: TransitionModel<A>,
}

impl<S, A> MdpModel<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Copy + Eq + Hash + Debug,
{
    /// Explore every state reachable from `initial` under the legal actions of `dynamics`
    ///
    /// The search is breadth-first. Each discovered state is enqueued exactly once and
    /// expanded exactly once, so state indices follow the order of discovery and the
    /// initial state has index `0`. Terminal states are recorded but not expanded.
    ///
    /// Any error reported by the dynamics, or a distribution whose probabilities do not sum
    /// to one, aborts the build.
    pub fn build<D>(dynamics: &D, initial: S) -> Result<Self>
    where
        D: Dynamics<State = S, Action = A>,
    {
        let mut states = StateSpace::new();
        let mut transitions = TransitionModel::with_capacity(64);
        let mut frontier = VecDeque::new();

        let (root, _) = states.insert(initial.clone());
        frontier.push_back((root, initial));

        while let Some((s, state)) = frontier.pop_front() {
            // FIFO order means rows are appended in index order
            debug_assert_eq!(s, transitions.num_states());

            if dynamics.is_terminal(&state) {
                transitions.push_row(Vec::new(), true);
                continue;
            }

            let actions = dynamics.available_actions(&state);
            let mut row = Vec::with_capacity(actions.len());
            for action in actions {
                let outcomes = dynamics.transition(&state, action)?;
                check_mass(s, &action, outcomes.iter().map(|o| o.prob))?;

                let mut indexed = Vec::with_capacity(outcomes.len());
                for outcome in outcomes {
                    let (next, fresh) = states.insert(outcome.next_state.clone());
                    if fresh {
                        frontier.push_back((next, outcome.next_state));
                    }
                    indexed.push(Transition {
                        next,
                        prob: outcome.prob,
                        reward: outcome.reward,
                    });
                }
                row.push((action, indexed));
            }
            transitions.push_row(row, false);
        }

        info!(
            "Explored {} states with {} state-action pairs",
            states.len(),
            transitions.num_pairs()
        );

        Ok(Self {
            states,
            transitions,
        })
    }

    /// Index of the initial state
    pub const fn initial(&self) -> usize {
        0
    }

    pub fn states(&self) -> &StateSpace<S> {
        &self.states
    }

    pub fn transitions(&self) -> &TransitionModel<A> {
        &self.transitions
    }

    /// Number of reachable states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The outcome distribution of `action` in `state`, with successors resolved to states
    ///
    /// `None` if the state is unreachable or the action is not available there.
    pub fn transition(&self, state: &S, action: A) -> Option<Vec<(&S, f64, f64)>> {
        let s = self.states.index(state)?;
        let outcomes = self.transitions.outcomes(s, action)?;
        outcomes
            .iter()
            .map(|t| Some((self.states.state_of(t.next)?, t.prob, t.reward)))
            .collect()
    }
}
