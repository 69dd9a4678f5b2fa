use std::{fmt::Debug, hash::Hash};

use log::info;

use super::MdpModel;
use crate::{
    dfa::Automaton,
    env::{Dynamics, Outcome},
    error::{Error, Result},
};

/// A state of the product of an MDP with an automaton
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProductState<Q> {
    /// Index of the MDP state in the base model
    pub mdp: usize,
    /// State of the automaton
    pub dfa: Q,
}

impl<Q> ProductState<Q> {
    /// Resolve the MDP component against the base model the product was built from
    pub fn base_state<'b, S, A>(&self, base: &'b MdpModel<S, A>) -> Option<&'b S>
    where
        S: Clone + Eq + Hash + Debug,
        A: Copy + Eq + Hash + Debug,
    {
        base.states().state_of(self.mdp)
    }
}

/// Dynamics of the product, derived from an explored base model
///
/// The automaton reads the label of the state the MDP moves *into*.
struct ProductDynamics<'a, S, A, M, L> {
    base: &'a MdpModel<S, A>,
    dfa: &'a M,
    label: L,
}

impl<S, A, M, L> Dynamics for ProductDynamics<'_, S, A, M, L>
where
    S: Clone + Eq + Hash + Debug,
    A: Copy + Eq + Hash + Debug,
    M: Automaton,
    L: Fn(&S) -> M::Symbol,
{
    type State = ProductState<M::State>;
    type Action = A;

    fn available_actions(&self, state: &Self::State) -> Vec<A> {
        self.base.transitions().actions(state.mdp).collect()
    }

    fn transition(&self, state: &Self::State, action: A) -> Result<Vec<Outcome<Self::State>>> {
        let outcomes = self
            .base
            .transitions()
            .outcomes(state.mdp, action)
            .ok_or_else(|| Error::IllegalAction {
                action: format!("{action:?}"),
                state: format!("{state:?}"),
            })?;

        outcomes
            .iter()
            .map(|t| -> Result<Outcome<Self::State>> {
                let next = self
                    .base
                    .states()
                    .state_of(t.next)
                    .ok_or_else(|| Error::UnreachableState(t.next.to_string()))?;
                let symbol = (self.label)(next);
                let q = self.dfa.next(&state.dfa, &symbol).ok_or_else(|| {
                    Error::MalformedAutomaton {
                        state: format!("{:?}", state.dfa),
                        symbol: format!("{symbol:?}"),
                    }
                })?;

                Ok(Outcome {
                    next_state: ProductState {
                        mdp: t.next,
                        dfa: q,
                    },
                    prob: t.prob,
                    reward: t.reward,
                })
            })
            .collect()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        self.dfa.status(&state.dfa).is_sink() || self.base.transitions().is_terminal(state.mdp)
    }
}

/// Build the reachable product of `base` with `dfa`
///
/// The search starts at `(base.initial(), dfa.initial())`. A product state whose automaton
/// component is accepting or rejecting is terminal and is not expanded. Every
/// `(automaton state, label)` pair met while expanding a non-terminal state must have a
/// defined transition, otherwise the construction fails with [`Error::MalformedAutomaton`].
///
/// Actions, probabilities and rewards are those of the base model.
pub fn product<S, A, M, L>(
    base: &MdpModel<S, A>,
    dfa: &M,
    label: L,
) -> Result<MdpModel<ProductState<M::State>, A>>
where
    S: Clone + Eq + Hash + Debug,
    A: Copy + Eq + Hash + Debug,
    M: Automaton,
    L: Fn(&S) -> M::Symbol,
{
    let dynamics = ProductDynamics { base, dfa, label };
    let initial = ProductState {
        mdp: base.initial(),
        dfa: dfa.initial(),
    };
    let model = MdpModel::build(&dynamics, initial)?;

    let terminal = (0..model.len())
        .filter(|&s| model.transitions().is_terminal(s))
        .count();
    info!(
        "Product has {} states ({} terminal) over {} base states",
        model.len(),
        terminal,
        base.len()
    );

    Ok(model)
}
