use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
};

/// Classification of an automaton state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DfaStatus {
    /// The task has been completed; the state is a sink
    Accepting,
    /// The task can no longer be completed; the state is a sink
    Rejecting,
    /// The task is still in progress
    Live,
}

impl DfaStatus {
    pub fn is_sink(self) -> bool {
        !matches!(self, Self::Live)
    }
}

/// A deterministic finite automaton supplied by an external provider
///
/// The transition function may be partial, but a product construction fails if it ever needs
/// a transition that is not defined.
pub trait Automaton {
    type State: Clone + Eq + Hash + Debug;
    type Symbol: Debug;

    fn initial(&self) -> Self::State;

    /// The successor of `state` on `symbol`, or `None` if the transition is undefined
    fn next(&self, state: &Self::State, symbol: &Self::Symbol) -> Option<Self::State>;

    fn status(&self, state: &Self::State) -> DfaStatus;

    /// Number of automaton states, if known
    fn num_states(&self) -> Option<usize> {
        None
    }
}

/// An automaton backed by an explicit transition table
///
/// ### Example
/// ```
/// use warehouse_mdp::dfa::{Automaton, DfaStatus, TableDfa};
///
/// let dfa = TableDfa::new(0u8)
///     .with_transition(0, 'a', 1)
///     .with_transition(0, 'b', 0)
///     .with_accepting(1);
///
/// assert_eq!(dfa.next(&0, &'a'), Some(1));
/// assert_eq!(dfa.next(&0, &'c'), None);
/// assert_eq!(dfa.next(&1, &'c'), Some(1));
/// assert_eq!(dfa.status(&1), DfaStatus::Accepting);
/// ```
#[derive(Clone, Debug)]
pub struct TableDfa<Q, Sym> {
    initial: Q,
    table: HashMap<Q, HashMap<Sym, Q>>,
    accepting: HashSet<Q>,
    rejecting: HashSet<Q>,
    states: HashSet<Q>,
}

impl<Q, Sym> TableDfa<Q, Sym>
where
    Q: Clone + Eq + Hash,
    Sym: Eq + Hash,
{
    pub fn new(initial: Q) -> Self {
        Self {
            states: HashSet::from([initial.clone()]),
            initial,
            table: HashMap::new(),
            accepting: HashSet::new(),
            rejecting: HashSet::new(),
        }
    }

    pub fn with_transition(mut self, from: Q, symbol: Sym, to: Q) -> Self {
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.table.entry(from).or_default().insert(symbol, to);
        self
    }

    pub fn with_accepting(mut self, state: Q) -> Self {
        self.states.insert(state.clone());
        self.accepting.insert(state);
        self
    }

    pub fn with_rejecting(mut self, state: Q) -> Self {
        self.states.insert(state.clone());
        self.rejecting.insert(state);
        self
    }
}

impl<Q, Sym> Automaton for TableDfa<Q, Sym>
where
    Q: Clone + Eq + Hash + Debug,
    Sym: Eq + Hash + Debug,
{
    type State = Q;
    type Symbol = Sym;

    fn initial(&self) -> Q {
        self.initial.clone()
    }

    fn next(&self, state: &Q, symbol: &Sym) -> Option<Q> {
        // Sinks loop on every symbol
        if self.status(state).is_sink() {
            return Some(state.clone());
        }
        self.table.get(state)?.get(symbol).cloned()
    }

    fn status(&self, state: &Q) -> DfaStatus {
        if self.accepting.contains(state) {
            DfaStatus::Accepting
        } else if self.rejecting.contains(state) {
            DfaStatus::Rejecting
        } else {
            DfaStatus::Live
        }
    }

    fn num_states(&self) -> Option<usize> {
        Some(self.states.len())
    }
}
