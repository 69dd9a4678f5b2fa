use std::hash::Hash;

use indexmap::IndexSet;

/// A finite set of reachable states with a stable bijection to `0..len`
///
/// Indices are assigned in discovery order, so the initial state of an explored model is always `0`.
#[derive(Clone, Debug)]
pub struct StateSpace<S> {
    states: IndexSet<S>,
}

impl<S: Eq + Hash> StateSpace<S> {
    pub(crate) fn new() -> Self {
        Self {
            states: IndexSet::new(),
        }
    }

    /// Insert a state, returning its index and whether it was newly discovered
    pub(crate) fn insert(&mut self, state: S) -> (usize, bool) {
        self.states.insert_full(state)
    }

    /// The index of `state`, or `None` if it is not reachable
    pub fn index(&self, state: &S) -> Option<usize> {
        self.states.get_index_of(state)
    }

    /// The state with index `i`, or `None` if `i` is out of range
    pub fn state_of(&self, i: usize) -> Option<&S> {
        self.states.get_index(i)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate over `(index, state)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &S)> {
        self.states.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_dense_indices() {
        let mut space = StateSpace::new();
        assert_eq!(space.insert('a'), (0, true), "First state gets index 0");
        assert_eq!(space.insert('b'), (1, true), "Second state gets index 1");
        assert_eq!(space.insert('a'), (0, false), "Duplicate keeps its index");
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn index_and_state_of_are_inverse() {
        let mut space = StateSpace::new();
        for c in ['x', 'y', 'z'] {
            space.insert(c);
        }

        for (i, s) in space.iter() {
            assert_eq!(space.index(s), Some(i));
            assert_eq!(space.state_of(i), Some(s));
        }
        assert_eq!(space.index(&'w'), None, "Unknown state has no index");
        assert_eq!(space.state_of(3), None, "Out of range index has no state");
    }
}
