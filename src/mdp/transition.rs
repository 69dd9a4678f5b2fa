use std::fmt::Debug;

use crate::{
    error::{Error, Result},
    util,
};

/// One entry of an outcome distribution, with the successor given by its state index
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub next: usize,
    pub prob: f64,
    pub reward: f64,
}

/// Explicit transition structure over an indexed state space
///
/// Rows are indexed by state; each row lists the available actions of that state in the
/// order the dynamics reported them, with the outcome distribution of each.
/// Terminal states have empty rows.
#[derive(Clone, Debug)]
pub struct TransitionModel<A> {
    rows: Vec<Vec<(A, Vec<Transition>)>>,
    terminal: Vec<bool>,
}

impl<A: Copy + Eq + Debug> TransitionModel<A> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            terminal: Vec::with_capacity(capacity),
        }
    }

    /// Append the row of the next state index
    pub(crate) fn push_row(&mut self, row: Vec<(A, Vec<Transition>)>, terminal: bool) {
        self.rows.push(row);
        self.terminal.push(terminal);
    }

    /// Number of states covered by the model
    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored `(state, action)` pairs
    pub fn num_pairs(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// The outcome distribution of `action` in state `s`, or `None` if the action is not available there
    pub fn outcomes(&self, s: usize, action: A) -> Option<&[Transition]> {
        self.rows
            .get(s)?
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, outcomes)| outcomes.as_slice())
    }

    /// The available actions of state `s`
    pub fn actions(&self, s: usize) -> impl Iterator<Item = A> + '_ {
        self.rows.get(s).into_iter().flatten().map(|(a, _)| *a)
    }

    /// The full row of state `s`
    pub fn row(&self, s: usize) -> &[(A, Vec<Transition>)] {
        self.rows.get(s).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_terminal(&self, s: usize) -> bool {
        self.terminal.get(s).copied().unwrap_or(false)
    }

    /// Check that every stored distribution is nonempty, has probabilities in `[0,1]`, and sums to one
    pub fn validate(&self) -> Result<()> {
        for (s, row) in self.rows.iter().enumerate() {
            for (action, outcomes) in row {
                check_mass(s, action, outcomes.iter().map(|t| t.prob))?;
            }
        }
        Ok(())
    }
}

pub(crate) fn check_mass<A: Debug>(
    state: usize,
    action: &A,
    probs: impl IntoIterator<Item = f64>,
) -> Result<()> {
    let mut total = 0.0;
    let mut count = 0;
    for p in probs {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidProbability {
                state,
                action: format!("{action:?}"),
                prob: p,
            });
        }
        total += p;
        count += 1;
    }

    if count == 0 || !util::is_unit_mass(total) {
        return Err(Error::ProbabilityMass {
            state,
            action: format!("{action:?}"),
            total,
        });
    }
    Ok(())
}
