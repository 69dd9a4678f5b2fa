use std::{fmt::Debug, hash::Hash, sync::Arc};

use log::{trace, warn};
use rand::{distributions::WeightedIndex, prelude::Distribution, rngs::StdRng, SeedableRng};

use super::{transition::Transition, MdpModel};
use crate::{
    env::{Environment, Step, StepInfo},
    error::{Error, Result},
    render::Render,
};

/// A stateful step/reset environment over an explicit [`MdpModel`]
///
/// The facade owns nothing but a pointer to the current state (and episode bookkeeping);
/// all structure lives in the shared model, so independent facades can run over one
/// model in parallel. A single facade must be driven by one caller at a time.
///
/// The observation returned to the agent is the state value itself.
pub struct MdpEnv<S, A> {
    model: Arc<MdpModel<S, A>>,
    current: usize,
    steps: usize,
    max_steps: Option<usize>,
    rng: StdRng,
    renderer: Option<Box<dyn Render<S>>>,
}

impl<S, A> MdpEnv<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Copy + Eq + Hash + Debug,
{
    /// Initialize a new environment at the model's initial state
    pub fn new(model: Arc<MdpModel<S, A>>) -> Self {
        let initial = model.initial();
        Self {
            model,
            current: initial,
            steps: 0,
            max_steps: None,
            rng: StdRng::from_entropy(),
            renderer: None,
        }
    }

    /// Restore an environment from a model and a previously taken [`snapshot`](Self::snapshot)
    pub fn from_parts(model: Arc<MdpModel<S, A>>, current: usize) -> Result<Self> {
        if current >= model.len() {
            return Err(Error::UnreachableState(format!("#{current}")));
        }
        let mut env = Self::new(model);
        env.current = current;
        Ok(env)
    }

    /// Seed the generator used to sample stochastic outcomes
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Flag episodes as truncated after `max_steps` steps
    pub fn with_time_limit(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Attach a renderer, which is released when the environment is dropped
    pub fn with_renderer(mut self, renderer: Box<dyn Render<S>>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn model(&self) -> &Arc<MdpModel<S, A>> {
        &self.model
    }

    /// Index of the current state
    pub fn snapshot(&self) -> usize {
        self.current
    }

    pub fn state(&self) -> &S {
        match self.model.states().state_of(self.current) {
            Some(state) => state,
            // `current` is only ever set to indices that were checked against the model
            None => unreachable!("current state index {} out of range", self.current),
        }
    }

    pub fn available_actions(&self) -> Vec<A> {
        self.model.transitions().actions(self.current).collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.model.transitions().is_terminal(self.current)
    }

    /// Overwrite the current state
    ///
    /// States outside the model's reachable state space are rejected and nothing changes.
    pub fn set_state(&mut self, state: &S) -> Result<()> {
        let index = self
            .model
            .states()
            .index(state)
            .ok_or_else(|| Error::UnreachableState(format!("{state:?}")))?;
        self.current = index;
        Ok(())
    }

    /// Render the current state, if a renderer is attached
    pub fn render(&mut self) -> Option<String> {
        let state = self.model.states().state_of(self.current)?;
        self.renderer.as_mut()?.render(state)
    }

    fn sample(&mut self, outcomes: &[Transition]) -> Transition {
        if let [only] = outcomes {
            return *only;
        }
        match WeightedIndex::new(outcomes.iter().map(|t| t.prob)) {
            Ok(dist) => outcomes[dist.sample(&mut self.rng)],
            // Every distribution in the model passed the mass check when it was built
            Err(err) => unreachable!("invalid outcome weights in state {}: {err}", self.current),
        }
    }
}

impl<S, A> Environment for MdpEnv<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Copy + Eq + Hash + Debug,
{
    type State = S;
    type Action = A;

    fn actions(&self) -> Vec<A> {
        self.available_actions()
    }

    fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    fn step(&mut self, action: A) -> Result<Step<S>> {
        let model = Arc::clone(&self.model);
        let outcomes = model
            .transitions()
            .outcomes(self.current, action)
            .ok_or_else(|| Error::IllegalAction {
                action: format!("{action:?}"),
                state: format!("{:?}", self.state()),
            })?;

        let outcome = self.sample(outcomes);
        trace!(
            "{} --{:?}--> {} (p = {}, r = {})",
            self.current,
            action,
            outcome.next,
            outcome.prob,
            outcome.reward
        );

        self.current = outcome.next;
        self.steps += 1;
        let truncated = self.max_steps.is_some_and(|max| self.steps >= max);
        if truncated {
            warn!("Episode truncated after {} steps", self.steps);
        }

        Ok(Step {
            observation: self.state().clone(),
            reward: outcome.reward,
            done: self.is_terminal(),
            info: StepInfo {
                state_index: outcome.next,
                probability: outcome.prob,
                steps: self.steps,
                truncated,
            },
        })
    }

    fn reset(&mut self) -> S {
        self.current = self.model.initial();
        self.steps = 0;
        self.state().clone()
    }
}
