mod config;
mod render;
mod state;
mod world;

use std::sync::Arc;

pub use config::{Rewards, WarehouseConfig};
pub use render::TextRenderer;
pub use state::{Action, AgentState, Cell};
pub use world::{place_racks, World};

use crate::{
    env::{Dynamics, Outcome},
    error::{Error, Result},
    mdp::{MdpEnv, MdpModel},
    registration::EnvSpec,
    render::RenderMode,
};

/// A single robot moving racks around a grid warehouse
///
/// The robot drives on a square floor. Unloaded, it can pass under racks and pick one up
/// while standing on it; the rack is then bound for the nearest drop-off cell. Loaded, it
/// cannot enter rack cells and may only drop its rack at the assigned target. Movement is
/// deterministic unless the configuration adds slip.
///
/// Intended for dynamic programming: build the explicit model once with
/// [`build_model`](Warehouse::build_model) and share it between environments, or cross it
/// with a task automaton using [`product`](crate::mdp::product).
#[derive(Clone, Debug)]
pub struct Warehouse {
    world: World,
    rewards: Rewards,
    slip: f64,
    initial: AgentState,
}

impl Warehouse {
    pub fn new(config: &WarehouseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            world: config.world()?,
            rewards: config.rewards.clone(),
            slip: config.slip,
            initial: AgentState::idle(config.initial_location),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn initial_state(&self) -> AgentState {
        self.initial
    }

    /// Explore every state reachable from the initial state
    pub fn build_model(&self) -> Result<MdpModel<AgentState, Action>> {
        MdpModel::build(self, self.initial)
    }

    /// Build the warehouse described by `config` and wrap it in an environment registered as `spec`
    ///
    /// The environment truncates episodes after `spec.max_episode_steps` steps and renders
    /// according to `config.render_mode`.
    pub fn make(spec: &EnvSpec, config: &WarehouseConfig) -> Result<MdpEnv<AgentState, Action>> {
        let warehouse = Self::new(config)?;
        let model = Arc::new(warehouse.build_model()?);
        let env = MdpEnv::new(model).with_time_limit(spec.max_episode_steps);

        Ok(match config.render_mode {
            RenderMode::Off => env,
            mode => env.with_renderer(Box::new(TextRenderer::new(warehouse.world, mode))),
        })
    }

    /// Where a move in direction `dir` takes the agent, or `None` if it is blocked
    fn destination(&self, state: &AgentState, dir: (i32, i32)) -> Option<Cell> {
        let to = state.location.shift(dir);
        let blocked = !self.world.is_in_bounds(to) || (state.carrying && self.world.is_rack(to));
        (!blocked).then_some(to)
    }

    fn illegal(state: &AgentState, action: Action) -> Error {
        Error::IllegalAction {
            action: action.to_string(),
            state: state.word(),
        }
    }
}

impl Dynamics for Warehouse {
    type State = AgentState;
    type Action = Action;

    /// Moves are always available; blocked moves show up as self-loops instead
    fn available_actions(&self, state: &AgentState) -> Vec<Action> {
        let mut actions = Action::MOVES.to_vec();
        if !state.carrying && self.world.is_rack(state.location) {
            actions.push(Action::Pickup);
        }
        if state.carrying && state.target == Some(state.location) {
            actions.push(Action::Dropoff);
        }
        actions
    }

    fn transition(&self, state: &AgentState, action: Action) -> Result<Vec<Outcome<AgentState>>> {
        let Rewards {
            step,
            bump,
            pickup,
            delivery,
        } = self.rewards;

        match action {
            Action::Right | Action::Down | Action::Left | Action::Up => {
                let dir = action.direction().ok_or_else(|| Self::illegal(state, action))?;
                let Some(to) = self.destination(state, dir) else {
                    return Ok(vec![Outcome::certain(*state, bump)]);
                };

                let moved = state.with_location(to);
                Ok(if self.slip <= 0.0 {
                    vec![Outcome::certain(moved, step)]
                } else if self.slip >= 1.0 {
                    vec![Outcome::certain(*state, bump)]
                } else {
                    vec![
                        Outcome {
                            next_state: moved,
                            prob: 1.0 - self.slip,
                            reward: step,
                        },
                        Outcome {
                            next_state: *state,
                            prob: self.slip,
                            reward: bump,
                        },
                    ]
                })
            }
            Action::Pickup => {
                if state.carrying || !self.world.is_rack(state.location) {
                    return Err(Self::illegal(state, action));
                }
                let target = self
                    .world
                    .nearest_dropoff(state.location)
                    .ok_or_else(|| Self::illegal(state, action))?;
                Ok(vec![Outcome::certain(
                    AgentState::loaded(state.location, target),
                    pickup,
                )])
            }
            Action::Dropoff => {
                if !state.carrying || state.target != Some(state.location) {
                    return Err(Self::illegal(state, action));
                }
                Ok(vec![Outcome::certain(
                    AgentState::idle(state.location),
                    delivery,
                )])
            }
        }
    }

    fn is_terminal(&self, _state: &AgentState) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::{
        dfa::{Automaton, TableDfa},
        env::Environment,
        mdp::{product, ProductState},
        registration::WAREHOUSE_V0,
    };

    fn small_config() -> WarehouseConfig {
        WarehouseConfig {
            size: 3,
            ..Default::default()
        }
        .with_racks([Cell::new(1, 1)])
    }

    fn small_env() -> MdpEnv<AgentState, Action> {
        let warehouse = Warehouse::new(&small_config()).unwrap();
        MdpEnv::new(Arc::new(warehouse.build_model().unwrap()))
    }

    #[test]
    fn walk_around_rack() {
        let mut env = small_env();
        let start = env.reset();
        assert_eq!(start, AgentState::idle(Cell::new(0, 0)));

        let mut visited = vec![start.location];
        for action in [Action::Right, Action::Right, Action::Down, Action::Down] {
            let step = env.step(action).unwrap();
            assert_eq!(step.reward, -1.0, "{action} is a plain move");
            visited.push(step.observation.location);
        }

        assert_eq!(env.state().location, Cell::new(2, 2));
        assert!(!visited.contains(&Cell::new(1, 1)), "Path never touches the rack");
    }

    #[test]
    fn boundaries_block() {
        let mut env = small_env();
        let step = env.step(Action::Up).unwrap();
        assert_eq!(step.observation, AgentState::idle(Cell::new(0, 0)));
        assert_eq!(step.reward, -2.0, "Bump reward");
        let step = env.step(Action::Left).unwrap();
        assert_eq!(step.observation.location, Cell::new(0, 0));
    }

    #[test]
    fn loaded_agent_is_blocked_by_racks() {
        let warehouse = Warehouse::new(&small_config()).unwrap();
        let loaded = AgentState::loaded(Cell::new(1, 0), Cell::new(1, 2));
        let outcomes = warehouse.transition(&loaded, Action::Down).unwrap();
        assert_eq!(outcomes, vec![Outcome::certain(loaded, -2.0)]);

        let idle = AgentState::idle(Cell::new(1, 0));
        let outcomes = warehouse.transition(&idle, Action::Down).unwrap();
        assert_eq!(
            outcomes[0].next_state.location,
            Cell::new(1, 1),
            "Unloaded agent drives under the rack"
        );
    }

    #[test]
    fn pickup_and_deliver() {
        let mut env = small_env();
        env.set_state(&AgentState::idle(Cell::new(1, 1))).unwrap();
        assert!(env.available_actions().contains(&Action::Pickup));
        assert!(!env.available_actions().contains(&Action::Dropoff));

        let step = env.step(Action::Pickup).unwrap();
        assert!(step.observation.carrying);
        assert_eq!(step.observation.target, Some(Cell::new(1, 2)));
        assert_eq!(step.reward, 1.0);

        // Dropping off anywhere but the target is illegal
        let before = *env.state();
        let err = env.step(Action::Dropoff).unwrap_err();
        assert!(matches!(err, Error::IllegalAction { .. }));
        assert_eq!(*env.state(), before, "Rejected action changes nothing");

        // The target is stable while carrying
        env.step(Action::Right).unwrap();
        env.step(Action::Down).unwrap();
        env.step(Action::Left).unwrap();
        assert_eq!(*env.state(), AgentState::loaded(Cell::new(1, 2), Cell::new(1, 2)));

        let step = env.step(Action::Dropoff).unwrap();
        assert_eq!(step.observation, AgentState::idle(Cell::new(1, 2)));
        assert_eq!(step.reward, 10.0);
        assert!(!step.done, "Delivery does not end the base MDP");
    }

    #[test]
    fn pickup_requires_rack() {
        let mut env = small_env();
        assert!(!env.available_actions().contains(&Action::Pickup));
        assert!(matches!(
            env.step(Action::Pickup),
            Err(Error::IllegalAction { .. })
        ));
    }

    #[test]
    fn set_state_off_floor() {
        let mut env = small_env();
        env.step(Action::Right).unwrap();
        let err = env
            .set_state(&AgentState::idle(Cell::new(3, 0)))
            .unwrap_err();
        assert!(matches!(err, Error::UnreachableState(_)));
        assert_eq!(env.state().location, Cell::new(1, 0), "State is unchanged");

        // On the floor but never reachable: carrying toward a cell that is no drop-off
        let bogus = AgentState::loaded(Cell::new(0, 0), Cell::new(0, 0));
        assert!(env.set_state(&bogus).is_err());
    }

    #[test]
    fn small_state_space() {
        let model = Warehouse::new(&small_config())
            .unwrap()
            .build_model()
            .unwrap();

        // Loaded: the rack cell where the pickup happens plus the 8 corridor cells
        let loaded = model.states().iter().filter(|(_, s)| s.carrying).count();
        let idle = model.len() - loaded;
        assert_eq!(idle, 9);
        assert_eq!(loaded, 9);
        assert_eq!(model.states().index(&AgentState::idle(Cell::new(0, 0))), Some(0));

        for (_, state) in model.states().iter() {
            assert_eq!(state.carrying, state.target.is_some(), "Target iff carrying");
        }
    }

    #[test]
    fn default_warehouse_builds() {
        let warehouse = Warehouse::new(&WarehouseConfig::default()).unwrap();
        let model = warehouse.build_model().unwrap();
        assert!(model.transitions().validate().is_ok());

        let idle = model.states().iter().filter(|(_, s)| !s.carrying).count();
        assert_eq!(idle, 400, "Every cell is reachable unloaded");

        let racks: HashSet<_> = warehouse.world().racks().collect();
        for (s, state) in model.states().iter() {
            let actions: Vec<_> = model.transitions().actions(s).collect();
            assert_eq!(
                actions.contains(&Action::Pickup),
                !state.carrying && racks.contains(&state.location)
            );
            assert_eq!(
                actions.contains(&Action::Dropoff),
                state.carrying && state.target == Some(state.location)
            );
        }
    }

    #[test]
    fn slip_splits_moves() {
        let warehouse = Warehouse::new(&small_config().with_slip(0.1)).unwrap();
        let start = warehouse.initial_state();

        let outcomes = warehouse.transition(&start, Action::Right).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!((outcomes[0].prob - 0.9).abs() < 1e-12);
        assert_eq!(outcomes[1].next_state, start, "Slipping stays put");

        let blocked = warehouse.transition(&start, Action::Up).unwrap();
        assert_eq!(blocked.len(), 1, "Blocked moves stay certain");

        let model = warehouse.build_model().unwrap();
        assert!(model.transitions().validate().is_ok());
    }

    #[test]
    fn registered_env() {
        let mut env = Warehouse::make(&WAREHOUSE_V0, &small_config()).unwrap();
        let mut last = None;
        for _ in 0..WAREHOUSE_V0.max_episode_steps {
            last = Some(env.step(Action::Up).unwrap());
        }
        assert!(last.unwrap().info.truncated);
    }

    #[test]
    fn delivery_task_product() {
        let warehouse = Warehouse::new(&small_config()).unwrap();
        let base = warehouse.build_model().unwrap();

        // 0: waiting for pickup, 1: carrying, 2: delivered
        let dfa = TableDfa::new(0u8)
            .with_transition(0, false, 0)
            .with_transition(0, true, 1)
            .with_transition(1, true, 1)
            .with_transition(1, false, 2)
            .with_accepting(2);
        let prod = product(&base, &dfa, |s: &AgentState| s.carrying).unwrap();

        assert!(prod.len() <= base.len() * dfa.num_states().unwrap());
        assert_eq!(prod.states().state_of(0), Some(&ProductState { mdp: 0, dfa: 0 }));

        let mut env = MdpEnv::new(Arc::new(prod));
        env.reset();
        let mut done = false;
        for action in [
            Action::Right,
            Action::Down,
            Action::Pickup,
            Action::Down,
            Action::Dropoff,
        ] {
            let step = env.step(action).unwrap();
            done = step.done;
        }
        assert!(done, "Delivery reaches the accepting state");
        assert!(env.available_actions().is_empty());
    }

    proptest! {
        #[test]
        fn moves_are_always_available(x in 0i32..3, y in 0i32..3, carrying in any::<bool>()) {
            let warehouse = Warehouse::new(&small_config()).unwrap();
            let state = if carrying {
                AgentState::loaded(Cell::new(x, y), Cell::new(1, 2))
            } else {
                AgentState::idle(Cell::new(x, y))
            };
            let actions = warehouse.available_actions(&state);
            for action in Action::MOVES {
                prop_assert!(actions.contains(&action));
                let outcomes = warehouse.transition(&state, action).unwrap();
                prop_assert_eq!(outcomes.len(), 1);
                prop_assert_eq!(outcomes[0].next_state.carrying, carrying);
                prop_assert_eq!(outcomes[0].next_state.target, state.target);
            }
        }
    }
}
